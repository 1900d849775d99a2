pub mod greeting;
pub mod selection;
pub mod session;
pub mod simulator;
pub mod transcript;
pub mod types;

pub use greeting::{describe_settings, synthesize_greeting};
pub use selection::SpecialistSelection;
pub use session::{ActiveConsultation, ConsultationState, View};
pub use simulator::{ReplyMode, ResponseSimulator};
pub use transcript::Transcript;
pub use types::{
    BehavioralSettings, ChatMessage, ChatSession, Sender, SettingDefinition, SettingValue,
    SettingsConfig, Specialist,
};
