pub mod config;
pub mod state;

pub use config::{AppConfig, ApiConfig, LoggingConfig, SimulatorConfig, UIConfig};
pub use state::AppState;
