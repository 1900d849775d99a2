pub mod chat_view;
pub mod help_popup;
pub mod input_box;
pub mod settings_panel;
pub mod sidebar;
pub mod specialist_list;
pub mod status_bar;

use ratatui::{layout::Rect, Frame};
use crate::tui::{Event, Theme};

pub use chat_view::ChatView;
pub use help_popup::HelpPopup;
pub use input_box::InputBox;
pub use settings_panel::SettingsPanel;
pub use sidebar::Sidebar;
pub use specialist_list::SpecialistList;
pub use status_bar::StatusBar;

/// Base trait for all TUI components
pub trait Component {
    /// Render the component
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Handle input events; returns whether the event was consumed
    fn handle_event(&mut self, event: &Event) -> bool;
}
