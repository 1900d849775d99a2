use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    widgets::Paragraph,
    Frame,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::tui::{
    components::{
        status_bar::KeyHint, ChatView, Component, HelpPopup, InputBox, SettingsPanel, Sidebar,
        SpecialistList, StatusBar,
    },
    Event, Theme,
};
use personabot::{
    api::{Catalog, DataSource},
    app::AppState,
    consultation::{describe_settings, ConsultationState, ResponseSimulator, View},
};

const DISCLAIMER: &str =
    "PersonaBot AI provides general information and should not replace professional medical advice.";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FocusedPanel {
    Settings,
    Specialists,
    ChatView,
    InputBox,
    Sidebar,
}

pub struct App {
    // Components
    sidebar: Sidebar,
    settings_panel: SettingsPanel,
    specialist_list: SpecialistList,
    chat_view: ChatView,
    input_box: InputBox,
    status_bar: StatusBar,
    help_popup: HelpPopup,

    // State
    consultation: ConsultationState,
    focused_panel: FocusedPanel,
    theme: Theme,
    should_quit: bool,

    // Backend integration
    app_state: Arc<AppState>,
    catalog: Arc<Catalog>,
    simulator: ResponseSimulator,
    event_sender: mpsc::UnboundedSender<Event>,
}

impl App {
    pub fn new(app_state: Arc<AppState>, event_sender: mpsc::UnboundedSender<Event>) -> Self {
        let config = app_state.get_config();
        let catalog = app_state.catalog();

        let mut status_bar = StatusBar::new();
        status_bar.set_catalog_source(if catalog.uses_fallback() {
            DataSource::Fallback
        } else {
            DataSource::Live
        });

        let mut help_popup = HelpPopup::new();
        if config.ui.show_tutorial_on_start {
            help_popup.show();
        }

        let mut app = Self {
            sidebar: Sidebar::new(catalog.specialists.clone()),
            settings_panel: SettingsPanel::new(catalog.settings.behavioral_settings.clone()),
            specialist_list: SpecialistList::new(catalog.specialists.clone()),
            chat_view: ChatView::new(),
            input_box: InputBox::new(),
            status_bar,
            help_popup,
            consultation: ConsultationState::new(),
            focused_panel: FocusedPanel::Specialists,
            theme: Theme::by_name(&config.ui.theme),
            should_quit: false,
            simulator: app_state.simulator(),
            catalog,
            app_state,
            event_sender,
        };

        app.update_focus();
        app.status_bar
            .set_status("Choose your specialists to start a consultation".to_string());
        app
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn consultation(&self) -> &ConsultationState {
        &self.consultation
    }

    /// Pre-selects specialists by id; returns the ids not found in the catalog.
    pub fn preselect(&mut self, ids: &[String]) -> Vec<String> {
        let mut unknown = Vec::new();
        for id in ids {
            match self.catalog.specialist(id) {
                Some(specialist) if !self.consultation.selection().is_selected(id) => {
                    self.consultation.toggle_specialist(specialist);
                }
                Some(_) => {}
                None => unknown.push(id.clone()),
            }
        }
        self.specialist_list.sync_selection(self.consultation.selection());
        unknown
    }

    pub async fn handle_event(&mut self, event: Event) {
        // Tutorial takes priority
        if self.help_popup.is_visible() && self.help_popup.handle_event(&event) {
            return;
        }

        match event {
            Event::Key(key) => {
                if self.handle_global_keys(key).await {
                    return;
                }
                self.handle_panel_specific_keys(key);
            }
            Event::SpecialistReply(consultation_id, content) => {
                self.handle_reply(consultation_id, content);
            }
            Event::StatusUpdate(status) => {
                self.status_bar.set_status(status);
            }
            Event::Resize(width, height) => {
                debug!("Terminal resized to {}x{}", width, height);
            }
            Event::Tick => {}
        }
    }

    async fn handle_global_keys(&mut self, key: KeyEvent) -> bool {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Char('q'), KeyModifiers::CONTROL) => {
                self.should_quit = true;
                true
            }
            (KeyCode::F(1), _) => {
                self.help_popup.toggle();
                true
            }
            (KeyCode::F(2), _) => {
                self.toggle_theme().await;
                true
            }
            (KeyCode::Char('n'), KeyModifiers::CONTROL) => {
                self.new_consultation();
                true
            }
            (KeyCode::Tab, KeyModifiers::NONE) => {
                self.switch_panel(true);
                true
            }
            (KeyCode::BackTab, _) => {
                self.switch_panel(false);
                true
            }
            _ => false,
        }
    }

    fn handle_panel_specific_keys(&mut self, key: KeyEvent) {
        let event = Event::Key(key);
        let handled = match self.focused_panel {
            FocusedPanel::Settings => self.settings_panel.handle_event(&event),
            FocusedPanel::Specialists => self.specialist_list.handle_event(&event),
            FocusedPanel::ChatView => self.chat_view.handle_event(&event),
            FocusedPanel::InputBox => self.input_box.handle_event(&event),
            FocusedPanel::Sidebar => self.sidebar.handle_event(&event),
        };

        if handled {
            return;
        }

        match self.focused_panel {
            FocusedPanel::Settings => self.handle_settings_keys(key),
            FocusedPanel::Specialists => match key.code {
                KeyCode::Char(' ') => {
                    if let Some(specialist) = self.specialist_list.highlighted().cloned() {
                        let selected = self.consultation.toggle_specialist(&specialist);
                        self.specialist_list.sync_selection(self.consultation.selection());
                        self.status_bar.set_status(if selected {
                            format!("Selected {}", specialist.full_name)
                        } else {
                            format!("Removed {}", specialist.full_name)
                        });
                    }
                }
                KeyCode::Enter => self.start_consultation(),
                _ => {}
            },
            FocusedPanel::InputBox => {
                if key.code == KeyCode::Enter {
                    self.send_message();
                }
            }
            FocusedPanel::ChatView | FocusedPanel::Sidebar => {}
        }
    }

    fn handle_settings_keys(&mut self, key: KeyEvent) {
        let Some(definition) = self.settings_panel.current_definition().cloned() else {
            return;
        };

        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') if !definition.multi => {
                let forward = matches!(key.code, KeyCode::Right | KeyCode::Char('l'));
                self.consultation.cycle_setting(&definition, forward);
            }
            KeyCode::Char(' ') if definition.multi => {
                if let Some(value) = self.settings_panel.current_value().map(str::to_string) {
                    self.consultation.toggle_setting_value(&definition, &value);
                }
            }
            KeyCode::Delete | KeyCode::Backspace => {
                self.consultation.clear_setting(&definition.id);
            }
            KeyCode::Enter => {
                self.start_consultation();
                return;
            }
            _ => return,
        }

        self.settings_panel.sync_settings(self.consultation.settings());
    }

    fn start_consultation(&mut self) {
        if self
            .consultation
            .start_consultation(&self.catalog.settings.behavioral_settings)
            .is_none()
        {
            self.status_bar
                .set_status("Select at least one specialist to start".to_string());
            return;
        }

        self.load_chat_view();
        self.set_focused_panel(FocusedPanel::InputBox);
    }

    fn load_chat_view(&mut self) {
        let Some(active) = self.consultation.active() else {
            return;
        };

        let specialties: Vec<&str> = active.specialists().iter().map(|s| s.specialty.as_str()).collect();
        let badges = describe_settings(active.settings(), &self.catalog.settings.behavioral_settings)
            .into_iter()
            .map(|(label, value)| format!("{}: {}", label, value))
            .collect();
        self.chat_view
            .set_header(active.heading(), specialties.join(", "), badges);

        let color = active.primary().map(|s| s.color.clone()).unwrap_or_default();
        let speaker = match active.specialists() {
            [only] => only.full_name.clone(),
            _ => "Specialists".to_string(),
        };
        self.chat_view.set_speaker(speaker, color);
        self.chat_view.set_messages(active.transcript().messages().to_vec());

        self.input_box.clear();
        self.input_box.set_placeholder(active.input_placeholder());
        self.sidebar.set_current(active.specialists());
        self.status_bar
            .set_status(format!("Consultation started with {}", active.heading()));
    }

    fn send_message(&mut self) {
        let content = self.input_box.get_content();
        match self.consultation.send_message(&content) {
            Ok(Some(message)) => {
                self.input_box.clear();
                self.chat_view.add_message(message);
                self.schedule_reply();
            }
            // Blank input stays in the box
            Ok(None) => {}
            Err(e) => {
                warn!("Failed to send message: {}", e);
                self.status_bar.set_error(format!("Error: {}", e));
            }
        }
    }

    fn schedule_reply(&mut self) {
        let Some(active) = self.consultation.active() else {
            return;
        };

        let consultation_id = active.id().to_string();
        let sender = self.event_sender.clone();
        debug!(
            "Reply for consultation {} due in {:?}",
            consultation_id,
            self.simulator.delay()
        );
        self.simulator.schedule(active.reply_mode(), move |reply| {
            let _ = sender.send(Event::SpecialistReply(consultation_id, reply));
        });
        self.status_bar
            .set_status(format!("{} is typing...", active.heading()));
    }

    fn handle_reply(&mut self, consultation_id: String, content: String) {
        if !self.consultation.receive_reply(&consultation_id, content) {
            return;
        }

        if let Some(message) = self
            .consultation
            .active()
            .and_then(|active| active.transcript().last())
        {
            self.chat_view.add_message(message.clone());
        }
        self.status_bar.set_status("Ready".to_string());
    }

    fn new_consultation(&mut self) {
        self.consultation.new_chat();

        self.chat_view.clear_messages();
        self.input_box.clear();
        self.sidebar.set_history(self.consultation.history());
        self.sidebar.set_current(&[]);
        self.specialist_list.sync_selection(self.consultation.selection());
        self.settings_panel.sync_settings(self.consultation.settings());

        self.set_focused_panel(FocusedPanel::Specialists);
        self.status_bar
            .set_status("Choose your specialists to start a new consultation".to_string());
    }

    async fn toggle_theme(&mut self) {
        let next = if self.theme.name == "dark" { "light" } else { "dark" };
        self.theme = Theme::by_name(next);

        match self
            .app_state
            .update_config(|config| config.ui.theme = next.to_string())
            .await
        {
            Ok(()) => {
                info!("Theme switched to {}", next);
                self.status_bar.set_status(format!("Theme: {}", next));
            }
            Err(e) => {
                warn!("Failed to persist theme: {}", e);
                self.status_bar.set_error(format!("Theme not saved: {}", e));
            }
        }
    }

    fn switch_panel(&mut self, forward: bool) {
        let order: &[FocusedPanel] = match self.consultation.view() {
            View::Selection => &[FocusedPanel::Settings, FocusedPanel::Specialists, FocusedPanel::Sidebar],
            View::Chat => &[FocusedPanel::InputBox, FocusedPanel::ChatView, FocusedPanel::Sidebar],
        };
        let len = order.len();
        let current = order.iter().position(|p| *p == self.focused_panel).unwrap_or(0);
        let next = if forward { (current + 1) % len } else { (current + len - 1) % len };
        self.set_focused_panel(order[next]);
    }

    fn set_focused_panel(&mut self, panel: FocusedPanel) {
        self.focused_panel = panel;
        self.update_focus();
    }

    fn update_focus(&mut self) {
        self.settings_panel.unfocus();
        self.specialist_list.unfocus();
        self.chat_view.unfocus();
        self.input_box.unfocus();
        self.sidebar.unfocus();

        match self.focused_panel {
            FocusedPanel::Settings => self.settings_panel.focus(),
            FocusedPanel::Specialists => self.specialist_list.focus(),
            FocusedPanel::ChatView => self.chat_view.focus(),
            FocusedPanel::InputBox => self.input_box.focus(),
            FocusedPanel::Sidebar => self.sidebar.focus(),
        }

        self.update_status_key_hints();
    }

    fn update_status_key_hints(&mut self) {
        let key_hints = match self.focused_panel {
            FocusedPanel::Settings => vec![
                KeyHint::new("←/→", "Change"),
                KeyHint::new("Space", "Toggle"),
                KeyHint::new("Del", "Clear"),
                KeyHint::new("Tab", "Specialists"),
            ],
            FocusedPanel::Specialists => vec![
                KeyHint::new("Space", "Select"),
                KeyHint::new("Enter", "Start"),
                KeyHint::new("Tab", "Settings"),
            ],
            FocusedPanel::ChatView => vec![
                KeyHint::new("↑/↓", "Scroll"),
                KeyHint::new("Home/End", "Top/Bottom"),
                KeyHint::new("Ctrl+N", "New"),
            ],
            FocusedPanel::InputBox => vec![
                KeyHint::new("Enter", "Send"),
                KeyHint::new("Tab", "Messages"),
                KeyHint::new("Ctrl+N", "New"),
            ],
            FocusedPanel::Sidebar => vec![
                KeyHint::new("↑/↓", "Folder"),
                KeyHint::new("Enter", "Expand/Collapse"),
                KeyHint::new("Tab", "Back"),
            ],
        };
        self.status_bar.set_key_hints(key_hints);
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Main content
                Constraint::Length(2), // Status bar
            ])
            .split(frame.size());

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(30), // Sidebar
                Constraint::Min(1),     // Main area
            ])
            .split(chunks[0]);

        self.sidebar.render(frame, main_chunks[0], &self.theme);
        match self.consultation.view() {
            View::Selection => self.render_selection(frame, main_chunks[1]),
            View::Chat => self.render_chat(frame, main_chunks[1]),
        }
        self.status_bar.render(frame, chunks[1], &self.theme);

        // Tutorial last (on top)
        self.help_popup.render(frame, frame.size(), &self.theme);
    }

    fn render_selection(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(self.settings_panel.height()),
                Constraint::Min(1),
            ])
            .split(area);

        self.settings_panel.render(frame, chunks[0], &self.theme);
        self.specialist_list.render(frame, chunks[1], &self.theme);
    }

    fn render_chat(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Chat view
                Constraint::Length(3), // Input box
                Constraint::Length(1), // Disclaimer
            ])
            .split(area);

        self.chat_view.render(frame, chunks[0], &self.theme);
        self.input_box.render(frame, chunks[1], &self.theme);

        let disclaimer = Paragraph::new(DISCLAIMER)
            .style(self.theme.secondary())
            .alignment(Alignment::Center);
        frame.render_widget(disclaimer, chunks[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use personabot::app::AppConfig;
    use personabot::consultation::Sender;
    use personabot::platform::AppPaths;
    use std::time::Duration;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn test_app(dir: &std::path::Path) -> (App, mpsc::UnboundedReceiver<Event>) {
        let paths = AppPaths::with_root(dir);
        paths.ensure_dirs_exist().unwrap();
        let mut config = AppConfig::default();
        config.ui.show_tutorial_on_start = false;
        let state = AppState::with_catalog(config, paths, Catalog::builtin());
        let (sender, receiver) = mpsc::unbounded_channel();
        (App::new(Arc::new(state), sender), receiver)
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_event(key(KeyCode::Char(c))).await;
        }
    }

    #[tokio::test]
    async fn test_enter_without_selection_stays_on_selection() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = test_app(dir.path());

        app.handle_event(key(KeyCode::Enter)).await;
        assert_eq!(app.consultation().view(), View::Selection);
        assert_eq!(app.status_bar.status(), "Select at least one specialist to start");
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_gets_simulated_reply() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, mut rx) = test_app(dir.path());

        app.handle_event(key(KeyCode::Char(' '))).await;
        app.handle_event(key(KeyCode::Enter)).await;
        assert_eq!(app.consultation().view(), View::Chat);
        assert_eq!(app.focused_panel, FocusedPanel::InputBox);

        type_text(&mut app, "Hello").await;
        app.handle_event(key(KeyCode::Enter)).await;
        assert_eq!(app.input_box.get_content(), "");

        tokio::time::advance(Duration::from_millis(1001)).await;
        let event = rx.recv().await.unwrap();
        app.handle_event(event).await;

        let transcript = app.consultation().active().unwrap().transcript();
        assert_eq!(transcript.messages().len(), 3);
        assert_eq!(transcript.last().unwrap().sender, Sender::Specialist);
        assert_eq!(app.chat_view.message_count(), 3);
    }

    #[tokio::test]
    async fn test_blank_message_keeps_input() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = test_app(dir.path());

        app.handle_event(key(KeyCode::Char(' '))).await;
        app.handle_event(key(KeyCode::Enter)).await;
        type_text(&mut app, "   ").await;
        app.handle_event(key(KeyCode::Enter)).await;

        assert_eq!(app.input_box.get_content(), "   ");
        assert_eq!(app.consultation().active().unwrap().transcript().messages().len(), 1);
    }

    #[tokio::test]
    async fn test_settings_cycle_and_new_chat_keeps_them() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = test_app(dir.path());

        app.handle_event(Event::Key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT))).await;
        assert_eq!(app.focused_panel, FocusedPanel::Settings);
        app.handle_event(key(KeyCode::Right)).await;
        assert!(app.consultation().settings().get("location").is_some());

        app.handle_event(key(KeyCode::Tab)).await;
        app.handle_event(key(KeyCode::Char(' '))).await;
        app.handle_event(key(KeyCode::Enter)).await;
        app.handle_event(Event::Key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL))).await;

        assert_eq!(app.consultation().view(), View::Selection);
        assert!(app.consultation().selection().is_empty());
        assert_eq!(app.consultation().history().len(), 1);
        assert!(app.consultation().settings().get("location").is_some());
    }

    #[tokio::test]
    async fn test_stale_reply_is_not_shown() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = test_app(dir.path());

        app.handle_event(key(KeyCode::Char(' '))).await;
        app.handle_event(key(KeyCode::Enter)).await;
        app.handle_event(Event::SpecialistReply("ended".to_string(), "late".to_string())).await;
        assert_eq!(app.chat_view.message_count(), 1);
    }

    #[tokio::test]
    async fn test_sidebar_takes_focus_and_toggles_folders() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = test_app(dir.path());

        app.handle_event(key(KeyCode::Tab)).await;
        assert_eq!(app.focused_panel, FocusedPanel::Sidebar);
        app.handle_event(key(KeyCode::Enter)).await;
        assert!(app.sidebar.is_expanded("pcp"));
        assert_eq!(app.consultation().view(), View::Selection);

        app.handle_event(key(KeyCode::Tab)).await;
        assert_eq!(app.focused_panel, FocusedPanel::Settings);
    }

    #[tokio::test]
    async fn test_resize_leaves_state_alone() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = test_app(dir.path());

        app.handle_event(Event::Resize(80, 24)).await;
        assert_eq!(app.focused_panel, FocusedPanel::Specialists);
        assert_eq!(app.consultation().view(), View::Selection);
        assert!(!app.should_quit());
    }

    #[tokio::test]
    async fn test_preselect_reports_unknown_ids() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = test_app(dir.path());

        let unknown = app.preselect(&["cardio".to_string(), "surgeon".to_string()]);
        assert_eq!(unknown, vec!["surgeon".to_string()]);
        assert!(app.consultation().selection().is_selected("cardio"));
    }
}
