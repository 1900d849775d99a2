use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem},
    Frame,
};

use crate::tui::{components::Component, Event, Theme};

/// Four-step walkthrough of a consultation, plus key bindings
pub struct HelpPopup {
    is_visible: bool,
}

const TUTORIAL_STEPS: [(&str, &str); 4] = [
    (
        "1. Select Your Specialists",
        "Choose one or more medical specialists from the list. Each has unique expertise.",
    ),
    (
        "2. Configure Settings",
        "Optionally set hospital setting, approach, experience level and region.",
    ),
    (
        "3. Start Consultation",
        "Start the consultation to begin chatting with your chosen specialists.",
    ),
    (
        "4. Chat with Experts",
        "Ask questions and receive guidance. Press Ctrl+N to start a new consultation.",
    ),
];

const PRO_TIP: &str =
    "Pro Tip: select several specialists to get a panel of perspectives on complex questions.";

impl HelpPopup {
    pub fn new() -> Self {
        Self { is_visible: false }
    }

    pub fn show(&mut self) {
        self.is_visible = true;
    }

    pub fn hide(&mut self) {
        self.is_visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn toggle(&mut self) {
        self.is_visible = !self.is_visible;
    }

    fn key_bindings() -> Vec<(&'static str, &'static str)> {
        vec![
            ("  Tab / Shift+Tab", "Switch between panels"),
            ("  Up/Down (j/k)", "Move through lists and messages"),
            ("  Space", "Select specialist / toggle a multi-select value"),
            ("  Left/Right", "Change a persona setting"),
            ("  Delete", "Clear a persona setting"),
            ("  Enter", "Start consultation / send message"),
            ("  Ctrl+N", "New consultation"),
            ("  F2", "Switch dark/light theme"),
            ("  Ctrl+C / Ctrl+Q", "Quit application"),
        ]
    }

    fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}

impl Component for HelpPopup {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if !self.is_visible {
            return;
        }

        let popup_area = Self::centered_rect(70, 80, area);
        frame.render_widget(Clear, popup_area);

        let section = |title: &'static str| {
            ListItem::new(Line::from(Span::styled(
                title,
                theme.accent().add_modifier(Modifier::BOLD),
            )))
        };

        let mut items = vec![section("How PersonaBot Works"), ListItem::new(Line::from(""))];
        for (title, body) in TUTORIAL_STEPS {
            items.push(ListItem::new(Line::from(Span::styled(title, theme.highlight()))));
            items.push(ListItem::new(Line::from(Span::styled(
                format!("   {}", body),
                theme.normal(),
            ))));
        }
        items.push(ListItem::new(Line::from("")));
        items.push(ListItem::new(Line::from(Span::styled(PRO_TIP, theme.warning()))));
        items.push(ListItem::new(Line::from("")));
        items.push(section("Keys"));
        for (key, description) in Self::key_bindings() {
            items.push(ListItem::new(Line::from(vec![
                Span::styled(key, theme.highlight()),
                Span::raw(": "),
                Span::styled(description, theme.normal()),
            ])));
        }

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.accent())
                    .title(" Tutorial - Press F1, Enter or Esc to close "),
            )
            .style(theme.normal());

        frame.render_widget(list, popup_area);
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        if !self.is_visible {
            return false;
        }

        match event {
            Event::Key(key) => match key.code {
                // Quit keys still reach the app
                KeyCode::Char('c') | KeyCode::Char('q')
                    if key.modifiers.contains(KeyModifiers::CONTROL) =>
                {
                    false
                }
                KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter | KeyCode::Char('q') => {
                    self.hide();
                    true
                }
                _ => true, // Consume everything else while visible
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    #[test]
    fn test_popup_consumes_keys_until_closed() {
        let mut popup = HelpPopup::new();
        let space = Event::Key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE));
        assert!(!popup.handle_event(&space));

        popup.show();
        assert!(popup.handle_event(&space));
        assert!(popup.is_visible());

        popup.handle_event(&Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(!popup.is_visible());
    }

    #[test]
    fn test_ctrl_q_reaches_app() {
        let mut popup = HelpPopup::new();
        popup.show();
        let ctrl_q = Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL));
        assert!(!popup.handle_event(&ctrl_q));
    }
}
