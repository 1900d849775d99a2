use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use personabot::consultation::{BehavioralSettings, SettingDefinition};

use crate::tui::{components::Component, Event, Theme};

/// Persona setting pickers, one row per definition
pub struct SettingsPanel {
    definitions: Vec<SettingDefinition>,
    settings: BehavioralSettings,
    row: usize,
    /// Value cursor on multi-select rows
    value_cursor: usize,
    is_focused: bool,
}

impl SettingsPanel {
    pub fn new(definitions: Vec<SettingDefinition>) -> Self {
        Self {
            definitions,
            settings: BehavioralSettings::new(),
            row: 0,
            value_cursor: 0,
            is_focused: false,
        }
    }

    pub fn focus(&mut self) {
        self.is_focused = true;
    }

    pub fn unfocus(&mut self) {
        self.is_focused = false;
    }

    pub fn sync_settings(&mut self, settings: &BehavioralSettings) {
        self.settings = settings.clone();
    }

    pub fn current_definition(&self) -> Option<&SettingDefinition> {
        self.definitions.get(self.row)
    }

    /// Value under the cursor of a multi-select row.
    pub fn current_value(&self) -> Option<&str> {
        self.current_definition()
            .filter(|d| d.multi)
            .and_then(|d| d.values.get(self.value_cursor))
            .map(String::as_str)
    }

    /// Rows plus borders, for layout.
    pub fn height(&self) -> u16 {
        self.definitions.len() as u16 + 2
    }

    fn move_row(&mut self, forward: bool) {
        if self.definitions.is_empty() {
            return;
        }
        let len = self.definitions.len();
        self.row = if forward { (self.row + 1) % len } else { (self.row + len - 1) % len };
        self.value_cursor = 0;
    }

    fn move_value_cursor(&mut self, forward: bool) -> bool {
        let len = match self.current_definition() {
            Some(d) if d.multi && !d.values.is_empty() => d.values.len(),
            _ => return false,
        };
        self.value_cursor = if forward {
            (self.value_cursor + 1) % len
        } else {
            (self.value_cursor + len - 1) % len
        };
        true
    }

    fn row_line<'a>(&'a self, index: usize, definition: &'a SettingDefinition, theme: &Theme) -> Line<'a> {
        let is_current = self.is_focused && index == self.row;
        let label_style = if is_current { theme.selected() } else { theme.accent() };

        let mut spans = vec![
            Span::styled(format!("{:<20}", definition.category), label_style),
            Span::raw(" "),
        ];

        if definition.multi {
            let current = self.settings.get(&definition.id);
            for (i, value) in definition.values.iter().enumerate() {
                let checked = current.map(|v| v.contains(value)).unwrap_or(false);
                let text = format!("{}{} ", if checked { "[x]" } else { "[ ]" }, value);
                let style = if is_current && i == self.value_cursor {
                    theme.highlight()
                } else if checked {
                    theme.success()
                } else {
                    theme.secondary()
                };
                spans.push(Span::styled(text, style));
            }
        } else {
            match self.settings.get(&definition.id).filter(|v| v.is_set()) {
                Some(value) => {
                    spans.push(Span::styled(format!("< {} >", value.display()), theme.normal()));
                }
                None => spans.push(Span::styled("< Select >", theme.secondary())),
            }
        }

        Line::from(spans)
    }
}

impl Component for SettingsPanel {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let border_style = if self.is_focused {
            theme.accent()
        } else {
            theme.border()
        };

        let lines: Vec<Line> = self
            .definitions
            .iter()
            .enumerate()
            .map(|(i, definition)| self.row_line(i, definition, theme))
            .collect();

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(" Specialist Persona Settings (Optional) "),
        );

        frame.render_widget(paragraph, area);
    }

    /// Navigation only; value changes are applied by the app.
    fn handle_event(&mut self, event: &Event) -> bool {
        if !self.is_focused {
            return false;
        }

        match event {
            Event::Key(KeyEvent { code, .. }) => match code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_row(false);
                    true
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_row(true);
                    true
                }
                KeyCode::Left | KeyCode::Char('h') => self.move_value_cursor(false),
                KeyCode::Right | KeyCode::Char('l') => self.move_value_cursor(true),
                _ => false,
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use personabot::api::fallback_settings;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_rows_wrap() {
        let mut panel = SettingsPanel::new(fallback_settings().behavioral_settings);
        panel.focus();
        assert_eq!(panel.current_definition().unwrap().id, "location");

        panel.handle_event(&key(KeyCode::Up));
        assert_eq!(panel.current_definition().unwrap().id, "continent");
        assert_eq!(panel.height(), 6);
    }

    #[test]
    fn test_left_right_pass_through_on_single_rows() {
        let mut panel = SettingsPanel::new(fallback_settings().behavioral_settings);
        panel.focus();
        assert!(!panel.handle_event(&key(KeyCode::Right)));
        assert!(panel.current_value().is_none());
    }

    #[test]
    fn test_multi_row_value_cursor() {
        let definitions = vec![
            SettingDefinition::new("language", "Language", &["English", "Spanish"]).multi(),
        ];
        let mut panel = SettingsPanel::new(definitions);
        panel.focus();

        assert_eq!(panel.current_value(), Some("English"));
        assert!(panel.handle_event(&key(KeyCode::Right)));
        assert_eq!(panel.current_value(), Some("Spanish"));
        assert!(panel.handle_event(&key(KeyCode::Right)));
        assert_eq!(panel.current_value(), Some("English"));
    }
}
