use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::tui::{components::Component, Event, Theme};

#[derive(Debug, Clone)]
pub struct InputBox {
    input: Input,
    is_focused: bool,
    placeholder: String,
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            input: Input::default(),
            is_focused: false,
            placeholder: "Type your message... (Enter: Send)".to_string(),
        }
    }

    pub fn focus(&mut self) {
        self.is_focused = true;
    }

    pub fn unfocus(&mut self) {
        self.is_focused = false;
    }

    pub fn set_placeholder(&mut self, placeholder: String) {
        self.placeholder = placeholder;
    }

    pub fn clear(&mut self) {
        self.input.reset();
    }

    pub fn get_content(&self) -> String {
        self.input.value().to_string()
    }

    #[cfg(test)]
    pub fn set_content(&mut self, content: String) {
        self.input = Input::new(content);
    }

    /// Disables the send action while only whitespace is typed.
    pub fn can_send(&self) -> bool {
        !self.input.value().trim().is_empty()
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let border_style = if self.is_focused {
            theme.accent()
        } else {
            theme.border()
        };

        let title = if self.can_send() {
            " Message (Enter to send) "
        } else {
            " Message "
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title);

        // Calculate available width for text (excluding borders)
        let available_width = area.width.saturating_sub(2) as usize;

        if self.input.value().is_empty() {
            let content = Line::from(Span::styled(&self.placeholder, theme.secondary()));
            let paragraph = Paragraph::new(content).block(block).style(theme.normal());
            frame.render_widget(paragraph, area);
            return;
        }

        let text = self.input.value();
        let cursor_pos = self.input.visual_cursor();

        // Horizontal scroll keeps the cursor visible
        let scroll_offset = if cursor_pos >= available_width {
            cursor_pos.saturating_sub(available_width) + 1
        } else {
            0
        };

        // Slice by chars for UTF-8 safety
        let chars: Vec<char> = text.chars().collect();
        let start = scroll_offset.min(chars.len());
        let end = (start + available_width).min(chars.len());
        let visible_text: String = chars[start..end].iter().collect();

        let cursor_in_view = cursor_pos.saturating_sub(scroll_offset);

        let paragraph = Paragraph::new(Line::from(visible_text))
            .block(block)
            .style(theme.normal());
        frame.render_widget(paragraph, area);

        if self.is_focused {
            let cursor_x = area.x + 1 + cursor_in_view as u16;
            let cursor_y = area.y + 1;
            if cursor_x < area.x + area.width.saturating_sub(1) {
                frame.set_cursor(cursor_x, cursor_y);
            }
        }
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        if !self.is_focused {
            return false;
        }

        match event {
            Event::Key(key) => match key.code {
                KeyCode::Enter | KeyCode::Tab | KeyCode::BackTab | KeyCode::Esc => false, // Let parent handle
                _ => {
                    // Let global hotkeys (Ctrl+N, Ctrl+Q, ...) pass through
                    if key.modifiers.contains(KeyModifiers::CONTROL) || key.modifiers.contains(KeyModifiers::ALT) {
                        false
                    } else {
                        self.input.handle_event(&crossterm::event::Event::Key(*key));
                        true
                    }
                }
            },
            _ => false,
        }
    }
}
