use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use personabot::consultation::{ChatMessage, Sender};

use crate::tui::{components::Component, Event, Theme};

pub struct ChatView {
    messages: Vec<ChatMessage>,
    is_focused: bool,
    auto_scroll: bool,
    scroll_offset: usize,
    title: String,
    subtitle: String,
    badges: Vec<String>,
    speaker: String,
    speaker_color: String,
}

impl ChatView {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            is_focused: false,
            auto_scroll: true,
            scroll_offset: 0,
            title: "No consultation".to_string(),
            subtitle: String::new(),
            badges: Vec::new(),
            speaker: "Specialist".to_string(),
            speaker_color: String::new(),
        }
    }

    pub fn focus(&mut self) {
        self.is_focused = true;
    }

    pub fn unfocus(&mut self) {
        self.is_focused = false;
    }

    /// Header shown above the transcript: name, specialty line and persona badges.
    pub fn set_header(&mut self, title: String, subtitle: String, badges: Vec<String>) {
        self.title = title;
        self.subtitle = subtitle;
        self.badges = badges;
    }

    pub fn set_speaker(&mut self, speaker: String, color_tag: String) {
        self.speaker = speaker;
        self.speaker_color = color_tag;
    }

    pub fn set_messages(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
        self.scroll_to_bottom();
    }

    pub fn add_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
        if self.auto_scroll {
            self.scroll_to_bottom();
        }
    }

    pub fn clear_messages(&mut self) {
        self.messages.clear();
        self.scroll_offset = 0;
        self.auto_scroll = true;
    }

    #[cfg(test)]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    fn scroll_up(&mut self) {
        if self.scroll_offset > 0 {
            self.scroll_offset -= 1;
            self.auto_scroll = false;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(1);
        // render clamps and re-enables auto scroll at the bottom
        self.auto_scroll = false;
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_offset = usize::MAX; // Will be clamped in render
        self.auto_scroll = true;
    }

    fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
        self.auto_scroll = false;
    }

    fn sender_label(&self, message: &ChatMessage, theme: &Theme) -> (String, Style) {
        match message.sender {
            Sender::User => ("You".to_string(), theme.accent().add_modifier(Modifier::BOLD)),
            Sender::Specialist => (
                self.speaker.clone(),
                Style::default()
                    .fg(theme.specialist_color(&self.speaker_color))
                    .add_modifier(Modifier::BOLD),
            ),
        }
    }

    /// Word wrap by display width; words wider than `width` get their own line.
    pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
        if width < 10 {
            return vec![text.to_string()];
        }

        let mut lines = Vec::new();
        for line in text.lines() {
            if line.width() <= width {
                lines.push(line.to_string());
                continue;
            }

            let mut current_line = String::new();
            for word in line.split_whitespace() {
                if current_line.is_empty() {
                    current_line.push_str(word);
                } else if current_line.width() + 1 + word.width() <= width {
                    current_line.push(' ');
                    current_line.push_str(word);
                } else {
                    lines.push(std::mem::take(&mut current_line));
                    current_line.push_str(word);
                }
            }
            if !current_line.is_empty() {
                lines.push(current_line);
            }
        }

        if lines.is_empty() {
            lines.push(String::new());
        }

        lines
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let mut lines = vec![Line::from(vec![
            Span::styled(&self.title, theme.highlight()),
            Span::raw("  "),
            Span::styled(&self.subtitle, theme.secondary()),
        ])];

        if !self.badges.is_empty() {
            let mut spans = Vec::with_capacity(self.badges.len() * 2);
            for badge in &self.badges {
                spans.push(Span::styled(format!("[{}]", badge), theme.warning()));
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
        }

        let header = Paragraph::new(lines)
            .block(Block::default().borders(Borders::BOTTOM).border_style(theme.border()))
            .wrap(Wrap { trim: true });
        frame.render_widget(header, area);
    }
}

impl Component for ChatView {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let border_style = if self.is_focused {
            theme.accent()
        } else {
            theme.border()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Consultation ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(inner);
        self.render_header(frame, chunks[0], theme);

        let body = chunks[1];
        if self.messages.is_empty() {
            let empty = Paragraph::new("No messages yet.")
                .alignment(Alignment::Center)
                .style(theme.secondary());
            frame.render_widget(empty, body);
            return;
        }

        let content_width = body.width.saturating_sub(2) as usize;
        let content_height = body.height as usize;

        let mut all_lines: Vec<Line> = Vec::new();
        for message in &self.messages {
            let (label, label_style) = self.sender_label(message, theme);
            all_lines.push(Line::from(vec![
                Span::styled(label, label_style),
                Span::raw(" "),
                Span::styled(message.timestamp.format("%H:%M").to_string(), theme.secondary()),
            ]));

            for line in Self::wrap_text(&message.content, content_width) {
                all_lines.push(Line::from(vec![
                    Span::raw("  "), // Indent content
                    Span::styled(line, theme.normal()),
                ]));
            }

            // Separator
            all_lines.push(Line::from(""));
        }

        let total_lines = all_lines.len();
        let max_scroll = total_lines.saturating_sub(content_height);

        if self.auto_scroll || self.scroll_offset >= max_scroll {
            self.scroll_offset = max_scroll;
            self.auto_scroll = true;
        }

        let visible_lines: Vec<Line> = all_lines
            .into_iter()
            .skip(self.scroll_offset)
            .take(content_height)
            .collect();

        frame.render_widget(Paragraph::new(visible_lines), body);
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        if !self.is_focused {
            return false;
        }

        match event {
            Event::Key(KeyEvent { code, .. }) => match code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.scroll_up();
                    true
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.scroll_down();
                    true
                }
                KeyCode::Home | KeyCode::Char('g') => {
                    self.scroll_to_top();
                    true
                }
                KeyCode::End | KeyCode::Char('G') => {
                    self.scroll_to_bottom();
                    true
                }
                KeyCode::PageUp => {
                    for _ in 0..10 {
                        self.scroll_up();
                    }
                    true
                }
                KeyCode::PageDown => {
                    for _ in 0..10 {
                        self.scroll_down();
                    }
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_respects_width() {
        let text = "Based on the symptoms you're describing, there are several possibilities we should consider.";
        let lines = ChatView::wrap_text(text, 20);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.width() <= 20));
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_text_keeps_short_lines() {
        assert_eq!(ChatView::wrap_text("Hello", 40), vec!["Hello".to_string()]);
        assert_eq!(ChatView::wrap_text("", 40), vec![String::new()]);
    }

    #[test]
    fn test_add_message_counts() {
        let mut view = ChatView::new();
        view.set_messages(vec![ChatMessage::specialist("Hello!")]);
        view.add_message(ChatMessage::user("Hi"));
        assert_eq!(view.message_count(), 2);
        view.clear_messages();
        assert_eq!(view.message_count(), 0);
    }
}
