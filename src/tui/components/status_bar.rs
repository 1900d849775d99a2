use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use personabot::api::DataSource;

use crate::tui::{components::Component, Event, Theme};

#[derive(Clone, Debug, PartialEq)]
pub struct KeyHint {
    pub key: String,
    pub action: String,
}

impl KeyHint {
    pub fn new(key: &str, action: &str) -> Self {
        Self {
            key: key.to_string(),
            action: action.to_string(),
        }
    }
}

pub struct StatusBar {
    status_message: String,
    is_error: bool,
    catalog_source: DataSource,
    key_hints: Vec<KeyHint>,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            status_message: "Ready".to_string(),
            is_error: false,
            catalog_source: DataSource::Live,
            key_hints: Vec::new(),
        }
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = message;
        self.is_error = false;
    }

    pub fn set_error(&mut self, message: String) {
        self.status_message = message;
        self.is_error = true;
    }

    #[cfg(test)]
    pub fn status(&self) -> &str {
        &self.status_message
    }

    pub fn set_catalog_source(&mut self, source: DataSource) {
        self.catalog_source = source;
    }

    pub fn set_key_hints(&mut self, hints: Vec<KeyHint>) {
        self.key_hints = hints;
    }

    fn source_indicator(&self, theme: &Theme) -> (&'static str, Style) {
        match self.catalog_source {
            DataSource::Live => ("●", theme.success()),
            DataSource::Fallback => ("○", theme.warning()),
        }
    }
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let (symbol, symbol_style) = self.source_indicator(theme);
        let source_label = match self.catalog_source {
            DataSource::Live => "Live catalog".to_string(),
            DataSource::Fallback => "Using built-in specialist data".to_string(),
        };

        let mut spans = vec![
            Span::styled(
                self.status_message.as_str(),
                if self.is_error { theme.error() } else { theme.normal() },
            ),
            Span::raw(" | "),
            Span::styled(symbol, symbol_style),
            Span::raw(" "),
            Span::styled(source_label, theme.secondary()),
        ];

        for hint in &self.key_hints {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(hint.key.as_str(), theme.accent()));
            spans.push(Span::raw(": "));
            spans.push(Span::styled(hint.action.as_str(), theme.secondary()));
        }

        spans.push(Span::raw(" | "));
        spans.push(Span::styled("F1: Tutorial", theme.secondary()));
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("Ctrl+Q: Quit", theme.secondary()));

        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::TOP).border_style(theme.border()))
            .alignment(Alignment::Left);

        frame.render_widget(paragraph, area);
    }

    fn handle_event(&mut self, _event: &Event) -> bool {
        false // Status bar doesn't handle events
    }
}
