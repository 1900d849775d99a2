use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};
use std::collections::HashSet;

use personabot::consultation::{SpecialistSelection, Specialist};

use crate::tui::{components::Component, Event, Theme};

/// Specialist cards of the selection screen
pub struct SpecialistList {
    specialists: Vec<Specialist>,
    selected_ids: HashSet<String>,
    start_label: Option<String>,
    state: ListState,
    is_focused: bool,
}

impl SpecialistList {
    pub fn new(specialists: Vec<Specialist>) -> Self {
        let mut state = ListState::default();
        if !specialists.is_empty() {
            state.select(Some(0));
        }

        Self {
            specialists,
            selected_ids: HashSet::new(),
            start_label: None,
            state,
            is_focused: false,
        }
    }

    pub fn focus(&mut self) {
        self.is_focused = true;
    }

    pub fn unfocus(&mut self) {
        self.is_focused = false;
    }

    /// Mirrors the selection so checkmarks and the start caption stay current.
    pub fn sync_selection(&mut self, selection: &SpecialistSelection) {
        self.selected_ids = selection.selected().iter().map(|s| s.id.clone()).collect();
        self.start_label = if selection.is_empty() {
            None
        } else {
            Some(selection.start_label())
        };
    }

    pub fn highlighted(&self) -> Option<&Specialist> {
        self.state.selected().and_then(|i| self.specialists.get(i))
    }

    pub fn next(&mut self) {
        if self.specialists.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.specialists.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.specialists.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.specialists.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }
}

impl Component for SpecialistList {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let border_style = if self.is_focused {
            theme.accent()
        } else {
            theme.border()
        };

        let items: Vec<ListItem> = self
            .specialists
            .iter()
            .map(|specialist| {
                let checked = self.selected_ids.contains(&specialist.id);
                let marker = if checked { "[✓] " } else { "[ ] " };
                let color = Style::default().fg(theme.specialist_color(&specialist.color));

                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(marker, if checked { theme.success() } else { theme.secondary() }),
                        Span::styled("● ", color),
                        Span::styled(specialist.name.clone(), theme.normal().add_modifier(Modifier::BOLD)),
                        Span::raw("  "),
                        Span::styled(specialist.specialty.clone(), theme.accent()),
                    ]),
                    Line::from(Span::styled(format!("      {}", specialist.description), theme.secondary())),
                ])
            })
            .collect();

        let title = match &self.start_label {
            Some(label) => format!(" Choose Your Medical Specialist | Enter: {} ", label),
            None => " Choose Your Medical Specialist | Space: Select ".to_string(),
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(title),
            )
            .highlight_style(theme.selected())
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        if !self.is_focused {
            return false;
        }

        match event {
            Event::Key(KeyEvent { code, .. }) => match code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.previous();
                    true
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.next();
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }
}
