use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use std::collections::HashSet;

use personabot::consultation::{ChatSession, Specialist};

use crate::tui::{components::Component, Event, Theme};

const RECENT_LIMIT: usize = 5;

/// Consultation history of this run, in collapsible per-specialist folders
pub struct Sidebar {
    specialists: Vec<Specialist>,
    history: Vec<ChatSession>,
    current: Vec<Specialist>,
    expanded: HashSet<String>,
    /// Index into `specialists` of the highlighted folder
    cursor: usize,
    is_focused: bool,
}

impl Sidebar {
    pub fn new(specialists: Vec<Specialist>) -> Self {
        Self {
            specialists,
            history: Vec::new(),
            current: Vec::new(),
            expanded: HashSet::new(),
            cursor: 0,
            is_focused: false,
        }
    }

    pub fn focus(&mut self) {
        self.is_focused = true;
    }

    pub fn unfocus(&mut self) {
        self.is_focused = false;
    }

    pub fn is_expanded(&self, specialist_id: &str) -> bool {
        self.expanded.contains(specialist_id)
    }

    /// Opens or closes the highlighted folder.
    pub fn toggle_folder(&mut self) {
        let Some(specialist) = self.specialists.get(self.cursor) else {
            return;
        };
        if !self.expanded.remove(&specialist.id) {
            self.expanded.insert(specialist.id.clone());
        }
    }

    fn move_cursor(&mut self, forward: bool) {
        if self.specialists.is_empty() {
            return;
        }
        let len = self.specialists.len();
        self.cursor = if forward { (self.cursor + 1) % len } else { (self.cursor + len - 1) % len };
    }

    pub fn set_history(&mut self, history: &[ChatSession]) {
        self.history = history.to_vec();
    }

    pub fn set_current(&mut self, current: &[Specialist]) {
        self.current = current.to_vec();
    }

    fn sessions_for(&self, specialist_id: &str) -> impl Iterator<Item = &ChatSession> + '_ {
        let id = specialist_id.to_string();
        self.history
            .iter()
            .filter(move |s| s.specialist_ids.iter().any(|sid| *sid == id))
    }

    pub fn format_time_ago(timestamp: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let diff = now - timestamp;

        if diff < 60 {
            "now".to_string()
        } else if diff < 3600 {
            format!("{}m", diff / 60)
        } else if diff < 86400 {
            format!("{}h", diff / 3600)
        } else {
            format!("{}d", diff / 86400)
        }
    }

    fn truncate(title: &str, max_chars: usize) -> String {
        if title.chars().count() > max_chars {
            let head: String = title.chars().take(max_chars.saturating_sub(3)).collect();
            format!("{}...", head)
        } else {
            title.to_string()
        }
    }

    fn history_items(&self, width: usize, theme: &Theme) -> Vec<ListItem<'static>> {
        let mut items = vec![ListItem::new(Line::from(Span::styled(
            "+ New Consultation (Ctrl+N)",
            theme.highlight(),
        )))];
        items.push(ListItem::new(Line::from("")));

        items.push(ListItem::new(Line::from(vec![
            Span::styled("Recent", theme.accent().add_modifier(Modifier::BOLD)),
            Span::styled(format!(" ({})", self.history.len()), theme.secondary()),
        ])));
        if self.history.is_empty() {
            items.push(ListItem::new(Line::from(Span::styled(
                "  No earlier consultations",
                theme.secondary(),
            ))));
        }
        for session in self.history.iter().rev().take(RECENT_LIMIT) {
            items.push(ListItem::new(Line::from(vec![
                Span::styled(format!("  {}", Self::truncate(&session.title, width.saturating_sub(8))), theme.normal()),
                Span::raw(" "),
                Span::styled(Self::format_time_ago(session.created_at.timestamp()), theme.secondary()),
            ])));
        }
        items.push(ListItem::new(Line::from("")));

        for (index, specialist) in self.specialists.iter().enumerate() {
            let count = self.sessions_for(&specialist.id).count();
            let expanded = self.is_expanded(&specialist.id);
            let name_style = if self.is_focused && index == self.cursor {
                theme.selected()
            } else {
                theme.normal()
            };
            let mut spans = vec![
                Span::styled(if expanded { "▾ " } else { "▸ " }, theme.secondary()),
                Span::styled("● ", Style::default().fg(theme.specialist_color(&specialist.color))),
                Span::styled(specialist.full_name.clone(), name_style),
            ];
            if count > 0 {
                spans.push(Span::styled(format!(" ({})", count), theme.secondary()));
            }
            items.push(ListItem::new(Line::from(spans)));

            if !expanded {
                continue;
            }
            if count == 0 {
                items.push(ListItem::new(Line::from(Span::styled(
                    "    No consultations yet",
                    theme.secondary(),
                ))));
            }
            for session in self.sessions_for(&specialist.id) {
                items.push(ListItem::new(Line::from(Span::styled(
                    format!("    {}", Self::truncate(&session.title, width.saturating_sub(6))),
                    theme.secondary(),
                ))));
            }
        }

        items
    }
}

impl Component for Sidebar {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let footer_height = if self.current.is_empty() { 0 } else { 4 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(footer_height)])
            .split(area);

        let border_style = if self.is_focused {
            theme.accent()
        } else {
            theme.border()
        };
        let list = List::new(self.history_items(area.width as usize, theme)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(" PersonaBot "),
        );
        frame.render_widget(list, chunks[0]);

        if self.current.is_empty() {
            return;
        }

        let names: Vec<&str> = self.current.iter().map(|s| s.full_name.as_str()).collect();
        let specialties: Vec<&str> = self.current.iter().map(|s| s.specialty.as_str()).collect();
        let footer = Paragraph::new(vec![
            Line::from(Span::styled(format!("Currently with {}", names.join(", ")), theme.normal())),
            Line::from(Span::styled(specialties.join(", "), theme.secondary())),
        ])
        .block(Block::default().borders(Borders::ALL).border_style(theme.border()));
        frame.render_widget(footer, chunks[1]);
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        if !self.is_focused {
            return false;
        }

        match event {
            Event::Key(KeyEvent { code, .. }) => match code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_cursor(false);
                    true
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_cursor(true);
                    true
                }
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.toggle_folder();
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
    use personabot::api::fallback_specialists;
    use personabot::consultation::BehavioralSettings;

    fn session(title: &str, ids: &[&str]) -> ChatSession {
        ChatSession {
            id: title.to_string(),
            specialist_ids: ids.iter().map(|s| s.to_string()).collect(),
            title: title.to_string(),
            messages: Vec::new(),
            created_at: chrono::Utc::now(),
            behavioral_settings: BehavioralSettings::new(),
        }
    }

    #[test]
    fn test_sessions_grouped_by_specialist() {
        let mut sidebar = Sidebar::new(fallback_specialists());
        sidebar.set_history(&[
            session("Blood pressure concerns", &["cardio"]),
            session("Diabetes and kidneys", &["endo", "nephro"]),
        ]);

        assert_eq!(sidebar.sessions_for("cardio").count(), 1);
        assert_eq!(sidebar.sessions_for("nephro").count(), 1);
        assert_eq!(sidebar.sessions_for("pcp").count(), 0);
    }

    #[test]
    fn test_folders_expand_and_collapse() {
        use crossterm::event::KeyModifiers;
        let key = |code| Event::Key(KeyEvent::new(code, KeyModifiers::NONE));

        let mut sidebar = Sidebar::new(fallback_specialists());
        assert!(!sidebar.handle_event(&key(KeyCode::Enter)));

        sidebar.focus();
        sidebar.handle_event(&key(KeyCode::Down));
        sidebar.handle_event(&key(KeyCode::Enter));
        assert!(sidebar.is_expanded("cardio"));
        assert!(!sidebar.is_expanded("pcp"));

        sidebar.handle_event(&key(KeyCode::Char(' ')));
        assert!(!sidebar.is_expanded("cardio"));

        sidebar.handle_event(&key(KeyCode::Up));
        sidebar.handle_event(&key(KeyCode::Up));
        sidebar.handle_event(&key(KeyCode::Enter));
        assert!(sidebar.is_expanded("pharm"));
    }

    #[test]
    fn test_truncate_and_time_ago() {
        assert_eq!(Sidebar::truncate("Annual checkup questions", 10), "Annual ...");
        assert_eq!(Sidebar::truncate("Short", 10), "Short");
        assert_eq!(Sidebar::format_time_ago(chrono::Utc::now().timestamp()), "now");
        assert_eq!(Sidebar::format_time_ago(chrono::Utc::now().timestamp() - 7200), "2h");
    }
}
