use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::consultation::greeting::synthesize_greeting;
use crate::consultation::selection::SpecialistSelection;
use crate::consultation::simulator::ReplyMode;
use crate::consultation::transcript::Transcript;
use crate::consultation::types::{
    BehavioralSettings, ChatMessage, ChatSession, Sender, SettingDefinition, SettingValue,
    Specialist,
};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Selection,
    Chat,
}

/// The confirmed specialists driving the chat view, with their transcript
#[derive(Debug, Clone)]
pub struct ActiveConsultation {
    id: String,
    specialists: Vec<Specialist>,
    settings: BehavioralSettings,
    transcript: Transcript,
    created_at: DateTime<Utc>,
}

impl ActiveConsultation {
    fn open(
        specialists: Vec<Specialist>,
        settings: BehavioralSettings,
        definitions: &[SettingDefinition],
    ) -> Self {
        let greeting = synthesize_greeting(&specialists, &settings, definitions);
        Self {
            id: Uuid::new_v4().to_string(),
            specialists,
            settings,
            transcript: Transcript::with_greeting(greeting),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn specialists(&self) -> &[Specialist] {
        &self.specialists
    }

    pub fn primary(&self) -> Option<&Specialist> {
        self.specialists.first()
    }

    /// Settings as they were when the consultation started.
    pub fn settings(&self) -> &BehavioralSettings {
        &self.settings
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn reply_mode(&self) -> ReplyMode {
        ReplyMode::for_panel_size(self.specialists.len())
    }

    /// Display name used in headers: one full name, or the panel size.
    pub fn heading(&self) -> String {
        match self.specialists.as_slice() {
            [only] => only.full_name.clone(),
            panel => format!("Panel of {} specialists", panel.len()),
        }
    }

    pub fn input_placeholder(&self) -> String {
        match self.specialists.as_slice() {
            [only] => format!("Ask {} anything...", only.name),
            _ => "Ask your specialists anything...".to_string(),
        }
    }

    fn into_session(self) -> ChatSession {
        let title = ChatSession::title_for(self.transcript.messages(), &self.specialists);
        ChatSession {
            id: self.id,
            specialist_ids: self.specialists.into_iter().map(|s| s.id).collect(),
            title,
            messages: self.transcript.into_messages(),
            created_at: self.created_at,
            behavioral_settings: self.settings,
        }
    }
}

/// Selection, persona settings and the active consultation of one run
#[derive(Debug, Default)]
pub struct ConsultationState {
    selection: SpecialistSelection,
    settings: BehavioralSettings,
    active: Option<ActiveConsultation>,
    history: Vec<ChatSession>,
}

impl ConsultationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        if self.active.is_some() {
            View::Chat
        } else {
            View::Selection
        }
    }

    pub fn selection(&self) -> &SpecialistSelection {
        &self.selection
    }

    pub fn toggle_specialist(&mut self, specialist: &Specialist) -> bool {
        let selected = self.selection.toggle(specialist);
        debug!("Specialist {} selected: {}", specialist.id, selected);
        selected
    }

    pub fn settings(&self) -> &BehavioralSettings {
        &self.settings
    }

    pub fn set_setting(&mut self, id: &str, value: impl Into<SettingValue>) {
        self.settings.set(id, value);
    }

    pub fn clear_setting(&mut self, id: &str) {
        debug!("Clearing setting {}", id);
        self.settings.clear(id);
    }

    /// Steps a single-value setting through its values, with "unset" between
    /// the last and the first.
    pub fn cycle_setting(&mut self, definition: &SettingDefinition, forward: bool) {
        self.settings.cycle(definition, forward);
    }

    pub fn toggle_setting_value(&mut self, definition: &SettingDefinition, value: &str) {
        self.settings.toggle_value(definition, value);
    }

    pub fn active(&self) -> Option<&ActiveConsultation> {
        self.active.as_ref()
    }

    /// Ended consultations of this run, oldest first.
    pub fn history(&self) -> &[ChatSession] {
        &self.history
    }

    /// Copies the selection into a new active consultation. Does nothing and
    /// returns `None` while the selection is empty.
    pub fn start_consultation(&mut self, definitions: &[SettingDefinition]) -> Option<&ActiveConsultation> {
        if self.selection.is_empty() {
            debug!("Ignoring start request with empty selection");
            return None;
        }

        let consultation = ActiveConsultation::open(
            self.selection.selected().to_vec(),
            self.settings.clone(),
            definitions,
        );
        info!(
            "Starting consultation {} with {} specialist(s){}",
            consultation.id,
            consultation.specialists.len(),
            if self.settings.has_active() { " and persona settings" } else { "" }
        );

        self.active = Some(consultation);
        self.active.as_ref()
    }

    /// Appends a user message. Blank input is ignored with `Ok(None)`; the
    /// caller keeps its input buffer in that case.
    pub fn send_message(&mut self, input: &str) -> Result<Option<ChatMessage>> {
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| Error::consultation("No active consultation"))?;

        if input.trim().is_empty() {
            return Ok(None);
        }

        let message = ChatMessage::user(input);
        active.transcript.push(message.clone());
        debug!("User message appended to consultation {}", active.id);
        Ok(Some(message))
    }

    /// Appends a simulated reply if `consultation_id` is still the active one.
    pub fn receive_reply(&mut self, consultation_id: &str, content: String) -> bool {
        match self.active.as_mut() {
            Some(active) if active.id == consultation_id => {
                active.transcript.push(ChatMessage::specialist(content));
                true
            }
            _ => {
                debug!("Dropping reply for ended consultation {}", consultation_id);
                false
            }
        }
    }

    /// Ends the active consultation and clears the selection. Persona
    /// settings survive so the next consultation starts from them.
    pub fn new_chat(&mut self) {
        if let Some(active) = self.active.take() {
            info!(
                "Ending consultation {} after {} user message(s)",
                active.id,
                active.transcript.count_from(Sender::User)
            );
            self.history.push(active.into_session());
        }
        self.selection.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fallback::{fallback_settings, fallback_specialists};
    use crate::consultation::simulator::{ResponseSimulator, SINGLE_SPECIALIST_REPLIES, PANEL_REPLIES};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn definitions() -> Vec<SettingDefinition> {
        fallback_settings().behavioral_settings
    }

    #[test]
    fn test_empty_selection_stays_on_selection_view() {
        let mut state = ConsultationState::new();
        assert!(state.start_consultation(&definitions()).is_none());
        assert_eq!(state.view(), View::Selection);
    }

    #[test]
    fn test_start_copies_selection_in_order() {
        let specialists = fallback_specialists();
        let mut state = ConsultationState::new();
        state.toggle_specialist(&specialists[2]);
        state.toggle_specialist(&specialists[0]);

        let active = state.start_consultation(&definitions()).unwrap();
        let ids: Vec<&str> = active.specialists().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["endo", "pcp"]);
        assert_eq!(active.reply_mode(), ReplyMode::Panel);
        assert_eq!(state.view(), View::Chat);
    }

    #[test]
    fn test_transcript_opens_with_one_specialist_greeting() {
        let specialists = fallback_specialists();
        let mut state = ConsultationState::new();
        state.toggle_specialist(&specialists[4]);
        state.set_setting("experience", "Early Career");

        let active = state.start_consultation(&definitions()).unwrap();
        let messages = active.transcript().messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, Sender::Specialist);
        assert!(messages[0].content.contains("Pharm Philip"));
        assert!(messages[0].content.contains("Experience Level: Early Career"));
    }

    #[test]
    fn test_blank_message_is_ignored() {
        let specialists = fallback_specialists();
        let mut state = ConsultationState::new();
        state.toggle_specialist(&specialists[0]);
        state.start_consultation(&definitions());

        assert!(state.send_message("   \t ").unwrap().is_none());
        assert_eq!(state.active().unwrap().transcript().messages().len(), 1);
    }

    #[test]
    fn test_send_without_consultation_is_an_error() {
        let mut state = ConsultationState::new();
        assert!(state.send_message("Hello").is_err());
    }

    #[test]
    fn test_stale_reply_is_dropped() {
        let specialists = fallback_specialists();
        let mut state = ConsultationState::new();
        state.toggle_specialist(&specialists[0]);
        let old_id = state.start_consultation(&definitions()).unwrap().id().to_string();

        state.new_chat();
        state.toggle_specialist(&specialists[1]);
        state.start_consultation(&definitions());

        assert!(!state.receive_reply(&old_id, "late".to_string()));
        assert_eq!(state.active().unwrap().transcript().messages().len(), 1);
    }

    #[test]
    fn test_new_chat_clears_selection_and_keeps_settings() {
        let specialists = fallback_specialists();
        let mut state = ConsultationState::new();
        state.toggle_specialist(&specialists[0]);
        state.set_setting("continent", "Asia");
        state.start_consultation(&definitions());
        state.send_message("My back hurts").unwrap();

        state.new_chat();

        assert_eq!(state.view(), View::Selection);
        assert!(state.selection().is_empty());
        assert_eq!(state.settings().get("continent").unwrap().display(), "Asia");
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.history()[0].title, "My back hurts");
        assert_eq!(state.history()[0].primary_specialist_id(), Some("pcp"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hello_gets_exactly_one_reply_within_delay() {
        let specialists = fallback_specialists();
        let mut state = ConsultationState::new();
        state.toggle_specialist(&specialists[1]);
        let consultation_id = state.start_consultation(&definitions()).unwrap().id().to_string();

        let sent = state.send_message("Hello").unwrap().unwrap();
        assert_eq!(sent.content, "Hello");
        assert_eq!(sent.sender, Sender::User);
        assert_eq!(state.active().unwrap().transcript().messages().len(), 2);

        let simulator = ResponseSimulator::new(Duration::from_millis(1000));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mode = state.active().unwrap().reply_mode();
        simulator.schedule(mode, move |reply| {
            let _ = tx.send((consultation_id, reply));
        });

        while let Some((id, reply)) = rx.recv().await {
            assert!(state.receive_reply(&id, reply));
        }

        let transcript = state.active().unwrap().transcript();
        assert_eq!(transcript.messages().len(), 3);
        let last = transcript.last().unwrap();
        assert_eq!(last.sender, Sender::Specialist);
        assert!(SINGLE_SPECIALIST_REPLIES.contains(&last.content.as_str()));
        assert!(!PANEL_REPLIES.contains(&last.content.as_str()));
    }
}
