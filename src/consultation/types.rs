use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// A selectable simulated persona with a medical role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specialist {
    pub id: String,
    pub name: String,
    pub full_name: String,
    pub specialty: String,
    pub avatar: String,
    pub color: String,
    pub description: String,
}

/// Value chosen for one behavioural setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Single(String),
    Multiple(Vec<String>),
}

impl SettingValue {
    /// Blank strings and empty lists count as unset.
    pub fn is_set(&self) -> bool {
        match self {
            Self::Single(value) => !value.trim().is_empty(),
            Self::Multiple(values) => values.iter().any(|v| !v.trim().is_empty()),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        match self {
            Self::Single(v) => v == value,
            Self::Multiple(values) => values.iter().any(|v| v == value),
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Single(value) => value.trim().to_string(),
            Self::Multiple(values) => values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

/// Persona-shaping attributes keyed by setting id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BehavioralSettings(BTreeMap<String, SettingValue>);

impl BehavioralSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&SettingValue> {
        self.0.get(id)
    }

    pub fn set(&mut self, id: impl Into<String>, value: impl Into<SettingValue>) {
        self.0.insert(id.into(), value.into());
    }

    pub fn clear(&mut self, id: &str) {
        self.0.remove(id);
    }

    /// Settings that carry a value, in key order.
    pub fn active(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.0
            .iter()
            .filter(|(_, value)| value.is_set())
            .map(|(id, value)| (id.as_str(), value))
    }

    pub fn has_active(&self) -> bool {
        self.active().next().is_some()
    }

    /// Steps a single-value setting through `unset -> values[0] -> ... -> unset`.
    pub fn cycle(&mut self, definition: &SettingDefinition, forward: bool) {
        if definition.values.is_empty() {
            return;
        }

        let current = match self.get(&definition.id) {
            Some(SettingValue::Single(value)) => definition.values.iter().position(|v| v == value),
            _ => None,
        };

        let len = definition.values.len();
        let next = match (current, forward) {
            (None, true) => Some(0),
            (None, false) => Some(len - 1),
            (Some(i), true) if i + 1 < len => Some(i + 1),
            (Some(i), false) if i > 0 => Some(i - 1),
            _ => None,
        };

        match next {
            Some(i) => self.set(definition.id.clone(), definition.values[i].as_str()),
            None => self.clear(&definition.id),
        }
    }

    /// Adds or removes one value of a multi-select setting.
    pub fn toggle_value(&mut self, definition: &SettingDefinition, value: &str) {
        let mut values = match self.get(&definition.id) {
            Some(SettingValue::Multiple(values)) => values.clone(),
            Some(SettingValue::Single(v)) if !v.trim().is_empty() => vec![v.clone()],
            _ => Vec::new(),
        };

        if let Some(pos) = values.iter().position(|v| v == value) {
            values.remove(pos);
        } else {
            values.push(value.to_string());
        }

        if values.is_empty() {
            self.clear(&definition.id);
        } else {
            // keep configuration order regardless of click order
            values.sort_by_key(|v| definition.values.iter().position(|d| d == v).unwrap_or(usize::MAX));
            self.set(definition.id.clone(), values);
        }
    }
}

/// One configurable persona attribute as served by the settings endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingDefinition {
    pub id: String,
    pub category: String,
    pub values: Vec<String>,
    #[serde(default)]
    pub multi: bool,
}

impl SettingDefinition {
    pub fn new(id: &str, category: &str, values: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            category: category.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
            multi: false,
        }
    }

    pub fn multi(mut self) -> Self {
        self.multi = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(rename = "behavioralSettings")]
    pub behavioral_settings: Vec<SettingDefinition>,
}

/// Labels and ordering for the fixed four-category payload shape.
const FIXED_CATEGORIES: [(&str, &str); 4] = [
    ("location", "Hospital Setting"),
    ("approach", "Medical Approach"),
    ("experience", "Experience Level"),
    ("continent", "Geographic Region"),
];

#[derive(Deserialize)]
#[serde(untagged)]
enum SettingsPayload {
    Listed(SettingsConfig),
    Fixed(BTreeMap<String, Vec<String>>),
}

impl SettingsConfig {
    /// Accepts either `{"behavioralSettings": [...]}` or the fixed
    /// `{"location": [...], "approach": [...], ...}` object.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        match serde_json::from_value::<SettingsPayload>(value)? {
            SettingsPayload::Listed(config) => Ok(config),
            SettingsPayload::Fixed(mut categories) => {
                let mut behavioral_settings = Vec::with_capacity(categories.len());
                for (id, label) in FIXED_CATEGORIES {
                    if let Some(values) = categories.remove(id) {
                        behavioral_settings.push(SettingDefinition {
                            id: id.to_string(),
                            category: label.to_string(),
                            values,
                            multi: false,
                        });
                    }
                }
                // anything else keeps its id as label, in key order
                behavioral_settings.extend(categories.into_iter().map(|(id, values)| SettingDefinition {
                    category: id.clone(),
                    id,
                    values,
                    multi: false,
                }));
                Ok(Self { behavioral_settings })
            }
        }
    }

    pub fn definition(&self, id: &str) -> Option<&SettingDefinition> {
        self.behavioral_settings.iter().find(|d| d.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Specialist,
}

/// Represents a single transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            sender,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content)
    }

    pub fn specialist(content: impl Into<String>) -> Self {
        Self::new(Sender::Specialist, content)
    }
}

/// A finished conversation kept for the sidebar history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    /// First entry is the primary specialist
    pub specialist_ids: Vec<String>,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub behavioral_settings: BehavioralSettings,
}

const TITLE_MAX_CHARS: usize = 40;

impl ChatSession {
    /// Titles come from the first user message, falling back to the panel names.
    pub fn title_for(messages: &[ChatMessage], specialists: &[Specialist]) -> String {
        let first_question = messages
            .iter()
            .find(|m| m.sender == Sender::User)
            .map(|m| m.content.trim());

        match first_question {
            Some(text) if text.chars().count() > TITLE_MAX_CHARS => {
                let truncated: String = text.chars().take(TITLE_MAX_CHARS - 3).collect();
                format!("{}...", truncated.trim_end())
            }
            Some(text) => text.to_string(),
            None => {
                let names: Vec<&str> = specialists.iter().map(|s| s.full_name.as_str()).collect();
                format!("Consultation with {}", names.join(", "))
            }
        }
    }

    pub fn primary_specialist_id(&self) -> Option<&str> {
        self.specialist_ids.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn location() -> SettingDefinition {
        SettingDefinition::new("location", "Hospital Setting", &["City Hospital", "Rural Hospital"])
    }

    #[test]
    fn test_specialist_camel_case() {
        let specialist: Specialist = serde_json::from_value(json!({
            "id": "pcp",
            "name": "Patricia",
            "fullName": "PCP Patricia",
            "specialty": "Primary Care Physician",
            "avatar": "https://example.com/p.png",
            "color": "bg-medical-blue",
            "description": "General health"
        }))
        .unwrap();
        assert_eq!(specialist.full_name, "PCP Patricia");
    }

    #[test]
    fn test_blank_values_are_unset() {
        let mut settings = BehavioralSettings::new();
        settings.set("location", "");
        settings.set("approach", "   ");
        settings.set("region", Vec::<String>::new());
        assert!(!settings.has_active());

        settings.set("experience", "Veteran");
        let active: Vec<_> = settings.active().map(|(id, _)| id).collect();
        assert_eq!(active, vec!["experience"]);
    }

    #[test]
    fn test_cycle_wraps_through_unset() {
        let definition = location();
        let mut settings = BehavioralSettings::new();

        settings.cycle(&definition, true);
        assert_eq!(settings.get("location"), Some(&SettingValue::from("City Hospital")));
        settings.cycle(&definition, true);
        assert_eq!(settings.get("location"), Some(&SettingValue::from("Rural Hospital")));
        settings.cycle(&definition, true);
        assert_eq!(settings.get("location"), None);

        settings.cycle(&definition, false);
        assert_eq!(settings.get("location"), Some(&SettingValue::from("Rural Hospital")));
    }

    #[test]
    fn test_toggle_value_keeps_config_order() {
        let definition = SettingDefinition::new("language", "Language", &["English", "Spanish", "French"]).multi();
        let mut settings = BehavioralSettings::new();

        settings.toggle_value(&definition, "French");
        settings.toggle_value(&definition, "English");
        assert_eq!(settings.get("language").unwrap().display(), "English, French");

        settings.toggle_value(&definition, "English");
        settings.toggle_value(&definition, "French");
        assert_eq!(settings.get("language"), None);
    }

    #[test]
    fn test_settings_listed_shape() {
        let config = SettingsConfig::from_json(json!({
            "behavioralSettings": [
                { "id": "location", "category": "Hospital Setting", "values": ["City Hospital"] }
            ]
        }))
        .unwrap();
        assert_eq!(config.behavioral_settings.len(), 1);
        assert!(!config.behavioral_settings[0].multi);
    }

    #[test]
    fn test_settings_fixed_shape() {
        let config = SettingsConfig::from_json(json!({
            "continent": ["Europe", "Asia"],
            "location": ["City Hospital", "Rural Hospital"],
            "mood": ["Calm"]
        }))
        .unwrap();

        let ids: Vec<_> = config.behavioral_settings.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["location", "continent", "mood"]);
        assert_eq!(config.definition("continent").unwrap().category, "Geographic Region");
        assert_eq!(config.definition("mood").unwrap().category, "mood");
    }

    #[test]
    fn test_message_sender_serialization() {
        let message = ChatMessage::user("Hello");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["sender"], "user");
    }

    #[test]
    fn test_session_title() {
        let long = "I have been having chest pain after running for the last few weeks";
        let messages = vec![ChatMessage::specialist("Hello!"), ChatMessage::user(long)];
        let title = ChatSession::title_for(&messages, &[]);
        assert!(title.ends_with("..."));
        assert!(title.chars().count() <= TITLE_MAX_CHARS);

        let title = ChatSession::title_for(&messages[..1], &[]);
        assert!(title.starts_with("Consultation with"));
    }
}
