//! Opening message synthesized from the active specialists and persona settings.

use crate::consultation::types::{BehavioralSettings, SettingDefinition, Specialist};

const CLOSING_SINGLE: &str = "I'm here to help with your health concerns. What brings you in today?";
const CLOSING_PANEL: &str = "We're here to help with your health concerns. What brings you in today?";

/// Set settings as `(label, value)` pairs: configuration order first, then
/// unknown ids sorted and labelled by id.
pub fn describe_settings(
    settings: &BehavioralSettings,
    definitions: &[SettingDefinition],
) -> Vec<(String, String)> {
    let mut described: Vec<(String, String)> = definitions
        .iter()
        .filter_map(|definition| {
            settings
                .get(&definition.id)
                .filter(|value| value.is_set())
                .map(|value| (definition.category.clone(), value.display()))
        })
        .collect();

    described.extend(
        settings
            .active()
            .filter(|(id, _)| !definitions.iter().any(|d| d.id == *id))
            .map(|(id, value)| (id.to_string(), value.display())),
    );

    described
}

pub fn synthesize_greeting(
    specialists: &[Specialist],
    settings: &BehavioralSettings,
    definitions: &[SettingDefinition],
) -> String {
    let described = describe_settings(settings, definitions);

    match specialists {
        [] => format!("Hello! {}", CLOSING_SINGLE),
        [specialist] => {
            let mut greeting = format!(
                "Hello! I'm {}, your {}.",
                specialist.full_name,
                specialist.specialty.to_lowercase()
            );
            push_background(&mut greeting, "My background", &described);
            greeting.push(' ');
            greeting.push_str(CLOSING_SINGLE);
            greeting
        }
        panel => {
            let names: Vec<&str> = panel.iter().map(|s| s.full_name.as_str()).collect();
            let specialties: Vec<&str> = panel.iter().map(|s| s.specialty.as_str()).collect();
            let mut greeting = format!(
                "Hello! You're consulting with {} ({}).",
                join_with_and(&names),
                join_with_and(&specialties)
            );
            push_background(&mut greeting, "Our background", &described);
            greeting.push(' ');
            greeting.push_str(CLOSING_PANEL);
            greeting
        }
    }
}

fn push_background(greeting: &mut String, lead: &str, described: &[(String, String)]) {
    if described.is_empty() {
        return;
    }
    let pairs: Vec<String> = described
        .iter()
        .map(|(label, value)| format!("{}: {}", label, value))
        .collect();
    greeting.push_str(&format!(" {}: {}.", lead, pairs.join("; ")));
}

/// "A", "A and B", "A, B and C"
pub fn join_with_and(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
