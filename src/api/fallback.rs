//! Built-in catalog used whenever the configuration endpoints are unreachable.

use crate::consultation::types::{SettingDefinition, SettingsConfig, Specialist};

fn specialist(
    id: &str,
    name: &str,
    full_name: &str,
    specialty: &str,
    avatar: &str,
    color: &str,
    description: &str,
) -> Specialist {
    Specialist {
        id: id.to_string(),
        name: name.to_string(),
        full_name: full_name.to_string(),
        specialty: specialty.to_string(),
        avatar: avatar.to_string(),
        color: color.to_string(),
        description: description.to_string(),
    }
}

pub fn fallback_specialists() -> Vec<Specialist> {
    vec![
        specialist(
            "pcp",
            "Patricia",
            "PCP Patricia",
            "Primary Care Physician",
            "https://images.unsplash.com/photo-1559839734-2b71ea197ec2?w=150&h=150&fit=crop&crop=faces",
            "bg-medical-blue",
            "General health assessments, preventive care, and health maintenance",
        ),
        specialist(
            "cardio",
            "Carlos",
            "Cardio Carlos",
            "Cardiologist",
            "https://images.unsplash.com/photo-1612349317150-e413f6a5b16d?w=150&h=150&fit=crop&crop=faces",
            "bg-medical-red",
            "Heart conditions, cardiovascular health, and cardiac interventions",
        ),
        specialist(
            "endo",
            "Emma",
            "Endo Emma",
            "Endocrinologist",
            "https://images.unsplash.com/photo-1594824405077-c7db9639b50d?w=150&h=150&fit=crop&crop=faces",
            "bg-medical-green",
            "Hormone disorders, diabetes, thyroid, and metabolic conditions",
        ),
        specialist(
            "nephro",
            "Nathan",
            "Nephro Nathan",
            "Nephrologist",
            "https://images.unsplash.com/photo-1582750433449-648ed127bb54?w=150&h=150&fit=crop&crop=faces",
            "bg-medical-teal",
            "Kidney diseases, dialysis, and renal transplantation",
        ),
        specialist(
            "pharm",
            "Philip",
            "Pharm Philip",
            "Pharmacist",
            "https://images.unsplash.com/photo-1607990281513-2c110a25bd8c?w=150&h=150&fit=crop&crop=faces",
            "bg-medical-amber",
            "Medication management, drug interactions, and pharmaceutical care",
        ),
    ]
}

pub fn fallback_settings() -> SettingsConfig {
    SettingsConfig {
        behavioral_settings: vec![
            SettingDefinition::new("location", "Hospital Setting", &["City Hospital", "Rural Hospital"]),
            SettingDefinition::new("approach", "Medical Approach", &["Evidence-Based", "Conservative"]),
            SettingDefinition::new("experience", "Experience Level", &["Early Career", "Veteran"]),
            SettingDefinition::new(
                "continent",
                "Geographic Region",
                &["North America", "Europe", "Asia", "South America", "Africa", "Australia"],
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fallback_specialist_ids_are_unique() {
        let specialists = fallback_specialists();
        let ids: HashSet<&str> = specialists.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(specialists.len(), 5);
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_fallback_settings_categories() {
        let config = fallback_settings();
        let categories: Vec<&str> = config.behavioral_settings.iter().map(|d| d.category.as_str()).collect();
        assert_eq!(
            categories,
            vec!["Hospital Setting", "Medical Approach", "Experience Level", "Geographic Region"]
        );
        assert_eq!(config.definition("continent").unwrap().values.len(), 6);
    }
}
