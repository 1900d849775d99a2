use std::fmt;
use tracing::{info, warn};

use crate::api::client::CatalogSource;
use crate::api::fallback::{fallback_settings, fallback_specialists};
use crate::consultation::types::{SettingsConfig, Specialist};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Live,
    Fallback,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Live => write!(f, "live"),
            DataSource::Fallback => write!(f, "built-in"),
        }
    }
}

/// Specialists and persona settings loaded once per process
#[derive(Debug, Clone)]
pub struct Catalog {
    pub specialists: Vec<Specialist>,
    pub settings: SettingsConfig,
    pub specialists_source: DataSource,
    pub settings_source: DataSource,
}

impl Catalog {
    /// Fetches both resources concurrently. Never fails: any fetch error is
    /// logged and replaced by the built-in data.
    pub async fn load(source: &dyn CatalogSource) -> Self {
        info!("Loading specialist catalog from {}", source.describe());

        let (specialists, settings) = tokio::join!(
            load_specialists(source),
            load_settings(source),
        );

        Self {
            specialists: specialists.0,
            specialists_source: specialists.1,
            settings: settings.0,
            settings_source: settings.1,
        }
    }

    pub fn builtin() -> Self {
        Self {
            specialists: fallback_specialists(),
            settings: fallback_settings(),
            specialists_source: DataSource::Fallback,
            settings_source: DataSource::Fallback,
        }
    }

    pub fn specialist(&self, id: &str) -> Option<&Specialist> {
        self.specialists.iter().find(|s| s.id == id)
    }

    pub fn uses_fallback(&self) -> bool {
        self.specialists_source == DataSource::Fallback || self.settings_source == DataSource::Fallback
    }
}

pub async fn load_specialists(source: &dyn CatalogSource) -> (Vec<Specialist>, DataSource) {
    match source.fetch_specialists().await {
        Ok(specialists) if !specialists.is_empty() => {
            info!("Loaded {} specialists", specialists.len());
            (dedup_by_id(specialists), DataSource::Live)
        }
        Ok(_) => {
            warn!("Specialist endpoint returned an empty list, using built-in specialists");
            (fallback_specialists(), DataSource::Fallback)
        }
        Err(e) => {
            warn!("Error fetching specialists: {}", e);
            (fallback_specialists(), DataSource::Fallback)
        }
    }
}

pub async fn load_settings(source: &dyn CatalogSource) -> (SettingsConfig, DataSource) {
    match source.fetch_settings().await {
        Ok(settings) if !settings.behavioral_settings.is_empty() => {
            info!("Loaded {} behavioral settings", settings.behavioral_settings.len());
            (settings, DataSource::Live)
        }
        Ok(_) => {
            warn!("Settings endpoint returned no settings, using built-in settings");
            (fallback_settings(), DataSource::Fallback)
        }
        Err(e) => {
            warn!("Error fetching settings: {}", e);
            (fallback_settings(), DataSource::Fallback)
        }
    }
}

/// Specialists are keyed by id; later duplicates are dropped.
fn dedup_by_id(specialists: Vec<Specialist>) -> Vec<Specialist> {
    let mut unique: Vec<Specialist> = Vec::with_capacity(specialists.len());
    for specialist in specialists {
        if unique.iter().any(|s| s.id == specialist.id) {
            warn!("Duplicate specialist id {} ignored", specialist.id);
            continue;
        }
        unique.push(specialist);
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::HttpCatalogSource;
    use crate::consultation::types::SettingDefinition;
    use crate::error::{Error, Result};
    use async_trait::async_trait;
    use std::time::Duration;
    use url::Url;

    struct StubSource {
        specialists: Option<Vec<Specialist>>,
        settings: Option<SettingsConfig>,
    }

    #[async_trait]
    impl CatalogSource for StubSource {
        async fn fetch_specialists(&self) -> Result<Vec<Specialist>> {
            self.specialists.clone().ok_or_else(|| Error::api("Failed to fetch specialists"))
        }

        async fn fetch_settings(&self) -> Result<SettingsConfig> {
            self.settings.clone().ok_or_else(|| Error::api("Failed to fetch settings"))
        }

        fn describe(&self) -> String {
            "stub".to_string()
        }
    }

    #[tokio::test]
    async fn test_failed_settings_fetch_yields_fallback() {
        let source = StubSource {
            specialists: Some(fallback_specialists()),
            settings: None,
        };

        let catalog = Catalog::load(&source).await;
        assert_eq!(catalog.settings, fallback_settings());
        assert_eq!(catalog.settings_source, DataSource::Fallback);
        assert_eq!(catalog.specialists_source, DataSource::Live);
        assert!(catalog.uses_fallback());
    }

    #[tokio::test]
    async fn test_live_data_is_used() {
        let mut specialists = fallback_specialists();
        specialists.truncate(2);
        let settings = SettingsConfig {
            behavioral_settings: vec![SettingDefinition::new("tone", "Tone", &["Warm", "Direct"])],
        };
        let source = StubSource {
            specialists: Some(specialists),
            settings: Some(settings.clone()),
        };

        let catalog = Catalog::load(&source).await;
        assert_eq!(catalog.specialists.len(), 2);
        assert_eq!(catalog.settings, settings);
        assert!(!catalog.uses_fallback());
        assert!(catalog.specialist("cardio").is_some());
    }

    #[tokio::test]
    async fn test_empty_live_payloads_yield_fallback() {
        let empty_settings = SettingsConfig::from_json(serde_json::json!({})).unwrap();
        let source = StubSource {
            specialists: Some(Vec::new()),
            settings: Some(empty_settings),
        };

        let catalog = Catalog::load(&source).await;
        assert_eq!(catalog.settings, fallback_settings());
        assert_eq!(catalog.settings_source, DataSource::Fallback);
        assert_eq!(catalog.specialists, fallback_specialists());
        assert_eq!(catalog.specialists_source, DataSource::Fallback);
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_dropped() {
        let mut specialists = fallback_specialists();
        specialists.push(specialists[0].clone());
        let source = StubSource {
            specialists: Some(specialists),
            settings: None,
        };

        let (loaded, _) = load_specialists(&source).await;
        assert_eq!(loaded.len(), 5);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_yields_fallback() {
        // nothing listens on the discard port
        let base = Url::parse("http://127.0.0.1:9").unwrap();
        let source = HttpCatalogSource::new(base, Duration::from_secs(2)).unwrap();

        let catalog = Catalog::load(&source).await;
        assert_eq!(catalog.specialists, fallback_specialists());
        assert_eq!(catalog.settings, fallback_settings());
        assert_eq!(catalog.specialists_source, DataSource::Fallback);
    }
}
