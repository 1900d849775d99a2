use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error};
use url::Url;

use crate::consultation::types::{SettingsConfig, Specialist};
use crate::error::{Error, Result};

// Relative so a base URL mounted under a prefix keeps it
pub const SPECIALISTS_PATH: &str = "api/specialists";
pub const SETTINGS_PATH: &str = "api/settings";

/// Where the specialist catalog and persona settings come from
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_specialists(&self) -> Result<Vec<Specialist>>;
    async fn fetch_settings(&self) -> Result<SettingsConfig>;
    fn describe(&self) -> String;
}

pub struct HttpCatalogSource {
    client: Client,
    base_url: Url,
}

impl HttpCatalogSource {
    pub fn new(mut base_url: Url, timeout: Duration) -> Result<Self> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path)?;
        debug!("GET {}", url);

        let start_time = Instant::now();
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::api(format!("HTTP request failed: {}", e)))?;

        debug!("{} answered {} in {:?}", url, response.status(), start_time.elapsed());

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Configuration endpoint error: {} - {}", status, error_text);
            return Err(Error::api(format!("API error {}: {}", status, error_text)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::api(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_specialists(&self) -> Result<Vec<Specialist>> {
        self.get_json(SPECIALISTS_PATH).await
    }

    async fn fetch_settings(&self) -> Result<SettingsConfig> {
        let payload: serde_json::Value = self.get_json(SETTINGS_PATH).await?;
        SettingsConfig::from_json(payload)
    }

    fn describe(&self) -> String {
        self.base_url.to_string()
    }
}
