use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::info;
use url::Url;

use crate::error::{Error, Result};
use crate::platform::AppPaths;

const ENV_PREFIX: &str = "PERSONABOT";
const MAX_REPLY_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub simulator: SimulatorConfig,
    pub ui: UIConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL; `api/specialists` and `api/settings` resolve under it
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub reply_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UIConfig {
    pub theme: String,
    pub show_tutorial_on_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_logging: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8080".to_string(),
                timeout_seconds: 10,
            },
            simulator: SimulatorConfig {
                reply_delay_ms: 1000,
            },
            ui: UIConfig {
                theme: "dark".to_string(), // dark, light
                show_tutorial_on_start: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_logging: true,
            },
        }
    }
}

impl AppConfig {
    pub async fn load(paths: &AppPaths) -> Result<Self> {
        let config_file = paths.config_file();

        if !config_file.exists() {
            info!("Config file not found, creating default configuration");
            Self::default().save(paths).await?;
        }

        Self::load_from(&config_file)
    }

    /// Layers defaults, the TOML file at `path` and `PERSONABOT__*` environment variables.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_layered(path, Some(ENV_PREFIX))
    }

    /// Defaults overlaid by the TOML file only. This is what gets written back
    /// on update, so environment and CLI overrides never reach the file.
    pub fn read_file(path: &Path) -> Result<Self> {
        Self::load_layered(path, None)
    }

    fn load_layered(path: &Path, env_prefix: Option<&str>) -> Result<Self> {
        info!("Loading configuration from: {:?}", path);

        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            );
        if let Some(prefix) = env_prefix {
            builder = builder.add_source(config::Environment::with_prefix(prefix).separator("__"));
        }

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    pub async fn save(&self, paths: &AppPaths) -> Result<()> {
        self.save_to(&paths.config_file()).await
    }

    pub async fn save_to(&self, config_file: &Path) -> Result<()> {
        info!("Saving configuration to: {:?}", config_file);

        let config_content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(config::ConfigError::Message(e.to_string())))?;

        if let Some(parent) = config_file.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(config_file, config_content).await?;

        info!("Configuration saved successfully");
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.api.base_url)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::validation(format!(
                "API base URL must use http or https, got {}",
                base.scheme()
            )));
        }

        if self.api.timeout_seconds == 0 {
            return Err(Error::validation("API timeout must be at least one second"));
        }

        if self.simulator.reply_delay_ms > MAX_REPLY_DELAY_MS {
            return Err(Error::validation(format!(
                "Reply delay must not exceed {}ms",
                MAX_REPLY_DELAY_MS
            )));
        }

        if !matches!(self.ui.theme.as_str(), "dark" | "light") {
            return Err(Error::validation(format!("Unknown theme: {}", self.ui.theme)));
        }

        Ok(())
    }

    pub fn api_base_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.api.base_url)?)
    }
}
