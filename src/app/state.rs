use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::api::{Catalog, CatalogSource};
use crate::app::config::AppConfig;
use crate::consultation::ResponseSimulator;
use crate::error::Result;
use crate::platform::AppPaths;

pub struct AppState {
    config: Arc<RwLock<AppConfig>>,
    paths: AppPaths,
    /// File that `update_config` writes: `--config` when given, else the default
    config_file: PathBuf,
    catalog: Arc<Catalog>,
}

impl AppState {
    pub async fn new(config: AppConfig, paths: AppPaths, source: &dyn CatalogSource) -> Result<Self> {
        info!("Initializing application state");

        let catalog = Catalog::load(source).await;
        if catalog.uses_fallback() {
            info!("Configuration endpoints unavailable, using built-in catalog");
        }

        Ok(Self::with_catalog(config, paths, catalog))
    }

    pub fn with_catalog(config: AppConfig, paths: AppPaths, catalog: Catalog) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            config_file: paths.config_file(),
            paths,
            catalog: Arc::new(catalog),
        }
    }

    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = path.into();
        self
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn get_config(&self) -> AppConfig {
        self.config.read().clone()
    }

    /// Applies `updater` to both the running config and the on-disk file.
    /// The file is re-read first so runtime overrides are not persisted.
    pub async fn update_config<F>(&self, updater: F) -> Result<()>
    where
        F: Fn(&mut AppConfig),
    {
        debug!("Updating application configuration");

        let mut on_disk = AppConfig::read_file(&self.config_file)?;
        updater(&mut on_disk);
        on_disk.validate()?;

        {
            let mut config = self.config.write();
            let mut candidate = config.clone();
            updater(&mut candidate);
            candidate.validate()?;
            *config = candidate;
        }

        on_disk.save_to(&self.config_file).await?;

        info!("Configuration updated and saved to {:?}", self.config_file);
        Ok(())
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.clone()
    }

    pub fn simulator(&self) -> ResponseSimulator {
        ResponseSimulator::new(Duration::from_millis(self.config.read().simulator.reply_delay_ms))
    }

    pub fn get_paths(&self) -> &AppPaths {
        &self.paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_in(dir: &std::path::Path) -> AppState {
        let paths = AppPaths::with_root(dir);
        paths.ensure_dirs_exist().unwrap();
        AppState::with_catalog(AppConfig::default(), paths, Catalog::builtin())
    }

    #[tokio::test]
    async fn test_update_config_persists() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());

        state.update_config(|config| config.ui.theme = "light".to_string()).await.unwrap();
        assert_eq!(state.get_config().ui.theme, "light");

        let reloaded = AppConfig::read_file(&state.get_paths().config_file()).unwrap();
        assert_eq!(reloaded.ui.theme, "light");
    }

    #[tokio::test]
    async fn test_update_config_keeps_runtime_overrides_out_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::with_root(dir.path());
        paths.ensure_dirs_exist().unwrap();
        let mut config = AppConfig::load(&paths).await.unwrap();

        // What --reply-delay-ms and --api-url do at startup
        config.simulator.reply_delay_ms = 0;
        config.api.base_url = "http://cli-override:1".to_string();
        let state = AppState::with_catalog(config, paths, Catalog::builtin());

        state.update_config(|config| config.ui.theme = "light".to_string()).await.unwrap();

        let running = state.get_config();
        assert_eq!(running.ui.theme, "light");
        assert_eq!(running.simulator.reply_delay_ms, 0);

        let reloaded = AppConfig::read_file(state.config_file()).unwrap();
        assert_eq!(reloaded.ui.theme, "light");
        assert_eq!(reloaded.simulator.reply_delay_ms, 1000);
        assert_eq!(reloaded.api.base_url, "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_update_config_writes_explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("custom.toml");
        std::fs::write(&custom, "[simulator]\nreply_delay_ms = 300\n").unwrap();

        let state = state_in(dir.path()).with_config_file(&custom);
        state.update_config(|config| config.ui.theme = "light".to_string()).await.unwrap();

        let reloaded = AppConfig::read_file(&custom).unwrap();
        assert_eq!(reloaded.ui.theme, "light");
        assert_eq!(reloaded.simulator.reply_delay_ms, 300);
        assert!(!state.get_paths().config_file().exists());
    }

    #[tokio::test]
    async fn test_invalid_update_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());

        let result = state.update_config(|config| config.ui.theme = "neon".to_string()).await;
        assert!(result.is_err());
        assert_eq!(state.get_config().ui.theme, "dark");
    }

    #[test]
    fn test_simulator_uses_configured_delay() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());
        assert_eq!(state.simulator().delay(), Duration::from_millis(1000));
    }
}
