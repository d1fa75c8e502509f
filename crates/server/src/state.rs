use std::sync::Arc;

use coverscout_core::{Config, CoverFinder, SanitizedConfig, SteamGridDbSource};

/// Shared application state
pub struct AppState {
    config: Config,
    finder: Arc<CoverFinder>,
    griddb: Option<Arc<SteamGridDbSource>>,
}

impl AppState {
    pub fn new(
        config: Config,
        finder: Arc<CoverFinder>,
        griddb: Option<Arc<SteamGridDbSource>>,
    ) -> Self {
        Self {
            config,
            finder,
            griddb,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn finder(&self) -> &CoverFinder {
        &self.finder
    }

    pub fn griddb(&self) -> Option<&Arc<SteamGridDbSource>> {
        self.griddb.as_ref()
    }
}
