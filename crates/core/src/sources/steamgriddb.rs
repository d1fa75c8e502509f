//! SteamGridDB adapter.
//!
//! Three endpoints: autocomplete search by name, game lookup by Steam app
//! id, and grids by game id. Responses come wrapped in a `{success, data}`
//! envelope. The Steam-appid-to-game-id mapping is cached for the session;
//! grids themselves are not, since filters vary per call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::FetchCache;
use crate::config::{ProxyConfig, SteamGridDbConfig};

use super::{
    apply_proxy, send_json, CoverCandidate, CoverSource, CoverSourceKind, SourceError,
};

/// A game as returned by the search and lookup endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridGame {
    pub id: u64,
    pub name: String,
}

/// One grid image record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridImage {
    pub id: u64,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<Option<T>, SourceError> {
        if !self.success {
            return Err(SourceError::Parse(
                "SteamGridDB reported success=false".to_string(),
            ));
        }
        Ok(self.data)
    }
}

/// Adapter for the SteamGridDB grid API.
pub struct SteamGridDbSource {
    client: Client,
    config: SteamGridDbConfig,
    proxy: ProxyConfig,
    game_ids: FetchCache<u64, u64>,
}

impl SteamGridDbSource {
    pub fn new(
        config: SteamGridDbConfig,
        proxy: ProxyConfig,
        timeout_secs: u32,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            config,
            proxy,
            game_ids: FetchCache::new(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        apply_proxy(&self.proxy, &url)
    }

    fn request(&self, url: &str) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Autocomplete games by name.
    pub async fn search_games(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<GridGame>, SourceError> {
        let url = self.endpoint(&format!(
            "/search/autocomplete/{}",
            urlencoding::encode(name)
        ));
        debug!(name = name, "SteamGridDB autocomplete");

        let envelope: Option<Envelope<Vec<GridGame>>> =
            send_json(self.request(&url), cancel).await?;

        Ok(envelope
            .map(Envelope::into_data)
            .transpose()?
            .flatten()
            .unwrap_or_default())
    }

    /// Resolve a Steam app id to a SteamGridDB game id. Memoized; a missing
    /// mapping is negative-cached.
    pub async fn game_for_steam_app(
        &self,
        app_id: u64,
        cancel: &CancellationToken,
    ) -> Result<Option<u64>, SourceError> {
        let url = self.endpoint(&format!("/games/steam/{}", app_id));
        self.game_ids
            .get_or_fetch(app_id, || async move {
                let envelope: Option<Envelope<GridGame>> =
                    send_json(self.request(&url), cancel).await?;
                Ok(envelope
                    .map(Envelope::into_data)
                    .transpose()?
                    .flatten()
                    .map(|game| game.id))
            })
            .await
    }

    /// Grids for one game, filtered by the configured dimensions and flags.
    pub async fn grids_for_game(
        &self,
        game_id: u64,
        cancel: &CancellationToken,
    ) -> Result<Vec<GridImage>, SourceError> {
        let url = self.endpoint(&format!(
            "/grids/game/{}?dimensions={}&types={}&nsfw={}&humor={}",
            game_id, self.config.dimensions, self.config.types, self.config.nsfw,
            self.config.humor
        ));

        let envelope: Option<Envelope<Vec<GridImage>>> =
            send_json(self.request(&url), cancel).await?;

        Ok(envelope
            .map(Envelope::into_data)
            .transpose()?
            .flatten()
            .unwrap_or_default())
    }

    /// Grids for a Steam app id, going through the game-id mapping.
    pub async fn grids_for_steam_app(
        &self,
        app_id: u64,
        cancel: &CancellationToken,
    ) -> Result<Vec<GridImage>, SourceError> {
        match self.game_for_steam_app(app_id, cancel).await? {
            Some(game_id) => self.grids_for_game(game_id, cancel).await,
            None => Ok(Vec::new()),
        }
    }

    fn candidate(game: &GridGame, grid: GridImage) -> CoverCandidate {
        CoverCandidate {
            name: game.name.clone(),
            key: format!("sgdb_{}_{}", game.id, grid.id),
            source: CoverSourceKind::SteamGridDb,
            url: grid.thumb.unwrap_or_else(|| grid.url.clone()),
            save_url: grid.url,
            score: None,
        }
    }

    async fn search_inner(
        &self,
        name: &str,
        cancel: &CancellationToken,
        max_results: usize,
    ) -> Result<Vec<CoverCandidate>, SourceError> {
        let games = self.search_games(name, cancel).await?;
        let games: Vec<GridGame> = games.into_iter().take(self.config.max_games).collect();
        if games.is_empty() {
            return Ok(Vec::new());
        }

        let lookups = games.iter().map(|game| async move {
            let grids = self.grids_for_game(game.id, cancel).await?;
            let candidates: Vec<CoverCandidate> = grids
                .into_iter()
                .take(self.config.per_game_limit)
                .map(|grid| Self::candidate(game, grid))
                .collect();
            Ok::<_, SourceError>(candidates)
        });

        let mut results = Vec::new();
        for batch in futures::future::join_all(lookups).await {
            results.extend(batch?);
        }
        results.truncate(max_results);
        Ok(results)
    }
}

#[async_trait]
impl CoverSource for SteamGridDbSource {
    fn kind(&self) -> CoverSourceKind {
        CoverSourceKind::SteamGridDb
    }

    async fn search(
        &self,
        name: &str,
        cancel: &CancellationToken,
        max_results: usize,
    ) -> Result<Vec<CoverCandidate>, SourceError> {
        if name.trim().is_empty() {
            return Ok(Vec::new());
        }

        match self.search_inner(name, cancel, max_results).await {
            Ok(results) => Ok(results),
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                warn!(name = name, error = %e, "SteamGridDB search failed");
                Ok(Vec::new())
            }
        }
    }

    async fn best_cover(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<String, SourceError> {
        match self.search(name, cancel, 1).await {
            Ok(results) => Ok(results
                .into_iter()
                .next()
                .map(|c| c.save_url)
                .unwrap_or_default()),
            Err(e) => Err(e),
        }
    }

    async fn clear_cache(&self) {
        self.game_ids.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SteamGridDbSource {
        SteamGridDbSource::new(SteamGridDbConfig::default(), ProxyConfig::default(), 5).unwrap()
    }

    #[test]
    fn test_endpoint_plain() {
        let source = source();
        assert_eq!(
            source.endpoint("/games/steam/620"),
            "https://www.steamgriddb.com/api/v2/games/steam/620"
        );
    }

    #[test]
    fn test_endpoint_proxied() {
        let proxy = ProxyConfig {
            enabled: true,
            prefix: "/_proxy/".to_string(),
        };
        let source =
            SteamGridDbSource::new(SteamGridDbConfig::default(), proxy, 5).unwrap();
        let url = source.endpoint("/grids/game/7");
        assert!(url.starts_with("/_proxy/?url="));
        assert!(url.contains("grids%2Fgame%2F7"));
    }

    #[test]
    fn test_envelope_success_with_data() {
        let json = r#"{"success": true, "data": [{"id": 7, "name": "Portal 2"}]}"#;
        let envelope: Envelope<Vec<GridGame>> = serde_json::from_str(json).unwrap();
        let games = envelope.into_data().unwrap().unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].name, "Portal 2");
    }

    #[test]
    fn test_envelope_failure_is_error() {
        let json = r#"{"success": false}"#;
        let envelope: Envelope<Vec<GridGame>> = serde_json::from_str(json).unwrap();
        assert!(envelope.into_data().is_err());
    }

    #[test]
    fn test_candidate_prefers_thumb_for_preview() {
        let game = GridGame {
            id: 7,
            name: "Portal 2".to_string(),
        };
        let grid = GridImage {
            id: 42,
            url: "https://cdn/full.png".to_string(),
            thumb: Some("https://cdn/thumb.png".to_string()),
            width: Some(600),
            height: Some(900),
        };
        let candidate = SteamGridDbSource::candidate(&game, grid);
        assert_eq!(candidate.key, "sgdb_7_42");
        assert_eq!(candidate.url, "https://cdn/thumb.png");
        assert_eq!(candidate.save_url, "https://cdn/full.png");
        assert_eq!(candidate.source, CoverSourceKind::SteamGridDb);

        let grid_no_thumb = GridImage {
            id: 43,
            url: "https://cdn/full2.png".to_string(),
            thumb: None,
            width: None,
            height: None,
        };
        let candidate = SteamGridDbSource::candidate(&game, grid_no_thumb);
        assert_eq!(candidate.url, "https://cdn/full2.png");
    }

    #[tokio::test]
    async fn test_empty_name_short_circuits() {
        let source = source();
        let cancel = CancellationToken::new();
        assert!(source.search("", &cancel, 20).await.unwrap().is_empty());
        assert!(source.search("  ", &cancel, 20).await.unwrap().is_empty());
    }
}
