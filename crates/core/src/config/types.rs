//! Configuration types.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    9315
}

/// Settings shared by the cover source adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Per-request timeout for all provider calls.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u32,
    /// Default cap on candidates per adapter search.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub gamedb: GameDbConfig,
    #[serde(default)]
    pub steam: SteamConfig,
    /// Optional; the grid endpoints stay unavailable without it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steamgriddb: Option<SteamGridDbConfig>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_results: default_max_results(),
            proxy: ProxyConfig::default(),
            gamedb: GameDbConfig::default(),
            steam: SteamConfig::default(),
            steamgriddb: None,
        }
    }
}

fn default_timeout_secs() -> u32 {
    30
}

fn default_max_results() -> usize {
    20
}

/// CORS-bypass proxy used when the console runs inside the embedded shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_proxy_prefix")]
    pub prefix: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            prefix: default_proxy_prefix(),
        }
    }
}

fn default_proxy_prefix() -> String {
    "/_proxy/".to_string()
}

/// GameDB title index endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDbConfig {
    #[serde(default = "default_gamedb_base")]
    pub base_url: String,
    #[serde(default = "default_gamedb_image_base")]
    pub image_base_url: String,
}

impl Default for GameDbConfig {
    fn default() -> Self {
        Self {
            base_url: default_gamedb_base(),
            image_base_url: default_gamedb_image_base(),
        }
    }
}

fn default_gamedb_base() -> String {
    "https://lizardbyte.github.io/GameDB".to_string()
}

fn default_gamedb_image_base() -> String {
    "https://images.igdb.com/igdb/image/upload".to_string()
}

/// Steam storefront search and CDN endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteamConfig {
    #[serde(default = "default_steam_store_base")]
    pub store_base_url: String,
    #[serde(default = "default_steam_cdn_base")]
    pub cdn_base_url: String,
    /// `l` query parameter of the store search.
    #[serde(default = "default_steam_language")]
    pub language: String,
    /// `cc` query parameter of the store search.
    #[serde(default = "default_steam_country")]
    pub country: String,
}

impl Default for SteamConfig {
    fn default() -> Self {
        Self {
            store_base_url: default_steam_store_base(),
            cdn_base_url: default_steam_cdn_base(),
            language: default_steam_language(),
            country: default_steam_country(),
        }
    }
}

fn default_steam_store_base() -> String {
    "https://store.steampowered.com".to_string()
}

fn default_steam_cdn_base() -> String {
    "https://cdn.cloudflare.steamstatic.com/steam/apps".to_string()
}

fn default_steam_language() -> String {
    "english".to_string()
}

fn default_steam_country() -> String {
    "US".to_string()
}

/// SteamGridDB endpoints and grid filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteamGridDbConfig {
    #[serde(default = "default_sgdb_base")]
    pub base_url: String,
    /// Bearer token for direct API access. Proxied deployments leave this
    /// unset and let the proxy attach credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_sgdb_dimensions")]
    pub dimensions: String,
    #[serde(default = "default_sgdb_types")]
    pub types: String,
    #[serde(default = "default_sgdb_flag")]
    pub nsfw: String,
    #[serde(default = "default_sgdb_flag")]
    pub humor: String,
    /// How many autocomplete games to expand into grids.
    #[serde(default = "default_sgdb_max_games")]
    pub max_games: usize,
    /// Grids kept per game before the global cap applies.
    #[serde(default = "default_sgdb_per_game")]
    pub per_game_limit: usize,
}

impl Default for SteamGridDbConfig {
    fn default() -> Self {
        Self {
            base_url: default_sgdb_base(),
            api_key: None,
            dimensions: default_sgdb_dimensions(),
            types: default_sgdb_types(),
            nsfw: default_sgdb_flag(),
            humor: default_sgdb_flag(),
            max_games: default_sgdb_max_games(),
            per_game_limit: default_sgdb_per_game(),
        }
    }
}

fn default_sgdb_base() -> String {
    "https://www.steamgriddb.com/api/v2".to_string()
}

fn default_sgdb_dimensions() -> String {
    "600x900".to_string()
}

fn default_sgdb_types() -> String {
    "static".to_string()
}

fn default_sgdb_flag() -> String {
    "false".to_string()
}

fn default_sgdb_max_games() -> usize {
    10
}

fn default_sgdb_per_game() -> usize {
    3
}

/// Config view safe to expose over the API: credentials redacted.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub sources: SanitizedSourcesConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSourcesConfig {
    pub timeout_secs: u32,
    pub max_results: usize,
    pub proxy: ProxyConfig,
    pub gamedb: GameDbConfig,
    pub steam: SteamConfig,
    pub steamgriddb_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            sources: SanitizedSourcesConfig {
                timeout_secs: config.sources.timeout_secs,
                max_results: config.sources.max_results,
                proxy: config.sources.proxy.clone(),
                gamedb: config.sources.gamedb.clone(),
                steam: config.sources.steam.clone(),
                steamgriddb_configured: config.sources.steamgriddb.is_some(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 9315);
        assert_eq!(config.sources.timeout_secs, 30);
        assert_eq!(config.sources.max_results, 20);
        assert!(!config.sources.proxy.enabled);
        assert!(config.sources.steamgriddb.is_none());
        assert!(config.sources.gamedb.base_url.starts_with("https://"));
    }

    #[test]
    fn test_sanitized_config_redacts_api_key() {
        let mut config = Config::default();
        config.sources.steamgriddb = Some(SteamGridDbConfig {
            api_key: Some("secret".to_string()),
            ..Default::default()
        });

        let sanitized = SanitizedConfig::from(&config);
        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"steamgriddb_configured\":true"));
    }
}
