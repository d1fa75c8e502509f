//! Steam storefront adapter.
//!
//! Search goes through the store text-search endpoint; cover URLs are
//! deterministic CDN paths derived from the numeric app id, so the fast
//! path needs no per-item network call. The best-cover resolver HEAD-checks
//! the tall library asset and falls back to the header image, memoizing
//! both the existence probe and the final choice.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::FetchCache;
use crate::config::SteamConfig;

use super::{head_exists, send_json, CoverCandidate, CoverSource, CoverSourceKind, SourceError};

/// CDN asset renditions for a Steam app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteamArt {
    Header,
    Header292x136,
    Capsule231x87,
    Capsule616x353,
    Library600x900,
    Library600x9002x,
    LibraryHero,
    LibraryHero2x,
    Logo,
    PageBg,
}

impl SteamArt {
    /// CDN filename for this rendition.
    pub fn filename(&self) -> &'static str {
        match self {
            SteamArt::Header => "header.jpg",
            SteamArt::Header292x136 => "header_292x136.jpg",
            SteamArt::Capsule231x87 => "capsule_231x87.jpg",
            SteamArt::Capsule616x353 => "capsule_616x353.jpg",
            SteamArt::Library600x900 => "library_600x900.jpg",
            SteamArt::Library600x9002x => "library_600x900_2x.jpg",
            SteamArt::LibraryHero => "library_hero.jpg",
            SteamArt::LibraryHero2x => "library_hero_2x.jpg",
            SteamArt::Logo => "logo.png",
            SteamArt::PageBg => "page_bg_generated_v6b.jpg",
        }
    }
}

/// One storefront search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteamApp {
    pub appid: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiny_image: Option<String>,
}

/// Detail record from the appdetails endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteamAppDetails {
    pub name: String,
    #[serde(default, rename = "type")]
    pub app_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default)]
    pub developers: Vec<String>,
    #[serde(default)]
    pub publishers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct StoreSearchResponse {
    #[serde(default)]
    items: Vec<StoreSearchItem>,
}

#[derive(Debug, Deserialize)]
struct StoreSearchItem {
    id: u64,
    #[serde(rename = "type")]
    item_type: String,
    name: String,
    #[serde(default)]
    tiny_image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AppDetailsEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<SteamAppDetails>,
}

/// Adapter for Steam store search plus the static cover CDN.
pub struct SteamSource {
    client: Client,
    config: SteamConfig,
    cover_urls: FetchCache<u64, String>,
    image_exists: FetchCache<String, bool>,
}

impl SteamSource {
    pub fn new(config: SteamConfig, timeout_secs: u32) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            config,
            cover_urls: FetchCache::new(),
            image_exists: FetchCache::new(),
        })
    }

    /// Deterministic CDN URL for an app's art rendition.
    pub fn cover_url(&self, app_id: u64, art: SteamArt) -> String {
        format!(
            "{}/{}/{}",
            self.config.cdn_base_url.trim_end_matches('/'),
            app_id,
            art.filename()
        )
    }

    /// Text-search the storefront, keeping only `app`-type items.
    pub async fn search_apps(
        &self,
        name: &str,
        cancel: &CancellationToken,
        max_results: usize,
    ) -> Result<Vec<SteamApp>, SourceError> {
        if name.trim().is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/api/storesearch/?term={}&l={}&cc={}",
            self.config.store_base_url.trim_end_matches('/'),
            urlencoding::encode(name),
            self.config.language,
            self.config.country
        );
        debug!(name = name, "Steam store search");

        let response: Option<StoreSearchResponse> =
            send_json(self.client.get(&url), cancel).await?;

        let items = response.map(|r| r.items).unwrap_or_default();
        Ok(items
            .into_iter()
            .filter(|item| item.item_type == "app")
            .take(max_results)
            .map(|item| SteamApp {
                appid: item.id,
                name: item.name,
                tiny_image: item.tiny_image,
            })
            .collect())
    }

    /// Detail record for an app, or `None` when the store has nothing.
    pub async fn app_details(
        &self,
        app_id: u64,
        cancel: &CancellationToken,
    ) -> Result<Option<SteamAppDetails>, SourceError> {
        let url = format!(
            "{}/api/appdetails?appids={}&l={}",
            self.config.store_base_url.trim_end_matches('/'),
            app_id,
            self.config.language
        );

        let response: Option<std::collections::HashMap<String, AppDetailsEnvelope>> =
            send_json(self.client.get(&url), cancel).await?;

        Ok(response
            .and_then(|mut map| map.remove(&app_id.to_string()))
            .filter(|envelope| envelope.success)
            .and_then(|envelope| envelope.data))
    }

    /// HEAD-check an image URL, memoizing the outcome per URL. Probe
    /// failures are cached as "absent".
    async fn image_available(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, SourceError> {
        let client = &self.client;
        let probe_url = url.to_string();
        let exists = self
            .image_exists
            .get_or_fetch(url.to_string(), || async move {
                head_exists(client, &probe_url, cancel).await.map(Some)
            })
            .await?;
        Ok(exists.unwrap_or(false))
    }

    /// Best available cover URL for an app: the tall library asset when the
    /// CDN has one, otherwise the header image. Memoized per app id.
    pub async fn best_cover_url(
        &self,
        app_id: u64,
        cancel: &CancellationToken,
    ) -> Result<String, SourceError> {
        let library_url = self.cover_url(app_id, SteamArt::Library600x900);
        let header_url = self.cover_url(app_id, SteamArt::Header);

        let best = self
            .cover_urls
            .get_or_fetch(app_id, || async {
                let url = if self.image_available(&library_url, cancel).await? {
                    library_url
                } else {
                    header_url
                };
                Ok::<_, SourceError>(Some(url))
            })
            .await?;

        // The fetch closure never stores a negative entry.
        Ok(best.unwrap_or_else(|| self.cover_url(app_id, SteamArt::Header)))
    }

    async fn search_inner(
        &self,
        name: &str,
        cancel: &CancellationToken,
        max_results: usize,
    ) -> Result<Vec<CoverCandidate>, SourceError> {
        let apps = self.search_apps(name, cancel, max_results).await?;
        if apps.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = apps.into_iter().map(|app| async move {
            let save_url = self.best_cover_url(app.appid, cancel).await?;
            Ok::<_, SourceError>(CoverCandidate {
                name: app.name,
                key: format!("steam_{}", app.appid),
                source: CoverSourceKind::Steam,
                url: self.cover_url(app.appid, SteamArt::Header),
                save_url,
                score: None,
            })
        });

        futures::future::join_all(candidates)
            .await
            .into_iter()
            .collect()
    }

    /// Search variant that pulls the appdetails record per hit, for callers
    /// that want descriptions alongside the art.
    pub async fn search_with_details(
        &self,
        name: &str,
        cancel: &CancellationToken,
        max_results: usize,
    ) -> Result<Vec<(CoverCandidate, SteamAppDetails)>, SourceError> {
        let apps = match self.search_apps(name, cancel, max_results).await {
            Ok(apps) => apps,
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                warn!(name = name, error = %e, "Steam search failed");
                return Ok(Vec::new());
            }
        };

        let lookups = apps.into_iter().map(|app| async move {
            let details = match self.app_details(app.appid, cancel).await {
                Ok(d) => d,
                Err(e) if e.is_cancelled() => return Err(e),
                Err(_) => None,
            };
            let details = match details {
                Some(d) => d,
                None => return Ok(None),
            };
            let save_url = self.best_cover_url(app.appid, cancel).await?;
            let url = details
                .header_image
                .clone()
                .unwrap_or_else(|| self.cover_url(app.appid, SteamArt::Header));
            Ok(Some((
                CoverCandidate {
                    name: details.name.clone(),
                    key: format!("steam_{}", app.appid),
                    source: CoverSourceKind::Steam,
                    url,
                    save_url,
                    score: None,
                },
                details,
            )))
        });

        let mut results = Vec::new();
        for item in futures::future::join_all(lookups).await {
            if let Some(pair) = item? {
                results.push(pair);
            }
        }
        Ok(results)
    }
}

#[async_trait]
impl CoverSource for SteamSource {
    fn kind(&self) -> CoverSourceKind {
        CoverSourceKind::Steam
    }

    async fn search(
        &self,
        name: &str,
        cancel: &CancellationToken,
        max_results: usize,
    ) -> Result<Vec<CoverCandidate>, SourceError> {
        if name.is_empty() {
            return Ok(Vec::new());
        }

        match self.search_inner(name, cancel, max_results).await {
            Ok(results) => Ok(results),
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                warn!(name = name, error = %e, "Steam search failed");
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
        self.cover_urls.clear().await;
        self.image_exists.clear().await;
    }
}

/// Bounds check for a Steam app id entered by hand.
pub fn is_valid_steam_app_id(app_id: i64) -> bool {
    app_id > 0 && app_id < i32::MAX as i64
}
