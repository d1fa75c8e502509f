//! GameDB title-index adapter.
//!
//! The index is a static file tree partitioned by two-character buckets:
//! `{base}/buckets/{bucket}.json` maps game id to a name stub, and
//! `{base}/games/{id}.json` carries the full record including the cover
//! reference. Bucket and game fetches are cached for the session.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::FetchCache;
use crate::config::{GameDbConfig, ProxyConfig};
use crate::matcher;

use super::{
    apply_proxy, send_json, CoverCandidate, CoverSource, CoverSourceKind, SourceError,
};

/// One bucket file: game id -> name stub.
type BucketIndex = HashMap<String, BucketEntry>;

#[derive(Debug, Clone, Deserialize)]
struct BucketEntry {
    name: String,
}

/// Full game record from `{base}/games/{id}.json`.
#[derive(Debug, Clone, Deserialize)]
struct GameRecord {
    id: u64,
    name: String,
    #[serde(default)]
    cover: Option<CoverRef>,
}

#[derive(Debug, Clone, Deserialize)]
struct CoverRef {
    url: String,
}

/// Adapter for the community GameDB title index.
pub struct GameDbSource {
    client: Client,
    config: GameDbConfig,
    proxy: ProxyConfig,
    buckets: FetchCache<String, BucketIndex>,
    games: FetchCache<String, GameRecord>,
}

impl GameDbSource {
    pub fn new(
        config: GameDbConfig,
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
            buckets: FetchCache::new(),
            games: FetchCache::new(),
        })
    }

    fn bucket_url(&self, bucket: &str) -> String {
        let url = format!(
            "{}/buckets/{}.json",
            self.config.base_url.trim_end_matches('/'),
            bucket
        );
        apply_proxy(&self.proxy, &url)
    }

    fn game_url(&self, id: &str) -> String {
        let url = format!(
            "{}/games/{}.json",
            self.config.base_url.trim_end_matches('/'),
            id
        );
        apply_proxy(&self.proxy, &url)
    }

    /// Build an image URL from the hash embedded in a thumbnail URL.
    ///
    /// The hash is the path segment between the last `/` and the last `.`;
    /// thumbnails and full-size renditions share it.
    fn image_url(&self, thumb_url: &str, size: &str, ext: &str) -> Option<String> {
        let hash = image_hash(thumb_url)?;
        Some(format!(
            "{}/{}/{}.{}",
            self.config.image_base_url.trim_end_matches('/'),
            size,
            hash,
            ext
        ))
    }

    /// Fetch a bucket file through the session cache. 404 is a normal
    /// "bucket does not exist" and is negative-cached.
    async fn fetch_bucket(
        &self,
        bucket: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<BucketIndex>, SourceError> {
        let url = self.bucket_url(bucket);
        let client = &self.client;
        self.buckets
            .get_or_fetch(bucket.to_string(), || async move {
                debug!(bucket = bucket, "Fetching GameDB bucket");
                send_json(client.get(&url), cancel).await
            })
            .await
    }

    /// Fetch a game record through the session cache. Failures other than
    /// cancellation degrade to a negative entry for this call only.
    async fn fetch_game(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<GameRecord>, SourceError> {
        let url = self.game_url(id);
        let client = &self.client;
        self.games
            .get_or_fetch(id.to_string(), || async move {
                match send_json(client.get(&url), cancel).await {
                    Ok(record) => Ok(record),
                    Err(e) if e.is_cancelled() => Err(e),
                    Err(e) => {
                        warn!(id = id, error = %e, "GameDB game fetch failed");
                        Ok(None)
                    }
                }
            })
            .await
    }

    /// Score every bucket entry against `name`, best first.
    fn ranked_matches(index: &BucketIndex, name: &str) -> Vec<(String, String, f32)> {
        let mut matches: Vec<(String, String, f32)> = index
            .iter()
            .filter_map(|(id, entry)| {
                let m = matcher::matches(&entry.name, name);
                m.matched.then(|| (id.clone(), entry.name.clone(), m.score))
            })
            .collect();

        matches.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
        matches
    }

    async fn search_inner(
        &self,
        name: &str,
        cancel: &CancellationToken,
        max_results: usize,
    ) -> Result<Vec<CoverCandidate>, SourceError> {
        let bucket = matcher::search_bucket(name);
        let index = match self.fetch_bucket(&bucket, cancel).await? {
            Some(index) => index,
            None => return Ok(Vec::new()),
        };

        let ranked = Self::ranked_matches(&index, name);
        let top: Vec<(String, f32)> = ranked
            .into_iter()
            .take(max_results)
            .map(|(id, _, score)| (id, score))
            .collect();

        // Detail records in parallel, all through the game cache.
        let fetches = top
            .iter()
            .map(|(id, score)| async move { (self.fetch_game(id, cancel).await, *score) });
        let fetched = futures::future::join_all(fetches).await;

        let mut results = Vec::new();
        for (record, score) in fetched {
            let record = match record? {
                Some(r) => r,
                None => continue,
            };
            let thumb = match &record.cover {
                Some(cover) => cover.url.as_str(),
                None => continue,
            };
            let (Some(url), Some(save_url)) = (
                self.image_url(thumb, "t_cover_big", "jpg"),
                self.image_url(thumb, "t_cover_big_2x", "png"),
            ) else {
                continue;
            };
            results.push(CoverCandidate {
                name: record.name.clone(),
                key: format!("igdb_{}", record.id),
                source: CoverSourceKind::Igdb,
                url,
                save_url,
                score: Some(score),
            });
        }

        Ok(results)
    }

    async fn best_cover_inner(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<String, SourceError> {
        let bucket = matcher::search_bucket(name);
        let index = match self.fetch_bucket(&bucket, cancel).await? {
            Some(index) => index,
            None => return Ok(String::new()),
        };

        let best = Self::ranked_matches(&index, name).into_iter().next();
        let (id, _, _) = match best {
            Some(m) => m,
            None => return Ok(String::new()),
        };

        let record = match self.fetch_game(&id, cancel).await? {
            Some(r) => r,
            None => return Ok(String::new()),
        };

        let url = record
            .cover
            .as_ref()
            .and_then(|c| self.image_url(&c.url, "t_cover_big_2x", "png"));

        Ok(url.unwrap_or_default())
    }
}

#[async_trait]
impl CoverSource for GameDbSource {
    fn kind(&self) -> CoverSourceKind {
        CoverSourceKind::Igdb
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
        // The bucket scheme only addresses ASCII; treat anything else as a
        // query with no results.
        if !matcher::has_search_token(name) {
            debug!(name = name, "GameDB search skipped: no usable search token");
            return Ok(Vec::new());
        }

        match self.search_inner(name, cancel, max_results).await {
            Ok(results) => Ok(results),
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                warn!(name = name, error = %e, "GameDB search failed");
                Ok(Vec::new())
            }
        }
    }

    async fn best_cover(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<String, SourceError> {
        if name.is_empty() || !matcher::has_search_token(name) {
            return Ok(String::new());
        }

        match self.best_cover_inner(name, cancel).await {
            Ok(url) => Ok(url),
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                warn!(name = name, error = %e, "GameDB best-cover lookup failed");
                Ok(String::new())
            }
        }
    }

    async fn clear_cache(&self) {
        self.buckets.clear().await;
        self.games.clear().await;
    }
}

/// Path segment between the last `/` and the last `.` of a URL.
fn image_hash(thumb_url: &str) -> Option<&str> {
    let slash = thumb_url.rfind('/')?;
    let dot = thumb_url.rfind('.')?;
    if dot <= slash + 1 {
        return None;
    }
    Some(&thumb_url[slash + 1..dot])
}
