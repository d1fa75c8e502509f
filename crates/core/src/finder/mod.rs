//! Cover search aggregation.
//!
//! Fans a query out to the title index and the storefront in parallel and
//! settles both branches before returning. A failed branch contributes an
//! empty list rather than failing the whole search; cancellation is the one
//! condition that rejects the call.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::sources::{CoverCandidate, CoverSource, SourceError};

/// Settled results from both search branches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverSearchResults {
    pub igdb: Vec<CoverCandidate>,
    pub steam: Vec<CoverCandidate>,
}

impl CoverSearchResults {
    pub fn is_empty(&self) -> bool {
        self.igdb.is_empty() && self.steam.is_empty()
    }

    pub fn len(&self) -> usize {
        self.igdb.len() + self.steam.len()
    }
}

/// One entry of an app list to annotate with cover art.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppEntry {
    pub name: String,
    #[serde(
        rename = "image-path",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub image_path: Option<String>,
}

/// Aggregates the title index and the storefront behind one search surface.
pub struct CoverFinder {
    index: Arc<dyn CoverSource>,
    storefront: Arc<dyn CoverSource>,
    max_results: usize,
}

impl CoverFinder {
    pub fn new(
        index: Arc<dyn CoverSource>,
        storefront: Arc<dyn CoverSource>,
        max_results: usize,
    ) -> Self {
        Self {
            index,
            storefront,
            max_results,
        }
    }

    /// Single best full-resolution cover URL for `name`, or an empty string
    /// when neither branch has one. The index wins when both do.
    pub async fn find_best_cover(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<String, SourceError> {
        let (index_url, storefront_url) = tokio::join!(
            self.index.best_cover(name, cancel),
            self.storefront.best_cover(name, cancel),
        );

        let index_url = index_url?;
        let storefront_url = storefront_url?;

        if !index_url.is_empty() {
            return Ok(index_url);
        }
        Ok(storefront_url)
    }

    /// Full candidate lists from both branches. Either branch failing
    /// contributes an empty list; only cancellation rejects the call.
    pub async fn find_all_covers(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<CoverSearchResults, SourceError> {
        let (igdb, steam) = tokio::join!(
            self.index.search(name, cancel, self.max_results),
            self.storefront.search(name, cancel, self.max_results),
        );

        let igdb = settle(igdb, "index")?;
        let steam = settle(steam, "storefront")?;

        debug!(
            name = name,
            igdb = igdb.len(),
            steam = steam.len(),
            "Cover search settled"
        );
        Ok(CoverSearchResults { igdb, steam })
    }

    /// Annotate a list of apps with a best-cover image path where one is
    /// missing. Output order matches input order; an app whose lookup fails
    /// keeps its original entry.
    pub async fn annotate_apps(
        &self,
        apps: Vec<AppEntry>,
        cancel: &CancellationToken,
    ) -> Vec<AppEntry> {
        let lookups = apps.into_iter().map(|app| async move {
            let has_image = app
                .image_path
                .as_ref()
                .is_some_and(|p| !p.trim().is_empty());
            if has_image {
                return app;
            }

            match self.find_best_cover(&app.name, cancel).await {
                Ok(url) if !url.is_empty() => AppEntry {
                    image_path: Some(url),
                    ..app
                },
                Ok(_) => app,
                Err(e) => {
                    warn!(name = %app.name, error = %e, "Cover annotation failed");
                    app
                }
            }
        });

        futures::future::join_all(lookups).await
    }

    /// Drop all session caches held by both branches.
    pub async fn clear_caches(&self) {
        tokio::join!(self.index.clear_cache(), self.storefront.clear_cache());
    }
}

/// One settled branch: cancellation rejects, any other error has already
/// been absorbed into an empty list by the adapter.
fn settle(
    result: Result<Vec<CoverCandidate>, SourceError>,
    branch: &str,
) -> Result<Vec<CoverCandidate>, SourceError> {
    match result {
        Ok(candidates) => Ok(candidates),
        Err(e) if e.is_cancelled() => Err(e),
        Err(e) => {
            warn!(branch = branch, error = %e, "Cover search branch failed");
            Ok(Vec::new())
        }
    }
}
