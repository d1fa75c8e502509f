//! Cover-art source adapters.
//!
//! One adapter per provider: the GameDB title index, the Steam storefront,
//! and SteamGridDB. Each translates a free-text name into a ranked list of
//! image candidates. Adapters catch and swallow their own network and parse
//! failures, returning an empty list; cancellation is the one error that
//! propagates so callers can tell "no results" from "aborted".

mod gamedb;
mod steam;
mod steamgriddb;
mod types;

pub use gamedb::GameDbSource;
pub use steam::{SteamApp, SteamAppDetails, SteamArt, SteamSource};
pub use steamgriddb::{GridGame, GridImage, SteamGridDbSource};
pub use types::*;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::config::ProxyConfig;

/// Default cap on candidates returned by a single adapter search.
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// A provider of cover-art candidates.
#[async_trait]
pub trait CoverSource: Send + Sync {
    /// Which provider this adapter talks to.
    fn kind(&self) -> CoverSourceKind;

    /// Search for cover candidates matching `name`, strongest match first.
    ///
    /// Returns an empty list for unusable queries and on provider failure;
    /// the only error is `SourceError::Cancelled`.
    async fn search(
        &self,
        name: &str,
        cancel: &CancellationToken,
        max_results: usize,
    ) -> Result<Vec<CoverCandidate>, SourceError>;

    /// Resolve the single best full-resolution cover URL for `name`, or an
    /// empty string when the provider has nothing.
    async fn best_cover(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<String, SourceError>;

    /// Drop all session caches held by this adapter.
    async fn clear_cache(&self);
}

/// Send a GET-style JSON request under a cancellation token.
///
/// `Ok(None)` is a negative result (404); other non-success statuses and
/// parse failures are errors for the caller to absorb or log. Cancelling
/// drops the in-flight request.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    cancel: &CancellationToken,
) -> Result<Option<T>, SourceError> {
    let response = tokio::select! {
        _ = cancel.cancelled() => return Err(SourceError::Cancelled),
        r = request.send() => r?,
    };

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(SourceError::Api {
            status: status.as_u16(),
            message: message.chars().take(200).collect(),
        });
    }

    let body = tokio::select! {
        _ = cancel.cancelled() => return Err(SourceError::Cancelled),
        b = response.json::<T>() => b.map_err(|e| SourceError::Parse(e.to_string()))?,
    };

    Ok(Some(body))
}

/// HEAD-check a URL. Network failures count as "absent" rather than errors;
/// cancellation still propagates.
pub(crate) async fn head_exists(
    client: &reqwest::Client,
    url: &str,
    cancel: &CancellationToken,
) -> Result<bool, SourceError> {
    let response = tokio::select! {
        _ = cancel.cancelled() => return Err(SourceError::Cancelled),
        r = client.head(url).send() => r,
    };

    Ok(response.map(|r| r.status().is_success()).unwrap_or(false))
}

/// Rewrite a provider URL through the CORS-bypass proxy when configured.
///
/// Only the GameDB and SteamGridDB adapters route through the proxy; the
/// storefront assumes a same-origin dev proxy and is never rewritten.
pub(crate) fn apply_proxy(proxy: &ProxyConfig, url: &str) -> String {
    if proxy.enabled {
        format!("{}?url={}", proxy.prefix, urlencoding::encode(url))
    } else {
        url.to_string()
    }
}
