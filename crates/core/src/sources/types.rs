//! Types shared by the cover source adapters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which provider produced a candidate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CoverSourceKind {
    Igdb,
    Steam,
    #[serde(rename = "steamgriddb")]
    SteamGridDb,
}

impl CoverSourceKind {
    /// Stable lowercase name, also used as the candidate key prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverSourceKind::Igdb => "igdb",
            CoverSourceKind::Steam => "steam",
            CoverSourceKind::SteamGridDb => "steamgriddb",
        }
    }
}

impl std::fmt::Display for CoverSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One retrievable cover-art option.
///
/// Immutable once constructed; the aggregator only filters and reorders
/// candidates, never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverCandidate {
    /// Title as reported by the provider.
    pub name: String,
    /// Source-prefixed unique id, e.g. `igdb_1905` or `sgdb_312_9984`.
    pub key: String,
    /// Provider that produced this candidate.
    pub source: CoverSourceKind,
    /// Preview-resolution image URL.
    pub url: String,
    /// Full-resolution image URL used when the user saves the cover.
    #[serde(rename = "saveUrl")]
    pub save_url: String,
    /// Match score against the search term, when the provider ranks by one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// Errors from the cover source adapters.
///
/// Only `Cancelled` crosses the public adapter surface; everything else is
/// caught inside the adapters and degrades to an empty result.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The caller's cancellation token fired.
    #[error("Search cancelled")]
    Cancelled,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not parse.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl SourceError {
    /// Whether this error must propagate to the caller instead of being
    /// absorbed into an empty result.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SourceError::Cancelled)
    }
}
