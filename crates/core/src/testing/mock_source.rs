//! Mock cover source for tests.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::sources::{CoverCandidate, CoverSource, CoverSourceKind, SourceError};

/// Scriptable [`CoverSource`] that records its calls.
pub struct MockCoverSource {
    kind: CoverSourceKind,
    results: RwLock<Vec<CoverCandidate>>,
    best_cover: RwLock<String>,
    fail_cancelled: RwLock<bool>,
    fail_names: RwLock<HashSet<String>>,
    delay: RwLock<Option<Duration>>,
    search_calls: RwLock<Vec<String>>,
    clear_calls: RwLock<usize>,
}

impl MockCoverSource {
    pub fn new(kind: CoverSourceKind) -> Self {
        Self {
            kind,
            results: RwLock::new(Vec::new()),
            best_cover: RwLock::new(String::new()),
            fail_cancelled: RwLock::new(false),
            fail_names: RwLock::new(HashSet::new()),
            delay: RwLock::new(None),
            search_calls: RwLock::new(Vec::new()),
            clear_calls: RwLock::new(0),
        }
    }

    /// Candidates every search call returns.
    pub async fn set_results(&self, results: Vec<CoverCandidate>) {
        *self.results.write().await = results;
    }

    /// URL every best-cover call returns.
    pub async fn set_best_cover(&self, url: &str) {
        *self.best_cover.write().await = url.to_string();
    }

    /// Make every call fail with [`SourceError::Cancelled`].
    pub async fn fail_with_cancelled(&self) {
        *self.fail_cancelled.write().await = true;
    }

    /// Make calls for one specific name fail with
    /// [`SourceError::Cancelled`]; other names resolve normally.
    pub async fn fail_for(&self, name: &str) {
        self.fail_names.write().await.insert(name.to_string());
    }

    /// Delay before every call resolves, interruptible by the token.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Names this source was searched for, in call order.
    pub async fn search_calls(&self) -> Vec<String> {
        self.search_calls.read().await.clone()
    }

    pub async fn clear_cache_calls(&self) -> usize {
        *self.clear_calls.read().await
    }

    async fn checkpoint(&self, name: &str, cancel: &CancellationToken) -> Result<(), SourceError> {
        if cancel.is_cancelled() {
            return Err(SourceError::Cancelled);
        }
        if let Some(delay) = *self.delay.read().await {
            tokio::select! {
                _ = cancel.cancelled() => return Err(SourceError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
        if *self.fail_cancelled.read().await || self.fail_names.read().await.contains(name) {
            return Err(SourceError::Cancelled);
        }
        Ok(())
    }
}

#[async_trait]
impl CoverSource for MockCoverSource {
    fn kind(&self) -> CoverSourceKind {
        self.kind
    }

    async fn search(
        &self,
        name: &str,
        cancel: &CancellationToken,
        max_results: usize,
    ) -> Result<Vec<CoverCandidate>, SourceError> {
        self.search_calls.write().await.push(name.to_string());
        self.checkpoint(name, cancel).await?;

        let mut results = self.results.read().await.clone();
        results.truncate(max_results);
        Ok(results)
    }

    async fn best_cover(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<String, SourceError> {
        self.search_calls.write().await.push(name.to_string());
        self.checkpoint(name, cancel).await?;
        Ok(self.best_cover.read().await.clone())
    }

    async fn clear_cache(&self) {
        *self.clear_calls.write().await += 1;
    }
}
