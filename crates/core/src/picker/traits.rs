//! Capability traits for the host environments a picker can run in.
//!
//! The picker never probes for globals at call time; the host hands it a
//! [`DesktopEnvironment`] once at startup and the backend is chosen from
//! whatever capabilities that reports.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::types::{DialogOptions, PickedFile, Platform, SelectionKind};

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Dialog API is not available in this environment")]
    Unavailable,

    #[error("Bridge command failed: {0}")]
    Invoke(String),

    #[error("Failed to parse bridge response: {0}")]
    Parse(String),
}

/// Native desktop-shell bridge: an open-dialog call plus a generic command
/// invoke channel.
#[async_trait]
pub trait ShellBridge: Send + Sync {
    /// Open a native file dialog. `Ok(None)` means the user cancelled.
    async fn open_dialog(&self, options: DialogOptions) -> Result<Option<String>, BridgeError>;

    /// Invoke a named command on the shell side.
    async fn invoke(
        &self,
        command: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, BridgeError>;
}

/// Embedded-shell renderer dialog. Returns the selected paths; empty means
/// cancelled.
#[async_trait]
pub trait EmbeddedDialog: Send + Sync {
    async fn show_open_dialog(&self, options: DialogOptions) -> Result<Vec<String>, BridgeError>;
}

/// Plain form-input host, the fallback when no shell is present. `None`
/// means the user dismissed the input without picking anything.
#[async_trait]
pub trait FileInputHost: Send + Sync {
    async fn pick(&self, kind: SelectionKind) -> Option<PickedFile>;
}

/// Sink for user-facing selection notices.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn info(&self, message: &str);
}

/// What the host environment can do, probed once at startup.
pub trait DesktopEnvironment: Send + Sync {
    fn shell_bridge(&self) -> Option<Arc<dyn ShellBridge>>;
    fn embedded_dialog(&self) -> Option<Arc<dyn EmbeddedDialog>>;
    fn file_input(&self) -> Arc<dyn FileInputHost>;
    fn platform(&self) -> Platform;
}
