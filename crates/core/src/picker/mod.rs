//! File-selection strategy.
//!
//! One uniform select-file/select-directory contract over three mutually
//! exclusive backends: the native shell dialog, the embedded-shell dialog,
//! and a plain form input for browsers with no shell at all. The backend is
//! chosen once from the host's reported capabilities.
//!
//! Selection never fails with an error: the caller gets `Some(path)` or
//! `None`, and the user hears about problems through the [`Notifier`].

mod traits;
mod types;

pub use traits::{
    BridgeError, DesktopEnvironment, EmbeddedDialog, FileInputHost, Notifier, ShellBridge,
};
pub use types::{
    executable_filters, placeholder_text, DialogOptions, DiscoveredApp, FileFilter, PickedFile,
    PickerBackend, Platform, SelectionKind,
};

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

enum Backend {
    Native(Arc<dyn ShellBridge>),
    Embedded(Arc<dyn EmbeddedDialog>),
    Manual(Arc<dyn FileInputHost>),
}

#[derive(Debug, Clone)]
struct ScratchState {
    field: String,
    kind: SelectionKind,
}

/// Uniform file/directory selection over whichever backend the host offers.
pub struct FilePicker {
    backend: Backend,
    notifier: Arc<dyn Notifier>,
    platform: Platform,
    scratch: Mutex<Option<ScratchState>>,
}

impl FilePicker {
    /// Choose a backend from the host capabilities: native shell dialog
    /// first, then the embedded-shell dialog, then the manual form input.
    pub fn detect(env: &dyn DesktopEnvironment, notifier: Arc<dyn Notifier>) -> Self {
        let backend = if let Some(bridge) = env.shell_bridge() {
            debug!("File picker using native shell dialog");
            Backend::Native(bridge)
        } else if let Some(dialog) = env.embedded_dialog() {
            debug!("File picker using embedded-shell dialog");
            Backend::Embedded(dialog)
        } else {
            debug!("File picker falling back to manual form input");
            Backend::Manual(env.file_input())
        };

        Self {
            backend,
            notifier,
            platform: env.platform(),
            scratch: Mutex::new(None),
        }
    }

    pub fn backend(&self) -> PickerBackend {
        match self.backend {
            Backend::Native(_) => PickerBackend::Native,
            Backend::Embedded(_) => PickerBackend::Embedded,
            Backend::Manual(_) => PickerBackend::Manual,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Example path for an empty form field on this host.
    pub fn placeholder(&self, field: &str) -> &'static str {
        placeholder_text(self.platform, field)
    }

    /// Field and kind of the selection currently in flight, if any.
    pub async fn pending_selection(&self) -> Option<(String, SelectionKind)> {
        self.scratch
            .lock()
            .await
            .as_ref()
            .map(|s| (s.field.clone(), s.kind))
    }

    /// Pick a file for `field`. On success the callback receives the field
    /// name and the chosen path; cancel and failure both yield `None`.
    pub async fn select_file<F>(&self, field: &str, on_pick: F) -> Option<String>
    where
        F: FnOnce(&str, &str),
    {
        self.select(field, SelectionKind::File, on_pick).await
    }

    /// Directory variant of [`select_file`](Self::select_file).
    pub async fn select_directory<F>(&self, field: &str, on_pick: F) -> Option<String>
    where
        F: FnOnce(&str, &str),
    {
        self.select(field, SelectionKind::Directory, on_pick).await
    }

    async fn select<F>(&self, field: &str, kind: SelectionKind, on_pick: F) -> Option<String>
    where
        F: FnOnce(&str, &str),
    {
        *self.scratch.lock().await = Some(ScratchState {
            field: field.to_string(),
            kind,
        });

        let result = match &self.backend {
            Backend::Native(bridge) => self.select_native(bridge.as_ref(), kind).await,
            Backend::Embedded(dialog) => self.select_embedded(dialog.as_ref(), kind).await,
            Backend::Manual(input) => self.select_manual(input.as_ref(), kind).await,
        };

        // Scratch state never survives a selection attempt, whatever the
        // outcome was.
        *self.scratch.lock().await = None;

        if let Some(path) = &result {
            on_pick(field, path);
        }
        result
    }

    async fn select_native(&self, bridge: &dyn ShellBridge, kind: SelectionKind) -> Option<String> {
        match bridge.open_dialog(DialogOptions::for_kind(kind)).await {
            Ok(Some(path)) => {
                self.notifier
                    .success(&format!("Selected {}: {}", kind.as_str(), path));
                Some(path)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(kind = kind.as_str(), error = %e, "Native dialog failed");
                self.notifier.error(&format!(
                    "{} selection failed, enter the path manually",
                    kind.as_str()
                ));
                None
            }
        }
    }

    async fn select_embedded(
        &self,
        dialog: &dyn EmbeddedDialog,
        kind: SelectionKind,
    ) -> Option<String> {
        match dialog.show_open_dialog(DialogOptions::for_kind(kind)).await {
            Ok(paths) => match paths.into_iter().next() {
                Some(path) => {
                    self.notifier
                        .success(&format!("Selected {}: {}", kind.as_str(), path));
                    Some(path)
                }
                None => None,
            },
            Err(e) => {
                warn!(kind = kind.as_str(), error = %e, "Embedded dialog failed");
                self.notifier.error(&format!(
                    "{} selection failed, enter the path manually",
                    kind.as_str()
                ));
                None
            }
        }
    }

    async fn select_manual(&self, input: &dyn FileInputHost, kind: SelectionKind) -> Option<String> {
        let picked = input.pick(kind).await?;

        let path = match kind {
            SelectionKind::File => Some(
                picked
                    .relative_path
                    .clone()
                    .unwrap_or_else(|| picked.name.clone()),
            ),
            SelectionKind::Directory => directory_from_relative_path(&picked),
        };

        match path {
            Some(path) if !path.is_empty() => {
                self.notifier
                    .success(&format!("Selected {}: {}", kind.as_str(), path));
                // A form input never sees the real filesystem, only a
                // tree-relative path.
                self.notifier
                    .info("The selected path may need manual correction");
                Some(path)
            }
            _ => {
                self.notifier.error(&format!(
                    "Could not derive a {} path from the selection",
                    kind.as_str()
                ));
                None
            }
        }
    }
}

/// Directory of a picked file: its relative path minus the last segment.
fn directory_from_relative_path(picked: &PickedFile) -> Option<String> {
    let relative = picked.relative_path.as_deref()?;
    let (dir, _) = relative.rsplit_once('/')?;
    Some(dir.to_string())
}

/// Ask the shell to walk a directory for launchable applications.
pub async fn scan_directory_for_apps(
    bridge: &dyn ShellBridge,
    directory: &str,
    extract_icons: bool,
) -> Result<Vec<DiscoveredApp>, BridgeError> {
    let args = serde_json::json!({
        "directory": directory,
        "extractIcons": extract_icons,
    });
    let value = bridge.invoke("scan_directory_for_apps", args).await?;
    serde_json::from_value(value).map_err(|e| BridgeError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        MockEmbeddedDialog, MockEnvironment, MockFileInput, MockNotifier, MockShellBridge,
    };

    #[tokio::test]
    async fn test_detect_prefers_native_backend() {
        let env = MockEnvironment::new().with_shell_bridge(Arc::new(MockShellBridge::new()));
        let picker = FilePicker::detect(&env, Arc::new(MockNotifier::new()));
        assert_eq!(picker.backend(), PickerBackend::Native);
    }

    #[tokio::test]
    async fn test_detect_falls_back_to_embedded_then_manual() {
        let env = MockEnvironment::new().with_embedded_dialog(Arc::new(MockEmbeddedDialog::new()));
        let picker = FilePicker::detect(&env, Arc::new(MockNotifier::new()));
        assert_eq!(picker.backend(), PickerBackend::Embedded);

        let env = MockEnvironment::new();
        let picker = FilePicker::detect(&env, Arc::new(MockNotifier::new()));
        assert_eq!(picker.backend(), PickerBackend::Manual);
    }

    #[tokio::test]
    async fn test_native_select_file_invokes_callback() {
        let bridge = Arc::new(MockShellBridge::new());
        bridge.set_dialog_result(Some("/opt/app/run.sh")).await;
        let env = MockEnvironment::new().with_shell_bridge(bridge);
        let notifier = Arc::new(MockNotifier::new());
        let picker = FilePicker::detect(&env, notifier.clone());

        let mut callback_args = None;
        let result = picker
            .select_file("cmd", |field, path| {
                callback_args = Some((field.to_string(), path.to_string()));
            })
            .await;

        assert_eq!(result.as_deref(), Some("/opt/app/run.sh"));
        assert_eq!(
            callback_args,
            Some(("cmd".to_string(), "/opt/app/run.sh".to_string()))
        );
        assert_eq!(notifier.successes().len(), 1);
        assert!(picker.pending_selection().await.is_none());
    }

    #[tokio::test]
    async fn test_native_cancel_is_quiet_none() {
        let bridge = Arc::new(MockShellBridge::new());
        bridge.set_dialog_result(None).await;
        let env = MockEnvironment::new().with_shell_bridge(bridge);
        let notifier = Arc::new(MockNotifier::new());
        let picker = FilePicker::detect(&env, notifier.clone());

        let mut called = false;
        let result = picker.select_file("cmd", |_, _| called = true).await;

        assert_eq!(result, None);
        assert!(!called);
        assert!(notifier.successes().is_empty());
        assert!(notifier.errors().is_empty());
        assert!(picker.pending_selection().await.is_none());
    }

    #[tokio::test]
    async fn test_native_failure_notifies_and_returns_none() {
        let bridge = Arc::new(MockShellBridge::new());
        bridge.fail_dialog().await;
        let env = MockEnvironment::new().with_shell_bridge(bridge);
        let notifier = Arc::new(MockNotifier::new());
        let picker = FilePicker::detect(&env, notifier.clone());

        let result = picker.select_directory("working-dir", |_, _| {}).await;
        assert_eq!(result, None);
        assert_eq!(notifier.errors().len(), 1);
        assert!(picker.pending_selection().await.is_none());
    }

    #[tokio::test]
    async fn test_embedded_select_takes_first_path() {
        let dialog = Arc::new(MockEmbeddedDialog::new());
        dialog.set_paths(vec!["/games", "/other"]).await;
        let env = MockEnvironment::new().with_embedded_dialog(dialog);
        let notifier = Arc::new(MockNotifier::new());
        let picker = FilePicker::detect(&env, notifier.clone());

        let result = picker.select_directory("working-dir", |_, _| {}).await;
        assert_eq!(result.as_deref(), Some("/games"));
    }

    #[tokio::test]
    async fn test_manual_file_uses_relative_path_and_warns() {
        let input = Arc::new(MockFileInput::new());
        input
            .set_picked(PickedFile {
                name: "run.sh".to_string(),
                relative_path: Some("app/bin/run.sh".to_string()),
            })
            .await;
        let env = MockEnvironment::new().with_file_input(input);
        let notifier = Arc::new(MockNotifier::new());
        let picker = FilePicker::detect(&env, notifier.clone());

        let result = picker.select_file("cmd", |_, _| {}).await;
        assert_eq!(result.as_deref(), Some("app/bin/run.sh"));
        assert_eq!(notifier.infos().len(), 1);
        assert!(notifier.infos()[0].contains("manual correction"));
    }

    #[tokio::test]
    async fn test_manual_directory_strips_last_segment() {
        let input = Arc::new(MockFileInput::new());
        input
            .set_picked(PickedFile {
                name: "run.sh".to_string(),
                relative_path: Some("app/bin/run.sh".to_string()),
            })
            .await;
        let env = MockEnvironment::new().with_file_input(input);
        let picker = FilePicker::detect(&env, Arc::new(MockNotifier::new()));

        let result = picker.select_directory("working-dir", |_, _| {}).await;
        assert_eq!(result.as_deref(), Some("app/bin"));
    }

    #[tokio::test]
    async fn test_manual_directory_without_relative_path_fails() {
        let input = Arc::new(MockFileInput::new());
        input
            .set_picked(PickedFile {
                name: "run.sh".to_string(),
                relative_path: None,
            })
            .await;
        let env = MockEnvironment::new().with_file_input(input);
        let notifier = Arc::new(MockNotifier::new());
        let picker = FilePicker::detect(&env, notifier.clone());

        let result = picker.select_directory("working-dir", |_, _| {}).await;
        assert_eq!(result, None);
        assert_eq!(notifier.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_scan_directory_for_apps_round_trip() {
        let bridge = MockShellBridge::new();
        bridge
            .set_invoke_result(serde_json::json!([
                {"name": "App", "cmd": "/games/app/run.sh", "working-dir": "/games/app"}
            ]))
            .await;

        let apps = scan_directory_for_apps(&bridge, "/games", true)
            .await
            .unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].name, "App");
        assert_eq!(apps[0].working_dir.as_deref(), Some("/games/app"));

        let calls = bridge.invocations().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "scan_directory_for_apps");
        assert_eq!(calls[0].1["extractIcons"], serde_json::json!(true));
        assert_eq!(calls[0].1["directory"], serde_json::json!("/games"));
    }

    #[test]
    fn test_directory_from_relative_path() {
        let picked = PickedFile {
            name: "a.txt".to_string(),
            relative_path: Some("top/a.txt".to_string()),
        };
        assert_eq!(
            directory_from_relative_path(&picked).as_deref(),
            Some("top")
        );

        let flat = PickedFile {
            name: "a.txt".to_string(),
            relative_path: Some("a.txt".to_string()),
        };
        assert_eq!(directory_from_relative_path(&flat), None);
    }
}
