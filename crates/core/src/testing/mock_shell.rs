//! Mock desktop-shell capabilities for picker tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::picker::{
    BridgeError, DesktopEnvironment, DialogOptions, EmbeddedDialog, FileInputHost, Notifier,
    PickedFile, Platform, SelectionKind, ShellBridge,
};

/// Scriptable native shell bridge.
pub struct MockShellBridge {
    dialog_result: RwLock<Option<String>>,
    dialog_fails: RwLock<bool>,
    invoke_result: RwLock<serde_json::Value>,
    invocations: RwLock<Vec<(String, serde_json::Value)>>,
}

impl MockShellBridge {
    pub fn new() -> Self {
        Self {
            dialog_result: RwLock::new(None),
            dialog_fails: RwLock::new(false),
            invoke_result: RwLock::new(serde_json::Value::Null),
            invocations: RwLock::new(Vec::new()),
        }
    }

    /// Path the next dialog resolves with; `None` means the user cancels.
    pub async fn set_dialog_result(&self, path: Option<&str>) {
        *self.dialog_result.write().await = path.map(|p| p.to_string());
    }

    pub async fn fail_dialog(&self) {
        *self.dialog_fails.write().await = true;
    }

    pub async fn set_invoke_result(&self, value: serde_json::Value) {
        *self.invoke_result.write().await = value;
    }

    /// Commands invoked so far, with their arguments.
    pub async fn invocations(&self) -> Vec<(String, serde_json::Value)> {
        self.invocations.read().await.clone()
    }
}

impl Default for MockShellBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShellBridge for MockShellBridge {
    async fn open_dialog(&self, _options: DialogOptions) -> Result<Option<String>, BridgeError> {
        if *self.dialog_fails.read().await {
            return Err(BridgeError::Invoke("mock dialog failure".to_string()));
        }
        Ok(self.dialog_result.read().await.clone())
    }

    async fn invoke(
        &self,
        command: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, BridgeError> {
        self.invocations
            .write()
            .await
            .push((command.to_string(), args));
        Ok(self.invoke_result.read().await.clone())
    }
}

/// Scriptable embedded-shell dialog.
pub struct MockEmbeddedDialog {
    paths: RwLock<Vec<String>>,
    fails: RwLock<bool>,
}

impl MockEmbeddedDialog {
    pub fn new() -> Self {
        Self {
            paths: RwLock::new(Vec::new()),
            fails: RwLock::new(false),
        }
    }

    /// Paths the next dialog resolves with; empty means cancelled.
    pub async fn set_paths(&self, paths: Vec<&str>) {
        *self.paths.write().await = paths.into_iter().map(|p| p.to_string()).collect();
    }

    pub async fn fail(&self) {
        *self.fails.write().await = true;
    }
}

impl Default for MockEmbeddedDialog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddedDialog for MockEmbeddedDialog {
    async fn show_open_dialog(&self, _options: DialogOptions) -> Result<Vec<String>, BridgeError> {
        if *self.fails.read().await {
            return Err(BridgeError::Invoke("mock dialog failure".to_string()));
        }
        Ok(self.paths.read().await.clone())
    }
}

/// Scriptable form-input host.
pub struct MockFileInput {
    picked: RwLock<Option<PickedFile>>,
}

impl MockFileInput {
    pub fn new() -> Self {
        Self {
            picked: RwLock::new(None),
        }
    }

    pub async fn set_picked(&self, picked: PickedFile) {
        *self.picked.write().await = Some(picked);
    }
}

impl Default for MockFileInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileInputHost for MockFileInput {
    async fn pick(&self, _kind: SelectionKind) -> Option<PickedFile> {
        self.picked.read().await.clone()
    }
}

/// Notifier that records every message.
pub struct MockNotifier {
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    infos: Mutex<Vec<String>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            successes: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            infos: Mutex::new(Vec::new()),
        }
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for MockNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }
}

/// Host environment assembled from whichever mock capabilities a test needs.
pub struct MockEnvironment {
    shell_bridge: Option<Arc<dyn ShellBridge>>,
    embedded_dialog: Option<Arc<dyn EmbeddedDialog>>,
    file_input: Arc<dyn FileInputHost>,
    platform: Platform,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            shell_bridge: None,
            embedded_dialog: None,
            file_input: Arc::new(MockFileInput::new()),
            platform: Platform::Unix,
        }
    }

    pub fn with_shell_bridge(mut self, bridge: Arc<dyn ShellBridge>) -> Self {
        self.shell_bridge = Some(bridge);
        self
    }

    pub fn with_embedded_dialog(mut self, dialog: Arc<dyn EmbeddedDialog>) -> Self {
        self.embedded_dialog = Some(dialog);
        self
    }

    pub fn with_file_input(mut self, input: Arc<dyn FileInputHost>) -> Self {
        self.file_input = input;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }
}

impl Default for MockEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopEnvironment for MockEnvironment {
    fn shell_bridge(&self) -> Option<Arc<dyn ShellBridge>> {
        self.shell_bridge.clone()
    }

    fn embedded_dialog(&self) -> Option<Arc<dyn EmbeddedDialog>> {
        self.embedded_dialog.clone()
    }

    fn file_input(&self) -> Arc<dyn FileInputHost> {
        self.file_input.clone()
    }

    fn platform(&self) -> Platform {
        self.platform
    }
}
