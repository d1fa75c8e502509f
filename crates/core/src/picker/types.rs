//! File-selection types.

use serde::{Deserialize, Serialize};

/// What a selection call is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    File,
    Directory,
}

impl SelectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionKind::File => "file",
            SelectionKind::Directory => "directory",
        }
    }
}

/// Which backend a picker resolved to at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerBackend {
    Native,
    Embedded,
    Manual,
}

/// One extension filter group for a file dialog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

/// Default filters for picking an app executable.
pub fn executable_filters() -> Vec<FileFilter> {
    vec![
        FileFilter {
            name: "Executables".to_string(),
            extensions: ["exe", "app", "sh", "bat", "cmd"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        },
        FileFilter {
            name: "All files".to_string(),
            extensions: vec!["*".to_string()],
        },
    ]
}

/// Options passed to a dialog backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogOptions {
    pub title: String,
    pub directory: bool,
    pub multiple: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FileFilter>,
}

impl DialogOptions {
    pub fn for_kind(kind: SelectionKind) -> Self {
        match kind {
            SelectionKind::File => Self {
                title: "Select file".to_string(),
                directory: false,
                multiple: false,
                filters: executable_filters(),
            },
            SelectionKind::Directory => Self {
                title: "Select directory".to_string(),
                directory: true,
                multiple: false,
                filters: Vec::new(),
            },
        }
    }
}

/// A file picked through the manual (form-input) backend. The host cannot
/// expose absolute paths, only the file name and a tree-relative path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickedFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_path: Option<String>,
}

/// An application descriptor returned by a directory scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoveredApp {
    pub name: String,
    pub cmd: String,
    #[serde(
        rename = "working-dir",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub working_dir: Option<String>,
    #[serde(
        rename = "image-path",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

/// Host platform, as far as placeholder texts care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    Windows,
    #[default]
    Unix,
}

/// Example path shown in an empty `cmd` or `working-dir` form field.
pub fn placeholder_text(platform: Platform, field: &str) -> &'static str {
    match (platform, field) {
        (Platform::Windows, "cmd") => "C:\\Program Files\\App\\app.exe",
        (Platform::Windows, "working-dir") => "C:\\Program Files\\App",
        (Platform::Unix, "cmd") => "/usr/bin/app",
        (Platform::Unix, "working-dir") => "/usr/bin",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executable_filters_shape() {
        let filters = executable_filters();
        assert_eq!(filters.len(), 2);
        assert!(filters[0].extensions.contains(&"exe".to_string()));
        assert_eq!(filters[1].extensions, vec!["*"]);
    }

    #[test]
    fn test_dialog_options_for_kind() {
        let file = DialogOptions::for_kind(SelectionKind::File);
        assert!(!file.directory);
        assert!(!file.filters.is_empty());

        let dir = DialogOptions::for_kind(SelectionKind::Directory);
        assert!(dir.directory);
        assert!(dir.filters.is_empty());
    }

    #[test]
    fn test_placeholder_text() {
        assert_eq!(placeholder_text(Platform::Unix, "cmd"), "/usr/bin/app");
        assert_eq!(
            placeholder_text(Platform::Windows, "working-dir"),
            "C:\\Program Files\\App"
        );
        assert_eq!(placeholder_text(Platform::Unix, "unknown"), "");
    }

    #[test]
    fn test_discovered_app_serde_field_names() {
        let json = r#"{
            "name": "App",
            "cmd": "/opt/app/run.sh",
            "working-dir": "/opt/app",
            "source_path": "/opt/app/run.sh"
        }"#;
        let app: DiscoveredApp = serde_json::from_str(json).unwrap();
        assert_eq!(app.working_dir.as_deref(), Some("/opt/app"));
        assert_eq!(app.image_path, None);

        let out = serde_json::to_string(&app).unwrap();
        assert!(out.contains("\"working-dir\""));
    }
}
