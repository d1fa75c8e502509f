//! Testing utilities and mock implementations.
//!
//! Mock implementations of the external service traits, so unit and
//! integration tests run without the network or a real desktop shell.
//!
//! # Example
//!
//! ```rust,ignore
//! use coverscout_core::testing::{MockCoverSource, MockNotifier};
//! use coverscout_core::sources::CoverSourceKind;
//!
//! let source = MockCoverSource::new(CoverSourceKind::Igdb);
//! source.set_best_cover("https://example/cover.png").await;
//!
//! // Use in a CoverFinder...
//! ```

mod mock_shell;
mod mock_source;

pub use mock_shell::{
    MockEmbeddedDialog, MockEnvironment, MockFileInput, MockNotifier, MockShellBridge,
};
pub use mock_source::MockCoverSource;
