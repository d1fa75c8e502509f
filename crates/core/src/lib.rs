pub mod cache;
pub mod config;
pub mod finder;
pub mod matcher;
pub mod picker;
pub mod sources;
pub mod testing;

pub use cache::FetchCache;
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use finder::{AppEntry, CoverFinder, CoverSearchResults};
pub use matcher::TitleMatch;
pub use sources::{
    CoverCandidate, CoverSource, CoverSourceKind, GameDbSource, SourceError, SteamGridDbSource,
    SteamSource,
};
