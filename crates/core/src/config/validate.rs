use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Source timeout and result caps are non-zero
/// - SteamGridDB grid filters look like the API expects
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.sources.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "sources.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.sources.max_results == 0 {
        return Err(ConfigError::ValidationError(
            "sources.max_results cannot be 0".to_string(),
        ));
    }

    if config.sources.proxy.enabled && config.sources.proxy.prefix.is_empty() {
        return Err(ConfigError::ValidationError(
            "sources.proxy.prefix cannot be empty when the proxy is enabled".to_string(),
        ));
    }

    if let Some(sgdb) = &config.sources.steamgriddb {
        if sgdb.max_games == 0 || sgdb.per_game_limit == 0 {
            return Err(ConfigError::ValidationError(
                "sources.steamgriddb.max_games and per_game_limit cannot be 0".to_string(),
            ));
        }
        // Dimensions are WIDTHxHEIGHT pairs, comma separated.
        for dim in sgdb.dimensions.split(',') {
            let mut parts = dim.split('x');
            let ok = parts.next().is_some_and(|w| w.parse::<u32>().is_ok())
                && parts.next().is_some_and(|h| h.parse::<u32>().is_ok())
                && parts.next().is_none();
            if !ok {
                return Err(ConfigError::ValidationError(format!(
                    "sources.steamgriddb.dimensions entry '{}' is not WIDTHxHEIGHT",
                    dim
                )));
            }
        }
    }

    Ok(())
}
