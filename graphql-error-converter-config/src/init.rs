//! Console tracing setup

use crate::settings::LoggingSettings;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialize console tracing at the configured level
pub fn init_tracing(settings: &LoggingSettings) -> Result<()> {
    init_simple_tracing(&settings.level.to_string())
}

/// Initialize simple tracing for basic console output
pub fn init_simple_tracing(log_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_new(log_level)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Use try_init to avoid panic if global subscriber already set
    if tracing_subscriber::fmt().with_env_filter(env_filter).try_init().is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_initialization_is_harmless() {
        let settings = LoggingSettings::default();
        assert!(init_tracing(&settings).is_ok());
        assert!(init_tracing(&settings).is_ok());
        assert!(init_simple_tracing("not a [valid filter").is_ok());
    }
}
