use config::{ConfigError, Environment};
use serde::{Deserialize, Serialize};

/// Process-level settings, loaded from `LORAGEO_`-prefixed environment
/// variables. Per-application options arrive separately as JSON
/// [`lorageo_domain::Config`] documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base URI of the geolocation resolver. Tests point this at a local
    /// double.
    #[serde(default = "default_resolver_uri")]
    pub resolver_uri: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_resolver_uri() -> String {
    lorageo_resolver::DEFAULT_RESOLVER_URI.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(Environment::with_prefix("LORAGEO"))
            .build()?
            .try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolver_uri: default_resolver_uri(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_production_resolver() {
        let settings = Settings::default();
        assert_eq!(settings.resolver_uri, "https://gls.loracloud.com");
        assert_eq!(settings.log_level, "info");
    }
}
