use std::{env, net::SocketAddr, time::Duration};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PLACES_CACHE_SIZE: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub mapbox_access_token: String,
    pub google_places_api_key: String,
    /// Upper bound on every external call.
    pub provider_timeout: Duration,
    /// 0 disables the resolver cache.
    pub places_cache_size: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let bind_addr = parse_or(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR.parse().ok())?;
        let timeout_secs = parse_or(&lookup, "PROVIDER_TIMEOUT_SECS", Some(DEFAULT_TIMEOUT_SECS))?;
        let places_cache_size =
            parse_or(&lookup, "PLACES_CACHE_SIZE", Some(DEFAULT_PLACES_CACHE_SIZE))?;

        Ok(Self {
            bind_addr,
            mapbox_access_token: required("MAPBOX_ACCESS_TOKEN")?,
            google_places_api_key: required("GOOGLE_PLACES_API_KEY")?,
            provider_timeout: Duration::from_secs(timeout_secs),
            places_cache_size,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: Option<T>,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => default.ok_or(ConfigError::Missing(name)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_values_missing() {
        let config = AppConfig::from_lookup(lookup(&[
            ("MAPBOX_ACCESS_TOKEN", "pk.test"),
            ("GOOGLE_PLACES_API_KEY", "g-test"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.provider_timeout, Duration::from_secs(10));
        assert_eq!(config.places_cache_size, 512);
    }

    #[test]
    fn missing_token_is_reported() {
        let err = AppConfig::from_lookup(lookup(&[("GOOGLE_PLACES_API_KEY", "g")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("MAPBOX_ACCESS_TOKEN")));
    }

    #[test]
    fn invalid_number_is_reported() {
        let err = AppConfig::from_lookup(lookup(&[
            ("MAPBOX_ACCESS_TOKEN", "pk"),
            ("GOOGLE_PLACES_API_KEY", "g"),
            ("PROVIDER_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PROVIDER_TIMEOUT_SECS", .. }));
    }
}
