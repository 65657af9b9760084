use std::time::Duration;

use medialog_discovery::service::DiscoverySettings;

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_LANGUAGE: &str = "en-US";
const DEFAULT_GENRE_TTL_SECS: u64 = 24 * 60 * 60;

/// Startup configuration, read once from `MEDIALOG_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind: String,
    pub tmdb_key: Option<String>,
    pub rawg_key: Option<String>,
    pub google_books_key: Option<String>,
    pub language: String,
    pub genre_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Values are trimmed; blank counts as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| {
            lookup(name).and_then(|value| {
                let trimmed = value.trim().to_string();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed)
                }
            })
        };

        let genre_ttl_secs = get("MEDIALOG_GENRE_TTL_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_GENRE_TTL_SECS);

        Self {
            bind: get("MEDIALOG_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            tmdb_key: get("MEDIALOG_TMDB_KEY"),
            rawg_key: get("MEDIALOG_RAWG_KEY"),
            google_books_key: get("MEDIALOG_GOOGLE_BOOKS_KEY"),
            language: get("MEDIALOG_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            genre_ttl: Duration::from_secs(genre_ttl_secs),
        }
    }

    pub fn discovery_settings(&self) -> DiscoverySettings {
        DiscoverySettings {
            genre_ttl: self.genre_ttl,
            language: self.language.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = Config::default();
        assert_eq!(cfg.bind, "0.0.0.0:8080");
        assert_eq!(cfg.language, "en-US");
        assert_eq!(cfg.genre_ttl, Duration::from_secs(86_400));
        assert!(cfg.tmdb_key.is_none());
    }

    #[test]
    fn values_are_trimmed_and_blank_is_unset() {
        let cfg = config(&[
            ("MEDIALOG_TMDB_KEY", "  abc123 "),
            ("MEDIALOG_RAWG_KEY", "   "),
            ("MEDIALOG_LANGUAGE", "fr-FR"),
        ]);
        assert_eq!(cfg.tmdb_key.as_deref(), Some("abc123"));
        assert!(cfg.rawg_key.is_none());
        assert_eq!(cfg.discovery_settings().language, "fr-FR");
    }

    #[test]
    fn bad_ttl_falls_back_to_default() {
        let cfg = config(&[("MEDIALOG_GENRE_TTL_SECS", "soon")]);
        assert_eq!(cfg.genre_ttl, Duration::from_secs(86_400));

        let cfg = config(&[("MEDIALOG_GENRE_TTL_SECS", "600")]);
        assert_eq!(cfg.genre_ttl, Duration::from_secs(600));
    }
}
