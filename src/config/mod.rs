use std::env;
use std::fmt;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_UTC_OFFSET_HOURS: i32 = 7;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// Offset applied to zoned date strings before their calendar day is taken.
    pub import_utc_offset_hours: i32,
    /// Lets `M/D/YYYY` strings rejected by the day-first reading fall through
    /// to the month-first rule.
    pub import_month_first_fallback: bool,
    /// Origins allowed to call the API from a browser. Empty allows any.
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has an invalid value: {}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let max_upload_bytes = parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        let import_utc_offset_hours = parse_or(&lookup, "IMPORT_UTC_OFFSET_HOURS", DEFAULT_UTC_OFFSET_HOURS)?;
        if !(-23..=23).contains(&import_utc_offset_hours) {
            return Err(ConfigError::Invalid {
                key: "IMPORT_UTC_OFFSET_HOURS",
                value: import_utc_offset_hours.to_string(),
            });
        }
        let import_month_first_fallback = parse_or(&lookup, "IMPORT_MONTH_FIRST_FALLBACK", false)?;
        let cors_allowed_origins = parse_origins(lookup("CORS_ALLOWED_ORIGINS"))?;

        Ok(Config {
            database_url,
            host,
            port,
            max_upload_bytes,
            import_utc_offset_hours,
            import_month_first_fallback,
            cors_allowed_origins,
        })
    }
}

/// Comma-separated list of `http(s)://host[:port]` origins.
fn parse_origins(raw: Option<String>) -> Result<Vec<String>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            if origin.starts_with("http://") || origin.starts_with("https://") {
                Ok(origin.trim_end_matches('/').to_string())
            } else {
                Err(ConfigError::Invalid {
                    key: "CORS_ALLOWED_ORIGINS",
                    value: origin.to_string(),
                })
            }
        })
        .collect()
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        _ => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/qlns_test".to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            import_utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            import_month_first_fallback: false,
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db/qlns")])).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5000);
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.import_utc_offset_hours, 7);
        assert!(!config.import_month_first_fallback);
        assert!(config.cors_allowed_origins.is_empty());
    }

    #[test]
    fn database_url_is_required() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/qlns"),
            ("PORT", "8080"),
            ("IMPORT_MONTH_FIRST_FALLBACK", "true"),
            ("IMPORT_UTC_OFFSET_HOURS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.import_month_first_fallback);
        assert_eq!(config.import_utc_offset_hours, 0);
    }

    #[test]
    fn cors_origins_are_split_and_checked() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/qlns"),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:3000, https://qlns.example.vn/,"),
        ]))
        .unwrap();
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:3000".to_string(), "https://qlns.example.vn".to_string()]
        );

        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/qlns"),
            ("CORS_ALLOWED_ORIGINS", "*"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "CORS_ALLOWED_ORIGINS", .. }));
    }

    #[test]
    fn malformed_values_are_reported() {
        let err = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db"), ("PORT", "http")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "PORT",
                value: "http".to_string()
            }
        );

        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("IMPORT_UTC_OFFSET_HOURS", "30"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "IMPORT_UTC_OFFSET_HOURS", .. }));
    }
}
