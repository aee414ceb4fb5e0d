use std::env;

/// Where records are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres { database_url: String, pool_size: u32 },
    Memory,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub session_ttl_hours: i64,
    pub secure_cookies: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in environment variables or .env file")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

impl Settings {
    /// Reads the settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 8080u16)?;

        let storage = match lookup("STORAGE").as_deref().unwrap_or("postgres") {
            "postgres" => StorageBackend::Postgres {
                database_url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
                pool_size: parse_or(&lookup, "DATABASE_POOL_SIZE", 10u32)?,
            },
            "memory" => StorageBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE",
                    value: other.to_string(),
                })
            }
        };

        let session_ttl_hours = parse_or(&lookup, "SESSION_TTL_HOURS", 24 * 14i64)?;
        if session_ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                name: "SESSION_TTL_HOURS",
                value: session_ttl_hours.to_string(),
            });
        }

        Ok(Settings {
            host,
            port,
            storage,
            session_ttl_hours,
            secure_cookies: parse_or(&lookup, "SECURE_COOKIES", false)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            host: "127.0.0.1".to_string(),
            port: 8080,
            storage: StorageBackend::Memory,
            session_ttl_hours: 24 * 14,
            secure_cookies: false,
        }
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn postgres_requires_database_url() {
        let err = settings_from(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn defaults_apply() {
        let settings = settings_from(&[("DATABASE_URL", "postgres://localhost/allo")]).unwrap();
        assert_eq!(settings.bind_address(), "0.0.0.0:8080");
        assert_eq!(settings.session_ttl_hours, 336);
        assert!(!settings.secure_cookies);
        assert_eq!(
            settings.storage,
            StorageBackend::Postgres {
                database_url: "postgres://localhost/allo".to_string(),
                pool_size: 10
            }
        );
    }

    #[test]
    fn memory_storage_needs_no_url() {
        let settings = settings_from(&[("STORAGE", "memory"), ("PORT", "9000")]).unwrap();
        assert_eq!(settings.storage, StorageBackend::Memory);
        assert_eq!(settings.port, 9000);
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = settings_from(&[("STORAGE", "memory"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));

        let err = settings_from(&[("STORAGE", "sqlite")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "STORAGE", .. }));

        let err = settings_from(&[("STORAGE", "memory"), ("SESSION_TTL_HOURS", "0")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "SESSION_TTL_HOURS",
                ..
            }
        ));
    }
}
