use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub redis: RedisConfig,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Whether the raw cache dump endpoint is served. It exposes cached
    /// answers and embeddings verbatim, so it stays off unless an operator
    /// explicitly turns it on.
    pub expose_dump: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Backing store connection settings. An absent host is a valid state: the
/// cache runs disabled and the service keeps working without it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub host: Option<String>,
    pub port: u16,
    pub password: Option<String>,
    pub tls: bool,
}

/// Cache policy settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Minimum cosine similarity for a lookup to count as a hit
    pub similarity_threshold: f32,
    /// Entry TTL in seconds; 0 means entries never expire
    pub ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            expose_dump: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: 6379,
            password: None,
            tls: false,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.92,
            ttl_secs: 0,
        }
    }
}

impl RedisConfig {
    /// Connection URL, or None when no host is configured
    pub fn url(&self) -> Option<String> {
        let host = self.host.as_deref()?;
        let scheme = if self.tls { "rediss" } else { "redis" };

        Some(match &self.password {
            Some(password) => format!("{}://:{}@{}:{}", scheme, password, host, self.port),
            None => format!("{}://{}:{}", scheme, host, self.port),
        })
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert!(!config.server.expose_dump);
        assert_eq!(config.redis.port, 6379);
        assert!(config.redis.host.is_none());
        assert!((config.cache.similarity_threshold - 0.92).abs() < 1e-6);
        assert_eq!(config.cache.ttl_secs, 0);
    }

    #[test]
    fn test_url_without_host_is_none() {
        let redis = RedisConfig::default();
        assert!(redis.url().is_none());
    }

    #[test]
    fn test_url_plain() {
        let redis = RedisConfig {
            host: Some("localhost".to_string()),
            ..Default::default()
        };

        assert_eq!(redis.url().unwrap(), "redis://localhost:6379");
    }

    #[test]
    fn test_url_with_password_and_tls() {
        let redis = RedisConfig {
            host: Some("cache.example.com".to_string()),
            port: 6380,
            password: Some("hunter2".to_string()),
            tls: true,
        };

        assert_eq!(
            redis.url().unwrap(),
            "rediss://:hunter2@cache.example.com:6380"
        );
    }
}
