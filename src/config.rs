use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_CATALOG_URL: &str = "https://chroniclingamerica.loc.gov/newspapers.json";
pub const DEFAULT_CACHE_KEY: &str = "newspapers";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub catalog_url: String,
    pub catalog_timeout: Duration,
    pub cache_key: String,
    pub cache_timeout: Duration,
    pub cache_write_strict: bool,
    /// `None` selects the in-process cache.
    pub redis: Option<RedisConfig>,
}

#[derive(Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub db: i64,
    pub password: Option<String>,
}

impl std::fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db", &self.db)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "127.0.0.1");
        let port = parse_var::<u16>("PORT", &var("PORT", "3000"))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;
        let server_addr = SocketAddr::new(ip, port);

        let catalog_url = var("CATALOG_URL", DEFAULT_CATALOG_URL);
        let catalog_timeout = Duration::from_secs(parse_var("CATALOG_TIMEOUT_SECS", &var("CATALOG_TIMEOUT_SECS", "30"))?);

        let cache_key = var("CACHE_KEY", DEFAULT_CACHE_KEY);
        let cache_timeout = Duration::from_millis(parse_var("CACHE_TIMEOUT_MS", &var("CACHE_TIMEOUT_MS", "2000"))?);
        let cache_write_strict = parse_var("CACHE_WRITE_STRICT", &var("CACHE_WRITE_STRICT", "false"))?;

        let redis = match lookup("REDIS_HOST").filter(|h| !h.trim().is_empty()) {
            Some(host) => Some(RedisConfig {
                host,
                port: parse_var("REDIS_PORT", &var("REDIS_PORT", "6379"))?,
                db: parse_var("REDIS_DB", &var("REDIS_DB", "0"))?,
                password: lookup("REDIS_PASSWORD").filter(|p| !p.is_empty()),
            }),
            None => None,
        };

        Ok(Config {
            server_addr,
            catalog_url,
            catalog_timeout,
            cache_key,
            cache_timeout,
            cache_write_strict,
            redis,
        })
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| AppError::ConfigError(format!("Invalid {}: {}", key, e)))
}
