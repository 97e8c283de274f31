use redis::AsyncCommands;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use crate::config::{Config, RedisConfig};
use crate::error::{AppError, Result};

/// Write-only key-value store; values never expire.
pub trait CacheStore {
    fn set(&mut self, key: &str, value: String) -> impl Future<Output = Result<()>> + Send;
}

/// Redis-backed store. A connection is opened per write.
#[derive(Clone)]
pub struct RedisCache {
    client: redis::Client,
    timeout: Duration,
}

impl RedisCache {
    pub fn new(config: &RedisConfig, timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(connection_info(config))
            .map_err(|e| AppError::ConfigError(format!("Invalid redis settings: {}", e)))?;
        Ok(Self { client, timeout })
    }
}

fn connection_info(config: &RedisConfig) -> redis::ConnectionInfo {
    redis::ConnectionInfo {
        addr: redis::ConnectionAddr::Tcp(config.host.clone(), config.port),
        redis: redis::RedisConnectionInfo {
            db: config.db,
            password: config.password.clone(),
            ..Default::default()
        },
    }
}

impl CacheStore for RedisCache {
    async fn set(&mut self, key: &str, value: String) -> Result<()> {
        let bytes = value.len();
        let write = async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            conn.set::<_, _, ()>(key, value).await?;
            Ok::<_, AppError>(())
        };

        timeout(self.timeout, write).await.map_err(|_| {
            AppError::CacheWriteError(format!("redis write timed out after {:?}", self.timeout))
        })??;

        debug!(key, bytes, "redis SET complete");
        Ok(())
    }
}

/// In-process store, used when no Redis host is configured.
#[derive(Debug, Default, Clone)]
pub struct MemoryCache {
    entries: HashMap<String, String>,
    unavailable: bool,
}

impl MemoryCache {
    /// A store whose writes always fail.
    pub fn unavailable() -> Self {
        Self {
            entries: HashMap::new(),
            unavailable: true,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

impl CacheStore for MemoryCache {
    async fn set(&mut self, key: &str, value: String) -> Result<()> {
        if self.unavailable {
            return Err(AppError::CacheWriteError("cache store unavailable".to_string()));
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

pub enum Cache {
    Redis(RedisCache),
    Memory(MemoryCache),
}

impl Cache {
    pub fn from_config(config: &Config) -> Result<Self> {
        match &config.redis {
            Some(redis) => Ok(Cache::Redis(RedisCache::new(redis, config.cache_timeout)?)),
            None => Ok(Cache::Memory(MemoryCache::default())),
        }
    }

    pub fn backend(&self) -> &'static str {
        match self {
            Cache::Redis(_) => "redis",
            Cache::Memory(_) => "memory",
        }
    }
}

impl CacheStore for Cache {
    async fn set(&mut self, key: &str, value: String) -> Result<()> {
        match self {
            Cache::Redis(cache) => cache.set(key, value).await,
            Cache::Memory(cache) => cache.set(key, value).await,
        }
    }
}
