pub mod aggregate;
pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod dataset;
pub mod error;
pub mod report;

use std::sync::Arc;
use tokio::sync::Mutex;

use cache::Cache;
use catalog::CatalogClient;
use config::Config;
use dataset::{CacheWritePolicy, Session};

pub type CatalogSession = Session<CatalogClient, Cache>;

/// Application state shared across handlers. The mutex is held for the
/// whole fetch-and-store sequence, so concurrent requests fetch at most once.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<CatalogSession>>,
}

impl AppState {
    pub fn from_config(config: &Config) -> error::Result<Self> {
        let session = Session::new(
            CatalogClient::from_config(config)?,
            Cache::from_config(config)?,
            config.cache_key.clone(),
            CacheWritePolicy::from_strict(config.cache_write_strict),
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
        })
    }
}
