use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{info, warn};

use crate::aggregate::{self, StateCount, UniqueTitleCount};
use crate::cache::CacheStore;
use crate::catalog::CatalogSource;
use crate::error::{AppError, Result};
use crate::report::{ChartSeries, TablePreview};

/// One newspaper entry as returned by the catalog. Only `state` and `title`
/// are interpreted; every other field is carried through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct NewspaperRecord(Map<String, Value>);

impl NewspaperRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn state(&self) -> Option<&str> {
        self.text("state")
    }

    pub fn title(&self) -> Option<&str> {
        self.text("title")
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    fn text(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }
}

impl From<Value> for NewspaperRecord {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self(fields),
            _ => Self(Map::new()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<NewspaperRecord>,
}

impl Dataset {
    pub fn new(records: Vec<NewspaperRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[NewspaperRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<NewspaperRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = NewspaperRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Result of an explicit fetch. A cache failure does not undo the load, it
/// is reported here (or returned as an error under the strict policy).
#[derive(Debug)]
pub struct FetchOutcome {
    pub records: usize,
    pub cache_key: String,
    pub cache_error: Option<AppError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheWritePolicy {
    /// Log and report the failure, keep going.
    #[default]
    BestEffort,
    /// Return the failure to the caller.
    Strict,
}

impl CacheWritePolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::BestEffort }
    }

    fn check(self, mut outcome: FetchOutcome) -> Result<FetchOutcome> {
        match (self, outcome.cache_error.take()) {
            (Self::Strict, Some(e)) => Err(e),
            (_, cache_error) => {
                outcome.cache_error = cache_error;
                Ok(outcome)
            }
        }
    }
}

/// Owns the dataset for one caller. Starts unloaded; a failed fetch never
/// touches what is already loaded.
pub struct Session<C, S> {
    source: C,
    cache: S,
    cache_key: String,
    policy: CacheWritePolicy,
    dataset: Option<Dataset>,
}

impl<C, S> Session<C, S>
where
    C: CatalogSource,
    S: CacheStore,
{
    pub fn new(source: C, cache: S, cache_key: impl Into<String>, policy: CacheWritePolicy) -> Self {
        Self {
            source,
            cache,
            cache_key: cache_key.into(),
            policy,
            dataset: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    pub fn cache(&self) -> &S {
        &self.cache
    }

    /// Fetch the catalog and replace the held dataset, then persist the raw
    /// payload to the cache store.
    pub async fn fetch(&mut self) -> Result<FetchOutcome> {
        let (dataset, outcome) = self.load().await?;
        self.dataset = Some(dataset);
        self.policy.check(outcome)
    }

    /// Fetch on first use only; later calls return the dataset already held.
    pub async fn ensure_loaded(&mut self) -> Result<&Dataset> {
        let dataset = match self.dataset.take() {
            Some(dataset) => dataset,
            None => {
                let (dataset, outcome) = self.load().await?;
                if let Err(e) = self.policy.check(outcome) {
                    self.dataset = Some(dataset);
                    return Err(e);
                }
                dataset
            }
        };
        Ok(self.dataset.insert(dataset))
    }

    async fn load(&mut self) -> Result<(Dataset, FetchOutcome)> {
        let started = Instant::now();
        info!(source = %self.source.describe(), "fetching newspaper catalog");

        let catalog = self.source.fetch().await?;
        let payload = catalog.to_payload();
        let dataset = catalog.into_dataset();
        let records = dataset.len();
        info!(records, elapsed_ms = started.elapsed().as_millis() as u64, "catalog loaded");

        let written = match payload {
            Ok(payload) => self.cache.set(&self.cache_key, payload).await,
            Err(e) => Err(e),
        };
        let cache_error = match written {
            Ok(()) => {
                info!(key = %self.cache_key, "catalog payload written to cache");
                None
            }
            Err(e) => {
                warn!(key = %self.cache_key, error = %e, "cache write failed; keeping in-memory dataset");
                Some(e)
            }
        };

        let outcome = FetchOutcome {
            records,
            cache_key: self.cache_key.clone(),
            cache_error,
        };
        Ok((dataset, outcome))
    }

    pub async fn total_records(&mut self) -> Result<usize> {
        Ok(self.ensure_loaded().await?.len())
    }

    pub async fn state_counts(&mut self) -> Result<Vec<StateCount>> {
        Ok(aggregate::state_counts(self.ensure_loaded().await?))
    }

    pub async fn top_n_states(&mut self, n: usize) -> Result<Vec<StateCount>> {
        let counts = self.state_counts().await?;
        Ok(aggregate::top_n(&counts, n))
    }

    pub async fn unique_titles_per_state(&mut self) -> Result<Vec<UniqueTitleCount>> {
        Ok(aggregate::unique_titles_per_state(self.ensure_loaded().await?))
    }

    pub async fn find_title(&mut self, query: &str) -> Result<Vec<String>> {
        Ok(aggregate::find_title(self.ensure_loaded().await?, query))
    }

    pub async fn chart(&mut self, n: usize) -> Result<ChartSeries> {
        let top = self.top_n_states(n).await?;
        Ok(ChartSeries::top_states(n, &top))
    }

    pub async fn preview(&mut self, rows: usize) -> Result<TablePreview> {
        Ok(TablePreview::head(self.ensure_loaded().await?, rows))
    }
}
