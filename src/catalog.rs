use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::dataset::{Dataset, NewspaperRecord};
use crate::error::{AppError, Result};

const COLLECTION_FIELD: &str = "newspapers";

/// Where the session gets its catalog from.
pub trait CatalogSource {
    /// Short label for logs.
    fn describe(&self) -> String;

    fn fetch(&self) -> impl Future<Output = Result<Catalog>> + Send;
}

/// A parsed catalog document: the full top-level JSON (kept for the cache)
/// plus the extracted newspaper records.
#[derive(Debug, Clone)]
pub struct Catalog {
    document: Value,
    records: Vec<NewspaperRecord>,
}

impl Catalog {
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let document: Value = serde_json::from_slice(body)
            .map_err(|e| AppError::MalformedResponseError(format!("body is not valid JSON: {}", e)))?;

        let items = document
            .get(COLLECTION_FIELD)
            .and_then(Value::as_array)
            .ok_or_else(|| {
                AppError::MalformedResponseError(format!("missing `{}` array", COLLECTION_FIELD))
            })?;

        let records = items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(fields) => Ok(NewspaperRecord::new(fields.clone())),
                other => Err(AppError::MalformedResponseError(format!(
                    "entry {} of `{}` is not an object: {}",
                    index, COLLECTION_FIELD, other
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { document, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialized copy of the whole document, as written to the cache.
    pub fn to_payload(&self) -> Result<String> {
        serde_json::to_string(&self.document)
            .map_err(|e| AppError::CacheWriteError(format!("failed to serialize catalog: {}", e)))
    }

    pub fn into_dataset(self) -> Dataset {
        Dataset::new(self.records)
    }
}

/// HTTP client for the remote catalog endpoint. One GET, no retries.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    url: String,
}

impl CatalogClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.catalog_url.clone(), config.catalog_timeout)
    }
}

impl CatalogSource for CatalogClient {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Catalog> {
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        debug!(bytes = body.len(), "catalog body received");

        Catalog::from_json(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_records_and_keeps_extra_fields() {
        let body = br#"{"newspapers": [
            {"state": "Kansas", "title": "The Topeka State Journal", "lccn": "sn82016014", "url": "https://example.org/1.json"}
        ], "generated": "2024-01-01"}"#;

        let catalog = Catalog::from_json(body).unwrap();
        assert_eq!(catalog.len(), 1);

        let payload: Value = serde_json::from_str(&catalog.to_payload().unwrap()).unwrap();
        assert_eq!(payload["generated"], "2024-01-01");

        let dataset = catalog.into_dataset();
        let record = &dataset.records()[0];
        assert_eq!(record.state(), Some("Kansas"));
        assert_eq!(record.fields()["lccn"], "sn82016014");
    }

    #[test]
    fn payload_keeps_the_document_as_fetched() {
        let body = r#"{"newspapers":[{"title":"The Sun","state":"NY","lccn":"sn1"}],"count":1}"#;

        let catalog = Catalog::from_json(body.as_bytes()).unwrap();

        assert_eq!(catalog.to_payload().unwrap(), body);
        let fields: Vec<&str> = catalog.records[0].fields().keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["title", "state", "lccn"]);
    }

    #[test]
    fn empty_collection_is_valid() {
        let catalog = Catalog::from_json(br#"{"newspapers": []}"#).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn rejects_non_json_body() {
        let err = Catalog::from_json(b"<html>down for maintenance</html>").unwrap_err();
        assert!(matches!(err, AppError::MalformedResponseError(msg) if msg.contains("not valid JSON")));
    }

    #[test]
    fn rejects_missing_or_mistyped_collection() {
        let err = Catalog::from_json(br#"{"papers": []}"#).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponseError(_)));

        let err = Catalog::from_json(br#"{"newspapers": {"state": "NY"}}"#).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponseError(_)));

        let err = Catalog::from_json(br#"{"newspapers": [{"state": "NY"}, 42]}"#).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponseError(msg) if msg.contains("entry 1")));
    }
}
