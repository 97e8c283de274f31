use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::aggregate::UniqueTitleCount;

#[derive(Deserialize)]
pub struct TopStatesQuery {
    pub n: Option<usize>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize)]
pub struct PreviewQuery {
    pub rows: Option<usize>,
}

#[derive(Serialize)]
pub struct FetchResponse {
    pub records: usize,
    pub cache_key: String,
    pub cache_backend: String,
    pub cached: bool,
    pub cache_error: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct UniqueTitlesResponse {
    pub states: Vec<UniqueTitleCount>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    #[serde(rename = "match_count")]
    pub matches: usize,
    pub states: Vec<String>,
}
