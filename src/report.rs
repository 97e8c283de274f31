use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use crate::aggregate::StateCount;
use crate::dataset::Dataset;

pub const DEFAULT_PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub labels: Vec<String>,
    pub values: Vec<usize>,
}

impl ChartSeries {
    pub fn top_states(n: usize, top: &[StateCount]) -> Self {
        Self {
            title: format!("Newspaper Distribution Across Top {} States", n),
            x_label: "States".to_string(),
            y_label: "Number of Newspapers".to_string(),
            labels: top.iter().map(|c| c.state.clone()).collect(),
            values: top.iter().map(|c| c.count).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePreview {
    pub total_records: usize,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TablePreview {
    /// First `rows` records, flattened. Columns span every key seen anywhere
    /// in the dataset so the preview matches the full table's shape.
    pub fn head(dataset: &Dataset, rows: usize) -> Self {
        let flattened: Vec<Vec<(String, String)>> = dataset
            .records()
            .iter()
            .map(|record| {
                let mut cells = Vec::new();
                flatten_into("", record.fields(), &mut cells);
                cells
            })
            .collect();

        let mut columns = Vec::new();
        let mut seen = HashSet::new();
        for (key, _) in flattened.iter().flatten() {
            if seen.insert(key.as_str()) {
                columns.push(key.clone());
            }
        }

        let rows = flattened
            .iter()
            .take(rows)
            .map(|cells| {
                let by_key: HashMap<&str, &str> =
                    cells.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                columns
                    .iter()
                    .map(|c| by_key.get(c.as_str()).copied().unwrap_or_default().to_string())
                    .collect()
            })
            .collect();

        Self {
            total_records: dataset.len(),
            columns,
            rows,
        }
    }
}

fn flatten_into(prefix: &str, fields: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (key, value) in fields {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(nested) => flatten_into(&name, nested, out),
            Value::String(s) => out.push((name, s.clone())),
            Value::Null => out.push((name, String::new())),
            other => out.push((name, other.to_string())),
        }
    }
}
