use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::dataset::{Dataset, NewspaperRecord};
use crate::error::{AppError, Result};

pub const DEFAULT_TOP_N: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateCount {
    pub state: String,
    pub count: usize,
}

impl StateCount {
    pub fn new(state: impl Into<String>, count: usize) -> Self {
        Self { state: state.into(), count }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueTitleCount {
    pub state: String,
    pub unique_titles: usize,
}

impl UniqueTitleCount {
    pub fn new(state: impl Into<String>, unique_titles: usize) -> Self {
        Self { state: state.into(), unique_titles }
    }
}

fn required<'a>(
    record: &'a NewspaperRecord,
    index: usize,
    field: &'static str,
    get: fn(&NewspaperRecord) -> Option<&str>,
) -> Result<&'a str> {
    get(record).ok_or(AppError::MissingFieldError { index, field })
}

/// Records that carry a string `state`, with their position in the dataset.
fn with_state(dataset: &Dataset) -> impl Iterator<Item = (usize, &NewspaperRecord, &str)> {
    dataset
        .records()
        .iter()
        .enumerate()
        .filter_map(|(index, record)| match required(record, index, "state", NewspaperRecord::state) {
            Ok(state) => Some((index, record, state)),
            Err(e) => {
                warn!(error = %e, "skipping record");
                None
            }
        })
}

/// Number of records per state, in first-seen state order. Records without a
/// string `state` are skipped with a warning.
pub fn state_counts(dataset: &Dataset) -> Vec<StateCount> {
    let mut counts: Vec<StateCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for (_, _, state) in with_state(dataset) {
        match positions.get(state) {
            Some(&pos) => counts[pos].count += 1,
            None => {
                positions.insert(state, counts.len());
                counts.push(StateCount::new(state, 1));
            }
        }
    }

    counts
}

/// The `n` largest counts, descending. Equal counts keep their input order,
/// which for [`state_counts`] output is first-seen order.
pub fn top_n(counts: &[StateCount], n: usize) -> Vec<StateCount> {
    let mut sorted = counts.to_vec();
    // sort_by is stable
    sorted.sort_by(|a, b| b.count.cmp(&a.count));
    sorted.truncate(n);
    sorted
}

/// Distinct titles per state. Titles compare exactly, case included.
pub fn unique_titles_per_state(dataset: &Dataset) -> Vec<UniqueTitleCount> {
    let mut order: Vec<&str> = Vec::new();
    let mut titles: HashMap<&str, HashSet<&str>> = HashMap::new();

    for (index, record, state) in with_state(dataset) {
        let seen = titles.entry(state).or_insert_with(|| {
            order.push(state);
            HashSet::new()
        });
        match required(record, index, "title", NewspaperRecord::title) {
            Ok(title) => {
                seen.insert(title);
            }
            Err(e) => warn!(error = %e, "record has no title; state kept without it"),
        }
    }

    order
        .into_iter()
        .map(|state| UniqueTitleCount::new(state, titles.get(state).map_or(0, HashSet::len)))
        .collect()
}

/// State of every record whose title contains `query`, ignoring case.
/// One entry per matching record, in dataset order.
pub fn find_title(dataset: &Dataset, query: &str) -> Vec<String> {
    let needle = query.to_lowercase();

    with_state(dataset)
        .filter_map(|(index, record, state)| {
            match required(record, index, "title", NewspaperRecord::title) {
                Ok(title) => title.to_lowercase().contains(&needle).then(|| state.to_string()),
                Err(e) => {
                    warn!(error = %e, "skipping record");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn dataset(values: Vec<serde_json::Value>) -> Dataset {
        values.into_iter().map(NewspaperRecord::from).collect()
    }

    fn sample() -> Dataset {
        dataset(vec![
            json!({"state": "NY", "title": "The Sun"}),
            json!({"state": "NY", "title": "The Sun"}),
            json!({"state": "CA", "title": "Tribune"}),
        ])
    }

    #[test]
    fn sample_catalog_statistics() {
        let d = sample();

        assert_eq!(state_counts(&d), vec![StateCount::new("NY", 2), StateCount::new("CA", 1)]);
        assert_eq!(
            unique_titles_per_state(&d),
            vec![UniqueTitleCount::new("NY", 1), UniqueTitleCount::new("CA", 1)]
        );
        assert_eq!(find_title(&d, "sun"), vec!["NY", "NY"]);
        assert!(find_title(&d, "herald").is_empty());
    }

    #[test]
    fn empty_dataset_yields_empty_results() {
        let d = Dataset::default();
        assert!(state_counts(&d).is_empty());
        assert!(unique_titles_per_state(&d).is_empty());
        assert!(find_title(&d, "anything").is_empty());
        assert!(find_title(&d, "").is_empty());
        assert!(top_n(&state_counts(&d), DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn counts_cover_every_record() {
        let d = dataset(vec![
            json!({"state": "Texas", "title": "A"}),
            json!({"state": "Ohio", "title": "B"}),
            json!({"state": "Texas", "title": "C"}),
            json!({"state": "Iowa", "title": "D"}),
            json!({"state": "Texas", "title": "A"}),
        ]);

        let counts = state_counts(&d);
        assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), d.len());

        let unique = unique_titles_per_state(&d);
        for u in &unique {
            let total = counts.iter().find(|c| c.state == u.state).unwrap().count;
            assert!(u.unique_titles <= total);
        }
        assert_eq!(unique[0], UniqueTitleCount::new("Texas", 2));
    }

    #[test]
    fn top_n_sorts_descending_and_breaks_ties_by_first_seen() {
        let d = dataset(vec![
            json!({"state": "Ohio", "title": "a"}),
            json!({"state": "Utah", "title": "b"}),
            json!({"state": "Maine", "title": "c"}),
            json!({"state": "Maine", "title": "d"}),
            json!({"state": "Utah", "title": "e"}),
        ]);

        let top = top_n(&state_counts(&d), DEFAULT_TOP_N);
        assert_eq!(
            top,
            vec![StateCount::new("Utah", 2), StateCount::new("Maine", 2), StateCount::new("Ohio", 1)]
        );
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));

        assert_eq!(top_n(&state_counts(&d), 1), vec![StateCount::new("Utah", 2)]);
        assert!(top_n(&state_counts(&d), 0).is_empty());
    }

    #[test]
    fn title_distinctness_is_case_sensitive() {
        let d = dataset(vec![
            json!({"state": "NY", "title": "The Sun"}),
            json!({"state": "NY", "title": "the sun"}),
        ]);
        assert_eq!(unique_titles_per_state(&d), vec![UniqueTitleCount::new("NY", 2)]);
    }

    #[test]
    fn find_title_ignores_case_and_keeps_duplicates() {
        let d = dataset(vec![
            json!({"state": "NY", "title": "New York Times"}),
            json!({"state": "CA", "title": "Los Angeles TIMES"}),
            json!({"state": "NY", "title": "Sunday times"}),
            json!({"state": "WA", "title": "Seattle Star"}),
        ]);

        assert_eq!(find_title(&d, "times"), vec!["NY", "CA", "NY"]);
        assert_eq!(find_title(&d, "TIMES"), find_title(&d, "times"));
        assert_eq!(find_title(&d, ""), vec!["NY", "CA", "NY", "WA"]);
    }

    #[test]
    fn records_missing_fields_are_skipped() {
        let d = dataset(vec![
            json!({"state": "NY", "title": "The Sun"}),
            json!({"title": "Orphan Gazette"}),
            json!({"state": null, "title": "Null Herald"}),
            json!({"state": "NY"}),
            json!({"state": "VT", "title": 12}),
        ]);

        assert_eq!(state_counts(&d), vec![StateCount::new("NY", 2), StateCount::new("VT", 1)]);
        assert_eq!(
            unique_titles_per_state(&d),
            vec![UniqueTitleCount::new("NY", 1), UniqueTitleCount::new("VT", 0)]
        );
        assert_eq!(find_title(&d, ""), vec!["NY"]);
        assert!(find_title(&d, "gazette").is_empty());
    }
}
