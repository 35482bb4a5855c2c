use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a query produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum QueryResult {
    Count(i64),
    Names(BTreeSet<String>),
    Status(String),
    Urls(Vec<String>),
}

impl QueryResult {
    /// True when the query found nothing to report.
    pub fn is_empty(&self) -> bool {
        match self {
            QueryResult::Count(_) => false,
            QueryResult::Names(names) => names.is_empty(),
            QueryResult::Status(status) => status.trim().is_empty(),
            QueryResult::Urls(urls) => urls.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            QueryResult::Count(_) => 1,
            QueryResult::Names(names) => names.len(),
            QueryResult::Status(status) => status.lines().filter(|l| !l.trim().is_empty()).count(),
            QueryResult::Urls(urls) => urls.len(),
        }
    }
}
