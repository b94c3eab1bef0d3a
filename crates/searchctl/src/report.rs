//! JSON report of a workload run

use serde::Serialize;

/// Outcome of one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryOutcome {
    /// Query as displayed
    pub query: String,
    /// Matching entries
    pub count: usize,
    /// Wall-clock time including result materialisation
    pub millis: u64,
}

/// Summary of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Cache name
    pub cache: String,
    /// Records read from the feed
    pub base_records: usize,
    /// Entries in the cache after population
    pub entries: usize,
    /// Keys overwritten while replicating the feed
    pub replaced: usize,
    /// Population time
    pub populate_ms: u64,
    /// Query outcomes in execution order
    pub queries: Vec<QueryOutcome>,
}

impl Report {
    /// Render as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_json() {
        let report = Report {
            cache: "persons".to_string(),
            base_records: 1,
            entries: 10,
            replaced: 0,
            populate_ms: 3,
            queries: vec![QueryOutcome {
                query: "gender='M'".to_string(),
                count: 4,
                millis: 0,
            }],
        };

        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["cache"], "persons");
        assert_eq!(value["entries"], 10);
        assert_eq!(value["queries"][0]["count"], 4);
        assert_eq!(value["queries"][0]["query"], "gender='M'");
    }
}
