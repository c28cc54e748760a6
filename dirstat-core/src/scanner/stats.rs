use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Serialize, Serializer};

/// Count and cumulative size for one category (an extension or a directory)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStat {
    /// Number of files in this category
    pub count: u64,
    /// Cumulative size in bytes
    pub size: u64,
}

impl CategoryStat {
    pub(crate) fn record(&mut self, size: u64) {
        self.count += 1;
        self.size += size;
    }
}

/// A path and its size, the unit kept in the top-N set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopEntry {
    pub path: String,
    pub size: u64,
}

impl TopEntry {
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}

/// Immutable result of one walk
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    /// Files analyzed, or distinct directories in directory mode
    pub file_count: u64,
    /// Cumulative size of all admitted files
    pub total_bytes: u64,
    /// Per-extension breakdown (empty in directory mode)
    pub ext_stats: BTreeMap<String, CategoryStat>,
    /// Largest files or directories, ascending by size (largest last)
    pub top_files: Vec<TopEntry>,
    /// Entries that could not be read
    pub error_count: u64,
    /// Wall-clock time from walk start to finalization
    #[serde(serialize_with = "serialize_nanos")]
    pub elapsed: Duration,
    pub directory_mode: bool,
    /// Top-N value used for this walk
    pub top_n: usize,
}

fn serialize_nanos<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
}

/// Forward slashes, no leading `./`
pub fn normalize_path(path: &str) -> String {
    let slashed = if cfg!(windows) {
        path.replace('\\', "/")
    } else {
        path.to_string()
    };

    let mut trimmed = slashed.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("./a/x.go"), "a/x.go");
        assert_eq!(normalize_path("a/x.go"), "a/x.go");
        assert_eq!(normalize_path("/abs/x.go"), "/abs/x.go");
        assert_eq!(normalize_path("."), ".");
    }

    #[test]
    fn test_json_shape() {
        let mut ext_stats = BTreeMap::new();
        ext_stats.insert(".go".to_string(), CategoryStat { count: 2, size: 150 });

        let stats = Stats {
            file_count: 2,
            total_bytes: 150,
            ext_stats,
            top_files: vec![TopEntry::new("a/y.go", 50), TopEntry::new("a/x.go", 100)],
            error_count: 0,
            elapsed: Duration::from_millis(3),
            directory_mode: false,
            top_n: 2,
        };

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["file_count"], 2);
        assert_eq!(json["ext_stats"][".go"]["size"], 150);
        assert_eq!(json["top_files"][1]["path"], "a/x.go");
        assert_eq!(json["elapsed"], 3_000_000);
    }
}
