use regex::Regex;
use tracing::debug;

use super::config::WalkConfig;
use crate::{DirstatError, Result};

/// What the walker should do with a visited entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Pass the entry to the collector
    Admit,
    /// Ignore this entry only
    Skip,
    /// Ignore this directory and never descend into it
    Prune,
}

/// Kind of a visited entry. Symlinks are never followed and count as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

/// Inclusion/exclusion policy compiled from a [`WalkConfig`].
///
/// Pure: the decision depends only on the inputs and the compiled config,
/// so one instance is shared by every traversal worker.
#[derive(Debug)]
pub struct Filter {
    include: Vec<String>,
    exclude: Vec<String>,
    patterns: Vec<Regex>,
    min_size: u64,
    max_depth: usize,
}

impl Filter {
    /// Compile the config, failing on the first pattern that is not a valid regex.
    pub fn new(config: &WalkConfig) -> Result<Self> {
        let patterns = config
            .exclude_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| DirstatError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            include: config.include_suffixes.clone(),
            exclude: config.exclude_suffixes.clone(),
            patterns,
            min_size: config.min_size,
            max_depth: config.max_depth,
        })
    }

    /// Decide on one entry.
    ///
    /// `path` must already be slash-normalized. Rules are evaluated in order
    /// and the first match wins: depth, exclusion pattern, entry type,
    /// minimum size, extension. The size rule only applies when `size` is
    /// known, which lets the walker run the cheap checks before it stats.
    pub fn decide(&self, path: &str, kind: EntryKind, depth: usize, size: Option<u64>) -> Decision {
        let is_dir = kind == EntryKind::Directory;

        if self.max_depth > 0 && depth > self.max_depth {
            debug!("beyond depth {}: {}", self.max_depth, path);
            return if is_dir { Decision::Prune } else { Decision::Skip };
        }

        if let Some(re) = self.patterns.iter().find(|re| re.is_match(path)) {
            debug!("excluded by pattern {}: {}", re.as_str(), path);
            return if is_dir { Decision::Prune } else { Decision::Skip };
        }

        if kind != EntryKind::File {
            return Decision::Skip;
        }

        if let Some(size) = size
            && !self.meets_min_size(size)
        {
            debug!("below minimum size ({} < {}): {}", size, self.min_size, path);
            return Decision::Skip;
        }

        if !self.matches_suffix(path) {
            return Decision::Skip;
        }

        Decision::Admit
    }

    /// Inclusive floor: a file exactly at the minimum passes.
    pub fn meets_min_size(&self, size: u64) -> bool {
        size >= self.min_size
    }

    /// Extension rule. Exclude always wins over include.
    fn matches_suffix(&self, path: &str) -> bool {
        if let Some(ext) = self.exclude.iter().find(|ext| path.ends_with(ext.as_str())) {
            debug!("excluded suffix {}: {}", ext, path);
            return false;
        }

        if !self.include.is_empty() && !self.include.iter().any(|ext| path.ends_with(ext.as_str())) {
            debug!("not in include list: {}", path);
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(config: WalkConfig) -> Filter {
        Filter::new(&config).unwrap()
    }

    #[test]
    fn test_depth_prunes_dirs_and_skips_files() {
        let f = filter(WalkConfig::new(".").with_max_depth(2));
        assert_eq!(f.decide("a/b", EntryKind::Directory, 2, None), Decision::Skip);
        assert_eq!(f.decide("a/b/c", EntryKind::Directory, 3, None), Decision::Prune);
        assert_eq!(f.decide("a/b/c.txt", EntryKind::File, 3, Some(1)), Decision::Skip);
        assert_eq!(f.decide("a/b.txt", EntryKind::File, 2, Some(1)), Decision::Admit);
    }

    #[test]
    fn test_unlimited_depth() {
        let f = filter(WalkConfig::new("."));
        assert_eq!(f.decide("a/b/c/d/e/f.txt", EntryKind::File, 6, Some(1)), Decision::Admit);
    }

    #[test]
    fn test_pattern_prunes_directory() {
        let f = filter(WalkConfig::new(".").with_exclude_patterns(["node_modules"]));
        assert_eq!(
            f.decide("./web/node_modules", EntryKind::Directory, 2, None),
            Decision::Prune
        );
        assert_eq!(
            f.decide("./web/node_modules.txt", EntryKind::File, 2, Some(1)),
            Decision::Skip
        );
        assert_eq!(f.decide("./web/index.js", EntryKind::File, 2, Some(1)), Decision::Admit);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Filter::new(&WalkConfig::new(".").with_exclude_patterns(["(unclosed"])).unwrap_err();
        assert!(matches!(err, DirstatError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn test_non_regular_entries_never_admitted() {
        let f = filter(WalkConfig::new("."));
        assert_eq!(f.decide("a", EntryKind::Directory, 1, None), Decision::Skip);
        assert_eq!(f.decide("link", EntryKind::Other, 1, None), Decision::Skip);
    }

    #[test]
    fn test_min_size_boundary() {
        let f = filter(WalkConfig::new(".").with_min_size(100));
        assert_eq!(f.decide("a.bin", EntryKind::File, 1, Some(100)), Decision::Admit);
        assert_eq!(f.decide("a.bin", EntryKind::File, 1, Some(99)), Decision::Skip);
        assert_eq!(f.decide("a.bin", EntryKind::File, 1, None), Decision::Admit);
        assert!(f.meets_min_size(100));
        assert!(!f.meets_min_size(99));
    }

    #[test]
    fn test_exclude_suffix_wins_over_include() {
        let f = filter(WalkConfig::new(".").with_suffixes([".go", "!_test.go"]));
        assert_eq!(f.decide("pkg/main.go", EntryKind::File, 2, Some(1)), Decision::Admit);
        assert_eq!(f.decide("pkg/main_test.go", EntryKind::File, 2, Some(1)), Decision::Skip);
        assert_eq!(f.decide("README.md", EntryKind::File, 1, Some(1)), Decision::Skip);
    }

    #[test]
    fn test_exclude_only_suffixes() {
        let f = filter(WalkConfig::new(".").with_suffixes(["!.log"]));
        assert_eq!(f.decide("app.log", EntryKind::File, 1, Some(1)), Decision::Skip);
        assert_eq!(f.decide("app.txt", EntryKind::File, 1, Some(1)), Decision::Admit);
    }
}
