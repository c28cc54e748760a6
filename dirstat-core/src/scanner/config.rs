use std::path::PathBuf;
use std::time::Duration;

/// Number of top entries tracked when none (or zero) is requested
pub const DEFAULT_TOP_N: usize = 20;

/// Progress sampling interval used when none (or zero) is configured
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Marker prefix routing a suffix into the exclude set
pub const EXCLUDE_MARKER: char = '!';

/// Walk configuration. Fixed once the walk starts.
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// Directory to analyze
    pub root: PathBuf,
    /// Suffixes to include (empty = all)
    pub include_suffixes: Vec<String>,
    /// Suffixes to exclude, always wins over the include set
    pub exclude_suffixes: Vec<String>,
    /// Regex patterns matched against the slash-normalized path
    pub exclude_patterns: Vec<String>,
    /// Files smaller than this are skipped
    pub min_size: u64,
    /// Maximum depth below root (0 = unlimited)
    pub max_depth: usize,
    /// Aggregate by containing directory instead of by extension
    pub directory_mode: bool,
    /// Number of largest entries to keep (0 = default)
    pub top_n: usize,
    /// Progress callback cadence (zero = default)
    pub progress_interval: Duration,
    /// Number of parallel threads (0 = auto)
    pub num_threads: usize,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            include_suffixes: Vec::new(),
            exclude_suffixes: Vec::new(),
            exclude_patterns: Vec::new(),
            min_size: 0,
            max_depth: 0,
            directory_mode: false,
            top_n: DEFAULT_TOP_N,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            num_threads: 0, // auto
        }
    }
}

impl WalkConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Split a single suffix list into the include and exclude sets.
    ///
    /// Entries prefixed with `!` go to the exclude set. Surrounding quotes are
    /// stripped first so shell-quoted values like `'!.log'` behave.
    pub fn with_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in suffixes {
            let entry = raw.as_ref().trim_matches(|c: char| c == '\'' || c == '"');
            if let Some(excluded) = entry.strip_prefix(EXCLUDE_MARKER) {
                self.exclude_suffixes.push(excluded.to_string());
            } else if !entry.is_empty() {
                self.include_suffixes.push(entry.to_string());
            }
        }
        self
    }

    pub fn with_exclude_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_directory_mode(mut self, directory_mode: bool) -> Self {
        self.directory_mode = directory_mode;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// Top-N actually used by the walk
    pub fn effective_top_n(&self) -> usize {
        if self.top_n == 0 {
            DEFAULT_TOP_N
        } else {
            self.top_n
        }
    }

    /// Progress interval actually used by the reporter
    pub fn effective_progress_interval(&self) -> Duration {
        if self.progress_interval.is_zero() {
            DEFAULT_PROGRESS_INTERVAL
        } else {
            self.progress_interval
        }
    }
}
