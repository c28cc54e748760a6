use std::collections::HashMap;

use parking_lot::Mutex;

use super::stats::{CategoryStat, TopEntry};
use super::top_n::TopN;

/// Aggregation key for one admitted file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    /// File mode: the file's extension (may be empty)
    Extension(String),
    /// Directory mode: the identity passed to `add` is the containing directory
    Directory,
}

/// Everything the walk mutates, guarded together by one lock
#[derive(Debug)]
pub(crate) struct CollectorState {
    pub(crate) file_count: u64,
    pub(crate) total_bytes: u64,
    pub(crate) error_count: u64,
    pub(crate) categories: HashMap<String, CategoryStat>,
    pub(crate) top: TopN,
}

impl CollectorState {
    fn new(top_n: usize) -> Self {
        Self {
            file_count: 0,
            total_bytes: 0,
            error_count: 0,
            categories: HashMap::new(),
            top: TopN::new(top_n),
        }
    }
}

/// Thread-safe running aggregate fed by the traversal workers.
///
/// Each call updates the counters, the category map and the top-N set under a
/// single lock, so a reader never sees half of an update.
#[derive(Debug)]
pub struct Collector {
    top_n: usize,
    directory_mode: bool,
    state: Mutex<CollectorState>,
}

impl Collector {
    pub fn new(top_n: usize, directory_mode: bool) -> Self {
        Self {
            top_n,
            directory_mode,
            state: Mutex::new(CollectorState::new(top_n)),
        }
    }

    /// Record one admitted file.
    ///
    /// In file mode `identity` is the file path and it competes for the top-N
    /// set. In directory mode it is the containing directory; the first file
    /// seen for a directory bumps the count, and top-N is left to finalization.
    pub fn add(&self, identity: &str, size: u64, category: Category) {
        let mut state = self.state.lock();
        state.total_bytes += size;

        match category {
            Category::Directory => {
                let stat = state.categories.entry(identity.to_string()).or_default();
                let first = stat.count == 0;
                stat.record(size);
                if first {
                    state.file_count += 1;
                }
            }
            Category::Extension(ext) => {
                state.file_count += 1;
                state.categories.entry(ext).or_default().record(size);
                state.top.offer(TopEntry::new(identity, size));
            }
        }
    }

    /// Count an entry that could not be read
    pub fn add_error(&self) {
        self.state.lock().error_count += 1;
    }

    /// Consistent `(file_count, total_bytes)` pair
    pub fn progress(&self) -> (u64, u64) {
        let state = self.state.lock();
        (state.file_count, state.total_bytes)
    }

    pub fn error_count(&self) -> u64 {
        self.state.lock().error_count
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn is_directory_mode(&self) -> bool {
        self.directory_mode
    }

    /// Take the accumulated state, leaving an empty one behind
    pub(crate) fn drain(&self) -> CollectorState {
        std::mem::replace(&mut *self.state.lock(), CollectorState::new(self.top_n))
    }
}
