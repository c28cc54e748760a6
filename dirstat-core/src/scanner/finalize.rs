use std::collections::BTreeMap;
use std::time::Duration;

use super::collector::Collector;
use super::stats::{Stats, TopEntry, normalize_path};
use super::top_n::TopN;

/// Turn the collector's state into the immutable snapshot.
///
/// File mode keeps the extension map and drains the running top-N set.
/// Directory mode ranks the per-directory totals now that every file has
/// been seen, reports the number of directories as `file_count`, and leaves
/// the extension map empty.
pub(crate) fn finalize(collector: &Collector, elapsed: Duration) -> Stats {
    let state = collector.drain();
    let top_n = collector.top_n();
    let directory_mode = collector.is_directory_mode();

    let (file_count, ext_stats, top_files) = if directory_mode {
        let file_count = state.categories.len() as u64;
        let mut dirs = TopN::new(top_n);
        for (dir, stat) in state.categories {
            dirs.offer(TopEntry::new(dir, stat.size));
        }
        (file_count, BTreeMap::new(), dirs.into_sorted())
    } else {
        let ext_stats: BTreeMap<_, _> = state.categories.into_iter().collect();
        (state.file_count, ext_stats, state.top.into_sorted())
    };

    let top_files = top_files
        .into_iter()
        .map(|entry| TopEntry::new(normalize_path(&entry.path), entry.size))
        .collect();

    Stats {
        file_count,
        total_bytes: state.total_bytes,
        ext_stats,
        top_files,
        error_count: state.error_count,
        elapsed,
        directory_mode,
        top_n,
    }
}
