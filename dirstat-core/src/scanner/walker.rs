use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use jwalk::{DirEntry, WalkDir};
use tracing::{debug, info};

use super::collector::{Category, Collector};
use super::config::WalkConfig;
use super::filter::{Decision, EntryKind, Filter};
use super::finalize::finalize;
use super::progress::{ProgressFn, ProgressReporter, ScanMessage, ScanProgress};
use super::stats::{Stats, normalize_path};
use crate::{DirstatError, Result};

type Entry = DirEntry<((), ())>;

/// Cancellation token for stopping scans
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-directory visit logic, shared by every jwalk worker
struct Visitor {
    root: PathBuf,
    /// Target of `root` when the root itself is a symlink
    resolved_root: Option<PathBuf>,
    filter: Arc<Filter>,
    collector: Arc<Collector>,
    cancel: CancellationToken,
    directory_mode: bool,
}

impl Visitor {
    /// Called concurrently with the freshly listed children of one directory.
    ///
    /// Whatever stays in `children` is descended into, so only directories
    /// that passed the filter are retained. Files are consumed here.
    fn visit_children(&self, children: &mut Vec<std::result::Result<Entry, jwalk::Error>>) {
        children.retain(|child| {
            if self.cancel.is_cancelled() {
                return false;
            }

            match child {
                Ok(entry) => self.visit(entry),
                Err(err) => {
                    debug!("error reading entry: {}", err);
                    self.collector.add_error();
                    false
                }
            }
        });
    }

    /// Returns whether to descend into `entry`
    fn visit(&self, entry: &Entry) -> bool {
        let path = self.display_path(entry.path());
        let slashed = entry_key(&path);

        let file_type = entry.file_type();
        let kind = if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };

        match self.filter.decide(&slashed, kind, entry.depth, None) {
            Decision::Prune => return false,
            Decision::Skip => return kind == EntryKind::Directory,
            Decision::Admit => {}
        }

        let size = match entry.metadata() {
            Ok(metadata) => metadata.len(),
            Err(err) => {
                debug!("error accessing {}: {}", slashed, err);
                self.collector.add_error();
                return false;
            }
        };

        if !self.filter.meets_min_size(size) {
            debug!("below minimum size ({}): {}", size, slashed);
            return false;
        }

        if self.directory_mode {
            let dir = relative_parent(&path, &self.root);
            self.collector.add(&dir, size, Category::Directory);
        } else {
            let ext = extension_of(&slashed).to_string();
            self.collector.add(&slashed, size, Category::Extension(ext));
        }

        false
    }

    /// Map a path under the resolved root back under the root as given
    fn display_path(&self, path: PathBuf) -> PathBuf {
        match &self.resolved_root {
            Some(resolved) => match path.strip_prefix(resolved) {
                Ok(rest) => self.root.join(rest),
                Err(_) => path,
            },
            None => path,
        }
    }
}

/// Directory statistics scanner
pub struct Analyzer {
    config: WalkConfig,
    cancel_token: CancellationToken,
    progress: Option<ProgressFn>,
}

impl Analyzer {
    pub fn new(config: WalkConfig) -> Self {
        Self {
            config,
            cancel_token: CancellationToken::new(),
            progress: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    /// Receive `(file_count, total_bytes)` at the configured interval
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: FnMut(u64, u64) + Send + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Walk the tree and return the finished snapshot
    pub fn run(self) -> Result<Stats> {
        self.execute(None)
    }

    /// Scan in the background.
    /// Returns a receiver for progress updates and the handle yielding the result.
    pub fn spawn(mut self) -> (Receiver<ScanMessage>, JoinHandle<Result<Stats>>) {
        let (tx, rx) = crossbeam_channel::unbounded();

        let progress_tx = tx.clone();
        let mut user_callback = self.progress.take();
        self.progress = Some(Box::new(move |files, bytes| {
            if let Some(callback) = user_callback.as_mut() {
                callback(files, bytes);
            }
            let _ = progress_tx.send(ScanMessage::Progress(ScanProgress { files, bytes }));
        }));

        let handle = std::thread::spawn(move || {
            let result = self.execute(Some(&tx));
            let message = match &result {
                Ok(_) => ScanMessage::Completed,
                Err(DirstatError::Cancelled) => ScanMessage::Cancelled,
                Err(err) => ScanMessage::Error(err.to_string()),
            };
            let _ = tx.send(message);
            result
        });

        (rx, handle)
    }

    fn execute(self, events: Option<&Sender<ScanMessage>>) -> Result<Stats> {
        let root = clean_root(&self.config.root);
        validate_root(&root)?;
        let resolved_root = resolve_root(&root)?;

        let filter = Arc::new(Filter::new(&self.config)?);
        let top_n = self.config.effective_top_n();
        let directory_mode = self.config.directory_mode;
        let collector = Arc::new(Collector::new(top_n, directory_mode));

        info!(
            "Scanning {} (mode: {}, top {})",
            root.display(),
            if directory_mode { "directories" } else { "files" },
            top_n
        );
        debug!("include suffixes: {:?}", self.config.include_suffixes);
        debug!("exclude suffixes: {:?}", self.config.exclude_suffixes);
        debug!("exclude patterns: {:?}", self.config.exclude_patterns);

        let start = Instant::now();

        let reporter = ProgressReporter::start(
            Arc::clone(&collector),
            self.config.effective_progress_interval(),
            self.cancel_token.clone(),
            self.progress,
        );

        // The root goes through the same pattern check as any directory
        let root_pruned =
            filter.decide(&entry_key(&root), EntryKind::Directory, 0, None) == Decision::Prune;

        if root_pruned {
            debug!("root {} excluded by pattern", root.display());
        } else {
            let walk_root = resolved_root.clone().unwrap_or_else(|| root.clone());
            let visitor = Visitor {
                root: root.clone(),
                resolved_root,
                filter,
                collector: Arc::clone(&collector),
                cancel: self.cancel_token.clone(),
                directory_mode,
            };
            walk(&walk_root, visitor, self.config.num_threads, &self.cancel_token, &collector);
        }

        if let Some(reporter) = reporter {
            reporter.stop();
        }

        if self.cancel_token.is_cancelled() {
            info!("Scan of {} cancelled", root.display());
            return Err(DirstatError::Cancelled);
        }

        if let Some(tx) = events {
            let _ = tx.send(ScanMessage::Finalizing);
        }

        let stats = finalize(&collector, start.elapsed());

        info!(
            "Scan complete: {} entries, {} bytes, {} errors in {:?}",
            stats.file_count, stats.total_bytes, stats.error_count, stats.elapsed
        );

        Ok(stats)
    }
}

/// Drive jwalk over `root`, feeding every listed directory to `visitor`.
fn walk(
    root: &Path,
    visitor: Visitor,
    num_threads: usize,
    cancel: &CancellationToken,
    collector: &Collector,
) {
    let walker = WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false)
        .sort(false)
        .process_read_dir(move |_depth, _path, _read_dir_state, children| {
            visitor.visit_children(children);
        });

    let walker = if num_threads > 0 {
        walker.parallelism(jwalk::Parallelism::RayonNewPool(num_threads))
    } else {
        walker
    };

    for entry_result in walker {
        if cancel.is_cancelled() {
            break;
        }

        // Directory listing failures surface here; per-entry ones were
        // already counted by the visitor.
        match entry_result {
            Ok(entry) => {
                if let Some(err) = &entry.read_children_error {
                    debug!("error reading directory {}: {}", entry.path().display(), err);
                    collector.add_error();
                }
            }
            Err(err) => {
                debug!("error reading directory: {}", err);
                collector.add_error();
            }
        }
    }
}

/// Walk `config.root` and return the aggregate statistics.
///
/// `progress`, when given, receives `(file_count, total_bytes)` on every tick
/// of `config.progress_interval`.
pub fn run(config: WalkConfig, progress: Option<ProgressFn>) -> Result<Stats> {
    let mut analyzer = Analyzer::new(config);
    analyzer.progress = progress;
    analyzer.run()
}

/// Drop redundant separators and `.` components; an empty root means `.`
fn clean_root(root: &Path) -> PathBuf {
    let cleaned: PathBuf = root.components().collect();
    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

fn validate_root(root: &Path) -> Result<()> {
    let metadata = match std::fs::metadata(root) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(DirstatError::PathNotFound(root.to_path_buf()));
        }
        Err(err) => return Err(err.into()),
    };

    if !metadata.is_dir() {
        return Err(DirstatError::NotADirectory(root.to_path_buf()));
    }

    Ok(())
}

/// Canonical target when `root` is itself a symlink.
///
/// jwalk does not descend through a symlinked root when links are not
/// followed, so the walk starts from the target instead. Links below the
/// root stay unfollowed.
fn resolve_root(root: &Path) -> Result<Option<PathBuf>> {
    if std::fs::symlink_metadata(root)?.file_type().is_symlink() {
        let resolved = std::fs::canonicalize(root)?;
        debug!("root {} resolves to {}", root.display(), resolved.display());
        Ok(Some(resolved))
    } else {
        Ok(None)
    }
}

/// Slash-separated path without a leading `./`, as patterns see it
fn entry_key(path: &Path) -> String {
    normalize_path(&to_slash(path))
}

fn to_slash(path: &Path) -> String {
    let lossy = path.to_string_lossy();
    if cfg!(windows) {
        lossy.replace('\\', "/")
    } else {
        lossy.into_owned()
    }
}

/// Suffix of the last path component from its final `.`, or `""`
fn extension_of(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(idx) => &name[idx..],
        None => "",
    }
}

/// Containing directory of `path` relative to `root`, `.` for the root itself
fn relative_parent(path: &Path, root: &Path) -> String {
    let relative = path
        .parent()
        .map(|parent| parent.strip_prefix(root).unwrap_or(parent))
        .map(to_slash)
        .unwrap_or_default();

    if relative.is_empty() {
        ".".to_string()
    } else {
        relative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a/x.go"), ".go");
        assert_eq!(extension_of("a/archive.tar.gz"), ".gz");
        assert_eq!(extension_of("a/Makefile"), "");
        assert_eq!(extension_of("home/.bashrc"), ".bashrc");
        assert_eq!(extension_of("dir.d/README"), "");
    }

    #[test]
    fn test_relative_parent() {
        let root = Path::new("/data");
        assert_eq!(relative_parent(Path::new("/data/a/x.go"), root), "a");
        assert_eq!(relative_parent(Path::new("/data/a/b/x.go"), root), "a/b");
        assert_eq!(relative_parent(Path::new("/data/x.go"), root), ".");
        assert_eq!(relative_parent(Path::new("./a/x.go"), Path::new(".")), "a");
    }

    #[test]
    fn test_patterns_see_paths_without_dot_prefix() {
        let config = WalkConfig::new(".").with_exclude_patterns(["^a/"]);
        let filter = Filter::new(&config).unwrap();
        let key = entry_key(Path::new("./a/x.go"));
        assert_eq!(key, "a/x.go");
        assert_eq!(
            filter.decide(&key, EntryKind::File, 2, None),
            Decision::Skip
        );
        assert_eq!(
            filter.decide(&entry_key(Path::new("./b/x.go")), EntryKind::File, 2, None),
            Decision::Admit
        );
    }

    #[test]
    fn test_clean_root() {
        assert_eq!(clean_root(Path::new("")), PathBuf::from("."));
        assert_eq!(clean_root(Path::new("a//b/")), PathBuf::from("a/b"));
    }

    #[test]
    fn test_scan_empty_dir() {
        let temp = TempDir::new().unwrap();
        let stats = Analyzer::new(WalkConfig::new(temp.path())).run().unwrap();
        assert_eq!(stats.file_count, 0);
        assert_eq!(stats.total_bytes, 0);
        assert!(stats.top_files.is_empty());
        assert_eq!(stats.top_n, 20);
    }

    #[test]
    fn test_scan_with_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("file1.txt"), "hello").unwrap();
        fs::write(temp.path().join("file2.txt"), "world").unwrap();
        fs::create_dir(temp.path().join("subdir")).unwrap();
        fs::write(temp.path().join("subdir/file3.txt"), "test").unwrap();

        let stats = Analyzer::new(WalkConfig::new(temp.path())).run().unwrap();
        assert_eq!(stats.file_count, 3);
        assert_eq!(stats.total_bytes, 14);
        assert_eq!(stats.ext_stats[".txt"].count, 3);
    }

    #[test]
    fn test_missing_root() {
        let temp = TempDir::new().unwrap();
        let err = Analyzer::new(WalkConfig::new(temp.path().join("nope")))
            .run()
            .unwrap_err();
        assert!(matches!(err, DirstatError::PathNotFound(_)));
    }

    #[test]
    fn test_root_is_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let err = Analyzer::new(WalkConfig::new(&file)).run().unwrap_err();
        assert!(matches!(err, DirstatError::NotADirectory(_)));
    }
}
