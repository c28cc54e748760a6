mod collector;
mod config;
mod filter;
mod finalize;
mod progress;
mod stats;
mod top_n;
mod walker;

pub use collector::{Category, Collector};
pub use config::{DEFAULT_PROGRESS_INTERVAL, DEFAULT_TOP_N, EXCLUDE_MARKER, WalkConfig};
pub use filter::{Decision, EntryKind, Filter};
pub use progress::{ProgressFn, ProgressReporter, ScanMessage, ScanProgress};
pub use stats::{CategoryStat, Stats, TopEntry, normalize_path};
pub use top_n::TopN;
pub use walker::{Analyzer, CancellationToken, run};
