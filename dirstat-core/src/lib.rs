pub mod error;
pub mod scanner;
pub mod size;

pub use error::{DirstatError, Result};
pub use scanner::{
    Analyzer, CancellationToken, CategoryStat, ScanMessage, ScanProgress, Stats, TopEntry,
    WalkConfig, run,
};
pub use size::{format_count, format_size, parse_size, size_percentage};
