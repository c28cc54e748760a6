mod progress;
mod report;

pub use progress::StatusLine;
pub use report::{write_json, write_table};
