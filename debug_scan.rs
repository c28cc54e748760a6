// Run with: cargo run --example debug_scan -- /path/to/scan
// Add to dirstat-core/Cargo.toml: [[example]] name = "debug_scan" path = "../debug_scan.rs"

use dirstat_core::{Analyzer, ScanMessage, WalkConfig};
use std::path::PathBuf;
use std::time::{Duration, Instant};

fn main() {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    println!("Scanning: {:?}", path);

    let config = WalkConfig::new(path).with_progress_interval(Duration::from_millis(100));
    let (rx, handle) = Analyzer::new(config).spawn();

    let start = Instant::now();
    let mut last_print = Instant::now();
    let mut last_files = 0u64;
    let mut stuck_count = 0;

    for msg in rx {
        match msg {
            ScanMessage::Progress(p) => {
                let now = Instant::now();

                // Same count for several ticks in a row usually means a slow directory
                if p.files == last_files {
                    stuck_count += 1;
                } else {
                    stuck_count = 0;
                }
                last_files = p.files;

                if now.duration_since(last_print) > Duration::from_secs(1) || stuck_count > 5 {
                    println!(
                        "[{:>6.1}s] files={:<8} bytes={:<12} stuck={}",
                        now.duration_since(start).as_secs_f64(),
                        p.files,
                        p.bytes,
                        stuck_count,
                    );
                    last_print = now;
                }
            }
            ScanMessage::Finalizing => {
                println!("[{:>6.1}s] FINALIZING...", start.elapsed().as_secs_f64());
            }
            ScanMessage::Completed => {
                println!("[{:>6.1}s] COMPLETED", start.elapsed().as_secs_f64());
            }
            ScanMessage::Cancelled => {
                println!("[{:>6.1}s] CANCELLED", start.elapsed().as_secs_f64());
            }
            ScanMessage::Error(e) => {
                println!("[{:>6.1}s] ERROR: {}", start.elapsed().as_secs_f64(), e);
            }
        }
    }

    match handle.join() {
        Ok(Ok(stats)) => println!(
            "\nFinal: {} files, {} total size, {} errors",
            stats.file_count,
            dirstat_core::format_size(stats.total_bytes),
            stats.error_count
        ),
        Ok(Err(e)) => println!("\nScan failed: {}", e),
        Err(_) => println!("\nScan thread panicked"),
    }
}
