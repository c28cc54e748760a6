use std::io::{self, Stderr, Write};

use crossterm::{
    cursor::{Hide, MoveToColumn, Show},
    execute, queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use dirstat_core::{ScanProgress, format_count, format_size};

/// Braille spinner characters
const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Single-line scan status redrawn in place on stderr
pub struct StatusLine {
    out: Stderr,
    spinner_frame: usize,
    unit: &'static str,
}

impl StatusLine {
    /// Hide the cursor and start drawing
    pub fn start(directory_mode: bool) -> io::Result<Self> {
        let mut out = io::stderr();
        execute!(out, Hide)?;
        Ok(Self {
            out,
            spinner_frame: 0,
            unit: if directory_mode { "dirs" } else { "files" },
        })
    }

    pub fn update(&mut self, progress: &ScanProgress) -> io::Result<()> {
        let line = progress_indicator(progress, self.spinner_frame, self.unit);
        self.spinner_frame = self.spinner_frame.wrapping_add(1);

        queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(line)
        )?;
        self.out.flush()
    }

    /// Clear the line and restore the cursor
    pub fn finish(mut self) -> io::Result<()> {
        execute!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine), Show)
    }
}

/// Compact progress text
pub fn progress_indicator(progress: &ScanProgress, spinner_frame: usize, unit: &str) -> String {
    let spinner = SPINNER[spinner_frame % SPINNER.len()];
    format!(
        "{} Scanning… {} {}, {}",
        spinner,
        format_count(progress.files),
        unit,
        format_size(progress.bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_indicator() {
        let progress = ScanProgress {
            files: 12345,
            bytes: 2048,
        };
        assert_eq!(
            progress_indicator(&progress, 0, "files"),
            "⠋ Scanning… 12,345 files, 2.0 KiB"
        );
        assert!(progress_indicator(&progress, 11, "dirs").starts_with('⠙'));
    }
}
