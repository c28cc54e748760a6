use std::io::{self, Write};

use dirstat_core::{Stats, format_size, size_percentage};

/// Gap between the label column and the value column
const COLUMN_GAP: usize = 2;

/// Print stats as pretty JSON
pub fn write_json<W: Write>(stats: &Stats, out: &mut W) -> color_eyre::Result<()> {
    serde_json::to_writer_pretty(&mut *out, stats)?;
    writeln!(out)?;
    Ok(())
}

/// Print stats as aligned, human-readable sections
pub fn write_table<W: Write>(stats: &Stats, out: &mut W) -> io::Result<()> {
    if !stats.directory_mode {
        write_section(out, "Top extensions:", &extension_rows(stats))?;
    }

    let title = if stats.directory_mode {
        "Top directories:"
    } else {
        "Top files:"
    };
    write_section(out, title, &top_rows(stats))?;

    let mut summary = vec![
        (
            if stats.directory_mode {
                "Total directories:".to_string()
            } else {
                "Total files:".to_string()
            },
            stats.file_count.to_string(),
        ),
        (
            "Total size:".to_string(),
            format!("{} ({} bytes)", format_size(stats.total_bytes), stats.total_bytes),
        ),
    ];
    if stats.error_count > 0 {
        summary.push(("Errors:".to_string(), stats.error_count.to_string()));
    }
    write_section(out, "Stats:", &summary)?;

    writeln!(out)?;
    writeln!(out, "Elapsed:  {:?}", stats.elapsed)
}

/// Largest extensions, ascending, numbered so the biggest is 1)
fn extension_rows(stats: &Stats) -> Vec<(String, String)> {
    let mut exts: Vec<_> = stats.ext_stats.iter().collect();
    exts.sort_by(|(a_name, a), (b_name, b)| a.size.cmp(&b.size).then_with(|| a_name.cmp(b_name)));

    let shown = &exts[exts.len().saturating_sub(stats.top_n)..];
    shown
        .iter()
        .enumerate()
        .map(|(i, (ext, stat))| {
            let name = if ext.is_empty() { "\"\"" } else { ext.as_str() };
            (
                format!("  {}) {}:", shown.len() - i, name),
                format!(
                    "{} files, {} ({:.1}%)",
                    stat.count,
                    format_size(stat.size),
                    size_percentage(stat.size, stats.total_bytes)
                ),
            )
        })
        .collect()
}

fn top_rows(stats: &Stats) -> Vec<(String, String)> {
    let total = stats.top_files.len();
    stats
        .top_files
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            (
                format!("  {}) '{}'", total - i, entry.path),
                format!(
                    "{} ({:.1}%)",
                    format_size(entry.size),
                    size_percentage(entry.size, stats.total_bytes)
                ),
            )
        })
        .collect()
}

fn write_section<W: Write>(out: &mut W, title: &str, rows: &[(String, String)]) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", title)?;

    let width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);

    for (label, value) in rows {
        let pad = width - label.chars().count() + COLUMN_GAP;
        writeln!(out, "{}{:pad$}{}", label, "", value, pad = pad)?;
    }

    Ok(())
}
