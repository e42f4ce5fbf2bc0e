//! Human-readable run summary.

use std::io::Write;
use std::path::Path;

use bytesize::ByteSize;
use yansi::{Color, Paint, Style};

use crate::duplicates::ScanSummary;

/// Number of hash failures listed before the rest are elided.
const MAX_LISTED_FAILURES: usize = 10;

/// Text rendering of a [`ScanSummary`].
#[derive(Debug)]
pub struct TextOutput<'a> {
    summary: &'a ScanSummary,
    duplicates_path: &'a Path,
    uniques_path: &'a Path,
}

impl<'a> TextOutput<'a> {
    /// Create a renderer for a finished run.
    #[must_use]
    pub fn new(summary: &'a ScanSummary, duplicates_path: &'a Path, uniques_path: &'a Path) -> Self {
        Self {
            summary,
            duplicates_path,
            uniques_path,
        }
    }

    /// Render the summary, with ANSI colors when `color` is set.
    #[must_use]
    pub fn render(&self, color: bool) -> String {
        let s = self.summary;
        let heading = Style::new().bold();
        let good = Style::new().fg(Color::Green);
        let warn = Style::new().fg(Color::Yellow).bold();
        let bad = Style::new().fg(Color::Red);

        let mut out = String::new();
        out.push_str(&paint("Hash run summary", heading, color));
        out.push('\n');
        out.push_str(&format!(
            "  Hashed {} file(s) ({}) in {:.2}s across {} director(ies)\n",
            s.hashed_files,
            ByteSize::b(s.bytes_hashed),
            s.scan_duration.as_secs_f64(),
            s.directories
        ));
        if s.resumed_files > 0 {
            out.push_str(&format!(
                "  Resumed {} file(s) from a previous run, skipped {} already hashed\n",
                s.resumed_files, s.skipped_files
            ));
        }

        let groups = format!(
            "{} group(s), {} file(s)",
            s.duplicate_groups, s.duplicate_files
        );
        let groups = if s.duplicate_groups > 0 {
            paint(&groups, warn, color)
        } else {
            paint(&groups, good, color)
        };
        out.push_str(&format!("  Duplicates: {groups}\n"));
        out.push_str(&format!("  Unique files: {}\n", s.unique_files));

        if !s.hash_errors.is_empty() {
            let header = format!("  Failed to hash {} file(s):", s.hash_errors.len());
            out.push_str(&paint(&header, bad, color));
            out.push('\n');
            for err in s.hash_errors.iter().take(MAX_LISTED_FAILURES) {
                out.push_str(&format!("    {err}\n"));
            }
            if s.hash_errors.len() > MAX_LISTED_FAILURES {
                out.push_str(&format!(
                    "    ... and {} more\n",
                    s.hash_errors.len() - MAX_LISTED_FAILURES
                ));
            }
        }
        if !s.scan_errors.is_empty() {
            let line = format!("  Unreadable directories: {}", s.scan_errors.len());
            out.push_str(&paint(&line, bad, color));
            out.push('\n');
        }

        out.push_str(&format!(
            "  Duplicates written to: {}\n",
            self.duplicates_path.display()
        ));
        out.push_str(&format!(
            "  Uniques written to: {}\n",
            self.uniques_path.display()
        ));

        if s.interrupted {
            out.push_str(&paint(
                "  Interrupted: run again with --restart to continue",
                warn,
                color,
            ));
            out.push('\n');
        }
        out
    }

    /// Write the rendered summary to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, color: bool) -> std::io::Result<()> {
        writer.write_all(self.render(color).as_bytes())
    }
}

fn paint(text: &str, style: Style, color: bool) -> String {
    if color {
        text.paint(style).to_string()
    } else {
        text.to_string()
    }
}
