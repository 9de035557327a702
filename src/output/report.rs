//! Column-aligned console report
//!
//! Each line starts with a right-aligned size/type column, followed by the
//! optional permission and modification time columns and then the entry name.

use std::io::{self, Write};

use chrono::{DateTime, Local};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::error::TraversalError;
use crate::scan::{
    EntryClassification, EntrySize, Permissions, RollUp, RollUpKind, ScanEntry, ScanSink,
    ScanSummary, TallyReport, format_size,
};

use super::config::{OutputConfig, PathStyle};

const SIZE_COL_WIDTH: usize = 20;
const COLUMN_GAP: &str = "    ";
const INDENT_WIDTH: usize = 4;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIMESTAMP_WIDTH: usize = 19;
const PERMISSIONS_WIDTH: usize = 9;
const SUMMARY_LABEL_WIDTH: usize = 12;

/// Format a modification time for the mtime column.
pub fn format_timestamp(time: &DateTime<Local>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// One line of the summary block.
pub fn summary_line(label: &str, report: &TallyReport) -> String {
    format!(
        "{:<width$}{} files ({}), {} symlinks, {} special entries, {} subdirectories, {} total",
        format!("{}:", label),
        report.files,
        format_size(report.bytes),
        report.symlinks,
        report.special,
        report.subdirectories,
        report.total,
        width = SUMMARY_LABEL_WIDTH,
    )
}

fn size_column(size: EntrySize) -> String {
    match size {
        EntrySize::Known(bytes) => bytes.to_string(),
        EntrySize::Unknown => "?".to_string(),
    }
}

/// Streaming console formatter.
///
/// Entries, roll-ups and the summary go to `out`; traversal errors go to `err`
/// so they never interleave with the columns when stdout is redirected.
pub struct ReportFormatter<O: WriteColor, E: WriteColor> {
    config: OutputConfig,
    out: O,
    err: E,
}

impl ReportFormatter<StandardStream, StandardStream> {
    /// Formatter writing to stdout and stderr.
    pub fn stdio(config: OutputConfig) -> Self {
        let choice = if config.use_color {
            ColorChoice::Always
        } else {
            ColorChoice::Never
        };
        Self::new(
            config,
            StandardStream::stdout(choice),
            StandardStream::stderr(choice),
        )
    }
}

impl<O: WriteColor, E: WriteColor> ReportFormatter<O, E> {
    pub fn new(config: OutputConfig, out: O, err: E) -> Self {
        Self { config, out, err }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    fn write_column(&mut self, text: &str, color: Option<Color>) -> io::Result<()> {
        self.out.set_color(ColorSpec::new().set_fg(color))?;
        write!(self.out, "{:>width$}", text, width = SIZE_COL_WIDTH)?;
        self.out.reset()
    }

    /// Permission and mtime columns; `None` leaves them blank.
    fn write_meta_columns(
        &mut self,
        meta: Option<(Option<Permissions>, Option<DateTime<Local>>)>,
    ) -> io::Result<()> {
        if self.config.show_permissions {
            let text = match meta {
                Some((Some(perms), _)) => perms.to_string(),
                Some((None, _)) => "?".repeat(PERMISSIONS_WIDTH),
                None => String::new(),
            };
            write!(self.out, "  {:<width$}", text, width = PERMISSIONS_WIDTH)?;
        }
        if self.config.show_mtime {
            let text = match meta {
                Some((_, Some(time))) => format_timestamp(&time),
                Some((_, None)) => "?".to_string(),
                None => String::new(),
            };
            write!(self.out, "  {:<width$}", text, width = TIMESTAMP_WIDTH)?;
        }
        write!(self.out, "{}", COLUMN_GAP)
    }

    fn indent(&self, depth: u64) -> String {
        match self.config.path_style {
            PathStyle::Indented => " ".repeat(depth as usize * INDENT_WIDTH),
            PathStyle::Absolute | PathStyle::Relative => String::new(),
        }
    }

    fn display_name(&self, entry: &ScanEntry) -> String {
        match self.config.path_style {
            PathStyle::Indented => entry.name.clone(),
            PathStyle::Absolute => entry.path.display().to_string(),
            PathStyle::Relative => entry.relative_to(&self.config.root).display().to_string(),
        }
    }
}

impl<O: WriteColor, E: WriteColor> ScanSink for ReportFormatter<O, E> {
    fn entry(&mut self, entry: &ScanEntry) -> io::Result<()> {
        let (column, color) = match &entry.classification {
            EntryClassification::File { size } => (size_column(*size), Color::Green),
            EntryClassification::Directory => (
                entry.dir_size.map_or_else(|| "-".to_string(), size_column),
                Color::Green,
            ),
            EntryClassification::Symlink { .. } => ("SYMLINK".to_string(), Color::Cyan),
            EntryClassification::Special { subtype } => (subtype.label().to_string(), Color::Yellow),
        };
        self.write_column(&column, Some(color))?;
        self.write_meta_columns(Some((entry.permissions, entry.modified)))?;

        let indent = self.indent(entry.depth);
        let name = self.display_name(entry);
        write!(self.out, "{}", indent)?;

        match &entry.classification {
            EntryClassification::Directory => {
                self.out
                    .set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_bold(true))?;
                write!(self.out, "<{}>", name)?;
                self.out.reset()?;
            }
            EntryClassification::Symlink { target } => {
                self.out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
                write!(self.out, "{}", name)?;
                self.out.reset()?;
                match target {
                    Some(target) => write!(self.out, " -> {}", target.display())?,
                    None => write!(self.out, " -> ?")?,
                }
            }
            EntryClassification::Special { .. } => {
                self.out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
                write!(self.out, "{}", name)?;
                self.out.reset()?;
            }
            EntryClassification::File { .. } => write!(self.out, "{}", name)?,
        }
        writeln!(self.out)
    }

    fn rollup(&mut self, rollup: &RollUp) -> io::Result<()> {
        let column = rollup
            .bytes
            .map_or_else(|| "-".to_string(), |b| b.to_string());
        let label = match rollup.kind {
            RollUpKind::Files => format!("<{} files>", rollup.count),
            RollUpKind::Symlinks => format!("<{} symlinks>", rollup.count),
            RollUpKind::Special => format!("<{} special entries>", rollup.count),
        };

        self.write_column(&column, None)?;
        self.write_meta_columns(None)?;
        let indent = self.indent(rollup.depth);
        write!(self.out, "{}", indent)?;

        self.out.set_color(ColorSpec::new().set_dimmed(true))?;
        match self.config.path_style {
            PathStyle::Indented => write!(self.out, "{}", label)?,
            PathStyle::Absolute => write!(self.out, "{} in {}", label, rollup.dir.display())?,
            PathStyle::Relative => {
                let dir = rollup
                    .dir
                    .strip_prefix(&self.config.root)
                    .unwrap_or(&rollup.dir);
                if dir.as_os_str().is_empty() {
                    write!(self.out, "{} in .", label)?;
                } else {
                    write!(self.out, "{} in {}", label, dir.display())?;
                }
            }
        }
        self.out.reset()?;
        writeln!(self.out)
    }

    fn error(&mut self, error: &TraversalError) -> io::Result<()> {
        self.err
            .set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(self.err, "error:")?;
        self.err.reset()?;
        writeln!(self.err, " {}", error)
    }

    fn finish(&mut self, summary: &ScanSummary) -> io::Result<()> {
        writeln!(self.out)?;
        let sections = [
            ("root", Some(&summary.root)),
            ("cumulative", summary.cumulative.as_ref()),
            ("matched", summary.matched.as_ref()),
            ("traversed", summary.traversed.as_ref()),
        ];
        for (label, report) in sections {
            if let Some(report) = report {
                writeln!(self.out, "{}", summary_line(label, report))?;
            }
        }

        if !summary.complete {
            self.out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
            writeln!(
                self.out,
                "incomplete: {} directories could not be read, counts are partial",
                summary.unreadable_dirs
            )?;
            self.out.reset()?;
        }
        Ok(())
    }
}
