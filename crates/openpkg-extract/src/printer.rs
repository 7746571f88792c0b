//! Terminal printer for extraction reports
//!
//! Verbose mode prints every recorded error and warning with its location
//! and a suggestion keyed off the diagnostic code. Otherwise only the final
//! counts are printed.
//!
//! # Example
//!
//! ```no_run
//! use openpkg_extract::diagnostics::ErrorReport;
//! use openpkg_extract::printer::ReportPrinter;
//!
//! let report = ErrorReport::default();
//! ReportPrinter::new(&report, true, true).print_to_stderr();
//! ```

use crate::diagnostics::{Diagnostic, ErrorReport};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Prints an `ErrorReport`
pub struct ReportPrinter<'a> {
    report: &'a ErrorReport,
    /// Print every entry rather than just the counts
    verbose: bool,
    /// Whether to use colored output
    use_color: bool,
}

impl<'a> ReportPrinter<'a> {
    pub fn new(report: &'a ErrorReport, verbose: bool, use_color: bool) -> Self {
        Self {
            report,
            verbose,
            use_color,
        }
    }

    /// Format the report for the Display trait
    pub fn format(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.verbose {
            for diagnostic in self.report.all() {
                let severity = diagnostic.severity.display();
                let styled = match diagnostic.severity.color() {
                    Color::Red => self.styled_red(severity),
                    _ => self.styled_yellow(severity),
                };
                writeln!(f, "{}{}", styled, entry_body(diagnostic))?;
                if let Some(location) = diagnostic.location() {
                    writeln!(f, "  {}", self.styled_gray(&format!("--> {}", location)))?;
                }
                if let Some(suggestion) = diagnostic.suggestion() {
                    writeln!(f, "  {}", self.styled_cyan(&format!("help: {}", suggestion)))?;
                }
            }
        }
        writeln!(f, "{}", self.styled_bold(&summary_line(self.report)))
    }

    /// Print directly to stderr
    pub fn print_to_stderr(&self) {
        let choice = if self.use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        let mut stderr = StandardStream::stderr(choice);
        if let Err(e) = self.write_colored(&mut stderr) {
            eprintln!("Error printing report: {}", e);
        }
    }

    /// Write with colors to a WriteColor implementor
    pub fn write_colored<W: WriteColor>(&self, w: &mut W) -> io::Result<()> {
        if self.verbose {
            for diagnostic in self.report.all() {
                w.set_color(
                    ColorSpec::new()
                        .set_fg(Some(diagnostic.severity.color()))
                        .set_bold(true),
                )?;
                write!(w, "{}", diagnostic.severity.display())?;
                w.reset()?;
                writeln!(w, "{}", entry_body(diagnostic))?;

                if let Some(location) = diagnostic.location() {
                    write!(w, "  ")?;
                    self.write_gray(w, &format!("--> {}", location))?;
                    writeln!(w)?;
                }
                if let Some(suggestion) = diagnostic.suggestion() {
                    write!(w, "  ")?;
                    self.write_cyan(w, &format!("help: {}", suggestion))?;
                    writeln!(w)?;
                }
            }
        }
        self.write_bold(w, &summary_line(self.report))?;
        writeln!(w)
    }

    fn write_cyan<W: WriteColor>(&self, w: &mut W, s: &str) -> io::Result<()> {
        w.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(w, "{}", s)?;
        w.reset()
    }

    fn write_bold<W: WriteColor>(&self, w: &mut W, s: &str) -> io::Result<()> {
        w.set_color(ColorSpec::new().set_bold(true))?;
        write!(w, "{}", s)?;
        w.reset()
    }

    fn write_gray<W: WriteColor>(&self, w: &mut W, s: &str) -> io::Result<()> {
        w.set_color(ColorSpec::new().set_fg(Some(Color::White)).set_dimmed(true))?;
        write!(w, "{}", s)?;
        w.reset()
    }

    fn styled_red(&self, s: &str) -> String {
        self.styled(s, "31")
    }

    fn styled_yellow(&self, s: &str) -> String {
        self.styled(s, "33")
    }

    fn styled_cyan(&self, s: &str) -> String {
        self.styled(s, "36")
    }

    fn styled_bold(&self, s: &str) -> String {
        self.styled(s, "1")
    }

    fn styled_gray(&self, s: &str) -> String {
        self.styled(s, "90")
    }

    fn styled(&self, s: &str, code: &str) -> String {
        if self.use_color {
            format!("\x1b[{}m{}\x1b[0m", code, s)
        } else {
            s.to_string()
        }
    }
}

impl Display for ReportPrinter<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.format(f)
    }
}

/// `[code]: message (while context)`, printed after the severity
fn entry_body(diagnostic: &Diagnostic) -> String {
    let mut body = format!("[{}]: {}", diagnostic.code, diagnostic.message);
    if let Some(context) = &diagnostic.context {
        body.push_str(&format!(" (while {})", context));
    }
    body
}

fn summary_line(report: &ErrorReport) -> String {
    let summary = &report.summary;
    let plural = |n: usize, word: &str| {
        if n == 1 {
            format!("{} {}", n, word)
        } else {
            format!("{} {}s", n, word)
        }
    };
    let mut line = format!(
        "{}, {}",
        plural(summary.errors, "error"),
        plural(summary.warnings, "warning")
    );
    if summary.dropped > 0 {
        line.push_str(&format!(" ({} more not shown)", summary.dropped));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{ErrorHandler, ErrorKind, CODE_RESOLUTION_FAILED};
    use termcolor::NoColor;

    fn sample_report() -> ErrorReport {
        let handler = ErrorHandler::default();
        handler.record(
            Diagnostic::warning(
                ErrorKind::CompilerDiagnostic,
                "TS2307",
                "Cannot find module 'lodash' or its corresponding type declarations.",
            )
            .in_file("/pkg/src/index.ts")
            .at(1, 0),
        );
        handler.record(
            Diagnostic::error(ErrorKind::ResolutionFailure, CODE_RESOLUTION_FAILED, "boom")
                .with_context("resolving export Broken"),
        );
        handler.report()
    }

    #[test]
    fn test_non_verbose_prints_only_counts() {
        let report = sample_report();
        let output = ReportPrinter::new(&report, false, false).to_string();
        assert_eq!(output, "1 error, 1 warning\n");
    }

    #[test]
    fn test_verbose_prints_entries_and_help() {
        let report = sample_report();
        let output = ReportPrinter::new(&report, true, false).to_string();

        assert!(output.contains("error[resolution-failed]: boom (while resolving export Broken)"));
        assert!(output.contains("warning[TS2307]: Cannot find module 'lodash'"));
        assert!(output.contains("--> /pkg/src/index.ts:1:1"));
        assert!(output.contains("help: Install the package"));
        // Errors are listed before warnings
        assert!(output.find("error[").unwrap() < output.find("warning[").unwrap());
        assert!(output.ends_with("1 error, 1 warning\n"));
    }

    #[test]
    fn test_write_colored_matches_display_without_color() {
        let report = sample_report();
        let printer = ReportPrinter::new(&report, true, false);

        let mut buffer = NoColor::new(Vec::new());
        printer.write_colored(&mut buffer).unwrap();
        let written = String::from_utf8(buffer.into_inner()).unwrap();

        assert_eq!(written, printer.to_string());
    }

    #[test]
    fn test_empty_report_summary() {
        let report = ErrorReport::default();
        let output = ReportPrinter::new(&report, true, false).to_string();
        assert_eq!(output, "0 errors, 0 warnings\n");
    }
}
