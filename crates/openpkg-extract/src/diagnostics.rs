//! Error types and diagnostics
//!
//! Fatal problems (bad entry files, a session that cannot be built) are
//! `ExtractError`s. Everything else is recorded by the `ErrorHandler` and
//! returned next to the document in an `ErrorReport`.

use openpkg_checker::ProgramDiagnostic;
use indexmap::IndexMap;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Once;
use thiserror::Error;
use tracing::{debug, warn};

/// Result type for extraction operations
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Default cap on recorded errors and on recorded warnings
pub const DEFAULT_MAX_ERRORS: usize = 500;

/// A declaration could not be resolved
pub const CODE_RESOLUTION_FAILED: &str = "resolution-failed";
/// Resolution panicked
pub const CODE_INTERNAL_PANIC: &str = "internal-panic";
/// A tsconfig.json could not be read
pub const CODE_TSCONFIG: &str = "tsconfig";
/// A package.json could not be read
pub const CODE_PACKAGE_JSON: &str = "package-json";

/// Main error type for extraction
#[derive(Debug, Error)]
pub enum ExtractError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// One or more entry files are missing or not TypeScript
    #[error(transparent)]
    FileValidation(#[from] FileValidationError),

    /// Nothing to extract from
    #[error("No entry files given")]
    NoEntryFiles,

    /// The type-checking session could not be built
    #[error("Failed to create session: {0}")]
    Session(#[from] openpkg_checker::CheckerError),

    /// package.json could not be parsed
    #[error("Invalid package.json {path}: {message}")]
    Package { path: PathBuf, message: String },

    /// A single declaration could not be resolved
    #[error("Failed to resolve {name}: {message}")]
    Resolution { name: String, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExtractError {
    /// Create a resolution error
    pub fn resolution(name: impl Into<String>, message: impl Into<String>) -> Self {
        ExtractError::Resolution {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a package.json error
    pub fn package(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ExtractError::Package {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Code used when the error is recorded as a diagnostic
    pub fn code(&self) -> &'static str {
        match self {
            ExtractError::Package { .. } => CODE_PACKAGE_JSON,
            _ => CODE_RESOLUTION_FAILED,
        }
    }
}

/// Why an entry file was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    NotFound,
    UnsupportedExtension,
}

impl InvalidReason {
    pub fn display(&self) -> &'static str {
        match self {
            InvalidReason::NotFound => "file not found",
            InvalidReason::UnsupportedExtension => "not a TypeScript file",
        }
    }
}

/// A rejected entry file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFile {
    pub path: PathBuf,
    pub reason: InvalidReason,
}

/// Every entry file that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid entry files: {}", describe_invalid(.files))]
pub struct FileValidationError {
    pub files: Vec<InvalidFile>,
}

fn describe_invalid(files: &[InvalidFile]) -> String {
    files
        .iter()
        .map(|f| format!("{} ({})", f.path.display(), f.reason.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticSeverity {
    /// Error - the affected declaration is degraded or missing
    Error,
    /// Warning - extraction continues unaffected
    Warning,
}

impl DiagnosticSeverity {
    /// Get display string
    pub fn display(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        }
    }

    /// Terminal color
    pub fn color(&self) -> termcolor::Color {
        match self {
            DiagnosticSeverity::Error => termcolor::Color::Red,
            DiagnosticSeverity::Warning => termcolor::Color::Yellow,
        }
    }
}

/// Where a diagnostic came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Syntax or semantic error reported for the target package
    CompilerDiagnostic,
    /// A declaration's types could not be resolved
    ResolutionFailure,
    /// Anything else, including panics
    Runtime,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::CompilerDiagnostic => "compiler-diagnostic",
            ErrorKind::ResolutionFailure => "resolution-failure",
            ErrorKind::Runtime => "runtime",
        }
    }
}

/// A diagnostic message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    /// Diagnostic code, `TS2307` for compiler diagnostics
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Line number (1-indexed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Column number (0-indexed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col: Option<usize>,
    /// What was being done when the problem occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(
        severity: DiagnosticSeverity,
        kind: ErrorKind,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            kind,
            code: code.into(),
            message: message.into(),
            file: None,
            line: None,
            col: None,
            context: None,
        }
    }

    /// Create an error diagnostic
    pub fn error(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, kind, code, message)
    }

    /// Create a warning diagnostic
    pub fn warning(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, kind, code, message)
    }

    /// Set the source file
    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Set the location
    pub fn at(mut self, line: usize, col: usize) -> Self {
        self.line = Some(line);
        self.col = Some(col);
        self
    }

    /// Set the context
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// `file:line:col`, or `None` without a file
    pub fn location(&self) -> Option<String> {
        let file = self.file.as_ref()?;
        let mut result = file.display().to_string();
        if let Some(line) = self.line {
            result.push(':');
            result.push_str(&line.to_string());
            if let Some(col) = self.col {
                result.push(':');
                result.push_str(&(col + 1).to_string());
            }
        }
        Some(result)
    }

    /// Human-readable hint keyed off the code
    pub fn suggestion(&self) -> Option<&'static str> {
        suggestion_for(&self.code)
    }

    /// Format the diagnostic for display
    pub fn format(&self) -> String {
        let mut result = String::new();

        if let Some(location) = self.location() {
            result.push_str(&location);
            result.push_str(": ");
        }

        result.push_str(self.severity.display());
        result.push('[');
        result.push_str(&self.code);
        result.push_str("]: ");
        result.push_str(&self.message);

        if let Some(ref context) = self.context {
            result.push_str(" (while ");
            result.push_str(context);
            result.push(')');
        }

        result
    }
}

impl From<&ProgramDiagnostic> for Diagnostic {
    /// Compiler diagnostics never abort extraction, so they arrive as warnings
    fn from(diagnostic: &ProgramDiagnostic) -> Self {
        let mut result = Diagnostic::warning(
            ErrorKind::CompilerDiagnostic,
            diagnostic.code_string(),
            diagnostic.message.clone(),
        );
        result.file = diagnostic.file.clone();
        result.line = diagnostic.line;
        result.col = diagnostic.col;
        result
    }
}

/// Suggestion text for a diagnostic code
pub fn suggestion_for(code: &str) -> Option<&'static str> {
    Some(match code {
        "TS1005" => "Fix the syntax error; declarations after it may be incomplete",
        "TS2300" => "Rename or remove one of the duplicate declarations",
        "TS2304" => "Declare or import the name; it is emitted as a plain string type",
        "TS2305" => "Check that the imported module actually exports this name",
        "TS2307" => "Install the package or its @types declarations, or check tsconfig paths",
        CODE_RESOLUTION_FAILED => {
            "The declaration was emitted with a textual type; simplify its type or report the shape"
        }
        CODE_INTERNAL_PANIC => "This is a bug in the extractor; the declaration was emitted degraded",
        CODE_TSCONFIG => "Fix the tsconfig.json; default compiler options were used",
        CODE_PACKAGE_JSON => "Fix package.json; metadata was derived from the directory name",
        _ => return None,
    })
}

/// Counts grouped by kind and by file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorSummary {
    pub errors: usize,
    pub warnings: usize,
    /// Entries not stored because the cap was reached
    pub dropped: usize,
    pub by_kind: IndexMap<String, usize>,
    pub by_file: IndexMap<String, usize>,
}

impl ErrorSummary {
    pub fn is_empty(&self) -> bool {
        self.errors == 0 && self.warnings == 0 && self.dropped == 0
    }
}

/// Everything recorded during one extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub summary: ErrorSummary,
}

impl ErrorReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Errors first, then warnings
    pub fn all(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().chain(self.warnings.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SuppressKey {
    code: String,
    file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DedupKey {
    code: String,
    message: String,
    location: Option<String>,
}

thread_local! {
    /// Set while a panic is expected to be caught and recorded
    static RECOVERING: Cell<bool> = const { Cell::new(false) };
}

static QUIET_PANIC_HOOK: Once = Once::new();

/// Restores the previous `RECOVERING` state on drop
struct RecoveringGuard {
    previous: bool,
}

impl Drop for RecoveringGuard {
    fn drop(&mut self) {
        RECOVERING.with(|flag| flag.set(self.previous));
    }
}

/// Run `operation`, catching a panic without the default hook printing it
///
/// Panics outside such a call still reach the previous hook.
pub(crate) fn catch_unwind_quiet<R>(operation: impl FnOnce() -> R) -> std::thread::Result<R> {
    QUIET_PANIC_HOOK.call_once(|| {
        let default_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            if !RECOVERING.with(Cell::get) {
                default_hook(panic_info);
            }
        }));
    });
    let _guard = RecoveringGuard {
        previous: RECOVERING.with(|flag| flag.replace(true)),
    };
    panic::catch_unwind(AssertUnwindSafe(operation))
}

/// Collects, deduplicates and classifies diagnostics for one run
#[derive(Debug)]
pub struct ErrorHandler {
    errors: RefCell<Vec<Diagnostic>>,
    warnings: RefCell<Vec<Diagnostic>>,
    suppressed: RefCell<HashSet<SuppressKey>>,
    seen: RefCell<HashSet<DedupKey>>,
    max_errors: usize,
    dropped: Cell<usize>,
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ERRORS)
    }
}

impl ErrorHandler {
    /// Create a handler keeping at most `max_errors` errors and as many warnings
    pub fn new(max_errors: usize) -> Self {
        Self {
            errors: RefCell::default(),
            warnings: RefCell::default(),
            suppressed: RefCell::default(),
            seen: RefCell::default(),
            max_errors,
            dropped: Cell::new(0),
        }
    }

    /// Record a diagnostic; returns false when it was suppressed, a
    /// duplicate, or over the cap
    pub fn record(&self, diagnostic: Diagnostic) -> bool {
        if self.is_suppressed(&diagnostic.code, diagnostic.file.as_deref()) {
            return false;
        }
        let key = DedupKey {
            code: diagnostic.code.clone(),
            message: diagnostic.message.clone(),
            location: diagnostic.location(),
        };
        if self.seen.borrow().contains(&key) {
            return false;
        }

        let list = match diagnostic.severity {
            DiagnosticSeverity::Error => &self.errors,
            DiagnosticSeverity::Warning => &self.warnings,
        };
        if list.borrow().len() >= self.max_errors {
            self.dropped.set(self.dropped.get() + 1);
            return false;
        }
        self.seen.borrow_mut().insert(key);
        debug!(code = %diagnostic.code, kind = diagnostic.kind.as_str(), "{}", diagnostic.message);
        list.borrow_mut().push(diagnostic);
        true
    }

    /// Forward a compiler diagnostic as a warning
    pub fn record_compiler(&self, diagnostic: &ProgramDiagnostic) -> bool {
        self.record(Diagnostic::from(diagnostic))
    }

    /// Ignore future diagnostics with `code`, everywhere or in one file
    pub fn suppress(&self, code: impl Into<String>, file: Option<&Path>) {
        self.suppressed.borrow_mut().insert(SuppressKey {
            code: code.into(),
            file: file.map(Path::to_path_buf),
        });
    }

    pub fn is_suppressed(&self, code: &str, file: Option<&Path>) -> bool {
        let suppressed = self.suppressed.borrow();
        let everywhere = SuppressKey {
            code: code.to_string(),
            file: None,
        };
        if suppressed.contains(&everywhere) {
            return true;
        }
        file.is_some_and(|file| {
            suppressed.contains(&SuppressKey {
                code: code.to_string(),
                file: Some(file.to_path_buf()),
            })
        })
    }

    /// Run `operation`; on an error or a panic, record it and return `fallback`
    pub fn run_with_fallback<T>(
        &self,
        context: &str,
        operation: impl FnOnce() -> ExtractResult<T>,
        fallback: T,
    ) -> T {
        match catch_unwind_quiet(operation) {
            Ok(Ok(value)) => value,
            Ok(Err(error)) => {
                warn!(context, error = %error, "Falling back");
                self.record(
                    Diagnostic::error(ErrorKind::ResolutionFailure, error.code(), error.to_string())
                        .with_context(context),
                );
                fallback
            }
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                warn!(context, panic = %message, "Recovered from panic");
                self.record(
                    Diagnostic::error(ErrorKind::Runtime, CODE_INTERNAL_PANIC, message)
                        .with_context(context),
                );
                fallback
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.borrow().is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.borrow().len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.borrow().len()
    }

    pub fn errors(&self) -> Vec<Diagnostic> {
        self.errors.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.warnings.borrow().clone()
    }

    /// Counts by kind and by file
    pub fn summarize(&self) -> ErrorSummary {
        let errors = self.errors.borrow();
        let warnings = self.warnings.borrow();
        let mut summary = ErrorSummary {
            errors: errors.len(),
            warnings: warnings.len(),
            dropped: self.dropped.get(),
            ..Default::default()
        };
        for diagnostic in errors.iter().chain(warnings.iter()) {
            *summary
                .by_kind
                .entry(diagnostic.kind.as_str().to_string())
                .or_default() += 1;
            let file = diagnostic
                .file
                .as_ref()
                .map(|f| f.display().to_string())
                .unwrap_or_else(|| "<unknown>".to_string());
            *summary.by_file.entry(file).or_default() += 1;
        }
        summary
    }

    /// Snapshot of everything recorded so far
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            errors: self.errors(),
            warnings: self.warnings(),
            summary: self.summarize(),
        }
    }

    /// Forget everything, suppressions included
    pub fn clear(&self) {
        self.errors.borrow_mut().clear();
        self.warnings.borrow_mut().clear();
        self.suppressed.borrow_mut().clear();
        self.seen.borrow_mut().clear();
        self.dropped.set(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openpkg_checker::error::CODE_CANNOT_FIND_MODULE;

    #[test]
    fn test_file_validation_lists_every_path() {
        let err = ExtractError::from(FileValidationError {
            files: vec![
                InvalidFile {
                    path: PathBuf::from("src/a.js"),
                    reason: InvalidReason::UnsupportedExtension,
                },
                InvalidFile {
                    path: PathBuf::from("src/missing.ts"),
                    reason: InvalidReason::NotFound,
                },
            ],
        });
        let message = err.to_string();
        assert!(message.contains("src/a.js (not a TypeScript file)"));
        assert!(message.contains("src/missing.ts (file not found)"));
    }

    #[test]
    fn test_diagnostic_format() {
        let diag = Diagnostic::error(ErrorKind::ResolutionFailure, CODE_RESOLUTION_FAILED, "boom")
            .in_file("src/index.ts")
            .at(10, 4)
            .with_context("resolving export Foo");

        assert_eq!(
            diag.format(),
            "src/index.ts:10:5: error[resolution-failed]: boom (while resolving export Foo)"
        );
        assert!(diag.suggestion().is_some());
    }

    #[test]
    fn test_compiler_diagnostics_become_warnings() {
        let source = ProgramDiagnostic::error(CODE_CANNOT_FIND_MODULE, "Cannot find module 'x'.")
            .in_file("/pkg/index.ts")
            .at(1, 0);
        let diag = Diagnostic::from(&source);
        assert_eq!(diag.severity, DiagnosticSeverity::Warning);
        assert_eq!(diag.kind, ErrorKind::CompilerDiagnostic);
        assert_eq!(diag.code, "TS2307");
        assert!(diag.suggestion().unwrap().contains("Install"));
    }

    #[test]
    fn test_record_deduplicates_and_suppresses() {
        let handler = ErrorHandler::default();
        let diag = Diagnostic::warning(ErrorKind::CompilerDiagnostic, "TS2304", "Cannot find name 'A'.")
            .in_file("/pkg/a.ts")
            .at(1, 0);
        assert!(handler.record(diag.clone()));
        assert!(!handler.record(diag));
        assert_eq!(handler.warning_count(), 1);

        handler.suppress("TS2304", Some(Path::new("/pkg/b.ts")));
        let other = Diagnostic::warning(ErrorKind::CompilerDiagnostic, "TS2304", "Cannot find name 'B'.")
            .in_file("/pkg/b.ts");
        assert!(!handler.record(other));

        handler.suppress("TS1005", None);
        let syntax = Diagnostic::warning(ErrorKind::CompilerDiagnostic, "TS1005", "';' expected.")
            .in_file("/pkg/c.ts");
        assert!(!handler.record(syntax));
        assert_eq!(handler.warning_count(), 1);
    }

    #[test]
    fn test_cap_drops_extra_entries() {
        let handler = ErrorHandler::new(2);
        for i in 0..5 {
            handler.record(Diagnostic::error(
                ErrorKind::Runtime,
                "x",
                format!("error {}", i),
            ));
        }
        assert_eq!(handler.error_count(), 2);
        assert_eq!(handler.summarize().dropped, 3);
        assert_eq!(handler.seen.borrow().len(), 2);

        // A repeat of a kept entry is a duplicate, not a drop
        assert!(!handler.record(Diagnostic::error(ErrorKind::Runtime, "x", "error 0")));
        assert_eq!(handler.summarize().dropped, 3);
    }

    #[test]
    fn test_quiet_catch_restores_state() {
        let outer = catch_unwind_quiet(|| {
            assert!(RECOVERING.with(Cell::get));
            let inner = catch_unwind_quiet(|| panic!("inner"));
            assert!(inner.is_err());
            assert!(RECOVERING.with(Cell::get));
            5
        });
        assert_eq!(outer.unwrap(), 5);
        assert!(!RECOVERING.with(Cell::get));
    }

    #[test]
    fn test_run_with_fallback_on_error() {
        let handler = ErrorHandler::default();
        let value = handler.run_with_fallback(
            "resolving export Broken",
            || Err(ExtractError::resolution("Broken", "no declaration")),
            "fallback",
        );
        assert_eq!(value, "fallback");
        let errors = handler.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::ResolutionFailure);
        assert_eq!(errors[0].context.as_deref(), Some("resolving export Broken"));
    }

    #[test]
    fn test_run_with_fallback_on_panic() {
        let handler = ErrorHandler::default();
        let value: u32 = handler.run_with_fallback("resolving export Boom", || panic!("exploded"), 7);
        assert_eq!(value, 7);
        let errors = handler.errors();
        assert_eq!(errors[0].kind, ErrorKind::Runtime);
        assert_eq!(errors[0].code, CODE_INTERNAL_PANIC);
        assert_eq!(errors[0].message, "exploded");

        assert_eq!(handler.run_with_fallback("ok", || Ok(1), 0), 1);
    }

    #[test]
    fn test_summarize_groups_by_kind_and_file() {
        let handler = ErrorHandler::default();
        handler.record(
            Diagnostic::warning(ErrorKind::CompilerDiagnostic, "TS2307", "a").in_file("/pkg/a.ts"),
        );
        handler.record(
            Diagnostic::warning(ErrorKind::CompilerDiagnostic, "TS2304", "b").in_file("/pkg/a.ts"),
        );
        handler.record(Diagnostic::error(ErrorKind::ResolutionFailure, CODE_RESOLUTION_FAILED, "c"));

        let summary = handler.summarize();
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.warnings, 2);
        assert_eq!(summary.by_kind["compiler-diagnostic"], 2);
        assert_eq!(summary.by_kind["resolution-failure"], 1);
        assert_eq!(summary.by_file["/pkg/a.ts"], 2);
        assert_eq!(summary.by_file["<unknown>"], 1);

        handler.clear();
        assert!(handler.summarize().is_empty());
    }
}
