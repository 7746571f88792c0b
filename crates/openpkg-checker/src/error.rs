//! Error types and program diagnostics

use std::path::PathBuf;
use thiserror::Error;

/// Result type for checker operations
pub type CheckerResult<T> = Result<T, CheckerError>;

/// Fatal errors raised while building a program
#[derive(Debug, Error)]
pub enum CheckerError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A file could not be read
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// TypeScript parse error
    #[error("Parse error in {file}: {message}")]
    Parse { file: PathBuf, message: String },

    /// A path could not be turned into a module specifier
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A tsconfig file could not be read or understood
    #[error("Invalid tsconfig {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// No root file could be loaded
    #[error("Program has no loadable root files")]
    EmptyProgram,

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CheckerError {
    /// Create a parse error
    pub fn parse(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        CheckerError::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        CheckerError::Config {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Diagnostic category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Error,
    Warning,
}

/// A compiler diagnostic with a TypeScript-style numeric code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramDiagnostic {
    /// Numeric code, printed as `TS<code>`
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: String,
    pub file: Option<PathBuf>,
    /// 1-indexed line
    pub line: Option<usize>,
    /// 0-indexed column
    pub col: Option<usize>,
}

/// `';' expected.` and other syntax errors
pub const CODE_SYNTAX: u32 = 1005;
/// `Cannot find name 'X'.`
pub const CODE_CANNOT_FIND_NAME: u32 = 2304;
/// `Cannot find module 'x' or its corresponding type declarations.`
pub const CODE_CANNOT_FIND_MODULE: u32 = 2307;
/// `Duplicate identifier 'X'.`
pub const CODE_DUPLICATE_IDENTIFIER: u32 = 2300;
/// `Module has no exported member 'X'.`
pub const CODE_NO_EXPORTED_MEMBER: u32 = 2305;

impl ProgramDiagnostic {
    /// Create an error diagnostic
    pub fn error(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            category: DiagnosticCategory::Error,
            message: message.into(),
            file: None,
            line: None,
            col: None,
        }
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

    /// Code formatted as `TS2307`
    pub fn code_string(&self) -> String {
        format!("TS{}", self.code)
    }

    /// Format the diagnostic for display
    pub fn format(&self) -> String {
        let mut result = String::new();
        if let Some(ref file) = self.file {
            result.push_str(&file.display().to_string());
            if let (Some(line), Some(col)) = (self.line, self.col) {
                result.push_str(&format!(":{}:{}", line, col + 1));
            }
            result.push_str(" - ");
        }
        result.push_str(&format!("{}: {}", self.code_string(), self.message));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checker_error_display() {
        let err = CheckerError::parse("/tmp/a.ts", "unexpected token");
        assert!(err.to_string().contains("/tmp/a.ts"));
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_diagnostic_format() {
        let diag = ProgramDiagnostic::error(CODE_CANNOT_FIND_NAME, "Cannot find name 'Foo'.")
            .in_file("/tmp/a.ts")
            .at(3, 4);
        assert_eq!(diag.code_string(), "TS2304");
        assert_eq!(diag.format(), "/tmp/a.ts:3:5 - TS2304: Cannot find name 'Foo'.");
    }
}
