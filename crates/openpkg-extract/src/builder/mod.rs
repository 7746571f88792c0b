//! Builder API for openpkg-extract
//!
//! This module provides a builder over `ExtractOptions` for programmatic
//! callers that want to configure one extraction run fluently.

mod extractor;

pub use extractor::Extractor;
