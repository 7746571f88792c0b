//! openpkg-extract: OpenPkg specification extractor for TypeScript packages
//!
//! This crate turns the public surface of a TypeScript package into an
//! OpenPkg document by:
//! - Building a type-checking session over the package's entry file
//! - Following re-exports to canonical declarations and their JSDoc
//! - Resolving every exported type into a bounded, cycle-safe tree
//! - Emitting `exports[]` and `types[]` with `$ref`s between them
//! - Recording compiler diagnostics and resolution failures instead of
//!   aborting the run
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐
//! │ index.ts        │    │ package.json     │
//! │ (+ tsconfig)    │    │ (meta)           │
//! └────────┬────────┘    └────────┬─────────┘
//!          ▼                      │
//!   ┌─────────────┐               │
//!   │   Session   │               │
//!   │ checker +   │               │
//!   │ caches      │               │
//!   └──────┬──────┘               │
//!          ▼                      ▼
//!   ┌─────────────┐    ┌──────────────────┐
//!   │  resolver   │───▶│  SpecAssembler   │───▶ SpecDocument
//!   │  schemas    │    │ (three passes)   │     + ErrorReport
//!   └─────────────┘    └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use openpkg_extract::{extract, ExtractOptions};
//!
//! let extraction = extract("src/index.ts", &ExtractOptions::default())
//!     .expect("Failed to extract");
//! extraction.print_report();
//! println!("{}", extraction.document.to_json_pretty().unwrap());
//! ```

// Session and its state
pub mod cache;
pub mod diagnostics;
pub mod modules;
pub mod session;

// Documentation and symbols
pub mod js_doc;
pub mod symbols;

// Type resolution
pub mod expansion;
pub mod resolver;
pub mod schema;

// Document assembly
pub mod assembly;
pub mod package;

// Entry points and output
pub mod builder;
pub mod extract;
pub mod printer;

// Re-exports for convenience
pub use assembly::{AssemblyOptions, SpecAssembler};
pub use builder::Extractor;
pub use cache::{CacheConfig, TypeCache};
pub use diagnostics::{
    Diagnostic, DiagnosticSeverity, ErrorHandler, ErrorKind, ErrorReport, ExtractError,
    ExtractResult,
};
pub use extract::{extract, extract_with_host, ExtractOptions, Extraction};
pub use js_doc::JsDocInfo;
pub use package::PackageMeta;
pub use printer::ReportPrinter;
pub use resolver::{CheckerTypeResolver, TypeResolver, DEFAULT_MAX_DEPTH};
pub use session::Session;
pub use symbols::SymbolResolver;

pub use openpkg_spec as spec;
