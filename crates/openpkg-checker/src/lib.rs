//! openpkg-checker: declaration-level TypeScript type checker
//!
//! This crate builds a program from a set of entry files and answers type
//! queries over it:
//! - Parsing TypeScript sources with deno_ast/SWC
//! - Resolving relative imports, `tsconfig.json` paths and bundled lib types
//! - Binding declarations into symbols with merged declarations
//! - Evaluating type syntax into interned types (generics, mapped and
//!   conditional types, `infer`, `keyof`, indexed access)
//! - Inferring types of initializers and function bodies
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ entry files  │───▶│   Program    │───▶│ SymbolTable  │
//! │ + tsconfig   │    │ (parse/load) │    │   (binder)   │
//! └──────────────┘    └──────────────┘    └──────┬───────┘
//!                                                ▼
//!                                         ┌──────────────┐
//!                                         │   Checker    │
//!                                         │ (type arena) │
//!                                         └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use openpkg_checker::{Checker, CompilerOptions, Program};
//!
//! let program = Program::new(&["src/index.ts".into()], CompilerOptions::default())
//!     .expect("Failed to load program");
//! let checker = Checker::new(program);
//! for diagnostic in checker.diagnostics() {
//!     eprintln!("{}", diagnostic.format());
//! }
//! ```

pub mod binder;
pub mod checker;
pub mod error;
pub mod options;
pub mod program;
pub mod resolve;
pub mod source;
pub mod types;

pub use binder::{DeclKind, Declaration, Symbol, SymbolFlags, SymbolId, SymbolTable};
pub use checker::{Checker, Intrinsics, MAX_EVALUATION_DEPTH};
pub use error::{CheckerError, CheckerResult, DiagnosticCategory, ProgramDiagnostic};
pub use options::CompilerOptions;
pub use program::{FileId, Program, SourceFile};
pub use resolve::{MemoryHost, OsHost, ProgramHost};
pub use types::*;
