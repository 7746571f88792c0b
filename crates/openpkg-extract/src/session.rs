//! Type-checking session
//!
//! A `Session` is built once per extraction run. It validates the entry
//! files, discovers compiler options, builds the checker, and owns every
//! piece of mutable state of the run: the type cache, the module
//! resolution cache and the error handler.

use crate::cache::{CacheConfig, TypeCache};
use crate::diagnostics::{
    Diagnostic, ErrorHandler, ErrorKind, ExtractError, ExtractResult, FileValidationError,
    InvalidFile, InvalidReason, CODE_TSCONFIG,
};
use crate::modules::{ModuleCache, ModuleResolver};
use openpkg_checker::program::absolutize;
use openpkg_checker::resolve::has_ts_extension;
use openpkg_checker::{Checker, CompilerOptions, OsHost, Program, ProgramHost, SourceFile};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use tracing::{debug, debug_span, warn};

/// One extraction run's checker plus its caches and diagnostics
pub struct Session {
    checker: Checker,
    host: Box<dyn ProgramHost>,
    entry_files: Vec<PathBuf>,
    tsconfig: Option<PathBuf>,
    errors: ErrorHandler,
    cache: TypeCache,
    module_cache: ModuleCache,
    /// Checker diagnostics already handed to the error handler
    forwarded: Cell<usize>,
}

impl Session {
    /// Build a session over files on disk
    ///
    /// Without explicit `options`, the nearest `tsconfig.json` above the
    /// first entry file is merged over the defaults.
    pub fn new(entry_files: &[PathBuf], options: Option<CompilerOptions>) -> ExtractResult<Self> {
        Self::with_host(entry_files, options, OsHost, CacheConfig::default())
    }

    /// Build a session reading files through `host`
    pub fn with_host(
        entry_files: &[PathBuf],
        options: Option<CompilerOptions>,
        host: impl ProgramHost + 'static,
        cache: CacheConfig,
    ) -> ExtractResult<Self> {
        let _span = debug_span!("session", entries = entry_files.len()).entered();

        let entry_files = validate_entry_files(entry_files, &host)?;
        let errors = ErrorHandler::default();

        let (options, tsconfig) = match options {
            Some(options) => (options, None),
            None => match CompilerOptions::discover(&entry_files[0]) {
                Ok(found) => found,
                Err(e) => {
                    warn!(error = %e, "Ignoring unreadable tsconfig");
                    errors.record(Diagnostic::warning(
                        ErrorKind::CompilerDiagnostic,
                        CODE_TSCONFIG,
                        e.to_string(),
                    ));
                    (CompilerOptions::default(), None)
                }
            },
        };
        if let Some(path) = &tsconfig {
            debug!(tsconfig = %path.display(), "Discovered compiler options");
        }

        let program = Program::with_host(&entry_files, options, &host)?;
        let checker = Checker::new(program);

        let cache = TypeCache::new(cache);
        for file in checker.program().user_files() {
            cache.track_file(&file.path, file.module.source_text());
        }

        let session = Self {
            checker,
            host: Box::new(host),
            entry_files,
            tsconfig,
            errors,
            cache,
            module_cache: ModuleCache::default(),
            forwarded: Cell::new(0),
        };
        let forwarded = session.forward_diagnostics();
        debug!(
            files = session.checker.program().files().len(),
            diagnostics = forwarded,
            "Created session"
        );
        Ok(session)
    }

    pub fn checker(&self) -> &Checker {
        &self.checker
    }

    pub fn host(&self) -> &dyn ProgramHost {
        self.host.as_ref()
    }

    /// Validated, absolute entry files
    pub fn entry_files(&self) -> &[PathBuf] {
        &self.entry_files
    }

    /// The tsconfig.json the compiler options came from
    pub fn tsconfig(&self) -> Option<&Path> {
        self.tsconfig.as_deref()
    }

    pub fn source_file(&self, path: &Path) -> Option<&SourceFile> {
        self.checker.program().file_by_path(path)
    }

    /// Every loaded file except the embedded standard library
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.checker.program().files().iter().filter(|f| !f.is_lib)
    }

    pub fn errors(&self) -> &ErrorHandler {
        &self.errors
    }

    pub fn cache(&self) -> &TypeCache {
        &self.cache
    }

    pub fn modules(&self) -> ModuleResolver<'_> {
        ModuleResolver::new(&self.checker, self.host.as_ref(), &self.module_cache)
    }

    /// Hand checker diagnostics not yet seen to the error handler as
    /// warnings; returns how many were new
    pub fn forward_diagnostics(&self) -> usize {
        let diagnostics = self.checker.diagnostics();
        let already = self.forwarded.get();
        let mut count = 0;
        for diagnostic in diagnostics.iter().skip(already) {
            let in_package = diagnostic
                .file
                .as_deref()
                .and_then(|path| self.checker.program().file_by_path(path))
                .map_or(true, SourceFile::is_user_file);
            if in_package && self.errors.record_compiler(diagnostic) {
                count += 1;
            }
        }
        self.forwarded.set(diagnostics.len());
        count
    }

    /// Re-hash the package files and drop the cached resolutions of every
    /// file that changed since the session was built; returns those files
    ///
    /// The checker keeps the program it was built with, so a changed file
    /// is re-resolved from the original text until a new session is made.
    pub fn refresh(&self) -> Vec<PathBuf> {
        let changed = self.cache.check_files(self.host.as_ref());
        if !changed.is_empty() {
            warn!(changed = changed.len(), "Package files changed during the session");
        }
        changed
    }

    /// Clear the type and module caches between runs
    pub fn clear_caches(&self) {
        self.cache.clear();
        self.module_cache.clear();
    }
}

/// Check every entry file, collecting all failures before reporting
fn validate_entry_files(
    entry_files: &[PathBuf],
    host: &dyn ProgramHost,
) -> ExtractResult<Vec<PathBuf>> {
    if entry_files.is_empty() {
        return Err(ExtractError::NoEntryFiles);
    }

    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    for file in entry_files {
        let path = absolutize(file);
        if !host.file_exists(&path) {
            invalid.push(InvalidFile {
                path: file.clone(),
                reason: InvalidReason::NotFound,
            });
        } else if !has_ts_extension(&path) {
            invalid.push(InvalidFile {
                path: file.clone(),
                reason: InvalidReason::UnsupportedExtension,
            });
        } else {
            valid.push(path);
        }
    }

    if !invalid.is_empty() {
        return Err(FileValidationError { files: invalid }.into());
    }
    Ok(valid)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use openpkg_checker::MemoryHost;

    /// Session over in-memory files; the first file is the entry
    pub fn session(files: &[(&str, &str)]) -> Session {
        let mut host = MemoryHost::new();
        for (path, text) in files {
            host.insert(*path, *text);
        }
        Session::with_host(
            &[PathBuf::from(files[0].0)],
            Some(CompilerOptions::default()),
            host,
            CacheConfig::default(),
        )
        .unwrap()
    }

    /// Session over a single `/pkg/index.ts`
    pub fn session_for(source: &str) -> Session {
        session(&[("/pkg/index.ts", source)])
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::resolver::{CheckerTypeResolver, DEFAULT_MAX_DEPTH};
    use openpkg_checker::MemoryHost;

    #[test]
    fn test_validation_reports_every_bad_path() {
        let host = MemoryHost::new()
            .with_file("/pkg/index.ts", "export {}")
            .with_file("/pkg/main.js", "export {}");
        let result = Session::with_host(
            &[
                PathBuf::from("/pkg/index.ts"),
                PathBuf::from("/pkg/main.js"),
                PathBuf::from("/pkg/missing.ts"),
            ],
            Some(CompilerOptions::default()),
            host,
            CacheConfig::default(),
        );

        match result {
            Err(ExtractError::FileValidation(err)) => {
                assert_eq!(
                    err.files,
                    vec![
                        InvalidFile {
                            path: PathBuf::from("/pkg/main.js"),
                            reason: InvalidReason::UnsupportedExtension,
                        },
                        InvalidFile {
                            path: PathBuf::from("/pkg/missing.ts"),
                            reason: InvalidReason::NotFound,
                        },
                    ]
                );
            }
            Err(other) => panic!("expected validation error, got {}", other),
            Ok(_) => panic!("expected validation error"),
        }
    }

    #[test]
    fn test_no_entry_files() {
        let result = Session::with_host(&[], None, MemoryHost::new(), CacheConfig::default());
        assert!(matches!(result, Err(ExtractError::NoEntryFiles)));
    }

    #[test]
    fn test_declaration_files_are_accepted() {
        let host = MemoryHost::new().with_file("/pkg/index.d.ts", "export declare const a: string;");
        let session = Session::with_host(
            &[PathBuf::from("/pkg/index.d.ts")],
            Some(CompilerOptions::default()),
            host,
            CacheConfig::default(),
        )
        .unwrap();
        assert!(session.source_file(Path::new("/pkg/index.d.ts")).is_some());
    }

    #[test]
    fn test_files_follow_imports() {
        let session = session(&[
            ("/pkg/index.ts", "export * from './user';"),
            ("/pkg/user.ts", "export interface User { id: string }"),
        ]);
        let paths: Vec<_> = session.files().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("/pkg/index.ts"), PathBuf::from("/pkg/user.ts")]
        );
        assert_eq!(session.entry_files(), &[PathBuf::from("/pkg/index.ts")]);
    }

    #[test]
    fn test_compiler_diagnostics_are_forwarded_as_warnings() {
        let session = session_for("import { x } from './missing';\nexport const y = 1;");
        let warnings = session.errors().warnings();
        assert!(warnings
            .iter()
            .any(|w| w.code == "TS2307" && w.kind == ErrorKind::CompilerDiagnostic));
        assert!(!session.errors().has_errors());

        // Nothing new to forward the second time
        assert_eq!(session.forward_diagnostics(), 0);
    }

    #[test]
    fn test_refresh_invalidates_changed_files() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let entry = temp_dir.path().join("index.ts");
        std::fs::write(&entry, "export interface A { x: string }").unwrap();
        let session = Session::with_host(
            &[entry.clone()],
            Some(CompilerOptions::default()),
            OsHost,
            CacheConfig::default(),
        )
        .unwrap();

        let checker = session.checker();
        let root = checker.program().root_files()[0];
        let a = checker.module_exports(checker.file_symbol(root))["A"];
        let resolver = CheckerTypeResolver::new(&session, DEFAULT_MAX_DEPTH);
        resolver.resolve_declaration(a);
        resolver.resolve_declaration(a);
        assert_eq!(session.cache().stats().hits, 1);
        assert!(session.refresh().is_empty());

        std::fs::write(&entry, "export interface A { x: number }").unwrap();
        assert_eq!(session.refresh(), vec![entry.clone()]);
        let stats = session.cache().stats();
        assert_eq!(stats.node_entries, 0);
        assert!(stats.invalidations > 0);

        resolver.resolve_declaration(a);
        assert_eq!(session.cache().stats().misses, 2);
        assert!(session.refresh().is_empty());
    }

    #[test]
    fn test_clear_caches() {
        let session = session_for("export interface A { x: string }");
        assert!(session
            .modules()
            .resolve_module("./missing", Path::new("/pkg/index.ts"))
            .is_none());
        session.clear_caches();
        assert_eq!(session.cache().stats().hits, 0);
        assert_eq!(session.modules().cached_resolutions(), 0);
    }
}
