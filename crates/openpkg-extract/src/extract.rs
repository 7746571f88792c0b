//! Extraction entry point
//!
//! `extract` builds a session over one entry file, reads the package
//! metadata, assembles the document and hands back whatever diagnostics
//! were recorded along the way. Only input validation and session
//! construction fail the call; everything else degrades.

use crate::assembly::{AssemblyOptions, SpecAssembler};
use crate::cache::CacheConfig;
use crate::diagnostics::{Diagnostic, ErrorKind, ErrorReport, ExtractResult, CODE_PACKAGE_JSON};
use crate::package::PackageMeta;
use crate::printer::ReportPrinter;
use crate::resolver::DEFAULT_MAX_DEPTH;
use crate::session::Session;
use openpkg_checker::{CompilerOptions, OsHost, ProgramHost};
use openpkg_spec::{SpecDocument, SpecMeta};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, debug_span, warn};

/// Extraction options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractOptions {
    /// Attach `expandedType` and `resolvedProperties` to type entries
    pub include_resolved_types: bool,
    /// Attach inheritance trees to class and interface entries
    pub include_type_hierarchy: bool,
    /// Depth at which resolved type trees are truncated
    pub max_depth: usize,
    /// Print every diagnostic instead of the counts only
    pub verbose: bool,
    /// Resolve every top-level declaration before assembling
    pub warm_cache: bool,
    /// Replaces tsconfig.json discovery
    pub compiler_options: Option<CompilerOptions>,
    /// package.json to read instead of the nearest one
    pub package_json: Option<PathBuf>,
    #[serde(skip)]
    pub cache: CacheConfig,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_resolved_types: true,
            include_type_hierarchy: false,
            max_depth: DEFAULT_MAX_DEPTH,
            verbose: false,
            warm_cache: false,
            compiler_options: None,
            package_json: None,
            cache: CacheConfig::default(),
        }
    }
}

impl ExtractOptions {
    fn assembly(&self) -> AssemblyOptions {
        AssemblyOptions {
            include_resolved_types: self.include_resolved_types,
            include_type_hierarchy: self.include_type_hierarchy,
            max_depth: self.max_depth,
        }
    }
}

/// A finished document plus the diagnostics recorded while building it
#[derive(Debug)]
pub struct Extraction {
    pub document: SpecDocument,
    pub report: ErrorReport,
    verbose: bool,
}

impl Extraction {
    /// Print the report to stderr; every entry when verbose, else the counts
    pub fn print_report(&self) {
        ReportPrinter::new(&self.report, self.verbose, true).print_to_stderr();
    }

    pub fn to_json_pretty(&self) -> ExtractResult<String> {
        Ok(self.document.to_json_pretty()?)
    }
}

/// Extract the document of the package `entry` belongs to
pub fn extract(entry: impl AsRef<Path>, options: &ExtractOptions) -> ExtractResult<Extraction> {
    extract_with_host(entry.as_ref(), options, OsHost)
}

/// Extract reading every file through `host`
pub fn extract_with_host(
    entry: &Path,
    options: &ExtractOptions,
    host: impl ProgramHost + 'static,
) -> ExtractResult<Extraction> {
    let _span = debug_span!("extract", entry = %entry.display()).entered();

    let session = Session::with_host(
        &[entry.to_path_buf()],
        options.compiler_options.clone(),
        host,
        options.cache,
    )?;
    let entry = session.entry_files()[0].clone();

    let package_json = options
        .package_json
        .clone()
        .or_else(|| PackageMeta::find_package_json(&entry, session.host()));
    let package_root = package_json
        .as_deref()
        .and_then(Path::parent)
        .or_else(|| entry.parent())
        .map(Path::to_path_buf);
    let meta = read_meta(&session, package_json.as_deref(), package_root.as_deref());

    let assembler = SpecAssembler::new(&session, options.assembly(), package_root);
    if options.warm_cache {
        let resolved = assembler.resolver().warm_up(session.entry_files());
        debug!(resolved, "Warmed type cache");
    }
    let document = assembler.assemble(meta);

    session.forward_diagnostics();
    let report = session.errors().report();
    debug!(
        exports = document.exports.len(),
        types = document.types.len(),
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "Extraction finished"
    );
    Ok(Extraction {
        document,
        report,
        verbose: options.verbose,
    })
}

/// Header from package.json; a missing or broken file falls back to the
/// directory name
fn read_meta(session: &Session, package_json: Option<&Path>, root: Option<&Path>) -> SpecMeta {
    let fallback = root
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "package".to_string());

    let Some(path) = package_json else {
        debug!("No package.json found");
        return SpecMeta::named(fallback);
    };
    match PackageMeta::load(path, session.host()) {
        Ok(package) => package.into_meta(&fallback),
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable package.json");
            session.errors().record(
                Diagnostic::warning(ErrorKind::Runtime, CODE_PACKAGE_JSON, e.to_string())
                    .in_file(path),
            );
            SpecMeta::named(fallback)
        }
    }
}
