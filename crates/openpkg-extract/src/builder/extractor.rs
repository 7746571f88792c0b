//! Extractor - fluent configuration of one extraction run

use crate::cache::CacheConfig;
use crate::diagnostics::ExtractResult;
use crate::extract::{extract, extract_with_host, ExtractOptions, Extraction};
use openpkg_checker::{CompilerOptions, ProgramHost};
use std::path::PathBuf;

/// Builder for configuring an extraction
///
/// # Example
///
/// ```no_run
/// use openpkg_extract::Extractor;
///
/// let extraction = Extractor::new("src/index.ts")
///     .max_depth(6)
///     .include_resolved_types(true)
///     .run()
///     .expect("Failed to extract");
/// println!("{}", extraction.document.to_json_pretty().unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Extractor {
    /// Entry file of the package
    pub entry: PathBuf,
    /// Options the run is configured with
    pub options: ExtractOptions,
}

impl Extractor {
    /// Create a builder for an entry file with default options
    pub fn new(entry: impl Into<PathBuf>) -> Self {
        Self {
            entry: entry.into(),
            options: ExtractOptions::default(),
        }
    }

    /// Include `expandedType` and `resolvedProperties` on type entries
    pub fn include_resolved_types(mut self, enable: bool) -> Self {
        self.options.include_resolved_types = enable;
        self
    }

    /// Include inheritance trees on class and interface entries
    pub fn include_type_hierarchy(mut self, enable: bool) -> Self {
        self.options.include_type_hierarchy = enable;
        self
    }

    /// Set the depth at which resolved types are truncated
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = depth;
        self
    }

    /// Print every diagnostic from `Extraction::print_report`
    pub fn verbose(mut self, enable: bool) -> Self {
        self.options.verbose = enable;
        self
    }

    /// Resolve every top-level declaration before assembling
    pub fn warm_cache(mut self, enable: bool) -> Self {
        self.options.warm_cache = enable;
        self
    }

    /// Use these compiler options instead of looking for a tsconfig.json
    pub fn compiler_options(mut self, options: CompilerOptions) -> Self {
        self.options.compiler_options = Some(options);
        self
    }

    /// Read metadata from this package.json
    pub fn package_json(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.package_json = Some(path.into());
        self
    }

    /// Set the type cache configuration
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.options.cache = config;
        self
    }

    /// Run against the file system
    pub fn run(&self) -> ExtractResult<Extraction> {
        extract(&self.entry, &self.options)
    }

    /// Run reading files through `host`
    pub fn run_with_host(&self, host: impl ProgramHost + 'static) -> ExtractResult<Extraction> {
        extract_with_host(&self.entry, &self.options, host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openpkg_checker::MemoryHost;

    #[test]
    fn test_builder_sets_options() {
        let extractor = Extractor::new("src/index.ts")
            .max_depth(6)
            .include_resolved_types(false)
            .include_type_hierarchy(true)
            .verbose(true)
            .cache(CacheConfig::disabled())
            .package_json("package.json");

        assert_eq!(extractor.entry, PathBuf::from("src/index.ts"));
        assert_eq!(extractor.options.max_depth, 6);
        assert!(!extractor.options.include_resolved_types);
        assert!(extractor.options.include_type_hierarchy);
        assert!(extractor.options.verbose);
        assert!(!extractor.options.cache.enabled);
        assert_eq!(
            extractor.options.package_json,
            Some(PathBuf::from("package.json"))
        );
    }

    #[test]
    fn test_run_with_host() {
        let host = MemoryHost::new().with_file(
            "/pkg/index.ts",
            "export interface Point { x: number; y: number }",
        );
        let extraction = Extractor::new("/pkg/index.ts")
            .compiler_options(CompilerOptions::default())
            .include_type_hierarchy(true)
            .run_with_host(host)
            .unwrap();
        let point = extraction.document.type_by_id("Point").unwrap();
        assert!(point.hierarchy.is_some());
        assert_eq!(point.properties.len(), 2);
    }
}
