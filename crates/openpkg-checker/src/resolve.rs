//! Module resolution
//!
//! Resolves import specifiers to files the way Node-style TypeScript
//! resolution does: relative paths, `paths` aliases, `baseUrl`, then
//! `node_modules` packages (declaration files only).

use crate::options::{normalize_path, CompilerOptions};
use indexmap::IndexMap;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// File system access used while building a program
pub trait ProgramHost {
    fn read_file(&self, path: &Path) -> std::io::Result<String>;
    fn file_exists(&self, path: &Path) -> bool;
    fn dir_exists(&self, path: &Path) -> bool;
}

/// Host backed by the real file system
#[derive(Debug, Default, Clone, Copy)]
pub struct OsHost;

impl ProgramHost for OsHost {
    fn read_file(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// In-memory host, mostly for tests
#[derive(Debug, Default, Clone)]
pub struct MemoryHost {
    files: IndexMap<PathBuf, String>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file and return the host
    pub fn with_file(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }
}

impl ProgramHost for MemoryHost {
    fn read_file(&self, path: &Path) -> std::io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, path.display().to_string())
        })
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn dir_exists(&self, path: &Path) -> bool {
        self.files.keys().any(|f| f.starts_with(path) && f != path)
    }
}

/// Result of resolving one specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    pub path: PathBuf,
    /// Resolved through node_modules
    pub is_external: bool,
}

/// Extensions probed for extensionless specifiers, in priority order
const TS_EXTENSIONS: &[&str] = &["ts", "tsx", "d.ts", "mts", "d.mts", "cts", "d.cts"];

/// True for specifiers that name a package rather than a path
pub fn is_bare_specifier(specifier: &str) -> bool {
    !(specifier.starts_with('.') || specifier.starts_with('/'))
}

/// True when the path has a TypeScript source or declaration extension
pub fn has_ts_extension(path: &Path) -> bool {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    [".ts", ".tsx", ".mts", ".cts"].iter().any(|ext| name.ends_with(ext))
}

/// True for `.d.ts`, `.d.mts` and `.d.cts` files
pub fn is_declaration_file(path: &Path) -> bool {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    [".d.ts", ".d.mts", ".d.cts"].iter().any(|ext| name.ends_with(ext))
}

/// Resolve `specifier` imported from `containing_file`
pub fn resolve_module_name(
    specifier: &str,
    containing_file: &Path,
    options: &CompilerOptions,
    host: &dyn ProgramHost,
) -> Option<ResolvedModule> {
    let containing_dir = containing_file.parent().unwrap_or(Path::new("/"));

    if !is_bare_specifier(specifier) {
        let candidate = normalize_path(&containing_dir.join(specifier));
        return try_file_or_directory(&candidate, host).map(|path| ResolvedModule {
            path,
            is_external: false,
        });
    }

    if let Some(path) = try_path_aliases(specifier, options, host) {
        return Some(ResolvedModule {
            path,
            is_external: false,
        });
    }

    if let Some(base_url) = &options.base_url {
        let candidate = normalize_path(&base_url.join(specifier));
        if let Some(path) = try_file_or_directory(&candidate, host) {
            return Some(ResolvedModule {
                path,
                is_external: false,
            });
        }
    }

    try_node_modules(specifier, containing_dir, host).map(|path| ResolvedModule {
        path,
        is_external: true,
    })
}

fn try_path_aliases(
    specifier: &str,
    options: &CompilerOptions,
    host: &dyn ProgramHost,
) -> Option<PathBuf> {
    for (pattern, targets) in &options.paths {
        let captured = match pattern.split_once('*') {
            Some((prefix, suffix)) => {
                if specifier.len() >= prefix.len() + suffix.len()
                    && specifier.starts_with(prefix)
                    && specifier.ends_with(suffix)
                {
                    &specifier[prefix.len()..specifier.len() - suffix.len()]
                } else {
                    continue;
                }
            }
            None if pattern == specifier => "",
            None => continue,
        };

        for target in targets {
            let substituted = target.replacen('*', captured, 1);
            if let Some(path) = try_file_or_directory(&normalize_path(Path::new(&substituted)), host)
            {
                return Some(path);
            }
        }
    }
    None
}

fn try_node_modules(specifier: &str, from_dir: &Path, host: &dyn ProgramHost) -> Option<PathBuf> {
    let (package, subpath) = split_package_name(specifier);
    let types_package = types_package_name(package);

    let mut dir = Some(from_dir);
    while let Some(current) = dir {
        let node_modules = current.join("node_modules");
        if host.dir_exists(&node_modules) {
            for name in [package.to_string(), types_package.clone()] {
                let package_dir = node_modules.join(&name);
                if !host.dir_exists(&package_dir) {
                    continue;
                }
                let found = if subpath.is_empty() {
                    try_package_entry(&package_dir, host)
                } else {
                    try_file_or_directory(&package_dir.join(subpath), host)
                };
                if found.is_some() {
                    return found;
                }
            }
        }
        dir = current.parent();
    }
    None
}

/// `@scope/pkg/sub/path` -> (`@scope/pkg`, `sub/path`)
fn split_package_name(specifier: &str) -> (&str, &str) {
    let mut slashes = specifier.match_indices('/');
    let split_at = if specifier.starts_with('@') {
        slashes.nth(1)
    } else {
        slashes.next()
    };
    match split_at {
        Some((idx, _)) => (&specifier[..idx], &specifier[idx + 1..]),
        None => (specifier, ""),
    }
}

/// `@scope/pkg` -> `@types/scope__pkg`
fn types_package_name(package: &str) -> String {
    match package.strip_prefix('@') {
        Some(scoped) => format!("@types/{}", scoped.replacen('/', "__", 1)),
        None => format!("@types/{}", package),
    }
}

fn try_package_entry(package_dir: &Path, host: &dyn ProgramHost) -> Option<PathBuf> {
    let manifest = package_dir.join("package.json");
    if host.file_exists(&manifest) {
        if let Ok(text) = host.read_file(&manifest) {
            if let Ok(json) = serde_json::from_str::<Value>(&text) {
                for field in ["types", "typings"] {
                    if let Some(entry) = json.get(field).and_then(Value::as_str) {
                        let candidate = normalize_path(&package_dir.join(entry));
                        if let Some(path) = try_file_or_directory(&candidate, host) {
                            return Some(path);
                        }
                    }
                }
            }
        }
    }
    try_index(package_dir, host)
}

fn try_file_or_directory(candidate: &Path, host: &dyn ProgramHost) -> Option<PathBuf> {
    try_file(candidate, host).or_else(|| {
        if host.dir_exists(candidate) {
            try_index(candidate, host)
        } else {
            None
        }
    })
}

fn try_index(dir: &Path, host: &dyn ProgramHost) -> Option<PathBuf> {
    TS_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("index.{}", ext)))
        .find(|p| host.file_exists(p))
}

fn try_file(candidate: &Path, host: &dyn ProgramHost) -> Option<PathBuf> {
    let text = candidate.to_string_lossy();

    if has_ts_extension(candidate) && host.file_exists(candidate) {
        return Some(candidate.to_path_buf());
    }

    // `./util.js` in TypeScript sources refers to `./util.ts`
    let js_mappings: &[(&str, &[&str])] = &[
        (".js", &["ts", "tsx", "d.ts"]),
        (".jsx", &["tsx", "ts", "d.ts"]),
        (".mjs", &["mts", "d.mts"]),
        (".cjs", &["cts", "d.cts"]),
    ];
    for (js_ext, replacements) in js_mappings {
        if let Some(stem) = text.strip_suffix(js_ext) {
            return replacements
                .iter()
                .map(|ext| PathBuf::from(format!("{}.{}", stem, ext)))
                .find(|p| host.file_exists(p));
        }
    }

    TS_EXTENSIONS
        .iter()
        .map(|ext| PathBuf::from(format!("{}.{}", text, ext)))
        .find(|p| host.file_exists(p))
}
