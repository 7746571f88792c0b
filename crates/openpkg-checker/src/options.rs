//! Compiler options and tsconfig.json discovery
//!
//! Defaults target the latest language level with Node-style module
//! resolution. A `tsconfig.json` found by walking up from the entry file
//! is layered on top of the defaults.

use crate::error::{CheckerError, CheckerResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Name of the config file looked up while walking up directories
pub const TSCONFIG_FILE_NAME: &str = "tsconfig.json";

/// Module resolution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModuleResolutionKind {
    Classic,
    #[default]
    Node,
    Node16,
    NodeNext,
    Bundler,
}

impl ModuleResolutionKind {
    /// Parse a `moduleResolution` value, ignoring case
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "classic" => Some(Self::Classic),
            "node" | "node10" => Some(Self::Node),
            "node16" => Some(Self::Node16),
            "nodenext" => Some(Self::NodeNext),
            "bundler" => Some(Self::Bundler),
            _ => None,
        }
    }
}

/// The subset of compiler options the checker understands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    pub target: String,
    pub module: String,
    pub module_resolution: ModuleResolutionKind,
    pub strict: bool,
    pub declaration: bool,
    /// Absolute base directory for non-relative imports
    pub base_url: Option<PathBuf>,
    /// Path alias patterns; targets are stored as absolute paths
    pub paths: IndexMap<String, Vec<String>>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            target: "ESNext".to_string(),
            module: "ESNext".to_string(),
            module_resolution: ModuleResolutionKind::Node,
            strict: true,
            declaration: false,
            base_url: None,
            paths: IndexMap::new(),
        }
    }
}

impl CompilerOptions {
    /// Defaults overlaid with the nearest tsconfig.json above `entry`
    pub fn discover(entry: &Path) -> CheckerResult<(Self, Option<PathBuf>)> {
        let start = entry.parent().unwrap_or(entry);
        match find_tsconfig(start) {
            Some(config) => {
                debug!(path = %config.display(), "Using tsconfig");
                let options = Self::from_tsconfig(&config)?;
                Ok((options, Some(config)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    /// Load options from a tsconfig file, following one level of `extends`
    pub fn from_tsconfig(path: &Path) -> CheckerResult<Self> {
        let mut options = Self::default();
        let config = read_jsonc(path)?;

        if let Some(Value::String(extends)) = config.get("extends") {
            if extends.starts_with('.') {
                let base_dir = path.parent().unwrap_or(Path::new("/"));
                let mut base = normalize_path(&base_dir.join(extends));
                if base.extension().is_none() {
                    base.set_extension("json");
                }
                match read_jsonc(&base) {
                    Ok(base_config) => options.apply(&base_config, &base)?,
                    Err(e) => debug!(path = %base.display(), error = %e, "Skipping tsconfig extends"),
                }
            }
        }

        options.apply(&config, path)?;
        Ok(options)
    }

    /// Overlay the `compilerOptions` of one config file
    fn apply(&mut self, config: &Value, config_path: &Path) -> CheckerResult<()> {
        let Some(compiler_options) = config.get("compilerOptions") else {
            return Ok(());
        };
        let Some(map) = compiler_options.as_object() else {
            return Err(CheckerError::config(
                config_path,
                "compilerOptions must be an object",
            ));
        };
        let config_dir = config_path.parent().unwrap_or(Path::new("/"));

        if let Some(target) = map.get("target").and_then(Value::as_str) {
            self.target = target.to_string();
        }
        if let Some(module) = map.get("module").and_then(Value::as_str) {
            self.module = module.to_string();
        }
        if let Some(kind) = map.get("moduleResolution").and_then(Value::as_str) {
            match ModuleResolutionKind::parse(kind) {
                Some(kind) => self.module_resolution = kind,
                None => debug!(value = %kind, "Unknown moduleResolution, keeping default"),
            }
        }
        if let Some(strict) = map.get("strict").and_then(Value::as_bool) {
            self.strict = strict;
        }
        if let Some(declaration) = map.get("declaration").and_then(Value::as_bool) {
            self.declaration = declaration;
        }
        if let Some(base_url) = map.get("baseUrl").and_then(Value::as_str) {
            self.base_url = Some(normalize_path(&config_dir.join(base_url)));
        }
        if let Some(paths) = map.get("paths").and_then(Value::as_object) {
            let base = self
                .base_url
                .clone()
                .unwrap_or_else(|| config_dir.to_path_buf());
            self.paths.clear();
            for (pattern, targets) in paths {
                let targets = targets
                    .as_array()
                    .map(|list| {
                        list.iter()
                            .filter_map(Value::as_str)
                            .map(|t| normalize_path(&base.join(t)).to_string_lossy().into_owned())
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default();
                self.paths.insert(pattern.clone(), targets);
            }
        }
        Ok(())
    }
}

/// Walk up from `start` looking for tsconfig.json
pub fn find_tsconfig(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(TSCONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

fn read_jsonc(path: &Path) -> CheckerResult<Value> {
    let text = std::fs::read_to_string(path).map_err(|e| CheckerError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&strip_jsonc(&text))
        .map_err(|e| CheckerError::config(path, e.to_string()))
}

/// Remove comments and trailing commas so serde_json can read tsconfig files
pub fn strip_jsonc(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    let mut in_string = false;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '\\' && i + 1 < chars.len() {
                out.push(chars[i + 1]);
                i += 2;
                continue;
            }
            if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
            }
            ',' => {
                let mut j = i + 1;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                if !matches!(chars.get(j), Some('}') | Some(']')) {
                    out.push(c);
                }
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Collapse `.` and `..` components without touching the filesystem
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
