//! Module resolution
//!
//! Resolves import and re-export specifiers to files, enumerates module
//! exports, and scans files for their import and re-export forms.
//! Resolutions are cached per session by `(from_file, specifier)`.

use deno_ast::swc::ast as swc_ast;
use indexmap::IndexMap;
use openpkg_checker::resolve::{is_bare_specifier, resolve_module_name};
use openpkg_checker::source::{module_export_name, wtf8_to_string};
use openpkg_checker::{Checker, ProgramHost, SymbolId};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::trace;

/// How a name is imported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportKind {
    /// `import a from "m"`
    Default,
    /// `import { a as b } from "m"`
    Named,
    /// `import * as ns from "m"`
    Namespace,
    /// `import "m"`
    SideEffect,
}

/// One imported binding, or one side-effect import
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportInfo {
    pub specifier: String,
    pub kind: ImportKind,
    /// Local binding name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<String>,
    /// Name exported by the source module, for named imports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported: Option<String>,
    pub type_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<PathBuf>,
}

/// Where a re-exported name comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReExport {
    /// Name in the source module, `*` for `export * as ns`
    pub original_name: String,
    pub from_module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<PathBuf>,
}

/// Per-session module resolution cache
#[derive(Debug, Default)]
pub struct ModuleCache {
    resolutions: RefCell<HashMap<(PathBuf, String), Option<PathBuf>>>,
}

impl ModuleCache {
    pub fn len(&self) -> usize {
        self.resolutions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolutions.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.resolutions.borrow_mut().clear();
    }
}

/// Module queries over one session
pub struct ModuleResolver<'s> {
    checker: &'s Checker,
    host: &'s dyn ProgramHost,
    cache: &'s ModuleCache,
}

impl<'s> ModuleResolver<'s> {
    pub fn new(checker: &'s Checker, host: &'s dyn ProgramHost, cache: &'s ModuleCache) -> Self {
        Self {
            checker,
            host,
            cache,
        }
    }

    /// File `specifier` refers to when imported from `from_file`
    ///
    /// Resolutions recorded while building the program win; other
    /// specifiers go through the same resolution algorithm against the host.
    pub fn resolve_module(&self, specifier: &str, from_file: &Path) -> Option<PathBuf> {
        let key = (from_file.to_path_buf(), specifier.to_string());
        if let Some(cached) = self.cache.resolutions.borrow().get(&key) {
            return cached.clone();
        }

        let program = self.checker.program();
        let from_program = program
            .file_by_path(from_file)
            .and_then(|file| program.resolved_module(file.id, specifier))
            .map(|id| program.file(id).path.clone());
        let resolved = from_program.or_else(|| {
            resolve_module_name(specifier, from_file, program.options(), self.host)
                .map(|resolved| resolved.path)
        });

        trace!(
            specifier,
            from = %from_file.display(),
            resolved = ?resolved,
            "Resolved module"
        );
        self.cache.resolutions.borrow_mut().insert(key, resolved.clone());
        resolved
    }

    /// Exports of a file by name, `export *` included; empty for files
    /// outside the program
    pub fn get_module_exports(&self, file: &Path) -> IndexMap<String, SymbolId> {
        match self.checker.program().file_by_path(file) {
            Some(source) => {
                let module = self.checker.file_symbol(source.id);
                (*self.checker.module_exports(module)).clone()
            }
            None => IndexMap::new(),
        }
    }

    /// Names a file re-exports through `export { ... } from "..."`
    pub fn resolve_re_exports(&self, file: &Path) -> IndexMap<String, ReExport> {
        let mut re_exports = IndexMap::new();
        let Some(source) = self.checker.program().file_by_path(file) else {
            return re_exports;
        };

        for item in &source.items {
            let swc_ast::ModuleItem::ModuleDecl(swc_ast::ModuleDecl::ExportNamed(named)) = item
            else {
                continue;
            };
            let Some(src) = &named.src else {
                continue;
            };
            let from_module = wtf8_to_string(src);
            let resolved = self.resolve_module(&from_module, &source.path);

            for specifier in &named.specifiers {
                let (exported, original_name) = match specifier {
                    swc_ast::ExportSpecifier::Named(n) => {
                        let original = module_export_name(&n.orig);
                        let exported = n
                            .exported
                            .as_ref()
                            .map(module_export_name)
                            .unwrap_or_else(|| original.clone());
                        (exported, original)
                    }
                    swc_ast::ExportSpecifier::Namespace(ns) => {
                        (module_export_name(&ns.name), "*".to_string())
                    }
                    swc_ast::ExportSpecifier::Default(d) => {
                        (d.exported.sym.to_string(), "default".to_string())
                    }
                };
                re_exports.insert(
                    exported,
                    ReExport {
                        original_name,
                        from_module: from_module.clone(),
                        resolved: resolved.clone(),
                    },
                );
            }
        }
        re_exports
    }

    /// Every import of a file in source order
    pub fn get_file_imports(&self, file: &Path) -> Vec<ImportInfo> {
        let mut imports = Vec::new();
        let Some(source) = self.checker.program().file_by_path(file) else {
            return imports;
        };

        for item in &source.items {
            let swc_ast::ModuleItem::ModuleDecl(swc_ast::ModuleDecl::Import(import)) = item else {
                continue;
            };
            let specifier = wtf8_to_string(&import.src);
            let resolved = self.resolve_module(&specifier, &source.path);

            if import.specifiers.is_empty() {
                imports.push(ImportInfo {
                    specifier,
                    kind: ImportKind::SideEffect,
                    local: None,
                    imported: None,
                    type_only: import.type_only,
                    resolved,
                });
                continue;
            }

            for spec in &import.specifiers {
                let (kind, local, imported, type_only) = match spec {
                    swc_ast::ImportSpecifier::Default(d) => {
                        (ImportKind::Default, d.local.sym.to_string(), None, false)
                    }
                    swc_ast::ImportSpecifier::Namespace(ns) => {
                        (ImportKind::Namespace, ns.local.sym.to_string(), None, false)
                    }
                    swc_ast::ImportSpecifier::Named(n) => {
                        let local = n.local.sym.to_string();
                        let imported = n
                            .imported
                            .as_ref()
                            .map(module_export_name)
                            .unwrap_or_else(|| local.clone());
                        (ImportKind::Named, local, Some(imported), n.is_type_only)
                    }
                };
                imports.push(ImportInfo {
                    specifier: specifier.clone(),
                    kind,
                    local: Some(local),
                    imported,
                    type_only: import.type_only || type_only,
                    resolved: resolved.clone(),
                });
            }
        }
        imports
    }

    /// True for package specifiers, false for `./x` and `/x`
    pub fn is_external_specifier(&self, specifier: &str) -> bool {
        is_external_specifier(specifier)
    }

    /// Number of cached resolutions
    pub fn cached_resolutions(&self) -> usize {
        self.cache.len()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

/// True for package specifiers, false for `./x` and `/x`
pub fn is_external_specifier(specifier: &str) -> bool {
    is_bare_specifier(specifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::session;
    use pretty_assertions::assert_eq;

    fn fixture() -> crate::session::Session {
        session(&[
            (
                "/pkg/src/index.ts",
                r#"import Client, { Options as ClientOptions, type Retry } from './client';
import * as util from './util';
import './polyfill';
export { Client, util };
export { Options, Retry as RetryPolicy } from './client';
export * as helpers from './util';
export { default as Logger } from 'logger';
"#,
            ),
            (
                "/pkg/src/client.ts",
                "export interface Options { url: string }\nexport type Retry = number;\nexport default class Client {}",
            ),
            ("/pkg/src/util.ts", "export const VERSION = '1.0';"),
            ("/pkg/src/polyfill.ts", "export {};"),
        ])
    }

    #[test]
    fn test_resolve_module_is_cached() {
        let session = fixture();
        let modules = session.modules();
        let from = Path::new("/pkg/src/index.ts");

        assert_eq!(
            modules.resolve_module("./client", from),
            Some(PathBuf::from("/pkg/src/client.ts"))
        );
        assert_eq!(modules.resolve_module("logger", from), None);
        assert_eq!(modules.cached_resolutions(), 2);

        modules.resolve_module("./client", from);
        assert_eq!(modules.cached_resolutions(), 2);

        modules.clear();
        assert_eq!(modules.cached_resolutions(), 0);
    }

    #[test]
    fn test_resolve_module_outside_program_uses_host() {
        let session = fixture();
        // Never imported by the program, but present on the host
        assert_eq!(
            session
                .modules()
                .resolve_module("./polyfill", Path::new("/pkg/src/util.ts")),
            Some(PathBuf::from("/pkg/src/polyfill.ts"))
        );
    }

    #[test]
    fn test_file_imports() {
        let session = fixture();
        let imports = session
            .modules()
            .get_file_imports(Path::new("/pkg/src/index.ts"));

        let summary: Vec<(ImportKind, Option<&str>, Option<&str>, bool)> = imports
            .iter()
            .map(|i| (i.kind, i.local.as_deref(), i.imported.as_deref(), i.type_only))
            .collect();
        assert_eq!(
            summary,
            vec![
                (ImportKind::Default, Some("Client"), None, false),
                (ImportKind::Named, Some("ClientOptions"), Some("Options"), false),
                (ImportKind::Named, Some("Retry"), Some("Retry"), true),
                (ImportKind::Namespace, Some("util"), None, false),
                (ImportKind::SideEffect, None, None, false),
            ]
        );
        assert_eq!(imports[0].resolved, Some(PathBuf::from("/pkg/src/client.ts")));
    }

    #[test]
    fn test_re_exports() {
        let session = fixture();
        let re_exports = session
            .modules()
            .resolve_re_exports(Path::new("/pkg/src/index.ts"));

        assert_eq!(
            re_exports.keys().collect::<Vec<_>>(),
            vec!["Options", "RetryPolicy", "helpers", "Logger"]
        );
        assert_eq!(re_exports["RetryPolicy"].original_name, "Retry");
        assert_eq!(re_exports["helpers"].original_name, "*");
        assert_eq!(re_exports["Logger"].from_module, "logger");
        assert_eq!(re_exports["Logger"].resolved, None);
    }

    #[test]
    fn test_module_exports() {
        let session = fixture();
        let exports = session
            .modules()
            .get_module_exports(Path::new("/pkg/src/client.ts"));
        assert_eq!(
            exports.keys().collect::<Vec<_>>(),
            vec!["Options", "Retry", "default"]
        );
        assert!(session
            .modules()
            .get_module_exports(Path::new("/elsewhere.ts"))
            .is_empty());
    }

    #[test]
    fn test_external_specifiers() {
        assert!(is_external_specifier("lodash"));
        assert!(is_external_specifier("@scope/pkg/sub"));
        assert!(!is_external_specifier("./local"));
        assert!(!is_external_specifier("../up"));
        assert!(!is_external_specifier("/abs/path"));
    }
}
