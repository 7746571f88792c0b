//! Spec assembly
//!
//! Walks the exports of the entry files and builds the document in three
//! passes:
//!
//! 1. Every exported class, interface, alias and enum is registered under
//!    its export name, so forward references become `$ref`s.
//! 2. Each export is turned into its `exports[]` entry, plus a `types[]`
//!    entry for declarations that define a shape. A failing export is
//!    recorded and emitted in degraded, text-only form.
//! 3. Types referenced but never exported are materialized until nothing
//!    is pending, so no `$ref` dangles.

mod class;
mod r#enum;
mod function;
mod interface;
mod namespace;
mod type_alias;
mod variable;

use crate::diagnostics::{catch_unwind_quiet, ExtractError, ExtractResult};
use crate::js_doc::JsDocInfo;
use crate::resolver::{declaration_type, CheckerTypeResolver, DEFAULT_MAX_DEPTH};
use crate::schema::{is_package_type, SchemaBuilder, TypeRegistry};
use crate::session::Session;
use crate::symbols::SymbolResolver;
use indexmap::IndexMap;
use openpkg_checker::{Checker, Signature, SymbolFlags, SymbolId, TypeId};
use openpkg_spec::{
    ExportKind, SpecDocument, SpecExport, SpecMeta, SpecType, SpecTypeParameter, TypeSchema,
};
use std::path::PathBuf;
use tracing::{debug, debug_span, trace};

/// What the walk includes beyond the basic entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyOptions {
    /// Attach `expandedType` and `resolvedProperties` to type entries
    pub include_resolved_types: bool,
    /// Attach inheritance trees to class and interface entries
    pub include_type_hierarchy: bool,
    pub max_depth: usize,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            include_resolved_types: true,
            include_type_hierarchy: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Entries one export contributes
pub(crate) struct Entries {
    pub export: SpecExport,
    /// Type entry and the symbol it describes
    pub definition: Option<(SymbolId, SpecType)>,
}

impl Entries {
    fn export(export: SpecExport) -> Self {
        Self {
            export,
            definition: None,
        }
    }

    fn with_definition(export: SpecExport, symbol: SymbolId, ty: SpecType) -> Self {
        Self {
            export,
            definition: Some((symbol, ty)),
        }
    }
}

/// Builds a document from a session
pub struct SpecAssembler<'s> {
    session: &'s Session,
    resolver: CheckerTypeResolver<'s>,
    symbols: SymbolResolver<'s>,
    registry: TypeRegistry,
    options: AssemblyOptions,
    /// Source locations are made relative to this directory
    package_root: Option<PathBuf>,
    #[cfg(test)]
    fail_on: Option<String>,
}

impl<'s> SpecAssembler<'s> {
    pub fn new(session: &'s Session, options: AssemblyOptions, package_root: Option<PathBuf>) -> Self {
        Self {
            session,
            resolver: CheckerTypeResolver::new(session, options.max_depth),
            symbols: SymbolResolver::new(session),
            registry: TypeRegistry::new(),
            options,
            package_root,
            #[cfg(test)]
            fail_on: None,
        }
    }

    pub fn resolver(&self) -> &CheckerTypeResolver<'s> {
        &self.resolver
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    fn checker(&self) -> &'s Checker {
        self.session.checker()
    }

    fn schemas(&self) -> SchemaBuilder<'_> {
        SchemaBuilder::new(self.checker(), &self.registry)
    }

    /// Exports of every entry file in order; the first file wins a name
    pub fn collect_exports(&self) -> IndexMap<String, SymbolId> {
        let checker = self.checker();
        let mut exports = IndexMap::new();
        for path in self.session.entry_files() {
            let Some(file) = self.session.source_file(path) else {
                continue;
            };
            for (name, symbol) in checker.module_exports(checker.file_symbol(file.id)).iter() {
                exports.entry(name.clone()).or_insert(*symbol);
            }
        }
        exports
    }

    /// Run all three passes
    pub fn assemble(&self, meta: SpecMeta) -> SpecDocument {
        let _span = debug_span!("assemble", package = %meta.name).entered();
        self.session.refresh();
        let exports = self.collect_exports();
        self.register_types(&exports);

        let mut document = SpecDocument::new(meta);
        for (name, symbol) in &exports {
            let entries = self.entries_or_degraded(name, *symbol);
            document.exports.push(entries.export);
            if let Some((symbol, ty)) = entries.definition {
                // One entry per symbol, however many names export it
                if self.registry.mark_materialized(symbol) {
                    document.types.push(ty);
                }
            }
        }

        let referenced = self.materialize_referenced(&mut document);
        debug!(
            exports = document.exports.len(),
            types = document.types.len(),
            referenced,
            "Assembled document"
        );
        document
    }

    /// Pass one: reserve ids for exported type declarations
    fn register_types(&self, exports: &IndexMap<String, SymbolId>) {
        let checker = self.checker();
        for (name, symbol) in exports {
            let Some(target) = checker.resolve_alias(*symbol) else {
                continue;
            };
            if !is_package_type(checker, target) {
                continue;
            }
            let id_name = if name == "default" {
                checker.symbol(target).name.as_str()
            } else {
                name.as_str()
            };
            self.registry.register(target, id_name);
        }
        trace!(registered = self.registry.len(), "Registered exported types");
    }

    fn entries_or_degraded(&self, name: &str, symbol: SymbolId) -> Entries {
        let context = format!("export '{}'", name);
        self.session
            .errors()
            .run_with_fallback(&context, || self.export_entries(name, symbol).map(Some), None)
            .unwrap_or_else(|| self.degraded(name, symbol))
    }

    /// Pass two for one export
    fn export_entries(&self, name: &str, symbol: SymbolId) -> ExtractResult<Entries> {
        #[cfg(test)]
        if self.fail_on.as_deref() == Some(name) {
            panic!("injected failure in {}", name);
        }

        let checker = self.checker();
        let Some(target) = self.symbols.resolve_symbol(symbol) else {
            return Ok(Entries::export(self.unresolved_export(name, symbol)));
        };
        let flags = checker.symbol(target).flags;

        if flags.contains(SymbolFlags::MODULE) {
            return Ok(self.module_entries(name, symbol, target));
        }
        let entries = if flags.contains(SymbolFlags::CLASS) {
            self.class_entries(name, target)
        } else if flags.contains(SymbolFlags::INTERFACE) {
            self.interface_entries(name, target)
        } else if flags.contains(SymbolFlags::ENUM) {
            self.enum_entries(name, target)
        } else if flags.contains(SymbolFlags::TYPE_ALIAS) {
            self.type_alias_entries(name, target)
        } else if flags.contains(SymbolFlags::FUNCTION) {
            self.function_entries(name, target)
        } else if flags.contains(SymbolFlags::VARIABLE) {
            self.variable_entries(name, target)
        } else if flags.contains(SymbolFlags::NAMESPACE) {
            Ok(self.namespace_entries(name, target))
        } else {
            Err(ExtractError::resolution(name, "unsupported declaration"))
        };

        // Namespaces merged into a function, class or enum
        let mut entries = entries?;
        if flags.contains(SymbolFlags::NAMESPACE) && entries.export.kind != ExportKind::Namespace {
            let members = self.export_members(&checker.symbol(target).exports);
            entries.export.members.extend(members);
        }
        Ok(entries)
    }

    /// Pass three: materialize pending references; returns how many
    fn materialize_referenced(&self, document: &mut SpecDocument) -> usize {
        let checker = self.checker();
        let mut count = 0;
        loop {
            let pending = self.registry.pending();
            if pending.is_empty() {
                break;
            }
            for (symbol, id) in pending {
                // Marked first so a failing type is not retried forever
                self.registry.mark_materialized(symbol);
                let name = &checker.symbol(symbol).name;
                trace!(name = %name, id = %id, "Materializing referenced type");

                let context = format!("referenced type '{}'", name);
                let ty = self
                    .session
                    .errors()
                    .run_with_fallback(&context, || self.definition(symbol).map(Some), None)
                    .unwrap_or_else(|| self.degraded_type(symbol));
                document.types.push(ty);
                count += 1;
            }
        }
        count
    }

    /// The `types[]` entry of a type declaration
    fn definition(&self, symbol: SymbolId) -> ExtractResult<SpecType> {
        let sym = self.checker().symbol(symbol);
        if sym.flags.contains(SymbolFlags::CLASS) {
            self.class_type(symbol)
        } else if sym.flags.contains(SymbolFlags::INTERFACE) {
            Ok(self.interface_type(symbol))
        } else if sym.flags.contains(SymbolFlags::ENUM) {
            Ok(self.enum_type(symbol))
        } else if sym.flags.contains(SymbolFlags::TYPE_ALIAS) {
            Ok(self.type_alias_type(symbol))
        } else {
            Err(ExtractError::resolution(&sym.name, "not a type declaration"))
        }
    }

    /// Export entry with documentation, source and common flags filled in
    fn new_export(&self, name: &str, symbol: SymbolId, kind: ExportKind) -> SpecExport {
        let checker = self.checker();
        let doc = self.symbols.extract_documentation(symbol);
        let mut export = SpecExport::new(name, name, kind);
        export.description = doc.description.clone();
        export.examples = doc.examples.clone();
        export.tags = doc.spec_tags();
        export.source = self
            .symbols
            .source_location(symbol, self.package_root.as_deref());
        if doc.deprecated {
            export.flags.insert("deprecated".to_string(), true);
        }
        if name == "default" || checker.symbol(symbol).flags.contains(SymbolFlags::DEFAULT_EXPORT) {
            export.flags.insert("defaultExport".to_string(), true);
        }
        if self.symbols.is_declaration_merge(symbol) {
            export.flags.insert("declarationMerge".to_string(), true);
        }
        if kind.defines_type() {
            if let Some(id) = self.registry.id_of(symbol) {
                export.ty = Some(TypeSchema::reference(&id));
            }
        }
        export
    }

    /// Type entry with id, documentation and source filled in
    ///
    /// Types are named after their declaration, whatever name exports them.
    fn new_type(&self, symbol: SymbolId, kind: ExportKind) -> SpecType {
        let doc = self.symbols.extract_documentation(symbol);
        let name = &self.checker().symbol(symbol).name;
        let id = self.registry.register(symbol, name);
        let mut ty = SpecType::new(id, name.as_str(), kind);
        ty.description = doc.description.clone();
        ty.tags = doc.spec_tags();
        ty.source = self
            .symbols
            .source_location(symbol, self.package_root.as_deref());
        if doc.deprecated {
            ty.flags.insert("deprecated".to_string(), true);
        }
        ty
    }

    /// Type parameters of a generic class, interface or alias
    fn type_parameters(&self, symbol: SymbolId) -> Vec<SpecTypeParameter> {
        let schemas = self.schemas();
        self.checker()
            .type_parameters_of(symbol)
            .iter()
            .map(|tp| schemas.type_parameter(*tp))
            .collect()
    }

    /// Docs of one signature, falling back to `fallback`
    fn signature_doc(&self, signature: &Signature, fallback: &JsDocInfo) -> JsDocInfo {
        let own = self
            .symbols
            .documentation_for_member(signature.declaration.as_ref());
        if own.is_empty() {
            fallback.clone()
        } else {
            own
        }
    }

    /// Text of a type, or the symbol's name when even printing fails
    fn type_text(&self, symbol: SymbolId) -> String {
        let checker = self.checker();
        catch_unwind_quiet(|| checker.type_to_string(declaration_type(checker, symbol)))
            .unwrap_or_else(|_| checker.symbol(symbol).name.clone())
    }

    /// Text-only entries for an export whose resolution failed
    fn degraded(&self, name: &str, symbol: SymbolId) -> Entries {
        let checker = self.checker();
        let target = checker.resolve_alias(symbol).unwrap_or(symbol);
        let kind = export_kind(checker.symbol(target).flags);
        let text = self.type_text(target);

        let mut export = SpecExport::new(name, name, kind);
        export.ty = Some(TypeSchema::named(text));
        export.flags.insert("degraded".to_string(), true);

        match self.registry.id_of(target) {
            Some(_) => {
                let ty = self.degraded_type(target);
                Entries::with_definition(export, target, ty)
            }
            None => Entries::export(export),
        }
    }

    fn degraded_type(&self, symbol: SymbolId) -> SpecType {
        let sym = self.checker().symbol(symbol);
        let kind = export_kind(sym.flags);
        let id = self.registry.register(symbol, &sym.name);
        let mut ty = SpecType::new(id, sym.name.as_str(), kind);
        ty.ty = Some(self.type_text(symbol));
        ty.flags.insert("degraded".to_string(), true);
        ty
    }

    #[cfg(test)]
    fn fail_on(mut self, name: &str) -> Self {
        self.fail_on = Some(name.to_string());
        self
    }
}

/// Kind of entry a symbol produces
pub fn export_kind(flags: SymbolFlags) -> ExportKind {
    if flags.contains(SymbolFlags::MODULE) {
        ExportKind::Module
    } else if flags.contains(SymbolFlags::CLASS) {
        ExportKind::Class
    } else if flags.contains(SymbolFlags::INTERFACE) {
        ExportKind::Interface
    } else if flags.contains(SymbolFlags::ENUM) {
        ExportKind::Enum
    } else if flags.contains(SymbolFlags::TYPE_ALIAS) {
        ExportKind::Type
    } else if flags.contains(SymbolFlags::FUNCTION) {
        ExportKind::Function
    } else if flags.contains(SymbolFlags::VARIABLE) {
        ExportKind::Variable
    } else if flags.contains(SymbolFlags::NAMESPACE) {
        ExportKind::Namespace
    } else {
        ExportKind::Reference
    }
}

/// Type an index signature is keyed by, as written in member names
fn index_key_name(checker: &Checker, parameter: &str, key: TypeId) -> String {
    format!("[{}: {}]", parameter, checker.type_to_string(key))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::session::test_support::session_for;

    /// Document of a single `/pkg/index.ts`
    pub fn assemble_source(source: &str) -> SpecDocument {
        assemble_with(source, AssemblyOptions::default())
    }

    pub fn assemble_with(source: &str, options: AssemblyOptions) -> SpecDocument {
        let session = session_for(source);
        SpecAssembler::new(&session, options, Some(PathBuf::from("/pkg")))
            .assemble(SpecMeta::named("fixture"))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::diagnostics::ErrorKind;
    use crate::session::test_support::{session, session_for};
    use openpkg_spec::{dangling_refs, SourceLocation};
    use pretty_assertions::assert_eq;

    fn export_names(document: &SpecDocument) -> Vec<&str> {
        document.exports.iter().map(|e| e.name.as_str()).collect()
    }

    fn type_names(document: &SpecDocument) -> Vec<&str> {
        document.types.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_exports_follow_module_order() {
        let document = assemble_source(
            r#"
export const VERSION = "1.0";
export function start(): void {}
export interface Options { verbose: boolean }
export class Service {}
export enum Level { Low, High }
export type Id = string;
"#,
        );
        assert_eq!(
            export_names(&document),
            vec!["VERSION", "start", "Options", "Service", "Level", "Id"]
        );
        let kinds: Vec<ExportKind> = document.exports.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ExportKind::Variable,
                ExportKind::Function,
                ExportKind::Interface,
                ExportKind::Class,
                ExportKind::Enum,
                ExportKind::Type,
            ]
        );
        assert_eq!(type_names(&document), vec!["Options", "Service", "Level", "Id"]);
        assert_eq!(
            document.export("Options").unwrap().ty,
            Some(TypeSchema::reference("Options"))
        );
    }

    #[test]
    fn test_referenced_types_are_materialized() {
        let document = assemble_source(
            r#"
interface Deeper { level: number }
interface Hidden { deeper: Deeper }
/** Reads a value. */
export function read(input: Hidden): Result { return { ok: true }; }
type Result = { ok: boolean };
"#,
        );
        assert_eq!(export_names(&document), vec!["read"]);
        assert_eq!(type_names(&document), vec!["Hidden", "Result", "Deeper"]);
        assert_eq!(dangling_refs(&document).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_forward_references_use_export_ids() {
        let document = assemble_source(
            r#"
export function make(): Widget { return { size: 1 }; }
export interface Widget { size: number }
"#,
        );
        let make = document.export("make").unwrap();
        let returns = make.signatures[0].returns.as_ref().unwrap();
        assert_eq!(returns.schema, TypeSchema::reference("Widget"));
        assert_eq!(type_names(&document), vec!["Widget"]);
    }

    #[test]
    fn test_one_type_entry_per_symbol() {
        let document = assemble_source(
            r#"
interface User { id: string }
export { User, User as Person };
"#,
        );
        assert_eq!(export_names(&document), vec!["User", "Person"]);
        assert_eq!(document.types.len(), 1);
        assert_eq!(
            document.export("Person").unwrap().ty,
            Some(TypeSchema::reference("User"))
        );
    }

    #[test]
    fn test_unresolved_re_exports_become_references() {
        let document = assemble_source(
            r#"
export { debounce } from "lodash";
export * as fs from "node:fs";
"#,
        );
        let debounce = document.export("debounce").unwrap();
        assert_eq!(debounce.kind, ExportKind::Reference);
        assert_eq!(debounce.from_module.as_deref(), Some("lodash"));
        assert!(debounce.flag("external"));

        let fs = document.export("fs").unwrap();
        assert_eq!(fs.kind, ExportKind::Module);
        assert_eq!(fs.from_module.as_deref(), Some("node:fs"));
    }

    #[test]
    fn test_default_export_expression() {
        let document = assemble_source("export default { retries: 3 };");
        let default = document.export("default").unwrap();
        assert_eq!(default.kind, ExportKind::Variable);
        assert!(default.flag("defaultExport"));
    }

    #[test]
    fn test_deprecation_and_source() {
        let document = assemble_source(
            r#"
/**
 * Old entry point.
 * @deprecated Use `start` instead
 * @example
 * legacy();
 */
export function legacy(): void {}
"#,
        );
        let legacy = document.export("legacy").unwrap();
        assert!(legacy.flag("deprecated"));
        assert_eq!(legacy.tags[0].name, "deprecated");
        assert_eq!(legacy.tags[0].text, "Use `start` instead");
        assert_eq!(legacy.description.as_deref(), Some("Old entry point."));
        assert_eq!(legacy.examples, vec!["legacy();".to_string()]);
        assert_eq!(
            legacy.source,
            Some(SourceLocation {
                file: "index.ts".to_string(),
                line: 8,
            })
        );
    }

    #[test]
    fn test_failing_export_is_degraded() {
        let session = session_for(
            r#"
export interface Good { a: string }
export interface Broken { b: number }
export function after(): void {}
"#,
        );
        let document = SpecAssembler::new(&session, AssemblyOptions::default(), None)
            .fail_on("Broken")
            .assemble(SpecMeta::named("fixture"));

        assert_eq!(export_names(&document), vec!["Good", "Broken", "after"]);
        let broken = document.export("Broken").unwrap();
        assert!(broken.flag("degraded"));
        assert_eq!(broken.ty, Some(TypeSchema::named("Broken")));
        assert!(document.type_by_id("Broken").unwrap().flags["degraded"]);
        assert!(!document.export("after").unwrap().flag("degraded"));

        let errors = session.errors().errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::Runtime);
        assert_eq!(errors[0].context.as_deref(), Some("export 'Broken'"));
        assert_eq!(dangling_refs(&document).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_multiple_entry_files() {
        let mut host = openpkg_checker::MemoryHost::new();
        host.insert("/pkg/a.ts", "export const a = 1; export const shared = 1;");
        host.insert("/pkg/b.ts", "export const b = 2; export const shared = 'b';");
        let session = crate::session::Session::with_host(
            &[PathBuf::from("/pkg/a.ts"), PathBuf::from("/pkg/b.ts")],
            Some(openpkg_checker::CompilerOptions::default()),
            host,
            crate::cache::CacheConfig::default(),
        )
        .unwrap();
        let assembler = SpecAssembler::new(&session, AssemblyOptions::default(), None);
        let exports = assembler.collect_exports();
        assert_eq!(exports.keys().collect::<Vec<_>>(), vec!["a", "shared", "b"]);
    }

    #[test]
    fn test_reassembly_drops_entries_of_changed_files() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let entry = temp_dir.path().join("index.ts");
        std::fs::write(&entry, "/** A point. */\nexport interface Point { x: number }").unwrap();
        let session = crate::session::Session::with_host(
            &[entry.clone()],
            Some(openpkg_checker::CompilerOptions::default()),
            openpkg_checker::OsHost,
            crate::cache::CacheConfig::default(),
        )
        .unwrap();
        let assembler = SpecAssembler::new(&session, AssemblyOptions::default(), None);

        let first = assembler.assemble(SpecMeta::named("fixture"));
        assert!(session.cache().stats().symbol_entries > 0);
        assert_eq!(session.cache().stats().invalidations, 0);

        std::fs::write(&entry, "/** A moved point. */\nexport interface Point { x: number }").unwrap();
        let second = assembler.assemble(SpecMeta::named("fixture"));
        assert!(session.cache().stats().invalidations > 0);
        assert_eq!(export_names(&first), export_names(&second));
    }

    #[test]
    fn test_re_exported_files_share_the_document() {
        let session = session(&[
            ("/pkg/index.ts", "export * from './models';\nexport { load } from './api';"),
            ("/pkg/models.ts", "export interface User { id: string }"),
            ("/pkg/api.ts", "import { User } from './models';\nexport function load(): User { return { id: '' }; }"),
        ]);
        let document = SpecAssembler::new(&session, AssemblyOptions::default(), None)
            .assemble(SpecMeta::named("fixture"));
        assert_eq!(export_names(&document), vec!["load", "User"]);
        assert_eq!(type_names(&document), vec!["User"]);
        assert_eq!(dangling_refs(&document).unwrap(), Vec::<String>::new());
    }
}
