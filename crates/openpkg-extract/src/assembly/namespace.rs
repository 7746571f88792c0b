use super::{Entries, SpecAssembler};
use crate::modules::{is_external_specifier, ImportKind};
use indexmap::IndexMap;
use openpkg_checker::binder::AliasTarget;
use openpkg_checker::{SymbolFlags, SymbolId};
use openpkg_spec::{ExportKind, MemberKind, SpecExport, SpecMember};

impl SpecAssembler<'_> {
    /// `export namespace X {}` with its exported declarations as members
    pub(super) fn namespace_entries(&self, name: &str, symbol: SymbolId) -> Entries {
        let mut export = self.new_export(name, symbol, ExportKind::Namespace);
        export.members = self.export_members(&self.checker().symbol(symbol).exports);
        Entries::export(export)
    }

    /// `export * as ns from "./mod"` and re-exported namespace imports
    pub(super) fn module_entries(&self, name: &str, alias: SymbolId, module: SymbolId) -> Entries {
        let checker = self.checker();
        let mut export = SpecExport::new(name, name, ExportKind::Module);
        export.from_module = checker
            .symbol(alias)
            .alias
            .as_ref()
            .and_then(AliasTarget::specifier)
            .map(str::to_string);
        export.members = self.export_members(&checker.module_exports(module));
        Entries::export(export)
    }

    /// Re-export whose target lies outside the program
    ///
    /// `export ... from` forms are classified from the declaring file's
    /// re-export table, re-exported imports from its import list.
    pub(super) fn unresolved_export(&self, name: &str, symbol: SymbolId) -> SpecExport {
        let checker = self.checker();
        let sym = checker.symbol(symbol);
        let modules = self.session.modules();
        let path = &checker.program().file(sym.file).path;

        let (kind, from_module) = match modules.resolve_re_exports(path).shift_remove(name) {
            Some(re_export) if re_export.original_name == "*" => {
                (ExportKind::Module, Some(re_export.from_module))
            }
            Some(re_export) => (ExportKind::Reference, Some(re_export.from_module)),
            None => match &sym.alias {
                Some(AliasTarget::Local { name: local }) => modules
                    .get_file_imports(path)
                    .into_iter()
                    .find(|import| import.local.as_deref() == Some(local.as_str()))
                    .map(|import| {
                        let kind = match import.kind {
                            ImportKind::Namespace => ExportKind::Module,
                            _ => ExportKind::Reference,
                        };
                        (kind, Some(import.specifier))
                    })
                    .unwrap_or((ExportKind::Reference, None)),
                Some(alias @ AliasTarget::Namespace { .. }) => {
                    (ExportKind::Module, alias.specifier().map(str::to_string))
                }
                alias => (
                    ExportKind::Reference,
                    alias.as_ref().and_then(AliasTarget::specifier).map(str::to_string),
                ),
            },
        };

        let mut export = SpecExport::new(name, name, kind);
        if from_module.as_deref().is_some_and(is_external_specifier) {
            export.flags.insert("external".to_string(), true);
        }
        export.from_module = from_module;
        export
    }

    /// Members of a namespace-like export: functions get signatures,
    /// package types a `$ref`, everything else its value schema
    pub(super) fn export_members(&self, exports: &IndexMap<String, SymbolId>) -> Vec<SpecMember> {
        let checker = self.checker();
        let schemas = self.schemas();
        let mut members = Vec::with_capacity(exports.len());
        for (name, symbol) in exports {
            let mut member = SpecMember::new(name, MemberKind::Export);
            let Some(target) = self.symbols.resolve_symbol(*symbol) else {
                members.push(member);
                continue;
            };
            let doc = self.symbols.extract_documentation(target);
            let flags = checker.symbol(target).flags;

            if flags.contains(SymbolFlags::FUNCTION) {
                let value = checker.type_of_symbol(target);
                member.signatures = checker
                    .call_signatures(value)
                    .iter()
                    .map(|signature| schemas.signature(signature, &self.signature_doc(signature, &doc)))
                    .collect();
            } else if let Some(reference) = schemas.reference(target) {
                member.schema = Some(reference);
            } else if flags.intersects(SymbolFlags::VALUE) {
                member.schema = Some(schemas.schema(checker.type_of_symbol(target)));
            }
            member.description = doc.description.clone();
            member.tags = doc.spec_tags();
            if doc.deprecated {
                member.flags.insert("deprecated".to_string(), true);
            }
            members.push(member);
        }
        members
    }
}

#[cfg(test)]
mod tests {
    use crate::assembly::{AssemblyOptions, SpecAssembler};
    use crate::assembly::test_support::assemble_source;
    use crate::session::test_support::session;
    use openpkg_spec::{dangling_refs, ExportKind, MemberKind, SpecMeta, TypeSchema};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_namespace_members() {
        let document = assemble_source(
            r#"
/** String helpers. */
export namespace Strings {
    /** Upper-cases text. */
    export function upper(text: string): string { return text.toUpperCase(); }
    export const EMPTY = "";
    export interface Options { trim: boolean }
    const hidden = 1;
}
"#,
        );
        let strings = document.export("Strings").unwrap();
        assert_eq!(strings.kind, ExportKind::Namespace);
        assert_eq!(strings.description.as_deref(), Some("String helpers."));

        let names: Vec<&str> = strings.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["upper", "EMPTY", "Options"]);
        assert!(strings.members.iter().all(|m| m.kind == MemberKind::Export));

        let upper = &strings.members[0];
        assert_eq!(upper.signatures.len(), 1);
        assert_eq!(upper.description.as_deref(), Some("Upper-cases text."));
        assert_eq!(strings.members[1].schema, Some(TypeSchema::constant("")));
        assert_eq!(strings.members[2].schema, Some(TypeSchema::reference("Options")));

        assert!(document.type_by_id("Options").is_some());
        assert_eq!(dangling_refs(&document).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_unresolved_exports_are_classified_by_module_form() {
        let document = assemble_source(
            r#"
import { merge } from "deepmerge";
import * as path from "node:path";
export { merge, path };
export { gone as missing } from "./missing";
export * as os from "node:os";
"#,
        );
        let merge = document.export("merge").unwrap();
        assert_eq!(merge.kind, ExportKind::Reference);
        assert_eq!(merge.from_module.as_deref(), Some("deepmerge"));
        assert!(merge.flag("external"));

        let path = document.export("path").unwrap();
        assert_eq!(path.kind, ExportKind::Module);
        assert_eq!(path.from_module.as_deref(), Some("node:path"));

        let missing = document.export("missing").unwrap();
        assert_eq!(missing.kind, ExportKind::Reference);
        assert_eq!(missing.from_module.as_deref(), Some("./missing"));
        assert!(!missing.flag("external"));

        let os = document.export("os").unwrap();
        assert_eq!(os.kind, ExportKind::Module);
        assert!(os.flag("external"));
    }

    #[test]
    fn test_namespace_re_export_is_a_module() {
        let session = session(&[
            ("/pkg/index.ts", "export * as math from './math';"),
            ("/pkg/math.ts", "export function add(a: number, b: number): number { return a + b; }\nexport type Num = number;"),
        ]);
        let document = SpecAssembler::new(&session, AssemblyOptions::default(), None)
            .assemble(SpecMeta::named("fixture"));

        let math = document.export("math").unwrap();
        assert_eq!(math.kind, ExportKind::Module);
        assert_eq!(math.from_module.as_deref(), Some("./math"));
        let names: Vec<&str> = math.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["add", "Num"]);
        assert_eq!(math.members[0].signatures[0].parameters.len(), 2);
        assert_eq!(math.members[1].schema, Some(TypeSchema::reference("Num")));
        assert_eq!(dangling_refs(&document).unwrap(), Vec::<String>::new());
    }
}
