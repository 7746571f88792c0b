use super::{Entries, SpecAssembler};
use crate::diagnostics::ExtractResult;
use crate::resolver::TypeResolver;
use deno_ast::swc::common::Spanned;
use openpkg_checker::{DeclKind, SymbolId};
use openpkg_spec::{ExportKind, SpecType};

impl SpecAssembler<'_> {
    pub(super) fn type_alias_entries(&self, name: &str, symbol: SymbolId) -> ExtractResult<Entries> {
        let export = self.new_export(name, symbol, ExportKind::Type);
        let ty = self.type_alias_type(symbol);
        Ok(Entries::with_definition(export, symbol, ty))
    }

    /// Alias text as written, its schema, and optionally its expansion
    pub(super) fn type_alias_type(&self, symbol: SymbolId) -> SpecType {
        let checker = self.checker();
        let mut ty = self.new_type(symbol, ExportKind::Type);
        let declared = checker.declared_type_of_symbol(symbol);

        ty.ty = checker
            .symbol(symbol)
            .declarations
            .iter()
            .find_map(|decl| match &decl.kind {
                DeclKind::TypeAlias(alias) => Some(checker.node_text(decl.file, alias.type_ann.span())),
                _ => None,
            })
            .or_else(|| Some(checker.type_to_string(declared)));
        ty.schema = Some(self.schemas().definition_schema(declared, symbol));
        ty.type_parameters = self.type_parameters(symbol);

        if self.options.include_resolved_types {
            let expanded = self.resolver.resolve_declaration(symbol);
            if !expanded.properties().is_empty() {
                ty.resolved_properties = Some(self.resolver.get_properties(declared));
            }
            ty.expanded_type = Some(expanded);
        }
        ty
    }
}

#[cfg(test)]
mod tests {
    use crate::assembly::test_support::{assemble_source, assemble_with};
    use crate::assembly::AssemblyOptions;
    use openpkg_spec::{ExportKind, TypeSchema};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const ALIASES: &str = r#"
interface User { id: string; name: string; email?: string }
/** Fields a caller may update. */
export type UserPatch = Partial<User>;
export type Status = "active" | "disabled";
export type Matrix = Array<Array<string>>;
export type Callback<T> = (value: T) => void;
"#;

    #[test]
    fn test_alias_text_and_schema() {
        let document = assemble_source(ALIASES);
        let status = document.type_by_id("Status").unwrap();
        assert_eq!(status.kind, ExportKind::Type);
        assert_eq!(status.ty.as_deref(), Some(r#""active" | "disabled""#));
        assert_eq!(
            serde_json::to_value(status.schema.as_ref().unwrap()).unwrap(),
            json!({ "anyOf": [{ "const": "active" }, { "const": "disabled" }] })
        );

        let callback = document.type_by_id("Callback").unwrap();
        assert_eq!(callback.type_parameters[0].name, "T");
        assert!(matches!(callback.schema, Some(TypeSchema::Function { .. })));
    }

    #[test]
    fn test_mapped_alias_is_resolved() {
        let document = assemble_source(ALIASES);
        let patch = document.type_by_id("UserPatch").unwrap();
        assert_eq!(patch.description.as_deref(), Some("Fields a caller may update."));
        assert_eq!(patch.ty.as_deref(), Some("Partial<User>"));

        let resolved = patch.resolved_properties.as_ref().unwrap();
        let names: Vec<&str> = resolved.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "email"]);
        assert!(resolved.iter().all(|p| p.optional));

        let matrix = document.type_by_id("Matrix").unwrap();
        let expanded = matrix.expanded_type.as_ref().unwrap();
        assert!(expanded.is_array);
        let inner = expanded.element_type.as_ref().unwrap();
        assert!(inner.is_array);
        assert_eq!(inner.element_type.as_ref().unwrap().type_string, "string");
        assert!(matrix.resolved_properties.is_none());
    }

    #[test]
    fn test_resolution_can_be_disabled() {
        let options = AssemblyOptions {
            include_resolved_types: false,
            ..AssemblyOptions::default()
        };
        let document = assemble_with(ALIASES, options);
        let patch = document.type_by_id("UserPatch").unwrap();
        assert!(patch.expanded_type.is_none());
        assert!(patch.resolved_properties.is_none());
        assert!(patch.schema.is_some());
    }
}
