use super::{Entries, SpecAssembler};
use crate::diagnostics::ExtractResult;
use openpkg_checker::{SymbolFlags, SymbolId};
use openpkg_spec::ExportKind;

impl SpecAssembler<'_> {
    /// Variables keep their schema; callable ones also get signatures
    pub(super) fn variable_entries(&self, name: &str, symbol: SymbolId) -> ExtractResult<Entries> {
        let checker = self.checker();
        let schemas = self.schemas();
        let mut export = self.new_export(name, symbol, ExportKind::Variable);

        let value = checker.type_of_symbol(symbol);
        export.ty = Some(schemas.schema(value));

        let doc = self.symbols.extract_documentation(symbol);
        export.signatures = checker
            .call_signatures(value)
            .iter()
            .map(|signature| schemas.signature(signature, &self.signature_doc(signature, &doc)))
            .collect();

        if checker.symbol(symbol).flags.contains(SymbolFlags::CONST) {
            export.flags.insert("const".to_string(), true);
        }
        Ok(Entries::export(export))
    }
}

#[cfg(test)]
mod tests {
    use crate::assembly::test_support::assemble_source;
    use openpkg_spec::{ExportKind, TypeSchema};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_constants_and_lets() {
        let document = assemble_source(
            r#"
/** Library version. */
export const VERSION = "2.1.0";
export let retries: number = 3;
export const defaults = { timeout: 1000, verbose: false };
"#,
        );
        let version = document.export("VERSION").unwrap();
        assert_eq!(version.kind, ExportKind::Variable);
        assert!(version.flag("const"));
        assert_eq!(version.description.as_deref(), Some("Library version."));
        assert_eq!(version.ty, Some(TypeSchema::constant("2.1.0")));

        let retries = document.export("retries").unwrap();
        assert!(!retries.flag("const"));
        assert_eq!(retries.ty, Some(TypeSchema::named("number")));

        let defaults = document.export("defaults").unwrap();
        assert_eq!(
            serde_json::to_value(defaults.ty.as_ref().unwrap()).unwrap(),
            json!({
                "type": "object",
                "properties": { "timeout": { "type": "number" }, "verbose": { "type": "boolean" } },
                "required": ["timeout", "verbose"]
            })
        );
        assert!(defaults.signatures.is_empty());
    }

    #[test]
    fn test_arrow_function_constants() {
        let document = assemble_source(
            r#"
/**
 * Doubles a value.
 * @param n - Input
 */
export const double = (n: number): number => n * 2;
"#,
        );
        let double = document.export("double").unwrap();
        assert_eq!(double.kind, ExportKind::Variable);
        assert_eq!(double.signatures.len(), 1);
        assert_eq!(
            double.signatures[0].parameters[0].description.as_deref(),
            Some("Input")
        );
        assert_eq!(double.signatures[0].description.as_deref(), Some("Doubles a value."));
    }
}
