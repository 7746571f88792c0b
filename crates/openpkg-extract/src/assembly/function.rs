use super::{Entries, SpecAssembler};
use crate::diagnostics::{ExtractError, ExtractResult};
use openpkg_checker::SymbolId;
use openpkg_spec::ExportKind;

impl SpecAssembler<'_> {
    /// One signature per overload, the implementation left out when
    /// overloads exist
    pub(super) fn function_entries(&self, name: &str, symbol: SymbolId) -> ExtractResult<Entries> {
        let checker = self.checker();
        let signatures = checker.call_signatures(checker.type_of_symbol(symbol));
        if signatures.is_empty() {
            return Err(ExtractError::resolution(name, "function has no call signatures"));
        }

        let doc = self.symbols.extract_documentation(symbol);
        let schemas = self.schemas();
        let mut export = self.new_export(name, symbol, ExportKind::Function);
        export.signatures = signatures
            .iter()
            .map(|signature| schemas.signature(signature, &self.signature_doc(signature, &doc)))
            .collect();

        if signatures.iter().any(|s| s.is_async) {
            export.flags.insert("async".to_string(), true);
        }
        if signatures.iter().any(|s| !s.has_return_annotation) {
            export.flags.insert("inferredReturn".to_string(), true);
        }
        Ok(Entries::export(export))
    }
}

#[cfg(test)]
mod tests {
    use crate::assembly::test_support::assemble_source;
    use openpkg_spec::{ExportKind, TypeSchema};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parameters_and_returns() {
        let document = assemble_source(
            r#"
/**
 * Formats a number.
 * @param value - The number to format
 * @param digits - Digits after the point
 * @returns The formatted text
 */
export function format(value: number, digits = 2, suffix?: string): string {
    return value.toFixed(digits) + (suffix ?? "");
}
"#,
        );
        let format = document.export("format").unwrap();
        assert_eq!(format.kind, ExportKind::Function);
        assert_eq!(format.signatures.len(), 1);
        assert!(!format.flag("inferredReturn"));

        let signature = &format.signatures[0];
        assert_eq!(signature.description.as_deref(), Some("Formats a number."));
        let params: Vec<(&str, bool)> = signature
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.required))
            .collect();
        assert_eq!(params, vec![("value", true), ("digits", false), ("suffix", false)]);
        assert_eq!(
            signature.parameters[0].description.as_deref(),
            Some("The number to format")
        );
        assert_eq!(signature.parameters[1].default.as_deref(), Some("2"));

        let returns = signature.returns.as_ref().unwrap();
        assert_eq!(returns.schema, TypeSchema::named("string"));
        assert_eq!(returns.description.as_deref(), Some("The formatted text"));
    }

    #[test]
    fn test_overloads_become_signatures() {
        let document = assemble_source(
            r#"
/** Parses input. */
export function parse(input: string): number;
/** Parses many inputs. */
export function parse(input: string[]): number[];
export function parse(input: any): any {
    return input;
}
"#,
        );
        let parse = document.export("parse").unwrap();
        assert_eq!(parse.signatures.len(), 2);
        assert_eq!(parse.signatures[0].description.as_deref(), Some("Parses input."));
        assert_eq!(
            parse.signatures[1].description.as_deref(),
            Some("Parses many inputs.")
        );
        assert_eq!(
            parse.signatures[1].parameters[0].schema,
            TypeSchema::array(TypeSchema::named("string"))
        );
    }

    #[test]
    fn test_async_and_inferred_returns() {
        let document = assemble_source(
            r#"
export async function fetchCount(url: string) {
    return url.length;
}
"#,
        );
        let fetch = document.export("fetchCount").unwrap();
        assert!(fetch.flag("async"));
        assert!(fetch.flag("inferredReturn"));
        let returns = fetch.signatures[0].returns.as_ref().unwrap();
        assert_eq!(
            returns.schema,
            TypeSchema::generic("Promise", vec![TypeSchema::named("number")])
        );
    }

    #[test]
    fn test_generic_function() {
        let document = assemble_source(
            "export function first<T extends object = {}>(items: T[]): T | undefined { return items[0]; }",
        );
        let signature = &document.export("first").unwrap().signatures[0];
        assert_eq!(signature.type_parameters.len(), 1);
        assert_eq!(signature.type_parameters[0].name, "T");
        assert_eq!(signature.type_parameters[0].constraint.as_deref(), Some("object"));
        assert_eq!(
            signature.parameters[0].schema,
            TypeSchema::array(TypeSchema::named("T"))
        );
    }
}
