use super::{Entries, SpecAssembler};
use crate::diagnostics::ExtractResult;
use crate::schema::number_value;
use openpkg_checker::{EnumValue, SymbolFlags, SymbolId};
use openpkg_spec::{ExportKind, MemberKind, SpecMember, SpecType};

impl SpecAssembler<'_> {
    pub(super) fn enum_entries(&self, name: &str, symbol: SymbolId) -> ExtractResult<Entries> {
        let mut export = self.new_export(name, symbol, ExportKind::Enum);
        let ty = self.enum_type(symbol);
        export.members = ty.members.clone();
        if self.checker().symbol(symbol).flags.contains(SymbolFlags::CONST) {
            export.flags.insert("const".to_string(), true);
        }
        Ok(Entries::with_definition(export, symbol, ty))
    }

    /// Members in declaration order with their evaluated values
    pub(super) fn enum_type(&self, symbol: SymbolId) -> SpecType {
        let checker = self.checker();
        let mut ty = self.new_type(symbol, ExportKind::Enum);
        if checker.symbol(symbol).flags.contains(SymbolFlags::CONST) {
            ty.flags.insert("const".to_string(), true);
        }

        for member in checker.enum_members(symbol).iter() {
            let doc = self.symbols.documentation_for_member(Some(&member.declaration));
            let mut entry = SpecMember::new(&member.name, MemberKind::EnumMember);
            entry.value = Some(match &member.value {
                EnumValue::Number(n) => number_value(*n),
                EnumValue::String(s) => serde_json::Value::String(s.clone()),
                EnumValue::Computed(text) => {
                    entry.flags.insert("computed".to_string(), true);
                    serde_json::Value::String(text.clone())
                }
            });
            entry.description = doc.description.clone();
            entry.tags = doc.spec_tags();
            if doc.deprecated {
                entry.flags.insert("deprecated".to_string(), true);
            }
            ty.members.push(entry);
        }
        ty
    }
}

#[cfg(test)]
mod tests {
    use crate::assembly::test_support::assemble_source;
    use openpkg_spec::{ExportKind, MemberKind};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    #[test]
    fn test_enum_values() {
        let document = assemble_source(
            r#"
/** Log levels. */
export enum Level {
    /** Everything. */
    Debug,
    Info = 10,
    Warn,
    /** @deprecated */
    Legacy = "legacy",
    Size = "abc".length,
}
"#,
        );
        let level = document.type_by_id("Level").unwrap();
        assert_eq!(level.kind, ExportKind::Enum);
        assert_eq!(level.description.as_deref(), Some("Log levels."));

        let values: Vec<(&str, Option<&Value>)> = level
            .members
            .iter()
            .map(|m| (m.name.as_str(), m.value.as_ref()))
            .collect();
        assert_eq!(
            values,
            vec![
                ("Debug", Some(&json!(0))),
                ("Info", Some(&json!(10))),
                ("Warn", Some(&json!(11))),
                ("Legacy", Some(&json!("legacy"))),
                ("Size", Some(&json!("\"abc\".length"))),
            ]
        );
        assert!(level.members.iter().all(|m| m.kind == MemberKind::EnumMember));
        assert_eq!(level.members[0].description.as_deref(), Some("Everything."));
        assert!(level.members[3].flags["deprecated"]);
        assert!(level.members[4].flags["computed"]);

        let export = document.export("Level").unwrap();
        assert_eq!(export.members.len(), 5);
        assert!(!export.flag("const"));
    }

    #[test]
    fn test_const_enum() {
        let document = assemble_source("export const enum Mode { Fast = 'fast', Slow = 'slow' }");
        let export = document.export("Mode").unwrap();
        assert!(export.flag("const"));
        assert!(document.type_by_id("Mode").unwrap().flags["const"]);
    }
}
