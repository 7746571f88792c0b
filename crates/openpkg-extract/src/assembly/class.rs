use super::{index_key_name, Entries, SpecAssembler};
use crate::diagnostics::ExtractResult;
use crate::expansion::{build_type_hierarchy, get_all_properties, get_base_types, get_index_signatures};
use crate::js_doc::JsDocInfo;
use crate::resolver::visibility_of;
use openpkg_checker::{Checker, DeclKind, Property, PropertyKind, SymbolId, TypeId};
use openpkg_spec::{ExportKind, MemberKind, SpecMember, SpecType};

impl SpecAssembler<'_> {
    pub(super) fn class_entries(&self, name: &str, symbol: SymbolId) -> ExtractResult<Entries> {
        let checker = self.checker();
        let schemas = self.schemas();
        let mut export = self.new_export(name, symbol, ExportKind::Class);

        let statics = checker.type_of_symbol(symbol);
        export.signatures = checker
            .construct_signatures(statics)
            .iter()
            .map(|signature| schemas.signature(signature, &self.signature_doc(signature, &JsDocInfo::default())))
            .collect();
        if is_abstract_class(checker, symbol) {
            export.flags.insert("abstract".to_string(), true);
        }

        let ty = self.class_type(symbol)?;
        Ok(Entries::with_definition(export, symbol, ty))
    }

    /// Constructor, instance members, index signatures, then statics
    pub(super) fn class_type(&self, symbol: SymbolId) -> ExtractResult<SpecType> {
        let checker = self.checker();
        let schemas = self.schemas();
        let mut ty = self.new_type(symbol, ExportKind::Class);
        if is_abstract_class(checker, symbol) {
            ty.flags.insert("abstract".to_string(), true);
        }

        let instance = checker.declared_type_of_symbol(symbol);
        let statics = checker.type_of_symbol(symbol);

        let constructors = checker.construct_signatures(statics);
        if !constructors.is_empty() {
            let mut constructor = SpecMember::new("constructor", MemberKind::Constructor);
            constructor.signatures = constructors
                .iter()
                .map(|signature| {
                    let doc = self
                        .symbols
                        .documentation_for_member(signature.declaration.as_ref());
                    schemas.signature(signature, &doc)
                })
                .collect();
            ty.members.push(constructor);
        }

        for property in get_all_properties(checker, instance) {
            ty.members.push(self.property_member(&property, symbol));
        }
        ty.members.extend(self.index_members(instance));
        for property in get_all_properties(checker, statics) {
            let mut member = self.property_member(&property, symbol);
            member.flags.insert("static".to_string(), true);
            ty.members.push(member);
        }

        let bases = get_base_types(checker, symbol);
        ty.extends = bases.extends;
        ty.implements = bases.implements;
        ty.type_parameters = self.type_parameters(symbol);
        self.attach_expansion(&mut ty, symbol, instance);
        Ok(ty)
    }

    /// Member entry for a property, method or accessor
    ///
    /// Accessors are reported as properties with an `accessor` flag.
    pub(super) fn property_member(&self, property: &Property, owner: SymbolId) -> SpecMember {
        let checker = self.checker();
        let schemas = self.schemas();
        let doc = self
            .symbols
            .documentation_for_member(property.declaration.as_ref());

        let mut member = match property.kind {
            PropertyKind::Method => {
                let mut member = SpecMember::new(&property.name, MemberKind::Method);
                member.signatures = checker
                    .call_signatures(property.ty)
                    .iter()
                    .map(|signature| schemas.signature(signature, &self.signature_doc(signature, &doc)))
                    .collect();
                member
            }
            kind => {
                let mut member = SpecMember::new(&property.name, MemberKind::Property);
                member.schema = Some(schemas.schema(property.ty));
                if kind != PropertyKind::Property {
                    member.flags.insert("accessor".to_string(), true);
                }
                member
            }
        };
        member.description = doc.description.clone();
        member.tags = doc.spec_tags();
        member.visibility = Some(visibility_of(property));

        let flags = [
            ("static", property.is_static),
            ("abstract", property.is_abstract),
            ("readonly", property.readonly),
            ("optional", property.optional),
            ("deprecated", doc.deprecated),
            ("inherited", property.origin.is_some_and(|origin| origin != owner)),
        ];
        for (flag, set) in flags {
            if set {
                member.flags.insert(flag.to_string(), true);
            }
        }
        member
    }

    /// `[key: string]` and `[index: number]` signatures as members
    pub(super) fn index_members(&self, ty: TypeId) -> Vec<SpecMember> {
        let checker = self.checker();
        let schemas = self.schemas();
        let signatures = get_index_signatures(checker, ty);
        [signatures.string, signatures.number]
            .into_iter()
            .flatten()
            .map(|info| {
                let name = index_key_name(checker, &info.parameter, info.key);
                let mut member = SpecMember::new(name, MemberKind::IndexSignature);
                member.schema = Some(schemas.schema(info.value));
                member.description = self
                    .symbols
                    .documentation_for_member(info.declaration.as_ref())
                    .description;
                if info.readonly {
                    member.flags.insert("readonly".to_string(), true);
                }
                member
            })
            .collect()
    }

    /// `expandedType` and `hierarchy` per the assembly options
    pub(super) fn attach_expansion(&self, ty: &mut SpecType, symbol: SymbolId, declared: TypeId) {
        if self.options.include_resolved_types {
            ty.expanded_type = Some(self.resolver.resolve_declaration(symbol));
        }
        if self.options.include_type_hierarchy {
            ty.hierarchy = Some(build_type_hierarchy(
                self.checker(),
                declared,
                self.options.max_depth,
            ));
        }
    }
}

fn is_abstract_class(checker: &Checker, symbol: SymbolId) -> bool {
    checker
        .symbol(symbol)
        .declarations
        .iter()
        .any(|decl| matches!(&decl.kind, DeclKind::Class(class) if class.is_abstract))
}

#[cfg(test)]
mod tests {
    use crate::assembly::test_support::{assemble_source, assemble_with};
    use crate::assembly::AssemblyOptions;
    use openpkg_spec::{ExportKind, MemberKind, TypeSchema, Visibility};
    use pretty_assertions::assert_eq;

    const ACCOUNT: &str = r#"
/** A bank account. */
export abstract class Account {
    static count = 0;
    #secret = "x";
    /** Session token. */
    protected token?: string;
    constructor(public readonly owner: string) {}
    get balance(): number { return 0; }
    set balance(value: number) {}
    abstract close(): void;
    /**
     * Adds money.
     * @param amount - Amount in cents
     */
    deposit(amount: number): void {}
}
"#;

    #[test]
    fn test_class_export_and_type() {
        let document = assemble_source(ACCOUNT);
        let export = document.export("Account").unwrap();
        assert_eq!(export.kind, ExportKind::Class);
        assert!(export.flag("abstract"));
        assert_eq!(export.signatures.len(), 1);
        assert_eq!(export.signatures[0].parameters[0].name, "owner");
        assert_eq!(export.ty, Some(TypeSchema::reference("Account")));

        let ty = document.type_by_id("Account").unwrap();
        assert_eq!(ty.description.as_deref(), Some("A bank account."));
        assert_eq!(ty.members[0].kind, MemberKind::Constructor);
        let names: Vec<&str> = ty.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["constructor", "#secret", "token", "owner", "balance", "close", "deposit", "count"]
        );
    }

    #[test]
    fn test_member_modifiers() {
        let document = assemble_source(ACCOUNT);
        let ty = document.type_by_id("Account").unwrap();

        let secret = ty.member("#secret").unwrap();
        assert_eq!(secret.visibility, Some(Visibility::Private));

        let token = ty.member("token").unwrap();
        assert_eq!(token.visibility, Some(Visibility::Protected));
        assert!(token.flags["optional"]);
        assert_eq!(token.description.as_deref(), Some("Session token."));

        let owner = ty.member("owner").unwrap();
        assert_eq!(owner.visibility, Some(Visibility::Public));
        assert!(owner.flags["readonly"]);
        assert_eq!(owner.schema, Some(TypeSchema::named("string")));

        let balance = ty.member("balance").unwrap();
        assert_eq!(balance.kind, MemberKind::Property);
        assert!(balance.flags["accessor"]);

        let close = ty.member("close").unwrap();
        assert_eq!(close.kind, MemberKind::Method);
        assert!(close.flags["abstract"]);

        let deposit = ty.member("deposit").unwrap();
        assert_eq!(deposit.signatures.len(), 1);
        assert_eq!(
            deposit.signatures[0].parameters[0].description.as_deref(),
            Some("Amount in cents")
        );

        let count = ty.member("count").unwrap();
        assert!(count.flags["static"]);
        assert!(ty.member("prototype").is_none());
    }

    #[test]
    fn test_inheritance() {
        let document = assemble_source(
            r#"
class Base<T> {
    value!: T;
    describe(): string { return ""; }
}
interface Named { name: string }
export class Derived extends Base<number> implements Named {
    name = "d";
    describe(): string { return "d"; }
}
"#,
        );
        let ty = document.type_by_id("Derived").unwrap();
        assert_eq!(ty.extends, vec!["Base<number>".to_string()]);
        assert_eq!(ty.implements, vec!["Named".to_string()]);
        assert!(ty.member("value").unwrap().flags["inherited"]);
        assert!(!ty.member("describe").unwrap().flags.contains_key("inherited"));

        let expanded = ty.expanded_type.as_ref().unwrap();
        assert_eq!(expanded.property("value").unwrap().ty.type_string, "number");
    }

    #[test]
    fn test_hierarchy_is_optional() {
        let source = r#"
class A { a = 1; }
class B extends A { b = 2; }
export class C extends B { c = 3; }
"#;
        let plain = assemble_source(source);
        assert!(plain.type_by_id("C").unwrap().hierarchy.is_none());

        let options = AssemblyOptions {
            include_resolved_types: false,
            include_type_hierarchy: true,
            ..AssemblyOptions::default()
        };
        let document = assemble_with(source, options);
        let ty = document.type_by_id("C").unwrap();
        assert!(ty.expanded_type.is_none());
        let hierarchy = ty.hierarchy.as_ref().unwrap();
        assert_eq!(hierarchy.name, "C");
        assert_eq!(hierarchy.own_members, vec!["c".to_string()]);
        assert_eq!(hierarchy.bases[0].name, "B");
        assert_eq!(hierarchy.bases[0].bases[0].name, "A");
    }

    #[test]
    fn test_index_signature_members() {
        let document = assemble_source(
            r#"
export class Registry {
    /** Entries by key. */
    [key: string]: number | (() => void);
    size(): void {}
}
"#,
        );
        let ty = document.type_by_id("Registry").unwrap();
        let index = ty.member("[key: string]").unwrap();
        assert_eq!(index.kind, MemberKind::IndexSignature);
        assert_eq!(index.description.as_deref(), Some("Entries by key."));
    }
}
