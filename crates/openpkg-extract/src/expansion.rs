//! Utility, mapped, conditional and structural type expansion
//!
//! Narrow capability functions over the checker's type graph. Each
//! structural check has a textual fallback, so a type the checker could
//! only keep as text still classifies sensibly. Nothing here caches.

use openpkg_checker::{
    Checker, DeclKind, IndexInfo, MappedModifier, Property, Signature, SymbolFlags, SymbolId,
    TupleElement, TypeData, TypeId,
};
use openpkg_spec::TypeHierarchy;
use std::collections::HashSet;
use std::rc::Rc;

/// Standard utility types whose members the checker computes itself
pub const UTILITY_TYPES: &[&str] = &[
    "Partial",
    "Required",
    "Readonly",
    "Record",
    "Pick",
    "Omit",
    "Exclude",
    "Extract",
    "NonNullable",
    "ReturnType",
    "InstanceType",
    "Parameters",
    "ConstructorParameters",
    "ThisType",
];

/// Name of the utility alias a type was written through
pub fn utility_type_name(checker: &Checker, ty: TypeId) -> Option<String> {
    let alias = checker.alias_of(ty)?;
    let name = &checker.symbol(alias.symbol).name;
    UTILITY_TYPES
        .contains(&name.as_str())
        .then(|| name.clone())
}

pub fn is_utility_type(checker: &Checker, ty: TypeId) -> bool {
    utility_type_name(checker, ty).is_some()
}

pub fn is_mapped_type(checker: &Checker, ty: TypeId) -> bool {
    checker.is_mapped(ty)
}

/// True when the mapping adds `readonly` to every member
pub fn is_readonly_mapping(checker: &Checker, ty: TypeId) -> bool {
    checker
        .mapped_modifiers(ty)
        .is_some_and(|m| m.readonly == Some(MappedModifier::Add))
}

pub fn is_conditional_type(checker: &Checker, ty: TypeId) -> bool {
    matches!(checker.data(ty), TypeData::Conditional(_))
}

pub fn is_tuple_type(checker: &Checker, ty: TypeId) -> bool {
    if checker.tuple_elements(ty).is_some() {
        return true;
    }
    // Tuples the checker kept as text
    match checker.data(ty) {
        TypeData::Unresolved(text) => {
            let text = text.trim();
            text.starts_with('[') && text.ends_with(']')
        }
        _ => false,
    }
}

pub fn is_promise_type(checker: &Checker, ty: TypeId) -> bool {
    get_promise_resolved_type(checker, ty).is_some()
        || matches!(checker.data(ty), TypeData::Unresolved(text) if text.starts_with("Promise<"))
}

/// True for arrays, and for array-likes: types with a numeric index and
/// no other members than `length`
pub fn is_array_type(checker: &Checker, ty: TypeId) -> bool {
    array_element(checker, ty).is_some()
}

/// Element type of an array or array-like
pub fn array_element(checker: &Checker, ty: TypeId) -> Option<TypeId> {
    if let Some(element) = checker.array_element_type(ty) {
        return Some(element);
    }
    if !matches!(checker.data(ty), TypeData::Object(_)) {
        return None;
    }
    let members = checker.resolved_members(ty);
    let index = members.number_index.as_ref()?;
    let array_like = members.string_index.is_none()
        && members.call_signatures.is_empty()
        && members.properties.iter().all(|p| p.name == "length");
    array_like.then_some(index.value)
}

/// Branch a conditional type resolves to, if the checker could pick one
pub fn get_conditional_resolved(checker: &Checker, ty: TypeId) -> Option<TypeId> {
    checker.conditional_resolved(ty)
}

pub fn get_tuple_elements(checker: &Checker, ty: TypeId) -> Option<Vec<TupleElement>> {
    checker.tuple_elements(ty)
}

/// Value type of `Promise<T>` or `PromiseLike<T>`
pub fn get_promise_resolved_type(checker: &Checker, ty: TypeId) -> Option<TypeId> {
    let symbol = checker.symbol_of_type(ty)?;
    let name = &checker.symbol(symbol).name;
    if name != "Promise" && name != "PromiseLike" {
        return None;
    }
    checker.type_arguments(ty).first().copied()
}

/// Own and inherited properties; own members shadow inherited ones
///
/// The synthetic `prototype` of a class value is left out.
pub fn get_all_properties(checker: &Checker, ty: TypeId) -> Vec<Property> {
    checker
        .resolved_members(ty)
        .properties
        .iter()
        .filter(|p| !(p.is_static && p.name == "prototype"))
        .cloned()
        .collect()
}

/// String-keyed and number-keyed index signatures of a type
#[derive(Debug, Clone, Default)]
pub struct IndexSignatures {
    pub string: Option<IndexInfo>,
    pub number: Option<IndexInfo>,
}

impl IndexSignatures {
    pub fn is_empty(&self) -> bool {
        self.string.is_none() && self.number.is_none()
    }
}

pub fn get_index_signatures(checker: &Checker, ty: TypeId) -> IndexSignatures {
    IndexSignatures {
        string: checker.string_index_info(ty),
        number: checker.number_index_info(ty),
    }
}

/// Properties whose types are callable, with every call signature
pub fn get_method_signatures(checker: &Checker, ty: TypeId) -> Vec<(String, Vec<Rc<Signature>>)> {
    get_all_properties(checker, ty)
        .into_iter()
        .filter_map(|property| {
            let signatures = checker.call_signatures(property.ty);
            (!signatures.is_empty()).then_some((property.name, signatures))
        })
        .collect()
}

/// Heritage clauses as written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseTypes {
    pub extends: Vec<String>,
    pub implements: Vec<String>,
}

/// `extends` and `implements` lists of a class or interface, as source text
pub fn get_base_types(checker: &Checker, symbol: SymbolId) -> BaseTypes {
    let mut bases = BaseTypes::default();
    for decl in &checker.symbol(symbol).declarations {
        match &decl.kind {
            DeclKind::Interface(iface) => {
                for heritage in &iface.extends {
                    bases.extends.push(checker.node_text(decl.file, heritage.span));
                }
            }
            DeclKind::Class(class) => {
                if let Some(super_class) = &class.super_class {
                    let mut text = checker.node_text(decl.file, span_of_expr(super_class));
                    if let Some(args) = &class.super_type_params {
                        text.push_str(&checker.node_text(decl.file, args.span));
                    }
                    bases.extends.push(text);
                }
                for implemented in &class.implements {
                    bases
                        .implements
                        .push(checker.node_text(decl.file, implemented.span));
                }
            }
            _ => {}
        }
    }
    bases
}

fn span_of_expr(expr: &deno_ast::swc::ast::Expr) -> deno_ast::swc::common::Span {
    use deno_ast::swc::common::Spanned;
    expr.span()
}

/// Inheritance tree of a class or interface type, `max_depth` levels deep
pub fn build_type_hierarchy(checker: &Checker, ty: TypeId, max_depth: usize) -> TypeHierarchy {
    let mut visiting = HashSet::new();
    hierarchy_node(checker, ty, max_depth, &mut visiting)
}

fn hierarchy_node(
    checker: &Checker,
    ty: TypeId,
    remaining: usize,
    visiting: &mut HashSet<TypeId>,
) -> TypeHierarchy {
    let symbol = checker.symbol_of_type(ty);
    let own_members = checker
        .resolved_members(ty)
        .properties
        .iter()
        .filter(|p| p.origin.is_some() && p.origin == symbol && !p.is_static)
        .map(|p| p.name.clone())
        .collect();

    let mut node = TypeHierarchy {
        name: checker.type_to_string(ty),
        own_members,
        bases: vec![],
        truncated: false,
    };

    let bases = checker.base_types(ty);
    if bases.is_empty() {
        return node;
    }
    if remaining <= 1 || !visiting.insert(ty) {
        node.truncated = true;
        return node;
    }
    node.bases = bases
        .iter()
        .map(|base| hierarchy_node(checker, *base, remaining - 1, visiting))
        .collect();
    visiting.remove(&ty);
    node
}

/// True for symbols that declare a reusable shape
pub fn defines_type(checker: &Checker, symbol: SymbolId) -> bool {
    checker.symbol(symbol).flags.intersects(SymbolFlags::TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::session_for;
    use crate::session::Session;
    use pretty_assertions::assert_eq;

    fn declared(session: &Session, name: &str) -> TypeId {
        let checker = session.checker();
        let symbol = checker.find_declaration_by_name(name).unwrap();
        checker.declared_type_of_symbol(symbol)
    }

    const USER: &str = r#"
export interface User { id: string; name: string; email: string; age: number }
export type PartialUser = Partial<User>;
export type Frozen = { readonly [K in keyof User]: User[K] };
export type Loose = { -readonly [K in 'a' | 'b']: number };
export type Pair = [string, number];
export type Later = Promise<User>;
export type Names = string[];
export type Dict = { [key: string]: number; [index: number]: number };
export interface Api { get(id: string): User; put(user: User): void; count: number }
"#;

    #[test]
    fn test_utility_classification() {
        let session = session_for(USER);
        let checker = session.checker();
        assert_eq!(
            utility_type_name(checker, declared(&session, "PartialUser")).as_deref(),
            Some("Partial")
        );
        assert!(!is_utility_type(checker, declared(&session, "User")));
        assert!(is_mapped_type(checker, declared(&session, "PartialUser")));
    }

    #[test]
    fn test_readonly_mapping() {
        let session = session_for(USER);
        let checker = session.checker();
        assert!(is_readonly_mapping(checker, declared(&session, "Frozen")));
        assert!(!is_readonly_mapping(checker, declared(&session, "Loose")));
        assert!(!is_readonly_mapping(checker, declared(&session, "User")));
    }

    #[test]
    fn test_structural_predicates() {
        let session = session_for(USER);
        let checker = session.checker();
        assert!(is_tuple_type(checker, declared(&session, "Pair")));
        assert!(is_promise_type(checker, declared(&session, "Later")));
        assert!(is_array_type(checker, declared(&session, "Names")));
        assert!(!is_array_type(checker, declared(&session, "Dict")));
        assert!(!is_conditional_type(checker, declared(&session, "User")));

        let elements = get_tuple_elements(checker, declared(&session, "Pair")).unwrap();
        assert_eq!(elements.len(), 2);

        let inner = get_promise_resolved_type(checker, declared(&session, "Later")).unwrap();
        assert_eq!(checker.type_to_string(inner), "User");
    }

    #[test]
    fn test_index_signatures_are_tracked_separately() {
        let session = session_for(USER);
        let checker = session.checker();
        let signatures = get_index_signatures(checker, declared(&session, "Dict"));
        assert_eq!(signatures.string.unwrap().parameter, "key");
        assert_eq!(signatures.number.unwrap().parameter, "index");
        assert!(get_index_signatures(checker, declared(&session, "User")).is_empty());
    }

    #[test]
    fn test_method_signatures() {
        let session = session_for(USER);
        let methods = get_method_signatures(session.checker(), declared(&session, "Api"));
        let names: Vec<_> = methods.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["get", "put"]);
        assert_eq!(methods[0].1[0].parameters[0].name, "id");
    }

    #[test]
    fn test_all_properties_merge_inherited() {
        let session = session_for(
            r#"export interface Base { id: string; label?: string }
export interface Derived extends Base { label: string; extra: boolean }"#,
        );
        let properties = get_all_properties(session.checker(), declared(&session, "Derived"));
        let summary: Vec<_> = properties
            .iter()
            .map(|p| (p.name.as_str(), p.optional))
            .collect();
        assert_eq!(
            summary,
            vec![("label", false), ("extra", false), ("id", false)]
        );
    }

    #[test]
    fn test_base_types_are_textual() {
        let session = session_for(
            r#"interface A { a: string }
interface B<T> { b: T }
export interface C extends A, B<number> {}
class Base<T> {}
interface Marker {}
export class Impl extends Base<string> implements Marker, A { a = '' }"#,
        );
        let checker = session.checker();
        let c = checker.find_declaration_by_name("C").unwrap();
        assert_eq!(
            get_base_types(checker, c),
            BaseTypes {
                extends: vec!["A".to_string(), "B<number>".to_string()],
                implements: vec![],
            }
        );
        let implementation = checker.find_declaration_by_name("Impl").unwrap();
        assert_eq!(
            get_base_types(checker, implementation),
            BaseTypes {
                extends: vec!["Base<string>".to_string()],
                implements: vec!["Marker".to_string(), "A".to_string()],
            }
        );
    }

    #[test]
    fn test_type_hierarchy_respects_depth() {
        let session = session_for(
            r#"interface Root { r: string }
interface Middle extends Root { m: string }
export interface Leaf extends Middle { l: string }"#,
        );
        let checker = session.checker();
        let leaf = declared(&session, "Leaf");

        let full = build_type_hierarchy(checker, leaf, 5);
        assert_eq!(full.name, "Leaf");
        assert_eq!(full.own_members, vec!["l"]);
        assert_eq!(full.bases[0].name, "Middle");
        assert_eq!(full.bases[0].bases[0].name, "Root");
        assert!(!full.bases[0].bases[0].truncated);

        let shallow = build_type_hierarchy(checker, leaf, 2);
        assert_eq!(shallow.bases[0].name, "Middle");
        assert!(shallow.bases[0].truncated);
        assert!(shallow.bases[0].bases.is_empty());
    }
}
