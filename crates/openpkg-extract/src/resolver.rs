//! Type resolution
//!
//! Walks checker types into finite `ResolvedType` trees. Every composite
//! node opens a `ResolutionScope` that marks the type as in progress and
//! counts nesting; a type met again while in progress, or a composite
//! below the depth limit, becomes the truncation sentinel. Scopes are
//! released on every exit path, unwinding included, so a failed export
//! never leaves stale state behind for the next one.

use crate::cache::NodeKey;
use crate::diagnostics::catch_unwind_quiet;
use crate::expansion::{
    array_element, get_all_properties, get_conditional_resolved, get_index_signatures,
    get_method_signatures, get_promise_resolved_type, is_readonly_mapping, utility_type_name,
};
use crate::session::Session;
use crate::symbols::SymbolResolver;
use openpkg_checker::{
    Accessibility, Checker, DeclKind, ObjectShape, Property, Signature, SymbolFlags, SymbolId,
    TypeData, TypeId,
};
use openpkg_spec::{
    ExpandedType, FunctionSignatureInfo, ParameterInfo, PropertyInfo, ResolvedType, Visibility,
    PRIMITIVE_NAMES,
};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{debug, trace};

/// Default nesting limit of resolved trees
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Turns checker types into resolved trees
pub trait TypeResolver {
    /// Structured resolution of `ty`, bounded by the depth limit
    fn resolve_type(&self, ty: TypeId) -> ResolvedType;

    /// Every property of `ty`, inherited ones included
    fn get_properties(&self, ty: TypeId) -> Vec<PropertyInfo>;

    /// Surface text of `ty` paired with its resolution
    fn expand_generic(&self, ty: TypeId) -> ExpandedType;

    /// Canonical text of `ty`
    fn get_type_string(&self, ty: TypeId) -> String;
}

/// Resolved index signatures of a type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedIndexSignatures {
    pub string: Option<ResolvedType>,
    pub number: Option<ResolvedType>,
}

/// `TypeResolver` over a session's checker
pub struct CheckerTypeResolver<'s> {
    session: &'s Session,
    symbols: SymbolResolver<'s>,
    max_depth: usize,
    depth: Cell<usize>,
    resolving: RefCell<HashSet<TypeId>>,
}

/// Marks one type as in progress for as long as it lives
struct ResolutionScope<'r> {
    depth: &'r Cell<usize>,
    resolving: &'r RefCell<HashSet<TypeId>>,
    ty: TypeId,
    previous: usize,
}

impl Drop for ResolutionScope<'_> {
    fn drop(&mut self) {
        self.resolving.borrow_mut().remove(&self.ty);
        self.depth.set(self.previous);
    }
}

impl<'s> CheckerTypeResolver<'s> {
    pub fn new(session: &'s Session, max_depth: usize) -> Self {
        // Cached trees were cut at the old limit
        session.cache().set_resolution_depth(max_depth);
        Self {
            session,
            symbols: SymbolResolver::new(session),
            max_depth,
            depth: Cell::new(0),
            resolving: RefCell::new(HashSet::new()),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn checker(&self) -> &'s Checker {
        self.session.checker()
    }

    /// Enter a composite type, or `None` when it must be truncated
    fn enter(&self, ty: TypeId) -> Option<ResolutionScope<'_>> {
        let depth = self.depth.get();
        if depth + 1 >= self.max_depth {
            return None;
        }
        if !self.resolving.borrow_mut().insert(ty) {
            return None;
        }
        self.depth.set(depth + 1);
        Some(ResolutionScope {
            depth: &self.depth,
            resolving: &self.resolving,
            ty,
            previous: depth,
        })
    }

    fn resolve(&self, ty: TypeId) -> ResolvedType {
        let checker = self.checker();
        let text = checker.type_to_string(ty);
        let data = checker.data(ty);

        match &data {
            TypeData::Intrinsic(kind) => {
                return if PRIMITIVE_NAMES.contains(&kind.name()) {
                    ResolvedType::primitive(text)
                } else {
                    ResolvedType::named(text)
                };
            }
            TypeData::StringLiteral(_)
            | TypeData::NumberLiteral(_)
            | TypeData::BooleanLiteral(_)
            | TypeData::BigIntLiteral(_)
            | TypeData::TemplateLiteral(_)
            | TypeData::Enum(_)
            | TypeData::EnumLiteral { .. }
            | TypeData::TypeParameter(_)
            | TypeData::Index(_)
            | TypeData::IndexedAccess { .. }
            | TypeData::Unresolved(_) => return ResolvedType::named(text),
            _ => {}
        }

        if self.is_mapped_object(ty, &data) {
            return self.resolve_mapped_type(ty);
        }

        let Some(_scope) = self.enter(ty) else {
            trace!(ty = %text, depth = self.depth.get(), "Truncated type");
            return ResolvedType::truncated();
        };

        if matches!(data, TypeData::Conditional(_)) {
            return match get_conditional_resolved(checker, ty) {
                Some(resolved) => self.resolve(resolved),
                None => ResolvedType::named(text),
            };
        }

        if let Some(elements) = checker.tuple_elements(ty) {
            let elements = elements.iter().map(|e| self.resolve(e.ty)).collect();
            return ResolvedType {
                type_string: text,
                is_array: true,
                generic_arguments: Some(elements),
                ..Default::default()
            };
        }

        if let Some(inner) = get_promise_resolved_type(checker, ty) {
            return ResolvedType::generic(text, vec![self.resolve(inner)]);
        }

        if let Some(element) = array_element(checker, ty) {
            return ResolvedType::array(text, self.resolve(element));
        }

        match &data {
            TypeData::Union(members) => {
                let members = members.iter().map(|m| self.resolve(*m)).collect();
                return ResolvedType::union(text, members);
            }
            TypeData::Intersection(members) => {
                let members = members.iter().map(|m| self.resolve(*m)).collect();
                return ResolvedType::intersection(text, members);
            }
            _ => {}
        }

        let arguments = checker.type_arguments(ty);
        if self.is_opaque(ty) {
            if arguments.is_empty() {
                return ResolvedType::named(text);
            }
            let arguments = arguments.iter().map(|a| self.resolve(*a)).collect();
            return ResolvedType::generic(text, arguments);
        }

        let signatures = checker.call_signatures(ty);
        if !signatures.is_empty() {
            return ResolvedType::function(text, self.signatures_info(&signatures));
        }

        if !arguments.is_empty() {
            let resolved_arguments = arguments.iter().map(|a| self.resolve(*a)).collect();
            let properties = self.properties_of(ty, false);
            let resolved = ResolvedType::generic(text, resolved_arguments);
            return if properties.is_empty() {
                resolved
            } else {
                resolved.with_properties(properties)
            };
        }

        ResolvedType::object(text, self.properties_of(ty, false))
    }

    /// Mapped types and utility aliases over objects; tuples produced by
    /// `Parameters` and friends stay tuples
    fn is_mapped_object(&self, ty: TypeId, data: &TypeData) -> bool {
        let checker = self.checker();
        if matches!(
            data,
            TypeData::Union(_) | TypeData::Intersection(_) | TypeData::Conditional(_)
        ) || checker.tuple_elements(ty).is_some()
        {
            return false;
        }
        utility_type_name(checker, ty).is_some() || checker.is_mapped(ty)
    }

    /// Declared in the standard library; members are not expanded
    fn is_opaque(&self, ty: TypeId) -> bool {
        let checker = self.checker();
        let Some(object) = checker.data(ty).as_object().cloned() else {
            return false;
        };
        if !matches!(object.shape, ObjectShape::Declared | ObjectShape::SymbolValue) {
            return false;
        }
        object.symbol.is_some_and(|symbol| {
            let file = checker.symbol(symbol).file;
            checker.program().file(file).is_lib
        })
    }

    fn properties_of(&self, ty: TypeId, force_readonly: bool) -> Vec<PropertyInfo> {
        get_all_properties(self.checker(), ty)
            .iter()
            .map(|property| self.property_info(property, force_readonly))
            .collect()
    }

    fn property_info(&self, property: &Property, force_readonly: bool) -> PropertyInfo {
        let doc = self
            .symbols
            .documentation_for_member(property.declaration.as_ref());
        PropertyInfo {
            name: property.name.clone(),
            ty: self.resolve(property.ty),
            optional: property.optional,
            readonly: property.readonly || force_readonly,
            description: doc.description,
            visibility: visibility_of(property),
        }
    }

    /// First signature, with the rest as overloads
    fn signatures_info(&self, signatures: &[Rc<Signature>]) -> FunctionSignatureInfo {
        let mut info = self.signature_info(&signatures[0]);
        info.overloads = signatures[1..]
            .iter()
            .map(|signature| self.signature_info(signature))
            .collect();
        info
    }

    fn signature_info(&self, signature: &Signature) -> FunctionSignatureInfo {
        let checker = self.checker();
        let doc = self
            .symbols
            .documentation_for_member(signature.declaration.as_ref());
        let parameters = signature
            .parameters
            .iter()
            .map(|p| ParameterInfo {
                name: p.name.clone(),
                ty: self.resolve(p.ty),
                optional: p.optional || p.default_text.is_some(),
                description: doc.param(&p.name).map(str::to_string),
                default_value: p.default_text.clone(),
                rest: p.rest,
            })
            .collect();
        let type_parameters = signature
            .type_parameters
            .iter()
            .map(|tp| match checker.data(*tp) {
                TypeData::TypeParameter(param) => param.name,
                _ => checker.type_to_string(*tp),
            })
            .collect();
        FunctionSignatureInfo {
            parameters,
            return_type: self.resolve(signature.return_type),
            type_parameters,
            overloads: Vec::new(),
        }
    }

    /// Resolution of the entity a symbol declares, memoised by declaration
    ///
    /// Classes, interfaces, aliases and enums resolve their declared type,
    /// anything else its value type.
    pub fn resolve_declaration(&self, symbol: SymbolId) -> ResolvedType {
        let checker = self.checker();
        let ty = declaration_type(checker, symbol);
        let sym = checker.symbol(checker.resolve_alias(symbol).unwrap_or(symbol));
        let Some(decl) = sym.value_declaration() else {
            return self.resolve_type(ty);
        };
        let key = NodeKey::new(
            checker.program().file(decl.file).path.clone(),
            decl_kind_name(&decl.kind),
            decl.span.lo.0,
            decl.span.hi.0,
        );
        self.session
            .cache()
            .get_or_resolve(key, || self.resolve_type(ty))
    }

    /// Resolve every export of `files` ahead of assembly; returns how many
    /// declarations resolved
    ///
    /// Failures are left for the assembly pass to report.
    pub fn warm_up(&self, files: &[PathBuf]) -> usize {
        let checker = self.checker();
        let mut resolved = 0;
        for path in files {
            let Some(file) = self.session.source_file(path) else {
                continue;
            };
            let exports = checker.module_exports(checker.file_symbol(file.id));
            for (name, symbol) in exports.iter() {
                let Some(target) = checker.resolve_alias(*symbol) else {
                    continue;
                };
                if checker.symbol(target).flags.contains(SymbolFlags::MODULE) {
                    continue;
                }
                match catch_unwind_quiet(|| self.resolve_declaration(target)) {
                    Ok(_) => resolved += 1,
                    Err(_) => debug!(export = %name, "Warm-up resolution failed"),
                }
            }
        }
        debug!(resolved, "Warmed up type cache");
        resolved
    }

    /// Object tree of a mapped or utility type, the mapping's `readonly`
    /// applied to every property
    pub fn resolve_mapped_type(&self, ty: TypeId) -> ResolvedType {
        let checker = self.checker();
        let text = checker.type_to_string(ty);
        let readonly = is_readonly_mapping(checker, ty);
        let Some(_scope) = self.enter(ty) else {
            trace!(ty = %text, depth = self.depth.get(), "Truncated mapped type");
            return ResolvedType::truncated();
        };
        ResolvedType::object(text, self.properties_of(ty, readonly))
    }

    pub fn resolve_index_signatures(&self, ty: TypeId) -> ResolvedIndexSignatures {
        let signatures = get_index_signatures(self.checker(), ty);
        let Some(_scope) = self.enter(ty) else {
            return ResolvedIndexSignatures::default();
        };
        ResolvedIndexSignatures {
            string: signatures.string.map(|info| self.resolve(info.value)),
            number: signatures.number.map(|info| self.resolve(info.value)),
        }
    }

    /// Callable properties of `ty` with their signatures
    pub fn resolve_method_signatures(&self, ty: TypeId) -> Vec<(String, FunctionSignatureInfo)> {
        let methods = get_method_signatures(self.checker(), ty);
        let Some(_scope) = self.enter(ty) else {
            return Vec::new();
        };
        methods
            .into_iter()
            .map(|(name, signatures)| (name, self.signatures_info(&signatures)))
            .collect()
    }
}

impl TypeResolver for CheckerTypeResolver<'_> {
    fn resolve_type(&self, ty: TypeId) -> ResolvedType {
        self.resolve(ty)
    }

    fn get_properties(&self, ty: TypeId) -> Vec<PropertyInfo> {
        let readonly = is_readonly_mapping(self.checker(), ty);
        match self.enter(ty) {
            Some(_scope) => self.properties_of(ty, readonly),
            None => Vec::new(),
        }
    }

    fn expand_generic(&self, ty: TypeId) -> ExpandedType {
        ExpandedType::new(self.get_type_string(ty), self.resolve(ty))
    }

    fn get_type_string(&self, ty: TypeId) -> String {
        self.checker().type_to_string(ty)
    }
}

/// Declared type for type-declaring symbols, value type otherwise
pub fn declaration_type(checker: &Checker, symbol: SymbolId) -> TypeId {
    let target = checker.resolve_alias(symbol).unwrap_or(symbol);
    let flags = checker.symbol(target).flags;
    if flags.intersects(SymbolFlags::TYPE) {
        checker.declared_type_of_symbol(target)
    } else {
        checker.type_of_symbol(target)
    }
}

/// Declared visibility; `#private` names are always private
pub(crate) fn visibility_of(property: &Property) -> Visibility {
    if property.name.starts_with('#') {
        return Visibility::Private;
    }
    match property.accessibility {
        Accessibility::Public => Visibility::Public,
        Accessibility::Protected => Visibility::Protected,
        Accessibility::Private => Visibility::Private,
    }
}

fn decl_kind_name(kind: &DeclKind) -> &'static str {
    match kind {
        DeclKind::Function(_) => "function",
        DeclKind::Class(_) => "class",
        DeclKind::Interface(_) => "interface",
        DeclKind::TypeAlias(_) => "type",
        DeclKind::Enum(_) => "enum",
        DeclKind::Variable { .. } => "variable",
        DeclKind::Namespace => "namespace",
        DeclKind::DefaultExpr(_) => "default",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::session::test_support::session_for;
    use openpkg_checker::{CompilerOptions, MemoryHost};
    use pretty_assertions::assert_eq;
    use std::panic::{self, AssertUnwindSafe};

    const MODELS: &str = r#"
/** A registered user */
export interface User {
    /** Unique identifier */
    id: string;
    name: string;
    email?: string;
    readonly created: number;
}
export type PartialUser = Partial<User>;
export type UserBasic = Pick<User, "id" | "name">;
export type Frozen = Readonly<User>;
export type NestedArray = string[][];
export interface A { a: string }
export interface B { b: number }
export interface C { c: boolean }
export type Either = A | B | C;
export interface Node { value: string; children: Node[] }
"#;

    fn export_of(session: &Session, name: &str) -> SymbolId {
        let checker = session.checker();
        let root = checker.program().root_files()[0];
        checker.module_exports(checker.file_symbol(root))[name]
    }

    fn resolve(session: &Session, name: &str) -> ResolvedType {
        CheckerTypeResolver::new(session, DEFAULT_MAX_DEPTH)
            .resolve_declaration(export_of(session, name))
    }

    fn names(properties: &[PropertyInfo]) -> Vec<&str> {
        properties.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_interface_properties() {
        let session = session_for(MODELS);
        let user = resolve(&session, "User");
        assert!(user.is_object);
        assert_eq!(names(user.properties()), vec!["id", "name", "email", "created"]);

        let id = user.property("id").unwrap();
        assert!(id.ty.is_primitive);
        assert_eq!(id.ty.type_string, "string");
        assert_eq!(id.description.as_deref(), Some("Unique identifier"));
        assert!(user.property("email").unwrap().optional);
        assert!(user.property("created").unwrap().readonly);
    }

    #[test]
    fn test_partial_makes_every_property_optional() {
        let session = session_for(MODELS);
        let partial = resolve(&session, "PartialUser");
        assert_eq!(partial.properties().len(), 4);
        assert!(partial.properties().iter().all(|p| p.optional));
    }

    #[test]
    fn test_pick_keeps_selected_properties() {
        let session = session_for(MODELS);
        let basic = resolve(&session, "UserBasic");
        assert_eq!(names(basic.properties()), vec!["id", "name"]);
    }

    #[test]
    fn test_readonly_mapping_marks_every_property() {
        let session = session_for(MODELS);
        let frozen = resolve(&session, "Frozen");
        assert_eq!(frozen.properties().len(), 4);
        assert!(frozen.properties().iter().all(|p| p.readonly));
    }

    #[test]
    fn test_mapped_alias_applies_readonly() {
        let session = session_for(
            r#"
export interface Point { x: number; y?: number }
type Frozen<T> = { readonly [K in keyof T]: T[K] };
export type FrozenPoint = Frozen<Point>;
"#,
        );
        let checker = session.checker();
        let resolver = CheckerTypeResolver::new(&session, DEFAULT_MAX_DEPTH);
        let ty = checker.declared_type_of_symbol(export_of(&session, "FrozenPoint"));

        let frozen = resolver.resolve_mapped_type(ty);
        assert!(frozen.is_object);
        assert_eq!(names(frozen.properties()), vec!["x", "y"]);
        assert!(frozen.properties().iter().all(|p| p.readonly));
        assert!(frozen.property("y").unwrap().optional);
        assert_eq!(resolver.resolve_type(ty), frozen);
    }

    #[test]
    fn test_parameters_resolve_as_tuples() {
        let session = session_for(
            r#"
export function connect(host: string, port: number): void {}
export type ConnectArgs = Parameters<typeof connect>;
"#,
        );
        let args = resolve(&session, "ConnectArgs");
        assert!(args.is_array);
        assert!(!args.is_object);
        assert!(args.properties.is_none());
        let elements: Vec<&str> = args
            .generic_arguments
            .as_ref()
            .unwrap()
            .iter()
            .map(|e| e.type_string.as_str())
            .collect();
        assert_eq!(elements, vec!["string", "number"]);
    }

    #[test]
    fn test_nested_arrays() {
        let session = session_for(MODELS);
        let nested = resolve(&session, "NestedArray");
        assert!(nested.is_array);
        let inner = nested.element_type.as_deref().unwrap();
        assert!(inner.is_array);
        let leaf = inner.element_type.as_deref().unwrap();
        assert!(leaf.is_primitive);
        assert_eq!(leaf.type_string, "string");
    }

    #[test]
    fn test_union_members_keep_order() {
        let session = session_for(MODELS);
        let either = resolve(&session, "Either");
        assert!(either.is_union);
        let members: Vec<&str> = either
            .union_types
            .as_ref()
            .unwrap()
            .iter()
            .map(|m| m.type_string.as_str())
            .collect();
        assert_eq!(members, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_inherited_properties_are_merged() {
        let session = session_for(
            r#"
interface Animal { name: string; legs: number }
interface Pet { owner?: string }
export interface Dog extends Animal, Pet { breed: string }
"#,
        );
        let dog = resolve(&session, "Dog");
        assert_eq!(names(dog.properties()), vec!["breed", "name", "legs", "owner"]);
    }

    #[test]
    fn test_cycles_terminate_within_depth() {
        let session = session_for(MODELS);
        let node = resolve(&session, "Node");
        assert!(node.depth() <= DEFAULT_MAX_DEPTH);

        let children = &node.property("children").unwrap().ty;
        assert!(children.is_array);
        assert!(children.element_type.as_ref().unwrap().is_truncated());
    }

    #[test]
    fn test_depth_limit_truncates() {
        let session = session_for(
            "export interface Deep { a: { b: { c: { d: { e: string } } } } }",
        );
        for max_depth in 1..=DEFAULT_MAX_DEPTH {
            let resolver = CheckerTypeResolver::new(&session, max_depth);
            let deep = resolver.resolve_declaration(export_of(&session, "Deep"));
            assert!(deep.depth() <= max_depth, "depth {} > {}", deep.depth(), max_depth);
        }

        let shallow = CheckerTypeResolver::new(&session, 2)
            .resolve_declaration(export_of(&session, "Deep"));
        assert!(shallow.property("a").unwrap().ty.is_truncated());
    }

    #[test]
    fn test_scopes_are_released() {
        let session = session_for(MODELS);
        let resolver = CheckerTypeResolver::new(&session, DEFAULT_MAX_DEPTH);
        resolver.resolve_declaration(export_of(&session, "Node"));
        assert_eq!(resolver.depth.get(), 0);
        assert!(resolver.resolving.borrow().is_empty());

        let checker = session.checker();
        let node = checker.declared_type_of_symbol(export_of(&session, "Node"));
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _scope = resolver.enter(node);
            panic!("resolution failed");
        }));
        assert!(result.is_err());
        assert_eq!(resolver.depth.get(), 0);
        assert!(resolver.resolving.borrow().is_empty());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let session = session_for(MODELS);
        let resolver = CheckerTypeResolver::new(&session, DEFAULT_MAX_DEPTH);
        let cold = resolver.resolve_declaration(export_of(&session, "User"));
        let warm = resolver.resolve_declaration(export_of(&session, "User"));
        assert_eq!(cold, warm);
        assert_eq!(session.cache().stats().hits, 1);

        let host = MemoryHost::new().with_file("/pkg/index.ts", MODELS);
        let uncached = Session::with_host(
            &[PathBuf::from("/pkg/index.ts")],
            Some(CompilerOptions::default()),
            host,
            CacheConfig::disabled(),
        )
        .unwrap();
        assert_eq!(resolve(&uncached, "User"), cold);
    }

    #[test]
    fn test_functions_and_overloads() {
        let session = session_for(
            r#"
/**
 * Formats a value.
 * @param value - What to format
 */
export function format(value: string): string;
export function format(value: number, digits?: number): string;
export function format(value: any, digits = 2): string { return String(value); }
export function identity<T>(value: T): T { return value; }
"#,
        );
        let format = resolve(&session, "format");
        assert!(format.is_function);
        let signature = format.function_signature.as_ref().unwrap();
        assert_eq!(signature.parameters[0].name, "value");
        assert_eq!(
            signature.parameters[0].description.as_deref(),
            Some("What to format")
        );
        assert_eq!(signature.overloads.len(), 1);
        assert!(signature.overloads[0].parameters[1].optional);

        let identity = resolve(&session, "identity");
        let signature = identity.function_signature.as_ref().unwrap();
        assert_eq!(signature.type_parameters, vec!["T"]);
        assert_eq!(signature.return_type.type_string, "T");
    }

    #[test]
    fn test_promises_tuples_and_library_types() {
        let session = session_for(
            r#"
export interface User { id: string }
export type Later = Promise<User>;
export type Pair = [string, number];
export type Lookup = Map<string, User>;
export type When = Date;
"#,
        );
        let later = resolve(&session, "Later");
        assert!(later.is_generic);
        let args = later.generic_arguments.as_ref().unwrap();
        assert_eq!(args[0].type_string, "User");
        assert_eq!(names(args[0].properties()), vec!["id"]);

        let pair = resolve(&session, "Pair");
        assert!(pair.is_array);
        let elements: Vec<&str> = pair
            .generic_arguments
            .as_ref()
            .unwrap()
            .iter()
            .map(|e| e.type_string.as_str())
            .collect();
        assert_eq!(elements, vec!["string", "number"]);

        let lookup = resolve(&session, "Lookup");
        assert!(lookup.is_generic);
        assert!(lookup.properties.is_none());
        assert_eq!(lookup.generic_arguments.as_ref().unwrap().len(), 2);

        let when = resolve(&session, "When");
        assert_eq!(when.type_string, "Date");
        assert!(!when.is_object);
    }

    #[test]
    fn test_class_member_visibility() {
        let session = session_for(
            r#"
export class Account {
    #secret = "x";
    private token = "";
    protected id = 1;
    owner = "me";
}
"#,
        );
        let account = resolve(&session, "Account");
        let visibility = |name: &str| account.property(name).unwrap().visibility;
        assert_eq!(visibility("#secret"), Visibility::Private);
        assert_eq!(visibility("token"), Visibility::Private);
        assert_eq!(visibility("id"), Visibility::Protected);
        assert_eq!(visibility("owner"), Visibility::Public);
    }

    #[test]
    fn test_index_and_method_signatures() {
        let session = session_for(
            r#"
export interface Registry {
    [key: string]: number | (() => void);
    [index: number]: number;
    reset(): void;
}
"#,
        );
        let resolver = CheckerTypeResolver::new(&session, DEFAULT_MAX_DEPTH);
        let ty = session
            .checker()
            .declared_type_of_symbol(export_of(&session, "Registry"));

        let index = resolver.resolve_index_signatures(ty);
        assert!(index.string.as_ref().unwrap().is_union);
        assert_eq!(index.number.as_ref().unwrap().type_string, "number");

        let methods = resolver.resolve_method_signatures(ty);
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].0, "reset");
        assert_eq!(methods[0].1.return_type.type_string, "void");
    }

    #[test]
    fn test_warm_up_fills_cache() {
        let session = session_for(MODELS);
        let resolver = CheckerTypeResolver::new(&session, DEFAULT_MAX_DEPTH);
        let warmed = resolver.warm_up(session.entry_files());
        assert_eq!(warmed, 10);

        let misses = session.cache().stats().misses;
        resolver.resolve_declaration(export_of(&session, "User"));
        assert_eq!(session.cache().stats().misses, misses);
    }
}
