//! Type representation
//!
//! Types live in an arena owned by the checker and are addressed by
//! `TypeId`. Object types keep the syntax they came from together with
//! the type-parameter bindings in effect, and their members are computed
//! lazily.

use crate::binder::SymbolId;
use crate::program::FileId;
use bitflags::bitflags;
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::Span;
use indexmap::IndexMap;
use std::rc::Rc;

/// Index of a type inside the checker's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Built-in types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Any,
    Unknown,
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    UniqueSymbol,
    Void,
    Undefined,
    Null,
    Never,
    /// The non-primitive `object` type
    Object,
    This,
}

impl IntrinsicKind {
    pub fn name(self) -> &'static str {
        match self {
            IntrinsicKind::Any => "any",
            IntrinsicKind::Unknown => "unknown",
            IntrinsicKind::String => "string",
            IntrinsicKind::Number => "number",
            IntrinsicKind::Boolean => "boolean",
            IntrinsicKind::BigInt => "bigint",
            IntrinsicKind::Symbol => "symbol",
            IntrinsicKind::UniqueSymbol => "unique symbol",
            IntrinsicKind::Void => "void",
            IntrinsicKind::Undefined => "undefined",
            IntrinsicKind::Null => "null",
            IntrinsicKind::Never => "never",
            IntrinsicKind::Object => "object",
            IntrinsicKind::This => "this",
        }
    }
}

bitflags! {
    /// Structural classification of object types
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectFlags: u32 {
        const CLASS = 1 << 0;
        const INTERFACE = 1 << 1;
        /// Instantiation of a generic class or interface
        const REFERENCE = 1 << 2;
        const TUPLE = 1 << 3;
        const ANONYMOUS = 1 << 4;
        const MAPPED = 1 << 5;
        /// The value side of a class, function, enum or namespace
        const CONSTRUCTOR = 1 << 6;
        const READONLY = 1 << 7;
    }
}

/// Value of an enum member
#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    Number(f64),
    String(String),
    /// Initializer that could not be evaluated, kept as source text
    Computed(String),
}

/// Type-parameter bindings in effect while evaluating syntax
#[derive(Debug, Clone)]
pub struct Scope {
    pub file: FileId,
    /// Module or namespace symbol used for name lookup
    pub container: SymbolId,
    pub bindings: Rc<IndexMap<String, TypeId>>,
}

impl Scope {
    pub fn new(file: FileId, container: SymbolId) -> Self {
        Self {
            file,
            container,
            bindings: Rc::new(IndexMap::new()),
        }
    }

    /// A copy of this scope with one more binding
    pub fn with(&self, name: impl Into<String>, ty: TypeId) -> Self {
        let mut bindings = (*self.bindings).clone();
        bindings.insert(name.into(), ty);
        Self {
            file: self.file,
            container: self.container,
            bindings: Rc::new(bindings),
        }
    }

    /// A copy of this scope with several more bindings
    pub fn extend<I>(&self, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, TypeId)>,
    {
        let mut bindings = (*self.bindings).clone();
        bindings.extend(entries);
        Self {
            file: self.file,
            container: self.container,
            bindings: Rc::new(bindings),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.bindings.get(name).copied()
    }

    /// Identity of the bindings, used in cache keys
    pub fn binding_key(&self) -> Vec<(String, TypeId)> {
        self.bindings
            .iter()
            .map(|(name, ty)| (name.clone(), *ty))
            .collect()
    }
}

/// Where a member or signature was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberDecl {
    pub file: FileId,
    pub span: Span,
    /// Span whose leading comments hold the JSDoc
    pub doc_span: Span,
}

/// Member accessibility modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accessibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// What kind of member a property came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Property,
    Method,
    GetAccessor,
    SetAccessor,
    /// Getter and setter pair
    Accessor,
}

/// A resolved property of an object type
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub ty: TypeId,
    pub optional: bool,
    pub readonly: bool,
    pub accessibility: Accessibility,
    pub kind: PropertyKind,
    pub is_abstract: bool,
    pub is_static: bool,
    /// Class or interface that declared the member
    pub origin: Option<SymbolId>,
    pub declaration: Option<MemberDecl>,
}

impl Property {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            readonly: false,
            accessibility: Accessibility::Public,
            kind: PropertyKind::Property,
            is_abstract: false,
            is_static: false,
            origin: None,
            declaration: None,
        }
    }
}

/// A function parameter
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeId,
    pub optional: bool,
    pub rest: bool,
    /// Source text of the default value
    pub default_text: Option<String>,
}

/// A call or construct signature
#[derive(Debug, Clone)]
pub struct Signature {
    pub type_parameters: Vec<TypeId>,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeId,
    pub has_return_annotation: bool,
    pub is_async: bool,
    pub declaration: Option<MemberDecl>,
}

/// An index signature such as `[key: string]: T`
#[derive(Debug, Clone)]
pub struct IndexInfo {
    /// Name of the key parameter, `key` in `[key: string]`
    pub parameter: String,
    pub key: TypeId,
    pub value: TypeId,
    pub readonly: bool,
    pub declaration: Option<MemberDecl>,
}

/// Members of an object type after inheritance and mapping
#[derive(Debug, Clone, Default)]
pub struct ResolvedMembers {
    pub properties: Vec<Property>,
    pub call_signatures: Vec<Rc<Signature>>,
    pub construct_signatures: Vec<Rc<Signature>>,
    pub string_index: Option<IndexInfo>,
    pub number_index: Option<IndexInfo>,
}

impl ResolvedMembers {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
            && self.call_signatures.is_empty()
            && self.construct_signatures.is_empty()
            && self.string_index.is_none()
            && self.number_index.is_none()
    }
}

/// One element of a tuple type
#[derive(Debug, Clone, PartialEq)]
pub struct TupleElement {
    pub ty: TypeId,
    pub optional: bool,
    pub rest: bool,
    pub label: Option<String>,
}

/// How the members of an object type are obtained
#[derive(Debug, Clone)]
pub enum ObjectShape {
    /// Class or interface instance; members come from the symbol
    Declared,
    /// Object type literal `{ a: string }`
    Literal {
        node: Rc<swc_ast::TsTypeLit>,
        scope: Scope,
    },
    /// Mapped type `{ [P in K]: X }`
    Mapped {
        node: Rc<swc_ast::TsMappedType>,
        scope: Scope,
        /// The constraint `K` evaluated in `scope`
        constraint: TypeId,
    },
    Tuple(Vec<TupleElement>),
    /// Members computed up front (function types, object literals)
    Members(Rc<ResolvedMembers>),
    /// Value side of a class, function, enum or namespace symbol
    SymbolValue,
}

/// An object type
#[derive(Debug, Clone)]
pub struct ObjectType {
    pub flags: ObjectFlags,
    pub symbol: Option<SymbolId>,
    pub type_arguments: Vec<TypeId>,
    pub shape: ObjectShape,
}

/// A generic type parameter
#[derive(Debug, Clone)]
pub struct TypeParam {
    pub name: String,
    pub constraint: Option<TypeId>,
    pub default: Option<TypeId>,
}

/// A conditional type whose check type is still generic
#[derive(Debug, Clone)]
pub struct ConditionalType {
    pub check: TypeId,
    pub extends: TypeId,
    /// Source text of the whole conditional
    pub text: String,
    /// Branch chosen when the check type is replaced by its constraint
    pub resolved: Option<TypeId>,
}

/// The structure of one type
#[derive(Debug, Clone)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    StringLiteral(String),
    NumberLiteral(f64),
    BooleanLiteral(bool),
    BigIntLiteral(String),
    /// Template literal type kept as text
    TemplateLiteral(String),
    /// Enum type; symbol is the enum
    Enum(SymbolId),
    EnumLiteral {
        enum_symbol: SymbolId,
        member: String,
        value: EnumValue,
    },
    Union(Vec<TypeId>),
    Intersection(Vec<TypeId>),
    Object(ObjectType),
    TypeParameter(TypeParam),
    Conditional(ConditionalType),
    /// Deferred `keyof T`
    Index(TypeId),
    /// Deferred `T[K]`
    IndexedAccess { object: TypeId, index: TypeId },
    /// Type that could not be resolved, kept as source text
    Unresolved(String),
}

impl TypeData {
    pub fn is_intrinsic(&self, kind: IntrinsicKind) -> bool {
        matches!(self, TypeData::Intrinsic(k) if *k == kind)
    }

    /// Literal types of primitives
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TypeData::StringLiteral(_)
                | TypeData::NumberLiteral(_)
                | TypeData::BooleanLiteral(_)
                | TypeData::BigIntLiteral(_)
                | TypeData::EnumLiteral { .. }
        )
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            TypeData::Object(object) => Some(object),
            _ => None,
        }
    }
}

/// Alias a type was reached through, e.g. `Partial<User>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRef {
    pub symbol: SymbolId,
    pub arguments: Vec<TypeId>,
}

/// One arena slot
#[derive(Debug, Clone)]
pub struct TypeRecord {
    pub data: TypeData,
    pub alias: Option<AliasRef>,
}

/// `+`/`-` modifier on a mapped type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedModifier {
    Add,
    Remove,
}

impl MappedModifier {
    pub fn from_swc(modifier: Option<swc_ast::TruePlusMinus>) -> Option<Self> {
        match modifier {
            Some(swc_ast::TruePlusMinus::True) | Some(swc_ast::TruePlusMinus::Plus) => {
                Some(MappedModifier::Add)
            }
            Some(swc_ast::TruePlusMinus::Minus) => Some(MappedModifier::Remove),
            None => None,
        }
    }
}

/// Modifiers written on a mapped type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedModifiers {
    pub readonly: Option<MappedModifier>,
    pub optional: Option<MappedModifier>,
}

/// Member of an enum with its evaluated value
#[derive(Debug, Clone)]
pub struct EnumMember {
    pub name: String,
    pub value: EnumValue,
    pub declaration: MemberDecl,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_bindings_are_copied() {
        let scope = Scope::new(FileId(1), SymbolId(0));
        let inner = scope.with("T", TypeId(3));
        assert_eq!(scope.lookup("T"), None);
        assert_eq!(inner.lookup("T"), Some(TypeId(3)));

        let extended = inner.extend(vec![("U".to_string(), TypeId(4))]);
        assert_eq!(
            extended.binding_key(),
            vec![("T".to_string(), TypeId(3)), ("U".to_string(), TypeId(4))]
        );
    }

    #[test]
    fn test_mapped_modifier_from_swc() {
        assert_eq!(
            MappedModifier::from_swc(Some(swc_ast::TruePlusMinus::Minus)),
            Some(MappedModifier::Remove)
        );
        assert_eq!(
            MappedModifier::from_swc(Some(swc_ast::TruePlusMinus::True)),
            Some(MappedModifier::Add)
        );
        assert_eq!(MappedModifier::from_swc(None), None);
    }
}
