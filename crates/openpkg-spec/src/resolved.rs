//! Resolved type trees
//!
//! `ResolvedType` is the serializable result of walking a checker type. It
//! always forms a finite tree: self-referential types are cut off with the
//! truncation sentinel instead of back-references.

use serde::{Deserialize, Serialize};

/// Text used for types that were cut off by the depth limit or a cycle.
pub const TRUNCATED: &str = "...";

/// Names that resolve to primitive leaves.
pub const PRIMITIVE_NAMES: &[&str] = &[
    "string",
    "number",
    "boolean",
    "null",
    "undefined",
    "void",
    "any",
    "unknown",
    "never",
    "symbol",
    "bigint",
];

/// Member visibility as written in the declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    /// No modifier, or `public`
    #[default]
    Public,
    /// `protected`
    Protected,
    /// `private` or a `#private` name
    Private,
}

impl Visibility {
    /// Keyword as written in TypeScript
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

/// The structured result of resolving a compiler type
///
/// Category flags tell which child fields are populated. Exactly one shape is
/// active per node (array, union, intersection, function or plain object),
/// except generics which may carry both `generic_arguments` and `properties`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedType {
    /// Canonical textual form
    pub type_string: String,

    #[serde(default)]
    pub is_primitive: bool,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub is_union: bool,
    #[serde(default)]
    pub is_intersection: bool,
    #[serde(default)]
    pub is_object: bool,
    #[serde(default)]
    pub is_function: bool,
    #[serde(default)]
    pub is_generic: bool,

    /// Element type for arrays
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub element_type: Option<Box<ResolvedType>>,

    /// Union members in checker order
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub union_types: Option<Vec<ResolvedType>>,

    /// Intersection members in checker order
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub intersection_types: Option<Vec<ResolvedType>>,

    /// Type arguments (also tuple elements and promise values)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub generic_arguments: Option<Vec<ResolvedType>>,

    /// Object members
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub properties: Option<Vec<PropertyInfo>>,

    /// Call signature for callable types
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub function_signature: Option<Box<FunctionSignatureInfo>>,
}

impl ResolvedType {
    /// A leaf with only a type string and no category
    pub fn named(type_string: impl Into<String>) -> Self {
        Self {
            type_string: type_string.into(),
            ..Default::default()
        }
    }

    /// A primitive leaf
    pub fn primitive(type_string: impl Into<String>) -> Self {
        Self {
            type_string: type_string.into(),
            is_primitive: true,
            ..Default::default()
        }
    }

    /// The truncation sentinel
    pub fn truncated() -> Self {
        Self::named(TRUNCATED)
    }

    /// Whether this node is the truncation sentinel
    pub fn is_truncated(&self) -> bool {
        self.type_string == TRUNCATED
    }

    /// An array of `element`
    pub fn array(type_string: impl Into<String>, element: ResolvedType) -> Self {
        Self {
            type_string: type_string.into(),
            is_array: true,
            element_type: Some(Box::new(element)),
            ..Default::default()
        }
    }

    /// A union of `members`
    pub fn union(type_string: impl Into<String>, members: Vec<ResolvedType>) -> Self {
        Self {
            type_string: type_string.into(),
            is_union: true,
            union_types: Some(members),
            ..Default::default()
        }
    }

    /// An intersection of `members`
    pub fn intersection(type_string: impl Into<String>, members: Vec<ResolvedType>) -> Self {
        Self {
            type_string: type_string.into(),
            is_intersection: true,
            intersection_types: Some(members),
            ..Default::default()
        }
    }

    /// A plain object; `is_object` follows the member count
    pub fn object(type_string: impl Into<String>, properties: Vec<PropertyInfo>) -> Self {
        Self {
            type_string: type_string.into(),
            is_object: !properties.is_empty(),
            properties: Some(properties),
            ..Default::default()
        }
    }

    /// A callable type
    pub fn function(type_string: impl Into<String>, signature: FunctionSignatureInfo) -> Self {
        Self {
            type_string: type_string.into(),
            is_function: true,
            function_signature: Some(Box::new(signature)),
            ..Default::default()
        }
    }

    /// A generic instantiation
    pub fn generic(type_string: impl Into<String>, arguments: Vec<ResolvedType>) -> Self {
        Self {
            type_string: type_string.into(),
            is_generic: true,
            generic_arguments: Some(arguments),
            ..Default::default()
        }
    }

    /// Attach object members to this node
    pub fn with_properties(mut self, properties: Vec<PropertyInfo>) -> Self {
        if !properties.is_empty() {
            self.is_object = true;
        }
        self.properties = Some(properties);
        self
    }

    /// Object members, empty when none were resolved
    pub fn properties(&self) -> &[PropertyInfo] {
        self.properties.as_deref().unwrap_or(&[])
    }

    /// Find a member by name
    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties().iter().find(|p| p.name == name)
    }

    /// Maximum nesting reached below (and including) this node
    pub fn depth(&self) -> usize {
        let children = self
            .element_type
            .iter()
            .map(|t| t.depth())
            .chain(self.union_types.iter().flatten().map(|t| t.depth()))
            .chain(self.intersection_types.iter().flatten().map(|t| t.depth()))
            .chain(self.generic_arguments.iter().flatten().map(|t| t.depth()))
            .chain(self.properties().iter().map(|p| p.ty.depth()))
            .chain(self.function_signature.iter().map(|s| s.depth()))
            .max();
        1 + children.unwrap_or(0)
    }
}

/// An object member
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ResolvedType,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
}

impl PropertyInfo {
    /// A public, required, writable member
    pub fn new(name: impl Into<String>, ty: ResolvedType) -> Self {
        Self {
            name: name.into(),
            ty,
            ..Default::default()
        }
    }
}

/// A resolved call signature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSignatureInfo {
    pub parameters: Vec<ParameterInfo>,
    pub return_type: ResolvedType,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub type_parameters: Vec<String>,
    /// Additional call signatures after the first
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub overloads: Vec<FunctionSignatureInfo>,
}

impl FunctionSignatureInfo {
    fn depth(&self) -> usize {
        self.parameters
            .iter()
            .map(|p| p.ty.depth())
            .chain(std::iter::once(self.return_type.depth()))
            .max()
            .unwrap_or(0)
    }
}

/// A resolved parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ResolvedType,
    #[serde(default)]
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub default_value: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub rest: bool,
}

/// Surface syntax paired with its full resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedType {
    pub original: String,
    pub expanded: ResolvedType,
    pub depth: usize,
}

impl ExpandedType {
    /// Pair `original` with `expanded`, computing the depth
    pub fn new(original: impl Into<String>, expanded: ResolvedType) -> Self {
        let depth = expanded.depth();
        Self {
            original: original.into(),
            expanded,
            depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_counts_nesting() {
        let nested = ResolvedType::array(
            "string[][]",
            ResolvedType::array("string[]", ResolvedType::primitive("string")),
        );
        assert_eq!(nested.depth(), 3);
        assert_eq!(ResolvedType::primitive("string").depth(), 1);
    }

    #[test]
    fn test_object_flag_follows_members() {
        let empty = ResolvedType::object("{}", vec![]);
        assert!(!empty.is_object);

        let obj = ResolvedType::object(
            "{ a: string }",
            vec![PropertyInfo::new("a", ResolvedType::primitive("string"))],
        );
        assert!(obj.is_object);
        assert!(obj.property("a").is_some());
    }

    #[test]
    fn test_serialized_names_are_camel_case() {
        let ty = ResolvedType::array("number[]", ResolvedType::primitive("number"));
        let json = serde_json::to_value(&ty).unwrap();
        assert_eq!(json["typeString"], "number[]");
        assert_eq!(json["isArray"], true);
        assert_eq!(json["elementType"]["isPrimitive"], true);
        assert!(json.get("unionTypes").is_none());
    }

    #[test]
    fn test_truncated_sentinel() {
        let t = ResolvedType::truncated();
        assert!(t.is_truncated());
        assert_eq!(t.type_string, "...");
        assert!(!t.is_primitive);
    }
}
