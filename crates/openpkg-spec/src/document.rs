//! The OpenPkg specification document
//!
//! This is the only artifact the extraction engine hands to the outside
//! world. Renderers read it as a graph keyed by `id`: every `$ref` inside
//! `exports` or `types` names exactly one entry of `types`.

use crate::resolved::{PropertyInfo, ResolvedType, Visibility};
use crate::schema::TypeSchema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Version written into the `openpkg` envelope field
pub const OPENPKG_VERSION: &str = "1.0.0";

/// Ecosystem identifier written into `meta.ecosystem`
pub const ECOSYSTEM: &str = "js/ts";

/// Top-level document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecDocument {
    /// Format version
    pub openpkg: String,
    /// Package metadata
    pub meta: SpecMeta,
    /// Exported declarations in module export order
    pub exports: Vec<SpecExport>,
    /// Shared structural definitions
    pub types: Vec<SpecType>,
}

impl SpecDocument {
    /// Create an empty document for a package
    pub fn new(meta: SpecMeta) -> Self {
        Self {
            openpkg: OPENPKG_VERSION.to_string(),
            meta,
            exports: vec![],
            types: vec![],
        }
    }

    /// Find an export by name
    pub fn export(&self, name: &str) -> Option<&SpecExport> {
        self.exports.iter().find(|e| e.name == name)
    }

    /// Find a type by id
    pub fn type_by_id(&self, id: &str) -> Option<&SpecType> {
        self.types.iter().find(|t| t.id == id)
    }

    /// Find a type by name
    pub fn type_by_name(&self, name: &str) -> Option<&SpecType> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Serialize to pretty JSON
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Package metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecMeta {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub repository: Option<String>,
    pub ecosystem: String,
}

impl SpecMeta {
    /// Metadata with just a package name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ecosystem: ECOSYSTEM.to_string(),
            ..Default::default()
        }
    }
}

/// Kind of an export or type entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Function,
    Class,
    Variable,
    Interface,
    Type,
    Enum,
    Module,
    Namespace,
    Reference,
}

impl ExportKind {
    /// Whether declarations of this kind also produce a `types[]` entry
    pub fn defines_type(&self) -> bool {
        matches!(
            self,
            ExportKind::Class | ExportKind::Interface | ExportKind::Type | ExportKind::Enum
        )
    }

    /// Lowercase name as serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Function => "function",
            ExportKind::Class => "class",
            ExportKind::Variable => "variable",
            ExportKind::Interface => "interface",
            ExportKind::Type => "type",
            ExportKind::Enum => "enum",
            ExportKind::Module => "module",
            ExportKind::Namespace => "namespace",
            ExportKind::Reference => "reference",
        }
    }
}

/// Where a declaration was written
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    /// Path relative to the package root when possible
    pub file: String,
    /// 1-indexed line
    pub line: usize,
}

/// A documentation tag carried through verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecTag {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub text: String,
}

impl SpecTag {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Boolean markers such as `async`, `deprecated` or `degraded`
pub type SpecFlags = IndexMap<String, bool>;

/// A type parameter of a generic declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecTypeParameter {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub constraint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub default: Option<String>,
}

/// A parameter of a signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecParameter {
    pub name: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    pub schema: TypeSchema,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub rest: bool,
}

/// The return value of a signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecReturn {
    pub schema: TypeSchema,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

/// A call or construct signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecSignature {
    pub parameters: Vec<SpecParameter>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub returns: Option<SpecReturn>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub type_parameters: Vec<SpecTypeParameter>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

/// Kind of a member of a class, enum or namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemberKind {
    Constructor,
    Property,
    Method,
    Accessor,
    IndexSignature,
    EnumMember,
    Export,
}

/// A member of a class, enum or namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecMember {
    pub name: String,
    pub kind: MemberKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub schema: Option<TypeSchema>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub signatures: Vec<SpecSignature>,
    /// Constant value of an enum member
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub flags: SpecFlags,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<SpecTag>,
}

impl SpecMember {
    /// A member with no type information yet
    pub fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            kind,
            schema: None,
            signatures: vec![],
            value: None,
            description: None,
            visibility: None,
            flags: SpecFlags::new(),
            tags: vec![],
        }
    }
}

/// A property of an interface or object type alias
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecProperty {
    pub name: String,
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub readonly: bool,
    pub schema: TypeSchema,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    /// Name of the base type this member was inherited from
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub inherited_from: Option<String>,
}

/// One exported declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecExport {
    pub id: String,
    pub name: String,
    pub kind: ExportKind,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub signatures: Vec<SpecSignature>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub members: Vec<SpecMember>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub ty: Option<TypeSchema>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub examples: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<SourceLocation>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub flags: SpecFlags,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<SpecTag>,
    /// Originating module of `module` and `reference` exports
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub from_module: Option<String>,
}

impl SpecExport {
    /// An export with no detail yet
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ExportKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            signatures: vec![],
            members: vec![],
            ty: None,
            description: None,
            examples: vec![],
            source: None,
            flags: SpecFlags::new(),
            tags: vec![],
            from_module: None,
        }
    }

    /// Whether `flag` is set
    pub fn flag(&self, flag: &str) -> bool {
        self.flags.get(flag).copied().unwrap_or(false)
    }
}

/// Inheritance tree of an interface or class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeHierarchy {
    pub name: String,
    /// Names of members declared directly on this type
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub own_members: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub bases: Vec<TypeHierarchy>,
    /// Set when the tree was cut off by the depth limit
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub truncated: bool,
}

/// One shared structural definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecType {
    pub id: String,
    pub name: String,
    pub kind: ExportKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    /// Literal alias text for type aliases
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub ty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub schema: Option<TypeSchema>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub properties: Vec<SpecProperty>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub members: Vec<SpecMember>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub extends: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub implements: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub type_parameters: Vec<SpecTypeParameter>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expanded_type: Option<ResolvedType>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub resolved_properties: Option<Vec<PropertyInfo>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hierarchy: Option<TypeHierarchy>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<SourceLocation>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub flags: SpecFlags,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<SpecTag>,
}

impl SpecType {
    /// A type entry with no detail yet
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ExportKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            description: None,
            ty: None,
            schema: None,
            properties: vec![],
            members: vec![],
            extends: vec![],
            implements: vec![],
            type_parameters: vec![],
            expanded_type: None,
            resolved_properties: None,
            hierarchy: None,
            source: None,
            flags: SpecFlags::new(),
            tags: vec![],
        }
    }

    /// Find a property by name
    pub fn property(&self, name: &str) -> Option<&SpecProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Find a member by name
    pub fn member(&self, name: &str) -> Option<&SpecMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let mut doc = SpecDocument::new(SpecMeta::named("my-lib"));
        let mut export = SpecExport::new("greet", "greet", ExportKind::Function);
        export.flags.insert("async".to_string(), true);
        doc.exports.push(export);

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["openpkg"], "1.0.0");
        assert_eq!(json["meta"]["ecosystem"], "js/ts");
        assert_eq!(json["exports"][0]["kind"], "function");
        assert_eq!(json["exports"][0]["flags"]["async"], true);
        assert!(json["exports"][0].get("members").is_none());
    }

    #[test]
    fn test_kind_defines_type() {
        assert!(ExportKind::Interface.defines_type());
        assert!(ExportKind::Enum.defines_type());
        assert!(!ExportKind::Function.defines_type());
        assert!(!ExportKind::Variable.defines_type());
    }

    #[test]
    fn test_lookup_helpers() {
        let mut doc = SpecDocument::new(SpecMeta::named("pkg"));
        doc.types
            .push(SpecType::new("User", "User", ExportKind::Interface));
        assert!(doc.type_by_id("User").is_some());
        assert!(doc.type_by_name("User").is_some());
        assert!(doc.type_by_id("Missing").is_none());
    }
}
