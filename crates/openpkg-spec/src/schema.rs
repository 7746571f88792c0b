//! Reference-or-inline type schemas
//!
//! Parameters, return values, properties and variables describe their type
//! with a `TypeSchema`. Named shared types are never inlined: they are linked
//! with `{"$ref": "#/types/<id>"}`.

use crate::document::SpecSignature;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Prefix of every `$ref` pointer
pub const REF_PREFIX: &str = "#/types/";

/// `"type": "array"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArrayTag {
    #[default]
    #[serde(rename = "array")]
    Array,
}

/// `"type": "tuple"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TupleTag {
    #[default]
    #[serde(rename = "tuple")]
    Tuple,
}

/// `"type": "object"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObjectTag {
    #[default]
    #[serde(rename = "object")]
    Object,
}

/// `"type": "function"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FunctionTag {
    #[default]
    #[serde(rename = "function")]
    Function,
}

/// A type description embedded in exports and types
///
/// Variants are matched in declaration order when deserializing, so the
/// catch-all `Named` form comes last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSchema {
    /// `{"$ref": "#/types/User"}`, with arguments for generic instantiations
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
        #[serde(
            rename = "typeArguments",
            skip_serializing_if = "Vec::is_empty",
            default
        )]
        type_arguments: Vec<TypeSchema>,
    },
    /// `{"anyOf": [...]}`
    AnyOf {
        #[serde(rename = "anyOf")]
        any_of: Vec<TypeSchema>,
    },
    /// `{"allOf": [...]}`
    AllOf {
        #[serde(rename = "allOf")]
        all_of: Vec<TypeSchema>,
    },
    /// `{"const": "a"}`
    Const {
        #[serde(rename = "const")]
        value: serde_json::Value,
    },
    /// `{"type": "array", "items": ...}`
    Array {
        #[serde(rename = "type")]
        tag: ArrayTag,
        items: Box<TypeSchema>,
    },
    /// `{"type": "tuple", "items": [...]}`
    Tuple {
        #[serde(rename = "type")]
        tag: TupleTag,
        items: Vec<TypeSchema>,
    },
    /// `{"type": "object", "properties": {...}, "required": [...]}`
    Object {
        #[serde(rename = "type")]
        tag: ObjectTag,
        properties: IndexMap<String, TypeSchema>,
        #[serde(skip_serializing_if = "Vec::is_empty", default)]
        required: Vec<String>,
    },
    /// `{"type": "function", "signatures": [...]}`
    Function {
        #[serde(rename = "type")]
        tag: FunctionTag,
        signatures: Vec<SpecSignature>,
    },
    /// `{"type": "string"}`, or a textual fallback such as `{"type": "Foo<Bar>"}`
    Named {
        #[serde(rename = "type")]
        name: String,
        #[serde(
            rename = "typeArguments",
            skip_serializing_if = "Vec::is_empty",
            default
        )]
        type_arguments: Vec<TypeSchema>,
    },
}

impl TypeSchema {
    /// A `$ref` pointer to the type with `id`
    pub fn reference(id: &str) -> Self {
        Self::reference_with_args(id, vec![])
    }

    /// A `$ref` pointer to a generic type instantiated with `type_arguments`
    pub fn reference_with_args(id: &str, type_arguments: Vec<TypeSchema>) -> Self {
        TypeSchema::Ref {
            reference: format!("{}{}", REF_PREFIX, id),
            type_arguments,
        }
    }

    /// A named (or textual fallback) type
    pub fn named(name: impl Into<String>) -> Self {
        TypeSchema::Named {
            name: name.into(),
            type_arguments: vec![],
        }
    }

    /// A named generic instantiation
    pub fn generic(name: impl Into<String>, type_arguments: Vec<TypeSchema>) -> Self {
        TypeSchema::Named {
            name: name.into(),
            type_arguments,
        }
    }

    /// An array of `items`
    pub fn array(items: TypeSchema) -> Self {
        TypeSchema::Array {
            tag: ArrayTag::Array,
            items: Box::new(items),
        }
    }

    /// A tuple of `items`
    pub fn tuple(items: Vec<TypeSchema>) -> Self {
        TypeSchema::Tuple {
            tag: TupleTag::Tuple,
            items,
        }
    }

    /// An inline object
    pub fn object(properties: IndexMap<String, TypeSchema>, required: Vec<String>) -> Self {
        TypeSchema::Object {
            tag: ObjectTag::Object,
            properties,
            required,
        }
    }

    /// An inline function type
    pub fn function(signatures: Vec<SpecSignature>) -> Self {
        TypeSchema::Function {
            tag: FunctionTag::Function,
            signatures,
        }
    }

    /// A literal value
    pub fn constant(value: impl Into<serde_json::Value>) -> Self {
        TypeSchema::Const {
            value: value.into(),
        }
    }

    /// The id this schema points at, if it is a `$ref`
    pub fn ref_id(&self) -> Option<&str> {
        match self {
            TypeSchema::Ref { reference, .. } => reference.strip_prefix(REF_PREFIX),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reference_shape() {
        let schema = TypeSchema::reference("User");
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json, serde_json::json!({ "$ref": "#/types/User" }));
        assert_eq!(schema.ref_id(), Some("User"));
    }

    #[test]
    fn test_array_and_named_shapes() {
        let schema = TypeSchema::array(TypeSchema::named("string"));
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "array", "items": { "type": "string" } })
        );
    }

    #[test]
    fn test_untagged_deserialization_picks_specific_variant() {
        let json = serde_json::json!({
            "type": "object",
            "properties": { "id": { "type": "string" } },
            "required": ["id"]
        });
        let schema: TypeSchema = serde_json::from_value(json).unwrap();
        assert!(matches!(schema, TypeSchema::Object { .. }));

        let named: TypeSchema = serde_json::from_value(serde_json::json!({ "type": "Foo" })).unwrap();
        assert_eq!(named, TypeSchema::named("Foo"));
    }
}
