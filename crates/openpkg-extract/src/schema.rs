//! Type schemas and the type registry
//!
//! `SchemaBuilder` turns checker types into the reference-or-inline
//! `TypeSchema` carried by parameters, properties and variables. Named
//! types declared in the package become `$ref`s; the `TypeRegistry` hands
//! out their ids and remembers which of them still need a `types[]` entry.

use crate::js_doc::JsDocInfo;
use indexmap::IndexMap;
use openpkg_checker::{
    Checker, EnumValue, ObjectShape, Signature, SymbolFlags, SymbolId, TypeData, TypeId,
};
use openpkg_spec::{SpecParameter, SpecReturn, SpecSignature, SpecTypeParameter, TypeSchema};
use std::cell::RefCell;
use std::collections::HashSet;
use tracing::trace;

/// Nesting limit of inline schemas
pub const MAX_SCHEMA_DEPTH: usize = 8;

/// Ids of the package's named types
#[derive(Debug, Default)]
pub struct TypeRegistry {
    ids: RefCell<IndexMap<SymbolId, String>>,
    taken: RefCell<HashSet<String>>,
    materialized: RefCell<HashSet<SymbolId>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `symbol`, assigning one derived from `name` on first sight
    pub fn register(&self, symbol: SymbolId, name: &str) -> String {
        if let Some(id) = self.ids.borrow().get(&symbol) {
            return id.clone();
        }
        let id = self.unique_id(name);
        trace!(name, id = %id, "Registered type");
        self.ids.borrow_mut().insert(symbol, id.clone());
        id
    }

    /// A fresh id not used by any registered type
    pub fn unique_id(&self, name: &str) -> String {
        let mut taken = self.taken.borrow_mut();
        let mut id = name.to_string();
        let mut suffix = 2;
        while taken.contains(&id) {
            id = format!("{}_{}", name, suffix);
            suffix += 1;
        }
        taken.insert(id.clone());
        id
    }

    pub fn id_of(&self, symbol: SymbolId) -> Option<String> {
        self.ids.borrow().get(&symbol).cloned()
    }

    pub fn is_registered(&self, symbol: SymbolId) -> bool {
        self.ids.borrow().contains_key(&symbol)
    }

    /// Record that `symbol` has its `types[]` entry; false if it already had one
    pub fn mark_materialized(&self, symbol: SymbolId) -> bool {
        self.materialized.borrow_mut().insert(symbol)
    }

    pub fn is_materialized(&self, symbol: SymbolId) -> bool {
        self.materialized.borrow().contains(&symbol)
    }

    /// Registered types without a `types[]` entry, in registration order
    pub fn pending(&self) -> Vec<(SymbolId, String)> {
        let materialized = self.materialized.borrow();
        self.ids
            .borrow()
            .iter()
            .filter(|(symbol, _)| !materialized.contains(symbol))
            .map(|(symbol, id)| (*symbol, id.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ids.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.borrow().is_empty()
    }
}

/// Builds schemas against one checker and registry
pub struct SchemaBuilder<'a> {
    checker: &'a Checker,
    registry: &'a TypeRegistry,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(checker: &'a Checker, registry: &'a TypeRegistry) -> Self {
        Self { checker, registry }
    }

    /// Schema of a type used somewhere in the API
    pub fn schema(&self, ty: TypeId) -> TypeSchema {
        self.build(ty, 0, None)
    }

    /// Schema of the type `symbol` itself declares, without a `$ref` to itself
    pub fn definition_schema(&self, ty: TypeId, symbol: SymbolId) -> TypeSchema {
        self.build(ty, 0, Some(symbol))
    }

    /// `$ref` to a named type of the package, registering it if needed
    pub fn reference(&self, symbol: SymbolId) -> Option<TypeSchema> {
        if !is_package_type(self.checker, symbol) {
            return None;
        }
        let id = self.registry_id(symbol);
        Some(TypeSchema::reference(&id))
    }

    fn registry_id(&self, symbol: SymbolId) -> String {
        self.registry
            .register(symbol, &self.checker.symbol(symbol).name)
    }

    fn build(&self, ty: TypeId, depth: usize, definition: Option<SymbolId>) -> TypeSchema {
        let checker = self.checker;
        if depth > MAX_SCHEMA_DEPTH {
            return TypeSchema::named(checker.type_to_string(ty));
        }
        let child = |ty: TypeId| self.build(ty, depth + 1, None);

        if let Some(alias) = checker.alias_of(ty) {
            if Some(alias.symbol) != definition {
                if is_package_type(checker, alias.symbol) {
                    return self.reference_with(alias.symbol, &alias.arguments, depth);
                }
                let name = checker.symbol(alias.symbol).name.clone();
                let arguments = alias.arguments.iter().map(|a| child(*a)).collect();
                return TypeSchema::generic(name, arguments);
            }
        }

        match checker.data(ty) {
            TypeData::Intrinsic(kind) => TypeSchema::named(kind.name()),
            TypeData::StringLiteral(value) => TypeSchema::constant(value),
            TypeData::NumberLiteral(value) => TypeSchema::constant(number_value(value)),
            TypeData::BooleanLiteral(value) => TypeSchema::constant(value),
            TypeData::BigIntLiteral(value) => TypeSchema::named(format!("{}n", value)),
            TypeData::EnumLiteral { value, .. } => match value {
                EnumValue::Number(n) => TypeSchema::constant(number_value(n)),
                EnumValue::String(s) => TypeSchema::constant(s),
                EnumValue::Computed(_) => TypeSchema::named(checker.type_to_string(ty)),
            },
            TypeData::Enum(symbol) => self
                .reference(symbol)
                .unwrap_or_else(|| TypeSchema::named(checker.type_to_string(ty))),
            TypeData::Union(members) => TypeSchema::AnyOf {
                any_of: members.iter().map(|m| child(*m)).collect(),
            },
            TypeData::Intersection(members) => TypeSchema::AllOf {
                all_of: members.iter().map(|m| child(*m)).collect(),
            },
            TypeData::TypeParameter(param) => TypeSchema::named(param.name),
            TypeData::Unresolved(text) => self.unresolved(&text),
            TypeData::Object(object) => {
                if let Some(elements) = checker.tuple_elements(ty) {
                    return TypeSchema::tuple(elements.iter().map(|e| child(e.ty)).collect());
                }
                if let Some(element) = checker.array_element_type(ty) {
                    return TypeSchema::array(child(element));
                }
                match (object.symbol, &object.shape) {
                    (Some(_), ObjectShape::SymbolValue) => {
                        TypeSchema::named(checker.type_to_string(ty))
                    }
                    (Some(symbol), ObjectShape::Declared) => {
                        if Some(symbol) != definition && is_package_type(checker, symbol) {
                            return self.reference_with(symbol, &object.type_arguments, depth);
                        }
                        let name = checker.symbol(symbol).name.clone();
                        let arguments = object.type_arguments.iter().map(|a| child(*a)).collect();
                        TypeSchema::generic(name, arguments)
                    }
                    _ => self.inline_object(ty, depth),
                }
            }
            TypeData::TemplateLiteral(_)
            | TypeData::Conditional(_)
            | TypeData::Index(_)
            | TypeData::IndexedAccess { .. } => TypeSchema::named(checker.type_to_string(ty)),
        }
    }

    /// `$ref` with type arguments, omitted when they are the declaration's
    /// own type parameters
    fn reference_with(&self, symbol: SymbolId, arguments: &[TypeId], depth: usize) -> TypeSchema {
        let id = self.registry_id(symbol);
        let own = self.checker.type_parameters_of(symbol);
        if arguments.is_empty() || arguments == own.as_slice() {
            return TypeSchema::reference(&id);
        }
        let arguments = arguments
            .iter()
            .map(|a| self.build(*a, depth + 1, None))
            .collect();
        TypeSchema::reference_with_args(&id, arguments)
    }

    fn inline_object(&self, ty: TypeId, depth: usize) -> TypeSchema {
        let members = self.checker.resolved_members(ty);
        if members.properties.is_empty() && !members.call_signatures.is_empty() {
            let signatures = members
                .call_signatures
                .iter()
                .map(|s| self.signature_at(s, &JsDocInfo::default(), depth + 1))
                .collect();
            return TypeSchema::function(signatures);
        }

        let mut properties = IndexMap::new();
        let mut required = Vec::new();
        for property in &members.properties {
            properties.insert(
                property.name.clone(),
                self.build(property.ty, depth + 1, None),
            );
            if !property.optional {
                required.push(property.name.clone());
            }
        }
        TypeSchema::object(properties, required)
    }

    /// Types the checker kept as text; bare names still find package types
    fn unresolved(&self, text: &str) -> TypeSchema {
        let identifier = !text.is_empty()
            && text
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '$');
        if identifier {
            if let Some(symbol) = self.checker.find_declaration_by_name(text) {
                if let Some(reference) = self.reference(symbol) {
                    return reference;
                }
            }
        }
        TypeSchema::named(text)
    }

    /// Signature with parameter and return docs taken from `doc`
    pub fn signature(&self, signature: &Signature, doc: &JsDocInfo) -> SpecSignature {
        self.signature_at(signature, doc, 0)
    }

    fn signature_at(&self, signature: &Signature, doc: &JsDocInfo, depth: usize) -> SpecSignature {
        let parameters = signature
            .parameters
            .iter()
            .map(|p| SpecParameter {
                name: p.name.clone(),
                required: !p.optional && !p.rest && p.default_text.is_none(),
                description: doc.param(&p.name).map(str::to_string),
                schema: self.build(p.ty, depth, None),
                default: p.default_text.clone(),
                rest: p.rest,
            })
            .collect();
        SpecSignature {
            parameters,
            returns: Some(SpecReturn {
                schema: self.build(signature.return_type, depth, None),
                description: doc.returns_doc().map(str::to_string),
            }),
            type_parameters: signature
                .type_parameters
                .iter()
                .map(|tp| self.type_parameter(*tp))
                .collect(),
            description: doc.description().map(str::to_string),
        }
    }

    /// Name, constraint and default of a type parameter
    pub fn type_parameter(&self, ty: TypeId) -> SpecTypeParameter {
        match self.checker.data(ty) {
            TypeData::TypeParameter(param) => SpecTypeParameter {
                name: param.name,
                constraint: param.constraint.map(|c| self.checker.type_to_string(c)),
                default: param.default.map(|d| self.checker.type_to_string(d)),
            },
            _ => SpecTypeParameter {
                name: self.checker.type_to_string(ty),
                constraint: None,
                default: None,
            },
        }
    }
}

/// Class, interface, alias or enum declared in the package's own files
pub fn is_package_type(checker: &Checker, symbol: SymbolId) -> bool {
    let sym = checker.symbol(symbol);
    if !sym.flags.intersects(SymbolFlags::TYPE) {
        return false;
    }
    let file = sym.declarations.first().map_or(sym.file, |d| d.file);
    checker.program().file(file).is_user_file()
}

/// JSON number, integral values without a fraction
pub fn number_value(value: f64) -> serde_json::Value {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        serde_json::Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::session_for;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const API: &str = r#"
export interface User { id: string; tags?: string[] }
interface Hidden { secret: string }
export interface Box<T> { value: T; inner?: Box<T>; strings: Box<string> }
export type Mode = "fast" | "slow";
export type Pair = [string, number];
export type Handler = (event: string) => void;
export type Inline = { a: number; b?: Hidden };
export function load(user: User, mode: Mode, retries = 3, ...rest: Date[]): Promise<User> {
    return Promise.resolve(user);
}
"#;

    fn export(checker: &Checker, name: &str) -> SymbolId {
        let root = checker.program().root_files()[0];
        let raw = checker.module_exports(checker.file_symbol(root))[name];
        checker.resolve_alias(raw).unwrap()
    }

    fn json_of(schema: &TypeSchema) -> serde_json::Value {
        serde_json::to_value(schema).unwrap()
    }

    fn declared_schema(checker: &Checker, registry: &TypeRegistry, name: &str) -> TypeSchema {
        let symbol = export(checker, name);
        let ty = checker.declared_type_of_symbol(symbol);
        SchemaBuilder::new(checker, registry).definition_schema(ty, symbol)
    }

    #[test]
    fn test_registry_ids_are_unique() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.register(SymbolId(1), "Item"), "Item");
        assert_eq!(registry.register(SymbolId(2), "Item"), "Item_2");
        assert_eq!(registry.register(SymbolId(3), "Item"), "Item_3");
        assert_eq!(registry.register(SymbolId(1), "Other"), "Item");
        assert_eq!(registry.len(), 3);

        assert!(registry.mark_materialized(SymbolId(2)));
        assert!(!registry.mark_materialized(SymbolId(2)));
        assert_eq!(
            registry.pending(),
            vec![(SymbolId(1), "Item".to_string()), (SymbolId(3), "Item_3".to_string())]
        );
    }

    #[test]
    fn test_signature_schema() {
        let session = session_for(API);
        let checker = session.checker();
        let registry = TypeRegistry::new();
        let builder = SchemaBuilder::new(checker, &registry);
        let value = checker.type_of_symbol(export(checker, "load"));
        let signature = &checker.call_signatures(value)[0];

        let doc = JsDocInfo::parse("/** Loads.\n * @param user - Who\n * @returns The user */");
        let spec = builder.signature(signature, &doc);
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            json,
            json!({
                "parameters": [
                    { "name": "user", "required": true, "description": "Who", "schema": { "$ref": "#/types/User" } },
                    { "name": "mode", "required": true, "schema": { "$ref": "#/types/Mode" } },
                    { "name": "retries", "required": false, "schema": { "type": "number" }, "default": "3" },
                    { "name": "rest", "required": false, "schema": { "type": "array", "items": { "type": "Date" } }, "rest": true }
                ],
                "returns": {
                    "schema": { "type": "Promise", "typeArguments": [{ "$ref": "#/types/User" }] },
                    "description": "The user"
                },
                "description": "Loads."
            })
        );
        assert_eq!(
            registry.pending(),
            vec![
                (export(checker, "User"), "User".to_string()),
                (export(checker, "Mode"), "Mode".to_string()),
            ]
        );
    }

    #[test]
    fn test_definitions_do_not_reference_themselves() {
        let session = session_for(API);
        let checker = session.checker();
        let registry = TypeRegistry::new();
        assert_eq!(
            json_of(&declared_schema(checker, &registry, "Mode")),
            json!({ "anyOf": [{ "const": "fast" }, { "const": "slow" }] })
        );
        assert_eq!(
            json_of(&declared_schema(checker, &registry, "Pair")),
            json!({ "type": "tuple", "items": [{ "type": "string" }, { "type": "number" }] })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_inline_objects_and_functions() {
        let session = session_for(API);
        let checker = session.checker();
        let registry = TypeRegistry::new();
        assert_eq!(
            json_of(&declared_schema(checker, &registry, "Inline")),
            json!({
                "type": "object",
                "properties": { "a": { "type": "number" }, "b": { "$ref": "#/types/Hidden" } },
                "required": ["a"]
            })
        );
        // Unexported types are referenced and left for materialization
        assert_eq!(registry.pending().len(), 1);
        assert_eq!(registry.pending()[0].1, "Hidden");

        let handler = declared_schema(checker, &registry, "Handler");
        match handler {
            TypeSchema::Function { signatures, .. } => {
                assert_eq!(signatures.len(), 1);
                assert_eq!(signatures[0].parameters[0].name, "event");
            }
            other => panic!("expected a function schema, got {:?}", other),
        }
    }

    #[test]
    fn test_generic_references() {
        let session = session_for(API);
        let checker = session.checker();
        let registry = TypeRegistry::new();
        let builder = SchemaBuilder::new(checker, &registry);
        let boxed = checker.declared_type_of_symbol(export(checker, "Box"));
        let members = checker.resolved_members(boxed);

        let inner = members.property("inner").unwrap().ty;
        assert_eq!(json_of(&builder.schema(inner)), json!({ "$ref": "#/types/Box" }));

        let strings = members.property("strings").unwrap().ty;
        assert_eq!(
            json_of(&builder.schema(strings)),
            json!({ "$ref": "#/types/Box", "typeArguments": [{ "type": "string" }] })
        );
        let value = members.property("value").unwrap().ty;
        assert_eq!(json_of(&builder.schema(value)), json!({ "type": "T" }));
    }

    #[test]
    fn test_number_values() {
        assert_eq!(number_value(3.0), json!(3));
        assert_eq!(number_value(-1.0), json!(-1));
        assert_eq!(number_value(0.5), json!(0.5));
    }
}
