//! Type syntax evaluation
//!
//! Turns `TsType` nodes into arena types under a `Scope`. Results are
//! cached per node and binding set, so evaluating the same annotation
//! twice yields the same `TypeId`.

use super::symbols::EntityTarget;
use super::Checker;
use crate::binder::{DeclKind, SymbolFlags, SymbolId};
use crate::source::{entity_name, format_number, wtf8_to_string};
use crate::types::{
    AliasRef, EnumValue, IntrinsicKind, ObjectFlags, ObjectShape, ObjectType, ResolvedMembers,
    Scope, TupleElement, TypeData, TypeId, TypeParam,
};
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::Spanned;
use std::rc::Rc;

impl Checker {
    /// Evaluate a type annotation
    pub fn type_from_node(&self, node: &swc_ast::TsType, scope: &Scope) -> TypeId {
        let span = node.span();
        let key = (
            scope.file,
            span.lo.0,
            span.hi.0,
            std::mem::discriminant(node),
            scope.binding_key(),
        );
        if let Some(cached) = self.node_types.borrow().get(&key) {
            return *cached;
        }

        let Some(_guard) = self.enter() else {
            return self.intrinsics.any;
        };
        let ty = self.evaluate_type_node(node, scope);
        self.node_types.borrow_mut().insert(key, ty);
        ty
    }

    fn evaluate_type_node(&self, node: &swc_ast::TsType, scope: &Scope) -> TypeId {
        use swc_ast::TsType;

        let i = self.intrinsics;
        match node {
            TsType::TsKeywordType(keyword) => self.keyword_type(keyword.kind),
            TsType::TsThisType(_) => scope.lookup("this").unwrap_or(i.this),

            TsType::TsFnOrConstructorType(swc_ast::TsFnOrConstructorType::TsFnType(f)) => {
                let sig = self.signature_from_ts_params(
                    &f.params,
                    f.type_params.as_deref(),
                    Some(&f.type_ann),
                    scope,
                    None,
                );
                self.function_type(sig)
            }
            TsType::TsFnOrConstructorType(swc_ast::TsFnOrConstructorType::TsConstructorType(c)) => {
                let sig = self.signature_from_ts_params(
                    &c.params,
                    c.type_params.as_deref(),
                    Some(&c.type_ann),
                    scope,
                    None,
                );
                self.anonymous_object(ResolvedMembers {
                    construct_signatures: vec![Rc::new(sig)],
                    ..Default::default()
                })
            }

            TsType::TsTypeRef(reference) => self.type_from_reference(reference, scope),
            TsType::TsTypeQuery(query) => self.type_from_query(query, scope),

            TsType::TsTypeLit(literal) => self.alloc(TypeData::Object(ObjectType {
                flags: ObjectFlags::ANONYMOUS,
                symbol: None,
                type_arguments: Vec::new(),
                shape: ObjectShape::Literal {
                    node: Rc::new(literal.clone()),
                    scope: scope.clone(),
                },
            })),

            TsType::TsArrayType(array) => {
                let element = self.type_from_node(&array.elem_type, scope);
                self.array_type(element)
            }
            TsType::TsTupleType(tuple) => self.tuple_from_node(tuple, scope),
            TsType::TsOptionalType(optional) => self.type_from_node(&optional.type_ann, scope),
            TsType::TsRestType(rest) => self.type_from_node(&rest.type_ann, scope),

            TsType::TsUnionOrIntersectionType(swc_ast::TsUnionOrIntersectionType::TsUnionType(u)) => {
                let members = u.types.iter().map(|t| self.type_from_node(t, scope)).collect();
                self.union(members)
            }
            TsType::TsUnionOrIntersectionType(
                swc_ast::TsUnionOrIntersectionType::TsIntersectionType(x),
            ) => {
                let members = x.types.iter().map(|t| self.type_from_node(t, scope)).collect();
                self.intersection(members)
            }

            TsType::TsConditionalType(conditional) => self.evaluate_conditional(conditional, scope),
            TsType::TsInferType(infer) => {
                let name = infer.type_param.name.sym.to_string();
                scope.lookup(&name).unwrap_or_else(|| {
                    self.alloc(TypeData::TypeParameter(TypeParam {
                        name,
                        constraint: None,
                        default: None,
                    }))
                })
            }
            TsType::TsParenthesizedType(paren) => self.type_from_node(&paren.type_ann, scope),

            TsType::TsTypeOperator(operator) => match operator.op {
                swc_ast::TsTypeOperatorOp::KeyOf => {
                    let target = self.type_from_node(&operator.type_ann, scope);
                    self.keyof_type(target)
                }
                swc_ast::TsTypeOperatorOp::Unique => i.unique_symbol,
                swc_ast::TsTypeOperatorOp::ReadOnly => self.readonly_type(&operator.type_ann, scope),
            },

            TsType::TsIndexedAccessType(access) => {
                let object = self.type_from_node(&access.obj_type, scope);
                let index = self.type_from_node(&access.index_type, scope);
                self.indexed_access_type(object, index)
            }

            TsType::TsMappedType(mapped) => self.mapped_from_node(mapped, scope),
            TsType::TsLitType(literal) => self.literal_from_node(literal, scope),
            TsType::TsTypePredicate(predicate) => {
                if predicate.asserts {
                    i.void
                } else {
                    i.boolean
                }
            }
            TsType::TsImportType(import) => self.type_from_import(import, scope),
        }
    }

    pub(crate) fn keyword_type(&self, kind: swc_ast::TsKeywordTypeKind) -> TypeId {
        use swc_ast::TsKeywordTypeKind as K;

        let i = self.intrinsics;
        match kind {
            K::TsAnyKeyword | K::TsIntrinsicKeyword => i.any,
            K::TsUnknownKeyword => i.unknown,
            K::TsNumberKeyword => i.number,
            K::TsObjectKeyword => i.object,
            K::TsBooleanKeyword => i.boolean,
            K::TsBigIntKeyword => i.bigint,
            K::TsStringKeyword => i.string,
            K::TsSymbolKeyword => i.symbol,
            K::TsVoidKeyword => i.void,
            K::TsUndefinedKeyword => i.undefined,
            K::TsNullKeyword => i.null,
            K::TsNeverKeyword => i.never,
        }
    }

    pub(crate) fn anonymous_object(&self, members: ResolvedMembers) -> TypeId {
        self.alloc(TypeData::Object(ObjectType {
            flags: ObjectFlags::ANONYMOUS,
            symbol: None,
            type_arguments: Vec::new(),
            shape: ObjectShape::Members(Rc::new(members)),
        }))
    }

    /// Object type with a single call signature
    pub(crate) fn function_type(&self, signature: crate::types::Signature) -> TypeId {
        self.anonymous_object(ResolvedMembers {
            call_signatures: vec![Rc::new(signature)],
            ..Default::default()
        })
    }

    fn type_from_reference(&self, node: &swc_ast::TsTypeRef, scope: &Scope) -> TypeId {
        if let swc_ast::TsEntityName::Ident(ident) = &node.type_name {
            if let Some(bound) = scope.lookup(&ident.sym) {
                return bound;
            }
        }

        let name = entity_name(&node.type_name);
        let arguments: Vec<TypeId> = node
            .type_params
            .iter()
            .flat_map(|p| p.params.iter())
            .map(|t| self.type_from_node(t, scope))
            .collect();

        let first = name.split('.').next().unwrap_or(&name);
        if self.lookup_name(first, scope.container).is_none() {
            self.report_unresolved_name(first, scope.file, node.span);
            return self.unresolved(self.node_text(scope.file, node.span));
        }

        match self.resolve_entity(&name, scope.container) {
            Some(EntityTarget::EnumMember(enum_symbol, member)) => {
                self.enum_literal_type(enum_symbol, &member)
            }
            Some(EntityTarget::Symbol(symbol)) => self.type_from_symbol(symbol, arguments, &name),
            // Imported from a module outside the program
            None => self.unresolved(self.node_text(scope.file, node.span)),
        }
    }

    /// Type named by a symbol in type position
    pub(crate) fn type_from_symbol(&self, symbol: SymbolId, arguments: Vec<TypeId>, name: &str) -> TypeId {
        let flags = self.symbol(symbol).flags;
        if flags.contains(SymbolFlags::TYPE_ALIAS) {
            self.instantiate_alias(symbol, arguments)
        } else if flags.intersects(SymbolFlags::CLASS | SymbolFlags::INTERFACE) {
            self.type_reference(symbol, arguments)
        } else if flags.contains(SymbolFlags::ENUM) {
            self.declared_type_of_symbol(symbol)
        } else {
            self.unresolved(name)
        }
    }

    fn type_from_query(&self, query: &swc_ast::TsTypeQuery, scope: &Scope) -> TypeId {
        match &query.expr_name {
            swc_ast::TsTypeQueryExpr::TsEntityName(entity) => {
                let name = entity_name(entity);
                let first = name.split('.').next().unwrap_or(&name);
                if self.lookup_name(first, scope.container).is_none() {
                    self.report_unresolved_name(first, scope.file, query.span);
                    return self.unresolved(format!("typeof {}", name));
                }
                match self.resolve_entity(&name, scope.container) {
                    Some(EntityTarget::Symbol(symbol)) => self.type_of_symbol(symbol),
                    Some(EntityTarget::EnumMember(enum_symbol, member)) => {
                        self.enum_literal_type(enum_symbol, &member)
                    }
                    None => self.unresolved(format!("typeof {}", name)),
                }
            }
            swc_ast::TsTypeQueryExpr::Import(import) => {
                let specifier = wtf8_to_string(&import.arg);
                let Some(file) = self.program.resolved_module(scope.file, &specifier) else {
                    return self.unresolved(self.node_text(scope.file, query.span));
                };
                let module = self.file_symbol(file);
                match &import.qualifier {
                    None => self.type_of_symbol(module),
                    Some(qualifier) => match self.module_member(module, &entity_name(qualifier)) {
                        Some(symbol) => self.type_of_symbol(symbol),
                        None => self.unresolved(self.node_text(scope.file, query.span)),
                    },
                }
            }
        }
    }

    fn type_from_import(&self, import: &swc_ast::TsImportType, scope: &Scope) -> TypeId {
        let specifier = wtf8_to_string(&import.arg);
        let (Some(file), Some(qualifier)) = (
            self.program.resolved_module(scope.file, &specifier),
            import.qualifier.as_ref(),
        ) else {
            return self.unresolved(self.node_text(scope.file, import.span));
        };
        let name = entity_name(qualifier);
        let Some(symbol) = self.module_member(self.file_symbol(file), &name) else {
            return self.unresolved(self.node_text(scope.file, import.span));
        };
        let arguments = import
            .type_args
            .iter()
            .flat_map(|p| p.params.iter())
            .map(|t| self.type_from_node(t, scope))
            .collect();
        self.type_from_symbol(symbol, arguments, &name)
    }

    /// Walk a dotted name through module and namespace exports
    fn module_member(&self, module: SymbolId, name: &str) -> Option<SymbolId> {
        let mut current = module;
        for segment in name.split('.') {
            let next = *self.namespace_exports(current).get(segment)?;
            current = self.resolve_alias(next)?;
        }
        Some(current)
    }

    /// Evaluate a type alias for a set of arguments
    ///
    /// A placeholder is registered before the body is evaluated so that
    /// recursive aliases terminate. Anonymous results carry the alias so
    /// they print by name.
    pub(crate) fn instantiate_alias(&self, symbol: SymbolId, arguments: Vec<TypeId>) -> TypeId {
        let arguments = self.fill_type_arguments(symbol, arguments);
        let key = (symbol, arguments.clone());
        if let Some(cached) = self.alias_instances.borrow().get(&key) {
            return *cached;
        }

        let sym = self.symbol(symbol);
        let Some((decl, alias)) = sym.declarations.iter().find_map(|d| match &d.kind {
            DeclKind::TypeAlias(alias) => Some((d, alias.clone())),
            _ => None,
        }) else {
            return self.unresolved(sym.name.clone());
        };

        let placeholder = self.unresolved(sym.name.clone());
        self.alias_instances
            .borrow_mut()
            .insert(key.clone(), placeholder);

        let names = alias
            .type_params
            .iter()
            .flat_map(|p| p.params.iter())
            .map(|p| p.name.sym.to_string());
        let scope = self
            .declaration_scope(decl)
            .extend(names.zip(arguments.iter().copied()));
        let result = self.type_from_node(&alias.type_ann, &scope);
        if result == placeholder {
            return placeholder;
        }

        // `type PartialUser = Partial<User>` keeps the inner alias; generic
        // aliases such as `Omit<T, K>` name their own instantiations
        let record = self.record(result);
        let keep_inner = record.alias.is_some() && arguments.is_empty();
        if !keep_inner && is_anonymous(&record.data) {
            self.set_record(placeholder, record.data, Some(AliasRef { symbol, arguments }));
            placeholder
        } else {
            self.set_record(placeholder, record.data, record.alias);
            self.alias_instances.borrow_mut().insert(key, result);
            result
        }
    }

    /// True for types that still mention unbound type parameters at the top
    pub fn is_generic(&self, ty: TypeId) -> bool {
        let Some(_guard) = self.enter() else {
            return false;
        };
        match self.data(ty) {
            TypeData::TypeParameter(_)
            | TypeData::Index(_)
            | TypeData::IndexedAccess { .. }
            | TypeData::Conditional(_) => true,
            TypeData::Union(members) | TypeData::Intersection(members) => {
                members.iter().any(|m| self.is_generic(*m))
            }
            TypeData::Object(ObjectType {
                shape: ObjectShape::Mapped { constraint, .. },
                ..
            }) => self.is_generic(constraint),
            _ => false,
        }
    }

    /// `keyof T`
    pub(crate) fn keyof_type(&self, target: TypeId) -> TypeId {
        if self.is_generic(target) {
            return self.alloc(TypeData::Index(target));
        }
        let i = self.intrinsics;
        match self.data(target) {
            TypeData::Intrinsic(IntrinsicKind::Any) => self.union(vec![i.string, i.number, i.symbol]),
            TypeData::Intrinsic(_)
            | TypeData::StringLiteral(_)
            | TypeData::NumberLiteral(_)
            | TypeData::BooleanLiteral(_)
            | TypeData::BigIntLiteral(_)
            | TypeData::TemplateLiteral(_)
            | TypeData::Unresolved(_) => i.never,
            _ => {
                let members = self.resolved_members(target);
                let mut keys = Vec::new();
                if members.string_index.is_some() {
                    keys.push(i.string);
                    keys.push(i.number);
                } else if members.number_index.is_some() {
                    keys.push(i.number);
                }
                for property in &members.properties {
                    if property.name.starts_with('[')
                        || property.name.starts_with('#')
                        || property.accessibility != crate::types::Accessibility::Public
                    {
                        continue;
                    }
                    keys.push(self.string_literal(&property.name));
                }
                self.union(keys)
            }
        }
    }

    /// `T[K]`
    pub(crate) fn indexed_access_type(&self, object: TypeId, index: TypeId) -> TypeId {
        let i = self.intrinsics;
        let Some(_guard) = self.enter() else {
            return i.any;
        };

        if let TypeData::Union(keys) = self.data(index) {
            let parts = keys
                .iter()
                .map(|k| self.indexed_access_type(object, *k))
                .collect();
            return self.union(parts);
        }
        if self.is_generic(object) || self.is_generic(index) {
            return self.alloc(TypeData::IndexedAccess { object, index });
        }
        match self.data(object) {
            TypeData::Intrinsic(IntrinsicKind::Any) => return i.any,
            TypeData::Union(parts) => {
                let parts = parts
                    .iter()
                    .map(|p| self.indexed_access_type(*p, index))
                    .collect();
                return self.union(parts);
            }
            _ => {}
        }

        let members = self.resolved_members(object);
        let by_name = |name: &str, numeric: bool| -> Option<TypeId> {
            if let Some(property) = members.property(name) {
                return Some(if property.optional {
                    self.union(vec![property.ty, i.undefined])
                } else {
                    property.ty
                });
            }
            if numeric {
                if let Some(info) = &members.number_index {
                    return Some(info.value);
                }
            }
            members.string_index.as_ref().map(|info| info.value)
        };

        let found = match self.data(index) {
            TypeData::StringLiteral(name) => by_name(&name, false),
            TypeData::NumberLiteral(n) => by_name(&format_number(n), true),
            TypeData::EnumLiteral { value, .. } => match value {
                EnumValue::String(s) => by_name(&s, false),
                EnumValue::Number(n) => by_name(&format_number(n), true),
                EnumValue::Computed(_) => None,
            },
            TypeData::Intrinsic(IntrinsicKind::Number) => members
                .number_index
                .as_ref()
                .or(members.string_index.as_ref())
                .map(|info| info.value),
            TypeData::Intrinsic(IntrinsicKind::String) => {
                members.string_index.as_ref().map(|info| info.value)
            }
            _ => None,
        };
        found.unwrap_or_else(|| {
            self.unresolved(format!(
                "{}[{}]",
                self.type_to_string(object),
                self.type_to_string(index)
            ))
        })
    }

    fn readonly_type(&self, inner: &swc_ast::TsType, scope: &Scope) -> TypeId {
        if let swc_ast::TsType::TsArrayType(array) = inner {
            let element = self.type_from_node(&array.elem_type, scope);
            return self.readonly_array_type(element);
        }
        let ty = self.type_from_node(inner, scope);
        match self.data(ty) {
            TypeData::Object(mut object) if object.flags.contains(ObjectFlags::TUPLE) => {
                object.flags |= ObjectFlags::READONLY;
                self.alloc(TypeData::Object(object))
            }
            _ => ty,
        }
    }

    fn tuple_from_node(&self, tuple: &swc_ast::TsTupleType, scope: &Scope) -> TypeId {
        let elements: Vec<TupleElement> = tuple
            .elem_types
            .iter()
            .map(|element| {
                let (node, mut optional, mut rest) = match &*element.ty {
                    swc_ast::TsType::TsOptionalType(o) => (&*o.type_ann, true, false),
                    swc_ast::TsType::TsRestType(r) => (&*r.type_ann, false, true),
                    other => (other, false, false),
                };
                let label = match &element.label {
                    Some(swc_ast::Pat::Ident(binding)) => {
                        optional |= binding.id.optional;
                        Some(binding.id.sym.to_string())
                    }
                    Some(swc_ast::Pat::Rest(r)) => {
                        rest = true;
                        match &*r.arg {
                            swc_ast::Pat::Ident(binding) => Some(binding.id.sym.to_string()),
                            _ => None,
                        }
                    }
                    _ => None,
                };
                TupleElement {
                    ty: self.type_from_node(node, scope),
                    optional,
                    rest,
                    label,
                }
            })
            .collect();
        self.tuple_type(elements, false)
    }

    pub(crate) fn tuple_type(&self, elements: Vec<TupleElement>, readonly: bool) -> TypeId {
        let mut flags = ObjectFlags::TUPLE;
        if readonly {
            flags |= ObjectFlags::READONLY;
        }
        self.alloc(TypeData::Object(ObjectType {
            flags,
            symbol: None,
            type_arguments: elements.iter().map(|e| e.ty).collect(),
            shape: ObjectShape::Tuple(elements),
        }))
    }

    fn mapped_from_node(&self, node: &swc_ast::TsMappedType, scope: &Scope) -> TypeId {
        // A homomorphic mapping over a primitive yields the primitive
        if let Some(swc_ast::TsType::TsTypeOperator(op)) = node.type_param.constraint.as_deref() {
            if op.op == swc_ast::TsTypeOperatorOp::KeyOf {
                let source = self.type_from_node(&op.type_ann, scope);
                let data = self.data(source);
                let is_primitive = data.is_literal()
                    || matches!(
                        data,
                        TypeData::Intrinsic(
                            IntrinsicKind::String
                                | IntrinsicKind::Number
                                | IntrinsicKind::Boolean
                                | IntrinsicKind::BigInt
                                | IntrinsicKind::Symbol
                                | IntrinsicKind::Undefined
                                | IntrinsicKind::Null
                                | IntrinsicKind::Never
                        )
                    );
                if is_primitive {
                    return source;
                }
            }
        }

        let constraint = match node.type_param.constraint.as_deref() {
            Some(c) => self.type_from_node(c, scope),
            None => self.intrinsics.unknown,
        };
        self.alloc(TypeData::Object(ObjectType {
            flags: ObjectFlags::ANONYMOUS | ObjectFlags::MAPPED,
            symbol: None,
            type_arguments: Vec::new(),
            shape: ObjectShape::Mapped {
                node: Rc::new(node.clone()),
                scope: scope.clone(),
                constraint,
            },
        }))
    }

    fn literal_from_node(&self, literal: &swc_ast::TsLitType, scope: &Scope) -> TypeId {
        match &literal.lit {
            swc_ast::TsLit::Number(n) => self.number_literal(n.value),
            swc_ast::TsLit::Str(s) => self.string_literal(&wtf8_to_string(s)),
            swc_ast::TsLit::Bool(b) => self.boolean_literal(b.value),
            swc_ast::TsLit::BigInt(b) => self.bigint_literal(&b.value.to_string()),
            swc_ast::TsLit::Tpl(tpl) => {
                if tpl.types.is_empty() {
                    let text: String = tpl.quasis.iter().map(|q| q.raw.to_string()).collect();
                    self.string_literal(&text)
                } else {
                    self.alloc(TypeData::TemplateLiteral(
                        self.node_text(scope.file, literal.span),
                    ))
                }
            }
        }
    }
}

/// Results that print as their alias name rather than by identity
fn is_anonymous(data: &TypeData) -> bool {
    match data {
        TypeData::Union(_)
        | TypeData::Intersection(_)
        | TypeData::Conditional(_)
        | TypeData::Index(_)
        | TypeData::IndexedAccess { .. }
        | TypeData::TemplateLiteral(_) => true,
        TypeData::Object(object) => matches!(
            object.shape,
            ObjectShape::Literal { .. }
                | ObjectShape::Mapped { .. }
                | ObjectShape::Tuple(_)
                | ObjectShape::Members(_)
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_primitive_and_literal_aliases() {
        let checker = checker_for(
            r#"
            export type Id = string;
            export type Dir = "up" | "down";
            export type Big = 10n;
            export type Neg = -1;
            export type Tpl = `prefix-${string}`;
            "#,
        );
        assert_eq!(declared(&checker, "Id"), "string");
        assert_eq!(declared(&checker, "Dir"), "Dir");
        assert_eq!(declared(&checker, "Big"), "10n");
        assert_eq!(declared(&checker, "Neg"), "-1");
        assert_eq!(declared(&checker, "Tpl"), "Tpl");
    }

    #[test]
    fn test_arrays_and_tuples() {
        let checker = checker_for(
            r#"
            export type A = string[];
            export type B = Array<Array<string>>;
            export type C = readonly number[];
            export type D = [name: string, age?: number, ...rest: boolean[]];
            export type E = (string | number)[];
            "#,
        );
        assert_eq!(declared(&checker, "A"), "string[]");
        assert_eq!(declared(&checker, "B"), "string[][]");
        assert_eq!(declared(&checker, "C"), "readonly number[]");
        assert_eq!(
            expanded(&checker, "D"),
            "[name: string, age?: number, ...rest: boolean[]]"
        );
        assert_eq!(expanded(&checker, "E"), "(string | number)[]");
    }

    #[test]
    fn test_keyof_and_indexed_access() {
        let checker = checker_for(
            r#"
            interface User { id: string; name: string; email?: string }
            export type Keys = keyof User;
            export type Name = User["name"];
            export type Email = User["email"];
            export type Both = User["id" | "name"];
            "#,
        );
        assert_eq!(
            expanded(&checker, "Keys"),
            "\"id\" | \"name\" | \"email\""
        );
        assert_eq!(declared(&checker, "Name"), "string");
        assert_eq!(expanded(&checker, "Email"), "string | undefined");
        assert_eq!(declared(&checker, "Both"), "string");
    }

    #[test]
    fn test_recursive_alias_terminates() {
        let checker = checker_for(
            r#"
            export type Json = string | number | boolean | null | Json[] | { [key: string]: Json };
            export type Tree = { value: number; children: Tree[] };
            export type Loop = Loop;
            "#,
        );
        assert_eq!(declared(&checker, "Json"), "Json");
        assert_eq!(
            expanded(&checker, "Json"),
            "string | number | boolean | null | Json[] | { [key: string]: Json; }"
        );
        assert_eq!(
            expanded(&checker, "Tree"),
            "{ value: number; children: Tree[]; }"
        );
        assert_eq!(declared(&checker, "Loop"), "Loop");
    }

    #[test]
    fn test_qualified_and_enum_member_references() {
        let checker = checker_for(
            r#"
            export namespace Api { export interface Request { url: string } }
            export enum Status { Active = "active", Inactive = "inactive" }
            export type R = Api.Request;
            export type S = Status.Active;
            export type Q = typeof Status;
            "#,
        );
        assert_eq!(declared(&checker, "R"), "Request");
        assert_eq!(declared(&checker, "S"), "Status.Active");
        assert_eq!(declared(&checker, "Q"), "typeof Status");
    }
}
