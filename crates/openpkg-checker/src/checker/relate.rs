//! Conditional types, `infer` matching and assignability

use super::symbols::EntityTarget;
use super::Checker;
use crate::binder::{SymbolFlags, SymbolId};
use crate::source::entity_name;
use crate::types::{
    ConditionalType, EnumValue, IntrinsicKind, ObjectShape, ObjectType, Scope, Signature,
    TupleElement, TypeData, TypeId,
};
use deno_ast::swc::ast as swc_ast;
use indexmap::IndexMap;

/// Combine per-part results: any `false` wins, then any unknown
fn all_of(results: impl IntoIterator<Item = Option<bool>>) -> Option<bool> {
    let mut unknown = false;
    for result in results {
        match result {
            Some(false) => return Some(false),
            None => unknown = true,
            Some(true) => {}
        }
    }
    if unknown {
        None
    } else {
        Some(true)
    }
}

/// Any `true` wins, then any unknown
fn any_of(results: impl IntoIterator<Item = Option<bool>>) -> Option<bool> {
    let mut unknown = false;
    for result in results {
        match result {
            Some(true) => return Some(true),
            None => unknown = true,
            Some(false) => {}
        }
    }
    if unknown {
        None
    } else {
        Some(false)
    }
}

/// `T` when a conditional's check type is a bare type reference
fn naked_type_name(node: &swc_ast::TsType) -> Option<String> {
    match node {
        swc_ast::TsType::TsTypeRef(reference) if reference.type_params.is_none() => {
            match &reference.type_name {
                swc_ast::TsEntityName::Ident(ident) => Some(ident.sym.to_string()),
                swc_ast::TsEntityName::TsQualifiedName(_) => None,
            }
        }
        _ => None,
    }
}

fn fn_param_annotation(param: &swc_ast::TsFnParam) -> Option<&swc_ast::TsType> {
    let ann = match param {
        swc_ast::TsFnParam::Ident(binding) => binding.type_ann.as_deref(),
        swc_ast::TsFnParam::Array(array) => array.type_ann.as_deref(),
        swc_ast::TsFnParam::Rest(rest) => rest.type_ann.as_deref(),
        swc_ast::TsFnParam::Object(object) => object.type_ann.as_deref(),
    };
    ann.map(|a| &*a.type_ann)
}

/// Call `visit` on each direct child type of `node`
fn for_each_child(node: &swc_ast::TsType, visit: &mut dyn FnMut(&swc_ast::TsType)) {
    use swc_ast::TsType as T;

    match node {
        T::TsTypeRef(reference) => {
            for param in reference.type_params.iter().flat_map(|p| p.params.iter()) {
                visit(param);
            }
        }
        T::TsArrayType(array) => visit(&array.elem_type),
        T::TsTupleType(tuple) => {
            for element in &tuple.elem_types {
                visit(&element.ty);
            }
        }
        T::TsOptionalType(o) => visit(&o.type_ann),
        T::TsRestType(r) => visit(&r.type_ann),
        T::TsParenthesizedType(p) => visit(&p.type_ann),
        T::TsTypeOperator(op) => visit(&op.type_ann),
        T::TsUnionOrIntersectionType(swc_ast::TsUnionOrIntersectionType::TsUnionType(u)) => {
            for t in &u.types {
                visit(t);
            }
        }
        T::TsUnionOrIntersectionType(swc_ast::TsUnionOrIntersectionType::TsIntersectionType(x)) => {
            for t in &x.types {
                visit(t);
            }
        }
        T::TsFnOrConstructorType(swc_ast::TsFnOrConstructorType::TsFnType(f)) => {
            for param in &f.params {
                if let Some(ann) = fn_param_annotation(param) {
                    visit(ann);
                }
            }
            visit(&f.type_ann.type_ann);
        }
        T::TsFnOrConstructorType(swc_ast::TsFnOrConstructorType::TsConstructorType(c)) => {
            for param in &c.params {
                if let Some(ann) = fn_param_annotation(param) {
                    visit(ann);
                }
            }
            visit(&c.type_ann.type_ann);
        }
        T::TsTypeLit(literal) => {
            for member in &literal.members {
                match member {
                    swc_ast::TsTypeElement::TsPropertySignature(p) => {
                        if let Some(ann) = &p.type_ann {
                            visit(&ann.type_ann);
                        }
                    }
                    swc_ast::TsTypeElement::TsMethodSignature(m) => {
                        for param in &m.params {
                            if let Some(ann) = fn_param_annotation(param) {
                                visit(ann);
                            }
                        }
                        if let Some(ann) = &m.type_ann {
                            visit(&ann.type_ann);
                        }
                    }
                    _ => {}
                }
            }
        }
        T::TsIndexedAccessType(access) => {
            visit(&access.obj_type);
            visit(&access.index_type);
        }
        T::TsConditionalType(c) => {
            visit(&c.check_type);
            visit(&c.extends_type);
            visit(&c.true_type);
            visit(&c.false_type);
        }
        T::TsMappedType(m) => {
            if let Some(c) = &m.type_param.constraint {
                visit(c);
            }
            if let Some(n) = &m.name_type {
                visit(n);
            }
            if let Some(t) = &m.type_ann {
                visit(t);
            }
        }
        T::TsInferType(infer) => {
            if let Some(c) = &infer.type_param.constraint {
                visit(c);
            }
        }
        _ => {}
    }
}

/// Names introduced by `infer X` inside an extends clause
pub(crate) fn collect_infer_names(node: &swc_ast::TsType, names: &mut Vec<String>) {
    if let swc_ast::TsType::TsInferType(infer) = node {
        let name = infer.type_param.name.sym.to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    for_each_child(node, &mut |child| collect_infer_names(child, names));
}

fn contains_infer(node: &swc_ast::TsType) -> bool {
    let mut names = Vec::new();
    collect_infer_names(node, &mut names);
    !names.is_empty()
}

impl Checker {
    /// Evaluate `Check extends Extends ? True : False`
    ///
    /// Distributes over unions bound to a naked type parameter, and defers
    /// when the check type is still generic.
    pub(crate) fn evaluate_conditional(&self, node: &swc_ast::TsConditionalType, scope: &Scope) -> TypeId {
        if let Some(name) = naked_type_name(&node.check_type) {
            if let Some(bound) = scope.lookup(&name) {
                match self.data(bound) {
                    TypeData::Union(parts) => {
                        let results = parts
                            .iter()
                            .map(|part| self.evaluate_conditional_once(node, &scope.with(name.clone(), *part)))
                            .collect();
                        return self.union(results);
                    }
                    TypeData::Intrinsic(IntrinsicKind::Never) => return self.intrinsics.never,
                    _ => {}
                }
            }
        }
        self.evaluate_conditional_once(node, scope)
    }

    fn evaluate_conditional_once(&self, node: &swc_ast::TsConditionalType, scope: &Scope) -> TypeId {
        let check = self.type_from_node(&node.check_type, scope);
        let mut infer_names = Vec::new();
        collect_infer_names(&node.extends_type, &mut infer_names);

        if check == self.intrinsics.any {
            let unknowns = infer_names
                .iter()
                .map(|name| (name.clone(), self.intrinsics.unknown));
            let when_true = self.type_from_node(&node.true_type, &scope.extend(unknowns));
            let when_false = self.type_from_node(&node.false_type, scope);
            return self.union(vec![when_true, when_false]);
        }
        if self.is_generic(check) {
            return self.deferred_conditional(node, scope, check, &infer_names);
        }

        match self.choose_branch(check, node, scope, &infer_names) {
            Some(branch) => branch,
            None => self.deferred_conditional(node, scope, check, &infer_names),
        }
    }

    /// The branch `source` selects, or `None` when that cannot be decided
    fn choose_branch(
        &self,
        source: TypeId,
        node: &swc_ast::TsConditionalType,
        scope: &Scope,
        infer_names: &[String],
    ) -> Option<TypeId> {
        let mut inferred = IndexMap::new();
        match self.match_extends(source, &node.extends_type, scope, &mut inferred)? {
            true => {
                let bindings = infer_names.iter().map(|name| {
                    let ty = inferred
                        .get(name)
                        .copied()
                        .unwrap_or(self.intrinsics.unknown);
                    (name.clone(), ty)
                });
                Some(self.type_from_node(&node.true_type, &scope.extend(bindings)))
            }
            false => Some(self.type_from_node(&node.false_type, scope)),
        }
    }

    fn deferred_conditional(
        &self,
        node: &swc_ast::TsConditionalType,
        scope: &Scope,
        check: TypeId,
        infer_names: &[String],
    ) -> TypeId {
        let extends = self.type_from_node(&node.extends_type, scope);
        let resolved = match self.data(check) {
            TypeData::TypeParameter(param) => param
                .constraint
                .filter(|c| !self.is_generic(*c))
                .and_then(|c| self.choose_branch(c, node, scope, infer_names)),
            _ => None,
        };
        self.alloc(TypeData::Conditional(ConditionalType {
            check,
            extends,
            text: self.node_text(scope.file, node.span),
            resolved,
        }))
    }

    /// Match `source` against an extends clause, binding `infer` names
    fn match_extends(
        &self,
        source: TypeId,
        target: &swc_ast::TsType,
        scope: &Scope,
        inferred: &mut IndexMap<String, TypeId>,
    ) -> Option<bool> {
        use swc_ast::TsType as T;

        let _guard = self.enter()?;
        if !contains_infer(target) {
            let target = self.type_from_node(target, scope);
            return self.is_assignable(source, target);
        }

        match target {
            T::TsInferType(infer) => {
                if let Some(constraint) = &infer.type_param.constraint {
                    let constraint = self.type_from_node(constraint, scope);
                    if self.is_assignable(source, constraint) == Some(false) {
                        return Some(false);
                    }
                }
                let name = infer.type_param.name.sym.to_string();
                let bound = match inferred.get(&name) {
                    Some(existing) => self.union(vec![*existing, source]),
                    None => source,
                };
                inferred.insert(name, bound);
                Some(true)
            }
            T::TsParenthesizedType(paren) => self.match_extends(source, &paren.type_ann, scope, inferred),
            T::TsTypeOperator(op) if op.op == swc_ast::TsTypeOperatorOp::ReadOnly => {
                self.match_extends(source, &op.type_ann, scope, inferred)
            }
            T::TsTypeRef(reference) => self.match_reference(source, reference, scope, inferred),
            T::TsArrayType(array) => {
                let element = match self.array_element_type(source) {
                    Some(element) => element,
                    None => match self.tuple_elements(source) {
                        Some(elements) => self.union(elements.iter().map(|e| e.ty).collect()),
                        None => return self.mismatch(source),
                    },
                };
                self.match_extends(element, &array.elem_type, scope, inferred)
            }
            T::TsTupleType(tuple) => self.match_tuple(source, tuple, scope, inferred),
            T::TsFnOrConstructorType(swc_ast::TsFnOrConstructorType::TsFnType(f)) => {
                let signatures = self.call_signatures(source);
                let Some(signature) = signatures.last() else {
                    return self.mismatch(source);
                };
                self.match_signature(signature, &f.params, &f.type_ann.type_ann, scope, inferred)
            }
            T::TsFnOrConstructorType(swc_ast::TsFnOrConstructorType::TsConstructorType(c)) => {
                let signatures = self.construct_signatures(source);
                let Some(signature) = signatures.last() else {
                    return self.mismatch(source);
                };
                self.match_signature(signature, &c.params, &c.type_ann.type_ann, scope, inferred)
            }
            T::TsTypeLit(literal) => {
                let members = self.resolved_members(source);
                let mut results = Vec::new();
                for member in &literal.members {
                    let swc_ast::TsTypeElement::TsPropertySignature(p) = member else {
                        continue;
                    };
                    let (Some(name), Some(ann)) = (
                        crate::source::key_expr_name(&p.key, p.computed),
                        p.type_ann.as_ref(),
                    ) else {
                        continue;
                    };
                    match members.property(&name) {
                        Some(property) => {
                            results.push(self.match_extends(property.ty, &ann.type_ann, scope, inferred))
                        }
                        None if p.optional => {}
                        None => return Some(false),
                    }
                }
                all_of(results)
            }
            T::TsUnionOrIntersectionType(swc_ast::TsUnionOrIntersectionType::TsUnionType(u)) => {
                let mut unknown = false;
                for member in &u.types {
                    let mut trial = inferred.clone();
                    match self.match_extends(source, member, scope, &mut trial) {
                        Some(true) => {
                            *inferred = trial;
                            return Some(true);
                        }
                        None => unknown = true,
                        Some(false) => {}
                    }
                }
                if unknown {
                    None
                } else {
                    Some(false)
                }
            }
            T::TsUnionOrIntersectionType(swc_ast::TsUnionOrIntersectionType::TsIntersectionType(x)) => {
                let results: Vec<_> = x
                    .types
                    .iter()
                    .map(|member| self.match_extends(source, member, scope, inferred))
                    .collect();
                all_of(results)
            }
            _ => None,
        }
    }

    /// A structural mismatch, unless the source is still generic
    fn mismatch(&self, source: TypeId) -> Option<bool> {
        if self.is_generic(source) {
            None
        } else {
            Some(false)
        }
    }

    fn match_reference(
        &self,
        source: TypeId,
        reference: &swc_ast::TsTypeRef,
        scope: &Scope,
        inferred: &mut IndexMap<String, TypeId>,
    ) -> Option<bool> {
        let name = entity_name(&reference.type_name);
        let EntityTarget::Symbol(symbol) = self.resolve_entity(&name, scope.container)? else {
            return None;
        };
        if !self
            .symbol(symbol)
            .flags
            .intersects(SymbolFlags::CLASS | SymbolFlags::INTERFACE)
        {
            return None;
        }
        let argument_nodes: Vec<&swc_ast::TsType> = reference
            .type_params
            .iter()
            .flat_map(|p| p.params.iter().map(|t| &**t))
            .collect();

        if source == self.intrinsics.any {
            for node in argument_nodes {
                let mut names = Vec::new();
                collect_infer_names(node, &mut names);
                for name in names {
                    inferred.entry(name).or_insert(self.intrinsics.any);
                }
            }
            return Some(true);
        }

        let Some(base) = self.find_base_reference(source, symbol) else {
            return self.mismatch(source);
        };
        let arguments = self.type_arguments(base);
        let results: Vec<_> = argument_nodes
            .iter()
            .zip(arguments)
            .map(|(node, argument)| self.match_extends(argument, node, scope, inferred))
            .collect();
        all_of(results)
    }

    fn match_tuple(
        &self,
        source: TypeId,
        tuple: &swc_ast::TsTupleType,
        scope: &Scope,
        inferred: &mut IndexMap<String, TypeId>,
    ) -> Option<bool> {
        let Some(elements) = self.tuple_elements(source) else {
            return self.mismatch(source);
        };
        let mut results = Vec::new();
        for (index, target) in tuple.elem_types.iter().enumerate() {
            if let swc_ast::TsType::TsRestType(rest) = &*target.ty {
                let remaining: Vec<TupleElement> = elements.iter().skip(index).cloned().collect();
                let rest_tuple = self.tuple_type(remaining, false);
                results.push(self.match_extends(rest_tuple, &rest.type_ann, scope, inferred));
                return all_of(results);
            }
            let Some(element) = elements.get(index) else {
                return Some(false);
            };
            let node = match &*target.ty {
                swc_ast::TsType::TsOptionalType(o) => &*o.type_ann,
                other => other,
            };
            results.push(self.match_extends(element.ty, node, scope, inferred));
        }
        if elements.len() > tuple.elem_types.len() {
            return Some(false);
        }
        all_of(results)
    }

    fn match_signature(
        &self,
        signature: &Signature,
        params: &[swc_ast::TsFnParam],
        return_node: &swc_ast::TsType,
        scope: &Scope,
        inferred: &mut IndexMap<String, TypeId>,
    ) -> Option<bool> {
        let mut results = Vec::new();

        if let [swc_ast::TsFnParam::Rest(rest)] = params {
            if let Some(ann) = rest.type_ann.as_deref().filter(|a| contains_infer(&a.type_ann)) {
                let elements = signature
                    .parameters
                    .iter()
                    .map(|p| TupleElement {
                        ty: p.ty,
                        optional: p.optional,
                        rest: p.rest,
                        label: Some(p.name.clone()),
                    })
                    .collect();
                let tuple = self.tuple_type(elements, false);
                results.push(self.match_extends(tuple, &ann.type_ann, scope, inferred));
            }
        } else {
            for (index, param) in params.iter().enumerate() {
                let Some(ann) = fn_param_annotation(param).filter(|a| contains_infer(a)) else {
                    continue;
                };
                let ty = signature
                    .parameters
                    .get(index)
                    .map(|p| p.ty)
                    .unwrap_or(self.intrinsics.unknown);
                results.push(self.match_extends(ty, ann, scope, inferred));
            }
        }

        if contains_infer(return_node) {
            results.push(self.match_extends(signature.return_type, return_node, scope, inferred));
        }
        all_of(results)
    }

    /// The instantiation of `target` that `ty` is or inherits from
    pub fn find_base_reference(&self, ty: TypeId, target: SymbolId) -> Option<TypeId> {
        let _guard = self.enter()?;
        match self.data(ty) {
            TypeData::Object(ObjectType {
                symbol: Some(symbol),
                shape: ObjectShape::Declared,
                type_arguments,
                ..
            }) => {
                if symbol == target {
                    return Some(ty);
                }
                if Some(target) == self.global_symbol("ReadonlyArray")
                    && Some(symbol) == self.global_symbol("Array")
                {
                    return type_arguments
                        .first()
                        .map(|element| self.readonly_array_type(*element));
                }
                self.base_types(ty)
                    .iter()
                    .find_map(|base| self.find_base_reference(*base, target))
            }
            TypeData::Object(ObjectType {
                shape: ObjectShape::Tuple(elements),
                ..
            }) => {
                let element = self.union(elements.iter().map(|e| e.ty).collect());
                if Some(target) == self.global_symbol("Array") {
                    Some(self.array_type(element))
                } else if Some(target) == self.global_symbol("ReadonlyArray") {
                    Some(self.readonly_array_type(element))
                } else {
                    None
                }
            }
            TypeData::Intersection(parts) => parts
                .iter()
                .find_map(|part| self.find_base_reference(*part, target)),
            TypeData::TypeParameter(param) => param
                .constraint
                .and_then(|c| self.find_base_reference(c, target)),
            TypeData::Conditional(conditional) => conditional
                .resolved
                .and_then(|r| self.find_base_reference(r, target)),
            _ => None,
        }
    }

    /// Whether `source` is assignable to `target`; `None` when undecidable
    pub fn is_assignable(&self, source: TypeId, target: TypeId) -> Option<bool> {
        if source == target {
            return Some(true);
        }
        let key = (source, target);
        if let Some(cached) = self.relations.borrow().get(&key) {
            return *cached;
        }
        // Assume success while the relation is being computed
        self.relations.borrow_mut().insert(key, Some(true));
        let result = match self.enter() {
            Some(_guard) => self.compute_assignable(source, target),
            None => None,
        };
        self.relations.borrow_mut().insert(key, result);
        result
    }

    fn compute_assignable(&self, source: TypeId, target: TypeId) -> Option<bool> {
        use IntrinsicKind as K;

        let s = self.data(source);
        let t = self.data(target);

        if matches!(t, TypeData::Intrinsic(K::Any | K::Unknown)) {
            return Some(true);
        }
        if matches!(s, TypeData::Intrinsic(K::Any | K::Never)) {
            return Some(true);
        }

        if let TypeData::Union(parts) = &s {
            return all_of(parts.iter().map(|p| self.is_assignable(*p, target)).collect::<Vec<_>>());
        }
        if let TypeData::Union(parts) = &t {
            return any_of(parts.iter().map(|p| self.is_assignable(source, *p)).collect::<Vec<_>>());
        }
        if let TypeData::Intersection(parts) = &t {
            return all_of(parts.iter().map(|p| self.is_assignable(source, *p)).collect::<Vec<_>>());
        }

        if let TypeData::TypeParameter(param) = &s {
            return match param.constraint {
                Some(c) if self.is_assignable(c, target) == Some(true) => Some(true),
                _ => None,
            };
        }
        if self.is_generic(source) || self.is_generic(target) {
            return None;
        }
        if let TypeData::Intersection(parts) = &s {
            if parts.iter().any(|p| self.is_assignable(*p, target) == Some(true)) {
                return Some(true);
            }
        }

        match &t {
            TypeData::Intrinsic(kind) => Some(match kind {
                K::String => matches!(
                    s,
                    TypeData::Intrinsic(K::String) | TypeData::StringLiteral(_) | TypeData::TemplateLiteral(_)
                ) || matches!(&s, TypeData::EnumLiteral { value: EnumValue::String(_), .. }),
                K::Number => matches!(
                    s,
                    TypeData::Intrinsic(K::Number) | TypeData::NumberLiteral(_) | TypeData::Enum(_)
                ) || matches!(&s, TypeData::EnumLiteral { value: EnumValue::Number(_), .. }),
                K::Boolean => matches!(s, TypeData::Intrinsic(K::Boolean) | TypeData::BooleanLiteral(_)),
                K::BigInt => matches!(s, TypeData::Intrinsic(K::BigInt) | TypeData::BigIntLiteral(_)),
                K::Symbol => matches!(s, TypeData::Intrinsic(K::Symbol | K::UniqueSymbol)),
                K::Void => matches!(s, TypeData::Intrinsic(K::Void | K::Undefined)),
                K::Object => matches!(s, TypeData::Object(_)),
                K::Undefined | K::Null | K::Never | K::UniqueSymbol | K::This => false,
                K::Any | K::Unknown => true,
            }),
            TypeData::StringLiteral(_)
            | TypeData::NumberLiteral(_)
            | TypeData::BooleanLiteral(_)
            | TypeData::BigIntLiteral(_) => Some(false),
            TypeData::TemplateLiteral(_) => match s {
                TypeData::StringLiteral(_) | TypeData::Intrinsic(K::String) => None,
                _ => Some(false),
            },
            TypeData::EnumLiteral { .. } => Some(false),
            TypeData::Enum(symbol) => Some(match &s {
                TypeData::EnumLiteral { enum_symbol, .. } => enum_symbol == symbol,
                TypeData::Enum(other) => other == symbol,
                _ => false,
            }),
            TypeData::Object(_) => match &s {
                TypeData::Intrinsic(K::Null | K::Undefined | K::Void) => Some(false),
                TypeData::Object(_) | TypeData::Intersection(_) => self.structurally_assignable(source, target),
                TypeData::Unresolved(_) => None,
                _ => Some(self.resolved_members(target).is_empty()),
            },
            TypeData::Unresolved(_) => None,
            _ => None,
        }
    }

    fn structurally_assignable(&self, source: TypeId, target: TypeId) -> Option<bool> {
        if let TypeData::Object(ObjectType {
            symbol: Some(symbol),
            shape: ObjectShape::Declared,
            type_arguments,
            ..
        }) = self.data(target)
        {
            if let Some(base) = self.find_base_reference(source, symbol) {
                let base_arguments = self.type_arguments(base);
                return all_of(
                    base_arguments
                        .iter()
                        .zip(type_arguments.iter())
                        .map(|(s, t)| self.is_assignable(*s, *t))
                        .collect::<Vec<_>>(),
                );
            }
        }

        let target_members = self.resolved_members(target);
        let source_members = self.resolved_members(source);
        let mut results = Vec::new();

        for property in &target_members.properties {
            match source_members.property(&property.name) {
                Some(found) => results.push(self.is_assignable(found.ty, property.ty)),
                None if property.optional => {}
                None => return Some(false),
            }
        }

        let returns_match = |source_sigs: &[std::rc::Rc<Signature>], target_sigs: &[std::rc::Rc<Signature>]| {
            if target_sigs.is_empty() {
                return Some(true);
            }
            let (Some(s), Some(t)) = (source_sigs.first(), target_sigs.first()) else {
                return Some(false);
            };
            if t.return_type == self.intrinsics.void {
                return Some(true);
            }
            self.is_assignable(s.return_type, t.return_type)
        };
        results.push(returns_match(
            &source_members.call_signatures,
            &target_members.call_signatures,
        ));
        results.push(returns_match(
            &source_members.construct_signatures,
            &target_members.construct_signatures,
        ));

        if let Some(index) = &target_members.string_index {
            for property in &source_members.properties {
                results.push(self.is_assignable(property.ty, index.value));
            }
        }
        all_of(results)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_distributive_utilities() {
        let checker = checker_for(
            r#"
            type Letters = "a" | "b" | "c";
            export type Ex = Exclude<Letters, "a">;
            export type In = Extract<Letters, "a" | "c" | "z">;
            export type NN = NonNullable<string | null | undefined>;
            export type None = Exclude<"a", "a">;
            "#,
        );
        assert_eq!(expanded(&checker, "Ex"), "\"b\" | \"c\"");
        assert_eq!(expanded(&checker, "In"), "\"a\" | \"c\"");
        assert_eq!(declared(&checker, "NN"), "string");
        assert_eq!(declared(&checker, "None"), "never");
    }

    #[test]
    fn test_infer_utilities() {
        let checker = checker_for(
            r#"
            interface User { id: string }
            declare function fetchUser(id: string, force?: boolean): Promise<User>;
            declare class Service { constructor(url: string); }
            export type R = ReturnType<typeof fetchUser>;
            export type P = Parameters<typeof fetchUser>;
            export type A = Awaited<ReturnType<typeof fetchUser>>;
            export type I = InstanceType<typeof Service>;
            export type C = ConstructorParameters<typeof Service>;
            export type Head<T> = T extends [infer H, ...infer _] ? H : never;
            export type H = Head<[number, string]>;
            export type Elem<T> = T extends (infer E)[] ? E : T;
            export type E = Elem<boolean[]>;
            "#,
        );
        assert_eq!(declared(&checker, "R"), "Promise<User>");
        assert_eq!(expanded(&checker, "P"), "[id: string, force?: boolean]");
        assert_eq!(declared(&checker, "A"), "User");
        assert_eq!(declared(&checker, "I"), "Service");
        assert_eq!(expanded(&checker, "C"), "[url: string]");
        assert_eq!(declared(&checker, "H"), "number");
        assert_eq!(declared(&checker, "E"), "boolean");
    }

    #[test]
    fn test_deferred_conditional_uses_constraint() {
        let checker = checker_for(
            r#"
            export type IsString<T extends string> = T extends string ? "yes" : "no";
            export type Free<T> = T extends string ? "yes" : "no";
            export type AnyCase = Free<any>;
            "#,
        );
        let is_string = checker.declared_type_of_symbol(export(&checker, "IsString"));
        let resolved = checker.conditional_resolved(is_string).unwrap();
        assert_eq!(checker.type_to_string(resolved), "\"yes\"");

        let free = checker.declared_type_of_symbol(export(&checker, "Free"));
        assert_eq!(checker.conditional_resolved(free), None);
        assert_eq!(
            checker.type_to_string_expanded(free),
            "T extends string ? \"yes\" : \"no\""
        );
        assert_eq!(expanded(&checker, "AnyCase"), "\"yes\" | \"no\"");
    }

    #[test]
    fn test_assignability() {
        let checker = checker_for(
            r#"
            interface Animal { name: string }
            interface Dog extends Animal { bark(): void }
            interface Named { name: string; nickname?: string }
            export type A = Animal;
            export type D = Dog;
            export type N = Named;
            "#,
        );
        let animal = checker.declared_type_of_symbol(export(&checker, "A"));
        let dog = checker.declared_type_of_symbol(export(&checker, "D"));
        let named = checker.declared_type_of_symbol(export(&checker, "N"));
        let i = checker.intrinsics();

        assert_eq!(checker.is_assignable(dog, animal), Some(true));
        assert_eq!(checker.is_assignable(animal, dog), Some(false));
        assert_eq!(checker.is_assignable(dog, named), Some(true));
        assert_eq!(checker.is_assignable(checker.string_literal("x"), i.string), Some(true));
        assert_eq!(checker.is_assignable(i.string, checker.string_literal("x")), Some(false));
        assert_eq!(checker.is_assignable(i.null, animal), Some(false));
        assert_eq!(checker.is_assignable(i.never, animal), Some(true));
    }
}
