//! Member resolution
//!
//! Computes the properties, signatures and index infos of object types:
//! declared classes and interfaces with inheritance, type literals,
//! mapped types, tuples, unions, intersections and symbol value sides.

use super::Checker;
use crate::binder::{DeclKind, SymbolFlags, SymbolId};
use crate::program::FileId;
use crate::source::{expr_to_name, format_number, key_expr_name, prop_name_str};
use crate::types::{
    Accessibility, EnumValue, IndexInfo, IntrinsicKind, MappedModifier, MappedModifiers,
    MemberDecl, ObjectFlags, ObjectShape, ObjectType, Property, PropertyKind, ResolvedMembers,
    Scope, Signature, TupleElement, TypeData, TypeId,
};
use deno_ast::swc::ast as swc_ast;
use indexmap::IndexMap;
use std::rc::Rc;

/// Accumulates members in declaration order; same-named methods become
/// one property with several signatures
#[derive(Default)]
struct MemberBuilder {
    properties: IndexMap<String, Property>,
    methods: IndexMap<String, MethodSignatures>,
    call_signatures: Vec<Rc<Signature>>,
    construct_signatures: Vec<Rc<Signature>>,
    string_index: Option<IndexInfo>,
    number_index: Option<IndexInfo>,
}

#[derive(Default)]
struct MethodSignatures {
    overloads: Vec<Rc<Signature>>,
    implementations: Vec<Rc<Signature>>,
}

impl MemberBuilder {
    fn add_property(&mut self, property: Property) {
        self.properties
            .entry(property.name.clone())
            .or_insert(property);
    }

    fn add_method(&mut self, property: Property, signature: Signature, has_body: bool) {
        let entry = self.methods.entry(property.name.clone()).or_default();
        if has_body {
            entry.implementations.push(Rc::new(signature));
        } else {
            entry.overloads.push(Rc::new(signature));
        }
        self.properties
            .entry(property.name.clone())
            .or_insert(property);
    }

    fn add_getter(&mut self, mut property: Property) {
        match self.properties.get_mut(&property.name) {
            Some(existing) if existing.kind == PropertyKind::SetAccessor => {
                existing.kind = PropertyKind::Accessor;
                existing.ty = property.ty;
                existing.readonly = false;
            }
            Some(_) => {}
            None => {
                property.kind = PropertyKind::GetAccessor;
                property.readonly = true;
                self.add_property(property);
            }
        }
    }

    fn add_setter(&mut self, mut property: Property) {
        match self.properties.get_mut(&property.name) {
            Some(existing) if existing.kind == PropertyKind::GetAccessor => {
                existing.kind = PropertyKind::Accessor;
                existing.readonly = false;
            }
            Some(_) => {}
            None => {
                property.kind = PropertyKind::SetAccessor;
                self.add_property(property);
            }
        }
    }

    fn finish(mut self, checker: &Checker) -> ResolvedMembers {
        for (name, signatures) in std::mem::take(&mut self.methods) {
            let chosen = if signatures.overloads.is_empty() {
                signatures.implementations
            } else {
                signatures.overloads
            };
            let ty = checker.anonymous_object(ResolvedMembers {
                call_signatures: chosen,
                ..Default::default()
            });
            if let Some(property) = self.properties.get_mut(&name) {
                property.ty = ty;
            }
        }
        ResolvedMembers {
            properties: self.properties.into_values().collect(),
            call_signatures: self.call_signatures,
            construct_signatures: self.construct_signatures,
            string_index: self.string_index,
            number_index: self.number_index,
        }
    }
}

fn member_decl(file: FileId, span: deno_ast::swc::common::Span) -> MemberDecl {
    MemberDecl {
        file,
        span,
        doc_span: span,
    }
}

fn accessibility(value: Option<swc_ast::Accessibility>) -> Accessibility {
    match value {
        Some(swc_ast::Accessibility::Private) => Accessibility::Private,
        Some(swc_ast::Accessibility::Protected) => Accessibility::Protected,
        Some(swc_ast::Accessibility::Public) | None => Accessibility::Public,
    }
}

impl Checker {
    /// All members of a type, inherited ones included
    pub fn resolved_members(&self, ty: TypeId) -> Rc<ResolvedMembers> {
        if let Some(cached) = self.members.borrow().get(&ty) {
            return cached.clone();
        }
        if !self.resolving_members.borrow_mut().insert(ty) {
            return Rc::new(ResolvedMembers::default());
        }

        let members = match self.enter() {
            Some(_guard) => Rc::new(self.compute_members(ty)),
            None => Rc::new(ResolvedMembers::default()),
        };

        self.resolving_members.borrow_mut().remove(&ty);
        self.members.borrow_mut().insert(ty, members.clone());
        members
    }

    fn compute_members(&self, ty: TypeId) -> ResolvedMembers {
        match self.data(ty) {
            TypeData::Object(object) => match &object.shape {
                ObjectShape::Declared => self.declared_members(ty, &object),
                ObjectShape::Literal { node, scope } => {
                    let mut builder = MemberBuilder::default();
                    self.collect_type_elements(&node.members, scope, None, &mut builder);
                    builder.finish(self)
                }
                ObjectShape::Mapped {
                    node,
                    scope,
                    constraint,
                } => self.mapped_members(node, scope, *constraint),
                ObjectShape::Tuple(elements) => self.tuple_members(elements, object.flags),
                ObjectShape::Members(members) => (**members).clone(),
                ObjectShape::SymbolValue => match object.symbol {
                    Some(symbol) => self.symbol_value_members(symbol),
                    None => ResolvedMembers::default(),
                },
            },
            TypeData::Union(parts) => self.union_members(&parts),
            TypeData::Intersection(parts) => self.intersection_members(&parts),
            TypeData::TypeParameter(param) => match param.constraint {
                Some(constraint) => (*self.resolved_members(constraint)).clone(),
                None => ResolvedMembers::default(),
            },
            TypeData::Conditional(conditional) => match conditional.resolved {
                Some(resolved) => (*self.resolved_members(resolved)).clone(),
                None => ResolvedMembers::default(),
            },
            _ => ResolvedMembers::default(),
        }
    }

    /// Bindings for a class or interface instantiation: its type
    /// parameters mapped to the arguments, plus `this`
    fn instance_scope(&self, decl_scope: Scope, ty: TypeId, object: &ObjectType) -> Scope {
        let Some(symbol) = object.symbol else {
            return decl_scope;
        };
        let params = self.type_parameters_of(symbol);
        let names: Vec<String> = params
            .iter()
            .map(|p| match self.data(*p) {
                TypeData::TypeParameter(param) => param.name,
                _ => String::new(),
            })
            .collect();
        decl_scope
            .extend(names.into_iter().zip(object.type_arguments.iter().copied()))
            .with("this", ty)
    }

    fn declared_members(&self, ty: TypeId, object: &ObjectType) -> ResolvedMembers {
        let Some(symbol) = object.symbol else {
            return ResolvedMembers::default();
        };
        let mut builder = MemberBuilder::default();

        for decl in &self.symbol(symbol).declarations {
            let scope = self.instance_scope(self.declaration_scope(decl), ty, object);
            match &decl.kind {
                DeclKind::Interface(iface) => {
                    self.collect_type_elements(&iface.body.body, &scope, Some(symbol), &mut builder);
                }
                DeclKind::Class(class) => {
                    self.collect_class_members(class, &scope, Some(symbol), false, &mut builder);
                }
                _ => {}
            }
        }

        let mut members = builder.finish(self);
        for base in self.base_types(ty).iter() {
            let inherited = self.resolved_members(*base);
            self.inherit(&mut members, &inherited);
        }
        members
    }

    /// Add members of a base that the derived type does not redeclare
    fn inherit(&self, members: &mut ResolvedMembers, base: &ResolvedMembers) {
        for property in &base.properties {
            if property.name.starts_with('#') || members.property(&property.name).is_some() {
                continue;
            }
            members.properties.push(property.clone());
        }
        if members.call_signatures.is_empty() {
            members.call_signatures = base.call_signatures.clone();
        }
        if members.construct_signatures.is_empty() {
            members.construct_signatures = base.construct_signatures.clone();
        }
        if members.string_index.is_none() {
            members.string_index = base.string_index.clone();
        }
        if members.number_index.is_none() {
            members.number_index = base.number_index.clone();
        }
    }

    /// Direct base types of a class or interface instantiation
    pub fn base_types(&self, ty: TypeId) -> Rc<Vec<TypeId>> {
        if let Some(cached) = self.base_types.borrow().get(&ty) {
            return cached.clone();
        }
        // Seed the cache so `interface A extends A` terminates
        self.base_types
            .borrow_mut()
            .insert(ty, Rc::new(Vec::new()));

        let mut bases = Vec::new();
        if let TypeData::Object(object) = self.data(ty) {
            if let (ObjectShape::Declared, Some(symbol)) = (&object.shape, object.symbol) {
                for decl in &self.symbol(symbol).declarations {
                    let scope = self.instance_scope(self.declaration_scope(decl), ty, &object);
                    match &decl.kind {
                        DeclKind::Interface(iface) => {
                            for heritage in &iface.extends {
                                if let Some(base) = self.heritage_type(&heritage.expr, heritage.type_args.as_deref(), &scope) {
                                    bases.push(base);
                                }
                            }
                        }
                        DeclKind::Class(class) => {
                            if let Some(super_class) = &class.super_class {
                                if let Some(base) = self.heritage_type(super_class, class.super_type_params.as_deref(), &scope) {
                                    bases.push(base);
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
        bases.retain(|b| *b != ty);

        let bases = Rc::new(bases);
        self.base_types.borrow_mut().insert(ty, bases.clone());
        bases
    }

    /// Type named in an `extends` or `implements` clause
    pub(crate) fn heritage_type(
        &self,
        expr: &swc_ast::Expr,
        type_args: Option<&swc_ast::TsTypeParamInstantiation>,
        scope: &Scope,
    ) -> Option<TypeId> {
        let name = expr_to_name(expr)?;
        let target = match self.resolve_entity(&name, scope.container)? {
            super::symbols::EntityTarget::Symbol(symbol) => symbol,
            super::symbols::EntityTarget::EnumMember(..) => return None,
        };
        let flags = self.symbol(target).flags;
        if !flags.intersects(SymbolFlags::CLASS | SymbolFlags::INTERFACE | SymbolFlags::TYPE_ALIAS) {
            return None;
        }
        let arguments = type_args
            .map(|args| {
                args.params
                    .iter()
                    .map(|t| self.type_from_node(t, scope))
                    .collect()
            })
            .unwrap_or_default();
        Some(self.type_from_symbol(target, arguments, &name))
    }

    fn collect_type_elements(
        &self,
        elements: &[swc_ast::TsTypeElement],
        scope: &Scope,
        origin: Option<SymbolId>,
        builder: &mut MemberBuilder,
    ) {
        use swc_ast::TsTypeElement as E;

        let file = scope.file;
        for element in elements {
            match element {
                E::TsPropertySignature(p) => {
                    let Some(name) = key_expr_name(&p.key, p.computed) else {
                        continue;
                    };
                    let ty = match &p.type_ann {
                        Some(ann) => self.type_from_node(&ann.type_ann, scope),
                        None => self.intrinsics.any,
                    };
                    let mut property = Property::new(name, ty);
                    property.optional = p.optional;
                    property.readonly = p.readonly;
                    property.origin = origin;
                    property.declaration = Some(member_decl(file, p.span));
                    builder.add_property(property);
                }
                E::TsMethodSignature(m) => {
                    let Some(name) = key_expr_name(&m.key, m.computed) else {
                        continue;
                    };
                    let declaration = member_decl(file, m.span);
                    let signature = self.signature_from_ts_params(
                        &m.params,
                        m.type_params.as_deref(),
                        m.type_ann.as_deref(),
                        scope,
                        Some(declaration),
                    );
                    let mut property = Property::new(name, self.intrinsics.any);
                    property.kind = PropertyKind::Method;
                    property.optional = m.optional;
                    property.origin = origin;
                    property.declaration = Some(declaration);
                    builder.add_method(property, signature, true);
                }
                E::TsGetterSignature(g) => {
                    let Some(name) = key_expr_name(&g.key, g.computed) else {
                        continue;
                    };
                    let ty = match &g.type_ann {
                        Some(ann) => self.type_from_node(&ann.type_ann, scope),
                        None => self.intrinsics.any,
                    };
                    let mut property = Property::new(name, ty);
                    property.origin = origin;
                    property.declaration = Some(member_decl(file, g.span));
                    builder.add_getter(property);
                }
                E::TsSetterSignature(s) => {
                    let Some(name) = key_expr_name(&s.key, s.computed) else {
                        continue;
                    };
                    let ty = self.parameter_from_ts_fn_param(&s.param, 0, scope).ty;
                    let mut property = Property::new(name, ty);
                    property.origin = origin;
                    property.declaration = Some(member_decl(file, s.span));
                    builder.add_setter(property);
                }
                E::TsCallSignatureDecl(c) => {
                    let signature = self.signature_from_ts_params(
                        &c.params,
                        c.type_params.as_deref(),
                        c.type_ann.as_deref(),
                        scope,
                        Some(member_decl(file, c.span)),
                    );
                    builder.call_signatures.push(Rc::new(signature));
                }
                E::TsConstructSignatureDecl(c) => {
                    let signature = self.signature_from_ts_params(
                        &c.params,
                        c.type_params.as_deref(),
                        c.type_ann.as_deref(),
                        scope,
                        Some(member_decl(file, c.span)),
                    );
                    builder.construct_signatures.push(Rc::new(signature));
                }
                E::TsIndexSignature(index) => self.add_index_signature(index, scope, builder),
            }
        }
    }

    fn add_index_signature(
        &self,
        index: &swc_ast::TsIndexSignature,
        scope: &Scope,
        builder: &mut MemberBuilder,
    ) {
        let Some(swc_ast::TsFnParam::Ident(param)) = index.params.first() else {
            return;
        };
        let key = match &param.type_ann {
            Some(ann) => self.type_from_node(&ann.type_ann, scope),
            None => self.intrinsics.string,
        };
        let value = match &index.type_ann {
            Some(ann) => self.type_from_node(&ann.type_ann, scope),
            None => self.intrinsics.any,
        };
        let info = IndexInfo {
            parameter: param.id.sym.to_string(),
            key,
            value,
            readonly: index.readonly,
            declaration: Some(member_decl(scope.file, index.span)),
        };
        if key == self.intrinsics.number {
            builder.number_index.get_or_insert(info);
        } else {
            builder.string_index.get_or_insert(info);
        }
    }

    fn collect_class_members(
        &self,
        class: &swc_ast::Class,
        scope: &Scope,
        origin: Option<SymbolId>,
        want_static: bool,
        builder: &mut MemberBuilder,
    ) {
        use swc_ast::ClassMember as M;

        let file = scope.file;
        for member in &class.body {
            match member {
                M::Constructor(ctor) if !want_static => {
                    for param in &ctor.params {
                        let swc_ast::ParamOrTsParamProp::TsParamProp(prop) = param else {
                            continue;
                        };
                        let pat = match &prop.param {
                            swc_ast::TsParamPropParam::Ident(binding) => swc_ast::Pat::Ident(binding.clone()),
                            swc_ast::TsParamPropParam::Assign(assign) => swc_ast::Pat::Assign(assign.clone()),
                        };
                        let parameter = self.parameter_from_pat(&pat, 0, scope);
                        let mut property = Property::new(parameter.name, parameter.ty);
                        property.optional = parameter.optional && parameter.default_text.is_none();
                        property.readonly = prop.readonly;
                        property.accessibility = accessibility(prop.accessibility);
                        property.origin = origin;
                        property.declaration = Some(member_decl(file, prop.span));
                        builder.add_property(property);
                    }
                }
                M::Method(method) if method.is_static == want_static => {
                    let Some(name) = prop_name_str(&method.key) else {
                        continue;
                    };
                    self.add_class_function(
                        builder,
                        name,
                        &method.function,
                        method.kind,
                        accessibility(method.accessibility),
                        method.is_abstract,
                        method.is_optional,
                        member_decl(file, method.span),
                        scope,
                        origin,
                        want_static,
                    );
                }
                M::PrivateMethod(method) if method.is_static == want_static => {
                    self.add_class_function(
                        builder,
                        format!("#{}", method.key.name),
                        &method.function,
                        method.kind,
                        Accessibility::Private,
                        method.is_abstract,
                        method.is_optional,
                        member_decl(file, method.span),
                        scope,
                        origin,
                        want_static,
                    );
                }
                M::ClassProp(prop) if prop.is_static == want_static => {
                    let Some(name) = prop_name_str(&prop.key) else {
                        continue;
                    };
                    let ty = self.class_property_type(prop.type_ann.as_deref(), prop.value.as_deref(), prop.readonly, scope);
                    let mut property = Property::new(name, ty);
                    property.optional = prop.is_optional;
                    property.readonly = prop.readonly;
                    property.accessibility = accessibility(prop.accessibility);
                    property.is_abstract = prop.is_abstract;
                    property.is_static = want_static;
                    property.origin = origin;
                    property.declaration = Some(member_decl(file, prop.span));
                    builder.add_property(property);
                }
                M::PrivateProp(prop) if prop.is_static == want_static => {
                    let ty = self.class_property_type(prop.type_ann.as_deref(), prop.value.as_deref(), prop.readonly, scope);
                    let mut property = Property::new(format!("#{}", prop.key.name), ty);
                    property.optional = prop.is_optional;
                    property.readonly = prop.readonly;
                    property.accessibility = Accessibility::Private;
                    property.is_static = want_static;
                    property.origin = origin;
                    property.declaration = Some(member_decl(file, prop.span));
                    builder.add_property(property);
                }
                M::TsIndexSignature(index) if index.is_static == want_static => {
                    self.add_index_signature(index, scope, builder);
                }
                _ => {}
            }
        }
    }

    fn class_property_type(
        &self,
        annotation: Option<&swc_ast::TsTypeAnn>,
        value: Option<&swc_ast::Expr>,
        readonly: bool,
        scope: &Scope,
    ) -> TypeId {
        match (annotation, value) {
            (Some(ann), _) => self.type_from_node(&ann.type_ann, scope),
            (None, Some(value)) => self.infer_expression(value, scope, !readonly),
            (None, None) => self.intrinsics.any,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn add_class_function(
        &self,
        builder: &mut MemberBuilder,
        name: String,
        function: &swc_ast::Function,
        kind: swc_ast::MethodKind,
        access: Accessibility,
        is_abstract: bool,
        is_optional: bool,
        declaration: MemberDecl,
        scope: &Scope,
        origin: Option<SymbolId>,
        is_static: bool,
    ) {
        let mut property = Property::new(name, self.intrinsics.any);
        property.accessibility = access;
        property.is_abstract = is_abstract;
        property.optional = is_optional;
        property.is_static = is_static;
        property.origin = origin;
        property.declaration = Some(declaration);

        match kind {
            swc_ast::MethodKind::Method => {
                let signature = self.signature_from_function(function, scope, Some(declaration));
                property.kind = PropertyKind::Method;
                builder.add_method(property, signature, function.body.is_some());
            }
            swc_ast::MethodKind::Getter => {
                property.ty = self.signature_from_function(function, scope, None).return_type;
                builder.add_getter(property);
            }
            swc_ast::MethodKind::Setter => {
                property.ty = function
                    .params
                    .first()
                    .map(|p| self.parameter_from_pat(&p.pat, 0, scope).ty)
                    .unwrap_or(self.intrinsics.any);
                builder.add_setter(property);
            }
        }
    }

    /// Members of the value side of a class, function, enum or namespace
    fn symbol_value_members(&self, symbol: SymbolId) -> ResolvedMembers {
        let sym = self.symbol(symbol);
        let mut members = ResolvedMembers::default();

        if sym.flags.contains(SymbolFlags::CLASS) {
            members = self.class_static_members(symbol);
        }

        if sym.flags.contains(SymbolFlags::FUNCTION) {
            members.call_signatures = self.function_signatures(symbol);
        }

        if sym.flags.contains(SymbolFlags::ENUM) {
            for member in self.enum_members(symbol).iter() {
                let mut property = Property::new(
                    member.name.clone(),
                    self.enum_literal_type(symbol, &member.name),
                );
                property.readonly = true;
                property.origin = Some(symbol);
                property.declaration = Some(member.declaration);
                members.properties.push(property);
            }
        }

        if sym.flags.intersects(SymbolFlags::NAMESPACE | SymbolFlags::MODULE) {
            for (name, id) in self.namespace_exports(symbol).iter() {
                let Some(target) = self.resolve_alias(*id) else {
                    continue;
                };
                let flags = self.symbol(target).flags;
                if !flags.intersects(SymbolFlags::VALUE | SymbolFlags::NAMESPACE | SymbolFlags::MODULE) {
                    continue;
                }
                if members.property(name).is_some() {
                    continue;
                }
                let mut property = Property::new(name.clone(), self.type_of_symbol(target));
                property.readonly = !flags.contains(SymbolFlags::VARIABLE) || flags.contains(SymbolFlags::CONST);
                property.origin = Some(symbol);
                members.properties.push(property);
            }
        }
        members
    }

    /// Call signatures of a function symbol; overloads hide the implementation
    pub(crate) fn function_signatures(&self, symbol: SymbolId) -> Vec<Rc<Signature>> {
        let sym = self.symbol(symbol);
        let functions: Vec<_> = sym
            .declarations
            .iter()
            .filter_map(|d| match &d.kind {
                DeclKind::Function(f) => Some((d, f)),
                _ => None,
            })
            .collect();
        let has_overloads = functions.iter().any(|(_, f)| f.body.is_none());
        functions
            .into_iter()
            .filter(|(_, f)| !has_overloads || f.body.is_none())
            .map(|(decl, f)| {
                let declaration = MemberDecl {
                    file: decl.file,
                    span: decl.span,
                    doc_span: decl.doc_span,
                };
                Rc::new(self.signature_from_function(f, &self.declaration_scope(decl), Some(declaration)))
            })
            .collect()
    }

    fn class_static_members(&self, symbol: SymbolId) -> ResolvedMembers {
        let sym = self.symbol(symbol);
        let instance = self.declared_type_of_symbol(symbol);
        let type_parameters = self.type_parameters_of(symbol).to_vec();
        let mut builder = MemberBuilder::default();
        let mut base_class: Option<TypeId> = None;

        for decl in &sym.declarations {
            let DeclKind::Class(class) = &decl.kind else {
                continue;
            };
            let scope = self.class_scope(symbol, decl, &type_parameters);
            self.collect_class_members(class, &scope, Some(symbol), true, &mut builder);

            if let Some(super_class) = &class.super_class {
                if let Some(name) = expr_to_name(super_class) {
                    if let Some(super::symbols::EntityTarget::Symbol(base)) =
                        self.resolve_entity(&name, decl.container)
                    {
                        base_class = Some(self.type_of_symbol(base));
                    }
                }
            }
        }

        let mut members = builder.finish(self);
        members.construct_signatures = self
            .constructor_signatures(symbol, &type_parameters, instance)
            .into_iter()
            .map(|sig| {
                Rc::new(Signature {
                    type_parameters: type_parameters.clone(),
                    ..sig
                })
            })
            .collect();
        if members.construct_signatures.is_empty() {
            members.construct_signatures.push(Rc::new(Signature {
                type_parameters,
                parameters: Vec::new(),
                return_type: instance,
                has_return_annotation: false,
                is_async: false,
                declaration: None,
            }));
        }

        if let Some(base) = base_class {
            let inherited = self.resolved_members(base);
            for property in &inherited.properties {
                if property.name != "prototype" && members.property(&property.name).is_none() {
                    members.properties.push(property.clone());
                }
            }
        }

        let mut prototype = Property::new("prototype", instance);
        prototype.readonly = true;
        prototype.is_static = true;
        members.properties.push(prototype);
        members
    }

    fn class_scope(&self, symbol: SymbolId, decl: &crate::binder::Declaration, arguments: &[TypeId]) -> Scope {
        let params = self.type_parameters_of(symbol);
        let names: Vec<String> = params
            .iter()
            .map(|p| match self.data(*p) {
                TypeData::TypeParameter(param) => param.name,
                _ => String::new(),
            })
            .collect();
        self.declaration_scope(decl)
            .extend(names.into_iter().zip(arguments.iter().copied()))
    }

    /// Constructor signatures of a class instantiated with `arguments`,
    /// taken from the nearest class in the chain that declares one
    fn constructor_signatures(
        &self,
        symbol: SymbolId,
        arguments: &[TypeId],
        return_type: TypeId,
    ) -> Vec<Signature> {
        let Some(_guard) = self.enter() else {
            return Vec::new();
        };
        let sym = self.symbol(symbol);
        let mut constructors: Vec<(Signature, bool)> = Vec::new();
        let mut base: Option<TypeId> = None;

        for decl in &sym.declarations {
            let DeclKind::Class(class) = &decl.kind else {
                continue;
            };
            let scope = self.class_scope(symbol, decl, arguments);
            for member in &class.body {
                if let swc_ast::ClassMember::Constructor(ctor) = member {
                    let signature = self.signature_from_constructor(
                        ctor,
                        &scope,
                        Vec::new(),
                        return_type,
                        Some(member_decl(decl.file, ctor.span)),
                    );
                    constructors.push((signature, ctor.body.is_some()));
                }
            }
            if let Some(super_class) = &class.super_class {
                base = self.heritage_type(super_class, class.super_type_params.as_deref(), &scope);
            }
        }

        if constructors.is_empty() {
            let Some(TypeData::Object(base)) = base.map(|b| self.data(b)) else {
                return Vec::new();
            };
            return match base.symbol {
                Some(base_symbol) if base_symbol != symbol => {
                    self.constructor_signatures(base_symbol, &base.type_arguments, return_type)
                }
                _ => Vec::new(),
            };
        }

        let has_overloads = constructors.iter().any(|(_, has_body)| !has_body);
        constructors
            .into_iter()
            .filter(|(_, has_body)| !has_overloads || !has_body)
            .map(|(sig, _)| sig)
            .collect()
    }

    fn tuple_members(&self, elements: &[TupleElement], flags: ObjectFlags) -> ResolvedMembers {
        let readonly = flags.contains(ObjectFlags::READONLY);
        let mut members = ResolvedMembers::default();
        let mut element_types = Vec::new();
        let mut fixed_length = true;

        for (index, element) in elements.iter().enumerate() {
            if element.rest {
                fixed_length = false;
                element_types.push(self.array_element_type(element.ty).unwrap_or(element.ty));
                continue;
            }
            if element.optional {
                fixed_length = false;
            }
            element_types.push(element.ty);
            let mut property = Property::new(index.to_string(), element.ty);
            property.optional = element.optional;
            property.readonly = readonly;
            members.properties.push(property);
        }

        let length = if fixed_length {
            self.number_literal(elements.len() as f64)
        } else {
            self.intrinsics.number
        };
        let mut length_property = Property::new("length", length);
        length_property.readonly = readonly;
        members.properties.push(length_property);

        members.number_index = Some(IndexInfo {
            parameter: "n".to_string(),
            key: self.intrinsics.number,
            value: self.union(element_types),
            readonly,
            declaration: None,
        });
        members
    }

    /// Properties present in every member of a union
    fn union_members(&self, parts: &[TypeId]) -> ResolvedMembers {
        let resolved: Vec<Rc<ResolvedMembers>> =
            parts.iter().map(|p| self.resolved_members(*p)).collect();
        let Some((first, rest)) = resolved.split_first() else {
            return ResolvedMembers::default();
        };

        let mut members = ResolvedMembers::default();
        for property in &first.properties {
            let mut types = vec![property.ty];
            let mut optional = property.optional;
            let mut readonly = property.readonly;
            let mut everywhere = true;
            for other in rest {
                match other.property(&property.name) {
                    Some(p) => {
                        types.push(p.ty);
                        optional |= p.optional;
                        readonly |= p.readonly;
                    }
                    None => {
                        everywhere = false;
                        break;
                    }
                }
            }
            if everywhere {
                let mut merged = property.clone();
                merged.ty = self.union(types);
                merged.optional = optional;
                merged.readonly = readonly;
                members.properties.push(merged);
            }
        }
        members
    }

    /// Properties of every member of an intersection, merged by name
    fn intersection_members(&self, parts: &[TypeId]) -> ResolvedMembers {
        let mut members = ResolvedMembers::default();
        for part in parts {
            let resolved = self.resolved_members(*part);
            for property in &resolved.properties {
                match members.properties.iter_mut().find(|p| p.name == property.name) {
                    Some(existing) => {
                        existing.ty = self.intersection(vec![existing.ty, property.ty]);
                        existing.optional &= property.optional;
                        existing.readonly &= property.readonly;
                    }
                    None => members.properties.push(property.clone()),
                }
            }
            members
                .call_signatures
                .extend(resolved.call_signatures.iter().cloned());
            members
                .construct_signatures
                .extend(resolved.construct_signatures.iter().cloned());
            if members.string_index.is_none() {
                members.string_index = resolved.string_index.clone();
            }
            if members.number_index.is_none() {
                members.number_index = resolved.number_index.clone();
            }
        }
        members
    }

    /// Homomorphic source of a mapped type: `X` in `{ [P in keyof X]: X[P] }`
    fn mapped_source(&self, node: &swc_ast::TsMappedType, scope: &Scope) -> Option<(TypeId, bool)> {
        let param = node.type_param.name.sym.as_ref();
        if let Some(swc_ast::TsType::TsIndexedAccessType(access)) = node.type_ann.as_deref() {
            if let swc_ast::TsType::TsTypeRef(index) = &*access.index_type {
                if matches!(&index.type_name, swc_ast::TsEntityName::Ident(i) if i.sym.as_ref() == param) {
                    return Some((self.type_from_node(&access.obj_type, scope), true));
                }
            }
        }
        if let Some(swc_ast::TsType::TsTypeOperator(op)) = node.type_param.constraint.as_deref() {
            if op.op == swc_ast::TsTypeOperatorOp::KeyOf {
                return Some((self.type_from_node(&op.type_ann, scope), false));
            }
        }
        None
    }

    fn mapped_members(
        &self,
        node: &swc_ast::TsMappedType,
        scope: &Scope,
        constraint: TypeId,
    ) -> ResolvedMembers {
        let mut members = ResolvedMembers::default();
        if self.is_generic(constraint) {
            return members;
        }

        let param = node.type_param.name.sym.to_string();
        let readonly_modifier = MappedModifier::from_swc(node.readonly);
        let optional_modifier = MappedModifier::from_swc(node.optional);
        let source = self.mapped_source(node, scope);
        let source_members = source.map(|(ty, _)| self.resolved_members(ty));
        let template_is_source_access = source.map(|(_, direct)| direct).unwrap_or(false);

        let keys = match self.data(constraint) {
            TypeData::Union(parts) => parts,
            _ => vec![constraint],
        };

        let template = |key: TypeId| -> TypeId {
            match node.type_ann.as_deref() {
                Some(t) => self.type_from_node(t, &scope.with(param.clone(), key)),
                None => self.intrinsics.any,
            }
        };

        for key in keys {
            let name = match self.data(key) {
                TypeData::StringLiteral(s) => s,
                TypeData::NumberLiteral(n) => format_number(n),
                TypeData::EnumLiteral { value, .. } => match value {
                    EnumValue::String(s) => s,
                    EnumValue::Number(n) => format_number(n),
                    EnumValue::Computed(_) => continue,
                },
                TypeData::Intrinsic(IntrinsicKind::String) | TypeData::Intrinsic(IntrinsicKind::Any) => {
                    members.string_index = Some(IndexInfo {
                        parameter: param.clone(),
                        key: self.intrinsics.string,
                        value: template(key),
                        readonly: readonly_modifier == Some(MappedModifier::Add),
                        declaration: None,
                    });
                    continue;
                }
                TypeData::Intrinsic(IntrinsicKind::Number) => {
                    members.number_index = Some(IndexInfo {
                        parameter: param.clone(),
                        key: self.intrinsics.number,
                        value: template(key),
                        readonly: readonly_modifier == Some(MappedModifier::Add),
                        declaration: None,
                    });
                    continue;
                }
                _ => continue,
            };

            let inner = scope.with(param.clone(), key);
            let final_name = match node.name_type.as_deref() {
                Some(name_type) => {
                    let renamed = self.type_from_node(name_type, &inner);
                    match self.data(renamed) {
                        TypeData::StringLiteral(s) => s,
                        TypeData::NumberLiteral(n) => format_number(n),
                        _ => continue,
                    }
                }
                None => name.clone(),
            };

            let source_property = source_members
                .as_ref()
                .and_then(|m| m.property(&name).cloned());
            let ty = match (&source_property, template_is_source_access) {
                (Some(p), true) => p.ty,
                _ => template(key),
            };

            let mut property = Property::new(final_name, ty);
            property.optional = match optional_modifier {
                Some(MappedModifier::Add) => true,
                Some(MappedModifier::Remove) => false,
                None => source_property.as_ref().map(|p| p.optional).unwrap_or(false),
            };
            property.readonly = match readonly_modifier {
                Some(MappedModifier::Add) => true,
                Some(MappedModifier::Remove) => false,
                None => source_property.as_ref().map(|p| p.readonly).unwrap_or(false),
            };
            if let Some(source_property) = &source_property {
                property.origin = source_property.origin;
                property.declaration = source_property.declaration;
            }
            members.properties.push(property);
        }
        members
    }

    pub fn call_signatures(&self, ty: TypeId) -> Vec<Rc<Signature>> {
        self.resolved_members(ty).call_signatures.clone()
    }

    pub fn construct_signatures(&self, ty: TypeId) -> Vec<Rc<Signature>> {
        self.resolved_members(ty).construct_signatures.clone()
    }

    pub fn string_index_info(&self, ty: TypeId) -> Option<IndexInfo> {
        self.resolved_members(ty).string_index.clone()
    }

    pub fn number_index_info(&self, ty: TypeId) -> Option<IndexInfo> {
        self.resolved_members(ty).number_index.clone()
    }

    /// Type arguments of a generic instantiation
    pub fn type_arguments(&self, ty: TypeId) -> Vec<TypeId> {
        match self.data(ty) {
            TypeData::Object(object) => object.type_arguments,
            _ => Vec::new(),
        }
    }

    /// Type whose members a property access sees: primitives and their
    /// literals go through the lib interface (`string` to `String`)
    pub fn apparent_type(&self, ty: TypeId) -> TypeId {
        let interface = match self.data(ty) {
            TypeData::Intrinsic(IntrinsicKind::String)
            | TypeData::StringLiteral(_)
            | TypeData::TemplateLiteral(_) => "String",
            TypeData::Intrinsic(IntrinsicKind::Number) | TypeData::NumberLiteral(_) => "Number",
            TypeData::Intrinsic(IntrinsicKind::Boolean) | TypeData::BooleanLiteral(_) => "Boolean",
            TypeData::Intrinsic(IntrinsicKind::BigInt) | TypeData::BigIntLiteral(_) => "BigInt",
            TypeData::Intrinsic(IntrinsicKind::Symbol | IntrinsicKind::UniqueSymbol) => "Symbol",
            TypeData::EnumLiteral { value: EnumValue::String(_), .. } => "String",
            TypeData::EnumLiteral { value: EnumValue::Number(_), .. } => "Number",
            _ => return ty,
        };
        match self.global_symbol(interface) {
            Some(symbol) => self.type_reference(symbol, Vec::new()),
            None => ty,
        }
    }

    /// Element type of `T[]`, `Array<T>` or `readonly T[]`
    pub fn array_element_type(&self, ty: TypeId) -> Option<TypeId> {
        let TypeData::Object(object) = self.data(ty) else {
            return None;
        };
        let symbol = object.symbol?;
        let is_array = [self.global_symbol("Array"), self.global_symbol("ReadonlyArray")]
            .contains(&Some(symbol));
        if is_array && matches!(object.shape, ObjectShape::Declared) {
            object.type_arguments.first().copied()
        } else {
            None
        }
    }

    pub fn tuple_elements(&self, ty: TypeId) -> Option<Vec<TupleElement>> {
        match self.data(ty) {
            TypeData::Object(ObjectType {
                shape: ObjectShape::Tuple(elements),
                ..
            }) => Some(elements),
            _ => None,
        }
    }

    /// Symbol behind a class, interface, enum or value type
    pub fn symbol_of_type(&self, ty: TypeId) -> Option<SymbolId> {
        match self.data(ty) {
            TypeData::Object(object) => object.symbol,
            TypeData::Enum(symbol) => Some(symbol),
            TypeData::EnumLiteral { enum_symbol, .. } => Some(enum_symbol),
            _ => None,
        }
    }

    pub fn is_mapped(&self, ty: TypeId) -> bool {
        matches!(
            self.data(ty),
            TypeData::Object(ObjectType {
                shape: ObjectShape::Mapped { .. },
                ..
            })
        )
    }

    /// Modifiers written on a mapped type
    pub fn mapped_modifiers(&self, ty: TypeId) -> Option<MappedModifiers> {
        match self.data(ty) {
            TypeData::Object(ObjectType {
                shape: ObjectShape::Mapped { node, .. },
                ..
            }) => Some(MappedModifiers {
                readonly: MappedModifier::from_swc(node.readonly),
                optional: MappedModifier::from_swc(node.optional),
            }),
            _ => None,
        }
    }

    /// Branch a deferred conditional takes under its check type's constraint
    pub fn conditional_resolved(&self, ty: TypeId) -> Option<TypeId> {
        match self.data(ty) {
            TypeData::Conditional(conditional) => conditional.resolved,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use pretty_assertions::assert_eq;

    fn property_names(checker: &Checker, ty: TypeId) -> Vec<String> {
        checker
            .resolved_members(ty)
            .properties
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }

    #[test]
    fn test_interface_inheritance_and_overrides() {
        let checker = checker_for(
            r#"
            interface Animal { name: string; sound(): string; readonly legs: number }
            interface Pet { owner?: string }
            export interface Dog extends Animal, Pet { breed: string; legs: 4 }
            "#,
        );
        let dog = checker.declared_type_of_symbol(export(&checker, "Dog"));
        assert_eq!(
            property_names(&checker, dog),
            vec!["breed", "legs", "name", "sound", "owner"]
        );
        let members = checker.resolved_members(dog);
        let legs = members.property("legs").unwrap();
        assert!(!legs.readonly);
        assert_eq!(checker.type_to_string(legs.ty), "4");
        let sound = members.property("sound").unwrap();
        assert_eq!(sound.kind, PropertyKind::Method);
        assert_eq!(checker.symbol(sound.origin.unwrap()).name, "Animal");
    }

    #[test]
    fn test_generic_interface_substitution() {
        let checker = checker_for(
            r#"
            interface Box<T> { value: T; map<U>(fn: (value: T) => U): Box<U> }
            export type StringBox = Box<string>;
            "#,
        );
        let ty = checker.declared_type_of_symbol(export(&checker, "StringBox"));
        let members = checker.resolved_members(ty);
        assert_eq!(checker.type_to_string(members.property("value").unwrap().ty), "string");
        assert_eq!(
            checker.type_to_string(members.property("map").unwrap().ty),
            "<U>(fn: (value: string) => U) => Box<U>"
        );
    }

    #[test]
    fn test_class_members() {
        let checker = checker_for(
            r#"
            export class Account {
                static count = 0;
                #secret = "x";
                private token: string;
                protected readonly id: number;
                constructor(public owner: string, id: number) { this.id = id; this.token = ""; }
                get balance(): number { return 0; }
                set balance(value: number) {}
                get label(): string { return ""; }
                deposit(amount: number): void;
                deposit(amount: string): void;
                deposit(amount: any): void {}
            }
            "#,
        );
        let account = checker.declared_type_of_symbol(export(&checker, "Account"));
        let members = checker.resolved_members(account);
        assert_eq!(
            property_names(&checker, account),
            vec!["#secret", "token", "id", "owner", "balance", "label", "deposit"]
        );
        assert_eq!(members.property("token").unwrap().accessibility, Accessibility::Private);
        assert_eq!(members.property("#secret").unwrap().accessibility, Accessibility::Private);
        assert_eq!(members.property("balance").unwrap().kind, PropertyKind::Accessor);
        assert!(members.property("label").unwrap().readonly);
        let deposit = members.property("deposit").unwrap();
        assert_eq!(checker.call_signatures(deposit.ty).len(), 2);

        let statics = checker.type_of_symbol(export(&checker, "Account"));
        let static_members = checker.resolved_members(statics);
        assert!(static_members.property("count").is_some());
        assert!(static_members.property("prototype").is_some());
        let ctor = &static_members.construct_signatures[0];
        assert_eq!(ctor.parameters.len(), 2);
        assert_eq!(checker.type_to_string(ctor.return_type), "Account");
    }

    #[test]
    fn test_class_inheritance() {
        let checker = checker_for(
            r#"
            class Base<T> { value!: T; describe(): string { return ""; } constructor(v: T) {} }
            export class Derived extends Base<number> { describe(): string { return "d"; } extra = true; }
            "#,
        );
        let derived = checker.declared_type_of_symbol(export(&checker, "Derived"));
        assert_eq!(property_names(&checker, derived), vec!["describe", "extra", "value"]);
        let members = checker.resolved_members(derived);
        assert_eq!(checker.type_to_string(members.property("value").unwrap().ty), "number");
        assert_eq!(checker.type_to_string(members.property("extra").unwrap().ty), "boolean");

        let statics = checker.type_of_symbol(export(&checker, "Derived"));
        let ctor = &checker.construct_signatures(statics)[0];
        assert_eq!(checker.type_to_string(ctor.parameters[0].ty), "number");
        assert_eq!(checker.type_to_string(ctor.return_type), "Derived");
    }

    #[test]
    fn test_mapped_utility_types() {
        let checker = checker_for(
            r#"
            interface User { id: string; name: string; email?: string; readonly created: number }
            export type P = Partial<User>;
            export type R = Required<User>;
            export type RO = Readonly<User>;
            export type K = Pick<User, "id" | "name">;
            export type O = Omit<User, "email">;
            export type Rec = Record<"a" | "b", number>;
            export type Dict = Record<string, User>;
            "#,
        );
        let p = checker.declared_type_of_symbol(export(&checker, "P"));
        let members = checker.resolved_members(p);
        assert_eq!(members.properties.len(), 4);
        assert!(members.properties.iter().all(|p| p.optional));
        assert_eq!(checker.type_to_string(members.property("email").unwrap().ty), "string");

        let r = checker.declared_type_of_symbol(export(&checker, "R"));
        assert!(checker.resolved_members(r).properties.iter().all(|p| !p.optional));

        let ro = checker.declared_type_of_symbol(export(&checker, "RO"));
        assert!(checker.resolved_members(ro).properties.iter().all(|p| p.readonly));

        let k = checker.declared_type_of_symbol(export(&checker, "K"));
        assert_eq!(property_names(&checker, k), vec!["id", "name"]);

        let o = checker.declared_type_of_symbol(export(&checker, "O"));
        assert_eq!(property_names(&checker, o), vec!["id", "name", "created"]);
        assert!(checker.resolved_members(o).property("created").unwrap().readonly);

        let rec = checker.declared_type_of_symbol(export(&checker, "Rec"));
        assert_eq!(property_names(&checker, rec), vec!["a", "b"]);

        let dict = checker.declared_type_of_symbol(export(&checker, "Dict"));
        let index = checker.string_index_info(dict).unwrap();
        assert_eq!(checker.type_to_string(index.value), "User");
        assert_eq!(
            checker.mapped_modifiers(p),
            Some(MappedModifiers {
                readonly: None,
                optional: Some(MappedModifier::Add)
            })
        );
    }

    #[test]
    fn test_union_and_intersection_members() {
        let checker = checker_for(
            r#"
            interface A { kind: "a"; shared: string; onlyA: number }
            interface B { kind: "b"; shared: string }
            export type U = A | B;
            export type I = A & { extra: boolean };
            "#,
        );
        let u = checker.declared_type_of_symbol(export(&checker, "U"));
        assert_eq!(property_names(&checker, u), vec!["kind", "shared"]);
        let kind = checker.resolved_members(u).property("kind").unwrap().ty;
        assert_eq!(checker.type_to_string(kind), "\"a\" | \"b\"");

        let i = checker.declared_type_of_symbol(export(&checker, "I"));
        assert_eq!(property_names(&checker, i), vec!["kind", "shared", "onlyA", "extra"]);
    }

    #[test]
    fn test_self_extending_interface_terminates() {
        let checker = checker_for("export interface Loop extends Loop { a: string }");
        let ty = checker.declared_type_of_symbol(export(&checker, "Loop"));
        assert_eq!(property_names(&checker, ty), vec!["a"]);
    }

    #[test]
    fn test_array_members_come_from_lib() {
        let checker = checker_for("export type L = string[];");
        let ty = checker.declared_type_of_symbol(export(&checker, "L"));
        assert_eq!(
            checker.array_element_type(ty),
            Some(checker.intrinsics().string)
        );
        let members = checker.resolved_members(ty);
        assert!(members.property("length").is_some());
        assert!(members.property("map").is_some());
        assert_eq!(
            checker.type_to_string(members.number_index.as_ref().unwrap().value),
            "string"
        );
    }
}
