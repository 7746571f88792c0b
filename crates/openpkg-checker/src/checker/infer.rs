//! Types of expressions, function bodies and enum members

use super::Checker;
use crate::binder::{DeclKind, SymbolFlags, SymbolId};
use crate::source::{format_number, prop_name_str, wtf8_to_string};
use crate::types::{
    EnumMember, EnumValue, IntrinsicKind, MemberDecl, Parameter, Property, PropertyKind,
    ResolvedMembers, Scope, Signature, TupleElement, TypeData, TypeId,
};
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::Spanned;
use std::collections::HashMap;
use std::rc::Rc;

/// Types of locals visible inside a function body
#[derive(Debug, Clone, Default)]
struct LocalEnv {
    names: HashMap<String, TypeId>,
}

impl LocalEnv {
    fn from_parameters(parameters: &[Parameter]) -> Self {
        Self {
            names: parameters
                .iter()
                .map(|p| (p.name.clone(), p.ty))
                .collect(),
        }
    }
}

#[derive(Default)]
struct BodyTypes {
    returns: Vec<TypeId>,
    bare_return: bool,
    yields: Vec<TypeId>,
}

impl Checker {
    /// Type of an expression
    ///
    /// With `widen`, literal types become their primitive, as for a `let`
    /// binding or an inferred return type.
    pub fn infer_expression(&self, expr: &swc_ast::Expr, scope: &Scope, widen: bool) -> TypeId {
        let ty = self.infer(expr, scope, &LocalEnv::default());
        if widen {
            self.widen(ty)
        } else {
            ty
        }
    }

    /// Widened type of an arrow function's expression body
    pub(crate) fn infer_in_body(&self, expr: &swc_ast::Expr, scope: &Scope, parameters: &[Parameter]) -> TypeId {
        let env = LocalEnv::from_parameters(parameters);
        let ty = self.infer(expr, scope, &env);
        self.widen(ty)
    }

    /// Return type of a function body without an annotation
    pub(crate) fn infer_function_return(
        &self,
        stmts: &[swc_ast::Stmt],
        is_async: bool,
        is_generator: bool,
        scope: &Scope,
        parameters: &[Parameter],
    ) -> TypeId {
        let i = self.intrinsics;
        let mut env = LocalEnv::from_parameters(parameters);
        let mut body = BodyTypes::default();
        self.walk_statements(stmts, scope, &mut env, &mut body);

        let mut returned = body.returns;
        if body.bare_return && !returned.is_empty() {
            returned.push(i.undefined);
        }
        let value = if returned.is_empty() {
            i.void
        } else {
            self.union(returned)
        };

        if is_generator {
            let yielded = self.union(body.yields);
            let name = if is_async { "AsyncGenerator" } else { "Generator" };
            return self.global_type(name, vec![yielded, value, i.unknown]);
        }
        if is_async {
            return self.promise_type(self.awaited_type(value));
        }
        value
    }

    fn walk_statements(&self, stmts: &[swc_ast::Stmt], scope: &Scope, env: &mut LocalEnv, body: &mut BodyTypes) {
        for stmt in stmts {
            self.walk_statement(stmt, scope, env, body);
        }
    }

    fn walk_statement(&self, stmt: &swc_ast::Stmt, scope: &Scope, env: &mut LocalEnv, body: &mut BodyTypes) {
        use swc_ast::Stmt;

        match stmt {
            Stmt::Return(ret) => match &ret.arg {
                Some(arg) => {
                    self.collect_yields(arg, scope, env, body);
                    let ty = self.infer(arg, scope, env);
                    body.returns.push(self.widen(ty));
                }
                None => body.bare_return = true,
            },
            Stmt::Block(block) => self.walk_statements(&block.stmts, scope, env, body),
            Stmt::If(if_stmt) => {
                self.collect_yields(&if_stmt.test, scope, env, body);
                self.walk_statement(&if_stmt.cons, scope, env, body);
                if let Some(alt) = &if_stmt.alt {
                    self.walk_statement(alt, scope, env, body);
                }
            }
            Stmt::While(w) => self.walk_statement(&w.body, scope, env, body),
            Stmt::DoWhile(w) => self.walk_statement(&w.body, scope, env, body),
            Stmt::For(f) => {
                if let Some(swc_ast::VarDeclOrExpr::VarDecl(var)) = &f.init {
                    self.bind_variables(var, scope, env, body);
                }
                self.walk_statement(&f.body, scope, env, body);
            }
            Stmt::ForIn(f) => self.walk_statement(&f.body, scope, env, body),
            Stmt::ForOf(f) => self.walk_statement(&f.body, scope, env, body),
            Stmt::Labeled(l) => self.walk_statement(&l.body, scope, env, body),
            Stmt::Try(t) => {
                self.walk_statements(&t.block.stmts, scope, env, body);
                if let Some(handler) = &t.handler {
                    self.walk_statements(&handler.body.stmts, scope, env, body);
                }
                if let Some(finalizer) = &t.finalizer {
                    self.walk_statements(&finalizer.stmts, scope, env, body);
                }
            }
            Stmt::Switch(s) => {
                for case in &s.cases {
                    self.walk_statements(&case.cons, scope, env, body);
                }
            }
            Stmt::Decl(swc_ast::Decl::Var(var)) => self.bind_variables(var, scope, env, body),
            Stmt::Decl(swc_ast::Decl::Fn(f)) => {
                let signature = self.signature_from_function(&f.function, scope, None);
                env.names
                    .insert(f.ident.sym.to_string(), self.function_type(signature));
            }
            Stmt::Expr(e) => self.collect_yields(&e.expr, scope, env, body),
            _ => {}
        }
    }

    fn bind_variables(&self, var: &swc_ast::VarDecl, scope: &Scope, env: &mut LocalEnv, body: &mut BodyTypes) {
        for declarator in &var.decls {
            if let Some(init) = &declarator.init {
                self.collect_yields(init, scope, env, body);
            }
            let swc_ast::Pat::Ident(binding) = &declarator.name else {
                continue;
            };
            let ty = match (&binding.type_ann, &declarator.init) {
                (Some(ann), _) => self.type_from_node(&ann.type_ann, scope),
                (None, Some(init)) => {
                    let ty = self.infer(init, scope, env);
                    if var.kind == swc_ast::VarDeclKind::Const {
                        ty
                    } else {
                        self.widen(ty)
                    }
                }
                (None, None) => self.intrinsics.any,
            };
            env.names.insert(binding.id.sym.to_string(), ty);
        }
    }

    /// Record `yield` expressions reachable without entering a nested function
    fn collect_yields(&self, expr: &swc_ast::Expr, scope: &Scope, env: &LocalEnv, body: &mut BodyTypes) {
        use swc_ast::Expr;

        match expr {
            Expr::Yield(y) => {
                let Some(arg) = &y.arg else {
                    body.yields.push(self.intrinsics.undefined);
                    return;
                };
                self.collect_yields(arg, scope, env, body);
                let ty = self.infer(arg, scope, env);
                let yielded = if y.delegate {
                    self.iterated_type(ty)
                } else {
                    self.widen(ty)
                };
                body.yields.push(yielded);
            }
            Expr::Paren(p) => self.collect_yields(&p.expr, scope, env, body),
            Expr::Assign(a) => self.collect_yields(&a.right, scope, env, body),
            Expr::Await(a) => self.collect_yields(&a.arg, scope, env, body),
            Expr::Seq(s) => {
                for e in &s.exprs {
                    self.collect_yields(e, scope, env, body);
                }
            }
            Expr::Call(call) => {
                for arg in &call.args {
                    self.collect_yields(&arg.expr, scope, env, body);
                }
            }
            _ => {}
        }
    }

    /// Element type produced by iterating `ty`
    fn iterated_type(&self, ty: TypeId) -> TypeId {
        if let Some(element) = self.array_element_type(ty) {
            return element;
        }
        if let Some(elements) = self.tuple_elements(ty) {
            return self.union(elements.iter().map(|e| e.ty).collect());
        }
        for name in ["Generator", "AsyncGenerator", "Iterator", "AsyncIterator"] {
            if let Some(symbol) = self.global_symbol(name) {
                if let Some(base) = self.find_base_reference(ty, symbol) {
                    if let Some(first) = self.type_arguments(base).first() {
                        return *first;
                    }
                }
            }
        }
        self.intrinsics.any
    }

    /// Literal types replaced by their primitive
    pub fn widen(&self, ty: TypeId) -> TypeId {
        let i = self.intrinsics;
        match self.data(ty) {
            TypeData::StringLiteral(_) | TypeData::TemplateLiteral(_) => i.string,
            TypeData::NumberLiteral(_) => i.number,
            TypeData::BooleanLiteral(_) => i.boolean,
            TypeData::BigIntLiteral(_) => i.bigint,
            TypeData::Intrinsic(IntrinsicKind::UniqueSymbol) => i.symbol,
            TypeData::EnumLiteral { enum_symbol, .. } => self.declared_type_of_symbol(enum_symbol),
            TypeData::Union(parts) => {
                let widened = parts.iter().map(|p| self.widen(*p)).collect();
                self.union(widened)
            }
            _ => ty,
        }
    }

    /// Unwrap promises, recursively
    pub fn awaited_type(&self, ty: TypeId) -> TypeId {
        let Some(_guard) = self.enter() else {
            return ty;
        };
        if let TypeData::Union(parts) = self.data(ty) {
            let awaited = parts.iter().map(|p| self.awaited_type(*p)).collect();
            return self.union(awaited);
        }
        let promise_like = self.global_symbol("PromiseLike");
        let promise = self.global_symbol("Promise");
        for symbol in [promise, promise_like].into_iter().flatten() {
            if let Some(base) = self.find_base_reference(ty, symbol) {
                if let Some(inner) = self.type_arguments(base).first() {
                    return self.awaited_type(*inner);
                }
            }
        }
        ty
    }

    fn remove_nullish(&self, ty: TypeId) -> TypeId {
        let i = self.intrinsics;
        match self.data(ty) {
            TypeData::Union(parts) => self.union(
                parts
                    .into_iter()
                    .filter(|p| *p != i.null && *p != i.undefined)
                    .collect(),
            ),
            _ if ty == i.null || ty == i.undefined => i.never,
            _ => ty,
        }
    }

    fn infer(&self, expr: &swc_ast::Expr, scope: &Scope, env: &LocalEnv) -> TypeId {
        use swc_ast::Expr;

        let i = self.intrinsics;
        let Some(_guard) = self.enter() else {
            return i.any;
        };

        match expr {
            Expr::Lit(lit) => self.literal_type(lit),
            Expr::Tpl(tpl) => {
                if tpl.exprs.is_empty() {
                    let text = tpl
                        .quasis
                        .first()
                        .map(|q| q.raw.to_string())
                        .unwrap_or_default();
                    self.string_literal(&text)
                } else {
                    i.string
                }
            }
            Expr::Ident(ident) => self.identifier_type(&ident.sym, scope, env),
            Expr::Paren(p) => self.infer(&p.expr, scope, env),
            Expr::Array(array) => {
                let mut elements = Vec::new();
                for element in array.elems.iter().flatten() {
                    let ty = self.infer(&element.expr, scope, env);
                    if element.spread.is_some() {
                        elements.push(self.iterated_type(ty));
                    } else {
                        elements.push(self.widen(ty));
                    }
                }
                let element = if elements.is_empty() {
                    i.any
                } else {
                    self.union(elements)
                };
                self.array_type(element)
            }
            Expr::Object(object) => self.object_literal_type(object, scope, env, false),
            Expr::Fn(f) => {
                let signature = self.signature_from_function(&f.function, scope, None);
                self.function_type(signature)
            }
            Expr::Arrow(arrow) => {
                let signature = self.signature_from_arrow(arrow, scope);
                self.function_type(signature)
            }
            Expr::TsAs(as_expr) => self.type_from_node(&as_expr.type_ann, scope),
            Expr::TsTypeAssertion(assertion) => self.type_from_node(&assertion.type_ann, scope),
            Expr::TsSatisfies(satisfies) => self.infer(&satisfies.expr, scope, env),
            Expr::TsConstAssertion(assertion) => self.const_type(&assertion.expr, scope, env),
            Expr::TsNonNull(non_null) => {
                let ty = self.infer(&non_null.expr, scope, env);
                self.remove_nullish(ty)
            }
            Expr::TsInstantiation(inst) => self.infer(&inst.expr, scope, env),
            Expr::Member(member) => {
                let object = self.infer(&member.obj, scope, env);
                self.member_access_type(object, &member.prop, scope, env)
            }
            Expr::OptChain(chain) => {
                let ty = match &*chain.base {
                    swc_ast::OptChainBase::Member(member) => {
                        let object = self.infer(&member.obj, scope, env);
                        let object = self.remove_nullish(object);
                        self.member_access_type(object, &member.prop, scope, env)
                    }
                    swc_ast::OptChainBase::Call(call) => {
                        let callee = self.infer(&call.callee, scope, env);
                        let callee = self.remove_nullish(callee);
                        self.call_result(callee, call.type_args.as_deref(), &call.args, scope, env)
                    }
                };
                self.union(vec![ty, i.undefined])
            }
            Expr::Call(call) => match &call.callee {
                swc_ast::Callee::Expr(callee) => {
                    if let Expr::Ident(ident) = &**callee {
                        if &*ident.sym == "Symbol" && env.names.get("Symbol").is_none() {
                            return i.unique_symbol;
                        }
                    }
                    let callee_ty = self.infer(callee, scope, env);
                    self.call_result(callee_ty, call.type_args.as_deref(), &call.args, scope, env)
                }
                swc_ast::Callee::Super(_) => i.void,
                swc_ast::Callee::Import(_) => self.promise_type(i.any),
            },
            Expr::New(new) => self.new_expression_type(new, scope, env),
            Expr::TaggedTpl(tagged) => {
                let tag = self.infer(&tagged.tag, scope, env);
                self.call_result(tag, tagged.type_params.as_deref(), &[], scope, env)
            }
            Expr::Await(a) => {
                let ty = self.infer(&a.arg, scope, env);
                self.awaited_type(ty)
            }
            Expr::Unary(unary) => self.unary_type(unary, scope, env),
            Expr::Update(_) => i.number,
            Expr::Bin(bin) => self.binary_type(bin, scope, env),
            Expr::Cond(cond) => {
                let cons = self.infer(&cond.cons, scope, env);
                let alt = self.infer(&cond.alt, scope, env);
                self.union(vec![cons, alt])
            }
            Expr::Seq(seq) => match seq.exprs.last() {
                Some(last) => self.infer(last, scope, env),
                None => i.undefined,
            },
            Expr::Assign(assign) => self.infer(&assign.right, scope, env),
            Expr::This(_) => scope.lookup("this").unwrap_or(i.any),
            _ => i.any,
        }
    }

    fn literal_type(&self, lit: &swc_ast::Lit) -> TypeId {
        let i = self.intrinsics;
        match lit {
            swc_ast::Lit::Str(s) => self.string_literal(&wtf8_to_string(s)),
            swc_ast::Lit::Num(n) => self.number_literal(n.value),
            swc_ast::Lit::Bool(b) => self.boolean_literal(b.value),
            swc_ast::Lit::BigInt(b) => self.bigint_literal(&b.value.to_string()),
            swc_ast::Lit::Null(_) => i.null,
            swc_ast::Lit::Regex(_) => self.global_type("RegExp", Vec::new()),
            swc_ast::Lit::JSXText(_) => i.string,
        }
    }

    fn identifier_type(&self, name: &str, scope: &Scope, env: &LocalEnv) -> TypeId {
        let i = self.intrinsics;
        if let Some(ty) = env.names.get(name) {
            return *ty;
        }
        match name {
            "undefined" => return i.undefined,
            "NaN" | "Infinity" => return i.number,
            _ => {}
        }
        match self.lookup_name(name, scope.container) {
            Some(symbol) => self.type_of_symbol(symbol),
            None => i.any,
        }
    }

    fn object_literal_type(
        &self,
        object: &swc_ast::ObjectLit,
        scope: &Scope,
        env: &LocalEnv,
        as_const: bool,
    ) -> TypeId {
        let mut members = ResolvedMembers::default();
        let upsert = |members: &mut ResolvedMembers, property: Property| {
            match members.properties.iter_mut().find(|p| p.name == property.name) {
                Some(existing) => *existing = property,
                None => members.properties.push(property),
            }
        };

        for prop in &object.props {
            let prop = match prop {
                swc_ast::PropOrSpread::Spread(spread) => {
                    let ty = self.infer(&spread.expr, scope, env);
                    let spread_members = self.resolved_members(ty);
                    for property in &spread_members.properties {
                        upsert(&mut members, property.clone());
                    }
                    continue;
                }
                swc_ast::PropOrSpread::Prop(prop) => prop,
            };

            let property = match &**prop {
                swc_ast::Prop::KeyValue(kv) => {
                    let Some(name) = prop_name_str(&kv.key) else {
                        continue;
                    };
                    let ty = if as_const {
                        self.const_type(&kv.value, scope, env)
                    } else {
                        let ty = self.infer(&kv.value, scope, env);
                        self.widen(ty)
                    };
                    Property::new(name, ty)
                }
                swc_ast::Prop::Shorthand(ident) => {
                    let ty = self.identifier_type(&ident.sym, scope, env);
                    let ty = if as_const { ty } else { self.widen(ty) };
                    Property::new(ident.sym.to_string(), ty)
                }
                swc_ast::Prop::Method(method) => {
                    let Some(name) = prop_name_str(&method.key) else {
                        continue;
                    };
                    let signature = self.signature_from_function(&method.function, scope, None);
                    let mut property = Property::new(name, self.function_type(signature));
                    property.kind = PropertyKind::Method;
                    property
                }
                swc_ast::Prop::Getter(getter) => {
                    let Some(name) = prop_name_str(&getter.key) else {
                        continue;
                    };
                    let ty = match (&getter.type_ann, &getter.body) {
                        (Some(ann), _) => self.type_from_node(&ann.type_ann, scope),
                        (None, Some(body)) => self.infer_function_return(&body.stmts, false, false, scope, &[]),
                        (None, None) => self.intrinsics.any,
                    };
                    let mut property = Property::new(name, ty);
                    property.kind = PropertyKind::GetAccessor;
                    property.readonly = true;
                    property
                }
                swc_ast::Prop::Setter(setter) => {
                    let Some(name) = prop_name_str(&setter.key) else {
                        continue;
                    };
                    if let Some(existing) = members.properties.iter_mut().find(|p| p.name == name) {
                        if existing.kind == PropertyKind::GetAccessor {
                            existing.kind = PropertyKind::Accessor;
                            existing.readonly = false;
                        }
                        continue;
                    }
                    let parameter = self.parameter_from_pat(&setter.param, 0, scope);
                    let mut property = Property::new(name, parameter.ty);
                    property.kind = PropertyKind::SetAccessor;
                    property
                }
                swc_ast::Prop::Assign(_) => continue,
            };
            let mut property = property;
            if as_const && property.kind == PropertyKind::Property {
                property.readonly = true;
            }
            upsert(&mut members, property);
        }
        self.anonymous_object(members)
    }

    /// Type of an expression under `as const`
    fn const_type(&self, expr: &swc_ast::Expr, scope: &Scope, env: &LocalEnv) -> TypeId {
        match expr {
            swc_ast::Expr::Paren(p) => self.const_type(&p.expr, scope, env),
            swc_ast::Expr::Array(array) => {
                let elements = array
                    .elems
                    .iter()
                    .flatten()
                    .map(|element| {
                        let ty = self.const_type(&element.expr, scope, env);
                        TupleElement {
                            ty,
                            optional: false,
                            rest: element.spread.is_some(),
                            label: None,
                        }
                    })
                    .collect();
                self.tuple_type(elements, true)
            }
            swc_ast::Expr::Object(object) => self.object_literal_type(object, scope, env, true),
            other => self.infer(other, scope, env),
        }
    }

    fn member_access_type(
        &self,
        object: TypeId,
        prop: &swc_ast::MemberProp,
        scope: &Scope,
        env: &LocalEnv,
    ) -> TypeId {
        let i = self.intrinsics;
        if object == i.any {
            return i.any;
        }
        match prop {
            swc_ast::MemberProp::Ident(name) => {
                let members = self.resolved_members(self.apparent_type(object));
                match members.property(&name.sym) {
                    Some(property) => property.ty,
                    None => members
                        .string_index
                        .as_ref()
                        .map(|info| info.value)
                        .unwrap_or(i.any),
                }
            }
            swc_ast::MemberProp::Computed(computed) => {
                let index = self.infer(&computed.expr, scope, env);
                match self.data(index) {
                    TypeData::StringLiteral(_)
                    | TypeData::NumberLiteral(_)
                    | TypeData::Intrinsic(IntrinsicKind::String | IntrinsicKind::Number) => {
                        let ty = self.indexed_access_type(object, index);
                        match self.data(ty) {
                            TypeData::Unresolved(_) => i.any,
                            _ => ty,
                        }
                    }
                    _ => i.any,
                }
            }
            swc_ast::MemberProp::PrivateName(_) => i.any,
        }
    }

    fn call_result(
        &self,
        callee: TypeId,
        type_args: Option<&swc_ast::TsTypeParamInstantiation>,
        args: &[swc_ast::ExprOrSpread],
        scope: &Scope,
        env: &LocalEnv,
    ) -> TypeId {
        let signatures = self.call_signatures(callee);
        let Some(signature) = signatures.first() else {
            return self.intrinsics.any;
        };
        self.instantiate_return(signature, type_args, args, scope, env)
    }

    /// Return type with a directly returned type parameter replaced by an
    /// explicit type argument or the argument passed for it
    fn instantiate_return(
        &self,
        signature: &Signature,
        type_args: Option<&swc_ast::TsTypeParamInstantiation>,
        args: &[swc_ast::ExprOrSpread],
        scope: &Scope,
        env: &LocalEnv,
    ) -> TypeId {
        let return_type = signature.return_type;
        let Some(position) = signature.type_parameters.iter().position(|t| *t == return_type) else {
            return return_type;
        };
        if let Some(explicit) = type_args.and_then(|t| t.params.get(position)) {
            return self.type_from_node(explicit, scope);
        }
        for (index, parameter) in signature.parameters.iter().enumerate() {
            if parameter.ty != return_type || parameter.rest {
                continue;
            }
            if let Some(arg) = args.get(index) {
                let ty = self.infer(&arg.expr, scope, env);
                return self.widen(ty);
            }
        }
        match self.data(return_type) {
            TypeData::TypeParameter(param) => param.constraint.unwrap_or(self.intrinsics.unknown),
            _ => return_type,
        }
    }

    fn new_expression_type(&self, new: &swc_ast::NewExpr, scope: &Scope, env: &LocalEnv) -> TypeId {
        let i = self.intrinsics;
        let arguments: Vec<TypeId> = new
            .type_args
            .iter()
            .flat_map(|t| t.params.iter())
            .map(|t| self.type_from_node(t, scope))
            .collect();

        if let swc_ast::Expr::Ident(ident) = &*new.callee {
            if env.names.get(&*ident.sym).is_none() {
                let target = self
                    .lookup_name(&ident.sym, scope.container)
                    .and_then(|s| self.resolve_alias(s));
                if let Some(symbol) = target {
                    if self
                        .symbol(symbol)
                        .flags
                        .intersects(SymbolFlags::CLASS | SymbolFlags::INTERFACE)
                    {
                        return self.type_reference(symbol, arguments);
                    }
                }
            }
        }

        let callee = self.infer(&new.callee, scope, env);
        match self.construct_signatures(callee).first() {
            Some(signature) => signature.return_type,
            None => i.any,
        }
    }

    fn unary_type(&self, unary: &swc_ast::UnaryExpr, scope: &Scope, env: &LocalEnv) -> TypeId {
        use swc_ast::UnaryOp;

        let i = self.intrinsics;
        match unary.op {
            UnaryOp::Bang | UnaryOp::Delete => i.boolean,
            UnaryOp::TypeOf => i.string,
            UnaryOp::Void => i.undefined,
            UnaryOp::Minus | UnaryOp::Plus | UnaryOp::Tilde => {
                let operand = self.infer(&unary.arg, scope, env);
                match (unary.op, self.data(operand)) {
                    (UnaryOp::Minus, TypeData::NumberLiteral(n)) => self.number_literal(-n),
                    (UnaryOp::Plus, TypeData::NumberLiteral(_)) => operand,
                    (UnaryOp::Minus, TypeData::BigIntLiteral(b)) => self.bigint_literal(&format!("-{}", b)),
                    (_, TypeData::Intrinsic(IntrinsicKind::BigInt) | TypeData::BigIntLiteral(_))
                        if unary.op != UnaryOp::Plus =>
                    {
                        i.bigint
                    }
                    _ => i.number,
                }
            }
        }
    }

    fn binary_type(&self, bin: &swc_ast::BinExpr, scope: &Scope, env: &LocalEnv) -> TypeId {
        use swc_ast::BinaryOp as Op;

        let i = self.intrinsics;
        let left = self.infer(&bin.left, scope, env);
        let right = self.infer(&bin.right, scope, env);
        let is = |ty: TypeId, kind: TypeId| self.widen(ty) == kind;

        match bin.op {
            Op::Add => {
                if is(left, i.string) || is(right, i.string) {
                    i.string
                } else if is(left, i.number) && is(right, i.number) {
                    i.number
                } else if is(left, i.bigint) && is(right, i.bigint) {
                    i.bigint
                } else {
                    i.any
                }
            }
            Op::Sub
            | Op::Mul
            | Op::Div
            | Op::Mod
            | Op::Exp
            | Op::LShift
            | Op::RShift
            | Op::ZeroFillRShift
            | Op::BitAnd
            | Op::BitOr
            | Op::BitXor => {
                if is(left, i.bigint) && is(right, i.bigint) {
                    i.bigint
                } else {
                    i.number
                }
            }
            Op::EqEq
            | Op::NotEq
            | Op::EqEqEq
            | Op::NotEqEq
            | Op::Lt
            | Op::LtEq
            | Op::Gt
            | Op::GtEq
            | Op::In
            | Op::InstanceOf => i.boolean,
            Op::LogicalAnd => right,
            Op::LogicalOr | Op::NullishCoalescing => {
                let left = self.remove_nullish(left);
                self.union(vec![left, right])
            }
        }
    }

    // ---- enums ----

    /// Members of an enum with their evaluated values
    pub fn enum_members(&self, symbol: SymbolId) -> Rc<Vec<EnumMember>> {
        if let Some(cached) = self.enum_members.borrow().get(&symbol) {
            return cached.clone();
        }

        let mut members: Vec<EnumMember> = Vec::new();
        for decl in &self.symbol(symbol).declarations {
            let DeclKind::Enum(enum_decl) = &decl.kind else {
                continue;
            };
            let mut next: Option<f64> = Some(0.0);
            for member in &enum_decl.members {
                let name = match &member.id {
                    swc_ast::TsEnumMemberId::Ident(ident) => ident.sym.to_string(),
                    swc_ast::TsEnumMemberId::Str(s) => wtf8_to_string(s),
                };
                if members.iter().any(|m| m.name == name) {
                    continue;
                }
                let value = match &member.init {
                    Some(init) => self.evaluate_enum_initializer(init, &enum_decl.id.sym, &members, decl.file),
                    None => match next {
                        Some(n) => EnumValue::Number(n),
                        None => EnumValue::Computed(String::new()),
                    },
                };
                next = match &value {
                    EnumValue::Number(n) => Some(n + 1.0),
                    _ => None,
                };
                members.push(EnumMember {
                    name,
                    value,
                    declaration: MemberDecl {
                        file: decl.file,
                        span: member.span,
                        doc_span: member.span,
                    },
                });
            }
        }

        let members = Rc::new(members);
        self.enum_members.borrow_mut().insert(symbol, members.clone());
        members
    }

    fn evaluate_enum_initializer(
        &self,
        init: &swc_ast::Expr,
        enum_name: &str,
        previous: &[EnumMember],
        file: crate::program::FileId,
    ) -> EnumValue {
        match evaluate_constant(init, enum_name, previous) {
            Some(value) => value,
            None => EnumValue::Computed(self.node_text(file, init.span())),
        }
    }

    /// Literal type of one enum member, e.g. `Color.Red`
    pub fn enum_literal_type(&self, enum_symbol: SymbolId, member: &str) -> TypeId {
        let key = (enum_symbol, member.to_string());
        if let Some(id) = self.enum_literals.borrow().get(&key) {
            return *id;
        }
        let found = self
            .enum_members(enum_symbol)
            .iter()
            .find(|m| m.name == member)
            .map(|m| m.value.clone());
        let id = match found {
            Some(value) => self.alloc(TypeData::EnumLiteral {
                enum_symbol,
                member: member.to_string(),
                value,
            }),
            None => {
                let name = &self.symbol(enum_symbol).name;
                return self.unresolved(format!("{}.{}", name, member));
            }
        };
        self.enum_literals.borrow_mut().insert(key, id);
        id
    }
}

/// Constant-fold an enum initializer
fn evaluate_constant(expr: &swc_ast::Expr, enum_name: &str, previous: &[EnumMember]) -> Option<EnumValue> {
    use swc_ast::{BinaryOp as Op, Expr};

    let number = |value: EnumValue| match value {
        EnumValue::Number(n) => Some(n),
        _ => None,
    };
    let lookup = |name: &str| {
        previous
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.value.clone())
            .filter(|v| !matches!(v, EnumValue::Computed(_)))
    };

    match expr {
        Expr::Lit(swc_ast::Lit::Num(n)) => Some(EnumValue::Number(n.value)),
        Expr::Lit(swc_ast::Lit::Str(s)) => Some(EnumValue::String(wtf8_to_string(s))),
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => {
            let text = tpl.quasis.first()?.raw.to_string();
            Some(EnumValue::String(text))
        }
        Expr::Paren(p) => evaluate_constant(&p.expr, enum_name, previous),
        Expr::Ident(ident) => lookup(&ident.sym),
        Expr::Member(member) => {
            let Expr::Ident(object) = &*member.obj else {
                return None;
            };
            if &*object.sym != enum_name {
                return None;
            }
            match &member.prop {
                swc_ast::MemberProp::Ident(prop) => lookup(&prop.sym),
                swc_ast::MemberProp::Computed(c) => match &*c.expr {
                    Expr::Lit(swc_ast::Lit::Str(s)) => lookup(&wtf8_to_string(s)),
                    _ => None,
                },
                swc_ast::MemberProp::PrivateName(_) => None,
            }
        }
        Expr::Unary(unary) => {
            let value = number(evaluate_constant(&unary.arg, enum_name, previous)?)?;
            let result = match unary.op {
                swc_ast::UnaryOp::Minus => -value,
                swc_ast::UnaryOp::Plus => value,
                swc_ast::UnaryOp::Tilde => !(value as i64 as i32) as f64,
                _ => return None,
            };
            Some(EnumValue::Number(result))
        }
        Expr::Bin(bin) => {
            let left = evaluate_constant(&bin.left, enum_name, previous)?;
            let right = evaluate_constant(&bin.right, enum_name, previous)?;
            if bin.op == Op::Add {
                match (&left, &right) {
                    (EnumValue::String(a), EnumValue::String(b)) => {
                        return Some(EnumValue::String(format!("{}{}", a, b)))
                    }
                    (EnumValue::String(a), EnumValue::Number(b)) => {
                        return Some(EnumValue::String(format!("{}{}", a, format_number(*b))))
                    }
                    (EnumValue::Number(a), EnumValue::String(b)) => {
                        return Some(EnumValue::String(format!("{}{}", format_number(*a), b)))
                    }
                    _ => {}
                }
            }
            let (a, b) = (number(left)?, number(right)?);
            let (ai, bi) = (a as i64 as i32, b as i64 as i32);
            let result = match bin.op {
                Op::Add => a + b,
                Op::Sub => a - b,
                Op::Mul => a * b,
                Op::Div => a / b,
                Op::Mod => a % b,
                Op::Exp => a.powf(b),
                Op::BitOr => (ai | bi) as f64,
                Op::BitAnd => (ai & bi) as f64,
                Op::BitXor => (ai ^ bi) as f64,
                Op::LShift => ai.wrapping_shl(bi as u32 & 31) as f64,
                Op::RShift => ai.wrapping_shr(bi as u32 & 31) as f64,
                Op::ZeroFillRShift => (ai as u32).wrapping_shr(bi as u32 & 31) as f64,
                _ => return None,
            };
            Some(EnumValue::Number(result))
        }
        _ => None,
    }
}
