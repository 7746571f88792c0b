//! Symbol queries: aliases, module exports, name lookup and symbol types

use super::Checker;
use crate::binder::{AliasTarget, DeclKind, Declaration, ModuleRef, SymbolFlags, SymbolId};
use crate::types::{ObjectFlags, ObjectShape, ObjectType, Scope, TypeData, TypeId, TypeParam};
use deno_ast::swc::ast as swc_ast;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::rc::Rc;
use tracing::trace;

/// What a (possibly dotted) type name refers to
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EntityTarget {
    Symbol(SymbolId),
    /// `Enum.Member`
    EnumMember(SymbolId, String),
}

impl Checker {
    /// Follow an alias chain to the symbol it finally names
    ///
    /// Returns `None` when the chain ends in a module that is not part of
    /// the program, names something that does not exist, or loops.
    pub fn resolve_alias(&self, symbol: SymbolId) -> Option<SymbolId> {
        let mut current = symbol;
        let mut seen = HashSet::new();
        loop {
            let sym = self.symbol(current);
            let Some(target) = &sym.alias else {
                return Some(current);
            };
            if !seen.insert(current) {
                trace!(name = %sym.name, "Alias cycle");
                return None;
            }
            current = match target {
                AliasTarget::Local { name } => {
                    let container = sym.parent?;
                    if name.contains('.') {
                        return match self.resolve_entity(name, container)? {
                            EntityTarget::Symbol(id) => Some(id),
                            EntityTarget::EnumMember(..) => None,
                        };
                    }
                    self.lookup_name(name, container)?
                }
                AliasTarget::Export {
                    module: ModuleRef::Resolved(file),
                    name,
                    ..
                } => {
                    let module = self.file_symbol(*file);
                    self.export_of_module(module, name)?
                }
                AliasTarget::Namespace {
                    module: ModuleRef::Resolved(file),
                    ..
                } => return Some(self.file_symbol(*file)),
                AliasTarget::Export {
                    module: ModuleRef::Unresolved(_),
                    ..
                }
                | AliasTarget::Namespace {
                    module: ModuleRef::Unresolved(_),
                    ..
                } => return None,
            };
        }
    }

    /// Exports of a module symbol, own exports first, then `export *`
    ///
    /// Star re-exports never contribute `default`, and an own export
    /// shadows a starred one of the same name.
    pub fn module_exports(&self, module: SymbolId) -> Rc<IndexMap<String, SymbolId>> {
        if let Some(cached) = self.module_exports.borrow().get(&module) {
            return cached.clone();
        }
        let mut visited = HashSet::new();
        let exports = Rc::new(self.collect_module_exports(module, &mut visited));
        self.module_exports
            .borrow_mut()
            .insert(module, exports.clone());
        exports
    }

    fn collect_module_exports(
        &self,
        module: SymbolId,
        visited: &mut HashSet<SymbolId>,
    ) -> IndexMap<String, SymbolId> {
        if !visited.insert(module) {
            return IndexMap::new();
        }
        let symbol = self.symbol(module);
        let mut exports = symbol.exports.clone();
        for star in &symbol.export_stars {
            let ModuleRef::Resolved(file) = star else {
                continue;
            };
            let inner = self.collect_module_exports(self.file_symbol(*file), visited);
            for (name, id) in inner {
                if name != "default" {
                    exports.entry(name).or_insert(id);
                }
            }
        }
        exports
    }

    /// Raw export of a module by name, before alias resolution
    pub fn export_of_module(&self, module: SymbolId, name: &str) -> Option<SymbolId> {
        self.module_exports(module).get(name).copied()
    }

    /// Members reachable through `Namespace.member`
    pub(crate) fn namespace_exports(&self, symbol: SymbolId) -> Rc<IndexMap<String, SymbolId>> {
        let sym = self.symbol(symbol);
        if sym.flags.contains(SymbolFlags::MODULE) {
            self.module_exports(symbol)
        } else {
            Rc::new(sym.exports.clone())
        }
    }

    /// Find a name from inside `container`, walking outwards to globals
    pub(crate) fn lookup_name(&self, name: &str, container: SymbolId) -> Option<SymbolId> {
        let mut current = Some(container);
        while let Some(id) = current {
            let sym = self.symbol(id);
            if let Some(found) = sym.locals.get(name) {
                return Some(*found);
            }
            if let Some(found) = sym.exports.get(name) {
                return Some(*found);
            }
            current = sym.parent;
        }
        self.table.global(name)
    }

    /// Resolve a possibly dotted name such as `ns.Inner.Type` or `Color.Red`
    pub(crate) fn resolve_entity(&self, name: &str, container: SymbolId) -> Option<EntityTarget> {
        let mut segments = name.split('.');
        let first = segments.next()?;
        let mut current = self.resolve_alias(self.lookup_name(first, container)?)?;
        let rest: Vec<&str> = segments.collect();

        for (i, segment) in rest.iter().enumerate() {
            let is_last = i + 1 == rest.len();
            let sym = self.symbol(current);
            if is_last
                && sym.flags.contains(SymbolFlags::ENUM)
                && self.enum_members(current).iter().any(|m| m.name == *segment)
            {
                return Some(EntityTarget::EnumMember(current, segment.to_string()));
            }
            let exports = self.namespace_exports(current);
            let next = *exports.get(*segment)?;
            current = self.resolve_alias(next)?;
        }
        Some(EntityTarget::Symbol(current))
    }

    /// Symbol declared in a user file under `name`; exports win over locals
    pub fn find_declaration_by_name(&self, name: &str) -> Option<SymbolId> {
        let files: Vec<_> = self.program.user_files().map(|f| f.id).collect();
        for file in &files {
            let module = self.file_symbol(*file);
            if let Some(id) = self.module_exports(module).get(name) {
                if let Some(resolved) = self.resolve_alias(*id) {
                    return Some(resolved);
                }
            }
        }
        for file in &files {
            let module = self.symbol(self.file_symbol(*file));
            if let Some(id) = module.locals.get(name) {
                if let Some(resolved) = self.resolve_alias(*id) {
                    return Some(resolved);
                }
            }
        }
        None
    }

    pub(crate) fn declaration_scope(&self, decl: &Declaration) -> Scope {
        Scope::new(decl.file, decl.container)
    }

    /// Type-parameter list of the first declaration of a generic symbol
    fn type_parameter_decl(&self, symbol: SymbolId) -> Option<(Scope, swc_ast::TsTypeParamDecl)> {
        self.symbol(symbol).declarations.iter().find_map(|decl| {
            let params = match &decl.kind {
                DeclKind::Interface(iface) => iface.type_params.as_deref(),
                DeclKind::Class(class) => class.type_params.as_deref(),
                DeclKind::TypeAlias(alias) => alias.type_params.as_deref(),
                _ => None,
            }?;
            Some((self.declaration_scope(decl), params.clone()))
        })
    }

    /// Type parameters of a generic class, interface or type alias
    pub fn type_parameters_of(&self, symbol: SymbolId) -> Rc<Vec<TypeId>> {
        if let Some(cached) = self.type_parameters.borrow().get(&symbol) {
            return cached.clone();
        }
        let Some((scope, params)) = self.type_parameter_decl(symbol) else {
            let empty = Rc::new(Vec::new());
            self.type_parameters
                .borrow_mut()
                .insert(symbol, empty.clone());
            return empty;
        };

        // Parameters exist before their constraints so constraints can
        // mention each other
        let ids: Vec<TypeId> = params
            .params
            .iter()
            .map(|p| {
                self.alloc(TypeData::TypeParameter(TypeParam {
                    name: p.name.sym.to_string(),
                    constraint: None,
                    default: None,
                }))
            })
            .collect();
        let ids = Rc::new(ids);
        self.type_parameters
            .borrow_mut()
            .insert(symbol, ids.clone());

        let scope = scope.extend(
            params
                .params
                .iter()
                .map(|p| p.name.sym.to_string())
                .zip(ids.iter().copied()),
        );
        self.complete_type_parameters(&params, &ids, &scope);
        ids
    }

    /// Fresh type parameters for a signature, plus the scope binding them
    pub(crate) fn create_type_parameters(
        &self,
        params: Option<&swc_ast::TsTypeParamDecl>,
        scope: &Scope,
    ) -> (Vec<TypeId>, Scope) {
        let Some(params) = params else {
            return (Vec::new(), scope.clone());
        };
        let ids: Vec<TypeId> = params
            .params
            .iter()
            .map(|p| {
                self.alloc(TypeData::TypeParameter(TypeParam {
                    name: p.name.sym.to_string(),
                    constraint: None,
                    default: None,
                }))
            })
            .collect();
        let inner = scope.extend(
            params
                .params
                .iter()
                .map(|p| p.name.sym.to_string())
                .zip(ids.iter().copied()),
        );
        self.complete_type_parameters(params, &ids, &inner);
        (ids, inner)
    }

    fn complete_type_parameters(
        &self,
        params: &swc_ast::TsTypeParamDecl,
        ids: &[TypeId],
        scope: &Scope,
    ) {
        for (param, id) in params.params.iter().zip(ids) {
            let constraint = param
                .constraint
                .as_ref()
                .map(|c| self.type_from_node(c, scope));
            let default = param
                .default
                .as_ref()
                .map(|d| self.type_from_node(d, scope));
            self.set_record(
                *id,
                TypeData::TypeParameter(TypeParam {
                    name: param.name.sym.to_string(),
                    constraint,
                    default,
                }),
                None,
            );
        }
    }

    /// Pad `arguments` with declared defaults; missing ones without a
    /// default become `any`
    pub(crate) fn fill_type_arguments(&self, symbol: SymbolId, mut arguments: Vec<TypeId>) -> Vec<TypeId> {
        let Some((scope, params)) = self.type_parameter_decl(symbol) else {
            return Vec::new();
        };
        if arguments.len() >= params.params.len() {
            arguments.truncate(params.params.len());
            return arguments;
        }

        let mut scope = scope.extend(
            params
                .params
                .iter()
                .map(|p| p.name.sym.to_string())
                .zip(arguments.iter().copied()),
        );
        for param in &params.params[arguments.len()..] {
            let ty = match &param.default {
                Some(default) => self.type_from_node(default, &scope),
                None => self.intrinsics.any,
            };
            scope = scope.with(param.name.sym.to_string(), ty);
            arguments.push(ty);
        }
        arguments
    }

    /// The type a symbol declares: instance type of a class or interface,
    /// the aliased type of a type alias, or the enum type
    pub fn declared_type_of_symbol(&self, symbol: SymbolId) -> TypeId {
        let Some(symbol) = self.resolve_alias(symbol) else {
            return self.unresolved(self.symbol(symbol).name.clone());
        };
        if let Some(cached) = self.declared_types.borrow().get(&symbol) {
            return *cached;
        }

        let sym = self.symbol(symbol);
        let ty = if sym.flags.intersects(SymbolFlags::CLASS | SymbolFlags::INTERFACE) {
            let params = self.type_parameters_of(symbol);
            self.type_reference(symbol, params.to_vec())
        } else if sym.flags.contains(SymbolFlags::TYPE_ALIAS) {
            let params = self.type_parameters_of(symbol);
            self.instantiate_alias(symbol, params.to_vec())
        } else if sym.flags.contains(SymbolFlags::ENUM) {
            self.alloc(TypeData::Enum(symbol))
        } else {
            self.unresolved(sym.name.clone())
        };
        self.declared_types.borrow_mut().insert(symbol, ty);
        ty
    }

    /// The type of a symbol used as a value
    pub fn type_of_symbol(&self, symbol: SymbolId) -> TypeId {
        let Some(symbol) = self.resolve_alias(symbol) else {
            return self.unresolved(self.symbol(symbol).name.clone());
        };
        if let Some(cached) = self.value_types.borrow().get(&symbol) {
            return *cached;
        }
        if !self.resolving_values.borrow_mut().insert(symbol) {
            return self.intrinsics.any;
        }

        let ty = self.compute_value_type(symbol);

        self.resolving_values.borrow_mut().remove(&symbol);
        self.value_types.borrow_mut().insert(symbol, ty);
        ty
    }

    fn compute_value_type(&self, symbol: SymbolId) -> TypeId {
        let sym = self.symbol(symbol);

        if sym.flags.contains(SymbolFlags::VARIABLE) {
            for decl in &sym.declarations {
                match &decl.kind {
                    DeclKind::Variable { declarator, kind } => {
                        return self.variable_type(decl, declarator, *kind);
                    }
                    DeclKind::DefaultExpr(expr) => {
                        return self.infer_expression(expr, &self.declaration_scope(decl), false);
                    }
                    _ => {}
                }
            }
        }

        if sym.flags.intersects(
            SymbolFlags::CLASS
                | SymbolFlags::FUNCTION
                | SymbolFlags::ENUM
                | SymbolFlags::NAMESPACE
                | SymbolFlags::MODULE,
        ) {
            let mut flags = ObjectFlags::ANONYMOUS;
            if sym.flags.intersects(SymbolFlags::CLASS | SymbolFlags::ENUM | SymbolFlags::NAMESPACE) {
                flags |= ObjectFlags::CONSTRUCTOR;
            }
            return self.alloc(TypeData::Object(ObjectType {
                flags,
                symbol: Some(symbol),
                type_arguments: Vec::new(),
                shape: ObjectShape::SymbolValue,
            }));
        }

        self.unresolved(sym.name.clone())
    }

    fn variable_type(
        &self,
        decl: &Declaration,
        declarator: &swc_ast::VarDeclarator,
        kind: swc_ast::VarDeclKind,
    ) -> TypeId {
        let scope = self.declaration_scope(decl);
        let annotation = match &declarator.name {
            swc_ast::Pat::Ident(binding) => binding.type_ann.as_ref(),
            _ => None,
        };
        if let Some(ann) = annotation {
            return self.type_from_node(&ann.type_ann, &scope);
        }
        if !matches!(declarator.name, swc_ast::Pat::Ident(_)) {
            return self.intrinsics.any;
        }
        match &declarator.init {
            Some(init) => self.infer_expression(init, &scope, kind != swc_ast::VarDeclKind::Const),
            None => self.intrinsics.any,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_alias_chains_resolve() {
        let checker = checker(&[
            (
                "/pkg/index.ts",
                "export { Person as User } from './a';\nexport * from './b';\nimport def from './b';\nexport { def };",
            ),
            ("/pkg/a.ts", "import { Person } from './c';\nexport { Person };"),
            ("/pkg/b.ts", "export const b = 1;\nexport default function make() {}"),
            ("/pkg/c.ts", "export interface Person { name: string }"),
        ]);
        let user = export(&checker, "User");
        assert_eq!(checker.symbol(user).name, "Person");
        assert!(checker.symbol(user).flags.contains(SymbolFlags::INTERFACE));

        let module = checker.file_symbol(checker.program().root_files()[0]);
        let exports = checker.module_exports(module);
        let names: Vec<&str> = exports.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["User", "def", "b"]);
        assert_eq!(checker.symbol(export(&checker, "def")).name, "make");
    }

    #[test]
    fn test_export_star_cycles_terminate() {
        let checker = checker(&[
            ("/pkg/index.ts", "export * from './a';\nexport const root = 1;"),
            ("/pkg/a.ts", "export * from './index';\nexport const a = 1;"),
        ]);
        let module = checker.file_symbol(checker.program().root_files()[0]);
        let exports = checker.module_exports(module);
        assert!(exports.contains_key("root"));
        assert!(exports.contains_key("a"));
    }

    #[test]
    fn test_unresolved_alias() {
        let checker = checker_for("export { Thing } from 'not-installed';");
        let module = checker.file_symbol(checker.program().root_files()[0]);
        let raw = checker.module_exports(module)["Thing"];
        assert_eq!(checker.resolve_alias(raw), None);
    }

    #[test]
    fn test_qualified_entities() {
        let checker = checker_for(
            "export namespace Outer { export namespace Inner { export interface T {} } }\nexport enum Color { Red, Green }",
        );
        let module = checker.file_symbol(checker.program().root_files()[0]);
        match checker.resolve_entity("Outer.Inner.T", module) {
            Some(EntityTarget::Symbol(id)) => assert_eq!(checker.symbol(id).name, "T"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            checker.resolve_entity("Color.Green", module),
            Some(EntityTarget::EnumMember(_, name)) if name == "Green"
        ));
        assert_eq!(checker.resolve_entity("Outer.Missing", module), None);
    }

    #[test]
    fn test_value_types() {
        let checker = checker_for(
            r#"
            export const name = "openpkg";
            export let count = 1;
            export const list: string[] = [];
            export default { a: 1 };
            "#,
        );
        assert_eq!(value(&checker, "name"), "\"openpkg\"");
        assert_eq!(value(&checker, "count"), "number");
        assert_eq!(value(&checker, "list"), "string[]");
        assert_eq!(value(&checker, "default"), "{ a: number; }");
    }

    #[test]
    fn test_type_argument_defaults() {
        let checker = checker_for(
            "export interface Pair<A, B = A> { a: A; b: B }\nexport type P = Pair<string>;",
        );
        assert_eq!(declared(&checker, "P"), "Pair<string, string>");
        assert_eq!(declared(&checker, "Pair"), "Pair<A, B>");
    }

    #[test]
    fn test_find_declaration_by_name() {
        let checker = checker(&[
            ("/pkg/index.ts", "export * from './types';\ninterface Local {}"),
            ("/pkg/types.ts", "export interface Shared {}"),
        ]);
        assert!(checker.find_declaration_by_name("Shared").is_some());
        assert!(checker.find_declaration_by_name("Local").is_some());
        assert!(checker.find_declaration_by_name("Array").is_none());
    }
}
