//! Symbol binding
//!
//! Walks every file of a program once and builds the symbol table:
//! module symbols with their locals and exports, namespaces, import and
//! re-export aliases, and merged declarations.

use crate::error::{ProgramDiagnostic, CODE_DUPLICATE_IDENTIFIER};
use crate::program::{FileId, Program, SourceFile};
use crate::source::{entity_name, module_export_name, wtf8_to_string};
use bitflags::bitflags;
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::{Span, Spanned};
use indexmap::IndexMap;
use std::rc::Rc;
use tracing::trace;

/// Index of a symbol inside the symbol table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

bitflags! {
    /// What a symbol declares
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SymbolFlags: u32 {
        const FUNCTION = 1 << 0;
        const CLASS = 1 << 1;
        const INTERFACE = 1 << 2;
        const TYPE_ALIAS = 1 << 3;
        const ENUM = 1 << 4;
        const VARIABLE = 1 << 5;
        const NAMESPACE = 1 << 6;
        const MODULE = 1 << 7;
        const ALIAS = 1 << 8;
        /// `const` variable or `const enum`
        const CONST = 1 << 9;
        const DEFAULT_EXPORT = 1 << 10;
        const AMBIENT = 1 << 11;

        const TYPE = Self::CLASS.bits()
            | Self::INTERFACE.bits()
            | Self::TYPE_ALIAS.bits()
            | Self::ENUM.bits();
        const VALUE = Self::FUNCTION.bits()
            | Self::CLASS.bits()
            | Self::ENUM.bits()
            | Self::VARIABLE.bits();
    }
}

/// Syntax node behind one declaration
#[derive(Debug, Clone)]
pub enum DeclKind {
    Function(Rc<swc_ast::Function>),
    Class(Rc<swc_ast::Class>),
    Interface(Rc<swc_ast::TsInterfaceDecl>),
    TypeAlias(Rc<swc_ast::TsTypeAliasDecl>),
    Enum(Rc<swc_ast::TsEnumDecl>),
    Variable {
        declarator: Rc<swc_ast::VarDeclarator>,
        kind: swc_ast::VarDeclKind,
    },
    Namespace,
    /// `export default <expression>`
    DefaultExpr(Rc<swc_ast::Expr>),
}

/// One declaration of a symbol
#[derive(Debug, Clone)]
pub struct Declaration {
    pub file: FileId,
    /// Module or namespace symbol the declaration lives in
    pub container: SymbolId,
    pub kind: DeclKind,
    pub span: Span,
    /// Span whose leading comments hold the JSDoc (includes `export`)
    pub doc_span: Span,
    pub ambient: bool,
}

impl Declaration {
    /// Function declarations without a body are overload signatures
    pub fn is_overload_signature(&self) -> bool {
        matches!(&self.kind, DeclKind::Function(f) if f.body.is_none())
    }
}

/// Module referenced by an import or re-export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleRef {
    Resolved(FileId),
    Unresolved(String),
}

/// Where an alias symbol points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasTarget {
    /// `import { a as b } from "m"` or `export { a } from "m"`
    Export {
        module: ModuleRef,
        specifier: String,
        name: String,
    },
    /// `import * as ns from "m"` or `export * as ns from "m"`
    Namespace { module: ModuleRef, specifier: String },
    /// `export { a as b }`, `export default a` and `export = a`
    Local { name: String },
}

impl AliasTarget {
    /// Module specifier text for aliases into other modules
    pub fn specifier(&self) -> Option<&str> {
        match self {
            AliasTarget::Export { specifier, .. } | AliasTarget::Namespace { specifier, .. } => {
                Some(specifier)
            }
            AliasTarget::Local { .. } => None,
        }
    }
}

/// A named entity: module, namespace, declaration or alias
#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub flags: SymbolFlags,
    pub declarations: Vec<Declaration>,
    /// Enclosing module or namespace
    pub parent: Option<SymbolId>,
    pub file: FileId,
    pub exports: IndexMap<String, SymbolId>,
    pub locals: IndexMap<String, SymbolId>,
    pub export_stars: Vec<ModuleRef>,
    pub alias: Option<AliasTarget>,
    pub alias_span: Option<Span>,
}

impl Symbol {
    pub fn is_alias(&self) -> bool {
        self.flags.contains(SymbolFlags::ALIAS)
    }

    /// First declaration that is not an overload signature, or the first one
    pub fn value_declaration(&self) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|d| !d.is_overload_signature())
            .or_else(|| self.declarations.first())
    }

    /// True when the declarations combine into one merged entity
    pub fn is_declaration_merge(&self) -> bool {
        let count = |pred: fn(&DeclKind) -> bool| {
            self.declarations.iter().filter(|d| pred(&d.kind)).count()
        };
        let interfaces = count(|k| matches!(k, DeclKind::Interface(_)));
        let namespaces = count(|k| matches!(k, DeclKind::Namespace));
        let classes = count(|k| matches!(k, DeclKind::Class(_)));
        let enums = count(|k| matches!(k, DeclKind::Enum(_)));

        interfaces > 1
            || (interfaces > 0 && namespaces > 0)
            || (interfaces > 0 && classes > 0)
            || enums > 1
    }
}

/// Output of binding a whole program
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    file_symbols: Vec<SymbolId>,
    globals: IndexMap<String, SymbolId>,
    diagnostics: Vec<ProgramDiagnostic>,
}

impl SymbolTable {
    /// Bind every file of `program`
    pub fn bind(program: &Program) -> Self {
        let mut binder = Binder {
            program,
            table: SymbolTable::default(),
        };
        for file in program.files() {
            binder.bind_file(file);
        }
        binder.table
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// The module symbol of a file
    pub fn file_symbol(&self, file: FileId) -> SymbolId {
        self.file_symbols[file.index()]
    }

    pub fn globals(&self) -> &IndexMap<String, SymbolId> {
        &self.globals
    }

    pub fn global(&self, name: &str) -> Option<SymbolId> {
        self.globals.get(name).copied()
    }

    pub fn diagnostics(&self) -> &[ProgramDiagnostic] {
        &self.diagnostics
    }
}

/// Binding context for one block of items
#[derive(Clone, Copy)]
struct BindContext {
    file: FileId,
    container: SymbolId,
    ambient: bool,
    /// Declarations go to the global scope
    global: bool,
    /// Declarations are exported without an `export` keyword
    export_all: bool,
}

struct Binder<'p> {
    program: &'p Program,
    table: SymbolTable,
}

impl<'p> Binder<'p> {
    fn bind_file(&mut self, file: &SourceFile) {
        let module = self.new_symbol(
            file.path.display().to_string(),
            SymbolFlags::MODULE,
            file.id,
            None,
        );
        self.table.file_symbols.push(module);

        let ctx = BindContext {
            file: file.id,
            container: module,
            ambient: file.is_declaration,
            global: file.is_lib || (file.is_declaration && file.is_script()),
            export_all: false,
        };
        self.bind_items(&file.items, ctx);
        trace!(path = %file.path.display(), "Bound file");
    }

    fn new_symbol(
        &mut self,
        name: String,
        flags: SymbolFlags,
        file: FileId,
        parent: Option<SymbolId>,
    ) -> SymbolId {
        let id = SymbolId(self.table.symbols.len() as u32);
        self.table.symbols.push(Symbol {
            id,
            name,
            flags,
            declarations: Vec::new(),
            parent,
            file,
            exports: IndexMap::new(),
            locals: IndexMap::new(),
            export_stars: Vec::new(),
            alias: None,
            alias_span: None,
        });
        id
    }

    fn bind_items(&mut self, items: &[swc_ast::ModuleItem], ctx: BindContext) {
        for item in items {
            match item {
                swc_ast::ModuleItem::Stmt(swc_ast::Stmt::Decl(decl)) => {
                    self.bind_decl(decl, ctx.export_all, decl.span(), ctx);
                }
                swc_ast::ModuleItem::Stmt(_) => {}
                swc_ast::ModuleItem::ModuleDecl(decl) => self.bind_module_decl(decl, ctx),
            }
        }
    }

    fn bind_module_decl(&mut self, decl: &swc_ast::ModuleDecl, ctx: BindContext) {
        match decl {
            swc_ast::ModuleDecl::Import(import) => {
                let specifier = wtf8_to_string(&import.src);
                let module = self.module_ref(ctx.file, &specifier);
                for spec in &import.specifiers {
                    let (local, target) = match spec {
                        swc_ast::ImportSpecifier::Named(named) => {
                            let name = named
                                .imported
                                .as_ref()
                                .map(module_export_name)
                                .unwrap_or_else(|| named.local.sym.to_string());
                            (
                                named.local.sym.to_string(),
                                AliasTarget::Export {
                                    module: module.clone(),
                                    specifier: specifier.clone(),
                                    name,
                                },
                            )
                        }
                        swc_ast::ImportSpecifier::Default(default) => (
                            default.local.sym.to_string(),
                            AliasTarget::Export {
                                module: module.clone(),
                                specifier: specifier.clone(),
                                name: "default".to_string(),
                            },
                        ),
                        swc_ast::ImportSpecifier::Namespace(ns) => (
                            ns.local.sym.to_string(),
                            AliasTarget::Namespace {
                                module: module.clone(),
                                specifier: specifier.clone(),
                            },
                        ),
                    };
                    let alias = self.new_alias(&local, target, import.span, ctx);
                    self.insert_local(&local, alias, ctx);
                }
            }

            swc_ast::ModuleDecl::ExportDecl(export) => {
                self.bind_decl(&export.decl, true, export.span, ctx);
            }

            swc_ast::ModuleDecl::ExportNamed(named) => {
                let source = named.src.as_ref().map(|src| {
                    let specifier = wtf8_to_string(src);
                    (self.module_ref(ctx.file, &specifier), specifier)
                });
                for spec in &named.specifiers {
                    let (exported, target) = match spec {
                        swc_ast::ExportSpecifier::Named(n) => {
                            let orig = module_export_name(&n.orig);
                            let exported = n
                                .exported
                                .as_ref()
                                .map(module_export_name)
                                .unwrap_or_else(|| orig.clone());
                            let target = match &source {
                                Some((module, specifier)) => AliasTarget::Export {
                                    module: module.clone(),
                                    specifier: specifier.clone(),
                                    name: orig,
                                },
                                None => AliasTarget::Local { name: orig },
                            };
                            (exported, target)
                        }
                        swc_ast::ExportSpecifier::Namespace(ns) => {
                            let Some((module, specifier)) = &source else {
                                continue;
                            };
                            (
                                module_export_name(&ns.name),
                                AliasTarget::Namespace {
                                    module: module.clone(),
                                    specifier: specifier.clone(),
                                },
                            )
                        }
                        swc_ast::ExportSpecifier::Default(default) => {
                            let Some((module, specifier)) = &source else {
                                continue;
                            };
                            (
                                default.exported.sym.to_string(),
                                AliasTarget::Export {
                                    module: module.clone(),
                                    specifier: specifier.clone(),
                                    name: "default".to_string(),
                                },
                            )
                        }
                    };
                    let alias = self.new_alias(&exported, target, named.span, ctx);
                    self.insert_export(&exported, alias, ctx);
                }
            }

            swc_ast::ModuleDecl::ExportDefaultDecl(default) => {
                let (ident, kind) = match &default.decl {
                    swc_ast::DefaultDecl::Class(class) => (
                        class.ident.as_ref(),
                        (SymbolFlags::CLASS, DeclKind::Class(Rc::new((*class.class).clone()))),
                    ),
                    swc_ast::DefaultDecl::Fn(func) => (
                        func.ident.as_ref(),
                        (
                            SymbolFlags::FUNCTION,
                            DeclKind::Function(Rc::new((*func.function).clone())),
                        ),
                    ),
                    swc_ast::DefaultDecl::TsInterfaceDecl(iface) => (
                        Some(&iface.id),
                        (SymbolFlags::INTERFACE, DeclKind::Interface(Rc::new((**iface).clone()))),
                    ),
                };
                let (flags, kind) = kind;
                let name = ident
                    .map(|i| i.sym.to_string())
                    .unwrap_or_else(|| "default".to_string());
                let declaration = Declaration {
                    file: ctx.file,
                    container: ctx.container,
                    kind,
                    span: default.decl.span(),
                    doc_span: default.span,
                    ambient: ctx.ambient,
                };
                let id = self.declare(&name, flags | SymbolFlags::DEFAULT_EXPORT, declaration, false, ctx);
                self.insert_export("default", id, ctx);
            }

            swc_ast::ModuleDecl::ExportDefaultExpr(default) => {
                self.bind_default_expr(&default.expr, default.span, ctx);
            }

            swc_ast::ModuleDecl::TsExportAssignment(assign) => {
                self.bind_default_expr(&assign.expr, assign.span, ctx);
            }

            swc_ast::ModuleDecl::ExportAll(all) => {
                let specifier = wtf8_to_string(&all.src);
                let module = self.module_ref(ctx.file, &specifier);
                self.table.symbols[ctx.container.index()]
                    .export_stars
                    .push(module);
            }

            swc_ast::ModuleDecl::TsImportEquals(equals) => {
                let local = equals.id.sym.to_string();
                let target = match &equals.module_ref {
                    swc_ast::TsModuleRef::TsExternalModuleRef(ext) => {
                        let specifier = wtf8_to_string(&ext.expr);
                        AliasTarget::Namespace {
                            module: self.module_ref(ctx.file, &specifier),
                            specifier,
                        }
                    }
                    swc_ast::TsModuleRef::TsEntityName(name) => AliasTarget::Local {
                        name: entity_name(name),
                    },
                };
                let alias = self.new_alias(&local, target, equals.span, ctx);
                self.insert_local(&local, alias, ctx);
                if equals.is_export {
                    self.insert_export(&local, alias, ctx);
                }
            }

            swc_ast::ModuleDecl::TsNamespaceExport(_) => {}
        }
    }

    fn bind_default_expr(&mut self, expr: &swc_ast::Expr, span: Span, ctx: BindContext) {
        let expr = unwrap_parens(expr);
        if let swc_ast::Expr::Ident(ident) = expr {
            let alias = self.new_alias(
                "default",
                AliasTarget::Local {
                    name: ident.sym.to_string(),
                },
                span,
                ctx,
            );
            self.insert_export("default", alias, ctx);
            return;
        }

        let declaration = Declaration {
            file: ctx.file,
            container: ctx.container,
            kind: DeclKind::DefaultExpr(Rc::new(expr.clone())),
            span,
            doc_span: span,
            ambient: ctx.ambient,
        };
        let id = self.new_symbol(
            "default".to_string(),
            SymbolFlags::VARIABLE | SymbolFlags::DEFAULT_EXPORT,
            ctx.file,
            Some(ctx.container),
        );
        self.table.symbols[id.index()].declarations.push(declaration);
        self.insert_export("default", id, ctx);
    }

    fn bind_decl(&mut self, decl: &swc_ast::Decl, exported: bool, doc_span: Span, ctx: BindContext) {
        let declaration = |kind: DeclKind, span: Span| Declaration {
            file: ctx.file,
            container: ctx.container,
            kind,
            span,
            doc_span,
            ambient: ctx.ambient,
        };

        match decl {
            swc_ast::Decl::Fn(func) => {
                let d = declaration(
                    DeclKind::Function(Rc::new((*func.function).clone())),
                    func.function.span,
                );
                self.declare(&func.ident.sym, SymbolFlags::FUNCTION, d, exported, ctx);
            }
            swc_ast::Decl::Class(class) => {
                let d = declaration(DeclKind::Class(Rc::new((*class.class).clone())), class.class.span);
                self.declare(&class.ident.sym, SymbolFlags::CLASS, d, exported, ctx);
            }
            swc_ast::Decl::Var(var) => {
                let mut flags = SymbolFlags::VARIABLE;
                if var.kind == swc_ast::VarDeclKind::Const {
                    flags |= SymbolFlags::CONST;
                }
                let var_ctx = BindContext {
                    ambient: ctx.ambient || var.declare,
                    ..ctx
                };
                for declarator in &var.decls {
                    let mut names = Vec::new();
                    collect_binding_names(&declarator.name, &mut names);
                    let node = Rc::new(declarator.clone());
                    for name in names {
                        let d = Declaration {
                            ambient: var_ctx.ambient,
                            ..declaration(
                                DeclKind::Variable {
                                    declarator: node.clone(),
                                    kind: var.kind,
                                },
                                declarator.span,
                            )
                        };
                        self.declare(&name, flags, d, exported, var_ctx);
                    }
                }
            }
            swc_ast::Decl::TsInterface(iface) => {
                let d = declaration(DeclKind::Interface(Rc::new((**iface).clone())), iface.span);
                self.declare(&iface.id.sym, SymbolFlags::INTERFACE, d, exported, ctx);
            }
            swc_ast::Decl::TsTypeAlias(alias) => {
                let d = declaration(DeclKind::TypeAlias(Rc::new((**alias).clone())), alias.span);
                self.declare(&alias.id.sym, SymbolFlags::TYPE_ALIAS, d, exported, ctx);
            }
            swc_ast::Decl::TsEnum(e) => {
                let mut flags = SymbolFlags::ENUM;
                if e.is_const {
                    flags |= SymbolFlags::CONST;
                }
                let d = declaration(DeclKind::Enum(Rc::new((**e).clone())), e.span);
                self.declare(&e.id.sym, flags, d, exported, ctx);
            }
            swc_ast::Decl::TsModule(module) => {
                self.bind_namespace(module, exported, doc_span, ctx);
            }
            swc_ast::Decl::Using(_) => {}
        }
    }

    fn bind_namespace(
        &mut self,
        module: &swc_ast::TsModuleDecl,
        exported: bool,
        doc_span: Span,
        ctx: BindContext,
    ) {
        let ambient = ctx.ambient || module.declare;

        if module.global {
            if let Some(swc_ast::TsNamespaceBody::TsModuleBlock(block)) = &module.body {
                let global_ctx = BindContext {
                    ambient: true,
                    global: true,
                    export_all: true,
                    ..ctx
                };
                self.bind_items(&block.body, global_ctx);
            }
            return;
        }

        let name = match &module.id {
            swc_ast::TsModuleName::Ident(ident) => ident.sym.to_string(),
            swc_ast::TsModuleName::Str(s) => {
                trace!(module = %wtf8_to_string(s), "Skipping ambient module declaration");
                return;
            }
        };

        let namespace = self.declare_namespace(&name, module.span, doc_span, exported, ambient, ctx);
        if let Some(body) = &module.body {
            self.bind_namespace_body(body, namespace, ambient, ctx);
        }
    }

    fn bind_namespace_body(
        &mut self,
        body: &swc_ast::TsNamespaceBody,
        namespace: SymbolId,
        ambient: bool,
        ctx: BindContext,
    ) {
        let inner = BindContext {
            container: namespace,
            ambient,
            global: false,
            export_all: ambient,
            ..ctx
        };
        match body {
            swc_ast::TsNamespaceBody::TsModuleBlock(block) => self.bind_items(&block.body, inner),
            swc_ast::TsNamespaceBody::TsNamespaceDecl(nested) => {
                let nested_ns = self.declare_namespace(
                    &nested.id.sym,
                    nested.span,
                    nested.span,
                    true,
                    ambient || nested.declare,
                    inner,
                );
                self.bind_namespace_body(&nested.body, nested_ns, ambient || nested.declare, inner);
            }
        }
    }

    fn declare_namespace(
        &mut self,
        name: &str,
        span: Span,
        doc_span: Span,
        exported: bool,
        ambient: bool,
        ctx: BindContext,
    ) -> SymbolId {
        let mut flags = SymbolFlags::NAMESPACE;
        if ambient {
            flags |= SymbolFlags::AMBIENT;
        }
        let declaration = Declaration {
            file: ctx.file,
            container: ctx.container,
            kind: DeclKind::Namespace,
            span,
            doc_span,
            ambient,
        };
        self.declare(name, flags, declaration, exported, ctx)
    }

    /// Add a declaration, merging with an existing symbol of the same name
    fn declare(
        &mut self,
        name: &str,
        flags: SymbolFlags,
        declaration: Declaration,
        exported: bool,
        ctx: BindContext,
    ) -> SymbolId {
        let existing = if ctx.global {
            self.table.globals.get(name).copied()
        } else {
            self.table.symbols[ctx.container.index()].locals.get(name).copied()
        };

        let id = match existing {
            Some(id) if can_merge(self.table.symbols[id.index()].flags, flags) => {
                let symbol = &mut self.table.symbols[id.index()];
                symbol.flags |= flags;
                symbol.declarations.push(declaration);
                id
            }
            Some(id) => {
                let file = self.program.file(declaration.file);
                let (line, col) = file.module.line_col(declaration.span.lo);
                self.table.diagnostics.push(
                    ProgramDiagnostic::error(
                        CODE_DUPLICATE_IDENTIFIER,
                        format!("Duplicate identifier '{}'.", name),
                    )
                    .in_file(&file.path)
                    .at(line, col),
                );
                return id;
            }
            None => {
                let id = self.new_symbol(name.to_string(), flags, ctx.file, Some(ctx.container));
                self.table.symbols[id.index()].declarations.push(declaration);
                self.insert_local(name, id, ctx);
                id
            }
        };

        if exported && !ctx.global {
            self.insert_export(name, id, ctx);
        }
        id
    }

    fn new_alias(&mut self, name: &str, target: AliasTarget, span: Span, ctx: BindContext) -> SymbolId {
        let id = self.new_symbol(name.to_string(), SymbolFlags::ALIAS, ctx.file, Some(ctx.container));
        let symbol = &mut self.table.symbols[id.index()];
        symbol.alias = Some(target);
        symbol.alias_span = Some(span);
        id
    }

    fn insert_local(&mut self, name: &str, id: SymbolId, ctx: BindContext) {
        if ctx.global {
            self.table.globals.entry(name.to_string()).or_insert(id);
        } else {
            self.table.symbols[ctx.container.index()]
                .locals
                .entry(name.to_string())
                .or_insert(id);
        }
    }

    fn insert_export(&mut self, name: &str, id: SymbolId, ctx: BindContext) {
        self.table.symbols[ctx.container.index()]
            .exports
            .entry(name.to_string())
            .or_insert(id);
    }

    fn module_ref(&self, file: FileId, specifier: &str) -> ModuleRef {
        match self.program.resolved_module(file, specifier) {
            Some(target) => ModuleRef::Resolved(target),
            None => ModuleRef::Unresolved(specifier.to_string()),
        }
    }
}

/// Merge rules for two declarations sharing a name
fn can_merge(existing: SymbolFlags, new: SymbolFlags) -> bool {
    let is_type_only = |f: SymbolFlags| {
        f.intersects(SymbolFlags::INTERFACE | SymbolFlags::TYPE_ALIAS) && !f.intersects(SymbolFlags::VALUE)
    };
    let is_value_only = |f: SymbolFlags| {
        f.intersects(SymbolFlags::VARIABLE | SymbolFlags::FUNCTION) && !f.intersects(SymbolFlags::TYPE)
    };

    if existing.contains(SymbolFlags::ALIAS) || new.contains(SymbolFlags::ALIAS) {
        return false;
    }
    if existing.contains(SymbolFlags::NAMESPACE) || new.contains(SymbolFlags::NAMESPACE) {
        return !existing.intersects(SymbolFlags::VARIABLE | SymbolFlags::TYPE_ALIAS)
            && !new.intersects(SymbolFlags::VARIABLE | SymbolFlags::TYPE_ALIAS);
    }
    let both = |f: SymbolFlags| existing.contains(f) && new.contains(f);
    if both(SymbolFlags::INTERFACE) || both(SymbolFlags::ENUM) {
        return true;
    }
    if both(SymbolFlags::FUNCTION) && !existing.intersects(SymbolFlags::VARIABLE) {
        return true;
    }
    if (existing.contains(SymbolFlags::INTERFACE) && new.contains(SymbolFlags::CLASS))
        || (existing.contains(SymbolFlags::CLASS) && new.contains(SymbolFlags::INTERFACE))
    {
        return true;
    }
    (is_type_only(existing) && is_value_only(new)) || (is_value_only(existing) && is_type_only(new))
}

fn unwrap_parens(expr: &swc_ast::Expr) -> &swc_ast::Expr {
    match expr {
        swc_ast::Expr::Paren(paren) => unwrap_parens(&paren.expr),
        other => other,
    }
}

/// Identifiers introduced by a binding pattern
pub fn collect_binding_names(pat: &swc_ast::Pat, names: &mut Vec<String>) {
    match pat {
        swc_ast::Pat::Ident(ident) => names.push(ident.id.sym.to_string()),
        swc_ast::Pat::Array(array) => {
            for elem in array.elems.iter().flatten() {
                collect_binding_names(elem, names);
            }
        }
        swc_ast::Pat::Object(object) => {
            for prop in &object.props {
                match prop {
                    swc_ast::ObjectPatProp::KeyValue(kv) => collect_binding_names(&kv.value, names),
                    swc_ast::ObjectPatProp::Assign(assign) => names.push(assign.key.sym.to_string()),
                    swc_ast::ObjectPatProp::Rest(rest) => collect_binding_names(&rest.arg, names),
                }
            }
        }
        swc_ast::Pat::Rest(rest) => collect_binding_names(&rest.arg, names),
        swc_ast::Pat::Assign(assign) => collect_binding_names(&assign.left, names),
        swc_ast::Pat::Expr(_) | swc_ast::Pat::Invalid(_) => {}
    }
}
