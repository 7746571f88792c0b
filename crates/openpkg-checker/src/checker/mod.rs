//! Type checker
//!
//! The `Checker` owns a program and its symbol table and answers type
//! queries over them. All caches use interior mutability so queries take
//! `&self`; the checker is single-threaded.
//!
//! ```text
//! Program ──bind──▶ SymbolTable ──▶ Checker
//!                                     ├─ nodes.rs       syntax -> TypeId
//!                                     ├─ symbols.rs     alias/export/value queries
//!                                     ├─ members.rs     properties, inheritance, mapping
//!                                     ├─ signatures.rs  call and construct signatures
//!                                     ├─ relate.rs      conditional types, assignability
//!                                     ├─ infer.rs       expression types, enum values
//!                                     └─ printer.rs     type-to-string
//! ```

mod infer;
mod members;
mod nodes;
mod printer;
mod relate;
mod signatures;
mod symbols;

use crate::binder::{Symbol, SymbolId, SymbolTable};
use crate::error::{ProgramDiagnostic, CODE_CANNOT_FIND_NAME};
use crate::program::{FileId, Program};
use crate::types::{
    AliasRef, EnumMember, IntrinsicKind, ObjectFlags, ObjectShape, ObjectType, ResolvedMembers,
    TypeData, TypeId, TypeRecord,
};
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::Span;
use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::mem::Discriminant;
use std::rc::Rc;
use tracing::debug;

/// Maximum nesting of type evaluation before giving up on a type
pub const MAX_EVALUATION_DEPTH: usize = 64;

/// Cache key for a type node evaluated under particular bindings
type NodeKey = (
    FileId,
    u32,
    u32,
    Discriminant<swc_ast::TsType>,
    Vec<(String, TypeId)>,
);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum LiteralKey {
    String(String),
    Number(u64),
    BigInt(String),
}

/// Pre-allocated intrinsic types
#[derive(Debug, Clone, Copy)]
pub struct Intrinsics {
    pub any: TypeId,
    pub unknown: TypeId,
    pub string: TypeId,
    pub number: TypeId,
    pub boolean: TypeId,
    pub bigint: TypeId,
    pub symbol: TypeId,
    pub unique_symbol: TypeId,
    pub void: TypeId,
    pub undefined: TypeId,
    pub null: TypeId,
    pub never: TypeId,
    pub object: TypeId,
    pub this: TypeId,
    pub true_type: TypeId,
    pub false_type: TypeId,
}

/// Declaration-level TypeScript type checker
pub struct Checker {
    program: Program,
    table: SymbolTable,
    intrinsics: Intrinsics,
    types: RefCell<Vec<TypeRecord>>,

    literals: RefCell<HashMap<LiteralKey, TypeId>>,
    unions: RefCell<HashMap<Vec<TypeId>, TypeId>>,
    intersections: RefCell<HashMap<Vec<TypeId>, TypeId>>,
    references: RefCell<HashMap<(SymbolId, Vec<TypeId>), TypeId>>,
    alias_instances: RefCell<HashMap<(SymbolId, Vec<TypeId>), TypeId>>,
    enum_literals: RefCell<HashMap<(SymbolId, String), TypeId>>,
    node_types: RefCell<HashMap<NodeKey, TypeId>>,

    declared_types: RefCell<HashMap<SymbolId, TypeId>>,
    value_types: RefCell<HashMap<SymbolId, TypeId>>,
    resolving_values: RefCell<HashSet<SymbolId>>,
    type_parameters: RefCell<HashMap<SymbolId, Rc<Vec<TypeId>>>>,

    members: RefCell<HashMap<TypeId, Rc<ResolvedMembers>>>,
    resolving_members: RefCell<HashSet<TypeId>>,
    base_types: RefCell<HashMap<TypeId, Rc<Vec<TypeId>>>>,
    module_exports: RefCell<HashMap<SymbolId, Rc<IndexMap<String, SymbolId>>>>,
    enum_members: RefCell<HashMap<SymbolId, Rc<Vec<EnumMember>>>>,
    relations: RefCell<HashMap<(TypeId, TypeId), Option<bool>>>,

    depth: Cell<usize>,
    diagnostics: RefCell<Vec<ProgramDiagnostic>>,
    reported: RefCell<HashSet<(FileId, u32, u32)>>,
}

/// Releases one level of evaluation depth when dropped
pub(crate) struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

impl Checker {
    /// Bind `program` and create a checker over it
    pub fn new(program: Program) -> Self {
        let table = SymbolTable::bind(&program);
        debug!(
            files = program.files().len(),
            symbols = table.symbols().len(),
            "Created checker"
        );

        let mut records = Vec::new();
        let mut intrinsic = |data: TypeData| {
            records.push(TypeRecord { data, alias: None });
            TypeId(records.len() as u32 - 1)
        };
        let intrinsics = Intrinsics {
            any: intrinsic(TypeData::Intrinsic(IntrinsicKind::Any)),
            unknown: intrinsic(TypeData::Intrinsic(IntrinsicKind::Unknown)),
            string: intrinsic(TypeData::Intrinsic(IntrinsicKind::String)),
            number: intrinsic(TypeData::Intrinsic(IntrinsicKind::Number)),
            boolean: intrinsic(TypeData::Intrinsic(IntrinsicKind::Boolean)),
            bigint: intrinsic(TypeData::Intrinsic(IntrinsicKind::BigInt)),
            symbol: intrinsic(TypeData::Intrinsic(IntrinsicKind::Symbol)),
            unique_symbol: intrinsic(TypeData::Intrinsic(IntrinsicKind::UniqueSymbol)),
            void: intrinsic(TypeData::Intrinsic(IntrinsicKind::Void)),
            undefined: intrinsic(TypeData::Intrinsic(IntrinsicKind::Undefined)),
            null: intrinsic(TypeData::Intrinsic(IntrinsicKind::Null)),
            never: intrinsic(TypeData::Intrinsic(IntrinsicKind::Never)),
            object: intrinsic(TypeData::Intrinsic(IntrinsicKind::Object)),
            this: intrinsic(TypeData::Intrinsic(IntrinsicKind::This)),
            true_type: intrinsic(TypeData::BooleanLiteral(true)),
            false_type: intrinsic(TypeData::BooleanLiteral(false)),
        };

        Self {
            program,
            table,
            intrinsics,
            types: RefCell::new(records),
            literals: RefCell::default(),
            unions: RefCell::default(),
            intersections: RefCell::default(),
            references: RefCell::default(),
            alias_instances: RefCell::default(),
            enum_literals: RefCell::default(),
            node_types: RefCell::default(),
            declared_types: RefCell::default(),
            value_types: RefCell::default(),
            resolving_values: RefCell::default(),
            type_parameters: RefCell::default(),
            members: RefCell::default(),
            resolving_members: RefCell::default(),
            base_types: RefCell::default(),
            module_exports: RefCell::default(),
            enum_members: RefCell::default(),
            relations: RefCell::default(),
            depth: Cell::new(0),
            diagnostics: RefCell::default(),
            reported: RefCell::default(),
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        self.table.symbol(id)
    }

    /// Module symbol of a file
    pub fn file_symbol(&self, file: FileId) -> SymbolId {
        self.table.file_symbol(file)
    }

    pub fn intrinsics(&self) -> Intrinsics {
        self.intrinsics
    }

    /// Number of types created so far
    pub fn type_count(&self) -> usize {
        self.types.borrow().len()
    }

    /// Program, binder and checker diagnostics in that order
    pub fn diagnostics(&self) -> Vec<ProgramDiagnostic> {
        let mut all = self.program.diagnostics().to_vec();
        all.extend(self.table.diagnostics().iter().cloned());
        all.extend(self.diagnostics.borrow().iter().cloned());
        all
    }

    // ---- arena ----

    pub(crate) fn alloc(&self, data: TypeData) -> TypeId {
        let mut types = self.types.borrow_mut();
        types.push(TypeRecord { data, alias: None });
        TypeId(types.len() as u32 - 1)
    }

    /// Structure of a type
    pub fn data(&self, id: TypeId) -> TypeData {
        self.types.borrow()[id.index()].data.clone()
    }

    pub fn record(&self, id: TypeId) -> TypeRecord {
        self.types.borrow()[id.index()].clone()
    }

    /// Alias a type was declared through, such as `Partial<User>`
    pub fn alias_of(&self, id: TypeId) -> Option<AliasRef> {
        self.types.borrow()[id.index()].alias.clone()
    }

    pub(crate) fn set_record(&self, id: TypeId, data: TypeData, alias: Option<AliasRef>) {
        let mut types = self.types.borrow_mut();
        types[id.index()] = TypeRecord { data, alias };
    }

    pub(crate) fn enter(&self) -> Option<DepthGuard<'_>> {
        let depth = self.depth.get();
        if depth >= MAX_EVALUATION_DEPTH {
            return None;
        }
        self.depth.set(depth + 1);
        Some(DepthGuard { depth: &self.depth })
    }

    // ---- type construction ----

    pub(crate) fn unresolved(&self, text: impl Into<String>) -> TypeId {
        self.alloc(TypeData::Unresolved(text.into()))
    }

    pub fn string_literal(&self, value: &str) -> TypeId {
        self.literal(LiteralKey::String(value.to_string()), || {
            TypeData::StringLiteral(value.to_string())
        })
    }

    pub fn number_literal(&self, value: f64) -> TypeId {
        self.literal(LiteralKey::Number(value.to_bits()), || TypeData::NumberLiteral(value))
    }

    pub fn bigint_literal(&self, value: &str) -> TypeId {
        self.literal(LiteralKey::BigInt(value.to_string()), || {
            TypeData::BigIntLiteral(value.to_string())
        })
    }

    pub fn boolean_literal(&self, value: bool) -> TypeId {
        if value {
            self.intrinsics.true_type
        } else {
            self.intrinsics.false_type
        }
    }

    fn literal(&self, key: LiteralKey, data: impl FnOnce() -> TypeData) -> TypeId {
        if let Some(id) = self.literals.borrow().get(&key) {
            return *id;
        }
        let id = self.alloc(data());
        self.literals.borrow_mut().insert(key, id);
        id
    }

    /// Union with nested unions flattened and duplicates removed, order kept
    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        let mut flat: Vec<TypeId> = Vec::new();
        for member in members {
            match self.data(member) {
                TypeData::Union(inner) => {
                    for id in inner {
                        if !flat.contains(&id) {
                            flat.push(id);
                        }
                    }
                }
                _ => {
                    if !flat.contains(&member) {
                        flat.push(member);
                    }
                }
            }
        }

        let i = self.intrinsics;
        if flat.contains(&i.any) {
            return i.any;
        }
        if flat.contains(&i.unknown) {
            return i.unknown;
        }
        flat.retain(|id| *id != i.never);

        // Literals are absorbed by their primitive
        let has = |id: TypeId| flat.contains(&id);
        let (has_string, has_number, has_boolean) = (has(i.string), has(i.number), has(i.boolean));
        if has_string || has_number || has_boolean {
            let types = self.types.borrow();
            flat.retain(|id| match &types[id.index()].data {
                TypeData::StringLiteral(_) | TypeData::TemplateLiteral(_) => !has_string,
                TypeData::NumberLiteral(_) => !has_number,
                TypeData::BooleanLiteral(_) => !has_boolean,
                _ => true,
            });
        }

        if let (Some(t), Some(f)) = (
            flat.iter().position(|id| *id == i.true_type),
            flat.iter().position(|id| *id == i.false_type),
        ) {
            let first = t.min(f);
            flat[first] = i.boolean;
            flat.retain(|id| *id != i.true_type && *id != i.false_type);
        }

        match flat.len() {
            0 => i.never,
            1 => flat[0],
            _ => {
                if let Some(id) = self.unions.borrow().get(&flat) {
                    return *id;
                }
                let id = self.alloc(TypeData::Union(flat.clone()));
                self.unions.borrow_mut().insert(flat, id);
                id
            }
        }
    }

    pub fn intersection(&self, members: Vec<TypeId>) -> TypeId {
        let mut flat: Vec<TypeId> = Vec::new();
        for member in members {
            match self.data(member) {
                TypeData::Intersection(inner) => {
                    for id in inner {
                        if !flat.contains(&id) {
                            flat.push(id);
                        }
                    }
                }
                _ => {
                    if !flat.contains(&member) {
                        flat.push(member);
                    }
                }
            }
        }

        let i = self.intrinsics;
        if flat.contains(&i.never) {
            return i.never;
        }
        if flat.contains(&i.any) {
            return i.any;
        }
        flat.retain(|id| *id != i.unknown);

        match flat.len() {
            0 => i.unknown,
            1 => flat[0],
            _ => {
                if let Some(id) = self.intersections.borrow().get(&flat) {
                    return *id;
                }
                let id = self.alloc(TypeData::Intersection(flat.clone()));
                self.intersections.borrow_mut().insert(flat, id);
                id
            }
        }
    }

    /// Instance type of a class or interface with the given type arguments
    pub fn type_reference(&self, symbol: SymbolId, arguments: Vec<TypeId>) -> TypeId {
        let arguments = self.fill_type_arguments(symbol, arguments);
        let key = (symbol, arguments.clone());
        if let Some(id) = self.references.borrow().get(&key) {
            return *id;
        }

        let sym = self.symbol(symbol);
        let mut flags = if sym.flags.contains(crate::binder::SymbolFlags::CLASS) {
            ObjectFlags::CLASS
        } else {
            ObjectFlags::INTERFACE
        };
        if !arguments.is_empty() {
            flags |= ObjectFlags::REFERENCE;
        }
        let id = self.alloc(TypeData::Object(ObjectType {
            flags,
            symbol: Some(symbol),
            type_arguments: arguments,
            shape: ObjectShape::Declared,
        }));
        self.references.borrow_mut().insert(key, id);
        id
    }

    /// Global symbol by name, e.g. `Array`
    pub fn global_symbol(&self, name: &str) -> Option<SymbolId> {
        self.table.global(name)
    }

    /// Reference to a global interface, or an unresolved placeholder
    pub fn global_type(&self, name: &str, arguments: Vec<TypeId>) -> TypeId {
        match self.global_symbol(name) {
            Some(symbol) => self.type_reference(symbol, arguments),
            None => self.unresolved(name),
        }
    }

    pub fn array_type(&self, element: TypeId) -> TypeId {
        self.global_type("Array", vec![element])
    }

    pub fn readonly_array_type(&self, element: TypeId) -> TypeId {
        self.global_type("ReadonlyArray", vec![element])
    }

    pub fn promise_type(&self, inner: TypeId) -> TypeId {
        self.global_type("Promise", vec![inner])
    }

    // ---- source access ----

    /// Source text covered by a span
    pub fn node_text(&self, file: FileId, span: Span) -> String {
        self.program
            .file(file)
            .module
            .text_for_span(span)
            .to_string()
    }

    /// 1-indexed line and 0-indexed column of a span start
    pub fn location(&self, file: FileId, span: Span) -> (usize, usize) {
        self.program.file(file).module.line_col(span.lo)
    }

    /// Raw JSDoc comment text (without `/*` and `*/`) leading a span
    pub fn jsdoc_for_span(&self, file: FileId, span: Span) -> Option<String> {
        self.program.file(file).module.jsdoc_for_span(span)
    }

    pub(crate) fn report_unresolved_name(&self, name: &str, file: FileId, span: Span) {
        let source = self.program.file(file);
        if !source.is_user_file() {
            return;
        }
        if !self.reported.borrow_mut().insert((file, span.lo.0, span.hi.0)) {
            return;
        }
        let (line, col) = source.module.line_col(span.lo);
        self.diagnostics.borrow_mut().push(
            ProgramDiagnostic::error(CODE_CANNOT_FIND_NAME, format!("Cannot find name '{}'.", name))
                .in_file(&source.path)
                .at(line, col),
        );
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_union_flattening_and_order() {
        let checker = checker_for("export {}");
        let i = checker.intrinsics();
        let a = checker.string_literal("a");
        let b = checker.string_literal("b");
        let inner = checker.union(vec![a, b]);
        let outer = checker.union(vec![i.number, inner, a, i.never]);
        match checker.data(outer) {
            TypeData::Union(members) => assert_eq!(members, vec![i.number, a, b]),
            other => panic!("expected union, got {:?}", other),
        }
        assert_eq!(checker.union(vec![a]), a);
        assert_eq!(checker.union(vec![]), i.never);
        assert_eq!(checker.union(vec![a, i.string]), i.string);
        assert_eq!(checker.union(vec![i.true_type, i.false_type]), i.boolean);
    }

    #[test]
    fn test_literals_are_interned() {
        let checker = checker_for("export {}");
        assert_eq!(checker.string_literal("x"), checker.string_literal("x"));
        assert_eq!(checker.number_literal(1.0), checker.number_literal(1.0));
        assert_ne!(checker.number_literal(1.0), checker.number_literal(2.0));
    }

    #[test]
    fn test_depth_guard_releases() {
        let checker = checker_for("export {}");
        {
            let _a = checker.enter().unwrap();
            let _b = checker.enter().unwrap();
            assert_eq!(checker.depth.get(), 2);
        }
        assert_eq!(checker.depth.get(), 0);
    }

    #[test]
    fn test_unresolved_names_are_reported() {
        let checker = checker_for("export type A = Missing;");
        assert_eq!(declared(&checker, "A"), "Missing");
        assert!(checker
            .diagnostics()
            .iter()
            .any(|d| d.code == CODE_CANNOT_FIND_NAME && d.message.contains("Missing")));
    }
}
