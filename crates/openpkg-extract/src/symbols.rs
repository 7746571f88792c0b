//! Symbol and documentation resolution
//!
//! Follows import and export aliases to canonical symbols, and turns the
//! JSDoc comments attached to declarations into `JsDocInfo`. Symbol
//! documentation is cached in the session's type cache by symbol identity.

use crate::cache::SymbolKey;
use crate::js_doc::JsDocInfo;
use crate::session::Session;
use deno_ast::swc::common::Span;
use openpkg_checker::{FileId, MemberDecl, SymbolId};
use openpkg_spec::SourceLocation;
use std::path::Path;
use tracing::trace;

/// Symbol queries over one session
pub struct SymbolResolver<'s> {
    session: &'s Session,
}

impl<'s> SymbolResolver<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self { session }
    }

    /// Canonical symbol behind an import, re-export or namespace alias
    ///
    /// `None` when the chain leaves the program or loops.
    pub fn resolve_symbol(&self, symbol: SymbolId) -> Option<SymbolId> {
        let checker = self.session.checker();
        let resolved = checker.resolve_alias(symbol);
        if resolved != Some(symbol) {
            trace!(
                name = %checker.symbol(symbol).name,
                resolved = ?resolved.map(|id| &checker.symbol(id).name),
                "Resolved alias"
            );
        }
        resolved
    }

    /// Identity of a symbol for documentation caching
    pub fn symbol_key(&self, symbol: SymbolId) -> SymbolKey {
        let checker = self.session.checker();
        let sym = checker.symbol(symbol);
        let (file, offset) = match sym.declarations.first() {
            Some(decl) => (decl.file, decl.span.lo.0),
            None => (sym.file, 0),
        };
        SymbolKey {
            name: sym.name.clone(),
            flags: sym.flags.bits(),
            file: checker.program().file(file).path.clone(),
            offset,
        }
    }

    /// Documentation of the first documented declaration of a symbol
    pub fn extract_documentation(&self, symbol: SymbolId) -> JsDocInfo {
        let symbol = self.resolve_symbol(symbol).unwrap_or(symbol);
        let key = self.symbol_key(symbol);
        self.session.cache().get_or_resolve(key, || {
            let checker = self.session.checker();
            checker
                .symbol(symbol)
                .declarations
                .iter()
                .find_map(|decl| checker.jsdoc_for_span(decl.file, decl.doc_span))
                .map(|comment| JsDocInfo::parse(&comment))
                .unwrap_or_default()
        })
    }

    /// Documentation leading a syntax node
    pub fn documentation_for_span(&self, file: FileId, span: Span) -> JsDocInfo {
        self.session
            .checker()
            .jsdoc_for_span(file, span)
            .map(|comment| JsDocInfo::parse(&comment))
            .unwrap_or_default()
    }

    /// Documentation of an object member or signature
    pub fn documentation_for_member(&self, decl: Option<&MemberDecl>) -> JsDocInfo {
        match decl {
            Some(decl) => self.documentation_for_span(decl.file, decl.doc_span),
            None => JsDocInfo::default(),
        }
    }

    /// True when the symbol's declarations merge into one entity
    pub fn is_declaration_merge(&self, symbol: SymbolId) -> bool {
        let symbol = self.resolve_symbol(symbol).unwrap_or(symbol);
        self.session.checker().symbol(symbol).is_declaration_merge()
    }

    /// Where a symbol is declared, relative to `root` when it lies below it
    pub fn source_location(&self, symbol: SymbolId, root: Option<&Path>) -> Option<SourceLocation> {
        let checker = self.session.checker();
        let decl = checker.symbol(symbol).value_declaration()?;
        let (line, _) = checker.location(decl.file, decl.span);
        let path = &checker.program().file(decl.file).path;
        let relative = root
            .and_then(|root| path.strip_prefix(root).ok())
            .unwrap_or(path);
        Some(SourceLocation {
            file: relative.to_string_lossy().replace('\\', "/"),
            line,
        })
    }
}
