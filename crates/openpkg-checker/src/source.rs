//! SWC/deno_ast TypeScript parsing utilities
//!
//! Parsing goes through deno_ast, which wraps SWC. This module handles:
//! - Parsing TypeScript and declaration files
//! - JSDoc lookup through leading comments
//! - Line/column and source text for spans

use crate::error::{CheckerError, CheckerResult};
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::comments::{Comment, CommentKind};
use deno_ast::swc::common::{BytePos, Span};
use deno_ast::{MediaType, ParseParams, ParsedSource, SourcePos, SourceTextInfo, StartSourcePos};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source text of one file plus line lookup information
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub path: PathBuf,
    pub text: Arc<str>,
    pub text_info: SourceTextInfo,
}

impl SourceInfo {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<Arc<str>>) -> Self {
        let text: Arc<str> = text.into();
        let text_info = SourceTextInfo::new(text.clone());
        Self {
            path: path.into(),
            text,
            text_info,
        }
    }

    /// Convert a byte position to a 1-indexed line and 0-indexed column
    pub fn line_col(&self, pos: BytePos) -> (usize, usize) {
        let source_pos = SourcePos::unsafely_from_byte_pos(pos);
        let line_and_col = self.text_info.line_and_column_index(source_pos);
        (line_and_col.line_index + 1, line_and_col.column_index)
    }

    /// Source text covered by `span`, empty when the span is out of range
    pub fn text_for_span(&self, span: Span) -> &str {
        let start = byte_index(span.lo).min(self.text.len());
        let end = byte_index(span.hi).clamp(start, self.text.len());
        self.text.get(start..end).unwrap_or("")
    }
}

/// Byte offset of an SWC position inside its file
pub fn byte_index(pos: BytePos) -> usize {
    SourcePos::unsafely_from_byte_pos(pos).as_byte_index(StartSourcePos::START_SOURCE_POS)
}

/// A parsed TypeScript module
#[derive(Debug)]
pub struct ParsedModule {
    pub source: ParsedSource,
    pub source_info: SourceInfo,
}

impl ParsedModule {
    /// Top-level items; scripts are exposed as plain statements
    pub fn items(&self) -> Vec<swc_ast::ModuleItem> {
        match self.source.program_ref() {
            deno_ast::ProgramRef::Module(m) => m.body.clone(),
            deno_ast::ProgramRef::Script(s) => s
                .body
                .iter()
                .cloned()
                .map(swc_ast::ModuleItem::Stmt)
                .collect(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.source_info.path
    }

    pub fn source_text(&self) -> &str {
        &self.source_info.text
    }

    pub fn text_for_span(&self, span: Span) -> &str {
        self.source_info.text_for_span(span)
    }

    pub fn line_col(&self, pos: BytePos) -> (usize, usize) {
        self.source_info.line_col(pos)
    }

    /// Get leading comments for a position
    pub fn leading_comments(&self, pos: BytePos) -> Vec<Comment> {
        let source_pos = SourcePos::unsafely_from_byte_pos(pos);
        self.source
            .comments()
            .get_leading(source_pos)
            .map(|v| v.to_vec())
            .unwrap_or_default()
    }

    /// The closest `/** ... */` comment before `span`
    pub fn jsdoc_for_span(&self, span: Span) -> Option<String> {
        self.leading_comments(span.lo)
            .iter()
            .rev()
            .find(|c| c.kind == CommentKind::Block && c.text.starts_with('*'))
            .map(|c| c.text.to_string())
    }

    /// Messages of recoverable syntax errors
    pub fn syntax_errors(&self) -> Vec<String> {
        self.source
            .diagnostics()
            .iter()
            .map(|d| d.to_string())
            .collect()
    }
}

/// Parse TypeScript source code for `path`
pub fn parse_source(path: impl AsRef<Path>, source: impl Into<Arc<str>>) -> CheckerResult<ParsedModule> {
    let path = path.as_ref();
    let source: Arc<str> = source.into();
    let media_type = MediaType::from_path(path);

    // deno_ast requires absolute paths for file specifiers
    let specifier = deno_ast::ModuleSpecifier::from_file_path(path)
        .map_err(|_| CheckerError::InvalidPath(path.display().to_string()))?;

    let parsed = deno_ast::parse_module(ParseParams {
        specifier,
        text: source.clone(),
        media_type,
        capture_tokens: false,
        scope_analysis: false,
        maybe_syntax: None,
    })
    .map_err(|e| CheckerError::parse(path, e.to_string()))?;

    Ok(ParsedModule {
        source: parsed,
        source_info: SourceInfo::new(path, source),
    })
}

/// Convert a string literal to an owned string
pub fn wtf8_to_string(s: &swc_ast::Str) -> String {
    String::from_utf8_lossy(s.value.as_bytes()).into_owned()
}

/// Name of an import/export specifier
pub fn module_export_name(name: &swc_ast::ModuleExportName) -> String {
    match name {
        swc_ast::ModuleExportName::Ident(i) => i.sym.to_string(),
        swc_ast::ModuleExportName::Str(s) => wtf8_to_string(s),
    }
}

/// Get the name of a property key
pub fn prop_name_str(name: &swc_ast::PropName) -> Option<String> {
    match name {
        swc_ast::PropName::Ident(i) => Some(i.sym.to_string()),
        swc_ast::PropName::Str(s) => Some(wtf8_to_string(s)),
        swc_ast::PropName::Num(n) => Some(format_number(n.value)),
        swc_ast::PropName::BigInt(b) => Some(b.value.to_string()),
        swc_ast::PropName::Computed(c) => expr_to_name(&c.expr).map(|n| format!("[{}]", n)),
    }
}

/// Get the name of a type member key (`foo`, `"foo"`, `0`, `[Symbol.iterator]`)
pub fn key_expr_name(key: &swc_ast::Expr, computed: bool) -> Option<String> {
    match key {
        swc_ast::Expr::Ident(i) if !computed => Some(i.sym.to_string()),
        swc_ast::Expr::Lit(swc_ast::Lit::Str(s)) => Some(wtf8_to_string(s)),
        swc_ast::Expr::Lit(swc_ast::Lit::Num(n)) => Some(format_number(n.value)),
        other => expr_to_name(other).map(|n| format!("[{}]", n)),
    }
}

/// Get a dotted name from an expression (`Symbol.iterator`, `ns.Base`)
pub fn expr_to_name(expr: &swc_ast::Expr) -> Option<String> {
    match expr {
        swc_ast::Expr::Ident(i) => Some(i.sym.to_string()),
        swc_ast::Expr::Lit(swc_ast::Lit::Str(s)) => Some(wtf8_to_string(s)),
        swc_ast::Expr::Lit(swc_ast::Lit::Num(n)) => Some(format_number(n.value)),
        swc_ast::Expr::Member(m) => {
            let obj = expr_to_name(&m.obj)?;
            let prop = match &m.prop {
                swc_ast::MemberProp::Ident(i) => i.sym.to_string(),
                swc_ast::MemberProp::Computed(c) => expr_to_name(&c.expr)?,
                swc_ast::MemberProp::PrivateName(p) => format!("#{}", p.name),
            };
            Some(format!("{}.{}", obj, prop))
        }
        _ => None,
    }
}

/// Format a qualified name (e.g., Namespace.Type)
pub fn entity_name(name: &swc_ast::TsEntityName) -> String {
    match name {
        swc_ast::TsEntityName::Ident(i) => i.sym.to_string(),
        swc_ast::TsEntityName::TsQualifiedName(q) => {
            format!("{}.{}", entity_name(&q.left), q.right.sym)
        }
    }
}

/// Format a number the way TypeScript prints numeric literals
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source() {
        let source = r#"
            /**
             * Reads a file as text
             * @param path - The file path
             */
            export async function readTextFile(path: string): Promise<string> {
                return "";
            }
        "#;

        let parsed = parse_source("/tmp/test.ts", source).unwrap();
        assert_eq!(parsed.items().len(), 1);
    }

    #[test]
    fn test_jsdoc_and_text_for_span() {
        let source = r#"
/**
 * This is a JSDoc comment
 */
export type Id = string | number;
"#;

        let parsed = parse_source("/tmp/test.ts", source).unwrap();
        let items = parsed.items();
        if let Some(swc_ast::ModuleItem::ModuleDecl(swc_ast::ModuleDecl::ExportDecl(export))) =
            items.first()
        {
            let jsdoc = parsed.jsdoc_for_span(export.span).unwrap();
            assert!(jsdoc.contains("This is a JSDoc comment"));

            if let swc_ast::Decl::TsTypeAlias(alias) = &export.decl {
                let text = parsed.text_for_span(deno_ast::swc::common::Spanned::span(
                    alias.type_ann.as_ref(),
                ));
                assert_eq!(text, "string | number");
            } else {
                panic!("expected a type alias");
            }

            let (line, _) = parsed.line_col(export.span.lo);
            assert_eq!(line, 5);
        } else {
            panic!("expected an export declaration");
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-1.0), "-1");
        assert_eq!(format_number(1.5), "1.5");
    }
}
