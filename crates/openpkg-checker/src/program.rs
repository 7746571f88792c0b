//! Program construction
//!
//! A program is the embedded standard library plus every file reachable
//! from the root files through imports and re-exports.

use crate::error::{
    CheckerError, CheckerResult, ProgramDiagnostic, CODE_CANNOT_FIND_MODULE, CODE_SYNTAX,
};
use crate::options::{normalize_path, CompilerOptions};
use crate::resolve::{is_declaration_file, resolve_module_name, OsHost, ProgramHost};
use crate::source::{parse_source, wtf8_to_string, ParsedModule};
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::Span;
use indexmap::IndexMap;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Virtual path of the embedded standard library
pub const LIB_FILE_NAME: &str = "/__openpkg__/lib.openpkg.d.ts";

const LIB_SOURCE: &str = include_str!("../lib/lib.openpkg.d.ts");

/// Index of a file inside a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    /// The embedded standard library is always the first file
    pub const LIB: FileId = FileId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One parsed file of the program
#[derive(Debug)]
pub struct SourceFile {
    pub id: FileId,
    pub path: PathBuf,
    pub module: ParsedModule,
    /// Top-level items, cloned once out of the parsed module
    pub items: Vec<swc_ast::ModuleItem>,
    pub is_lib: bool,
    /// Loaded from node_modules
    pub is_external: bool,
    pub is_declaration: bool,
}

impl SourceFile {
    /// Files whose declarations belong to the package being extracted
    pub fn is_user_file(&self) -> bool {
        !self.is_lib && !self.is_external
    }

    /// True when the file has no import or export statements
    pub fn is_script(&self) -> bool {
        !self
            .items
            .iter()
            .any(|item| matches!(item, swc_ast::ModuleItem::ModuleDecl(_)))
    }
}

/// A set of parsed files plus their import graph
#[derive(Debug)]
pub struct Program {
    files: Vec<SourceFile>,
    by_path: IndexMap<PathBuf, FileId>,
    roots: Vec<FileId>,
    resolutions: HashMap<(FileId, String), FileId>,
    pending: Vec<(FileId, String, PathBuf)>,
    diagnostics: Vec<ProgramDiagnostic>,
    options: CompilerOptions,
}

impl Program {
    /// Build a program from root files on disk
    pub fn new(root_files: &[PathBuf], options: CompilerOptions) -> CheckerResult<Self> {
        Self::with_host(root_files, options, &OsHost)
    }

    /// Build a program reading files through `host`
    pub fn with_host(
        root_files: &[PathBuf],
        options: CompilerOptions,
        host: &dyn ProgramHost,
    ) -> CheckerResult<Self> {
        let lib = parse_source(LIB_FILE_NAME, LIB_SOURCE)?;
        let mut program = Program {
            files: Vec::new(),
            by_path: IndexMap::new(),
            roots: Vec::new(),
            resolutions: HashMap::new(),
            pending: Vec::new(),
            diagnostics: Vec::new(),
            options,
        };
        program.push_file(PathBuf::from(LIB_FILE_NAME), lib, true, false);

        let mut queue: VecDeque<(PathBuf, bool)> = VecDeque::new();
        for root in root_files {
            queue.push_back((absolutize(root), false));
        }
        let root_paths: Vec<PathBuf> = queue.iter().map(|(p, _)| p.clone()).collect();

        while let Some((path, is_external)) = queue.pop_front() {
            if program.by_path.contains_key(&path) {
                continue;
            }
            let is_root = root_paths.contains(&path);

            let text = match host.read_file(&path) {
                Ok(text) => text,
                Err(e) if is_root => {
                    return Err(CheckerError::Read {
                        path,
                        message: e.to_string(),
                    })
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read imported file");
                    continue;
                }
            };

            let module = match parse_source(&path, text) {
                Ok(module) => module,
                Err(e) => {
                    program.diagnostics.push(
                        ProgramDiagnostic::error(CODE_SYNTAX, e.to_string()).in_file(&path),
                    );
                    continue;
                }
            };

            for message in module.syntax_errors() {
                program
                    .diagnostics
                    .push(ProgramDiagnostic::error(CODE_SYNTAX, message).in_file(&path));
            }

            let id = program.push_file(path.clone(), module, false, is_external);
            if is_root {
                program.roots.push(id);
            }
            debug!(path = %path.display(), file = id.0, "Loaded source file");

            let specifiers = collect_module_specifiers(&program.files[id.index()].items);
            for (specifier, span) in specifiers {
                match resolve_module_name(&specifier, &path, &program.options, host) {
                    Some(resolved) => {
                        let resolved_path = resolved.path.clone();
                        if let Some(existing) = program.by_path.get(&resolved_path) {
                            program.resolutions.insert((id, specifier), *existing);
                        } else {
                            // Resolved lazily once the target file is loaded
                            program.pending_resolution(id, specifier, resolved_path.clone());
                            queue.push_back((resolved_path, is_external || resolved.is_external));
                        }
                    }
                    None => {
                        let (line, col) = program.files[id.index()].module.line_col(span.lo);
                        program.diagnostics.push(
                            ProgramDiagnostic::error(
                                CODE_CANNOT_FIND_MODULE,
                                format!(
                                    "Cannot find module '{}' or its corresponding type declarations.",
                                    specifier
                                ),
                            )
                            .in_file(&path)
                            .at(line, col),
                        );
                    }
                }
            }
        }

        program.link_pending();

        if program.roots.is_empty() {
            return Err(CheckerError::EmptyProgram);
        }
        Ok(program)
    }

    fn push_file(
        &mut self,
        path: PathBuf,
        module: ParsedModule,
        is_lib: bool,
        is_external: bool,
    ) -> FileId {
        let id = FileId(self.files.len() as u32);
        let items = module.items();
        let is_declaration = is_lib || is_declaration_file(&path);
        self.by_path.insert(path.clone(), id);
        self.files.push(SourceFile {
            id,
            path,
            module,
            items,
            is_lib,
            is_external,
            is_declaration,
        });
        id
    }

    fn pending_resolution(&mut self, from: FileId, specifier: String, target: PathBuf) {
        self.pending.push((from, specifier, target));
    }

    fn link_pending(&mut self) {
        for (from, specifier, target) in std::mem::take(&mut self.pending) {
            if let Some(id) = self.by_path.get(&target) {
                self.resolutions.insert((from, specifier), *id);
            }
        }
    }

    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.index()]
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Non-lib, non-external files in load order
    pub fn user_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter().filter(|f| f.is_user_file())
    }

    pub fn file_by_path(&self, path: &Path) -> Option<&SourceFile> {
        self.by_path
            .get(&absolutize(path))
            .map(|id| &self.files[id.index()])
    }

    pub fn root_files(&self) -> &[FileId] {
        &self.roots
    }

    /// The file an import specifier in `from` resolved to
    pub fn resolved_module(&self, from: FileId, specifier: &str) -> Option<FileId> {
        self.resolutions.get(&(from, specifier.to_string())).copied()
    }

    pub fn diagnostics(&self) -> &[ProgramDiagnostic] {
        &self.diagnostics
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }
}

/// Make a path absolute against the current directory and normalize it
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        normalize_path(&cwd.join(path))
    }
}

/// Every module specifier a file imports or re-exports from
pub fn collect_module_specifiers(items: &[swc_ast::ModuleItem]) -> Vec<(String, Span)> {
    let mut specifiers: Vec<(String, Span)> = Vec::new();
    let mut push = |src: &swc_ast::Str, span: Span| {
        let value = wtf8_to_string(src);
        if !specifiers.iter().any(|(s, _)| *s == value) {
            specifiers.push((value, span));
        }
    };

    for item in items {
        match item {
            swc_ast::ModuleItem::ModuleDecl(decl) => match decl {
                swc_ast::ModuleDecl::Import(import) => push(&import.src, import.span),
                swc_ast::ModuleDecl::ExportNamed(named) => {
                    if let Some(src) = &named.src {
                        push(src, named.span);
                    }
                }
                swc_ast::ModuleDecl::ExportAll(all) => push(&all.src, all.span),
                swc_ast::ModuleDecl::TsImportEquals(equals) => {
                    if let swc_ast::TsModuleRef::TsExternalModuleRef(ext) = &equals.module_ref {
                        push(&ext.expr, equals.span);
                    }
                }
                _ => {}
            },
            swc_ast::ModuleItem::Stmt(_) => {}
        }
    }
    specifiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::MemoryHost;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_program_follows_imports() {
        let host = MemoryHost::new()
            .with_file(
                "/pkg/src/index.ts",
                "export { User } from './user';\nexport * from './util';\nimport { x } from './missing';",
            )
            .with_file("/pkg/src/user.ts", "export interface User { id: string }")
            .with_file("/pkg/src/util.ts", "export const VERSION = '1.0';");

        let program = Program::with_host(
            &[PathBuf::from("/pkg/src/index.ts")],
            CompilerOptions::default(),
            &host,
        )
        .unwrap();

        assert_eq!(program.files().len(), 4);
        assert!(program.file(FileId::LIB).is_lib);
        assert_eq!(program.root_files(), &[FileId(1)]);

        let user = program.file_by_path(Path::new("/pkg/src/user.ts")).unwrap();
        assert_eq!(program.resolved_module(FileId(1), "./user"), Some(user.id));

        let missing: Vec<_> = program
            .diagnostics()
            .iter()
            .filter(|d| d.code == CODE_CANNOT_FIND_MODULE)
            .collect();
        assert_eq!(missing.len(), 1);
        assert!(missing[0].message.contains("./missing"));
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let host = MemoryHost::new();
        let result = Program::with_host(
            &[PathBuf::from("/pkg/missing.ts")],
            CompilerOptions::default(),
            &host,
        );
        assert!(matches!(result, Err(CheckerError::Read { .. })));
    }

    #[test]
    fn test_lib_parses() {
        let lib = parse_source(LIB_FILE_NAME, LIB_SOURCE).unwrap();
        assert!(lib.syntax_errors().is_empty());
        assert!(!lib.items().is_empty());
    }
}
