//! openpkg-spec: the OpenPkg specification document model
//!
//! This crate holds the data that crosses the boundary between the
//! extraction engine and everything downstream of it:
//! - `SpecDocument` with its `meta`, `exports[]` and `types[]`
//! - `TypeSchema`, the reference-or-inline type description
//! - `ResolvedType` trees embedded as `expandedType`
//! - `$ref` validation helpers
//!
//! ```text
//! ┌────────────────┐   extract()   ┌──────────────┐   read-only   ┌───────────┐
//! │ TypeScript pkg │ ────────────▶ │ SpecDocument │ ────────────▶ │ renderers │
//! └────────────────┘               └──────────────┘               └───────────┘
//! ```

pub mod document;
pub mod refs;
pub mod resolved;
pub mod schema;

pub use document::{
    ExportKind, MemberKind, SourceLocation, SpecDocument, SpecExport, SpecFlags, SpecMember,
    SpecMeta, SpecParameter, SpecProperty, SpecReturn, SpecSignature, SpecTag, SpecType,
    SpecTypeParameter, TypeHierarchy, ECOSYSTEM, OPENPKG_VERSION,
};
pub use refs::{collect_refs, dangling_refs, validate, RefIssue};
pub use resolved::{
    ExpandedType, FunctionSignatureInfo, ParameterInfo, PropertyInfo, ResolvedType, Visibility,
    PRIMITIVE_NAMES, TRUNCATED,
};
pub use schema::{TypeSchema, REF_PREFIX};
