//! `$ref` collection and validation
//!
//! A document is well formed when every `$ref` names exactly one entry of
//! `types[]` and type ids are unique.

use crate::document::SpecDocument;
use crate::schema::REF_PREFIX;
use indexmap::IndexMap;
use serde_json::Value;

/// A problem found while validating references
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefIssue {
    /// A `$ref` whose target id is not in `types[]`
    Dangling { reference: String },
    /// A `$ref` that does not start with `#/types/`
    Malformed { reference: String },
    /// A type id that appears more than once
    DuplicateId { id: String, count: usize },
}

impl std::fmt::Display for RefIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefIssue::Dangling { reference } => write!(f, "dangling reference {}", reference),
            RefIssue::Malformed { reference } => write!(f, "malformed reference {}", reference),
            RefIssue::DuplicateId { id, count } => {
                write!(f, "type id {} appears {} times", id, count)
            }
        }
    }
}

/// Collect every `$ref` string in the document, in document order
pub fn collect_refs(doc: &SpecDocument) -> serde_json::Result<Vec<String>> {
    let value = serde_json::to_value(doc)?;
    let mut refs = Vec::new();
    walk(&value, &mut refs);
    Ok(refs)
}

fn walk(value: &Value, refs: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "$ref" {
                    if let Value::String(s) = child {
                        refs.push(s.clone());
                    }
                } else {
                    walk(child, refs);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, refs);
            }
        }
        _ => {}
    }
}

/// `$ref` targets that have no matching `types[]` entry
pub fn dangling_refs(doc: &SpecDocument) -> serde_json::Result<Vec<String>> {
    Ok(validate(doc)?
        .into_iter()
        .filter_map(|issue| match issue {
            RefIssue::Dangling { reference } => Some(reference),
            _ => None,
        })
        .collect())
}

/// Check every reference and id in the document
pub fn validate(doc: &SpecDocument) -> serde_json::Result<Vec<RefIssue>> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for ty in &doc.types {
        *counts.entry(ty.id.as_str()).or_default() += 1;
    }

    let mut issues: Vec<RefIssue> = counts
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(id, count)| RefIssue::DuplicateId {
            id: id.to_string(),
            count: *count,
        })
        .collect();

    for reference in collect_refs(doc)? {
        match reference.strip_prefix(REF_PREFIX) {
            Some(id) if counts.contains_key(id) => {}
            Some(_) => issues.push(RefIssue::Dangling { reference }),
            None => issues.push(RefIssue::Malformed { reference }),
        }
    }

    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ExportKind, SpecExport, SpecMeta, SpecType};
    use crate::schema::TypeSchema;

    fn doc_with_ref(target: &str) -> SpecDocument {
        let mut doc = SpecDocument::new(SpecMeta::named("pkg"));
        let mut export = SpecExport::new("current", "current", ExportKind::Variable);
        export.ty = Some(TypeSchema::reference(target));
        doc.exports.push(export);
        doc.types
            .push(SpecType::new("User", "User", ExportKind::Interface));
        doc
    }

    #[test]
    fn test_resolvable_ref_is_valid() {
        let doc = doc_with_ref("User");
        assert_eq!(collect_refs(&doc).unwrap(), vec!["#/types/User"]);
        assert!(validate(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_dangling_ref_is_reported() {
        let doc = doc_with_ref("Account");
        assert_eq!(dangling_refs(&doc).unwrap(), vec!["#/types/Account"]);
    }

    #[test]
    fn test_duplicate_ids_are_reported() {
        let mut doc = doc_with_ref("User");
        doc.types
            .push(SpecType::new("User", "User", ExportKind::Interface));
        let issues = validate(&doc).unwrap();
        assert!(issues.contains(&RefIssue::DuplicateId {
            id: "User".to_string(),
            count: 2
        }));
    }
}
