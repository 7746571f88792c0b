//! JSDoc parsing and representation
//!
//! Turns the raw text of a `/** ... */` comment into a `JsDocInfo`: the
//! free-text description, parameter docs, return docs, examples,
//! deprecation, `@since`, `@see`, and every other tag as a `JsDocTag`.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use openpkg_spec::SpecTag;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Regex for {@link ...} references
    static ref LINK_REGEX: Regex = Regex::new(
        r"\{@(link|linkcode|linkplain)\s+([^}|\s]+)(?:\s*\|\s*|\s+)?([^}]*)\}"
    ).unwrap();

    /// `<caption>...</caption>` at the start of an example
    static ref CAPTION_REGEX: Regex = Regex::new(
        r"(?s)^\s*<caption>(.*?)</caption>\s*"
    ).unwrap();
}

/// Documentation attached to one declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsDocInfo {
    /// Main description text
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,

    /// `@param` docs by parameter name
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub params: IndexMap<String, String>,

    /// `@returns` text
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub returns: Option<String>,

    /// `@example` bodies, captions stripped
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub examples: Vec<String>,

    #[serde(default)]
    pub deprecated: bool,

    /// Text after `@deprecated`
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deprecation: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub since: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub see: Vec<String>,

    /// Tags without a dedicated field above
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<JsDocTag>,
}

impl JsDocInfo {
    /// Create a new empty doc
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from description only
    pub fn from_description(desc: impl Into<String>) -> Self {
        Self {
            description: Some(desc.into()),
            ..Default::default()
        }
    }

    /// Parse a comment, with or without its `/**` and `*/` delimiters
    pub fn parse(comment: &str) -> Self {
        let cleaned = clean_jsdoc_comment(comment);
        let mut info = Self {
            description: extract_description(&cleaned),
            ..Default::default()
        };

        for tag in parse_tags(&cleaned) {
            match tag {
                JsDocTag::Param { name, doc, .. } => {
                    info.params.insert(name, doc.unwrap_or_default());
                }
                JsDocTag::Returns { doc, .. } => {
                    info.returns = doc.or(Some(String::new()));
                }
                JsDocTag::Example { doc, .. } => info.examples.push(doc),
                JsDocTag::Deprecated { doc } => {
                    info.deprecated = true;
                    info.deprecation = doc;
                }
                JsDocTag::Since { version } => info.since = Some(version),
                JsDocTag::See { reference } => info.see.push(reference),
                other => info.tags.push(other),
            }
        }

        info
    }

    /// Check if this doc is empty
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.params.is_empty()
            && self.returns.is_none()
            && self.examples.is_empty()
            && !self.deprecated
            && self.since.is_none()
            && self.see.is_empty()
            && self.tags.is_empty()
    }

    /// Get the main description
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Doc text of one parameter, if it has any
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|doc| !doc.is_empty())
    }

    /// `@returns` text, if it has any
    pub fn returns_doc(&self) -> Option<&str> {
        self.returns.as_deref().filter(|doc| !doc.is_empty())
    }

    /// Check if marked @internal
    pub fn is_internal(&self) -> bool {
        self.tags.iter().any(|t| matches!(t, JsDocTag::Internal))
    }

    /// `{@link target}` targets in the description
    pub fn links(&self) -> Vec<String> {
        self.description
            .as_deref()
            .map(|d| {
                LINK_REGEX
                    .captures_iter(d)
                    .map(|c| c[2].to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Tags in document form: deprecation, `@since`, `@see`, then the rest
    pub fn spec_tags(&self) -> Vec<SpecTag> {
        let mut tags = Vec::new();
        if self.deprecated {
            tags.push(SpecTag::new(
                "deprecated",
                self.deprecation.clone().unwrap_or_default(),
            ));
        }
        if let Some(since) = &self.since {
            tags.push(SpecTag::new("since", since.clone()));
        }
        for see in &self.see {
            tags.push(SpecTag::new("see", see.clone()));
        }
        tags.extend(self.tags.iter().map(JsDocTag::to_spec_tag));
        tags
    }

    /// Merge documentation of several declarations; the first non-empty
    /// description wins and everything else is concatenated
    pub fn merge(docs: impl IntoIterator<Item = JsDocInfo>) -> Self {
        let mut merged = Self::default();
        for doc in docs {
            if merged.description.is_none() {
                merged.description = doc.description;
            }
            for (name, text) in doc.params {
                merged.params.entry(name).or_insert(text);
            }
            if merged.returns.is_none() {
                merged.returns = doc.returns;
            }
            merged.examples.extend(doc.examples);
            if doc.deprecated && !merged.deprecated {
                merged.deprecated = true;
                merged.deprecation = doc.deprecation;
            }
            if merged.since.is_none() {
                merged.since = doc.since;
            }
            merged.see.extend(doc.see);
            merged.tags.extend(doc.tags);
        }
        merged
    }
}

/// JSDoc tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum JsDocTag {
    /// @param {type} name - description
    #[serde(rename_all = "camelCase")]
    Param {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_ref: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        doc: Option<String>,
        #[serde(default)]
        optional: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },

    /// @returns {type} description
    #[serde(rename_all = "camelCase")]
    Returns {
        #[serde(skip_serializing_if = "Option::is_none")]
        type_ref: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        doc: Option<String>,
    },

    /// @example
    #[serde(rename_all = "camelCase")]
    Example {
        doc: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },

    /// @deprecated message
    Deprecated {
        #[serde(skip_serializing_if = "Option::is_none")]
        doc: Option<String>,
    },

    /// @see reference
    See { reference: String },

    /// @since version
    Since { version: String },

    /// @category name
    Category { name: String },

    /// @internal
    Internal,

    /// @experimental or @beta
    Experimental,

    /// @throws {type} description
    #[serde(rename_all = "camelCase")]
    Throws {
        #[serde(skip_serializing_if = "Option::is_none")]
        type_ref: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        doc: Option<String>,
    },

    /// @template T - description
    Template {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        constraint: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        doc: Option<String>,
    },

    /// @default value
    Default { value: String },

    /// Unknown/custom tag
    Unknown { tag: String, value: String },
}

impl JsDocTag {
    /// Tag name without the `@`
    pub fn name(&self) -> &str {
        match self {
            JsDocTag::Param { .. } => "param",
            JsDocTag::Returns { .. } => "returns",
            JsDocTag::Example { .. } => "example",
            JsDocTag::Deprecated { .. } => "deprecated",
            JsDocTag::See { .. } => "see",
            JsDocTag::Since { .. } => "since",
            JsDocTag::Category { .. } => "category",
            JsDocTag::Internal => "internal",
            JsDocTag::Experimental => "experimental",
            JsDocTag::Throws { .. } => "throws",
            JsDocTag::Template { .. } => "template",
            JsDocTag::Default { .. } => "default",
            JsDocTag::Unknown { tag, .. } => tag,
        }
    }

    /// Tag body as written, minus the tag name
    pub fn text(&self) -> String {
        match self {
            JsDocTag::Param { name, doc, .. } => join_text(name, doc.as_deref()),
            JsDocTag::Returns { type_ref, doc } | JsDocTag::Throws { type_ref, doc } => {
                let ty = type_ref.as_ref().map(|t| format!("{{{}}}", t));
                match (ty, doc) {
                    (Some(ty), Some(doc)) => format!("{} {}", ty, doc),
                    (Some(ty), None) => ty,
                    (None, Some(doc)) => doc.clone(),
                    (None, None) => String::new(),
                }
            }
            JsDocTag::Example { doc, .. } => doc.clone(),
            JsDocTag::Deprecated { doc } => doc.clone().unwrap_or_default(),
            JsDocTag::See { reference } => reference.clone(),
            JsDocTag::Since { version } => version.clone(),
            JsDocTag::Category { name } => name.clone(),
            JsDocTag::Internal | JsDocTag::Experimental => String::new(),
            JsDocTag::Template {
                name,
                constraint,
                doc,
            } => {
                let head = match constraint {
                    Some(c) => format!("{} extends {}", name, c),
                    None => name.clone(),
                };
                join_text(&head, doc.as_deref())
            }
            JsDocTag::Default { value } => value.clone(),
            JsDocTag::Unknown { value, .. } => value.clone(),
        }
    }

    pub fn to_spec_tag(&self) -> SpecTag {
        SpecTag::new(self.name(), self.text())
    }
}

fn join_text(head: &str, doc: Option<&str>) -> String {
    match doc {
        Some(doc) if !doc.is_empty() => format!("{} - {}", head, doc),
        _ => head.to_string(),
    }
}

/// Clean JSDoc comment by removing delimiters and the leading `*` of each line
fn clean_jsdoc_comment(comment: &str) -> String {
    let mut lines = Vec::new();

    for line in comment.lines() {
        let mut content = line.trim_start();

        if let Some(rest) = content.strip_prefix("/**") {
            content = rest;
        }
        if let Some(rest) = content.trim_end().strip_suffix("*/") {
            content = rest;
        }
        if let Some(rest) = content.strip_prefix("* ") {
            content = rest;
        } else if let Some(rest) = content.strip_prefix('*') {
            content = rest;
        }

        lines.push(content.trim_end());
    }

    // Drop blank lines left by the delimiters
    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

/// Extract description text before the first tag
fn extract_description(text: &str) -> Option<String> {
    let mut description = Vec::new();
    for line in text.lines() {
        if line.trim_start().starts_with('@') {
            break;
        }
        description.push(line.trim());
    }

    let joined = description.join("\n");
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse all JSDoc tags from the comment
fn parse_tags(text: &str) -> Vec<JsDocTag> {
    let mut tags = Vec::new();
    let mut current_tag: Option<(String, String)> = None;

    for line in text.lines() {
        let trimmed = line.trim();

        if let Some(after_at) = trimmed.strip_prefix('@') {
            if let Some((tag_name, content)) = current_tag.take() {
                tags.push(parse_single_tag(&tag_name, &content));
            }

            match after_at.find(char::is_whitespace) {
                Some(space_pos) => {
                    let tag_name = after_at[..space_pos].to_string();
                    let mut rest = after_at[space_pos..].chars();
                    rest.next();
                    let content = rest.as_str().to_string();
                    current_tag = Some((tag_name, content));
                }
                None => current_tag = Some((after_at.to_string(), String::new())),
            }
        } else if let Some((ref tag_name, ref mut content)) = current_tag {
            // Examples keep their indentation
            let line = if tag_name == "example" {
                line.trim_end()
            } else {
                trimmed
            };
            if !content.is_empty() {
                content.push('\n');
            }
            content.push_str(line);
        }
    }

    if let Some((tag_name, content)) = current_tag {
        tags.push(parse_single_tag(&tag_name, &content));
    }

    tags
}

/// Parse a single JSDoc tag
fn parse_single_tag(tag_name: &str, content: &str) -> JsDocTag {
    if tag_name == "example" {
        return parse_example_tag(content);
    }
    let content = content.trim();

    match tag_name {
        "param" | "arg" | "argument" => parse_param_tag(content),
        "returns" | "return" => {
            let (type_ref, doc) = parse_typed_doc(content);
            JsDocTag::Returns { type_ref, doc }
        }
        "deprecated" => JsDocTag::Deprecated {
            doc: non_empty(content),
        },
        "see" => JsDocTag::See {
            reference: content.to_string(),
        },
        "since" => JsDocTag::Since {
            version: content.to_string(),
        },
        "category" => JsDocTag::Category {
            name: content.to_string(),
        },
        "internal" => JsDocTag::Internal,
        "experimental" | "beta" => JsDocTag::Experimental,
        "throws" | "exception" => {
            let (type_ref, doc) = parse_typed_doc(content);
            JsDocTag::Throws { type_ref, doc }
        }
        "template" | "typeparam" => parse_template_tag(content),
        "default" | "defaultvalue" => JsDocTag::Default {
            value: content.to_string(),
        },
        _ => JsDocTag::Unknown {
            tag: tag_name.to_string(),
            value: content.to_string(),
        },
    }
}

/// Parse @example content, pulling out an optional `<caption>`
fn parse_example_tag(content: &str) -> JsDocTag {
    let (caption, body) = match CAPTION_REGEX.captures(content) {
        Some(captures) => {
            let caption = captures[1].trim().to_string();
            let end = captures.get(0).map(|m| m.end()).unwrap_or(0);
            (non_empty(&caption), &content[end..])
        }
        None => (None, content),
    };

    JsDocTag::Example {
        doc: dedent(body.trim_matches('\n')),
        caption,
    }
}

/// Remove the indentation shared by every non-blank line
fn dedent(text: &str) -> String {
    let mut common: Option<&str> = None;
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let indent = &line[..line.len() - line.trim_start().len()];
        common = Some(match common {
            None => indent,
            Some(prefix) => shared_prefix(prefix, indent),
        });
    }
    let common = common.unwrap_or("");
    text.lines()
        .map(|l| l.strip_prefix(common).unwrap_or_else(|| l.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

/// Longest common prefix of two strings, split on a char boundary
fn shared_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let end = a
        .char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map(|((index, _), _)| index)
        .unwrap_or_else(|| a.len().min(b.len()));
    &a[..end]
}

/// Parse @param tag content
fn parse_param_tag(content: &str) -> JsDocTag {
    let (type_ref, rest) = extract_type_and_rest(content);

    // Check for optional [name] or [name=default] syntax
    let (name, optional, default, doc) = if rest.starts_with('[') {
        if let Some(bracket_end) = rest.find(']') {
            let bracket_content = &rest[1..bracket_end];
            let after_bracket = rest[bracket_end + 1..].trim();

            let (name, default) = match bracket_content.find('=') {
                Some(eq_pos) => (
                    bracket_content[..eq_pos].trim().to_string(),
                    Some(bracket_content[eq_pos + 1..].trim().to_string()),
                ),
                None => (bracket_content.trim().to_string(), None),
            };

            (name, true, default, extract_doc_after_name(after_bracket))
        } else {
            (rest.to_string(), false, None, None)
        }
    } else {
        let (name, doc) = split_name_and_doc(rest);
        (name, false, None, doc)
    };

    JsDocTag::Param {
        name,
        type_ref,
        doc,
        optional,
        default,
    }
}

/// `{type} - description` as used by @returns and @throws
fn parse_typed_doc(content: &str) -> (Option<String>, Option<String>) {
    let (type_ref, rest) = extract_type_and_rest(content);
    (type_ref, non_empty(rest.trim_start_matches('-').trim()))
}

/// Parse @template tag content
fn parse_template_tag(content: &str) -> JsDocTag {
    let (name_part, doc) = match content.find(" - ") {
        Some(pos) => (content[..pos].trim(), non_empty(content[pos + 3..].trim())),
        None => (content, None),
    };

    let (name, constraint) = match name_part.find(" extends ") {
        Some(ext_pos) => (
            name_part[..ext_pos].trim().to_string(),
            Some(name_part[ext_pos + 9..].trim().to_string()),
        ),
        None => (name_part.to_string(), None),
    };

    JsDocTag::Template {
        name,
        constraint,
        doc,
    }
}

/// Extract type from {type} at start of content
fn extract_type_and_rest(content: &str) -> (Option<String>, &str) {
    if content.starts_with('{') {
        if let Some(close_pos) = find_matching_brace(content) {
            let type_str = &content[1..close_pos];
            let rest = content[close_pos + 1..].trim();
            return (Some(type_str.to_string()), rest);
        }
    }
    (None, content)
}

/// Find matching closing brace, handling nested braces
fn find_matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split "name - description" or "name description"
fn split_name_and_doc(s: &str) -> (String, Option<String>) {
    let s = s.trim();

    if let Some(dash_pos) = s.find(" - ") {
        let name = s[..dash_pos].trim().to_string();
        let doc = s[dash_pos + 3..].trim();
        return (name, non_empty(doc));
    }

    match s.find(char::is_whitespace) {
        Some(space_pos) => (s[..space_pos].to_string(), non_empty(s[space_pos..].trim())),
        None => (s.to_string(), None),
    }
}

/// Extract description after parameter name
fn extract_doc_after_name(s: &str) -> Option<String> {
    non_empty(s.trim().trim_start_matches('-').trim())
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
