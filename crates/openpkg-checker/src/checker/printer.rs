//! Type-to-string in TypeScript syntax

use super::Checker;
use crate::binder::SymbolFlags;
use crate::source::format_number;
use crate::types::{
    AliasRef, ObjectFlags, ObjectShape, ObjectType, Parameter, PropertyKind, ResolvedMembers,
    Signature, TupleElement, TypeData, TypeId,
};

/// Nesting beyond which types print as `...`
const MAX_PRINT_DEPTH: usize = 8;

/// Whether `name` can be written as a bare property name
pub fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Double-quoted string literal
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn property_key(name: &str) -> String {
    if is_identifier_name(name) || name.starts_with('[') || name.starts_with('#') || name.parse::<f64>().is_ok() {
        name.to_string()
    } else {
        quote(name)
    }
}

impl Checker {
    /// Print a type, using alias names where the type has one
    pub fn type_to_string(&self, ty: TypeId) -> String {
        self.print_type(ty, 0, true)
    }

    /// Print a type's structure even when it was reached through an alias
    pub fn type_to_string_expanded(&self, ty: TypeId) -> String {
        self.print_type(ty, 0, false)
    }

    /// Print a signature in arrow form, `(a: string) => void`
    pub fn signature_to_string(&self, signature: &Signature) -> String {
        self.print_signature(signature, 0, true)
    }

    fn print_type(&self, ty: TypeId, depth: usize, use_alias: bool) -> String {
        if depth > MAX_PRINT_DEPTH {
            return "...".to_string();
        }
        let record = self.record(ty);
        if use_alias {
            if let Some(alias) = &record.alias {
                return self.print_alias(alias, depth);
            }
        }

        match record.data {
            TypeData::Intrinsic(kind) => kind.name().to_string(),
            TypeData::StringLiteral(value) => quote(&value),
            TypeData::NumberLiteral(value) => format_number(value),
            TypeData::BooleanLiteral(value) => value.to_string(),
            TypeData::BigIntLiteral(value) => format!("{}n", value),
            TypeData::TemplateLiteral(text) | TypeData::Unresolved(text) => text,
            TypeData::Enum(symbol) => self.symbol(symbol).name.clone(),
            TypeData::EnumLiteral {
                enum_symbol, member, ..
            } => {
                let name = &self.symbol(enum_symbol).name;
                if is_identifier_name(&member) {
                    format!("{}.{}", name, member)
                } else {
                    format!("{}[{}]", name, quote(&member))
                }
            }
            TypeData::Union(parts) => parts
                .iter()
                .map(|part| self.print_operand(*part, depth, false))
                .collect::<Vec<_>>()
                .join(" | "),
            TypeData::Intersection(parts) => parts
                .iter()
                .map(|part| self.print_operand(*part, depth, true))
                .collect::<Vec<_>>()
                .join(" & "),
            TypeData::TypeParameter(param) => param.name,
            TypeData::Conditional(conditional) => conditional.text,
            TypeData::Index(target) => {
                format!("keyof {}", self.print_operand(target, depth, true))
            }
            TypeData::IndexedAccess { object, index } => format!(
                "{}[{}]",
                self.print_operand(object, depth, true),
                self.print_type(index, depth + 1, true)
            ),
            TypeData::Object(object) => self.print_object(ty, &object, depth),
        }
    }

    fn print_alias(&self, alias: &AliasRef, depth: usize) -> String {
        let name = self.symbol(alias.symbol).name.clone();
        if alias.arguments.is_empty() {
            return name;
        }
        format!("{}<{}>", name, self.print_list(&alias.arguments, depth))
    }

    fn print_list(&self, types: &[TypeId], depth: usize) -> String {
        types
            .iter()
            .map(|t| self.print_type(*t, depth + 1, true))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Print a union or intersection member, parenthesized where needed
    fn print_operand(&self, ty: TypeId, depth: usize, in_intersection: bool) -> String {
        let text = self.print_type(ty, depth + 1, true);
        if self.needs_parens(ty, in_intersection) {
            format!("({})", text)
        } else {
            text
        }
    }

    fn needs_parens(&self, ty: TypeId, strict: bool) -> bool {
        let record = self.record(ty);
        if record.alias.is_some() {
            return false;
        }
        match &record.data {
            TypeData::Union(_) | TypeData::Intersection(_) => strict,
            TypeData::Conditional(_) => true,
            TypeData::Index(_) => strict,
            TypeData::Object(_) => self.prints_as_arrow(ty),
            _ => false,
        }
    }

    /// Object types that print in `(...) => R` or `new (...) => R` form
    fn prints_as_arrow(&self, ty: TypeId) -> bool {
        match self.data(ty) {
            TypeData::Object(ObjectType {
                shape: ObjectShape::Members(members),
                ..
            }) => arrow_form(&members).is_some(),
            TypeData::Object(ObjectType {
                shape: ObjectShape::SymbolValue,
                symbol: Some(symbol),
                ..
            }) => {
                let flags = self.symbol(symbol).flags;
                !flags.intersects(SymbolFlags::CLASS | SymbolFlags::ENUM | SymbolFlags::NAMESPACE | SymbolFlags::MODULE)
                    && arrow_form(&self.resolved_members(ty)).is_some()
            }
            _ => false,
        }
    }

    fn print_object(&self, ty: TypeId, object: &ObjectType, depth: usize) -> String {
        match &object.shape {
            ObjectShape::Declared => {
                let Some(symbol) = object.symbol else {
                    return self.print_members(&self.resolved_members(ty), depth);
                };
                if object.type_arguments.len() == 1 {
                    let element = object.type_arguments[0];
                    if Some(symbol) == self.global_symbol("Array") {
                        return format!("{}[]", self.print_element(element, depth));
                    }
                    if Some(symbol) == self.global_symbol("ReadonlyArray") {
                        return format!("readonly {}[]", self.print_element(element, depth));
                    }
                }
                let name = self.symbol(symbol).name.clone();
                if object.type_arguments.is_empty() {
                    name
                } else {
                    format!("{}<{}>", name, self.print_list(&object.type_arguments, depth))
                }
            }
            ObjectShape::Tuple(elements) => {
                let body = elements
                    .iter()
                    .map(|element| self.print_tuple_element(element, depth))
                    .collect::<Vec<_>>()
                    .join(", ");
                if object.flags.contains(ObjectFlags::READONLY) {
                    format!("readonly [{}]", body)
                } else {
                    format!("[{}]", body)
                }
            }
            ObjectShape::SymbolValue => {
                let Some(symbol) = object.symbol else {
                    return "{}".to_string();
                };
                let sym = self.symbol(symbol);
                if sym
                    .flags
                    .intersects(SymbolFlags::CLASS | SymbolFlags::ENUM | SymbolFlags::NAMESPACE | SymbolFlags::MODULE)
                {
                    format!("typeof {}", sym.name)
                } else {
                    self.print_members(&self.resolved_members(ty), depth)
                }
            }
            ObjectShape::Mapped {
                node,
                scope,
                constraint,
            } => {
                if self.is_generic(*constraint) {
                    self.node_text(scope.file, node.span)
                } else {
                    self.print_members(&self.resolved_members(ty), depth)
                }
            }
            ObjectShape::Literal { .. } | ObjectShape::Members(_) => {
                self.print_members(&self.resolved_members(ty), depth)
            }
        }
    }

    fn print_element(&self, element: TypeId, depth: usize) -> String {
        let text = self.print_type(element, depth + 1, true);
        if self.needs_parens(element, true) {
            format!("({})", text)
        } else {
            text
        }
    }

    fn print_tuple_element(&self, element: &TupleElement, depth: usize) -> String {
        let ty = self.print_type(element.ty, depth + 1, true);
        match (&element.label, element.rest, element.optional) {
            (Some(label), true, _) => format!("...{}: {}", label, ty),
            (Some(label), false, true) => format!("{}?: {}", label, ty),
            (Some(label), false, false) => format!("{}: {}", label, ty),
            (None, true, _) => format!("...{}", ty),
            (None, false, true) => format!("{}?", self.print_element(element.ty, depth)),
            (None, false, false) => ty,
        }
    }

    fn print_members(&self, members: &ResolvedMembers, depth: usize) -> String {
        if let Some((signature, is_construct)) = arrow_form(members) {
            let text = self.print_signature(signature, depth, true);
            return if is_construct { format!("new {}", text) } else { text };
        }
        if members.is_empty() {
            return "{}".to_string();
        }
        if depth >= MAX_PRINT_DEPTH {
            return "{ ... }".to_string();
        }

        let mut parts = Vec::new();
        for signature in &members.call_signatures {
            parts.push(self.print_signature(signature, depth, false));
        }
        for signature in &members.construct_signatures {
            parts.push(format!("new {}", self.print_signature(signature, depth, false)));
        }
        for (info, key) in [
            (&members.string_index, "string"),
            (&members.number_index, "number"),
        ] {
            if let Some(info) = info {
                let readonly = if info.readonly { "readonly " } else { "" };
                parts.push(format!(
                    "{}[{}: {}]: {}",
                    readonly,
                    info.parameter,
                    key,
                    self.print_type(info.value, depth + 1, true)
                ));
            }
        }
        for property in &members.properties {
            let key = property_key(&property.name);
            let optional = if property.optional { "?" } else { "" };
            if property.kind == PropertyKind::Method {
                let signatures = self.call_signatures(property.ty);
                if !signatures.is_empty() && self.alias_of(property.ty).is_none() {
                    for signature in &signatures {
                        parts.push(format!(
                            "{}{}{}",
                            key,
                            optional,
                            self.print_signature(signature, depth, false)
                        ));
                    }
                    continue;
                }
            }
            let readonly = if property.readonly { "readonly " } else { "" };
            parts.push(format!(
                "{}{}{}: {}",
                readonly,
                key,
                optional,
                self.print_type(property.ty, depth + 1, true)
            ));
        }
        format!("{{ {}; }}", parts.join("; "))
    }

    fn print_signature(&self, signature: &Signature, depth: usize, arrow: bool) -> String {
        let mut out = String::new();
        if !signature.type_parameters.is_empty() {
            let params = signature
                .type_parameters
                .iter()
                .map(|t| self.print_type_parameter(*t, depth))
                .collect::<Vec<_>>()
                .join(", ");
            out.push('<');
            out.push_str(&params);
            out.push('>');
        }
        out.push('(');
        out.push_str(
            &signature
                .parameters
                .iter()
                .map(|p| self.print_parameter(p, depth))
                .collect::<Vec<_>>()
                .join(", "),
        );
        out.push(')');
        out.push_str(if arrow { " => " } else { ": " });
        out.push_str(&self.print_type(signature.return_type, depth + 1, true));
        out
    }

    fn print_parameter(&self, parameter: &Parameter, depth: usize) -> String {
        let ty = self.print_type(parameter.ty, depth + 1, true);
        if parameter.rest {
            format!("...{}: {}", parameter.name, ty)
        } else if parameter.optional {
            format!("{}?: {}", parameter.name, ty)
        } else {
            format!("{}: {}", parameter.name, ty)
        }
    }

    /// `T extends C = D`
    pub fn print_type_parameter(&self, ty: TypeId, depth: usize) -> String {
        let TypeData::TypeParameter(param) = self.data(ty) else {
            return self.print_type(ty, depth + 1, true);
        };
        let mut out = param.name;
        if let Some(constraint) = param.constraint {
            out.push_str(" extends ");
            out.push_str(&self.print_type(constraint, depth + 1, true));
        }
        if let Some(default) = param.default {
            out.push_str(" = ");
            out.push_str(&self.print_type(default, depth + 1, true));
        }
        out
    }
}

/// The single signature of a members set that has nothing else
fn arrow_form(members: &ResolvedMembers) -> Option<(&Signature, bool)> {
    if !members.properties.is_empty() || members.string_index.is_some() || members.number_index.is_some() {
        return None;
    }
    match (
        members.call_signatures.as_slice(),
        members.construct_signatures.as_slice(),
    ) {
        ([call], []) => Some((call, false)),
        ([], [construct]) => Some((construct, true)),
        _ => None,
    }
}
