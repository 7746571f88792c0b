use super::{Entries, SpecAssembler};
use crate::diagnostics::ExtractResult;
use crate::expansion::{get_all_properties, get_base_types};
use crate::js_doc::JsDocInfo;
use openpkg_checker::{PropertyKind, Signature, SymbolId};
use openpkg_spec::{ExportKind, MemberKind, SpecMember, SpecProperty, SpecSignature, SpecType};
use std::rc::Rc;

impl SpecAssembler<'_> {
    pub(super) fn interface_entries(&self, name: &str, symbol: SymbolId) -> ExtractResult<Entries> {
        let export = self.new_export(name, symbol, ExportKind::Interface);
        let ty = self.interface_type(symbol);
        Ok(Entries::with_definition(export, symbol, ty))
    }

    /// Properties with inherited ones merged, methods and signatures as members
    pub(super) fn interface_type(&self, symbol: SymbolId) -> SpecType {
        let checker = self.checker();
        let schemas = self.schemas();
        let mut ty = self.new_type(symbol, ExportKind::Interface);
        let declared = checker.declared_type_of_symbol(symbol);

        for property in get_all_properties(checker, declared) {
            if property.kind == PropertyKind::Method {
                ty.members.push(self.property_member(&property, symbol));
                continue;
            }
            let doc = self
                .symbols
                .documentation_for_member(property.declaration.as_ref());
            let inherited_from = property
                .origin
                .filter(|origin| *origin != symbol)
                .map(|origin| checker.symbol(origin).name.clone());
            ty.properties.push(SpecProperty {
                name: property.name.clone(),
                required: !property.optional,
                readonly: property.readonly,
                schema: schemas.schema(property.ty),
                description: doc.description,
                inherited_from,
            });
        }

        let members = checker.resolved_members(declared);
        if !members.call_signatures.is_empty() {
            let mut call = SpecMember::new("call", MemberKind::Method);
            call.signatures = self.member_signatures(&members.call_signatures);
            ty.members.push(call);
        }
        if !members.construct_signatures.is_empty() {
            let mut construct = SpecMember::new("constructor", MemberKind::Constructor);
            construct.signatures = self.member_signatures(&members.construct_signatures);
            ty.members.push(construct);
        }
        ty.members.extend(self.index_members(declared));

        ty.extends = get_base_types(checker, symbol).extends;
        ty.type_parameters = self.type_parameters(symbol);
        self.attach_expansion(&mut ty, symbol, declared);
        ty
    }

    fn member_signatures(&self, signatures: &[Rc<Signature>]) -> Vec<SpecSignature> {
        let schemas = self.schemas();
        signatures
            .iter()
            .map(|signature| schemas.signature(signature, &self.signature_doc(signature, &JsDocInfo::default())))
            .collect()
    }
}
