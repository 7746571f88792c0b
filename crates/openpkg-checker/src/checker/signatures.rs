//! Call and construct signatures from function-like syntax

use super::Checker;
use crate::types::{MemberDecl, Parameter, Scope, Signature, TypeId};
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::Spanned;

fn pattern_annotation(pat: &swc_ast::Pat) -> Option<&swc_ast::TsTypeAnn> {
    match pat {
        swc_ast::Pat::Ident(binding) => binding.type_ann.as_deref(),
        swc_ast::Pat::Array(array) => array.type_ann.as_deref(),
        swc_ast::Pat::Object(object) => object.type_ann.as_deref(),
        swc_ast::Pat::Rest(rest) => rest.type_ann.as_deref(),
        swc_ast::Pat::Assign(assign) => pattern_annotation(&assign.left),
        swc_ast::Pat::Expr(_) | swc_ast::Pat::Invalid(_) => None,
    }
}

impl Checker {
    /// Signature of a function type, method signature or call signature
    pub(crate) fn signature_from_ts_params(
        &self,
        params: &[swc_ast::TsFnParam],
        type_params: Option<&swc_ast::TsTypeParamDecl>,
        return_annotation: Option<&swc_ast::TsTypeAnn>,
        scope: &Scope,
        declaration: Option<MemberDecl>,
    ) -> Signature {
        let (type_parameters, inner) = self.create_type_parameters(type_params, scope);
        let parameters = params
            .iter()
            .enumerate()
            .map(|(index, param)| self.parameter_from_ts_fn_param(param, index, &inner))
            .collect();
        let (return_type, has_return_annotation) = match return_annotation {
            Some(ann) => (self.type_from_node(&ann.type_ann, &inner), true),
            None => (self.intrinsics.any, false),
        };
        Signature {
            type_parameters,
            parameters,
            return_type,
            has_return_annotation,
            is_async: false,
            declaration,
        }
    }

    pub(crate) fn parameter_from_ts_fn_param(
        &self,
        param: &swc_ast::TsFnParam,
        index: usize,
        scope: &Scope,
    ) -> Parameter {
        match param {
            swc_ast::TsFnParam::Ident(binding) => self.binding_parameter(binding, scope),
            swc_ast::TsFnParam::Rest(rest) => self.rest_parameter(rest, index, scope),
            swc_ast::TsFnParam::Array(array) => {
                self.destructured_parameter(array.type_ann.as_deref(), index, scope)
            }
            swc_ast::TsFnParam::Object(object) => {
                self.destructured_parameter(object.type_ann.as_deref(), index, scope)
            }
        }
    }

    pub(crate) fn parameter_from_pat(&self, pat: &swc_ast::Pat, index: usize, scope: &Scope) -> Parameter {
        match pat {
            swc_ast::Pat::Ident(binding) => self.binding_parameter(binding, scope),
            swc_ast::Pat::Rest(rest) => self.rest_parameter(rest, index, scope),
            swc_ast::Pat::Assign(assign) => {
                let mut parameter = self.parameter_from_pat(&assign.left, index, scope);
                parameter.optional = true;
                parameter.default_text = Some(self.node_text(scope.file, assign.right.span()));
                if pattern_annotation(&assign.left).is_none() {
                    parameter.ty = self.infer_expression(&assign.right, scope, true);
                }
                parameter
            }
            swc_ast::Pat::Array(array) => {
                self.destructured_parameter(array.type_ann.as_deref(), index, scope)
            }
            swc_ast::Pat::Object(object) => {
                self.destructured_parameter(object.type_ann.as_deref(), index, scope)
            }
            swc_ast::Pat::Expr(_) | swc_ast::Pat::Invalid(_) => Parameter {
                name: format!("__{}", index),
                ty: self.intrinsics.any,
                optional: false,
                rest: false,
                default_text: None,
            },
        }
    }

    fn binding_parameter(&self, binding: &swc_ast::BindingIdent, scope: &Scope) -> Parameter {
        Parameter {
            name: binding.id.sym.to_string(),
            ty: self.annotation_type(binding.type_ann.as_deref(), scope),
            optional: binding.id.optional,
            rest: false,
            default_text: None,
        }
    }

    fn rest_parameter(&self, rest: &swc_ast::RestPat, index: usize, scope: &Scope) -> Parameter {
        let name = match &*rest.arg {
            swc_ast::Pat::Ident(binding) => binding.id.sym.to_string(),
            _ => format!("__{}", index),
        };
        let annotation = rest
            .type_ann
            .as_deref()
            .or_else(|| pattern_annotation(&rest.arg));
        let ty = match annotation {
            Some(ann) => self.type_from_node(&ann.type_ann, scope),
            None => self.array_type(self.intrinsics.any),
        };
        Parameter {
            name,
            ty,
            optional: false,
            rest: true,
            default_text: None,
        }
    }

    /// Destructuring patterns are named by position, like `__0`
    fn destructured_parameter(
        &self,
        annotation: Option<&swc_ast::TsTypeAnn>,
        index: usize,
        scope: &Scope,
    ) -> Parameter {
        Parameter {
            name: format!("__{}", index),
            ty: self.annotation_type(annotation, scope),
            optional: false,
            rest: false,
            default_text: None,
        }
    }

    fn annotation_type(&self, annotation: Option<&swc_ast::TsTypeAnn>, scope: &Scope) -> TypeId {
        match annotation {
            Some(ann) => self.type_from_node(&ann.type_ann, scope),
            None => self.intrinsics.any,
        }
    }

    /// Signature of a function declaration, expression or method
    pub(crate) fn signature_from_function(
        &self,
        function: &swc_ast::Function,
        scope: &Scope,
        declaration: Option<MemberDecl>,
    ) -> Signature {
        let (type_parameters, inner) =
            self.create_type_parameters(function.type_params.as_deref(), scope);
        let parameters: Vec<Parameter> = function
            .params
            .iter()
            .enumerate()
            .map(|(index, param)| self.parameter_from_pat(&param.pat, index, &inner))
            .collect();

        let (return_type, has_return_annotation) = match &function.return_type {
            Some(ann) => (self.type_from_node(&ann.type_ann, &inner), true),
            None => {
                let inferred = match &function.body {
                    Some(body) => self.infer_function_return(
                        &body.stmts,
                        function.is_async,
                        function.is_generator,
                        &inner,
                        &parameters,
                    ),
                    None => self.intrinsics.any,
                };
                (inferred, false)
            }
        };

        Signature {
            type_parameters,
            parameters,
            return_type,
            has_return_annotation,
            is_async: function.is_async,
            declaration,
        }
    }

    pub(crate) fn signature_from_arrow(&self, arrow: &swc_ast::ArrowExpr, scope: &Scope) -> Signature {
        let (type_parameters, inner) =
            self.create_type_parameters(arrow.type_params.as_deref(), scope);
        let parameters: Vec<Parameter> = arrow
            .params
            .iter()
            .enumerate()
            .map(|(index, pat)| self.parameter_from_pat(pat, index, &inner))
            .collect();

        let (return_type, has_return_annotation) = match &arrow.return_type {
            Some(ann) => (self.type_from_node(&ann.type_ann, &inner), true),
            None => {
                let inferred = match &*arrow.body {
                    swc_ast::BlockStmtOrExpr::BlockStmt(block) => self.infer_function_return(
                        &block.stmts,
                        arrow.is_async,
                        arrow.is_generator,
                        &inner,
                        &parameters,
                    ),
                    swc_ast::BlockStmtOrExpr::Expr(expr) => {
                        let value = self.infer_in_body(expr, &inner, &parameters);
                        if arrow.is_async {
                            self.promise_type(self.awaited_type(value))
                        } else {
                            value
                        }
                    }
                };
                (inferred, false)
            }
        };

        Signature {
            type_parameters,
            parameters,
            return_type,
            has_return_annotation,
            is_async: arrow.is_async,
            declaration: None,
        }
    }

    pub(crate) fn signature_from_constructor(
        &self,
        constructor: &swc_ast::Constructor,
        scope: &Scope,
        type_parameters: Vec<TypeId>,
        return_type: TypeId,
        declaration: Option<MemberDecl>,
    ) -> Signature {
        let parameters = constructor
            .params
            .iter()
            .enumerate()
            .map(|(index, param)| match param {
                swc_ast::ParamOrTsParamProp::Param(p) => self.parameter_from_pat(&p.pat, index, scope),
                swc_ast::ParamOrTsParamProp::TsParamProp(prop) => match &prop.param {
                    swc_ast::TsParamPropParam::Ident(binding) => self.binding_parameter(binding, scope),
                    swc_ast::TsParamPropParam::Assign(assign) => {
                        self.parameter_from_pat(&swc_ast::Pat::Assign(assign.clone()), index, scope)
                    }
                },
            })
            .collect();

        Signature {
            type_parameters,
            parameters,
            return_type,
            has_return_annotation: true,
            is_async: false,
            declaration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use pretty_assertions::assert_eq;

    fn signature_text(checker: &crate::Checker, name: &str) -> String {
        value(checker, name)
    }

    #[test]
    fn test_function_parameters() {
        let checker = checker_for(
            r#"
            export function greet(name: string, greeting = "Hello", punctuation?: string, ...rest: number[]): string {
                return greeting + name;
            }
            export function pick({ a, b }: { a: string; b: number }, [first]: string[]) {}
            "#,
        );
        assert_eq!(
            signature_text(&checker, "greet"),
            "(name: string, greeting?: string, punctuation?: string, ...rest: number[]) => string"
        );
        assert_eq!(
            signature_text(&checker, "pick"),
            "(__0: { a: string; b: number; }, __1: string[]) => void"
        );

        let ty = checker.type_of_symbol(export(&checker, "greet"));
        let sig = &checker.call_signatures(ty)[0];
        assert_eq!(sig.parameters[1].default_text.as_deref(), Some("\"Hello\""));
        assert!(sig.parameters[3].rest);
    }

    #[test]
    fn test_return_inference() {
        let checker = checker_for(
            r#"
            export async function load(id: string) { return { id, ok: true }; }
            export function maybe(flag: boolean) { if (flag) { return "yes"; } return 1; }
            export function nothing() { console.log("x"); }
            export const double = (n: number) => n * 2;
            export function* count() { yield 1; return "done"; }
            "#,
        );
        assert_eq!(
            signature_text(&checker, "load"),
            "(id: string) => Promise<{ id: string; ok: boolean; }>"
        );
        assert_eq!(signature_text(&checker, "maybe"), "(flag: boolean) => string | number");
        assert_eq!(signature_text(&checker, "nothing"), "() => void");
        assert_eq!(signature_text(&checker, "double"), "(n: number) => number");
        assert_eq!(
            signature_text(&checker, "count"),
            "() => Generator<number, string, unknown>"
        );
    }

    #[test]
    fn test_overloads_hide_implementation() {
        let checker = checker_for(
            r#"
            export function parse(input: string): number;
            export function parse(input: number): string;
            export function parse(input: any): any { return input; }
            "#,
        );
        let ty = checker.type_of_symbol(export(&checker, "parse"));
        let signatures = checker.call_signatures(ty);
        assert_eq!(signatures.len(), 2);
        assert_eq!(checker.type_to_string(signatures[1].return_type), "string");
    }

    #[test]
    fn test_generic_function() {
        let checker = checker_for(
            "export function identity<T extends object = {}>(value: T): T { return value; }",
        );
        assert_eq!(
            signature_text(&checker, "identity"),
            "<T extends object = {}>(value: T) => T"
        );
    }
}
