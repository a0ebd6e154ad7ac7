//! Component-level driver: converts every method body and field initializer
//! of one component declaration, producing the per-member records the
//! output assembler consumes.
//!
//! Methods convert in parallel. Each gets its own [`ConversionContext`];
//! output order follows declaration order.

use crate::context::ConversionContext;
use crate::convert::Converter;
use crate::convert::expr::param_list;
use crate::diagnostics::Diagnostic;
use crate::error::ConvertError;
use crate::semantic::SemanticModel;
use crate::syntax::{Expr, Param, Span, Stmt, TypeRef, simple_type_name};
use crate::writer::{self, camel_case};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A component as handed over by the front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDecl {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(default)]
    pub ty: Option<TypeRef>,
    #[serde(default)]
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Span::is_dummy")]
    pub span: Span,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub return_type: Option<TypeRef>,
    #[serde(default)]
    pub is_async: bool,
    /// Absent for abstract and extern declarations.
    #[serde(default)]
    pub body: Option<MethodBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum MethodBody {
    Block { statements: Vec<Stmt> },
    /// `=> expr`
    Expression { expr: Expr },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedMethod {
    /// Target member name, camel-cased.
    pub name: String,
    /// Parameter texts: `a`, `b = 1`, `...rest`.
    pub params: Vec<String>,
    pub is_async: bool,
    /// Braced body text.
    pub body: String,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedField {
    pub name: String,
    pub init: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedComponent {
    pub name: String,
    pub fields: Vec<ConvertedField>,
    pub methods: Vec<ConvertedMethod>,
}

impl ConvertedComponent {
    /// All diagnostics, fields first, in declaration order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.fields
            .iter()
            .flat_map(|f| &f.diagnostics)
            .chain(self.methods.iter().flat_map(|m| &m.diagnostics))
    }
}

/// Parse a component declaration from the front-end's JSON.
pub fn read_component(json: &str) -> Result<ComponentDecl, ConvertError> {
    Ok(serde_json::from_str(json)?)
}

/// Methods whose result is not a value: an expression body is a statement.
fn returns_nothing(method: &MethodDecl) -> bool {
    match &method.return_type {
        None => false,
        Some(ty) => {
            let name = simple_type_name(&ty.name);
            name == "void" || (ty.args.is_empty() && matches!(name, "Task" | "ValueTask"))
        }
    }
}

impl Converter {
    /// Convert one method. Parameters are in scope for the whole body.
    pub fn convert_method(
        &self,
        method: &MethodDecl,
        model: &dyn SemanticModel,
    ) -> Result<ConvertedMethod, ConvertError> {
        let Some(body) = &method.body else {
            return Err(ConvertError::MissingBody {
                method: method.name.clone(),
            });
        };

        let mut ctx = ConversionContext::new(self, model);
        let names: Vec<String> = method.params.iter().map(|p| p.name.clone()).collect();
        let (params, body) = ctx.with_scope(names, |ctx| {
            let params: Vec<String> = method
                .params
                .iter()
                .map(|p| param_list(std::slice::from_ref(p), ctx))
                .collect();
            let lines = match body {
                MethodBody::Block { statements } => self.convert_statements(statements, ctx),
                MethodBody::Expression { expr } if returns_nothing(method) => {
                    vec![format!("{};", ctx.expr(expr))]
                }
                MethodBody::Expression { expr } => {
                    let expected = method.return_type.as_ref();
                    vec![format!("return {};", ctx.expr_expecting(expr, expected))]
                }
            };
            (params, writer::block(&lines, ctx.indent()))
        });

        let diagnostics = ctx.into_diagnostics();
        tracing::debug!(
            method = %method.name,
            span = %method.span,
            diagnostics = diagnostics.len(),
            "converted method"
        );
        Ok(ConvertedMethod {
            name: camel_case(&method.name),
            params,
            is_async: method.is_async,
            body,
            diagnostics,
        })
    }

    /// Convert a whole component. Fails on the first method, in declaration
    /// order, without a body.
    pub fn convert_component(
        &self,
        component: &ComponentDecl,
        model: &dyn SemanticModel,
    ) -> Result<ConvertedComponent, ConvertError> {
        if component.name.trim().is_empty() {
            return Err(ConvertError::MissingName);
        }

        let fields = component
            .fields
            .iter()
            .map(|field| {
                let mut ctx = ConversionContext::new(self, model);
                let init = field
                    .init
                    .as_ref()
                    .map(|init| ctx.expr_expecting(init, field.ty.as_ref()));
                ConvertedField {
                    name: camel_case(&field.name),
                    init,
                    diagnostics: ctx.into_diagnostics(),
                }
            })
            .collect();

        if let Some(method) = component.methods.iter().find(|m| m.body.is_none()) {
            return Err(ConvertError::MissingBody {
                method: method.name.clone(),
            });
        }

        let methods = component
            .methods
            .par_iter()
            .map(|method| self.convert_method(method, model))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            component = %component.name,
            methods = methods.len(),
            "converted component"
        );
        Ok(ConvertedComponent {
            name: component.name.clone(),
            fields,
            methods,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::EmptyModel;

    fn method(name: &str, body: Option<MethodBody>) -> MethodDecl {
        MethodDecl {
            name: name.into(),
            span: Span::DUMMY,
            params: vec![],
            return_type: None,
            is_async: false,
            body,
        }
    }

    #[test]
    fn test_method_params_are_scoped() {
        let mut decl = method(
            "Greet",
            Some(MethodBody::Block {
                statements: vec![Stmt::ret(Some(Expr::ident("Name")))],
            }),
        );
        decl.params = vec![Param::named("Name")];
        let out = Converter::new()
            .convert_method(&decl, &EmptyModel)
            .unwrap();
        assert_eq!(out.name, "greet");
        assert_eq!(out.params, vec!["Name"]);
        assert_eq!(out.body, "{\n  return Name;\n}");
    }

    #[test]
    fn test_expression_bodies() {
        let mut value = method(
            "Total",
            Some(MethodBody::Expression {
                expr: Expr::ident("total"),
            }),
        );
        value.return_type = Some(TypeRef::named("int"));
        let out = Converter::new().convert_method(&value, &EmptyModel).unwrap();
        assert_eq!(out.body, "{\n  return total;\n}");

        let mut action = method(
            "Reset",
            Some(MethodBody::Expression {
                expr: Expr::call(Expr::ident("clear"), vec![]),
            }),
        );
        action.return_type = Some(TypeRef::named("void"));
        let out = Converter::new().convert_method(&action, &EmptyModel).unwrap();
        assert_eq!(out.body, "{\n  clear();\n}");
    }

    #[test]
    fn test_missing_body_is_an_error() {
        let err = Converter::new()
            .convert_method(&method("Render", None), &EmptyModel)
            .unwrap_err();
        assert!(matches!(err, ConvertError::MissingBody { ref method } if method == "Render"));
    }

    #[test]
    fn test_component_keeps_declaration_order() {
        let component = ComponentDecl {
            name: "Counter".into(),
            fields: vec![FieldDecl {
                name: "Count".into(),
                ty: Some(TypeRef::named("int")),
                init: Some(Expr::int(0)),
            }],
            methods: (0..16)
                .map(|i| {
                    method(
                        &format!("Step{i}"),
                        Some(MethodBody::Block { statements: vec![] }),
                    )
                })
                .collect(),
        };
        let out = Converter::new()
            .convert_component(&component, &EmptyModel)
            .unwrap();
        assert_eq!(out.fields[0].name, "count");
        assert_eq!(out.fields[0].init.as_deref(), Some("0"));
        let names: Vec<&str> = out.methods.iter().map(|m| m.name.as_str()).collect();
        let expected: Vec<String> = (0..16).map(|i| format!("step{i}")).collect();
        assert_eq!(names, expected);
        assert_eq!(out.diagnostics().count(), 0);
    }

    #[test]
    fn test_first_missing_body_is_reported() {
        let mut methods: Vec<MethodDecl> = (0..32)
            .map(|i| {
                method(
                    &format!("Step{i}"),
                    Some(MethodBody::Block { statements: vec![] }),
                )
            })
            .collect();
        methods[7].body = None;
        methods[29].body = None;
        let component = ComponentDecl {
            name: "Wizard".into(),
            fields: vec![],
            methods,
        };
        let err = Converter::new()
            .convert_component(&component, &EmptyModel)
            .unwrap_err();
        assert!(matches!(err, ConvertError::MissingBody { ref method } if method == "Step7"));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let component = ComponentDecl {
            name: " ".into(),
            fields: vec![],
            methods: vec![],
        };
        assert!(matches!(
            Converter::new().convert_component(&component, &EmptyModel),
            Err(ConvertError::MissingName)
        ));
    }

    #[test]
    fn test_read_component_json() {
        let json = r#"{
            "name": "Clock",
            "methods": [{
                "name": "Tick",
                "body": {"form": "block", "statements": [
                    {"kind": "expression", "expr": {"kind": "identifier", "name": "tick"}}
                ]}
            }]
        }"#;
        let decl = read_component(json).unwrap();
        assert_eq!(decl.methods.len(), 1);
        let out = Converter::new().convert_component(&decl, &EmptyModel).unwrap();
        assert_eq!(out.methods[0].body, "{\n  tick;\n}");

        assert!(matches!(read_component("{"), Err(ConvertError::Input(_))));
    }
}
