//! The converter: registry dispatch plus default node handling.
//!
//! Every node goes through the same three steps. The matching strategy
//! with the highest priority runs first. If none matches, the built-in
//! default rule for the node kind applies ([`expr`], [`stmt`]). Shapes
//! with no default rule are emitted verbatim and tagged with an
//! `Unsupported` diagnostic.

pub(crate) mod expr;
pub(crate) mod stmt;

use crate::config::ConvertConfig;
use crate::context::ConversionContext;
use crate::diagnostics::Diagnostic;
use crate::registry::{ExprRegistry, StmtRegistry};
use crate::semantic::SemanticModel;
use crate::syntax::{Expr, Stmt, StmtKind, TypeRef};
use crate::writer;
use serde::Serialize;

/// Target text produced by one top-level call, with the anomalies recorded
/// while producing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Conversion {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Converts syntax nodes to target source text.
///
/// Registries and configuration are fixed at construction; a converter is
/// `Send + Sync` and may be shared by concurrent conversions, each of which
/// gets its own [`ConversionContext`].
pub struct Converter {
    exprs: ExprRegistry,
    stmts: StmtRegistry,
    config: ConvertConfig,
}

impl Converter {
    /// Converter with the built-in strategies and default configuration.
    pub fn new() -> Self {
        Self::with_config(ConvertConfig::default())
    }

    pub fn with_config(config: ConvertConfig) -> Self {
        Self::from_registries(ExprRegistry::builtin(), StmtRegistry::builtin(), config)
    }

    /// Converter over caller-assembled registries, e.g. the built-in sets
    /// extended with project-specific strategies.
    pub fn from_registries(exprs: ExprRegistry, stmts: StmtRegistry, config: ConvertConfig) -> Self {
        Self {
            exprs,
            stmts,
            config,
        }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    pub fn expr_registry(&self) -> &ExprRegistry {
        &self.exprs
    }

    pub fn stmt_registry(&self) -> &StmtRegistry {
        &self.stmts
    }

    /// Convert one top-level statement.
    pub fn convert(&self, stmt: &Stmt, model: &dyn SemanticModel) -> Conversion {
        let mut ctx = ConversionContext::new(self, model);
        let text = self.convert_stmt(stmt, &mut ctx);
        Conversion {
            text,
            diagnostics: ctx.into_diagnostics(),
        }
    }

    /// Convert a statement list in one context, joined by newlines.
    ///
    /// Unlike converting each statement separately, `using` declarations
    /// scope over the statements that follow them and local functions are
    /// visible to the whole list.
    pub fn convert_body(&self, statements: &[Stmt], model: &dyn SemanticModel) -> Conversion {
        let mut ctx = ConversionContext::new(self, model);
        let text = self.convert_statements(statements, &mut ctx).join("\n");
        Conversion {
            text,
            diagnostics: ctx.into_diagnostics(),
        }
    }

    /// Convert one top-level expression. `expected` is the type the
    /// surrounding code requires, used by target-typed constructs.
    pub fn convert_expression(
        &self,
        expr: &Expr,
        expected: Option<&TypeRef>,
        model: &dyn SemanticModel,
    ) -> Conversion {
        let mut ctx = ConversionContext::new(self, model);
        let text = self.convert_expr(expr, expected, &mut ctx);
        Conversion {
            text,
            diagnostics: ctx.into_diagnostics(),
        }
    }

    /// Recursive entry point for expressions.
    pub fn convert_expr(
        &self,
        expr: &Expr,
        expected: Option<&TypeRef>,
        ctx: &mut ConversionContext<'_>,
    ) -> String {
        if let Some(strategy) = self.exprs.find_strategy(expr, ctx) {
            tracing::debug!(
                strategy = strategy.name(),
                node = expr.kind_name(),
                span = %expr.span,
                "expression strategy matched"
            );
            return strategy.convert(expr, ctx);
        }
        expr::convert_default(expr, expected, ctx)
    }

    /// Recursive entry point for statements.
    pub fn convert_stmt(&self, stmt: &Stmt, ctx: &mut ConversionContext<'_>) -> String {
        if let Some(strategy) = self.stmts.find_strategy(stmt, ctx) {
            tracing::debug!(
                strategy = strategy.name(),
                node = stmt.kind_name(),
                span = %stmt.span,
                "statement strategy matched"
            );
            return strategy.convert(stmt, ctx);
        }
        stmt::convert_default(stmt, ctx)
    }

    /// Convert a statement as a braced block. A block statement contributes
    /// its children; any other statement becomes the single child.
    pub fn convert_block(&self, stmt: &Stmt, ctx: &mut ConversionContext<'_>) -> String {
        let lines = self.convert_statements(statements_of(stmt), ctx);
        writer::block(&lines, ctx.indent())
    }

    /// Convert a statement list, one output entry per emitted statement.
    pub fn convert_statements(
        &self,
        statements: &[Stmt],
        ctx: &mut ConversionContext<'_>,
    ) -> Vec<String> {
        let local_functions: Vec<String> = statements
            .iter()
            .filter_map(|s| match &s.kind {
                StmtKind::LocalFunction { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect();
        if local_functions.is_empty() {
            self.convert_sequence(statements, ctx)
        } else {
            ctx.with_scope(local_functions, |ctx| self.convert_sequence(statements, ctx))
        }
    }

    fn convert_sequence(
        &self,
        statements: &[Stmt],
        ctx: &mut ConversionContext<'_>,
    ) -> Vec<String> {
        let mut out = Vec::with_capacity(statements.len());
        for (i, stmt) in statements.iter().enumerate() {
            if matches!(stmt.kind, StmtKind::Using { body: None, .. }) {
                // A using declaration owns the rest of the list.
                let rest = &statements[i + 1..];
                out.push(crate::strategies::control_flow::using::convert_declaration(
                    stmt, rest, ctx,
                ));
                break;
            }
            out.push(self.convert_stmt(stmt, ctx));
        }
        out
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

/// Children of a block statement, or the statement itself.
pub(crate) fn statements_of(stmt: &Stmt) -> &[Stmt] {
    match &stmt.kind {
        StmtKind::Block { statements } => statements,
        _ => std::slice::from_ref(stmt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::EmptyModel;
    use crate::syntax::Declarator;

    #[test]
    fn test_converter_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Converter>();
    }

    #[test]
    fn test_unsupported_expression_is_tagged() {
        let converter = Converter::new();
        let expr = Expr::other("checked_expression", "checked(a + b)").with_span(5, 19);
        let out = converter.convert_expression(&expr, None, &EmptyModel);
        assert_eq!(out.text, "checked(a + b)");
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].node_kind, "checked_expression");
        assert_eq!(out.diagnostics[0].span, crate::syntax::Span::new(5, 19));
    }

    #[test]
    fn test_block_statement_layout() {
        let converter = Converter::new();
        let stmt = Stmt::block(vec![
            Stmt::local("total", Expr::int(0)),
            Stmt::expr(Expr::assign(Expr::ident("total"), Expr::int(3))),
        ]);
        let out = converter.convert(&stmt, &EmptyModel);
        assert_eq!(out.text, "{\n  let total = 0;\n  total = 3;\n}");
        assert!(out.is_clean());
    }

    #[test]
    fn test_body_scopes_using_declaration_over_rest() {
        let converter = Converter::new();
        let body = vec![
            Stmt::using(
                vec![Declarator::new(
                    "conn",
                    Some(Expr::method_call(Expr::ident("factory"), "Open", vec![])),
                )],
                None,
            ),
            Stmt::expr(Expr::method_call(Expr::ident("conn"), "Send", vec![])),
        ];
        let out = converter.convert_body(&body, &EmptyModel);
        assert_eq!(
            out.text,
            "const conn = factory.open();\ntry {\n  conn.send();\n} finally {\n  if (conn && typeof conn.dispose === \"function\") conn.dispose();\n}"
        );
    }

    #[test]
    fn test_local_function_names_are_not_members() {
        let converter = Converter::new();
        let body = vec![
            Stmt::expr(Expr::call(Expr::ident("Helper"), vec![])),
            Stmt::new(StmtKind::LocalFunction {
                name: "Helper".into(),
                params: vec![],
                body: Box::new(Stmt::block(vec![])),
                is_async: false,
            }),
        ];
        let out = converter.convert_body(&body, &EmptyModel);
        assert_eq!(out.text, "Helper();\nfunction Helper() {}");
    }
}
