//! Per-call conversion state.

use crate::config::ConvertConfig;
use crate::convert::Converter;
use crate::diagnostics::Diagnostic;
use crate::semantic::{SemanticHelper, SemanticModel};
use crate::syntax::{Expr, Stmt, TypeRef};

/// State threaded through one top-level conversion.
///
/// Created per call and dropped afterwards; never shared between calls.
/// Holds the converter for recursive sub-conversions, the semantic helper,
/// and a stack of names bound by enclosing anonymous functions.
pub struct ConversionContext<'a> {
    pub converter: &'a Converter,
    pub semantic: SemanticHelper<'a>,
    scopes: Vec<Vec<String>>,
    catch_bindings: Vec<String>,
    synthetic: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ConversionContext<'a> {
    pub fn new(converter: &'a Converter, model: &'a dyn SemanticModel) -> Self {
        Self {
            converter,
            semantic: SemanticHelper::new(model),
            scopes: Vec::new(),
            catch_bindings: Vec::new(),
            synthetic: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn config(&self) -> &'a ConvertConfig {
        self.converter.config()
    }

    /// Convert a sub-expression.
    pub fn expr(&mut self, expr: &Expr) -> String {
        let converter = self.converter;
        converter.convert_expr(expr, None, self)
    }

    /// Convert a sub-expression whose target type is known from context.
    pub fn expr_expecting(&mut self, expr: &Expr, expected: Option<&TypeRef>) -> String {
        let converter = self.converter;
        converter.convert_expr(expr, expected, self)
    }

    /// Convert a sub-expression for use as an operand or receiver,
    /// parenthesizing it when needed.
    pub fn operand(&mut self, expr: &Expr) -> String {
        crate::writer::operand(&self.expr(expr))
    }

    pub fn stmt(&mut self, stmt: &Stmt) -> String {
        let converter = self.converter;
        converter.convert_stmt(stmt, self)
    }

    /// Convert a statement as a braced block.
    pub fn block(&mut self, stmt: &Stmt) -> String {
        let converter = self.converter;
        converter.convert_block(stmt, self)
    }

    /// Run `f` with `names` bound as anonymous-function parameters.
    pub fn with_scope<R>(&mut self, names: Vec<String>, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scopes.push(names);
        let result = f(self);
        self.scopes.pop();
        result
    }

    /// Add a name to the innermost scope, opening one if none is open.
    pub fn bind(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self.scopes.last_mut() {
            Some(scope) => scope.push(name),
            None => self.scopes.push(vec![name]),
        }
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|s| s.iter().any(|n| n == name))
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Run `f` while `binding` names the error caught by the enclosing
    /// `catch`, the target of a bare rethrow.
    pub fn with_catch_binding<R>(
        &mut self,
        binding: String,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.catch_bindings.push(binding);
        let result = f(self);
        self.catch_bindings.pop();
        result
    }

    pub fn catch_binding(&self) -> Option<&str> {
        self.catch_bindings.last().map(String::as_str)
    }

    /// A fresh synthetic local name. Numbering restarts with every
    /// top-level call, so output stays deterministic.
    pub fn fresh_name(&mut self, prefix: &str) -> String {
        let name = format!("__{prefix}{}", self.synthetic);
        self.synthetic += 1;
        name
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// One indentation level.
    pub fn indent(&self) -> &'a str {
        &self.config().indent
    }
}
