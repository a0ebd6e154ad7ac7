//! Resource-scoped blocks: `using` → `try`/`finally` with a guarded release.
//!
//! ```text
//! using (var conn = factory.Open()) { conn.Send(); }
//! ```
//! becomes
//! ```text
//! {
//!   const conn = factory.open();
//!   try {
//!     conn.send();
//!   } finally {
//!     if (conn && typeof conn.dispose === "function") conn.dispose();
//!   }
//! }
//! ```
//!
//! The release runs on every exit path: normal completion, early return,
//! `break`, or a thrown error. Several resources nest, so they are released
//! in reverse order of acquisition.

use crate::context::ConversionContext;
use crate::convert::statements_of;
use crate::syntax::{Stmt, StmtKind};
use crate::traits::{Priority, STRUCTURAL_PRIORITY, Strategy};
use crate::writer;

pub struct ResourceScope;

pub static RESOURCE_SCOPE: ResourceScope = ResourceScope;

impl Strategy<Stmt> for ResourceScope {
    fn name(&self) -> &'static str {
        "resource-scope"
    }

    fn priority(&self) -> Priority {
        STRUCTURAL_PRIORITY
    }

    fn matches(&self, stmt: &Stmt, _ctx: &ConversionContext<'_>) -> bool {
        matches!(stmt.kind, StmtKind::Using { .. })
    }

    fn convert(&self, stmt: &Stmt, ctx: &mut ConversionContext<'_>) -> String {
        convert_using(stmt, ctx)
    }
}

/// A `using` statement. The block form is wrapped in braces so its
/// bindings stay local; a lone declaration scopes over nothing.
pub fn convert_using(stmt: &Stmt, ctx: &mut ConversionContext<'_>) -> String {
    let StmtKind::Using { body, .. } = &stmt.kind else {
        return String::new();
    };
    match body {
        Some(body) => {
            let lines = scoped(stmt, statements_of(body), ctx);
            writer::block(&lines, ctx.indent())
        }
        None => convert_declaration(stmt, &[], ctx),
    }
}

/// A `using` declaration owning `rest`, the statements after it in the
/// enclosing list. Emitted unbraced: the enclosing block already scopes it.
pub fn convert_declaration(stmt: &Stmt, rest: &[Stmt], ctx: &mut ConversionContext<'_>) -> String {
    scoped(stmt, rest, ctx).join("\n")
}

fn scoped(stmt: &Stmt, body: &[Stmt], ctx: &mut ConversionContext<'_>) -> Vec<String> {
    let StmtKind::Using {
        declarators,
        resource,
        is_await,
        ..
    } = &stmt.kind
    else {
        return Vec::new();
    };

    // Each declarator is in scope for the initializers after it.
    let (bindings, mut lines) = ctx.with_scope(Vec::new(), |ctx| {
        let mut bindings: Vec<(String, String)> = Vec::new();
        for declarator in declarators {
            let init = match &declarator.init {
                Some(init) => ctx.expr(init),
                None => "undefined".to_string(),
            };
            ctx.bind(declarator.name.clone());
            bindings.push((declarator.name.clone(), init));
        }
        if let Some(resource) = resource {
            let init = ctx.expr(resource);
            bindings.push((ctx.fresh_name("res"), init));
        }
        if bindings.is_empty() {
            tracing::warn!(span = %stmt.span, "using statement without resources");
        }
        let converter = ctx.converter;
        let lines = converter.convert_statements(body, ctx);
        (bindings, lines)
    });

    let indent = ctx.indent();
    for (name, init) in bindings.iter().rev() {
        let release = release_line(name, *is_await, ctx);
        lines = vec![
            format!("const {name} = {init};"),
            format!(
                "try {} finally {}",
                writer::block(&lines, indent),
                writer::block(&[release], indent)
            ),
        ];
    }
    lines
}

fn release_line(name: &str, is_await: bool, ctx: &ConversionContext<'_>) -> String {
    let config = ctx.config();
    if is_await {
        let method = &config.async_release_method;
        format!("if ({name} && typeof {name}.{method} === \"function\") await {name}.{method}();")
    } else {
        let method = &config.release_method;
        format!("if ({name} && typeof {name}.{method} === \"function\") {name}.{method}();")
    }
}

#[cfg(test)]
mod tests {
    use crate::convert::Converter;
    use crate::semantic::EmptyModel;
    use crate::syntax::{Declarator, Expr, Stmt, StmtKind};

    fn open(name: &str) -> Option<Expr> {
        Some(Expr::method_call(Expr::ident(name), "Open", vec![]))
    }

    #[test]
    fn test_block_form_is_braced() {
        let stmt = Stmt::using(
            vec![Declarator::new("conn", open("factory"))],
            Some(Stmt::block(vec![Stmt::ret(Some(Expr::ident("conn")))])),
        );
        let out = Converter::new().convert(&stmt, &EmptyModel);
        assert_eq!(
            out.text,
            "{\n  const conn = factory.open();\n  try {\n    return conn;\n  } finally {\n    if (conn && typeof conn.dispose === \"function\") conn.dispose();\n  }\n}"
        );
    }

    #[test]
    fn test_multiple_resources_release_in_reverse() {
        let stmt = Stmt::using(
            vec![
                Declarator::new("a", open("first")),
                Declarator::new("b", open("second")),
            ],
            Some(Stmt::block(vec![])),
        );
        let text = Converter::new().convert(&stmt, &EmptyModel).text;
        let release_b = text.find("b.dispose();").unwrap();
        let release_a = text.find("a.dispose();").unwrap();
        assert!(release_b < release_a);
        assert!(text.find("const a").unwrap() < text.find("const b").unwrap());
    }

    #[test]
    fn test_later_declarators_see_earlier_names() {
        let stmt = Stmt::using(
            vec![
                Declarator::new("Conn", open("factory")),
                Declarator::new(
                    "Cmd",
                    Some(Expr::method_call(Expr::ident("Conn"), "Create", vec![])),
                ),
            ],
            Some(Stmt::block(vec![])),
        );
        let text = Converter::new().convert(&stmt, &EmptyModel).text;
        assert!(text.contains("const Cmd = Conn.create();"));
        assert!(!text.contains("this.conn"));
    }

    #[test]
    fn test_expression_resource_gets_synthetic_name() {
        let stmt = Stmt::new(StmtKind::Using {
            declarators: vec![],
            resource: Some(Expr::call(Expr::ident("lease"), vec![])),
            body: Some(Box::new(Stmt::block(vec![]))),
            is_await: false,
        });
        let text = Converter::new().convert(&stmt, &EmptyModel).text;
        assert!(text.contains("const __res0 = lease();"));
        assert!(text.contains("__res0.dispose();"));
    }

    #[test]
    fn test_async_release_is_awaited() {
        let stmt = Stmt::new(StmtKind::Using {
            declarators: vec![Declarator::new("stream", open("files"))],
            resource: None,
            body: None,
            is_await: true,
        });
        let text = Converter::new().convert(&stmt, &EmptyModel).text;
        assert_eq!(
            text,
            "const stream = files.open();\ntry {} finally {\n  if (stream && typeof stream.disposeAsync === \"function\") await stream.disposeAsync();\n}"
        );
    }
}
