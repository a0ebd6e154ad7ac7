//! Built-in conversion strategies.
//!
//! - [`idioms`]: one source call idiom each, at [`IDIOM_PRIORITY`](crate::IDIOM_PRIORITY)
//! - [`control_flow`]: structural rewrites, at [`STRUCTURAL_PRIORITY`](crate::STRUCTURAL_PRIORITY)
//!
//! Every predicate works without semantic resolution. When the model does
//! resolve a node, its answer takes precedence over the textual checks.

pub mod control_flow;
pub mod idioms;

use crate::context::ConversionContext;
use crate::diagnostics::Diagnostic;
use crate::semantic::{SymbolKind, TypeCategory};
use crate::syntax::{Argument, Expr, ExprKind, Literal, Stmt, TypeRef, simple_type_name};
use crate::traits::Strategy;
use crate::writer::escape_template;

/// Built-in expression strategies in registration order.
pub fn builtin_expr_strategies() -> Vec<&'static dyn Strategy<Expr>> {
    vec![
        &idioms::console::CONSOLE_PRINT,
        &idioms::tasks::TASK_HELPERS,
        &idioms::services::SERVICE_LOOKUP,
        &idioms::numeric::NUMERIC_HELPERS,
        &idioms::strings::STRING_HELPERS,
        &idioms::maps::MAP_LOOKUP,
        &idioms::collections::COLLECTION_PROPERTIES,
        &idioms::collections::COLLECTION_METHODS,
        &idioms::sequence::MATERIALIZE,
        &idioms::sequence::SEQUENCE_QUERY,
        &control_flow::match_expr::SWITCH_EXPRESSION,
    ]
}

/// Built-in statement strategies in registration order.
pub fn builtin_stmt_strategies() -> Vec<&'static dyn Strategy<Stmt>> {
    vec![
        &control_flow::foreach::FOR_EACH,
        &control_flow::using::RESOURCE_SCOPE,
        &control_flow::switch::SWITCH_STATEMENT,
    ]
}

/// An invocation viewed as `receiver.name<type_args>(args)`.
#[derive(Clone, Copy)]
pub struct MethodCall<'e> {
    /// Absent for bare calls such as `Print(x)`.
    pub receiver: Option<&'e Expr>,
    pub name: &'e str,
    pub type_args: &'e [TypeRef],
    pub args: &'e [Argument],
}

impl<'e> MethodCall<'e> {
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn arg(&self, index: usize) -> Option<&'e Expr> {
        self.args.get(index).map(|a| &a.expr)
    }
}

pub fn method_call(expr: &Expr) -> Option<MethodCall<'_>> {
    let ExprKind::Invocation {
        callee,
        type_args,
        args,
    } = &expr.kind
    else {
        return None;
    };
    let (receiver, name) = match &callee.kind {
        ExprKind::Member { receiver, name } => (Some(receiver.as_ref()), name.as_str()),
        ExprKind::Identifier { name } => (None, name.as_str()),
        _ => return None,
    };
    Some(MethodCall {
        receiver,
        name,
        type_args,
        args,
    })
}

/// `receiver.name` as (receiver, name).
pub fn member_access(expr: &Expr) -> Option<(&Expr, &str)> {
    match &expr.kind {
        ExprKind::Member { receiver, name } => Some((receiver.as_ref(), name.as_str())),
        _ => None,
    }
}

/// Whether `expr` names one of `types` statically: `Math`, `System.Math`.
/// A resolved symbol must be a type.
pub fn is_type_name(expr: &Expr, types: &[&str], ctx: &ConversionContext<'_>) -> bool {
    let name = match &expr.kind {
        ExprKind::Identifier { name } => name.as_str(),
        ExprKind::Member { name, .. } => name.as_str(),
        _ => return false,
    };
    if !types.contains(&name) {
        return false;
    }
    match ctx.semantic.symbol(expr) {
        Some(symbol) => symbol.kind == SymbolKind::Type,
        None => !matches!(expr.kind, ExprKind::Identifier { .. }) || !ctx.is_bound(name),
    }
}

/// Whether `expr` refers to a type rather than a value: a resolved type
/// symbol, or a well-known static type name.
pub fn is_static_receiver(expr: &Expr, ctx: &ConversionContext<'_>) -> bool {
    if let Some(symbol) = ctx.semantic.symbol(expr) {
        return matches!(symbol.kind, SymbolKind::Type | SymbolKind::Namespace);
    }
    match &expr.kind {
        ExprKind::Identifier { name } => {
            !ctx.is_bound(name)
                && (ctx.config().is_well_known_type(name) || is_keyword_type(name))
        }
        _ => false,
    }
}

/// Built-in type keywords used as static receivers: `int.Parse`, `string.Join`.
fn is_keyword_type(name: &str) -> bool {
    matches!(
        name,
        "int" | "long" | "short" | "byte" | "float" | "double" | "decimal" | "string" | "bool"
            | "char" | "object" | "uint" | "ulong"
    )
}

/// Category of the call's receiver, else of the type declaring the called
/// member. `None` when neither resolves.
pub fn receiver_category(
    call: &MethodCall<'_>,
    expr: &Expr,
    ctx: &ConversionContext<'_>,
) -> Option<TypeCategory> {
    call.receiver
        .and_then(|r| ctx.semantic.category(r))
        .or_else(|| declaring_category(expr, ctx))
}

/// Category of the type declaring the member `expr` resolves to.
pub fn declaring_category(expr: &Expr, ctx: &ConversionContext<'_>) -> Option<TypeCategory> {
    ctx.semantic
        .declaring_type(expr)
        .map(|t| TypeCategory::of_name(simple_type_name(t)))
}

/// Type argument or resolved type name used as a lookup key.
pub fn type_key(expr: &Expr, type_arg: Option<&TypeRef>, ctx: &ConversionContext<'_>) -> Option<String> {
    ctx.semantic
        .type_of(expr)
        .map(|t| t.simple_name().to_string())
        .or_else(|| type_arg.map(|t| t.simple_name().to_string()))
}

/// A variable, `this`, a member path over them, or a literal: reading it
/// twice has no side effects.
pub fn is_plain_operand(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Identifier { .. } | ExprKind::This | ExprKind::Literal { .. } => true,
        ExprKind::Member { receiver, .. } => is_plain_operand(receiver),
        ExprKind::Parenthesized { inner } => is_plain_operand(inner),
        _ => false,
    }
}

/// Operands of a rewrite that repeats some of them.
///
/// Plain operands are used in place. Any other operand becomes a parameter
/// of an arrow function called with the operand values in source order, so
/// each is evaluated once and the body never contains `await`.
#[derive(Default)]
pub struct SharedOperands {
    params: Vec<String>,
    values: Vec<String>,
}

impl SharedOperands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text standing for `expr`, already converted to `text`, in the body.
    pub fn share(&mut self, expr: &Expr, text: String, ctx: &mut ConversionContext<'_>) -> String {
        if is_plain_operand(expr) {
            return crate::writer::operand(&text);
        }
        let name = ctx.fresh_name("v");
        self.params.push(name.clone());
        self.values.push(text);
        name
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Convert `expr` and share it.
    pub fn operand(&mut self, expr: &Expr, ctx: &mut ConversionContext<'_>) -> String {
        let text = ctx.expr(expr);
        self.share(expr, text, ctx)
    }

    /// `body` as is when nothing was bound, else `((a, b) => body)(x, y)`.
    pub fn wrap(self, body: String) -> String {
        if self.params.is_empty() {
            return body;
        }
        format!(
            "(({}) => {body})({})",
            self.params.join(", "),
            self.values.join(", ")
        )
    }
}

enum FormatPiece<'s> {
    Text(String),
    Hole { index: usize, format: &'s str },
}

fn parse_composite(template: &str) -> Option<Vec<FormatPiece<'_>>> {
    let mut pieces = Vec::new();
    let mut text = String::new();
    let mut rest = template;
    while let Some(c) = rest.chars().next() {
        if rest.starts_with("{{") || rest.starts_with("}}") {
            text.push(c);
            rest = &rest[2..];
            continue;
        }
        if c == '{' {
            let close = rest.find('}')?;
            let inner = &rest[1..close];
            let split = inner.find([',', ':']).unwrap_or(inner.len());
            let index = inner[..split].trim().parse().ok()?;
            if !text.is_empty() {
                pieces.push(FormatPiece::Text(std::mem::take(&mut text)));
            }
            pieces.push(FormatPiece::Hole {
                index,
                format: &inner[split..],
            });
            rest = &rest[close + 1..];
            continue;
        }
        text.push(c);
        rest = &rest[c.len_utf8()..];
    }
    if !text.is_empty() {
        pieces.push(FormatPiece::Text(text));
    }
    Some(pieces)
}

/// `"{0} of {1}"` with arguments → `` `${a} of ${b}` ``.
///
/// `None` unless `template` is a string literal whose placeholders all
/// refer to supplied arguments. Alignment and format specifiers are
/// dropped with a `Lossy` diagnostic.
pub fn composite_format(
    template: &Expr,
    args: &[Argument],
    ctx: &mut ConversionContext<'_>,
) -> Option<String> {
    let ExprKind::Literal {
        value: Literal::String(text),
    } = &template.kind
    else {
        return None;
    };
    let pieces = parse_composite(text)?;
    let holes_valid = pieces.iter().all(|p| match p {
        FormatPiece::Hole { index, .. } => *index < args.len(),
        FormatPiece::Text(_) => true,
    });
    if !holes_valid {
        return None;
    }

    let values: Vec<String> = args.iter().map(|a| ctx.expr(&a.expr)).collect();
    let mut out = String::from("`");
    let mut dropped = false;
    for piece in &pieces {
        match piece {
            FormatPiece::Text(text) => out.push_str(&escape_template(text)),
            FormatPiece::Hole { index, format } => {
                dropped |= !format.is_empty();
                out.push_str("${");
                out.push_str(&values[*index]);
                out.push('}');
            }
        }
    }
    out.push('`');
    if dropped {
        ctx.report(Diagnostic::lossy(
            "composite_format",
            template.span,
            "alignment or format specifier dropped",
        ));
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Converter;
    use crate::semantic::EmptyModel;

    #[test]
    fn test_method_call_shapes() {
        let expr = Expr::method_call(Expr::ident("xs"), "Where", vec![Expr::ident("p")]);
        let call = method_call(&expr).unwrap();
        assert_eq!(call.name, "Where");
        assert_eq!(call.arity(), 1);
        assert!(call.receiver.is_some());

        let bare = Expr::call(Expr::ident("Print"), vec![]);
        assert!(method_call(&bare).unwrap().receiver.is_none());
        assert!(method_call(&Expr::ident("x")).is_none());
    }

    #[test]
    fn test_composite_format() {
        let converter = Converter::new();
        let mut ctx = ConversionContext::new(&converter, &EmptyModel);
        let args = vec![
            Argument::positional(Expr::ident("done")),
            Argument::positional(Expr::ident("total")),
        ];
        let out = composite_format(&Expr::string("{0} of {1:N0} {{x}}"), &args, &mut ctx);
        assert_eq!(out.as_deref(), Some("`${done} of ${total} {x}`"));
        assert_eq!(ctx.diagnostics().len(), 1);

        let missing = composite_format(&Expr::string("{2}"), &args, &mut ctx);
        assert!(missing.is_none());
        assert!(composite_format(&Expr::ident("fmt"), &args, &mut ctx).is_none());
    }

    #[test]
    fn test_static_receiver() {
        let converter = Converter::new();
        let ctx = ConversionContext::new(&converter, &EmptyModel);
        assert!(is_static_receiver(&Expr::ident("Math"), &ctx));
        assert!(is_static_receiver(&Expr::ident("int"), &ctx));
        assert!(!is_static_receiver(&Expr::ident("items"), &ctx));
        assert!(is_type_name(&Expr::member(Expr::ident("System"), "Math"), &["Math"], &ctx));
    }

    #[test]
    fn test_shared_operands_bind_calls_once() {
        let converter = Converter::new();
        let mut ctx = ConversionContext::new(&converter, &EmptyModel);
        let mut shared = SharedOperands::new();
        let plain = shared.operand(&Expr::member(Expr::ident("row"), "Name"), &mut ctx);
        let call = shared.operand(&Expr::call(Expr::ident("next"), vec![]), &mut ctx);
        assert_eq!(plain, "row.name");
        assert_eq!(call, "__v0");
        assert_eq!(
            shared.wrap(format!("{plain} + {call} + {call}")),
            "((__v0) => row.name + __v0 + __v0)(next())"
        );

        let untouched = SharedOperands::new();
        assert_eq!(untouched.wrap("x + x".to_string()), "x + x");
    }
}
