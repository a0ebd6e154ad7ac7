//! String helpers and stringification.

use crate::context::ConversionContext;
use crate::diagnostics::Diagnostic;
use crate::semantic::TypeCategory;
use crate::strategies::{
    MethodCall, SharedOperands, composite_format, is_plain_operand, is_type_name, member_access,
    method_call,
};
use crate::syntax::Expr;
use crate::traits::Strategy;
use crate::writer::operand;

pub struct StringHelpers;

pub static STRING_HELPERS: StringHelpers = StringHelpers;

const STRING_TYPES: &[&str] = &["string", "String"];

/// Instance methods renamed in the target, with their arities.
const RENAMED: &[(&str, usize, &str)] = &[
    ("ToUpper", 0, "toUpperCase"),
    ("ToUpperInvariant", 0, "toUpperCase"),
    ("ToLower", 0, "toLowerCase"),
    ("ToLowerInvariant", 0, "toLowerCase"),
    ("Replace", 2, "replaceAll"),
    ("Contains", 1, "includes"),
    ("Substring", 1, "substring"),
];

fn is_static_string_call(call: &MethodCall<'_>, ctx: &ConversionContext<'_>) -> bool {
    let Some(receiver) = call.receiver else {
        return false;
    };
    is_type_name(receiver, STRING_TYPES, ctx)
        && matches!(
            (call.name, call.arity()),
            ("IsNullOrEmpty" | "IsNullOrWhiteSpace", 1)
                | ("Join", 2..)
                | ("Concat", 1..)
                | ("Format", 1..)
        )
}

/// Whether an instance call targets a string. Unresolved receivers count,
/// except for `Contains`, which sequences share.
fn is_string_instance_call(call: &MethodCall<'_>, ctx: &ConversionContext<'_>) -> bool {
    let Some(receiver) = call.receiver else {
        return false;
    };
    let renamed = RENAMED
        .iter()
        .any(|(name, arity, _)| *name == call.name && *arity == call.arity())
        || (call.name == "Substring" && call.arity() == 2);
    if !renamed || is_type_name(receiver, STRING_TYPES, ctx) {
        return false;
    }
    match ctx.semantic.category(receiver) {
        Some(category) => category == TypeCategory::String,
        None => call.name != "Contains",
    }
}

impl Strategy<Expr> for StringHelpers {
    fn name(&self) -> &'static str {
        "string-helpers"
    }

    fn matches(&self, expr: &Expr, ctx: &ConversionContext<'_>) -> bool {
        if let Some((receiver, "Empty")) = member_access(expr) {
            return is_type_name(receiver, STRING_TYPES, ctx);
        }
        let Some(call) = method_call(expr) else {
            return false;
        };
        if call.name == "ToString" {
            return true;
        }
        if is_static_string_call(&call, ctx) {
            // `string.Format` only converts with a literal template.
            return call.name != "Format" || has_literal_template(&call);
        }
        is_string_instance_call(&call, ctx)
    }

    fn convert(&self, expr: &Expr, ctx: &mut ConversionContext<'_>) -> String {
        if member_access(expr).is_some() {
            return "\"\"".to_string();
        }
        let Some(call) = method_call(expr) else {
            return String::new();
        };

        if call.name == "ToString" {
            let value = match call.receiver {
                Some(receiver) => ctx.expr(receiver),
                None => ctx.config().instance_receiver.clone(),
            };
            if call.arity() > 0 {
                ctx.report(Diagnostic::lossy(
                    "invocation",
                    expr.span,
                    "`ToString` format argument dropped",
                ));
            }
            // Never the value's own method: it may be null.
            return format!("String({value})");
        }

        if is_static_string_call(&call, ctx) {
            return convert_static(&call, ctx);
        }

        let Some(receiver) = call.receiver else {
            return String::new();
        };
        if let ("Substring", [start, length]) = (call.name, call.args) {
            return substring(receiver, &start.expr, &length.expr, ctx);
        }
        let target = ctx.operand(receiver);
        let args: Vec<String> = call.args.iter().map(|a| ctx.expr(&a.expr)).collect();
        let method = RENAMED
            .iter()
            .find(|(name, _, _)| *name == call.name)
            .map_or(call.name, |(_, _, target)| *target);
        format!("{target}.{method}({})", args.join(", "))
    }
}

/// `s.Substring(start, length)` → `s.substring(start, start + length)`.
/// A computed start is evaluated once, after the receiver.
fn substring(
    receiver: &Expr,
    start: &Expr,
    length: &Expr,
    ctx: &mut ConversionContext<'_>,
) -> String {
    let mut shared = SharedOperands::new();
    if is_plain_operand(start) {
        let target = ctx.operand(receiver);
        let start = ctx.expr(start);
        let length = ctx.operand(length);
        return format!("{target}.substring({start}, {} + {length})", operand(&start));
    }
    let target = shared.operand(receiver, ctx);
    let start = shared.operand(start, ctx);
    let length = shared.operand(length, ctx);
    shared.wrap(format!("{target}.substring({start}, {start} + {length})"))
}

fn has_literal_template(call: &MethodCall<'_>) -> bool {
    matches!(
        call.arg(0).map(|e| &e.kind),
        Some(crate::syntax::ExprKind::Literal {
            value: crate::syntax::Literal::String(_)
        })
    )
}

fn convert_static(call: &MethodCall<'_>, ctx: &mut ConversionContext<'_>) -> String {
    match call.name {
        "IsNullOrEmpty" => {
            let value = call.arg(0).map(|e| ctx.operand(e)).unwrap_or_default();
            format!("!{value}")
        }
        "IsNullOrWhiteSpace" => {
            let Some(arg) = call.arg(0) else {
                return "true".to_string();
            };
            let mut shared = SharedOperands::new();
            let value = shared.operand(arg, ctx);
            shared.wrap(format!("(!{value} || !{value}.trim())"))
        }
        "Join" => {
            let args: Vec<String> = call.args.iter().map(|a| ctx.expr(&a.expr)).collect();
            match args.split_first() {
                Some((separator, [items])) => format!("{}.join({separator})", operand(items)),
                Some((separator, items)) => format!("[{}].join({separator})", items.join(", ")),
                None => "\"\"".to_string(),
            }
        }
        "Concat" => {
            let args: Vec<String> = call.args.iter().map(|a| ctx.expr(&a.expr)).collect();
            format!("[{}].join(\"\")", args.join(", "))
        }
        _ => {
            let Some((template, rest)) = call.args.split_first() else {
                return "\"\"".to_string();
            };
            composite_format(&template.expr, rest, ctx).unwrap_or_else(|| ctx.expr(&template.expr))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::convert::Converter;
    use crate::semantic::EmptyModel;
    use crate::syntax::Expr;

    fn convert(expr: &Expr) -> String {
        Converter::new()
            .convert_expression(expr, None, &EmptyModel)
            .text
    }

    #[test]
    fn test_to_string_is_null_safe() {
        let expr = Expr::method_call(Expr::ident("count"), "ToString", vec![]);
        assert_eq!(convert(&expr), "String(count)");

        let formatted = Expr::method_call(Expr::ident("price"), "ToString", vec![Expr::string("C")]);
        let out = Converter::new().convert_expression(&formatted, None, &EmptyModel);
        assert_eq!(out.text, "String(price)");
        assert_eq!(out.diagnostics.len(), 1);
    }

    #[test]
    fn test_static_helpers() {
        let empty = Expr::method_call(Expr::ident("string"), "IsNullOrEmpty", vec![Expr::ident("s")]);
        assert_eq!(convert(&empty), "!s");
        let blank = Expr::method_call(
            Expr::ident("string"),
            "IsNullOrWhiteSpace",
            vec![Expr::ident("s")],
        );
        assert_eq!(convert(&blank), "(!s || !s.trim())");
        let join = Expr::method_call(
            Expr::ident("string"),
            "Join",
            vec![Expr::string(", "), Expr::ident("names")],
        );
        assert_eq!(convert(&join), "names.join(\", \")");
        assert_eq!(convert(&Expr::member(Expr::ident("string"), "Empty")), "\"\"");
    }

    #[test]
    fn test_format() {
        let expr = Expr::method_call(
            Expr::ident("string"),
            "Format",
            vec![Expr::string("{0}/{1}"), Expr::ident("a"), Expr::ident("b")],
        );
        assert_eq!(convert(&expr), "`${a}/${b}`");
    }

    #[test]
    fn test_instance_renames() {
        let upper = Expr::method_call(Expr::ident("name"), "ToUpper", vec![]);
        assert_eq!(convert(&upper), "name.toUpperCase()");
        let replace = Expr::method_call(
            Expr::ident("s"),
            "Replace",
            vec![Expr::string("a"), Expr::string("b")],
        );
        assert_eq!(convert(&replace), "s.replaceAll(\"a\", \"b\")");
        let sub = Expr::method_call(Expr::ident("s"), "Substring", vec![Expr::int(1), Expr::int(3)]);
        assert_eq!(convert(&sub), "s.substring(1, 1 + 3)");
    }

    #[test]
    fn test_computed_operands_evaluate_once() {
        let blank = Expr::method_call(
            Expr::ident("string"),
            "IsNullOrWhiteSpace",
            vec![Expr::call(Expr::ident("read"), vec![])],
        );
        assert_eq!(convert(&blank), "((__v0) => (!__v0 || !__v0.trim()))(read())");

        let sub = Expr::method_call(
            Expr::ident("s"),
            "Substring",
            vec![Expr::call(Expr::ident("next"), vec![]), Expr::int(3)],
        );
        assert_eq!(
            convert(&sub),
            "((__v0) => s.substring(__v0, __v0 + 3))(next())"
        );
    }
}
