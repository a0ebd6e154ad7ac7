//! Numeric helpers: `Math`/`MathF` calls and constants, number parsing.

use crate::context::ConversionContext;
use crate::semantic::TypeCategory;
use crate::strategies::{
    MethodCall, SharedOperands, is_plain_operand, is_type_name, member_access, method_call,
};
use crate::syntax::Expr;
use crate::traits::Strategy;
use crate::writer::camel_case;

pub struct NumericHelpers;

pub static NUMERIC_HELPERS: NumericHelpers = NumericHelpers;

const MATH_TYPES: &[&str] = &["Math", "MathF"];
const INTEGER_TYPES: &[&str] = &["int", "long", "short", "byte", "Int32", "Int64", "Int16"];
const FLOAT_TYPES: &[&str] = &["float", "double", "decimal", "Single", "Double", "Decimal"];

fn is_math(receiver: &Expr, expr: &Expr, ctx: &ConversionContext<'_>) -> bool {
    ctx.semantic
        .declared_in(expr, TypeCategory::Math)
        .unwrap_or_else(|| is_type_name(receiver, MATH_TYPES, ctx))
}

/// `parseInt` or `parseFloat` for `int.Parse`-style receivers.
fn parser_for(receiver: &Expr, ctx: &ConversionContext<'_>) -> Option<&'static str> {
    if is_type_name(receiver, INTEGER_TYPES, ctx) {
        Some("parseInt")
    } else if is_type_name(receiver, FLOAT_TYPES, ctx) {
        Some("parseFloat")
    } else {
        None
    }
}

fn parse_call(parser: &str, text: &str) -> String {
    if parser == "parseInt" {
        format!("parseInt({text}, 10)")
    } else {
        format!("parseFloat({text})")
    }
}

fn math_function(name: &str) -> String {
    match name {
        "Ceiling" => "ceil".to_string(),
        "Truncate" => "trunc".to_string(),
        "Log" => "log".to_string(),
        other => camel_case(other),
    }
}

/// A bare `clamp(v, lo, hi)`: imported from `Math`, or an unresolved name
/// that no enclosing function binds.
fn is_bare_clamp(call: &MethodCall<'_>, expr: &Expr, ctx: &ConversionContext<'_>) -> bool {
    if call.receiver.is_some() || call.arity() != 3 || !matches!(call.name, "Clamp" | "clamp") {
        return false;
    }
    if let Some(declared) = ctx.semantic.declared_in(expr, TypeCategory::Math) {
        return declared;
    }
    ctx.semantic.symbol(expr).is_none() && !ctx.is_bound(call.name)
}

fn matches_call(call: &MethodCall<'_>, expr: &Expr, ctx: &ConversionContext<'_>) -> bool {
    let Some(receiver) = call.receiver else {
        return is_bare_clamp(call, expr, ctx);
    };
    if is_math(receiver, expr, ctx) {
        return true;
    }
    match (call.name, call.arity()) {
        ("Parse", 1) | ("TryParse", 2) => parser_for(receiver, ctx).is_some(),
        _ => false,
    }
}

impl Strategy<Expr> for NumericHelpers {
    fn name(&self) -> &'static str {
        "numeric-helpers"
    }

    fn matches(&self, expr: &Expr, ctx: &ConversionContext<'_>) -> bool {
        if let Some(call) = method_call(expr) {
            return matches_call(&call, expr, ctx);
        }
        match member_access(expr) {
            Some((receiver, _)) => is_math(receiver, expr, ctx),
            None => false,
        }
    }

    fn convert(&self, expr: &Expr, ctx: &mut ConversionContext<'_>) -> String {
        if let Some((_, name)) = member_access(expr) {
            return match name {
                "PI" | "E" => format!("Math.{name}"),
                "Tau" => "(2 * Math.PI)".to_string(),
                other => format!("Math.{}", camel_case(other)),
            };
        }
        let Some(call) = method_call(expr) else {
            return String::new();
        };
        let Some(receiver) = call.receiver else {
            return match call.args {
                [value, low, high] => clamp(&value.expr, &low.expr, &high.expr, ctx),
                _ => String::new(),
            };
        };
        if let ("Round", [value, digits]) = (call.name, call.args) {
            return round_to(&value.expr, &digits.expr, ctx);
        }
        if let ("Clamp", [value, low, high]) = (call.name, call.args) {
            return clamp(&value.expr, &low.expr, &high.expr, ctx);
        }
        let args: Vec<String> = call.args.iter().map(|a| ctx.expr(&a.expr)).collect();

        if let Some(parser) = parser_for(receiver, ctx).filter(|_| !is_math(receiver, expr, ctx)) {
            return match args.as_slice() {
                [text, out] => format!("!Number.isNaN({out} = {})", parse_call(parser, text)),
                _ => parse_call(parser, &args.join(", ")),
            };
        }

        format!("Math.{}({})", math_function(call.name), args.join(", "))
    }
}

// No single-call equivalent in the target.
fn clamp(value: &Expr, low: &Expr, high: &Expr, ctx: &mut ConversionContext<'_>) -> String {
    let value = ctx.expr(value);
    let low = ctx.expr(low);
    let high = ctx.expr(high);
    format!("Math.min(Math.max({value}, {low}), {high})")
}

/// `Round(x, digits)`; a computed digit count is evaluated once.
fn round_to(value: &Expr, digits: &Expr, ctx: &mut ConversionContext<'_>) -> String {
    if is_plain_operand(digits) {
        let value = ctx.operand(value);
        let scale = format!("10 ** {}", ctx.operand(digits));
        return format!("(Math.round({value} * {scale}) / {scale})");
    }
    let mut shared = SharedOperands::new();
    let value = shared.operand(value, ctx);
    let digits = shared.operand(digits, ctx);
    let scale = format!("10 ** {digits}");
    shared.wrap(format!("(Math.round({value} * {scale}) / {scale})"))
}

#[cfg(test)]
mod tests {
    use crate::convert::Converter;
    use crate::semantic::{EmptyModel, SemanticTable, SymbolInfo, SymbolKind};
    use crate::syntax::{Argument, Expr, Span};

    fn convert(expr: &Expr) -> String {
        Converter::new()
            .convert_expression(expr, None, &EmptyModel)
            .text
    }

    #[test]
    fn test_clamp_expands() {
        let expr = Expr::method_call(
            Expr::ident("Math"),
            "Clamp",
            vec![Expr::ident("v"), Expr::int(0), Expr::int(10)],
        );
        assert_eq!(convert(&expr), "Math.min(Math.max(v, 0), 10)");
    }

    #[test]
    fn test_math_calls_and_constants() {
        let floor = Expr::method_call(Expr::ident("MathF"), "Floor", vec![Expr::ident("x")]);
        assert_eq!(convert(&floor), "Math.floor(x)");
        let ceil = Expr::method_call(Expr::ident("Math"), "Ceiling", vec![Expr::ident("x")]);
        assert_eq!(convert(&ceil), "Math.ceil(x)");
        assert_eq!(convert(&Expr::member(Expr::ident("Math"), "PI")), "Math.PI");
    }

    #[test]
    fn test_round_to_digits() {
        let expr = Expr::method_call(
            Expr::ident("Math"),
            "Round",
            vec![Expr::ident("price"), Expr::int(2)],
        );
        assert_eq!(convert(&expr), "(Math.round(price * 10 ** 2) / 10 ** 2)");

        let computed = Expr::method_call(
            Expr::ident("Math"),
            "Round",
            vec![Expr::ident("p"), Expr::call(Expr::ident("digits"), vec![])],
        );
        assert_eq!(
            convert(&computed),
            "((__v0) => (Math.round(p * 10 ** __v0) / 10 ** __v0))(digits())"
        );
    }

    #[test]
    fn test_bare_clamp_expands() {
        for name in ["clamp", "Clamp"] {
            let expr = Expr::call(
                Expr::ident(name),
                vec![Expr::ident("v"), Expr::int(0), Expr::int(10)],
            );
            assert_eq!(convert(&expr), "Math.min(Math.max(v, 0), 10)");
        }
    }

    #[test]
    fn test_bare_clamp_follows_resolution() {
        let call = |start: u32| {
            Expr::call(
                Expr::ident("Clamp"),
                vec![Expr::ident("v"), Expr::int(0), Expr::int(10)],
            )
            .with_span(start, start + 16)
        };
        let symbol = |containing: &str| SymbolInfo {
            name: "Clamp".into(),
            kind: SymbolKind::Method,
            containing_type: Some(containing.into()),
            ty: None,
        };

        let mut imported = SemanticTable::new();
        imported.insert_symbol(Span::new(0, 16), symbol("System.Math"));
        let out = Converter::new().convert_expression(&call(0), None, &imported);
        assert_eq!(out.text, "Math.min(Math.max(v, 0), 10)");

        let mut own = SemanticTable::new();
        own.insert_symbol(Span::new(0, 16), symbol("Slider"));
        let out = Converter::new().convert_expression(&call(0), None, &own);
        assert_eq!(out.text, "this.clamp(v, 0, 10)");
    }

    #[test]
    fn test_parse() {
        let int = Expr::method_call(Expr::ident("int"), "Parse", vec![Expr::ident("s")]);
        assert_eq!(convert(&int), "parseInt(s, 10)");
        let double = Expr::method_call(Expr::ident("double"), "Parse", vec![Expr::ident("s")]);
        assert_eq!(convert(&double), "parseFloat(s)");
        let try_parse = Expr::generic_call(
            Some(Expr::ident("int")),
            "TryParse",
            vec![],
            vec![Argument::positional(Expr::ident("s")), Argument::out_var("n")],
        );
        assert_eq!(convert(&try_parse), "!Number.isNaN(n = parseInt(s, 10))");
    }
}
