//! Diagnostic printing: `Console.WriteLine(x)` → `console.log(x)`.

use crate::context::ConversionContext;
use crate::convert::expr::convert_arguments;
use crate::semantic::{SymbolKind, TypeCategory};
use crate::strategies::{MethodCall, composite_format, is_type_name, method_call};
use crate::syntax::Expr;
use crate::traits::Strategy;

pub struct ConsolePrint;

pub static CONSOLE_PRINT: ConsolePrint = ConsolePrint;

const CONSOLE_TYPES: &[&str] = &["Console", "Debug", "Trace"];

/// Target `console` method for a print-like call, or `None`.
fn target_method(call: &MethodCall<'_>, expr: &Expr, ctx: &ConversionContext<'_>) -> Option<&'static str> {
    let Some(receiver) = call.receiver else {
        // A bare `print(...)` unless it resolves to a member of the component.
        let is_member = ctx
            .semantic
            .symbol(expr)
            .is_some_and(|s| s.kind == SymbolKind::Method);
        return (call.name == "print" && !is_member && !ctx.is_bound("print")).then_some("log");
    };

    // `Console.Error.WriteLine(...)`
    if let Some((inner, "Error")) = crate::strategies::member_access(receiver) {
        if is_type_name(inner, &["Console"], ctx)
            && matches!(call.name, "WriteLine" | "Write")
        {
            return Some("error");
        }
    }

    let declared = ctx.semantic.declared_in(expr, TypeCategory::Console);
    let is_console = declared.unwrap_or_else(|| is_type_name(receiver, CONSOLE_TYPES, ctx));
    if !is_console {
        return None;
    }
    match call.name {
        "WriteLine" | "Write" | "Print" | "Log" | "TraceInformation" => Some("log"),
        "Error" | "LogError" | "TraceError" | "Fail" => Some("error"),
        "LogWarning" | "TraceWarning" => Some("warn"),
        _ => None,
    }
}

impl Strategy<Expr> for ConsolePrint {
    fn name(&self) -> &'static str {
        "console-print"
    }

    fn matches(&self, expr: &Expr, ctx: &ConversionContext<'_>) -> bool {
        method_call(expr).is_some_and(|call| target_method(&call, expr, ctx).is_some())
    }

    fn convert(&self, expr: &Expr, ctx: &mut ConversionContext<'_>) -> String {
        let Some(call) = method_call(expr) else {
            return String::new();
        };
        let method = target_method(&call, expr, ctx).unwrap_or("log");
        let args = match call.args.split_first() {
            Some((first, rest)) if !rest.is_empty() => {
                match composite_format(&first.expr, rest, ctx) {
                    Some(text) => vec![text],
                    None => convert_arguments(call.args, ctx),
                }
            }
            _ => convert_arguments(call.args, ctx),
        };
        format!("console.{method}({})", args.join(", "))
    }
}
