//! Dictionary lookups on plain target objects.

use crate::context::ConversionContext;
use crate::semantic::TypeCategory;
use crate::strategies::{MethodCall, is_static_receiver, method_call, receiver_category};
use crate::syntax::Expr;
use crate::traits::Strategy;

pub struct MapLookup;

pub static MAP_LOOKUP: MapLookup = MapLookup;

fn is_map_call(call: &MethodCall<'_>, expr: &Expr, ctx: &ConversionContext<'_>) -> bool {
    let Some(receiver) = call.receiver else {
        return false;
    };
    if is_static_receiver(receiver, ctx) {
        return false;
    }
    let category = receiver_category(call, expr, ctx);
    match (call.name, call.arity()) {
        ("ContainsKey" | "ContainsValue" | "GetValueOrDefault", 1)
        | ("TryGetValue", 2)
        | ("GetValueOrDefault", 2)
        | ("Add", 2) => category.is_none_or(|c| c == TypeCategory::Map),
        // `Remove` is too common a name to guess at.
        ("Remove", 1) => category == Some(TypeCategory::Map),
        _ => false,
    }
}

impl Strategy<Expr> for MapLookup {
    fn name(&self) -> &'static str {
        "map-lookup"
    }

    fn matches(&self, expr: &Expr, ctx: &ConversionContext<'_>) -> bool {
        method_call(expr).is_some_and(|call| is_map_call(&call, expr, ctx))
    }

    fn convert(&self, expr: &Expr, ctx: &mut ConversionContext<'_>) -> String {
        let Some(call) = method_call(expr) else {
            return String::new();
        };
        let Some(receiver) = call.receiver else {
            return String::new();
        };
        let map = ctx.operand(receiver);
        let args: Vec<String> = call.args.iter().map(|a| ctx.expr(&a.expr)).collect();
        match (call.name, args.as_slice()) {
            ("ContainsKey", [key]) => format!("({key} in {map})"),
            ("ContainsValue", [value]) => format!("Object.values({map}).includes({value})"),
            ("TryGetValue", [key, out]) => format!("(({out} = {map}[{key}]) !== undefined)"),
            ("GetValueOrDefault", [key]) => format!("{map}[{key}]"),
            ("GetValueOrDefault", [key, fallback]) => format!("({map}[{key}] ?? {fallback})"),
            ("Add", [key, value]) => format!("{map}[{key}] = {value}"),
            ("Remove", [key]) => format!("delete {map}[{key}]"),
            _ => format!("{map}.{}({})", crate::writer::camel_case(call.name), args.join(", ")),
        }
    }
}
