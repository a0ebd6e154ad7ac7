//! Sequence queries (`Where`, `Select`, `OrderBy`, ...) and materialization.
//!
//! Queries map onto array methods of the target. Each operator converts its
//! receiver first and its arguments second, so a chain keeps its
//! left-to-right order, and every lambda argument converts in its own scope.
//!
//! An `OrderBy` followed by `ThenBy` calls becomes one `sort` with a
//! comparator over all keys, applied to a copy of the source.

use crate::context::ConversionContext;
use crate::convert::expr::convert_default;
use crate::semantic::TypeCategory;
use crate::strategies::{
    MethodCall, declaring_category, is_static_receiver, is_type_name, method_call,
    receiver_category,
};
use crate::syntax::Expr;
use crate::traits::Strategy;
use crate::writer;

pub struct Materialize;

pub static MATERIALIZE: Materialize = Materialize;

pub struct SequenceQuery;

pub static SEQUENCE_QUERY: SequenceQuery = SequenceQuery;

/// Operator names with their accepted argument counts.
const OPERATORS: &[(&str, &[usize])] = &[
    ("Select", &[1]),
    ("Where", &[1]),
    ("Any", &[0, 1]),
    ("All", &[1]),
    ("First", &[0, 1]),
    ("FirstOrDefault", &[0, 1]),
    ("Single", &[0, 1]),
    ("SingleOrDefault", &[0, 1]),
    ("Last", &[0, 1]),
    ("LastOrDefault", &[0, 1]),
    ("OrderBy", &[1]),
    ("OrderByDescending", &[1]),
    ("ThenBy", &[1]),
    ("ThenByDescending", &[1]),
    ("Count", &[0, 1]),
    ("Sum", &[0, 1]),
    ("Min", &[0, 1]),
    ("Max", &[0, 1]),
    ("Average", &[0, 1]),
    ("Skip", &[1]),
    ("Take", &[1]),
    ("Distinct", &[0]),
    ("Reverse", &[0]),
    ("SelectMany", &[1]),
    ("Aggregate", &[1, 2, 3]),
    ("Contains", &[1]),
    ("Concat", &[1]),
];

/// Static `Enumerable` factories.
const FACTORIES: &[(&str, usize)] = &[("Range", 2), ("Repeat", 2), ("Empty", 0)];

fn accepts(name: &str, arity: usize) -> bool {
    OPERATORS
        .iter()
        .any(|(op, arities)| *op == name && arities.contains(&arity))
}

/// Whether `call` is a sequence operator applied to a value, not a
/// same-named method of some other type.
fn is_sequence_call(call: &MethodCall<'_>, expr: &Expr, ctx: &ConversionContext<'_>) -> bool {
    let Some(receiver) = call.receiver else {
        return false;
    };
    if is_static_receiver(receiver, ctx) {
        return false;
    }
    match declaring_category(expr, ctx) {
        Some(category) => category.is_sequence_like(),
        None => ctx
            .semantic
            .category(receiver)
            .is_none_or(|c| c.is_sequence_like() || c == TypeCategory::String),
    }
}

impl Strategy<Expr> for SequenceQuery {
    fn name(&self) -> &'static str {
        "sequence-query"
    }

    fn matches(&self, expr: &Expr, ctx: &ConversionContext<'_>) -> bool {
        let Some(call) = method_call(expr) else {
            return false;
        };
        if let Some(receiver) = call.receiver {
            if FACTORIES.contains(&(call.name, call.arity()))
                && is_type_name(receiver, &["Enumerable"], ctx)
            {
                return true;
            }
        }
        accepts(call.name, call.arity()) && is_sequence_call(&call, expr, ctx)
    }

    fn convert(&self, expr: &Expr, ctx: &mut ConversionContext<'_>) -> String {
        let Some(call) = method_call(expr) else {
            return String::new();
        };
        let Some(receiver) = call.receiver else {
            return String::new();
        };
        if FACTORIES.contains(&(call.name, call.arity())) && is_type_name(receiver, &["Enumerable"], ctx) {
            return factory(&call, ctx);
        }
        if matches!(
            call.name,
            "OrderBy" | "OrderByDescending" | "ThenBy" | "ThenByDescending"
        ) {
            return sort_chain(expr, ctx);
        }

        let category = receiver_category(&call, expr, ctx);
        let in_place_list = declaring_category(expr, ctx) == Some(TypeCategory::List);
        let source = ctx.operand(receiver);
        let args: Vec<String> = call.args.iter().map(|a| ctx.expr(&a.expr)).collect();
        let arg = |i: usize| args.get(i).cloned().unwrap_or_default();

        match (call.name, args.len()) {
            ("Select", _) => format!("{source}.map({})", arg(0)),
            ("Where", _) => format!("{source}.filter({})", arg(0)),
            ("Any", 0) => format!("({source}.{} > 0)", length_member(category)),
            ("Any", _) => format!("{source}.some({})", arg(0)),
            ("All", _) => format!("{source}.every({})", arg(0)),
            ("First" | "FirstOrDefault" | "Single" | "SingleOrDefault", 0) => {
                format!("{source}[0]")
            }
            ("First" | "FirstOrDefault" | "Single" | "SingleOrDefault", _) => {
                format!("{source}.find({})", arg(0))
            }
            ("Last" | "LastOrDefault", 0) => format!("{source}.at(-1)"),
            ("Last" | "LastOrDefault", _) => format!("{source}.findLast({})", arg(0)),
            ("Count", 0) => format!("{source}.{}", length_member(category)),
            ("Count", _) => format!("{source}.filter({}).length", arg(0)),
            ("Sum", 0) => format!("{source}.reduce((acc, v) => acc + v, 0)"),
            ("Sum", _) => format!("{source}.map({}).reduce((acc, v) => acc + v, 0)", arg(0)),
            ("Min" | "Max", n) => {
                let func = if call.name == "Min" { "min" } else { "max" };
                if n == 0 {
                    format!("Math.{func}(...{source})")
                } else {
                    format!("Math.{func}(...{source}.map({}))", arg(0))
                }
            }
            ("Average", n) => {
                let values = if n == 0 {
                    source
                } else {
                    format!("{source}.map({})", arg(0))
                };
                format!("((xs) => xs.reduce((acc, v) => acc + v, 0) / xs.length)({values})")
            }
            ("Skip", _) => format!("{source}.slice({})", arg(0)),
            ("Take", _) => format!("{source}.slice(0, {})", arg(0)),
            ("Distinct", _) => format!("[...new Set({source})]"),
            // `List.Reverse()` reverses in place; the query operator copies.
            ("Reverse", _) if in_place_list => format!("{source}.reverse()"),
            ("Reverse", _) => format!("[...{source}].reverse()"),
            ("SelectMany", _) => format!("{source}.flatMap({})", arg(0)),
            ("Aggregate", 1) => format!("{source}.reduce({})", arg(0)),
            ("Aggregate", 2) => format!("{source}.reduce({}, {})", arg(1), arg(0)),
            ("Aggregate", _) => {
                let result = writer::operand(&arg(2));
                format!("{result}({source}.reduce({}, {}))", arg(1), arg(0))
            }
            ("Contains", _) if category == Some(TypeCategory::Set) => {
                format!("{source}.has({})", arg(0))
            }
            ("Contains", _) => format!("{source}.includes({})", arg(0)),
            ("Concat", _) => format!("{source}.concat({})", arg(0)),
            _ => format!("{source}.{}({})", writer::camel_case(call.name), args.join(", ")),
        }
    }
}

fn length_member(category: Option<TypeCategory>) -> &'static str {
    if category == Some(TypeCategory::Set) {
        "size"
    } else {
        "length"
    }
}

fn factory(call: &MethodCall<'_>, ctx: &mut ConversionContext<'_>) -> String {
    let args: Vec<String> = call.args.iter().map(|a| ctx.expr(&a.expr)).collect();
    match (call.name, args.as_slice()) {
        ("Range", [start, count]) => {
            format!("Array.from({{ length: {count} }}, (_, i) => {} + i)", writer::operand(start))
        }
        ("Repeat", [value, count]) => format!("new Array({count}).fill({value})"),
        _ => "[]".to_string(),
    }
}

/// One sort key: selector and direction.
struct SortKey<'e> {
    selector: &'e Expr,
    descending: bool,
}

/// Unwind `base.OrderBy(k1).ThenBy(k2)...` from its outermost call.
fn collect_keys(expr: &Expr) -> Option<(&Expr, Vec<SortKey<'_>>)> {
    let mut keys = Vec::new();
    let mut current = expr;
    loop {
        let call = method_call(current)?;
        let receiver = call.receiver?;
        let selector = call.arg(0)?;
        let (descending, is_root) = match call.name {
            "OrderBy" => (false, true),
            "OrderByDescending" => (true, true),
            "ThenBy" => (false, false),
            "ThenByDescending" => (true, false),
            _ => return None,
        };
        keys.push(SortKey {
            selector,
            descending,
        });
        // A `ThenBy` whose receiver is not part of a visible chain sorts on
        // its own.
        let continues = method_call(receiver).is_some_and(|c| {
            matches!(
                c.name,
                "OrderBy" | "OrderByDescending" | "ThenBy" | "ThenByDescending"
            ) && c.arity() == 1
                && c.receiver.is_some()
        });
        if is_root || !continues {
            keys.reverse();
            return Some((receiver, keys));
        }
        current = receiver;
    }
}

fn sort_chain(expr: &Expr, ctx: &mut ConversionContext<'_>) -> String {
    let Some((base, keys)) = collect_keys(expr) else {
        return convert_default(expr, None, ctx);
    };
    let source = ctx.expr(base);
    let selectors: Vec<String> = keys
        .iter()
        .map(|k| writer::operand(&ctx.expr(k.selector)))
        .collect();

    let left = ctx.fresh_name("a");
    let right = ctx.fresh_name("b");
    let mut lines = Vec::new();
    for (key, selector) in keys.iter().zip(&selectors) {
        let x = ctx.fresh_name("x");
        let y = ctx.fresh_name("y");
        let (less, greater) = if key.descending { ("1", "-1") } else { ("-1", "1") };
        lines.push(format!(
            "const {x} = {selector}({left}), {y} = {selector}({right});"
        ));
        lines.push(format!(
            "if ({x} !== {y}) return {x} < {y} ? {less} : {greater};"
        ));
    }
    lines.push("return 0;".to_string());
    format!(
        "[...{source}].sort(({left}, {right}) => {})",
        writer::block(&lines, ctx.indent())
    )
}

const MATERIALIZERS: &[&str] = &["ToList", "ToArray", "AsEnumerable", "ToHashSet"];

impl Strategy<Expr> for Materialize {
    fn name(&self) -> &'static str {
        "materialize"
    }

    fn matches(&self, expr: &Expr, ctx: &ConversionContext<'_>) -> bool {
        method_call(expr).is_some_and(|call| {
            MATERIALIZERS.contains(&call.name)
                && call.arity() == 0
                && is_sequence_call(&call, expr, ctx)
        })
    }

    fn convert(&self, expr: &Expr, ctx: &mut ConversionContext<'_>) -> String {
        let Some(call) = method_call(expr) else {
            return String::new();
        };
        let Some(receiver) = call.receiver else {
            return String::new();
        };
        if call.name == "ToHashSet" {
            return format!("new Set({})", ctx.expr(receiver));
        }
        // Target sequences are already concrete.
        ctx.expr(receiver)
    }
}
