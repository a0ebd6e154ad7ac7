//! Task helpers onto promises: `Task.Delay`, `Task.WhenAll`, ...

use crate::context::ConversionContext;
use crate::semantic::TypeCategory;
use crate::strategies::{MethodCall, is_type_name, member_access, method_call};
use crate::syntax::{Expr, ExprKind};
use crate::traits::Strategy;

pub struct TaskHelpers;

pub static TASK_HELPERS: TaskHelpers = TaskHelpers;

const TASK_TYPES: &[&str] = &["Task", "ValueTask"];

fn is_task_static(receiver: &Expr, expr: &Expr, ctx: &ConversionContext<'_>) -> bool {
    ctx.semantic
        .declared_in(expr, TypeCategory::Task)
        .unwrap_or_else(|| is_type_name(receiver, TASK_TYPES, ctx))
}

fn matches_call(call: &MethodCall<'_>, expr: &Expr, ctx: &ConversionContext<'_>) -> bool {
    let Some(receiver) = call.receiver else {
        return false;
    };
    if call.name == "ConfigureAwait" && call.arity() == 1 {
        return true;
    }
    is_task_static(receiver, expr, ctx)
        && matches!(
            (call.name, call.arity()),
            ("Delay", 1 | 2)
                | ("Run", 1 | 2)
                | ("WhenAll" | "WhenAny", 1..)
                | ("FromResult", 1)
                | ("Yield", 0)
        )
}

/// Argument list for `Promise.all`/`Promise.race`: already an array unless
/// a single argument is itself a task.
fn promise_array(args: &[crate::syntax::Argument], ctx: &mut ConversionContext<'_>) -> String {
    match args {
        [single] => {
            let is_collection = match &single.expr.kind {
                ExprKind::ArrayCreation { .. } => true,
                _ => ctx.semantic.category(&single.expr) != Some(TypeCategory::Task),
            };
            let text = ctx.expr(&single.expr);
            if is_collection { text } else { format!("[{text}]") }
        }
        _ => {
            let items: Vec<String> = args.iter().map(|a| ctx.expr(&a.expr)).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

impl Strategy<Expr> for TaskHelpers {
    fn name(&self) -> &'static str {
        "task-helpers"
    }

    fn matches(&self, expr: &Expr, ctx: &ConversionContext<'_>) -> bool {
        if let Some(call) = method_call(expr) {
            return matches_call(&call, expr, ctx);
        }
        match member_access(expr) {
            Some((receiver, "CompletedTask")) => is_task_static(receiver, expr, ctx),
            _ => false,
        }
    }

    fn convert(&self, expr: &Expr, ctx: &mut ConversionContext<'_>) -> String {
        let Some(call) = method_call(expr) else {
            // `Task.CompletedTask`
            return "Promise.resolve()".to_string();
        };
        let Some(receiver) = call.receiver else {
            return String::new();
        };
        match call.name {
            // Continuation context does not exist in the target.
            "ConfigureAwait" => ctx.expr(receiver),
            // A cancellation token argument is dropped.
            "Delay" => {
                let ms = call.arg(0).map(|e| ctx.expr(e)).unwrap_or_default();
                format!("new Promise((resolve) => setTimeout(resolve, {ms}))")
            }
            "Run" => {
                let work = call.arg(0).map(|e| ctx.expr(e)).unwrap_or_default();
                format!("Promise.resolve().then({work})")
            }
            "WhenAll" => format!("Promise.all({})", promise_array(call.args, ctx)),
            "WhenAny" => format!("Promise.race({})", promise_array(call.args, ctx)),
            "FromResult" => {
                let value = call.arg(0).map(|e| ctx.expr(e)).unwrap_or_default();
                format!("Promise.resolve({value})")
            }
            _ => "Promise.resolve()".to_string(),
        }
    }
}
