//! Each-element iteration: `foreach` → `for (const x of xs)`.
//!
//! Map-like sources iterate `Object.entries`, since maps convert to plain
//! objects. Streaming sources (`await foreach`) use `for await`.

use crate::context::ConversionContext;
use crate::syntax::{ForEachTarget, Stmt, StmtKind};
use crate::traits::{Priority, STRUCTURAL_PRIORITY, Strategy};

pub struct ForEach;

pub static FOR_EACH: ForEach = ForEach;

impl Strategy<Stmt> for ForEach {
    fn name(&self) -> &'static str {
        "for-each"
    }

    fn priority(&self) -> Priority {
        STRUCTURAL_PRIORITY
    }

    fn matches(&self, stmt: &Stmt, _ctx: &ConversionContext<'_>) -> bool {
        matches!(stmt.kind, StmtKind::ForEach { .. })
    }

    fn convert(&self, stmt: &Stmt, ctx: &mut ConversionContext<'_>) -> String {
        convert_foreach(stmt, ctx)
    }
}

pub fn convert_foreach(stmt: &Stmt, ctx: &mut ConversionContext<'_>) -> String {
    let StmtKind::ForEach {
        target,
        iterable,
        body,
        is_await,
    } = &stmt.kind
    else {
        return String::new();
    };

    let is_map = ctx.semantic.is_map_like(iterable).unwrap_or(false);
    let source = if is_map {
        let entries = format!("Object.entries({})", ctx.expr(iterable));
        match target {
            ForEachTarget::Name { .. } => {
                format!("{entries}.map(([key, value]) => ({{ key, value }}))")
            }
            ForEachTarget::Tuple { .. } => entries,
        }
    } else {
        ctx.expr(iterable)
    };

    let (binding, names) = match target {
        ForEachTarget::Name { name } => (name.clone(), vec![name.clone()]),
        ForEachTarget::Tuple { names } => (format!("[{}]", names.join(", ")), names.clone()),
    };
    let body = ctx.with_scope(names, |ctx| ctx.block(body));
    let keyword = if *is_await { "for await" } else { "for" };
    format!("{keyword} (const {binding} of {source}) {body}")
}
