//! Multi-branch selection statements.
//!
//! Constant labels map onto a native `switch`. Pattern labels have no
//! native form: the scrutinee is bound once and the statement becomes
//! `switch (true)` with one boolean test per label, so `break` and
//! fall-through between empty sections keep their meaning.

use super::match_expr::pattern_test;
use crate::context::ConversionContext;
use crate::syntax::{Pattern, Stmt, StmtKind, SwitchLabel, SwitchSection};
use crate::traits::{Priority, STRUCTURAL_PRIORITY, Strategy};
use crate::writer::{self, indent_lines};

pub struct SwitchStatement;

pub static SWITCH_STATEMENT: SwitchStatement = SwitchStatement;

impl Strategy<Stmt> for SwitchStatement {
    fn name(&self) -> &'static str {
        "switch-statement"
    }

    fn priority(&self) -> Priority {
        STRUCTURAL_PRIORITY
    }

    fn matches(&self, stmt: &Stmt, _ctx: &ConversionContext<'_>) -> bool {
        matches!(stmt.kind, StmtKind::Switch { .. })
    }

    fn convert(&self, stmt: &Stmt, ctx: &mut ConversionContext<'_>) -> String {
        convert_switch(stmt, ctx)
    }
}

fn is_native(label: &SwitchLabel) -> bool {
    match label {
        SwitchLabel::Case { .. } | SwitchLabel::Default => true,
        SwitchLabel::Pattern { pattern, guard } => {
            guard.is_none() && matches!(pattern, Pattern::Constant { .. } | Pattern::Discard)
        }
    }
}

pub fn convert_switch(stmt: &Stmt, ctx: &mut ConversionContext<'_>) -> String {
    let StmtKind::Switch {
        scrutinee,
        sections,
    } = &stmt.kind
    else {
        return String::new();
    };
    let indent = ctx.indent();

    if sections.iter().flat_map(|s| &s.labels).all(is_native) {
        let subject = ctx.expr(scrutinee);
        let body = render_sections(sections, ctx, |label, ctx| match label {
            SwitchLabel::Case { value } | SwitchLabel::Pattern {
                pattern: Pattern::Constant { value },
                ..
            } => Some(ctx.expr(value)),
            _ => None,
        });
        return format!("switch ({subject}) {}", writer::block(&body, indent));
    }

    tracing::debug!(span = %stmt.span, "switch with pattern labels lowered to switch (true)");
    let subject = ctx.fresh_name("sw");
    let init = format!("const {subject} = {};", ctx.expr(scrutinee));
    let body = render_sections(sections, ctx, |label, ctx| match label {
        SwitchLabel::Case { value } => Some(format!("{subject} === {}", ctx.expr(value))),
        SwitchLabel::Pattern { pattern, guard } => {
            let test = pattern_test(&subject, pattern, ctx);
            let guard = guard.as_ref().map(|g| ctx.expr(g));
            Some(match (test.as_str(), guard) {
                ("true", None) => "true".to_string(),
                ("true", Some(guard)) => guard,
                (_, Some(guard)) => format!("{test} && {}", writer::operand(&guard)),
                (_, None) => test,
            })
        }
        SwitchLabel::Default => None,
    });
    let switch = format!("switch (true) {}", writer::block(&body, indent));
    writer::block(&[init, switch], indent)
}

/// Section lines: each label (`case x:` or `default:`) followed by the
/// section's statements one level deeper. `case_value` yields the case
/// expression for a label, `None` for `default`.
fn render_sections(
    sections: &[SwitchSection],
    ctx: &mut ConversionContext<'_>,
    mut case_value: impl FnMut(&SwitchLabel, &mut ConversionContext<'_>) -> Option<String>,
) -> Vec<String> {
    let indent = ctx.indent();
    let mut lines = Vec::new();
    for section in sections {
        for label in &section.labels {
            match case_value(label, ctx) {
                Some(value) => lines.push(format!("case {value}:")),
                None => lines.push("default:".to_string()),
            }
        }
        let converter = ctx.converter;
        let statements = converter.convert_statements(&section.statements, ctx);
        for statement in statements.iter().filter(|s| !s.is_empty()) {
            lines.push(indent_lines(statement, indent));
        }
    }
    lines
}
