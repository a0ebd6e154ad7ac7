//! Default statement handling, used when no strategy claims a node.

use super::expr::{param_list, verbatim};
use super::statements_of;
use crate::context::ConversionContext;
use crate::strategies::control_flow::{foreach, switch, using};
use crate::syntax::{CatchClause, Expr, ExprKind, ForInit, Stmt, StmtKind, simple_type_name};
use crate::writer;

pub(crate) fn convert_default(stmt: &Stmt, ctx: &mut ConversionContext<'_>) -> String {
    let hoisted = hoisted_out_vars(stmt);
    let text = convert_kind(stmt, ctx);
    if hoisted.is_empty() {
        return text;
    }
    let mut lines: Vec<String> = hoisted.iter().map(|name| format!("let {name};")).collect();
    lines.push(text);
    lines.join("\n")
}

fn convert_kind(stmt: &Stmt, ctx: &mut ConversionContext<'_>) -> String {
    match &stmt.kind {
        StmtKind::Block { .. } => ctx.block(stmt),
        StmtKind::LocalDecl {
            ty,
            declarators,
            is_const,
        } => {
            let keyword = if *is_const { "const" } else { "let" };
            let bindings: Vec<String> = declarators
                .iter()
                .map(|d| match &d.init {
                    Some(init) => {
                        let init = ctx.expr_expecting(init, ty.as_ref());
                        format!("{} = {init}", d.name)
                    }
                    None => d.name.clone(),
                })
                .collect();
            format!("{keyword} {};", bindings.join(", "))
        }
        StmtKind::Expression { expr } => format!("{};", ctx.expr(expr)),
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let condition = ctx.expr(condition);
            let then_branch = ctx.block(then_branch);
            match else_branch {
                None => format!("if ({condition}) {then_branch}"),
                // Keep `else if` chains flat unless the nested condition
                // needs hoisted declarations in front of it.
                Some(alt)
                    if matches!(alt.kind, StmtKind::If { .. })
                        && hoisted_out_vars(alt).is_empty() =>
                {
                    format!("if ({condition}) {then_branch} else {}", ctx.stmt(alt))
                }
                Some(alt) => format!("if ({condition}) {then_branch} else {}", ctx.block(alt)),
            }
        }
        StmtKind::While { condition, body } => {
            let condition = ctx.expr(condition);
            format!("while ({condition}) {}", ctx.block(body))
        }
        StmtKind::DoWhile { body, condition } => {
            let body = ctx.block(body);
            format!("do {body} while ({});", ctx.expr(condition))
        }
        StmtKind::For {
            init,
            condition,
            updates,
            body,
        } => {
            let init = match init {
                None => String::new(),
                Some(ForInit::Declaration { ty, declarators }) => {
                    let bindings: Vec<String> = declarators
                        .iter()
                        .map(|d| match &d.init {
                            Some(init) => {
                                let init = ctx.expr_expecting(init, ty.as_ref());
                                format!("{} = {init}", d.name)
                            }
                            None => d.name.clone(),
                        })
                        .collect();
                    format!("let {}", bindings.join(", "))
                }
                Some(ForInit::Expressions { exprs }) => {
                    super::expr::convert_all(exprs, ctx).join(", ")
                }
            };
            let condition = condition
                .as_ref()
                .map(|c| ctx.expr(c))
                .unwrap_or_default();
            let updates = super::expr::convert_all(updates, ctx).join(", ");
            let body = ctx.block(body);
            let header = [init, condition, updates]
                .iter()
                .map(|part| part.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            format!("for ({}) {body}", header.trim_end())
        }
        StmtKind::ForEach { .. } => foreach::convert_foreach(stmt, ctx),
        StmtKind::Return { value } => match value {
            Some(value) => format!("return {};", ctx.expr(value)),
            None => "return;".to_string(),
        },
        StmtKind::Break => "break;".to_string(),
        StmtKind::Continue => "continue;".to_string(),
        StmtKind::Throw { value } => {
            let binding = ctx.catch_binding().map(str::to_string);
            match (value, binding) {
                (Some(value), _) => format!("throw {};", ctx.expr(value)),
                (None, Some(binding)) => format!("throw {binding};"),
                (None, None) => verbatim("rethrow", stmt.span, "throw;", ctx),
            }
        }
        StmtKind::Try {
            body,
            catches,
            finally,
        } => {
            let mut out = format!("try {}", ctx.block(body));
            if !catches.is_empty() {
                out.push_str(" catch ");
                out.push_str(&catch_clauses(catches, ctx));
            }
            if let Some(finally) = finally {
                out.push_str(" finally ");
                out.push_str(&ctx.block(finally));
            }
            out
        }
        StmtKind::Using { .. } => using::convert_using(stmt, ctx),
        StmtKind::Switch { .. } => switch::convert_switch(stmt, ctx),
        // Single-threaded target: the critical section is just its body.
        StmtKind::Lock { body, .. } => ctx.block(body),
        StmtKind::LocalFunction {
            name,
            params,
            body,
            is_async,
        } => {
            let names: Vec<String> = params.iter().map(|p| p.name.clone()).collect();
            let (params, body) = ctx.with_scope(names, |ctx| {
                let params = param_list(params, ctx);
                (params, ctx.block(body))
            });
            let prefix = if *is_async { "async " } else { "" };
            format!("{prefix}function {name}({params}) {body}")
        }
        StmtKind::Yield { value } => match value {
            Some(value) => format!("yield {};", ctx.expr(value)),
            None => "return;".to_string(),
        },
        StmtKind::Empty => ";".to_string(),
        StmtKind::Other { node_kind, text } => verbatim(node_kind, stmt.span, text, ctx),
    }
}

/// Names declared by `out var` arguments in the statement's own
/// expressions. Nested statements hoist their own.
fn hoisted_out_vars(stmt: &Stmt) -> Vec<String> {
    let roots: Vec<&Expr> = match &stmt.kind {
        StmtKind::Expression { expr } => vec![expr],
        StmtKind::LocalDecl { declarators, .. } => {
            declarators.iter().filter_map(|d| d.init.as_ref()).collect()
        }
        StmtKind::Return { value: Some(value) } => vec![value],
        StmtKind::If { condition, .. } | StmtKind::While { condition, .. } => vec![condition],
        _ => Vec::new(),
    };
    let mut names = Vec::new();
    for root in roots {
        root.walk_shallow(&mut |expr| {
            if let ExprKind::Invocation { args, .. } = &expr.kind {
                for arg in args.iter().filter(|a| a.declares) {
                    if let ExprKind::Identifier { name } = &arg.expr.kind {
                        if !names.contains(name) {
                            names.push(name.clone());
                        }
                    }
                }
            }
        });
    }
    names
}

fn is_catch_all(clause: &CatchClause) -> bool {
    clause.filter.is_none()
        && clause
            .ty
            .as_ref()
            .is_none_or(|ty| simple_type_name(&ty.name) == "Exception")
}

/// Everything after `catch `: `(binding) { ... }`.
///
/// One untyped clause maps directly. Typed or filtered clauses share a
/// single binding and dispatch through an `if` chain that rethrows errors
/// no clause accepts.
fn catch_clauses(catches: &[CatchClause], ctx: &mut ConversionContext<'_>) -> String {
    if let Some(first) = catches.first().filter(|c| is_catch_all(c)) {
        let binding = match &first.name {
            Some(name) => name.clone(),
            None => ctx.fresh_name("err"),
        };
        let body = ctx.with_catch_binding(binding.clone(), |ctx| ctx.block(&first.body));
        return format!("({binding}) {body}");
    }

    let indent = ctx.indent();
    let err = ctx.fresh_name("err");
    let mut chain = String::new();
    let mut exhaustive = false;
    for (i, clause) in catches.iter().enumerate() {
        let mut tests = Vec::new();
        if let Some(ty) = &clause.ty {
            let name = simple_type_name(&ty.name);
            if name != "Exception" {
                tests.push(format!("{err} instanceof {name}"));
            }
        }
        if let Some(filter) = &clause.filter {
            let filter = match &clause.name {
                Some(name) => {
                    let cond = ctx.with_scope(vec![name.clone()], |ctx| ctx.expr(filter));
                    format!("(({name}) => {cond})({err})")
                }
                None => crate::writer::operand(&ctx.expr(filter)),
            };
            tests.push(filter);
        }

        let mut lines = Vec::new();
        if let Some(name) = &clause.name {
            lines.push(format!("const {name} = {err};"));
        }
        let body = ctx.with_catch_binding(err.clone(), |ctx| {
            let converter = ctx.converter;
            converter.convert_statements(statements_of(&clause.body), ctx)
        });
        lines.extend(body);
        let block = writer::block(&lines, indent);

        if i > 0 {
            chain.push_str(" else ");
        }
        if tests.is_empty() {
            chain.push_str(&block);
            exhaustive = true;
            break;
        }
        chain.push_str(&format!("if ({}) {block}", tests.join(" && ")));
    }
    if !exhaustive {
        chain.push_str(&format!(" else {{\n{indent}throw {err};\n}}"));
    }
    format!("({err}) {}", writer::block(&[chain], indent))
}
