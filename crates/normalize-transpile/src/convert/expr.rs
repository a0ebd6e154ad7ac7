//! Default expression handling, used when no strategy claims a node.

use crate::context::ConversionContext;
use crate::diagnostics::Diagnostic;
use crate::semantic::TypeCategory;
use crate::strategies::control_flow::match_expr;
use crate::syntax::{
    Argument, BinaryOp, DictEntry, Expr, ExprKind, Initializer, InterpolationPart, LambdaBody,
    Literal, MemberInit, Param, Span, TypeRef, UnaryOp,
};
use crate::writer::{camel_case, escape_template, object_key, quote};

pub(crate) fn convert_default(
    expr: &Expr,
    expected: Option<&TypeRef>,
    ctx: &mut ConversionContext<'_>,
) -> String {
    match &expr.kind {
        ExprKind::Identifier { name } => identifier(expr, name, ctx),
        ExprKind::This => ctx.config().instance_receiver.clone(),
        ExprKind::Base => "super".to_string(),
        ExprKind::Literal { value } => literal(value),
        ExprKind::InterpolatedString { parts } => interpolated_string(expr.span, parts, ctx),
        ExprKind::Binary { op, left, right } => binary(*op, left, right, ctx),
        ExprKind::Unary { op, operand } => unary(*op, operand, ctx),
        ExprKind::Assignment { op, target, value } => {
            let target = ctx.expr(target);
            let value = ctx.expr(value);
            format!("{target} {} {value}", op.target_symbol())
        }
        ExprKind::Member { receiver, name } => {
            let receiver = ctx.operand(receiver);
            format!("{receiver}.{}", camel_case(name))
        }
        ExprKind::ConditionalMember { receiver, name } => {
            let receiver = ctx.operand(receiver);
            format!("{receiver}?.{}", camel_case(name))
        }
        ExprKind::ElementAccess { receiver, index } => {
            let receiver = ctx.operand(receiver);
            let index = ctx.expr(index);
            format!("{receiver}[{index}]")
        }
        ExprKind::Invocation { callee, args, .. } => {
            let callee = ctx.operand(callee);
            let args = convert_arguments(args, ctx).join(", ");
            format!("{callee}({args})")
        }
        ExprKind::ObjectCreation {
            ty,
            args,
            initializer,
        } => object_creation(expr, ty.as_ref().or(expected), args, initializer.as_ref(), ctx),
        ExprKind::AnonymousObject { members } => object_literal(members, ctx),
        ExprKind::ArrayCreation {
            element_type,
            size,
            elements,
        } => match size {
            Some(size) if elements.is_empty() => {
                let size = ctx.expr(size);
                format!(
                    "new Array({size}).fill({})",
                    default_value(element_type.as_ref())
                )
            }
            _ => format!("[{}]", convert_all(elements, ctx).join(", ")),
        },
        ExprKind::Conditional {
            condition,
            when_true,
            when_false,
        } => {
            let condition = ctx.expr(condition);
            let when_true = ctx.expr(when_true);
            let when_false = ctx.expr(when_false);
            format!("{condition} ? {when_true} : {when_false}")
        }
        ExprKind::Lambda {
            params,
            body,
            is_async,
        } => lambda(params, body, *is_async, ctx),
        ExprKind::Await { operand } => format!("await {}", ctx.operand(operand)),
        // Types are erased in the target.
        ExprKind::Cast { operand, .. } => ctx.expr(operand),
        ExprKind::Is { operand, pattern } => match_expr::is_test(operand, pattern, ctx),
        ExprKind::NameOf { name } => quote(name.rsplit('.').next().unwrap_or(name)),
        ExprKind::Default { ty } => default_value(ty.as_ref().or(expected)).to_string(),
        ExprKind::Parenthesized { inner } => format!("({})", ctx.expr(inner)),
        ExprKind::SwitchExpr { scrutinee, arms } => {
            match_expr::convert_switch_expr(scrutinee, arms, ctx)
        }
        ExprKind::Other { node_kind, text } => verbatim(node_kind, expr.span, text, ctx),
    }
}

/// Resolve a bare identifier.
///
/// Lambda-bound names always stay as written. A resolved symbol decides by
/// its binding kind. Unresolved names fall back to source conventions:
/// `_name` and `Name` are instance members, `name` is a local.
fn identifier(expr: &Expr, name: &str, ctx: &mut ConversionContext<'_>) -> String {
    if ctx.is_bound(name) {
        return name.to_string();
    }
    let receiver = &ctx.config().instance_receiver;
    if let Some(symbol) = ctx.semantic.symbol(expr) {
        return if symbol.kind.is_instance_member() {
            format!("{receiver}.{}", camel_case(name))
        } else {
            name.to_string()
        };
    }
    if ctx.config().is_well_known_type(name) {
        return name.to_string();
    }
    match name.chars().next() {
        Some('_') => format!("{receiver}.{name}"),
        Some(c) if c.is_uppercase() => format!("{receiver}.{}", camel_case(name)),
        _ => name.to_string(),
    }
}

fn literal(value: &Literal) -> String {
    match value {
        Literal::Null => "null".to_string(),
        Literal::Bool(b) => b.to_string(),
        Literal::Number(text) => number_literal(text),
        Literal::String(s) => quote(s),
        Literal::Char(c) => quote(&c.to_string()),
    }
}

/// Strip type suffixes and digit separators: `1.5f` → `1.5`, `1_000L` → `1000`.
fn number_literal(text: &str) -> String {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let is_hex = cleaned.starts_with("0x") || cleaned.starts_with("0X");
    let suffixes: &[char] = if is_hex {
        &['u', 'U', 'l', 'L']
    } else {
        &['f', 'F', 'd', 'D', 'm', 'M', 'u', 'U', 'l', 'L']
    };
    let trimmed = cleaned.trim_end_matches(suffixes);
    if trimmed.is_empty() {
        cleaned
    } else {
        trimmed.to_string()
    }
}

fn interpolated_string(
    span: Span,
    parts: &[InterpolationPart],
    ctx: &mut ConversionContext<'_>,
) -> String {
    let mut out = String::from("`");
    for part in parts {
        match part {
            InterpolationPart::Text { text } => out.push_str(&escape_template(text)),
            InterpolationPart::Expr { expr, format } => {
                if let Some(format) = format {
                    ctx.report(Diagnostic::lossy(
                        "interpolated_string",
                        span,
                        format!("format specifier `{format}` dropped"),
                    ));
                }
                out.push_str("${");
                out.push_str(&ctx.expr(expr));
                out.push('}');
            }
        }
    }
    out.push('`');
    out
}

fn binary(op: BinaryOp, left: &Expr, right: &Expr, ctx: &mut ConversionContext<'_>) -> String {
    let left = binary_operand(op, left, ctx);
    let right = binary_operand(op, right, ctx);
    format!("{left} {} {right}", op.target_symbol())
}

/// `??` cannot be mixed with `&&`/`||` without parentheses in the target.
fn binary_operand(parent: BinaryOp, operand: &Expr, ctx: &mut ConversionContext<'_>) -> String {
    let text = ctx.expr(operand);
    match &operand.kind {
        ExprKind::Binary { op, .. }
            if (parent == BinaryOp::Coalesce && op.is_logical())
                || (parent.is_logical() && *op == BinaryOp::Coalesce) =>
        {
            format!("({text})")
        }
        _ => text,
    }
}

fn unary(op: UnaryOp, operand: &Expr, ctx: &mut ConversionContext<'_>) -> String {
    let operand = ctx.operand(operand);
    match op {
        UnaryOp::Not => format!("!{operand}"),
        UnaryOp::Neg => format!("-{operand}"),
        UnaryOp::Plus => format!("+{operand}"),
        UnaryOp::BitNot => format!("~{operand}"),
        UnaryOp::PreIncrement => format!("++{operand}"),
        UnaryOp::PreDecrement => format!("--{operand}"),
        UnaryOp::PostIncrement => format!("{operand}++"),
        UnaryOp::PostDecrement => format!("{operand}--"),
    }
}

/// Convert argument expressions in order. `out`/`ref` modifiers are dropped;
/// out-variable declarations are hoisted by the enclosing statement.
pub(crate) fn convert_arguments(args: &[Argument], ctx: &mut ConversionContext<'_>) -> Vec<String> {
    args.iter().map(|arg| ctx.expr(&arg.expr)).collect()
}

pub(crate) fn convert_all(exprs: &[Expr], ctx: &mut ConversionContext<'_>) -> Vec<String> {
    exprs.iter().map(|e| ctx.expr(e)).collect()
}

/// A single constructor argument that sizes the collection rather than
/// supplying its contents.
fn is_capacity(arg: &Expr, ctx: &ConversionContext<'_>) -> bool {
    match &arg.kind {
        ExprKind::Literal {
            value: Literal::Number(_),
        } => true,
        _ => ctx.semantic.category(arg) == Some(TypeCategory::Number),
    }
}

fn object_creation(
    expr: &Expr,
    ty: Option<&TypeRef>,
    args: &[Argument],
    initializer: Option<&Initializer>,
    ctx: &mut ConversionContext<'_>,
) -> String {
    let Some(ty) = ty else {
        ctx.report(Diagnostic::lossy(
            "object_creation",
            expr.span,
            "target type of `new()` is unknown; emitted a plain object",
        ));
        return match initializer {
            Some(Initializer::Object { members }) => object_literal(members, ctx),
            _ => "{}".to_string(),
        };
    };

    let category = ctx
        .semantic
        .category(expr)
        .filter(|c| *c != TypeCategory::Other)
        .unwrap_or_else(|| TypeCategory::of_name(ty.simple_name()));

    // Contents copied from a constructor argument, if any.
    let source = match args {
        [arg] if !is_capacity(&arg.expr, ctx) => Some(ctx.expr(&arg.expr)),
        _ => None,
    };

    match category {
        TypeCategory::List | TypeCategory::Sequence => {
            let mut items: Vec<String> = source.map(|s| format!("...{s}")).into_iter().collect();
            if let Some(Initializer::Collection { elements }) = initializer {
                items.extend(convert_all(elements, ctx));
            }
            format!("[{}]", items.join(", "))
        }
        TypeCategory::Set => {
            let elements = match initializer {
                Some(Initializer::Collection { elements }) => convert_all(elements, ctx),
                _ => Vec::new(),
            };
            match (source, elements.is_empty()) {
                (None, true) => "new Set()".to_string(),
                (Some(source), true) => format!("new Set({source})"),
                (None, false) => format!("new Set([{}])", elements.join(", ")),
                (Some(source), false) => {
                    format!("new Set([...{source}, {}])", elements.join(", "))
                }
            }
        }
        TypeCategory::Map => {
            let mut entries: Vec<String> =
                source.map(|s| format!("...{s}")).into_iter().collect();
            match initializer {
                Some(Initializer::Dictionary { entries: pairs }) => {
                    entries.extend(dictionary_entries(pairs, ctx));
                }
                Some(Initializer::Object { members }) => {
                    for member in members {
                        let value = ctx.expr(&member.value);
                        entries.push(format!("{}: {value}", object_key(&member.name)));
                    }
                }
                _ => {}
            }
            if entries.is_empty() {
                "{}".to_string()
            } else {
                format!("{{ {} }}", entries.join(", "))
            }
        }
        _ => {
            let name = ty.simple_name();
            let args = convert_arguments(args, ctx).join(", ");
            let created = format!("new {name}({args})");
            match initializer {
                None => created,
                Some(Initializer::Object { members }) if members.is_empty() => created,
                Some(Initializer::Object { members }) => {
                    format!("Object.assign({created}, {})", object_literal(members, ctx))
                }
                Some(Initializer::Collection { elements }) => {
                    let values = convert_all(elements, ctx);
                    populated(created, values, |target, value| {
                        format!("{target}.add({value});")
                    }, ctx)
                }
                Some(Initializer::Dictionary { entries }) => {
                    let values: Vec<String> = entries
                        .iter()
                        .map(|entry| {
                            let key = ctx.expr(&entry.key);
                            let value = ctx.expr(&entry.value);
                            format!("[{key}] = {value}")
                        })
                        .collect();
                    populated(created, values, |target, assignment| {
                        format!("{target}{assignment};")
                    }, ctx)
                }
            }
        }
    }
}

/// `(() => { const t = created; <one line per value>; return t; })()`
fn populated(
    created: String,
    values: Vec<String>,
    line: impl Fn(&str, &str) -> String,
    ctx: &mut ConversionContext<'_>,
) -> String {
    let target = ctx.fresh_name("obj");
    let mut lines = vec![format!("const {target} = {created};")];
    lines.extend(values.iter().map(|v| line(&target, v)));
    lines.push(format!("return {target};"));
    format!("(() => {})()", crate::writer::block(&lines, ctx.indent()))
}

fn dictionary_entries(entries: &[DictEntry], ctx: &mut ConversionContext<'_>) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let key = match &entry.key.kind {
                ExprKind::Literal {
                    value: Literal::String(s),
                } => object_key(s),
                _ => format!("[{}]", ctx.expr(&entry.key)),
            };
            let value = ctx.expr(&entry.value);
            format!("{key}: {value}")
        })
        .collect()
}

fn object_literal(members: &[MemberInit], ctx: &mut ConversionContext<'_>) -> String {
    if members.is_empty() {
        return "{}".to_string();
    }
    let fields: Vec<String> = members
        .iter()
        .map(|m| {
            let value = ctx.expr(&m.value);
            format!("{}: {value}", object_key(&camel_case(&m.name)))
        })
        .collect();
    format!("{{ {} }}", fields.join(", "))
}

fn lambda(
    params: &[Param],
    body: &LambdaBody,
    is_async: bool,
    ctx: &mut ConversionContext<'_>,
) -> String {
    let names: Vec<String> = params.iter().map(|p| p.name.clone()).collect();
    let (params, body) = ctx.with_scope(names, |ctx| {
        let params = param_list(params, ctx);
        let body = match body {
            LambdaBody::Expr(expr) => {
                let text = ctx.expr(expr);
                // An object literal body would parse as a block.
                if text.starts_with('{') {
                    format!("({text})")
                } else {
                    text
                }
            }
            LambdaBody::Block(block) => ctx.block(block),
        };
        (params, body)
    });
    let prefix = if is_async { "async " } else { "" };
    format!("{prefix}({params}) => {body}")
}

/// Parameter list text: `a, b = 1, ...rest`.
pub(crate) fn param_list(params: &[Param], ctx: &mut ConversionContext<'_>) -> String {
    params
        .iter()
        .map(|p| {
            if p.is_params {
                format!("...{}", p.name)
            } else if let Some(default) = &p.default {
                let default = ctx.expr_expecting(default, p.ty.as_ref());
                format!("{} = {default}", p.name)
            } else {
                p.name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Target value of `default(T)`.
pub(crate) fn default_value(ty: Option<&TypeRef>) -> &'static str {
    let Some(ty) = ty else {
        return "null";
    };
    if ty.nullable || ty.is_array() {
        return "null";
    }
    match TypeCategory::of_name(ty.simple_name()) {
        TypeCategory::Number => "0",
        TypeCategory::Bool => "false",
        _ => "null",
    }
}

/// Emit source text unchanged and record it as unsupported.
pub(crate) fn verbatim(
    node_kind: &str,
    span: Span,
    text: &str,
    ctx: &mut ConversionContext<'_>,
) -> String {
    tracing::warn!(node = node_kind, span = %span, "no conversion rule; emitting verbatim");
    ctx.report(Diagnostic::unsupported(node_kind, span));
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Converter;
    use crate::semantic::{EmptyModel, SemanticTable, SymbolInfo, SymbolKind};
    use crate::syntax::{AssignOp, Stmt};

    fn convert(expr: &Expr) -> String {
        Converter::new()
            .convert_expression(expr, None, &EmptyModel)
            .text
    }

    #[test]
    fn test_identifier_heuristic() {
        assert_eq!(convert(&Expr::ident("count")), "count");
        assert_eq!(convert(&Expr::ident("_count")), "this._count");
        assert_eq!(convert(&Expr::ident("Count")), "this.count");
        assert_eq!(convert(&Expr::ident("Math")), "Math");
    }

    #[test]
    fn test_identifier_binding_kind_wins() {
        let mut table = SemanticTable::new();
        table.insert_symbol(
            Span::new(0, 5),
            SymbolInfo {
                name: "Total".into(),
                kind: SymbolKind::Local,
                containing_type: None,
                ty: None,
            },
        );
        table.insert_symbol(
            Span::new(10, 15),
            SymbolInfo {
                name: "items".into(),
                kind: SymbolKind::Field,
                containing_type: Some("App.Cart".into()),
                ty: None,
            },
        );
        let converter = Converter::new();
        let local = Expr::ident("Total").with_span(0, 5);
        let field = Expr::ident("items").with_span(10, 15);
        assert_eq!(converter.convert_expression(&local, None, &table).text, "Total");
        assert_eq!(converter.convert_expression(&field, None, &table).text, "this.items");
    }

    #[test]
    fn test_literals() {
        assert_eq!(convert(&Expr::number("1.5f")), "1.5");
        assert_eq!(convert(&Expr::number("1_000L")), "1000");
        assert_eq!(convert(&Expr::number("0xFFu")), "0xFF");
        assert_eq!(convert(&Expr::number("0xAD")), "0xAD");
        assert_eq!(convert(&Expr::literal(Literal::Char('a'))), "\"a\"");
        assert_eq!(convert(&Expr::null()), "null");
    }

    #[test]
    fn test_strict_equality_and_coalesce() {
        let eq = Expr::binary(Expr::ident("a"), BinaryOp::Eq, Expr::ident("b"));
        assert_eq!(convert(&eq), "a === b");
        let coalesce = Expr::binary(Expr::ident("a"), BinaryOp::Coalesce, Expr::ident("b"));
        assert_eq!(convert(&coalesce), "a ?? b");
        let mixed = Expr::binary(
            Expr::binary(Expr::ident("a"), BinaryOp::Coalesce, Expr::ident("b")),
            BinaryOp::Or,
            Expr::ident("c"),
        );
        assert_eq!(convert(&mixed), "(a ?? b) || c");
    }

    #[test]
    fn test_coalesce_assignment() {
        let expr = Expr::new(ExprKind::Assignment {
            op: AssignOp::Coalesce,
            target: Box::new(Expr::ident("_cache")),
            value: Box::new(Expr::new_object(TypeRef::named("Cache"), vec![])),
        });
        assert_eq!(convert(&expr), "this._cache ??= new Cache()");
    }

    #[test]
    fn test_container_creation() {
        let map = TypeRef::generic("Map", vec![TypeRef::named("string"), TypeRef::named("int")]);
        assert_eq!(convert(&Expr::new_object(map, vec![])), "{}");
        let list = TypeRef::generic("List", vec![TypeRef::named("int")]);
        assert_eq!(convert(&Expr::new_object(list.clone(), vec![])), "[]");
        assert_eq!(convert(&Expr::new_object(list.clone(), vec![Expr::int(16)])), "[]");
        assert_eq!(
            convert(&Expr::new_object(list, vec![Expr::ident("other")])),
            "[...other]"
        );
        let set = TypeRef::generic("HashSet", vec![TypeRef::named("string")]);
        assert_eq!(convert(&Expr::new_object(set, vec![])), "new Set()");
    }

    #[test]
    fn test_target_typed_new_uses_expected_type() {
        let stmt = Stmt::typed_local(
            TypeRef::generic("List", vec![TypeRef::named("string")]),
            "names",
            Some(Expr::new(ExprKind::ObjectCreation {
                ty: None,
                args: vec![],
                initializer: None,
            })),
        );
        let out = Converter::new().convert(&stmt, &EmptyModel);
        assert_eq!(out.text, "let names = [];");
    }

    #[test]
    fn test_object_initializer() {
        let expr = Expr::new(ExprKind::ObjectCreation {
            ty: Some(TypeRef::named("Point")),
            args: vec![],
            initializer: Some(Initializer::Object {
                members: vec![
                    MemberInit {
                        name: "X".into(),
                        value: Expr::int(1),
                    },
                    MemberInit {
                        name: "Y".into(),
                        value: Expr::int(2),
                    },
                ],
            }),
        });
        assert_eq!(convert(&expr), "Object.assign(new Point(), { x: 1, y: 2 })");
    }

    #[test]
    fn test_dictionary_initializer() {
        let expr = Expr::new(ExprKind::ObjectCreation {
            ty: Some(TypeRef::generic(
                "Dictionary",
                vec![TypeRef::named("string"), TypeRef::named("int")],
            )),
            args: vec![],
            initializer: Some(Initializer::Dictionary {
                entries: vec![
                    DictEntry {
                        key: Expr::string("alpha"),
                        value: Expr::int(1),
                    },
                    DictEntry {
                        key: Expr::string("two words"),
                        value: Expr::int(2),
                    },
                    DictEntry {
                        key: Expr::ident("key"),
                        value: Expr::int(3),
                    },
                ],
            }),
        });
        assert_eq!(convert(&expr), "{ alpha: 1, \"two words\": 2, [key]: 3 }");
    }

    #[test]
    fn test_lambda_scope() {
        // `Name` inside the lambda is a member of the parameter, and the
        // parameter itself is never treated as an instance member.
        let lambda = Expr::lambda("Item", Expr::member(Expr::ident("Item"), "Name"));
        assert_eq!(convert(&lambda), "(Item) => Item.name");

        let object_body = Expr::lambda(
            "x",
            Expr::new(ExprKind::AnonymousObject {
                members: vec![MemberInit {
                    name: "Id".into(),
                    value: Expr::member(Expr::ident("x"), "Id"),
                }],
            }),
        );
        assert_eq!(convert(&object_body), "(x) => ({ id: x.id })");
    }

    #[test]
    fn test_interpolation_drops_format() {
        let expr = Expr::new(ExprKind::InterpolatedString {
            parts: vec![
                InterpolationPart::Text {
                    text: "Total: ".into(),
                },
                InterpolationPart::Expr {
                    expr: Expr::ident("total"),
                    format: Some("N2".into()),
                },
            ],
        });
        let out = Converter::new().convert_expression(&expr, None, &EmptyModel);
        assert_eq!(out.text, "`Total: ${total}`");
        assert_eq!(out.diagnostics.len(), 1);
    }

    #[test]
    fn test_array_creation() {
        let sized = Expr::new(ExprKind::ArrayCreation {
            element_type: Some(TypeRef::named("int")),
            size: Some(Box::new(Expr::int(4))),
            elements: vec![],
        });
        assert_eq!(convert(&sized), "new Array(4).fill(0)");
        let listed = Expr::new(ExprKind::ArrayCreation {
            element_type: None,
            size: None,
            elements: vec![Expr::int(1), Expr::int(2)],
        });
        assert_eq!(convert(&listed), "[1, 2]");
    }

    #[test]
    fn test_default_and_nameof() {
        assert_eq!(
            convert(&Expr::new(ExprKind::Default {
                ty: Some(TypeRef::named("bool"))
            })),
            "false"
        );
        assert_eq!(
            convert(&Expr::new(ExprKind::NameOf {
                name: "this.Title".into()
            })),
            "\"Title\""
        );
    }
}
