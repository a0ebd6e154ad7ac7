//! Pattern tests and value-producing switch expressions.
//!
//! A switch expression has no target equivalent and becomes an immediately
//! invoked arrow function:
//!
//! ```text
//! (() => {
//!   const __match0 = <scrutinee>;
//!   if (<arm 1 test>) return <arm 1 value>;
//!   ...
//!   return <default>;
//! })()
//! ```
//!
//! The function always ends in an unconditional return: the discard arm's
//! value, or `undefined` when the source has none.

use crate::context::ConversionContext;
use crate::semantic::TypeCategory;
use crate::strategies::is_plain_operand;
use crate::syntax::{Expr, ExprKind, Literal, Pattern, SwitchArm, TypeRef};
use crate::traits::{STRUCTURAL_PRIORITY, Strategy};
use crate::writer::{self, camel_case};

pub struct SwitchExpression;

pub static SWITCH_EXPRESSION: SwitchExpression = SwitchExpression;

impl Strategy<Expr> for SwitchExpression {
    fn name(&self) -> &'static str {
        "switch-expression"
    }

    fn priority(&self) -> crate::traits::Priority {
        STRUCTURAL_PRIORITY
    }

    fn matches(&self, expr: &Expr, _ctx: &ConversionContext<'_>) -> bool {
        matches!(expr.kind, ExprKind::SwitchExpr { .. })
    }

    fn convert(&self, expr: &Expr, ctx: &mut ConversionContext<'_>) -> String {
        match &expr.kind {
            ExprKind::SwitchExpr { scrutinee, arms } => convert_switch_expr(scrutinee, arms, ctx),
            _ => String::new(),
        }
    }
}

pub fn convert_switch_expr(
    scrutinee: &Expr,
    arms: &[SwitchArm],
    ctx: &mut ConversionContext<'_>,
) -> String {
    let is_async = scrutinee.contains_await()
        || arms.iter().any(|arm| {
            arm.value.contains_await() || arm.guard.as_ref().is_some_and(Expr::contains_await)
        });

    let subject = ctx.fresh_name("match");
    let mut lines = vec![format!("const {subject} = {};", ctx.expr(scrutinee))];
    let mut has_default = false;
    for arm in arms {
        let test = pattern_test(&subject, &arm.pattern, ctx);
        let guard = arm.guard.as_ref().map(|g| ctx.expr(g));
        let value = ctx.expr(&arm.value);
        let condition = match (test.as_str(), guard) {
            ("true", None) => {
                lines.push(format!("return {value};"));
                has_default = true;
                break;
            }
            ("true", Some(guard)) => guard,
            (_, Some(guard)) => format!("{} && {}", test, writer::operand(&guard)),
            (_, None) => test,
        };
        lines.push(format!("if ({condition}) return {value};"));
    }
    if !has_default {
        lines.push("return undefined;".to_string());
    }

    let body = writer::block(&lines, ctx.indent());
    if is_async {
        format!("await (async () => {body})()")
    } else {
        format!("(() => {body})()")
    }
}

/// Boolean target expression testing `subject` against `pattern`.
///
/// `subject` must be free of side effects: it may appear several times.
pub fn pattern_test(subject: &str, pattern: &Pattern, ctx: &mut ConversionContext<'_>) -> String {
    match pattern {
        Pattern::Discard => "true".to_string(),
        Pattern::Constant { value } if is_null(value) => format!("{subject} == null"),
        Pattern::Constant { value } => format!("{subject} === {}", ctx.expr(value)),
        Pattern::Relational { op, value } => {
            format!("{subject} {} {}", op.target_symbol(), ctx.expr(value))
        }
        Pattern::Type { ty } => type_test(subject, ty),
        Pattern::Property { ty, subpatterns } => {
            let mut tests: Vec<String> = ty.iter().map(|ty| type_test(subject, ty)).collect();
            for sub in subpatterns {
                let path: Vec<String> = sub.name.split('.').map(camel_case).collect();
                let member = format!("{subject}.{}", path.join("."));
                let test = pattern_test(&member, &sub.pattern, ctx);
                if test != "true" {
                    tests.push(test);
                }
            }
            if tests.is_empty() {
                format!("{subject} != null")
            } else {
                tests.join(" && ")
            }
        }
        Pattern::Not { pattern } => match pattern.as_ref() {
            Pattern::Constant { value } if is_null(value) => format!("{subject} != null"),
            inner => format!("!({})", pattern_test(subject, inner, ctx)),
        },
        Pattern::And { left, right } => {
            let left = pattern_test(subject, left, ctx);
            let right = pattern_test(subject, right, ctx);
            format!("{left} && {right}")
        }
        Pattern::Or { left, right } => {
            let left = pattern_test(subject, left, ctx);
            let right = pattern_test(subject, right, ctx);
            format!("({left} || {right})")
        }
    }
}

fn is_null(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::Literal {
            value: Literal::Null
        }
    )
}

fn type_test(subject: &str, ty: &TypeRef) -> String {
    let name = ty.simple_name();
    let primitive = match TypeCategory::of_name(name) {
        TypeCategory::String => Some("string"),
        TypeCategory::Number => Some("number"),
        TypeCategory::Bool => Some("boolean"),
        _ => None,
    };
    match primitive {
        Some(primitive) => format!("typeof {subject} === \"{primitive}\""),
        None if matches!(name, "object" | "Object") => format!("{subject} != null"),
        None => format!("{subject} instanceof {name}"),
    }
}

/// How many times a test of `pattern` mentions its subject.
fn subject_uses(pattern: &Pattern) -> usize {
    match pattern {
        Pattern::Discard => 0,
        Pattern::Constant { .. } | Pattern::Relational { .. } | Pattern::Type { .. } => 1,
        Pattern::Property { ty, subpatterns } => {
            let own = usize::from(ty.is_some());
            let subs: usize = subpatterns.iter().map(|s| subject_uses(&s.pattern)).sum();
            (own + subs).max(1)
        }
        Pattern::Not { pattern } => subject_uses(pattern),
        Pattern::And { left, right } | Pattern::Or { left, right } => {
            subject_uses(left) + subject_uses(right)
        }
    }
}

/// `operand is pattern`. An operand that is tested more than once and
/// could have side effects is evaluated once, through an arrow function.
pub fn is_test(operand: &Expr, pattern: &Pattern, ctx: &mut ConversionContext<'_>) -> String {
    if is_plain_operand(operand) || subject_uses(pattern) <= 1 {
        let subject = ctx.operand(operand);
        return pattern_test(&subject, pattern, ctx);
    }
    let value = ctx.expr(operand);
    let subject = ctx.fresh_name("is");
    let test = pattern_test(&subject, pattern, ctx);
    format!("(({subject}) => {test})({value})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Converter;
    use crate::semantic::EmptyModel;
    use crate::syntax::{BinaryOp, Subpattern};

    fn convert(expr: &Expr) -> String {
        Converter::new()
            .convert_expression(expr, None, &EmptyModel)
            .text
    }

    fn arm(pattern: Pattern, value: Expr) -> SwitchArm {
        SwitchArm {
            pattern,
            guard: None,
            value,
        }
    }

    #[test]
    fn test_switch_expression_with_discard() {
        let expr = Expr::new(ExprKind::SwitchExpr {
            scrutinee: Box::new(Expr::ident("code")),
            arms: vec![
                arm(
                    Pattern::Constant {
                        value: Expr::int(200),
                    },
                    Expr::string("ok"),
                ),
                arm(
                    Pattern::Relational {
                        op: BinaryOp::Ge,
                        value: Expr::int(500),
                    },
                    Expr::string("server"),
                ),
                arm(Pattern::Discard, Expr::string("other")),
            ],
        });
        assert_eq!(
            convert(&expr),
            "(() => {\n  const __match0 = code;\n  if (__match0 === 200) return \"ok\";\n  if (__match0 >= 500) return \"server\";\n  return \"other\";\n})()"
        );
    }

    #[test]
    fn test_non_exhaustive_switch_returns_undefined() {
        let expr = Expr::new(ExprKind::SwitchExpr {
            scrutinee: Box::new(Expr::ident("s")),
            arms: vec![arm(
                Pattern::Property {
                    ty: None,
                    subpatterns: vec![Subpattern {
                        name: "Kind".into(),
                        pattern: Pattern::Constant {
                            value: Expr::string("a"),
                        },
                    }],
                },
                Expr::int(1),
            )],
        });
        let text = convert(&expr);
        assert!(text.contains("if (__match0.kind === \"a\") return 1;"));
        assert!(text.ends_with("return undefined;\n})()"));
    }

    #[test]
    fn test_is_patterns() {
        let null = Expr::new(ExprKind::Is {
            operand: Box::new(Expr::ident("x")),
            pattern: Box::new(Pattern::Constant { value: Expr::null() }),
        });
        assert_eq!(convert(&null), "x == null");

        let not_null = Expr::new(ExprKind::Is {
            operand: Box::new(Expr::ident("x")),
            pattern: Box::new(Pattern::Not {
                pattern: Box::new(Pattern::Constant { value: Expr::null() }),
            }),
        });
        assert_eq!(convert(&not_null), "x != null");

        let typed = Expr::new(ExprKind::Is {
            operand: Box::new(Expr::ident("shape")),
            pattern: Box::new(Pattern::Type {
                ty: TypeRef::named("Circle"),
            }),
        });
        assert_eq!(convert(&typed), "shape instanceof Circle");
    }

    #[test]
    fn test_is_binds_complex_operand_once() {
        let range = Pattern::And {
            left: Box::new(Pattern::Relational {
                op: BinaryOp::Ge,
                value: Expr::int(0),
            }),
            right: Box::new(Pattern::Relational {
                op: BinaryOp::Lt,
                value: Expr::int(10),
            }),
        };
        let expr = Expr::new(ExprKind::Is {
            operand: Box::new(Expr::call(Expr::ident("next"), vec![])),
            pattern: Box::new(range),
        });
        assert_eq!(convert(&expr), "((__is0) => __is0 >= 0 && __is0 < 10)(next())");
    }

    #[test]
    fn test_async_arm_makes_async_function() {
        let expr = Expr::new(ExprKind::SwitchExpr {
            scrutinee: Box::new(Expr::ident("k")),
            arms: vec![arm(
                Pattern::Discard,
                Expr::await_expr(Expr::call(Expr::ident("load"), vec![])),
            )],
        });
        assert_eq!(
            convert(&expr),
            "await (async () => {\n  const __match0 = k;\n  return await load();\n})()"
        );
    }
}
