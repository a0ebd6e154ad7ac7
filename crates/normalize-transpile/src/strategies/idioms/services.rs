//! Service lookups: `provider.GetService<T>()` → `provider.getService("T")`.
//!
//! Both the optional and the required variant map to the same runtime
//! lookup, keyed by type name. The runtime lookup returns `undefined` for a
//! missing service instead of throwing; the required variant reports this
//! as a behavior gap.

use crate::context::ConversionContext;
use crate::diagnostics::Diagnostic;
use crate::strategies::{method_call, type_key};
use crate::syntax::Expr;
use crate::traits::Strategy;
use crate::writer::quote;

pub struct ServiceLookup;

pub static SERVICE_LOOKUP: ServiceLookup = ServiceLookup;

impl Strategy<Expr> for ServiceLookup {
    fn name(&self) -> &'static str {
        "service-lookup"
    }

    fn matches(&self, expr: &Expr, _ctx: &ConversionContext<'_>) -> bool {
        method_call(expr).is_some_and(|call| {
            matches!(call.name, "GetService" | "GetRequiredService")
                && call.type_args.len() == 1
                && call.arity() == 0
        })
    }

    fn convert(&self, expr: &Expr, ctx: &mut ConversionContext<'_>) -> String {
        let Some(call) = method_call(expr) else {
            return String::new();
        };
        let key = type_key(expr, call.type_args.first(), ctx).unwrap_or_default();
        let provider = match call.receiver {
            Some(receiver) => ctx.operand(receiver),
            None => ctx.config().instance_receiver.clone(),
        };
        if call.name == "GetRequiredService" {
            ctx.report(Diagnostic::behavior_gap(
                "invocation",
                expr.span,
                format!("missing `{key}` service yields undefined instead of throwing"),
            ));
        }
        let lookup = &ctx.config().service_lookup_method;
        format!("{provider}.{lookup}({})", quote(&key))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ConvertConfig;
    use crate::convert::Converter;
    use crate::diagnostics::DiagnosticKind;
    use crate::semantic::EmptyModel;
    use crate::syntax::{Expr, TypeRef};

    #[test]
    fn test_optional_lookup() {
        let expr = Expr::generic_call(
            Some(Expr::ident("services")),
            "GetService",
            vec![TypeRef::named("App.Services.ILogger")],
            vec![],
        );
        let out = Converter::new().convert_expression(&expr, None, &EmptyModel);
        assert_eq!(out.text, "services.getService(\"ILogger\")");
        assert!(out.is_clean());
    }

    #[test]
    fn test_required_lookup_reports_gap() {
        let expr = Expr::generic_call(None, "GetRequiredService", vec![TypeRef::named("Clock")], vec![]);
        let out = Converter::new().convert_expression(&expr, None, &EmptyModel);
        assert_eq!(out.text, "this.getService(\"Clock\")");
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::BehaviorGap);
    }

    #[test]
    fn test_configured_lookup_method() {
        let config = ConvertConfig {
            service_lookup_method: "resolve".into(),
            ..ConvertConfig::default()
        };
        let expr = Expr::generic_call(
            Some(Expr::ident("sp")),
            "GetService",
            vec![TypeRef::named("Cache")],
            vec![],
        );
        let out = Converter::with_config(config).convert_expression(&expr, None, &EmptyModel);
        assert_eq!(out.text, "sp.resolve(\"Cache\")");
    }
}
