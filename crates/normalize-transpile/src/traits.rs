//! The conversion rule trait.

use crate::context::ConversionContext;

/// Resolution order of strategies: higher runs first.
pub type Priority = i32;

/// Rules for one specific source idiom (a console print, a sequence query).
pub const IDIOM_PRIORITY: Priority = 100;

/// Generic structural rewrites (loops, resource blocks, pattern matching).
pub const STRUCTURAL_PRIORITY: Priority = 0;

/// A unit of conversion knowledge for nodes of type `N`.
///
/// Strategies are stateless and registered once at converter construction.
/// `matches` must not rely on semantic resolution succeeding, and neither
/// method may have side effects beyond the context it is handed.
///
/// # Implementing Custom Strategies
///
/// ```ignore
/// use normalize_transpile::{ConversionContext, Expr, Strategy};
///
/// struct Telemetry;
///
/// impl Strategy<Expr> for Telemetry {
///     fn name(&self) -> &'static str { "telemetry" }
///     fn matches(&self, expr: &Expr, _ctx: &ConversionContext<'_>) -> bool { /* ... */ }
///     fn convert(&self, expr: &Expr, ctx: &mut ConversionContext<'_>) -> String { /* ... */ }
/// }
///
/// static TELEMETRY: Telemetry = Telemetry;
/// let exprs = ExprRegistry::builtin_builder().register(&TELEMETRY).build();
/// ```
pub trait Strategy<N>: Send + Sync {
    /// Unique strategy identifier, used in logs.
    fn name(&self) -> &'static str;

    fn priority(&self) -> Priority {
        IDIOM_PRIORITY
    }

    fn matches(&self, node: &N, ctx: &ConversionContext<'_>) -> bool;

    /// Produce target text for a node `matches` accepted.
    fn convert(&self, node: &N, ctx: &mut ConversionContext<'_>) -> String;
}
