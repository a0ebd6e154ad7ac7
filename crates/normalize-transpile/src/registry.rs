//! Strategy registries.
//!
//! A registry is assembled once, through [`RegistryBuilder`], and is
//! immutable afterwards. `build` stably sorts strategies by priority,
//! highest first, so lookup is a linear scan for the first match: the
//! highest-priority matching strategy wins, and among equal priorities the
//! one registered first wins. Expression and statement registries share
//! this discipline.

use crate::context::ConversionContext;
use crate::syntax::{Expr, Stmt};
use crate::traits::Strategy;
use std::cmp::Reverse;

pub struct Registry<N: 'static> {
    strategies: Vec<&'static dyn Strategy<N>>,
}

pub type ExprRegistry = Registry<Expr>;
pub type StmtRegistry = Registry<Stmt>;

impl<N: 'static> Registry<N> {
    pub fn builder() -> RegistryBuilder<N> {
        RegistryBuilder::new()
    }

    /// The strategy that applies to `node`, if any.
    pub fn find_strategy(
        &self,
        node: &N,
        ctx: &ConversionContext<'_>,
    ) -> Option<&'static dyn Strategy<N>> {
        self.strategies
            .iter()
            .find(|s| s.matches(node, ctx))
            .copied()
    }

    /// Strategies in resolution order.
    pub fn strategies(&self) -> &[&'static dyn Strategy<N>] {
        &self.strategies
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl ExprRegistry {
    /// Builder pre-loaded with the built-in expression strategies.
    pub fn builtin_builder() -> RegistryBuilder<Expr> {
        RegistryBuilder::new().register_all(crate::strategies::builtin_expr_strategies())
    }

    pub fn builtin() -> Self {
        Self::builtin_builder().build()
    }
}

impl StmtRegistry {
    /// Builder pre-loaded with the built-in statement strategies.
    pub fn builtin_builder() -> RegistryBuilder<Stmt> {
        RegistryBuilder::new().register_all(crate::strategies::builtin_stmt_strategies())
    }

    pub fn builtin() -> Self {
        Self::builtin_builder().build()
    }
}

/// Append-only collection of strategies, frozen by [`build`](Self::build).
pub struct RegistryBuilder<N: 'static> {
    strategies: Vec<&'static dyn Strategy<N>>,
}

impl<N: 'static> RegistryBuilder<N> {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Append a strategy. Duplicates are kept.
    pub fn register(mut self, strategy: &'static dyn Strategy<N>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn register_all(
        mut self,
        strategies: impl IntoIterator<Item = &'static dyn Strategy<N>>,
    ) -> Self {
        self.strategies.extend(strategies);
        self
    }

    pub fn build(mut self) -> Registry<N> {
        // Stable: equal priorities keep registration order.
        self.strategies.sort_by_key(|s| Reverse(s.priority()));
        tracing::debug!(
            strategies = self.strategies.len(),
            node = std::any::type_name::<N>(),
            "built strategy registry"
        );
        Registry {
            strategies: self.strategies,
        }
    }
}

impl<N: 'static> Default for RegistryBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}
