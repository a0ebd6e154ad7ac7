//! Non-fatal anomalies recorded during conversion.

use crate::syntax::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// No rule applies; the node was emitted verbatim.
    Unsupported,
    /// Converted, but some source detail has no target equivalent and was
    /// dropped (format specifiers, typed collection initializers, ...).
    Lossy,
    /// Converted to target code whose runtime behavior knowingly differs
    /// from the source (e.g. a required service lookup that cannot throw).
    BehaviorGap,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticKind::Unsupported => "unsupported",
            DiagnosticKind::Lossy => "lossy",
            DiagnosticKind::BehaviorGap => "behavior-gap",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub node_kind: String,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        node_kind: impl Into<String>,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            node_kind: node_kind.into(),
            span,
            message: message.into(),
        }
    }

    pub fn unsupported(node_kind: impl Into<String>, span: Span) -> Self {
        let node_kind = node_kind.into();
        let message = format!("no conversion for `{node_kind}`; emitted verbatim");
        Self::new(DiagnosticKind::Unsupported, node_kind, span, message)
    }

    pub fn lossy(node_kind: impl Into<String>, span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Lossy, node_kind, span, message)
    }

    pub fn behavior_gap(
        node_kind: impl Into<String>,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self::new(DiagnosticKind::BehaviorGap, node_kind, span, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] at {}: {}",
            self.kind, self.node_kind, self.span, self.message
        )
    }
}
