//! Strategy-driven translation of component logic into browser JavaScript.
//!
//! The front-end hands over a syntax tree and a semantic model (both
//! serde-deserializable). A [`Converter`] walks the tree: for every node it
//! asks a priority-ordered [`Registry`] of [`Strategy`] rules which one
//! applies, falls back to built-in default handling when none does, and
//! emits unsupported shapes verbatim with a [`Diagnostic`].
//!
//! Strategies come in two families:
//! - idioms (`strategies::idioms`): console printing, sequence queries,
//!   map lookups, numeric/string/task helpers, service lookup, collections
//! - control flow (`strategies::control_flow`): each-element loops,
//!   resource-scoped blocks, switch statements and switch expressions
//!
//! # Example
//!
//! ```ignore
//! use normalize_transpile::{Converter, EmptyModel, Expr};
//!
//! let converter = Converter::new();
//! let expr = Expr::call(Expr::ident("print"), vec![Expr::ident("x")]);
//! let out = converter.convert_expression(&expr, None, &EmptyModel);
//! assert_eq!(out.text, "console.log(x)");
//! ```
//!
//! # Extending
//!
//! Project-specific rules register alongside the built-in ones:
//!
//! ```ignore
//! let exprs = ExprRegistry::builtin_builder().register(&MY_RULE).build();
//! let converter = Converter::from_registries(exprs, StmtRegistry::builtin(), config);
//! ```

mod component;
mod config;
mod context;
mod convert;
mod diagnostics;
mod error;
mod registry;
mod semantic;
pub mod strategies;
pub mod syntax;
mod traits;
pub mod writer;

pub use component::{
    ComponentDecl, ConvertedComponent, ConvertedField, ConvertedMethod, FieldDecl, MethodBody,
    MethodDecl, read_component,
};
pub use config::ConvertConfig;
pub use context::ConversionContext;
pub use convert::{Conversion, Converter};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use error::{ConfigError, ConvertError};
pub use registry::{ExprRegistry, Registry, RegistryBuilder, StmtRegistry};
pub use semantic::{
    EmptyModel, SemanticHelper, SemanticModel, SemanticTable, SymbolInfo, SymbolKind, TypeCategory,
    TypeInfo,
};
pub use syntax::{Expr, ExprKind, Pattern, Span, Stmt, StmtKind, TypeRef};
pub use traits::{IDIOM_PRIORITY, Priority, STRUCTURAL_PRIORITY, Strategy};
