//! Semantic model access.
//!
//! The semantic model is built by the front-end and answers, per syntax
//! node, which symbol and type it resolves to. Resolution may be missing
//! for any node: every caller must have a textual fallback.

use crate::error::ConvertError;
use crate::syntax::{Expr, ExprKind, Span, simple_type_name};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Local,
    Parameter,
    Field,
    Property,
    Method,
    Event,
    Type,
    Namespace,
}

impl SymbolKind {
    /// Symbols reached through the component instance.
    pub fn is_instance_member(self) -> bool {
        matches!(
            self,
            SymbolKind::Field | SymbolKind::Property | SymbolKind::Method | SymbolKind::Event
        )
    }
}

/// A resolved type, named with its full qualification
/// (`System.Collections.Generic.Dictionary`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<TypeInfo>,
    /// Interfaces and base types, fully qualified.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
}

impl TypeInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            implements: Vec::new(),
        }
    }

    pub fn simple_name(&self) -> &str {
        simple_type_name(&self.name)
    }

    /// Category of this type, falling back to the categories of the types it
    /// implements.
    pub fn category(&self) -> TypeCategory {
        let own = TypeCategory::of_name(self.simple_name());
        if own != TypeCategory::Other {
            return own;
        }
        self.implements
            .iter()
            .map(|name| TypeCategory::of_name(simple_type_name(name)))
            .find(|c| *c != TypeCategory::Other)
            .unwrap_or(TypeCategory::Other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,
    pub kind: SymbolKind,
    /// Declaring type of a member, fully qualified.
    #[serde(default)]
    pub containing_type: Option<String>,
    /// Type of the symbol: a variable's type, a method's return type.
    #[serde(default)]
    pub ty: Option<TypeInfo>,
}

/// Coarse type families that conversion rules key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Map,
    Set,
    List,
    /// Lazy or abstract sequences (`IEnumerable<T>`, LINQ results).
    Sequence,
    Console,
    Task,
    Math,
    String,
    Number,
    Bool,
    Other,
}

const MAP_TYPES: &[&str] = &[
    "Dictionary",
    "IDictionary",
    "IReadOnlyDictionary",
    "ConcurrentDictionary",
    "SortedDictionary",
    "ImmutableDictionary",
    "Hashtable",
    "Map",
];

const SET_TYPES: &[&str] = &["HashSet", "ISet", "SortedSet", "IReadOnlySet", "ImmutableHashSet"];

const LIST_TYPES: &[&str] = &[
    "List",
    "IList",
    "IReadOnlyList",
    "ICollection",
    "IReadOnlyCollection",
    "Collection",
    "ObservableCollection",
    "ImmutableList",
    "ImmutableArray",
    "Array",
];

const SEQUENCE_TYPES: &[&str] = &[
    "IEnumerable",
    "IQueryable",
    "IOrderedEnumerable",
    "IOrderedQueryable",
    "IAsyncEnumerable",
    "Enumerable",
    "Queryable",
];

const CONSOLE_TYPES: &[&str] = &["Console", "Debug", "Trace"];
const TASK_TYPES: &[&str] = &["Task", "ValueTask"];
const MATH_TYPES: &[&str] = &["Math", "MathF"];
const STRING_TYPES: &[&str] = &["String", "string"];
const NUMBER_TYPES: &[&str] = &[
    "int", "long", "short", "byte", "sbyte", "uint", "ulong", "ushort", "float", "double",
    "decimal", "Int16", "Int32", "Int64", "UInt16", "UInt32", "UInt64", "Byte", "SByte", "Single",
    "Double", "Decimal",
];
const BOOL_TYPES: &[&str] = &["bool", "Boolean"];

impl TypeCategory {
    /// Categorize a simple (unqualified) type name.
    pub fn of_name(simple_name: &str) -> Self {
        let table: &[(&[&str], TypeCategory)] = &[
            (MAP_TYPES, TypeCategory::Map),
            (SET_TYPES, TypeCategory::Set),
            (LIST_TYPES, TypeCategory::List),
            (SEQUENCE_TYPES, TypeCategory::Sequence),
            (CONSOLE_TYPES, TypeCategory::Console),
            (TASK_TYPES, TypeCategory::Task),
            (MATH_TYPES, TypeCategory::Math),
            (STRING_TYPES, TypeCategory::String),
            (NUMBER_TYPES, TypeCategory::Number),
            (BOOL_TYPES, TypeCategory::Bool),
        ];
        table
            .iter()
            .find(|(names, _)| names.contains(&simple_name))
            .map(|(_, category)| *category)
            .unwrap_or(TypeCategory::Other)
    }

    /// Lists, sets and abstract sequences all accept sequence operators.
    pub fn is_sequence_like(self) -> bool {
        matches!(
            self,
            TypeCategory::List | TypeCategory::Set | TypeCategory::Sequence
        )
    }
}

/// Queryable mapping from syntax nodes to resolved information.
pub trait SemanticModel: Sync {
    fn symbol(&self, span: Span) -> Option<&SymbolInfo>;
    fn type_of(&self, span: Span) -> Option<&TypeInfo>;
}

/// A model that resolves nothing; conversion then runs on textual
/// fallbacks alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyModel;

impl SemanticModel for EmptyModel {
    fn symbol(&self, _span: Span) -> Option<&SymbolInfo> {
        None
    }

    fn type_of(&self, _span: Span) -> Option<&TypeInfo> {
        None
    }
}

/// In-memory semantic model keyed by node span.
#[derive(Debug, Default, Clone)]
pub struct SemanticTable {
    symbols: HashMap<Span, SymbolInfo>,
    types: HashMap<Span, TypeInfo>,
}

/// Serialized form of a [`SemanticTable`]: JSON objects cannot be keyed by
/// spans, so entries are listed.
#[derive(Debug, Default, Serialize, Deserialize)]
struct TableFile {
    #[serde(default)]
    symbols: Vec<SymbolEntry>,
    #[serde(default)]
    types: Vec<TypeEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SymbolEntry {
    span: Span,
    symbol: SymbolInfo,
}

#[derive(Debug, Serialize, Deserialize)]
struct TypeEntry {
    span: Span,
    #[serde(rename = "type")]
    ty: TypeInfo,
}

impl SemanticTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a table produced by the front-end.
    pub fn from_json(json: &str) -> Result<Self, ConvertError> {
        let file: TableFile = serde_json::from_str(json)?;
        let mut table = Self::new();
        for entry in file.symbols {
            table.insert_symbol(entry.span, entry.symbol);
        }
        for entry in file.types {
            table.insert_type(entry.span, entry.ty);
        }
        Ok(table)
    }

    pub fn to_json(&self) -> Result<String, ConvertError> {
        let mut symbols: Vec<SymbolEntry> = self
            .symbols
            .iter()
            .map(|(span, symbol)| SymbolEntry {
                span: *span,
                symbol: symbol.clone(),
            })
            .collect();
        symbols.sort_by_key(|e| e.span);
        let mut types: Vec<TypeEntry> = self
            .types
            .iter()
            .map(|(span, ty)| TypeEntry {
                span: *span,
                ty: ty.clone(),
            })
            .collect();
        types.sort_by_key(|e| e.span);
        Ok(serde_json::to_string_pretty(&TableFile { symbols, types })?)
    }

    /// Record a symbol. Dummy spans are ignored: they identify no node.
    pub fn insert_symbol(&mut self, span: Span, symbol: SymbolInfo) {
        if !span.is_dummy() {
            self.symbols.insert(span, symbol);
        }
    }

    pub fn insert_type(&mut self, span: Span, ty: TypeInfo) {
        if !span.is_dummy() {
            self.types.insert(span, ty);
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len() + self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SemanticModel for SemanticTable {
    fn symbol(&self, span: Span) -> Option<&SymbolInfo> {
        if span.is_dummy() {
            return None;
        }
        self.symbols.get(&span)
    }

    fn type_of(&self, span: Span) -> Option<&TypeInfo> {
        if span.is_dummy() {
            return None;
        }
        self.types.get(&span)
    }
}

/// Query layer the strategies use. Pure reads, no caching.
#[derive(Clone, Copy)]
pub struct SemanticHelper<'a> {
    model: &'a dyn SemanticModel,
}

impl<'a> SemanticHelper<'a> {
    pub fn new(model: &'a dyn SemanticModel) -> Self {
        Self { model }
    }

    pub fn symbol(&self, expr: &Expr) -> Option<&'a SymbolInfo> {
        self.model.symbol(expr.span)
    }

    /// Type of an expression: the model's type entry, else the type of the
    /// symbol it resolves to.
    pub fn type_of(&self, expr: &Expr) -> Option<&'a TypeInfo> {
        self.model
            .type_of(expr.span)
            .or_else(|| self.symbol(expr).and_then(|s| s.ty.as_ref()))
    }

    /// Category of an expression's resolved type, if resolution succeeded.
    pub fn category(&self, expr: &Expr) -> Option<TypeCategory> {
        self.type_of(expr).map(TypeInfo::category)
    }

    /// Declaring type of the member an invocation or member access
    /// resolves to. Looks at the node itself, then at its callee.
    pub fn declaring_type(&self, expr: &Expr) -> Option<&'a str> {
        let own = self.symbol(expr).and_then(|s| s.containing_type.as_deref());
        if own.is_some() {
            return own;
        }
        match &expr.kind {
            ExprKind::Invocation { callee, .. } => self
                .symbol(callee)
                .and_then(|s| s.containing_type.as_deref()),
            _ => None,
        }
    }

    /// Whether the member an invocation resolves to is declared by a type in
    /// `category`. `None` when the declaring type is unknown.
    pub fn declared_in(&self, expr: &Expr, category: TypeCategory) -> Option<bool> {
        self.declaring_type(expr)
            .map(|name| TypeCategory::of_name(simple_type_name(name)) == category)
    }

    pub fn is_map_like(&self, expr: &Expr) -> Option<bool> {
        self.category(expr).map(|c| c == TypeCategory::Map)
    }

    pub fn is_sequence_like(&self, expr: &Expr) -> Option<bool> {
        self.category(expr).map(TypeCategory::is_sequence_like)
    }

    pub fn is_console_like(&self, expr: &Expr) -> Option<bool> {
        self.category(expr).map(|c| c == TypeCategory::Console)
    }

    pub fn is_task_like(&self, expr: &Expr) -> Option<bool> {
        self.category(expr).map(|c| c == TypeCategory::Task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary() -> TypeInfo {
        TypeInfo {
            name: "System.Collections.Generic.Dictionary`2".into(),
            args: vec![TypeInfo::named("System.String"), TypeInfo::named("System.Int32")],
            implements: vec![],
        }
    }

    #[test]
    fn test_category_by_name() {
        assert_eq!(dictionary().category(), TypeCategory::Map);
        assert_eq!(TypeCategory::of_name("List"), TypeCategory::List);
        assert_eq!(TypeCategory::of_name("Widget"), TypeCategory::Other);
    }

    #[test]
    fn test_category_via_implements() {
        let custom = TypeInfo {
            name: "App.Models.Inventory".into(),
            args: vec![],
            implements: vec!["System.Collections.Generic.IDictionary`2".into()],
        };
        assert_eq!(custom.category(), TypeCategory::Map);
    }

    #[test]
    fn test_dummy_span_never_resolves() {
        let mut table = SemanticTable::new();
        table.insert_type(Span::DUMMY, dictionary());
        assert!(table.is_empty());
        assert!(table.type_of(Span::DUMMY).is_none());
    }

    #[test]
    fn test_helper_falls_back_to_symbol_type() {
        let mut table = SemanticTable::new();
        table.insert_symbol(
            Span::new(4, 10),
            SymbolInfo {
                name: "scores".into(),
                kind: SymbolKind::Field,
                containing_type: Some("App.Scoreboard".into()),
                ty: Some(dictionary()),
            },
        );
        let helper = SemanticHelper::new(&table);
        let expr = Expr::ident("scores").with_span(4, 10);
        assert_eq!(helper.is_map_like(&expr), Some(true));
        assert_eq!(helper.is_map_like(&Expr::ident("scores")), None);
    }

    #[test]
    fn test_json_round_trip() {
        let mut table = SemanticTable::new();
        table.insert_type(Span::new(1, 2), dictionary());
        let json = table.to_json().unwrap();
        let back = SemanticTable::from_json(&json).unwrap();
        assert_eq!(back.type_of(Span::new(1, 2)), Some(&dictionary()));
    }
}
