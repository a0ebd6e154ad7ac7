//! Source syntax tree.
//!
//! The front-end parser produces these nodes; this crate only reads them.
//! Every node carries a [`Span`] that keys its entry in the semantic model.
//! Nodes serialize as JSON objects internally tagged by `kind`, which is the
//! hand-over format between the front-end and the converter.
//!
//! The builder functions (`Expr::ident`, `Stmt::block`, ...) exist for
//! synthesized nodes and tests; they produce dummy spans.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte range of a node in its source file.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Span of synthesized nodes. Never present in the semantic model.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn is_dummy(&self) -> bool {
        *self == Self::DUMMY
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A type as written in source: `Dictionary<string, int>`, `int[]`, `Foo?`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            nullable: false,
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            args,
            nullable: false,
        }
    }

    /// Name without namespace qualification or array rank.
    pub fn simple_name(&self) -> &str {
        simple_type_name(&self.name)
    }

    pub fn is_array(&self) -> bool {
        self.name.ends_with("[]")
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        if self.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}

/// Strip namespace qualification, generic arity markers and array rank.
pub fn simple_type_name(name: &str) -> &str {
    let name = name.trim_end_matches("[]");
    let name = name.rsplit('.').next().unwrap_or(name);
    name.split('`').next().unwrap_or(name)
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    #[serde(default, skip_serializing_if = "Span::is_dummy")]
    pub span: Span,
    #[serde(flatten)]
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExprKind {
    Identifier {
        name: String,
    },
    This,
    Base,
    Literal {
        value: Literal,
    },
    InterpolatedString {
        parts: Vec<InterpolationPart>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Assignment {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Member {
        receiver: Box<Expr>,
        name: String,
    },
    /// `receiver?.name`
    ConditionalMember {
        receiver: Box<Expr>,
        name: String,
    },
    ElementAccess {
        receiver: Box<Expr>,
        index: Box<Expr>,
    },
    Invocation {
        callee: Box<Expr>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        type_args: Vec<TypeRef>,
        #[serde(default)]
        args: Vec<Argument>,
    },
    /// `new T(args) { initializer }`; `ty` is absent for target-typed `new()`.
    ObjectCreation {
        #[serde(default)]
        ty: Option<TypeRef>,
        #[serde(default)]
        args: Vec<Argument>,
        #[serde(default)]
        initializer: Option<Initializer>,
    },
    AnonymousObject {
        members: Vec<MemberInit>,
    },
    /// `new T[n]`, `new T[] { ... }`, `new[] { ... }` and collection expressions.
    ArrayCreation {
        #[serde(default)]
        element_type: Option<TypeRef>,
        #[serde(default)]
        size: Option<Box<Expr>>,
        #[serde(default)]
        elements: Vec<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        when_true: Box<Expr>,
        when_false: Box<Expr>,
    },
    Lambda {
        params: Vec<Param>,
        body: LambdaBody,
        #[serde(default)]
        is_async: bool,
    },
    Await {
        operand: Box<Expr>,
    },
    /// `(T)x` and `x as T`.
    Cast {
        ty: TypeRef,
        operand: Box<Expr>,
    },
    Is {
        operand: Box<Expr>,
        pattern: Box<Pattern>,
    },
    NameOf {
        name: String,
    },
    Default {
        #[serde(default)]
        ty: Option<TypeRef>,
    },
    Parenthesized {
        inner: Box<Expr>,
    },
    /// Value-producing pattern match: `x switch { pattern => value, ... }`.
    SwitchExpr {
        scrutinee: Box<Expr>,
        arms: Vec<SwitchArm>,
    },
    /// A construct the front-end forwards without a structured shape.
    Other {
        node_kind: String,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Null,
    Bool(bool),
    /// Numeric literal exactly as written, suffixes included (`1.5f`, `10L`).
    Number(String),
    String(String),
    Char(char),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "part", rename_all = "snake_case")]
pub enum InterpolationPart {
    Text {
        text: String,
    },
    Expr {
        expr: Expr,
        #[serde(default)]
        format: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Coalesce,
}

impl BinaryOp {
    /// Operator text in the target language.
    pub fn target_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "===",
            BinaryOp::Ne => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Coalesce => "??",
        }
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    BitNot,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
    Coalesce,
}

impl AssignOp {
    pub fn target_symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::And => "&=",
            AssignOp::Or => "|=",
            AssignOp::Xor => "^=",
            AssignOp::Coalesce => "??=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub expr: Expr,
    #[serde(default)]
    pub modifier: Option<ArgModifier>,
    /// `out var name`: the argument also declares `name`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub declares: bool,
    #[serde(default)]
    pub name: Option<String>,
}

impl Argument {
    pub fn positional(expr: Expr) -> Self {
        Self {
            expr,
            modifier: None,
            declares: false,
            name: None,
        }
    }

    /// `out var name`
    pub fn out_var(name: impl Into<String>) -> Self {
        Self {
            expr: Expr::ident(name),
            modifier: Some(ArgModifier::Out),
            declares: true,
            name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgModifier {
    Out,
    Ref,
    In,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "initializer", rename_all = "snake_case")]
pub enum Initializer {
    /// `{ Name = value, ... }`
    Object { members: Vec<MemberInit> },
    /// `{ a, b, c }`
    Collection { elements: Vec<Expr> },
    /// `{ [key] = value, ... }` or `{ { key, value }, ... }`
    Dictionary { entries: Vec<DictEntry> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberInit {
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictEntry {
    pub key: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(default)]
    pub ty: Option<TypeRef>,
    #[serde(default)]
    pub default: Option<Expr>,
    /// `params T[] rest`
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_params: bool,
}

impl Param {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            default: None,
            is_params: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Box<Stmt>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchArm {
    pub pattern: Pattern,
    #[serde(default)]
    pub guard: Option<Expr>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pattern {
    /// `_`
    Discard,
    /// `42`, `"a"`, `null`, `Color.Red`
    Constant { value: Expr },
    /// `> 5`, `<= limit`
    Relational { op: BinaryOp, value: Expr },
    /// `T { Name: "x", Age: > 18 }`
    Property {
        #[serde(default)]
        ty: Option<TypeRef>,
        subpatterns: Vec<Subpattern>,
    },
    /// `Circle`, `string`
    Type { ty: TypeRef },
    Not { pattern: Box<Pattern> },
    And { left: Box<Pattern>, right: Box<Pattern> },
    Or { left: Box<Pattern>, right: Box<Pattern> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subpattern {
    pub name: String,
    pub pattern: Pattern,
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            span: Span::DUMMY,
            kind,
        }
    }

    pub fn with_span(mut self, start: u32, end: u32) -> Self {
        self.span = Span::new(start, end);
        self
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Identifier { name: name.into() })
    }

    pub fn this() -> Self {
        Self::new(ExprKind::This)
    }

    pub fn null() -> Self {
        Self::literal(Literal::Null)
    }

    pub fn bool(value: bool) -> Self {
        Self::literal(Literal::Bool(value))
    }

    pub fn int(value: i64) -> Self {
        Self::literal(Literal::Number(value.to_string()))
    }

    pub fn number(text: impl Into<String>) -> Self {
        Self::literal(Literal::Number(text.into()))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::literal(Literal::String(value.into()))
    }

    pub fn literal(value: Literal) -> Self {
        Self::new(ExprKind::Literal { value })
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Self::new(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Self::new(ExprKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Self::new(ExprKind::Assignment {
            op: AssignOp::Assign,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    pub fn member(receiver: Expr, name: impl Into<String>) -> Self {
        Self::new(ExprKind::Member {
            receiver: Box::new(receiver),
            name: name.into(),
        })
    }

    pub fn index(receiver: Expr, index: Expr) -> Self {
        Self::new(ExprKind::ElementAccess {
            receiver: Box::new(receiver),
            index: Box::new(index),
        })
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::Invocation {
            callee: Box::new(callee),
            type_args: Vec::new(),
            args: args.into_iter().map(Argument::positional).collect(),
        })
    }

    /// `receiver.name(args)`
    pub fn method_call(receiver: Expr, name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::call(Self::member(receiver, name), args)
    }

    /// `receiver.name<type_args>(args)`
    pub fn generic_call(
        receiver: Option<Expr>,
        name: impl Into<String>,
        type_args: Vec<TypeRef>,
        args: Vec<Argument>,
    ) -> Self {
        let callee = match receiver {
            Some(receiver) => Self::member(receiver, name),
            None => Self::ident(name),
        };
        Self::new(ExprKind::Invocation {
            callee: Box::new(callee),
            type_args,
            args,
        })
    }

    pub fn new_object(ty: TypeRef, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::ObjectCreation {
            ty: Some(ty),
            args: args.into_iter().map(Argument::positional).collect(),
            initializer: None,
        })
    }

    /// Single-parameter expression lambda: `param => body`.
    pub fn lambda(param: impl Into<String>, body: Expr) -> Self {
        Self::lambda_n(vec![param.into()], body)
    }

    pub fn lambda_n(params: Vec<String>, body: Expr) -> Self {
        Self::new(ExprKind::Lambda {
            params: params.into_iter().map(Param::named).collect(),
            body: LambdaBody::Expr(Box::new(body)),
            is_async: false,
        })
    }

    pub fn conditional(condition: Expr, when_true: Expr, when_false: Expr) -> Self {
        Self::new(ExprKind::Conditional {
            condition: Box::new(condition),
            when_true: Box::new(when_true),
            when_false: Box::new(when_false),
        })
    }

    pub fn await_expr(operand: Expr) -> Self {
        Self::new(ExprKind::Await {
            operand: Box::new(operand),
        })
    }

    pub fn paren(inner: Expr) -> Self {
        Self::new(ExprKind::Parenthesized {
            inner: Box::new(inner),
        })
    }

    pub fn other(node_kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(ExprKind::Other {
            node_kind: node_kind.into(),
            text: text.into(),
        })
    }

    /// Short node-kind name used in diagnostics and logs.
    pub fn kind_name(&self) -> &str {
        match &self.kind {
            ExprKind::Identifier { .. } => "identifier",
            ExprKind::This => "this",
            ExprKind::Base => "base",
            ExprKind::Literal { .. } => "literal",
            ExprKind::InterpolatedString { .. } => "interpolated_string",
            ExprKind::Binary { .. } => "binary",
            ExprKind::Unary { .. } => "unary",
            ExprKind::Assignment { .. } => "assignment",
            ExprKind::Member { .. } => "member",
            ExprKind::ConditionalMember { .. } => "conditional_member",
            ExprKind::ElementAccess { .. } => "element_access",
            ExprKind::Invocation { .. } => "invocation",
            ExprKind::ObjectCreation { .. } => "object_creation",
            ExprKind::AnonymousObject { .. } => "anonymous_object",
            ExprKind::ArrayCreation { .. } => "array_creation",
            ExprKind::Conditional { .. } => "conditional",
            ExprKind::Lambda { .. } => "lambda",
            ExprKind::Await { .. } => "await",
            ExprKind::Cast { .. } => "cast",
            ExprKind::Is { .. } => "is",
            ExprKind::NameOf { .. } => "nameof",
            ExprKind::Default { .. } => "default",
            ExprKind::Parenthesized { .. } => "parenthesized",
            ExprKind::SwitchExpr { .. } => "switch_expr",
            ExprKind::Other { node_kind, .. } => node_kind,
        }
    }

    /// Visit this expression and its sub-expressions, not descending into
    /// lambda bodies (they are separate functions).
    pub fn walk_shallow<F: FnMut(&Expr)>(&self, f: &mut F) {
        f(self);
        for child in self.shallow_children() {
            child.walk_shallow(f);
        }
    }

    fn shallow_children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            ExprKind::Assignment { target, value, .. } => vec![target.as_ref(), value.as_ref()],
            ExprKind::Unary { operand, .. }
            | ExprKind::Await { operand }
            | ExprKind::Cast { operand, .. }
            | ExprKind::Is { operand, .. } => vec![operand.as_ref()],
            ExprKind::Parenthesized { inner } => vec![inner.as_ref()],
            ExprKind::Member { receiver, .. } | ExprKind::ConditionalMember { receiver, .. } => {
                vec![receiver.as_ref()]
            }
            ExprKind::ElementAccess { receiver, index } => vec![receiver.as_ref(), index.as_ref()],
            ExprKind::Invocation { callee, args, .. } => std::iter::once(callee.as_ref())
                .chain(args.iter().map(|arg| &arg.expr))
                .collect(),
            ExprKind::ObjectCreation {
                args, initializer, ..
            } => {
                let mut children: Vec<&Expr> = args.iter().map(|arg| &arg.expr).collect();
                match initializer {
                    Some(Initializer::Object { members }) => {
                        children.extend(members.iter().map(|m| &m.value));
                    }
                    Some(Initializer::Collection { elements }) => children.extend(elements),
                    Some(Initializer::Dictionary { entries }) => {
                        for entry in entries {
                            children.push(&entry.key);
                            children.push(&entry.value);
                        }
                    }
                    None => {}
                }
                children
            }
            ExprKind::Conditional {
                condition,
                when_true,
                when_false,
            } => vec![condition.as_ref(), when_true.as_ref(), when_false.as_ref()],
            ExprKind::InterpolatedString { parts } => parts
                .iter()
                .filter_map(|part| match part {
                    InterpolationPart::Expr { expr, .. } => Some(expr),
                    InterpolationPart::Text { .. } => None,
                })
                .collect(),
            ExprKind::AnonymousObject { members } => members.iter().map(|m| &m.value).collect(),
            ExprKind::ArrayCreation { size, elements, .. } => size
                .iter()
                .map(|s| s.as_ref())
                .chain(elements.iter())
                .collect(),
            ExprKind::SwitchExpr { scrutinee, arms } => {
                let mut children = vec![scrutinee.as_ref()];
                for arm in arms {
                    children.extend(arm.guard.as_ref());
                    children.push(&arm.value);
                }
                children
            }
            _ => Vec::new(),
        }
    }

    /// True when an `await` occurs outside any nested lambda.
    pub fn contains_await(&self) -> bool {
        let mut found = false;
        self.walk_shallow(&mut |e| {
            if matches!(e.kind, ExprKind::Await { .. }) {
                found = true;
            }
        });
        found
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    #[serde(default, skip_serializing_if = "Span::is_dummy")]
    pub span: Span,
    #[serde(flatten)]
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StmtKind {
    Block {
        statements: Vec<Stmt>,
    },
    LocalDecl {
        #[serde(default)]
        ty: Option<TypeRef>,
        declarators: Vec<Declarator>,
        #[serde(default)]
        is_const: bool,
    },
    Expression {
        expr: Expr,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        #[serde(default)]
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        condition: Expr,
    },
    For {
        #[serde(default)]
        init: Option<ForInit>,
        #[serde(default)]
        condition: Option<Expr>,
        #[serde(default)]
        updates: Vec<Expr>,
        body: Box<Stmt>,
    },
    ForEach {
        target: ForEachTarget,
        iterable: Expr,
        body: Box<Stmt>,
        #[serde(default)]
        is_await: bool,
    },
    Return {
        #[serde(default)]
        value: Option<Expr>,
    },
    Break,
    Continue,
    /// `throw e;` or a bare rethrow when `value` is absent.
    Throw {
        #[serde(default)]
        value: Option<Expr>,
    },
    Try {
        body: Box<Stmt>,
        #[serde(default)]
        catches: Vec<CatchClause>,
        #[serde(default)]
        finally: Option<Box<Stmt>>,
    },
    /// `using (var x = ...) body`, `using (expr) body`, or a `using var`
    /// declaration (no body) scoped to the rest of the enclosing block.
    Using {
        #[serde(default)]
        declarators: Vec<Declarator>,
        #[serde(default)]
        resource: Option<Expr>,
        #[serde(default)]
        body: Option<Box<Stmt>>,
        #[serde(default)]
        is_await: bool,
    },
    Switch {
        scrutinee: Expr,
        sections: Vec<SwitchSection>,
    },
    Lock {
        target: Expr,
        body: Box<Stmt>,
    },
    LocalFunction {
        name: String,
        params: Vec<Param>,
        body: Box<Stmt>,
        #[serde(default)]
        is_async: bool,
    },
    /// `yield return value;`, or `yield break;` when `value` is absent.
    Yield {
        #[serde(default)]
        value: Option<Expr>,
    },
    Empty,
    Other {
        node_kind: String,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declarator {
    pub name: String,
    #[serde(default)]
    pub init: Option<Expr>,
}

impl Declarator {
    pub fn new(name: impl Into<String>, init: Option<Expr>) -> Self {
        Self {
            name: name.into(),
            init,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "init", rename_all = "snake_case")]
pub enum ForInit {
    Declaration {
        #[serde(default)]
        ty: Option<TypeRef>,
        declarators: Vec<Declarator>,
    },
    Expressions {
        exprs: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum ForEachTarget {
    Name { name: String },
    /// `foreach (var (key, value) in ...)`
    Tuple { names: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    #[serde(default)]
    pub ty: Option<TypeRef>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub filter: Option<Expr>,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchSection {
    pub labels: Vec<SwitchLabel>,
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "label", rename_all = "snake_case")]
pub enum SwitchLabel {
    Case {
        value: Expr,
    },
    Pattern {
        pattern: Pattern,
        #[serde(default)]
        guard: Option<Expr>,
    },
    Default,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Self {
            span: Span::DUMMY,
            kind,
        }
    }

    pub fn with_span(mut self, start: u32, end: u32) -> Self {
        self.span = Span::new(start, end);
        self
    }

    pub fn expr(expr: Expr) -> Self {
        Self::new(StmtKind::Expression { expr })
    }

    pub fn block(statements: Vec<Stmt>) -> Self {
        Self::new(StmtKind::Block { statements })
    }

    /// `var name = init;`
    pub fn local(name: impl Into<String>, init: Expr) -> Self {
        Self::new(StmtKind::LocalDecl {
            ty: None,
            declarators: vec![Declarator::new(name, Some(init))],
            is_const: false,
        })
    }

    pub fn typed_local(ty: TypeRef, name: impl Into<String>, init: Option<Expr>) -> Self {
        Self::new(StmtKind::LocalDecl {
            ty: Some(ty),
            declarators: vec![Declarator::new(name, init)],
            is_const: false,
        })
    }

    pub fn ret(value: Option<Expr>) -> Self {
        Self::new(StmtKind::Return { value })
    }

    pub fn if_stmt(condition: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Self {
        Self::new(StmtKind::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        })
    }

    pub fn while_loop(condition: Expr, body: Stmt) -> Self {
        Self::new(StmtKind::While {
            condition,
            body: Box::new(body),
        })
    }

    pub fn foreach(name: impl Into<String>, iterable: Expr, body: Stmt) -> Self {
        Self::new(StmtKind::ForEach {
            target: ForEachTarget::Name { name: name.into() },
            iterable,
            body: Box::new(body),
            is_await: false,
        })
    }

    pub fn using(declarators: Vec<Declarator>, body: Option<Stmt>) -> Self {
        Self::new(StmtKind::Using {
            declarators,
            resource: None,
            body: body.map(Box::new),
            is_await: false,
        })
    }

    pub fn other(node_kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(StmtKind::Other {
            node_kind: node_kind.into(),
            text: text.into(),
        })
    }

    pub fn kind_name(&self) -> &str {
        match &self.kind {
            StmtKind::Block { .. } => "block",
            StmtKind::LocalDecl { .. } => "local_decl",
            StmtKind::Expression { .. } => "expression",
            StmtKind::If { .. } => "if",
            StmtKind::While { .. } => "while",
            StmtKind::DoWhile { .. } => "do_while",
            StmtKind::For { .. } => "for",
            StmtKind::ForEach { .. } => "for_each",
            StmtKind::Return { .. } => "return",
            StmtKind::Break => "break",
            StmtKind::Continue => "continue",
            StmtKind::Throw { .. } => "throw",
            StmtKind::Try { .. } => "try",
            StmtKind::Using { .. } => "using",
            StmtKind::Switch { .. } => "switch",
            StmtKind::Lock { .. } => "lock",
            StmtKind::LocalFunction { .. } => "local_function",
            StmtKind::Yield { .. } => "yield",
            StmtKind::Empty => "empty",
            StmtKind::Other { node_kind, .. } => node_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_type_name() {
        assert_eq!(simple_type_name("System.Collections.Generic.List`1"), "List");
        assert_eq!(simple_type_name("int[]"), "int");
        assert_eq!(TypeRef::named("Foo.Bar").simple_name(), "Bar");
    }

    #[test]
    fn test_type_ref_display() {
        let ty = TypeRef::generic(
            "Dictionary",
            vec![TypeRef::named("string"), TypeRef::named("int")],
        );
        assert_eq!(ty.to_string(), "Dictionary<string, int>");
    }

    #[test]
    fn test_expr_json_shape() {
        let expr = Expr::method_call(Expr::ident("items"), "Count", vec![]).with_span(3, 16);
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["kind"], "invocation");
        assert_eq!(json["span"]["start"], 3);
        assert_eq!(json["callee"]["receiver"]["name"], "items");

        let back: Expr = serde_json::from_value(json).unwrap();
        assert_eq!(back, expr);
    }

    #[test]
    fn test_contains_await_skips_lambdas() {
        let inner = Expr::lambda("x", Expr::await_expr(Expr::ident("x")));
        let outer = Expr::method_call(Expr::ident("xs"), "Select", vec![inner]);
        assert!(!outer.contains_await());
        assert!(Expr::await_expr(outer).contains_await());
    }

    #[test]
    fn test_contains_await_sees_nested_arms_and_initializers() {
        let nested = Expr::new(ExprKind::SwitchExpr {
            scrutinee: Box::new(Expr::ident("k")),
            arms: vec![SwitchArm {
                pattern: Pattern::Discard,
                guard: None,
                value: Expr::await_expr(Expr::call(Expr::ident("load"), vec![])),
            }],
        });
        assert!(nested.contains_await());

        let created = Expr::new(ExprKind::ObjectCreation {
            ty: Some(TypeRef::named("Row")),
            args: vec![],
            initializer: Some(Initializer::Object {
                members: vec![MemberInit {
                    name: "Data".into(),
                    value: Expr::await_expr(Expr::ident("fetch")),
                }],
            }),
        });
        assert!(created.contains_await());
    }

    #[test]
    fn test_not_pattern_json() {
        let arm = SwitchArm {
            pattern: Pattern::Not {
                pattern: Box::new(Pattern::Constant { value: Expr::null() }),
            },
            guard: None,
            value: Expr::int(1),
        };
        let json = serde_json::to_value(&arm).unwrap();
        assert_eq!(json["pattern"]["kind"], "not");
        assert_eq!(json["pattern"]["pattern"]["kind"], "constant");

        let back: SwitchArm = serde_json::from_value(json).unwrap();
        assert_eq!(back, arm);
    }
}
