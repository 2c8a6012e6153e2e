//! AST node types for ECMAScript.
//!
//! Design principle: everything is an Expression, Pattern, or Statement.
//! Node shapes follow ESTree closely so that [`crate::estree`] is a direct
//! walk, but spans are byte offsets and parentheses leave no trace.

use crate::options::ParserOptions;
use crate::span::{LineIndex, Span};

/// The root of a parsed script or module.
#[derive(Debug, Clone)]
pub struct Program {
    /// All statements in the program.
    pub body: Vec<Stmt>,
    pub source_type: SourceType,
    pub span: Span,
    /// Collected comments (empty unless requested).
    pub comments: Vec<Comment>,
    /// Source code (literal `raw` values are slices of it).
    pub source: String,
    pub(crate) options: ParserOptions,
    pub(crate) line_index: Option<LineIndex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Script,
    Module,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Script => "script",
            SourceType::Module => "module",
        }
    }
}

/// A source comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
    /// Text without the delimiters.
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Block,
    /// Annex B `<!--` or `-->` comment.
    Html,
}

/// An identifier that is not an expression (labels, declaration names,
/// import bindings, meta property parts).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// =============================================================================
// Expressions
// =============================================================================

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The name of an identifier reference.
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// The static name of a non-computed property key.
    pub fn static_name(&self) -> Option<String> {
        match &self.kind {
            ExprKind::Ident(name) | ExprKind::String(name) => Some(name.clone()),
            ExprKind::Number(n) => Some(number_to_string(*n)),
            _ => None,
        }
    }
}

/// Expression kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // === Literals ===
    /// Null literal
    Null,
    /// Boolean literal
    Bool(bool),
    /// Number literal
    Number(f64),
    /// BigInt literal (digits as written, without separators or `n`)
    BigInt(String),
    /// String literal
    String(String),
    /// Regular expression
    Regex { pattern: String, flags: String },
    /// Template literal: `` `a${b}c` ``
    Template(Box<TemplateLiteral>),
    /// Tagged template: `` tag`template` ``
    TaggedTemplate {
        tag: Box<Expr>,
        quasi: Box<TemplateLiteral>,
    },

    // === Identifiers ===
    /// Identifier reference
    Ident(String),
    /// Private name, only as the left operand of `in`: `#x in obj`
    PrivateName(String),
    /// `this` keyword
    This,
    /// `super` keyword
    Super,

    // === Compound Expressions ===
    /// Array literal: `[a, , ...b]`
    Array(Vec<Option<Expr>>),
    /// Object literal: `{a: 1, ...b}`
    Object(Vec<ObjectMember>),
    /// Function expression: `function() {}`
    Function(Box<Function>),
    /// Arrow function: `() => {}`
    Arrow(Box<ArrowFunction>),
    /// Class expression: `class {}`
    Class(Box<Class>),

    // === Operations ===
    /// Unary operation: `!x`, `-x`, `typeof x`
    Unary { op: UnaryOp, arg: Box<Expr> },
    /// Binary or logical operation: `a + b`, `a && b`
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Assignment: `a = b`, `[a, b] = c`, `a += b`
    Assign {
        op: AssignOp,
        left: Box<Pattern>,
        right: Box<Expr>,
    },
    /// Update expression: `++a`, `a++`
    Update {
        op: UpdateOp,
        prefix: bool,
        arg: Box<Expr>,
    },
    /// Conditional: `a ? b : c`
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    /// Sequence: `a, b, c`
    Sequence(Vec<Expr>),

    // === Member Access and Calls ===
    /// Member expression: `a.b`, `a[b]`, `a.#b`, `a?.b`
    Member {
        object: Box<Expr>,
        property: MemberProp,
        optional: bool,
    },
    /// Function call: `f(a, b)`, `f?.(a)`
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        optional: bool,
    },
    /// The outermost node of an optional chain: `a?.b.c`
    Chain(Box<Expr>),
    /// New expression: `new Foo(a, b)`
    New { callee: Box<Expr>, args: Vec<Expr> },

    // === Special ===
    /// Spread element: `...arr`
    Spread(Box<Expr>),
    /// Yield expression: `yield x`, `yield* x`
    Yield {
        arg: Option<Box<Expr>>,
        delegate: bool,
    },
    /// Await expression: `await x`
    Await(Box<Expr>),
    /// Dynamic import: `import(x)`, `import(x, opts)`
    Import {
        source: Box<Expr>,
        options: Option<Box<Expr>>,
    },
    /// Meta property: `new.target`, `import.meta`
    MetaProperty { meta: Identifier, property: Identifier },
}

/// The property side of a member expression.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberProp {
    /// `a.b`
    Ident(Identifier),
    /// `a.#b`
    Private(Identifier),
    /// `a[b]`
    Computed(Box<Expr>),
}

/// Template literal.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLiteral {
    pub quasis: Vec<TemplateElement>,
    pub exprs: Vec<Expr>,
    pub span: Span,
}

/// One literal chunk of a template.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateElement {
    /// `None` for an invalid escape in a tagged template.
    pub cooked: Option<String>,
    pub raw: String,
    pub tail: bool,
    pub span: Span,
}

/// Member of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectMember {
    Property(Box<Property>),
    /// `...expr`, spanning the spread
    Spread(Expr),
}

/// Object property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Identifier, string or number literal, or the computed expression.
    pub key: Expr,
    pub value: Expr,
    pub kind: PropertyKind,
    pub shorthand: bool,
    pub computed: bool,
    pub span: Span,
}

/// Property kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Init,
    Get,
    Set,
    Method,
}

// =============================================================================
// Statements
// =============================================================================

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Statement kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    // === Declarations ===
    /// Variable declaration: `let x = 1`
    Var(Box<VarDecl>),
    /// Function declaration: `function foo() {}`
    Function(Box<Function>),
    /// Class declaration: `class Foo {}`
    Class(Box<Class>),

    // === Simple statements ===
    /// Expression statement. `directive` holds the raw text (without
    /// quotes) of a directive prologue entry.
    Expr {
        expr: Box<Expr>,
        directive: Option<String>,
    },
    /// Block: `{ ... }`
    Block(BlockStmt),
    /// Empty statement: `;`
    Empty,
    /// `debugger;`
    Debugger,
    /// `with (obj) body`
    With { object: Box<Expr>, body: Box<Stmt> },

    // === Control flow ===
    /// `return expr;`
    Return(Option<Box<Expr>>),
    /// `label: body`
    Labeled { label: Identifier, body: Box<Stmt> },
    /// `break label;`
    Break(Option<Identifier>),
    /// `continue label;`
    Continue(Option<Identifier>),
    /// `if (test) consequent else alternate`
    If {
        test: Box<Expr>,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    /// `switch (d) { cases }`
    Switch {
        discriminant: Box<Expr>,
        cases: Vec<SwitchCase>,
    },
    /// `throw expr;`
    Throw(Box<Expr>),
    /// `try {} catch {} finally {}`
    Try {
        block: BlockStmt,
        handler: Option<CatchClause>,
        finalizer: Option<BlockStmt>,
    },

    // === Loops ===
    /// `while (test) body`
    While { test: Box<Expr>, body: Box<Stmt> },
    /// `do body while (test)`
    DoWhile { body: Box<Stmt>, test: Box<Expr> },
    /// `for (init; test; update) body`
    For {
        init: Option<ForInit>,
        test: Option<Box<Expr>>,
        update: Option<Box<Expr>>,
        body: Box<Stmt>,
    },
    /// `for (left in right) body`
    ForIn {
        left: ForHead,
        right: Box<Expr>,
        body: Box<Stmt>,
    },
    /// `for (left of right) body`, `for await (...)`
    ForOf {
        left: ForHead,
        right: Box<Expr>,
        body: Box<Stmt>,
        is_await: bool,
    },

    // === Modules ===
    Import(Box<ImportDecl>),
    Export(Box<ExportDecl>),
}

/// Block statement.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Variable declaration kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
    Using,
}

impl VarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
            VarKind::Using => "using",
        }
    }
}

/// Variable declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: VarKind,
    pub decls: Vec<VarDeclarator>,
    pub span: Span,
}

/// Variable declarator.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclarator {
    pub id: Pattern,
    pub init: Option<Expr>,
    pub span: Span,
}

/// Switch case.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub test: Option<Expr>, // None for default
    pub consequent: Vec<Stmt>,
    pub span: Span,
}

/// Catch clause.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<Pattern>,
    pub body: BlockStmt,
    pub span: Span,
}

/// For loop initializer.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Var(Box<VarDecl>),
    Expr(Box<Expr>),
}

/// Left side of a for-in or for-of head.
#[derive(Debug, Clone, PartialEq)]
pub enum ForHead {
    Var(Box<VarDecl>),
    Pattern(Pattern),
}

// =============================================================================
// Patterns
// =============================================================================

/// A binding or assignment target.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

impl Pattern {
    pub fn new(kind: PatternKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Pattern kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternKind {
    /// Simple identifier: `x`
    Ident(String),
    /// Member expression, only in assignment targets: `a.b`
    Member(Box<Expr>),
    /// Array pattern: `[a, , ...rest]`
    Array(Vec<Option<Pattern>>),
    /// Object pattern: `{a, b: c, ...rest}`
    Object(Vec<ObjectPatternProp>),
    /// Default value: `a = 1`
    Assign { left: Box<Pattern>, right: Box<Expr> },
    /// Rest element: `...rest`
    Rest(Box<Pattern>),
}

/// Member of an object pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectPatternProp {
    Property(Box<PatternProperty>),
    /// `...rest`, a [`PatternKind::Rest`] pattern
    Rest(Pattern),
}

/// Property in an object pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternProperty {
    pub key: Expr,
    pub value: Pattern,
    pub computed: bool,
    pub shorthand: bool,
    pub span: Span,
}

// =============================================================================
// Supporting Types
// =============================================================================

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,  // -
    Plus,   // +
    Not,    // !
    BitNot, // ~
    Typeof, // typeof
    Void,   // void
    Delete, // delete
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::Typeof => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Mod, // %
    Pow, // **

    // Comparison
    Eq,          // ==
    NotEq,       // !=
    StrictEq,    // ===
    StrictNotEq, // !==
    Lt,          // <
    LtEq,        // <=
    Gt,          // >
    GtEq,        // >=

    // Bitwise
    BitOr,  // |
    BitXor, // ^
    BitAnd, // &
    Shl,    // <<
    Shr,    // >>
    UShr,   // >>>

    // Logical
    And,             // &&
    Or,              // ||
    NullishCoalesce, // ??

    // Other
    In,         // in
    Instanceof, // instanceof
}

impl BinaryOp {
    /// `&&`, `||` and `??` become ESTree `LogicalExpression`s.
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or | BinaryOp::NullishCoalesce)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::NullishCoalesce => "??",
            BinaryOp::In => "in",
            BinaryOp::Instanceof => "instanceof",
        }
    }
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,        // =
    AddAssign,     // +=
    SubAssign,     // -=
    MulAssign,     // *=
    DivAssign,     // /=
    ModAssign,     // %=
    PowAssign,     // **=
    ShlAssign,     // <<=
    ShrAssign,     // >>=
    UShrAssign,    // >>>=
    BitOrAssign,   // |=
    BitXorAssign,  // ^=
    BitAndAssign,  // &=
    AndAssign,     // &&=
    OrAssign,      // ||=
    NullishAssign, // ??=
}

impl AssignOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
            AssignOp::ModAssign => "%=",
            AssignOp::PowAssign => "**=",
            AssignOp::ShlAssign => "<<=",
            AssignOp::ShrAssign => ">>=",
            AssignOp::UShrAssign => ">>>=",
            AssignOp::BitOrAssign => "|=",
            AssignOp::BitXorAssign => "^=",
            AssignOp::BitAndAssign => "&=",
            AssignOp::AndAssign => "&&=",
            AssignOp::OrAssign => "||=",
            AssignOp::NullishAssign => "??=",
        }
    }
}

/// Update operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment, // ++
    Decrement, // --
}

impl UpdateOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateOp::Increment => "++",
            UpdateOp::Decrement => "--",
        }
    }
}

// =============================================================================
// Functions and Classes
// =============================================================================

/// Function node (used for declarations, expressions, methods).
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub id: Option<Identifier>,
    pub params: Vec<Pattern>,
    pub body: BlockStmt,
    pub is_async: bool,
    pub is_generator: bool,
    pub span: Span,
}

/// Arrow function node.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowFunction {
    pub params: Vec<Pattern>,
    pub body: ArrowBody,
    pub is_async: bool,
    pub span: Span,
}

/// Arrow function body.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    Expr(Box<Expr>),
    Block(BlockStmt),
}

/// Class node.
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub id: Option<Identifier>,
    pub super_class: Option<Box<Expr>>,
    pub body: Vec<ClassMember>,
    /// Span of `{ ... }`.
    pub body_span: Span,
    pub span: Span,
}

/// Class member.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMember {
    pub kind: ClassMemberKind,
    pub span: Span,
}

/// Class member kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMemberKind {
    /// Method: `foo() {}`
    Method {
        key: Expr,
        value: Function,
        kind: MethodKind,
        computed: bool,
        is_static: bool,
    },
    /// Property: `foo = 1`
    Property {
        key: Expr,
        value: Option<Expr>,
        computed: bool,
        is_static: bool,
    },
    /// Static block: `static { ... }`
    StaticBlock(Vec<Stmt>),
}

/// Method kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Method,
    Get,
    Set,
    Constructor,
}

impl MethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKind::Method => "method",
            MethodKind::Get => "get",
            MethodKind::Set => "set",
            MethodKind::Constructor => "constructor",
        }
    }
}

// =============================================================================
// Modules
// =============================================================================

/// Import declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub specifiers: Vec<ImportSpecifier>,
    /// String literal.
    pub source: Expr,
    pub attributes: Vec<ImportAttribute>,
}

/// Import specifier.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    /// Default import: `import foo from "mod"`
    Default { local: Identifier, span: Span },
    /// Namespace import: `import * as foo from "mod"`
    Namespace { local: Identifier, span: Span },
    /// Named import: `import { foo, "bar" as baz } from "mod"`
    Named {
        /// Identifier or string literal.
        imported: Expr,
        local: Identifier,
        span: Span,
    },
}

/// `with { type: "json" }` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportAttribute {
    /// Identifier or string literal.
    pub key: Expr,
    /// String literal.
    pub value: Expr,
    pub span: Span,
}

/// Export declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDecl {
    /// `export { foo, bar as baz }`, `export { a } from "mod"`,
    /// `export const x = 1`
    Named {
        declaration: Option<Box<Stmt>>,
        specifiers: Vec<ExportSpecifier>,
        source: Option<Expr>,
        attributes: Vec<ImportAttribute>,
    },
    /// `export default ...`
    Default(DefaultDecl),
    /// `export * from "mod"`, `export * as ns from "mod"`
    All {
        exported: Option<Expr>,
        source: Expr,
        attributes: Vec<ImportAttribute>,
    },
}

/// The declaration of an `export default`.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultDecl {
    Function(Box<Function>),
    Class(Box<Class>),
    Expr(Box<Expr>),
}

/// Export specifier. Names are identifiers or string literals.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub local: Expr,
    pub exported: Expr,
    pub span: Span,
}

/// Render a number the way property-name comparisons see it.
pub(crate) fn number_to_string(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_name() {
        let key = Expr::new(ExprKind::Number(1.0), Span::new(0, 3));
        assert_eq!(key.static_name().as_deref(), Some("1"));
        let key = Expr::new(ExprKind::String("__proto__".into()), Span::new(0, 11));
        assert_eq!(key.static_name().as_deref(), Some("__proto__"));
        let key = Expr::new(ExprKind::This, Span::new(0, 4));
        assert_eq!(key.static_name(), None);
    }

    #[test]
    fn test_operator_spelling() {
        assert!(BinaryOp::NullishCoalesce.is_logical());
        assert!(!BinaryOp::In.is_logical());
        assert_eq!(BinaryOp::UShr.as_str(), ">>>");
        assert_eq!(AssignOp::NullishAssign.as_str(), "??=");
        assert_eq!(VarKind::Using.as_str(), "using");
    }
}
