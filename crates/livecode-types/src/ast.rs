//! AST node types for the livecode dialect (JavaScript + JSX, with
//! TypeScript annotations erased by the parser).
//!
//! Every node carries a [`Span`] for error reporting. Function and class
//! definitions are behind `Rc` so closures created by the evaluator can keep
//! their bodies alive without cloning the tree.

use std::fmt;
use std::rc::Rc;

use crate::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A parsed module or function body.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl Program {
    /// Whether the program uses `import`/`export` syntax.
    pub fn is_module(&self) -> bool {
        self.body
            .iter()
            .any(|s| matches!(s, Stmt::Import(_) | Stmt::Export(_)))
    }
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Var(VarDecl),
    Function(Rc<FunctionDef>),
    Class(Rc<ClassDef>),
    Expr(ExprStmt),
    Return(ReturnStmt),
    If(IfStmt),
    For(ForStmt),
    ForEach(ForEachStmt),
    While(WhileStmt),
    DoWhile(WhileStmt),
    Switch(SwitchStmt),
    Break(Span),
    Continue(Span),
    Throw(ThrowStmt),
    Try(TryStmt),
    Block(Block),
    Empty(Span),
    Import(ImportDecl),
    Export(ExportDecl),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Var(v) => v.span,
            Stmt::Function(f) => f.span,
            Stmt::Class(c) => c.span,
            Stmt::Expr(e) => e.span,
            Stmt::Return(r) => r.span,
            Stmt::If(i) => i.span,
            Stmt::For(f) => f.span,
            Stmt::ForEach(f) => f.span,
            Stmt::While(w) | Stmt::DoWhile(w) => w.span,
            Stmt::Switch(s) => s.span,
            Stmt::Break(s) | Stmt::Continue(s) | Stmt::Empty(s) => *s,
            Stmt::Throw(t) => t.span,
            Stmt::Try(t) => t.span,
            Stmt::Block(b) => b.span,
            Stmt::Import(i) => i.span,
            Stmt::Export(e) => e.span,
        }
    }
}

/// `{ stmts... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        }
    }
}

/// `const a = 1, { b } = c`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: VarKind,
    pub declarations: Vec<VarDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclarator {
    pub pattern: Pattern,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub argument: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub test: Expr,
    pub consequent: Box<Stmt>,
    pub alternate: Option<Box<Stmt>>,
    pub span: Span,
}

/// `for (init; test; update) body`
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<ForInit>,
    pub test: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Var(VarDecl),
    Expr(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForEachKind {
    Of,
    In,
}

/// `for (const x of xs) body` / `for (k in obj) body`
#[derive(Debug, Clone, PartialEq)]
pub struct ForEachStmt {
    pub kind: ForEachKind,
    pub target: ForEachTarget,
    pub iterable: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForEachTarget {
    Decl(VarKind, Pattern),
    Ident(Ident),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub test: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub discriminant: Expr,
    pub cases: Vec<SwitchCase>,
    pub span: Span,
}

/// `case test: body`. `test` is `None` for `default:`.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStmt {
    pub argument: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    pub block: Block,
    pub handler: Option<CatchClause>,
    pub finalizer: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<Pattern>,
    pub body: Block,
}

// ── Modules ──────────────────────────────────────────────────────────────────

/// `import a, { b as c } from "path"`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub source: String,
    pub specifiers: Vec<ImportSpecifier>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    /// `import a from ...`
    Default(Ident),
    /// `import * as ns from ...`
    Namespace(Ident),
    /// `import { imported as local } from ...`
    Named { imported: String, local: Ident },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportDecl {
    pub kind: ExportKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportKind {
    /// `export default <expr>`
    DefaultExpr(Expr),
    /// `export default function f() {}`
    DefaultFunction(Rc<FunctionDef>),
    /// `export default class C {}`
    DefaultClass(Rc<ClassDef>),
    /// `export const x = ...` / `export function f() {}` / `export class C {}`
    Decl(Box<Stmt>),
    /// `export { a, b as c } [from "path"]`
    Named {
        specifiers: Vec<ExportSpecifier>,
        source: Option<String>,
    },
    /// `export * from "path"`
    All { source: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
}

// ══════════════════════════════════════════════════════════════════════════════
// Functions & Classes
// ══════════════════════════════════════════════════════════════════════════════

/// A function declaration, function expression, method or arrow function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: Option<Ident>,
    pub params: Vec<Param>,
    pub body: FunctionBody,
    pub is_arrow: bool,
    pub span: Span,
}

impl FunctionDef {
    /// Number of leading parameters without a default value (JS `length`).
    pub fn required_params(&self) -> usize {
        self.params
            .iter()
            .take_while(|p| p.default.is_none() && !p.rest)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    Block(Block),
    /// Arrow function concise body: `x => x + 1`.
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub pattern: Pattern,
    pub default: Option<Expr>,
    pub rest: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: Option<Ident>,
    pub superclass: Option<Expr>,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

impl ClassDef {
    pub fn constructor(&self) -> Option<&Rc<FunctionDef>> {
        self.members.iter().find_map(|m| match m {
            ClassMember::Constructor(f) => Some(f),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Constructor(Rc<FunctionDef>),
    Method {
        key: PropKey,
        func: Rc<FunctionDef>,
        is_static: bool,
    },
    Field {
        key: PropKey,
        value: Option<Expr>,
        is_static: bool,
    },
}

// ══════════════════════════════════════════════════════════════════════════════
// Patterns
// ══════════════════════════════════════════════════════════════════════════════

/// A binding target: identifier or destructuring pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Ident(Ident),
    Object {
        props: Vec<ObjectPatternProp>,
        rest: Option<Ident>,
        span: Span,
    },
    Array {
        elements: Vec<Option<PatternElem>>,
        rest: Option<Box<Pattern>>,
        span: Span,
    },
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Ident(i) => i.span,
            Pattern::Object { span, .. } | Pattern::Array { span, .. } => *span,
        }
    }

    /// All identifiers bound by this pattern, in source order.
    pub fn bound_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Pattern::Ident(i) => out.push(&i.name),
            Pattern::Object { props, rest, .. } => {
                for p in props {
                    p.value.pattern.collect_names(out);
                }
                if let Some(r) = rest {
                    out.push(&r.name);
                }
            }
            Pattern::Array { elements, rest, .. } => {
                for e in elements.iter().flatten() {
                    e.pattern.collect_names(out);
                }
                if let Some(r) = rest {
                    r.collect_names(out);
                }
            }
        }
    }
}

/// A pattern with an optional default: `a = 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternElem {
    pub pattern: Pattern,
    pub default: Option<Expr>,
}

/// `key: pattern = default` inside an object pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPatternProp {
    pub key: PropKey,
    pub value: PatternElem,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // ── Literals ──
    Number(f64),
    String(String),
    Template(Vec<TemplatePart>),
    Bool(bool),
    Null,
    This,
    /// `super`: only valid as `super(...)` or `super.x`.
    Super,

    Ident(String),
    Array(Vec<ArrayElement>),
    Object(Vec<ObjectProp>),
    Function(Rc<FunctionDef>),
    Arrow(Rc<FunctionDef>),
    Class(Rc<ClassDef>),

    // ── Operators ──
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        target: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    Logical {
        left: Box<Expr>,
        op: LogicalOp,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        op: AssignOp,
        value: Box<Expr>,
    },
    Sequence(Vec<Expr>),

    // ── Access & calls ──
    Member {
        object: Box<Expr>,
        property: MemberProp,
        optional: bool,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<ArrayElement>,
        optional: bool,
    },
    New {
        callee: Box<Expr>,
        args: Vec<ArrayElement>,
    },
    Paren(Box<Expr>),

    // ── Markup ──
    Jsx(Box<JsxElement>),
}

/// A piece of a template literal.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Literal(String),
    Expr(Expr),
}

/// An array element or call argument: plain or `...spread`.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayElement {
    Expr(Expr),
    Spread(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectProp {
    KeyValue { key: PropKey, value: Expr },
    Shorthand(Ident),
    Method { key: PropKey, func: Rc<FunctionDef> },
    Spread(Expr),
}

/// A property name in an object literal, pattern or class body.
#[derive(Debug, Clone, PartialEq)]
pub enum PropKey {
    Ident(String),
    String(String),
    Number(f64),
    Computed(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberProp {
    Named(Ident),
    Computed(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    TypeOf,
    Void,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Inc,
    Dec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    InstanceOf,
    In,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Nullish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    And,
    Or,
    Nullish,
}

impl AssignOp {
    /// The binary operator a compound assignment applies, if arithmetic.
    pub fn binary(self) -> Option<BinOp> {
        match self {
            AssignOp::Add => Some(BinOp::Add),
            AssignOp::Sub => Some(BinOp::Sub),
            AssignOp::Mul => Some(BinOp::Mul),
            AssignOp::Div => Some(BinOp::Div),
            AssignOp::Mod => Some(BinOp::Mod),
            AssignOp::Pow => Some(BinOp::Pow),
            _ => None,
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::TypeOf => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
        })
    }
}

impl fmt::Display for UpdateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UpdateOp::Inc => "++",
            UpdateOp::Dec => "--",
        })
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::StrictEq => "===",
            BinOp::StrictNotEq => "!==",
            BinOp::Less => "<",
            BinOp::Greater => ">",
            BinOp::LessEq => "<=",
            BinOp::GreaterEq => ">=",
            BinOp::InstanceOf => "instanceof",
            BinOp::In => "in",
        })
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
            LogicalOp::Nullish => "??",
        })
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::Pow => "**=",
            AssignOp::And => "&&=",
            AssignOp::Or => "||=",
            AssignOp::Nullish => "??=",
        })
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// JSX
// ══════════════════════════════════════════════════════════════════════════════

/// `<name attrs...>children</name>` or a fragment `<>children</>`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsxElement {
    pub name: JsxName,
    pub attributes: Vec<JsxAttribute>,
    pub children: Vec<JsxChild>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxName {
    Fragment,
    /// Lower-case or dashed tag: `div`, `my-widget`, `svg:path`.
    Intrinsic(String),
    /// Component reference: `Foo` or `Foo.Bar`.
    Component(Vec<String>),
}

impl JsxName {
    /// Classify a raw tag name the way JSX does.
    pub fn classify(raw: &str) -> JsxName {
        if raw.contains('.') {
            return JsxName::Component(raw.split('.').map(str::to_string).collect());
        }
        let starts_lower = raw
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase());
        if starts_lower || raw.contains('-') || raw.contains(':') {
            JsxName::Intrinsic(raw.to_string())
        } else {
            JsxName::Component(vec![raw.to_string()])
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttribute {
    Named {
        name: String,
        value: Option<JsxAttrValue>,
        span: Span,
    },
    Spread(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttrValue {
    String(String),
    Expr(Expr),
    Element(Box<JsxElement>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxChild {
    /// Text with JSX whitespace rules and entities already applied.
    Text(String),
    Expr(Expr),
    Element(JsxElement),
}
