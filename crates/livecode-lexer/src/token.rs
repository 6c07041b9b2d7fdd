//! Token types for the livecode lexer.
//!
//! Defines [`TokenKind`] covering every lexeme of the playground dialect
//! (JavaScript, JSX and the TypeScript punctuation the parser erases) and
//! [`Token`], which pairs a kind with a source [`Span`].

use livecode_types::Span;
use std::fmt;

/// Reserved words. Contextual words (`of`, `from`, `as`, `async`, `get`,
/// `set`, `static`, `type`, `interface`, ...) are lexed as identifiers and
/// recognised by the parser where they matter.
pub const ALL_KEYWORDS: &[&str] = &[
    "var", "let", "const", "function", "return", "if", "else", "for", "while", "do",
    "break", "continue", "new", "this", "super", "class", "extends", "import", "export",
    "default", "throw", "try", "catch", "finally", "switch", "case", "typeof",
    "instanceof", "in", "void", "delete", "true", "false", "null",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// A line terminator appeared between the previous token and this one.
    /// Drives automatic semicolon insertion in the parser.
    pub newline_before: bool,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            span,
            newline_before: false,
        }
    }

    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ─────────────────────────────────────────────

    /// `42`, `3.14`, `0xff`, `1_000`
    Number(f64),
    /// `"text"` or `'text'` with escapes resolved
    Str(String),
    /// Template literal without substitutions: `` `text` ``
    Template(String),

    // ── Template Interpolation ───────────────────────────────

    /// Text before the first `${` of a template literal.
    TemplateStart(String),
    /// Text between two substitutions.
    TemplatePart(String),
    /// Text after the last substitution, up to the closing backtick.
    TemplateEnd(String),
    /// `${`
    InterpolationStart,
    /// `}` closing a substitution
    InterpolationEnd,

    /// A non-reserved name.
    Ident(String),

    // ── Keywords ─────────────────────────────────────────────

    Var,
    Let,
    Const,
    Function,
    Return,
    If,
    Else,
    For,
    While,
    Do,
    Break,
    Continue,
    New,
    This,
    Super,
    Class,
    Extends,
    Import,
    Export,
    Default,
    Throw,
    Try,
    Catch,
    Finally,
    Switch,
    Case,
    TypeOf,
    InstanceOf,
    In,
    Void,
    Delete,
    True,
    False,
    Null,

    // ── Operators ────────────────────────────────────────────

    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    StarStar,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `!`
    Bang,
    /// `==`
    EqEq,
    /// `===`
    EqEqEq,
    /// `!=`
    BangEq,
    /// `!==`
    BangEqEq,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEq,
    /// `>=`
    GreaterEq,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `??`
    QuestionQuestion,
    /// `?`
    Question,
    /// `?.`
    QuestionDot,
    /// `&` (type intersections only)
    Amp,
    /// `|` (type unions only)
    Pipe,

    // ── Assignment ───────────────────────────────────────────

    /// `=`
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    StarStarEq,
    SlashEq,
    PercentEq,
    AmpAmpEq,
    PipePipeEq,
    QuestionQuestionEq,

    // ── Punctuation ──────────────────────────────────────────

    /// `=>`
    Arrow,
    /// `...`
    DotDotDot,
    /// `.`
    Dot,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,

    // ── JSX ──────────────────────────────────────────────────

    /// `<` opening a JSX tag
    JsxTagStart,
    /// `</`
    JsxCloseTagStart,
    /// Tag or attribute name, may contain `-`, `:` and `.`
    JsxIdent(String),
    /// Raw attribute string (no escape processing)
    JsxString(String),
    /// `>` ending a JSX tag
    JsxTagEnd,
    /// `/>`
    JsxSelfClose,
    /// Raw text between tags
    JsxText(String),

    /// End of file
    Eof,
}

impl TokenKind {
    /// Look up a reserved word.
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        Some(match s {
            "var" => TokenKind::Var,
            "let" => TokenKind::Let,
            "const" => TokenKind::Const,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "new" => TokenKind::New,
            "this" => TokenKind::This,
            "super" => TokenKind::Super,
            "class" => TokenKind::Class,
            "extends" => TokenKind::Extends,
            "import" => TokenKind::Import,
            "export" => TokenKind::Export,
            "default" => TokenKind::Default,
            "throw" => TokenKind::Throw,
            "try" => TokenKind::Try,
            "catch" => TokenKind::Catch,
            "finally" => TokenKind::Finally,
            "switch" => TokenKind::Switch,
            "case" => TokenKind::Case,
            "typeof" => TokenKind::TypeOf,
            "instanceof" => TokenKind::InstanceOf,
            "in" => TokenKind::In,
            "void" => TokenKind::Void,
            "delete" => TokenKind::Delete,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            _ => return None,
        })
    }

    pub fn is_keyword(&self) -> bool {
        self.keyword_text().is_some()
    }

    /// Source text of a keyword token. Keywords are valid property names
    /// (`obj.default`, `{ class: 1 }`), so the parser needs them back.
    pub fn keyword_text(&self) -> Option<&'static str> {
        Some(match self {
            TokenKind::Var => "var",
            TokenKind::Let => "let",
            TokenKind::Const => "const",
            TokenKind::Function => "function",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::New => "new",
            TokenKind::This => "this",
            TokenKind::Super => "super",
            TokenKind::Class => "class",
            TokenKind::Extends => "extends",
            TokenKind::Import => "import",
            TokenKind::Export => "export",
            TokenKind::Default => "default",
            TokenKind::Throw => "throw",
            TokenKind::Try => "try",
            TokenKind::Catch => "catch",
            TokenKind::Finally => "finally",
            TokenKind::Switch => "switch",
            TokenKind::Case => "case",
            TokenKind::TypeOf => "typeof",
            TokenKind::InstanceOf => "instanceof",
            TokenKind::In => "in",
            TokenKind::Void => "void",
            TokenKind::Delete => "delete",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            _ => return None,
        })
    }

    /// Whether a `<` following this token must be a comparison rather than
    /// the start of a JSX element.
    pub fn ends_expression(&self) -> bool {
        matches!(
            self,
            TokenKind::Number(_)
                | TokenKind::Str(_)
                | TokenKind::Template(_)
                | TokenKind::TemplateEnd(_)
                | TokenKind::Ident(_)
                | TokenKind::This
                | TokenKind::Super
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
                | TokenKind::JsxTagEnd
                | TokenKind::JsxSelfClose
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(kw) = self.keyword_text() {
            return f.write_str(kw);
        }
        match self {
            TokenKind::Number(n) => write!(f, "{n}"),
            TokenKind::Str(s) => write!(f, "\"{s}\""),
            TokenKind::Template(_) => f.write_str("template literal"),
            TokenKind::TemplateStart(_) => f.write_str("template start"),
            TokenKind::TemplatePart(_) => f.write_str("template part"),
            TokenKind::TemplateEnd(_) => f.write_str("template end"),
            TokenKind::InterpolationStart => f.write_str("${"),
            TokenKind::InterpolationEnd => f.write_str("interpolation end"),
            TokenKind::Ident(s) => f.write_str(s),
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::StarStar => f.write_str("**"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::Percent => f.write_str("%"),
            TokenKind::PlusPlus => f.write_str("++"),
            TokenKind::MinusMinus => f.write_str("--"),
            TokenKind::Bang => f.write_str("!"),
            TokenKind::EqEq => f.write_str("=="),
            TokenKind::EqEqEq => f.write_str("==="),
            TokenKind::BangEq => f.write_str("!="),
            TokenKind::BangEqEq => f.write_str("!=="),
            TokenKind::Less => f.write_str("<"),
            TokenKind::Greater => f.write_str(">"),
            TokenKind::LessEq => f.write_str("<="),
            TokenKind::GreaterEq => f.write_str(">="),
            TokenKind::AmpAmp => f.write_str("&&"),
            TokenKind::PipePipe => f.write_str("||"),
            TokenKind::QuestionQuestion => f.write_str("??"),
            TokenKind::Question => f.write_str("?"),
            TokenKind::QuestionDot => f.write_str("?."),
            TokenKind::Amp => f.write_str("&"),
            TokenKind::Pipe => f.write_str("|"),
            TokenKind::Eq => f.write_str("="),
            TokenKind::PlusEq => f.write_str("+="),
            TokenKind::MinusEq => f.write_str("-="),
            TokenKind::StarEq => f.write_str("*="),
            TokenKind::StarStarEq => f.write_str("**="),
            TokenKind::SlashEq => f.write_str("/="),
            TokenKind::PercentEq => f.write_str("%="),
            TokenKind::AmpAmpEq => f.write_str("&&="),
            TokenKind::PipePipeEq => f.write_str("||="),
            TokenKind::QuestionQuestionEq => f.write_str("??="),
            TokenKind::Arrow => f.write_str("=>"),
            TokenKind::DotDotDot => f.write_str("..."),
            TokenKind::Dot => f.write_str("."),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::LBracket => f.write_str("["),
            TokenKind::RBracket => f.write_str("]"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Colon => f.write_str(":"),
            TokenKind::Semicolon => f.write_str(";"),
            TokenKind::JsxTagStart => f.write_str("<"),
            TokenKind::JsxCloseTagStart => f.write_str("</"),
            TokenKind::JsxIdent(s) => f.write_str(s),
            TokenKind::JsxString(s) => write!(f, "\"{s}\""),
            TokenKind::JsxTagEnd => f.write_str(">"),
            TokenKind::JsxSelfClose => f.write_str("/>"),
            TokenKind::JsxText(_) => f.write_str("JSX text"),
            TokenKind::Eof => f.write_str("end of file"),
            _ => Ok(()),
        }
    }
}
