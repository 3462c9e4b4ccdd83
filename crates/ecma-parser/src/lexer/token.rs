//! Token types for the guest-language lexer.

use std::fmt;

use ecma_core::Span;

/// A token from the source code.
///
/// The lexeme is copied into the arena, so tokens outlive the source string.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    pub kind: TokenKind,
    /// The source text of this token (allocated in arena).
    pub lexeme: &'ast str,
    pub span: Span,
    /// Whether a line terminator separates this token from the previous one.
    pub newline_before: bool,
}

impl<'ast> Token<'ast> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self {
            kind,
            lexeme,
            span,
            newline_before: false,
        }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

/// All token types of the supported language subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals
    // =========================================
    /// `42`, `3.5`, `1e3`, `0xFF`
    Number,
    /// `"text"` or `'text'`, quotes included in the lexeme
    String,

    /// User-defined identifier
    Identifier,

    // =========================================
    // Keywords
    // =========================================
    Var,
    Let,
    Const,
    Function,
    Return,
    If,
    Else,
    While,
    Do,
    For,
    Break,
    Continue,
    Throw,
    Try,
    Catch,
    Finally,
    New,
    Typeof,
    Void,
    Instanceof,
    In,
    True,
    False,
    Null,

    // =========================================
    // Punctuation
    // =========================================
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Semicolon,
    Comma,
    Dot,
    Question,
    Colon,
    /// `=>`
    Arrow,

    // =========================================
    // Operators
    // =========================================
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Equal,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    EqualEqual,
    BangEqual,
    EqualEqualEqual,
    BangEqualEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    LessLess,
    GreaterGreater,
    GreaterGreaterGreater,
    Amp,
    Pipe,
    Caret,
    Tilde,
    AmpAmp,
    PipePipe,
    Bang,

    // =========================================
    // Special
    // =========================================
    /// A lexical error; the lexer recorded the details.
    Error,
    Eof,
}

impl TokenKind {
    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Var | Let
                | Const
                | Function
                | Return
                | If
                | Else
                | While
                | Do
                | For
                | Break
                | Continue
                | Throw
                | Try
                | Catch
                | Finally
                | New
                | Typeof
                | Void
                | Instanceof
                | In
                | True
                | False
                | Null
        )
    }

    /// Keywords that begin a statement; parser recovery stops before these.
    pub fn starts_statement(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Var | Let
                | Const
                | Function
                | Return
                | If
                | While
                | Do
                | For
                | Break
                | Continue
                | Throw
                | Try
        )
    }

    /// A human-readable description of this token kind.
    pub fn description(self) -> &'static str {
        use TokenKind::*;
        match self {
            Number => "number",
            String => "string",
            Identifier => "identifier",
            Var => "var",
            Let => "let",
            Const => "const",
            Function => "function",
            Return => "return",
            If => "if",
            Else => "else",
            While => "while",
            Do => "do",
            For => "for",
            Break => "break",
            Continue => "continue",
            Throw => "throw",
            Try => "try",
            Catch => "catch",
            Finally => "finally",
            New => "new",
            Typeof => "typeof",
            Void => "void",
            Instanceof => "instanceof",
            In => "in",
            True => "true",
            False => "false",
            Null => "null",
            LeftParen => "(",
            RightParen => ")",
            LeftBracket => "[",
            RightBracket => "]",
            LeftBrace => "{",
            RightBrace => "}",
            Semicolon => ";",
            Comma => ",",
            Dot => ".",
            Question => "?",
            Colon => ":",
            Arrow => "=>",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            PlusPlus => "++",
            MinusMinus => "--",
            Equal => "=",
            PlusEqual => "+=",
            MinusEqual => "-=",
            StarEqual => "*=",
            SlashEqual => "/=",
            PercentEqual => "%=",
            EqualEqual => "==",
            BangEqual => "!=",
            EqualEqualEqual => "===",
            BangEqualEqual => "!==",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            LessLess => "<<",
            GreaterGreater => ">>",
            GreaterGreaterGreater => ">>>",
            Amp => "&",
            Pipe => "|",
            Caret => "^",
            Tilde => "~",
            AmpAmp => "&&",
            PipePipe => "||",
            Bang => "!",
            Error => "error",
            Eof => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Look up a keyword by its source text.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match ident {
        "var" => Var,
        "let" => Let,
        "const" => Const,
        "function" => Function,
        "return" => Return,
        "if" => If,
        "else" => Else,
        "while" => While,
        "do" => Do,
        "for" => For,
        "break" => Break,
        "continue" => Continue,
        "throw" => Throw,
        "try" => Try,
        "catch" => Catch,
        "finally" => Finally,
        "new" => New,
        "typeof" => Typeof,
        "void" => Void,
        "instanceof" => Instanceof,
        "in" => In,
        "true" => True,
        "false" => False,
        "null" => Null,
        _ => return None,
    })
}
