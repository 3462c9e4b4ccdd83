//! Operator definitions for guest expressions.
//!
//! Provides enums for binary, unary, postfix and assignment operators along
//! with the binding powers used by the Pratt parser.

use std::fmt;

use crate::lexer::TokenKind;

/// Binary operators, organized by precedence from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `||`
    LogicalOr,
    /// `&&`
    LogicalAnd,
    /// `|`
    BitwiseOr,
    /// `^`
    BitwiseXor,
    /// `&`
    BitwiseAnd,

    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `===`
    StrictEqual,
    /// `!==`
    StrictNotEqual,

    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `instanceof`
    Instanceof,
    /// `in`
    In,

    /// `<<`
    ShiftLeft,
    /// `>>`
    ShiftRight,
    /// `>>>`
    ShiftRightUnsigned,

    /// `+`
    Add,
    /// `-`
    Sub,

    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl BinaryOp {
    /// Get the binding power (precedence) for this operator.
    ///
    /// Higher values bind more tightly. Returns (left_bp, right_bp); every
    /// binary operator here is left-associative, so right_bp = left_bp + 1.
    pub fn binding_power(&self) -> (u8, u8) {
        use BinaryOp::*;
        match self {
            LogicalOr => (4, 5),
            LogicalAnd => (6, 7),
            BitwiseOr => (8, 9),
            BitwiseXor => (10, 11),
            BitwiseAnd => (12, 13),
            Equal | NotEqual | StrictEqual | StrictNotEqual => (14, 15),
            Less | LessEqual | Greater | GreaterEqual | Instanceof | In => (16, 17),
            ShiftLeft | ShiftRight | ShiftRightUnsigned => (18, 19),
            Add | Sub => (20, 21),
            Mul | Div | Mod => (22, 23),
        }
    }

    /// Try to convert a token kind to a binary operator.
    pub fn from_token(token: TokenKind) -> Option<Self> {
        use TokenKind::*;

        Some(match token {
            PipePipe => BinaryOp::LogicalOr,
            AmpAmp => BinaryOp::LogicalAnd,
            Pipe => BinaryOp::BitwiseOr,
            Caret => BinaryOp::BitwiseXor,
            Amp => BinaryOp::BitwiseAnd,
            EqualEqual => BinaryOp::Equal,
            BangEqual => BinaryOp::NotEqual,
            EqualEqualEqual => BinaryOp::StrictEqual,
            BangEqualEqual => BinaryOp::StrictNotEqual,
            Less => BinaryOp::Less,
            LessEqual => BinaryOp::LessEqual,
            Greater => BinaryOp::Greater,
            GreaterEqual => BinaryOp::GreaterEqual,
            TokenKind::Instanceof => BinaryOp::Instanceof,
            TokenKind::In => BinaryOp::In,
            LessLess => BinaryOp::ShiftLeft,
            GreaterGreater => BinaryOp::ShiftRight,
            GreaterGreaterGreater => BinaryOp::ShiftRightUnsigned,
            Plus => BinaryOp::Add,
            Minus => BinaryOp::Sub,
            Star => BinaryOp::Mul,
            Slash => BinaryOp::Div,
            Percent => BinaryOp::Mod,
            _ => return None,
        })
    }

    /// `&&` and `||`, which do not always evaluate their right operand.
    pub fn is_short_circuit(&self) -> bool {
        matches!(self, BinaryOp::LogicalOr | BinaryOp::LogicalAnd)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BinaryOp::*;
        let s = match self {
            LogicalOr => "||",
            LogicalAnd => "&&",
            BitwiseOr => "|",
            BitwiseXor => "^",
            BitwiseAnd => "&",
            Equal => "==",
            NotEqual => "!=",
            StrictEqual => "===",
            StrictNotEqual => "!==",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            Instanceof => "instanceof",
            In => "in",
            ShiftLeft => "<<",
            ShiftRight => ">>",
            ShiftRightUnsigned => ">>>",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
        };
        write!(f, "{}", s)
    }
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-` negation
    Neg,
    /// `+` numeric conversion
    Plus,
    /// `!`
    LogicalNot,
    /// `~`
    BitwiseNot,
    /// `typeof`
    Typeof,
    /// `void`
    Void,
    /// `++` pre-increment
    PreInc,
    /// `--` pre-decrement
    PreDec,
}

impl UnaryOp {
    /// Get the binding power for prefix operators.
    pub fn binding_power() -> u8 {
        24 // Higher than all binary operators
    }

    pub fn from_token(token: TokenKind) -> Option<Self> {
        use TokenKind::*;

        Some(match token {
            Minus => UnaryOp::Neg,
            Plus => UnaryOp::Plus,
            Bang => UnaryOp::LogicalNot,
            Tilde => UnaryOp::BitwiseNot,
            TokenKind::Typeof => UnaryOp::Typeof,
            TokenKind::Void => UnaryOp::Void,
            PlusPlus => UnaryOp::PreInc,
            MinusMinus => UnaryOp::PreDec,
            _ => return None,
        })
    }

    /// Whether the operator writes back to its operand.
    pub fn is_update(&self) -> bool {
        matches!(self, UnaryOp::PreInc | UnaryOp::PreDec)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use UnaryOp::*;
        let s = match self {
            Neg => "-",
            Plus => "+",
            LogicalNot => "!",
            BitwiseNot => "~",
            Typeof => "typeof",
            Void => "void",
            PreInc => "++",
            PreDec => "--",
        };
        write!(f, "{}", s)
    }
}

/// Postfix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostfixOp {
    /// `++` post-increment
    PostInc,
    /// `--` post-decrement
    PostDec,
}

impl PostfixOp {
    /// Get the binding power for postfix operators.
    pub fn binding_power() -> u8 {
        26 // Highest precedence, shared with call and member access
    }

    pub fn from_token(token: TokenKind) -> Option<Self> {
        match token {
            TokenKind::PlusPlus => Some(PostfixOp::PostInc),
            TokenKind::MinusMinus => Some(PostfixOp::PostDec),
            _ => None,
        }
    }

    /// `+1.0` or `-1.0`.
    pub fn delta(&self) -> f64 {
        match self {
            PostfixOp::PostInc => 1.0,
            PostfixOp::PostDec => -1.0,
        }
    }
}

impl fmt::Display for PostfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostfixOp::PostInc => f.write_str("++"),
            PostfixOp::PostDec => f.write_str("--"),
        }
    }
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `+=`
    AddAssign,
    /// `-=`
    SubAssign,
    /// `*=`
    MulAssign,
    /// `/=`
    DivAssign,
    /// `%=`
    ModAssign,
}

impl AssignOp {
    /// Get the binding power for assignment operators.
    ///
    /// Assignment is right-associative, so right_bp < left_bp.
    pub fn binding_power() -> (u8, u8) {
        (2, 1) // Lowest precedence, right-associative
    }

    pub fn from_token(token: TokenKind) -> Option<Self> {
        use AssignOp::*;
        use TokenKind::*;

        Some(match token {
            Equal => Assign,
            PlusEqual => AddAssign,
            MinusEqual => SubAssign,
            StarEqual => MulAssign,
            SlashEqual => DivAssign,
            PercentEqual => ModAssign,
            _ => return None,
        })
    }

    /// The binary operator a compound assignment applies, `None` for `=`.
    pub fn binary_op(&self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::AddAssign => Some(BinaryOp::Add),
            AssignOp::SubAssign => Some(BinaryOp::Sub),
            AssignOp::MulAssign => Some(BinaryOp::Mul),
            AssignOp::DivAssign => Some(BinaryOp::Div),
            AssignOp::ModAssign => Some(BinaryOp::Mod),
        }
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use AssignOp::*;
        let s = match self {
            Assign => "=",
            AddAssign => "+=",
            SubAssign => "-=",
            MulAssign => "*=",
            DivAssign => "/=",
            ModAssign => "%=",
        };
        write!(f, "{}", s)
    }
}
