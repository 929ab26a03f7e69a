use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::SrcLoc;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("namespace", TokenKind::Namespace);
        map.insert("function", TokenKind::Function);
        map.insert("returning", TokenKind::Returning);
        map.insert("nostalgic", TokenKind::Nostalgic);
        map.insert("class", TokenKind::Class);
        map.insert("protocol", TokenKind::Protocol);
        map.insert("alias", TokenKind::Alias);
        map.insert("let", TokenKind::Let);
        map.insert("be", TokenKind::Be);
        map.insert("if", TokenKind::If);
        map.insert("then", TokenKind::Then);
        map.insert("else", TokenKind::Else);
        map.insert("switch", TokenKind::Switch);
        map.insert("case", TokenKind::Case);
        map.insert("default", TokenKind::Default);
        map.insert("while", TokenKind::While);
        map.insert("until", TokenKind::Until);
        map.insert("do", TokenKind::Do);
        map.insert("for", TokenKind::For);
        map.insert("return", TokenKind::Return);
        map.insert("break", TokenKind::Break);
        map.insert("continue", TokenKind::Continue);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map.insert("nothing", TokenKind::Nothing);
        map.insert("a", TokenKind::Article);
        map.insert("an", TokenKind::Article);
        map.insert("as", TokenKind::As);
        map.insert("pointer", TokenKind::Pointer);
        map.insert("to", TokenKind::To);
        map.insert("const", TokenKind::Const);
        map.insert("volatile", TokenKind::Volatile);
        // Builtin type keywords
        map.insert("void", TokenKind::Void);
        map.insert("bool", TokenKind::Bool);
        map.insert("char", TokenKind::Char);
        map.insert("string", TokenKind::String);
        map.insert("int8", TokenKind::Int8);
        map.insert("int16", TokenKind::Int16);
        map.insert("int32", TokenKind::Int32);
        map.insert("int64", TokenKind::Int64);
        map.insert("uint8", TokenKind::UInt8);
        map.insert("uint16", TokenKind::UInt16);
        map.insert("uint32", TokenKind::UInt32);
        map.insert("uint64", TokenKind::UInt64);
        map.insert("float", TokenKind::Float);
        map.insert("double", TokenKind::Double);
        // Width-name spellings for the common integer types
        map.insert("int", TokenKind::Int32);
        map.insert("uint", TokenKind::UInt32);
        map.insert("long", TokenKind::Int64);
        map.insert("ulong", TokenKind::UInt64);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Identifier,

    // Literals
    IntLit,
    UIntLit,
    LongLit,
    ULongLit,
    FloatLit,
    DoubleLit,
    CharLit,
    StringLit,

    // Punctuation
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Comma,
    Semicolon,
    Colon,
    ColonColon,
    Dot,

    // Operators
    Plus,
    Dash,
    Star,
    Slash,
    Percent,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    Equals,    // ==
    NotEquals, // !=
    ShiftLeft,
    ShiftRight,
    Amp,
    Pipe,
    AndAnd,
    OrOr,
    Not, // !
    Tilde,
    Assign,    // =
    ArrowLeft, // <- (assignment synonym)
    PlusAssign,
    DashAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,

    // Reserved words
    Namespace,
    Function,
    Returning,
    Nostalgic,
    Class,
    Protocol,
    Alias,
    Let,
    Be,
    If,
    Then,
    Else,
    Switch,
    Case,
    Default,
    While,
    Until,
    Do,
    For,
    Return,
    Break,
    Continue,
    True,
    False,
    Nothing,
    Article, // `a` / `an`
    As,
    Pointer,
    To,
    Const,
    Volatile,

    // Builtin type keywords
    Void,
    Bool,
    Char,
    String,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
}

impl TokenKind {
    /// True for the keywords that can begin a type reference.
    pub fn starts_type(&self) -> bool {
        matches!(
            self,
            TokenKind::Const
                | TokenKind::Volatile
                | TokenKind::Pointer
                | TokenKind::Void
                | TokenKind::Bool
                | TokenKind::Char
                | TokenKind::String
                | TokenKind::Int8
                | TokenKind::Int16
                | TokenKind::Int32
                | TokenKind::Int64
                | TokenKind::UInt8
                | TokenKind::UInt16
                | TokenKind::UInt32
                | TokenKind::UInt64
                | TokenKind::Float
                | TokenKind::Double
        )
    }

}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The parsed value carried by literal tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenPayload {
    None,
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    Char(char),
    Str(String),
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub payload: TokenPayload,
    pub loc: SrcLoc,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Identifier
            | TokenKind::IntLit
            | TokenKind::UIntLit
            | TokenKind::LongLit
            | TokenKind::ULongLit
            | TokenKind::FloatLit
            | TokenKind::DoubleLit
            | TokenKind::CharLit
            | TokenKind::StringLit => write!(f, "{} ({})", self.kind, self.text),
            _ => write!(f, "{}", self.kind),
        }
    }
}
