use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumDiscriminants};

/// What a single statement is, as far as the diagram is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    SchemaDefinition,
    RelationshipQuery,
    Unrecognized,
}

/// A column declaration exactly as written, e.g. `name VARCHAR(50) NOT NULL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub raw_declaration: String,
}

impl ColumnSpec {
    pub fn new(raw_declaration: &str) -> Self {
        Self {
            raw_declaration: raw_declaration.to_owned(),
        }
    }
}

/// Table name and its columns in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableFact {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
}

/// Table names referenced by a query, in textual order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JoinFact {
    pub tables: Vec<String>,
}

impl JoinFact {
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Consecutive table pairs, each one a `joins` edge.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tables
            .windows(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }
}

#[derive(PartialEq, Clone, Debug, EnumDiscriminants, Serialize, Deserialize)]
#[strum_discriminants(name(TokenTypeVariant))]
pub enum TokenType {
    LeftParen,
    RightParen,
    LeftSquare,
    RightSquare,
    Comma,
    Dot,
    Minus,
    Plus,
    Colon,
    Semicolon,
    Slash,
    Star,
    Percent,
    ConcatOperator,
    BitwiseOr,
    Bang,
    BangEqual,
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    BitwiseNot,
    BitwiseAnd,
    BitwiseXor,
    /// `?`, `$1`, `@name` or `@@name`.
    Parameter(String),
    /// Any other character, kept so that scanning never fails on it.
    Symbol(String),
    QuotedIdentifier(String),
    Identifier(String),
    String(String),
    Number(String),
    Eof,

    // Keywords
    Distinct,
    Except,
    From,
    Group,
    Having,
    Intersect,
    Join,
    Limit,
    Order,
    Select,
    Union,
    Where,
    With,
}

impl TokenTypeVariant {
    pub(crate) fn variant_str(&self) -> &str {
        match self {
            TokenTypeVariant::LeftParen => "(",
            TokenTypeVariant::RightParen => ")",
            TokenTypeVariant::LeftSquare => "[",
            TokenTypeVariant::RightSquare => "]",
            TokenTypeVariant::Comma => ",",
            TokenTypeVariant::Dot => ".",
            TokenTypeVariant::Minus => "-",
            TokenTypeVariant::Plus => "+",
            TokenTypeVariant::Colon => ":",
            TokenTypeVariant::Semicolon => ";",
            TokenTypeVariant::Slash => "/",
            TokenTypeVariant::Star => "*",
            TokenTypeVariant::Percent => "%",
            TokenTypeVariant::ConcatOperator => "||",
            TokenTypeVariant::BitwiseOr => "|",
            TokenTypeVariant::Bang => "!",
            TokenTypeVariant::BangEqual => "!=",
            TokenTypeVariant::Equal => "=",
            TokenTypeVariant::NotEqual => "<>",
            TokenTypeVariant::Greater => ">",
            TokenTypeVariant::GreaterEqual => ">=",
            TokenTypeVariant::Less => "<",
            TokenTypeVariant::LessEqual => "<=",
            TokenTypeVariant::BitwiseNot => "~",
            TokenTypeVariant::BitwiseAnd => "&",
            TokenTypeVariant::BitwiseXor => "^",
            TokenTypeVariant::Parameter => "Parameter",
            TokenTypeVariant::Symbol => "Symbol",
            TokenTypeVariant::QuotedIdentifier => "QuotedIdentifier",
            TokenTypeVariant::Identifier => "Identifier",
            TokenTypeVariant::String => "String",
            TokenTypeVariant::Number => "Number",
            TokenTypeVariant::Eof => "EOF",
            TokenTypeVariant::Distinct => "DISTINCT",
            TokenTypeVariant::Except => "EXCEPT",
            TokenTypeVariant::From => "FROM",
            TokenTypeVariant::Group => "GROUP",
            TokenTypeVariant::Having => "HAVING",
            TokenTypeVariant::Intersect => "INTERSECT",
            TokenTypeVariant::Join => "JOIN",
            TokenTypeVariant::Limit => "LIMIT",
            TokenTypeVariant::Order => "ORDER",
            TokenTypeVariant::Select => "SELECT",
            TokenTypeVariant::Union => "UNION",
            TokenTypeVariant::Where => "WHERE",
            TokenTypeVariant::With => "WITH",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenType,
    pub lexeme: String,
    pub line: u32,
    pub col: u32,
    /// Char index of the first character of the token in the scanned source.
    pub offset: usize,
}

impl Token {
    /// Identifier text for plain and quoted identifiers.
    pub fn identifier(&self) -> Option<&str> {
        match &self.kind {
            TokenType::Identifier(ident) | TokenType::QuotedIdentifier(ident) => Some(ident),
            _ => None,
        }
    }
}
