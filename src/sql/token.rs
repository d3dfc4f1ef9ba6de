//! SQL Tokens - the atomic units of SQL output.

use super::dialect;

/// SQL Token - every element the compiler emits.
///
/// Adding a new variant here will cause compile errors everywhere
/// it needs to be handled (exhaustive matching).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    From,
    Where,
    And,
    Not,
    As,
    In,
    GroupBy,
    OrderBy,
    Desc,
    Limit,

    // === Punctuation ===
    Comma,
    LParen,
    RParen,

    // === Operators ===
    Eq,
    Ne,
    Gte,
    Lte,

    // === Whitespace ===
    Space,

    // === Dynamic Content ===
    /// Single identifier (alias)
    Ident(String),
    /// Dotted reference: `table`, `schema.table`, `table.column`
    Reference(String),
    /// Unsigned integer literal
    LitInt(u64),
    /// String literal
    LitString(String),
    /// Positional bind parameter (1-based)
    Param(usize),
    /// Function name, rendered upper-case
    FunctionName(String),

    // === Escape Hatch ===
    /// Raw SQL passed directly to output without escaping.
    ///
    /// # Security Warning
    ///
    /// **Never pass query input to this variant.** It carries registered
    /// measure and dimension expressions, which are trusted dataset
    /// definitions. Query values go through `LitString` or `Param`.
    Raw(String),
}

impl Token {
    /// Serialize this token to a string.
    pub fn serialize(&self) -> String {
        match self {
            // Keywords
            Token::Select => "SELECT".into(),
            Token::From => "FROM".into(),
            Token::Where => "WHERE".into(),
            Token::And => "AND".into(),
            Token::Not => "NOT".into(),
            Token::As => "AS".into(),
            Token::In => "IN".into(),
            Token::GroupBy => "GROUP BY".into(),
            Token::OrderBy => "ORDER BY".into(),
            Token::Desc => "DESC".into(),
            Token::Limit => "LIMIT".into(),

            // Punctuation
            Token::Comma => ",".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),

            // Operators
            Token::Eq => "=".into(),
            Token::Ne => "!=".into(),
            Token::Gte => ">=".into(),
            Token::Lte => "<=".into(),

            Token::Space => " ".into(),

            Token::Ident(name) => dialect::quote_identifier(name),
            Token::Reference(path) => dialect::quote_reference(path),
            Token::LitInt(n) => n.to_string(),
            Token::LitString(s) => dialect::quote_string(s),
            Token::Param(index) => dialect::placeholder(*index),
            Token::FunctionName(name) => name.to_uppercase(),

            Token::Raw(s) => s.clone(),
        }
    }
}

/// A stream of tokens that can be serialized to SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    /// Serialize all tokens to a SQL string.
    pub fn serialize(&self) -> String {
        self.tokens.iter().map(Token::serialize).collect()
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}
