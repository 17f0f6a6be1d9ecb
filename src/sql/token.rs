//! SQL Tokens - the atomic units of Metrics Insights output.
//!
//! Tokens keep labels and literals unquoted until serialization, where the
//! quoting rules (and template variable lookups they depend on) are applied.

use super::quote::{quote_label, quote_string_single};
use crate::template::TemplateVariables;

/// SQL Token - every element a Metrics Insights query can contain.
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
    Or,
    Not,
    In,
    GroupBy,
    OrderBy,
    Asc,
    Desc,
    Limit,

    // === Punctuation ===
    Comma,
    LParen,
    RParen,

    // === Operators ===
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,

    // === Whitespace ===
    Space,

    // === Dynamic Content ===
    /// Namespace, metric, dimension or schema label; quoted only when needed.
    Label(String),
    /// String literal
    LitString(String),
    /// Integer literal
    LitInt(u64),
    /// Function name, rendered as-is.
    FunctionName(String),

    // === Escape Hatch ===
    /// Trusted fragment passed to output verbatim (e.g. `AWS.AccountId`).
    ///
    /// Never build this from user input; use `Label` or `LitString`.
    Raw(String),
}

impl Token {
    /// Serialize this token, resolving labels against `variables`.
    pub fn serialize(&self, variables: &dyn TemplateVariables) -> String {
        match self {
            Token::Select => "SELECT".into(),
            Token::From => "FROM".into(),
            Token::Where => "WHERE".into(),
            Token::And => "AND".into(),
            Token::Or => "OR".into(),
            Token::Not => "NOT".into(),
            Token::In => "IN".into(),
            Token::GroupBy => "GROUP BY".into(),
            Token::OrderBy => "ORDER BY".into(),
            Token::Asc => "ASC".into(),
            Token::Desc => "DESC".into(),
            Token::Limit => "LIMIT".into(),

            Token::Comma => ",".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),

            Token::Eq => "=".into(),
            Token::Ne => "!=".into(),
            Token::Lt => "<".into(),
            Token::Gt => ">".into(),
            Token::Lte => "<=".into(),
            Token::Gte => ">=".into(),

            Token::Space => " ".into(),

            Token::Label(label) => quote_label(label, variables),
            Token::LitString(s) => quote_string_single(s),
            Token::LitInt(n) => n.to_string(),
            Token::FunctionName(name) => name.clone(),

            Token::Raw(s) => s.clone(),
        }
    }
}

/// A stream of tokens that can be serialized to a query string.
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

    /// Serialize all tokens to a query string.
    pub fn serialize(&self, variables: &dyn TemplateVariables) -> String {
        self.tokens.iter().map(|t| t.serialize(variables)).collect()
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
