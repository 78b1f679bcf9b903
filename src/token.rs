use crate::token_type::TokenType;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub typ: TokenType,
    pub lexeme: String,
    pub literal: Option<Value>,
    pub line: usize,
}

impl Token {
    pub fn new(typ: TokenType, lexeme: &str, literal: Option<Value>, line: usize) -> Self {
        Token {
            typ,
            lexeme: lexeme.to_owned(),
            literal,
            line,
        }
    }

    pub fn eof(line: usize) -> Self {
        Token::new(TokenType::Eof, "", None, line)
    }
}
