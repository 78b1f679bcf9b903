use std::fmt;

use thiserror::Error;

use crate::token::Token;
use crate::token_type::TokenType;
use crate::utils::Soo;

/// Where in the source a syntax error was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Nowhere,
    AtEnd,
    At(String),
}

impl Location {
    pub fn of(token: &Token) -> Self {
        match token.typ {
            TokenType::Eof => Location::AtEnd,
            _ => Location::At(token.lexeme.to_owned()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Nowhere => Ok(()),
            Location::AtEnd => write!(f, "at the end"),
            Location::At(lexeme) => write!(f, "at '{lexeme}'"),
        }
    }
}

/// Raised by the scanner and parser. A program with any syntax error is never
/// executed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error {location}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub location: Location,
    pub message: Soo,
}

impl SyntaxError {
    pub fn new(line: usize, message: impl Into<Soo>) -> Self {
        SyntaxError {
            line,
            location: Location::Nowhere,
            message: message.into(),
        }
    }

    pub fn at(token: &Token, message: impl Into<Soo>) -> Self {
        SyntaxError {
            line: token.line,
            location: Location::of(token),
            message: message.into(),
        }
    }
}

/// Raised during evaluation. Carries the operator or name token that caused it.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}\n[line {}]", .token.line)]
pub struct RuntimeError {
    pub token: Token,
    pub message: Soo,
}

impl RuntimeError {
    pub fn new(token: &Token, message: impl Into<Soo>) -> Self {
        RuntimeError {
            token: token.clone(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_formats() {
        let token = Token::new(TokenType::Identifier, "foo", None, 3);
        assert_eq!(
            SyntaxError::at(&token, "Expect ';' after value.").to_string(),
            "[line 3] Error at 'foo': Expect ';' after value."
        );
        assert_eq!(
            SyntaxError::at(&Token::eof(7), "Expect expression.").to_string(),
            "[line 7] Error at the end: Expect expression."
        );
        assert_eq!(
            SyntaxError::new(2, "Unexpected character.").to_string(),
            "[line 2] Error : Unexpected character."
        );
    }

    #[test]
    fn runtime_error_formats() {
        let token = Token::new(TokenType::Minus, "-", None, 4);
        let error = RuntimeError::new(&token, "Operand must be a number.");
        assert_eq!(error.to_string(), "Operand must be a number.\n[line 4]");
    }
}
