use std::fmt;

use crate::{expr::Expr, token::Token, value::Value};

/// The display form used by `print` and string concatenation.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            // shortest round-trip form, `3` rather than `3.0`
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lexeme)
    }
}

/// Fully parenthesized prefix form, e.g. `(+ 1 (* 2 3))`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Assign { name, value } => {
                write!(f, "(= {name} {value})")
            }
            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => {
                write!(f, "({operator} {left} {right})")
            }
            Expr::Grouping { expression } => {
                write!(f, "(group {expression})")
            }
            Expr::Literal { value } => {
                write!(f, "{value}")
            }
            Expr::Unary { operator, right } => {
                write!(f, "({operator} {right})")
            }
            Expr::Variable { name } => {
                write!(f, "{name}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_type::TokenType;

    fn number(n: f64) -> Box<Expr> {
        Box::new(Expr::Literal {
            value: Value::Number(n),
        })
    }

    #[test]
    fn prints_prefix_form() {
        let expr = Expr::Binary {
            left: Box::new(Expr::Unary {
                operator: Token::new(TokenType::Minus, "-", None, 1),
                right: number(123.0),
            }),
            operator: Token::new(TokenType::Star, "*", None, 1),
            right: Box::new(Expr::Grouping {
                expression: number(45.67),
            }),
        };

        assert_eq!(expr.to_string(), "(* (- 123) (group 45.67))");
    }

    #[test]
    fn number_display_drops_trailing_zero() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(-0.5).to_string(), "-0.5");
        assert_eq!(Value::Number(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::from("hi").to_string(), "hi");
    }
}
