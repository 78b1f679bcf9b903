use log::{debug, trace};

use crate::error::SyntaxError;
use crate::expr::Expr;
use crate::stmt::Stmt;
use crate::token::Token;
use crate::token_type::TokenType::{self, *};
use crate::value::Value;

type ParseResult<T> = Result<T, SyntaxError>;

// Bounds the recursion of both the parser and the tree walk over its output.
const MAX_NESTING: usize = 128;

// parameters: token cursor, and a series of TokenType variants separated by |
// return option of the consumed token
macro_rules! match_types {
    ($tokens:ident, $( $variant:pat_param )|* ) => {
        match $tokens.peek().typ {
            $(
                $variant
            )|* => Some($tokens.advance()),
            _ => None,
        }
    };
}

/// One token of lookahead over a stream that always ends in `Eof`. The `Eof`
/// token is never consumed, so `peek` always has something to return.
struct Tokens<'a> {
    tokens: &'a [Token],
    current: usize,
    depth: usize,
}

impl<'a> Tokens<'a> {
    fn peek(&self) -> &'a Token {
        let tokens: &'a [Token] = self.tokens;
        &tokens[self.current.min(tokens.len() - 1)]
    }

    fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if token.typ != Eof {
            self.current += 1;
        }
        token
    }

    fn check(&self, typ: TokenType) -> bool {
        self.peek().typ == typ
    }

    fn at_end(&self) -> bool {
        self.check(Eof)
    }
}

/// Parses a whole program. Every malformed declaration contributes one
/// diagnostic and parsing resumes at the next statement boundary, so all
/// errors in the file are returned together.
pub fn parse(tokens: &[Token]) -> Result<Vec<Stmt>, Vec<SyntaxError>> {
    let terminated;
    let tokens = match tokens.last() {
        Some(token) if token.typ == Eof => tokens,
        last => {
            let line = last.map_or(1, |token| token.line);
            terminated = tokens
                .iter()
                .cloned()
                .chain(std::iter::once(Token::eof(line)))
                .collect::<Vec<_>>();
            &terminated[..]
        }
    };

    let tokens = &mut Tokens {
        tokens,
        current: 0,
        depth: 0,
    };
    let mut statements = Vec::new();
    let mut errors = Vec::new();

    while !tokens.at_end() {
        match declaration(tokens, &mut errors) {
            Ok(stmt) => statements.push(stmt),
            Err(error) => {
                debug!("parse error on line {}, synchronizing", error.line);
                errors.push(error);
                synchronize(tokens);
            }
        };
    }

    debug!(
        "parsed {} statements, {} errors",
        statements.len(),
        errors.len()
    );
    if errors.is_empty() {
        Ok(statements)
    } else {
        Err(errors)
    }
}

fn declaration(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Stmt> {
    if match_types!(tokens, Var).is_some() {
        var_declaration(tokens, errors)
    } else {
        statement(tokens, errors)
    }
}

fn var_declaration(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Stmt> {
    let name = consume(tokens, Identifier, "Expect variable name.")?.to_owned();

    let initializer = match match_types!(tokens, Equal) {
        Some(_) => Some(Box::new(expression(tokens, errors)?)),
        None => None,
    };

    consume(tokens, Semicolon, "Expect ';' after variable declaration.")?;
    Ok(Stmt::Var { name, initializer })
}

fn statement(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Stmt> {
    nested(tokens, errors, statement_kind)
}

fn statement_kind(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Stmt> {
    match tokens.peek().typ {
        For => for_statement(tokens, errors),
        If => if_statement(tokens, errors),
        While => while_statement(tokens, errors),
        Print => print_statement(tokens, errors),
        LeftBrace => Ok(Stmt::Block {
            statements: block(tokens, errors)?,
        }),
        _ => expression_statement(tokens, errors),
    }
}

// `for (init; cond; incr) body` becomes `{ init; while (cond) { body; incr; } }`
fn for_statement(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Stmt> {
    tokens.advance();
    consume(tokens, LeftParen, "Expect '(' after 'for'.")?;

    let initializer = match tokens.peek().typ {
        Semicolon => {
            tokens.advance();
            None
        }
        Var => {
            tokens.advance();
            Some(var_declaration(tokens, errors)?)
        }
        _ => Some(expression_statement(tokens, errors)?),
    };

    let condition = if tokens.check(Semicolon) {
        None
    } else {
        Some(expression(tokens, errors)?)
    };
    consume(tokens, Semicolon, "Expect ';' after loop condition.")?;

    let increment = if tokens.check(RightParen) {
        None
    } else {
        Some(expression(tokens, errors)?)
    };
    consume(tokens, RightParen, "Expect ')' after for clauses.")?;

    let mut body = statement(tokens, errors)?;

    if let Some(increment) = increment {
        body = Stmt::Block {
            statements: vec![
                body,
                Stmt::Expression {
                    expression: Box::new(increment),
                },
            ],
        };
    }

    let condition = condition.unwrap_or(Expr::Literal {
        value: Value::Bool(true),
    });
    body = Stmt::While {
        condition: Box::new(condition),
        body: Box::new(body),
    };

    if let Some(initializer) = initializer {
        body = Stmt::Block {
            statements: vec![initializer, body],
        };
    }

    Ok(body)
}

fn if_statement(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Stmt> {
    tokens.advance();
    consume(tokens, LeftParen, "Expect '(' after 'if'.")?;
    let condition = expression(tokens, errors)?;
    consume(tokens, RightParen, "Expect ')' after if condition.")?;

    let then_branch = statement(tokens, errors)?;
    let else_branch = match match_types!(tokens, Else) {
        Some(_) => Some(Box::new(statement(tokens, errors)?)),
        None => None,
    };

    Ok(Stmt::If {
        condition: Box::new(condition),
        then_branch: Box::new(then_branch),
        else_branch,
    })
}

fn while_statement(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Stmt> {
    tokens.advance();
    consume(tokens, LeftParen, "Expect '(' after 'while'.")?;
    let condition = expression(tokens, errors)?;
    consume(tokens, RightParen, "Expect ')' after while condition.")?;
    let body = statement(tokens, errors)?;

    Ok(Stmt::While {
        condition: Box::new(condition),
        body: Box::new(body),
    })
}

fn block(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Vec<Stmt>> {
    tokens.advance();
    let mut statements = Vec::new();

    while !tokens.check(RightBrace) && !tokens.at_end() {
        statements.push(declaration(tokens, errors)?);
    }

    consume(tokens, RightBrace, "Expect '}' after block.")?;
    Ok(statements)
}

fn print_statement(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Stmt> {
    tokens.advance();
    let value = expression(tokens, errors)?;
    consume(tokens, Semicolon, "Expect ';' after value.")?;

    Ok(Stmt::Print {
        expression: Box::new(value),
    })
}

fn expression_statement(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Stmt> {
    let expression = expression(tokens, errors)?;
    consume(tokens, Semicolon, "Expect ';' after expression.")?;

    Ok(Stmt::Expression {
        expression: Box::new(expression),
    })
}

fn expression(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Expr> {
    assignment(tokens, errors)
}

fn assignment(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Expr> {
    let expr = or(tokens, errors)?;

    if let Some(equals) = match_types!(tokens, Equal) {
        let value = nested(tokens, errors, assignment)?;

        return match expr {
            Expr::Variable { name } => Ok(Expr::Assign {
                name,
                value: Box::new(value),
            }),
            _ => {
                // reported, but the parser is not confused so it keeps going
                errors.push(SyntaxError::at(equals, "Invalid assignment target."));
                Ok(expr)
            }
        };
    }

    Ok(expr)
}

fn or(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Expr> {
    let mut expr = and(tokens, errors)?;

    while let Some(operator) = match_types!(tokens, Or) {
        let right = and(tokens, errors)?;
        expr = Expr::Logical {
            left: Box::new(expr),
            operator: operator.to_owned(),
            right: Box::new(right),
        };
    }

    Ok(expr)
}

fn and(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Expr> {
    let mut expr = equality(tokens, errors)?;

    while let Some(operator) = match_types!(tokens, And) {
        let right = equality(tokens, errors)?;
        expr = Expr::Logical {
            left: Box::new(expr),
            operator: operator.to_owned(),
            right: Box::new(right),
        };
    }

    Ok(expr)
}

fn equality(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Expr> {
    let mut expr = comparison(tokens, errors)?;

    while let Some(operator) = match_types!(tokens, BangEqual | EqualEqual) {
        let right = comparison(tokens, errors)?;
        expr = binary(expr, operator, right);
    }

    Ok(expr)
}

fn comparison(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Expr> {
    let mut expr = term(tokens, errors)?;

    while let Some(operator) = match_types!(tokens, Greater | GreaterEqual | Less | LessEqual) {
        let right = term(tokens, errors)?;
        expr = binary(expr, operator, right);
    }

    Ok(expr)
}

fn term(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Expr> {
    let mut expr = factor(tokens, errors)?;

    while let Some(operator) = match_types!(tokens, Minus | Plus) {
        let right = factor(tokens, errors)?;
        expr = binary(expr, operator, right);
    }

    Ok(expr)
}

fn factor(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Expr> {
    let mut expr = unary(tokens, errors)?;

    while let Some(operator) = match_types!(tokens, Slash | Star) {
        let right = unary(tokens, errors)?;
        expr = binary(expr, operator, right);
    }

    Ok(expr)
}

fn unary(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Expr> {
    if let Some(operator) = match_types!(tokens, Bang | Minus) {
        let right = nested(tokens, errors, unary)?;
        Ok(Expr::Unary {
            operator: operator.to_owned(),
            right: Box::new(right),
        })
    } else {
        primary(tokens, errors)
    }
}

fn primary(tokens: &mut Tokens, errors: &mut Vec<SyntaxError>) -> ParseResult<Expr> {
    let token = tokens.peek();
    let expr = match token.typ {
        False => Expr::Literal {
            value: Value::Bool(false),
        },
        True => Expr::Literal {
            value: Value::Bool(true),
        },
        Nil => Expr::Literal { value: Value::Nil },
        Number | StringToken => Expr::Literal {
            value: token.literal.clone().unwrap_or(Value::Nil),
        },
        Identifier => Expr::Variable {
            name: token.to_owned(),
        },
        LeftParen => {
            tokens.advance();
            let expression = nested(tokens, errors, expression)?;
            consume(tokens, RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping {
                expression: Box::new(expression),
            });
        }
        _ => return Err(SyntaxError::at(token, "Expect expression.")),
    };

    tokens.advance();
    Ok(expr)
}

fn binary(left: Expr, operator: &Token, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        operator: operator.to_owned(),
        right: Box::new(right),
    }
}

fn nested<T>(
    tokens: &mut Tokens,
    errors: &mut Vec<SyntaxError>,
    parse: fn(&mut Tokens<'_>, &mut Vec<SyntaxError>) -> ParseResult<T>,
) -> ParseResult<T> {
    if tokens.depth >= MAX_NESTING {
        return Err(SyntaxError::at(tokens.peek(), "Too much nesting."));
    }

    tokens.depth += 1;
    let result = parse(tokens, errors);
    tokens.depth -= 1;
    result
}

fn consume<'a>(
    tokens: &mut Tokens<'a>,
    typ: TokenType,
    message: &'static str,
) -> ParseResult<&'a Token> {
    if tokens.check(typ) {
        Ok(tokens.advance())
    } else {
        Err(SyntaxError::at(tokens.peek(), message))
    }
}

// Discards tokens until just past a `;` or right before a token that starts a
// statement.
fn synchronize(tokens: &mut Tokens) {
    let mut previous = tokens.advance();

    while !tokens.at_end() {
        if previous.typ == Semicolon {
            return;
        }

        match tokens.peek().typ {
            Class | Fun | Var | For | If | While | Print | Return => return,
            _ => {}
        }

        trace!("skipping '{}' on line {}", tokens.peek(), tokens.peek().line);
        previous = tokens.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Scanner;

    fn parse_source(source: &str) -> Result<Vec<Stmt>, Vec<SyntaxError>> {
        let _ = env_logger::try_init();
        let (tokens, scan_errors) = Scanner::new(source).scan_tokens();
        assert!(scan_errors.is_empty());
        parse(&tokens)
    }

    fn expression_of(source: &str) -> String {
        let statements = parse_source(&format!("{source};")).unwrap();
        match &statements[..] {
            [Stmt::Expression { expression }] => expression.to_string(),
            other => panic!("expected one expression statement, got {other:?}"),
        }
    }

    #[test]
    fn precedence() {
        assert_eq!(expression_of("1 + 2 * 3"), "(+ 1 (* 2 3))");
        assert_eq!(expression_of("(1 + 2) * 3"), "(* (group (+ 1 2)) 3)");
        assert_eq!(expression_of("1 < 2 == 3 >= 4"), "(== (< 1 2) (>= 3 4))");
        assert_eq!(expression_of("a or b and c"), "(or a (and b c))");
        assert_eq!(expression_of("!!x == -y"), "(== (! (! x)) (- y))");
    }

    #[test]
    fn left_and_right_associativity() {
        assert_eq!(expression_of("1 - 2 - 3"), "(- (- 1 2) 3)");
        assert_eq!(expression_of("8 / 4 / 2"), "(/ (/ 8 4) 2)");
        assert_eq!(expression_of("a = b = 1"), "(= a (= b 1))");
    }

    #[test]
    fn statements() {
        let statements = parse_source("var a; var b = 2; print a; { a = b; } if (a) print 1; else print 2; while (false) a;").unwrap();
        assert_eq!(statements.len(), 6);
        assert!(matches!(&statements[0], Stmt::Var { initializer: None, .. }));
        assert!(matches!(&statements[1], Stmt::Var { initializer: Some(_), .. }));
        assert!(matches!(&statements[3], Stmt::Block { statements } if statements.len() == 1));
        assert!(matches!(&statements[4], Stmt::If { else_branch: Some(_), .. }));
        assert!(matches!(&statements[5], Stmt::While { .. }));
    }

    #[test]
    fn for_desugars_into_while() {
        let statements = parse_source("for (var i = 0; i < 3; i = i + 1) print i;").unwrap();
        let [Stmt::Block { statements }] = &statements[..] else {
            panic!("expected a block, got {statements:?}");
        };
        assert!(matches!(&statements[0], Stmt::Var { .. }));
        let Stmt::While { condition, body } = &statements[1] else {
            panic!("expected a while loop");
        };
        assert_eq!(condition.to_string(), "(< i 3)");
        let Stmt::Block { statements: body } = body.as_ref() else {
            panic!("expected the body to be wrapped with the increment");
        };
        assert!(matches!(&body[0], Stmt::Print { .. }));
        assert!(matches!(&body[1], Stmt::Expression { expression } if expression.to_string() == "(= i (+ i 1))"));
    }

    #[test]
    fn empty_for_clauses_loop_forever() {
        let statements = parse_source("for (;;) print 1;").unwrap();
        let [Stmt::While { condition, body }] = &statements[..] else {
            panic!("expected a bare while loop, got {statements:?}");
        };
        assert_eq!(condition.to_string(), "true");
        assert!(matches!(body.as_ref(), Stmt::Print { .. }));
    }

    #[test]
    fn invalid_assignment_target() {
        let errors = parse_source("a + b = 1;").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "[line 1] Error at '=': Invalid assignment target."
        );
    }

    #[test]
    fn recovers_after_a_bad_statement() {
        let errors = parse_source("print ;\nvar = 1;\nprint 1 + 2;\nprint (1;").unwrap_err();
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec![
                "[line 1] Error at ';': Expect expression.",
                "[line 2] Error at '=': Expect variable name.",
                "[line 4] Error at ';': Expect ')' after expression.",
            ]
        );
    }

    #[test]
    fn reports_at_the_end() {
        let errors = parse_source("print 1").unwrap_err();
        assert_eq!(
            errors[0].to_string(),
            "[line 1] Error at the end: Expect ';' after value."
        );

        let errors = parse_source("{ print 1;").unwrap_err();
        assert_eq!(
            errors[0].to_string(),
            "[line 1] Error at the end: Expect '}' after block."
        );
    }

    #[test]
    fn deep_nesting_is_reported() {
        let grouping = format!("print {}1{};", "(".repeat(1000), ")".repeat(1000));
        let errors = parse_source(&grouping).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "[line 1] Error at '(': Too much nesting."
        );

        let blocks = format!("{}print 1;{}", "{".repeat(3000), "}".repeat(3000));
        let errors = parse_source(&blocks).unwrap_err();
        assert_eq!(errors[0].to_string(), "[line 1] Error at '{': Too much nesting.");

        let negations = format!("print {}1;", "-".repeat(1000));
        let errors = parse_source(&negations).unwrap_err();
        assert_eq!(errors[0].message.as_str(), "Too much nesting.");

        let assignments = format!("{}1;", "a = ".repeat(1000));
        let errors = parse_source(&assignments).unwrap_err();
        assert_eq!(errors[0].message.as_str(), "Too much nesting.");
    }

    #[test]
    fn moderate_nesting_still_parses() {
        let grouping = format!("print {}1{};", "(".repeat(60), ")".repeat(60));
        assert!(parse_source(&grouping).is_ok());

        let blocks = format!("{}print 1;{}", "{".repeat(60), "}".repeat(60));
        assert!(parse_source(&blocks).is_ok());
    }

    #[test]
    fn stream_without_end_marker() {
        let tokens = vec![
            Token::new(Print, "print", None, 1),
            Token::new(Nil, "nil", None, 1),
            Token::new(Semicolon, ";", None, 1),
        ];
        assert_eq!(parse(&tokens).unwrap().len(), 1);
        assert_eq!(parse(&[]).unwrap().len(), 0);
    }
}
