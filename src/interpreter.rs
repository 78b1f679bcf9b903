use std::io::{self, Write};

use log::{debug, warn};

use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::expr::Expr;
use crate::stmt::Stmt;
use crate::token::Token;
use crate::token_type::TokenType;
use crate::value::Value::{self, *};

type RuntimeResult<T> = Result<T, RuntimeError>;

/// Walks the tree directly. Globals live as long as the interpreter, so a
/// REPL can feed it one line at a time.
pub struct Interpreter<W: Write> {
    environment: Environment,
    out: W,
}

impl Interpreter<io::Stdout> {
    pub fn stdout() -> Self {
        Interpreter::new(io::stdout())
    }
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        Interpreter {
            environment: Environment::new(),
            out,
        }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs each top-level statement in order. A runtime error abandons the
    /// statement it occurred in; later statements still run. All errors are
    /// returned in the order they happened.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), Vec<RuntimeError>> {
        let mut errors = Vec::new();

        for statement in statements {
            if let Err(error) = self.execute(statement) {
                debug!("runtime error on line {}", error.token.line);
                errors.push(error);
            }
        }

        if let Err(error) = self.out.flush() {
            warn!("failed to flush output: {error}");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn execute(&mut self, stmt: &Stmt) -> RuntimeResult<()> {
        match stmt {
            Stmt::Block { statements } => self.execute_block(statements),
            Stmt::Expression { expression } => {
                self.evaluate(expression)?;
                Ok(())
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::Print { expression } => {
                let value = self.evaluate(expression)?;
                if let Err(error) = writeln!(self.out, "{value}") {
                    warn!("failed to write output: {error}");
                }
                Ok(())
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Nil,
                };
                self.environment.define(&name.lexeme, value);
                Ok(())
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
                Ok(())
            }
        }
    }

    // The child frame is popped whether or not a statement failed, then the
    // failure is passed up to the enclosing statement.
    fn execute_block(&mut self, statements: &[Stmt]) -> RuntimeResult<()> {
        self.environment.push_scope();
        let result = statements
            .iter()
            .try_for_each(|statement| self.execute(statement));
        self.environment.pop_scope();
        result
    }

    fn evaluate(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        match expr {
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.assign(name, value)
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                // right operand first
                let right = self.evaluate(right)?;
                let left = self.evaluate(left)?;
                binary(operator, left, right)
            }
            Expr::Grouping { expression } => self.evaluate(expression),
            Expr::Literal { value } => Ok(value.clone()),
            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let short_circuits = match operator.typ {
                    TokenType::Or => left.is_truthy(),
                    _ => !left.is_truthy(),
                };

                if short_circuits {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }
            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                match operator.typ {
                    TokenType::Bang => Ok(Bool(!right.is_truthy())),
                    TokenType::Minus => match right {
                        Number(value) => Ok(Number(-value)),
                        _ => Err(RuntimeError::new(operator, "Operand must be a number.")),
                    },
                    _ => Err(RuntimeError::new(operator, "Expected a unary operator.")),
                }
            }
            Expr::Variable { name } => self.environment.get(name),
        }
    }
}

fn binary(operator: &Token, left: Value, right: Value) -> RuntimeResult<Value> {
    match operator.typ {
        TokenType::Plus => match (left, right) {
            (Number(left), Number(right)) => Ok(Number(left + right)),
            (left @ (Number(_) | Str(_)), right @ (Number(_) | Str(_))) => {
                Ok(Str(format!("{left}{right}")))
            }
            _ => Err(RuntimeError::new(
                operator,
                "Operands must be two numbers or two strings.",
            )),
        },
        TokenType::Minus => {
            let (left, right) = get_numeric_operands(operator, left, right)?;
            Ok(Number(left - right))
        }
        TokenType::Slash => {
            let (left, right) = get_numeric_operands(operator, left, right)?;
            Ok(Number(left / right))
        }
        TokenType::Star => {
            let (left, right) = get_numeric_operands(operator, left, right)?;
            Ok(Number(left * right))
        }
        TokenType::Greater => {
            let (left, right) = get_numeric_operands(operator, left, right)?;
            Ok(Bool(left > right))
        }
        TokenType::GreaterEqual => {
            let (left, right) = get_numeric_operands(operator, left, right)?;
            Ok(Bool(left >= right))
        }
        TokenType::Less => {
            let (left, right) = get_numeric_operands(operator, left, right)?;
            Ok(Bool(left < right))
        }
        TokenType::LessEqual => {
            let (left, right) = get_numeric_operands(operator, left, right)?;
            Ok(Bool(left <= right))
        }
        TokenType::BangEqual => Ok(Bool(left != right)),
        TokenType::EqualEqual => Ok(Bool(left == right)),
        _ => Err(RuntimeError::new(operator, "Expected a binary operator.")),
    }
}

fn get_numeric_operands(
    operator: &Token,
    left: Value,
    right: Value,
) -> RuntimeResult<(f64, f64)> {
    match (left, right) {
        (Number(left), Number(right)) => Ok((left, right)),
        _ => Err(RuntimeError::new(operator, "Operands must be numbers.")),
    }
}
