//! A tree-walking interpreter for Lox: source text is scanned into tokens,
//! parsed into statements and evaluated directly.

pub mod ast_display;
pub mod environment;
pub mod error;
pub mod expr;
pub mod interpreter;
pub mod parser;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod token_type;
pub mod utils;
pub mod value;

use std::io::Write;

use log::debug;

pub use error::{RuntimeError, SyntaxError};
pub use interpreter::Interpreter;
pub use parser::parse;
pub use scanner::Scanner;

/// What went wrong during one call to [`run`]. Nothing here is global: a REPL
/// simply drops the status of each line.
#[derive(Debug, Default)]
pub struct RunStatus {
    pub syntax_errors: Vec<SyntaxError>,
    pub runtime_errors: Vec<RuntimeError>,
}

impl RunStatus {
    pub fn had_error(&self) -> bool {
        !self.syntax_errors.is_empty()
    }

    pub fn had_runtime_error(&self) -> bool {
        !self.runtime_errors.is_empty()
    }
}

/// Scans, parses and, if both succeeded, interprets `source`. A program with
/// any syntax error is not executed at all.
pub fn run<W: Write>(source: &str, interpreter: &mut Interpreter<W>) -> RunStatus {
    let (tokens, mut syntax_errors) = Scanner::new(source).scan_tokens();
    debug!("scanned {} tokens", tokens.len());

    let statements = match parse(&tokens) {
        Ok(statements) => statements,
        Err(errors) => {
            syntax_errors.extend(errors);
            Vec::new()
        }
    };

    if !syntax_errors.is_empty() {
        return RunStatus {
            syntax_errors,
            ..Default::default()
        };
    }

    RunStatus {
        syntax_errors,
        runtime_errors: interpreter.interpret(&statements).err().unwrap_or_default(),
    }
}
