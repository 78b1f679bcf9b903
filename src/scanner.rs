use lazy_static::lazy_static;
use std::collections::HashMap;
use std::iter::Peekable;
use std::mem;
use std::str::Chars;

use crate::error::SyntaxError;
use crate::token::Token;
use crate::token_type::TokenType::{self, *};
use crate::value::Value;

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, TokenType> = HashMap::from([
        ("and", And),
        ("class", Class),
        ("else", Else),
        ("false", False),
        ("for", For),
        ("fun", Fun),
        ("if", If),
        ("nil", Nil),
        ("or", Or),
        ("print", Print),
        ("return", Return),
        ("super", Super),
        ("this", This),
        ("true", True),
        ("var", Var),
        ("while", While),
    ]);
}

pub struct Scanner<'a> {
    source: Peekable<Chars<'a>>,
    tokens: Vec<Token>,
    errors: Vec<SyntaxError>,
    text: String,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Scanner {
            source: source.chars().peekable(),
            tokens: Vec::new(),
            errors: Vec::new(),
            text: String::new(),
            line: 1,
        }
    }

    /// Scans the whole source. The token list always ends with `Eof`, even
    /// when errors were reported.
    pub fn scan_tokens(mut self) -> (Vec<Token>, Vec<SyntaxError>) {
        while let Some(c) = self.source.next() {
            self.text.push(c);
            self.scan_token(c);
        }

        self.tokens.push(Token::eof(self.line));
        (self.tokens, self.errors)
    }

    fn scan_token(&mut self, c: char) {
        match c {
            '(' => self.add_token(LeftParen),
            ')' => self.add_token(RightParen),
            '{' => self.add_token(LeftBrace),
            '}' => self.add_token(RightBrace),
            ',' => self.add_token(Comma),
            '.' => self.add_token(Dot),
            '-' => self.add_token(Minus),
            '+' => self.add_token(Plus),
            ';' => self.add_token(Semicolon),
            '*' => self.add_token(Star),
            '!' => {
                let matched = self.match_next('=');
                self.add_token(if matched { BangEqual } else { Bang })
            }
            '=' => {
                let matched = self.match_next('=');
                self.add_token(if matched { EqualEqual } else { Equal })
            }
            '<' => {
                let matched = self.match_next('=');
                self.add_token(if matched { LessEqual } else { Less })
            }
            '>' => {
                let matched = self.match_next('=');
                self.add_token(if matched { GreaterEqual } else { Greater })
            }
            '/' => {
                if self.match_next('/') {
                    while let Some(&c) = self.source.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.source.next();
                    }
                    self.text.clear();
                } else {
                    self.add_token(Slash);
                }
            }
            ' ' | '\r' | '\t' => {
                self.text.pop();
            }
            '\n' => {
                self.line += 1;
                self.text.pop();
            }
            '"' => self.scan_string(),
            _ => {
                if c.is_ascii_digit() {
                    self.scan_number();
                } else if is_alpha(c) {
                    self.scan_identifier();
                } else {
                    self.text.clear();
                    self.errors
                        .push(SyntaxError::new(self.line, "Unexpected character."));
                }
            }
        };
    }

    fn scan_string(&mut self) {
        while let Some(&c) = self.source.peek() {
            if c == '"' {
                break;
            }
            if c == '\n' {
                self.line += 1;
            }
            self.text.push(c);
            self.source.next();
        }

        if self.source.peek().is_none() {
            self.text.clear();
            self.errors
                .push(SyntaxError::new(self.line, "Unterminated string."));
            return;
        }

        // closing "
        self.source.next();
        self.text.push('"');

        let contents = self.text[1..self.text.len() - 1].to_owned();
        self.add_literal(StringToken, Value::Str(contents));
    }

    fn scan_number(&mut self) {
        self.advance_digits();

        // check for a fractional part
        if let Some(&'.') = self.source.peek() {
            // clone the source iterator so that we can peek 2 characters ahead
            let mut cloned = self.source.clone();
            cloned.next();
            if cloned.peek().is_some_and(char::is_ascii_digit) {
                self.text.push('.');
                self.source.next();
                self.advance_digits();
            }
        }

        // digits with an optional `.digits` suffix always parse
        let number = self.text.parse().unwrap_or_default();
        self.add_literal(Number, Value::Number(number));
    }

    fn advance_digits(&mut self) {
        while let Some(&c) = self.source.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            self.text.push(c);
            self.source.next();
        }
    }

    fn scan_identifier(&mut self) {
        while let Some(&c) = self.source.peek() {
            if !is_alpha_num(c) {
                break;
            }
            self.text.push(c);
            self.source.next();
        }

        let typ = *KEYWORDS.get(&self.text as &str).unwrap_or(&Identifier);

        self.add_token(typ);
    }

    fn match_next(&mut self, expected: char) -> bool {
        if self.source.peek() != Some(&expected) {
            return false;
        }

        self.source.next();
        self.text.push(expected);
        true
    }

    fn add_token(&mut self, typ: TokenType) {
        self.push_token(typ, None);
    }

    fn add_literal(&mut self, typ: TokenType, literal: Value) {
        self.push_token(typ, Some(literal));
    }

    fn push_token(&mut self, typ: TokenType, literal: Option<Value>) {
        let mut lexeme = String::new();
        mem::swap(&mut self.text, &mut lexeme);

        self.tokens.push(Token {
            typ,
            lexeme,
            literal,
            line: self.line,
        });
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alpha_num(c: char) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}
