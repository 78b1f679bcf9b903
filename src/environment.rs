use std::collections::HashMap;

use log::trace;

use crate::{error::RuntimeError, token::Token, value::Value};

/// A chain of scope frames kept as a stack. The enclosing frame of
/// `frames[i]` is `frames[i - 1]`; `frames[0]` is the global frame and is
/// never popped. Lookup walks from the innermost frame outward.
#[derive(Debug)]
pub struct Environment {
    frames: Vec<HashMap<String, Value>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            frames: vec![HashMap::new()],
        }
    }

    /// Number of frames, counting the global one.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push_scope(&mut self) {
        self.frames.push(HashMap::new());
        trace!("entered scope, depth {}", self.depth());
    }

    pub fn pop_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
        trace!("left scope, depth {}", self.depth());
    }

    /// Binds `name` in the innermost frame, shadowing outer bindings and
    /// overwriting any earlier binding in the same frame.
    pub fn define(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), value);
        }
    }

    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        self.frames
            .iter()
            .rev()
            .find_map(|values| values.get(&name.lexeme))
            .cloned()
            .ok_or_else(|| undefined(name))
    }

    /// Overwrites the nearest existing binding. Never creates one.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<Value, RuntimeError> {
        for values in self.frames.iter_mut().rev() {
            if let Some(slot) = values.get_mut(&name.lexeme) {
                *slot = value.clone();
                return Ok(value);
            }
        }

        Err(undefined(name))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn undefined(name: &Token) -> RuntimeError {
    RuntimeError::new(name, format!("Undefined variable '{}'.", name.lexeme))
}
