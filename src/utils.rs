use std::fmt;

/// Represents either a static or owned string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Soo {
    Static(&'static str),
    Owned(String),
}

impl Soo {
    pub fn as_str(&self) -> &str {
        match self {
            Soo::Static(s) => s,
            Soo::Owned(s) => s,
        }
    }
}

impl fmt::Display for Soo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::convert::From<&'static str> for Soo {
    fn from(item: &'static str) -> Self {
        Soo::Static(item)
    }
}

impl std::convert::From<String> for Soo {
    fn from(item: String) -> Self {
        Soo::Owned(item)
    }
}
