use std::borrow::Cow;
use std::fmt::{self, Display};

use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct Position {
    pub byte: usize,
    pub line: usize,
    pub col: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            byte: 0,
            line: 1,
            col: 1,
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A span between two positions, inclusive on the both ends.
#[derive(Serialize, Debug, Clone, Hash, Eq, PartialEq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

pub trait HasSpan {
    fn span(&self) -> Cow<'_, Span>;
}
