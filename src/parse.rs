mod cursor;
mod lexer;
mod parser;
mod scan;
pub mod token;

pub use cursor::{Exhausted, TokenCursor};
pub use lexer::{Lexer, LexerError, LexerErrorKind};
pub use parser::{ExportList, ModuleOutcome, ModuleParser};
pub use scan::Scanner;

/// Configuration consumed by the structural parser.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Keep definitions and modules that have no docstring.
    pub include_undocumented: bool,

    /// The one private-marker name exempt from the visibility rule.
    pub constructor_name: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            include_undocumented: false,
            constructor_name: "__init__".to_owned(),
        }
    }
}
