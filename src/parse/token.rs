use itertools::Itertools;
use once_cell::sync::OnceCell;
use phf::{phf_map, phf_set};
use serde::Serialize;

use crate::position::Span;

/// The reserved module-level assignment naming the public definitions.
pub const EXPORT_LIST_MARKER: &str = "__all__";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Token<'buf> {
    pub value: TokenValue<'buf>,

    /// The raw source text of the token; empty for structural tokens.
    pub lexeme: &'buf str,

    pub span: Span,
}

impl<'buf> Token<'buf> {
    pub fn is_op(&self, op: &str) -> bool {
        matches!(self.value, TokenValue::Op(o) if o == op)
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenValue<'buf> {
    Name(&'buf str),

    /// A string literal. The quote style is stripped: `content` is the text
    /// between the quotes, with the style retained only as the `triple` flag.
    Str { content: &'buf str, triple: bool },

    Op(&'buf str),
    Num(&'buf str),

    /// The indentation level increased at the start of a logical line.
    Indent,

    /// The indentation level decreased at the start of a logical line.
    Dedent,

    Eof,
}

macro_rules! keywords {
    ($( $lit:literal => $variant:ident ),+ $(,)?) => {
        /// The closed set of definition keywords the structural scan
        /// dispatches on.
        #[derive(Serialize, Debug, Clone, Copy, Hash, Eq, PartialEq)]
        pub enum Keyword {
            $( $variant ),+
        }

        impl Keyword {
            const KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
                $( $lit => Self::$variant ),+
            };

            pub fn parse(name: &str) -> Option<Keyword> {
                Self::KEYWORDS.get(name).copied()
            }
        }
    };
}

keywords! {
    "class" => Class,
    "def" => Def,
}

static MULTI_OPS: phf::Set<&'static str> = phf_set! {
    "**", "//", "<<", ">>", "->", ":=", "...",
    "==", "!=", "<=", ">=",
    "+=", "-=", "*=", "/=", "%=", "@=", "&=", "|=", "^=",
    "**=", "//=", "<<=", ">>=",
};

fn multi_op_lengths() -> &'static [usize] {
    static PREFIX_LENGTHS: OnceCell<Vec<usize>> = OnceCell::new();

    PREFIX_LENGTHS.get_or_init(|| {
        let mut lengths = MULTI_OPS.iter().map(|op| op.len()).collect::<Vec<_>>();
        lengths.sort_unstable();
        lengths.into_iter().rev().dedup().collect()
    })
}

/// Matches the longest multi-character operator at the start of `input`.
pub fn scan_multi_op(input: &str) -> Option<&'static str> {
    multi_op_lengths()
        .iter()
        .filter_map(|&len| input.get(0..len))
        .find_map(|prefix| MULTI_OPS.get_key(prefix))
        .copied()
}
