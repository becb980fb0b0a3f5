pub mod doc;
pub mod errors;
pub mod markup;
pub mod parse;
pub mod position;
pub mod render;
pub mod source;
pub mod tree;
