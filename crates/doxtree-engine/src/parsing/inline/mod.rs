//! # Inline parsing
//!
//! Recursive descent over the `logos` token stream of one block of text.
//! Each nesting level (an HTML tag, a markdown delimiter) parses until its
//! closer; a construct is only opened when its closer exists further on, so
//! unbalanced markup falls back to literal text.

pub mod kinds;
pub mod parser;

pub use parser::parse_inline;
