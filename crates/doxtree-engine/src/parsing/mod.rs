//! # Markup parsing
//!
//! One documentation comment at a time, with no knowledge of other files.
//!
//! ```text
//! NormalizedComment → Tokenizer → DocParser (sections) → BlockBuilder → parse_inline
//! ```
//!
//! - **`sections`**: routes block content to brief, detail, parameters,
//!   return values and admonitions; collects grouping directives
//! - **`blocks`**: paragraphs, lists, tables, fences, quotes, definition lists
//! - **`inline`**: formatting spans, links, references

pub mod blocks;
pub mod inline;
pub mod sections;

pub use blocks::parse_blocks;
pub use inline::parse_inline;
pub use sections::{Directive, ParsedComment, parse_comment};
