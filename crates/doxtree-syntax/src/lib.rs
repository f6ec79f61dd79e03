//! # doxtree-syntax
//!
//! The text-level half of doxtree: everything that can be decided by looking
//! at a single documentation comment, with no knowledge of symbols, groups
//! or the documentation model.
//!
//! ## Pipeline
//!
//! ```text
//! raw comment → normalize → lines → Tokenizer → line tokens
//!                                    (block commands, fences, lists, tables, quotes)
//! paragraph text → lex → inline tokens (logos)
//! ```
//!
//! ### 1. Comment normalization ([`comment`])
//!
//! Strips comment leaders (`///`, `/** */`, ` * ` decorations) and detects
//! trailing member comments (`///<`), producing dedented lines.
//!
//! ### 2. Line tokenizing ([`tokenizer`])
//!
//! Classifies each normalized line into a [`token::TokenKind`]. Block
//! commands split a line so several can share it:
//!
//! ```
//! use doxtree_syntax::{Tokenizer, TokenKind};
//!
//! let lines = vec!["@defgroup X Title @{ @file".to_string()];
//! let names: Vec<String> = Tokenizer::new(lines)
//!     .unwrap()
//!     .filter_map(|t| match t.kind {
//!         TokenKind::Command { name, .. } => Some(name),
//!         _ => None,
//!     })
//!     .collect();
//! assert_eq!(names, ["defgroup", "{", "file"]);
//! ```
//!
//! Fence bodies (`@code`, `@dot`, `@htmlonly`, ...) are passed through
//! verbatim as [`token::TokenKind::RawLine`]s until the matching end tag.
//!
//! ### 3. Inline lexing ([`lexer`])
//!
//! A lossless [Logos] lexer over paragraph text. Concatenating the token
//! texts gives back the input.
//!
//! [Logos]: https://docs.rs/logos

pub mod comment;
pub mod cursor;
pub mod error;
pub mod kinds;
pub mod lexer;
pub mod token;
pub mod tokenizer;

pub use comment::{NormalizedComment, normalize};
pub use cursor::Cursor;
pub use error::SyntaxError;
pub use kinds::{Alignment, FenceKind, ListMarkerKind};
pub use lexer::{InlineKind, InlineToken, lex};
pub use token::{Token, TokenKind};
pub use tokenizer::Tokenizer;
