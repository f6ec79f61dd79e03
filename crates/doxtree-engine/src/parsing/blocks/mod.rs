//! # Block parsing
//!
//! Turns the line tokens of one comment section into block nodes.
//!
//! - **`builder`**: `BlockBuilder`, the leaf-state machine
//! - **`list`**: indentation to list depth
//! - **`table`**: pipe tables with `||` and `^` merges
//! - **`definition`**: `<dl>` definition lists

pub mod builder;
pub mod definition;
pub mod list;
pub mod table;

use doxtree_config::Options;
use doxtree_syntax::Tokenizer;

use crate::diagnostics::Diagnostic;
use crate::model::MarkupNode;

use super::inline::parse_inline;

pub use builder::BlockBuilder;

/// Parses free-standing lines (a quote or definition body) into blocks.
pub fn parse_blocks(lines: Vec<String>, options: &Options) -> (Vec<MarkupNode>, Vec<Diagnostic>) {
    match Tokenizer::new(lines.clone()) {
        Ok(tokens) => {
            let mut builder = BlockBuilder::new(options);
            for token in tokens {
                builder.push(&token);
            }
            builder.finish()
        }
        Err(err) => {
            log::debug!("nested block kept as text: {err}");
            let body = parse_inline(&lines.join("\n"));
            (vec![MarkupNode::Paragraph(body)], vec![])
        }
    }
}
