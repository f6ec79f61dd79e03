//! Options shared by the doxtree parser and model builder.
//!
//! Reading them from disk is left to the embedding tool; [`Options`]
//! deserializes from any serde format, with missing fields taking their
//! defaults.

use serde::{Deserialize, Serialize};

/// How the brief description is derived when a comment has no `@brief`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BriefMode {
    /// Up to and including the first `. ` of the first paragraph.
    #[default]
    FirstSentence,
    /// The whole first paragraph.
    FirstParagraph,
}

/// Knobs consumed by the parser and model builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub brief: BriefMode,
    /// Columns of indentation that turn a line outside paragraphs and lists into verbatim text.
    pub verbatim_indent: usize,
    /// Zero is read as one.
    pub tab_width: usize,
    /// Drop symbols without documentation from group member lists.
    pub hide_undocumented: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            brief: BriefMode::FirstSentence,
            verbatim_indent: 4,
            tab_width: 4,
            hide_undocumented: false,
        }
    }
}
