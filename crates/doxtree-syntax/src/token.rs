use crate::kinds::{Alignment, FenceKind, ListMarkerKind};

/// One line-level token of a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Zero-based line within the normalized comment.
    pub line: usize,
    pub kind: TokenKind,
    /// The source text this token was read from.
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A block command such as `@param` with the rest of its segment.
    Command { name: String, args: String },
    FenceStart { kind: FenceKind, arg: Option<String> },
    /// A fence body line, verbatim.
    RawLine(String),
    /// `implicit` is set when the comment ended before the end tag.
    FenceEnd { kind: FenceKind, implicit: bool },
    ListMarker {
        marker: ListMarkerKind,
        indent: usize,
        text: String,
    },
    TableRow { cells: Vec<String> },
    TableSeparator { alignments: Vec<Alignment> },
    QuoteMarker { indent: usize, text: String },
    BlankLine,
    TextRun { indent: usize, text: String },
}

impl Token {
    pub fn new(line: usize, kind: TokenKind, raw: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            raw: raw.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self.kind, TokenKind::BlankLine)
    }
}
