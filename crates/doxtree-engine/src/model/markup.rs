use std::fmt;

use serde::Serialize;

use super::{doc::DocBlock, documentation::TargetId};

/// One node of a parsed comment, block or inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MarkupNode {
    Paragraph(Vec<MarkupNode>),
    Text(String),
    Emphasis(Vec<MarkupNode>),
    Strong(Vec<MarkupNode>),
    Strikethrough(Vec<MarkupNode>),
    Underline(Vec<MarkupNode>),
    Subscript(Vec<MarkupNode>),
    Superscript(Vec<MarkupNode>),
    Small(Vec<MarkupNode>),
    Center(Vec<MarkupNode>),
    CodeSpan(String),
    Link {
        url: String,
        body: Vec<MarkupNode>,
    },
    List {
        ordered: bool,
        items: Vec<ListItem>,
    },
    Table(Table),
    CodeBlock {
        lang: Option<String>,
        lines: Vec<String>,
    },
    Verbatim {
        lines: Vec<String>,
    },
    BlockQuote(Vec<MarkupNode>),
    DefinitionList(Vec<DefinitionEntry>),
    Diagram(Diagram),
    Formula {
        latex: String,
        display: bool,
    },
    Passthrough {
        kind: PassthroughKind,
        raw: String,
    },
    CrossRef {
        target_text: String,
        display_text: Option<String>,
        resolved: RefState,
    },
    CopyDoc {
        target_text: String,
        resolved: RefState,
        /// The target's documentation, filled in by the resolver.
        content: Option<Box<DocBlock>>,
    },
    Anchor {
        name: String,
    },
    Emoji {
        name: String,
    },
    HardBreak,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub depth: usize,
    /// Items of a nested list may differ from the outer list's kind.
    pub ordered: bool,
    pub body: Vec<MarkupNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl From<doxtree_syntax::Alignment> for Alignment {
    fn from(a: doxtree_syntax::Alignment) -> Self {
        match a {
            doxtree_syntax::Alignment::Left => Alignment::Left,
            doxtree_syntax::Alignment::Center => Alignment::Center,
            doxtree_syntax::Alignment::Right => Alignment::Right,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub alignment: Vec<Alignment>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn columns(&self) -> usize {
        self.alignment.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub header: bool,
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Logical columns covered by this row, counting horizontal spans.
    pub fn width(&self) -> usize {
        self.cells.iter().map(|c| c.span).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCell {
    /// Logical columns covered (`||` merges).
    pub span: usize,
    /// Logical rows covered (`^` cells below extend this).
    pub row_span: usize,
    /// A `^` placeholder continuing the cell above.
    pub merged_up: bool,
    pub body: Vec<MarkupNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionEntry {
    pub term: Vec<MarkupNode>,
    pub definitions: Vec<Vec<MarkupNode>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagramKind {
    Dot,
    DotFile,
    Msc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DiagramSource {
    Inline(String),
    File(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagram {
    pub kind: DiagramKind,
    pub source: DiagramSource,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PassthroughKind {
    Html,
    Xml,
}

/// Resolution state of a reference. `Pending` only exists between parsing
/// and resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RefState {
    Pending,
    Resolved(ResolvedRef),
    Broken(BrokenReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRef {
    pub target: TargetId,
    pub display_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BrokenReason {
    NotFound,
    /// `@copydoc` target has no documentation to copy.
    Undocumented,
    Cycle,
}

impl fmt::Display for BrokenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BrokenReason::NotFound => "no such symbol, group or anchor",
            BrokenReason::Undocumented => "target has no documentation",
            BrokenReason::Cycle => "@copydoc cycle",
        })
    }
}

impl MarkupNode {
    pub fn text(s: impl Into<String>) -> Self {
        MarkupNode::Text(s.into())
    }

    /// Visits this node and every nested node, parents first.
    ///
    /// Copied `@copydoc` content is not visited; it belongs to its source.
    pub fn walk<F: FnMut(&MarkupNode)>(&self, f: &mut F) {
        f(self);
        match self {
            MarkupNode::Paragraph(c)
            | MarkupNode::Emphasis(c)
            | MarkupNode::Strong(c)
            | MarkupNode::Strikethrough(c)
            | MarkupNode::Underline(c)
            | MarkupNode::Subscript(c)
            | MarkupNode::Superscript(c)
            | MarkupNode::Small(c)
            | MarkupNode::Center(c)
            | MarkupNode::BlockQuote(c)
            | MarkupNode::Link { body: c, .. } => {
                for n in c {
                    n.walk(f);
                }
            }
            MarkupNode::List { items, .. } => {
                for item in items {
                    for n in &item.body {
                        n.walk(f);
                    }
                }
            }
            MarkupNode::Table(table) => {
                for cell in table.rows.iter().flat_map(|r| &r.cells) {
                    for n in &cell.body {
                        n.walk(f);
                    }
                }
            }
            MarkupNode::DefinitionList(entries) => {
                for entry in entries {
                    for n in &entry.term {
                        n.walk(f);
                    }
                    for def in &entry.definitions {
                        for n in def {
                            n.walk(f);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Mutable counterpart of [`MarkupNode::walk`].
    pub fn walk_mut<F: FnMut(&mut MarkupNode)>(&mut self, f: &mut F) {
        f(self);
        match self {
            MarkupNode::Paragraph(c)
            | MarkupNode::Emphasis(c)
            | MarkupNode::Strong(c)
            | MarkupNode::Strikethrough(c)
            | MarkupNode::Underline(c)
            | MarkupNode::Subscript(c)
            | MarkupNode::Superscript(c)
            | MarkupNode::Small(c)
            | MarkupNode::Center(c)
            | MarkupNode::BlockQuote(c)
            | MarkupNode::Link { body: c, .. } => {
                for n in c {
                    n.walk_mut(f);
                }
            }
            MarkupNode::List { items, .. } => {
                for item in items {
                    for n in &mut item.body {
                        n.walk_mut(f);
                    }
                }
            }
            MarkupNode::Table(table) => {
                for cell in table.rows.iter_mut().flat_map(|r| &mut r.cells) {
                    for n in &mut cell.body {
                        n.walk_mut(f);
                    }
                }
            }
            MarkupNode::DefinitionList(entries) => {
                for entry in entries {
                    for n in &mut entry.term {
                        n.walk_mut(f);
                    }
                    for def in &mut entry.definitions {
                        for n in def {
                            n.walk_mut(f);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Concatenated text content, ignoring formatting.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.walk(&mut |n| match n {
            MarkupNode::Text(t) | MarkupNode::CodeSpan(t) => out.push_str(t),
            MarkupNode::HardBreak => out.push('\n'),
            MarkupNode::CrossRef {
                target_text,
                display_text,
                ..
            } => out.push_str(display_text.as_deref().unwrap_or(target_text)),
            _ => {}
        });
        out
    }
}
