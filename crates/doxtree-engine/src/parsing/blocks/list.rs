use doxtree_syntax::ListMarkerKind;

use crate::model::{ListItem, MarkupNode};
use crate::parsing::inline::parse_inline;

struct ItemDraft {
    depth: usize,
    ordered: bool,
    lines: Vec<String>,
}

/// Accumulates list items, assigning depths from indentation.
///
/// Each item is at most one level deeper than the one before it, however
/// far its marker is indented.
pub struct ListBuilder {
    ordered: bool,
    indents: Vec<usize>,
    items: Vec<ItemDraft>,
    pending_blank: bool,
}

impl ListBuilder {
    pub fn new(marker: ListMarkerKind, indent: usize, text: &str) -> Self {
        let mut list = Self {
            ordered: marker.is_ordered(),
            indents: vec![],
            items: vec![],
            pending_blank: false,
        };
        list.push_item(marker, indent, text);
        list
    }

    pub fn push_item(&mut self, marker: ListMarkerKind, indent: usize, text: &str) {
        self.pending_blank = false;
        let depth = self.depth_for(indent);
        self.items.push(ItemDraft {
            depth,
            ordered: marker.is_ordered(),
            lines: vec![text.to_string()],
        });
    }

    /// Lazy continuation: text without a marker joins the current item.
    pub fn continue_item(&mut self, text: &str) {
        if let Some(item) = self.items.last_mut() {
            item.lines.push(text.to_string());
        }
    }

    pub fn blank(&mut self) {
        self.pending_blank = true;
    }

    pub fn after_blank(&self) -> bool {
        self.pending_blank
    }

    fn depth_for(&mut self, indent: usize) -> usize {
        while let Some(&top) = self.indents.last() {
            if indent >= top || self.indents.len() == 1 {
                break;
            }
            self.indents.pop();
        }
        match self.indents.last() {
            Some(&top) if indent <= top => {}
            _ => self.indents.push(indent),
        }
        self.indents.len() - 1
    }

    pub fn finish(self) -> MarkupNode {
        MarkupNode::List {
            ordered: self.ordered,
            items: self
                .items
                .into_iter()
                .map(|item| ListItem {
                    depth: item.depth,
                    ordered: item.ordered,
                    body: parse_inline(&item.lines.join("\n")),
                })
                .collect(),
        }
    }
}
