use doxtree_config::Options;
use doxtree_syntax::Cursor;

use crate::diagnostics::Diagnostic;
use crate::model::{DefinitionEntry, MarkupNode};
use crate::parsing::inline::parse_inline;

use super::parse_blocks;

/// HTML definition list tags.
pub struct DefinitionTags;

impl DefinitionTags {
    pub const OPEN: &'static [u8] = b"<dl>";
    pub const CLOSE: &'static [u8] = b"</dl>";
    pub const TERM: &'static [u8] = b"<dt>";
    pub const TERM_END: &'static [u8] = b"</dt>";
    pub const DEF: &'static [u8] = b"<dd>";
    pub const DEF_END: &'static [u8] = b"</dd>";

    pub fn opens(line: &str) -> bool {
        Cursor::new(line.trim_start()).starts_with_ignore_case(Self::OPEN)
    }

    /// `<dl>` count minus `</dl>` count on a line.
    pub fn depth_change(line: &str) -> isize {
        let lower = line.to_ascii_lowercase();
        lower.matches("<dl>").count() as isize - lower.matches("</dl>").count() as isize
    }
}

enum Part {
    Term(String),
    Def(String),
}

/// Splits the text of a `<dl>` block into terms and definitions.
///
/// Nested lists stay inside the definition that holds them.
fn segments(text: &str) -> Vec<Part> {
    let mut cur = Cursor::new(text);
    let mut parts = vec![];
    let mut open: Option<Part> = None;
    let mut start = 0;
    let mut depth = 0usize;

    fn close(open: &mut Option<Part>, parts: &mut Vec<Part>, body: &str) {
        match open.take() {
            Some(Part::Term(_)) => parts.push(Part::Term(body.trim().to_string())),
            Some(Part::Def(_)) => parts.push(Part::Def(body.to_string())),
            None => {}
        }
    }

    while !cur.eof() {
        if cur.starts_with_ignore_case(DefinitionTags::OPEN) {
            depth += 1;
            cur.bump_n(DefinitionTags::OPEN.len());
            if depth == 1 {
                start = cur.pos();
            }
            continue;
        }
        if cur.starts_with_ignore_case(DefinitionTags::CLOSE) {
            let outer = depth == 1;
            if outer {
                close(&mut open, &mut parts, &text[start..cur.pos()]);
            }
            depth = depth.saturating_sub(1);
            cur.bump_n(DefinitionTags::CLOSE.len());
            if outer {
                start = cur.pos();
            }
            continue;
        }
        if depth == 1 {
            let tag = [
                (DefinitionTags::TERM, Some(Part::Term(String::new()))),
                (DefinitionTags::DEF, Some(Part::Def(String::new()))),
                (DefinitionTags::TERM_END, None),
                (DefinitionTags::DEF_END, None),
            ]
            .into_iter()
            .find(|(t, _)| cur.starts_with_ignore_case(t));
            if let Some((t, next)) = tag {
                close(&mut open, &mut parts, &text[start..cur.pos()]);
                open = next;
                cur.bump_n(t.len());
                start = cur.pos();
                continue;
            }
        }
        let ch = cur.rest().chars().next().map_or(1, char::len_utf8);
        cur.bump_n(ch);
    }
    close(&mut open, &mut parts, &text[start..]);
    parts
}

/// Builds a definition list from the lines of a `<dl>` block.
pub fn parse_definitions(lines: &[String], options: &Options) -> (MarkupNode, Vec<Diagnostic>) {
    let text = lines.join("\n");
    let mut entries: Vec<DefinitionEntry> = vec![];
    let mut diagnostics = vec![];

    for part in segments(&text) {
        match part {
            Part::Term(term) => entries.push(DefinitionEntry {
                term: parse_inline(&term),
                definitions: vec![],
            }),
            Part::Def(body) => {
                let body_lines: Vec<String> = body.lines().map(str::to_string).collect();
                let (nodes, diags) = parse_blocks(dedent(body_lines), options);
                diagnostics.extend(diags);
                match entries.last_mut() {
                    Some(entry) => entry.definitions.push(nodes),
                    None => entries.push(DefinitionEntry {
                        term: vec![],
                        definitions: vec![nodes],
                    }),
                }
            }
        }
    }

    (MarkupNode::DefinitionList(entries), diagnostics)
}

fn dedent(lines: Vec<String>) -> Vec<String> {
    let common = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .into_iter()
        .map(|l| l.get(common..).unwrap_or("").trim_end().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(s: &[&str]) -> Vec<String> {
        s.iter().map(|l| l.to_string()).collect()
    }

    fn para(s: &str) -> MarkupNode {
        MarkupNode::Paragraph(vec![MarkupNode::text(s)])
    }

    #[test]
    fn terms_and_definitions() {
        let (node, diags) = parse_definitions(
            &lines(&["<dl>", "<dt>Term</dt>", "<dd>Meaning</dd>", "<dd>Another</dd>", "</dl>"]),
            &Options::default(),
        );
        assert!(diags.is_empty());
        assert_eq!(
            node,
            MarkupNode::DefinitionList(vec![DefinitionEntry {
                term: vec![MarkupNode::text("Term")],
                definitions: vec![vec![para("Meaning")], vec![para("Another")]],
            }])
        );
    }

    #[test]
    fn nested_lists_stay_in_definition() {
        let (node, _) = parse_definitions(
            &lines(&[
                "<dl><dt>Outer</dt><dd>",
                "  <dl><dt>Inner</dt><dd>Deep</dd></dl>",
                "</dd></dl>",
            ]),
            &Options::default(),
        );
        let MarkupNode::DefinitionList(entries) = node else {
            panic!("expected definition list");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].definitions,
            vec![vec![MarkupNode::DefinitionList(vec![DefinitionEntry {
                term: vec![MarkupNode::text("Inner")],
                definitions: vec![vec![para("Deep")]],
            }])]]
        );
    }

    #[test]
    fn unclosed_items_end_at_next_tag() {
        let (node, _) = parse_definitions(
            &lines(&["<dl>", "<dt>A", "<dd>first", "<dt>B", "<dd>second", "</dl>"]),
            &Options::default(),
        );
        let MarkupNode::DefinitionList(entries) = node else {
            panic!("expected definition list");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].term, vec![MarkupNode::text("B")]);
        assert_eq!(entries[1].definitions, vec![vec![para("second")]]);
    }

    #[test]
    fn depth_change_counts_tags() {
        assert_eq!(DefinitionTags::depth_change("<dl><dt>x"), 1);
        assert_eq!(DefinitionTags::depth_change("</DL>"), -1);
        assert!(DefinitionTags::opens("  <DL>"));
    }
}
