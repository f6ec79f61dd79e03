use doxtree_config::Options;
use doxtree_syntax::{FenceKind, ListMarkerKind, Token, TokenKind, kinds::Fence};

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::model::{Diagram, DiagramKind, DiagramSource, MarkupNode, PassthroughKind};
use crate::parsing::inline::parse_inline;

use super::{
    definition::{DefinitionTags, parse_definitions},
    list::ListBuilder,
    parse_blocks,
    table::TableBuilder,
};

/// The block currently accumulating lines.
enum Leaf {
    None,
    Paragraph(Vec<String>),
    Fence {
        kind: FenceKind,
        arg: Option<String>,
        lines: Vec<String>,
    },
    List(ListBuilder),
    Table(TableBuilder),
    Quote {
        line: usize,
        lines: Vec<String>,
    },
    Verbatim {
        lines: Vec<String>,
        /// Blank lines seen since the last verbatim line.
        blanks: usize,
    },
    Definitions {
        line: usize,
        lines: Vec<String>,
        depth: isize,
        last_line: Option<usize>,
    },
}

/// Single forward pass from line tokens to block nodes.
///
/// At most one leaf block is open at a time; any token that cannot extend
/// it closes it first. Quotes and definition bodies are parsed again as
/// blocks when they close.
pub struct BlockBuilder<'o> {
    options: &'o Options,
    leaf: Leaf,
    out: Vec<MarkupNode>,
    diagnostics: Vec<Diagnostic>,
}

impl<'o> BlockBuilder<'o> {
    pub fn new(options: &'o Options) -> Self {
        Self {
            options,
            leaf: Leaf::None,
            out: vec![],
            diagnostics: vec![],
        }
    }

    pub fn push(&mut self, token: &Token) {
        if matches!(self.leaf, Leaf::Fence { .. }) {
            self.fence_token(token);
            return;
        }
        if matches!(self.leaf, Leaf::Definitions { .. }) {
            let text = if token.is_blank() { "" } else { token.raw.as_str() };
            self.definition_line(token.line, text);
            return;
        }

        match &token.kind {
            TokenKind::BlankLine => self.blank(),
            TokenKind::FenceStart { kind, arg } => {
                self.flush();
                self.leaf = Leaf::Fence {
                    kind: *kind,
                    arg: arg.clone(),
                    lines: vec![],
                };
            }
            TokenKind::RawLine(_) | TokenKind::FenceEnd { .. } => {
                log::debug!("fence token outside a fence at line {}", token.line);
            }
            TokenKind::ListMarker {
                marker,
                indent,
                text,
            } => self.list_item(*marker, *indent, text, token),
            TokenKind::TableRow { cells } => self.table_row(token.line, cells, &token.raw),
            TokenKind::TableSeparator { alignments } => {
                if let Leaf::Table(table) = &mut self.leaf
                    && table.awaits_separator()
                {
                    let expected = table.columns();
                    let alignments = alignments.iter().copied().map(Into::into).collect();
                    if let Err(found) = table.set_alignment(alignments) {
                        self.report(token.line, DiagnosticKind::MalformedTable { expected, found });
                    }
                    return;
                }
                self.text_run(0, token.raw.trim(), &token.raw, token.line);
            }
            TokenKind::QuoteMarker { text, .. } => {
                if let Leaf::Quote { lines, .. } = &mut self.leaf {
                    lines.push(text.clone());
                    return;
                }
                self.flush();
                self.leaf = Leaf::Quote {
                    line: token.line,
                    lines: vec![text.clone()],
                };
            }
            TokenKind::TextRun { indent, text } => {
                self.text_run(*indent, text, &token.raw, token.line);
            }
            TokenKind::Command { name, args } => self.command(name, args, token),
        }
    }

    /// Closes the open block and hands over the nodes built so far.
    pub fn take(&mut self) -> Vec<MarkupNode> {
        self.flush();
        std::mem::take(&mut self.out)
    }

    pub fn finish(mut self) -> (Vec<MarkupNode>, Vec<Diagnostic>) {
        self.flush();
        (self.out, self.diagnostics)
    }

    fn report(&mut self, line: usize, kind: DiagnosticKind) {
        self.diagnostics.push(Diagnostic::new(kind).at_line(line));
    }

    fn fence_token(&mut self, token: &Token) {
        match &token.kind {
            TokenKind::RawLine(line) => {
                if let Leaf::Fence { lines, .. } = &mut self.leaf {
                    lines.push(line.clone());
                }
            }
            TokenKind::FenceEnd { kind, implicit } => {
                if *implicit {
                    self.report(
                        token.line,
                        DiagnosticKind::UnterminatedFence {
                            fence: Fence::name(*kind).to_string(),
                        },
                    );
                }
                self.flush();
            }
            _ => log::debug!("unexpected token inside fence at line {}", token.line),
        }
    }

    fn blank(&mut self) {
        match &mut self.leaf {
            Leaf::None => {}
            Leaf::List(list) => list.blank(),
            Leaf::Verbatim { blanks, .. } => *blanks += 1,
            _ => self.flush(),
        }
    }

    fn list_item(&mut self, marker: ListMarkerKind, indent: usize, text: &str, token: &Token) {
        match &mut self.leaf {
            Leaf::List(list) => {
                list.push_item(marker, indent, text);
                return;
            }
            Leaf::Paragraph(_) => {}
            _ if indent >= self.options.verbatim_indent => {
                // An indented marker outside a list is preformatted text
                self.text_run(indent, token.raw.trim(), &token.raw, token.line);
                return;
            }
            _ => {}
        }
        self.flush();
        self.leaf = Leaf::List(ListBuilder::new(marker, indent, text));
    }

    fn table_row(&mut self, line: usize, cells: &[String], raw: &str) {
        if let Leaf::Table(table) = &mut self.leaf {
            if let Err(found) = table.push_row(cells.to_vec()) {
                let expected = table.columns();
                self.report(line, DiagnosticKind::MalformedTable { expected, found });
                // The table ends at the row that does not fit
                self.flush();
                self.paragraph(&[raw.trim().to_string()]);
            }
            return;
        }
        self.flush();
        self.leaf = Leaf::Table(TableBuilder::new(cells.to_vec()));
    }

    fn text_run(&mut self, indent: usize, text: &str, raw: &str, line: usize) {
        let threshold = self.options.verbatim_indent;
        let verbatim = || {
            raw.get(threshold..)
                .unwrap_or(text)
                .trim_end()
                .to_string()
        };

        match &mut self.leaf {
            Leaf::List(list) if !list.after_blank() || (indent > 0 && indent < threshold) => {
                list.continue_item(text);
                return;
            }
            Leaf::Paragraph(lines) if !DefinitionTags::opens(text) => {
                lines.push(text.to_string());
                return;
            }
            Leaf::Verbatim { lines, blanks } if indent >= threshold => {
                lines.extend(std::iter::repeat_n(String::new(), std::mem::take(blanks)));
                lines.push(verbatim());
                return;
            }
            _ => {}
        }

        self.flush();
        if indent >= threshold {
            self.leaf = Leaf::Verbatim {
                lines: vec![verbatim()],
                blanks: 0,
            };
        } else if DefinitionTags::opens(text) {
            self.leaf = Leaf::Definitions {
                line,
                lines: vec![],
                depth: 0,
                last_line: None,
            };
            self.definition_line(line, raw);
        } else {
            self.leaf = Leaf::Paragraph(vec![text.to_string()]);
        }
    }

    fn definition_line(&mut self, line: usize, text: &str) {
        let Leaf::Definitions {
            lines,
            depth,
            last_line,
            ..
        } = &mut self.leaf
        else {
            return;
        };
        // Segments of one source line arrive as separate tokens
        match lines.last_mut() {
            Some(last) if *last_line == Some(line) => last.push_str(text),
            _ => lines.push(text.to_string()),
        }
        *last_line = Some(line);
        *depth += DefinitionTags::depth_change(text);
        if *depth <= 0 {
            self.flush();
        }
    }

    fn command(&mut self, name: &str, args: &str, token: &Token) {
        match name {
            "dotfile" => {
                self.flush();
                self.out.push(dotfile(args));
            }
            _ => {
                log::debug!("@{name} is not a block here; kept as text");
                self.text_run(0, token.raw.trim(), &token.raw, token.line);
            }
        }
    }

    fn paragraph(&mut self, lines: &[String]) {
        let body = parse_inline(&lines.join("\n"));
        if !body.is_empty() {
            self.out.push(MarkupNode::Paragraph(body));
        }
    }

    fn nested(&mut self, line: usize, diagnostics: Vec<Diagnostic>) {
        self.diagnostics.extend(diagnostics.into_iter().map(|mut d| {
            d.line = d.line.map(|l| l + line);
            d
        }));
    }

    fn flush(&mut self) {
        match std::mem::replace(&mut self.leaf, Leaf::None) {
            Leaf::None => {}
            Leaf::Paragraph(lines) => self.paragraph(&lines),
            Leaf::Fence { kind, arg, lines } => self.out.push(fence_node(kind, arg, lines)),
            Leaf::List(list) => self.out.push(list.finish()),
            Leaf::Table(table) => self.out.push(MarkupNode::Table(table.finish())),
            Leaf::Quote { line, lines } => {
                let (body, diagnostics) = parse_blocks(lines, self.options);
                self.out.push(MarkupNode::BlockQuote(body));
                self.nested(line, diagnostics);
            }
            Leaf::Verbatim { lines, .. } => self.out.push(MarkupNode::Verbatim { lines }),
            Leaf::Definitions {
                line, lines, depth, ..
            } => {
                if depth > 0 {
                    self.report(line, DiagnosticKind::UnterminatedDefinitionList);
                }
                let (node, diagnostics) = parse_definitions(&lines, self.options);
                self.out.push(node);
                self.nested(line, diagnostics);
            }
        }
    }
}

fn fence_node(kind: FenceKind, arg: Option<String>, lines: Vec<String>) -> MarkupNode {
    match kind {
        FenceKind::Code => MarkupNode::CodeBlock {
            lang: arg,
            lines: strip_common_indent(lines),
        },
        FenceKind::Verbatim => MarkupNode::Verbatim { lines },
        FenceKind::Dot | FenceKind::Msc => MarkupNode::Diagram(Diagram {
            kind: if kind == FenceKind::Dot {
                DiagramKind::Dot
            } else {
                DiagramKind::Msc
            },
            source: DiagramSource::Inline(lines.join("\n")),
            caption: arg,
        }),
        FenceKind::HtmlOnly => MarkupNode::Passthrough {
            kind: PassthroughKind::Html,
            raw: lines.join("\n"),
        },
        FenceKind::XmlOnly => MarkupNode::Passthrough {
            kind: PassthroughKind::Xml,
            raw: lines.join("\n"),
        },
        FenceKind::Formula => MarkupNode::Formula {
            latex: lines.join("\n").trim().to_string(),
            display: true,
        },
    }
}

fn strip_common_indent(lines: Vec<String>) -> Vec<String> {
    let common = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);
    lines
        .into_iter()
        .map(|l| l.get(common..).unwrap_or("").to_string())
        .collect()
}

/// `@dotfile path ["caption"]`
fn dotfile(args: &str) -> MarkupNode {
    let args = args.trim();
    let (path, rest) = match args.strip_prefix('"').and_then(|a| a.split_once('"')) {
        Some(quoted) => quoted,
        None => args.split_once(char::is_whitespace).unwrap_or((args, "")),
    };
    let caption = rest.trim().trim_matches('"').trim();
    MarkupNode::Diagram(Diagram {
        kind: DiagramKind::DotFile,
        source: DiagramSource::File(path.to_string()),
        caption: (!caption.is_empty()).then(|| caption.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Alignment, ListItem};
    use pretty_assertions::assert_eq;

    fn blocks(lines: &[&str]) -> (Vec<MarkupNode>, Vec<Diagnostic>) {
        parse_blocks(
            lines.iter().map(|l| l.to_string()).collect(),
            &Options::default(),
        )
    }

    fn nodes(lines: &[&str]) -> Vec<MarkupNode> {
        let (nodes, diagnostics) = blocks(lines);
        assert_eq!(diagnostics, vec![]);
        nodes
    }

    fn para(s: &str) -> MarkupNode {
        MarkupNode::Paragraph(vec![MarkupNode::text(s)])
    }

    #[test]
    fn blank_lines_separate_paragraphs() {
        assert_eq!(nodes(&["a", "b", "", "c"]), vec![para("a b"), para("c")]);
    }

    #[test]
    fn list_interrupts_paragraph() {
        assert_eq!(
            nodes(&["Intro", "- one", "- two"]),
            vec![
                para("Intro"),
                MarkupNode::List {
                    ordered: false,
                    items: vec![
                        ListItem {
                            depth: 0,
                            ordered: false,
                            body: vec![MarkupNode::text("one")]
                        },
                        ListItem {
                            depth: 0,
                            ordered: false,
                            body: vec![MarkupNode::text("two")]
                        },
                    ],
                },
            ]
        );
    }

    #[test]
    fn list_survives_blank_between_items() {
        let out = nodes(&["1. a", "", "2. b", "", "after"]);
        assert_eq!(out.len(), 2);
        let MarkupNode::List { ordered, items } = &out[0] else {
            panic!("expected list, got {:?}", out[0]);
        };
        assert!(*ordered);
        assert_eq!(items.len(), 2);
        assert_eq!(out[1], para("after"));
    }

    #[test]
    fn table_with_alignment() {
        let out = nodes(&["| Right | Center | Left |", "|--:|:-:|:--|", "| 1 | 2 | 3 |"]);
        let [MarkupNode::Table(table)] = out.as_slice() else {
            panic!("expected one table, got {out:?}");
        };
        assert_eq!(
            table.alignment,
            vec![Alignment::Right, Alignment::Center, Alignment::Left]
        );
        assert!(table.rows[0].header);
        assert!(!table.rows[1].header);
    }

    #[test]
    fn malformed_row_stays_in_place_as_text() {
        let (out, diagnostics) = blocks(&["| a | b |", "|---|---|", "| 1 | 2 | 3 |", "| 4 | 5 |"]);
        assert_eq!(out.len(), 3);
        let MarkupNode::Table(head) = &out[0] else {
            panic!("expected table, got {:?}", out[0]);
        };
        assert_eq!(head.rows.len(), 1);
        assert!(head.rows[0].header);
        assert_eq!(out[1], para("| 1 | 2 | 3 |"));
        let MarkupNode::Table(tail) = &out[2] else {
            panic!("expected table, got {:?}", out[2]);
        };
        assert_eq!(tail.rows.len(), 1);
        assert_eq!(tail.rows[0].cells[0].body, vec![MarkupNode::text("4")]);
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic::new(DiagnosticKind::MalformedTable {
                    expected: 2,
                    found: 3
                })
                .at_line(2)
            ]
        );
    }

    #[test]
    fn code_fence_keeps_relative_indent() {
        assert_eq!(
            nodes(&["@code{.c}", "  if (x)", "      y();", "@endcode"]),
            vec![MarkupNode::CodeBlock {
                lang: Some("c".to_string()),
                lines: vec!["if (x)".to_string(), "    y();".to_string()],
            }]
        );
    }

    #[test]
    fn unterminated_fence_is_reported_and_closed() {
        let (out, diagnostics) = blocks(&["@code", "x"]);
        assert_eq!(
            out,
            vec![MarkupNode::CodeBlock {
                lang: None,
                lines: vec!["x".to_string()]
            }]
        );
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic::new(DiagnosticKind::UnterminatedFence {
                    fence: "code".to_string()
                })
                .at_line(2)
            ]
        );
    }

    #[test]
    fn indented_text_is_verbatim() {
        assert_eq!(
            nodes(&["text", "", "    int x;", "      y;", "", "    z"]),
            vec![
                para("text"),
                MarkupNode::Verbatim {
                    lines: vec![
                        "int x;".to_string(),
                        "  y;".to_string(),
                        String::new(),
                        "z".to_string()
                    ]
                },
            ]
        );
    }

    #[test]
    fn indented_text_continues_paragraph() {
        assert_eq!(nodes(&["text", "    more"]), vec![para("text more")]);
    }

    #[test]
    fn quotes_nest() {
        assert_eq!(
            nodes(&["> a", "> > b"]),
            vec![MarkupNode::BlockQuote(vec![
                para("a"),
                MarkupNode::BlockQuote(vec![para("b")]),
            ])]
        );
    }

    #[test]
    fn diagrams_and_passthrough() {
        let out = nodes(&[
            "@dot \"Flow\"",
            "digraph { a -> b }",
            "@enddot",
            "@dotfile graph.dot \"From file\"",
            "@htmlonly",
            "<hr>",
            "@endhtmlonly",
        ]);
        assert_eq!(
            out,
            vec![
                MarkupNode::Diagram(Diagram {
                    kind: DiagramKind::Dot,
                    source: DiagramSource::Inline("digraph { a -> b }".to_string()),
                    caption: Some("Flow".to_string()),
                }),
                MarkupNode::Diagram(Diagram {
                    kind: DiagramKind::DotFile,
                    source: DiagramSource::File("graph.dot".to_string()),
                    caption: Some("From file".to_string()),
                }),
                MarkupNode::Passthrough {
                    kind: PassthroughKind::Html,
                    raw: "<hr>".to_string(),
                },
            ]
        );
    }

    #[test]
    fn display_formula() {
        assert_eq!(
            nodes(&["@f[", "  e^{i\\pi} = -1", "@f]"]),
            vec![MarkupNode::Formula {
                latex: "e^{i\\pi} = -1".to_string(),
                display: true
            }]
        );
    }

    #[test]
    fn definition_list_block() {
        let out = nodes(&["Before", "<dl>", "<dt>T</dt><dd>D</dd>", "</dl>", "After"]);
        assert_eq!(out.len(), 3);
        assert!(matches!(out[1], MarkupNode::DefinitionList(ref e) if e.len() == 1));
        assert_eq!(out[2], para("After"));
    }

    #[test]
    fn unclosed_definition_list_is_reported() {
        let (out, diagnostics) = blocks(&["Before", "<dl>", "<dt>T</dt><dd>D</dd>", "After"]);
        assert_eq!(out.len(), 2);
        assert!(matches!(out[1], MarkupNode::DefinitionList(_)));
        assert_eq!(
            diagnostics,
            vec![Diagnostic::new(DiagnosticKind::UnterminatedDefinitionList).at_line(1)]
        );
    }
}
