use doxtree_config::{BriefMode, Options};
use doxtree_syntax::{NormalizedComment, SyntaxError, Token, TokenKind, Tokenizer};

use crate::diagnostics::Diagnostic;
use crate::model::{
    Admonition, AdmonitionKind, DocBlock, MarkupNode, ParamDirection, ParamDoc, RetvalDoc,
};

use super::blocks::BlockBuilder;

/// Grouping and placement commands found in a comment.
///
/// They carry no documentation text; the binder turns them into group and
/// scope events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    DefGroup { name: String, title: String },
    /// Also produced by `@weakgroup`.
    AddToGroup { name: String, title: String },
    InGroup(Vec<String>),
    ScopeOpen,
    ScopeClose,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedComment {
    pub doc: DocBlock,
    pub directives: Vec<Directive>,
    /// Lines are relative to the start of the comment.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedComment {
    pub fn documents_group(&self) -> bool {
        self.directives.iter().any(|d| {
            matches!(
                d,
                Directive::DefGroup { .. } | Directive::AddToGroup { .. }
            )
        })
    }

    pub fn documents_file(&self) -> bool {
        self.directives.contains(&Directive::File)
    }

    pub fn ingroups(&self) -> Vec<String> {
        self.directives
            .iter()
            .filter_map(|d| match d {
                Directive::InGroup(names) => Some(names.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

/// Where block content is currently delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sink {
    Detail,
    Brief,
    /// Parameters named together share one body.
    Param { first: usize, count: usize },
    Returns,
    Retval(usize),
    Admonition(usize),
    SeeAlso,
}

struct DocParser<'o> {
    options: &'o Options,
    blocks: BlockBuilder<'o>,
    doc: DocBlock,
    sink: Sink,
    parblock: bool,
    explicit_brief: bool,
    directives: Vec<Directive>,
}

/// Parses one normalized comment into its documentation and directives.
///
/// Fails only when a line cannot be tokenized at all.
pub fn parse_comment(
    comment: &NormalizedComment,
    options: &Options,
) -> Result<ParsedComment, SyntaxError> {
    let tokens = Tokenizer::new(comment.lines.clone())?;
    let mut parser = DocParser {
        options,
        blocks: BlockBuilder::new(options),
        doc: DocBlock::default(),
        sink: Sink::Detail,
        parblock: false,
        explicit_brief: false,
        directives: vec![],
    };
    for token in tokens {
        parser.push(&token);
    }
    Ok(parser.finish())
}

fn first_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (s, ""),
    }
}

/// `[in,out] rest` to a direction and the rest.
fn split_direction(args: &str) -> (ParamDirection, &str) {
    if let Some(inner) = args.strip_prefix('[')
        && let Some((spec, rest)) = inner.split_once(']')
    {
        return (ParamDirection::parse(spec), rest.trim_start());
    }
    (ParamDirection::Unspecified, args)
}

/// Reads `a,b` or `a, b` parameter names ahead of the description.
fn split_names(args: &str) -> (Vec<String>, &str) {
    let mut names = vec![];
    let mut rest = args;
    loop {
        let (word, tail) = first_word(rest);
        names.extend(
            word.split(',')
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        );
        rest = tail;
        if !word.ends_with(',') || rest.is_empty() {
            break;
        }
    }
    (names, rest)
}

/// Splits a paragraph after its first sentence.
fn split_first_sentence(children: Vec<MarkupNode>) -> (Vec<MarkupNode>, Vec<MarkupNode>) {
    let mut brief = vec![];
    let mut iter = children.into_iter();
    while let Some(node) = iter.next() {
        if let MarkupNode::Text(text) = &node
            && let Some(at) = text.find(". ")
        {
            let (head, tail) = text.split_at(at + 1);
            brief.push(MarkupNode::text(head));
            let mut rest = vec![];
            let tail = tail.trim_start();
            if !tail.is_empty() {
                rest.push(MarkupNode::text(tail));
            }
            rest.extend(iter);
            return (brief, rest);
        }
        brief.push(node);
    }
    (brief, vec![])
}

impl DocParser<'_> {
    fn push(&mut self, token: &Token) {
        match &token.kind {
            TokenKind::Command { name, args } if self.section(name, args, token.line) => {}
            TokenKind::BlankLine => {
                self.blocks.push(token);
                if self.sink != Sink::Detail && !self.parblock {
                    self.switch(Sink::Detail);
                }
            }
            _ => self.blocks.push(token),
        }
    }

    /// Handles a sectioning or grouping command; false for anything else.
    fn section(&mut self, name: &str, args: &str, line: usize) -> bool {
        match name {
            "brief" | "short" => {
                self.explicit_brief = true;
                self.open(Sink::Brief, args, line);
            }
            "details" => self.open(Sink::Detail, args, line),
            "param" | "tparam" => {
                let (direction, rest) = if name == "param" {
                    split_direction(args)
                } else {
                    (ParamDirection::Unspecified, args)
                };
                let (names, body) = split_names(rest);
                let first = self.doc.params.len();
                let count = names.len();
                self.doc
                    .params
                    .extend(names.into_iter().map(|name| ParamDoc {
                        name,
                        direction,
                        body: vec![],
                    }));
                self.open(Sink::Param { first, count }, body, line);
            }
            "return" | "returns" | "result" => {
                self.switch(Sink::Returns);
                self.doc.returns.get_or_insert_with(Vec::new);
                self.text(args, line);
            }
            "retval" => {
                let (value, body) = first_word(args);
                self.doc.retvals.push(RetvalDoc {
                    value: value.to_string(),
                    body: vec![],
                });
                self.open(Sink::Retval(self.doc.retvals.len() - 1), body, line);
            }
            "see" | "sa" => self.open(Sink::SeeAlso, args, line),
            "warning" | "attention" => self.admonition(AdmonitionKind::Warning, None, args, line),
            "note" => self.admonition(AdmonitionKind::Note, None, args, line),
            "todo" => self.admonition(AdmonitionKind::Todo, None, args, line),
            "par" => {
                let last = self
                    .doc
                    .admonitions
                    .iter()
                    .rposition(|a| a.kind == AdmonitionKind::Par);
                match last {
                    Some(idx) if args.is_empty() => self.open(Sink::Admonition(idx), "", line),
                    _ => {
                        let title = (!args.is_empty()).then(|| args.to_string());
                        self.admonition(AdmonitionKind::Par, title, "", line);
                    }
                }
            }
            "parblock" => {
                self.parblock = true;
                self.text(args, line);
            }
            "endparblock" => self.parblock = false,
            "defgroup" | "addtogroup" | "weakgroup" => {
                let (group, title) = first_word(args);
                let (group, title) = (group.to_string(), title.to_string());
                self.directive(if name == "defgroup" {
                    Directive::DefGroup { name: group, title }
                } else {
                    Directive::AddToGroup { name: group, title }
                });
            }
            "ingroup" => self.directive(Directive::InGroup(
                args.split_whitespace().map(str::to_string).collect(),
            )),
            "{" => self.directive(Directive::ScopeOpen),
            "}" => self.directive(Directive::ScopeClose),
            "file" => self.directive(Directive::File),
            _ => return false,
        }
        true
    }

    fn directive(&mut self, directive: Directive) {
        self.switch(Sink::Detail);
        self.directives.push(directive);
    }

    fn admonition(&mut self, kind: AdmonitionKind, title: Option<String>, args: &str, line: usize) {
        self.doc.admonitions.push(Admonition {
            kind,
            title,
            body: vec![],
        });
        self.open(Sink::Admonition(self.doc.admonitions.len() - 1), args, line);
    }

    fn open(&mut self, sink: Sink, text: &str, line: usize) {
        self.switch(sink);
        self.text(text, line);
    }

    /// Feeds the text after a command into the current section.
    fn text(&mut self, text: &str, line: usize) {
        if text.is_empty() {
            return;
        }
        let kind = TokenKind::TextRun {
            indent: 0,
            text: text.to_string(),
        };
        self.blocks.push(&Token::new(line, kind, text));
    }

    fn switch(&mut self, sink: Sink) {
        let nodes = self.blocks.take();
        self.deliver(nodes);
        self.sink = sink;
    }

    fn deliver(&mut self, nodes: Vec<MarkupNode>) {
        if nodes.is_empty() {
            return;
        }
        let doc = &mut self.doc;
        match self.sink {
            Sink::Detail => doc.detail.extend(nodes),
            Sink::Brief => {
                for node in nodes {
                    if doc.brief.is_none() {
                        doc.brief = Some(node);
                    } else {
                        doc.detail.push(node);
                    }
                }
            }
            Sink::Param { first, count } => {
                for param in doc.params.iter_mut().skip(first).take(count) {
                    param.body.extend(nodes.iter().cloned());
                }
            }
            Sink::Returns => doc.returns.get_or_insert_with(Vec::new).extend(nodes),
            Sink::Retval(idx) => {
                if let Some(retval) = doc.retvals.get_mut(idx) {
                    retval.body.extend(nodes);
                }
            }
            Sink::Admonition(idx) => {
                if let Some(admonition) = doc.admonitions.get_mut(idx) {
                    admonition.body.extend(nodes);
                }
            }
            Sink::SeeAlso => doc.see_also.extend(nodes),
        }
    }

    fn auto_brief(&mut self) {
        if self.doc.brief.is_some() || self.explicit_brief {
            return;
        }
        if !matches!(self.doc.detail.first(), Some(MarkupNode::Paragraph(_))) {
            return;
        }
        let MarkupNode::Paragraph(children) = self.doc.detail.remove(0) else {
            return;
        };
        match self.options.brief {
            BriefMode::FirstParagraph => self.doc.brief = Some(MarkupNode::Paragraph(children)),
            BriefMode::FirstSentence => {
                let (brief, rest) = split_first_sentence(children);
                self.doc.brief = Some(MarkupNode::Paragraph(brief));
                if !rest.is_empty() {
                    self.doc.detail.insert(0, MarkupNode::Paragraph(rest));
                }
            }
        }
    }

    fn finish(mut self) -> ParsedComment {
        let nodes = self.blocks.take();
        self.deliver(nodes);
        self.auto_brief();
        let (_, diagnostics) = self.blocks.finish();
        ParsedComment {
            doc: self.doc,
            directives: self.directives,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use pretty_assertions::assert_eq;

    fn parse_with(lines: &[&str], options: &Options) -> ParsedComment {
        let comment = NormalizedComment {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            trailing: false,
        };
        parse_comment(&comment, options).unwrap()
    }

    fn parse(lines: &[&str]) -> ParsedComment {
        parse_with(lines, &Options::default())
    }

    fn para(s: &str) -> MarkupNode {
        MarkupNode::Paragraph(vec![MarkupNode::text(s)])
    }

    #[test]
    fn sections_route_to_their_fields() {
        let doc = parse(&[
            "@brief Adds numbers.",
            "",
            "Longer detail.",
            "@param[in] a the a",
            "@param[out] b the b",
            "  continues",
            "@return the sum",
            "@retval 0 ok",
            "@note careful",
            "@see other",
        ])
        .doc;

        assert_eq!(doc.brief, Some(para("Adds numbers.")));
        assert_eq!(doc.detail, vec![para("Longer detail.")]);
        assert_eq!(
            doc.params,
            vec![
                ParamDoc {
                    name: "a".to_string(),
                    direction: ParamDirection::In,
                    body: vec![para("the a")],
                },
                ParamDoc {
                    name: "b".to_string(),
                    direction: ParamDirection::Out,
                    body: vec![para("the b continues")],
                },
            ]
        );
        assert_eq!(doc.returns, Some(vec![para("the sum")]));
        assert_eq!(
            doc.retvals,
            vec![RetvalDoc {
                value: "0".to_string(),
                body: vec![para("ok")],
            }]
        );
        assert_eq!(
            doc.admonitions,
            vec![Admonition {
                kind: AdmonitionKind::Note,
                title: None,
                body: vec![para("careful")],
            }]
        );
        assert_eq!(doc.see_also, vec![para("other")]);
    }

    #[test]
    fn names_listed_together_share_a_body() {
        let doc = parse(&["@param x, y coordinates"]).doc;
        let names: Vec<&str> = doc.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["x", "y"]);
        assert_eq!(doc.params[0].body, doc.params[1].body);
    }

    #[test]
    fn blank_line_ends_parameter_without_parblock() {
        let doc = parse(&["@param x First.", "", "Second."]).doc;
        assert_eq!(doc.params[0].body, vec![para("First.")]);
        assert_eq!(doc.brief, Some(para("Second.")));
    }

    #[test]
    fn parblock_keeps_paragraphs_together() {
        let doc = parse(&[
            "@param x @parblock",
            "First para.",
            "",
            "Second para.",
            "@endparblock",
            "",
            "Detail.",
        ])
        .doc;
        assert_eq!(doc.params[0].body, vec![para("First para."), para("Second para.")]);
        assert_eq!(doc.brief, Some(para("Detail.")));
        assert!(doc.detail.is_empty());
    }

    #[test]
    fn untitled_par_continues_previous_heading() {
        let doc = parse(&["@par Title:", "Body one.", "", "@par", "Body two."]).doc;
        assert_eq!(
            doc.admonitions,
            vec![Admonition {
                kind: AdmonitionKind::Par,
                title: Some("Title:".to_string()),
                body: vec![para("Body one."), para("Body two.")],
            }]
        );
    }

    #[test]
    fn auto_brief_takes_first_sentence() {
        let doc = parse(&["First sentence. Second sentence.", "", "More."]).doc;
        assert_eq!(doc.brief, Some(para("First sentence.")));
        assert_eq!(doc.detail, vec![para("Second sentence."), para("More.")]);
    }

    #[test]
    fn auto_brief_can_take_whole_paragraph() {
        let options = Options {
            brief: BriefMode::FirstParagraph,
            ..Options::default()
        };
        let doc = parse_with(&["First sentence. Second sentence.", "", "More."], &options).doc;
        assert_eq!(doc.brief, Some(para("First sentence. Second sentence.")));
        assert_eq!(doc.detail, vec![para("More.")]);
    }

    #[test]
    fn group_directives_in_order() {
        let parsed = parse(&["@defgroup X Title @{ @file"]);
        assert!(parsed.doc.is_empty());
        assert_eq!(
            parsed.directives,
            vec![
                Directive::DefGroup {
                    name: "X".to_string(),
                    title: "Title".to_string()
                },
                Directive::ScopeOpen,
                Directive::File,
            ]
        );
        assert!(parsed.documents_group());
        assert!(parsed.documents_file());
    }

    #[test]
    fn weakgroup_adds_to_group() {
        let parsed = parse(&["@weakgroup X", "@ingroup A B"]);
        assert_eq!(
            parsed.directives,
            vec![
                Directive::AddToGroup {
                    name: "X".to_string(),
                    title: String::new()
                },
                Directive::InGroup(vec!["A".to_string(), "B".to_string()]),
            ]
        );
        assert_eq!(parsed.ingroups(), ["A", "B"]);
    }

    #[test]
    fn block_diagnostics_are_kept() {
        let parsed = parse(&["Text", "@verbatim", "raw"]);
        assert_eq!(
            parsed.diagnostics,
            vec![
                Diagnostic::new(DiagnosticKind::UnterminatedFence {
                    fence: "verbatim".to_string()
                })
                .at_line(3)
            ]
        );
    }

    #[test]
    fn control_characters_fail_the_comment() {
        let comment = NormalizedComment {
            lines: vec!["bell \u{7}".to_string()],
            trailing: false,
        };
        assert!(parse_comment(&comment, &Options::default()).is_err());
    }
}
