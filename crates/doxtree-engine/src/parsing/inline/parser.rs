use doxtree_syntax::{InlineKind, InlineToken, lex};

use crate::model::{MarkupNode, RefState};

use super::kinds::{AutoLink, HtmlTag, Style};

/// Parses paragraph text into inline nodes.
///
/// Whitespace runs and soft line breaks collapse to one space, and the
/// result is trimmed. Constructs without a closing delimiter stay literal.
pub fn parse_inline(text: &str) -> Vec<MarkupNode> {
    let mut parser = Parser {
        tokens: lex(text),
        pos: 0,
        open: vec![],
    };
    let mut nodes = parser.parse_until(&Stop::Eof).nodes;
    trim_edges(&mut nodes);
    nodes
}

/// What ends the current nesting level.
#[derive(Clone)]
enum Stop {
    Eof,
    /// A closing HTML tag with this name.
    Html(String),
    /// A closing markdown delimiter of this kind.
    Delim(InlineKind),
}

struct Parser<'a> {
    tokens: Vec<InlineToken<'a>>,
    /// Index of the next unread token.
    pos: usize,
    /// Stops of the levels being parsed, innermost last.
    open: Vec<Stop>,
}

/// Nodes of one nesting level. `closed` is false when the level ended
/// without its own closer.
struct Level {
    nodes: Vec<MarkupNode>,
    closed: bool,
}

/// What a tag does to the current level.
enum Flow {
    Continue,
    Close,
    /// The tag closes an enclosing level; it is left unread.
    Unwind,
}

/// Output of one nesting level, merging adjacent text.
#[derive(Default)]
struct Out {
    nodes: Vec<MarkupNode>,
    text: String,
}

impl Out {
    fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    fn space(&mut self) {
        if self.text.is_empty() && self.nodes.is_empty() {
            return;
        }
        if !self.text.ends_with(' ') {
            self.text.push(' ');
        }
    }

    fn node(&mut self, node: MarkupNode) {
        self.flush();
        self.nodes.push(node);
    }

    fn flush(&mut self) {
        if !self.text.is_empty() {
            self.nodes
                .push(MarkupNode::Text(std::mem::take(&mut self.text)));
        }
    }

    fn finish(mut self) -> Vec<MarkupNode> {
        self.flush();
        self.nodes
    }

    fn level(self, closed: bool) -> Level {
        Level {
            nodes: self.finish(),
            closed,
        }
    }

    /// Wraps a closed level with `wrap`, or puts an unclosed one back as
    /// its opener followed by its content.
    fn span(
        &mut self,
        opener: &str,
        level: Level,
        wrap: impl FnOnce(Vec<MarkupNode>) -> MarkupNode,
    ) {
        if level.closed {
            self.node(wrap(level.nodes));
            return;
        }
        self.push_str(opener);
        for node in level.nodes {
            match node {
                MarkupNode::Text(t) => self.push_str(&t),
                other => self.node(other),
            }
        }
    }
}

fn is_space(kind: InlineKind) -> bool {
    matches!(kind, InlineKind::Whitespace | InlineKind::Newline)
}

fn decode(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}

/// Splits sentence punctuation off a word, keeping a `()` suffix.
fn split_trailing(word: &str) -> (&str, &str) {
    let mut end = word.len();
    while end > 0 {
        let head = &word[..end];
        if head.ends_with("()") {
            break;
        }
        match head.chars().last() {
            Some(c) if AutoLink::TRAILING.contains(&c) => end -= c.len_utf8(),
            _ => break,
        }
    }
    word.split_at(end)
}

fn trim_edges(nodes: &mut Vec<MarkupNode>) {
    if let Some(MarkupNode::Text(t)) = nodes.first_mut() {
        *t = t.trim_start().to_string();
    }
    if let Some(MarkupNode::Text(t)) = nodes.last_mut() {
        *t = t.trim_end().to_string();
    }
    nodes.retain(|n| !matches!(n, MarkupNode::Text(t) if t.is_empty()));
}

impl<'a> Parser<'a> {
    fn next(&mut self) -> Option<InlineToken<'a>> {
        let tok = self.tokens.get(self.pos).copied()?;
        self.pos += 1;
        Some(tok)
    }

    fn peek_kind(&self, offset: usize) -> Option<InlineKind> {
        self.tokens.get(self.pos + offset).map(|t| t.kind)
    }

    /// Index of the first unread token matching `pred`.
    fn find(&self, pred: impl Fn(&InlineToken<'a>) -> bool) -> Option<usize> {
        (self.pos..self.tokens.len()).find(|&i| pred(&self.tokens[i]))
    }

    fn find_close_tag(&self, name: &str) -> Option<usize> {
        self.find(|t| {
            t.kind == InlineKind::HtmlTag && HtmlTag::parse(t.text).is_some_and(|tag| tag.closes(name))
        })
    }

    fn concat(&self, from: usize, to: usize) -> String {
        self.tokens[from..to].iter().map(|t| t.text).collect()
    }

    /// Whether the delimiter just read can open a span of `kind`.
    fn opens_delim(&self, kind: InlineKind) -> bool {
        if self.peek_kind(0).is_none_or(is_space) {
            return false;
        }
        (self.pos + 1..self.tokens.len())
            .any(|j| self.tokens[j].kind == kind && !is_space(self.tokens[j - 1].kind))
    }

    /// Whether the delimiter just read closes a span.
    fn closes_delim(&self) -> bool {
        self.pos >= 2 && !is_space(self.tokens[self.pos - 2].kind)
    }

    fn parse_until(&mut self, stop: &Stop) -> Level {
        self.open.push(stop.clone());
        let level = self.parse_level(stop);
        self.open.pop();
        level
    }

    /// Whether a closing `name` tag belongs to a level outside the current one.
    fn closes_outer(&self, name: &str) -> bool {
        let outer = &self.open[..self.open.len().saturating_sub(1)];
        outer.iter().any(|s| matches!(s, Stop::Html(n) if n == name))
    }

    fn parse_level(&mut self, stop: &Stop) -> Level {
        let mut out = Out::default();

        while let Some(tok) = self.next() {
            match tok.kind {
                InlineKind::Whitespace | InlineKind::Newline => out.space(),
                InlineKind::Escape => out.push_str(&tok.text[1..]),
                InlineKind::Text => self.text(&mut out, tok.text),
                InlineKind::Quote | InlineKind::Punct => out.push_str(tok.text),
                InlineKind::FormulaDelim => {
                    match self.find(|t| t.kind == InlineKind::FormulaDelim) {
                        Some(end) => {
                            let latex = self.concat(self.pos, end).trim().to_string();
                            self.pos = end + 1;
                            out.node(MarkupNode::Formula {
                                latex,
                                display: false,
                            });
                        }
                        None => out.push_str(tok.text),
                    }
                }
                InlineKind::Backtick => match self.find(|t| t.kind == InlineKind::Backtick) {
                    Some(end) => {
                        let code = self.concat(self.pos, end).replace('\n', " ");
                        self.pos = end + 1;
                        out.node(MarkupNode::CodeSpan(code));
                    }
                    None => out.push_str(tok.text),
                },
                InlineKind::DoubleStar | InlineKind::Star | InlineKind::DoubleTilde => {
                    if let Stop::Delim(kind) = stop
                        && *kind == tok.kind
                        && self.closes_delim()
                    {
                        return out.level(true);
                    }
                    if self.opens_delim(tok.kind) {
                        let body = self.parse_until(&Stop::Delim(tok.kind));
                        let style = match tok.kind {
                            InlineKind::DoubleStar => Style::Strong,
                            InlineKind::Star => Style::Emphasis,
                            _ => Style::Strikethrough,
                        };
                        out.span(tok.text, body, |nodes| style.wrap(nodes));
                    } else {
                        out.push_str(tok.text);
                    }
                }
                InlineKind::HtmlTag => match self.html(&mut out, tok.text, stop) {
                    Flow::Continue => {}
                    Flow::Close => return out.level(true),
                    Flow::Unwind => return out.level(false),
                },
                InlineKind::Command => self.command(&mut out, tok.text),
            }
        }

        out.level(false)
    }

    fn text(&mut self, out: &mut Out, text: &str) {
        let mut last = 0;
        for m in AutoLink::regex().find_iter(text) {
            let (url, _) = split_trailing(m.as_str());
            out.push_str(&decode(&text[last..m.start()]));
            out.node(MarkupNode::Link {
                url: url.to_string(),
                body: vec![MarkupNode::text(url)],
            });
            last = m.start() + url.len();
        }
        out.push_str(&decode(&text[last..]));
    }

    fn html(&mut self, out: &mut Out, raw: &str, stop: &Stop) -> Flow {
        let Some(tag) = HtmlTag::parse(raw) else {
            out.push_str(raw);
            return Flow::Continue;
        };
        if tag.closing {
            if let Stop::Html(name) = stop
                && tag.name == *name
            {
                return Flow::Close;
            }
            if self.closes_outer(&tag.name) {
                self.pos -= 1;
                return Flow::Unwind;
            }
            out.push_str(raw);
            return Flow::Continue;
        }

        match tag.name.as_str() {
            "br" => out.node(MarkupNode::HardBreak),
            "code" | "tt" => match self.find_close_tag(&tag.name) {
                Some(end) => {
                    let code = decode(&self.concat(self.pos, end).replace('\n', " "));
                    self.pos = end + 1;
                    out.node(MarkupNode::CodeSpan(code));
                }
                None => out.push_str(raw),
            },
            "a" => {
                if let Some(url) = tag.attr("href")
                    && self.find_close_tag("a").is_some()
                {
                    let body = self.parse_until(&Stop::Html("a".to_string()));
                    out.span(raw, body, |body| MarkupNode::Link { url, body });
                } else if let Some(name) = tag.attr("name").or_else(|| tag.attr("id")) {
                    out.node(MarkupNode::Anchor { name });
                    if self
                        .tokens
                        .get(self.pos)
                        .and_then(|t| HtmlTag::parse(t.text))
                        .is_some_and(|t| t.closes("a"))
                    {
                        self.pos += 1;
                    }
                } else {
                    out.push_str(raw);
                }
            }
            name => match Style::for_tag(name) {
                Some(style) if self.find_close_tag(name).is_some() => {
                    let body = self.parse_until(&Stop::Html(name.to_string()));
                    out.span(raw, body, |nodes| style.wrap(nodes));
                }
                _ => out.push_str(raw),
            },
        }
        Flow::Continue
    }

    /// Reads the next whitespace-delimited word, skipping leading spaces.
    fn word(&mut self) -> Option<String> {
        let save = self.pos;
        while self.peek_kind(0).is_some_and(is_space) {
            self.pos += 1;
        }
        let start = self.pos;
        while self.peek_kind(0).is_some_and(|k| !is_space(k)) {
            self.pos += 1;
        }
        if start == self.pos {
            self.pos = save;
            return None;
        }
        Some(self.concat(start, self.pos))
    }

    /// Reads a word and splits off trailing sentence punctuation.
    fn target(&mut self) -> Option<(String, String)> {
        let save = self.pos;
        let word = self.word()?;
        let (core, rest) = split_trailing(&word);
        if core.is_empty() {
            self.pos = save;
            return None;
        }
        Some((core.to_string(), rest.to_string()))
    }

    /// `"quoted display text"` following a reference target.
    fn display_text(&mut self) -> Option<String> {
        if self.peek_kind(0) != Some(InlineKind::Whitespace)
            || self.peek_kind(1) != Some(InlineKind::Quote)
        {
            return None;
        }
        let open = self.pos + 1;
        let close = (open + 1..self.tokens.len()).find(|&i| self.tokens[i].kind == InlineKind::Quote)?;
        let text = self.concat(open + 1, close);
        self.pos = close + 1;
        Some(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    fn command(&mut self, out: &mut Out, raw: &str) {
        let name = &raw[1..];
        match name {
            "n" => out.node(MarkupNode::HardBreak),
            "c" | "p" | "e" | "em" | "a" | "b" => match self.target() {
                Some((word, rest)) => {
                    let node = match name {
                        "c" | "p" => MarkupNode::CodeSpan(word),
                        "b" => MarkupNode::Strong(vec![MarkupNode::Text(word)]),
                        _ => MarkupNode::Emphasis(vec![MarkupNode::Text(word)]),
                    };
                    out.node(node);
                    out.push_str(&rest);
                }
                None => out.push_str(raw),
            },
            "ref" | "link" => match self.target() {
                Some((target_text, rest)) => {
                    let display_text = if rest.is_empty() {
                        self.display_text()
                    } else {
                        None
                    };
                    out.node(MarkupNode::CrossRef {
                        target_text,
                        display_text,
                        resolved: RefState::Pending,
                    });
                    out.push_str(&rest);
                }
                None => out.push_str(raw),
            },
            "copydoc" => match self.target() {
                Some((target_text, rest)) => {
                    out.node(MarkupNode::CopyDoc {
                        target_text,
                        resolved: RefState::Pending,
                        content: None,
                    });
                    out.push_str(&rest);
                }
                None => out.push_str(raw),
            },
            "anchor" => match self.word() {
                Some(name) => out.node(MarkupNode::Anchor { name }),
                None => out.push_str(raw),
            },
            "emoji" => match self.word() {
                Some(word) => out.node(MarkupNode::Emoji {
                    name: word.trim_matches(':').to_string(),
                }),
                None => out.push_str(raw),
            },
            _ => {
                log::debug!("keeping unknown inline command {raw} as text");
                out.push_str(raw);
            }
        }
    }
}
