use std::collections::VecDeque;

use crate::{
    cursor::Cursor,
    error::SyntaxError,
    kinds::{BlockQuote, Command, Fence, FenceKind, ListMarker, ListMarkerKind, TableSyntax},
    token::{Token, TokenKind},
};

/// Lazy line tokenizer over a normalized comment.
///
/// Tokens are produced on demand; [`Tokenizer::restart`] rewinds to the
/// first line so the same comment can be walked again.
pub struct Tokenizer {
    lines: Vec<String>,
    next_line: usize,
    fence: Option<FenceKind>,
    pending: VecDeque<Token>,
}

/// A slice of one line, either leading text or a block command.
enum Segment<'a> {
    Text(&'a str),
    Command {
        name: &'a str,
        /// Text after the command name.
        rest: &'a str,
        column: usize,
        raw: &'a str,
    },
}

impl Tokenizer {
    /// Fails when a line holds characters no line class accepts.
    pub fn new(lines: Vec<String>) -> Result<Self, SyntaxError> {
        for (line, text) in lines.iter().enumerate() {
            if let Some(found) = text.chars().find(|c| c.is_control() && *c != '\t') {
                return Err(SyntaxError::UnrecognizedLine { line, found });
            }
        }
        Ok(Self {
            lines,
            next_line: 0,
            fence: None,
            pending: VecDeque::new(),
        })
    }

    pub fn restart(&mut self) {
        self.next_line = 0;
        self.fence = None;
        self.pending.clear();
    }

    fn emit(&mut self, line: usize, kind: TokenKind, raw: &str) {
        self.pending.push_back(Token::new(line, kind, raw));
    }

    fn tokenize_line(&mut self, idx: usize, line: &str) {
        if let Some(kind) = self.fence {
            self.fence_line(idx, line, kind);
        } else if line.trim().is_empty() {
            self.emit(idx, TokenKind::BlankLine, line);
        } else {
            self.structural_line(idx, line);
        }
    }

    fn fence_line(&mut self, idx: usize, line: &str, kind: FenceKind) {
        let Some((start, end)) = Fence::find_close(kind, line) else {
            self.emit(idx, TokenKind::RawLine(line.to_string()), line);
            return;
        };

        let body = line[..start].trim_end();
        if !body.trim().is_empty() {
            self.emit(idx, TokenKind::RawLine(body.to_string()), body);
        }
        self.emit(
            idx,
            TokenKind::FenceEnd {
                kind,
                implicit: false,
            },
            &line[start..end],
        );
        self.fence = None;

        let rest = line[end..].trim_start();
        if !rest.is_empty() {
            self.structural_line(idx, rest);
        }
    }

    fn structural_line(&mut self, idx: usize, line: &str) {
        for segment in split_segments(line) {
            match segment {
                Segment::Text(text) => {
                    if !text.trim().is_empty() {
                        let kind = classify_text(text);
                        self.emit(idx, kind, text);
                    }
                }
                Segment::Command {
                    name,
                    rest,
                    column,
                    raw,
                } => self.command_segment(idx, name, rest, column, raw),
            }
        }
    }

    fn command_segment(&mut self, idx: usize, name: &str, rest: &str, column: usize, raw: &str) {
        if let Some(kind) = Fence::open(name) {
            let (arg, body) = fence_arg(kind, rest);
            self.emit(idx, TokenKind::FenceStart { kind, arg }, raw);
            self.fence = Some(kind);
            if !body.trim().is_empty() {
                self.fence_line(idx, body.trim_start(), kind);
            }
            return;
        }

        let kind = match name {
            "li" | "arg" => TokenKind::ListMarker {
                marker: ListMarkerKind::Bullet,
                indent: column,
                text: rest.trim().to_string(),
            },
            _ => TokenKind::Command {
                name: name.to_string(),
                args: rest.trim().to_string(),
            },
        };
        self.emit(idx, kind, raw);
    }
}

impl Iterator for Tokenizer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }
            if self.next_line >= self.lines.len() {
                // Unterminated fence: close it at end of comment
                let kind = self.fence.take()?;
                return Some(Token::new(
                    self.lines.len(),
                    TokenKind::FenceEnd {
                        kind,
                        implicit: true,
                    },
                    "",
                ));
            }
            let idx = self.next_line;
            self.next_line += 1;
            let line = std::mem::take(&mut self.lines[idx]);
            self.tokenize_line(idx, &line);
            self.lines[idx] = line;
        }
    }
}

/// Splits a line at every block command outside backtick spans.
///
/// A fence opener swallows the rest of the line.
fn split_segments(line: &str) -> Vec<Segment<'_>> {
    let mut out = vec![];
    let mut cur = Cursor::new(line);
    let mut seg_start = 0;
    let mut seg_cmd: Option<&str> = None;
    let mut in_code = false;

    while let Some(b) = cur.peek() {
        if b == b'`' {
            in_code = !in_code;
            cur.bump();
            continue;
        }
        let at_word_start = cur.prev().is_none_or(|p| p == b' ');
        if !in_code
            && at_word_start
            && Command::is_prefix(b)
            && let Some(name) = Command::name_at(&cur.rest()[1..])
            && (Command::is_block(name) || Fence::open(name).is_some())
        {
            out.push(segment(line, seg_start, cur.pos(), seg_cmd));
            seg_start = cur.pos();
            seg_cmd = Some(name);
            if Fence::open(name).is_some() {
                break;
            }
            cur.bump_n(1 + name.len());
            continue;
        }
        cur.bump();
    }
    out.push(segment(line, seg_start, line.len(), seg_cmd));
    out
}

fn segment<'a>(line: &'a str, start: usize, end: usize, cmd: Option<&'a str>) -> Segment<'a> {
    let raw = &line[start..end];
    match cmd {
        None => Segment::Text(raw),
        Some(name) => Segment::Command {
            name,
            rest: &raw[1 + name.len()..],
            column: start,
            raw,
        },
    }
}

fn classify_text(text: &str) -> TokenKind {
    let trimmed = text.trim_start();
    let indent = text.len() - trimmed.len();

    if let Some((indent, rest)) = BlockQuote::strip_prefix(text) {
        return TokenKind::QuoteMarker {
            indent,
            text: rest.to_string(),
        };
    }
    if let Some(alignments) = TableSyntax::separator(text) {
        return TokenKind::TableSeparator { alignments };
    }
    if let Some(cells) = TableSyntax::split_row(text) {
        return TokenKind::TableRow { cells };
    }
    if let Some((marker, indent, item)) = ListMarker::sig(text) {
        return TokenKind::ListMarker {
            marker,
            indent,
            text: item.trim_end().to_string(),
        };
    }
    TokenKind::TextRun {
        indent,
        text: trimmed.trim_end().to_string(),
    }
}

/// Splits a fence opener's argument from the body text on the same line.
///
/// `@code{.c}` carries a language, `@dot "caption"` a caption.
fn fence_arg(kind: FenceKind, rest: &str) -> (Option<String>, &str) {
    match kind {
        FenceKind::Code => {
            if let Some(inner) = rest.strip_prefix('{')
                && let Some(close) = inner.find('}')
            {
                let lang = inner[..close].trim().trim_start_matches('.');
                let lang = (!lang.is_empty()).then(|| lang.to_string());
                return (lang, &inner[close + 1..]);
            }
            (None, rest)
        }
        FenceKind::Dot | FenceKind::Msc => {
            let t = rest.trim_start();
            if let Some(inner) = t.strip_prefix('"')
                && let Some(close) = inner.find('"')
            {
                return (Some(inner[..close].to_string()), &inner[close + 1..]);
            }
            (None, rest)
        }
        _ => (None, rest),
    }
}
