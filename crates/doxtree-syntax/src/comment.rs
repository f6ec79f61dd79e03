//! Comment leader stripping.
//!
//! The external declaration parser hands over comments exactly as they
//! appear in the source. This module turns them into plain, dedented lines.

/// A documentation comment with its leaders removed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedComment {
    pub lines: Vec<String>,
    /// Written as a trailing member comment (`///<`, `/**<`).
    pub trailing: bool,
}

impl NormalizedComment {
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }
}

const TRAILING_OPENERS: [&str; 4] = ["/**<", "/*!<", "///<", "//!<"];
const BLOCK_OPENERS: [&str; 2] = ["/**", "/*!"];
const LINE_OPENERS: [&str; 3] = ["///", "//!", "//"];

/// Strips comment markers and common indentation from `raw`.
pub fn normalize(raw: &str, tab_width: usize) -> NormalizedComment {
    let mut trailing = false;
    let mut in_block = false;
    let mut lines = vec![];

    for line in raw.lines() {
        let mut rest = line.trim_start();

        if let Some(opener) = TRAILING_OPENERS.iter().find(|o| rest.starts_with(**o)) {
            trailing = true;
            in_block = opener.starts_with("/*");
            rest = &rest[opener.len()..];
        } else if let Some(opener) = BLOCK_OPENERS.iter().find(|o| rest.starts_with(**o)) {
            in_block = true;
            rest = &rest[opener.len()..];
        } else if rest.starts_with("/*") {
            in_block = true;
            rest = &rest[2..];
        } else if let Some(opener) = LINE_OPENERS.iter().find(|o| rest.starts_with(**o)) {
            rest = &rest[opener.len()..];
        } else if in_block && rest.starts_with('*') && !rest.starts_with("*/") {
            // ` * ` decoration, but keep `**bold**` intact
            if !rest[1..].starts_with('*') {
                rest = &rest[1..];
            }
        }

        if in_block && let Some(body) = rest.trim_end().strip_suffix("*/") {
            rest = body;
            in_block = false;
        }

        lines.push(expand_tabs(rest.trim_end(), tab_width));
    }

    dedent(&mut lines);

    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    NormalizedComment { lines, trailing }
}

fn expand_tabs(s: &str, tab_width: usize) -> String {
    let width = tab_width.max(1);
    let mut out = String::with_capacity(s.len());
    let mut col = 0;
    for ch in s.chars() {
        if ch == '\t' {
            let pad = width - (col % width);
            out.extend(std::iter::repeat_n(' ', pad));
            col += pad;
        } else if ch != '\r' {
            out.push(ch);
            col += 1;
        }
    }
    out
}

fn dedent(lines: &mut [String]) {
    let common = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);

    for line in lines.iter_mut() {
        if line.trim().is_empty() {
            line.clear();
        } else {
            line.drain(..common);
        }
    }
}
