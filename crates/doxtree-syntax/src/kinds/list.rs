use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarkerKind {
    /// `-`, `*`, `+`, `@li`, `@arg`
    Bullet,
    /// `1.` carries its ordinal, `-#` does not.
    Numbered(Option<u32>),
}

impl ListMarkerKind {
    pub fn is_ordered(self) -> bool {
        matches!(self, ListMarkerKind::Numbered(_))
    }
}

pub struct ListMarker;

impl ListMarker {
    /// Recognizes a list item line, returning `(kind, indent, text)`.
    pub fn sig(line: &str) -> Option<(ListMarkerKind, usize, &str)> {
        static MARKER: OnceLock<Regex> = OnceLock::new();
        let marker_regex = MARKER.get_or_init(|| {
            Regex::new(r"^( *)([-*+]|-#|(\d{1,9})[.)])(?: +(.*))?$")
                .expect("Invalid list marker regex")
        });

        let caps = marker_regex.captures(line)?;
        let indent = caps.get(1).map_or(0, |m| m.len());
        let marker = caps.get(2)?.as_str();
        let text = caps.get(4).map_or("", |m| m.as_str());
        // A bare marker with nothing after it is only a list item for numbers
        if caps.get(4).is_none() && !marker.ends_with(['.', ')']) {
            return None;
        }
        let kind = if marker == "-#" {
            ListMarkerKind::Numbered(None)
        } else if let Some(num) = caps.get(3) {
            ListMarkerKind::Numbered(num.as_str().parse().ok())
        } else {
            ListMarkerKind::Bullet
        };
        Some((kind, indent, text))
    }
}
