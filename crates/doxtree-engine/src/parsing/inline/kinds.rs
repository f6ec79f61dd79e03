//! Inline constructs that own their delimiters.

use std::sync::OnceLock;

use doxtree_syntax::Cursor;
use regex::Regex;

use crate::model::MarkupNode;

/// An HTML tag as lexed by the inline lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlTag<'a> {
    /// Lowercased tag name.
    pub name: String,
    pub closing: bool,
    attrs: &'a str,
}

impl<'a> HtmlTag<'a> {
    pub const OPEN: u8 = b'<';
    pub const CLOSE: u8 = b'>';

    pub fn parse(text: &'a str) -> Option<Self> {
        let inner = text.strip_prefix('<')?.strip_suffix('>')?;
        let inner = inner.strip_suffix('/').unwrap_or(inner);
        let (closing, inner) = match inner.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, inner),
        };
        let mut cur = Cursor::new(inner);
        let name = cur.eat_while(|b| b.is_ascii_alphanumeric());
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_ascii_lowercase(),
            closing,
            attrs: cur.rest(),
        })
    }

    /// Value of attribute `key`, quoted or bare.
    pub fn attr(&self, key: &str) -> Option<String> {
        static ATTR: OnceLock<Regex> = OnceLock::new();
        let re = ATTR.get_or_init(|| {
            Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
                .expect("Invalid attribute regex")
        });
        re.captures_iter(self.attrs)
            .find(|c| c[1].eq_ignore_ascii_case(key))
            .and_then(|c| c.get(2).or(c.get(3)).or(c.get(4)))
            .map(|m| m.as_str().to_string())
    }

    pub fn closes(&self, name: &str) -> bool {
        self.closing && self.name == name
    }
}

/// Formatting wrappers reachable from HTML tags, commands and markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Emphasis,
    Strong,
    Strikethrough,
    Underline,
    Subscript,
    Superscript,
    Small,
    Center,
}

impl Style {
    pub fn for_tag(name: &str) -> Option<Self> {
        Some(match name {
            "i" | "em" => Style::Emphasis,
            "b" | "strong" => Style::Strong,
            "s" | "strike" | "del" => Style::Strikethrough,
            "u" => Style::Underline,
            "sub" => Style::Subscript,
            "sup" => Style::Superscript,
            "small" => Style::Small,
            "center" => Style::Center,
            _ => return None,
        })
    }

    pub fn wrap(self, body: Vec<MarkupNode>) -> MarkupNode {
        match self {
            Style::Emphasis => MarkupNode::Emphasis(body),
            Style::Strong => MarkupNode::Strong(body),
            Style::Strikethrough => MarkupNode::Strikethrough(body),
            Style::Underline => MarkupNode::Underline(body),
            Style::Subscript => MarkupNode::Subscript(body),
            Style::Superscript => MarkupNode::Superscript(body),
            Style::Small => MarkupNode::Small(body),
            Style::Center => MarkupNode::Center(body),
        }
    }
}

/// Bare `http(s)://` links in running text.
pub struct AutoLink;

impl AutoLink {
    pub fn regex() -> &'static Regex {
        static URL: OnceLock<Regex> = OnceLock::new();
        URL.get_or_init(|| Regex::new(r"https?://[^\s<>\[\]]+").expect("Invalid URL regex"))
    }

    /// Characters that end a sentence rather than a URL or symbol name.
    pub const TRAILING: &'static [char] = &['.', ',', ';', ':', '!', '?', ')'];
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_open_tag_with_attrs() {
        let tag = HtmlTag::parse(r#"<A HREF="https://example.com">"#).unwrap();
        assert_eq!(tag.name, "a");
        assert!(!tag.closing);
        assert_eq!(tag.attr("href").as_deref(), Some("https://example.com"));
    }

    #[test]
    fn parse_closing_and_self_closing() {
        assert!(HtmlTag::parse("</em>").unwrap().closes("em"));
        let br = HtmlTag::parse("<br/>").unwrap();
        assert_eq!(br.name, "br");
        assert!(!br.closing);
    }

    #[test]
    fn bare_attribute_values() {
        let tag = HtmlTag::parse("<a name=top>").unwrap();
        assert_eq!(tag.attr("name").as_deref(), Some("top"));
        assert_eq!(tag.attr("href"), None);
    }

    #[test]
    fn style_table() {
        assert_eq!(Style::for_tag("strong"), Some(Style::Strong));
        assert_eq!(Style::for_tag("del"), Some(Style::Strikethrough));
        assert_eq!(Style::for_tag("p"), None);
    }
}
