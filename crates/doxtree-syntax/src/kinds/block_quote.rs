/// Block quote line syntax with its owned delimiter.
pub struct BlockQuote;

impl BlockQuote {
    pub const PREFIX: char = '>';

    /// Strips one quote level, returning `(indent, text)`.
    ///
    /// Further `>` markers stay in `text`; nested quotes are handled by
    /// parsing the quote body again.
    pub fn strip_prefix(s: &str) -> Option<(usize, &str)> {
        let trimmed = s.trim_start_matches(' ');
        let indent = s.len() - trimmed.len();
        let rest = trimmed.strip_prefix(Self::PREFIX)?;
        Some((indent, rest.strip_prefix(' ').unwrap_or(rest)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_no_quote() {
        assert_eq!(BlockQuote::strip_prefix("hello"), None);
    }

    #[test]
    fn strip_single_quote() {
        assert_eq!(BlockQuote::strip_prefix("> hello"), Some((0, "hello")));
    }

    #[test]
    fn strip_keeps_nested_marker() {
        assert_eq!(BlockQuote::strip_prefix("  > > hello"), Some((2, "> hello")));
    }

    #[test]
    fn strip_without_space() {
        assert_eq!(BlockQuote::strip_prefix(">>x"), Some((0, ">x")));
    }
}
