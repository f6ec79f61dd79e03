/// Regions whose body is captured verbatim until a matching end tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FenceKind {
    Code,
    Dot,
    Msc,
    HtmlOnly,
    XmlOnly,
    Verbatim,
    Formula,
}

pub struct Fence;

impl Fence {
    /// Opening command name (without the `@`/`\` prefix) to fence kind.
    pub fn open(name: &str) -> Option<FenceKind> {
        Some(match name {
            "code" => FenceKind::Code,
            "dot" => FenceKind::Dot,
            "msc" => FenceKind::Msc,
            "htmlonly" => FenceKind::HtmlOnly,
            "xmlonly" => FenceKind::XmlOnly,
            "verbatim" => FenceKind::Verbatim,
            "f[" => FenceKind::Formula,
            _ => return None,
        })
    }

    /// The command name that closes `kind`.
    pub fn end_name(kind: FenceKind) -> &'static str {
        match kind {
            FenceKind::Code => "endcode",
            FenceKind::Dot => "enddot",
            FenceKind::Msc => "endmsc",
            FenceKind::HtmlOnly => "endhtmlonly",
            FenceKind::XmlOnly => "endxmlonly",
            FenceKind::Verbatim => "endverbatim",
            FenceKind::Formula => "f]",
        }
    }

    pub fn name(kind: FenceKind) -> &'static str {
        match kind {
            FenceKind::Code => "code",
            FenceKind::Dot => "dot",
            FenceKind::Msc => "msc",
            FenceKind::HtmlOnly => "htmlonly",
            FenceKind::XmlOnly => "xmlonly",
            FenceKind::Verbatim => "verbatim",
            FenceKind::Formula => "f[",
        }
    }

    /// Finds the end tag of `kind` in `line`, returning `(tag_start, tag_end)`.
    pub fn find_close(kind: FenceKind, line: &str) -> Option<(usize, usize)> {
        let end = Self::end_name(kind);
        let bytes = line.as_bytes();
        let mut from = 0;
        while let Some(off) = line[from..].find(end) {
            let at = from + off;
            let after = at + end.len();
            let prefixed = at > 0 && matches!(bytes[at - 1], b'@' | b'\\');
            let bounded = !end.as_bytes()[end.len() - 1].is_ascii_alphabetic()
                || bytes.get(after).is_none_or(|b| !b.is_ascii_alphanumeric());
            if prefixed && bounded {
                return Some((at - 1, after));
            }
            from = after;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_known_fences() {
        assert_eq!(Fence::open("code"), Some(FenceKind::Code));
        assert_eq!(Fence::open("f["), Some(FenceKind::Formula));
        assert_eq!(Fence::open("param"), None);
    }

    #[test]
    fn find_close_with_either_prefix() {
        assert_eq!(Fence::find_close(FenceKind::Code, "@endcode"), Some((0, 8)));
        assert_eq!(Fence::find_close(FenceKind::Dot, "  \\enddot"), Some((2, 9)));
    }

    #[test]
    fn find_close_ignores_mismatched_kind() {
        assert_eq!(Fence::find_close(FenceKind::Code, "@enddot"), None);
    }

    #[test]
    fn find_close_requires_word_boundary() {
        assert_eq!(Fence::find_close(FenceKind::Code, "@endcodes"), None);
        assert_eq!(Fence::find_close(FenceKind::Code, "endcode"), None);
    }

    #[test]
    fn find_close_formula() {
        assert_eq!(Fence::find_close(FenceKind::Formula, "x^2 \\f]"), Some((4, 7)));
    }
}
