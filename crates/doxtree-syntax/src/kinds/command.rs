/// Command tag syntax: `@name` or `\name`.
pub struct Command;

impl Command {
    pub const PREFIXES: [u8; 2] = [b'@', b'\\'];

    /// Commands that start a new structural segment of a line.
    ///
    /// Everything else (`@c`, `@ref`, `@copydoc`, ...) is inline and stays in
    /// the surrounding text.
    pub const BLOCK: &'static [&'static str] = &[
        "{", "}", "addtogroup", "arg", "attention", "brief", "defgroup", "details", "dotfile",
        "endparblock", "file", "ingroup", "li", "note", "par", "param", "parblock", "result",
        "return", "returns", "retval", "sa", "see", "short", "todo", "tparam", "warning",
        "weakgroup",
    ];

    pub fn is_prefix(b: u8) -> bool {
        Self::PREFIXES.contains(&b)
    }

    pub fn is_block(name: &str) -> bool {
        Self::BLOCK.contains(&name)
    }

    /// Reads a command name at the start of `s` (just past the prefix).
    ///
    /// Names are ASCII words, or one of the punctuation commands `{`, `}`,
    /// `f[`, `f]`, `f$`.
    pub fn name_at(s: &str) -> Option<&str> {
        for punct in ["f[", "f]", "f$"] {
            if s.starts_with(punct) {
                return Some(punct);
            }
        }
        if s.starts_with(['{', '}']) {
            return Some(&s[..1]);
        }
        let len = s
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        if len == 0 || !s.as_bytes()[0].is_ascii_alphabetic() {
            return None;
        }
        Some(&s[..len])
    }
}
