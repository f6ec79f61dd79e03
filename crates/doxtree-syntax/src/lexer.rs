//! # Inline lexer
//!
//! Breaks paragraph text into tokens with [Logos]. The lexer is lossless:
//! every byte of the input lands in exactly one token, so concatenating the
//! token texts reproduces the input.
//!
//! ```
//! use doxtree_syntax::lexer::lex;
//!
//! let input = "Use @c foo or <b>bold</b>\n";
//! let reconstructed: String = lex(input).iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! Tokens are context-free. Whether `*` opens emphasis, or whether `<b>`
//! has a matching close tag, is decided by the inline parser.
//!
//! [Logos]: https://docs.rs/logos

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineKind {
    /// Horizontal whitespace
    #[regex(r"[ \t]+")]
    Whitespace,

    /// Line ending inside a paragraph (a soft break)
    #[regex(r"\r?\n")]
    Newline,

    /// `@@`, `\@`, `\\`, `\<` and friends: a literal second character
    #[regex(r#"[@\\][@\\&$#<>%.|"~:]"#)]
    Escape,

    /// Inline formula delimiter `@f$`
    #[regex(r"[@\\]f\$")]
    FormulaDelim,

    /// `@word` or `\word`
    #[regex(r"[@\\][A-Za-z_][A-Za-z0-9_]*")]
    Command,

    /// `<tag attr="x">`, `</tag>` or `<br/>`
    #[regex(r"</?[A-Za-z][A-Za-z0-9]*(\s+[^<>]*)?/?>")]
    HtmlTag,

    #[token("`")]
    Backtick,

    #[token("**")]
    DoubleStar,

    #[token("*")]
    Star,

    #[token("~~")]
    DoubleTilde,

    #[token("\"")]
    Quote,

    /// Runs of ordinary characters
    #[regex(r#"[^\s@\\<`*~"]+"#)]
    Text,

    /// A lone `@`, `\`, `<` or `~` that starts nothing
    #[regex(r"[@\\<~]")]
    Punct,
}

/// A lexed inline token with its kind and text slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineToken<'a> {
    pub kind: InlineKind,
    pub text: &'a str,
}

/// Lex `input` into inline tokens.
///
/// Unrecognized input becomes [`InlineKind::Text`].
pub fn lex(input: &str) -> Vec<InlineToken<'_>> {
    let mut tokens = Vec::new();
    let mut lexer = InlineKind::lexer(input);

    while let Some(result) = lexer.next() {
        let kind = result.unwrap_or(InlineKind::Text);
        tokens.push(InlineToken {
            kind,
            text: lexer.slice(),
        });
    }

    tokens
}
