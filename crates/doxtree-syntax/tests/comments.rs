use doxtree_syntax::{FenceKind, InlineKind, TokenKind, Tokenizer, lex, normalize};
use pretty_assertions::assert_eq;

#[test]
fn decorated_comment_to_line_tokens() {
    let raw = "/**\n * @brief Adds two numbers.\n *\n * @param a first\n * @code\n *   a + b\n * @endcode\n */";
    let comment = normalize(raw, 4);
    assert!(!comment.trailing);

    let kinds: Vec<TokenKind> = Tokenizer::new(comment.lines)
        .unwrap()
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Command {
                name: "brief".to_string(),
                args: "Adds two numbers.".to_string()
            },
            TokenKind::BlankLine,
            TokenKind::Command {
                name: "param".to_string(),
                args: "a first".to_string()
            },
            TokenKind::FenceStart {
                kind: FenceKind::Code,
                arg: None
            },
            TokenKind::RawLine("  a + b".to_string()),
            TokenKind::FenceEnd {
                kind: FenceKind::Code,
                implicit: false
            },
        ]
    );
}

#[test]
fn trailing_member_comment_keeps_inline_markup() {
    let comment = normalize("///< Value of @c one, see @ref X::two", 4);
    assert!(comment.trailing);

    let tokens = Tokenizer::new(comment.lines.clone()).unwrap().count();
    assert_eq!(tokens, 1);

    let commands: Vec<&str> = lex(&comment.lines[0])
        .into_iter()
        .filter(|t| t.kind == InlineKind::Command)
        .map(|t| t.text)
        .collect();
    assert_eq!(commands, ["@c", "@ref"]);
}

#[test]
fn control_character_rejects_comment() {
    let comment = normalize("/** ring \u{7} */", 4);
    let err = Tokenizer::new(comment.lines).err().unwrap();
    assert_eq!(err.to_string(), "line 0: unrecognized control character '\\u{7}'");
}

fn describe(token: &doxtree_syntax::Token) -> String {
    let kind = match &token.kind {
        TokenKind::Command { name, .. } => format!("command {name}"),
        TokenKind::FenceStart { .. } => "fence start".to_string(),
        TokenKind::RawLine(text) => format!("raw {text}"),
        TokenKind::FenceEnd { implicit, .. } => format!("fence end implicit={implicit}"),
        TokenKind::ListMarker { text, .. } => format!("item {text}"),
        TokenKind::TableRow { .. } => "table row".to_string(),
        TokenKind::TableSeparator { .. } => "table separator".to_string(),
        TokenKind::QuoteMarker { .. } => "quote".to_string(),
        TokenKind::BlankLine => "blank".to_string(),
        TokenKind::TextRun { text, .. } => format!("text {text}"),
    };
    format!("{} {kind}", token.line)
}

#[test]
fn group_header_with_open_fence() {
    let comment = normalize("/**\n * @defgroup X Title @{ @file\n * - one\n * @code\n * x\n */", 4);
    let lines: Vec<String> = Tokenizer::new(comment.lines)
        .unwrap()
        .map(|t| describe(&t))
        .collect();

    insta::assert_snapshot!(lines.join("\n"), @r"
0 command defgroup
0 command {
0 command file
1 item one
2 fence start
3 raw x
4 fence end implicit=true
");
}
