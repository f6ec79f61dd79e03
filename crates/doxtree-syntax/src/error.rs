use thiserror::Error;

/// Input that cannot be classified into any line token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("line {line}: unrecognized control character {found:?}")]
    UnrecognizedLine { line: usize, found: char },
}
