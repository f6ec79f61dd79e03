use relative_path::RelativePathBuf;

use super::symbol::SymbolDecl;

/// One input file as delivered by the declaration parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: RelativePathBuf,
    /// Local `#include` targets, relative to the corpus root.
    pub includes: Vec<RelativePathBuf>,
    pub entries: Vec<SourceEntry>,
}

/// A declaration and the comments around it, in file order.
///
/// Comments that stand alone (`/// @}` at the end of a file) arrive with
/// no symbol.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceEntry {
    pub symbol: Option<SymbolDecl>,
    pub preceding: Option<String>,
    pub trailing: Option<String>,
    pub line: usize,
}

impl SourceFile {
    pub fn new(path: impl Into<RelativePathBuf>) -> Self {
        Self {
            path: path.into(),
            includes: vec![],
            entries: vec![],
        }
    }

    pub fn include(mut self, path: impl Into<RelativePathBuf>) -> Self {
        self.includes.push(path.into());
        self
    }

    pub fn entry(mut self, entry: SourceEntry) -> Self {
        self.entries.push(entry);
        self
    }
}

impl SourceEntry {
    pub fn declaration(symbol: SymbolDecl) -> Self {
        Self {
            symbol: Some(symbol),
            ..Self::default()
        }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self {
            preceding: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn preceded_by(mut self, text: impl Into<String>) -> Self {
        self.preceding = Some(text.into());
        self
    }

    pub fn trailed_by(mut self, text: impl Into<String>) -> Self {
        self.trailing = Some(text.into());
        self
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }
}
