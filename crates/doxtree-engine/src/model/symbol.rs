use serde::Serialize;

use super::{doc::DocBlock, documentation::FileId, group::GroupId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SymbolId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolKind {
    Function,
    Struct,
    Union,
    Enum,
    EnumConstant,
    Typedef,
    Macro,
    MacroFunction,
    Variable,
    Field,
}

/// A declaration as reported by the external declaration parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolDecl {
    pub kind: SymbolKind,
    pub name: String,
    pub signature: String,
    /// Name of the enclosing struct, union or enum for fields and constants.
    pub member_of: Option<String>,
}

impl SymbolDecl {
    pub fn new(kind: SymbolKind, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind,
            signature: name.clone(),
            name,
            member_of: None,
        }
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = signature.into();
        self
    }

    pub fn member_of(mut self, owner: impl Into<String>) -> Self {
        self.member_of = Some(owner.into());
        self
    }

    pub(crate) fn key(&self) -> SymbolKey {
        SymbolKey {
            kind: self.kind,
            scope: self.member_of.clone(),
            name: self.name.clone(),
        }
    }
}

/// Identity of a symbol across files: kind and name, scoped by owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SymbolKey {
    kind: SymbolKind,
    scope: Option<String>,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub kind: SymbolKind,
    pub name: String,
    pub signature: String,
    /// First file that declared the symbol.
    pub file: FileId,
    /// Later files re-declaring the same symbol (prototype and definition).
    pub also_declared_in: Vec<FileId>,
    pub owner_group: Option<GroupId>,
    pub member_of: Option<SymbolId>,
    pub doc: Option<DocBlock>,
}

impl Symbol {
    /// Name including the owner, e.g. `Union_t::one`.
    pub fn qualified_name(&self, owner: Option<&Symbol>) -> String {
        match owner {
            Some(owner) => format!("{}::{}", owner.name, self.name),
            None => self.name.clone(),
        }
    }
}
