use relative_path::RelativePathBuf;
use serde::Serialize;

use crate::diagnostics::{Diagnostic, Severity};

use super::{
    doc::DocBlock,
    group::{Group, GroupId, GroupMember},
    symbol::{Symbol, SymbolId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FileId(pub usize);

/// Anything a reference can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TargetId {
    Symbol(SymbolId),
    Group(GroupId),
    File(FileId),
    /// Index into [`DocumentationModel::anchors`].
    Anchor(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnchorDef {
    pub name: String,
    /// The symbol, group or file whose documentation holds the anchor.
    pub owner: TargetId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDoc {
    pub id: FileId,
    pub path: RelativePathBuf,
    pub includes: Vec<RelativePathBuf>,
    pub group: Option<GroupId>,
    pub doc: Option<DocBlock>,
}

/// The resolved output of a corpus run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DocumentationModel {
    pub files: Vec<FileDoc>,
    /// All groups in order of first appearance.
    pub groups: Vec<Group>,
    /// Groups without a parent, sorted by title.
    pub root_groups: Vec<GroupId>,
    pub symbols: Vec<Symbol>,
    pub anchors: Vec<AnchorDef>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DocumentationModel {
    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id.0]
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    pub fn group_by_name(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// First symbol with this plain name.
    pub fn symbol_by_name(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    pub fn doc_of(&self, target: TargetId) -> Option<&DocBlock> {
        match target {
            TargetId::Symbol(id) => self.symbols.get(id.0)?.doc.as_ref(),
            TargetId::Group(id) => self.groups.get(id.0)?.doc.as_ref(),
            TargetId::File(id) => self.files.get(id.0)?.doc.as_ref(),
            TargetId::Anchor(idx) => self.doc_of(self.anchors.get(idx)?.owner),
        }
    }

    /// Member names of a group, for display and tests.
    pub fn member_names(&self, group: &Group) -> Vec<String> {
        group
            .members
            .iter()
            .map(|m| match m {
                GroupMember::Symbol(id) => self.symbol(*id).name.clone(),
                GroupMember::Group(id) => self.group(*id).name.clone(),
            })
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity() == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity() == Severity::Warning)
    }
}
