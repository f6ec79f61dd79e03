use serde::Serialize;

use super::{doc::DocBlock, documentation::FileId, symbol::SymbolId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GroupId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GroupMember {
    Symbol(SymbolId),
    Group(GroupId),
}

/// A documentation group accumulated over the whole corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub id: GroupId,
    /// The identifier given to `@defgroup`.
    pub name: String,
    pub title: String,
    pub parent: Option<GroupId>,
    /// Insertion ordered, without duplicates.
    pub members: Vec<GroupMember>,
    pub files: Vec<FileId>,
    pub doc: Option<DocBlock>,
    /// Groups owning files that this group's files include, sorted by name.
    pub included_groups: Vec<GroupId>,
    /// Groups owning files that include this group's files, sorted by name.
    pub including_groups: Vec<GroupId>,
}

impl Group {
    pub(crate) fn new(id: GroupId, name: &str, title: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            title: title.to_string(),
            parent: None,
            members: vec![],
            files: vec![],
            doc: None,
            included_groups: vec![],
            including_groups: vec![],
        }
    }

    /// Appends `member` unless it is already present.
    pub(crate) fn add_member(&mut self, member: GroupMember) -> bool {
        if self.members.contains(&member) {
            return false;
        }
        self.members.push(member);
        true
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }
}
