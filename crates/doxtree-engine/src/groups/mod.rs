//! # Group model
//!
//! Folds the per-file [`FileUnit`]s into one set of groups, symbols and
//! files. This is the first step that sees more than one file, so units
//! must arrive in file order:
//!
//! - groups are created on first `@defgroup` and reopened afterwards
//! - `@{`/`@}` scopes are tracked per file; a bare `@{` opens the group
//!   named last in that file
//! - membership is first-encounter ordered across the whole corpus
//! - links to groups that appear in later files wait until the group is
//!   defined, and are applied before anything the defining file adds

use std::collections::HashMap;

use doxtree_config::Options;
use relative_path::RelativePathBuf;

use crate::binding::{FileUnit, GroupOp, UnitEvent};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::model::{
    BrokenReason, DocBlock, DocumentationModel, FileDoc, FileId, Group, GroupId, GroupMember,
    Symbol, SymbolDecl, SymbolId, SymbolKind,
};
use crate::model::symbol::SymbolKey;

/// What waits for a group name to become known.
#[derive(Debug, Clone, Copy)]
enum Link {
    Parent(GroupId),
    Member(SymbolId),
    File(FileId),
}

#[derive(Debug)]
struct PendingLink {
    group: String,
    link: Link,
    file: RelativePathBuf,
    line: usize,
}

pub struct GroupBuilder<'o> {
    options: &'o Options,
    files: Vec<FileDoc>,
    groups: Vec<Group>,
    group_index: HashMap<String, GroupId>,
    symbols: Vec<Symbol>,
    symbol_index: HashMap<SymbolKey, SymbolId>,
    /// `member_of` names, resolved to ids once every symbol is known.
    owner_names: Vec<Option<String>>,
    pending: Vec<PendingLink>,
    diagnostics: Vec<Diagnostic>,
}

impl<'o> GroupBuilder<'o> {
    pub fn new(options: &'o Options) -> Self {
        Self {
            options,
            files: vec![],
            groups: vec![],
            group_index: HashMap::new(),
            symbols: vec![],
            symbol_index: HashMap::new(),
            owner_names: vec![],
            pending: vec![],
            diagnostics: vec![],
        }
    }

    /// Applies one file's events. File ids are assigned in fold order.
    pub fn fold(&mut self, unit: FileUnit) {
        let FileUnit {
            path,
            includes,
            file_doc,
            events,
            diagnostics,
            ..
        } = unit;
        let file = FileId(self.files.len());
        self.files.push(FileDoc {
            id: file,
            path: path.clone(),
            includes,
            group: None,
            doc: file_doc,
        });
        self.diagnostics.extend(diagnostics);

        let mut scopes: Vec<Option<GroupId>> = vec![];
        let mut last_named: Option<Option<GroupId>> = None;
        for event in events {
            let current = scopes.last().copied().flatten();
            match event {
                UnitEvent::Group {
                    op,
                    name,
                    title,
                    parents,
                    doc,
                    line,
                } => {
                    let opened = self.open_group(op, &name, &title, &path, line);
                    last_named = Some(opened);
                    let Some(id) = opened else {
                        continue;
                    };
                    if let Some(doc) = doc {
                        self.merge_doc(id, doc);
                    }
                    if !parents.is_empty() {
                        for parent in parents {
                            self.link(parent, Link::Parent(id), &path, line);
                        }
                    } else if op == GroupOp::Define
                        && let Some(scope) = current
                        && scope != id
                    {
                        self.set_parent(id, scope, &path, line);
                    }
                }
                UnitEvent::ScopeOpen { group } => {
                    let id = match group {
                        Some(name) => self.group_index.get(&name).copied(),
                        None => last_named.unwrap_or(current),
                    };
                    scopes.push(id);
                }
                UnitEvent::ScopeClose { line } => {
                    if scopes.pop().is_none() {
                        self.diagnostics.push(
                            Diagnostic::new(DiagnosticKind::UnbalancedGroupScope { marker: '}' })
                                .in_file(&path)
                                .at_line(line),
                        );
                    }
                }
                UnitEvent::FileMarker { ingroups } => {
                    if !ingroups.is_empty() {
                        for name in ingroups {
                            self.link(name, Link::File(file), &path, 0);
                        }
                    } else if let Some(scope) = current {
                        self.attach_file(scope, file);
                    }
                }
                UnitEvent::Declaration {
                    decl,
                    doc,
                    ingroups,
                    line,
                } => {
                    let nested = decl.member_of.is_some();
                    let id = self.declare(decl, doc, file, &path, line);
                    if !ingroups.is_empty() {
                        for name in ingroups {
                            self.link(name, Link::Member(id), &path, line);
                        }
                    } else if !nested && let Some(scope) = current {
                        self.add_symbol(scope, id);
                    }
                }
            }
        }

        if !scopes.is_empty() {
            log::debug!("{path}: {} group scope(s) left open", scopes.len());
            self.diagnostics.push(
                Diagnostic::new(DiagnosticKind::UnbalancedGroupScope { marker: '{' })
                    .in_file(&path),
            );
        }
    }

    fn open_group(
        &mut self,
        op: GroupOp,
        name: &str,
        title: &str,
        path: &RelativePathBuf,
        line: usize,
    ) -> Option<GroupId> {
        let Some(&id) = self.group_index.get(name) else {
            if op == GroupOp::AddTo {
                log::warn!("{path}:{line}: @addtogroup {name} before any @defgroup {name}");
                self.diagnostics.push(
                    Diagnostic::new(DiagnosticKind::UnknownAddToGroup {
                        group: name.to_string(),
                    })
                    .in_file(path)
                    .at_line(line),
                );
                return None;
            }
            let id = GroupId(self.groups.len());
            self.groups.push(Group::new(id, name, title));
            self.group_index.insert(name.to_string(), id);
            self.apply_waiting(name, id);
            return Some(id);
        };

        let group = &mut self.groups[id.0];
        if group.title.is_empty() {
            group.title = title.to_string();
        } else if !title.is_empty() && group.title != title {
            log::debug!("{path}:{line}: group {name} keeps title {:?}", group.title);
        }
        Some(id)
    }

    fn merge_doc(&mut self, id: GroupId, doc: DocBlock) {
        match &mut self.groups[id.0].doc {
            Some(existing) => existing.merge(doc),
            slot => *slot = Some(doc),
        }
    }

    /// Applies `link` now if `group` is known, otherwise once it is defined.
    fn link(&mut self, group: String, link: Link, path: &RelativePathBuf, line: usize) {
        match self.group_index.get(&group) {
            Some(&id) => self.apply(id, link, path, line),
            None => self.pending.push(PendingLink {
                group,
                link,
                file: path.clone(),
                line,
            }),
        }
    }

    /// Links recorded before `name` existed, in the order they were met.
    fn apply_waiting(&mut self, name: &str, id: GroupId) {
        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.group == name);
        self.pending = waiting;
        for pending in ready {
            self.apply(id, pending.link, &pending.file, pending.line);
        }
    }

    fn apply(&mut self, group: GroupId, link: Link, path: &RelativePathBuf, line: usize) {
        match link {
            Link::Parent(child) => self.set_parent(child, group, path, line),
            Link::Member(symbol) => self.add_symbol(group, symbol),
            Link::File(file) => self.attach_file(group, file),
        }
    }

    fn set_parent(&mut self, child: GroupId, parent: GroupId, path: &RelativePathBuf, line: usize) {
        let mut ancestor = Some(parent);
        while let Some(g) = ancestor {
            if g == child {
                log::warn!(
                    "{path}:{line}: making {} a subgroup of {} would create a cycle",
                    self.groups[child.0].name,
                    self.groups[parent.0].name
                );
                return;
            }
            ancestor = self.groups[g.0].parent;
        }

        match self.groups[child.0].parent {
            None => {
                self.groups[child.0].parent = Some(parent);
                self.groups[parent.0].add_member(GroupMember::Group(child));
            }
            Some(kept) if kept == parent => {}
            Some(kept) => self.diagnostics.push(
                Diagnostic::new(DiagnosticKind::ConflictingGroupParent {
                    group: self.groups[child.0].name.clone(),
                    kept: self.groups[kept.0].name.clone(),
                    rejected: self.groups[parent.0].name.clone(),
                })
                .in_file(path)
                .at_line(line),
            ),
        }
    }

    fn add_symbol(&mut self, group: GroupId, symbol: SymbolId) {
        self.groups[group.0].add_member(GroupMember::Symbol(symbol));
        self.symbols[symbol.0].owner_group.get_or_insert(group);
    }

    fn attach_file(&mut self, group: GroupId, file: FileId) {
        self.files[file.0].group.get_or_insert(group);
        let files = &mut self.groups[group.0].files;
        if !files.contains(&file) {
            files.push(file);
        }
    }

    /// Records a declaration, merging it with an earlier one of the same
    /// identity.
    fn declare(
        &mut self,
        decl: SymbolDecl,
        doc: Option<DocBlock>,
        file: FileId,
        path: &RelativePathBuf,
        line: usize,
    ) -> SymbolId {
        let key = decl.key();
        if let Some(&id) = self.symbol_index.get(&key) {
            let symbol = &mut self.symbols[id.0];
            if symbol.file != file && !symbol.also_declared_in.contains(&file) {
                symbol.also_declared_in.push(file);
            }
            if let Some(doc) = doc {
                if symbol.doc.is_some() {
                    self.diagnostics.push(
                        Diagnostic::new(DiagnosticKind::DuplicateDocBlock { subject: decl.name })
                            .in_file(path)
                            .at_line(line),
                    );
                } else {
                    symbol.doc = Some(doc);
                }
            }
            return id;
        }

        let id = SymbolId(self.symbols.len());
        self.symbols.push(Symbol {
            id,
            kind: decl.kind,
            name: decl.name,
            signature: decl.signature,
            file,
            also_declared_in: vec![],
            owner_group: None,
            member_of: None,
            doc,
        });
        self.owner_names.push(decl.member_of);
        self.symbol_index.insert(key, id);
        id
    }

    /// Reports links to groups that were never defined and produces the
    /// model.
    ///
    /// References inside documentation are still pending afterwards.
    pub fn finish(mut self) -> DocumentationModel {
        for pending in std::mem::take(&mut self.pending) {
            let mut diagnostic = Diagnostic::new(DiagnosticKind::BrokenReference {
                target: pending.group,
                reason: BrokenReason::NotFound,
            })
            .in_file(&pending.file);
            if pending.line > 0 {
                diagnostic = diagnostic.at_line(pending.line);
            }
            self.diagnostics.push(diagnostic);
        }

        self.resolve_owners();
        if self.options.hide_undocumented {
            let symbols = &self.symbols;
            for group in &mut self.groups {
                group.members.retain(|m| match m {
                    GroupMember::Symbol(id) => symbols[id.0].doc.is_some(),
                    GroupMember::Group(_) => true,
                });
            }
        }
        self.relate_includes();

        let mut root_groups: Vec<GroupId> = self
            .groups
            .iter()
            .filter(|g| g.parent.is_none())
            .map(|g| g.id)
            .collect();
        root_groups.sort_by(|a, b| {
            self.groups[a.0]
                .display_title()
                .cmp(self.groups[b.0].display_title())
        });

        DocumentationModel {
            files: self.files,
            groups: self.groups,
            root_groups,
            symbols: self.symbols,
            anchors: vec![],
            diagnostics: self.diagnostics,
        }
    }

    fn resolve_owners(&mut self) {
        let mut by_name: HashMap<&str, Vec<SymbolId>> = HashMap::new();
        for symbol in &self.symbols {
            by_name.entry(symbol.name.as_str()).or_default().push(symbol.id);
        }

        let owners: Vec<Option<SymbolId>> = self
            .owner_names
            .iter()
            .map(|owner| {
                let candidates = by_name.get(owner.as_deref()?)?;
                candidates
                    .iter()
                    .find(|id| {
                        matches!(
                            self.symbols[id.0].kind,
                            SymbolKind::Struct
                                | SymbolKind::Union
                                | SymbolKind::Enum
                                | SymbolKind::Typedef
                        )
                    })
                    .or(candidates.first())
                    .copied()
            })
            .collect();

        for (symbol, owner) in self.symbols.iter_mut().zip(owners) {
            symbol.member_of = owner;
        }
    }

    /// Derives group include relations from the files' `#include` edges.
    fn relate_includes(&mut self) {
        let mut edges = vec![];
        for file in &self.files {
            let Some(from) = file.group else {
                continue;
            };
            for include in &file.includes {
                let target = self
                    .files
                    .iter()
                    .find(|f| &f.path == include)
                    .or_else(|| {
                        self.files
                            .iter()
                            .find(|f| f.path.file_name() == include.file_name())
                    });
                if let Some(to) = target.and_then(|f| f.group)
                    && to != from
                {
                    edges.push((from, to));
                }
            }
        }

        for (from, to) in edges {
            let included = &mut self.groups[from.0].included_groups;
            if !included.contains(&to) {
                included.push(to);
            }
            let including = &mut self.groups[to.0].including_groups;
            if !including.contains(&from) {
                including.push(from);
            }
        }

        let names: Vec<String> = self.groups.iter().map(|g| g.name.clone()).collect();
        for group in &mut self.groups {
            group.included_groups.sort_by(|a, b| names[a.0].cmp(&names[b.0]));
            group.including_groups.sort_by(|a, b| names[a.0].cmp(&names[b.0]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::bind_file;
    use crate::model::{SourceEntry, SourceFile};
    use pretty_assertions::assert_eq;

    fn build_with(files: &[SourceFile], options: &Options) -> DocumentationModel {
        let mut builder = GroupBuilder::new(options);
        for (i, file) in files.iter().enumerate() {
            builder.fold(bind_file(FileId(i), file, options));
        }
        builder.finish()
    }

    fn build(files: &[SourceFile]) -> DocumentationModel {
        build_with(files, &Options::default())
    }

    fn func(name: &str) -> SymbolDecl {
        SymbolDecl::new(SymbolKind::Function, name)
    }

    fn members(model: &DocumentationModel, group: &str) -> Vec<String> {
        let group = model.group_by_name(group).expect("group exists");
        model.member_names(group)
    }

    fn kinds(model: &DocumentationModel) -> Vec<DiagnosticKind> {
        model.diagnostics.iter().map(|d| d.kind.clone()).collect()
    }

    #[test]
    fn reopened_group_accumulates_in_file_order() {
        let first = SourceFile::new("Test.c")
            .entry(
                SourceEntry::declaration(func("F"))
                    .preceded_by("/** @defgroup X Title @{ @file */"),
            )
            .entry(SourceEntry::comment("/// @}"));
        let second = SourceFile::new("Test2.c")
            .entry(SourceEntry::declaration(func("G")).preceded_by("/** @addtogroup X @{ */"))
            .entry(SourceEntry::comment("/// @}"));

        let model = build(&[first, second]);
        assert_eq!(members(&model, "X"), ["F", "G"]);
        assert!(model.diagnostics.is_empty());

        let x = model.group_by_name("X").unwrap();
        assert_eq!(x.title, "Title");
        assert_eq!(x.files, vec![FileId(0)]);
        assert_eq!(model.files[0].group, Some(x.id));
        assert_eq!(model.symbol_by_name("G").unwrap().owner_group, Some(x.id));
    }

    #[test]
    fn nested_defgroup_takes_scope_as_parent() {
        let file = SourceFile::new("a.h")
            .entry(SourceEntry::comment("/** @defgroup Outer Outer group @{ */"))
            .entry(SourceEntry::comment("/** @defgroup Inner Inner group */"))
            .entry(SourceEntry::declaration(func("f")))
            .entry(SourceEntry::comment("/// @}"));

        let model = build(&[file]);
        let outer = model.group_by_name("Outer").unwrap();
        let inner = model.group_by_name("Inner").unwrap();
        assert_eq!(inner.parent, Some(outer.id));
        assert_eq!(members(&model, "Outer"), ["Inner", "f"]);
        assert_eq!(model.root_groups, vec![outer.id]);
    }

    #[test]
    fn conflicting_parent_keeps_first() {
        let file = SourceFile::new("a.h")
            .entry(SourceEntry::comment("/** @defgroup A A */"))
            .entry(SourceEntry::comment("/** @defgroup B B */"))
            .entry(SourceEntry::comment("/** @defgroup C C\n @ingroup A */"))
            .entry(SourceEntry::comment("/** @addtogroup C\n @ingroup B */").at_line(8));

        let model = build(&[file]);
        let a = model.group_by_name("A").unwrap().id;
        assert_eq!(model.group_by_name("C").unwrap().parent, Some(a));
        assert_eq!(
            model.diagnostics,
            vec![
                Diagnostic::new(DiagnosticKind::ConflictingGroupParent {
                    group: "C".to_string(),
                    kept: "A".to_string(),
                    rejected: "B".to_string(),
                })
                .in_file(&RelativePathBuf::from("a.h"))
                .at_line(8)
            ]
        );
    }

    #[test]
    fn unknown_addtogroup_leaves_symbols_groupless() {
        let file = SourceFile::new("a.c")
            .entry(
                SourceEntry::declaration(func("f"))
                    .preceded_by("/** @addtogroup Missing @{ */")
                    .at_line(2),
            )
            .entry(SourceEntry::comment("/// @}"));

        let model = build(&[file]);
        assert!(model.groups.is_empty());
        assert_eq!(model.symbol_by_name("f").unwrap().owner_group, None);
        assert_eq!(
            kinds(&model),
            vec![DiagnosticKind::UnknownAddToGroup {
                group: "Missing".to_string()
            }]
        );
    }

    #[test]
    fn ingroup_may_name_a_later_group() {
        let first = SourceFile::new("a.c").entry(
            SourceEntry::declaration(func("early")).preceded_by("/** Early. @ingroup Late */"),
        );
        let second = SourceFile::new("b.c").entry(SourceEntry::comment("/** @defgroup Late Late */"));

        let model = build(&[first, second]);
        assert_eq!(members(&model, "Late"), ["early"]);
        assert!(model.diagnostics.is_empty());
    }

    #[test]
    fn later_group_keeps_earlier_members_first() {
        let first = SourceFile::new("a.c").entry(
            SourceEntry::declaration(func("early")).preceded_by("/** Early. @ingroup Late */"),
        );
        let second = SourceFile::new("b.c")
            .entry(SourceEntry::declaration(func("g")).preceded_by("/** @defgroup Late Late @{ */"))
            .entry(SourceEntry::comment("/// @}"));

        let model = build(&[first, second]);
        assert_eq!(members(&model, "Late"), ["early", "g"]);
        let late = model.group_by_name("Late").unwrap().id;
        assert_eq!(model.symbol_by_name("early").unwrap().owner_group, Some(late));
        assert!(model.diagnostics.is_empty());
    }

    #[test]
    fn bare_scope_opens_last_named_group() {
        let file = SourceFile::new("a.h")
            .entry(SourceEntry::comment("/** @defgroup Outer Outer group @{ */"))
            .entry(SourceEntry::comment("/** @defgroup Inner Inner group */"))
            .entry(SourceEntry::comment("/** @{ */"))
            .entry(SourceEntry::declaration(func("inside")))
            .entry(SourceEntry::comment("/** @} */"))
            .entry(SourceEntry::declaration(func("after")))
            .entry(SourceEntry::comment("/// @}"));

        let model = build(&[file]);
        assert_eq!(members(&model, "Inner"), ["inside"]);
        assert_eq!(members(&model, "Outer"), ["Inner", "after"]);
        assert!(model.diagnostics.is_empty());
    }

    #[test]
    fn ingroup_of_unknown_group_is_broken() {
        let file = SourceFile::new("a.c").entry(
            SourceEntry::declaration(func("f"))
                .preceded_by("/** Doc. @ingroup Nowhere */")
                .at_line(4),
        );

        let model = build(&[file]);
        assert_eq!(
            model.diagnostics,
            vec![
                Diagnostic::new(DiagnosticKind::BrokenReference {
                    target: "Nowhere".to_string(),
                    reason: BrokenReason::NotFound,
                })
                .in_file(&RelativePathBuf::from("a.c"))
                .at_line(4)
            ]
        );
    }

    #[test]
    fn redeclared_symbol_merges() {
        let header = SourceFile::new("a.h").entry(SourceEntry::declaration(func("f")));
        let source = SourceFile::new("a.c")
            .entry(SourceEntry::declaration(func("f")).preceded_by("/** Defined here. */"));

        let model = build(&[header, source]);
        assert_eq!(model.symbols.len(), 1);
        let f = &model.symbols[0];
        assert_eq!(f.file, FileId(0));
        assert_eq!(f.also_declared_in, vec![FileId(1)]);
        assert_eq!(f.doc.as_ref().map(DocBlock::brief_text).as_deref(), Some("Defined here."));
    }

    #[test]
    fn duplicate_doc_across_files_keeps_first() {
        let first = SourceFile::new("v1/Test.h")
            .entry(SourceEntry::declaration(func("f")).preceded_by("/** First. */"));
        let second = SourceFile::new("v2/Test.h").entry(
            SourceEntry::declaration(func("f"))
                .preceded_by("/** Second. */")
                .at_line(5),
        );

        let model = build(&[first, second]);
        let f = model.symbol_by_name("f").unwrap();
        assert_eq!(f.doc.as_ref().map(DocBlock::brief_text).as_deref(), Some("First."));
        assert_eq!(
            kinds(&model),
            vec![DiagnosticKind::DuplicateDocBlock {
                subject: "f".to_string()
            }]
        );
    }

    #[test]
    fn unbalanced_scopes_are_reported() {
        let file = SourceFile::new("a.c")
            .entry(SourceEntry::comment("/// @}").at_line(1))
            .entry(SourceEntry::comment("/** @defgroup G G @{ */"));

        let model = build(&[file]);
        assert_eq!(
            kinds(&model),
            vec![
                DiagnosticKind::UnbalancedGroupScope { marker: '}' },
                DiagnosticKind::UnbalancedGroupScope { marker: '{' },
            ]
        );
    }

    #[test]
    fn fields_stay_with_their_owner() {
        let file = SourceFile::new("a.h")
            .entry(
                SourceEntry::declaration(SymbolDecl::new(SymbolKind::Union, "Union_t"))
                    .preceded_by("/** @defgroup U Unions @{ */"),
            )
            .entry(SourceEntry::declaration(
                SymbolDecl::new(SymbolKind::Field, "one").member_of("Union_t"),
            ))
            .entry(SourceEntry::comment("/// @}"));

        let model = build(&[file]);
        assert_eq!(members(&model, "U"), ["Union_t"]);
        let one = model.symbol_by_name("one").unwrap();
        assert_eq!(one.member_of, Some(model.symbol_by_name("Union_t").unwrap().id));
        assert_eq!(one.owner_group, None);
    }

    #[test]
    fn include_edges_relate_groups() {
        let header = SourceFile::new("include/Test.h")
            .entry(SourceEntry::comment("/** @defgroup H Header @{ @file */"))
            .entry(SourceEntry::comment("/// @}"));
        let source = SourceFile::new("src/Test.c")
            .include("Test.h")
            .entry(SourceEntry::comment("/** @defgroup S Source @{ @file */"))
            .entry(SourceEntry::comment("/// @}"));

        let model = build(&[header, source]);
        let h = model.group_by_name("H").unwrap();
        let s = model.group_by_name("S").unwrap();
        assert_eq!(s.included_groups, vec![h.id]);
        assert_eq!(h.including_groups, vec![s.id]);
    }

    #[test]
    fn root_groups_sorted_by_title() {
        let file = SourceFile::new("a.h")
            .entry(SourceEntry::comment("/** @defgroup z Alpha */"))
            .entry(SourceEntry::comment("/** @defgroup a Zulu */"))
            .entry(SourceEntry::comment("/** @defgroup m Mike */"));

        let model = build(&[file]);
        let titles: Vec<&str> = model
            .root_groups
            .iter()
            .map(|id| model.group(*id).title.as_str())
            .collect();
        assert_eq!(titles, ["Alpha", "Mike", "Zulu"]);
    }

    #[test]
    fn hide_undocumented_filters_members() {
        let file = SourceFile::new("a.h")
            .entry(SourceEntry::comment("/** @defgroup G G @{ */"))
            .entry(SourceEntry::declaration(func("documented")).preceded_by("/** Yes. */"))
            .entry(SourceEntry::declaration(func("bare")))
            .entry(SourceEntry::comment("/// @}"));
        let options = Options {
            hide_undocumented: true,
            ..Options::default()
        };

        let model = build_with(&[file], &options);
        assert_eq!(members(&model, "G"), ["documented"]);
    }
}
