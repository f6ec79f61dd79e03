//! # Cross-reference resolution
//!
//! Runs once every file has been folded into the model:
//!
//! 1. clear earlier results so resolving again gives the same model
//! 2. collect `@anchor` definitions
//! 3. build the [`Lookup`] name table
//! 4. resolve `@ref` nodes, in parallel over documentation owners
//! 5. fill `@copydoc` nodes, following chains and stopping at cycles
//!
//! Nothing here fails: every reference ends up `Resolved` or `Broken`, and
//! broken ones are reported as diagnostics.

mod copydoc;
pub mod lookup;

use std::collections::HashSet;

use rayon::prelude::*;
use relative_path::RelativePathBuf;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::model::{
    AnchorDef, BrokenReason, DocBlock, DocumentationModel, MarkupNode, RefState, ResolvedRef,
    TargetId,
};

use copydoc::{CopyExpander, owner_of};
pub use lookup::Lookup;

/// Resolves every reference in `model` and returns what could not be.
pub fn resolve(model: &mut DocumentationModel) -> Vec<Diagnostic> {
    let mut diagnostics = vec![];

    reset(model);
    collect_anchors(model, &mut diagnostics);
    let lookup = Lookup::build(model);
    resolve_refs(model, &lookup, &mut diagnostics);
    expand_copies(model, &lookup, &mut diagnostics);

    log::debug!(
        "resolved references with {} problem(s)",
        diagnostics.len()
    );
    diagnostics
}

fn docs_mut(model: &mut DocumentationModel) -> impl Iterator<Item = &mut DocBlock> {
    model
        .symbols
        .iter_mut()
        .filter_map(|s| s.doc.as_mut())
        .chain(model.groups.iter_mut().filter_map(|g| g.doc.as_mut()))
        .chain(model.files.iter_mut().filter_map(|f| f.doc.as_mut()))
}

/// Documentation owners in resolution order: symbols, groups, files.
fn owners(model: &DocumentationModel) -> Vec<TargetId> {
    model
        .symbols
        .iter()
        .filter(|s| s.doc.is_some())
        .map(|s| TargetId::Symbol(s.id))
        .chain(
            model
                .groups
                .iter()
                .filter(|g| g.doc.is_some())
                .map(|g| TargetId::Group(g.id)),
        )
        .chain(
            model
                .files
                .iter()
                .filter(|f| f.doc.is_some())
                .map(|f| TargetId::File(f.id)),
        )
        .collect()
}

/// File a diagnostic about `owner`'s documentation points at.
fn location(model: &DocumentationModel, owner: TargetId) -> Option<RelativePathBuf> {
    let file = match owner_of(model, owner) {
        TargetId::Symbol(id) => model.symbols.get(id.0)?.file,
        TargetId::Group(id) => *model.groups.get(id.0)?.files.first()?,
        TargetId::File(id) => id,
        TargetId::Anchor(_) => return None,
    };
    model.files.get(file.0).map(|f| f.path.clone())
}

fn broken(target: &str, reason: BrokenReason, file: Option<&RelativePathBuf>) -> Diagnostic {
    let diagnostic = Diagnostic::new(DiagnosticKind::BrokenReference {
        target: target.to_string(),
        reason,
    });
    match file {
        Some(file) => diagnostic.in_file(file),
        None => diagnostic,
    }
}

fn reset(model: &mut DocumentationModel) {
    model.anchors.clear();
    for doc in docs_mut(model) {
        doc.walk_mut(&mut |node| match node {
            MarkupNode::CrossRef { resolved, .. } => *resolved = RefState::Pending,
            MarkupNode::CopyDoc {
                resolved, content, ..
            } => {
                *resolved = RefState::Pending;
                *content = None;
            }
            _ => {}
        });
    }
}

fn collect_anchors(model: &mut DocumentationModel, diagnostics: &mut Vec<Diagnostic>) {
    let mut seen = HashSet::new();
    let mut anchors = vec![];

    for owner in owners(model) {
        let Some(doc) = model.doc_of(owner) else {
            continue;
        };
        doc.walk(&mut |node| {
            let MarkupNode::Anchor { name } = node else {
                return;
            };
            if seen.insert(name.clone()) {
                anchors.push(AnchorDef {
                    name: name.clone(),
                    owner,
                });
            } else {
                let mut diagnostic =
                    Diagnostic::new(DiagnosticKind::DuplicateAnchor { name: name.clone() });
                if let Some(file) = location(model, owner) {
                    diagnostic = diagnostic.in_file(&file);
                }
                diagnostics.push(diagnostic);
            }
        });
    }

    model.anchors = anchors;
}

/// Resolves the `@ref` nodes of one documentation block.
fn resolve_doc(
    doc: &mut DocBlock,
    lookup: &Lookup,
    file: Option<&RelativePathBuf>,
) -> Vec<Diagnostic> {
    let mut diagnostics = vec![];
    doc.walk_mut(&mut |node| {
        let MarkupNode::CrossRef {
            target_text,
            display_text,
            resolved,
        } = node
        else {
            return;
        };
        *resolved = match lookup.find(target_text) {
            Some(target) => RefState::Resolved(ResolvedRef {
                target,
                display_text: display_text
                    .clone()
                    .unwrap_or_else(|| lookup.display_text(target, target_text)),
            }),
            None => {
                diagnostics.push(broken(target_text, BrokenReason::NotFound, file));
                RefState::Broken(BrokenReason::NotFound)
            }
        };
    });
    diagnostics
}

fn resolve_refs(model: &mut DocumentationModel, lookup: &Lookup, diagnostics: &mut Vec<Diagnostic>) {
    let paths: Vec<RelativePathBuf> = model.files.iter().map(|f| f.path.clone()).collect();

    let from_symbols: Vec<Vec<Diagnostic>> = model
        .symbols
        .par_iter_mut()
        .map(|symbol| match &mut symbol.doc {
            Some(doc) => resolve_doc(doc, lookup, paths.get(symbol.file.0)),
            None => vec![],
        })
        .collect();

    let from_groups: Vec<Vec<Diagnostic>> = model
        .groups
        .par_iter_mut()
        .map(|group| {
            let file = group.files.first().and_then(|f| paths.get(f.0));
            match &mut group.doc {
                Some(doc) => resolve_doc(doc, lookup, file),
                None => vec![],
            }
        })
        .collect();

    let from_files: Vec<Vec<Diagnostic>> = model
        .files
        .par_iter_mut()
        .map(|file| match &mut file.doc {
            Some(doc) => resolve_doc(doc, lookup, Some(&file.path)),
            None => vec![],
        })
        .collect();

    diagnostics.extend(
        from_symbols
            .into_iter()
            .chain(from_groups)
            .chain(from_files)
            .flatten(),
    );
}

fn has_copies(doc: &DocBlock) -> bool {
    let mut found = false;
    doc.walk(&mut |node| found |= matches!(node, MarkupNode::CopyDoc { .. }));
    found
}

fn expand_copies(model: &mut DocumentationModel, lookup: &Lookup, diagnostics: &mut Vec<Diagnostic>) {
    let (filled, failed) = {
        let mut expander = CopyExpander::new(model, lookup);
        let mut filled = vec![];
        for owner in owners(model) {
            if !model.doc_of(owner).is_some_and(has_copies) {
                continue;
            }
            if let Some((doc, _)) = expander.expand(owner) {
                filled.push((owner, doc));
            }
        }
        (filled, expander.failed)
    };

    for copy in failed {
        diagnostics.push(broken(
            &copy.target,
            copy.reason,
            location(model, copy.owner).as_ref(),
        ));
    }

    for (owner, doc) in filled {
        let slot = match owner {
            TargetId::Symbol(id) => &mut model.symbols[id.0].doc,
            TargetId::Group(id) => &mut model.groups[id.0].doc,
            TargetId::File(id) => &mut model.files[id.0].doc,
            TargetId::Anchor(_) => continue,
        };
        *slot = Some(doc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileDoc, FileId, Symbol, SymbolId, SymbolKind};
    use pretty_assertions::assert_eq;

    fn doc(nodes: Vec<MarkupNode>) -> DocBlock {
        DocBlock {
            brief: Some(MarkupNode::Paragraph(nodes)),
            ..DocBlock::default()
        }
    }

    fn cross_ref(target: &str) -> MarkupNode {
        MarkupNode::CrossRef {
            target_text: target.to_string(),
            display_text: None,
            resolved: RefState::Pending,
        }
    }

    fn copy_doc(target: &str) -> MarkupNode {
        MarkupNode::CopyDoc {
            target_text: target.to_string(),
            resolved: RefState::Pending,
            content: None,
        }
    }

    fn model(symbols: Vec<(&str, Option<DocBlock>)>) -> DocumentationModel {
        DocumentationModel {
            files: vec![FileDoc {
                id: FileId(0),
                path: RelativePathBuf::from("a.h"),
                includes: vec![],
                group: None,
                doc: None,
            }],
            symbols: symbols
                .into_iter()
                .enumerate()
                .map(|(i, (name, doc))| Symbol {
                    id: SymbolId(i),
                    kind: SymbolKind::Function,
                    name: name.to_string(),
                    signature: name.to_string(),
                    file: FileId(0),
                    also_declared_in: vec![],
                    owner_group: None,
                    member_of: None,
                    doc,
                })
                .collect(),
            ..DocumentationModel::default()
        }
    }

    fn first_node(model: &DocumentationModel, symbol: usize) -> &MarkupNode {
        let Some(MarkupNode::Paragraph(nodes)) = &model.symbols[symbol].doc.as_ref().unwrap().brief
        else {
            panic!("expected paragraph brief");
        };
        &nodes[0]
    }

    fn state(node: &MarkupNode) -> &RefState {
        match node {
            MarkupNode::CrossRef { resolved, .. } | MarkupNode::CopyDoc { resolved, .. } => resolved,
            other => panic!("not a reference: {other:?}"),
        }
    }

    #[test]
    fn refs_resolve_or_break() {
        let mut model = model(vec![
            ("a", Some(doc(vec![cross_ref("b"), cross_ref("missing")]))),
            ("b", None),
        ]);
        let diagnostics = resolve(&mut model);

        assert_eq!(
            state(first_node(&model, 0)),
            &RefState::Resolved(ResolvedRef {
                target: TargetId::Symbol(SymbolId(1)),
                display_text: "b".to_string(),
            })
        );
        assert_eq!(
            diagnostics,
            vec![broken(
                "missing",
                BrokenReason::NotFound,
                Some(&RelativePathBuf::from("a.h"))
            )]
        );
    }

    #[test]
    fn anchors_are_targets_and_duplicates_reported() {
        let anchor = |name: &str| MarkupNode::Anchor {
            name: name.to_string(),
        };
        let mut model = model(vec![
            ("a", Some(doc(vec![cross_ref("spot"), anchor("spot")]))),
            ("b", Some(doc(vec![anchor("spot")]))),
        ]);
        let diagnostics = resolve(&mut model);

        assert_eq!(model.anchors.len(), 1);
        assert_eq!(model.anchors[0].owner, TargetId::Symbol(SymbolId(0)));
        assert!(matches!(
            state(first_node(&model, 0)),
            RefState::Resolved(ResolvedRef {
                target: TargetId::Anchor(0),
                ..
            })
        ));
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic::new(DiagnosticKind::DuplicateAnchor {
                    name: "spot".to_string()
                })
                .in_file(&RelativePathBuf::from("a.h"))
            ]
        );
    }

    #[test]
    fn copydoc_follows_chains() {
        let mut model = model(vec![
            ("a", Some(doc(vec![copy_doc("b")]))),
            ("b", Some(doc(vec![copy_doc("c")]))),
            ("c", Some(doc(vec![MarkupNode::text("Source text.")]))),
        ]);
        let diagnostics = resolve(&mut model);
        assert!(diagnostics.is_empty());

        let MarkupNode::CopyDoc {
            content: Some(copied),
            ..
        } = first_node(&model, 0)
        else {
            panic!("copy of b not filled");
        };
        let Some(MarkupNode::Paragraph(inner)) = &copied.brief else {
            panic!("expected copied brief");
        };
        let MarkupNode::CopyDoc {
            content: Some(deeper),
            ..
        } = &inner[0]
        else {
            panic!("copy of c not filled");
        };
        assert_eq!(deeper.brief_text(), "Source text.");
    }

    #[test]
    fn copydoc_cycle_is_broken() {
        let mut model = model(vec![
            ("a", Some(doc(vec![copy_doc("b")]))),
            ("b", Some(doc(vec![copy_doc("a")]))),
            ("c", Some(doc(vec![copy_doc("c")]))),
        ]);
        let diagnostics = resolve(&mut model);

        for symbol in 0..3 {
            assert_eq!(
                state(first_node(&model, symbol)),
                &RefState::Broken(BrokenReason::Cycle)
            );
        }
        assert_eq!(diagnostics.len(), 3);
    }

    #[test]
    fn copydoc_of_undocumented_symbol() {
        let mut model = model(vec![("a", Some(doc(vec![copy_doc("b")]))), ("b", None)]);
        resolve(&mut model);
        assert_eq!(
            state(first_node(&model, 0)),
            &RefState::Broken(BrokenReason::Undocumented)
        );
    }

    #[test]
    fn resolving_twice_is_stable() {
        let mut model = model(vec![
            ("a", Some(doc(vec![copy_doc("b"), cross_ref("b")]))),
            ("b", Some(doc(vec![MarkupNode::text("B.")]))),
        ]);
        let first = resolve(&mut model);
        let once = model.clone();
        let second = resolve(&mut model);
        assert_eq!(model, once);
        assert_eq!(first, second);
    }
}
