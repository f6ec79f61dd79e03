use std::collections::HashMap;

use crate::model::{
    BrokenReason, DocBlock, DocumentationModel, MarkupNode, RefState, ResolvedRef, TargetId,
};

use super::lookup::Lookup;

/// A `@copydoc` that could not be filled, by the documentation holding it.
pub(super) struct FailedCopy {
    pub owner: TargetId,
    pub target: String,
    pub reason: BrokenReason,
}

/// Fills `@copydoc` nodes from a read-only view of the model.
///
/// Every owner is expanded at most once. A copy whose chain leads back to
/// a documentation block still being expanded is a cycle, and so is every
/// copy of a block that contains one.
pub(super) struct CopyExpander<'m> {
    model: &'m DocumentationModel,
    lookup: &'m Lookup,
    done: HashMap<TargetId, (DocBlock, bool)>,
    stack: Vec<TargetId>,
    pub failed: Vec<FailedCopy>,
}

impl<'m> CopyExpander<'m> {
    pub fn new(model: &'m DocumentationModel, lookup: &'m Lookup) -> Self {
        Self {
            model,
            lookup,
            done: HashMap::new(),
            stack: vec![],
            failed: vec![],
        }
    }

    /// The documentation of `owner` with its copies filled in, and whether
    /// one of them ran into a cycle.
    pub fn expand(&mut self, owner: TargetId) -> Option<(DocBlock, bool)> {
        let owner = owner_of(self.model, owner);
        if let Some(done) = self.done.get(&owner) {
            return Some(done.clone());
        }
        let mut doc = self.model.doc_of(owner)?.clone();

        self.stack.push(owner);
        let mut cyclic = false;
        doc.walk_mut(&mut |node| {
            let MarkupNode::CopyDoc {
                target_text,
                resolved,
                content,
            } = node
            else {
                return;
            };
            match self.copy(target_text) {
                Ok((target, copied)) => {
                    *resolved = RefState::Resolved(ResolvedRef {
                        target,
                        display_text: target_text.clone(),
                    });
                    *content = Some(Box::new(copied));
                }
                Err(reason) => {
                    cyclic |= reason == BrokenReason::Cycle;
                    *resolved = RefState::Broken(reason);
                    self.failed.push(FailedCopy {
                        owner,
                        target: target_text.clone(),
                        reason,
                    });
                }
            }
        });
        self.stack.pop();

        self.done.insert(owner, (doc.clone(), cyclic));
        Some((doc, cyclic))
    }

    fn copy(&mut self, target_text: &str) -> Result<(TargetId, DocBlock), BrokenReason> {
        let target = self.lookup.find(target_text).ok_or(BrokenReason::NotFound)?;
        let source = owner_of(self.model, target);
        if self.stack.contains(&source) {
            return Err(BrokenReason::Cycle);
        }
        match self.expand(source) {
            None => Err(BrokenReason::Undocumented),
            Some((_, true)) => Err(BrokenReason::Cycle),
            Some((doc, false)) => Ok((target, doc)),
        }
    }
}

/// Anchors stand for the documentation block that defines them.
pub(super) fn owner_of(model: &DocumentationModel, target: TargetId) -> TargetId {
    match target {
        TargetId::Anchor(idx) => model.anchors.get(idx).map_or(target, |a| a.owner),
        other => other,
    }
}
