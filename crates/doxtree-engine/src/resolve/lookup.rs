use std::collections::HashMap;

use crate::model::{DocumentationModel, TargetId};

/// Name table for reference targets.
///
/// Earlier sources shadow later ones: anchors, group names, symbol names,
/// qualified member names, group titles, then file paths and basenames.
#[derive(Debug, Default)]
pub struct Lookup {
    names: HashMap<String, TargetId>,
    group_titles: Vec<String>,
}

/// Separators accepted between an owner and its member.
const MEMBER_SEPARATORS: [&str; 3] = ["::", ".", "#"];

impl Lookup {
    pub fn build(model: &DocumentationModel) -> Self {
        let mut lookup = Lookup {
            names: HashMap::new(),
            group_titles: model
                .groups
                .iter()
                .map(|g| g.display_title().to_string())
                .collect(),
        };

        for (idx, anchor) in model.anchors.iter().enumerate() {
            lookup.add(&anchor.name, TargetId::Anchor(idx));
        }
        for group in &model.groups {
            lookup.add(&group.name, TargetId::Group(group.id));
        }
        for symbol in &model.symbols {
            lookup.add(&symbol.name, TargetId::Symbol(symbol.id));
        }
        for symbol in &model.symbols {
            let Some(owner) = symbol.member_of else {
                continue;
            };
            let owner = &model.symbol(owner).name;
            for sep in MEMBER_SEPARATORS {
                lookup.add(&format!("{owner}{sep}{}", symbol.name), TargetId::Symbol(symbol.id));
            }
        }
        for group in &model.groups {
            if !group.title.is_empty() {
                lookup.add(&group.title, TargetId::Group(group.id));
            }
        }
        for file in &model.files {
            lookup.add(file.path.as_str(), TargetId::File(file.id));
        }
        for file in &model.files {
            if let Some(name) = file.path.file_name() {
                lookup.add(name, TargetId::File(file.id));
            }
        }

        log::debug!("reference lookup holds {} names", lookup.names.len());
        lookup
    }

    fn add(&mut self, name: &str, target: TargetId) {
        self.names.entry(name.to_string()).or_insert(target);
    }

    /// Finds what `target` names. A trailing `()` is ignored.
    pub fn find(&self, target: &str) -> Option<TargetId> {
        let target = target.trim();
        let target = target.strip_suffix("()").unwrap_or(target);
        self.names.get(target).copied()
    }

    /// Text shown for a reference without explicit display text.
    pub fn display_text(&self, target: TargetId, written: &str) -> String {
        match target {
            TargetId::Group(id) => self
                .group_titles
                .get(id.0)
                .cloned()
                .unwrap_or_else(|| written.to_string()),
            _ => written.to_string(),
        }
    }
}
