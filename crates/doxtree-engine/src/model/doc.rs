use serde::Serialize;

use super::markup::MarkupNode;

/// Structured documentation of one symbol, group or file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DocBlock {
    pub brief: Option<MarkupNode>,
    pub detail: Vec<MarkupNode>,
    pub params: Vec<ParamDoc>,
    pub returns: Option<Vec<MarkupNode>>,
    pub retvals: Vec<RetvalDoc>,
    pub see_also: Vec<MarkupNode>,
    pub admonitions: Vec<Admonition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ParamDirection {
    In,
    Out,
    InOut,
    #[default]
    Unspecified,
}

impl ParamDirection {
    /// Parses the text between `@param[` and `]`.
    pub fn parse(spec: &str) -> Self {
        let spec: String = spec.chars().filter(|c| !c.is_whitespace()).collect();
        match spec.to_ascii_lowercase().as_str() {
            "in" => ParamDirection::In,
            "out" => ParamDirection::Out,
            "in,out" | "out,in" | "inout" => ParamDirection::InOut,
            _ => ParamDirection::Unspecified,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamDoc {
    pub name: String,
    pub direction: ParamDirection,
    pub body: Vec<MarkupNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetvalDoc {
    pub value: String,
    pub body: Vec<MarkupNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdmonitionKind {
    Warning,
    Note,
    Todo,
    Par,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Admonition {
    pub kind: AdmonitionKind,
    pub title: Option<String>,
    pub body: Vec<MarkupNode>,
}

impl DocBlock {
    pub fn is_empty(&self) -> bool {
        self.brief.is_none()
            && self.detail.is_empty()
            && self.params.is_empty()
            && self.returns.is_none()
            && self.retvals.is_empty()
            && self.see_also.is_empty()
            && self.admonitions.is_empty()
    }

    /// Appends `other` to this block, used when a group is reopened.
    ///
    /// A second brief becomes the first paragraph of the appended detail.
    pub fn merge(&mut self, other: DocBlock) {
        if let Some(brief) = other.brief {
            if self.brief.is_none() {
                self.brief = Some(brief);
            } else {
                self.detail.push(brief);
            }
        }
        self.detail.extend(other.detail);
        self.params.extend(other.params);
        if let Some(returns) = other.returns {
            self.returns.get_or_insert_with(Vec::new).extend(returns);
        }
        self.retvals.extend(other.retvals);
        self.see_also.extend(other.see_also);
        self.admonitions.extend(other.admonitions);
    }

    fn bodies(&self) -> impl Iterator<Item = &MarkupNode> {
        self.brief
            .iter()
            .chain(&self.detail)
            .chain(self.params.iter().flat_map(|p| &p.body))
            .chain(self.returns.iter().flatten())
            .chain(self.retvals.iter().flat_map(|r| &r.body))
            .chain(&self.see_also)
            .chain(self.admonitions.iter().flat_map(|a| &a.body))
    }

    fn bodies_mut(&mut self) -> impl Iterator<Item = &mut MarkupNode> {
        self.brief
            .iter_mut()
            .chain(&mut self.detail)
            .chain(self.params.iter_mut().flat_map(|p| &mut p.body))
            .chain(self.returns.iter_mut().flatten())
            .chain(self.retvals.iter_mut().flat_map(|r| &mut r.body))
            .chain(&mut self.see_also)
            .chain(self.admonitions.iter_mut().flat_map(|a| &mut a.body))
    }

    /// Visits every markup node of every section.
    pub fn walk<F: FnMut(&MarkupNode)>(&self, f: &mut F) {
        for node in self.bodies() {
            node.walk(f);
        }
    }

    pub fn walk_mut<F: FnMut(&mut MarkupNode)>(&mut self, f: &mut F) {
        for node in self.bodies_mut() {
            node.walk_mut(f);
        }
    }

    pub fn brief_text(&self) -> String {
        self.brief.as_ref().map(MarkupNode::plain_text).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn para(s: &str) -> MarkupNode {
        MarkupNode::Paragraph(vec![MarkupNode::text(s)])
    }

    #[rstest]
    #[case("in", ParamDirection::In)]
    #[case("out", ParamDirection::Out)]
    #[case("in,out", ParamDirection::InOut)]
    #[case("in, out", ParamDirection::InOut)]
    #[case("sideways", ParamDirection::Unspecified)]
    fn parses_directions(#[case] spec: &str, #[case] expected: ParamDirection) {
        assert_eq!(ParamDirection::parse(spec), expected);
    }

    #[test]
    fn merge_keeps_first_brief() {
        let mut doc = DocBlock {
            brief: Some(para("first")),
            ..DocBlock::default()
        };
        doc.merge(DocBlock {
            brief: Some(para("second")),
            detail: vec![para("more")],
            ..DocBlock::default()
        });

        assert_eq!(doc.brief, Some(para("first")));
        assert_eq!(doc.detail, vec![para("second"), para("more")]);
    }

    #[test]
    fn walk_visits_all_sections() {
        let doc = DocBlock {
            brief: Some(para("a")),
            params: vec![ParamDoc {
                name: "x".to_string(),
                direction: ParamDirection::In,
                body: vec![para("b")],
            }],
            admonitions: vec![Admonition {
                kind: AdmonitionKind::Note,
                title: None,
                body: vec![para("c")],
            }],
            ..DocBlock::default()
        };
        let mut seen = vec![];
        doc.walk(&mut |n| {
            if let MarkupNode::Text(t) = n {
                seen.push(t.clone());
            }
        });
        assert_eq!(seen, ["a", "b", "c"]);
    }

    #[test]
    fn empty_doc_block() {
        assert!(DocBlock::default().is_empty());
        let doc = DocBlock {
            see_also: vec![para("x")],
            ..DocBlock::default()
        };
        assert!(!doc.is_empty());
    }
}
