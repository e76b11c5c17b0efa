//! The render tree: fully resolved output ready for serialization.

use std::sync::Arc;

/// Where a ruleset came from, for debug annotations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Origin {
    pub file: Arc<str>,
    pub line: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RenderItem {
    Declaration {
        property: String,
        value: String,
        important: bool,
    },
    Comment(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderRuleset {
    /// Each selector of the list, already combined with its parents.
    pub selectors: Vec<String>,
    pub items: Vec<RenderItem>,
    pub origin: Origin,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RenderNode {
    Ruleset(RenderRuleset),
    Media {
        query: String,
        /// Declarations placed directly in a root-level media block.
        items: Vec<RenderItem>,
        children: Vec<RenderNode>,
    },
    Directive {
        name: String,
        params: String,
        block: Option<DirectiveBlock>,
    },
    Comment(String),
    /// A statement copied through as is: `@import url(a.css);`, inline imports.
    Raw(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DirectiveBlock {
    pub items: Vec<RenderItem>,
    pub children: Vec<RenderNode>,
}

impl RenderNode {
    /// Whether the node would print nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            RenderNode::Ruleset(ruleset) => ruleset.items.is_empty(),
            RenderNode::Media {
                items, children, ..
            } => items.is_empty() && children.iter().all(RenderNode::is_empty),
            RenderNode::Directive { .. } | RenderNode::Comment(_) | RenderNode::Raw(_) => false,
        }
    }
}

/// The evaluated stylesheet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderTree {
    pub nodes: Vec<RenderNode>,
}

/// Append `node`, folding it into the last node when both are media blocks
/// with the same query.
pub fn push_merging_media(out: &mut Vec<RenderNode>, node: RenderNode) {
    let same_query = matches!(
        (out.last(), &node),
        (Some(RenderNode::Media { query: last, .. }), RenderNode::Media { query, .. }) if last == query
    );
    if !same_query {
        out.push(node);
        return;
    }
    if let (
        Some(RenderNode::Media {
            items: last_items,
            children: last_children,
            ..
        }),
        RenderNode::Media {
            items, children, ..
        },
    ) = (out.last_mut(), node)
    {
        last_items.extend(items);
        last_children.extend(children);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ruleset(selector: &str) -> RenderNode {
        RenderNode::Ruleset(RenderRuleset {
            selectors: vec![selector.into()],
            items: vec![RenderItem::Declaration {
                property: "color".into(),
                value: "red".into(),
                important: false,
            }],
            origin: Origin {
                file: Arc::from("a.less"),
                line: 1,
            },
        })
    }

    fn media(query: &str, selector: &str) -> RenderNode {
        RenderNode::Media {
            query: query.into(),
            items: Vec::new(),
            children: vec![ruleset(selector)],
        }
    }

    #[test]
    fn identical_queries_fold_together() {
        let mut out = vec![media("print", ".a")];
        push_merging_media(&mut out, media("print", ".b"));
        assert_eq!(out.len(), 1);
        let RenderNode::Media { children, .. } = &out[0] else {
            panic!("expected media");
        };
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn other_nodes_are_appended() {
        let mut out = vec![media("print", ".a")];
        push_merging_media(&mut out, media("screen", ".b"));
        push_merging_media(&mut out, ruleset(".x"));
        push_merging_media(&mut out, media("screen", ".c"));
        assert_eq!(out.len(), 3);
    }
}
