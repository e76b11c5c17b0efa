//! CSS serialization of a [`RenderTree`].
//!
//! The output style is fixed: two-space indentation, one declaration per
//! line, selector lists split over lines, no blank lines.
//!
//! ```text
//! .a,
//! .b {
//!   color: red;
//! }
//! @media print {
//!   .a {
//!     color: black;
//!   }
//! }
//! ```

use bitflags::bitflags;

use crate::eval::render::{DirectiveBlock, Origin, RenderItem, RenderNode, RenderRuleset, RenderTree};

bitflags! {
    /// Debug annotations emitted before each ruleset.
    ///
    /// The empty set emits none.
    ///
    /// # Example
    ///
    /// ```
    /// use less::{DebugInfo, parse_debug_info};
    ///
    /// assert_eq!(parse_debug_info("all"), Ok(DebugInfo::ALL));
    /// assert!(DebugInfo::ALL.contains(DebugInfo::COMMENT));
    /// assert_eq!(parse_debug_info("none"), Ok(DebugInfo::empty()));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DebugInfo: u8 {
        /// `/* line N, file */`
        const COMMENT     = 0b01;
        /// `@media -sass-debug-info{...}`
        const MEDIA_QUERY = 0b10;
        const ALL = Self::COMMENT.bits() | Self::MEDIA_QUERY.bits();
    }
}

/// Parse a debug mode name: `none`, `comment(s)`, `mediaquery` or `all`.
pub fn parse_debug_info(mode: &str) -> Result<DebugInfo, String> {
    match mode.trim().to_ascii_lowercase().as_str() {
        "" | "none" => Ok(DebugInfo::empty()),
        "comment" | "comments" => Ok(DebugInfo::COMMENT),
        "mediaquery" => Ok(DebugInfo::MEDIA_QUERY),
        "all" => Ok(DebugInfo::ALL),
        other => Err(format!(
            "unknown line number mode '{other}' (expected none, comments, mediaquery or all)"
        )),
    }
}

/// Serialize a render tree to CSS.
pub fn emit(tree: &RenderTree, debug: DebugInfo) -> String {
    let mut emitter = Emitter {
        out: String::new(),
        debug,
    };
    for node in &tree.nodes {
        emitter.node(node, 0);
    }
    emitter.out
}

/// Escape a file path for the `-sass-debug-info` media query.
///
/// ```
/// use less::emitter::escape_filename_for_media_query;
///
/// assert_eq!(
///     escape_filename_for_media_query("/tmp/a.less"),
///     r"file\:\/\/\/tmp\/a\.less"
/// );
/// ```
pub fn escape_filename_for_media_query(path: &str) -> String {
    let path = path.replace('\\', "/");
    let is_url = path
        .split_once("://")
        .is_some_and(|(scheme, _)| !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphabetic()));
    let full = if is_url { path } else { format!("file://{path}") };

    let mut escaped = String::with_capacity(full.len() * 2);
    for c in full.chars() {
        if matches!(c, '.' | ':' | '/' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

struct Emitter {
    out: String,
    debug: DebugInfo,
}

impl Emitter {
    fn line(&mut self, indent: usize, text: &str) {
        for _ in 0..indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn node(&mut self, node: &RenderNode, indent: usize) {
        match node {
            RenderNode::Ruleset(ruleset) => self.ruleset(ruleset, indent),
            RenderNode::Media {
                query,
                items,
                children,
            } => {
                if node.is_empty() {
                    return;
                }
                self.line(indent, &format!("@media {query} {{"));
                self.items(items, indent + 1);
                for child in children {
                    self.node(child, indent + 1);
                }
                self.line(indent, "}");
            }
            RenderNode::Directive {
                name,
                params,
                block,
            } => {
                let head = if params.is_empty() {
                    format!("@{name}")
                } else {
                    format!("@{name} {params}")
                };
                match block {
                    None => self.line(indent, &format!("{head};")),
                    Some(DirectiveBlock { items, children }) => {
                        self.line(indent, &format!("{head} {{"));
                        self.items(items, indent + 1);
                        for child in children {
                            self.node(child, indent + 1);
                        }
                        self.line(indent, "}");
                    }
                }
            }
            RenderNode::Comment(text) | RenderNode::Raw(text) => self.line(indent, text),
        }
    }

    fn ruleset(&mut self, ruleset: &RenderRuleset, indent: usize) {
        if ruleset.items.is_empty() || ruleset.selectors.is_empty() {
            return;
        }
        self.debug_info(&ruleset.origin, indent);

        let last = ruleset.selectors.len() - 1;
        for (i, selector) in ruleset.selectors.iter().enumerate() {
            if i == last {
                self.line(indent, &format!("{selector} {{"));
            } else {
                self.line(indent, &format!("{selector},"));
            }
        }
        self.items(&ruleset.items, indent + 1);
        self.line(indent, "}");
    }

    fn items(&mut self, items: &[RenderItem], indent: usize) {
        for item in items {
            match item {
                RenderItem::Declaration {
                    property,
                    value,
                    important,
                } => {
                    let important = if *important { " !important" } else { "" };
                    self.line(indent, &format!("{property}: {value}{important};"));
                }
                RenderItem::Comment(text) => self.line(indent, text),
            }
        }
    }

    fn debug_info(&mut self, origin: &Origin, indent: usize) {
        if self.debug.contains(DebugInfo::COMMENT) {
            self.line(indent, &format!("/* line {}, {} */", origin.line, origin.file));
        }
        if self.debug.contains(DebugInfo::MEDIA_QUERY) {
            let line: String = origin
                .line
                .to_string()
                .chars()
                .map(|digit| format!("\\00003{digit}"))
                .collect();
            self.line(
                indent,
                &format!(
                    "@media -sass-debug-info{{filename{{font-family:{}}}line{{font-family:{}}}}}",
                    escape_filename_for_media_query(&origin.file),
                    line
                ),
            );
        }
    }
}
