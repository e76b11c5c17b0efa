//! Selector resolution and nesting.
//!
//! Nested rulesets are flattened by combining each parent selector with
//! each child selector:
//!
//! ```less
//! .a, .b {
//!     .c { }        // .a .c, .b .c
//!     &:hover { }   // .a:hover, .b:hover
//!     & + & { }     // .a + .a, .a + .b, .b + .a, .b + .b
//! }
//! ```
//!
//! - `&` is replaced by the parent selector, once per parent
//! - `&-suffix` glues text onto the parent's last element
//! - A child without `&` is joined to the parent with a descendant combinator

use crate::parser::Combinator;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorPart {
    pub combinator: Combinator,
    pub text: String,
}

/// A selector whose interpolations have been resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorPath {
    pub parts: Vec<SelectorPart>,
}

/// An element of a resolved child selector, before combination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedElement {
    Parent(Combinator),
    Part(SelectorPart),
}

impl SelectorPath {
    /// CSS text: `.a > .b:hover`.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for (i, part) in self.parts.iter().enumerate() {
            if i == 0 {
                out.push_str(part.combinator.as_str().trim_start());
            } else {
                out.push_str(part.combinator.as_str());
            }
            out.push_str(&part.text);
        }
        out
    }
}

/// Build the selector path of a selector with no parent.
///
/// A `&` at the top level has nothing to refer to and is dropped.
pub fn root_path(elements: &[ResolvedElement]) -> SelectorPath {
    let mut parts: Vec<SelectorPart> = Vec::new();
    for element in elements {
        if let ResolvedElement::Part(part) = element {
            push_part(&mut parts, part.clone());
        }
    }
    SelectorPath { parts }
}

/// Combine every parent path with every child selector.
pub fn combine_selectors(
    parents: &[SelectorPath],
    children: &[Vec<ResolvedElement>],
) -> Vec<SelectorPath> {
    let mut combined = Vec::new();
    for child in children {
        let has_parent_ref = child.iter().any(|e| matches!(e, ResolvedElement::Parent(_)));
        if !has_parent_ref {
            // CASE: .a { .b { } } (Descendant)
            for parent in parents {
                let mut parts = parent.parts.clone();
                for (i, element) in child.iter().enumerate() {
                    if let ResolvedElement::Part(part) = element {
                        let mut part = part.clone();
                        if i == 0 && part.combinator == Combinator::None {
                            part.combinator = Combinator::Descendant;
                        }
                        parts.push(part);
                    }
                }
                combined.push(SelectorPath { parts });
            }
            continue;
        }

        // CASE: &:hover, & + &, .x & (substitution, once per parent per `&`)
        let mut partials: Vec<Vec<SelectorPart>> = vec![Vec::new()];
        for element in child {
            match element {
                ResolvedElement::Parent(combinator) => {
                    let mut next = Vec::with_capacity(partials.len() * parents.len());
                    for partial in &partials {
                        for parent in parents {
                            let mut parts = partial.clone();
                            for (i, parent_part) in parent.parts.iter().enumerate() {
                                let mut part = parent_part.clone();
                                if i == 0 {
                                    part.combinator = *combinator;
                                }
                                push_part(&mut parts, part);
                            }
                            next.push(parts);
                        }
                    }
                    partials = next;
                }
                ResolvedElement::Part(part) => {
                    for partial in &mut partials {
                        push_part(partial, part.clone());
                    }
                }
            }
        }
        combined.extend(partials.into_iter().map(|parts| SelectorPath { parts }));
    }
    combined
}

/// Append a part, gluing it to the previous part when it has no combinator.
fn push_part(parts: &mut Vec<SelectorPart>, part: SelectorPart) {
    if part.combinator == Combinator::None {
        if let Some(last) = parts.last_mut() {
            last.text.push_str(&part.text);
            return;
        }
    }
    parts.push(part);
}
