//! Evaluation environment: frames of variable and mixin bindings.
//!
//! Frames live in an arena owned by the [`Environment`] and are addressed by
//! [`FrameId`]. A [`Scope`] is the chain of frames visible at some point of
//! the walk, innermost first. Bindings store the scope they were declared in
//! so a variable can be evaluated lazily against its defining frames, with
//! the frames of the reference site as a fallback.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::parser::{Expression, MixinDefinition, Ruleset};
use crate::types::Value;

pub type FrameId = usize;

/// A chain of frames, innermost first.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    frames: Rc<Vec<FrameId>>,
}

impl Scope {
    /// A scope with `frame` in front of `self`.
    pub fn push(&self, frame: FrameId) -> Scope {
        let mut frames = Vec::with_capacity(self.frames.len() + 1);
        frames.push(frame);
        frames.extend(self.frames.iter().copied());
        Scope {
            frames: Rc::new(frames),
        }
    }

    /// `self` followed by the frames of `fallback` it does not already contain.
    pub fn with_fallback(&self, fallback: &Scope) -> Scope {
        let mut frames: Vec<FrameId> = self.frames.as_ref().clone();
        for frame in fallback.frames.iter() {
            if !frames.contains(frame) {
                frames.push(*frame);
            }
        }
        Scope {
            frames: Rc::new(frames),
        }
    }

    pub fn innermost(&self) -> Option<FrameId> {
        self.frames.first().copied()
    }

    pub fn frames(&self) -> impl Iterator<Item = FrameId> + '_ {
        self.frames.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// A variable binding.
#[derive(Clone, Debug)]
pub enum Binding {
    /// An unevaluated expression and the scope it was declared in.
    Lazy { expr: Arc<Expression>, scope: Scope },
    /// An already evaluated value (mixin arguments, `@arguments`).
    Value(Value),
}

#[derive(Clone, Debug)]
pub enum MixinKind {
    Definition(Arc<MixinDefinition>),
    /// A plain ruleset called as a mixin.
    Ruleset(Arc<Ruleset>),
}

/// A mixin candidate registered in a frame.
#[derive(Clone, Debug)]
pub struct MixinEntry {
    pub name: String,
    pub kind: MixinKind,
    /// The scope the mixin was declared in.
    pub scope: Scope,
}

#[derive(Debug, Default)]
pub struct Frame {
    variables: HashMap<String, Binding>,
    mixins: Vec<MixinEntry>,
}

/// Arena of frames for one compilation.
#[derive(Debug, Default)]
pub struct Environment {
    frames: Vec<Frame>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an empty frame.
    pub fn new_frame(&mut self) -> FrameId {
        self.frames.push(Frame::default());
        log::trace!("push frame {}", self.frames.len() - 1);
        self.frames.len() - 1
    }

    /// Number of frames allocated so far.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Remove every binding of a frame (used before re-registering a body).
    pub fn clear(&mut self, frame: FrameId) {
        if let Some(frame) = self.frames.get_mut(frame) {
            frame.variables.clear();
            frame.mixins.clear();
        }
    }

    /// Bind a variable; a later binding of the same name replaces the earlier.
    pub fn define(&mut self, frame: FrameId, name: &str, binding: Binding) {
        if let Some(frame) = self.frames.get_mut(frame) {
            frame.variables.insert(name.to_string(), binding);
        }
    }

    pub fn add_mixin(&mut self, frame: FrameId, entry: MixinEntry) {
        if let Some(frame) = self.frames.get_mut(frame) {
            frame.mixins.push(entry);
        }
    }

    /// Find the innermost binding of `name`.
    pub fn lookup(&self, scope: &Scope, name: &str) -> Option<(FrameId, &Binding)> {
        scope.frames().find_map(|id| {
            self.frames
                .get(id)
                .and_then(|frame| frame.variables.get(name))
                .map(|binding| (id, binding))
        })
    }

    /// Candidates named `name` from the innermost frame that has any.
    pub fn find_mixins(&self, scope: &Scope, name: &str) -> Vec<MixinEntry> {
        for id in scope.frames() {
            let found = self.mixins_in(id, name);
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    /// Candidates named `name` declared directly in `frame`, in source order.
    pub fn mixins_in(&self, frame: FrameId, name: &str) -> Vec<MixinEntry> {
        self.frames
            .get(frame)
            .map(|frame| {
                frame
                    .mixins
                    .iter()
                    .filter(|entry| entry.name == name)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
