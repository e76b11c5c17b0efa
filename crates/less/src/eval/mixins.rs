//! Mixin calls: candidate lookup, argument binding, guard checks and
//! expansion of the matching body into the caller.
//!
//! Candidates are tried in declaration order and the first one whose
//! arity, patterns and guard all match is expanded. A call no candidate
//! accepts is an error, so recursive mixins need a terminating candidate
//! such as `.loop(0) {}`. The body sees, from innermost to outermost: its
//! own frame, the parameter frame, the scope the mixin was declared in, then
//! the caller's scope.

use std::collections::HashSet;

use crate::error::{LessError, Result};
use crate::parser::{MixinCall, MixinDefinition, Node, Param};
use crate::types::{Separator, Value};

use super::env::{Binding, FrameId, MixinEntry, MixinKind, Scope};
use super::operations::OpMode;
use super::render::{RenderItem, RenderNode};
use super::{Context, Evaluator};

/// Outcome of binding call arguments to a definition's parameters.
#[derive(Debug, PartialEq, Eq)]
enum ArgumentMatch {
    Matched,
    /// Wrong number of arguments, or an unknown named argument.
    Arity,
    /// A pattern parameter did not match its argument.
    Pattern,
}

impl Evaluator<'_> {
    pub(crate) fn eval_mixin_call(
        &mut self,
        call: &MixinCall,
        scope: &Scope,
        ctx: &Context,
        items: &mut Vec<RenderItem>,
        out: &mut Vec<RenderNode>,
    ) -> Result<()> {
        if self.depth >= self.options.max_depth {
            return Err(LessError::RecursionLimit {
                position: call.position.clone(),
                limit: self.options.max_depth,
            });
        }

        let candidates = self.find_candidates(&call.path, scope)?;
        log::trace!(
            "mixin call {} with {} candidate(s)",
            call.display_name(),
            candidates.len()
        );
        if candidates.is_empty() {
            return Err(LessError::NoMatchingMixin {
                position: call.position.clone(),
                call: call.display_name(),
                reason: "undefined".to_string(),
            });
        }

        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            let value = self.eval_expr(&arg.value, scope, OpMode::Math)?;
            args.push((arg.name.clone(), value));
        }

        let ctx = Context {
            important: ctx.important || call.important,
            ..ctx.clone()
        };
        let mut arity_matched = false;
        let mut arguments_matched = false;
        // Frame reused by candidates that are rejected.
        let mut scratch = None;
        for candidate in &candidates {
            match &candidate.kind {
                MixinKind::Ruleset(ruleset) => {
                    if !args.is_empty() {
                        continue;
                    }
                    arity_matched = true;
                    arguments_matched = true;
                    let frame = self.scratch_frame(&mut scratch);
                    let inner = candidate.scope.push(frame).with_fallback(scope);
                    if let Some(guard) = &ruleset.guard {
                        if !self.eval_guard(guard, &inner)? {
                            continue;
                        }
                    }
                    return self.expand(&ruleset.rules, &inner, &ctx, items, out);
                }
                MixinKind::Definition(def) => {
                    let params = self.scratch_frame(&mut scratch);
                    let param_scope = candidate.scope.push(params).with_fallback(scope);
                    match self.bind_arguments(def, &args, params, &param_scope)? {
                        ArgumentMatch::Arity => continue,
                        ArgumentMatch::Pattern => {
                            arity_matched = true;
                            continue;
                        }
                        ArgumentMatch::Matched => {
                            arity_matched = true;
                            arguments_matched = true;
                        }
                    }
                    if let Some(guard) = &def.guard {
                        if !self.eval_guard(guard, &param_scope)? {
                            log::trace!("guard of {} rejected the call", def.name);
                            continue;
                        }
                    }
                    let body = self.env.new_frame();
                    let inner = candidate
                        .scope
                        .push(params)
                        .push(body)
                        .with_fallback(scope);
                    return self.expand(&def.rules, &inner, &ctx, items, out);
                }
            }
        }

        if arguments_matched {
            log::trace!("no guard of {} matched", call.display_name());
            Err(LessError::NoMatchingMixin {
                position: call.position.clone(),
                call: call.display_name(),
                reason: "no guard matched the arguments".to_string(),
            })
        } else if arity_matched {
            Err(LessError::NoMatchingMixin {
                position: call.position.clone(),
                call: call.display_name(),
                reason: "no pattern matched the arguments".to_string(),
            })
        } else {
            Err(LessError::MixinArgument {
                position: call.position.clone(),
                call: call.display_name(),
                message: format!("no definition accepts {} argument(s)", args.len()),
            })
        }
    }

    /// An empty frame, reusing the one of a rejected candidate.
    fn scratch_frame(&mut self, scratch: &mut Option<FrameId>) -> FrameId {
        match *scratch {
            Some(frame) => {
                self.env.clear(frame);
                frame
            }
            None => {
                let frame = self.env.new_frame();
                *scratch = Some(frame);
                frame
            }
        }
    }

    fn expand(
        &mut self,
        rules: &[Node],
        scope: &Scope,
        ctx: &Context,
        items: &mut Vec<RenderItem>,
        out: &mut Vec<RenderNode>,
    ) -> Result<()> {
        self.depth += 1;
        let result = self.expand_body(rules, scope, ctx, items, out);
        self.depth -= 1;
        result
    }

    fn expand_body(
        &mut self,
        rules: &[Node],
        scope: &Scope,
        ctx: &Context,
        items: &mut Vec<RenderItem>,
        out: &mut Vec<RenderNode>,
    ) -> Result<()> {
        let body = self.prepare_body(rules, scope, &[])?;
        self.eval_rules(&body, scope, ctx, items, out)
    }

    /// Mixins reachable through a (possibly namespaced) call path.
    fn find_candidates(&mut self, path: &[String], scope: &Scope) -> Result<Vec<MixinEntry>> {
        let Some((first, rest)) = path.split_first() else {
            return Ok(Vec::new());
        };
        let mut candidates = self.env.find_mixins(scope, first);
        for segment in rest {
            let mut next = Vec::new();
            for namespace in &candidates {
                let (rules, position): (&[Node], _) = match &namespace.kind {
                    MixinKind::Ruleset(ruleset) => (&ruleset.rules, &ruleset.position),
                    MixinKind::Definition(def) if def.required() == 0 => (&def.rules, &def.position),
                    MixinKind::Definition(_) => continue,
                };
                let key = (
                    position.file.clone(),
                    position.offset,
                    namespace.scope.frames().collect::<Vec<_>>(),
                );
                let frame = match self.namespaces.get(&key) {
                    Some(frame) => *frame,
                    None => {
                        let frame = self.env.new_frame();
                        let inner = namespace.scope.push(frame);
                        self.prepare_body(rules, &inner, &[])?;
                        self.namespaces.insert(key, frame);
                        frame
                    }
                };
                next.extend(self.env.mixins_in(frame, segment));
            }
            candidates = next;
        }
        Ok(candidates)
    }

    /// Bind call arguments into the parameter frame.
    ///
    /// Named arguments are bound first, then positional arguments fill the
    /// remaining parameters in order; missing ones take their defaults.
    fn bind_arguments(
        &mut self,
        def: &MixinDefinition,
        args: &[(Option<String>, Value)],
        frame: FrameId,
        scope: &Scope,
    ) -> Result<ArgumentMatch> {
        let mut named = HashSet::new();
        for (name, value) in args {
            let Some(name) = name else { continue };
            let known = def
                .params
                .iter()
                .any(|param| matches!(param, Param::Variable { name: n, .. } if n == name));
            if !known {
                return Ok(ArgumentMatch::Arity);
            }
            self.env.define(frame, name, Binding::Value(value.clone()));
            named.insert(name.as_str());
        }

        let positional: Vec<&Value> = args
            .iter()
            .filter(|(name, _)| name.is_none())
            .map(|(_, value)| value)
            .collect();
        let mut index = 0;
        let mut arguments = Vec::new();
        let mut pattern_failed = false;

        for param in &def.params {
            match param {
                Param::Variable { name, default } => {
                    if named.contains(name.as_str()) {
                        if let Some((_, value)) = args
                            .iter()
                            .find(|(n, _)| n.as_deref() == Some(name.as_str()))
                        {
                            arguments.push(value.clone());
                        }
                        continue;
                    }
                    let value = if let Some(value) = positional.get(index) {
                        index += 1;
                        (*value).clone()
                    } else if let Some(default) = default {
                        self.eval_expr(default, scope, OpMode::Math)?
                    } else {
                        return Ok(ArgumentMatch::Arity);
                    };
                    self.env.define(frame, name, Binding::Value(value.clone()));
                    arguments.push(value);
                }
                Param::Pattern(expr) => {
                    let Some(value) = positional.get(index) else {
                        return Ok(ArgumentMatch::Arity);
                    };
                    index += 1;
                    let expected = self.eval_expr(expr, scope, OpMode::Math)?;
                    if expected.to_unquoted() != value.to_unquoted() {
                        pattern_failed = true;
                    }
                    arguments.push((*value).clone());
                }
                Param::Rest(name) => {
                    let rest: Vec<Value> = positional
                        .iter()
                        .skip(index)
                        .map(|value| (*value).clone())
                        .collect();
                    index = positional.len();
                    arguments.extend(rest.iter().cloned());
                    if let Some(name) = name {
                        self.env.define(
                            frame,
                            name,
                            Binding::Value(Value::List {
                                items: rest,
                                separator: Separator::Space,
                            }),
                        );
                    }
                }
            }
        }

        if index < positional.len() {
            return Ok(ArgumentMatch::Arity);
        }
        self.env.define(
            frame,
            "arguments",
            Binding::Value(Value::List {
                items: arguments,
                separator: Separator::Space,
            }),
        );
        Ok(if pattern_failed {
            ArgumentMatch::Pattern
        } else {
            ArgumentMatch::Matched
        })
    }
}
