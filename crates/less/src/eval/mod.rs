//! Evaluation: turns a parsed [`Stylesheet`] into a [`RenderTree`].
//!
//! The evaluator walks the AST depth first. Every block body (the root,
//! rulesets, mixin bodies, media and directive blocks) gets a fresh frame;
//! before the body is walked its variables and mixins are registered in that
//! frame and its `@import` statements are replaced by the imported rules, so
//! that every binding of the body is visible to every statement of the body.
//!
//! ## Submodules
//!
//! - [`env`]: frames, scopes and bindings
//! - [`operations`]: arithmetic and unit conversion
//! - [`functions`]: built-in functions
//! - [`guards`]: `when` conditions
//! - [`mixins`]: mixin lookup, argument binding and expansion
//! - [`selectors`]: selector nesting
//! - [`render`]: the output tree

pub mod env;
pub mod functions;
pub mod guards;
pub mod mixins;
pub mod operations;
pub mod render;
pub mod selectors;

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use crate::compiler::Options;
use crate::error::{LessError, Position, Result};
use crate::importer::{ImportCache, Importer};
use crate::parser::{
    Declaration, Directive, ElementValue, ExprKind, Expression, Import, ImportOptions, MediaBlock,
    MediaItem, MediaQuery, Node, Op, Piece, Ruleset, Selector, Stylesheet, parse_stylesheet,
};
use crate::types::{Dimension, Separator, Value};

use env::{Binding, Environment, FrameId, MixinEntry, MixinKind, Scope};
use operations::{OpMode, operate};
use render::{
    DirectiveBlock, Origin, RenderItem, RenderNode, RenderRuleset, RenderTree, push_merging_media,
};
use selectors::{ResolvedElement, SelectorPart, SelectorPath, combine_selectors, root_path};

/// What an `@import` statement turned into.
#[derive(Clone, Debug)]
enum ImportResolution {
    /// A LESS file whose rules are spliced in place of the statement.
    Less { key: String, sheet: Arc<Stylesheet> },
    /// A CSS `@import` statement kept in the output.
    Css(String),
    /// File contents copied into the output verbatim.
    Inline(String),
    /// A file that was already imported.
    Skip,
}

/// Where evaluated content is going.
#[derive(Clone, Debug)]
pub(crate) struct Context {
    /// The selector path of the enclosing ruleset.
    selectors: Option<Rc<Vec<SelectorPath>>>,
    /// Queries of the enclosing media blocks, already combined.
    media: Option<Rc<Vec<String>>>,
    origin: Option<Origin>,
    /// Set inside a mixin called with `!important`.
    important: bool,
    /// Directly in the stylesheet root, where declarations are not allowed.
    at_root: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            selectors: None,
            media: None,
            origin: None,
            important: false,
            at_root: true,
        }
    }
}

/// The evaluator for one compilation.
pub struct Evaluator<'c> {
    env: Environment,
    options: &'c Options,
    importer: &'c dyn Importer,
    cache: &'c dyn ImportCache,
    /// Files currently being imported, outermost first.
    chain: Vec<String>,
    /// Files already imported once.
    imported: HashSet<String>,
    /// Resolution of each import statement, keyed by file and offset.
    resolved_imports: HashMap<(Arc<str>, usize), ImportResolution>,
    /// Prepared frames of namespaces looked into by mixin calls, keyed by
    /// the namespace's position and the scope it was declared in.
    namespaces: HashMap<(Arc<str>, usize, Vec<FrameId>), FrameId>,
    /// Variables whose value is being computed.
    evaluating: Vec<(FrameId, String)>,
    /// Current mixin nesting.
    depth: usize,
    charset: Option<RenderNode>,
    css_imports: Vec<RenderNode>,
}

/// Evaluate a stylesheet.
///
/// `root_key` identifies the stylesheet for import cycle detection;
/// `variables` are bound in the root frame after the stylesheet's own
/// declarations, so they take precedence over them.
pub fn evaluate(
    sheet: &Stylesheet,
    root_key: &str,
    variables: &[(String, Arc<Expression>)],
    options: &Options,
    importer: &dyn Importer,
    cache: &dyn ImportCache,
) -> Result<RenderTree> {
    Evaluator::new(root_key, options, importer, cache).run(sheet, variables)
}

impl<'c> Evaluator<'c> {
    fn new(
        root_key: &str,
        options: &'c Options,
        importer: &'c dyn Importer,
        cache: &'c dyn ImportCache,
    ) -> Self {
        Self {
            env: Environment::new(),
            options,
            importer,
            cache,
            chain: vec![root_key.to_string()],
            imported: HashSet::from([root_key.to_string()]),
            resolved_imports: HashMap::new(),
            namespaces: HashMap::new(),
            evaluating: Vec::new(),
            depth: 0,
            charset: None,
            css_imports: Vec::new(),
        }
    }

    fn run(
        &mut self,
        sheet: &Stylesheet,
        variables: &[(String, Arc<Expression>)],
    ) -> Result<RenderTree> {
        let root = self.env.new_frame();
        let scope = Scope::default().push(root);
        let rules = self.prepare_body(&sheet.rules, &scope, variables)?;

        let ctx = Context::default();
        let mut items = Vec::new();
        let mut out = Vec::new();
        self.eval_rules(&rules, &scope, &ctx, &mut items, &mut out)?;

        let mut nodes = Vec::new();
        nodes.extend(self.charset.take());
        nodes.append(&mut self.css_imports);
        nodes.append(&mut out);
        Ok(RenderTree { nodes })
    }

    // ========================================================================
    // Bodies
    // ========================================================================

    /// Register a body's bindings in the innermost frame of `scope` and
    /// splice in its imports.
    pub(crate) fn prepare_body<'n>(
        &mut self,
        rules: &'n [Node],
        scope: &Scope,
        injected: &[(String, Arc<Expression>)],
    ) -> Result<Cow<'n, [Node]>> {
        let Some(frame) = scope.innermost() else {
            return Ok(Cow::Borrowed(rules));
        };
        self.register(rules, frame, scope);
        self.inject(injected, frame, scope);
        if !rules.iter().any(|node| matches!(node, Node::Import(_))) {
            return Ok(Cow::Borrowed(rules));
        }

        let mut expanded = Vec::with_capacity(rules.len());
        self.expand_imports(rules, frame, scope, &mut expanded)?;
        self.env.clear(frame);
        self.register(&expanded, frame, scope);
        self.inject(injected, frame, scope);
        Ok(Cow::Owned(expanded))
    }

    fn register(&mut self, rules: &[Node], frame: FrameId, scope: &Scope) {
        for node in rules {
            match node {
                Node::Variable(var) => self.env.define(
                    frame,
                    &var.name,
                    Binding::Lazy {
                        expr: var.value.clone(),
                        scope: scope.clone(),
                    },
                ),
                Node::MixinDefinition(def) => self.env.add_mixin(
                    frame,
                    MixinEntry {
                        name: def.name.clone(),
                        kind: MixinKind::Definition(def.clone()),
                        scope: scope.clone(),
                    },
                ),
                Node::Ruleset(ruleset) => {
                    for name in ruleset.mixin_names() {
                        self.env.add_mixin(
                            frame,
                            MixinEntry {
                                name,
                                kind: MixinKind::Ruleset(ruleset.clone()),
                                scope: scope.clone(),
                            },
                        );
                    }
                }
                _ => {}
            }
        }
    }

    fn inject(&mut self, variables: &[(String, Arc<Expression>)], frame: FrameId, scope: &Scope) {
        for (name, expr) in variables {
            self.env.define(
                frame,
                name,
                Binding::Lazy {
                    expr: expr.clone(),
                    scope: scope.clone(),
                },
            );
        }
    }

    /// Walk the statements of a prepared body.
    pub(crate) fn eval_rules(
        &mut self,
        rules: &[Node],
        scope: &Scope,
        ctx: &Context,
        items: &mut Vec<RenderItem>,
        out: &mut Vec<RenderNode>,
    ) -> Result<()> {
        // Output length right after a media statement, while it is the
        // previous statement of this body.
        let mut after_media: Option<usize> = None;
        for node in rules {
            let follows_media = after_media.take() == Some(out.len());
            match node {
                Node::Comment(comment) => {
                    if ctx.at_root {
                        out.push(RenderNode::Comment(comment.text.clone()));
                    } else {
                        items.push(RenderItem::Comment(comment.text.clone()));
                    }
                }
                Node::Declaration(decl) => {
                    if ctx.at_root {
                        return Err(LessError::InvalidOperation {
                            position: decl.position.clone(),
                            message: "properties must be inside selector blocks".to_string(),
                        });
                    }
                    let item = self.eval_declaration(decl, scope, ctx)?;
                    items.push(item);
                }
                Node::Variable(_) | Node::MixinDefinition(_) => {}
                Node::Ruleset(ruleset) => self.eval_ruleset(ruleset, scope, ctx, out)?,
                Node::MixinCall(call) => self.eval_mixin_call(call, scope, ctx, items, out)?,
                Node::Import(import) => self.eval_import(import, scope, out)?,
                Node::Media(media) => {
                    let mut produced = Vec::new();
                    self.eval_media(media, scope, ctx, &mut produced)?;
                    let produced_any = !produced.is_empty();
                    let mut produced = produced.into_iter();
                    if follows_media {
                        if let Some(first) = produced.next() {
                            push_merging_media(out, first);
                        }
                    }
                    out.extend(produced);
                    after_media = produced_any.then_some(out.len());
                }
                Node::Directive(directive) => self.eval_directive(directive, scope, ctx, out)?,
            }
        }
        Ok(())
    }

    fn eval_declaration(
        &mut self,
        decl: &Declaration,
        scope: &Scope,
        ctx: &Context,
    ) -> Result<RenderItem> {
        let property = self.interpolate_pieces(&decl.name, scope, &decl.position)?;
        let mode = if property == "font" {
            OpMode::Slash
        } else {
            OpMode::Math
        };
        let value = self.eval_expr(&decl.value, scope, mode)?;
        Ok(RenderItem::Declaration {
            property,
            value: value.to_css(),
            important: decl.important || ctx.important,
        })
    }

    fn eval_ruleset(
        &mut self,
        ruleset: &Ruleset,
        scope: &Scope,
        ctx: &Context,
        out: &mut Vec<RenderNode>,
    ) -> Result<()> {
        if let Some(guard) = &ruleset.guard {
            if !self.eval_guard(guard, scope)? {
                return Ok(());
            }
        }

        let children = ruleset
            .selectors
            .iter()
            .map(|selector| self.resolve_selector(selector, scope, &ruleset.position))
            .collect::<Result<Vec<_>>>()?;
        let paths = match &ctx.selectors {
            Some(parents) => combine_selectors(parents, &children),
            None => children.iter().map(|c| root_path(c)).collect(),
        };

        let frame = self.env.new_frame();
        let inner = scope.push(frame);
        let body = self.prepare_body(&ruleset.rules, &inner, &[])?;

        let origin = Origin {
            file: ruleset.position.file.clone(),
            line: ruleset.position.line,
        };
        let inner_ctx = Context {
            selectors: Some(Rc::new(paths)),
            media: ctx.media.clone(),
            origin: Some(origin.clone()),
            important: ctx.important,
            at_root: false,
        };

        let mut items = Vec::new();
        let mut nested = Vec::new();
        self.eval_rules(&body, &inner, &inner_ctx, &mut items, &mut nested)?;

        if !items.is_empty() {
            let selectors = inner_ctx
                .selectors
                .iter()
                .flat_map(|paths| paths.iter().map(SelectorPath::to_css))
                .collect();
            out.push(RenderNode::Ruleset(RenderRuleset {
                selectors,
                items,
                origin,
            }));
        }
        out.extend(nested);
        Ok(())
    }

    fn resolve_selector(
        &mut self,
        selector: &Selector,
        scope: &Scope,
        position: &Position,
    ) -> Result<Vec<ResolvedElement>> {
        selector
            .elements
            .iter()
            .map(|element| match &element.value {
                ElementValue::Parent => Ok(ResolvedElement::Parent(element.combinator)),
                ElementValue::Text(pieces) => Ok(ResolvedElement::Part(SelectorPart {
                    combinator: element.combinator,
                    text: self.interpolate_pieces(pieces, scope, position)?,
                })),
            })
            .collect()
    }

    // ========================================================================
    // Media and directives
    // ========================================================================

    fn eval_media(
        &mut self,
        media: &MediaBlock,
        scope: &Scope,
        ctx: &Context,
        out: &mut Vec<RenderNode>,
    ) -> Result<()> {
        let queries = self.media_queries(&media.queries, scope, &media.position)?;
        let combined: Vec<String> = match &ctx.media {
            Some(outer) => outer
                .iter()
                .flat_map(|o| queries.iter().map(move |q| format!("{o} and {q}")))
                .collect(),
            None => queries,
        };
        let query = combined.join(", ");

        let frame = self.env.new_frame();
        let inner = scope.push(frame);
        let body = self.prepare_body(&media.rules, &inner, &[])?;
        let inner_ctx = Context {
            media: Some(Rc::new(combined)),
            at_root: false,
            ..ctx.clone()
        };

        let mut items = Vec::new();
        let mut nested = Vec::new();
        self.eval_rules(&body, &inner, &inner_ctx, &mut items, &mut nested)?;

        let mut children = Vec::new();
        let mut bubbled = Vec::new();
        let mut media_items = Vec::new();
        if !items.is_empty() {
            match &ctx.selectors {
                Some(paths) => children.push(RenderNode::Ruleset(RenderRuleset {
                    selectors: paths.iter().map(SelectorPath::to_css).collect(),
                    items,
                    origin: ctx.origin.clone().unwrap_or_else(|| Origin {
                        file: media.position.file.clone(),
                        line: media.position.line,
                    }),
                })),
                None => media_items = items,
            }
        }
        for node in nested {
            match node {
                RenderNode::Media { .. } => bubbled.push(node),
                other => children.push(other),
            }
        }

        let node = RenderNode::Media {
            query,
            items: media_items,
            children,
        };
        if !node.is_empty() {
            out.push(node);
        }
        out.extend(bubbled);
        Ok(())
    }

    /// Each query of a list as CSS text.
    fn media_queries(
        &mut self,
        queries: &[MediaQuery],
        scope: &Scope,
        position: &Position,
    ) -> Result<Vec<String>> {
        let mut result = Vec::with_capacity(queries.len());
        for query in queries {
            let mut parts = Vec::with_capacity(query.items.len());
            for item in &query.items {
                let text = match item {
                    MediaItem::Keyword(word) => word.clone(),
                    MediaItem::Variable(name) => self.variable(name, scope, position)?.to_unquoted(),
                    MediaItem::Feature { name, value } => {
                        let name = self.interpolate_pieces(name, scope, position)?;
                        match value {
                            Some(value) => {
                                let value = self.eval_expr(value, scope, OpMode::Slash)?;
                                format!("({}: {})", name, value.to_css())
                            }
                            None => format!("({name})"),
                        }
                    }
                };
                parts.push(text);
            }
            result.push(parts.join(" "));
        }
        Ok(result)
    }

    fn eval_directive(
        &mut self,
        directive: &Directive,
        scope: &Scope,
        ctx: &Context,
        out: &mut Vec<RenderNode>,
    ) -> Result<()> {
        let name = directive.name.clone();
        let params = self
            .interpolate_pieces(&directive.params, scope, &directive.position)?
            .trim()
            .to_string();

        let Some(rules) = &directive.rules else {
            let node = RenderNode::Directive {
                name: name.clone(),
                params,
                block: None,
            };
            if name.eq_ignore_ascii_case("charset") {
                if self.charset.is_none() {
                    self.charset = Some(node);
                }
            } else {
                out.push(node);
            }
            return Ok(());
        };

        // Conditional group rules keep the selector context; others start fresh.
        let bare = name.trim_start_matches('-');
        let conditional = ["supports", "document", "moz-document", "container"]
            .iter()
            .any(|n| bare.eq_ignore_ascii_case(n));
        let wraps = conditional && ctx.selectors.is_some();
        let inner_ctx = if wraps {
            Context {
                at_root: false,
                ..ctx.clone()
            }
        } else {
            Context {
                selectors: None,
                media: None,
                origin: ctx.origin.clone(),
                important: ctx.important,
                at_root: false,
            }
        };

        let frame = self.env.new_frame();
        let inner = scope.push(frame);
        let body = self.prepare_body(rules, &inner, &[])?;
        let mut items = Vec::new();
        let mut children = Vec::new();
        self.eval_rules(&body, &inner, &inner_ctx, &mut items, &mut children)?;

        let block = match (&ctx.selectors, wraps) {
            (Some(paths), true) if !items.is_empty() => {
                let wrapped = RenderNode::Ruleset(RenderRuleset {
                    selectors: paths.iter().map(SelectorPath::to_css).collect(),
                    items,
                    origin: ctx.origin.clone().unwrap_or_else(|| Origin {
                        file: directive.position.file.clone(),
                        line: directive.position.line,
                    }),
                });
                children.insert(0, wrapped);
                DirectiveBlock {
                    items: Vec::new(),
                    children,
                }
            }
            _ => DirectiveBlock { items, children },
        };
        out.push(RenderNode::Directive {
            name,
            params,
            block: Some(block),
        });
        Ok(())
    }

    // ========================================================================
    // Imports
    // ========================================================================

    /// Replace LESS imports by the rules of the imported files.
    fn expand_imports(
        &mut self,
        rules: &[Node],
        frame: FrameId,
        scope: &Scope,
        out: &mut Vec<Node>,
    ) -> Result<()> {
        for node in rules {
            let Node::Import(import) = node else {
                out.push(node.clone());
                continue;
            };
            match self.resolve_import(import, scope)? {
                ImportResolution::Less { key, sheet } => {
                    self.check_cycle(&key, &import.position)?;
                    if self.chain.len() > self.options.max_depth {
                        return Err(LessError::RecursionLimit {
                            position: import.position.clone(),
                            limit: self.options.max_depth,
                        });
                    }
                    self.register(&sheet.rules, frame, scope);
                    self.chain.push(key);
                    let result = self.expand_imports(&sheet.rules, frame, scope, out);
                    self.chain.pop();
                    result?;
                }
                ImportResolution::Skip => {}
                ImportResolution::Css(_) | ImportResolution::Inline(_) => out.push(node.clone()),
            }
        }
        Ok(())
    }

    fn check_cycle(&self, key: &str, position: &Position) -> Result<()> {
        if self.chain.iter().any(|k| k == key) {
            let mut chain = self.chain.clone();
            chain.push(key.to_string());
            return Err(LessError::ImportCycle {
                position: position.clone(),
                chain,
            });
        }
        Ok(())
    }

    fn resolve_import(&mut self, import: &Import, scope: &Scope) -> Result<ImportResolution> {
        let memo = (import.position.file.clone(), import.position.offset);
        if let Some(resolution) = self.resolved_imports.get(&memo) {
            return Ok(resolution.clone());
        }

        let target = self.eval_expr(&import.target, scope, OpMode::Math)?;
        let (path, is_url) = match &target {
            Value::Url(url) => (url.trim_matches(['"', '\'']).to_string(), true),
            Value::Call { name, args } if name.eq_ignore_ascii_case("url") => (
                args.first().map(Value::to_unquoted).unwrap_or_default(),
                true,
            ),
            other => (other.to_unquoted(), false),
        };
        let media = self.media_queries(&import.media, scope, &import.position)?;
        let options = import.options;

        let css = options.contains(ImportOptions::CSS)
            || (!options.contains(ImportOptions::LESS)
                && !options.contains(ImportOptions::INLINE)
                && (path.ends_with(".css")
                    || !media.is_empty()
                    || (is_url && !path.ends_with(".less"))));

        let resolution = if css {
            let mut statement = format!("@import {}", target.to_css());
            if !media.is_empty() {
                statement.push(' ');
                statement.push_str(&media.join(", "));
            }
            statement.push(';');
            ImportResolution::Css(statement)
        } else {
            let path = if options.contains(ImportOptions::INLINE) || has_extension(&path) {
                path
            } else {
                format!("{path}.less")
            };
            let resolved = self
                .importer
                .resolve(&path, Some(&*import.position.file))
                .map_err(|err| match err {
                    LessError::Io { path, source, .. } => LessError::Io {
                        position: import.position.clone(),
                        path,
                        source,
                    },
                    other => other,
                })?;
            let Some(file) = resolved else {
                return Err(LessError::ImportNotFound {
                    position: import.position.clone(),
                    path,
                });
            };
            log::debug!("import {} resolved to {}", path, file.key);

            if options.contains(ImportOptions::INLINE) {
                ImportResolution::Inline(file.contents)
            } else {
                self.check_cycle(&file.key, &import.position)?;
                if self.imported.contains(&file.key) && !options.contains(ImportOptions::MULTIPLE) {
                    log::debug!("skipping {}: already imported", file.key);
                    ImportResolution::Skip
                } else {
                    self.imported.insert(file.key.clone());
                    let sheet = self.load(&file.key, &file.contents)?;
                    ImportResolution::Less {
                        key: file.key,
                        sheet,
                    }
                }
            }
        };
        self.resolved_imports.insert(memo, resolution.clone());
        Ok(resolution)
    }

    /// Parse an imported file, going through the cache.
    fn load(&self, key: &str, contents: &str) -> Result<Arc<Stylesheet>> {
        if let Some(sheet) = self.cache.get(key) {
            log::debug!("cache hit for {key}");
            return Ok(sheet);
        }
        log::debug!("cache miss for {key}");
        let sheet = Arc::new(parse_stylesheet(contents, key)?);
        self.cache.put(key, sheet.clone());
        Ok(sheet)
    }

    fn eval_import(&mut self, import: &Import, scope: &Scope, out: &mut Vec<RenderNode>) -> Result<()> {
        match self.resolve_import(import, scope)? {
            ImportResolution::Css(statement) => self.css_imports.push(RenderNode::Raw(statement)),
            ImportResolution::Inline(contents) => {
                out.push(RenderNode::Raw(contents.trim_end().to_string()))
            }
            ImportResolution::Less { .. } | ImportResolution::Skip => {}
        }
        Ok(())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub(crate) fn eval_expr(&mut self, expr: &Expression, scope: &Scope, mode: OpMode) -> Result<Value> {
        match &expr.kind {
            ExprKind::Number { value, unit, raw } => Ok(Value::Number {
                dim: Dimension::new(*value, unit.clone()),
                raw: Some(raw.clone()),
            }),
            ExprKind::Color(color) => Ok(Value::Color(color.clone())),
            ExprKind::Str {
                value,
                quote,
                escaped,
            } => {
                let value = self.interpolate_string(value, scope, &expr.position)?;
                Ok(Value::Str {
                    value,
                    quote: if *escaped { None } else { Some(*quote) },
                })
            }
            ExprKind::Keyword(word) => Ok(Value::Keyword(word.clone())),
            ExprKind::Url(url) => Ok(Value::Url(self.interpolate_string(url, scope, &expr.position)?)),
            ExprKind::Variable(name) => self.variable(name, scope, &expr.position),
            ExprKind::VariableVariable(name) => {
                let inner = self.variable(name, scope, &expr.position)?.to_unquoted();
                self.variable(inner.trim_start_matches('@'), scope, &expr.position)
            }
            ExprKind::Negative(inner) => match self.eval_expr(inner, scope, mode)? {
                Value::Number { dim, .. } => Ok(Value::number(-dim.value, dim.unit)),
                other => Ok(Value::Anonymous(format!("-{}", other.to_css()))),
            },
            ExprKind::Paren(inner) => {
                if mode == OpMode::Literal {
                    let value = self.eval_expr(inner, scope, mode)?;
                    return Ok(Value::Anonymous(format!("({})", value.to_css())));
                }
                self.eval_expr(inner, scope, OpMode::Math)
            }
            ExprKind::Operation { op, lhs, rhs } => {
                let child_mode = match (mode, op) {
                    (OpMode::Slash, Op::Div) => OpMode::Slash,
                    (OpMode::Literal, _) => OpMode::Literal,
                    _ => OpMode::Math,
                };
                let a = self.eval_expr(lhs, scope, child_mode)?;
                let b = self.eval_expr(rhs, scope, child_mode)?;
                match mode {
                    OpMode::Literal => Ok(Value::Anonymous(format!(
                        "{} {} {}",
                        a.to_css(),
                        op.symbol(),
                        b.to_css()
                    ))),
                    OpMode::Slash if *op == Op::Div => Ok(Value::List {
                        items: vec![a, b],
                        separator: Separator::Slash,
                    }),
                    _ => operate(*op, a, b, &expr.position),
                }
            }
            ExprKind::Call { name, args } => self.eval_call(name, args, scope, mode, &expr.position),
            ExprKind::Assignment { name, value } => {
                let value = self.eval_expr(value, scope, mode)?;
                Ok(Value::Anonymous(format!("{}={}", name, value.to_css())))
            }
            ExprKind::List { items, separator } => {
                let items = items
                    .iter()
                    .map(|item| self.eval_expr(item, scope, mode))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::List {
                    items,
                    separator: *separator,
                })
            }
            ExprKind::Anonymous(text) => Ok(Value::Anonymous(text.clone())),
        }
    }

    fn eval_call(
        &mut self,
        name: &str,
        args: &[Expression],
        scope: &Scope,
        mode: OpMode,
        position: &Position,
    ) -> Result<Value> {
        let lower = name.to_ascii_lowercase();
        let literal = mode == OpMode::Literal || lower == "calc" || lower.ends_with("-calc");
        let arg_mode = if literal { OpMode::Literal } else { OpMode::Math };
        let values = args
            .iter()
            .map(|arg| self.eval_expr(arg, scope, arg_mode))
            .collect::<Result<Vec<_>>>()?;

        if !literal {
            if let Some(builtin) = functions::lookup(&lower) {
                log::trace!("calling built-in {lower}");
                match builtin(&values) {
                    Ok(Some(value)) => return Ok(value),
                    Ok(None) => {}
                    Err(message) => {
                        return Err(LessError::Function {
                            position: position.clone(),
                            name: name.to_string(),
                            message,
                        });
                    }
                }
            }
        }
        Ok(Value::Call {
            name: name.to_string(),
            args: values,
        })
    }

    /// Resolve a variable reference.
    ///
    /// The bound expression is evaluated in the scope it was declared in,
    /// falling back to the frames of the reference site.
    pub(crate) fn variable(&mut self, name: &str, scope: &Scope, position: &Position) -> Result<Value> {
        let Some((frame, binding)) = self.env.lookup(scope, name) else {
            return Err(LessError::VariableNotFound {
                position: position.clone(),
                name: name.to_string(),
            });
        };
        match binding.clone() {
            Binding::Value(value) => Ok(value),
            Binding::Lazy {
                expr,
                scope: declared,
            } => {
                if self
                    .evaluating
                    .iter()
                    .any(|(f, n)| *f == frame && n == name)
                {
                    return Err(LessError::RecursiveVariable {
                        position: position.clone(),
                        name: name.to_string(),
                    });
                }
                if self.evaluating.len() >= self.options.max_depth {
                    return Err(LessError::RecursionLimit {
                        position: position.clone(),
                        limit: self.options.max_depth,
                    });
                }
                self.evaluating.push((frame, name.to_string()));
                let eval_scope = declared.with_fallback(scope);
                let result = self.eval_expr(&expr, &eval_scope, OpMode::Math);
                self.evaluating.pop();
                result
            }
        }
    }

    /// Replace `@{name}` in a string with the variable's unquoted value.
    fn interpolate_string(&mut self, text: &str, scope: &Scope, position: &Position) -> Result<String> {
        if !text.contains("@{") {
            return Ok(text.to_string());
        }
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("@{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) if is_variable_name(&after[..end]) => {
                    let value = self.variable(&after[..end], scope, position)?;
                    out.push_str(&value.to_unquoted());
                    rest = &after[end + 1..];
                }
                _ => {
                    out.push_str("@{");
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        Ok(out)
    }

    fn interpolate_pieces(&mut self, pieces: &[Piece], scope: &Scope, position: &Position) -> Result<String> {
        let mut out = String::new();
        for piece in pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Variable(name) => {
                    out.push_str(&self.variable(name, scope, position)?.to_unquoted())
                }
            }
        }
        Ok(out)
    }
}

fn is_variable_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Whether the last path segment has a file extension.
fn has_extension(path: &str) -> bool {
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    file.contains('.')
}
