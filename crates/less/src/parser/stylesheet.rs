//! Abstract syntax tree for parsed LESS stylesheets.
//!
//! The tree is immutable once parsed. Nodes that the evaluator needs to keep
//! around after the walk (rulesets and mixin definitions, which become mixin
//! candidates; variable values, which are evaluated lazily) are held behind
//! [`Arc`] so frames can share them without copying, and so a parsed
//! [`Stylesheet`] can sit in an import cache shared between threads.

use std::sync::Arc;

use bitflags::bitflags;

use crate::error::Position;
use crate::types::{Color, Separator};

/// A parsed stylesheet.
#[derive(Clone, Debug)]
pub struct Stylesheet {
    /// The file name or import key the stylesheet was parsed from.
    pub file: Arc<str>,
    pub rules: Vec<Node>,
}

/// A statement in a stylesheet or block body.
#[derive(Clone, Debug)]
pub enum Node {
    Ruleset(Arc<Ruleset>),
    Declaration(Declaration),
    Variable(VariableDeclaration),
    MixinDefinition(Arc<MixinDefinition>),
    MixinCall(MixinCall),
    Import(Import),
    Media(MediaBlock),
    Directive(Directive),
    Comment(Comment),
}

#[derive(Clone, Debug)]
pub struct Comment {
    pub text: String,
    pub position: Position,
}

/// A selector list with a body: `.a, .b when (@x) { ... }`.
#[derive(Clone, Debug)]
pub struct Ruleset {
    pub selectors: Vec<Selector>,
    pub guard: Option<Guard>,
    pub rules: Vec<Node>,
    pub position: Position,
}

impl Ruleset {
    /// Names this ruleset answers to when called as a mixin (`.a`, `#ns`).
    pub fn mixin_names(&self) -> impl Iterator<Item = String> + '_ {
        self.selectors.iter().filter_map(Selector::mixin_name)
    }
}

/// Part of a text fragment: literal text or an `@{name}` interpolation.
#[derive(Clone, Debug, PartialEq)]
pub enum Piece {
    Literal(String),
    Variable(String),
}

impl Piece {
    /// Concatenate literal pieces; `None` if any piece is interpolated.
    pub fn literal_text(pieces: &[Piece]) -> Option<String> {
        let mut text = String::new();
        for piece in pieces {
            match piece {
                Piece::Literal(s) => text.push_str(s),
                Piece::Variable(_) => return None,
            }
        }
        Some(text)
    }
}

/// How a selector element attaches to the one before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    /// Directly glued: `a.b`, `&:hover`.
    None,
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

impl Combinator {
    pub fn as_str(self) -> &'static str {
        match self {
            Combinator::None => "",
            Combinator::Descendant => " ",
            Combinator::Child => " > ",
            Combinator::AdjacentSibling => " + ",
            Combinator::GeneralSibling => " ~ ",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ElementValue {
    /// The parent selector `&`.
    Parent,
    Text(Vec<Piece>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub combinator: Combinator,
    pub value: ElementValue,
}

/// One complex selector of a selector list.
#[derive(Clone, Debug, PartialEq)]
pub struct Selector {
    pub elements: Vec<Element>,
}

impl Selector {
    pub fn has_parent_ref(&self) -> bool {
        self.elements
            .iter()
            .any(|e| e.value == ElementValue::Parent)
    }

    /// `Some(".name")` for a lone class or id selector without interpolation.
    pub fn mixin_name(&self) -> Option<String> {
        match self.elements.as_slice() {
            [Element {
                value: ElementValue::Text(pieces),
                ..
            }] => {
                let text = Piece::literal_text(pieces)?;
                let is_simple = (text.starts_with('.') || text.starts_with('#'))
                    && !text[1..].contains(['.', '#', ':', '[']);
                is_simple.then_some(text)
            }
            _ => None,
        }
    }
}

/// `property: value [!important];`
#[derive(Clone, Debug)]
pub struct Declaration {
    pub name: Vec<Piece>,
    pub value: Expression,
    pub important: bool,
    pub position: Position,
}

/// `@name: value;`
#[derive(Clone, Debug)]
pub struct VariableDeclaration {
    pub name: String,
    pub value: Arc<Expression>,
    pub position: Position,
}

/// A parametric mixin: `.m(@a; @b: 2) when (@a > 0) { ... }`.
#[derive(Clone, Debug)]
pub struct MixinDefinition {
    pub name: String,
    pub params: Vec<Param>,
    pub guard: Option<Guard>,
    pub rules: Vec<Node>,
    pub position: Position,
}

impl MixinDefinition {
    /// Number of arguments required (parameters without defaults or rest).
    pub fn required(&self) -> usize {
        self.params
            .iter()
            .filter(|p| match p {
                Param::Variable { default, .. } => default.is_none(),
                Param::Pattern(_) => true,
                Param::Rest(_) => false,
            })
            .count()
    }

    /// Whether the definition accepts any number of trailing arguments.
    pub fn variadic(&self) -> bool {
        self.params.iter().any(|p| matches!(p, Param::Rest(_)))
    }
}

#[derive(Clone, Debug)]
pub enum Param {
    /// `@name` or `@name: default`.
    Variable {
        name: String,
        default: Option<Expression>,
    },
    /// A literal value the argument must match: `.m(dark; @c)`.
    Pattern(Expression),
    /// `...` or `@name...`.
    Rest(Option<String>),
}

/// A mixin invocation: `#ns > .m(1px; red) !important;`.
#[derive(Clone, Debug)]
pub struct MixinCall {
    /// Selector path, e.g. `["#ns", ".m"]`.
    pub path: Vec<String>,
    pub args: Vec<Argument>,
    pub important: bool,
    pub position: Position,
}

impl MixinCall {
    pub fn display_name(&self) -> String {
        self.path.join(" > ")
    }
}

#[derive(Clone, Debug)]
pub struct Argument {
    pub name: Option<String>,
    pub value: Expression,
}

bitflags! {
    /// Options in `@import (less, once) "file";`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct ImportOptions: u8 {
        const LESS = 1 << 0;
        const CSS = 1 << 1;
        const INLINE = 1 << 2;
        const ONCE = 1 << 3;
        const MULTIPLE = 1 << 4;
    }
}

#[derive(Clone, Debug)]
pub struct Import {
    pub target: Expression,
    pub options: ImportOptions,
    pub media: Vec<MediaQuery>,
    pub position: Position,
}

#[derive(Clone, Debug)]
pub struct MediaBlock {
    pub queries: Vec<MediaQuery>,
    pub rules: Vec<Node>,
    pub position: Position,
}

/// One query of a comma-separated media query list.
#[derive(Clone, Debug)]
pub struct MediaQuery {
    pub items: Vec<MediaItem>,
}

#[derive(Clone, Debug)]
pub enum MediaItem {
    /// `screen`, `and`, `not`, `only`.
    Keyword(String),
    /// `(name)` or `(name: value)`.
    Feature {
        name: Vec<Piece>,
        value: Option<Expression>,
    },
    /// `@phone`: a variable holding a whole query.
    Variable(String),
}

/// Any other at-rule: `@charset "x";`, `@font-face { ... }`.
#[derive(Clone, Debug)]
pub struct Directive {
    pub name: String,
    pub params: Vec<Piece>,
    pub rules: Option<Vec<Node>>,
    pub position: Position,
}

/// `when` conditions; the outer list is OR-ed (comma separated).
#[derive(Clone, Debug)]
pub struct Guard {
    pub conditions: Vec<Condition>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

#[derive(Clone, Debug)]
pub enum Condition {
    Compare {
        op: CompareOp,
        lhs: Expression,
        rhs: Expression,
    },
    /// `(value)`: true when the value is the keyword `true`.
    Truthy(Expression),
    And(Vec<Condition>),
    Not(Box<Condition>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    pub fn symbol(self) -> char {
        match self {
            Op::Add => '+',
            Op::Sub => '-',
            Op::Mul => '*',
            Op::Div => '/',
        }
    }
}

#[derive(Clone, Debug)]
pub struct Expression {
    pub kind: ExprKind,
    pub position: Position,
}

impl Expression {
    pub fn new(kind: ExprKind, position: Position) -> Self {
        Self { kind, position }
    }
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    /// A numeric literal; `raw` is the source spelling.
    Number {
        value: f64,
        unit: String,
        raw: String,
    },
    Color(Color),
    /// A quoted string; `value` may contain `@{name}` interpolations.
    Str {
        value: String,
        quote: char,
        escaped: bool,
    },
    Keyword(String),
    Url(String),
    Variable(String),
    VariableVariable(String),
    Negative(Box<Expression>),
    Paren(Box<Expression>),
    Operation {
        op: Op,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Call {
        name: String,
        args: Vec<Expression>,
    },
    /// `opacity=50` inside `alpha(...)`.
    Assignment {
        name: String,
        value: Box<Expression>,
    },
    List {
        items: Vec<Expression>,
        separator: Separator,
    },
    /// Raw text kept verbatim (custom properties, unparseable values).
    Anonymous(String),
}
