//! Evaluated values.
//!
//! A [`Value`] is what an expression becomes once variables, operations and
//! function calls have been resolved. Values know how to print themselves as
//! CSS; nothing downstream of the evaluator inspects expressions.

use std::fmt;

use crate::types::color::Color;
use crate::types::dimension::Dimension;

/// How the items of a list are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Space,
    Comma,
    /// `font: 12px/1.5` style literal slash.
    Slash,
}

impl Separator {
    pub fn as_str(self) -> &'static str {
        match self {
            Separator::Space => " ",
            Separator::Comma => ", ",
            Separator::Slash => "/",
        }
    }
}

/// A fully evaluated value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A number. `raw` holds the source spelling while the number is untouched.
    Number { dim: Dimension, raw: Option<String> },
    Color(Color),
    /// A string. `quote` is `None` for escaped strings (`~"..."`, `e()`).
    Str { value: String, quote: Option<char> },
    Keyword(String),
    /// Contents of an unquoted `url(...)`.
    Url(String),
    /// A function call that is passed through to the output.
    Call { name: String, args: Vec<Value> },
    List { items: Vec<Value>, separator: Separator },
    /// Text copied through verbatim.
    Anonymous(String),
}

impl Value {
    pub fn number(value: f64, unit: impl Into<String>) -> Self {
        Value::Number {
            dim: Dimension::new(value, unit),
            raw: None,
        }
    }

    pub fn keyword(name: impl Into<String>) -> Self {
        Value::Keyword(name.into())
    }

    pub fn boolean(truth: bool) -> Self {
        Value::keyword(if truth { "true" } else { "false" })
    }

    pub fn escaped(text: impl Into<String>) -> Self {
        Value::Str {
            value: text.into(),
            quote: None,
        }
    }

    pub fn as_dimension(&self) -> Option<&Dimension> {
        match self {
            Value::Number { dim, .. } => Some(dim),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<&Color> {
        match self {
            Value::Color(color) => Some(color),
            _ => None,
        }
    }

    /// Whether the value is the keyword `true`.
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Keyword(k) if k == "true")
    }

    /// Text used when a value is spliced into a string or selector:
    /// strings lose their quotes, everything else prints as CSS.
    pub fn to_unquoted(&self) -> String {
        match self {
            Value::Str { value, .. } => value.clone(),
            other => other.to_css(),
        }
    }

    /// The value as CSS text.
    pub fn to_css(&self) -> String {
        match self {
            Value::Number { dim, raw } => match raw {
                Some(raw) => raw.clone(),
                None => dim.to_css(),
            },
            Value::Color(color) => color.to_css(),
            Value::Str { value, quote } => match quote {
                Some(q) => format!("{q}{value}{q}"),
                None => value.clone(),
            },
            Value::Keyword(k) => k.clone(),
            Value::Url(url) => format!("url({url})"),
            Value::Call { name, args } => {
                let args: Vec<String> = args.iter().map(Value::to_css).collect();
                format!("{}({})", name, args.join(", "))
            }
            Value::List { items, separator } => {
                let items: Vec<String> = items.iter().map(Value::to_css).collect();
                items.join(separator.as_str())
            }
            Value::Anonymous(text) => text.clone(),
        }
    }

    /// Items of a list, or the value itself as a one-item list.
    pub fn items(&self) -> Vec<&Value> {
        match self {
            Value::List { items, .. } => items.iter().collect(),
            other => vec![other],
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_keep_their_spelling() {
        let v = Value::Number {
            dim: Dimension::new(0.5, "em"),
            raw: Some(".50em".into()),
        };
        assert_eq!(v.to_css(), ".50em");
        assert_eq!(Value::number(0.5, "em").to_css(), "0.5em");
    }

    #[test]
    fn lists_join_with_separator() {
        let list = Value::List {
            items: vec![Value::number(1.0, "px"), Value::keyword("solid")],
            separator: Separator::Space,
        };
        assert_eq!(list.to_css(), "1px solid");
        let font = Value::List {
            items: vec![Value::number(12.0, "px"), Value::number(1.5, "")],
            separator: Separator::Slash,
        };
        assert_eq!(font.to_css(), "12px/1.5");
    }

    #[test]
    fn strings_print_quotes_unless_escaped() {
        let quoted = Value::Str {
            value: "a b".into(),
            quote: Some('"'),
        };
        assert_eq!(quoted.to_css(), "\"a b\"");
        assert_eq!(quoted.to_unquoted(), "a b");
        assert_eq!(Value::escaped("a b").to_css(), "a b");
    }

    #[test]
    fn calls_pass_through() {
        let call = Value::Call {
            name: "translate".into(),
            args: vec![Value::number(1.0, "px"), Value::number(2.0, "px")],
        };
        assert_eq!(call.to_string(), "translate(1px, 2px)");
    }
}
