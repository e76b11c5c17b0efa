//! Selector parsing.
//!
//! Selectors are read token by token. Tokens that touch (no whitespace
//! between them) are glued into one element; whitespace becomes a descendant
//! combinator unless an explicit `>`, `+` or `~` is present. `&` is kept as
//! its own element so the evaluator can substitute the parent path.
//!
//! ```text
//! .a > &-b:hover .@{c}
//! ^^   ^ ^^^^^^^ ^^^^^
//! |    | |       Text [".", @{c}] (Descendant)
//! |    | Text ["-b:hover"] (None)
//! |    Parent (Child)
//! Text [".a"] (None)
//! ```

use crate::error::Result;
use crate::lexer::TokenKind;
use crate::parser::stylesheet::{Combinator, Element, ElementValue, Piece, Selector};
use crate::parser::{Parser, push_literal, raw_pieces};

impl Parser {
    /// Parse a comma-separated selector list, stopping before `{` or `when`.
    pub fn parse_selector_list(&mut self) -> Result<Vec<Selector>> {
        let mut selectors = vec![self.parse_selector()?];
        while self.eat_delim(',') {
            selectors.push(self.parse_selector()?);
        }
        Ok(selectors)
    }

    /// Parse one complex selector.
    pub fn parse_selector(&mut self) -> Result<Selector> {
        let mut elements: Vec<Element> = Vec::new();
        let mut pending: Option<Combinator> = None;

        loop {
            let token = self.peek().clone();
            let explicit = match &token.kind {
                TokenKind::Eof | TokenKind::Delim('{' | ',' | ';' | '}' | ')') => break,
                TokenKind::Ident(word) if word == "when" && token.spaced && !elements.is_empty() => {
                    break;
                }
                TokenKind::Delim('>') => Some(Combinator::Child),
                TokenKind::Delim('+') => Some(Combinator::AdjacentSibling),
                TokenKind::Delim('~') => Some(Combinator::GeneralSibling),
                _ => None,
            };
            if let Some(combinator) = explicit {
                self.next();
                pending = Some(combinator);
                continue;
            }

            let combinator = match pending.take() {
                Some(combinator) => combinator,
                None if token.spaced && !elements.is_empty() => Combinator::Descendant,
                None => Combinator::None,
            };

            let value = match &token.kind {
                TokenKind::Delim('&') => {
                    self.next();
                    ElementValue::Parent
                }
                TokenKind::Delim('[') => ElementValue::Text(self.parse_bracketed('[', ']')?),
                TokenKind::Delim(':') => ElementValue::Text(self.parse_pseudo()?),
                TokenKind::Interpolation(name) => {
                    self.next();
                    ElementValue::Text(vec![Piece::Variable(name.clone())])
                }
                TokenKind::Str { .. } | TokenKind::AtKeyword(_) | TokenKind::Delim('(') => {
                    return Err(self.unexpected("a selector"));
                }
                _ => {
                    self.next();
                    ElementValue::Text(vec![Piece::Literal(token.text.clone())])
                }
            };
            push_element(&mut elements, combinator, value);
        }

        if elements.is_empty() {
            return Err(self.unexpected("a selector"));
        }
        Ok(Selector { elements })
    }

    /// `:name`, `::name` and `:name(args)`.
    fn parse_pseudo(&mut self) -> Result<Vec<Piece>> {
        let mut pieces = vec![Piece::Literal(":".into())];
        self.next();
        if self.at_delim(':') && !self.peek().spaced {
            self.next();
            push_literal(&mut pieces, ":");
        }
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::Ident(name) if !token.spaced => push_literal(&mut pieces, name),
            TokenKind::Interpolation(name) if !token.spaced => {
                pieces.push(Piece::Variable(name.clone()))
            }
            _ => return Err(self.unexpected("a pseudo-class name")),
        }
        self.next();
        if self.at_delim('(') && !self.peek().spaced {
            let args = self.parse_bracketed('(', ')')?;
            for piece in args {
                match piece {
                    Piece::Literal(text) => push_literal(&mut pieces, &text),
                    variable => pieces.push(variable),
                }
            }
        }
        Ok(pieces)
    }

    /// Copy a bracketed group through as text, from `open` to the matching `close`.
    fn parse_bracketed(&mut self, open: char, close: char) -> Result<Vec<Piece>> {
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            let token = self.next();
            if token.is_eof() {
                return Err(self.unexpected(&format!("'{close}'")));
            }
            if token.is_delim(open) {
                depth += 1;
            } else if token.is_delim(close) {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
        }
        let mut pieces = raw_pieces(&self.tokens[start..self.pos]);
        if let Some(Piece::Literal(first)) = pieces.first_mut() {
            *first = first.trim_start().to_string();
        }
        Ok(pieces)
    }
}

/// Add an element, gluing it to the previous text element when no combinator
/// separates them.
fn push_element(elements: &mut Vec<Element>, combinator: Combinator, value: ElementValue) {
    if combinator == Combinator::None {
        if let (
            Some(Element {
                value: ElementValue::Text(last),
                ..
            }),
            ElementValue::Text(pieces),
        ) = (elements.last_mut(), &value)
        {
            for piece in pieces {
                match piece {
                    Piece::Literal(text) => push_literal(last, text),
                    variable => last.push(variable.clone()),
                }
            }
            return;
        }
    }
    elements.push(Element { combinator, value });
}
