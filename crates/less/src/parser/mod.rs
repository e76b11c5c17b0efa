//! LESS parsing and AST data structures.
//!
//! This module turns source text into a [`Stylesheet`]:
//!
//! - [`parse_stylesheet`]: main entry point (lexes, then parses)
//! - [`parse`]: parse an existing token stream
//! - [`parse_value`]: parse a standalone value, used for injected variables
//!
//! ## Submodules
//!
//! - [`stylesheet`]: AST node types
//! - [`selectors`]: selector lists and combinators
//! - [`values`]: expressions, operations and function calls
//! - [`mixins`]: mixin calls, mixin definitions and guards
//!
//! The parser is recursive descent over the token vector with backtracking
//! at the few places the grammar is ambiguous (declaration or nested ruleset,
//! mixin call or mixin definition). It stops at the first error; when every
//! alternative fails the error reported is the one that got furthest.
//!
//! ## Example
//!
//! ```rust
//! use less::parser::{parse_stylesheet, Node};
//!
//! let sheet = parse_stylesheet(".a { color: red; .b { width: 1px; } }", "input.less").unwrap();
//! let Node::Ruleset(rule) = &sheet.rules[0] else { panic!() };
//! assert_eq!(rule.rules.len(), 2);
//! ```

pub mod mixins;
pub mod selectors;
pub mod stylesheet;
pub mod values;

use std::sync::Arc;

pub use crate::parser::stylesheet::{
    Argument, Combinator, Comment, CompareOp, Condition, Declaration, Directive, Element,
    ElementValue, ExprKind, Expression, Guard, Import, ImportOptions, MediaBlock, MediaItem,
    MediaQuery, MixinCall, MixinDefinition, Node, Op, Param, Piece, Ruleset, Selector,
    Stylesheet, VariableDeclaration,
};

use crate::error::{LessError, Position, Result};
use crate::lexer::{Token, TokenKind, tokenize};

/// Lex and parse a whole stylesheet.
pub fn parse_stylesheet(source: &str, file: &str) -> Result<Stylesheet> {
    let tokens = tokenize(source, file)?;
    parse(tokens, file)
}

/// Parse a token stream produced by [`tokenize`].
pub fn parse(tokens: Vec<Token>, file: &str) -> Result<Stylesheet> {
    let mut parser = Parser::new(tokens, file);
    let rules = parser.parse_rules(true)?;
    if !parser.peek().is_eof() {
        return Err(parser.unexpected("a selector, at-rule or variable"));
    }
    Ok(Stylesheet {
        file: Arc::from(file),
        rules,
    })
}

/// Parse a standalone value such as `12px` or `"a" , b`.
pub fn parse_value(source: &str, file: &str) -> Result<Expression> {
    let tokens = tokenize(source, file)?;
    let mut parser = Parser::new(tokens, file);
    let value = parser.parse_value_list()?;
    parser.eat_delim(';');
    if !parser.peek().is_eof() {
        return Err(parser.unexpected("end of value"));
    }
    Ok(value)
}

/// Deepest nesting of blocks, parentheses and calls the parser accepts.
pub const MAX_NESTING: usize = 64;

/// Recursive-descent parser state.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Current nesting of blocks, parentheses and calls.
    depth: usize,
    /// The error from a failed alternative that got furthest into the input.
    furthest: Option<LessError>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>, file: &str) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let position = tokens
                .last()
                .map(|t| t.position.clone())
                .unwrap_or_else(|| Position::new(Arc::from(file), 1, 1, 0));
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                position,
                spaced: false,
            });
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
            furthest: None,
        }
    }

    // ========================================================================
    // Token access
    // ========================================================================

    /// Index of the next non-comment token at or after `from`.
    fn skip_comments_from(&self, mut from: usize) -> usize {
        while from + 1 < self.tokens.len() && matches!(self.tokens[from].kind, TokenKind::Comment(_))
        {
            from += 1;
        }
        from
    }

    /// The next significant token (comments skipped).
    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.skip_comments_from(self.pos)]
    }

    /// The `n`th significant token after the next one.
    pub(crate) fn peek_nth(&self, n: usize) -> &Token {
        let mut index = self.skip_comments_from(self.pos);
        for _ in 0..n {
            if index + 1 < self.tokens.len() {
                index = self.skip_comments_from(index + 1);
            }
        }
        &self.tokens[index]
    }

    /// The next token including comments.
    fn peek_raw(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn next(&mut self) -> Token {
        let index = self.skip_comments_from(self.pos);
        let token = self.tokens[index].clone();
        if !token.is_eof() {
            self.pos = index + 1;
        } else {
            self.pos = index;
        }
        token
    }

    pub(crate) fn at_delim(&self, c: char) -> bool {
        self.peek().is_delim(c)
    }

    pub(crate) fn eat_delim(&mut self, c: char) -> bool {
        if self.at_delim(c) {
            self.next();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_delim(&mut self, c: char) -> Result<Token> {
        if self.at_delim(c) {
            Ok(self.next())
        } else {
            Err(self.unexpected(&format!("'{c}'")))
        }
    }

    pub(crate) fn eat_ident(&mut self, name: &str) -> bool {
        if self.peek().is_ident(name) {
            self.next();
            true
        } else {
            false
        }
    }

    pub(crate) fn position(&self) -> Position {
        self.peek().position.clone()
    }

    pub(crate) fn unexpected(&self, expected: &str) -> LessError {
        let token = self.peek();
        LessError::Parse {
            position: token.position.clone(),
            expected: expected.to_string(),
            found: token.describe(),
        }
    }

    // ========================================================================
    // Backtracking
    // ========================================================================

    /// Run `f`; on failure rewind and remember the error if it got furthest.
    pub(crate) fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Option<T> {
        let start = self.pos;
        match f(self) {
            Ok(value) => Some(value),
            Err(err) => {
                self.record(err);
                self.pos = start;
                None
            }
        }
    }

    fn record(&mut self, err: LessError) {
        let offset = |e: &LessError| e.position().offset;
        let further = match &self.furthest {
            Some(LessError::RecursionLimit { .. }) => false,
            Some(_) if matches!(err, LessError::RecursionLimit { .. }) => true,
            Some(existing) => offset(&err) > offset(existing),
            None => true,
        };
        if further {
            self.furthest = Some(err);
        }
    }

    /// Pick between `err` and the furthest failed alternative.
    pub(crate) fn best_error(&mut self, err: LessError) -> LessError {
        let offset = |e: &LessError| e.position().offset;
        match self.furthest.take() {
            _ if matches!(err, LessError::RecursionLimit { .. }) => err,
            Some(furthest @ LessError::RecursionLimit { .. }) => furthest,
            Some(furthest) if offset(&furthest) > offset(&err) => furthest,
            _ => err,
        }
    }

    /// Run `f` one nesting level deeper, failing past [`MAX_NESTING`].
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING {
            return Err(LessError::RecursionLimit {
                position: self.position(),
                limit: MAX_NESTING,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Parse statements until `}` or end of input.
    pub(crate) fn parse_rules(&mut self, top_level: bool) -> Result<Vec<Node>> {
        let mut rules = Vec::new();
        loop {
            if let TokenKind::Comment(text) = &self.peek_raw().kind {
                rules.push(Node::Comment(Comment {
                    text: text.clone(),
                    position: self.peek_raw().position.clone(),
                }));
                self.pos += 1;
                continue;
            }
            if self.eat_delim(';') {
                continue;
            }
            let token = self.peek();
            if token.is_eof() || token.is_delim('}') {
                break;
            }
            let node = self.parse_statement(top_level)?;
            rules.push(node);
        }
        Ok(rules)
    }

    fn parse_statement(&mut self, top_level: bool) -> Result<Node> {
        self.furthest = None;
        let token = self.peek().clone();
        if let TokenKind::AtKeyword(name) = &token.kind {
            if self.peek_nth(1).is_delim(':') {
                return self.parse_variable_declaration().map(Node::Variable);
            }
            return match name.to_ascii_lowercase().as_str() {
                "import" => self.parse_import().map(Node::Import),
                "media" => self.parse_media().map(Node::Media),
                _ => self.parse_directive().map(Node::Directive),
            };
        }

        if token.is_delim('.') || matches!(token.kind, TokenKind::Hash(_)) {
            if let Some(call) = self.attempt(Self::parse_mixin_call) {
                return Ok(Node::MixinCall(call));
            }
            if let Some(def) = self.attempt(Self::parse_mixin_definition) {
                return Ok(Node::MixinDefinition(Arc::new(def)));
            }
        }

        if !top_level {
            if let Some(decl) = self.attempt(Self::parse_declaration) {
                return Ok(Node::Declaration(decl));
            }
        }

        match self.parse_ruleset() {
            Ok(ruleset) => Ok(Node::Ruleset(Arc::new(ruleset))),
            Err(err) => Err(self.best_error(err)),
        }
    }

    fn parse_variable_declaration(&mut self) -> Result<VariableDeclaration> {
        let token = self.next();
        let TokenKind::AtKeyword(name) = token.kind else {
            return Err(self.unexpected("a variable"));
        };
        self.expect_delim(':')?;
        let value = self.parse_value_list()?;
        self.end_of_statement()?;
        Ok(VariableDeclaration {
            name,
            value: Arc::new(value),
            position: token.position,
        })
    }

    /// A statement ends with `;` or right before the closing `}`.
    pub(crate) fn end_of_statement(&mut self) -> Result<()> {
        if self.eat_delim(';') || self.at_delim('}') || self.peek().is_eof() {
            Ok(())
        } else {
            Err(self.unexpected("';'"))
        }
    }

    fn parse_declaration(&mut self) -> Result<Declaration> {
        let position = self.position();
        let name = self.parse_property_name()?;
        self.expect_delim(':')?;

        let custom = Piece::literal_text(&name).is_some_and(|n| n.starts_with("--"));
        let start = self.pos;
        let parsed = if custom {
            None
        } else {
            self.attempt(|p| {
                let value = p.parse_value_list()?;
                let important = p.parse_important()?;
                if p.at_delim(';') || p.at_delim('}') || p.peek().is_eof() {
                    Ok((value, important))
                } else {
                    Err(p.unexpected("';'"))
                }
            })
        };

        let (value, important) = match parsed {
            Some(parsed) => parsed,
            None => {
                self.pos = start;
                self.parse_raw_value()?
            }
        };
        self.end_of_statement()?;
        Ok(Declaration {
            name,
            value,
            important,
            position,
        })
    }

    /// Property name: identifiers and `@{name}` interpolations glued together.
    fn parse_property_name(&mut self) -> Result<Vec<Piece>> {
        let mut pieces = Vec::new();
        loop {
            let token = self.peek();
            if !pieces.is_empty() && token.spaced {
                break;
            }
            match &token.kind {
                TokenKind::Ident(name) => pieces.push(Piece::Literal(name.clone())),
                TokenKind::Interpolation(name) => pieces.push(Piece::Variable(name.clone())),
                TokenKind::Delim('*') if pieces.is_empty() => pieces.push(Piece::Literal("*".into())),
                _ => break,
            }
            self.next();
        }
        if pieces.is_empty() {
            return Err(self.unexpected("a property name"));
        }
        Ok(pieces)
    }

    pub(crate) fn parse_important(&mut self) -> Result<bool> {
        if self.at_delim('!') {
            self.next();
            if !self.eat_ident("important") {
                return Err(self.unexpected("'important'"));
            }
            return Ok(true);
        }
        Ok(false)
    }

    /// Copy a declaration value through verbatim, up to `;` or `}`.
    fn parse_raw_value(&mut self) -> Result<(Expression, bool)> {
        let position = self.position();
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            let token = self.peek_raw();
            match &token.kind {
                TokenKind::Eof => break,
                TokenKind::Delim('(' | '[') => depth += 1,
                TokenKind::Delim(')' | ']') => depth = depth.saturating_sub(1),
                TokenKind::Delim(';' | '}') if depth == 0 => break,
                TokenKind::Delim('{') => return Err(self.unexpected("';'")),
                TokenKind::AtKeyword(_) | TokenKind::VariableVariable(_) => {
                    return Err(self.unexpected("a value"));
                }
                _ => {}
            }
            self.pos += 1;
        }
        let mut end = self.pos;
        let mut important = false;
        if end >= start + 2
            && self.tokens[end - 2].is_delim('!')
            && self.tokens[end - 1].is_ident("important")
        {
            important = true;
            end -= 2;
        }
        let text = raw_text(&self.tokens[start..end]);
        Ok((
            Expression::new(ExprKind::Anonymous(text), position),
            important,
        ))
    }

    fn parse_ruleset(&mut self) -> Result<Ruleset> {
        let position = self.position();
        let selectors = self.parse_selector_list()?;
        let guard = if self.peek().is_ident("when") {
            self.next();
            Some(self.parse_guard()?)
        } else {
            None
        };
        let rules = self.parse_block()?;
        Ok(Ruleset {
            selectors,
            guard,
            rules,
            position,
        })
    }

    /// `{ statements }`
    pub(crate) fn parse_block(&mut self) -> Result<Vec<Node>> {
        self.expect_delim('{')?;
        let rules = self.nested(|p| p.parse_rules(false))?;
        self.expect_delim('}')?;
        Ok(rules)
    }

    // ========================================================================
    // At-rules
    // ========================================================================

    fn parse_import(&mut self) -> Result<Import> {
        let position = self.next().position;
        let mut options = ImportOptions::empty();
        if self.eat_delim('(') {
            loop {
                let token = self.next();
                let flag = match &token.kind {
                    TokenKind::Ident(name) => match name.to_ascii_lowercase().as_str() {
                        "less" => ImportOptions::LESS,
                        "css" => ImportOptions::CSS,
                        "inline" => ImportOptions::INLINE,
                        "once" => ImportOptions::ONCE,
                        "multiple" => ImportOptions::MULTIPLE,
                        _ => {
                            return Err(LessError::Parse {
                                position: token.position.clone(),
                                expected: "an import option".into(),
                                found: token.describe(),
                            });
                        }
                    },
                    _ => {
                        return Err(LessError::Parse {
                            position: token.position.clone(),
                            expected: "an import option".into(),
                            found: token.describe(),
                        });
                    }
                };
                options |= flag;
                if self.eat_delim(')') {
                    break;
                }
                self.expect_delim(',')?;
            }
        }
        let target = self.parse_primary()?;
        let media = if self.at_delim(';') || self.at_delim('}') || self.peek().is_eof() {
            Vec::new()
        } else {
            self.parse_media_queries()?
        };
        self.end_of_statement()?;
        Ok(Import {
            target,
            options,
            media,
            position,
        })
    }

    fn parse_media(&mut self) -> Result<MediaBlock> {
        let position = self.next().position;
        let queries = self.parse_media_queries()?;
        let rules = self.parse_block()?;
        Ok(MediaBlock {
            queries,
            rules,
            position,
        })
    }

    fn parse_media_queries(&mut self) -> Result<Vec<MediaQuery>> {
        let mut queries = Vec::new();
        loop {
            let mut items = Vec::new();
            loop {
                let token = self.peek().clone();
                match &token.kind {
                    TokenKind::Ident(word) => {
                        self.next();
                        items.push(MediaItem::Keyword(word.clone()));
                    }
                    TokenKind::AtKeyword(name) => {
                        self.next();
                        items.push(MediaItem::Variable(name.clone()));
                    }
                    TokenKind::Delim('(') => {
                        self.next();
                        items.push(self.parse_media_feature()?);
                    }
                    _ => break,
                }
            }
            if items.is_empty() {
                return Err(self.unexpected("a media query"));
            }
            queries.push(MediaQuery { items });
            if !self.eat_delim(',') {
                break;
            }
        }
        Ok(queries)
    }

    /// The inside of `(name: value)`, after the opening parenthesis.
    fn parse_media_feature(&mut self) -> Result<MediaItem> {
        let mut name = Vec::new();
        loop {
            let token = self.peek();
            match &token.kind {
                TokenKind::Ident(text) => name.push(Piece::Literal(text.clone())),
                TokenKind::Interpolation(var) => name.push(Piece::Variable(var.clone())),
                _ => break,
            }
            self.next();
        }
        if name.is_empty() {
            return Err(self.unexpected("a media feature"));
        }
        let value = if self.eat_delim(':') {
            Some(self.parse_space_list()?)
        } else {
            None
        };
        self.expect_delim(')')?;
        Ok(MediaItem::Feature { name, value })
    }

    fn parse_directive(&mut self) -> Result<Directive> {
        let token = self.next();
        let TokenKind::AtKeyword(name) = token.kind else {
            return Err(self.unexpected("an at-rule"));
        };
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            let token = self.peek_raw();
            match &token.kind {
                TokenKind::Eof => break,
                TokenKind::Delim('(' | '[') => depth += 1,
                TokenKind::Delim(')' | ']') => depth = depth.saturating_sub(1),
                TokenKind::Delim('{' | ';' | '}') if depth == 0 => break,
                _ => {}
            }
            self.pos += 1;
        }
        let params = raw_pieces(&self.tokens[start..self.pos]);
        let rules = if self.at_delim('{') {
            Some(self.parse_block()?)
        } else {
            self.end_of_statement()?;
            None
        };
        Ok(Directive {
            name,
            params,
            rules,
            position: token.position,
        })
    }
}

/// Reconstruct source text from tokens, with one space wherever the source
/// had whitespace. Comments are dropped.
pub(crate) fn raw_text(tokens: &[Token]) -> String {
    let mut text = String::new();
    for token in tokens {
        if matches!(token.kind, TokenKind::Comment(_)) {
            continue;
        }
        if token.spaced && !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&token.text);
    }
    text
}

/// Like [`raw_text`] but keeping `@{name}` interpolations as pieces.
pub(crate) fn raw_pieces(tokens: &[Token]) -> Vec<Piece> {
    let mut pieces: Vec<Piece> = Vec::new();
    let mut first = true;
    for token in tokens {
        if matches!(token.kind, TokenKind::Comment(_)) {
            continue;
        }
        let space = if token.spaced && !first { " " } else { "" };
        first = false;
        match &token.kind {
            TokenKind::Interpolation(name) => {
                if !space.is_empty() {
                    push_literal(&mut pieces, space);
                }
                pieces.push(Piece::Variable(name.clone()));
            }
            _ => push_literal(&mut pieces, &format!("{space}{}", token.text)),
        }
    }
    pieces
}

/// Append literal text, merging with a trailing literal piece.
pub(crate) fn push_literal(pieces: &mut Vec<Piece>, text: &str) {
    if let Some(Piece::Literal(last)) = pieces.last_mut() {
        last.push_str(text);
    } else {
        pieces.push(Piece::Literal(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> Stylesheet {
        parse_stylesheet(source, "test.less").unwrap()
    }

    #[test]
    fn deep_block_nesting_is_rejected() {
        let source = format!("{}w: 1;{}", ".a {".repeat(300), "}".repeat(300));
        let err = parse_stylesheet(&source, "test.less").unwrap_err();
        assert!(matches!(err, LessError::RecursionLimit { limit: MAX_NESTING, .. }));

        let source = format!("{}w: 1;{}", ".a {".repeat(40), "}".repeat(40));
        assert!(parse_stylesheet(&source, "test.less").is_ok());
    }

    #[test]
    fn deep_parentheses_are_rejected() {
        let source = format!(".a {{ w: {}1{}; }}", "(".repeat(300), ")".repeat(300));
        let err = parse_stylesheet(&source, "test.less").unwrap_err();
        assert!(matches!(err, LessError::RecursionLimit { .. }));

        let source = format!(".a {{ w: {}1{}; }}", "(".repeat(20), ")".repeat(20));
        assert!(parse_stylesheet(&source, "test.less").is_ok());
    }

    #[test]
    fn deep_function_calls_are_rejected() {
        let source = format!(".a {{ w: {}1{}; }}", "f(".repeat(300), ")".repeat(300));
        let err = parse_stylesheet(&source, "test.less").unwrap_err();
        assert!(matches!(err, LessError::RecursionLimit { .. }));
    }

    #[test]
    fn parses_variables_and_rulesets() {
        let sheet = parse_ok("@x: 1px;\n.a { width: @x; }");
        assert_eq!(sheet.rules.len(), 2);
        assert!(matches!(sheet.rules[0], Node::Variable(_)));
        assert!(matches!(sheet.rules[1], Node::Ruleset(_)));
    }

    #[test]
    fn pseudo_class_selector_is_not_a_declaration() {
        let sheet = parse_ok(".a { a:hover { color: red; } }");
        let Node::Ruleset(outer) = &sheet.rules[0] else {
            panic!("expected ruleset");
        };
        assert!(matches!(outer.rules[0], Node::Ruleset(_)));
    }

    #[test]
    fn custom_properties_are_kept_raw() {
        let sheet = parse_ok(".a { --brand: calc(1px+2px) foo; }");
        let Node::Ruleset(rule) = &sheet.rules[0] else {
            panic!("expected ruleset");
        };
        let Node::Declaration(decl) = &rule.rules[0] else {
            panic!("expected declaration");
        };
        assert!(matches!(&decl.value.kind, ExprKind::Anonymous(text) if text == "calc(1px+2px) foo"));
    }

    #[test]
    fn important_flag_is_parsed() {
        let sheet = parse_ok(".a { color: red !important; }");
        let Node::Ruleset(rule) = &sheet.rules[0] else {
            panic!("expected ruleset");
        };
        let Node::Declaration(decl) = &rule.rules[0] else {
            panic!("expected declaration");
        };
        assert!(decl.important);
    }

    #[test]
    fn import_options_and_media() {
        let sheet = parse_ok("@import (css, once) \"a.css\" screen;");
        let Node::Import(import) = &sheet.rules[0] else {
            panic!("expected import");
        };
        assert_eq!(import.options, ImportOptions::CSS | ImportOptions::ONCE);
        assert_eq!(import.media.len(), 1);
    }

    #[test]
    fn statement_comments_are_nodes() {
        let sheet = parse_ok("/* top */\n.a { /* inner */ color: red; }");
        assert!(matches!(sheet.rules[0], Node::Comment(_)));
        let Node::Ruleset(rule) = &sheet.rules[1] else {
            panic!("expected ruleset");
        };
        assert!(matches!(rule.rules[0], Node::Comment(_)));
    }

    #[test]
    fn directive_params_are_raw() {
        let sheet = parse_ok("@charset \"utf-8\";\n@font-face { font-family: x; }");
        let Node::Directive(charset) = &sheet.rules[0] else {
            panic!("expected directive");
        };
        assert_eq!(charset.params, vec![Piece::Literal("\"utf-8\"".into())]);
        assert!(charset.rules.is_none());
        let Node::Directive(font) = &sheet.rules[1] else {
            panic!("expected directive");
        };
        assert_eq!(font.rules.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn missing_brace_reports_position() {
        let err = parse_stylesheet(".a { color: red;", "test.less").unwrap_err();
        match err {
            LessError::Parse { position, expected, .. } => {
                assert_eq!(position.line, 1);
                assert_eq!(expected, "'}'");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn parse_value_reads_a_list() {
        let value = parse_value("1px solid black", "vars").unwrap();
        assert!(matches!(value.kind, ExprKind::List { .. }));
    }
}
