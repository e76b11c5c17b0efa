//! Lexer for LESS source text.
//!
//! Converts input text into a stream of positioned [`Token`]s. Whitespace and
//! `//` line comments are skipped; the only trace they leave is the
//! [`Token::spaced`] flag on the following token, which the parser needs to
//! tell descendant combinators and space-separated values apart. Block
//! comments are kept as [`TokenKind::Comment`] tokens so that statement-level
//! comments can be passed through to the output.

use std::sync::Arc;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, char, digit1},
    combinator::{opt, recognize},
    sequence::pair,
};

use crate::error::{LessError, Position, Result};

/// The kind of a token, with its decoded payload.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// An identifier: `color`, `-webkit-box`, `--custom`.
    Ident(String),
    /// `@name` (payload without the `@`).
    AtKeyword(String),
    /// `@@name` (payload without the `@@`).
    VariableVariable(String),
    /// `@{name}` (payload is the inner name).
    Interpolation(String),
    /// `#abc` (payload without the `#`). Color or id, decided by the parser.
    Hash(String),
    /// A number with an optional unit: `12`, `1.5em`, `.5`, `50%`.
    Number { value: f64, unit: String },
    /// A quoted string. `value` is the raw text between the quotes.
    Str { value: String, quote: char },
    /// The contents of an unquoted `url(...)`.
    Url(String),
    /// A block comment, including its delimiters.
    Comment(String),
    /// `...`
    Ellipsis,
    /// Any other single character.
    Delim(char),
    /// End of input.
    Eof,
}

/// A token produced by the lexer.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The source text the token was read from.
    pub text: String,
    pub position: Position,
    /// Whether whitespace or a line comment precedes the token.
    pub spaced: bool,
}

impl Token {
    pub fn is_delim(&self, c: char) -> bool {
        self.kind == TokenKind::Delim(c)
    }

    pub fn is_ident(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(ident) if ident.eq_ignore_ascii_case(name))
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// A short human-readable description for error messages.
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}

/// Lexer for LESS text.
///
/// The lexer is lazy: tokens are produced on demand by iterating. After the
/// [`TokenKind::Eof`] token has been yielded, iteration ends.
///
/// # Examples
///
/// ```
/// use less::lexer::{Lexer, TokenKind};
///
/// let tokens: Vec<_> = Lexer::new("a { b: 1px }", "input.less")
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(tokens.len(), 7);
/// assert_eq!(tokens[4].kind, TokenKind::Number { value: 1.0, unit: "px".into() });
/// ```
pub struct Lexer<'a> {
    input: &'a str,
    file: Arc<str>,
    pos: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str, file: &str) -> Self {
        Self {
            input,
            file: Arc::from(file),
            pos: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    /// Rewind to the start of the input.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.line = 1;
        self.column = 1;
        self.finished = false;
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.remaining().chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Advance over `len` bytes already recognized by a sub-parser.
    fn bump(&mut self, len: usize) {
        let end = self.pos + len;
        while self.pos < end {
            self.advance();
        }
    }

    fn here(&self) -> Position {
        Position::new(self.file.clone(), self.line, self.column, self.pos)
    }

    fn error(&self, found: char, message: &str) -> LessError {
        LessError::Lex {
            position: self.here(),
            found,
            message: message.to_string(),
        }
    }

    /// Skip whitespace and `//` comments. Returns whether anything was skipped.
    fn skip_trivia(&mut self) -> bool {
        let start = self.pos;
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_nth(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
        self.pos > start
    }

    fn next_token(&mut self) -> Result<Token> {
        let spaced = self.skip_trivia();
        let position = self.here();
        let start = self.pos;

        let kind = match self.peek() {
            None => TokenKind::Eof,
            Some(c) => self.consume(c)?,
        };

        Ok(Token {
            kind,
            text: self.input[start..self.pos].to_string(),
            position,
            spaced,
        })
    }

    fn consume(&mut self, c: char) -> Result<TokenKind> {
        match c {
            '/' if self.peek_nth(1) == Some('*') => self.consume_comment(),
            '"' | '\'' => self.consume_string(c),
            '@' => self.consume_at(),
            '#' => {
                self.advance();
                match name(self.remaining()) {
                    Ok((_, name)) => {
                        let name = name.to_string();
                        self.bump(name.len());
                        Ok(TokenKind::Hash(name))
                    }
                    Err(_) => Ok(TokenKind::Delim('#')),
                }
            }
            '.' if self.remaining().starts_with("...") => {
                self.bump(3);
                Ok(TokenKind::Ellipsis)
            }
            c if c.is_ascii_digit() => self.consume_number(),
            '.' if self.peek_nth(1).is_some_and(|n| n.is_ascii_digit()) => self.consume_number(),
            c if self.starts_ident(c) => self.consume_ident(),
            _ => {
                self.advance();
                Ok(TokenKind::Delim(c))
            }
        }
    }

    fn starts_ident(&self, c: char) -> bool {
        match c {
            '-' => self
                .peek_nth(1)
                .is_some_and(|n| is_name_start(n) || n == '-' || n == '\\'),
            '\\' => true,
            c => is_name_start(c),
        }
    }

    fn consume_comment(&mut self) -> Result<TokenKind> {
        let start = self.pos;
        let position = self.here();
        self.bump(2);
        loop {
            if self.remaining().starts_with("*/") {
                self.bump(2);
                return Ok(TokenKind::Comment(self.input[start..self.pos].to_string()));
            }
            if self.advance().is_none() {
                return Err(LessError::Lex {
                    position,
                    found: '*',
                    message: "unterminated block comment".to_string(),
                });
            }
        }
    }

    fn consume_string(&mut self, quote: char) -> Result<TokenKind> {
        let position = self.here();
        self.advance();
        let start = self.pos;
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    let value = self.input[start..self.pos].to_string();
                    self.advance();
                    return Ok(TokenKind::Str { value, quote });
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some('\n') | None => {
                    return Err(LessError::Lex {
                        position,
                        found: quote,
                        message: "unterminated string".to_string(),
                    });
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn consume_at(&mut self) -> Result<TokenKind> {
        self.advance();
        match self.peek() {
            Some('@') => {
                self.advance();
                let (_, name) = name(self.remaining())
                    .map_err(|_| self.error('@', "expected a variable name after '@@'"))?;
                let name = name.to_string();
                self.bump(name.len());
                Ok(TokenKind::VariableVariable(name))
            }
            Some('{') => {
                self.advance();
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c == '}' {
                        let name = self.input[start..self.pos].trim().to_string();
                        self.advance();
                        return Ok(TokenKind::Interpolation(name));
                    }
                    if !is_name_char(c) && !c.is_whitespace() {
                        break;
                    }
                    self.advance();
                }
                Err(self.error(self.peek().unwrap_or('{'), "unterminated interpolation"))
            }
            _ => match name(self.remaining()) {
                Ok((_, name)) => {
                    let name = name.to_string();
                    self.bump(name.len());
                    Ok(TokenKind::AtKeyword(name))
                }
                Err(_) => Ok(TokenKind::Delim('@')),
            },
        }
    }

    fn consume_number(&mut self) -> Result<TokenKind> {
        let (rest, digits) = number(self.remaining())
            .map_err(|_| self.error(self.peek().unwrap_or('0'), "malformed number"))?;
        if rest.starts_with('.') && !rest[1..].starts_with(|c: char| c.is_ascii_digit()) {
            let mut dot = self.here();
            dot.column += digits.chars().count();
            dot.offset += digits.len();
            return Err(LessError::Lex {
                position: dot,
                found: '.',
                message: "malformed number: expected digits after '.'".to_string(),
            });
        }
        let value: f64 = digits
            .parse()
            .map_err(|_| self.error(self.peek().unwrap_or('0'), "malformed number"))?;
        self.bump(digits.len());

        let unit = match unit(self.remaining()) {
            Ok((_, unit)) => unit.to_string(),
            Err(_) => String::new(),
        };
        self.bump(unit.len());
        Ok(TokenKind::Number { value, unit })
    }

    fn consume_ident(&mut self) -> Result<TokenKind> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.advance();
                if self.advance().is_none() {
                    return Err(self.error('\\', "incomplete escape sequence"));
                }
            } else if is_name_char(c) {
                self.advance();
            } else {
                break;
            }
        }
        let ident = self.input[start..self.pos].to_string();

        if ident.eq_ignore_ascii_case("url") && self.peek() == Some('(') {
            if let Some(url) = self.consume_unquoted_url()? {
                return Ok(TokenKind::Url(url));
            }
        }
        Ok(TokenKind::Ident(ident))
    }

    /// Consume `(...)` after `url` when its contents are unquoted.
    fn consume_unquoted_url(&mut self) -> Result<Option<String>> {
        let after_paren = self.remaining()[1..].trim_start();
        if after_paren.starts_with('"') || after_paren.starts_with('\'') {
            return Ok(None);
        }
        let position = self.here();
        self.advance();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == ')' {
                let url = self.input[start..self.pos].trim().to_string();
                self.advance();
                return Ok(Some(url));
            }
            self.advance();
        }
        Err(LessError::Lex {
            position,
            found: '(',
            message: "unterminated url()".to_string(),
        })
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        match &token {
            Ok(t) if t.is_eof() => self.finished = true,
            Err(_) => self.finished = true,
            _ => {}
        }
        Some(token)
    }
}

/// Tokenize a whole file, ending with an [`TokenKind::Eof`] token.
pub fn tokenize(text: &str, file: &str) -> Result<Vec<Token>> {
    Lexer::new(text, file).collect()
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

fn name(input: &str) -> IResult<&str, &str> {
    take_while1(is_name_char)(input)
}

fn number(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(pair(digit1, opt(pair(char('.'), digit1)))),
        recognize(pair(char('.'), digit1)),
    ))(input)
}

fn unit(input: &str) -> IResult<&str, &str> {
    alt((tag("%"), alpha1))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input, "test.less")
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lex_declaration() {
        assert_eq!(
            kinds("color: red;"),
            vec![
                TokenKind::Ident("color".into()),
                TokenKind::Delim(':'),
                TokenKind::Ident("red".into()),
                TokenKind::Delim(';'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_numbers_with_units() {
        assert_eq!(
            kinds("1.5em .5 50%"),
            vec![
                TokenKind::Number { value: 1.5, unit: "em".into() },
                TokenKind::Number { value: 0.5, unit: String::new() },
                TokenKind::Number { value: 50.0, unit: "%".into() },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_variables_and_interpolation() {
        assert_eq!(
            kinds("@a @@b @{c}"),
            vec![
                TokenKind::AtKeyword("a".into()),
                TokenKind::VariableVariable("b".into()),
                TokenKind::Interpolation("c".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_vendor_ident_and_minus() {
        assert_eq!(
            kinds("-webkit-box - 2"),
            vec![
                TokenKind::Ident("-webkit-box".into()),
                TokenKind::Delim('-'),
                TokenKind::Number { value: 2.0, unit: String::new() },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_unquoted_url() {
        assert_eq!(
            kinds("url(http://x.com/a.png)"),
            vec![TokenKind::Url("http://x.com/a.png".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lex_quoted_url_is_function() {
        assert_eq!(
            kinds("url('a.png')"),
            vec![
                TokenKind::Ident("url".into()),
                TokenKind::Delim('('),
                TokenKind::Str { value: "a.png".into(), quote: '\'' },
                TokenKind::Delim(')'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn line_comments_are_skipped_block_comments_kept() {
        assert_eq!(
            kinds("// gone\n/* kept */ a"),
            vec![
                TokenKind::Comment("/* kept */".into()),
                TokenKind::Ident("a".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tracks_lines_and_columns() {
        let tokens = tokenize("a {\n  b: c;\n}", "test.less").unwrap();
        let b = &tokens[2];
        assert_eq!(b.text, "b");
        assert_eq!(b.position.line, 2);
        assert_eq!(b.position.column, 3);
        assert!(b.spaced);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = tokenize("a: \"oops\n", "test.less").unwrap_err();
        match err {
            LessError::Lex { position, found, .. } => {
                assert_eq!(found, '"');
                assert_eq!(position.line, 1);
                assert_eq!(position.column, 4);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn unterminated_url_points_at_the_paren() {
        let err = tokenize("a {\n  b: url(x.png;\n}", "test.less").unwrap_err();
        let LessError::Lex { position, found, .. } = err else {
            panic!("expected a lex error");
        };
        assert_eq!(found, '(');
        assert_eq!((position.line, position.column), (2, 9));
    }

    #[test]
    fn malformed_number_is_an_error() {
        assert!(matches!(
            tokenize("width: 1.px;", "test.less"),
            Err(LessError::Lex { found: '.', .. })
        ));
    }

    #[test]
    fn lexer_is_restartable() {
        let mut lexer = Lexer::new("a b", "test.less");
        let first: Vec<_> = lexer.by_ref().collect();
        lexer.reset();
        let second: Vec<_> = lexer.collect();
        assert_eq!(first.len(), second.len());
    }
}
