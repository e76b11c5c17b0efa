//! Value expressions: lists, operations, literals and function calls.
//!
//! Precedence, loosest first:
//!
//! ```text
//! value_list  := space_list ("," space_list)*
//! space_list  := addition+
//! addition    := multiplication (("+" | "-") multiplication)*
//! multiplication := operand (("*" | "/") operand)*
//! operand     := "-"? primary
//! ```
//!
//! A `+` or `-` is only taken as a binary operator when it is followed by
//! whitespace or is not preceded by whitespace, so `1px -2px` is a list of
//! two values while `1px - 2px` and `1px-2px` are subtractions.

use crate::error::Result;
use crate::lexer::TokenKind;
use crate::parser::Parser;
use crate::parser::stylesheet::{ExprKind, Expression, Op};
use crate::types::{Color, Separator};

impl Parser {
    /// Comma-separated list of values.
    pub fn parse_value_list(&mut self) -> Result<Expression> {
        let first = self.parse_space_list()?;
        if !self.at_delim(',') {
            return Ok(first);
        }
        let position = first.position.clone();
        let mut items = vec![first];
        while self.eat_delim(',') {
            items.push(self.parse_space_list()?);
        }
        Ok(Expression::new(
            ExprKind::List {
                items,
                separator: Separator::Comma,
            },
            position,
        ))
    }

    /// Space-separated list of values.
    pub fn parse_space_list(&mut self) -> Result<Expression> {
        let first = self.parse_addition()?;
        let position = first.position.clone();
        let mut items = vec![first];
        while self.starts_value() {
            items.push(self.parse_addition()?);
        }
        if items.len() == 1 {
            return Ok(items.remove(0));
        }
        Ok(Expression::new(
            ExprKind::List {
                items,
                separator: Separator::Space,
            },
            position,
        ))
    }

    /// Whether the next token can begin another item of a space list.
    fn starts_value(&self) -> bool {
        let token = self.peek();
        match &token.kind {
            TokenKind::Eof | TokenKind::Comment(_) | TokenKind::Ellipsis => false,
            TokenKind::Delim(c) => match c {
                '(' | '~' | '%' => true,
                '-' => {
                    let next = self.peek_nth(1);
                    !next.spaced
                        && matches!(
                            next.kind,
                            TokenKind::Number { .. }
                                | TokenKind::AtKeyword(_)
                                | TokenKind::Delim('(')
                        )
                }
                _ => false,
            },
            TokenKind::Ident(name) => !(name == "when" && token.spaced),
            _ => true,
        }
    }

    pub(crate) fn parse_addition(&mut self) -> Result<Expression> {
        let mut lhs = self.parse_multiplication()?;
        loop {
            let token = self.peek();
            let op = match token.kind {
                TokenKind::Delim('+') => Op::Add,
                TokenKind::Delim('-') => Op::Sub,
                _ => break,
            };
            let binary = !token.spaced || self.peek_nth(1).spaced;
            if !binary {
                break;
            }
            self.next();
            let rhs = self.parse_multiplication()?;
            let position = lhs.position.clone();
            lhs = Expression::new(
                ExprKind::Operation {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                position,
            );
        }
        Ok(lhs)
    }

    fn parse_multiplication(&mut self) -> Result<Expression> {
        let mut lhs = self.parse_operand()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Delim('*') => Op::Mul,
                TokenKind::Delim('/') => Op::Div,
                _ => break,
            };
            self.next();
            let rhs = self.parse_operand()?;
            let position = lhs.position.clone();
            lhs = Expression::new(
                ExprKind::Operation {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                position,
            );
        }
        Ok(lhs)
    }

    fn parse_operand(&mut self) -> Result<Expression> {
        if self.at_delim('-') && !self.peek_nth(1).spaced {
            let minus = self.next();
            let operand = self.parse_primary()?;
            let kind = match operand.kind {
                ExprKind::Number { value, unit, raw } => ExprKind::Number {
                    value: -value,
                    unit,
                    raw: format!("-{raw}"),
                },
                other => ExprKind::Negative(Box::new(Expression::new(other, operand.position))),
            };
            return Ok(Expression::new(kind, minus.position));
        }
        self.parse_primary()
    }

    /// A single literal, variable, call or parenthesized expression.
    pub fn parse_primary(&mut self) -> Result<Expression> {
        let token = self.peek().clone();
        let position = token.position.clone();
        let kind = match &token.kind {
            TokenKind::Number { value, unit } => {
                self.next();
                ExprKind::Number {
                    value: *value,
                    unit: unit.clone(),
                    raw: token.text.clone(),
                }
            }
            TokenKind::Hash(name) => {
                self.next();
                match Color::from_hex(name) {
                    Some(mut color) => {
                        color.raw = Some(token.text.clone());
                        ExprKind::Color(color)
                    }
                    None => ExprKind::Keyword(token.text.clone()),
                }
            }
            TokenKind::Str { value, quote } => {
                self.next();
                ExprKind::Str {
                    value: value.clone(),
                    quote: *quote,
                    escaped: false,
                }
            }
            TokenKind::Delim('~') => {
                self.next();
                let string = self.next();
                match string.kind {
                    TokenKind::Str { value, quote } => ExprKind::Str {
                        value,
                        quote,
                        escaped: true,
                    },
                    _ => {
                        return Err(crate::error::LessError::Parse {
                            position: string.position.clone(),
                            expected: "a string after '~'".into(),
                            found: string.describe(),
                        });
                    }
                }
            }
            TokenKind::Url(url) => {
                self.next();
                ExprKind::Url(url.clone())
            }
            TokenKind::AtKeyword(name) | TokenKind::Interpolation(name) => {
                self.next();
                ExprKind::Variable(name.clone())
            }
            TokenKind::VariableVariable(name) => {
                self.next();
                ExprKind::VariableVariable(name.clone())
            }
            TokenKind::Delim('(') => {
                self.next();
                let inner = self.nested(Self::parse_space_list)?;
                self.expect_delim(')')?;
                ExprKind::Paren(Box::new(inner))
            }
            TokenKind::Delim('%') if self.peek_nth(1).is_delim('(') => {
                self.next();
                let args = self.parse_call_args()?;
                ExprKind::Call {
                    name: "%".into(),
                    args,
                }
            }
            TokenKind::Ident(name) => {
                self.next();
                let next = self.peek();
                if next.is_delim('(') && !next.spaced {
                    let args = self.parse_call_args()?;
                    ExprKind::Call {
                        name: name.clone(),
                        args,
                    }
                } else {
                    ExprKind::Keyword(name.clone())
                }
            }
            _ => return Err(self.unexpected("a value")),
        };
        Ok(Expression::new(kind, position))
    }

    /// `( arg, arg, ... )` where an argument may be `name=value`.
    fn parse_call_args(&mut self) -> Result<Vec<Expression>> {
        self.nested(Self::parse_call_args_inner)
    }

    fn parse_call_args_inner(&mut self) -> Result<Vec<Expression>> {
        self.expect_delim('(')?;
        let mut args = Vec::new();
        if self.eat_delim(')') {
            return Ok(args);
        }
        loop {
            let token = self.peek().clone();
            let arg = match &token.kind {
                TokenKind::Ident(name) if self.peek_nth(1).is_delim('=') => {
                    self.next();
                    self.next();
                    let value = self.parse_space_list()?;
                    Expression::new(
                        ExprKind::Assignment {
                            name: name.clone(),
                            value: Box::new(value),
                        },
                        token.position.clone(),
                    )
                }
                _ => self.parse_space_list()?,
            };
            args.push(arg);
            if self.eat_delim(')') {
                break;
            }
            self.expect_delim(',')?;
        }
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse_value;
    use crate::parser::stylesheet::{ExprKind, Expression, Op};
    use crate::types::Separator;

    fn value(source: &str) -> Expression {
        parse_value(source, "test.less").unwrap()
    }

    #[test]
    fn spaced_minus_starts_a_new_term() {
        let ExprKind::List { items, separator } = value("10px -5px").kind else {
            panic!("expected list");
        };
        assert_eq!(separator, Separator::Space);
        assert!(matches!(&items[1].kind, ExprKind::Number { value, .. } if *value == -5.0));
    }

    #[test]
    fn minus_between_spaces_subtracts() {
        assert!(matches!(
            value("10px - 5px").kind,
            ExprKind::Operation { op: Op::Sub, .. }
        ));
        assert!(matches!(
            value("10px-5px").kind,
            ExprKind::Operation { op: Op::Sub, .. }
        ));
    }

    #[test]
    fn multiplication_binds_tighter() {
        let ExprKind::Operation { op, rhs, .. } = value("1 + 2 * 3").kind else {
            panic!("expected operation");
        };
        assert_eq!(op, Op::Add);
        assert!(matches!(rhs.kind, ExprKind::Operation { op: Op::Mul, .. }));
    }

    #[test]
    fn numbers_keep_raw_text() {
        assert!(matches!(
            value(".50em").kind,
            ExprKind::Number { ref raw, .. } if raw == ".50em"
        ));
    }

    #[test]
    fn colors_and_keywords() {
        assert!(matches!(value("#fff").kind, ExprKind::Color(_)));
        assert!(matches!(value("red").kind, ExprKind::Keyword(_)));
    }

    #[test]
    fn function_calls_with_assignment() {
        let ExprKind::Call { name, args } = value("alpha(opacity=50)").kind else {
            panic!("expected call");
        };
        assert_eq!(name, "alpha");
        assert!(matches!(args[0].kind, ExprKind::Assignment { .. }));
    }

    #[test]
    fn escaped_strings() {
        assert!(matches!(
            value("~\"ms:foo\"").kind,
            ExprKind::Str { escaped: true, .. }
        ));
    }

    #[test]
    fn negated_variable() {
        assert!(matches!(value("-@x").kind, ExprKind::Negative(_)));
    }

    #[test]
    fn comma_lists() {
        let ExprKind::List { items, separator } = value("a b, c").kind else {
            panic!("expected list");
        };
        assert_eq!(separator, Separator::Comma);
        assert_eq!(items.len(), 2);
    }
}
