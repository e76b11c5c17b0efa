//! Mixin calls, mixin definitions and guard conditions.

use crate::error::{LessError, Result};
use crate::lexer::TokenKind;
use crate::parser::Parser;
use crate::parser::stylesheet::{
    Argument, CompareOp, Condition, ExprKind, Expression, Guard, MixinCall, MixinDefinition,
    Param,
};
use crate::types::Separator;

/// One argument as written, before `;`-mode regrouping.
struct RawArgument {
    name: Option<String>,
    value: Expression,
    /// The separator that followed the argument, if any.
    separator: Option<char>,
}

impl Parser {
    /// `.name` or `#name`.
    fn parse_mixin_segment(&mut self) -> Result<String> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::Hash(name) => {
                self.next();
                Ok(format!("#{name}"))
            }
            TokenKind::Delim('.') => {
                self.next();
                let ident = self.peek().clone();
                match &ident.kind {
                    TokenKind::Ident(name) if !ident.spaced => {
                        self.next();
                        Ok(format!(".{name}"))
                    }
                    _ => Err(self.unexpected("a mixin name")),
                }
            }
            _ => Err(self.unexpected("a mixin name")),
        }
    }

    /// `#ns > .m(args) !important;`
    pub fn parse_mixin_call(&mut self) -> Result<MixinCall> {
        let position = self.position();
        let mut path = vec![self.parse_mixin_segment()?];
        loop {
            if self.at_delim('>') {
                self.next();
                path.push(self.parse_mixin_segment()?);
                continue;
            }
            let token = self.peek();
            if token.is_delim('.') || matches!(token.kind, TokenKind::Hash(_)) {
                path.push(self.parse_mixin_segment()?);
                continue;
            }
            break;
        }

        let args = if self.at_delim('(') {
            self.next();
            self.parse_mixin_args()?
        } else {
            Vec::new()
        };
        let important = self.parse_important()?;
        if !(self.at_delim(';') || self.at_delim('}') || self.peek().is_eof()) {
            return Err(self.unexpected("';'"));
        }
        self.end_of_statement()?;
        Ok(MixinCall {
            path,
            args,
            important,
            position,
        })
    }

    /// Arguments after the opening parenthesis, through the closing one.
    ///
    /// When any `;` separates arguments, commas only build comma lists.
    fn parse_mixin_args(&mut self) -> Result<Vec<Argument>> {
        let mut raw: Vec<RawArgument> = Vec::new();
        while !self.eat_delim(')') {
            let name = match &self.peek().kind {
                TokenKind::AtKeyword(name) if self.peek_nth(1).is_delim(':') => {
                    let name = name.clone();
                    self.next();
                    self.next();
                    Some(name)
                }
                _ => None,
            };
            let value = self.parse_space_list()?;
            let separator = if self.eat_delim(',') {
                Some(',')
            } else if self.eat_delim(';') {
                Some(';')
            } else if self.at_delim(')') {
                None
            } else {
                return Err(self.unexpected("',' or ')'"));
            };
            raw.push(RawArgument {
                name,
                value,
                separator,
            });
        }

        if !raw.iter().any(|a| a.separator == Some(';')) {
            return Ok(raw
                .into_iter()
                .map(|a| Argument {
                    name: a.name,
                    value: a.value,
                })
                .collect());
        }

        let mut args = Vec::new();
        let mut group: Vec<RawArgument> = Vec::new();
        for arg in raw {
            let ends_group = arg.separator != Some(',');
            group.push(arg);
            if ends_group {
                args.push(group_argument(std::mem::take(&mut group)));
            }
        }
        if !group.is_empty() {
            args.push(group_argument(group));
        }
        Ok(args)
    }

    /// `.m(@a; @b: 2; ...) when (cond) { ... }`
    pub fn parse_mixin_definition(&mut self) -> Result<MixinDefinition> {
        let position = self.position();
        let name = self.parse_mixin_segment()?;
        let open = self.peek();
        if !open.is_delim('(') || open.spaced {
            return Err(self.unexpected("'('"));
        }
        self.next();

        let mut params = Vec::new();
        while !self.eat_delim(')') {
            let token = self.peek().clone();
            let param = match &token.kind {
                TokenKind::Ellipsis => {
                    self.next();
                    Param::Rest(None)
                }
                TokenKind::AtKeyword(var) => {
                    self.next();
                    if self.peek().kind == TokenKind::Ellipsis {
                        self.next();
                        Param::Rest(Some(var.clone()))
                    } else if self.eat_delim(':') {
                        Param::Variable {
                            name: var.clone(),
                            default: Some(self.parse_space_list()?),
                        }
                    } else {
                        Param::Variable {
                            name: var.clone(),
                            default: None,
                        }
                    }
                }
                _ => Param::Pattern(self.parse_space_list()?),
            };
            params.push(param);
            if !(self.eat_delim(',') || self.eat_delim(';') || self.at_delim(')')) {
                return Err(self.unexpected("',', ';' or ')'"));
            }
        }

        let guard = if self.eat_ident("when") {
            Some(self.parse_guard()?)
        } else {
            None
        };
        let rules = self.parse_block()?;
        Ok(MixinDefinition {
            name,
            params,
            guard,
            rules,
            position,
        })
    }

    // ========================================================================
    // Guards
    // ========================================================================

    /// Conditions after `when`: `(a) and (b), not (c)`.
    pub fn parse_guard(&mut self) -> Result<Guard> {
        let mut conditions = vec![self.parse_condition_and()?];
        while self.eat_delim(',') || self.eat_ident("or") {
            conditions.push(self.parse_condition_and()?);
        }
        Ok(Guard { conditions })
    }

    fn parse_condition_and(&mut self) -> Result<Condition> {
        let mut conditions = vec![self.parse_condition()?];
        while self.eat_ident("and") {
            conditions.push(self.parse_condition()?);
        }
        if conditions.len() == 1 {
            return Ok(conditions.remove(0));
        }
        Ok(Condition::And(conditions))
    }

    fn parse_condition(&mut self) -> Result<Condition> {
        self.nested(Self::parse_condition_inner)
    }

    fn parse_condition_inner(&mut self) -> Result<Condition> {
        if self.eat_ident("not") {
            return Ok(Condition::Not(Box::new(self.parse_condition()?)));
        }
        self.expect_delim('(')?;
        let lhs = self.parse_addition()?;
        let condition = match self.parse_compare_op()? {
            Some(op) => {
                let rhs = self.parse_addition()?;
                Condition::Compare { op, lhs, rhs }
            }
            None => Condition::Truthy(lhs),
        };
        self.expect_delim(')')?;
        Ok(condition)
    }

    /// `<`, `<=`, `=<`, `=`, `>=`, `=>`, `>`.
    fn parse_compare_op(&mut self) -> Result<Option<CompareOp>> {
        let first = match self.peek().kind {
            TokenKind::Delim(c @ ('<' | '>' | '=')) => c,
            _ => return Ok(None),
        };
        self.next();
        let second = match self.peek().kind {
            TokenKind::Delim(c @ ('<' | '>' | '=')) if !self.peek().spaced => Some(c),
            _ => None,
        };
        if second.is_some() {
            self.next();
        }
        let op = match (first, second) {
            ('<', None) => CompareOp::Lt,
            ('>', None) => CompareOp::Gt,
            ('=', None) => CompareOp::Eq,
            ('<', Some('=')) | ('=', Some('<')) => CompareOp::Le,
            ('>', Some('=')) | ('=', Some('>')) => CompareOp::Ge,
            _ => {
                let token = self.peek();
                return Err(LessError::Parse {
                    position: token.position.clone(),
                    expected: "a comparison operator".into(),
                    found: token.describe(),
                });
            }
        };
        Ok(Some(op))
    }
}

/// Merge comma-separated pieces of one `;`-delimited argument into a list.
fn group_argument(mut group: Vec<RawArgument>) -> Argument {
    let name = group.first_mut().and_then(|a| a.name.take());
    if group.len() == 1 {
        let arg = group.remove(0);
        return Argument {
            name,
            value: arg.value,
        };
    }
    let position = group[0].value.position.clone();
    let items = group.into_iter().map(|a| a.value).collect();
    Argument {
        name,
        value: Expression::new(
            ExprKind::List {
                items,
                separator: Separator::Comma,
            },
            position,
        ),
    }
}
