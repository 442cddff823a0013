//! Reduction of a token stream into filter statements
//!
//! The reducer walks the tokens front to back with an index cursor, reading
//! every token exactly once. Statements accumulate as top-level siblings
//! (implicit `or`); `and` reopens the most recent statement so the next
//! operand lands in it, which gives `and` its tighter binding. `not` (alone
//! or after `and`/`or`) redirects the next operand into a negation.

use log::trace;

use super::tokenizer::{Operator, Token, TokenKind};
use crate::ast::{Comparator, Criterion, FilterNode, Literal};
use crate::error::{FilterError, Result};

pub(crate) struct Reducer<'t, 'a> {
    tokens: &'t [Token<'a>],
    cursor: usize,
    /// Group nesting level of the tokens
    depth: usize,
    max_depth: usize,
}

impl<'t, 'a> Reducer<'t, 'a> {
    pub(crate) fn new(tokens: &'t [Token<'a>], depth: usize, max_depth: usize) -> Self {
        Self {
            tokens,
            cursor: 0,
            depth,
            max_depth,
        }
    }

    fn peek(&self) -> Option<&'t Token<'a>> {
        self.tokens.get(self.cursor)
    }

    fn next(&mut self) -> Option<&'t Token<'a>> {
        let token = self.tokens.get(self.cursor)?;
        self.cursor += 1;
        Some(token)
    }

    /// Consume every token, returning the top-level statements
    pub(crate) fn reduce(mut self) -> Result<Vec<FilterNode>> {
        let mut results: Vec<FilterNode> = Vec::new();

        while let Some(token) = self.next() {
            let statement = match &token.kind {
                TokenKind::Operator(operator) => self.join(*operator, &mut results)?,
                _ => self.operand(token, FilterNode::default())?,
            };
            results.push(statement);
        }

        Ok(results)
    }

    /// Apply a logical operator and its operand
    ///
    /// `and` continues the most recent statement, `or` and `not` start a new
    /// one. The returned statement goes back onto the results.
    fn join(&mut self, operator: Operator, results: &mut Vec<FilterNode>) -> Result<FilterNode> {
        let mut statement = match operator {
            Operator::And => results.pop().unwrap_or_default(),
            Operator::Or | Operator::Not => FilterNode::default(),
        };

        let mut joining = operator;
        if joining != Operator::Not && self.peek_is_not() {
            self.next();
            joining = Operator::Not;
        }
        trace!("joining next operand with '{}'", joining.keyword());

        let token = self.next().ok_or_else(|| FilterError::MissingOperand {
            operator: joining.keyword().to_string(),
        })?;

        if joining == Operator::Not {
            let negated = self.negation(token)?;
            statement.negate(negated);
            Ok(statement)
        } else {
            self.operand(token, statement)
        }
    }

    fn peek_is_not(&self) -> bool {
        matches!(
            self.peek().map(|token| &token.kind),
            Some(TokenKind::Operator(Operator::Not))
        )
    }

    /// Add a group or attribute criterion to `statement`
    fn operand(&mut self, token: &'t Token<'a>, mut statement: FilterNode) -> Result<FilterNode> {
        match &token.kind {
            TokenKind::Group(statements) => statement.add_group(statements.clone()),
            TokenKind::Word(attribute) => self.attribute(&mut statement, attribute)?,
            _ => return Err(unexpected(token)),
        }
        Ok(statement)
    }

    /// Statements negated by the unit starting at `token`
    ///
    /// Each further `not` in a chain wraps one more negation and counts
    /// toward the nesting limit like a group level.
    fn negation(&mut self, mut token: &'t Token<'a>) -> Result<Vec<FilterNode>> {
        let mut nested = 0;
        while matches!(token.kind, TokenKind::Operator(Operator::Not)) {
            nested += 1;
            if self.depth + nested > self.max_depth {
                return Err(FilterError::TooDeep {
                    max_depth: self.max_depth,
                });
            }
            token = self.next().ok_or_else(|| FilterError::MissingOperand {
                operator: Operator::Not.keyword().to_string(),
            })?;
        }

        let mut statements = match &token.kind {
            TokenKind::Group(statements) => statements.clone(),
            TokenKind::Word(attribute) => {
                let mut statement = FilterNode::default();
                self.attribute(&mut statement, attribute)?;
                vec![statement]
            }
            _ => return Err(unexpected(token)),
        };

        for _ in 0..nested {
            statements = vec![FilterNode::negated(statements)];
        }
        Ok(statements)
    }

    /// Read the comparison or complex filter following an attribute path
    fn attribute(&mut self, statement: &mut FilterNode, attribute: &str) -> Result<()> {
        let criterion = match self.peek().map(|token| &token.kind) {
            Some(TokenKind::Comparator(comparator)) => {
                let comparator = *comparator;
                self.next();
                let value = if comparator.is_unary() {
                    None
                } else {
                    Some(self.value(attribute, comparator)?)
                };
                Criterion::Compare { comparator, value }
            }
            Some(TokenKind::Group(statements)) => {
                self.next();
                Criterion::Nested(statements.clone())
            }
            _ => {
                return Err(FilterError::MissingComparator {
                    attribute: attribute.to_string(),
                })
            }
        };

        statement.insert_criterion(attribute.to_string(), criterion);
        Ok(())
    }

    /// Read the literal compared against
    fn value(&mut self, attribute: &str, comparator: Comparator) -> Result<Literal> {
        let Some(token) = self.next() else {
            return Err(FilterError::MissingValue {
                attribute: attribute.to_string(),
                comparator: comparator.keyword().to_string(),
            });
        };

        match &token.kind {
            TokenKind::Number(number) => Ok(number.clone()),
            TokenKind::Value(value) => Ok(Literal::String((*value).to_string())),
            TokenKind::Word(word) if word.eq_ignore_ascii_case("true") => Ok(Literal::Bool(true)),
            TokenKind::Word(word) if word.eq_ignore_ascii_case("false") => Ok(Literal::Bool(false)),
            TokenKind::Word(word) if word.eq_ignore_ascii_case("null") => Ok(Literal::Null),
            _ => Err(FilterError::InvalidValue {
                attribute: attribute.to_string(),
                comparator: comparator.keyword().to_string(),
                found: token.text.to_string(),
            }),
        }
    }
}

fn unexpected(token: &Token<'_>) -> FilterError {
    FilterError::UnexpectedToken {
        found: token.text.to_string(),
        position: token.position,
    }
}
