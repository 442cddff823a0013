//! Lexical scanning of filter strings
//!
//! Each token pattern is a nom parser over the remaining input. The scan
//! loop tries them in priority order (number, quoted string, group, word)
//! after skipping whitespace, and stops at the first position no pattern
//! matches. Group contents are parsed recursively, so a group token already
//! carries its reduced statements.

use log::trace;
use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while},
    character::complete::{anychar, char, digit1, multispace1, one_of, satisfy},
    combinator::{map, opt, recognize},
    error::{Error, ErrorKind},
    multi::many0,
    sequence::delimited,
    IResult, Parser,
};

use super::{parse_statements, ParserOptions};
use crate::ast::{Comparator, FilterNode, Literal};
use crate::error::{FilterError, Result};

/// Logical operator keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operator {
    And,
    Or,
    Not,
}

impl Operator {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
        }
    }

    fn from_keyword(word: &str) -> Option<Self> {
        [Operator::And, Operator::Or, Operator::Not]
            .into_iter()
            .find(|operator| operator.keyword().eq_ignore_ascii_case(word))
    }
}

/// A scanned token with its source text and absolute byte position
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token<'a> {
    pub(crate) kind: TokenKind<'a>,
    pub(crate) text: &'a str,
    pub(crate) position: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind<'a> {
    Number(Literal),
    /// Quoted string body; escape sequences are kept as written
    Value(&'a str),
    /// Reduced statements of a `(...)` or `[...]` group
    Group(Vec<FilterNode>),
    Operator(Operator),
    Comparator(Comparator),
    /// Attribute path
    Word(&'a str),
}

enum Lexeme<'a> {
    Number(&'a str),
    Quoted(&'a str),
    Group(&'a str),
    Word(&'a str),
}

/// Scan `input` into tokens
///
/// `offset` is the position of `input` within the whole filter and `depth`
/// the group nesting level it was found at.
pub(crate) fn tokenize<'a>(
    input: &'a str,
    offset: usize,
    depth: usize,
    options: &ParserOptions,
) -> Result<Vec<Token<'a>>> {
    let mut tokens = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        if let Ok((next, _)) = whitespace(rest) {
            rest = next;
            continue;
        }

        let position = offset + (input.len() - rest.len());
        let Ok((next, scanned)) = lexeme(rest) else {
            return Err(leftover(rest, position));
        };
        let text = &rest[..rest.len() - next.len()];

        let kind = match scanned {
            Lexeme::Number(number) => TokenKind::Number(number_literal(number, position)?),
            Lexeme::Quoted(body) => TokenKind::Value(body),
            Lexeme::Group(body) => {
                let statements = parse_statements(body, position + 1, depth + 1, options)?;
                if statements.is_empty() {
                    return Err(FilterError::EmptyGroup { position });
                }
                TokenKind::Group(statements)
            }
            Lexeme::Word(word) => classify(word),
        };

        trace!("token {text:?} at position {position}");
        tokens.push(Token {
            kind,
            text,
            position,
        });
        rest = next;
    }

    Ok(tokens)
}

/// Describe input that no token pattern matches
fn leftover(rest: &str, position: usize) -> FilterError {
    match rest.chars().next() {
        Some(opening @ ('(' | '[')) => FilterError::MissingClosingBracket {
            opening,
            closing: closing_for(opening),
            position,
        },
        Some('"') => FilterError::UnterminatedString { position },
        _ => FilterError::UnexpectedToken {
            found: rest.split_whitespace().next().unwrap_or(rest).to_string(),
            position,
        },
    }
}

fn classify(word: &str) -> TokenKind<'_> {
    if let Some(operator) = Operator::from_keyword(word) {
        TokenKind::Operator(operator)
    } else if let Some(comparator) = Comparator::from_keyword(word) {
        TokenKind::Comparator(comparator)
    } else {
        TokenKind::Word(word)
    }
}

/// Integers that fit `i64` stay integers; everything else is a float
fn number_literal(number: &str, position: usize) -> Result<Literal> {
    if !number.contains(&['.', 'e', 'E'][..]) {
        if let Ok(int_val) = number.parse::<i64>() {
            return Ok(Literal::Int(int_val));
        }
    }
    match number.parse::<f64>() {
        Ok(float_val) if float_val.is_finite() => Ok(Literal::Float(float_val)),
        _ => Err(FilterError::InvalidNumber {
            number: number.to_string(),
            position,
        }),
    }
}

fn lexeme(input: &str) -> IResult<&str, Lexeme<'_>> {
    alt((
        map(number, Lexeme::Number),
        map(quoted, Lexeme::Quoted),
        map(group, Lexeme::Group),
        map(word, Lexeme::Word),
    ))
    .parse(input)
}

fn whitespace(input: &str) -> IResult<&str, &str> {
    multispace1(input)
}

/// `-12`, `3.5`, `6.02e23`, `1E-3`
fn number(input: &str) -> IResult<&str, &str> {
    recognize((
        opt(char('-')),
        digit1,
        opt((char('.'), digit1)),
        opt((one_of("eE"), opt(one_of("+-")), digit1)),
    ))
    .parse(input)
}

/// Double-quoted string; yields the body between the quotes untouched
fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(
        char('"'),
        recognize(many0(alt((
            is_not("\"\\"),
            recognize((char('\\'), anychar)),
        )))),
        char('"'),
    )
    .parse(input)
}

/// Bracketed group; yields the body between the outer brackets
///
/// Brackets must nest properly: `(` closes only with `)` and `[` only with
/// `]`. Brackets inside quoted strings are ignored.
fn group(input: &str) -> IResult<&str, &str> {
    let fail = || nom::Err::Error(Error::new(input, ErrorKind::Char));

    let mut chars = input.char_indices();
    let opening = match chars.next() {
        Some((_, opening @ ('(' | '['))) => opening,
        _ => return Err(fail()),
    };

    let mut expected = vec![closing_for(opening)];
    let mut in_string = false;
    let mut escaped = false;

    for (index, ch) in chars {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '(' | '[' => expected.push(closing_for(ch)),
            ')' | ']' => {
                if expected.pop() != Some(ch) {
                    return Err(fail());
                }
                if expected.is_empty() {
                    return Ok((&input[index + 1..], &input[1..index]));
                }
            }
            _ => {}
        }
    }

    Err(fail())
}

fn closing_for(opening: char) -> char {
    if opening == '(' {
        ')'
    } else {
        ']'
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Attribute path or keyword: a word character followed by word characters
/// or any of `-._:/%`
fn word(input: &str) -> IResult<&str, &str> {
    recognize((
        satisfy(is_word_char),
        take_while(|c: char| is_word_char(c) || matches!(c, '-' | '.' | ':' | '/' | '%')),
    ))
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenKind<'_>> {
        tokenize(input, 0, 0, &ParserOptions::default())
            .unwrap_or_else(|e| panic!("Failed to tokenize {input:?}: {e}"))
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_simple_comparison() {
        assert_eq!(
            kinds(r#"userName eq "bjensen""#),
            vec![
                TokenKind::Word("userName"),
                TokenKind::Comparator(Comparator::Eq),
                TokenKind::Value("bjensen"),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("1 -7 2.5 6.02e23 1E-3 99999999999999999999"),
            vec![
                TokenKind::Number(Literal::Int(1)),
                TokenKind::Number(Literal::Int(-7)),
                TokenKind::Number(Literal::Float(2.5)),
                TokenKind::Number(Literal::Float(6.02e23)),
                TokenKind::Number(Literal::Float(1e-3)),
                TokenKind::Number(Literal::Float(99_999_999_999_999_999_999.0)),
            ]
        );
    }

    #[test]
    fn test_number_out_of_range() {
        let err = tokenize("a eq 1e999", 0, 0, &ParserOptions::default()).unwrap_err();
        assert_eq!(
            err,
            FilterError::InvalidNumber {
                number: "1e999".to_string(),
                position: 5
            }
        );
    }

    #[test]
    fn test_quoted_string_keeps_escapes() {
        assert_eq!(
            kinds(r#""say \"hi\"" "back\\slash" "two
lines""#),
            vec![
                TokenKind::Value(r#"say \"hi\""#),
                TokenKind::Value(r"back\\slash"),
                TokenKind::Value("two\nlines"),
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            kinds("AND Or nOt EQ Pr"),
            vec![
                TokenKind::Operator(Operator::And),
                TokenKind::Operator(Operator::Or),
                TokenKind::Operator(Operator::Not),
                TokenKind::Comparator(Comparator::Eq),
                TokenKind::Comparator(Comparator::Pr),
            ]
        );
    }

    #[test]
    fn test_attribute_paths() {
        assert_eq!(
            kinds("name.givenName urn:ietf:params:scim:schemas:core:2.0:User:userName a-b/c%20"),
            vec![
                TokenKind::Word("name.givenName"),
                TokenKind::Word("urn:ietf:params:scim:schemas:core:2.0:User:userName"),
                TokenKind::Word("a-b/c%20"),
            ]
        );
    }

    #[test]
    fn test_whitespace_variants() {
        assert_eq!(
            kinds("\ttitle\n pr\r\n"),
            vec![
                TokenKind::Word("title"),
                TokenKind::Comparator(Comparator::Pr),
            ]
        );
    }

    #[test]
    fn test_group_is_reduced() {
        let tokens = tokenize(r#"emails[type eq "work"]"#, 0, 0, &ParserOptions::default()).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].position, 6);
        assert_eq!(tokens[1].text, r#"[type eq "work"]"#);
        assert_eq!(
            tokens[1].kind,
            TokenKind::Group(vec![FilterNode::comparison(
                "type",
                Comparator::Eq,
                Some(Literal::String("work".to_string()))
            )])
        );
    }

    #[test]
    fn test_group_balances_nested_brackets() {
        assert_eq!(group("((a) or (b)) and c"), Ok((" and c", "(a) or (b)")));
        assert_eq!(group("[x[y]]"), Ok(("", "x[y]")));
        assert_eq!(group(r#"(a eq ")(")"#), Ok(("", r#"a eq ")(""#)));
        assert!(group("(a]").is_err());
        assert!(group("(a").is_err());
    }

    #[test]
    fn test_nested_positions_are_absolute() {
        let err = tokenize("(a eq 1 and (b eq !))", 0, 0, &ParserOptions::default()).unwrap_err();
        assert_eq!(
            err,
            FilterError::UnexpectedToken {
                found: "!".to_string(),
                position: 18
            }
        );
    }

    #[test]
    fn test_leftover_errors() {
        let options = ParserOptions::default();

        assert_eq!(
            tokenize("(a eq 1", 0, 0, &options).unwrap_err(),
            FilterError::MissingClosingBracket {
                opening: '(',
                closing: ')',
                position: 0
            }
        );
        assert_eq!(
            tokenize("emails[type eq 1", 0, 0, &options).unwrap_err(),
            FilterError::MissingClosingBracket {
                opening: '[',
                closing: ']',
                position: 6
            }
        );
        assert_eq!(
            tokenize(r#"a eq "open"#, 0, 0, &options).unwrap_err(),
            FilterError::UnterminatedString { position: 5 }
        );
        assert_eq!(
            tokenize("a eq 1)", 0, 0, &options).unwrap_err(),
            FilterError::UnexpectedToken {
                found: ")".to_string(),
                position: 6
            }
        );
    }

    #[test]
    fn test_empty_group() {
        assert_eq!(
            tokenize("a eq 1 and ( )", 0, 0, &ParserOptions::default()).unwrap_err(),
            FilterError::EmptyGroup { position: 11 }
        );
    }
}
