//! Output tree for parsed filter expressions
//!
//! A parsed [`Filter`] is an ordered list of statements that are implicitly
//! joined by `or`. Each statement is a [`FilterNode`]: a set of attribute
//! criteria that must all hold, plus optional conjunction groups and an
//! optional negation.
//!
//! The JSON rendering follows the shape used by SCIM tooling:
//!
//! ```text
//! userName eq "bjensen" and not (emails pr)
//! => [{"userName": ["eq", "bjensen"], "!!": {"emails": ["pr"]}}]
//! ```
//!
//! The [`fmt::Display`] implementations render the canonical filter syntax
//! back, so that parsing the rendered text produces an equal tree.

use std::fmt;

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;

/// JSON key holding the conjunction groups of a node
pub const CONJUNCTION_KEY: &str = "&&";

/// JSON key holding the negated statements of a node
pub const NEGATION_KEY: &str = "!!";

/// A complete parsed filter: top-level statements joined by an implicit `or`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Filter {
    /// Top-level statements, in source order
    statements: Vec<FilterNode>,
}

impl Filter {
    /// Create a filter from its top-level statements
    pub fn new(statements: Vec<FilterNode>) -> Self {
        Self { statements }
    }

    /// Whether the filter selects nothing in particular (empty input)
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Number of top-level statements
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Borrow the top-level statements
    pub fn statements(&self) -> &[FilterNode] {
        &self.statements
    }

    /// Consume the filter, returning the top-level statements
    pub fn into_statements(self) -> Vec<FilterNode> {
        self.statements
    }
}

/// One statement of a filter
///
/// All attribute criteria, every conjunction group and the negation must hold
/// for the statement to hold. A conjunction group holds when any of its
/// statements holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterNode {
    /// Attribute criteria keyed by attribute path, in source order
    pub attributes: IndexMap<String, Criterion>,
    /// Parenthesized `or` groups joined to this statement with `and`
    pub conjunction: Vec<Vec<FilterNode>>,
    /// Negated statements (`not (...)`), themselves joined by `or`
    pub negation: Option<Vec<FilterNode>>,
}

/// Criterion stored under an attribute path
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Attribute comparison (`title eq "Tour Guide"`, `emails pr`)
    Compare {
        /// Comparison operator
        comparator: Comparator,
        /// Comparison value, absent only for `pr`
        value: Option<Literal>,
    },

    /// Complex attribute filter (`emails[type eq "work"]`)
    Nested(Vec<FilterNode>),
}

/// Attribute comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    /// Equal
    Eq,
    /// Not equal
    Ne,
    /// Contains
    Co,
    /// Starts with
    Sw,
    /// Ends with
    Ew,
    /// Greater than
    Gt,
    /// Less than
    Lt,
    /// Greater than or equal
    Ge,
    /// Less than or equal
    Le,
    /// Present (has a value)
    Pr,
}

/// Comparison value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    /// Integer number
    Int(i64),
    /// Number with a fraction or exponent, or outside the `i64` range
    Float(f64),
    /// Quoted string, with the surrounding quotes removed
    String(String),
    /// `true` or `false`
    Bool(bool),
    /// `null`
    Null,
}

impl Comparator {
    /// All comparators, in keyword order
    pub const ALL: [Comparator; 10] = [
        Comparator::Eq,
        Comparator::Ne,
        Comparator::Co,
        Comparator::Sw,
        Comparator::Ew,
        Comparator::Gt,
        Comparator::Lt,
        Comparator::Ge,
        Comparator::Le,
        Comparator::Pr,
    ];

    /// The two-letter keyword for this comparator
    pub fn keyword(self) -> &'static str {
        match self {
            Comparator::Eq => "eq",
            Comparator::Ne => "ne",
            Comparator::Co => "co",
            Comparator::Sw => "sw",
            Comparator::Ew => "ew",
            Comparator::Gt => "gt",
            Comparator::Lt => "lt",
            Comparator::Ge => "ge",
            Comparator::Le => "le",
            Comparator::Pr => "pr",
        }
    }

    /// Look up a comparator by keyword, ignoring ASCII case
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|comparator| comparator.keyword().eq_ignore_ascii_case(word))
    }

    /// Whether the comparator takes no value (`pr`)
    pub fn is_unary(self) -> bool {
        self == Comparator::Pr
    }
}

impl FilterNode {
    /// Create a statement holding a single attribute comparison
    pub fn comparison(
        attribute: impl Into<String>,
        comparator: Comparator,
        value: Option<Literal>,
    ) -> Self {
        let mut node = Self::default();
        node.insert_criterion(attribute.into(), Criterion::Compare { comparator, value });
        node
    }

    /// Create a statement negating the given statements
    pub fn negated(statements: Vec<FilterNode>) -> Self {
        Self {
            negation: Some(statements),
            ..Self::default()
        }
    }

    /// Build the statement for a parenthesized group
    ///
    /// A single-statement group is the statement itself; otherwise the group
    /// becomes the only conjunction group of a fresh statement.
    pub fn from_group(mut statements: Vec<FilterNode>) -> Self {
        if statements.len() == 1 {
            statements.remove(0)
        } else {
            Self {
                conjunction: vec![statements],
                ..Self::default()
            }
        }
    }

    /// Whether the statement carries no criteria at all
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.conjunction.is_empty() && self.negation.is_none()
    }

    /// Look up the criterion stored for an attribute path
    pub fn criterion(&self, attribute: &str) -> Option<&Criterion> {
        self.attributes.get(attribute)
    }

    /// Add a criterion for an attribute
    ///
    /// An attribute that already carries a criterion keeps it; the new one
    /// joins the conjunction as a one-statement group.
    pub fn insert_criterion(&mut self, attribute: String, criterion: Criterion) {
        if self.attributes.contains_key(&attribute) {
            let mut repeated = FilterNode::default();
            repeated.attributes.insert(attribute, criterion);
            self.conjunction.push(vec![repeated]);
        } else {
            self.attributes.insert(attribute, criterion);
        }
    }

    /// Join a parenthesized group to this statement with `and`
    pub fn add_group(&mut self, mut statements: Vec<FilterNode>) {
        if statements.len() == 1 {
            self.merge(statements.remove(0));
        } else {
            self.conjunction.push(statements);
        }
    }

    /// Join a negation to this statement with `and`
    pub fn negate(&mut self, statements: Vec<FilterNode>) {
        if self.negation.is_some() {
            self.conjunction.push(vec![FilterNode::negated(statements)]);
        } else {
            self.negation = Some(statements);
        }
    }

    /// Fold another statement into this one with `and`
    pub fn merge(&mut self, other: FilterNode) {
        for (attribute, criterion) in other.attributes {
            self.insert_criterion(attribute, criterion);
        }
        self.conjunction.extend(other.conjunction);
        if let Some(negation) = other.negation {
            self.negate(negation);
        }
    }
}

/// Serializes an `or` group as its only statement, or as an array
struct Statements<'a>(&'a [FilterNode]);

impl Serialize for Statements<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            [single] => single.serialize(serializer),
            statements => statements.serialize(serializer),
        }
    }
}

impl Serialize for FilterNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.attributes.len()
            + usize::from(!self.conjunction.is_empty())
            + usize::from(self.negation.is_some());
        let mut map = serializer.serialize_map(Some(entries))?;
        for (attribute, criterion) in &self.attributes {
            map.serialize_entry(attribute, criterion)?;
        }
        match self.conjunction.as_slice() {
            [] => {}
            [group] => map.serialize_entry(CONJUNCTION_KEY, group)?,
            groups => map.serialize_entry(CONJUNCTION_KEY, groups)?,
        }
        if let Some(negation) = &self.negation {
            map.serialize_entry(NEGATION_KEY, &Statements(negation))?;
        }
        map.end()
    }
}

impl Serialize for Criterion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Criterion::Compare { comparator, value } => {
                let mut seq = serializer.serialize_seq(Some(1 + usize::from(value.is_some())))?;
                seq.serialize_element(comparator)?;
                if let Some(value) = value {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Criterion::Nested(statements) => Statements(statements).serialize(serializer),
        }
    }
}

/// Write statements separated by ` or `
fn write_alternatives(f: &mut fmt::Formatter<'_>, statements: &[FilterNode]) -> fmt::Result {
    for (index, statement) in statements.iter().enumerate() {
        if index > 0 {
            f.write_str(" or ")?;
        }
        write!(f, "{statement}")?;
    }
    Ok(())
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_alternatives(f, &self.statements)
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut separate = |f: &mut fmt::Formatter<'_>| -> fmt::Result {
            if !std::mem::take(&mut first) {
                f.write_str(" and ")?;
            }
            Ok(())
        };

        for (attribute, criterion) in &self.attributes {
            separate(f)?;
            match criterion {
                Criterion::Compare {
                    comparator,
                    value: Some(value),
                } => write!(f, "{attribute} {comparator} {value}")?,
                Criterion::Compare {
                    comparator,
                    value: None,
                } => write!(f, "{attribute} {comparator}")?,
                Criterion::Nested(statements) => {
                    write!(f, "{attribute}[")?;
                    write_alternatives(f, statements)?;
                    f.write_str("]")?;
                }
            }
        }

        // The negation goes first: reading it back after a `(not ...)` group
        // would store the two the other way round.
        if let Some(negation) = &self.negation {
            separate(f)?;
            f.write_str("not (")?;
            write_alternatives(f, negation)?;
            f.write_str(")")?;
        }

        for group in &self.conjunction {
            separate(f)?;
            f.write_str("(")?;
            write_alternatives(f, group)?;
            f.write_str(")")?;
        }

        Ok(())
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{n}"),
            // Debug keeps a fraction or exponent, so the value reads back as a float
            Literal::Float(n) => write!(f, "{n:?}"),
            Literal::String(s) => write!(f, "\"{s}\""),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Null => f.write_str("null"),
        }
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Int(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Float(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}
