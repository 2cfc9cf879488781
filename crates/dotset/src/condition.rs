//! Condition clauses for path segments.
//!
//! A [`Condition`] is the bracketed part of a segment such as
//! `items[age>=18][name=/^A/i]`. Every [`AttrTest`] in it must pass for a
//! candidate to survive the stage.

use std::cmp::Ordering;
use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::error::{DotsetError, PatternError, Result};
use crate::number::{Number, NumberFormat};
use crate::op::Op;
use crate::record::FieldAccessible;
use crate::value::Value;

/// Conjunction of attribute tests.
#[derive(Debug, Clone, Default)]
pub struct Condition {
    tests: Vec<AttrTest>,
}

impl Condition {
    /// Creates a condition from its tests.
    pub fn new(tests: Vec<AttrTest>) -> Self {
        Condition { tests }
    }

    /// Returns the tests of this condition.
    pub fn tests(&self) -> &[AttrTest] {
        &self.tests
    }

    pub(crate) fn push(&mut self, test: AttrTest) {
        self.tests.push(test);
    }

    /// Returns `true` if every test passes for `candidate`.
    ///
    /// Candidates without fields (scalars) fail any non-empty condition.
    pub fn matches(&self, candidate: &Value, format: &NumberFormat) -> bool {
        self.tests.iter().all(|test| test.matches(candidate, format))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for test in &self.tests {
            write!(f, "[{}]", test)?;
        }
        Ok(())
    }
}

/// A single attribute test: a name and what the attribute must satisfy.
#[derive(Debug, Clone)]
pub struct AttrTest {
    /// The attribute to look up on the candidate.
    pub attr: String,
    /// What the attribute value must satisfy.
    pub predicate: Predicate,
}

/// The check an [`AttrTest`] applies to the attribute value.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// The attribute must exist. Null counts as existing.
    Present,
    /// The attribute must compare to the operand as the operator says.
    Compare(Op, Operand),
    /// The attribute's text must match the pattern.
    Pattern {
        /// The pattern as written, delimiters and flags included.
        source: String,
        /// The compiled pattern.
        regex: Regex,
    },
}

/// Right-hand side of a comparison, with its numeric reading cached.
#[derive(Debug, Clone, PartialEq)]
pub struct Operand {
    pub text: String,
    pub number: Option<Number>,
}

impl Operand {
    /// Creates an operand, classifying it with `format`.
    pub fn new(text: impl Into<String>, format: &NumberFormat) -> Self {
        let text = text.into();
        let number = format.parse(&text);
        Operand { text, number }
    }
}

impl AttrTest {
    /// Creates a presence test.
    pub fn present(attr: impl Into<String>) -> Self {
        AttrTest {
            attr: attr.into(),
            predicate: Predicate::Present,
        }
    }

    /// Creates a comparison test.
    pub fn compare(attr: impl Into<String>, op: Op, operand: Operand) -> Self {
        AttrTest {
            attr: attr.into(),
            predicate: Predicate::Compare(op, operand),
        }
    }

    /// Parses the text between one pair of brackets.
    ///
    /// `offset` is the byte position of `text` inside `path`, used for error
    /// reporting. Blank text yields `None`.
    pub(crate) fn parse(
        text: &str,
        offset: usize,
        path: &str,
        format: &NumberFormat,
    ) -> Result<Option<AttrTest>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let Some(op_at) = text.find(['=', '<', '>', '!']) else {
            return Ok(Some(AttrTest::present(text.trim())));
        };

        let attr = text[..op_at].trim();
        if attr.is_empty() {
            return Err(DotsetError::malformed(
                path,
                offset + op_at,
                "missing attribute name",
            ));
        }

        let Some((op, op_len)) = Op::parse_prefix(&text[op_at..]) else {
            return Err(DotsetError::malformed(path, offset + op_at, "unknown operator"));
        };

        let operand = text[op_at + op_len..].trim();
        if op == Op::Eq && is_pattern_literal(operand) {
            let regex = compile_pattern(operand)?;
            return Ok(Some(AttrTest {
                attr: attr.to_string(),
                predicate: Predicate::Pattern {
                    source: operand.to_string(),
                    regex,
                },
            }));
        }

        Ok(Some(AttrTest::compare(attr, op, Operand::new(operand, format))))
    }

    /// Evaluates this test against a candidate.
    pub fn matches(&self, candidate: &Value, format: &NumberFormat) -> bool {
        let Some(property) = candidate.field(&self.attr) else {
            return false;
        };

        match &self.predicate {
            Predicate::Present => true,
            Predicate::Pattern { regex, .. } => property
                .scalar_text()
                .is_some_and(|text| regex.is_match(&text)),
            Predicate::Compare(op, operand) => compare(&property, operand, format)
                .is_some_and(|ordering| op.holds(ordering)),
        }
    }
}

impl fmt::Display for AttrTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.predicate {
            Predicate::Present => write!(f, "{}", self.attr),
            Predicate::Compare(op, operand) => write!(f, "{}{}{}", self.attr, op, operand.text),
            Predicate::Pattern { source, .. } => write!(f, "{}={}", self.attr, source),
        }
    }
}

/// Compares a property to an operand.
///
/// Both sides numeric: numeric order. Otherwise: byte order of the texts.
/// Containers have no order against an operand.
fn compare(property: &Value, operand: &Operand, format: &NumberFormat) -> Option<Ordering> {
    if let (Some(left), Some(right)) = (property.as_number(format), operand.number) {
        return left.compare(right);
    }
    let text = property.scalar_text()?;
    Some(text.as_ref().cmp(operand.text.as_str()))
}

fn is_pattern_literal(operand: &str) -> bool {
    operand.len() >= 2 && operand.starts_with('/') && operand[1..].contains('/')
}

/// Compiles `/body/flags`.
fn compile_pattern(literal: &str) -> Result<Regex> {
    let invalid = |source: PatternError| DotsetError::InvalidPattern {
        pattern: literal.to_string(),
        source,
    };
    let close = literal.rfind('/').unwrap_or(0);
    let body = literal[1..close].replace("\\/", "/");
    let mut builder = RegexBuilder::new(&body);

    for flag in literal[close + 1..].chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            'U' => builder.swap_greed(true),
            'u' => builder.unicode(true),
            other => return Err(invalid(PatternError::UnknownFlag(other))),
        };
    }

    builder.build().map_err(|err| invalid(err.into()))
}
