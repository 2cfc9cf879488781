//! Comparison operators of attribute tests.

use std::cmp::Ordering;
use std::fmt;

/// Operator between an attribute and its operand, as in `[age>=18]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
}

impl Op {
    /// Reads the operator at the start of `text`, returning it with its
    /// length in bytes. `>=` is read as one operator, never as `>` then `=`.
    pub fn parse_prefix(text: &str) -> Option<(Op, usize)> {
        let op = match text.get(..2) {
            Some("!=") => Op::Ne,
            Some(">=") => Op::Gte,
            Some("<=") => Op::Lte,
            _ => match text.as_bytes().first()? {
                b'=' => return Some((Op::Eq, 1)),
                b'>' => return Some((Op::Gt, 1)),
                b'<' => return Some((Op::Lt, 1)),
                _ => return None,
            },
        };
        Some((op, 2))
    }

    /// Returns `true` if `attribute <op> operand` holds, given how the
    /// attribute orders against the operand.
    pub fn holds(self, ordering: Ordering) -> bool {
        use Ordering::{Equal, Greater, Less};
        matches!(
            (self, ordering),
            (Op::Eq, Equal)
                | (Op::Ne, Less | Greater)
                | (Op::Gt, Greater)
                | (Op::Gte, Greater | Equal)
                | (Op::Lt, Less)
                | (Op::Lte, Less | Equal)
        )
    }

    /// The operator as written in a path.
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
