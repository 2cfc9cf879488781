//! Path expressions.
//!
//! A [`Path`] is the compiled form of a dotted expression such as
//! `{n}.orders[total>=100].sku`. Compilation happens once; the same path can
//! then be evaluated against any number of collections.
//!
//! ```text
//! path       := segment ('.' segment)*
//! segment    := key_token condition?
//! key_token  := '{n}' | '{s}' | literal
//! condition  := '[' attr_test (']' '[' attr_test)* ']'
//! attr_test  := attr (op value)?
//! op         := '=' | '!=' | '>' | '<' | '>=' | '<='
//! value      := '/' pattern '/' flags | literal
//! ```
//!
//! Dots inside brackets belong to the condition, so `items[price>1.5]` is a
//! single segment. An operand that opens with `/` but never closes it, as in
//! `[dir=/tmp]`, is literal text.

use std::fmt;
use std::str::FromStr;

use crate::condition::{AttrTest, Condition};
use crate::error::{DotsetError, Result};
use crate::number::{Number, NumberFormat};

/// Key matcher of a segment.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Matches one key. Numeric literals also match numerically equal keys.
    Literal {
        key: String,
        number: Option<Number>,
    },
    /// `{n}`: matches numeric keys and every sequence index.
    AnyNumeric,
    /// `{s}`: matches non-numeric keys.
    AnyString,
}

impl Token {
    /// Classifies the key text of a segment.
    pub fn new(text: &str, format: &NumberFormat) -> Self {
        match text {
            "{n}" => Token::AnyNumeric,
            "{s}" => Token::AnyString,
            _ => Token::literal(text, format),
        }
    }

    /// Creates a literal token, even for `{n}` and `{s}`.
    pub fn literal(text: &str, format: &NumberFormat) -> Self {
        Token::Literal {
            key: text.to_string(),
            number: format.parse(text),
        }
    }

    /// Returns `true` for the wildcard classes.
    pub fn is_wildcard(&self) -> bool {
        !matches!(self, Token::Literal { .. })
    }

    /// Matches a mapping key.
    pub fn matches_key(&self, key: &str, format: &NumberFormat) -> bool {
        match self {
            Token::AnyNumeric => format.is_numeric(key),
            Token::AnyString => !format.is_numeric(key),
            Token::Literal { key: literal, number } => {
                literal == key
                    || number.is_some_and(|n| format.parse(key).is_some_and(|k| k.numeric_eq(n)))
            }
        }
    }

    /// Matches a sequence index.
    pub fn matches_index(&self, index: usize) -> bool {
        match self {
            Token::AnyNumeric => true,
            Token::AnyString => false,
            Token::Literal { number, .. } => {
                number.is_some_and(|n| n.numeric_eq(Number::from(index)))
            }
        }
    }

    fn as_str(&self) -> &str {
        match self {
            Token::Literal { key, .. } => key,
            Token::AnyNumeric => "{n}",
            Token::AnyString => "{s}",
        }
    }
}

/// One dot-separated unit of a path.
#[derive(Debug, Clone)]
pub struct Segment {
    token: Token,
    condition: Option<Condition>,
}

impl Segment {
    /// Creates a segment.
    pub fn new(token: Token, condition: Option<Condition>) -> Self {
        Segment { token, condition }
    }

    /// Returns the key matcher.
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Returns the condition clause, if any.
    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    fn is_simple(&self) -> bool {
        !self.token.is_wildcard() && self.condition.is_none()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token.as_str())?;
        if let Some(condition) = &self.condition {
            write!(f, "{}", condition)?;
        }
        Ok(())
    }
}

/// A compiled path expression.
///
/// # Example
///
/// ```
/// use dotset::Path;
///
/// let path: Path = "users.{n}[age>=18].name".parse().unwrap();
/// assert_eq!(path.segments().len(), 3);
/// assert!(!path.is_simple());
///
/// assert!(Path::parse("a.b.c").unwrap().is_simple());
/// assert!(Path::parse("items[age>18").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Path {
    segments: Vec<Segment>,
    simple: bool,
    format: NumberFormat,
}

impl Path {
    /// Compiles a path using the default [`NumberFormat`].
    pub fn parse(path: &str) -> Result<Path> {
        Path::parse_with(path, NumberFormat::default())
    }

    /// Compiles a path, reading numbers with `format`.
    ///
    /// The format is also used when the path is evaluated, to classify keys
    /// and attribute values.
    pub fn parse_with(path: &str, format: NumberFormat) -> Result<Path> {
        let segments = if path.is_empty() {
            Vec::new()
        } else {
            tokenize(path, &format)?
        };
        let simple = segments.iter().all(Segment::is_simple);
        tracing::trace!(path, segments = segments.len(), simple, "compiled path");
        Ok(Path {
            segments,
            simple,
            format,
        })
    }

    /// Builds a path of literal segments, without any parsing.
    ///
    /// Every segment is taken verbatim, dots and brackets included.
    pub fn from_segments<I, S>(segments: I) -> Path
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let format = NumberFormat::default();
        let segments = segments
            .into_iter()
            .map(|s| Segment::new(Token::literal(s.as_ref(), &format), None))
            .collect();
        Path {
            segments,
            simple: true,
            format,
        }
    }

    /// Returns the segments in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns `true` if the path has no wildcards and no conditions.
    ///
    /// Simple paths are evaluated by direct lookup.
    pub fn is_simple(&self) -> bool {
        self.simple
    }

    /// Returns `true` for the empty path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number format this path was compiled with.
    pub fn format(&self) -> &NumberFormat {
        &self.format
    }

    /// Returns the literal keys of a simple path.
    pub(crate) fn literal_keys(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| s.token.as_str())
    }
}

impl FromStr for Path {
    type Err = DotsetError;

    fn from_str(s: &str) -> Result<Self> {
        Path::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Scan {
    /// Reading key text that began at `start`.
    Key { start: usize },
    /// Inside `[...]`; the test text began at `start`.
    Clause { start: usize },
    /// Inside a `/.../` operand of the clause that began at `start`.
    /// `class` is set inside a `[...]` character class of the pattern.
    Pattern {
        start: usize,
        escaped: bool,
        class: bool,
    },
    /// Just after a `]`.
    AfterClause,
}

fn tokenize(path: &str, format: &NumberFormat) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut state = Scan::Key { start: 0 };
    let mut key = "";
    let mut condition = Condition::default();

    for (i, c) in path.char_indices() {
        state = match state {
            Scan::Key { start } => match c {
                '.' => {
                    segments.push(Segment::new(Token::new(&path[start..i], format), None));
                    Scan::Key { start: i + 1 }
                }
                '[' => {
                    key = &path[start..i];
                    Scan::Clause { start: i + 1 }
                }
                ']' => return Err(DotsetError::malformed(path, i, "unmatched ']'")),
                _ => state,
            },
            Scan::Clause { start } => match c {
                ']' => {
                    close_clause(&mut condition, path, start, i, format)?;
                    Scan::AfterClause
                }
                '[' => return Err(DotsetError::malformed(path, i, "nested '['")),
                '/' if path[start..i].trim_end().ends_with('=') => Scan::Pattern {
                    start,
                    escaped: false,
                    class: false,
                },
                _ => state,
            },
            Scan::Pattern {
                start,
                escaped,
                class,
            } => match c {
                _ if escaped => Scan::Pattern {
                    start,
                    escaped: false,
                    class,
                },
                '\\' => Scan::Pattern {
                    start,
                    escaped: true,
                    class,
                },
                '[' if !class => Scan::Pattern {
                    start,
                    escaped: false,
                    class: true,
                },
                ']' if class => Scan::Pattern {
                    start,
                    escaped: false,
                    class: false,
                },
                '/' if !class => Scan::Clause { start },
                // no closing '/': the operand is plain text such as `/tmp`
                ']' => {
                    close_clause(&mut condition, path, start, i, format)?;
                    Scan::AfterClause
                }
                _ => state,
            },
            Scan::AfterClause => match c {
                '[' => Scan::Clause { start: i + 1 },
                '.' => {
                    segments.push(Segment::new(
                        Token::new(key, format),
                        Some(std::mem::take(&mut condition)),
                    ));
                    Scan::Key { start: i + 1 }
                }
                _ => {
                    return Err(DotsetError::malformed(
                        path,
                        i,
                        "expected '[' or '.' after ']'",
                    ))
                }
            },
        };
    }

    match state {
        Scan::Key { start } => {
            segments.push(Segment::new(Token::new(&path[start..], format), None));
        }
        Scan::AfterClause => {
            segments.push(Segment::new(Token::new(key, format), Some(condition)));
        }
        Scan::Clause { .. } | Scan::Pattern { .. } => {
            return Err(DotsetError::malformed(path, path.len(), "unclosed '['"));
        }
    }

    Ok(segments)
}

fn close_clause(
    condition: &mut Condition,
    path: &str,
    start: usize,
    end: usize,
    format: &NumberFormat,
) -> Result<()> {
    if let Some(test) = AttrTest::parse(&path[start..end], start, path, format)? {
        condition.push(test);
    }
    Ok(())
}
