//! Numeric values and locale-aware numeric parsing.
//!
//! [`Number`] is the numeric variant of [`Value`](crate::Value). Text is
//! classified as numeric through a [`NumberFormat`], which is always passed
//! explicitly so that the same collection can be read with different
//! decimal conventions.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// A number read from a document or from numeric text.
///
/// Integers stay exact: `I64` holds everything that fits a signed 64-bit
/// integer and `U64` only the values above `i64::MAX`. Fractions and
/// exponents are `F64`.
///
/// Equality is structural; use [`Number::numeric_eq`] to compare quantities
/// across variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    I64(i64),
    U64(u64),
    F64(f64),
}

impl Number {
    /// Lossy conversion used for averages and medians.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Orders two numbers by quantity. `None` only when NaN is involved.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        use Number::{F64, I64, U64};
        match (self, other) {
            (I64(a), I64(b)) => Some(a.cmp(&b)),
            (U64(a), U64(b)) => Some(a.cmp(&b)),
            // a negative signed value is below every unsigned one
            (I64(a), U64(b)) => Some(u64::try_from(a).map_or(Ordering::Less, |a| a.cmp(&b))),
            (U64(a), I64(b)) => Some(u64::try_from(b).map_or(Ordering::Greater, |b| a.cmp(&b))),
            (a, b) => a.to_f64().partial_cmp(&b.to_f64()),
        }
    }

    /// Returns `true` if both numbers denote the same quantity.
    pub fn numeric_eq(self, other: Number) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => n.fmt(f),
            Number::U64(n) => n.fmt(f),
            Number::F64(n) => n.fmt(f),
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Number::I64(n) => serializer.serialize_i64(n),
            Number::U64(n) => serializer.serialize_u64(n),
            Number::F64(n) => serializer.serialize_f64(n),
        }
    }
}

macro_rules! number_from_lossless {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$ty> for Number {
                fn from(n: $ty) -> Self {
                    Number::$variant(<$target>::from(n))
                }
            }
        )*
    };
}

number_from_lossless! {
    i8 => I64 as i64,
    i16 => I64 as i64,
    i32 => I64 as i64,
    i64 => I64 as i64,
    u8 => I64 as i64,
    u16 => I64 as i64,
    u32 => I64 as i64,
    f32 => F64 as f64,
    f64 => F64 as f64,
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or(Number::U64(n), Number::I64)
    }
}

impl From<usize> for Number {
    fn from(n: usize) -> Self {
        // usize is at most 64 bits on supported targets
        Number::from(n as u64)
    }
}

/// Rules for recognising numbers written as text.
///
/// The grammar is an optional sign, digits with an optional fractional part,
/// and an optional exponent (`1`, `-2.5`, `.5`, `3e4`). Surrounding
/// whitespace is ignored. Infinity and NaN spellings are never numeric.
///
/// ```
/// use dotset::{Number, NumberFormat};
///
/// let dutch = NumberFormat::new(',').with_thousands('.');
/// assert_eq!(dutch.parse("1.250,5"), Some(Number::F64(1250.5)));
/// assert_eq!(NumberFormat::default().parse("42"), Some(Number::I64(42)));
/// assert_eq!(NumberFormat::default().parse("forty-two"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    /// Character separating the integer part from the fraction.
    pub decimal_separator: char,
    /// Optional digit-grouping character allowed in the integer part.
    pub thousands_separator: Option<char>,
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat {
            decimal_separator: '.',
            thousands_separator: None,
        }
    }
}

impl NumberFormat {
    /// Creates a format with the given decimal separator and no grouping.
    pub fn new(decimal_separator: char) -> Self {
        NumberFormat {
            decimal_separator,
            thousands_separator: None,
        }
    }

    /// Sets the digit-grouping character.
    pub fn with_thousands(mut self, separator: char) -> Self {
        self.thousands_separator = Some(separator);
        self
    }

    /// Returns `true` if `text` is numeric under this format.
    pub fn is_numeric(&self, text: &str) -> bool {
        self.parse(text).is_some()
    }

    /// Parses `text` as a number.
    ///
    /// Integral text becomes `I64` (or `U64` past `i64::MAX`); anything with
    /// a fraction or exponent becomes `F64`.
    pub fn parse(&self, text: &str) -> Option<Number> {
        let normalized = self.normalize(text.trim())?;
        if normalized.integral {
            if let Ok(n) = normalized.text.parse::<i64>() {
                return Some(Number::I64(n));
            }
            if let Ok(n) = normalized.text.parse::<u64>() {
                return Some(Number::U64(n));
            }
        }
        let n = normalized.text.parse::<f64>().ok()?;
        n.is_finite().then_some(Number::F64(n))
    }

    /// Rewrites `text` into the canonical `[-]digits[.digits][e[-]digits]`
    /// form understood by the standard parsers.
    fn normalize(&self, text: &str) -> Option<Normalized> {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();

        if let Some(&sign) = chars.peek() {
            if sign == '+' || sign == '-' {
                if sign == '-' {
                    out.push('-');
                }
                chars.next();
            }
        }

        let mut int_digits = 0usize;
        let mut frac_digits = 0usize;
        let mut in_fraction = false;
        let mut previous_digit = false;

        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                out.push(c);
                if in_fraction {
                    frac_digits += 1;
                } else {
                    int_digits += 1;
                }
                previous_digit = true;
            } else if c == self.decimal_separator && !in_fraction {
                out.push('.');
                in_fraction = true;
                previous_digit = false;
            } else if Some(c) == self.thousands_separator && !in_fraction && previous_digit {
                chars.next();
                // a grouping character must sit between two digits
                match chars.peek() {
                    Some(next) if next.is_ascii_digit() => {}
                    _ => return None,
                }
                previous_digit = false;
                continue;
            } else {
                break;
            }
            chars.next();
        }

        if int_digits + frac_digits == 0 {
            return None;
        }

        let mut has_exponent = false;
        if let Some(&c) = chars.peek() {
            if c == 'e' || c == 'E' {
                chars.next();
                out.push('e');
                if let Some(&sign) = chars.peek() {
                    if sign == '+' || sign == '-' {
                        out.push(sign);
                        chars.next();
                    }
                }
                let mut exp_digits = 0usize;
                while let Some(&d) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    out.push(d);
                    exp_digits += 1;
                    chars.next();
                }
                if exp_digits == 0 {
                    return None;
                }
                has_exponent = true;
            }
        }

        if chars.next().is_some() {
            return None;
        }

        Some(Normalized {
            text: out,
            integral: !in_fraction && !has_exponent,
        })
    }
}

struct Normalized {
    text: String,
    integral: bool,
}
