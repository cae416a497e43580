//! Cell values as seen through the layer stack.

use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use ordered_float::OrderedFloat;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single cell value.
///
/// The numeric variants are kept distinct on purpose: series fill only
/// combines values of the same concrete type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    BigInteger(i128),
    Float(f32),
    Double(f64),
    BigDecimal(Decimal),
    Text(String),
    Date(NaiveDateTime),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// True when both values are the same variant.
    pub fn same_type(&self, other: &CellValue) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            CellValue::Byte(_)
                | CellValue::Short(_)
                | CellValue::Int(_)
                | CellValue::Long(_)
                | CellValue::BigInteger(_)
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integral()
            || matches!(self, CellValue::Float(_) | CellValue::Double(_) | CellValue::BigDecimal(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Null => "null",
            CellValue::Bool(_) => "bool",
            CellValue::Byte(_) => "byte",
            CellValue::Short(_) => "short",
            CellValue::Int(_) => "int",
            CellValue::Long(_) => "long",
            CellValue::BigInteger(_) => "big_integer",
            CellValue::Float(_) => "float",
            CellValue::Double(_) => "double",
            CellValue::BigDecimal(_) => "big_decimal",
            CellValue::Text(_) => "text",
            CellValue::Date(_) => "date",
        }
    }

    /// Integral payload widened to i128.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            CellValue::Byte(v) => Some(*v as i128),
            CellValue::Short(v) => Some(*v as i128),
            CellValue::Int(v) => Some(*v as i128),
            CellValue::Long(v) => Some(*v as i128),
            CellValue::BigInteger(v) => Some(*v),
            _ => None,
        }
    }

    /// Exact decimal view of any numeric value.
    ///
    /// Floats go through their shortest round-trip text form, so `0.1f64`
    /// becomes exactly `0.1` rather than its binary expansion.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            CellValue::Float(v) if v.is_finite() => Decimal::from_str(&v.to_string()).ok(),
            CellValue::Double(v) if v.is_finite() => Decimal::from_str(&v.to_string()).ok(),
            CellValue::BigDecimal(d) => Some(*d),
            other => other.as_i128().and_then(|v| Decimal::try_from_i128_with_scale(v, 0).ok()),
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v as f64),
            CellValue::Double(v) => Some(*v),
            CellValue::BigDecimal(d) => d.to_f64(),
            other => other.as_i128().map(|v| v as f64),
        }
    }

    /// Rebuild a value of the same variant as `self` from an integer.
    /// `None` when the result does not fit.
    pub fn integral_like(&self, value: i128) -> Option<CellValue> {
        match self {
            CellValue::Byte(_) => i8::try_from(value).ok().map(CellValue::Byte),
            CellValue::Short(_) => i16::try_from(value).ok().map(CellValue::Short),
            CellValue::Int(_) => i32::try_from(value).ok().map(CellValue::Int),
            CellValue::Long(_) => i64::try_from(value).ok().map(CellValue::Long),
            CellValue::BigInteger(_) => Some(CellValue::BigInteger(value)),
            _ => None,
        }
    }

    /// Rebuild a value of the same variant as `self` from a decimal.
    pub fn decimal_like(&self, value: Decimal) -> Option<CellValue> {
        match self {
            CellValue::Float(_) => value.to_f32().filter(|v| v.is_finite()).map(CellValue::Float),
            CellValue::Double(_) => value.to_f64().filter(|v| v.is_finite()).map(CellValue::Double),
            CellValue::BigDecimal(_) => Some(CellValue::BigDecimal(value)),
            _ => None,
        }
    }

    /// Ordering between comparable values.
    ///
    /// Numbers compare across variants, dates with dates, text with text
    /// (ordinal), bools with bools. Anything else is incomparable.
    pub fn compare(&self, other: &CellValue) -> Option<Ordering> {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => Some(Ordering::Equal),
            (CellValue::Bool(a), CellValue::Bool(b)) => Some(a.cmp(b)),
            (CellValue::Text(a), CellValue::Text(b)) => Some(a.cmp(b)),
            (CellValue::Date(a), CellValue::Date(b)) => Some(a.cmp(b)),
            (a, b) if a.is_numeric() && b.is_numeric() => match (a.to_decimal(), b.to_decimal()) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => a.to_f64()?.partial_cmp(&b.to_f64()?),
            },
            _ => None,
        }
    }

    /// Total order used when listing distinct values.
    pub fn sort_key(&self) -> ValueSortKey {
        match self {
            CellValue::Null => ValueSortKey::Null,
            CellValue::Bool(b) => ValueSortKey::Bool(*b),
            CellValue::Date(d) => ValueSortKey::Date(*d),
            CellValue::Text(s) => ValueSortKey::Text(s.clone()),
            numeric => ValueSortKey::Number(OrderedFloat(numeric.to_f64().unwrap_or(f64::NAN))),
        }
    }
}

/// Sort key: blanks first, then booleans, numbers, dates, text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValueSortKey {
    Null,
    Bool(bool),
    Number(OrderedFloat<f64>),
    Date(NaiveDateTime),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Byte(v) => write!(f, "{v}"),
            CellValue::Short(v) => write!(f, "{v}"),
            CellValue::Int(v) => write!(f, "{v}"),
            CellValue::Long(v) => write!(f, "{v}"),
            CellValue::BigInteger(v) => write!(f, "{v}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Double(v) => write!(f, "{v}"),
            CellValue::BigDecimal(v) => write!(f, "{v}"),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Date(d) => {
                if d.time() == chrono::NaiveTime::MIN {
                    write!(f, "{}", d.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S"))
                }
            }
        }
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<i8> for CellValue {
    fn from(v: i8) -> Self {
        CellValue::Byte(v)
    }
}

impl From<i16> for CellValue {
    fn from(v: i16) -> Self {
        CellValue::Short(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Int(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Long(v)
    }
}

impl From<i128> for CellValue {
    fn from(v: i128) -> Self {
        CellValue::BigInteger(v)
    }
}

impl From<f32> for CellValue {
    fn from(v: f32) -> Self {
        CellValue::Float(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Double(v)
    }
}

impl From<Decimal> for CellValue {
    fn from(v: Decimal) -> Self {
        CellValue::BigDecimal(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(v: NaiveDateTime) -> Self {
        CellValue::Date(v)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(v: NaiveDate) -> Self {
        CellValue::Date(v.and_time(chrono::NaiveTime::MIN))
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}
