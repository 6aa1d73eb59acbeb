//! Values injected into the generated script as global variables.
//!
//! [`ScriptValue`] covers everything `serde_json` already understands plus a
//! few types that have no native JSON form:
//!
//! | Variant | Encoded as |
//! |---------|------------|
//! | [`ScriptValue::Date`] | `"2020-01-02"` |
//! | [`ScriptValue::Time`] | `"13:05:09"` |
//! | [`ScriptValue::DateTime`] | `"2020-01-02T13:05:09"` (`.ffffff` when sub-second) |
//! | [`ScriptValue::DateTimeTz`] | `"2020-01-02T13:05:09+02:00"` |
//! | [`ScriptValue::Array`] | nested lists of plain numbers (integers stay integers) |
//!
//! Special values may appear anywhere inside [`ScriptValue::List`] and
//! [`ScriptValue::Map`].
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use domshot::value::{to_json, NdArray, ScriptValue};
//!
//! let date = ScriptValue::from(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
//! assert_eq!(to_json(&date).unwrap(), r#""2020-01-02""#);
//!
//! let grid = NdArray::new(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
//! assert_eq!(to_json(&grid.into()).unwrap(), "[[1.0,2.0],[3.0,4.0]]");
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::{DomshotError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// A value that can be exposed to the page script.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    /// Plain JSON, passed through unchanged.
    Json(serde_json::Value),
    /// Calendar date.
    Date(NaiveDate),
    /// Wall-clock time; sub-second precision is dropped.
    Time(NaiveTime),
    /// Date and time without an offset.
    DateTime(NaiveDateTime),
    /// Date and time with a fixed UTC offset.
    DateTimeTz(DateTime<FixedOffset>),
    /// Dense numeric array.
    Array(NdArray),
    /// Sequence whose items may themselves be special values.
    List(Vec<ScriptValue>),
    /// String-keyed object whose values may themselves be special values.
    Map(BTreeMap<String, ScriptValue>),
}

impl ScriptValue {
    /// Convert any serde-serializable value into a [`ScriptValue::Json`].
    ///
    /// # Errors
    ///
    /// Returns [`DomshotError::Serialization`] if `serde_json` rejects the value
    /// (for example a map with non-string keys).
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(ScriptValue::Json(serde_json::to_value(value)?))
    }
}

/// Encode a value as compact JSON.
///
/// # Errors
///
/// Returns [`DomshotError::Serialization`] if encoding fails.
pub fn to_json(value: &ScriptValue) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

impl Serialize for ScriptValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ScriptValue::Json(value) => value.serialize(serializer),
            ScriptValue::Date(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
            ScriptValue::Time(time) => serializer.collect_str(&time.format(TIME_FORMAT)),
            ScriptValue::DateTime(datetime) => serializer.collect_str(&format_naive_datetime(datetime)),
            ScriptValue::DateTimeTz(datetime) => {
                let local = format_naive_datetime(&datetime.naive_local());
                let offset = datetime.format("%:z");
                serializer.collect_str(&format_args!("{}{}", local, offset))
            }
            ScriptValue::Array(array) => array.serialize(serializer),
            ScriptValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ScriptValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// ISO-8601 with microseconds only when they are non-zero.
fn format_naive_datetime(datetime: &NaiveDateTime) -> String {
    if datetime.nanosecond() == 0 {
        datetime.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        datetime.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

// ============================================================================
// Numeric arrays
// ============================================================================

/// Numeric element types accepted by [`NdArray`].
///
/// Integers stay integers in the encoded JSON; floats keep their fraction
/// (`1.0`), and non-finite floats become `null`.
pub trait Element: Into<serde_json::Value> {}

macro_rules! element {
    ($($ty:ty),* $(,)?) => {
        $(impl Element for $ty {})*
    };
}

element!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

/// A dense, row-major numeric array of any dimensionality.
///
/// Encodes as nested JSON lists following `shape`; a zero-dimensional array
/// encodes as a single number. Elements keep their numeric kind, so
/// `NdArray::vector(vec![1, 2])` encodes as `[1,2]` and
/// `NdArray::vector(vec![1.0, 2.0])` as `[1.0,2.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    shape: Vec<usize>,
    data: Vec<serde_json::Value>,
}

impl NdArray {
    /// Create an array from its shape and row-major data.
    ///
    /// # Errors
    ///
    /// Returns [`DomshotError::InvalidArray`] if `data.len()` is not the
    /// product of `shape`, or if that product does not fit in `usize`.
    pub fn new<T: Element>(shape: Vec<usize>, data: Vec<T>) -> Result<Self> {
        let expected = element_count(&shape).ok_or_else(|| {
            DomshotError::InvalidArray(format!("shape {:?} has too many elements", shape))
        })?;
        if data.len() != expected {
            return Err(DomshotError::InvalidArray(format!(
                "shape {:?} needs {} elements, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            shape,
            data: data.into_iter().map(Into::into).collect(),
        })
    }

    /// One-dimensional array.
    pub fn vector<T: Element>(data: Vec<T>) -> Self {
        Self {
            shape: vec![data.len()],
            data: data.into_iter().map(Into::into).collect(),
        }
    }

    /// Two-dimensional array from rows.
    ///
    /// # Errors
    ///
    /// Returns [`DomshotError::InvalidArray`] if the rows have different lengths.
    pub fn matrix<T: Element>(rows: Vec<Vec<T>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|row| row.len() != cols) {
            return Err(DomshotError::InvalidArray(format!(
                "row {} has {} columns, expected {}",
                bad,
                rows[bad].len(),
                cols
            )));
        }
        let shape = vec![rows.len(), cols];
        Ok(Self {
            shape,
            data: rows.into_iter().flatten().map(Into::into).collect(),
        })
    }

    /// Dimensions of the array.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Row-major elements, already converted to JSON numbers (or `null`).
    pub fn data(&self) -> &[serde_json::Value] {
        &self.data
    }

    /// Convert to nested JSON lists.
    pub fn to_nested(&self) -> serde_json::Value {
        nest(&self.shape, &self.data)
    }
}

/// Product of `shape`, or `None` on overflow. Any zero dimension makes it 0.
fn element_count(shape: &[usize]) -> Option<usize> {
    if shape.contains(&0) {
        return Some(0);
    }
    shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
}

fn nest(shape: &[usize], data: &[serde_json::Value]) -> serde_json::Value {
    match shape.split_first() {
        None => data.first().cloned().unwrap_or(serde_json::Value::Null),
        Some((&len, rest)) => {
            let stride = if len == 0 { 0 } else { data.len() / len };
            let items = (0..len)
                .map(|i| nest(rest, &data[i * stride..(i + 1) * stride]))
                .collect();
            serde_json::Value::Array(items)
        }
    }
}

impl Serialize for NdArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_nested().serialize(serializer)
    }
}

// ============================================================================
// Conversions
// ============================================================================

macro_rules! json_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ScriptValue {
                fn from(value: $ty) -> Self {
                    ScriptValue::Json(serde_json::Value::from(value))
                }
            }
        )*
    };
}

json_from!(bool, i32, i64, u32, u64, f64, String, &str);

impl From<serde_json::Value> for ScriptValue {
    fn from(value: serde_json::Value) -> Self {
        ScriptValue::Json(value)
    }
}

impl From<NaiveDate> for ScriptValue {
    fn from(value: NaiveDate) -> Self {
        ScriptValue::Date(value)
    }
}

impl From<NaiveTime> for ScriptValue {
    fn from(value: NaiveTime) -> Self {
        ScriptValue::Time(value)
    }
}

impl From<NaiveDateTime> for ScriptValue {
    fn from(value: NaiveDateTime) -> Self {
        ScriptValue::DateTime(value)
    }
}

impl From<DateTime<FixedOffset>> for ScriptValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        ScriptValue::DateTimeTz(value)
    }
}

impl From<NdArray> for ScriptValue {
    fn from(value: NdArray) -> Self {
        ScriptValue::Array(value)
    }
}

impl<T: Into<ScriptValue>> From<Vec<T>> for ScriptValue {
    fn from(items: Vec<T>) -> Self {
        ScriptValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ScriptValue>> From<BTreeMap<String, T>> for ScriptValue {
    fn from(entries: BTreeMap<String, T>) -> Self {
        ScriptValue::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<ScriptValue>> From<Option<T>> for ScriptValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ScriptValue::Json(serde_json::Value::Null), Into::into)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
