//! Loose value coercions for fields that older clients and stored
//! documents write in more than one shape.

use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

/// Coerce a JSON value to a plan quantity.
///
/// Numbers, numeric strings and booleans convert; everything else (and any
/// NaN, infinite or negative result) becomes `0.0`.
pub fn quantity_from_value(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if n.is_finite() && n > 0.0 {
        n
    } else {
        0.0
    }
}

/// Coerce a JSON value to a completion flag. Accepts `true`/`false` and
/// `0`/`1`; non-empty strings count as set.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whole quantities are written as integers (`30`, not `30.0`).
pub(crate) fn serialize_quantity<S>(quantity: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let q = *quantity;
    if q.fract() == 0.0 && q.abs() < 9.0e15 {
        serializer.serialize_i64(q as i64)
    } else {
        serializer.serialize_f64(q)
    }
}

pub(crate) fn deserialize_quantity<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(quantity_from_value(&value))
}

pub(crate) fn deserialize_completed<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(truthy(&value))
}

/// Only called when the key is present, so `null` maps to `Some(0.0)`.
pub(crate) fn deserialize_present_quantity<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_quantity(deserializer).map(Some)
}

/// `null` means "set to none" and a missing key means "leave as is".
pub(crate) fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A `null` completion flag in a patch is ignored rather than clearing it.
pub(crate) fn deserialize_optional_completed<'de, D>(
    deserializer: D,
) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(truthy(&other)),
    })
}
