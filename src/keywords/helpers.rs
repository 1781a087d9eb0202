//! Numeric comparison across JSON number representations.
use num_cmp::NumCmp;
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Compare two JSON numbers by numerical value, never by lexeme.
pub(crate) fn compare(left: &Number, right: &Number) -> Option<Ordering> {
    if let Some(l) = left.as_u64() {
        if let Some(r) = right.as_u64() {
            Some(l.cmp(&r))
        } else if let Some(r) = right.as_i64() {
            NumCmp::num_cmp(l, r)
        } else {
            NumCmp::num_cmp(l, right.as_f64()?)
        }
    } else if let Some(l) = left.as_i64() {
        if let Some(r) = right.as_i64() {
            Some(l.cmp(&r))
        } else if let Some(r) = right.as_u64() {
            NumCmp::num_cmp(l, r)
        } else {
            NumCmp::num_cmp(l, right.as_f64()?)
        }
    } else {
        let l = left.as_f64()?;
        if let Some(r) = right.as_u64() {
            NumCmp::num_cmp(l, r)
        } else if let Some(r) = right.as_i64() {
            NumCmp::num_cmp(l, r)
        } else {
            l.partial_cmp(&right.as_f64()?)
        }
    }
}

/// Size bounds accept any number equal to a non-negative mathematical
/// integer, so `3.0` is a valid `maxLength`.
pub(crate) fn non_negative_integer(value: &Value) -> Option<u64> {
    if let Some(bound) = value.as_u64() {
        return Some(bound);
    }
    match value.as_f64() {
        Some(bound) if bound >= 0.0 && bound.fract() == 0.0 && bound.is_finite() => {
            Some(bound as u64)
        }
        _ => None,
    }
}
