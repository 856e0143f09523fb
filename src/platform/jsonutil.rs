//! JSON helpers shared by event synthesis, decoding and verification.

use serde_json::{Map, Value};

use crate::HttpHeader;

/// Absolute tolerance for comparing round-tripped time values.
///
/// Timestamps cross a ms -> s -> ms conversion and the wire request time is
/// rounded to microsecond granularity, so exact float equality is too strict.
pub const TIME_EPSILON: f64 = 1e-3;

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= TIME_EPSILON
}

/// Convert an ordered header list into the wire header mapping.
///
/// Duplicate names are concatenated with a newline, preserving value order.
pub fn headers_to_dict(headers: &[HttpHeader]) -> Map<String, Value> {
    let mut dict = Map::new();
    for header in headers {
        match dict.get_mut(&header.name) {
            Some(Value::String(existing)) => {
                existing.push('\n');
                existing.push_str(&header.value);
            }
            _ => {
                dict.insert(header.name.clone(), Value::String(header.value.clone()));
            }
        }
    }
    dict
}

/// Expand a wire header mapping back into an ordered header list, splitting
/// newline-concatenated duplicates.
pub fn headers_from_dict(dict: &Map<String, Value>) -> Vec<HttpHeader> {
    let mut headers = Vec::new();
    for (name, value) in dict {
        let Some(joined) = value.as_str() else {
            continue;
        };
        for part in joined.split('\n') {
            headers.push(HttpHeader {
                name: name.clone(),
                value: part.to_string(),
            });
        }
    }
    headers
}

pub(crate) fn str_field<'a>(params: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

pub(crate) fn f64_field(params: &Map<String, Value>, key: &str) -> Option<f64> {
    params.get(key).and_then(Value::as_f64)
}

pub(crate) fn i64_field(params: &Map<String, Value>, key: &str) -> Option<i64> {
    params.get(key).and_then(Value::as_i64)
}

pub(crate) fn bool_field(params: &Map<String, Value>, key: &str) -> Option<bool> {
    params.get(key).and_then(Value::as_bool)
}

pub(crate) fn map_field<'a>(
    params: &'a Map<String, Value>,
    key: &str,
) -> Option<&'a Map<String, Value>> {
    params.get(key).and_then(Value::as_object)
}
