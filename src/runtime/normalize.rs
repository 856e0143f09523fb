//! Timing normalization: derive a complete, monotonic timing set from
//! whatever the fixture pinned down.

use serde_json::{Map, Value, json};

use crate::PartialTiming;

/// Start applied when a fixture carries no absolute time at all.
/// Deliberately non-zero so an accidental zero in derived values stands out.
pub const DEFAULT_START_MS: f64 = 1000.0;
/// Gap used when deriving response/end times with nothing to anchor on.
pub const DEFAULT_OFFSET_MS: f64 = 1000.0;

/// Fully-resolved timing for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTiming {
    pub renderer_start_time: f64,
    pub start_time: f64,
    pub response_received_time: f64,
    /// `-1.0` when the fixture pinned the incomplete-request sentinel.
    pub end_time: f64,
    /// Wire request time, seconds, rounded to microsecond granularity.
    pub request_time_seconds: f64,
    /// Offset from request start to end of headers, milliseconds.
    pub receive_headers_end: f64,
    /// Caller-supplied relative offsets, carried verbatim.
    pub extra_offsets: Map<String, Value>,
}

impl NormalizedTiming {
    /// Wire timing block embedded in response payloads.
    pub fn wire_timing(&self) -> Map<String, Value> {
        let mut timing = self.extra_offsets.clone();
        timing.insert("requestTime".to_string(), json!(self.request_time_seconds));
        timing.insert(
            "receiveHeadersEnd".to_string(),
            json!(self.receive_headers_end),
        );
        timing
    }
}

/// Resolve every timing field through its ordered candidate list; the first
/// defined source wins, a fixed constant closes each list. Supplying even a
/// single absolute timestamp anchors everything else relative to it.
pub fn normalize_timing(partial: &PartialTiming) -> NormalizedTiming {
    let start_time = first_defined(&[
        partial.start_time,
        partial.request_time_ms,
        partial.renderer_start_time,
        partial.redirect_response_timestamp,
    ])
    .unwrap_or(DEFAULT_START_MS);

    let renderer_start_time = partial.renderer_start_time.unwrap_or(start_time);

    // Equal by construction; the wire block re-expresses it in seconds.
    let request_time = start_time;

    let usable_end = partial.end_time.filter(|end| *end != -1.0);
    let receive_headers_end = first_defined(&[
        partial.receive_headers_end,
        partial
            .response_received_time
            .map(|received| received - request_time),
        usable_end.map(|end| (partial.max_relative_offset + (end - request_time)) / 2.0),
    ])
    .unwrap_or_else(|| partial.max_relative_offset.max(DEFAULT_OFFSET_MS));

    let response_received_time = partial
        .response_received_time
        .unwrap_or(request_time + receive_headers_end);

    let end_time = partial
        .end_time
        .unwrap_or(response_received_time + DEFAULT_OFFSET_MS);

    NormalizedTiming {
        renderer_start_time,
        start_time,
        response_received_time,
        end_time,
        request_time_seconds: round_to_microseconds(request_time) / 1000.0,
        receive_headers_end,
        extra_offsets: partial.relative_offsets.clone(),
    }
}

/// Round a millisecond value to the nearest microsecond before the
/// seconds conversion, so the one seconds-typed wire field stays stable.
fn round_to_microseconds(ms: f64) -> f64 {
    (ms * 1000.0).round() / 1000.0
}

fn first_defined(candidates: &[Option<f64>]) -> Option<f64> {
    candidates.iter().copied().flatten().next()
}
