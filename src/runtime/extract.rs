//! Timestamp extraction and fixture consistency assertions.

use serde_json::{Map, Value};

use crate::{RequestDescriptor, SynthError, SynthResult, TIME_EPSILON, approx_eq};

/// Raw timing facts pulled from one fixture. No defaulting happens here;
/// the normalizer fills the gaps.
#[derive(Debug, Clone, Default)]
pub struct PartialTiming {
    pub renderer_start_time: Option<f64>,
    pub start_time: Option<f64>,
    /// `timing.requestTime` converted from seconds to milliseconds.
    pub request_time_ms: Option<f64>,
    pub response_received_time: Option<f64>,
    /// Raw end time; a literal `-1.0` survives as the incomplete sentinel.
    pub end_time: Option<f64>,
    pub redirect_response_timestamp: Option<f64>,
    pub receive_headers_end: Option<f64>,
    /// Largest defined relative offset, 0 when none are set.
    pub max_relative_offset: f64,
    /// Caller-supplied extra offsets, copied through verbatim later.
    pub relative_offsets: Map<String, Value>,
}

/// Treat `-1` the same as an absent time field.
fn sanitize(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != -1.0)
}

fn fixture_id(record: &RequestDescriptor) -> &str {
    record.request_id.as_deref().unwrap_or("<unnamed>")
}

/// Pull every known timestamp out of `record` and assert that the fixture
/// is internally consistent. Contradictory fixtures are an authoring bug,
/// not a recoverable condition.
pub fn extract_timing(record: &RequestDescriptor) -> SynthResult<PartialTiming> {
    let hints = record.timing.clone().unwrap_or_default();

    let renderer_start_time = sanitize(record.renderer_start_time);
    let start_time = sanitize(record.network_request_time);
    let request_time_ms = sanitize(hints.request_time).map(|seconds| seconds * 1000.0);
    let response_received_time = sanitize(record.response_headers_end_time);
    let end_time = record.network_end_time;
    let redirect_response_timestamp = sanitize(record.redirect_response_timestamp);
    let receive_headers_end = sanitize(hints.receive_headers_end);

    let mut max_relative_offset = 0f64;
    let extra_offsets = hints
        .offsets
        .values()
        .filter_map(Value::as_f64)
        .filter(|offset| *offset != -1.0);
    for offset in receive_headers_end.into_iter().chain(extra_offsets) {
        max_relative_offset = max_relative_offset.max(offset);
    }

    let ordered = [
        ("rendererStartTime", renderer_start_time),
        ("networkRequestTime", start_time),
        ("timing.requestTime", request_time_ms),
        ("responseHeadersEndTime", response_received_time),
        ("networkEndTime", sanitize(end_time)),
    ];
    for (i, (earlier_name, earlier)) in ordered.iter().enumerate() {
        for (later_name, later) in &ordered[i + 1..] {
            if let (Some(a), Some(b)) = (earlier, later)
                && *a > *b + TIME_EPSILON
            {
                return Err(SynthError::Fixture(format!(
                    "request {}: {earlier_name} ({a}) is after {later_name} ({b})",
                    fixture_id(record)
                )));
            }
        }
    }

    if let (Some(start), Some(request_time)) = (start_time, request_time_ms)
        && !approx_eq(start, request_time)
    {
        return Err(SynthError::Fixture(format!(
            "request {}: networkRequestTime ({start}) disagrees with timing.requestTime ({request_time})",
            fixture_id(record)
        )));
    }

    if let Some(base) = start_time.or(request_time_ms) {
        let reach = base + max_relative_offset;
        if let Some(received) = response_received_time
            && reach > received + TIME_EPSILON
        {
            return Err(SynthError::Fixture(format!(
                "request {}: relative offsets reach {reach}, past responseHeadersEndTime ({received})",
                fixture_id(record)
            )));
        }
        if let Some(end) = sanitize(end_time)
            && reach > end + TIME_EPSILON
        {
            return Err(SynthError::Fixture(format!(
                "request {}: relative offsets reach {reach}, past networkEndTime ({end})",
                fixture_id(record)
            )));
        }
    }

    if let (Some(start), Some(headers_end), Some(received)) =
        (start_time, receive_headers_end, response_received_time)
        && !approx_eq(start + headers_end, received)
    {
        return Err(SynthError::Fixture(format!(
            "request {}: networkRequestTime + receiveHeadersEnd ({}) disagrees with responseHeadersEndTime ({received})",
            fixture_id(record),
            start + headers_end
        )));
    }

    Ok(PartialTiming {
        renderer_start_time,
        start_time,
        request_time_ms,
        response_received_time,
        end_time,
        redirect_response_timestamp,
        receive_headers_end,
        max_relative_offset,
        relative_offsets: hints.offsets,
    })
}
