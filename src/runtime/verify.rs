//! Round-trip structural verification of assembled logs.

use serde_json::Value;

use crate::{RequestDescriptor, RequestRecord, SynthError, SynthResult, approx_eq, headers_to_dict};

/// Assert that every field the fixtures explicitly set reappears, with the
/// same value, in the decoded records.
///
/// Synthesized defaults are unconstrained: the fixture never specified
/// them. Time fields tolerate microsecond rounding from the wire seconds
/// conversion.
pub fn verify_round_trip(
    fixtures: &[RequestDescriptor],
    decoded: &[RequestRecord],
) -> SynthResult<()> {
    if fixtures.len() != decoded.len() {
        return Err(SynthError::Verify(format!(
            "expected {} decoded records, got {}",
            fixtures.len(),
            decoded.len()
        )));
    }
    for (index, (fixture, record)) in fixtures.iter().zip(decoded).enumerate() {
        check_record(fixture, record).map_err(|detail| {
            SynthError::Verify(format!("record {index} ({}): {detail}", record.request_id))
        })?;
    }
    Ok(())
}

fn check_record(fixture: &RequestDescriptor, record: &RequestRecord) -> Result<(), String> {
    check_str("requestId", fixture.request_id.as_deref(), Some(record.request_id.as_str()))?;
    check_str("url", fixture.url.as_deref(), Some(record.url.as_str()))?;
    check_str(
        "documentURL",
        fixture.document_url.as_deref(),
        Some(record.document_url.as_str()),
    )?;
    check_str(
        "requestMethod",
        fixture.request_method.as_deref(),
        Some(record.request_method.as_str()),
    )?;
    check_str(
        "resourceType",
        fixture.resource_type.as_deref(),
        Some(record.resource_type.as_str()),
    )?;
    check_str("priority", fixture.priority.as_deref(), Some(record.priority.as_str()))?;
    check_str("frameId", fixture.frame_id.as_deref(), Some(record.frame_id.as_str()))?;

    if let Some(initiator) = &fixture.initiator
        && *initiator != record.initiator
    {
        return Err(format!(
            "initiator: fixture {initiator}, decoded {}",
            record.initiator
        ));
    }

    check_i64("statusCode", fixture.status_code, record.status_code)?;
    check_str("mimeType", fixture.mime_type.as_deref(), record.mime_type.as_deref())?;
    check_str("protocol", fixture.protocol.as_deref(), record.protocol.as_deref())?;
    check_i64("connectionId", fixture.connection_id, record.connection_id)?;
    check_bool(
        "connectionReused",
        fixture.connection_reused,
        record.connection_reused,
    )?;
    check_bool(
        "fromDiskCache",
        fixture.from_disk_cache,
        Some(record.from_disk_cache),
    )?;
    check_bool(
        "fromMemoryCache",
        fixture.from_memory_cache,
        Some(record.from_memory_cache),
    )?;
    check_bool(
        "fetchedViaServiceWorker",
        fixture.fetched_via_service_worker,
        Some(record.fetched_via_service_worker),
    )?;
    check_bool("failed", fixture.failed, Some(record.failed))?;
    check_str(
        "localizedFailDescription",
        fixture.localized_fail_description.as_deref(),
        record.localized_fail_description.as_deref(),
    )?;

    if let Some(headers) = &fixture.response_headers {
        let expected = headers_to_dict(headers);
        let actual = headers_to_dict(&record.response_headers);
        if expected != actual {
            return Err(format!(
                "responseHeaders: fixture {}, decoded {}",
                Value::Object(expected),
                Value::Object(actual)
            ));
        }
    }

    check_f64("transferSize", fixture.transfer_size, record.transfer_size)?;
    check_f64("resourceSize", fixture.resource_size, record.resource_size)?;

    // `-1` in the first three absolute fields is the absent marker, so only
    // real values constrain the round trip. The end-time sentinel does
    // round-trip and is compared as-is.
    check_f64(
        "rendererStartTime",
        defined(fixture.renderer_start_time),
        record.renderer_start_time,
    )?;
    check_f64(
        "networkRequestTime",
        defined(fixture.network_request_time),
        record.network_request_time,
    )?;
    check_f64(
        "responseHeadersEndTime",
        defined(fixture.response_headers_end_time),
        record.response_headers_end_time,
    )?;
    check_f64("networkEndTime", fixture.network_end_time, record.network_end_time)?;

    if let Some(hints) = &fixture.timing {
        let timing = record
            .timing
            .as_ref()
            .ok_or("timing: fixture set hints, decoded record carries no timing block")?;
        check_f64(
            "timing.requestTime",
            defined(hints.request_time),
            timing.get("requestTime").and_then(Value::as_f64),
        )?;
        check_f64(
            "timing.receiveHeadersEnd",
            defined(hints.receive_headers_end),
            timing.get("receiveHeadersEnd").and_then(Value::as_f64),
        )?;
        for (name, value) in &hints.offsets {
            let Some(expected) = defined(value.as_f64()) else {
                continue;
            };
            check_f64(
                &format!("timing.{name}"),
                Some(expected),
                timing.get(name).and_then(Value::as_f64),
            )?;
        }
    }

    Ok(())
}

fn defined(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != -1.0)
}

fn check_str(field: &str, expected: Option<&str>, actual: Option<&str>) -> Result<(), String> {
    match (expected, actual) {
        (Some(e), Some(a)) if e != a => Err(format!("{field}: fixture {e:?}, decoded {a:?}")),
        (Some(e), None) => Err(format!("{field}: fixture {e:?}, decoded nothing")),
        _ => Ok(()),
    }
}

fn check_i64(field: &str, expected: Option<i64>, actual: Option<i64>) -> Result<(), String> {
    match (expected, actual) {
        (Some(e), Some(a)) if e != a => Err(format!("{field}: fixture {e}, decoded {a}")),
        (Some(e), None) => Err(format!("{field}: fixture {e}, decoded nothing")),
        _ => Ok(()),
    }
}

fn check_bool(field: &str, expected: Option<bool>, actual: Option<bool>) -> Result<(), String> {
    match (expected, actual) {
        (Some(e), Some(a)) if e != a => Err(format!("{field}: fixture {e}, decoded {a}")),
        (Some(e), None) => Err(format!("{field}: fixture {e}, decoded nothing")),
        _ => Ok(()),
    }
}

fn check_f64(field: &str, expected: Option<f64>, actual: Option<f64>) -> Result<(), String> {
    match (expected, actual) {
        (Some(e), Some(a)) if !approx_eq(e, a) => {
            Err(format!("{field}: fixture {e}, decoded {a}"))
        }
        (Some(e), None) => Err(format!("{field}: fixture {e}, decoded nothing")),
        _ => Ok(()),
    }
}
