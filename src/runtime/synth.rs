//! Per-record protocol event synthesis.

use serde_json::{Map, Value, json};

use crate::{
    DATA_RECEIVED, LOADING_FAILED, LOADING_FINISHED, NormalizedTiming, ProtocolEvent,
    REDIRECT_MARKER, REQUEST_SERVED_FROM_CACHE, REQUEST_WILL_BE_SENT, RESPONSE_RECEIVED,
    RequestDescriptor, headers_to_dict,
};

pub const DEFAULT_URL: &str = "https://example.com/";
pub const DEFAULT_DOCUMENT_URL: &str = "https://example.com/";
pub const DEFAULT_METHOD: &str = "GET";
pub const DEFAULT_STATUS: i64 = 200;
pub const DEFAULT_MIME_TYPE: &str = "text/html";
pub const DEFAULT_PROTOCOL: &str = "http/1.1";
pub const DEFAULT_PRIORITY: &str = "Low";
pub const DEFAULT_RESOURCE_TYPE: &str = "Document";
pub const DEFAULT_CONNECTION_ID: i64 = 140;
pub const DEFAULT_FAIL_DESCRIPTION: &str = "Request failed";

/// Base for generated request ids, `"<base>.<index>"`.
pub const REQUEST_ID_BASE: &str = "38117";
/// Frame shared by every synthesized request unless the fixture pins one.
pub const DEFAULT_FRAME_ID: &str = "3822.1";

/// Wire request id for a record: the fixture id with any trailing redirect
/// markers stripped (the wire reuses one id across a whole chain), or a
/// generated id unique within this synthesis run.
pub fn wire_request_id(record: &RequestDescriptor, index: usize) -> String {
    match &record.request_id {
        Some(id) => {
            let mut stripped = id.as_str();
            while let Some(prefix) = stripped.strip_suffix(REDIRECT_MARKER) {
                stripped = prefix;
            }
            stripped.to_string()
        }
        None => format!("{REQUEST_ID_BASE}.{index}"),
    }
}

/// Event sub-sequence for one resolved, timing-normalized record.
///
/// `redirected_away` means a continuation record owns the completion
/// events, so only the initial request is issued for this hop.
pub fn record_events(
    record: &RequestDescriptor,
    timing: &NormalizedTiming,
    redirected_away: bool,
    index: usize,
) -> Vec<ProtocolEvent> {
    let mut events = vec![request_will_be_sent_event(record, timing, index)];

    if redirected_away {
        return events;
    }

    if record.is_from_memory_cache() {
        events.push(served_from_cache_event(record, index));
    }

    if record.is_failed() {
        events.push(loading_failed_event(record, timing, index));
        return events;
    }

    events.push(response_received_event(record, timing, index));
    events.push(data_received_event(record, index));
    events.push(loading_finished_event(record, timing, index));
    events
}

/// Representative response payload for a record, also used to fabricate the
/// redirect response threaded into continuation records.
pub(crate) fn response_payload(
    record: &RequestDescriptor,
    timing: &NormalizedTiming,
) -> Map<String, Value> {
    let headers = record.response_headers.as_deref().unwrap_or(&[]);
    into_object(json!({
        "url": record.url.as_deref().unwrap_or(DEFAULT_URL),
        "status": record.status_code.unwrap_or(DEFAULT_STATUS),
        "headers": headers_to_dict(headers),
        "mimeType": record.mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE),
        "connectionReused": record.connection_reused.unwrap_or(false),
        "connectionId": record.connection_id.unwrap_or(DEFAULT_CONNECTION_ID),
        "fromDiskCache": record.from_disk_cache.unwrap_or(false),
        "fromServiceWorker": record.fetched_via_service_worker.unwrap_or(false),
        "encodedDataLength": record.transfer_size.unwrap_or(0.0),
        "timing": timing.wire_timing(),
        "protocol": record.protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL),
    }))
}

fn request_will_be_sent_event(
    record: &RequestDescriptor,
    timing: &NormalizedTiming,
    index: usize,
) -> ProtocolEvent {
    let mut params = into_object(json!({
        "requestId": wire_request_id(record, index),
        "documentURL": record.document_url.as_deref().unwrap_or(DEFAULT_DOCUMENT_URL),
        "request": {
            "url": record.url.as_deref().unwrap_or(DEFAULT_URL),
            "method": record.request_method.as_deref().unwrap_or(DEFAULT_METHOD),
            "headers": {},
            "initialPriority": record.priority.as_deref().unwrap_or(DEFAULT_PRIORITY),
        },
        "timestamp": timing.renderer_start_time / 1000.0,
        "initiator": record.initiator.clone().unwrap_or_else(default_initiator),
        "type": record.resource_type.as_deref().unwrap_or(DEFAULT_RESOURCE_TYPE),
        "frameId": record.frame_id.as_deref().unwrap_or(DEFAULT_FRAME_ID),
    }));
    if let Some(redirect_response) = &record.redirect_response {
        params.insert(
            "redirectResponse".to_string(),
            Value::Object(redirect_response.clone()),
        );
    }
    ProtocolEvent::new(REQUEST_WILL_BE_SENT, params)
}

fn response_received_event(
    record: &RequestDescriptor,
    timing: &NormalizedTiming,
    index: usize,
) -> ProtocolEvent {
    let params = into_object(json!({
        "requestId": wire_request_id(record, index),
        "timestamp": timing.response_received_time / 1000.0,
        "type": record.resource_type.as_deref().unwrap_or(DEFAULT_RESOURCE_TYPE),
        "frameId": record.frame_id.as_deref().unwrap_or(DEFAULT_FRAME_ID),
        "response": response_payload(record, timing),
    }));
    ProtocolEvent::new(RESPONSE_RECEIVED, params)
}

fn data_received_event(record: &RequestDescriptor, index: usize) -> ProtocolEvent {
    let params = into_object(json!({
        "requestId": wire_request_id(record, index),
        "dataLength": record.resource_size.unwrap_or(0.0),
        "encodedDataLength": record.transfer_size.unwrap_or(0.0),
    }));
    ProtocolEvent::new(DATA_RECEIVED, params)
}

fn loading_finished_event(
    record: &RequestDescriptor,
    timing: &NormalizedTiming,
    index: usize,
) -> ProtocolEvent {
    let params = into_object(json!({
        "requestId": wire_request_id(record, index),
        "timestamp": timing.end_time / 1000.0,
        "encodedDataLength": record.transfer_size.unwrap_or(0.0),
    }));
    ProtocolEvent::new(LOADING_FINISHED, params)
}

fn loading_failed_event(
    record: &RequestDescriptor,
    timing: &NormalizedTiming,
    index: usize,
) -> ProtocolEvent {
    let params = into_object(json!({
        "requestId": wire_request_id(record, index),
        "timestamp": timing.end_time / 1000.0,
        "errorText": record
            .localized_fail_description
            .as_deref()
            .unwrap_or(DEFAULT_FAIL_DESCRIPTION),
        "canceled": false,
    }));
    ProtocolEvent::new(LOADING_FAILED, params)
}

fn served_from_cache_event(record: &RequestDescriptor, index: usize) -> ProtocolEvent {
    let params = into_object(json!({
        "requestId": wire_request_id(record, index),
    }));
    ProtocolEvent::new(REQUEST_SERVED_FROM_CACHE, params)
}

fn default_initiator() -> Value {
    json!({"type": "other"})
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
