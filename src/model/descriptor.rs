//! Sparse request fixture model accepted by the synthesizer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One response header. Order is preserved and duplicate names are legal;
/// they are newline-joined when converted to the wire header mapping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

/// Protocol-relative timing hints, all offsets in milliseconds from the
/// request start except `request_time` which is in seconds (wire quirk).
///
/// Unknown offset names are carried verbatim into the synthesized timing
/// block, so fixtures can pin e.g. `sendStart` without this crate knowing
/// about it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimingHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_time: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receive_headers_end: Option<f64>,

    #[serde(flatten)]
    pub offsets: Map<String, Value>,
}

/// Partial description of one network request.
///
/// Every field is optional; absent values are synthesized from fixed
/// realistic defaults. `-1` and absence are equivalent null markers for the
/// absolute time fields, except `network_end_time` where a literal `-1` is
/// the "request never finished" sentinel and survives normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    /// Request id; ids ending in `:redirect` denote the continuation of the
    /// marker-stripped id after a redirect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "documentURL")]
    pub document_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    /// Arbitrary initiator object, passed through to the wire event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiator: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<Vec<HttpHeader>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    /// Encoded (over-the-wire) size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_size: Option<f64>,

    /// Decoded body size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_size: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_reused: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_disk_cache: Option<bool>,

    /// Serve the whole lifecycle from the memory cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_memory_cache: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_via_service_worker: Option<bool>,

    /// Short-circuit the lifecycle with a loading failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localized_fail_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingHints>,

    /// Absolute times, milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer_start_time: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_request_time: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_headers_end_time: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_end_time: Option<f64>,

    /// Injected by the redirect resolver; never caller-set.
    #[serde(skip)]
    pub redirect_response: Option<Map<String, Value>>,

    /// Injected by the redirect resolver; never caller-set.
    #[serde(skip)]
    pub redirect_response_timestamp: Option<f64>,
}

impl RequestDescriptor {
    pub fn is_failed(&self) -> bool {
        self.failed.unwrap_or(false)
    }

    pub fn is_from_memory_cache(&self) -> bool {
        self.from_memory_cache.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_fixture_parses_from_wire_json() {
        let raw = r#"{
          "requestId": "1",
          "url": "https://example.com/page",
          "statusCode": 301,
          "responseHeaders": [{"name": "Location", "value": "https://example.com/next"}],
          "timing": {"requestTime": 1.5, "receiveHeadersEnd": 200, "sendStart": 20},
          "networkEndTime": -1
        }"#;

        let descriptor: RequestDescriptor = serde_json::from_str(raw).expect("fixture parses");
        assert_eq!(descriptor.request_id.as_deref(), Some("1"));
        assert_eq!(descriptor.status_code, Some(301));
        assert_eq!(descriptor.network_end_time, Some(-1.0));
        let timing = descriptor.timing.expect("timing present");
        assert_eq!(timing.request_time, Some(1.5));
        assert_eq!(timing.receive_headers_end, Some(200.0));
        assert_eq!(timing.offsets["sendStart"], 20);
        assert!(descriptor.url.is_some());
        assert!(descriptor.mime_type.is_none());
    }

    #[test]
    fn unset_fields_are_omitted_when_serialized() {
        let descriptor = RequestDescriptor {
            url: Some("https://example.com/".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&descriptor).expect("serializes");
        let object = value.as_object().expect("object");
        assert_eq!(object.len(), 1);
        assert!(object.contains_key("url"));
    }
}
