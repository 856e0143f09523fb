//! Fully-populated request records produced by the reference decoder.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::HttpHeader;

/// One rehydrated request lifecycle.
///
/// This is the concrete counterpart of a sparse fixture: ids and URLs are
/// always present, response fields stay `None` until the matching event
/// arrives during replay.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub request_id: String,
    pub url: String,
    #[serde(rename = "documentURL")]
    pub document_url: String,
    pub request_method: String,
    pub resource_type: String,
    pub priority: String,
    pub frame_id: String,
    pub initiator: Value,

    pub status_code: Option<i64>,
    pub response_headers: Vec<HttpHeader>,
    pub mime_type: Option<String>,
    pub protocol: Option<String>,
    pub connection_id: Option<i64>,
    pub connection_reused: Option<bool>,
    pub from_disk_cache: bool,
    pub from_memory_cache: bool,
    pub fetched_via_service_worker: bool,

    pub transfer_size: Option<f64>,
    pub resource_size: Option<f64>,

    pub finished: bool,
    pub failed: bool,
    pub localized_fail_description: Option<String>,

    /// Absolute times, milliseconds.
    pub renderer_start_time: Option<f64>,
    pub network_request_time: Option<f64>,
    pub response_headers_end_time: Option<f64>,
    pub network_end_time: Option<f64>,

    /// Raw wire timing block from the response, when one was seen.
    pub timing: Option<Map<String, Value>>,

    /// Id of the continuation record this request redirected to.
    pub redirect_destination_id: Option<String>,
}
