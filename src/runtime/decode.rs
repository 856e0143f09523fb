//! Reference decoder: replay an activity log back into request records.

use std::collections::HashMap;

use serde_json::{Map, Value, json};

use crate::{
    DATA_RECEIVED, LOADING_FAILED, LOADING_FINISHED, ProtocolEvent, REDIRECT_MARKER,
    REQUEST_SERVED_FROM_CACHE, REQUEST_WILL_BE_SENT, RESPONSE_RECEIVED, RequestRecord, SynthError,
    SynthResult, headers_from_dict,
};
use crate::jsonutil::{bool_field, f64_field, i64_field, map_field, str_field};

/// Rehydrates structured records from an event sequence.
///
/// The verifier accepts any implementation; [`ReplayDecoder`] is the
/// built-in one with browser-equivalent redirect-chain semantics.
pub trait LogDecoder {
    fn decode(&self, events: &[ProtocolEvent]) -> SynthResult<Vec<RequestRecord>>;
}

/// Built-in decoder. A repeated request-sent event for a known id is a
/// redirect hop: the chain tail absorbs the redirect response and a
/// continuation record (`tail_id + ":redirect"`) begins. All later events
/// carrying a wire id address the newest record of that chain.
#[derive(Debug, Clone, Default)]
pub struct ReplayDecoder;

impl LogDecoder for ReplayDecoder {
    fn decode(&self, events: &[ProtocolEvent]) -> SynthResult<Vec<RequestRecord>> {
        let mut replay = Replay::default();
        for event in events {
            replay.apply(event)?;
        }
        Ok(replay.records)
    }
}

#[derive(Default)]
struct Replay {
    /// Records in creation order.
    records: Vec<RequestRecord>,
    /// Wire id -> index of the chain tail.
    tails: HashMap<String, usize>,
}

impl Replay {
    fn apply(&mut self, event: &ProtocolEvent) -> SynthResult<()> {
        match event.method.as_str() {
            REQUEST_WILL_BE_SENT => self.on_request_will_be_sent(&event.params),
            RESPONSE_RECEIVED => {
                let timestamp_ms = timestamp_ms(&event.params);
                let record = self.tail_mut(&event.params, RESPONSE_RECEIVED)?;
                if let Some(response) = map_field(&event.params, "response") {
                    apply_response(record, response);
                }
                record.response_headers_end_time = timestamp_ms;
                Ok(())
            }
            DATA_RECEIVED => {
                let data_length = f64_field(&event.params, "dataLength").unwrap_or(0.0);
                let encoded_length = f64_field(&event.params, "encodedDataLength").unwrap_or(0.0);
                let record = self.tail_mut(&event.params, DATA_RECEIVED)?;
                record.resource_size = Some(record.resource_size.unwrap_or(0.0) + data_length);
                record.transfer_size = Some(record.transfer_size.unwrap_or(0.0) + encoded_length);
                Ok(())
            }
            LOADING_FINISHED => {
                let timestamp_ms = timestamp_ms(&event.params);
                let encoded_length = f64_field(&event.params, "encodedDataLength");
                let record = self.tail_mut(&event.params, LOADING_FINISHED)?;
                record.finished = true;
                record.network_end_time = timestamp_ms;
                if encoded_length.is_some() {
                    record.transfer_size = encoded_length;
                }
                Ok(())
            }
            LOADING_FAILED => {
                let timestamp_ms = timestamp_ms(&event.params);
                let error_text = str_field(&event.params, "errorText").map(str::to_string);
                let record = self.tail_mut(&event.params, LOADING_FAILED)?;
                record.failed = true;
                record.localized_fail_description = error_text;
                record.network_end_time = timestamp_ms;
                Ok(())
            }
            REQUEST_SERVED_FROM_CACHE => {
                let record = self.tail_mut(&event.params, REQUEST_SERVED_FROM_CACHE)?;
                record.from_memory_cache = true;
                Ok(())
            }
            // Foreign methods in a mixed log are not ours to validate.
            _ => Ok(()),
        }
    }

    fn on_request_will_be_sent(&mut self, params: &Map<String, Value>) -> SynthResult<()> {
        let wire_id = str_field(params, "requestId")
            .ok_or_else(|| SynthError::Decode("requestWillBeSent without requestId".to_string()))?
            .to_string();

        if let Some(&tail_index) = self.tails.get(&wire_id) {
            let redirect_response = map_field(params, "redirectResponse")
                .ok_or_else(|| {
                    SynthError::Decode(format!(
                        "repeated requestWillBeSent for {wire_id} without a redirectResponse"
                    ))
                })?
                .clone();
            let hop_time_ms = timestamp_ms(params);

            let continuation_id = {
                let tail = &mut self.records[tail_index];
                apply_response(tail, &redirect_response);
                tail.network_end_time = hop_time_ms;
                tail.finished = true;
                let continuation_id = format!("{}{REDIRECT_MARKER}", tail.request_id);
                tail.redirect_destination_id = Some(continuation_id.clone());
                continuation_id
            };

            let mut record = record_from_request(params);
            record.request_id = continuation_id;
            record.initiator = json!({
                "type": "redirect",
                "url": redirect_response.get("url").cloned().unwrap_or(Value::Null),
            });
            self.tails.insert(wire_id, self.records.len());
            self.records.push(record);
        } else {
            self.tails.insert(wire_id, self.records.len());
            self.records.push(record_from_request(params));
        }
        Ok(())
    }

    fn tail_mut(
        &mut self,
        params: &Map<String, Value>,
        method: &str,
    ) -> SynthResult<&mut RequestRecord> {
        let wire_id = str_field(params, "requestId")
            .ok_or_else(|| SynthError::Decode(format!("{method} without requestId")))?;
        let index = self
            .tails
            .get(wire_id)
            .copied()
            .ok_or_else(|| SynthError::Decode(format!("{method} for unknown request {wire_id}")))?;
        Ok(&mut self.records[index])
    }
}

fn timestamp_ms(params: &Map<String, Value>) -> Option<f64> {
    f64_field(params, "timestamp").map(|seconds| seconds * 1000.0)
}

fn record_from_request(params: &Map<String, Value>) -> RequestRecord {
    let request = map_field(params, "request");
    let started_ms = timestamp_ms(params);
    RequestRecord {
        request_id: str_field(params, "requestId").unwrap_or_default().to_string(),
        url: request
            .and_then(|r| str_field(r, "url"))
            .unwrap_or_default()
            .to_string(),
        document_url: str_field(params, "documentURL").unwrap_or_default().to_string(),
        request_method: request
            .and_then(|r| str_field(r, "method"))
            .unwrap_or_default()
            .to_string(),
        resource_type: str_field(params, "type").unwrap_or_default().to_string(),
        priority: request
            .and_then(|r| str_field(r, "initialPriority"))
            .unwrap_or_default()
            .to_string(),
        frame_id: str_field(params, "frameId").unwrap_or_default().to_string(),
        initiator: params.get("initiator").cloned().unwrap_or(Value::Null),
        renderer_start_time: started_ms,
        // Refined by the response timing block once headers arrive.
        network_request_time: started_ms,
        ..Default::default()
    }
}

fn apply_response(record: &mut RequestRecord, response: &Map<String, Value>) {
    record.status_code = i64_field(response, "status");
    if let Some(headers) = map_field(response, "headers") {
        record.response_headers = headers_from_dict(headers);
    }
    record.mime_type = str_field(response, "mimeType").map(str::to_string);
    record.protocol = str_field(response, "protocol").map(str::to_string);
    record.connection_id = i64_field(response, "connectionId");
    record.connection_reused = bool_field(response, "connectionReused");
    record.from_disk_cache = bool_field(response, "fromDiskCache").unwrap_or(false);
    record.fetched_via_service_worker =
        bool_field(response, "fromServiceWorker").unwrap_or(false);
    record.transfer_size = f64_field(response, "encodedDataLength");

    if let Some(timing) = map_field(response, "timing") {
        if let Some(request_time_seconds) = f64_field(timing, "requestTime") {
            let request_time_ms = request_time_seconds * 1000.0;
            record.network_request_time = Some(request_time_ms);
            if let Some(headers_end) = f64_field(timing, "receiveHeadersEnd") {
                record.response_headers_end_time = Some(request_time_ms + headers_end);
            }
        }
        record.timing = Some(timing.clone());
    }
}
