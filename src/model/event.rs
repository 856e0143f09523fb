//! Wire protocol event model emitted by the synthesizer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire method name of a request-sent event.
pub const REQUEST_WILL_BE_SENT: &str = "Network.requestWillBeSent";
/// Wire method name of a response-received event.
pub const RESPONSE_RECEIVED: &str = "Network.responseReceived";
/// Wire method name of a data-received event.
pub const DATA_RECEIVED: &str = "Network.dataReceived";
/// Wire method name of a loading-finished event.
pub const LOADING_FINISHED: &str = "Network.loadingFinished";
/// Wire method name of a loading-failed event.
pub const LOADING_FAILED: &str = "Network.loadingFailed";
/// Wire method name of a served-from-cache event.
pub const REQUEST_SERVED_FROM_CACHE: &str = "Network.requestServedFromCache";

/// One record of the synthesized activity log.
///
/// Events are append-only and ordered by input record order, not by
/// timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProtocolEvent {
    pub method: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl ProtocolEvent {
    pub fn new(method: &str, params: Map<String, Value>) -> Self {
        Self {
            method: method.to_string(),
            params,
        }
    }

    /// Request id the event addresses, when present.
    pub fn request_id(&self) -> Option<&str> {
        self.params.get("requestId").and_then(Value::as_str)
    }
}
