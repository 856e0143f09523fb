//! Redirect chain detection and resolution.

use std::collections::{HashMap, HashSet};

use serde_json::json;

use crate::{
    RequestDescriptor, SynthError, SynthResult, extract_timing, normalize_timing,
    synth::response_payload,
};

/// Suffix convention marking a record as the continuation of a redirect:
/// `"a:redirect"` continues `"a"`, one hop per marker.
pub const REDIRECT_MARKER: &str = ":redirect";
/// Status for fabricated redirect responses when the original record does
/// not declare one.
pub const DEFAULT_REDIRECT_STATUS: i64 = 302;

/// Redirect relationships for one synthesis pass.
///
/// Built once up front as an explicit edge index instead of re-deriving the
/// relationships by string matching per record.
#[derive(Debug)]
pub struct RedirectIndex<'a> {
    records: &'a [RequestDescriptor],
    by_id: HashMap<&'a str, usize>,
    redirect_sources: HashSet<&'a str>,
}

impl<'a> RedirectIndex<'a> {
    pub fn build(records: &'a [RequestDescriptor]) -> Self {
        let mut by_id = HashMap::new();
        let mut redirect_sources = HashSet::new();
        for (index, record) in records.iter().enumerate() {
            let Some(id) = record.request_id.as_deref() else {
                continue;
            };
            by_id.insert(id, index);
            if let Some(original) = id.strip_suffix(REDIRECT_MARKER) {
                redirect_sources.insert(original);
            }
        }
        Self {
            records,
            by_id,
            redirect_sources,
        }
    }

    /// True when another record continues this one after a redirect. The
    /// continuation owns the completion events for the chain.
    pub fn will_be_redirected(&self, record: &RequestDescriptor) -> bool {
        record
            .request_id
            .as_deref()
            .is_some_and(|id| self.redirect_sources.contains(id))
    }

    /// For a continuation record, fabricate the redirect response of its
    /// original and attach it to a copy. Any other record passes through
    /// unchanged. A continuation without an original is a broken fixture.
    pub fn resolve(&self, record: &RequestDescriptor) -> SynthResult<RequestDescriptor> {
        let Some(original_id) = record
            .request_id
            .as_deref()
            .and_then(|id| id.strip_suffix(REDIRECT_MARKER))
        else {
            return Ok(record.clone());
        };

        let Some(&original_index) = self.by_id.get(original_id) else {
            return Err(SynthError::Fixture(format!(
                "redirect {} has no original record {original_id}",
                record.request_id.as_deref().unwrap_or_default()
            )));
        };
        let original = &self.records[original_index];

        let timing = normalize_timing(&extract_timing(original)?);
        let mut response = response_payload(original, &timing);
        response.insert(
            "status".to_string(),
            json!(original.status_code.unwrap_or(DEFAULT_REDIRECT_STATUS)),
        );

        tracing::debug!(
            "attached redirect response of {original_id} to {}",
            record.request_id.as_deref().unwrap_or_default()
        );

        let mut resolved = record.clone();
        resolved.redirect_response = Some(response);
        resolved.redirect_response_timestamp =
            (timing.end_time != -1.0).then_some(timing.end_time);
        Ok(resolved)
    }
}
