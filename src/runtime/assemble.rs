//! Log assembly: drive resolution, extraction, normalization and synthesis
//! over a fixture sequence, then self-verify the result.

use serde::{Deserialize, Serialize};

use crate::{
    LogDecoder, ProtocolEvent, RedirectIndex, ReplayDecoder, RequestDescriptor, SynthResult,
    extract_timing, normalize_timing, record_events, verify_round_trip,
};

/// Assembly options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SynthOptions {
    /// Skip the round-trip self-check after assembly.
    pub skip_verification: bool,
}

/// Synthesize the full activity log for `records`, round-tripping the
/// result through the built-in decoder unless suppressed.
///
/// Events are concatenated in input record order, not timestamp order.
pub fn synthesize_log(
    records: &[RequestDescriptor],
    options: &SynthOptions,
) -> SynthResult<Vec<ProtocolEvent>> {
    synthesize_log_with_decoder(records, options, &ReplayDecoder)
}

/// Like [`synthesize_log`], verifying through a caller-supplied decoder.
pub fn synthesize_log_with_decoder(
    records: &[RequestDescriptor],
    options: &SynthOptions,
    decoder: &dyn LogDecoder,
) -> SynthResult<Vec<ProtocolEvent>> {
    let redirects = RedirectIndex::build(records);

    let mut log = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let resolved = redirects.resolve(record)?;
        let timing = normalize_timing(&extract_timing(&resolved)?);
        let redirected_away = redirects.will_be_redirected(&resolved);
        log.extend(record_events(&resolved, &timing, redirected_away, index));
    }
    tracing::debug!(
        "assembled {} events from {} records",
        log.len(),
        records.len()
    );

    if !options.skip_verification {
        let decoded = decoder.decode(&log)?;
        verify_round_trip(records, &decoded)?;
    }

    Ok(log)
}
