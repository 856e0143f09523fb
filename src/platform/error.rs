//! Crate-wide error and result types.

use thiserror::Error;

pub type SynthResult<T> = Result<T, SynthError>;

#[derive(Debug, Error)]
pub enum SynthError {
    /// The caller-supplied fixture is self-contradictory (inverted timings,
    /// redirect continuation with no original record).
    #[error("broken fixture: {0}")]
    Fixture(String),

    /// An event sequence fed to the decoder does not describe a replayable
    /// request lifecycle.
    #[error("undecodable log: {0}")]
    Decode(String),

    /// The assembled log did not round-trip back into the input records.
    #[error("round-trip verification failed: {0}")]
    Verify(String),
}
