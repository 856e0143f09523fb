//! Netsynth core library: synthesize browser network activity logs from
//! sparse request fixtures, with round-trip self-verification.

#[path = "runtime/assemble.rs"]
mod assemble;
#[path = "runtime/decode.rs"]
mod decode;
#[path = "model/descriptor.rs"]
mod descriptor;
#[path = "platform/error.rs"]
mod error;
#[path = "model/event.rs"]
mod event;
#[path = "runtime/extract.rs"]
mod extract;
#[path = "platform/jsonutil.rs"]
mod jsonutil;
#[path = "runtime/normalize.rs"]
mod normalize;
#[path = "model/record.rs"]
mod record;
#[path = "runtime/redirect.rs"]
mod redirect;
#[path = "runtime/synth.rs"]
mod synth;
#[path = "runtime/verify.rs"]
mod verify;

pub use assemble::*;
pub use decode::*;
pub use descriptor::*;
pub use error::*;
pub use event::*;
pub use extract::*;
pub use jsonutil::*;
pub use normalize::*;
pub use record::*;
pub use redirect::*;
pub use synth::*;
pub use verify::*;
