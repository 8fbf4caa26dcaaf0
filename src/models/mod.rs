//! Data models for the DataRepo platform.
//!
//! These are the canonical records the rest of the crate works with. Wire
//! payloads from the backend are translated into these shapes by the client
//! before anything else sees them.

mod dataset;
mod principal;

pub use dataset::*;
pub use principal::*;
