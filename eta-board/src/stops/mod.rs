//! Stop list and stop name resolution.
//!
//! A route variant's stops come from one request; each stop's display name
//! needs its own request, so name lookups are issued per stop.

mod names;
mod sequence;

pub use names::StopNameResolver;
pub use sequence::{StopSequenceResolver, dedup_stops};
