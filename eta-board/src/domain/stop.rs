//! Stop types.

use serde::Serialize;

/// A stop's position on a route variant.
///
/// Identity is the `(sequence_number, stop_id)` pair; a resolved stop list
/// never contains the same pair twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StopRef {
    /// 1-based position along the route.
    pub sequence_number: u32,
    pub stop_id: String,
}

impl StopRef {
    pub fn new(sequence_number: u32, stop_id: impl Into<String>) -> Self {
        Self {
            sequence_number,
            stop_id: stop_id.into(),
        }
    }

    /// A stop with a blank id cannot be looked up or queried for arrivals.
    pub fn is_valid(&self) -> bool {
        !self.stop_id.trim().is_empty()
    }

    /// Whether this is the first stop of its route variant.
    pub fn is_first(&self) -> bool {
        self.sequence_number == 1
    }
}

/// Display metadata for a stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopDetails {
    pub stop_id: String,
    /// Trimmed localized name. `None` when the API had no usable name;
    /// presentation decides what placeholder to show.
    pub display_name: Option<String>,
}

impl StopDetails {
    /// Build details from a raw name, trimming it and mapping blank to `None`.
    pub fn new(stop_id: impl Into<String>, raw_name: Option<&str>) -> Self {
        let display_name = raw_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Self {
            stop_id: stop_id.into(),
            display_name,
        }
    }

    /// Details for a stop whose name could not be resolved.
    pub fn unnamed(stop_id: impl Into<String>) -> Self {
        Self {
            stop_id: stop_id.into(),
            display_name: None,
        }
    }
}

/// A stop paired with its resolved details, in route order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopListing {
    pub stop: StopRef,
    pub details: StopDetails,
}
