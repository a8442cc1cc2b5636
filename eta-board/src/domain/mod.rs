//! Domain types for the arrival board.
//!
//! These types represent validated transit data. Invariants are enforced at
//! construction, so code that receives them can trust their validity.

mod eta;
mod route;
mod stop;
mod time;

pub use eta::{BOARD_SLOTS, EtaRecord, EtaSlot, ReconciledBoard, SlotStatus};
pub use route::{Bound, InvalidBound, InvalidRouteCode, Route, RouteCode};
pub use stop::{StopDetails, StopListing, StopRef};
pub use time::{ScheduledTime, TimeError, extract_scheduled_time, format_hhmm};
