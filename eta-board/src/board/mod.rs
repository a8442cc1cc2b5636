//! Arrival board construction.
//!
//! A board always has three slots. Records come from the primary service
//! type first and then from alternates, and each slot is classified on its
//! own from the real-time estimate and the remark's printed schedule.

mod classify;
mod reconcile;

pub use classify::{build_board, classify};
pub use reconcile::{EtaReconciler, SlotFill};
