//! Bus route lookup and arrival boards for the KMB open data API.
//!
//! Given a route code, finds its variants, lists the stops of a variant
//! with their names, and builds a three-slot arrival board for a stop by
//! reconciling estimates across the route's service types.
//!
//! [`service::TransitBoardService`] answers single lookups and backs the
//! JSON API in [`web`]. [`session::BoardSession`] layers one user's
//! selections on top of it for front ends that keep per-user state.

pub mod board;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod kmb;
pub mod service;
pub mod session;
pub mod stops;
pub mod web;
