//! KMB API response DTOs.
//!
//! These types map directly to the JSON responses. Every field is optional:
//! the API omits fields, sends `null`, and mixes numbers and numeric strings
//! for the same field across endpoints.

use serde::Deserialize;

/// Top-level `{ "data": ... }` wrapper. A missing or null `data` is an
/// empty result, not an error.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

/// A scalar the API sends either as a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Loose {
    Int(i64),
    Str(String),
}

impl Loose {
    /// Positive integer value, if this is one (`3` or `"3"`).
    pub fn as_positive(&self) -> Option<u32> {
        let n = match self {
            Loose::Int(n) => *n,
            Loose::Str(s) => s.trim().parse().ok()?,
        };
        u32::try_from(n).ok().filter(|n| *n >= 1)
    }

    /// String form (`1` and `"1"` both become `"1"`).
    pub fn to_text(&self) -> String {
        match self {
            Loose::Int(n) => n.to_string(),
            Loose::Str(s) => s.trim().to_string(),
        }
    }
}

/// Row of `/route`.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteDto {
    pub route: Option<String>,
    /// `"O"` or `"I"`.
    pub bound: Option<String>,
    pub service_type: Option<Loose>,
    pub orig_en: Option<String>,
    pub orig_tc: Option<String>,
    pub orig_sc: Option<String>,
    pub dest_en: Option<String>,
    pub dest_tc: Option<String>,
    pub dest_sc: Option<String>,
}

/// Row of `/route-stop/{route}/{bound}/{direction}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteStopDto {
    pub seq: Option<Loose>,
    pub stop: Option<String>,
}

/// Body of `/stop/{stop_id}`. Unknown stops come back as `{}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StopDto {
    pub stop: Option<String>,
    pub name_en: Option<String>,
    pub name_tc: Option<String>,
    pub name_sc: Option<String>,
}

/// Row of `/eta/{stop_id}/{route}/{service_type}`.
#[derive(Debug, Clone, Deserialize)]
pub struct EtaDto {
    pub eta_seq: Option<Loose>,
    /// ISO 8601 timestamp with offset, or null.
    pub eta: Option<String>,
    pub rmk_en: Option<String>,
    pub rmk_tc: Option<String>,
    pub rmk_sc: Option<String>,
    pub service_type: Option<Loose>,
}
