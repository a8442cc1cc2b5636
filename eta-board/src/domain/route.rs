//! Route identity types.

use std::fmt;

use serde::Serialize;

/// Error returned when parsing an invalid route code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route code: {reason}")]
pub struct InvalidRouteCode {
    reason: &'static str,
}

/// A normalized route code, e.g. `1A` or `N216`.
///
/// Route codes are non-empty runs of uppercase ASCII letters and digits.
/// Any `RouteCode` value is valid by construction.
///
/// # Examples
///
/// ```
/// use eta_board::domain::RouteCode;
///
/// let code = RouteCode::parse("1A").unwrap();
/// assert_eq!(code.as_str(), "1A");
///
/// // User input is trimmed and upper-cased first
/// let code = RouteCode::parse_normalized("  n216 ").unwrap();
/// assert_eq!(code.as_str(), "N216");
///
/// assert!(RouteCode::parse("1a").is_err());
/// assert!(RouteCode::parse("").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RouteCode(String);

impl RouteCode {
    /// Parse a route code that is already in canonical form.
    pub fn parse(s: &str) -> Result<Self, InvalidRouteCode> {
        if s.is_empty() {
            return Err(InvalidRouteCode {
                reason: "must not be empty",
            });
        }

        if !s
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(InvalidRouteCode {
                reason: "must be uppercase ASCII letters or digits",
            });
        }

        Ok(Self(s.to_string()))
    }

    /// Parse user input: surrounding whitespace is dropped and letters are
    /// upper-cased before validation.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidRouteCode> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the route code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RouteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteCode({})", self.0)
    }
}

impl fmt::Display for RouteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when parsing an unknown bound.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid bound: {0:?}")]
pub struct InvalidBound(pub String);

/// Travel direction of a route. Each bound has its own stop sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    Outbound,
    Inbound,
}

impl Bound {
    /// Parse a bound from the catalog's `"O"`/`"I"` tags or the spelled-out
    /// `outbound`/`inbound` names (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, InvalidBound> {
        match s.trim().to_ascii_lowercase().as_str() {
            "o" | "outbound" => Ok(Bound::Outbound),
            "i" | "inbound" => Ok(Bound::Inbound),
            _ => Err(InvalidBound(s.to_string())),
        }
    }

    /// Path segment used by the stop-sequence endpoint.
    pub fn path_segment(self) -> &'static str {
        match self {
            Bound::Outbound => "outbound",
            Bound::Inbound => "inbound",
        }
    }

    /// Numeric direction paired with the path segment.
    ///
    /// The endpoint rejects mismatched pairs, so the two are always derived
    /// from the same `Bound`.
    pub fn direction(self) -> &'static str {
        match self {
            Bound::Outbound => "1",
            Bound::Inbound => "2",
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// One route/bound/service variant from the catalog.
///
/// Several routes can share a `code`; all of them match a search for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub code: RouteCode,
    pub bound: Bound,
    pub service_type: String,
    pub origin_name: String,
    pub dest_name: String,
}

impl Route {
    /// Whether this variant is the given (code, bound, service type).
    pub fn is_variant(&self, code: &RouteCode, bound: Bound, service_type: &str) -> bool {
        &self.code == code && self.bound == bound && self.service_type == service_type
    }
}
