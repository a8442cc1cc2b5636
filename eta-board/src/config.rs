//! Board configuration.

use chrono::{FixedOffset, Offset, Utc};

use crate::kmb::RetryPolicy;

/// Hong Kong time, the offset the API reports in.
const DEFAULT_UTC_OFFSET_SECS: i32 = 8 * 60 * 60;

/// Which localized field to read names and remarks from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    En,
    /// Traditional Chinese.
    #[default]
    Tc,
    /// Simplified Chinese.
    Sc,
}

impl Language {
    /// Parse a language tag (`en`, `tc`, `sc`, case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "tc" => Some(Language::Tc),
            "sc" => Some(Language::Sc),
            _ => None,
        }
    }

    /// Pick the field for this language, falling back to the others when
    /// it is missing or blank.
    pub fn pick<'a>(
        self,
        en: Option<&'a str>,
        tc: Option<&'a str>,
        sc: Option<&'a str>,
    ) -> Option<&'a str> {
        let preferred = match self {
            Language::En => [en, tc, sc],
            Language::Tc => [tc, en, sc],
            Language::Sc => [sc, tc, en],
        };
        preferred
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
    }
}

/// Service types queried for arrivals, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTypes {
    /// Always queried first.
    pub primary: String,
    /// Queried in order while the board still has empty slots.
    pub alternates: Vec<String>,
}

impl Default for ServiceTypes {
    fn default() -> Self {
        Self {
            primary: "1".to_string(),
            alternates: vec!["2".to_string(), "3".to_string(), "4".to_string()],
        }
    }
}

/// Configuration shared by the resolvers and the reconciler.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub language: Language,
    /// Offset used for "today" and for displayed times.
    pub utc_offset_secs: i32,
    pub service_types: ServiceTypes,
    /// Route catalog and stop sequence lookups.
    pub catalog_retry: RetryPolicy,
    /// Stop names and arrival estimates.
    pub realtime_retry: RetryPolicy,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            utc_offset_secs: DEFAULT_UTC_OFFSET_SECS,
            service_types: ServiceTypes::default(),
            catalog_retry: RetryPolicy::CATALOG,
            realtime_retry: RetryPolicy::REALTIME,
        }
    }
}

impl BoardConfig {
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_utc_offset_secs(mut self, secs: i32) -> Self {
        self.utc_offset_secs = secs;
        self
    }

    pub fn with_service_types(mut self, service_types: ServiceTypes) -> Self {
        self.service_types = service_types;
        self
    }

    pub fn with_catalog_retry(mut self, policy: RetryPolicy) -> Self {
        self.catalog_retry = policy;
        self
    }

    pub fn with_realtime_retry(mut self, policy: RetryPolicy) -> Self {
        self.realtime_retry = policy;
        self
    }

    /// The configured offset; out-of-range values fall back to UTC.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_secs).unwrap_or_else(|| Utc.fix())
    }
}
