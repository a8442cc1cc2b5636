//! Stop name lookup.

use crate::config::Language;
use crate::domain::StopDetails;
use crate::kmb::convert::{convert_stop, decode_data};
use crate::kmb::types::StopDto;
use crate::kmb::{FetchError, JsonSource, RetryPolicy, RetryingFetcher};

/// Resolves a stop id to its display name in the configured language.
///
/// A stop without a usable name resolves to `display_name: None`; choosing a
/// placeholder is left to presentation.
#[derive(Debug, Clone)]
pub struct StopNameResolver<S> {
    fetcher: RetryingFetcher<S>,
    policy: RetryPolicy,
    language: Language,
}

impl<S: JsonSource> StopNameResolver<S> {
    pub fn new(fetcher: RetryingFetcher<S>, policy: RetryPolicy, language: Language) -> Self {
        Self {
            fetcher,
            policy,
            language,
        }
    }

    pub fn path_for(stop_id: &str) -> String {
        format!("/stop/{stop_id}")
    }

    pub async fn resolve(&self, stop_id: &str) -> Result<StopDetails, FetchError> {
        let value = self
            .fetcher
            .fetch(&Self::path_for(stop_id), self.policy)
            .await?;
        let dto: StopDto = decode_data(value)?;
        Ok(convert_stop(stop_id, dto, self.language))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmb::mock::MockSource;
    use serde_json::json;
    use std::time::Duration;

    fn resolver(source: &MockSource, language: Language) -> StopNameResolver<MockSource> {
        StopNameResolver::new(
            RetryingFetcher::new(source.clone()),
            RetryPolicy::new(5, Duration::from_secs(3)),
            language,
        )
    }

    #[tokio::test]
    async fn resolves_trimmed_name() {
        let source = MockSource::new();
        source.respond(
            "/stop/A3ADFCDF8487ADB9",
            json!({"data": {
                "stop": "A3ADFCDF8487ADB9",
                "name_en": "SAU MAU PING (CENTRAL)",
                "name_tc": " 中秀茂坪 ",
                "name_sc": "中秀茂坪"
            }}),
        );

        let details = resolver(&source, Language::Tc)
            .resolve("A3ADFCDF8487ADB9")
            .await
            .unwrap();
        assert_eq!(details.stop_id, "A3ADFCDF8487ADB9");
        assert_eq!(details.display_name.as_deref(), Some("中秀茂坪"));
    }

    #[tokio::test]
    async fn english_name() {
        let source = MockSource::new();
        source.respond(
            "/stop/X",
            json!({"data": {"name_en": "STAR FERRY", "name_tc": "尖沙咀碼頭"}}),
        );

        let details = resolver(&source, Language::En).resolve("X").await.unwrap();
        assert_eq!(details.display_name.as_deref(), Some("STAR FERRY"));
    }

    #[tokio::test]
    async fn empty_payload_signals_no_name() {
        let source = MockSource::new();
        source.respond("/stop/X", json!({"data": {}}));
        let details = resolver(&source, Language::Tc).resolve("X").await.unwrap();
        assert_eq!(details.display_name, None);

        source.respond("/stop/Y", json!({"data": {"name_tc": "   "}}));
        let details = resolver(&source, Language::Tc).resolve("Y").await.unwrap();
        assert_eq!(details.display_name, None);
    }

    #[tokio::test(start_paused = true)]
    async fn uses_five_attempts() {
        let source = MockSource::new();
        source.respond_status("/stop/X", 522, "");

        let start = tokio::time::Instant::now();
        let result = resolver(&source, Language::Tc).resolve("X").await;

        assert!(result.is_err());
        assert_eq!(source.calls("/stop/X"), 5);
        assert_eq!(start.elapsed(), Duration::from_secs(12));
    }
}
