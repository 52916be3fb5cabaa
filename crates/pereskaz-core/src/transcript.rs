//! Transcript retrieval with language fallback.
//!
//! Tries the preferred language track first; if the channel has none, falls
//! back to the source language track machine-translated into the preferred
//! language. A video without any usable track yields `Ok(None)` — the
//! controller treats that as a terminal skip, not an error.

use serde::Deserialize;
use tracing::debug;

use crate::error::{PereskazError, Result};
use crate::niche::Language;
use crate::types::Transcript;

const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

pub struct TranscriptClient {
    http: reqwest::Client,
    base_url: String,
    source_language: Language,
}

impl TranscriptClient {
    pub fn new(source_language: Language) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            source_language,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub async fn fetch(&self, video_id: &str, language: Language) -> Result<Option<Transcript>> {
        if let Some(text) = self.fetch_track(video_id, language, None).await? {
            return Ok(Some(Transcript { language, text }));
        }

        if language != self.source_language {
            debug!(video_id, lang = %language, "no native track, trying translated fallback");
            if let Some(text) = self
                .fetch_track(video_id, self.source_language, Some(language))
                .await?
            {
                return Ok(Some(Transcript { language, text }));
            }
        }

        Ok(None)
    }

    async fn fetch_track(
        &self,
        video_id: &str,
        track_language: Language,
        translate_to: Option<Language>,
    ) -> Result<Option<String>> {
        let mut query = vec![
            ("v", video_id),
            ("lang", track_language.code()),
            ("fmt", "json3"),
        ];
        if let Some(target) = translate_to {
            query.push(("tlang", target.code()));
        }

        let response = self
            .http
            .get(format!("{}/api/timedtext", self.base_url))
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(PereskazError::TranscriptFailed {
                video_id: video_id.to_string(),
                reason: format!("timedtext returned {status}"),
            });
        }

        // The endpoint answers 200 with an empty body when no track exists.
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        let track: Json3Track =
            serde_json::from_str(&body).map_err(|e| PereskazError::TranscriptFailed {
                video_id: video_id.to_string(),
                reason: format!("unparseable timedtext payload: {e}"),
            })?;

        let text = concat_events(&track);
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(text))
    }
}

#[async_trait::async_trait]
impl crate::controller::TranscriptSource for TranscriptClient {
    async fn fetch(&self, video_id: &str, language: Language) -> Result<Option<Transcript>> {
        TranscriptClient::fetch(self, video_id, language).await
    }
}

fn concat_events(track: &Json3Track) -> String {
    track
        .events
        .iter()
        .flat_map(|event| event.segs.iter().flatten())
        .map(|seg| seg.utf8.as_str())
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Deserialize)]
struct Json3Track {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(default)]
    segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_concatenate_with_normalized_whitespace() {
        let track: Json3Track = serde_json::from_str(
            r#"{"events":[
                {"segs":[{"utf8":"Hello"},{"utf8":" world\n"}]},
                {},
                {"segs":[{"utf8":"second   cue"}]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(concat_events(&track), "Hello world second cue");
    }

    #[test]
    fn empty_track_concatenates_to_empty() {
        let track: Json3Track = serde_json::from_str(r#"{"events":[]}"#).unwrap();
        assert_eq!(concat_events(&track), "");
    }
}
