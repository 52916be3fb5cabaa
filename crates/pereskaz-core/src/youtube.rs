//! Source lister for the video channel.
//!
//! Pages through the Data API search endpoint, enriches each hit with
//! duration and privacy status via the batched videos endpoint, and drops
//! short-form and non-public items. Quota exhaustion mid-listing returns
//! whatever was collected so far instead of failing the call.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::error::{PereskazError, Result};
use crate::types::VideoItem;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const PAGE_SIZE: usize = 50;

/// Items at or below this duration are short-form and skipped.
const SHORT_FORM_MAX_SECS: u32 = 60;

pub struct YouTubeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Outcome of one upstream call, with quota exhaustion as a first-class
/// non-error case.
enum Page<T> {
    Full(T),
    QuotaExceeded,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Complete, deduplicated list of public, non-short videos, newest
    /// first.
    pub async fn list_channel_videos(&self, channel_id: &str) -> Result<Vec<VideoItem>> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut drafts: Vec<(String, Snippet)> = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            match self.fetch_search_page(channel_id, page_token.as_deref()).await? {
                Page::QuotaExceeded => {
                    warn!(channel_id, listed = drafts.len(), "search quota exceeded, keeping partial list");
                    break;
                }
                Page::Full(page) => {
                    for item in page.items {
                        let Some(video_id) = item.id.video_id else {
                            continue;
                        };
                        if seen.insert(video_id.clone()) {
                            drafts.push((video_id, item.snippet));
                        }
                    }
                    page_token = page.next_page_token;
                    if page_token.is_none() {
                        break;
                    }
                }
            }
        }

        let mut items = Vec::new();
        'enrich: for chunk in drafts.chunks(PAGE_SIZE) {
            let ids: Vec<&str> = chunk.iter().map(|(id, _)| id.as_str()).collect();
            match self.fetch_details(&ids).await? {
                Page::QuotaExceeded => {
                    warn!(channel_id, enriched = items.len(), "details quota exceeded, keeping partial list");
                    break 'enrich;
                }
                Page::Full(details) => {
                    for (id, snippet) in chunk {
                        let Some(detail) = details.items.iter().find(|d| &d.id == id) else {
                            continue;
                        };
                        if detail.status.privacy_status != "public" {
                            continue;
                        }
                        let duration_secs = parse_iso8601_duration(&detail.content_details.duration);
                        if duration_secs <= SHORT_FORM_MAX_SECS {
                            continue;
                        }
                        items.push(VideoItem {
                            id: id.clone(),
                            title: snippet.title.clone(),
                            description: snippet.description.clone(),
                            published_at: parse_timestamp(&snippet.published_at),
                            duration_secs,
                        });
                    }
                }
            }
        }

        Ok(items)
    }

    async fn fetch_search_page(
        &self,
        channel_id: &str,
        page_token: Option<&str>,
    ) -> Result<Page<SearchResponse>> {
        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("key", self.api_key.as_str()),
                ("channelId", channel_id),
                ("part", "id,snippet"),
                ("type", "video"),
                ("order", "date"),
                ("maxResults", "50"),
                ("pageToken", page_token.unwrap_or_default()),
            ])
            .send()
            .await?;

        self.read_page(channel_id, response).await
    }

    async fn fetch_details(&self, ids: &[&str]) -> Result<Page<VideosResponse>> {
        let joined = ids.join(",");
        let response = self
            .http
            .get(format!("{}/videos", self.base_url))
            .query(&[
                ("key", self.api_key.as_str()),
                ("id", joined.as_str()),
                ("part", "contentDetails,status"),
            ])
            .send()
            .await?;

        self.read_page("videos", response).await
    }

    async fn read_page<T: serde::de::DeserializeOwned>(
        &self,
        context: &str,
        response: reqwest::Response,
    ) -> Result<Page<T>> {
        let status = response.status();
        if status.is_success() {
            return Ok(Page::Full(response.json::<T>().await?));
        }

        let body = response.text().await.unwrap_or_default();
        if is_quota_exceeded(&body) {
            return Ok(Page::QuotaExceeded);
        }
        Err(PereskazError::ListingFailed {
            channel_id: context.to_string(),
            reason: format!("upstream returned {status}: {body}"),
        })
    }
}

fn is_quota_exceeded(body: &str) -> bool {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.errors.iter().any(|e| e.reason == "quotaExceeded"))
        .unwrap_or(false)
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Parse an ISO-8601 duration (`PT1H2M10S`) into seconds. Malformed input
/// parses to 0.
pub fn parse_iso8601_duration(raw: &str) -> u32 {
    let mut chars = raw.chars();
    if chars.next() != Some('P') {
        return 0;
    }

    let mut total: u64 = 0;
    let mut value: u64 = 0;
    let mut pending_digits = false;
    let mut saw_unit = false;

    for c in chars {
        match c {
            'T' => {
                if pending_digits {
                    return 0;
                }
            }
            '0'..='9' => {
                value = value * 10 + u64::from(c as u8 - b'0');
                pending_digits = true;
            }
            'D' | 'H' | 'M' | 'S' => {
                if !pending_digits {
                    return 0;
                }
                let multiplier = match c {
                    'D' => 86_400,
                    'H' => 3_600,
                    'M' => 60,
                    _ => 1,
                };
                total += value * multiplier;
                value = 0;
                pending_digits = false;
                saw_unit = true;
            }
            _ => return 0,
        }
    }

    if pending_digits || !saw_unit {
        return 0;
    }
    total.min(u64::from(u32::MAX)) as u32
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    published_at: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    id: String,
    content_details: ContentDetails,
    status: StatusInfo,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusInfo {
    privacy_status: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    errors: Vec<ApiErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorItem {
    #[serde(default)]
    reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hours_minutes_seconds() {
        assert_eq!(parse_iso8601_duration("PT1H2M10S"), 3730);
        assert_eq!(parse_iso8601_duration("PT45S"), 45);
        assert_eq!(parse_iso8601_duration("PT20M"), 1200);
        assert_eq!(parse_iso8601_duration("P1DT1M"), 86_460);
    }

    #[test]
    fn malformed_durations_parse_to_zero() {
        assert_eq!(parse_iso8601_duration("banana"), 0);
        assert_eq!(parse_iso8601_duration(""), 0);
        assert_eq!(parse_iso8601_duration("PT"), 0);
        assert_eq!(parse_iso8601_duration("PT1H2M10"), 0);
        assert_eq!(parse_iso8601_duration("1H2M"), 0);
    }

    #[test]
    fn quota_body_is_recognized() {
        let body = r#"{"error":{"errors":[{"reason":"quotaExceeded"}],"code":403}}"#;
        assert!(is_quota_exceeded(body));
        assert!(!is_quota_exceeded(r#"{"error":{"errors":[{"reason":"keyInvalid"}]}}"#));
        assert!(!is_quota_exceeded("not json"));
    }
}
