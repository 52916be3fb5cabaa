//! Article generation via a chat-completions API.
//!
//! Three independent calls per article: body, title, tags. The transcript
//! forwarded to the body call is bounded by the duration tier's character
//! budget; over-budget transcripts are sampled head/middle/tail so the
//! model still sees the whole narrative arc.

use serde_json::json;
use tracing::debug;

use crate::config::ModelsConfig;
use crate::error::{PereskazError, Result};
use crate::niche::{self, Language, Niche, Tier};
use crate::types::{GeneratedArticle, Transcript, VideoItem};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

pub struct Generator {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    models: ModelsConfig,
    niche: Niche,
}

impl Generator {
    pub fn new(api_key: impl Into<String>, models: ModelsConfig, niche: Niche) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            models,
            niche,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub async fn generate(
        &self,
        item: &VideoItem,
        transcript: &Transcript,
        language: Language,
    ) -> Result<GeneratedArticle> {
        let profile = Tier::for_duration(item.duration_secs).profile();
        let sample = sample_transcript(&transcript.text, profile.transcript_budget);
        debug!(
            video_id = %item.id,
            sampled = sample.chars().count(),
            original = transcript.text.chars().count(),
            "transcript prepared for generation"
        );

        let body = self
            .chat(
                &self.models.body,
                &niche::body_system_prompt(self.niche, language),
                &format!(
                    "Write a well-structured article of {length} based on the \
                     following video transcription.\n\nTitle: {title}\n\n\
                     Transcription: {sample}",
                    length = profile.target_length,
                    title = item.title,
                ),
                0.7,
                profile.max_tokens,
                &item.id,
            )
            .await?;
        if body.trim().is_empty() {
            return Err(PereskazError::GenerationFailed {
                video_id: item.id.clone(),
                reason: "model returned an empty article body".into(),
            });
        }

        let title = self
            .chat(
                &self.models.title,
                &niche::title_system_prompt(language),
                &format!(
                    "Suggest a headline for this article:\n\n{}",
                    truncate_chars(&body, 1_500)
                ),
                0.7,
                60,
                &item.id,
            )
            .await?
            .trim()
            .trim_matches('"')
            .to_string();
        let title = if title.is_empty() {
            item.title.clone()
        } else {
            title
        };

        let tags_raw = self
            .chat(
                &self.models.tags,
                &niche::tags_system_prompt(language),
                &format!(
                    "Generate five relevant tags for an article with the \
                     following title and content. Answer with a JSON array of \
                     strings.\n\nTitle: {title}\n\nContent: {}",
                    truncate_chars(&body, 1_000)
                ),
                0.3,
                100,
                &item.id,
            )
            .await?;
        let tags = parse_tags(&tags_raw, self.niche);

        Ok(GeneratedArticle {
            body: body.trim().to_string(),
            title,
            tags,
            language,
            niche: self.niche,
        })
    }

    async fn chat(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
        max_tokens: u32,
        video_id: &str,
    ) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": model,
                "messages": [
                    {
                        "role": "system",
                        "content": system_prompt,
                    },
                    {
                        "role": "user",
                        "content": user_prompt,
                    },
                ],
                "temperature": temperature,
                "max_tokens": max_tokens,
            }))
            .send()
            .await?
            .json::<serde_json::Value>()
            .await?;

        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| PereskazError::GenerationFailed {
                video_id: video_id.to_string(),
                reason: format!("invalid API response: {response:?}"),
            })?;

        Ok(content.to_string())
    }
}

#[async_trait::async_trait]
impl crate::controller::ArticleGenerator for Generator {
    async fn generate(
        &self,
        item: &VideoItem,
        transcript: &Transcript,
        language: Language,
    ) -> Result<GeneratedArticle> {
        Generator::generate(self, item, transcript, language).await
    }
}

const SAMPLE_GAP: &str = "\n[…]\n";

/// Bound a transcript to `budget` characters. Short input passes through;
/// long input is sampled as head (40%), middle (30%) and tail (30%) slices
/// joined with ellipsis markers, so total output stays within the budget.
pub fn sample_transcript(text: &str, budget: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= budget {
        return text.to_string();
    }

    let gap_len = SAMPLE_GAP.chars().count();
    let usable = budget.saturating_sub(2 * gap_len);
    if usable == 0 {
        return chars[..budget].iter().collect();
    }

    let head_len = usable * 2 / 5;
    let mid_len = usable * 3 / 10;
    let tail_len = usable - head_len - mid_len;

    let head: String = chars[..head_len].iter().collect();
    let mid_start = (chars.len() - mid_len) / 2;
    let mid: String = chars[mid_start..mid_start + mid_len].iter().collect();
    let tail: String = chars[chars.len() - tail_len..].iter().collect();

    format!("{head}{SAMPLE_GAP}{mid}{SAMPLE_GAP}{tail}")
}

/// Exactly five tags: the model's, or the niche defaults when the response
/// is not a JSON array of at least five strings.
fn parse_tags(raw: &str, niche: Niche) -> Vec<String> {
    let cleaned = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    match serde_json::from_str::<Vec<String>>(cleaned) {
        Ok(tags) if tags.len() >= 5 => tags.into_iter().take(5).collect(),
        _ => niche.default_tags().iter().map(|t| t.to_string()).collect(),
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
