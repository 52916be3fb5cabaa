use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::niche::{Language, Niche};

/// One public, non-short video from the source channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub duration_secs: u32,
}

impl VideoItem {
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub language: Language,
    pub text: String,
}

/// Output of the three generation calls for one (video, language) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedArticle {
    pub body: String,
    pub title: String,
    /// Always exactly five entries, model-provided or niche defaults.
    pub tags: Vec<String>,
    pub language: Language,
    pub niche: Niche,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Illustration {
    pub url: String,
    pub alt_text: String,
    pub attribution: String,
}

/// The unit of persistence: front-matter metadata plus a Markdown body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleDocument {
    pub video_id: String,
    /// Source video title; together with `video_id` it is the store key.
    pub video_title: String,
    pub video_url: String,
    /// None renders as `not_published`; set when the publisher succeeds.
    pub medium_url: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub language: Language,
    pub title: String,
    pub tags: Vec<String>,
    pub body: String,
}

/// Per-pair result reported back to the caller while a run progresses.
#[derive(Debug, Clone, PartialEq)]
pub enum PairStatus {
    /// A published document already existed; nothing was done.
    SkippedPublished,
    /// Full pipeline ran and the post went live.
    Published(String),
    /// Full pipeline ran but publishing failed; saved as unpublished.
    SavedUnpublished,
    /// An unpublished draft was published and promoted.
    Resumed(String),
    /// An unpublished draft exists but publishing failed again.
    ResumeDeferred,
    /// No transcript in any acceptable language.
    NoTranscript,
    /// A stage failed; the pair was abandoned for this run.
    Failed(String),
}

/// Aggregated counts for one controller run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub published: usize,
    pub saved_unpublished: usize,
    pub resumed: usize,
    pub resume_deferred: usize,
    pub skipped: usize,
    pub no_transcript: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, status: &PairStatus) {
        match status {
            PairStatus::SkippedPublished => self.skipped += 1,
            PairStatus::Published(_) => self.published += 1,
            PairStatus::SavedUnpublished => self.saved_unpublished += 1,
            PairStatus::Resumed(_) => self.resumed += 1,
            PairStatus::ResumeDeferred => self.resume_deferred += 1,
            PairStatus::NoTranscript => self.no_transcript += 1,
            PairStatus::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.published
            + self.saved_unpublished
            + self.resumed
            + self.resume_deferred
            + self.skipped
            + self.no_transcript
            + self.failed
    }
}
