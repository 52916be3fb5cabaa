//! Pipeline controller.
//!
//! Drives one (video, output language) pair at a time through transcript
//! fetch, generation, illustration, assembly and publishing, and decides
//! per pair whether any of that is needed at all. Generation is the
//! expensive step: content that already exists on disk, published or not,
//! is never regenerated.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::document;
use crate::error::Result;
use crate::niche::{Language, Tier};
use crate::store::{ArticleStore, Namespace};
use crate::types::{
    ArticleDocument, GeneratedArticle, Illustration, PairStatus, RunSummary, Transcript, VideoItem,
};

#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// `Ok(None)` means no transcript exists in any acceptable language.
    async fn fetch(&self, video_id: &str, language: Language) -> Result<Option<Transcript>>;
}

#[async_trait]
pub trait ArticleGenerator: Send + Sync {
    async fn generate(
        &self,
        item: &VideoItem,
        transcript: &Transcript,
        language: Language,
    ) -> Result<GeneratedArticle>;
}

#[async_trait]
pub trait IllustrationSource: Send + Sync {
    async fn fetch(&self, tags: &[String], count: usize) -> Result<Vec<Illustration>>;
}

#[async_trait]
pub trait PostPublisher: Send + Sync {
    /// `None` on any failure; the document then stays unpublished.
    async fn publish(&self, doc: &ArticleDocument) -> Option<String>;
}

/// What a pair needs, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairAction {
    /// Published document exists: nothing to do, no waiting.
    SkipComplete,
    /// Only an unpublished draft exists: retry the publish step alone.
    ResumePublish(PathBuf),
    /// Nothing on disk: run the whole pipeline.
    FullGenerate,
}

pub struct PipelineController {
    store: ArticleStore,
    transcripts: Box<dyn TranscriptSource>,
    generator: Box<dyn ArticleGenerator>,
    images: Box<dyn IllustrationSource>,
    publisher: Box<dyn PostPublisher>,
    delay: Duration,
}

impl PipelineController {
    pub fn new(
        store: ArticleStore,
        transcripts: Box<dyn TranscriptSource>,
        generator: Box<dyn ArticleGenerator>,
        images: Box<dyn IllustrationSource>,
        publisher: Box<dyn PostPublisher>,
        delay: Duration,
    ) -> Self {
        Self {
            store,
            transcripts,
            generator,
            images,
            publisher,
            delay,
        }
    }

    /// Decide what a pair needs by looking at the store alone.
    pub fn decide(&self, item: &VideoItem, _language: Language) -> PairAction {
        if self.store.exists(&item.id, &item.title, Namespace::Published) {
            return PairAction::SkipComplete;
        }
        let draft = self
            .store
            .path_for(&item.id, &item.title, Namespace::Unpublished);
        if draft.exists() {
            return PairAction::ResumePublish(draft);
        }
        PairAction::FullGenerate
    }

    /// Process every pair, one at a time. A stage failure abandons its pair
    /// and the run continues; store failures abort the whole run.
    pub async fn run<F>(
        &self,
        items: &[VideoItem],
        languages: &[Language],
        mut on_pair: F,
    ) -> Result<RunSummary>
    where
        F: FnMut(&VideoItem, Language, &PairStatus),
    {
        let mut summary = RunSummary::default();

        for item in items {
            for &language in languages {
                let status = match self.decide(item, language) {
                    PairAction::SkipComplete => {
                        debug!(video_id = %item.id, lang = %language, "already published, skipping");
                        PairStatus::SkippedPublished
                    }
                    action => {
                        // Everything past this point talks to the network.
                        tokio::time::sleep(self.delay).await;
                        match self.process(item, language, action).await {
                            Ok(status) => status,
                            Err(e) if e.is_fatal() => return Err(e),
                            Err(e) => {
                                warn!(video_id = %item.id, lang = %language, error = %e, "pair abandoned");
                                PairStatus::Failed(e.to_string())
                            }
                        }
                    }
                };
                summary.record(&status);
                on_pair(item, language, &status);
            }
        }

        Ok(summary)
    }

    async fn process(
        &self,
        item: &VideoItem,
        language: Language,
        action: PairAction,
    ) -> Result<PairStatus> {
        match action {
            PairAction::SkipComplete => Ok(PairStatus::SkippedPublished),
            PairAction::ResumePublish(draft) => self.resume(item, &draft).await,
            PairAction::FullGenerate => self.full_generate(item, language).await,
        }
    }

    /// Retry only the publish step for an existing draft. On failure the
    /// file is left exactly as it was.
    async fn resume(&self, item: &VideoItem, draft: &std::path::Path) -> Result<PairStatus> {
        let doc = self.store.load(draft).await?;
        match self.publisher.publish(&doc).await {
            Some(url) => {
                let target = self.store.promote(draft, &url).await?;
                info!(video_id = %item.id, url = %url, path = %target.display(), "draft published and promoted");
                Ok(PairStatus::Resumed(url))
            }
            None => {
                info!(video_id = %item.id, "publish still failing, draft kept for a later run");
                Ok(PairStatus::ResumeDeferred)
            }
        }
    }

    async fn full_generate(&self, item: &VideoItem, language: Language) -> Result<PairStatus> {
        let Some(transcript) = self.transcripts.fetch(&item.id, language).await? else {
            info!(video_id = %item.id, lang = %language, "no transcript available");
            return Ok(PairStatus::NoTranscript);
        };

        let article = self.generator.generate(item, &transcript, language).await?;
        let count = Tier::for_duration(item.duration_secs).profile().illustrations;
        let illustrations = self.images.fetch(&article.tags, count).await?;
        let mut doc = document::assemble(&article, item, &illustrations, Utc::now());

        match self.publisher.publish(&doc).await {
            Some(url) => {
                doc.medium_url = Some(url.clone());
                self.store.save(&doc, Namespace::Published).await?;
                Ok(PairStatus::Published(url))
            }
            None => {
                self.store.save(&doc, Namespace::Unpublished).await?;
                Ok(PairStatus::SavedUnpublished)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::niche::Niche;
    use chrono::TimeZone;

    struct NoTranscripts;

    #[async_trait]
    impl TranscriptSource for NoTranscripts {
        async fn fetch(&self, _: &str, _: Language) -> Result<Option<Transcript>> {
            Ok(None)
        }
    }

    struct NoGenerator;

    #[async_trait]
    impl ArticleGenerator for NoGenerator {
        async fn generate(
            &self,
            _: &VideoItem,
            _: &Transcript,
            _: Language,
        ) -> Result<GeneratedArticle> {
            unreachable!("decide-only tests never generate")
        }
    }

    struct NoImages;

    #[async_trait]
    impl IllustrationSource for NoImages {
        async fn fetch(&self, _: &[String], _: usize) -> Result<Vec<Illustration>> {
            Ok(Vec::new())
        }
    }

    struct NoPublisher;

    #[async_trait]
    impl PostPublisher for NoPublisher {
        async fn publish(&self, _: &ArticleDocument) -> Option<String> {
            None
        }
    }

    fn controller(root: &std::path::Path) -> PipelineController {
        PipelineController::new(
            ArticleStore::new(root),
            Box::new(NoTranscripts),
            Box::new(NoGenerator),
            Box::new(NoImages),
            Box::new(NoPublisher),
            Duration::ZERO,
        )
    }

    fn item() -> VideoItem {
        VideoItem {
            id: "v1".into(),
            title: "Test Video".into(),
            description: String::new(),
            published_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            duration_secs: 700,
        }
    }

    fn doc() -> ArticleDocument {
        ArticleDocument {
            video_id: "v1".into(),
            video_title: "Test Video".into(),
            video_url: "https://www.youtube.com/watch?v=v1".into(),
            medium_url: None,
            generated_at: Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap(),
            language: Language::En,
            title: "Generated Title".into(),
            tags: ["a", "b", "c", "d", "e"].map(String::from).to_vec(),
            body: "Body paragraph.".into(),
        }
    }

    #[tokio::test]
    async fn decide_prefers_published_over_draft() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArticleStore::new(tmp.path());
        store.save(&doc(), Namespace::Published).await.unwrap();
        store.save(&doc(), Namespace::Unpublished).await.unwrap();

        let controller = controller(tmp.path());
        assert_eq!(
            controller.decide(&item(), Language::En),
            PairAction::SkipComplete
        );
    }

    #[tokio::test]
    async fn decide_resumes_lone_draft() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArticleStore::new(tmp.path());
        let draft = store.save(&doc(), Namespace::Unpublished).await.unwrap();

        let controller = controller(tmp.path());
        assert_eq!(
            controller.decide(&item(), Language::En),
            PairAction::ResumePublish(draft)
        );
    }

    #[tokio::test]
    async fn decide_generates_from_scratch() {
        let tmp = tempfile::tempdir().unwrap();
        let controller = controller(tmp.path());
        assert_eq!(
            controller.decide(&item(), Language::En),
            PairAction::FullGenerate
        );
    }

    #[tokio::test]
    async fn missing_transcript_is_a_terminal_skip_not_a_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let controller = controller(tmp.path());

        let summary = controller
            .run(&[item()], &[Language::En], |_, _, _| {})
            .await
            .unwrap();

        assert_eq!(summary.no_transcript, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.total(), 1);
    }
}
