//! Filesystem-backed article store.
//!
//! One file per (video id, title) under a namespace directory. The store
//! doubles as the pipeline's completion record: existence of a file is the
//! signal that generation (and possibly publication) already happened, so
//! it must never overwrite an existing key.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::document;
use crate::error::{PereskazError, Result};
use crate::types::ArticleDocument;

/// Logical partition of the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Namespace {
    Published,
    Unpublished,
}

const UNPUBLISHED_DIR: &str = "unpublished";

#[derive(Debug, Clone)]
pub struct ArticleStore {
    root: PathBuf,
}

impl ArticleStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn dir(&self, namespace: Namespace) -> PathBuf {
        match namespace {
            Namespace::Published => self.root.clone(),
            Namespace::Unpublished => self.root.join(UNPUBLISHED_DIR),
        }
    }

    /// Deterministic path for a (video id, title) key.
    pub fn path_for(&self, video_id: &str, title: &str, namespace: Namespace) -> PathBuf {
        self.dir(namespace)
            .join(format!("{}_{}.md", video_id, sanitize_title(title)))
    }

    pub fn exists(&self, video_id: &str, title: &str, namespace: Namespace) -> bool {
        self.path_for(video_id, title, namespace).exists()
    }

    /// Persist a document. No-op if the key is already present.
    pub async fn save(&self, doc: &ArticleDocument, namespace: Namespace) -> Result<PathBuf> {
        let path = self.path_for(&doc.video_id, &doc.video_title, namespace);
        if path.exists() {
            return Ok(path);
        }
        fs::create_dir_all(self.dir(namespace)).await?;
        fs::write(&path, document::render(doc)).await?;
        Ok(path)
    }

    pub async fn load(&self, path: &Path) -> Result<ArticleDocument> {
        let text = fs::read_to_string(path).await?;
        document::parse(&text, &path.display().to_string())
    }

    /// Record a successful publication: rewrite the URL field and move the
    /// file from the unpublished into the published namespace.
    pub async fn promote(&self, path: &Path, remote_url: &str) -> Result<PathBuf> {
        let mut doc = self.load(path).await?;
        doc.medium_url = Some(remote_url.to_string());

        let target = self.path_for(&doc.video_id, &doc.video_title, Namespace::Published);
        if target.exists() {
            return Err(PereskazError::StoreFailed {
                path: target,
                reason: "published document already exists".into(),
            });
        }

        fs::create_dir_all(self.dir(Namespace::Published)).await?;
        fs::write(path, document::render(&doc)).await?;
        fs::rename(path, &target).await?;
        Ok(target)
    }
}

/// Strip path-hostile characters from a title; spaces are kept.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') && !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}
