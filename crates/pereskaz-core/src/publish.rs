//! Posting finished documents to the blog-hosting API.
//!
//! Posts go to a publication when the niche maps to one, otherwise to the
//! personal profile. Any failure — auth, network, non-2xx — resolves to
//! `None`; the controller keeps the document in the unpublished namespace
//! and a later run retries the publish alone.

use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::config::PublishStatus;
use crate::error::{PereskazError, Result};
use crate::types::ArticleDocument;

const DEFAULT_BASE_URL: &str = "https://api.medium.com";

pub struct MediumClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    publish_status: PublishStatus,
    publication: Option<String>,
}

impl MediumClient {
    pub fn new(
        access_token: impl Into<String>,
        publish_status: PublishStatus,
        publication: Option<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: access_token.into(),
            publish_status,
            publication,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Create a remote post for the document. `None` on any failure.
    pub async fn publish(&self, doc: &ArticleDocument) -> Option<String> {
        match self.try_publish(doc).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(video_id = %doc.video_id, error = %e, "publish attempt failed");
                None
            }
        }
    }

    async fn try_publish(&self, doc: &ArticleDocument) -> Result<String> {
        let endpoint = match &self.publication {
            Some(publication) => {
                format!("{}/v1/publications/{}/posts", self.base_url, publication)
            }
            None => {
                let author_id = self.author_id().await?;
                format!("{}/v1/users/{}/posts", self.base_url, author_id)
            }
        };

        let response = self
            .http
            .post(endpoint)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Accept", "application/json")
            .json(&json!({
                "title": doc.title,
                "contentFormat": "markdown",
                "content": doc.body,
                "tags": doc.tags,
                "publishStatus": self.publish_status.as_str(),
                "canonicalUrl": doc.video_url,
            }))
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::CREATED {
            return Err(PereskazError::PublishFailed {
                reason: format!("create-post returned {status}"),
            });
        }

        let created: PostResponse = response.json().await?;
        Ok(created.data.url)
    }

    async fn author_id(&self) -> Result<String> {
        let response = self
            .http
            .get(format!("{}/v1/me", self.base_url))
            .header("Authorization", format!("Bearer {}", self.access_token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PereskazError::PublishFailed {
                reason: format!("user lookup returned {status}"),
            });
        }

        let user: UserResponse = response.json().await?;
        Ok(user.data.id)
    }
}

#[async_trait::async_trait]
impl crate::controller::PostPublisher for MediumClient {
    async fn publish(&self, doc: &ArticleDocument) -> Option<String> {
        MediumClient::publish(self, doc).await
    }
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    data: UserData,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PostResponse {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    url: String,
}
