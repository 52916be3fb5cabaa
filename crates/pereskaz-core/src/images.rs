//! Illustration search.
//!
//! Queries a stock-photo API with the article's tags, relaxing the query
//! one tag at a time when a search comes back empty. The ladder is bounded
//! by the tag count. An optional curated collection is tried first; general
//! search fills the remaining slots. Finding nothing at all is not an
//! error.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{PereskazError, Result};
use crate::types::Illustration;

const DEFAULT_BASE_URL: &str = "https://api.pexels.com";

pub struct ImageClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    collection: Option<String>,
}

impl ImageClient {
    pub fn new(api_key: impl Into<String>, collection: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            collection,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Fetch up to `count` illustrations for the given tags.
    pub async fn fetch(&self, tags: &[String], count: usize) -> Result<Vec<Illustration>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut illustrations = Vec::new();

        if let Some(collection) = &self.collection {
            match self.fetch_collection(collection, count).await {
                Ok(curated) => illustrations.extend(curated),
                // Curated source is a bias, not a requirement.
                Err(e) => warn!(collection = %collection, error = %e, "curated collection unavailable"),
            }
        }

        let remaining = count.saturating_sub(illustrations.len());
        if remaining > 0 && !tags.is_empty() {
            // Query relaxation ladder: drop the last tag each attempt.
            for width in (1..=tags.len()).rev() {
                let query = tags[..width].join(" ");
                let found = self.search(&query, remaining).await?;
                if !found.is_empty() {
                    illustrations.extend(found);
                    break;
                }
                debug!(query = %query, "no results, relaxing query");
            }
        }

        illustrations.truncate(count);
        Ok(illustrations)
    }

    async fn search(&self, query: &str, per_page: usize) -> Result<Vec<Illustration>> {
        let per_page = per_page.to_string();
        let response = self
            .http
            .get(format!("{}/v1/search", self.base_url))
            .header("Authorization", &self.api_key)
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("orientation", "landscape"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PereskazError::IllustrationFailed {
                query: query.to_string(),
                reason: format!("search returned {status}"),
            });
        }

        let parsed: SearchResponse = response.json().await?;
        Ok(parsed.photos.iter().map(to_illustration).collect())
    }

    async fn fetch_collection(&self, collection: &str, per_page: usize) -> Result<Vec<Illustration>> {
        let response = self
            .http
            .get(format!("{}/v1/collections/{}/media", self.base_url, collection))
            .header("Authorization", &self.api_key)
            .query(&[("per_page", per_page.to_string().as_str()), ("type", "photos")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PereskazError::IllustrationFailed {
                query: format!("collection {collection}"),
                reason: format!("collection returned {status}"),
            });
        }

        let parsed: CollectionResponse = response.json().await?;
        Ok(parsed.media.iter().map(to_illustration).collect())
    }
}

#[async_trait::async_trait]
impl crate::controller::IllustrationSource for ImageClient {
    async fn fetch(&self, tags: &[String], count: usize) -> Result<Vec<Illustration>> {
        ImageClient::fetch(self, tags, count).await
    }
}

fn to_illustration(photo: &Photo) -> Illustration {
    let alt = if photo.alt.trim().is_empty() {
        "Illustration".to_string()
    } else {
        photo.alt.clone()
    };
    Illustration {
        url: photo.src.large.clone(),
        alt_text: alt,
        attribution: format!("Photo by {} on Pexels", photo.photographer),
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    #[serde(default)]
    media: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    #[serde(default)]
    alt: String,
    photographer: String,
    src: PhotoSrc,
}

#[derive(Debug, Deserialize)]
struct PhotoSrc {
    large: String,
}
