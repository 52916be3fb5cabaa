//! Application configuration.
//!
//! Settings come from a TOML file passed in by the caller; API keys come
//! from the environment and are validated before any network work starts.
//! Components receive the values they need explicitly, nothing reads
//! ambient globals after load.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PereskazError, Result};
use crate::niche::{Language, Niche};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub channel: ChannelConfig,
    pub languages: LanguagesConfig,
    pub niche: Niche,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Optional niche -> Medium publication id mapping. Niches without an
    /// entry publish to the personal profile.
    #[serde(default)]
    pub publications: HashMap<Niche, String>,
    #[serde(default)]
    pub images: ImagesConfig,
    #[serde(default)]
    pub models: ModelsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguagesConfig {
    /// Language the channel speaks; transcript fallback source.
    pub source: Language,
    /// Languages to produce an article in, one document per entry.
    pub outputs: Vec<Language>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Seconds to wait before each pair that needs network work.
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
    #[serde(default)]
    pub publish_status: PublishStatus,
    #[serde(default = "default_articles_dir")]
    pub articles_dir: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delay_secs: default_delay_secs(),
            publish_status: PublishStatus::default(),
            articles_dir: default_articles_dir(),
        }
    }
}

fn default_delay_secs() -> u64 {
    240
}

fn default_articles_dir() -> String {
    "articles".into()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    #[default]
    Draft,
    Public,
    Unlisted,
}

impl PublishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStatus::Draft => "draft",
            PublishStatus::Public => "public",
            PublishStatus::Unlisted => "unlisted",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImagesConfig {
    /// Curated collection tried before general search.
    #[serde(default)]
    pub collection: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_body_model")]
    pub body: String,
    #[serde(default = "default_title_model")]
    pub title: String,
    #[serde(default = "default_tags_model")]
    pub tags: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            body: default_body_model(),
            title: default_title_model(),
            tags: default_tags_model(),
        }
    }
}

fn default_body_model() -> String {
    "gpt-4o-mini".into()
}

fn default_title_model() -> String {
    "gpt-4o-mini".into()
}

fn default_tags_model() -> String {
    "gpt-3.5-turbo".into()
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&raw).map_err(|e| PereskazError::InvalidConfig {
                reason: e.to_string(),
            })?;
        if config.languages.outputs.is_empty() {
            return Err(PereskazError::InvalidConfig {
                reason: "languages.outputs must name at least one language".into(),
            });
        }
        Ok(config)
    }
}

/// Default config location: `<user config dir>/pereskaz/pereskaz.toml`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pereskaz")
        .join("pereskaz.toml")
}

/// API keys, all required, all from the environment.
#[derive(Debug, Clone)]
pub struct ApiKeys {
    pub youtube: String,
    pub openai: String,
    pub pexels: String,
    pub medium: String,
}

impl ApiKeys {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            youtube: require_env("YOUTUBE_API_KEY")?,
            openai: require_env("OPENAI_API_KEY")?,
            pexels: require_env("PEXELS_API_KEY")?,
            medium: require_env("MEDIUM_ACCESS_TOKEN")?,
        })
    }
}

fn require_env(env_var: &str) -> Result<String> {
    std::env::var(env_var).map_err(|_| PereskazError::MissingApiKey {
        env_var: env_var.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        niche = "tech"

        [channel]
        id = "UC123"

        [languages]
        source = "en"
        outputs = ["en", "uk"]
    "#;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: AppConfig = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.niche, Niche::Tech);
        assert_eq!(config.languages.outputs, vec![Language::En, Language::Uk]);
        assert_eq!(config.pipeline.delay_secs, 240);
        assert_eq!(config.pipeline.publish_status, PublishStatus::Draft);
        assert_eq!(config.pipeline.articles_dir, "articles");
        assert!(config.publications.is_empty());
        assert_eq!(config.models.body, "gpt-4o-mini");
    }

    #[test]
    fn publication_mapping_is_keyed_by_niche() {
        let raw = format!("{MINIMAL}\n[publications]\ntech = \"pub-42\"\n");
        let config: AppConfig = toml::from_str(&raw).unwrap();
        assert_eq!(config.publications.get(&Niche::Tech).unwrap(), "pub-42");
        assert!(!config.publications.contains_key(&Niche::Finance));
    }

    #[test]
    fn unknown_niche_is_a_load_error() {
        let raw = MINIMAL.replace("\"tech\"", "\"gardening\"");
        assert!(toml::from_str::<AppConfig>(&raw).is_err());
    }
}
