//! Pereskaz Core Library
//!
//! Core functionality for listing channel videos, retelling their
//! transcripts as long-form articles, and publishing the results —
//! idempotently, so reruns never pay for generation twice.

pub mod config;
pub mod controller;
pub mod document;
pub mod error;
pub mod generate;
pub mod images;
pub mod niche;
pub mod publish;
pub mod store;
pub mod transcript;
pub mod types;
pub mod youtube;

// Re-export commonly used items at crate root
pub use config::{ApiKeys, AppConfig, PublishStatus};
pub use controller::{PairAction, PipelineController};
pub use error::{PereskazError, Result};
pub use niche::{Language, Niche, Tier};
pub use store::{ArticleStore, Namespace};
pub use types::{PairStatus, RunSummary, VideoItem};
