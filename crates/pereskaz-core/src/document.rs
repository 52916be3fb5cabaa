//! Document assembly and the on-disk front-matter format.
//!
//! A stored article is a `---`-delimited block of `key: value` lines
//! followed by the Markdown body. Rendering and parsing are inverses so a
//! draft can be read back for a later publish attempt.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{PereskazError, Result};
use crate::niche::Language;
use crate::types::{ArticleDocument, GeneratedArticle, Illustration, VideoItem};

const FRONT_MATTER_DELIMITER: &str = "---";
const NOT_PUBLISHED: &str = "not_published";

/// Merge generated text and illustrations into one document.
///
/// The first illustration becomes a header image; the remaining k are
/// inserted at the `n*i/(k+1)` paragraph marks. A link back to the source
/// video closes the body.
pub fn assemble(
    article: &GeneratedArticle,
    item: &VideoItem,
    illustrations: &[Illustration],
    generated_at: DateTime<Utc>,
) -> ArticleDocument {
    let paragraphs: Vec<&str> = article
        .body
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let mut blocks: Vec<String> = Vec::new();

    if let Some(header) = illustrations.first() {
        blocks.push(image_block(header));
    }

    let inner = &illustrations[illustrations.len().min(1)..];
    let marks: Vec<usize> = (1..=inner.len())
        .map(|i| paragraphs.len() * i / (inner.len() + 1))
        .collect();

    for (idx, paragraph) in paragraphs.iter().enumerate() {
        for (img, mark) in inner.iter().zip(&marks) {
            if *mark == idx {
                blocks.push(image_block(img));
            }
        }
        blocks.push((*paragraph).to_string());
    }

    blocks.push(format!(
        "*Watch the original video: [{}]({})*",
        item.title,
        item.watch_url()
    ));

    ArticleDocument {
        video_id: item.id.clone(),
        video_title: item.title.clone(),
        video_url: item.watch_url(),
        medium_url: None,
        generated_at,
        language: article.language,
        title: article.title.clone(),
        tags: article.tags.clone(),
        body: blocks.join("\n\n"),
    }
}

fn image_block(illustration: &Illustration) -> String {
    format!(
        "![{}]({})\n*{}*",
        illustration.alt_text, illustration.url, illustration.attribution
    )
}

/// Render a document to its stored text form.
pub fn render(doc: &ArticleDocument) -> String {
    let mut out = String::new();

    out.push_str(FRONT_MATTER_DELIMITER);
    out.push('\n');
    out.push_str(&format!("video_id: {}\n", doc.video_id));
    out.push_str(&format!("video_title: {}\n", doc.video_title));
    out.push_str(&format!("video_url: {}\n", doc.video_url));
    out.push_str(&format!(
        "medium_url: {}\n",
        doc.medium_url.as_deref().unwrap_or(NOT_PUBLISHED)
    ));
    out.push_str(&format!(
        "generated_at: {}\n",
        doc.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    out.push_str(&format!("language: {}\n", doc.language.code()));
    out.push_str(&format!("title: {}\n", doc.title));
    out.push_str(&format!("tags: {}\n", doc.tags.join(", ")));
    out.push_str(FRONT_MATTER_DELIMITER);
    out.push('\n');

    out.push('\n');
    out.push_str(&doc.body);
    out.push('\n');

    out
}

/// Parse a stored document back into its structured form.
pub fn parse(text: &str, path_hint: &str) -> Result<ArticleDocument> {
    let malformed = |reason: &str| PereskazError::StoreFailed {
        path: path_hint.into(),
        reason: reason.to_string(),
    };

    let mut lines = text.lines();
    if lines.next() != Some(FRONT_MATTER_DELIMITER) {
        return Err(malformed("missing front matter"));
    }

    let mut video_id = None;
    let mut video_title = None;
    let mut video_url = None;
    let mut medium_url = None;
    let mut generated_at = None;
    let mut language = None;
    let mut title = None;
    let mut tags = None;
    let mut consumed = 1usize;

    for line in lines.by_ref() {
        consumed += 1;
        if line == FRONT_MATTER_DELIMITER {
            break;
        }
        let Some((key, value)) = line.split_once(": ").or_else(|| line.split_once(':')) else {
            return Err(malformed("front matter line is not `key: value`"));
        };
        let value = value.trim();
        match key {
            "video_id" => video_id = Some(value.to_string()),
            "video_title" => video_title = Some(value.to_string()),
            "video_url" => video_url = Some(value.to_string()),
            "medium_url" => {
                medium_url = (value != NOT_PUBLISHED).then(|| value.to_string());
            }
            "generated_at" => {
                let parsed = DateTime::parse_from_rfc3339(value)
                    .map_err(|_| malformed("generated_at is not a timestamp"))?;
                generated_at = Some(parsed.with_timezone(&Utc));
            }
            "language" => {
                language = Some(
                    Language::from_code(value).ok_or_else(|| malformed("unknown language"))?,
                );
            }
            "title" => title = Some(value.to_string()),
            "tags" => {
                tags = Some(
                    value
                        .split(',')
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect::<Vec<_>>(),
                );
            }
            _ => {}
        }
    }

    let body = text
        .lines()
        .skip(consumed)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    Ok(ArticleDocument {
        video_id: video_id.ok_or_else(|| malformed("missing video_id"))?,
        video_title: video_title.ok_or_else(|| malformed("missing video_title"))?,
        video_url: video_url.ok_or_else(|| malformed("missing video_url"))?,
        medium_url,
        generated_at: generated_at.ok_or_else(|| malformed("missing generated_at"))?,
        language: language.ok_or_else(|| malformed("missing language"))?,
        title: title.ok_or_else(|| malformed("missing title"))?,
        tags: tags.ok_or_else(|| malformed("missing tags"))?,
        body,
    })
}
