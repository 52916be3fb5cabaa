//! Full pipeline against mock HTTP servers for all four upstream APIs:
//! one video flows from listing to a published document, and a rerun
//! touches nothing.

use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use pereskaz_core::config::ModelsConfig;
use pereskaz_core::generate::Generator;
use pereskaz_core::images::ImageClient;
use pereskaz_core::publish::MediumClient;
use pereskaz_core::transcript::TranscriptClient;
use pereskaz_core::youtube::YouTubeClient;
use pereskaz_core::{
    ArticleStore, Language, Niche, PipelineController, PublishStatus, document,
};

const ARTICLE_BODY: &str = "The opening paragraph sets the scene.\n\n\
    A second paragraph develops the argument.\n\n\
    A third paragraph adds nuance.\n\n\
    The closing paragraph lands the point.";

#[tokio::test]
async fn one_video_becomes_one_published_document_and_reruns_are_free() {
    let server = MockServer::start_async().await;
    let tmp = tempfile::tempdir().unwrap();

    // Source listing: a single page, a single public 700-second video.
    let search = server
        .mock_async(|when, then| {
            when.method(GET).path("/search").query_param("pageToken", "");
            then.status(200).json_body(json!({
                "items": [{
                    "id": {"videoId": "v1"},
                    "snippet": {
                        "title": "Test Video",
                        "description": "About testing",
                        "publishedAt": "2024-06-01T00:00:00Z"
                    }
                }]
            }));
        })
        .await;
    let details = server
        .mock_async(|when, then| {
            when.method(GET).path("/videos").query_param("id", "v1");
            then.status(200).json_body(json!({
                "items": [{
                    "id": "v1",
                    "contentDetails": {"duration": "PT11M40S"},
                    "status": {"privacyStatus": "public"}
                }]
            }));
        })
        .await;

    // A 50k-character transcript, well over the Standard tier budget.
    let long_transcript = "every word counts here ".repeat(2_200);
    assert!(long_transcript.chars().count() > 50_000);
    let timedtext = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/timedtext")
                .query_param("v", "v1")
                .query_param("lang", "en");
            then.status(200).json_body(json!({
                "events": [{"segs": [{"utf8": long_transcript}]}]
            }));
        })
        .await;

    // Three generation calls, told apart by their prompts.
    let chat_body = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("video transcription");
            then.status(200).json_body(json!({
                "choices": [{"message": {"content": ARTICLE_BODY}}]
            }));
        })
        .await;
    let chat_title = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("Suggest a headline");
            then.status(200).json_body(json!({
                "choices": [{"message": {"content": "A Story Worth Retelling"}}]
            }));
        })
        .await;
    let chat_tags = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("JSON array of strings");
            then.status(200).json_body(json!({
                "choices": [{"message": {"content": "[\"One\",\"Two\",\"Three\",\"Four\",\"Five\"]"}}]
            }));
        })
        .await;

    // Standard tier wants two illustrations; the first query already hits.
    let photos = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/search")
                .query_param("query", "One Two Three Four Five");
            then.status(200).json_body(json!({
                "photos": [
                    {"alt": "first", "photographer": "Ana", "src": {"large": "https://img/1.jpg"}},
                    {"alt": "second", "photographer": "Bo", "src": {"large": "https://img/2.jpg"}}
                ]
            }));
        })
        .await;

    // Publishing to the personal profile.
    let me = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/me");
            then.status(200).json_body(json!({"data": {"id": "u1"}}));
        })
        .await;
    let create_post = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/users/u1/posts");
            then.status(201)
                .json_body(json!({"data": {"url": "https://medium.com/p/abc"}}));
        })
        .await;

    let youtube = YouTubeClient::new("yt-key").with_base_url(server.base_url());
    let items = youtube.list_channel_videos("UC123").await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].duration_secs, 700);

    let controller = PipelineController::new(
        ArticleStore::new(tmp.path()),
        Box::new(TranscriptClient::new(Language::En).with_base_url(server.base_url())),
        Box::new(
            Generator::new("ai-key", ModelsConfig::default(), Niche::Tech)
                .with_base_url(server.base_url()),
        ),
        Box::new(ImageClient::new("px-key", None).with_base_url(server.base_url())),
        Box::new(
            MediumClient::new("md-token", PublishStatus::Draft, None)
                .with_base_url(server.base_url()),
        ),
        Duration::ZERO,
    );

    let summary = controller
        .run(&items, &[Language::En], |_, _, _| {})
        .await
        .unwrap();
    assert_eq!(summary.published, 1);
    assert_eq!(summary.total(), 1);

    // Exactly one file, at the deterministic published path.
    let path = tmp.path().join("v1_Test Video.md");
    assert!(path.exists());
    let entries: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().flatten().collect();
    assert_eq!(entries.len(), 1);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("video_id: v1"));
    assert!(text.contains("medium_url: https://medium.com/p/abc"));

    let tags_line = text
        .lines()
        .find(|line| line.starts_with("tags: "))
        .unwrap();
    assert_eq!(tags_line.trim_start_matches("tags: ").split(", ").count(), 5);

    // The body stays within the Standard tier's character budget and the
    // illustrations were interleaved.
    let doc = document::parse(&text, "test").unwrap();
    assert!(doc.body.chars().count() < 12_000);
    assert!(doc.body.contains("![first](https://img/1.jpg)"));
    assert!(doc.body.contains("*Photo by Ana on Pexels*"));

    // Each stage was called exactly once.
    for mock in [&timedtext, &chat_body, &chat_title, &chat_tags, &photos, &me, &create_post] {
        assert_eq!(mock.hits_async().await, 1);
    }

    // Rerun: the published document short-circuits everything.
    let summary = controller
        .run(&items, &[Language::En], |_, _, _| {})
        .await
        .unwrap();
    assert_eq!(summary.skipped, 1);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
    for mock in [&timedtext, &chat_body, &chat_title, &chat_tags, &photos, &me, &create_post] {
        assert_eq!(mock.hits_async().await, 1);
    }
    assert_eq!(search.hits_async().await, 1);
    assert_eq!(details.hits_async().await, 1);
}
