//! Transcript fetcher: language fallback with machine translation, and
//! absent transcripts as a normal outcome.

use httpmock::prelude::*;
use serde_json::json;

use pereskaz_core::Language;
use pereskaz_core::transcript::TranscriptClient;

#[tokio::test]
async fn preferred_language_track_wins() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/timedtext")
                .query_param("v", "v1")
                .query_param("lang", "en");
            then.status(200).json_body(json!({
                "events": [{"segs": [{"utf8": "hello"}, {"utf8": " there"}]}]
            }));
        })
        .await;

    let client = TranscriptClient::new(Language::En).with_base_url(server.base_url());
    let transcript = client.fetch("v1", Language::En).await.unwrap().unwrap();

    assert_eq!(transcript.language, Language::En);
    assert_eq!(transcript.text, "hello there");
}

#[tokio::test]
async fn falls_back_to_translated_source_track() {
    let server = MockServer::start_async().await;

    let native = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/timedtext")
                .query_param("v", "v1")
                .query_param("lang", "uk");
            then.status(404);
        })
        .await;
    let translated = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/timedtext")
                .query_param("v", "v1")
                .query_param("lang", "en")
                .query_param("tlang", "uk");
            then.status(200).json_body(json!({
                "events": [{"segs": [{"utf8": "привіт світ"}]}]
            }));
        })
        .await;

    let client = TranscriptClient::new(Language::En).with_base_url(server.base_url());
    let transcript = client.fetch("v1", Language::Uk).await.unwrap().unwrap();

    assert_eq!(native.hits_async().await, 1);
    assert_eq!(translated.hits_async().await, 1);
    // The transcript is labeled with the language it was delivered in.
    assert_eq!(transcript.language, Language::Uk);
    assert_eq!(transcript.text, "привіт світ");
}

#[tokio::test]
async fn missing_everywhere_is_none_not_an_error() {
    let server = MockServer::start_async().await;

    let any = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/timedtext");
            // The endpoint answers 200 with an empty body for missing
            // tracks.
            then.status(200);
        })
        .await;

    let client = TranscriptClient::new(Language::En).with_base_url(server.base_url());
    let result = client.fetch("v1", Language::Uk).await.unwrap();

    assert!(result.is_none());
    // Preferred language, then translated fallback.
    assert_eq!(any.hits_async().await, 2);
}
