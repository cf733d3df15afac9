use mockito::Matcher;
use rizzmaster::orchestrator::{ModelCatalog, RequestOrchestrator};
use rizzmaster::provider::GeminiClient;
use rizzmaster::types::{Mode, ToneSelection};
use serde_json::json;

fn candidate_body(text: &str) -> String {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] }).to_string()
}

#[tokio::test]
async fn test_deep_mode_falls_back_over_http() {
    let mut server = mockito::Server::new_async().await;

    let primary = server
        .mock("POST", "/v1beta/models/gemini-3-pro-preview:generateContent")
        .match_header("x-goog-api-key", "live-key")
        .match_body(Matcher::PartialJson(json!({
            "generationConfig": { "thinkingConfig": { "thinkingBudget": 2048 } }
        })))
        .with_status(429)
        .with_body("quota exceeded")
        .expect(1)
        .create_async()
        .await;

    let fallback = server
        .mock("POST", "/v1beta/models/gemini-3-flash-preview:generateContent")
        .match_header("x-goog-api-key", "live-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(candidate_body(
            r#"{"summary":"Low effort opener","suggestions":[{"tone":"Casual","reply":"hey you","explanation":"mirrors her energy"}]}"#,
        ))
        .expect(1)
        .create_async()
        .await;

    let orchestrator = RequestOrchestrator::new(
        Box::new(GeminiClient::new(server.url())),
        ModelCatalog::default(),
    );
    let result = orchestrator
        .generate("live-key", "hey", None, Mode::Deep, ToneSelection::Mixed, 0)
        .await
        .expect("fallback should recover");

    assert_eq!(result.summary, "Low effort opener");
    assert_eq!(result.suggestions[0].reply, "hey you");
    primary.assert_async().await;
    fallback.assert_async().await;
}

#[tokio::test]
async fn test_search_mode_reads_grounding_over_http() {
    let mut server = mockito::Server::new_async().await;

    let body = json!({
        "candidates": [{
            "content": { "parts": [{ "text": "Try the rooftop cinema on Saturday." }] },
            "groundingMetadata": {
                "groundingChunks": [
                    { "web": { "uri": "https://cinema.example", "title": "Rooftop Cinema" } }
                ]
            }
        }]
    });

    let mock = server
        .mock("POST", "/v1beta/models/gemini-3-pro-preview:generateContent")
        .match_body(Matcher::PartialJson(json!({ "tools": [{ "googleSearch": {} }] })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let orchestrator = RequestOrchestrator::new(
        Box::new(GeminiClient::new(server.url())),
        ModelCatalog::default(),
    );
    let result = orchestrator
        .generate("live-key", "date ideas", None, Mode::Search, ToneSelection::Mixed, 0)
        .await
        .expect("search should succeed");

    assert_eq!(result.summary, "Date Plan Results");
    assert_eq!(result.suggestions[0].reply, "Try the rooftop cinema on Saturday.");
    let links = result.grounding_links.expect("links should be attached");
    assert_eq!(links[0].title, "Rooftop Cinema");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_model_not_found_over_http() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1beta/models/gemini-3-flash-preview:generateContent")
        .with_status(404)
        .with_body(r#"{"error":{"code":404,"message":"models/x is not found"}}"#)
        .create_async()
        .await;

    let orchestrator = RequestOrchestrator::new(
        Box::new(GeminiClient::new(server.url())),
        ModelCatalog::default(),
    );
    let err = orchestrator
        .generate("live-key", "hi", None, Mode::Fast, ToneSelection::Mixed, 0)
        .await
        .expect_err("404 should propagate");

    assert_eq!(
        err.to_string(),
        "Model gemini-3-flash-preview unavailable. Please check API key/permissions."
    );
}
