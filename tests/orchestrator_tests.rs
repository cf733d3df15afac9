use rizzmaster::error::RizzError;
use rizzmaster::orchestrator::{DEEP_THINKING_BUDGET, DEFAULT_FAST_MODEL, DEFAULT_PRO_MODEL};
use rizzmaster::provider::{ContentPart, GenerateResponse, GroundingMetadata};
use rizzmaster::types::{AnalysisResult, ImageData, Mode, Tone, ToneSelection};
use serde_json::json;
use strum::IntoEnumIterator;

use test_utils::{TEST_KEY, json_reply, scripted_orchestrator, status_error};

#[tokio::test]
async fn test_missing_credential_makes_no_call() {
    let (orchestrator, calls) = scripted_orchestrator(vec![Ok(json_reply("s", &["r"]))]);

    for mode in Mode::iter() {
        for key in ["", "   "] {
            let err = orchestrator
                .generate(key, "hi", None, mode, ToneSelection::Mixed, 0)
                .await
                .expect_err("blank key should be rejected");
            assert!(matches!(err, RizzError::MissingCredential), "mode {mode}");
            assert!(err.is_credential_prompt());
        }
    }

    assert!(calls.lock().is_empty());
}

#[tokio::test]
async fn test_fast_success_is_single_call() {
    let (orchestrator, calls) = scripted_orchestrator(vec![Ok(json_reply("Vibe", &["a", "b", "c"]))]);

    let result = orchestrator
        .generate(TEST_KEY, "she said hi", None, Mode::Fast, ToneSelection::Mixed, 0)
        .await
        .expect("generation should succeed");

    assert_eq!(result.summary, "Vibe");
    assert_eq!(result.suggestions.len(), 3);

    let calls = calls.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model, DEFAULT_FAST_MODEL);
    assert_eq!(calls[0].thinking_budget, None);
    assert!(!calls[0].search_tool);
    assert_eq!(
        calls[0].parts,
        vec![ContentPart::Text("User Input: she said hi.".to_string())]
    );
}

#[tokio::test]
async fn test_deep_primary_failure_falls_back_once_without_extras() {
    let (orchestrator, calls) = scripted_orchestrator(vec![
        Err(status_error(429)),
        Ok(json_reply("Recovered", &["x"])),
    ]);

    let result = orchestrator
        .generate(
            TEST_KEY,
            "help",
            None,
            Mode::Deep,
            ToneSelection::Specific(Tone::Flirty),
            0,
        )
        .await
        .expect("fallback should recover");

    assert_eq!(result.summary, "Recovered");

    let calls = calls.lock();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].model, DEFAULT_PRO_MODEL);
    assert_eq!(calls[0].thinking_budget, Some(DEEP_THINKING_BUDGET));

    assert_eq!(calls[1].model, DEFAULT_FAST_MODEL);
    assert_eq!(calls[1].thinking_budget, None);
    assert!(!calls[1].search_tool);
    assert_eq!(calls[1].parts, calls[0].parts);
    assert_eq!(calls[1].system_instruction, calls[0].system_instruction);
}

#[tokio::test]
async fn test_search_fallback_drops_search_tool() {
    let (orchestrator, calls) = scripted_orchestrator(vec![
        Err(status_error(500)),
        Ok(GenerateResponse::text("Go to the jazz bar.")),
    ]);

    let result = orchestrator
        .generate(TEST_KEY, "date ideas in Lisbon", None, Mode::Search, ToneSelection::Mixed, 0)
        .await
        .expect("fallback should recover");

    assert_eq!(result.summary, "Date Plan Results");
    assert_eq!(result.suggestions[0].reply, "Go to the jazz bar.");

    let calls = calls.lock();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].search_tool);
    assert!(!calls[1].search_tool);
}

#[tokio::test]
async fn test_fast_failure_does_not_fall_back() {
    let (orchestrator, calls) = scripted_orchestrator(vec![
        Err(status_error(500)),
        Ok(json_reply("never used", &["x"])),
    ]);

    let result = orchestrator
        .generate(TEST_KEY, "hi", None, Mode::Fast, ToneSelection::Mixed, 0)
        .await
        .expect("failures become a synthetic result");

    assert_eq!(result, AnalysisResult::system_error());
    assert_eq!(calls.lock().len(), 1);
}

#[tokio::test]
async fn test_both_tiers_failing_yields_system_error() {
    let (orchestrator, calls) =
        scripted_orchestrator(vec![Err(status_error(503)), Err(status_error(503))]);

    let result = orchestrator
        .generate(TEST_KEY, "hi", None, Mode::Deep, ToneSelection::Mixed, 0)
        .await
        .expect("failures become a synthetic result");

    assert_eq!(result.summary, "Error generating response");
    assert_eq!(result.suggestions.len(), 1);
    assert_eq!(result.suggestions[0].tone, "System Error");
    assert_eq!(calls.lock().len(), 2);
}

#[tokio::test]
async fn test_not_found_reports_primary_model() {
    let (orchestrator, _calls) =
        scripted_orchestrator(vec![Err(status_error(404)), Err(status_error(404))]);

    let err = orchestrator
        .generate(TEST_KEY, "hi", None, Mode::Deep, ToneSelection::Mixed, 0)
        .await
        .expect_err("404 should propagate");

    assert_eq!(
        err.to_string(),
        format!("Model {DEFAULT_PRO_MODEL} unavailable. Please check API key/permissions.")
    );
}

#[tokio::test]
async fn test_malformed_non_search_output_becomes_system_error() {
    let (orchestrator, _calls) =
        scripted_orchestrator(vec![Ok(GenerateResponse::text("I'd say something nice!"))]);

    let result = orchestrator
        .generate(TEST_KEY, "hi", None, Mode::Fast, ToneSelection::Mixed, 0)
        .await
        .expect("malformed output is absorbed");

    assert_eq!(result, AnalysisResult::system_error());
}

#[tokio::test]
async fn test_image_only_request_uses_placeholder_text() {
    let (orchestrator, calls) = scripted_orchestrator(vec![Ok(json_reply("s", &["r"]))]);
    let image = ImageData::png("aGVsbG8=");

    orchestrator
        .generate(TEST_KEY, "", Some(&image), Mode::Fast, ToneSelection::Mixed, 0)
        .await
        .expect("generation should succeed");

    let calls = calls.lock();
    let parts = &calls[0].parts;
    assert_eq!(parts[0], ContentPart::InlineImage(image));
    assert!(matches!(&parts[1], ContentPart::Text(t) if t.starts_with("MEDIA ANALYSIS")));
    assert_eq!(
        parts[2],
        ContentPart::Text("User Input: Analyze the image.".to_string())
    );
}

#[tokio::test]
async fn test_search_attaches_citations() {
    let response = GenerateResponse {
        text: "Plan: {\"summary\":\"Friday\",\"suggestions\":[{\"tone\":\"Chill\",\"reply\":\"Picnic\",\"explanation\":\"sunny\"}]}".to_string(),
        grounding: Some(GroundingMetadata {
            grounding_chunks: vec![
                json!({ "web": { "uri": "https://park.example", "title": "City Park" } }),
                json!({ "other": {} }),
            ],
        }),
    };
    let (orchestrator, _calls) = scripted_orchestrator(vec![Ok(response)]);

    let result = orchestrator
        .generate(TEST_KEY, "date ideas", None, Mode::Search, ToneSelection::Mixed, 0)
        .await
        .expect("search should succeed");

    assert_eq!(result.summary, "Friday");
    let links = result.grounding_links.expect("links should be attached");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].url, "https://park.example");
    assert_eq!(links[0].title, "City Park");
}

#[tokio::test]
async fn test_iteration_changes_instruction() {
    let (orchestrator, calls) = scripted_orchestrator(vec![
        Ok(json_reply("s", &["r"])),
        Ok(json_reply("s", &["r"])),
    ]);

    for iteration in [0, 1] {
        orchestrator
            .generate(TEST_KEY, "hi", None, Mode::Fast, ToneSelection::Mixed, iteration)
            .await
            .expect("generation should succeed");
    }

    let calls = calls.lock();
    assert!(calls[0].system_instruction.contains("Provide 3 initial options"));
    assert!(calls[1].system_instruction.contains("Give 3 new unique options"));
}
