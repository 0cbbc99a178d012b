// ABOUTME: End-to-end extraction tests: HTML fixtures served through a mock proxy into SiteMetadata.
// ABOUTME: Covers recipe JSON-LD, workout tables, site descriptors, and URL-only degradation.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use httpmock::prelude::*;
use postplanner_scout::dom::parse;
use postplanner_scout::extractors::workout::extract_workout_sections;
use postplanner_scout::{Client, ProxyFormat, ProxySpec, SiteMetadata};
use pretty_assertions::assert_eq;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/html")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {:?}: {}", path, e))
}

/// Serves `html` from a mock proxy and extracts `target` through it.
async fn extract_via_mock(html: String, target: &str) -> SiteMetadata {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/proxy").query_param("url", target);
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(html);
        })
        .await;
    let client = Client::builder()
        .proxies(vec![ProxySpec::new(
            "mock",
            format!("{}?url={{url}}", server.url("/proxy")),
            ProxyFormat::Raw,
        )])
        .build();
    client.extract_metadata(target).await
}

#[test]
fn heading_and_table_fixture_is_one_section() {
    let doc = parse(&fixture("day_table.html"));
    assert_eq!(
        extract_workout_sections(&doc),
        vec!["Day 1 - Push\n\nExercise: Bench Press | Sets: 4 | Reps: 8"]
    );
}

#[tokio::test]
async fn recipe_page_uses_json_ld_verbatim() {
    let meta = extract_via_mock(fixture("recipe_jsonld.html"), "https://cooking.example.com/pancakes").await;

    assert_eq!(meta.title, "Simple Pancakes");
    assert_eq!(
        meta.ingredients.as_deref(),
        Some("1 cup flour\n1 tbsp sugar\n1 cup milk\n1 egg")
    );
    assert_eq!(
        meta.instructions.as_deref(),
        Some("Whisk the dry ingredients.\nAdd milk and egg, then stir.\nCook on a hot griddle.")
    );
    assert_eq!(meta.duration.as_deref(), Some("PT20M"));
    assert_eq!(meta.used_proxy, "mock");
    assert_eq!(meta.domain, "cooking.example.com");
    assert!(meta.key_insights.len() <= 3);
    assert!(meta
        .key_insights
        .iter()
        .any(|s| s.starts_with("Experts recommend resting the batter")));
}

#[tokio::test]
async fn workout_program_sections_and_fields() {
    let target = "https://www.muscleandstrength.com/workouts/12-week-muscle-building-program";
    let meta = extract_via_mock(fixture("muscle_program.html"), target).await;

    assert_eq!(meta.title, "12 Week Muscle Building Program");
    assert_eq!(
        meta.description.as_deref(),
        Some("A 12 week intermediate program built around compound lifts.")
    );
    assert_eq!(meta.duration.as_deref(), Some("12 weeks"));
    assert_eq!(meta.difficulty.as_deref(), Some("Intermediate"));
    assert_eq!(meta.category.as_deref(), Some("Muscle Building"));
    assert_eq!(
        meta.exercises.as_deref(),
        Some(
            "Week 1 - Day 1 - Push\n\n\
             Exercise: Bench Press | Sets: 4 | Reps: 8\n\
             Exercise: Overhead Press | Sets: 3 | Reps: 10\
             \n\n---\n\n\
             Day 2 - Pull\n\n\
             Exercise: Barbell Row | Sets: 4 | Reps: 8\n\
             Exercise: Pull-up | Sets: 3"
        )
    );
    assert!(meta.exercise_mentions.is_empty());
}

#[tokio::test]
async fn video_page_descriptor() {
    let meta = extract_via_mock(
        fixture("youtube_watch.html"),
        "https://www.youtube.com/watch?v=abc123XYZ",
    )
    .await;
    assert_eq!(meta.title, "Full Body Mobility Routine");
    assert_eq!(meta.video_id.as_deref(), Some("abc123XYZ"));
    assert_eq!(
        meta.description.as_deref(),
        Some("A ten minute routine you can do every morning.")
    );
}

#[tokio::test]
async fn unreachable_host_still_yields_metadata() {
    let client = Client::builder()
        .timeout(Duration::from_millis(300))
        .proxies(vec![ProxySpec::new("dead", "http://127.0.0.1:9/?u={url}", ProxyFormat::Raw)])
        .build();
    let meta = client
        .extract_metadata("https://no-such-host.invalid/articles/field-notes")
        .await;
    assert_eq!(meta.title, "Field Notes");
    assert_eq!(meta.description.as_deref(), Some("Content from no-such-host.invalid"));
    assert_eq!(meta.used_proxy, "");
}

#[tokio::test]
async fn blocked_target_degrades_without_fetching() {
    let server = MockServer::start_async().await;
    let proxy = server
        .mock_async(|when, then| {
            when.method(GET).path("/proxy");
            then.status(200).body(fixture("day_table.html"));
        })
        .await;
    let client = Client::builder()
        .proxies(vec![ProxySpec::new(
            "mock",
            format!("{}?url={{url}}", server.url("/proxy")),
            ProxyFormat::Raw,
        )])
        .build();
    let meta = client.extract_metadata("http://192.168.1.10/admin").await;
    proxy.assert_calls_async(0).await;
    assert_eq!(meta.title, "Admin");
    assert_eq!(meta.used_proxy, "");
}

#[tokio::test]
async fn omitted_fields_are_absent_from_json() {
    let meta = extract_via_mock(fixture("day_table.html"), "https://example.com/push").await;
    let json = serde_json::to_value(&meta).unwrap();
    let obj = json.as_object().unwrap();
    assert_eq!(obj.get("title").and_then(|v| v.as_str()), Some("Push Day"));
    assert!(obj.contains_key("domain"));
    assert!(obj.contains_key("usedProxy"));
    assert!(!obj.contains_key("ingredients"));
    assert!(!obj.contains_key("exercises"));
    assert!(!obj.values().any(|v| v.is_null()));
}
