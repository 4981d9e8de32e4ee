use std::sync::atomic::Ordering;

use crate::helpers::{spawn_app, spawn_app_with, FakeChunkStore, FakeEmbedder, FakeGenerator};

#[tokio::test]
async fn route_query_returns_the_model_decision() {
    let app = spawn_app_with(
        FakeEmbedder::default(),
        FakeGenerator::with_reply("{\"destination\":\"ANALYSTE\",\"reasoning\":\"calcul\"}"),
        FakeChunkStore::with_matches(vec![]),
    )
    .await;

    let response = app
        .post_brain(&serde_json::json!({ "query": "Calcule le métré du lot gros œuvre" }))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["destination"], "ANALYSTE");
    assert_eq!(body["reasoning"], "calcul");
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn route_query_pins_greedy_decoding_and_a_short_output_cap() {
    let app = spawn_app_with(
        FakeEmbedder::default(),
        FakeGenerator::with_reply("{\"destination\":\"BIBLIOTHECAIRE\",\"reasoning\":\"norme\"}"),
        FakeChunkStore::with_matches(vec![]),
    )
    .await;

    app.post_brain(&serde_json::json!({ "query": "Quelle norme s'applique ?" }))
        .await;

    let request = app.generator.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.temperature, 0.0);
    assert_eq!(request.max_tokens, 100);
}

#[tokio::test]
async fn an_unparseable_model_reply_degrades_to_the_fallback_decision() {
    for bad_reply in [
        "Je pense que c'est l'analyste.",
        "{\"destination\":\"ANALYSTE\"",
        "{\"reasoning\":\"pas de destination\"}",
        "",
    ] {
        let app = spawn_app_with(
            FakeEmbedder::default(),
            FakeGenerator::with_reply(bad_reply),
            FakeChunkStore::with_matches(vec![]),
        )
        .await;

        let response = app
            .post_brain(&serde_json::json!({ "query": "Quelle est la norme DTU ?" }))
            .await;

        // Never a 500 because of a parse failure alone
        assert_eq!(200, response.status().as_u16());
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["destination"], "BIBLIOTHECAIRE");
        assert_eq!(body["reasoning"], "fallback");
        assert_eq!(body["status"], "success");
    }
}

#[tokio::test]
async fn a_generation_provider_failure_surfaces_as_a_500_envelope() {
    let app = spawn_app_with(
        FakeEmbedder::default(),
        FakeGenerator::failing_with("model overloaded"),
        FakeChunkStore::with_matches(vec![]),
    )
    .await;

    let response = app
        .post_brain(&serde_json::json!({ "query": "Quelle est la norme DTU ?" }))
        .await;

    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert!(body["error"].as_str().unwrap().contains("model overloaded"));
}

#[tokio::test]
async fn an_empty_query_is_rejected_without_any_provider_call() {
    let app = spawn_app().await;

    for body in [
        serde_json::json!({ "query": "" }),
        serde_json::json!({ "query": "   " }),
        serde_json::json!({}),
    ] {
        let response = app.post_brain(&body).await;

        assert_eq!(400, response.status().as_u16());
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], "error");
    }

    assert_eq!(app.generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn non_post_methods_get_a_405() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .get(format!("{}/baikal-brain", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(405, response.status().as_u16());
    assert_eq!(app.generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn options_requests_get_a_permissive_preflight() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .request(
            reqwest::Method::OPTIONS,
            format!("{}/baikal-brain", &app.address),
        )
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
    assert!(headers["access-control-allow-headers"]
        .to_str()
        .unwrap()
        .contains("authorization"));
}
