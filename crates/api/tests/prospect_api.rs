//! HTTP-level integration tests for managers and the prospect queue.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json};
use serde_json::json;

#[tokio::test]
async fn list_managers_and_pending_prospects() {
    let app = common::build_test_app();
    let json = body_json(get(app.clone(), "/api/v1/managers").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);

    let json = body_json(get(app, "/api/v1/prospects").await).await;
    let prospects = json["data"].as_array().unwrap();
    assert_eq!(prospects.len(), 3);
    // French urgency spellings are normalized.
    assert_eq!(prospects[0]["urgency"], "high");
}

#[tokio::test]
async fn doctor_prospect_matches_specialist_manager_first() {
    let app = common::build_test_app();
    let response = get(app, "/api/v1/prospects/1/matches").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let matches = json["data"].as_array().unwrap();
    assert_eq!(matches.len(), 3);

    // Médecin 40 + BNC 30 + capacity fit 20 + low load 10.
    assert_eq!(matches[0]["manager_name"], "Claire Martin");
    assert_eq!(matches[0]["score"], 100);
    assert_eq!(matches[0]["reasons"].as_array().unwrap().len(), 4);

    let scores: Vec<i64> = matches
        .iter()
        .map(|m| m["score"].as_i64().unwrap())
        .collect();
    assert_eq!(scores, vec![100, 30, 20]);
}

#[tokio::test]
async fn equal_scores_rank_by_remaining_capacity() {
    let app = common::build_test_app();
    let json = body_json(get(app, "/api/v1/prospects/2/matches").await).await;
    let order: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["manager_id"].as_i64().unwrap())
        .collect();
    // All three score 30; remaining weekly hours are 14, 7.7 and 3.1.
    assert_eq!(order, vec![3, 1, 2]);
}

#[tokio::test]
async fn assign_removes_prospect_and_keeps_manager_figures() {
    let app = common::build_test_app();
    let response = post_json(
        app.clone(),
        "/api/v1/prospects/1/assign",
        json!({"manager_id": 1}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["prospect"]["id"], 1);
    assert_eq!(json["data"]["compatibility"]["score"], 100);

    let json = body_json(get(app.clone(), "/api/v1/prospects").await).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 3]);

    let json = body_json(get(app.clone(), "/api/v1/managers").await).await;
    assert_eq!(json["data"][0]["current_clients"], 18);
    assert_eq!(json["data"][0]["remaining_weekly"], 7.7);

    // A second assignment of the same prospect finds nothing.
    let response = post_json(app, "/api/v1/prospects/1/assign", json!({"manager_id": 1})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn assign_to_unknown_manager_keeps_prospect_pending() {
    let app = common::build_test_app();
    let response = post_json(
        app.clone(),
        "/api/v1/prospects/2/assign",
        json!({"manager_id": 77}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(get(app, "/api/v1/prospects").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn matches_for_unknown_prospect_returns_404() {
    let app = common::build_test_app();
    let response = get(app, "/api/v1/prospects/9/matches").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
