//! HTTP-level integration tests for document annotations.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json};
use serde_json::json;

const BASE: &str = "/api/v1/documents/invoice-42.png/annotations";

fn body(x: f64, y: f64, w: f64, h: f64, comment: &str) -> serde_json::Value {
    json!({
        "rect": {"x": x, "y": y, "width": w, "height": h},
        "comment": comment,
        "kind": "outline",
        "image_width": 800,
        "image_height": 600
    })
}

#[tokio::test]
async fn create_then_list_in_order() {
    let app = common::build_test_app();
    let response = post_json(app.clone(), BASE, body(10.0, 10.0, 50.0, 30.0, "Total wrong")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first = body_json(response).await;
    assert_eq!(first["data"]["kind"], "outline");
    assert!(first["data"]["id"].is_string());

    post_json(app.clone(), BASE, body(100.0, 100.0, 20.0, 20.0, "Stamp missing")).await;

    let json = body_json(get(app, BASE).await).await;
    let comments: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["comment"].as_str().unwrap())
        .collect();
    assert_eq!(comments, vec!["Total wrong", "Stamp missing"]);
}

#[tokio::test]
async fn rectangle_below_threshold_is_rejected() {
    let app = common::build_test_app();
    let response = post_json(app.clone(), BASE, body(10.0, 10.0, 9.0, 30.0, "tiny")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(get(app, BASE).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn blank_comment_is_rejected() {
    let app = common::build_test_app();
    let response = post_json(app, BASE, body(10.0, 10.0, 40.0, 40.0, "   ")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn delete_returns_204_then_404() {
    let app = common::build_test_app();
    let created = body_json(post_json(app.clone(), BASE, body(0.0, 0.0, 40.0, 40.0, "x")).await).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = delete(app.clone(), &format!("{BASE}/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete(app, &format!("{BASE}/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn render_returns_full_display_list() {
    let app = common::build_test_app();
    let mut highlight = body(10.0, 10.0, 40.0, 40.0, "first");
    highlight["kind"] = json!("highlight");
    post_json(app.clone(), BASE, highlight).await;
    post_json(app.clone(), BASE, body(100.0, 10.0, 40.0, 40.0, "second")).await;

    let json = body_json(get(app, &format!("{BASE}/render")).await).await;
    let ops: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["op"].as_str().unwrap())
        .collect();
    assert_eq!(
        ops,
        vec!["clear", "fill_rect", "stroke_rect", "text", "stroke_rect", "text"]
    );
    assert_eq!(json["data"][0]["width"], 800.0);
    assert_eq!(json["data"][3]["text"], "1");
    assert_eq!(json["data"][5]["text"], "2");
}

#[tokio::test]
async fn invalid_document_key_returns_400() {
    let app = common::build_test_app();
    let response = get(app, "/api/v1/documents/bad%20key/annotations").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
