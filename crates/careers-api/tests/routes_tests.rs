//! Route-level tests for the public endpoints.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;

use careers_api::DanglingPolicy;
use common::{get, post_application, post_career, send, send_json, test_app};

#[tokio::test]
async fn test_root_banner() {
    let app = test_app(DanglingPolicy::Abort);
    let response = get(&app.router, "/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "Career Code Server Running!");
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = test_app(DanglingPolicy::Abort);

    let health = get(&app.router, "/health").await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.json()["status"], "healthy");

    let ready = get(&app.router, "/ready").await;
    assert_eq!(ready.status, StatusCode::OK);
    assert_eq!(ready.json()["store"]["backend"], "memory");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = test_app(DanglingPolicy::Abort);
    let request = Request::builder()
        .uri("/health")
        .header("X-Request-ID", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = send(&app.router, request).await;
    assert_eq!(response.headers.get("x-request-id").unwrap(), "req-123");
}

#[tokio::test]
async fn test_create_posting_then_list_by_hr_email() {
    let app = test_app(DanglingPolicy::Abort);
    post_career(&app.router, json!({"hr_email": "hr@initech.io", "company": "Initech"})).await;
    let id = post_career(
        &app.router,
        json!({"hr_email": "hr@acme.io", "company": "Acme", "title": "Engineer", "salary": {"min": 100}}),
    )
    .await;

    let response = get(&app.router, "/careers?email=hr@acme.io").await;
    assert_eq!(response.status, StatusCode::OK);
    let postings = response.json();
    let postings = postings.as_array().unwrap();
    assert_eq!(postings.len(), 1);
    assert_eq!(postings[0]["_id"], id.as_str());
    assert_eq!(postings[0]["salary"], json!({"min": 100}));
}

#[tokio::test]
async fn test_list_all_postings_in_insertion_order() {
    let app = test_app(DanglingPolicy::Abort);
    for company in ["Acme", "Initech", "Globex"] {
        post_career(&app.router, json!({"company": company})).await;
    }

    let response = get(&app.router, "/careers").await;
    let companies: Vec<_> = response
        .json()
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["company"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(companies, vec!["Acme", "Initech", "Globex"]);
}

#[tokio::test]
async fn test_get_posting_by_id_is_stable() {
    let app = test_app(DanglingPolicy::Abort);
    let id = post_career(&app.router, json!({"company": "Acme", "title": "Engineer"})).await;

    let first = get(&app.router, &format!("/careers/{}", id)).await;
    let second = get(&app.router, &format!("/careers/{}", id)).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body, second.body);
    assert_eq!(first.json()["title"], "Engineer");
}

#[tokio::test]
async fn test_get_unknown_posting_is_null() {
    let app = test_app(DanglingPolicy::Abort);
    let response = get(&app.router, "/careers/does-not-exist").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), serde_json::Value::Null);
}

#[tokio::test]
async fn test_insert_ack_shape() {
    let app = test_app(DanglingPolicy::Abort);
    let response = send_json(&app.router, Method::POST, "/careers", json!({"company": "Acme"})).await;
    let ack = response.json();
    assert_eq!(ack["acknowledged"], true);
    assert!(ack["insertedId"].is_string());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = test_app(DanglingPolicy::Abort);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/careers")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&app.router, request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["error"].is_string());
}

#[tokio::test]
async fn test_list_applications_for_job_is_public() {
    let app = test_app(DanglingPolicy::Abort);
    let job = post_career(&app.router, json!({"company": "Acme"})).await;
    post_application(&app.router, json!({"applicant": "alice@example.com", "id": job})).await;
    post_application(&app.router, json!({"applicant": "bob@example.com", "id": job})).await;
    post_application(&app.router, json!({"applicant": "bob@example.com", "id": "other-job"})).await;

    let response = get(&app.router, &format!("/applications/job/{}", job)).await;
    assert_eq!(response.status, StatusCode::OK);
    let applicants: Vec<_> = response
        .json()
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["applicant"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(applicants, vec!["alice@example.com", "bob@example.com"]);
}

#[tokio::test]
async fn test_patch_changes_only_status() {
    let app = test_app(DanglingPolicy::Abort);
    let id = post_application(
        &app.router,
        json!({"applicant": "alice@example.com", "id": "J1", "status": "pending", "resume": "cv.pdf"}),
    )
    .await;

    let response = send_json(
        &app.router,
        Method::PATCH,
        &format!("/application/{}", id),
        json!({"status": "hired", "applicant": "mallory@example.com"}),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({"acknowledged": true, "matchedCount": 1, "modifiedCount": 1, "upsertedId": null, "upsertedCount": 0})
    );

    let listed = get(&app.router, "/applications/job/J1").await.json();
    assert_eq!(
        listed[0],
        json!({"_id": id, "applicant": "alice@example.com", "id": "J1", "status": "hired", "resume": "cv.pdf"})
    );
}

#[tokio::test]
async fn test_patch_unknown_and_unchanged() {
    let app = test_app(DanglingPolicy::Abort);
    let id = post_application(&app.router, json!({"applicant": "a@x.com", "id": "J1", "status": "pending"})).await;

    let unknown = send_json(&app.router, Method::PATCH, "/application/nope", json!({"status": "hired"})).await;
    assert_eq!(unknown.json()["matchedCount"], 0);
    assert_eq!(unknown.json()["modifiedCount"], 0);

    let same = send_json(&app.router, Method::PATCH, &format!("/application/{}", id), json!({"status": "pending"})).await;
    assert_eq!(same.json()["matchedCount"], 1);
    assert_eq!(same.json()["modifiedCount"], 0);
}

#[tokio::test]
async fn test_metrics_route_absent_when_disabled() {
    let app = test_app(DanglingPolicy::Abort);
    let response = get(&app.router, "/metrics").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_posting_fields_of_any_type_are_stored_verbatim() {
    let app = test_app(DanglingPolicy::Abort);
    let posting = json!({
        "hr_email": "hr@acme.io",
        "company": null,
        "title": {"en": "Engineer", "de": "Ingenieur"},
        "company_logo": 7,
        "remote": true
    });
    let id = post_career(&app.router, posting.clone()).await;

    let mut expected = posting;
    expected["_id"] = json!(id);
    let stored = get(&app.router, &format!("/careers/{}", id)).await;
    assert_eq!(stored.json(), expected);
}

#[tokio::test]
async fn test_application_fields_of_any_type_are_stored_verbatim() {
    let app = test_app(DanglingPolicy::Abort);
    let id = post_application(
        &app.router,
        json!({"applicant": "a@x.com", "id": "J1", "status": 1, "resume": null}),
    )
    .await;

    let listed = get(&app.router, "/applications/job/J1").await.json();
    assert_eq!(
        listed,
        json!([{"_id": id, "applicant": "a@x.com", "id": "J1", "status": 1, "resume": null}])
    );
}

#[tokio::test]
async fn test_patch_accepts_structured_status() {
    let app = test_app(DanglingPolicy::Abort);
    let id = post_application(&app.router, json!({"applicant": "a@x.com", "id": "J1", "status": "pending"})).await;

    let response = send_json(
        &app.router,
        Method::PATCH,
        &format!("/application/{}", id),
        json!({"status": {"stage": 2}}),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["modifiedCount"], 1);

    let listed = get(&app.router, "/applications/job/J1").await.json();
    assert_eq!(listed[0]["status"], json!({"stage": 2}));
}

#[tokio::test]
async fn test_patch_without_status_writes_null() {
    let app = test_app(DanglingPolicy::Abort);
    let id = post_application(&app.router, json!({"applicant": "a@x.com", "id": "J1", "status": "pending"})).await;

    let response = send_json(&app.router, Method::PATCH, &format!("/application/{}", id), json!({})).await;
    assert_eq!(response.json()["modifiedCount"], 1);

    let listed = get(&app.router, "/applications/job/J1").await.json();
    assert_eq!(listed[0].get("status"), Some(&serde_json::Value::Null));

    let again = send_json(&app.router, Method::PATCH, &format!("/application/{}", id), json!({"status": null})).await;
    assert_eq!(again.json()["modifiedCount"], 0);
}

#[tokio::test]
async fn test_reserved_posting_id_is_null() {
    let app = test_app(DanglingPolicy::Abort);
    let response = get(&app.router, "/careers/__x__").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), serde_json::Value::Null);
}

#[tokio::test]
async fn test_hr_email_filter_ignores_non_string_owners() {
    let app = test_app(DanglingPolicy::Abort);
    post_career(&app.router, json!({"hr_email": {"address": "hr@acme.io"}, "company": "Shadow"})).await;
    post_career(&app.router, json!({"hr_email": "hr@acme.io", "company": "Acme"})).await;

    let listed = get(&app.router, "/careers?email=hr@acme.io").await.json();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["company"], "Acme");
}
