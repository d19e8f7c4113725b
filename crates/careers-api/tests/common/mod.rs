//! Shared helpers for router-level tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use careers_api::{
    create_router, ApiConfig, AppState, AuthError, CareerStore, DanglingPolicy, IdentityVerifier, MemoryStore,
    VerifiedIdentity,
};

/// Accepts a fixed set of tokens.
#[derive(Default)]
pub struct StaticVerifier {
    identities: HashMap<String, VerifiedIdentity>,
}

impl StaticVerifier {
    pub fn with(mut self, token: &str, email: Option<&str>) -> Self {
        self.identities.insert(
            token.to_string(),
            VerifiedIdentity {
                uid: format!("uid-{}", token),
                email: email.map(str::to_string),
                email_verified: true,
            },
        );
        self
    }
}

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        self.identities
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::Rejected("unknown test token".to_string()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn CareerStore>,
}

pub fn test_app(policy: DanglingPolicy) -> TestApp {
    let verifier = StaticVerifier::default()
        .with("alice-token", Some("alice@example.com"))
        .with("bob-token", Some("bob@example.com"))
        .with("phone-token", None);
    test_app_with_verifier(policy, Arc::new(verifier))
}

pub fn test_app_with_verifier(policy: DanglingPolicy, verifier: Arc<dyn IdentityVerifier>) -> TestApp {
    let config = ApiConfig {
        dangling_policy: policy,
        ..ApiConfig::default()
    };
    let store: Arc<dyn CareerStore> = Arc::new(MemoryStore::new());
    let state = AppState::with_components(config, Arc::clone(&store), verifier);
    TestApp {
        router: create_router(state, None),
        store,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    TestResponse { status, headers, body }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    send(router, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_with_token(router: &Router, uri: &str, token: &str) -> TestResponse {
    let request = Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

pub async fn send_json(router: &Router, method: Method, uri: &str, body: Value) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

/// Create a posting through the API and return its id.
pub async fn post_career(router: &Router, posting: Value) -> String {
    let response = send_json(router, Method::POST, "/careers", posting).await;
    assert_eq!(response.status, StatusCode::OK);
    response.json()["insertedId"].as_str().unwrap().to_string()
}

/// Submit an application through the API and return its id.
pub async fn post_application(router: &Router, application: Value) -> String {
    let response = send_json(router, Method::POST, "/applications", application).await;
    assert_eq!(response.status, StatusCode::OK);
    response.json()["insertedId"].as_str().unwrap().to_string()
}
