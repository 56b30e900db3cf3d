//! Integration test helpers: full router over an in-memory database

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use pos_server::auth::JwtConfig;
use pos_server::core::build_app;
use pos_server::{Config, ServerState};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const MASTER_KEY: &str = "integration-master-key";

pub struct TestApp {
    pub router: Router,
    pub state: ServerState,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut config = Config::with_overrides(
            "sqlite::memory:",
            JwtConfig::with_secret("integration-test-secret-key-0123456789abcdef"),
        );
        config.master_password = Some(MASTER_KEY.to_string());

        let state = ServerState::initialize(&config).await.unwrap();
        let router = build_app(state.clone());
        Self { router, state }
    }

    /// Send one request, returning the status and the JSON body (Null when empty)
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Bootstrap the first admin through the special access flow and log in
    pub async fn admin_token(&self) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/users/admin-access",
                None,
                Some(json!({ "masterKey": MASTER_KEY })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let special = body["token"].as_str().unwrap().to_string();

        let (status, body) = self
            .call(
                "POST",
                "/api/users/first-admin",
                Some(&special),
                Some(json!({ "username": "admin", "password": "admin-pass", "pin": "9999" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        self.login("admin", "admin-pass").await
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/users/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }
}

pub fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().unwrap()
}
