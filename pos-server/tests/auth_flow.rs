//! Authentication and permission checks through the HTTP layer

mod common;

use common::{MASTER_KEY, TestApp};
use http::StatusCode;
use serde_json::json;
use shared::util::now_millis;

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = TestApp::new().await;

    let (status, body) = app.call("GET", "/api/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{body}");

    let (status, _) = app
        .call("GET", "/api/orders", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // 公共路由
    let (status, body) = app.call("GET", "/api/users/exists", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], false);

    let (status, body) = app.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn expired_pin_is_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            "POST",
            "/api/users/signup",
            None,
            Some(json!({
                "username": "old",
                "role": "waiter",
                "pin": "4321",
                "pinExpiration": now_millis() - 1_000
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = app
        .call("POST", "/api/users/login-pin", None, Some(json!({ "pin": "4321" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{body}");
    assert_eq!(body["code"], 1008);

    let (status, _) = app
        .call("POST", "/api/users/login-pin", None, Some(json!({ "pin": "0000" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn waiter_cannot_manage_users() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let (status, body) = app
        .call(
            "POST",
            "/api/users/signup",
            None,
            Some(json!({
                "username": "ana",
                "password": "ana-pass",
                "role": "waiter",
                "pin": "1234"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let waiter = app.login("ana", "ana-pass").await;
    let (status, _) = app.call("GET", "/api/users", Some(&waiter), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(
            "POST",
            "/api/menu/categories",
            Some(&waiter),
            Some(json!({ "name": "Bebidas", "area": "bar" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, users) = app.call("GET", "/api/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);

    // PIN 登录得到同一个用户
    let (status, body) = app
        .call("POST", "/api/users/login-pin", None, Some(json!({ "pin": "1234" })))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user"]["username"], "ana");
}

#[tokio::test]
async fn bootstrap_closes_after_first_admin() {
    let app = TestApp::new().await;

    let (status, _) = app
        .call(
            "POST",
            "/api/users/admin-access",
            None,
            Some(json!({ "masterKey": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    app.admin_token().await;

    let (status, body) = app
        .call(
            "POST",
            "/api/users/admin-access",
            None,
            Some(json!({ "masterKey": MASTER_KEY })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");

    let (_, exists) = app.call("GET", "/api/users/exists", None, None).await;
    assert_eq!(exists["exists"], true);
}
