//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, get};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn health_check_returns_ok_with_json(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn responses_carry_request_id(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn unknown_route_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn protected_route_without_token_is_401(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/admin/drivers").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}
