//! HTTP-level tests for staff and driver authentication.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, driver_token, get_auth, post_json, post_json_auth, seed_driver, seed_staff,
    staff_token, STAFF_PASSWORD,
};
use fleetcheck_api::auth::password::hash_password;
use fleetcheck_db::models::driver::UpdateDriver;
use fleetcheck_db::repositories::DriverRepo;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Staff
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn staff_login_returns_tokens_and_subject(pool: PgPool) {
    let user = seed_staff(&pool, "ana", "master", "Paulínia").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "username": "ana", "password": STAFF_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["subject"]["id"], user.id);
    assert_eq!(json["subject"]["kind"], "staff");
    assert_eq!(json["subject"]["role"], "master");
    assert_eq!(json["subject"]["unit"], "Paulínia");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn staff_login_with_wrong_password_is_401(pool: PgPool) {
    seed_staff(&pool, "ana", "admin", "Matriz").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "username": "ana", "password": "errada" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn refresh_rotates_the_session(pool: PgPool) {
    seed_staff(&pool, "ana", "admin", "Matriz").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "username": "ana", "password": STAFF_PASSWORD });
    let login = body_json(post_json(app.clone(), "/api/v1/auth/login", body).await).await;
    let refresh_token = login["refresh_token"].as_str().unwrap().to_string();

    let body = serde_json::json!({ "refresh_token": refresh_token });
    let first = post_json(app.clone(), "/api/v1/auth/refresh", body.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);
    let refreshed = body_json(first).await;
    assert_ne!(refreshed["refresh_token"], login["refresh_token"]);

    // The old token was revoked by the rotation.
    let second = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_refreshes_rotate_only_once(pool: PgPool) {
    let user = seed_staff(&pool, "ana", "admin", "Matriz").await;
    let app = common::build_test_app(pool.clone());

    let body = serde_json::json!({ "username": "ana", "password": STAFF_PASSWORD });
    let login = body_json(post_json(app.clone(), "/api/v1/auth/login", body).await).await;
    let body = serde_json::json!({ "refresh_token": login["refresh_token"] });

    let (a, b) = tokio::join!(
        post_json(app.clone(), "/api/v1/auth/refresh", body.clone()),
        post_json(app, "/api/v1/auth/refresh", body),
    );
    let mut statuses = [a.status(), b.status()];
    statuses.sort_by_key(|s| s.as_u16());
    assert_eq!(statuses, [StatusCode::OK, StatusCode::UNAUTHORIZED]);

    let live: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM user_sessions WHERE user_id = $1 AND is_revoked = false",
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(live, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn logout_revokes_refresh_tokens(pool: PgPool) {
    seed_staff(&pool, "ana", "admin", "Matriz").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "username": "ana", "password": STAFF_PASSWORD });
    let login = body_json(post_json(app.clone(), "/api/v1/auth/login", body).await).await;
    let access = login["access_token"].as_str().unwrap();

    let response =
        post_json_auth(app.clone(), "/api/v1/auth/logout", access, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = serde_json::json!({ "refresh_token": login["refresh_token"] });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Drivers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn driver_logs_in_with_cpf_credential(pool: PgPool) {
    let driver = seed_driver(&pool, "12345678901", "Paulínia", None).await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "login": "123456", "password": "123456" });
    let response = post_json(app.clone(), "/api/v1/auth/driver/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["subject"]["id"], driver.id);
    assert_eq!(json["subject"]["kind"], "driver");
    assert_eq!(json["subject"]["role"], "driver");

    // The full CPF, punctuated, identifies the driver too.
    let body = serde_json::json!({ "login": "123.456.789-01", "password": "123456" });
    let response = post_json(app, "/api/v1/auth/driver/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn driver_with_password_cannot_use_credential(pool: PgPool) {
    let driver = seed_driver(&pool, "12345678901", "Paulínia", None).await;
    let hash = hash_password("estrada-segura").unwrap();
    DriverRepo::update_password(&pool, driver.id, Some(&hash)).await.unwrap();
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "login": "123456", "password": "123456" });
    let response = post_json(app.clone(), "/api/v1/auth/driver/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = driver_token(app, "123456", "estrada-segura").await;
    assert!(!token.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn deactivated_driver_is_rejected(pool: PgPool) {
    let driver = seed_driver(&pool, "12345678901", "Paulínia", None).await;
    let update = UpdateDriver {
        is_active: Some(false),
        ..Default::default()
    };
    DriverRepo::update(&pool, driver.id, &update).await.unwrap();
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "login": "12345678901", "password": "123456" });
    let response = post_json(app.clone(), "/api/v1/auth/driver/login", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // With the short credential the inactive driver is simply not a candidate.
    let body = serde_json::json!({ "login": "123456", "password": "123456" });
    let response = post_json(app, "/api/v1/auth/driver/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn tokens_are_not_interchangeable(pool: PgPool) {
    seed_staff(&pool, "ana", "admin", "Matriz").await;
    seed_driver(&pool, "12345678901", "Matriz", None).await;
    let app = common::build_test_app(pool);

    let staff = staff_token(app.clone(), "ana").await;
    let driver = driver_token(app.clone(), "123456", "123456").await;

    let response = get_auth(app.clone(), "/api/v1/driver/me", &staff).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app, "/api/v1/admin/drivers", &driver).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
