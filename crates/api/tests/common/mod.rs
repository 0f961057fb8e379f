//! Shared helpers for the HTTP integration tests.
//!
//! Every test gets a fresh database from `#[sqlx::test]` and a throwaway
//! upload directory, and drives the real router through
//! `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use fleetcheck_api::auth::jwt::JwtConfig;
use fleetcheck_api::auth::password::hash_password;
use fleetcheck_api::config::ServerConfig;
use fleetcheck_api::router::build_app_router;
use fleetcheck_api::state::AppState;
use fleetcheck_db::models::driver::{CreateDriver, Driver};
use fleetcheck_db::models::plate::CreatePlate;
use fleetcheck_db::models::user::{CreateUser, User};
use fleetcheck_db::models::vehicle::{CreateVehicle, Vehicle};
use fleetcheck_db::repositories::{DriverRepo, PlateRepo, UserRepo, VehicleRepo};

pub const STAFF_PASSWORD: &str = "senha-segura-123";
pub const MULTIPART_BOUNDARY: &str = "----fleetcheck-test-boundary";

/// Test configuration: permissive CORS origin, fresh upload directory.
pub fn test_config() -> ServerConfig {
    let upload_dir: PathBuf = tempfile::Builder::new()
        .prefix("fleetcheck-uploads")
        .tempdir()
        .expect("temp upload dir")
        .keep();

    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_dir,
        max_upload_bytes: 5 * 1024 * 1024,
        report_font_dir: PathBuf::from("assets/fonts"),
        report_font_name: "LiberationSans".to_string(),
        bootstrap_admin: None,
        jwt: JwtConfig {
            secret: "test-secret-not-for-production".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 1,
        },
    }
}

/// Build the production router over the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_uploads(pool).0
}

/// Like [`build_test_app`], also returning the upload root the app writes to.
pub fn build_test_app_with_uploads(pool: PgPool) -> (Router, PathBuf) {
    let config = test_config();
    let upload_dir = config.upload_dir.clone();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    (build_app_router(state, &config), upload_dir)
}

/// Regular files stored under `category` of an upload root.
pub fn stored_files(upload_dir: &std::path::Path, category: &str) -> usize {
    std::fs::read_dir(upload_dir.join(category))
        .map(|entries| entries.filter_map(Result::ok).filter(|e| e.path().is_file()).count())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should complete")
}

fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header("authorization", format!("Bearer {token}")),
        None => builder,
    }
}

fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    request(method, uri, token)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, None).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, Some(token)).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, json_request(Method::POST, uri, Some(token), body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, Some(token), body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::DELETE, uri, Some(token)).body(Body::empty()).unwrap()).await
}

/// POST a multipart form. `file` is `(filename, bytes)` sent as the `file` part.
pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> Response<Body> {
    send_multipart(app, Method::POST, uri, token, fields, file).await
}

/// PUT a multipart form, as [`post_multipart_auth`].
pub async fn put_multipart_auth(
    app: Router,
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> Response<Body> {
    send_multipart(app, Method::PUT, uri, token, fields, file).await
}

async fn send_multipart(
    app: Router,
    method: Method,
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> Response<Body> {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    let request = request(method, uri, Some(token))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Insert a staff user with [`STAFF_PASSWORD`].
pub async fn seed_staff(pool: &PgPool, username: &str, role: &str, unit: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            full_name: format!("{username} da Silva"),
            cpf: None,
            sector: Some("Operações".to_string()),
            unit: unit.to_string(),
            role: role.to_string(),
            password_hash: hash_password(STAFF_PASSWORD).expect("hashing should succeed"),
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Log a staff user in and return the access token.
pub async fn staff_token(app: Router, username: &str) -> String {
    let body = serde_json::json!({ "username": username, "password": STAFF_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK, "staff login failed");
    body_json(response).await["access_token"]
        .as_str()
        .expect("access_token")
        .to_string()
}

/// Insert a tractor plate, a trailer plate and a vehicle set combining them.
pub async fn seed_vehicle(
    pool: &PgPool,
    name: &str,
    tractor: &str,
    trailer: &str,
    unit: &str,
) -> Vehicle {
    let tractor = PlateRepo::create(
        pool,
        &CreatePlate {
            plate: tractor.to_string(),
            kind: "tractor".to_string(),
            unit: unit.to_string(),
        },
    )
    .await
    .expect("tractor plate");
    let trailer = PlateRepo::create(
        pool,
        &CreatePlate {
            plate: trailer.to_string(),
            kind: "trailer".to_string(),
            unit: unit.to_string(),
        },
    )
    .await
    .expect("trailer plate");

    VehicleRepo::create(
        pool,
        &CreateVehicle {
            name: name.to_string(),
            tractor_plate_id: tractor.id,
            trailer1_plate_id: Some(trailer.id),
            trailer2_plate_id: None,
            unit: unit.to_string(),
            operation: Some("Granel".to_string()),
        },
    )
    .await
    .expect("vehicle")
}

/// Insert a driver without a password (logs in with the CPF credential).
pub async fn seed_driver(pool: &PgPool, cpf: &str, unit: &str, vehicle_id: Option<i64>) -> Driver {
    DriverRepo::create(
        pool,
        &CreateDriver {
            name: format!("Motorista {cpf}"),
            cpf: cpf.to_string(),
            rg: format!("RG{cpf}"),
            cnh: format!("CNH{cpf}"),
            unit: unit.to_string(),
            operation: None,
            vehicle_id,
            password_hash: None,
        },
    )
    .await
    .expect("driver creation should succeed")
}

/// Log a driver in with `login`/`password` and return the access token.
pub async fn driver_token(app: Router, login: &str, password: &str) -> String {
    let body = serde_json::json!({ "login": login, "password": password });
    let response = post_json(app, "/api/v1/auth/driver/login", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK, "driver login failed");
    body_json(response).await["access_token"]
        .as_str()
        .expect("access_token")
        .to_string()
}
