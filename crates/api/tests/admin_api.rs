//! HTTP-level tests for the staff back office: fleet CRUD, unit scoping,
//! role capabilities, imports, documents, and the dashboard.

mod common;

use axum::http::StatusCode;
use chrono::NaiveDate;
use common::{
    body_json, delete_auth, driver_token, get, get_auth, post_json_auth, post_multipart_auth,
    put_json_auth, put_multipart_auth, seed_driver, seed_staff, seed_vehicle, staff_token,
    stored_files,
};
use fleetcheck_db::models::content::CreateContent;
use fleetcheck_db::repositories::ContentRepo;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Drivers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn master_creates_driver_in_own_unit(pool: PgPool) {
    seed_staff(&pool, "mario", "master", "Paulínia").await;
    let app = common::build_test_app(pool);
    let token = staff_token(app.clone(), "mario").await;

    let body = serde_json::json!({
        "name": "Ana Lima",
        "cpf": "987.654.321-00",
        "rg": "MG123",
        "cnh": "0099887766"
    });
    let response = post_json_auth(app.clone(), "/api/v1/admin/drivers", &token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let driver = body_json(response).await;
    assert_eq!(driver["cpf"], "98765432100");
    assert_eq!(driver["unit"], "Paulínia");
    assert!(driver.get("password_hash").is_none());

    // The new driver logs in with the CPF credential.
    driver_token(app.clone(), "987654", "987654").await;

    let dup = serde_json::json!({
        "name": "Outra", "cpf": "98765432100", "rg": "x", "cnh": "y"
    });
    let response = post_json_auth(app, "/api/v1/admin/drivers", &token, dup).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn master_cannot_touch_other_units(pool: PgPool) {
    seed_staff(&pool, "mario", "master", "Paulínia").await;
    let foreign = seed_driver(&pool, "11122233344", "Betim", None).await;
    let app = common::build_test_app(pool);
    let token = staff_token(app.clone(), "mario").await;

    let uri = format!("/api/v1/admin/drivers/{}", foreign.id);
    let response = get_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = serde_json::json!({
        "name": "Ana", "cpf": "98765432100", "rg": "x", "cnh": "y", "unit": "Betim"
    });
    let response = post_json_auth(app.clone(), "/api/v1/admin/drivers", &token, body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let list = body_json(get_auth(app, "/api/v1/admin/drivers", &token).await).await;
    assert!(list["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn comum_reads_but_cannot_write(pool: PgPool) {
    seed_staff(&pool, "carla", "comum", "Paulínia").await;
    seed_driver(&pool, "11122233344", "Paulínia", None).await;
    let app = common::build_test_app(pool);
    let token = staff_token(app.clone(), "carla").await;

    let list = body_json(get_auth(app.clone(), "/api/v1/admin/drivers", &token).await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    let body = serde_json::json!({ "plate": "ABC1D23", "kind": "tractor" });
    let response = post_json_auth(app.clone(), "/api/v1/admin/plates", &token, body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app, "/api/v1/admin/users", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn deactivating_driver_blocks_login(pool: PgPool) {
    seed_staff(&pool, "mario", "master", "Paulínia").await;
    let driver = seed_driver(&pool, "11122233344", "Paulínia", None).await;
    let app = common::build_test_app(pool);
    let token = staff_token(app.clone(), "mario").await;

    let uri = format!("/api/v1/admin/drivers/{}", driver.id);
    let body = serde_json::json!({ "is_active": false });
    let response = put_json_auth(app.clone(), &uri, &token, body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = serde_json::json!({ "login": "11122233344", "password": "111222" });
    let response = common::post_json(app, "/api/v1/auth/driver/login", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Plates and vehicles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn vehicle_composition_rules(pool: PgPool) {
    seed_staff(&pool, "mario", "master", "Paulínia").await;
    let existing = seed_vehicle(&pool, "CJ-01", "AAA1A11", "BBB2B22", "Paulínia").await;
    let app = common::build_test_app(pool);
    let token = staff_token(app.clone(), "mario").await;

    let mut ids = Vec::new();
    for (plate, kind) in [("CCC3C33", "tractor"), ("DDD4D44", "trailer"), ("EEE5E55", "trailer")] {
        let body = serde_json::json!({ "plate": plate, "kind": kind });
        let response = post_json_auth(app.clone(), "/api/v1/admin/plates", &token, body).await;
        let created = body_json(response).await;
        ids.push(created["id"].as_i64().unwrap());
    }

    // Trailer in the tractor slot.
    let body = serde_json::json!({ "name": "CJ-02", "tractor_plate_id": ids[1] });
    let response = post_json_auth(app.clone(), "/api/v1/admin/vehicles", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Tractor already mounted on CJ-01.
    let body = serde_json::json!({
        "name": "CJ-02",
        "tractor_plate_id": existing.tractor_plate_id,
        "trailer_plate_ids": [ids[1]]
    });
    let response = post_json_auth(app.clone(), "/api/v1/admin/vehicles", &token, body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = serde_json::json!({
        "name": "CJ-02",
        "tractor_plate_id": ids[0],
        "trailer_plate_ids": [ids[1], ids[2]]
    });
    let response = post_json_auth(app.clone(), "/api/v1/admin/vehicles", &token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let vehicle = body_json(response).await;
    assert_eq!(vehicle["tractor_plate"], "CCC3C33");

    // A mounted plate cannot be deleted.
    let plate_uri = format!("/api/v1/admin/plates/{}", ids[1]);
    let response = delete_auth(app.clone(), &plate_uri, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let vehicle_uri = format!("/api/v1/admin/vehicles/{}", vehicle["id"]);
    let response = delete_auth(app.clone(), &vehicle_uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = delete_auth(app, &plate_uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn mounted_plate_cannot_move_to_another_unit(pool: PgPool) {
    seed_staff(&pool, "root", "admin", "Matriz").await;
    let vehicle = seed_vehicle(&pool, "CJ-01", "ABC1D23", "XYZ9K88", "Paulínia").await;
    let app = common::build_test_app(pool);
    let token = staff_token(app.clone(), "root").await;

    let uri = format!("/api/v1/admin/plates/{}", vehicle.tractor_plate_id);
    let body = serde_json::json!({ "unit": "Betim" });
    let response = put_json_auth(app.clone(), &uri, &token, body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Same unit is not a move.
    let body = serde_json::json!({ "unit": "Paulínia" });
    let response = put_json_auth(app.clone(), &uri, &token, body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let plate = body_json(get_auth(app, &uri, &token).await).await;
    assert_eq!(plate["unit"], "Paulínia");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn vehicle_with_assigned_drivers_cannot_move_to_another_unit(pool: PgPool) {
    seed_staff(&pool, "root", "admin", "Matriz").await;
    let vehicle = seed_vehicle(&pool, "CJ-01", "ABC1D23", "XYZ9K88", "Paulínia").await;
    seed_driver(&pool, "12345678901", "Paulínia", Some(vehicle.id)).await;
    let app = common::build_test_app(pool);
    let token = staff_token(app.clone(), "root").await;

    let uri = format!("/api/v1/admin/vehicles/{}", vehicle.id);
    let body = serde_json::json!({ "unit": "Betim" });
    let response = put_json_auth(app.clone(), &uri, &token, body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let stored = body_json(get_auth(app, &uri, &token).await).await;
    assert_eq!(stored["unit"], "Paulínia");
}

// ---------------------------------------------------------------------------
// Imports
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn plate_import_reports_skipped_rows(pool: PgPool) {
    seed_staff(&pool, "mario", "master", "Paulínia").await;
    seed_vehicle(&pool, "CJ-01", "AAA1A11", "BBB2B22", "Paulínia").await;
    let app = common::build_test_app(pool);
    let token = staff_token(app.clone(), "mario").await;

    let csv = "Placa;Tipo;Unidade\n\
               CCC-3C33;Cavalo;Paulínia\n\
               DDD4D44;Carreta;Paulínia\n\
               AAA1A11;Cavalo;Paulínia\n\
               EEE5E55;Carreta;Betim\n\
               FFF6F66;Barco;Paulínia\n";
    let response = post_multipart_auth(
        app.clone(),
        "/api/v1/admin/imports/plates",
        &token,
        &[],
        Some(("placas.csv", csv.as_bytes())),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["created"], 2);
    let lines: Vec<i64> = report["skipped"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["line"].as_i64().unwrap())
        .collect();
    assert_eq!(lines, vec![4, 5, 6]);

    let plates = body_json(get_auth(app, "/api/v1/admin/plates?kind=trailer", &token).await).await;
    let names: Vec<&str> = plates["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["plate"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"DDD4D44"));
    assert!(!names.contains(&"CCC3C33"));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn driver_import_skips_known_cpf(pool: PgPool) {
    seed_staff(&pool, "root", "admin", "Matriz").await;
    seed_driver(&pool, "11122233344", "Paulínia", None).await;
    let app = common::build_test_app(pool);
    let token = staff_token(app.clone(), "root").await;

    let csv = "nome,cpf,rg,cnh,unidade\n\
               Ana,987.654.321-00,RG1,CNH1,Betim\n\
               Bruno,111.222.333-44,RG2,CNH2,Paulínia\n";
    let response = post_multipart_auth(
        app,
        "/api/v1/admin/imports/drivers",
        &token,
        &[],
        Some(("motoristas.csv", csv.as_bytes())),
    )
    .await;
    let report = body_json(response).await;
    assert_eq!(report["created"], 1);
    assert_eq!(report["skipped"][0]["line"], 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn driver_import_skips_repeated_rg_and_cnh(pool: PgPool) {
    seed_staff(&pool, "root", "admin", "Matriz").await;
    seed_driver(&pool, "11122233344", "Paulínia", None).await;
    let app = common::build_test_app(pool);
    let token = staff_token(app.clone(), "root").await;

    let csv = "nome,cpf,rg,cnh,unidade\n\
               Ana,987.654.321-00,MG1,C1,Betim\n\
               Bia,123.456.789-09,MG1,C2,Betim\n\
               Caio,222.333.444-55,RG11122233344,C3,Paulínia\n\
               Davi,555.666.777-88,MG4,CNH11122233344,Paulínia\n";
    let response = post_multipart_auth(
        app.clone(),
        "/api/v1/admin/imports/drivers",
        &token,
        &[],
        Some(("motoristas.csv", csv.as_bytes())),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["created"], 1);
    let lines: Vec<i64> = report["skipped"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["line"].as_i64().unwrap())
        .collect();
    assert_eq!(lines, vec![3, 4, 5]);

    let drivers = body_json(get_auth(app, "/api/v1/admin/drivers", &token).await).await;
    assert_eq!(drivers["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn import_without_file_is_bad_request(pool: PgPool) {
    seed_staff(&pool, "root", "admin", "Matriz").await;
    let app = common::build_test_app(pool);
    let token = staff_token(app.clone(), "root").await;

    let response =
        post_multipart_auth(app, "/api/v1/admin/imports/vehicles", &token, &[("x", "y")], None)
            .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Contents
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn failed_content_update_leaves_no_stored_file(pool: PgPool) {
    seed_staff(&pool, "root", "admin", "Matriz").await;
    let content = ContentRepo::create(
        &pool,
        &CreateContent {
            content_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            subject: "Direção defensiva".to_string(),
            question: "Qual a distância segura?".to_string(),
            answer_options: vec!["1 segundo".into(), "3 segundos".into()],
            correct_answer: "3 segundos".to_string(),
            resource_kind: "video".to_string(),
            resource_link: Some("https://www.youtube.com/watch?v=abc123".to_string()),
        },
    )
    .await
    .unwrap();
    sqlx::raw_sql(
        "CREATE FUNCTION reject_content_update() RETURNS trigger LANGUAGE plpgsql AS $$ \
         BEGIN RAISE EXCEPTION 'contents are read-only'; END $$; \
         CREATE TRIGGER contents_read_only BEFORE UPDATE ON contents \
         FOR EACH ROW EXECUTE FUNCTION reject_content_update();",
    )
    .execute(&pool)
    .await
    .unwrap();
    let (app, upload_dir) = common::build_test_app_with_uploads(pool);
    let token = staff_token(app.clone(), "root").await;

    let response = put_multipart_auth(
        app,
        &format!("/api/v1/admin/contents/{}", content.id),
        &token,
        &[("resource_kind", "file")],
        Some(("apostila.pdf", b"%PDF-1.4 apostila".as_slice())),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(stored_files(&upload_dir, "contents"), 0);
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn documents_are_scoped_to_unit_or_global(pool: PgPool) {
    seed_staff(&pool, "root", "admin", "Matriz").await;
    seed_staff(&pool, "mario", "master", "Paulínia").await;
    seed_driver(&pool, "11122233344", "Paulínia", None).await;
    seed_driver(&pool, "55566677788", "Betim", None).await;
    let app = common::build_test_app(pool);
    let admin = staff_token(app.clone(), "root").await;
    let master = staff_token(app.clone(), "mario").await;

    let pdf = b"%PDF-1.4\n%%EOF\n";
    let response = post_multipart_auth(
        app.clone(),
        "/api/v1/admin/documents",
        &admin,
        &[("title", "Política de segurança")],
        Some(("politica.pdf", pdf)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let global = body_json(response).await;
    assert!(global["unit"].is_null());

    let response = post_multipart_auth(
        app.clone(),
        "/api/v1/admin/documents",
        &master,
        &[("title", "Rotas locais"), ("category", "Operação")],
        Some(("rotas.pdf", pdf)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let local = body_json(response).await;
    assert_eq!(local["unit"], "Paulínia");

    // Only admins change global documents.
    let global_uri = format!("/api/v1/admin/documents/{}", global["id"]);
    let response = delete_auth(app.clone(), &global_uri, &master).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let paulinia = driver_token(app.clone(), "111222", "111222").await;
    let docs = body_json(get_auth(app.clone(), "/api/v1/driver/documents", &paulinia).await).await;
    assert_eq!(docs["data"].as_array().unwrap().len(), 2);

    let betim = driver_token(app.clone(), "555666", "555666").await;
    let docs = body_json(get_auth(app.clone(), "/api/v1/driver/documents", &betim).await).await;
    assert_eq!(docs["data"].as_array().unwrap().len(), 1);

    // Stored files are served under /uploads.
    let path = global["file_path"].as_str().unwrap();
    let response = get(app, &format!("/uploads/{path}")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn document_with_disallowed_extension_is_rejected(pool: PgPool) {
    seed_staff(&pool, "root", "admin", "Matriz").await;
    let app = common::build_test_app(pool);
    let token = staff_token(app.clone(), "root").await;

    let response = post_multipart_auth(
        app,
        "/api/v1/admin/documents",
        &token,
        &[("title", "Script")],
        Some(("run.exe", b"MZ")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn admin_manages_users_but_not_itself(pool: PgPool) {
    let admin = seed_staff(&pool, "root", "admin", "Matriz").await;
    let app = common::build_test_app(pool);
    let token = staff_token(app.clone(), "root").await;

    let body = serde_json::json!({
        "username": "joana",
        "full_name": "Joana Alves",
        "unit": "Betim",
        "role": "master",
        "password": "outra-senha-forte"
    });
    let response = post_json_auth(app.clone(), "/api/v1/admin/users", &token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let user = body_json(response).await;
    assert!(user.get("password_hash").is_none());

    let bad_role = serde_json::json!({
        "username": "x",
        "full_name": "X",
        "unit": "Betim",
        "role": "driver",
        "password": "outra-senha-forte"
    });
    let response = post_json_auth(app.clone(), "/api/v1/admin/users", &token, bad_role).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let uri = format!("/api/v1/admin/users/{}", admin.id);
    let body = serde_json::json!({ "role": "comum" });
    let response = put_json_auth(app.clone(), &uri, &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response = delete_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn dashboard_counts_follow_scope(pool: PgPool) {
    seed_staff(&pool, "root", "admin", "Matriz").await;
    seed_staff(&pool, "mario", "master", "Paulínia").await;
    let vehicle = seed_vehicle(&pool, "CJ-01", "AAA1A11", "BBB2B22", "Paulínia").await;
    seed_driver(&pool, "11122233344", "Paulínia", Some(vehicle.id)).await;
    seed_driver(&pool, "55566677788", "Betim", None).await;
    let app = common::build_test_app(pool);

    let admin = staff_token(app.clone(), "root").await;
    let counts = body_json(get_auth(app.clone(), "/api/v1/admin/dashboard", &admin).await).await;
    assert_eq!(counts["drivers"], 2);
    assert_eq!(counts["vehicles"], 1);

    let master = staff_token(app.clone(), "mario").await;
    let counts = body_json(get_auth(app, "/api/v1/admin/dashboard", &master).await).await;
    assert_eq!(counts["drivers"], 1);
    assert_eq!(counts["open_pendencies"], 0);
}
