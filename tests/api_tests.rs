//! End-to-end API tests
//!
//! Drives the full router (layers included) against the in-memory store.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;

use sipamit::{
    auth::{CredentialVerifier, WorkFactor},
    build_app,
    db::MemoryStore,
    seed,
    utils::config::Config,
    AppState,
};

const SUPERADMIN_PASSWORD: &str = "rahasia-super";

fn test_config(debug: bool) -> Config {
    Config::from_lookup(|name| match name {
        "AUTH_JWT_KEY" => Some("api-test-signing-key".to_string()),
        "SEED_SUPERADMIN_PASSWORD" => Some(SUPERADMIN_PASSWORD.to_string()),
        "APP_DEBUG" => Some(debug.to_string()),
        _ => None,
    })
    .expect("test config")
}

async fn create_test_server_with(debug: bool) -> (TestServer, AppState) {
    let state = AppState::new(test_config(debug), Arc::new(MemoryStore::new()))
        .with_credential_verifier(CredentialVerifier::with_work_factor(WorkFactor::MINIMAL));
    seed::run(&state).await.expect("seed");

    let server = TestServer::new(build_app(state.clone())).expect("Failed to create test server");
    (server, state)
}

async fn create_test_server() -> TestServer {
    create_test_server_with(false).await.0
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

async fn login(server: &TestServer, username: &str, password: &str) -> String {
    let response = server
        .post("/api/login")
        .json(&json!({ "username": username, "password": password }))
        .await;
    response.assert_status_ok();

    response.json::<Value>()["token"]
        .as_str()
        .expect("token in login response")
        .to_string()
}

async fn superadmin_token(server: &TestServer) -> String {
    login(server, "superadmin", SUPERADMIN_PASSWORD).await
}

/// Creates an admin account and returns its token.
async fn admin_token(server: &TestServer, root: &str, username: &str) -> String {
    server
        .post("/api/user")
        .add_header("Authorization", bearer(root))
        .json(&json!({
            "full_name": "Admin Gudang",
            "username": username,
            "password": "admin-pass"
        }))
        .await
        .assert_status_ok();

    login(server, username, "admin-pass").await
}

async fn create_cctv(server: &TestServer, token: &str, nama: &str) -> Value {
    let response = server
        .post("/api/cctv")
        .add_header("Authorization", bearer(token))
        .json(&json!({ "nama": nama, "lokasi": "PH1", "kode": format!("PH1-{}", nama) }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()
}

// ============= System =============

#[tokio::test]
async fn test_health_is_public_and_carries_security_headers() {
    let server = create_test_server().await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
    assert_eq!(response.header("x-frame-options"), "SAMEORIGIN");
    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert_eq!(response.header("x-xss-protection"), "1; mode=block");
}

#[tokio::test]
async fn test_version_only_in_debug() {
    let server = create_test_server().await;
    server
        .get("/api/version")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let (server, _) = create_test_server_with(true).await;
    let response = server.get("/api/version").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["token_ttl_days"], 1);
}

// ============= Authentication =============

#[tokio::test]
async fn test_login_and_me() {
    let server = create_test_server().await;
    let token = superadmin_token(&server).await;

    let response = server
        .get("/api/me")
        .add_header("Authorization", bearer(&token))
        .await;
    response.assert_status_ok();

    let me = response.json::<Value>();
    assert_eq!(me["username"], "superadmin");
    assert_eq!(me["role"], "superadmin");
    assert!(me.get("password").is_none());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let server = create_test_server().await;

    let wrong_password = server
        .post("/api/login")
        .json(&json!({ "username": "superadmin", "password": "nope" }))
        .await;
    let unknown_user = server
        .post("/api/login")
        .json(&json!({ "username": "ghost", "password": "nope" }))
        .await;

    wrong_password.assert_status_unauthorized();
    unknown_user.assert_status_unauthorized();
    assert_eq!(wrong_password.json::<Value>(), unknown_user.json::<Value>());
    assert_eq!(unknown_user.json::<Value>(), json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn test_unknown_user_login_pays_for_a_verification() {
    let (server, state) = create_test_server_with(false).await;
    let before = state.credentials.verifications();

    server
        .post("/api/login")
        .json(&json!({ "username": "ghost", "password": "nope" }))
        .await
        .assert_status_unauthorized();
    assert_eq!(state.credentials.verifications(), before + 1);

    server
        .post("/api/login")
        .json(&json!({ "username": "superadmin", "password": "nope" }))
        .await
        .assert_status_unauthorized();
    assert_eq!(state.credentials.verifications(), before + 2);
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let server = create_test_server().await;

    let response = server
        .post("/api/login")
        .text("{\"username\": ")
        .content_type("application/json")
        .await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>(), json!({ "error": "Invalid request" }));

    let root = superadmin_token(&server).await;
    let response = server
        .post("/api/cctv")
        .add_header("Authorization", bearer(&root))
        .json(&json!(["not", "a", "form"]))
        .await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>(), json!({ "error": "Invalid request" }));
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let server = create_test_server().await;

    let response = server
        .post("/api/login")
        .json(&json!({ "username": "superadmin" }))
        .await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"], "Password is required");
}

#[tokio::test]
async fn test_protected_routes_reject_missing_or_bad_tokens() {
    let server = create_test_server().await;

    server.get("/api/cctvs").await.assert_status_unauthorized();
    server
        .get("/api/cctvs")
        .add_header("Authorization", "Token abc")
        .await
        .assert_status_unauthorized();
    server
        .get("/api/cctvs")
        .add_header("Authorization", "Bearer not.a.jwt")
        .await
        .assert_status_unauthorized();
}

// ============= Users =============

#[tokio::test]
async fn test_admin_cannot_manage_accounts() {
    let server = create_test_server().await;
    let root = superadmin_token(&server).await;
    let admin = admin_token(&server, &root, "gudang").await;

    server
        .get("/api/users")
        .add_header("Authorization", bearer(&admin))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    server
        .post("/api/user")
        .add_header("Authorization", bearer(&admin))
        .json(&json!({ "full_name": "X", "username": "x", "password": "x" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    server
        .put("/api/user/superadmin")
        .add_header("Authorization", bearer(&admin))
        .json(&json!({ "full_name": "Hijacked" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_can_edit_self() {
    let server = create_test_server().await;
    let root = superadmin_token(&server).await;
    let admin = admin_token(&server, &root, "gudang").await;

    let response = server
        .put("/api/user/gudang")
        .add_header("Authorization", bearer(&admin))
        .json(&json!({ "full_name": "Admin Gudang Baru", "password": "new-pass" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["full_name"], "Admin Gudang Baru");

    login(&server, "gudang", "new-pass").await;
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let server = create_test_server().await;
    let root = superadmin_token(&server).await;
    admin_token(&server, &root, "gudang").await;

    let response = server
        .post("/api/user")
        .add_header("Authorization", bearer(&root))
        .json(&json!({ "full_name": "Lain", "username": "gudang", "password": "p" }))
        .await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"], "Username already exists");
}

#[tokio::test]
async fn test_user_list_is_paginated_and_searchable() {
    let server = create_test_server().await;
    let root = superadmin_token(&server).await;
    admin_token(&server, &root, "gudang").await;

    let response = server
        .get("/api/users")
        .add_query_param("q", "gudang")
        .add_header("Authorization", bearer(&root))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["total"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 10);
    assert_eq!(body["result"][0]["username"], "gudang");
    assert!(body["result"][0].get("password").is_none());
}

#[tokio::test]
async fn test_deleting_user_revokes_their_token() {
    let server = create_test_server().await;
    let root = superadmin_token(&server).await;
    let admin = admin_token(&server, &root, "gudang").await;

    server
        .get("/api/me")
        .add_header("Authorization", bearer(&admin))
        .await
        .assert_status_ok();

    server
        .delete("/api/user/gudang")
        .add_header("Authorization", bearer(&root))
        .await
        .assert_status_ok();

    server
        .get("/api/me")
        .add_header("Authorization", bearer(&admin))
        .await
        .assert_status_unauthorized();
    server
        .get("/api/user/gudang")
        .add_header("Authorization", bearer(&root))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_superadmin_cannot_delete_self() {
    let server = create_test_server().await;
    let root = superadmin_token(&server).await;

    server
        .delete("/api/user/superadmin")
        .add_header("Authorization", bearer(&root))
        .await
        .assert_status_bad_request();
}

// ============= Devices =============

#[tokio::test]
async fn test_device_crud() {
    let server = create_test_server().await;
    let root = superadmin_token(&server).await;
    let auth = bearer(&root);

    let created = create_cctv(&server, &root, "CCTV GERBANG 1").await;
    let id = created["_id"].as_str().expect("id").to_string();
    assert_eq!(created["nama"], "CCTV GERBANG 1");
    assert!(created["inserted"]["at"].is_string());

    let fetched = server
        .get(&format!("/api/cctv/{}", id))
        .add_header("Authorization", auth.clone())
        .await;
    fetched.assert_status_ok();
    assert_eq!(fetched.json::<Value>()["kode"], "PH1-CCTV GERBANG 1");

    let updated = server
        .put(&format!("/api/cctv/{}", id))
        .add_header("Authorization", auth.clone())
        .json(&json!({ "lokasi": "PH2", "kode": "" }))
        .await;
    updated.assert_status_ok();
    let updated = updated.json::<Value>();
    assert_eq!(updated["lokasi"], "PH2");
    assert_eq!(updated["kode"], "PH1-CCTV GERBANG 1");
    assert!(updated["updated"]["_id"].is_string());

    server
        .delete(&format!("/api/cctv/{}", id))
        .add_header("Authorization", auth.clone())
        .await
        .assert_status_ok();

    let gone = server
        .get(&format!("/api/cctv/{}", id))
        .add_header("Authorization", auth)
        .await;
    gone.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(gone.json::<Value>()["error"], "CCTV not found");
}

#[tokio::test]
async fn test_device_create_validation() {
    let server = create_test_server().await;
    let root = superadmin_token(&server).await;

    let empty = server
        .post("/api/cctv")
        .add_header("Authorization", bearer(&root))
        .json(&json!({}))
        .await;
    empty.assert_status_bad_request();
    assert_eq!(empty.json::<Value>()["error"], "Please fill provided field");

    let partial = server
        .post("/api/cctv")
        .add_header("Authorization", bearer(&root))
        .json(&json!({ "nama": "CCTV", "lokasi": "PH1" }))
        .await;
    partial.assert_status_bad_request();
    assert_eq!(partial.json::<Value>()["error"], "Kode is required");
}

#[tokio::test]
async fn test_malformed_device_id_is_bad_request() {
    let server = create_test_server().await;
    let root = superadmin_token(&server).await;

    let response = server
        .get("/api/cctv/not-an-id")
        .add_header("Authorization", bearer(&root))
        .await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"], "Invalid ID");
}

#[tokio::test]
async fn test_device_list_search_sort_and_pages() {
    let server = create_test_server().await;
    let root = superadmin_token(&server).await;

    for nama in ["CCTV Gerbang", "CCTV Lobby", "CCTV Parkir"] {
        create_cctv(&server, &root, nama).await;
    }

    let search = server
        .get("/api/cctvs")
        .add_query_param("q", "lobby")
        .add_header("Authorization", bearer(&root))
        .await
        .json::<Value>();
    assert_eq!(search["total"], 1);
    assert_eq!(search["result"][0]["nama"], "CCTV Lobby");

    let newest_first = server
        .get("/api/cctvs")
        .add_query_param("sort", "desc")
        .add_query_param("limit", "2")
        .add_header("Authorization", bearer(&root))
        .await
        .json::<Value>();
    assert_eq!(newest_first["total"], 3);
    assert_eq!(newest_first["pages"], 2);
    assert_eq!(newest_first["result"].as_array().map(Vec::len), Some(2));
    assert_eq!(newest_first["result"][0]["nama"], "CCTV Parkir");

    let past_end = server
        .get("/api/cctvs")
        .add_query_param("page", "5")
        .add_header("Authorization", bearer(&root))
        .await;
    past_end.assert_status_ok();
    let past_end = past_end.json::<Value>();
    assert!(past_end["result"].is_null());
    assert_eq!(past_end["total"], 3);
    assert_eq!(past_end["page"], 5);
}

#[tokio::test]
async fn test_ups_list_and_create_share_a_path() {
    let server = create_test_server().await;
    let root = superadmin_token(&server).await;

    server
        .post("/api/ups")
        .add_header("Authorization", bearer(&root))
        .json(&json!({
            "nama": "UPS Server",
            "departemen": "IT",
            "tipe": "APC 1500",
            "no_seri": "AS1234",
            "lokasi": "Ruang Server"
        }))
        .await
        .assert_status_ok();

    let list = server
        .get("/api/ups")
        .add_header("Authorization", bearer(&root))
        .await;
    list.assert_status_ok();
    assert_eq!(list.json::<Value>()["total"], 1);
}

#[tokio::test]
async fn test_device_count() {
    let server = create_test_server().await;
    let root = superadmin_token(&server).await;

    create_cctv(&server, &root, "A").await;
    create_cctv(&server, &root, "B").await;
    server
        .post("/api/toa")
        .add_header("Authorization", bearer(&root))
        .json(&json!({ "nama": "TOA 1", "lokasi": "Aula", "kode": "T1", "posisi": "Atas" }))
        .await
        .assert_status_ok();

    let all = server
        .get("/api/device/count")
        .add_header("Authorization", bearer(&root))
        .await
        .json::<Value>();
    assert_eq!(all["total"], 3);

    let cctv = server
        .get("/api/device/count")
        .add_query_param("device", "cctv")
        .add_header("Authorization", bearer(&root))
        .await
        .json::<Value>();
    assert_eq!(cctv["total"], 2);
}

// ============= Inspection documents =============

#[tokio::test]
async fn test_inspection_doc_lifecycle() {
    let server = create_test_server().await;
    let root = superadmin_token(&server).await;
    let device = create_cctv(&server, &root, "CCTV Lobby").await;

    let created = server
        .post("/api/doc/cctv")
        .add_header("Authorization", bearer(&root))
        .json(&json!({
            "device_id": device["_id"],
            "checkpoint": [
                { "name": "Kabel", "ok": true },
                { "name": "Lensa", "ok": false, "keterangan": "Buram" }
            ]
        }))
        .await;
    created.assert_status_ok();
    let doc = created.json::<Value>();
    assert_eq!(doc["device"], "cctv");
    assert_eq!(doc["device_id"], device["_id"]);
    assert_eq!(doc["nama"], "CCTV Lobby");
    let doc_id = doc["_id"].as_str().expect("doc id").to_string();

    let listed = server
        .get("/api/doc/cctvs")
        .add_header("Authorization", bearer(&root))
        .await
        .json::<Value>();
    assert_eq!(listed["total"], 1);

    let across_kinds = server
        .get("/api/docs")
        .add_query_param("device", "cctv")
        .add_header("Authorization", bearer(&root))
        .await
        .json::<Value>();
    assert_eq!(across_kinds["total"], 1);

    // A CCTV document is not reachable through another kind's routes.
    server
        .get(&format!("/api/doc/toa/{}", doc_id))
        .add_header("Authorization", bearer(&root))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let updated = server
        .put(&format!("/api/doc/cctv/{}", doc_id))
        .add_header("Authorization", bearer(&root))
        .json(&json!({ "checkpoint": [{ "name": "Lensa", "ok": true }] }))
        .await;
    updated.assert_status_ok();
    assert_eq!(updated.json::<Value>()["checkpoint"][0]["ok"], true);

    server
        .delete(&format!("/api/doc/cctv/{}", doc_id))
        .add_header("Authorization", bearer(&root))
        .await
        .assert_status_ok();
    server
        .get(&format!("/api/doc/cctv/{}", doc_id))
        .add_header("Authorization", bearer(&root))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_inspection_doc_requires_existing_device() {
    let server = create_test_server().await;
    let root = superadmin_token(&server).await;
    let checkpoint = json!([{ "name": "Kabel", "ok": true }]);

    let malformed = server
        .post("/api/doc/cctv")
        .add_header("Authorization", bearer(&root))
        .json(&json!({ "device_id": "xyz", "checkpoint": checkpoint }))
        .await;
    malformed.assert_status_bad_request();
    assert_eq!(malformed.json::<Value>()["error"], "Invalid device id");

    let missing = server
        .post("/api/doc/cctv")
        .add_header("Authorization", bearer(&root))
        .json(&json!({
            "device_id": "0190f5d2-7c1e-7a3b-8f00-000000000000",
            "checkpoint": checkpoint
        }))
        .await;
    missing.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(missing.json::<Value>()["error"], "CCTV not found");

    let device = create_cctv(&server, &root, "CCTV").await;
    let empty = server
        .post("/api/doc/cctv")
        .add_header("Authorization", bearer(&root))
        .json(&json!({ "device_id": device["_id"], "checkpoint": [] }))
        .await;
    empty.assert_status_bad_request();
}

// ============= Checklist templates =============

#[tokio::test]
async fn test_checklist_seeded_and_replaceable() {
    let server = create_test_server().await;
    let root = superadmin_token(&server).await;

    let seeded = server
        .get("/api/checkpoint/komputer-ph1")
        .add_header("Authorization", bearer(&root))
        .await;
    seeded.assert_status_ok();
    let seeded = seeded.json::<Value>();
    assert_eq!(seeded["device"], "komputer_ph1");
    assert!(!seeded["checkpoint"].as_array().expect("items").is_empty());

    let replaced = server
        .put("/api/checkpoint/komputer-ph1")
        .add_header("Authorization", bearer(&root))
        .json(&json!({ "checkpoint": ["  Keyboard  ", "Mouse", ""] }))
        .await;
    replaced.assert_status_ok();
    assert_eq!(replaced.json::<Value>()["checkpoint"], json!(["Keyboard", "Mouse"]));

    let empty = server
        .put("/api/checkpoint/komputer-ph1")
        .add_header("Authorization", bearer(&root))
        .json(&json!({ "checkpoint": [] }))
        .await;
    empty.assert_status_bad_request();
    assert_eq!(empty.json::<Value>()["error"], "Checkpoint is required");
}

#[tokio::test]
async fn test_checklist_unknown_kind() {
    let server = create_test_server().await;
    let root = superadmin_token(&server).await;

    server
        .get("/api/checkpoint/scanner")
        .add_header("Authorization", bearer(&root))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
