//! End-to-end HTTP tests: the router is served on an ephemeral port and driven with reqwest.

mod common;

use common::*;
use reqwest::{Client, StatusCode};
use rollcall::{build_router, db, routes::AppState, services::Workspace};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;

struct TestServer {
    base: String,
    client: Client,
    pool: SqlitePool,
    _ledger: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let pool = test_pool().await;
        seed_students(&pool).await;
        let ledger = TempDir::new().unwrap();

        let state = AppState {
            pool: pool.clone(),
            jwt_secret: "test-secret".to_string(),
            ledger_path: ledger.path().to_str().unwrap().to_string(),
            remember_days: 7,
            settings: settings(),
            workspace: Workspace::new(),
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });

        Self {
            base: format!("http://{addr}/api/v1"),
            client: Client::new(),
            pool,
            _ledger: ledger,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Registers a teacher and returns the access token.
    async fn register(&self, email: &str) -> String {
        let res = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({ "email": email, "name": "Meena", "password": "correct-horse" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert!(body.get("refresh_token").is_none());
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn post(&self, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn put(&self, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn get(&self, token: &str, path: &str) -> (StatusCode, Value) {
        let res = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }
}

#[tokio::test]
async fn full_attendance_flow_over_http() {
    let server = TestServer::start().await;
    let token = server.register("meena@school.test").await;

    let (status, classes) = server.get(&token, "/classes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(classes["classes"], json!(["IT-A", "IT-B"]));
    assert_eq!(classes["hours"], json!([1, 2, 3, 4, 5, 6]));

    let (status, view) = server
        .post(&token, "/marking", json!({ "class": "IT-A", "hour": 2 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["current_student"]["id"], "S1");
    assert_eq!(view["progress"], json!({ "marked": 0, "total": 3 }));

    // a second session cannot start while one is open
    let (status, _) = server
        .post(&token, "/marking", json!({ "class": "IT-A", "hour": 3 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    server.post(&token, "/marking/mark", json!({ "present": true })).await;
    let (_, view) = server
        .post(&token, "/marking/mark", json!({ "present": true }))
        .await;
    assert_eq!(view["current_student"]["id"], "S3");

    // S2 was meant to be absent
    let (_, view) = server.post(&token, "/marking/undo", json!({})).await;
    assert_eq!(view["current_student"]["id"], "S2");
    server.post(&token, "/marking/mark", json!({ "present": false })).await;

    // previewing before the last student is marked is refused
    let (status, body) = server.post(&token, "/marking/preview", json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "incomplete_session");

    let (_, view) = server
        .post(&token, "/marking/mark", json!({ "present": true }))
        .await;
    assert_eq!(view["complete"], true);
    assert!(view["current_student"].is_null());

    let (status, review) = server.post(&token, "/marking/preview", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(review["counts"], json!({ "present": 2, "absent": 1, "total": 3 }));

    // marking is closed once the review has started
    let (status, body) = server
        .post(&token, "/marking/mark", json!({ "present": true }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "session_complete");

    let (status, review) = server
        .post(&token, "/review/students/S3/toggle", json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(review["counts"]["absent"], 2);

    let (status, _) = server
        .post(&token, "/review/students/S9/toggle", json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let csv = server
        .client
        .get(server.url("/review/export"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(csv.status(), StatusCode::OK);
    assert!(csv.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert_eq!(
        csv.text().await.unwrap(),
        "roll_no,name,status\n1,Asha,present\n2,\"Kumar, Priya\",absent\n3,Chitra,absent\n"
    );

    let (status, committed) = server
        .post(&token, "/review/commit", json!({ "date": "2026-10-18" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(committed["receipt"]["location"]["kind"], "database");
    assert_eq!(committed["receipt"]["record_count"], 3);

    // the workspace is empty again
    let (status, _) = server.get(&token, "/review").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, history) = server.get(&token, "/attendance/sessions").await;
    let sessions = history["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["class_code"], "IT-A");
    assert_eq!(sessions[0]["present_count"], 1);
    assert_eq!(sessions[0]["absent_count"], 2);

    let id = sessions[0]["id"].as_str().unwrap();
    let (status, detail) = server
        .get(&token, &format!("/attendance/sessions/{id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["records"][1]["student_id"], "S2");
    assert_eq!(detail["records"][1]["is_present"], false);
}

#[tokio::test]
async fn workflow_requires_sign_in() {
    let server = TestServer::start().await;

    let res = server
        .client
        .post(server.url("/marking"))
        .json(&json!({ "class": "IT-A", "hour": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"]["code"], "missing_token");
}

#[tokio::test]
async fn bad_class_and_hour_are_rejected() {
    let server = TestServer::start().await;
    let token = server.register("ravi@school.test").await;

    let (status, body) = server
        .post(&token, "/marking", json!({ "class": "IT-Z", "hour": 1 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "class_not_found");

    let (status, body) = server
        .post(&token, "/marking", json!({ "class": "IT-B", "hour": 1 }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "empty_roster");

    let (status, _) = server
        .post(&token, "/marking", json!({ "class": "IT-A", "hour": 7 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // nothing was left behind by the failed starts
    let (status, _) = server.get(&token, "/marking").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn remembered_login_can_refresh_and_logout_discards_work() {
    let server = TestServer::start().await;
    server.register("asha@school.test").await;

    let res = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({ "email": "asha@school.test", "password": "correct-horse", "remember": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let login: Value = res.json().await.unwrap();
    let refresh_token = login["refresh_token"].as_str().unwrap().to_string();

    let res = server
        .client
        .post(server.url("/auth/refresh"))
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let refreshed: Value = res.json().await.unwrap();
    let token = refreshed["access_token"].as_str().unwrap().to_string();

    // the old refresh token was consumed
    let res = server
        .client
        .post(server.url("/auth/refresh"))
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = server
        .post(&token, "/marking", json!({ "class": "IT-A", "hour": 1 }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = server.post(&token, "/auth/logout", json!({})).await;
    assert_eq!(status, StatusCode::OK);

    // the signed-out token opens nothing, even before it expires
    let (status, body) = server.get(&token, "/marking").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "revoked_token");
    let (status, _) = server
        .post(&token, "/marking", json!({ "class": "IT-A", "hour": 1 }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = server.post(&token, "/review/commit", json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = server.get(&token, "/auth/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // signing in again starts a fresh session with nothing in progress
    let res = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({ "email": "asha@school.test", "password": "correct-horse" }))
        .send()
        .await
        .unwrap();
    let login: Value = res.json().await.unwrap();
    let token = login["access_token"].as_str().unwrap().to_string();
    let (status, _) = server.get(&token, "/marking").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_revokes_tokens_from_every_login() {
    let server = TestServer::start().await;
    let first = server.register("devi@school.test").await;

    let res = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({ "email": "devi@school.test", "password": "correct-horse" }))
        .send()
        .await
        .unwrap();
    let login: Value = res.json().await.unwrap();
    let second = login["access_token"].as_str().unwrap().to_string();

    let (status, _) = server.post(&second, "/auth/logout", json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = server.get(&first, "/classes").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn default_department_filters_classes() {
    let server = TestServer::start().await;
    let token = server.register("lakshmi@school.test").await;

    let (status, prefs) = server.get(&token, "/auth/me/preferences").await;
    assert_eq!(status, StatusCode::OK);
    assert!(prefs["default_department"].is_null());

    let (_, departments) = server.get(&token, "/departments").await;
    let it = departments["departments"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["code"] == "IT")
        .unwrap()
        .clone();
    assert_eq!(it["classes"], json!(["IT-A", "IT-B"]));

    // CSE teaches only IT-B here
    db::add_department_class(&server.pool, "CSE", "IT-B").await.unwrap();
    let (status, prefs) = server
        .put(&token, "/auth/me/preferences", json!({ "default_department": "CSE" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prefs["default_department"]["code"], "CSE");
    assert_eq!(prefs["default_department"]["name"], "Computer Science Engineering");

    let (_, classes) = server.get(&token, "/classes").await;
    assert_eq!(classes["department"], "CSE");
    assert_eq!(classes["classes"], json!(["IT-B"]));

    let (_, classes) = server.get(&token, "/classes?all=true").await;
    assert!(classes["department"].is_null());
    assert_eq!(classes["classes"], json!(["IT-A", "IT-B"]));

    // the preference survives a fresh read
    let (_, prefs) = server.get(&token, "/auth/me/preferences").await;
    assert_eq!(prefs["default_department"]["code"], "CSE");

    let (status, _) = server
        .put(&token, "/auth/me/preferences", json!({ "default_department": "ARTS" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, prefs) = server
        .put(&token, "/auth/me/preferences", json!({ "default_department": null }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(prefs["default_department"].is_null());
    let (_, classes) = server.get(&token, "/classes").await;
    assert_eq!(classes["classes"], json!(["IT-A", "IT-B"]));
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let server = TestServer::start().await;
    server.register("kumar@school.test").await;

    let res = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({ "email": "kumar@school.test", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
