//! # Rollcall 라이브러리 루트
//!
//! 교사용 스와이프 출석 체크 백엔드입니다.
//! 바이너리(`main.rs`)와 통합 테스트(`tests/`)가 같은 모듈을 쓰도록 라이브러리로 분리했습니다.
//!
//! 모듈 구성:
//! - `config`: 환경변수 설정
//! - `error`: 에러 타입과 HTTP 응답 변환
//! - `models`: 데이터 구조체
//! - `services`: 명단 → 마킹 → 검토 → 커밋 핵심 로직 (HTTP/DB를 모름)
//! - `db`: SQLite 쿼리와 저장소 구현체
//! - `middleware`: JWT 인증
//! - `routes`: HTTP 핸들러

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use axum::{
    routing::{get, post},
    Router,
};
use routes::*;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// 전체 API 라우터를 만듭니다. 모든 경로는 `/api/v1` 아래에 있습니다.
///
/// 경로 파라미터는 Axum 0.8 문법(`{id}`)을 씁니다.
pub fn build_router(state: AppState) -> Router {
    // 인증 관련 라우트 (회원가입, 로그인, 토큰 갱신, 로그아웃, 내 정보)
    let auth_routes = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/refresh", post(routes::auth::refresh))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/me", get(routes::auth::me))
        .route(
            "/auth/me/preferences",
            get(routes::auth::get_preferences).put(routes::auth::update_preferences),
        );

    let api_routes = Router::new()
        .merge(auth_routes)
        .route("/classes", get(list_classes))
        .route("/departments", get(list_departments))
        // 스와이프 마킹
        .route(
            "/marking",
            get(get_marking).post(start_marking).delete(abandon_marking),
        )
        .route("/marking/mark", post(mark_student))
        .route("/marking/undo", post(undo_mark))
        .route("/marking/preview", post(preview_marking))
        // 검토와 커밋
        .route("/review", get(get_review).delete(discard_review))
        .route("/review/students/{id}/toggle", post(toggle_student))
        .route("/review/export", get(export_review))
        .route("/review/commit", post(commit_review))
        // 저장된 이력
        .route("/attendance/sessions", get(list_attendance_sessions))
        .route("/attendance/sessions/{id}", get(get_attendance_session))
        .route("/health", get(health_check))
        .with_state(state);

    // 모바일 앱과 개발용 웹 클라이언트에서 호출하므로 모든 출처를 허용합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
