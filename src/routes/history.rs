//! # 출석 이력 API 라우트 핸들러
//!
//! 커밋되어 DB에 저장된 출석 세션을 조회합니다.
//! 원장 파일로 대체 저장된 세션은 DB에 없으므로 여기에 나타나지 않습니다.
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/attendance/sessions | `list_attendance_sessions` | 내 출석 세션 목록 (최신순) |
//! | GET | /api/v1/attendance/sessions/{id} | `get_attendance_session` | 세션의 학생별 기록 |

use crate::{db, error::AppError, middleware::auth::AuthUser, routes::AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

/// `GET /attendance/sessions` → `{ "sessions": [...] }`
///
/// 각 항목에는 출석/결석 수가 함께 들어 있습니다.
pub async fn list_attendance_sessions(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let sessions = db::list_sessions_for_teacher(&state.pool, &auth_user.teacher_id).await?;
    Ok(Json(json!({ "sessions": sessions })))
}

/// `GET /attendance/sessions/{id}` → `{ "id": ..., "records": [...] }`
///
/// 다른 교사의 세션은 존재하지 않는 것과 같게 404로 응답합니다.
pub async fn get_attendance_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let records = db::get_session_records(&state.pool, &auth_user.teacher_id, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(json!({
        "id": id,
        "records": records
    })))
}
