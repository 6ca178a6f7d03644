//! # 검토(Review) API 라우트 핸들러
//!
//! 마킹이 끝난 출석표를 확인하고, 잘못 표시한 학생을 고친 뒤 저장합니다.
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/review | `get_review` | 출석표와 집계 |
//! | POST | /api/v1/review/students/{id}/toggle | `toggle_student` | 학생 출석 여부 뒤집기 |
//! | GET | /api/v1/review/export | `export_review` | CSV 내보내기 |
//! | POST | /api/v1/review/commit | `commit_review` | 저장 (DB, 실패 시 원장 파일) |
//! | DELETE | /api/v1/review | `discard_review` | 검토 폐기 |
//!
//! 커밋이 실패하면 검토 버퍼는 그대로 남아 다시 마킹하지 않고 재시도할 수 있습니다.

use crate::{
    db::SqliteLedgerSink,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::{marking::in_progress, AppState},
    services::{file_safe_class, ReviewStage, SessionCommitter},
};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

/// 검토 화면 응답: 명단 순서의 출석표와 집계
pub(crate) fn review_view(stage: &ReviewStage) -> Value {
    json!({
        "class": stage.class_code,
        "hour": stage.hour,
        "entries": stage.buffer.entries(),
        "counts": stage.buffer.counts(),
    })
}

/// CSV 첨부 파일 이름. 헤더에 그대로 들어가므로 반 코드는 ASCII 영숫자만 남깁니다.
pub(crate) fn export_file_name(class_code: &str, hour: u8) -> String {
    format!("{}_hour{}.csv", file_safe_class(class_code), hour)
}

/// `GET /review`
pub async fn get_review(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let slot = state.workspace.slot(&auth_user.teacher_id).await;
    let mut current = slot.lock().await;
    let stage = in_progress(&mut current)?.review()?;
    Ok(Json(review_view(stage)))
}

/// `POST /review/students/{id}/toggle`: 출석 ↔ 결석
pub async fn toggle_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(student_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let slot = state.workspace.slot(&auth_user.teacher_id).await;
    let mut current = slot.lock().await;
    let stage = in_progress(&mut current)?.review_mut()?;

    let is_present = stage.buffer.toggle(&student_id)?;
    tracing::debug!(
        "Teacher {} toggled {} to {}",
        auth_user.teacher_id,
        student_id,
        if is_present { "present" } else { "absent" }
    );

    Ok(Json(review_view(stage)))
}

/// `GET /review/export`: `roll_no,name,status` CSV 첨부 파일
pub async fn export_review(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let slot = state.workspace.slot(&auth_user.teacher_id).await;
    let mut current = slot.lock().await;
    let stage = in_progress(&mut current)?.review()?;

    let body = stage
        .buffer
        .to_csv()
        .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(&stage.class_code, stage.hour)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// `POST /review/commit` + `{ "date": "2026-10-18" }` (date 생략 시 오늘, UTC)
///
/// 성공하면 작업 공간이 비워지고 영수증을 돌려줍니다.
/// 실패하면(`commit_rejected` 등) 검토 버퍼가 그대로 남습니다.
pub async fn commit_review(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CommitRequest>,
) -> Result<Json<Value>, AppError> {
    let slot = state.workspace.slot(&auth_user.teacher_id).await;
    let mut current = slot.lock().await;
    let stage = in_progress(&mut current)?.review()?;

    let metadata = CommitMetadata {
        class_code: stage.class_code.clone(),
        hour: stage.hour,
        date: req.date.unwrap_or_else(|| Utc::now().date_naive()),
        teacher_id: auth_user.teacher_id.clone(),
    };
    let counts = stage.buffer.counts();

    let committer = SessionCommitter::new(
        SqliteLedgerSink::new(state.pool.clone(), state.ledger_path.clone()),
        &state.settings,
    );
    let session = auth_user.session();
    let receipt = committer
        .commit(Some(&session), &stage.buffer, metadata)
        .await?;

    current.take();
    drop(current);
    drop(slot);
    state.workspace.release(&auth_user.teacher_id).await;
    tracing::info!(
        "Teacher {} committed attendance ({} present, {} absent)",
        auth_user.teacher_id,
        counts.present,
        counts.absent
    );

    Ok(Json(json!({
        "receipt": receipt,
        "counts": counts
    })))
}

/// `DELETE /review`: 검토 중인 출석표를 버립니다.
pub async fn discard_review(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<StatusCode, AppError> {
    let slot = state.workspace.slot(&auth_user.teacher_id).await;
    let mut current = slot.lock().await;
    in_progress(&mut current)?.review()?;

    current.take();
    drop(current);
    drop(slot);
    state.workspace.release(&auth_user.teacher_id).await;
    Ok(StatusCode::NO_CONTENT)
}
