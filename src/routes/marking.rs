//! # 스와이프 마킹 API 라우트 핸들러
//!
//! 교사가 명단을 한 명씩 넘기며 출석/결석을 표시하는 흐름입니다.
//! 상태는 교사별 `Workspace` 슬롯에 보관되고, 모든 요청은 슬롯 잠금을 잡은 채 처리됩니다.
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | POST | /api/v1/marking | `start_marking` | 반/교시 선택 후 마킹 시작 |
//! | GET | /api/v1/marking | `get_marking` | 현재 학생과 진행 상황 |
//! | POST | /api/v1/marking/mark | `mark_student` | 현재 학생 출석/결석 표시 |
//! | POST | /api/v1/marking/undo | `undo_mark` | 마지막 표시 되돌리기 |
//! | DELETE | /api/v1/marking | `abandon_marking` | 마킹 포기 (그냥 버림) |
//! | POST | /api/v1/marking/preview | `preview_marking` | 검토 단계로 인계 |
//!
//! ## 사용 흐름
//! ```text
//! 1. POST /marking { "class": "IT-A", "hour": 2 }
//! 2. POST /marking/mark { "present": true } ... (오른쪽 스와이프 = 출석, 왼쪽 = 결석)
//! 3. (실수하면) POST /marking/undo
//! 4. 전원 표시 후 POST /marking/preview → /review 단계
//! ```

use crate::{
    db::SqliteRoster,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
    services::{MarkingSession, MarkingStage, RosterLoader, Stage},
};
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

/// 슬롯에 진행 중인 단계가 없으면 404
pub(crate) fn in_progress(slot: &mut Option<Stage>) -> Result<&mut Stage, AppError> {
    slot.as_mut().ok_or(AppError::NotFound)
}

/// 마킹 화면 응답
///
/// `current_student`는 모든 학생을 표시한 뒤(`complete: true`)에는 null입니다.
fn marking_view(stage: &MarkingStage) -> Value {
    let session = &stage.session;
    json!({
        "class": stage.class_code,
        "hour": stage.hour,
        "complete": session.is_complete(),
        "progress": session.progress(),
        "current_student": session.current_student().ok(),
    })
}

/// `POST /marking`: 명단을 불러와 새 마킹 세션을 시작합니다.
///
/// 이미 진행 중인 마킹/검토가 있으면 409. 먼저 포기(DELETE)하거나 끝내야 합니다.
pub async fn start_marking(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<StartMarkingRequest>,
) -> Result<Json<Value>, AppError> {
    if !state.settings.is_valid_hour(req.hour) {
        return Err(AppError::BadRequest(format!(
            "Hour must be between 1 and {}",
            state.settings.hours_per_day
        )));
    }

    let slot = state.workspace.slot(&auth_user.teacher_id).await;
    let mut current = slot.lock().await;
    if current.is_some() {
        return Err(AppError::Conflict(
            "An attendance session is already in progress".to_string(),
        ));
    }

    let loader = RosterLoader::new(SqliteRoster::new(state.pool.clone()), &state.settings);
    let session = auth_user.session();
    let roster = loader.load(Some(&session), &req.class).await?;
    tracing::info!(
        "Teacher {} started marking {} hour {} ({} students)",
        auth_user.teacher_id,
        req.class,
        req.hour,
        roster.len()
    );

    let stage = MarkingStage {
        class_code: req.class,
        hour: req.hour,
        session: MarkingSession::new(roster),
    };
    let view = marking_view(&stage);
    *current = Some(Stage::Marking(stage));

    Ok(Json(view))
}

/// `GET /marking`: 현재 학생과 진행 상황
pub async fn get_marking(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let slot = state.workspace.slot(&auth_user.teacher_id).await;
    let mut current = slot.lock().await;
    let stage = in_progress(&mut current)?.marking()?;
    Ok(Json(marking_view(stage)))
}

/// `POST /marking/mark`: 현재 학생을 표시하고 다음 학생으로 넘어갑니다.
///
/// 모든 학생을 이미 표시했다면 409 (`no_current_student`).
pub async fn mark_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<MarkRequest>,
) -> Result<Json<Value>, AppError> {
    let slot = state.workspace.slot(&auth_user.teacher_id).await;
    let mut current = slot.lock().await;
    let stage = in_progress(&mut current)?.marking_mut()?;

    let progress = stage.session.mark(req.present)?;
    tracing::debug!(
        "Teacher {} marked {}/{} ({})",
        auth_user.teacher_id,
        progress.marked,
        progress.total,
        if req.present { "present" } else { "absent" }
    );

    Ok(Json(marking_view(stage)))
}

/// `POST /marking/undo`: 마지막 표시를 되돌립니다. 되돌린 학생이 다시 현재 학생이 됩니다.
pub async fn undo_mark(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let slot = state.workspace.slot(&auth_user.teacher_id).await;
    let mut current = slot.lock().await;
    let stage = in_progress(&mut current)?.marking_mut()?;

    let student_id = stage.session.undo()?.id.clone();
    tracing::debug!("Teacher {} undid mark for {}", auth_user.teacher_id, student_id);

    Ok(Json(marking_view(stage)))
}

/// `DELETE /marking`: 마킹을 포기합니다. DB나 원장에는 아무것도 남지 않습니다.
pub async fn abandon_marking(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<StatusCode, AppError> {
    let slot = state.workspace.slot(&auth_user.teacher_id).await;
    let mut current = slot.lock().await;
    in_progress(&mut current)?.marking()?;

    current.take();
    drop(current);
    drop(slot);
    state.workspace.release(&auth_user.teacher_id).await;
    tracing::info!("Teacher {} abandoned marking", auth_user.teacher_id);
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /marking/preview`: 완료된 마킹을 검토 단계로 넘깁니다.
///
/// 표시하지 않은 학생이 있으면 409 (`incomplete_session`)이고 마킹 세션은 그대로 남습니다.
pub async fn preview_marking(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let slot = state.workspace.slot(&auth_user.teacher_id).await;
    let mut current = slot.lock().await;
    let review = in_progress(&mut current)?.hand_off()?;

    Ok(Json(crate::routes::review::review_view(review)))
}
