//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//! Rust에서는 예외(exception) 대신 `Result<T, E>` 타입으로 에러를 처리합니다.
//!
//! 이 모듈의 두 계층:
//! - `AttendanceError`: 출석 코어(명단 로딩, 마킹, 검토, 저장)의 에러 분류
//! - `AppError`: HTTP 계층의 에러. `AttendanceError`를 감싸고 `IntoResponse`로 응답이 됩니다.
//!
//! ## 출석 코어 에러 분류
//! | 분류 | variant | 의미 |
//! |------|---------|------|
//! | 전제 조건 | `EmptyRoster`, `ClassNotFound`, `NoActiveSession` | 호출하면 안 되는 상황에서 호출됨 |
//! | 상태 | `NoCurrentStudent`, `NothingToUndo`, `SessionComplete` | 상태 머신 오용. 상태를 다시 확인하면 복구 가능 |
//! | 데이터 무결성 | `IncompleteSession`, `StudentNotFound`, `DuplicateStudent` | 컴포넌트 간 인계 계약 위반 |
//! | 경계 | `RosterUnavailable`, `CommitRejected` | 외부 협력자(DB, 저장소)에서 발생 |
//! | 검증 | `ValidationError` | 네트워크 호출 전에 거부된 커밋 |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 출석 코어에서 발생하는 에러
///
/// 코어는 에러를 재시도하거나 로그로 남기지 않고 호출자에게 그대로 돌려줍니다.
/// 경계 에러는 협력자가 보고한 사유 문자열을 그대로 담습니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttendanceError {
    /// 반에 학생이 한 명도 없음. 마킹 세션을 시작할 수 없습니다.
    #[error("Class has no students")]
    EmptyRoster,

    /// 반 코드가 알려진 데이터 소스에 매핑되지 않음
    #[error("Class not found: {0}")]
    ClassNotFound(String),

    /// 로그인 세션이 없거나 만료됨
    #[error("No active session")]
    NoActiveSession,

    /// 모든 학생을 마킹한 뒤(Complete)에는 현재 학생이 없습니다.
    #[error("No current student: every student has been marked")]
    NoCurrentStudent,

    /// 커서가 0일 때 되돌리기 시도
    #[error("Nothing to undo")]
    NothingToUndo,

    /// 마킹이 끝나 검토 단계로 넘어간 세션을 다시 마킹하려는 시도
    #[error("Marking session is complete and has been handed off to review")]
    SessionComplete,

    /// 아직 마킹되지 않은 학생이 남아 있는 상태에서 검토 단계로 인계 시도
    #[error("Marking is incomplete: {unmarked} student(s) not marked")]
    IncompleteSession { unmarked: usize },

    /// 명단이나 검토 버퍼에 없는 학생 ID
    #[error("Student not found: {0}")]
    StudentNotFound(String),

    /// 같은 학생 ID가 명단에 두 번 이상 등장
    #[error("Duplicate student in roster: {0}")]
    DuplicateStudent(String),

    /// 명단 데이터 소스 호출 실패
    #[error("Roster unavailable: {0}")]
    RosterUnavailable(String),

    /// 저장소가 커밋을 거부함
    #[error("Commit rejected: {0}")]
    CommitRejected(String),

    /// 커밋 요청이 유효하지 않음 (저장소 호출 전에 거부)
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl AttendanceError {
    /// 클라이언트가 분기 처리에 사용할 수 있는 기계 판독용 코드
    pub fn code(&self) -> &'static str {
        match self {
            AttendanceError::EmptyRoster => "empty_roster",
            AttendanceError::ClassNotFound(_) => "class_not_found",
            AttendanceError::NoActiveSession => "no_active_session",
            AttendanceError::NoCurrentStudent => "no_current_student",
            AttendanceError::NothingToUndo => "nothing_to_undo",
            AttendanceError::SessionComplete => "session_complete",
            AttendanceError::IncompleteSession { .. } => "incomplete_session",
            AttendanceError::StudentNotFound(_) => "student_not_found",
            AttendanceError::DuplicateStudent(_) => "duplicate_student",
            AttendanceError::RosterUnavailable(_) => "roster_unavailable",
            AttendanceError::CommitRejected(_) => "commit_rejected",
            AttendanceError::ValidationError(_) => "validation_error",
        }
    }

    /// 에러 분류에 대응하는 HTTP 상태 코드
    pub fn status(&self) -> StatusCode {
        match self {
            AttendanceError::NoActiveSession => StatusCode::UNAUTHORIZED,
            AttendanceError::ClassNotFound(_) | AttendanceError::StudentNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AttendanceError::EmptyRoster | AttendanceError::DuplicateStudent(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AttendanceError::NoCurrentStudent
            | AttendanceError::NothingToUndo
            | AttendanceError::SessionComplete
            | AttendanceError::IncompleteSession { .. } => StatusCode::CONFLICT,
            AttendanceError::RosterUnavailable(_) | AttendanceError::CommitRejected(_) => {
                StatusCode::BAD_GATEWAY
            }
            AttendanceError::ValidationError(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 각 에러 variant는 적절한 HTTP 상태 코드와 메시지로 변환됩니다.
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: sqlx 함수에서 `?`를 쓰면 자동으로 AppError::Database로 변환됩니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 파일 입출력 오류 (HTTP 500). 출석 원장(ledger) 파일 쓰기에서 발생합니다.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 직렬화 오류 (HTTP 500)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 인증 실패 (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 리소스 충돌 (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 출석 코어 에러. 상태 코드는 `AttendanceError::status()`가 결정합니다.
    #[error(transparent)]
    Attendance(#[from] AttendanceError),
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, IO, Serialization, Internal)는 실제 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Io(ref e) => {
                tracing::error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "io_error",
                    "An IO error occurred".to_string(),
                )
            }
            AppError::Serialization(ref e) => {
                tracing::error!("Serialization error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "serialization_error",
                    "A serialization error occurred".to_string(),
                )
            }
            AppError::Unauthorized(ref msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::Attendance(ref e) => {
                // 경계 에러는 협력자의 사유를 그대로 전달하되, 서버 로그에도 남깁니다.
                if matches!(
                    e,
                    AttendanceError::RosterUnavailable(_) | AttendanceError::CommitRejected(_)
                ) {
                    tracing::warn!("Attendance boundary error: {}", e);
                }
                (e.status(), e.code(), e.to_string())
            }
        };

        // 결과: { "error": { "code": "...", "message": "..." } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
