//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//! Axum에서 핸들러는 HTTP 요청을 받아 응답을 반환하는 async 함수입니다.
//!
//! 각 하위 모듈:
//! - `auth`: 인증 관련 (회원가입, 로그인, 토큰 갱신, 로그아웃, 내 정보)
//! - `classes`: 선택 가능한 반과 교시 목록
//! - `marking`: 스와이프 마킹 세션 (시작, 표시, 되돌리기, 포기, 검토로 인계)
//! - `review`: 검토 버퍼 (조회, 토글, CSV 내보내기, 커밋, 폐기)
//! - `history`: 저장된 출석 세션 이력
//! - `health`: 서버 상태 확인 (헬스체크)

pub mod auth;
pub mod classes;
pub mod health;
pub mod history;
pub mod marking;
pub mod review;

// 각 모듈의 핸들러 함수들을 재공개하여
// 라우터에서 `routes::start_marking`처럼 바로 접근 가능하게 합니다.
pub use classes::*;
pub use health::*;
pub use history::*;
pub use marking::*;
pub use review::*;

use crate::config::AttendanceSettings;
use crate::services::Workspace;
use sqlx::SqlitePool;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// `#[derive(Clone)]`: Axum의 State Extractor는 내부적으로 AppState를 clone합니다.
/// 풀과 작업 공간은 내부적으로 Arc라서 clone해도 같은 대상을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀
    pub pool: SqlitePool,
    /// JWT 토큰 서명용 비밀키
    pub jwt_secret: String,
    /// 출석 원장(백업 JSON) 디렉토리
    pub ledger_path: String,
    /// "로그인 유지" refresh 토큰 유효 기간(일)
    pub remember_days: i64,
    /// 반 목록과 교시 수. `RosterLoader`/`SessionCommitter`에 그대로 전달됩니다.
    pub settings: AttendanceSettings,
    /// 교사별 진행 중 마킹/검토 단계
    pub workspace: Workspace,
}
