//! # 출석 코어 서비스
//!
//! 스와이프 출석 흐름의 비즈니스 로직입니다. HTTP나 DB에 의존하지 않습니다.
//!
//! ```text
//! RosterLoader ─▶ MarkingSession ─▶ ReviewBuffer ─▶ SessionCommitter
//!  (명단 로딩)     (스와이프 마킹)     (검토/수정)       (한 번에 저장)
//! ```
//!
//! - `roster`: 반 코드 → 정렬된 불변 명단
//! - `marking`: 커서 + 출석 맵 상태 머신 (mark / undo)
//! - `review`: 완료된 출석 맵의 편집 가능한 사본
//! - `committer`: 검토 버퍼 → 저장소 호출 1회
//! - `ledger`: DB 저장 실패 시 쓰는 JSON 원장 파일
//! - `workspace`: 교사별 진행 중 상태 보관소
//!
//! 코어 연산은 로그를 남기지 않습니다. 에러는 호출자에게 그대로 돌려주고,
//! 로그는 라우트 핸들러와 DB 협력자가 남깁니다.

pub mod committer;
pub mod ledger;
pub mod marking;
pub mod review;
pub mod roster;
pub mod workspace;

pub use committer::*;
pub use ledger::*;
pub use marking::*;
pub use review::*;
pub use roster::*;
pub use workspace::*;

use crate::error::AttendanceError;
use crate::models::AuthSession;

/// 로그인 세션이 있고 만료되지 않았는지 확인합니다.
pub(crate) fn require_session(
    session: Option<&AuthSession>,
) -> Result<&AuthSession, AttendanceError> {
    let now = chrono::Utc::now().timestamp();
    session
        .filter(|session| session.is_active_at(now))
        .ok_or(AttendanceError::NoActiveSession)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::{AttendanceSettings, ClassDirectory};
    use crate::models::{AuthSession, StudentRecord};

    use super::Roster;

    pub(crate) fn student(id: &str, roll_number: i64, name: &str) -> StudentRecord {
        StudentRecord {
            id: id.to_string(),
            roll_number,
            name: name.to_string(),
            register_number: None,
        }
    }

    /// S1(roll 1), S2(roll 2), S3(roll 3)
    pub(crate) fn three_students() -> Roster {
        Roster::new(
            "IT-A",
            vec![
                student("S1", 1, "Asha"),
                student("S2", 2, "Bala"),
                student("S3", 3, "Chitra"),
            ],
        )
        .unwrap()
    }

    pub(crate) fn active_session() -> AuthSession {
        AuthSession {
            teacher_id: "teacher-1".to_string(),
            expires_at: chrono::Utc::now().timestamp() + 900,
        }
    }

    pub(crate) fn settings() -> AttendanceSettings {
        AttendanceSettings {
            classes: ClassDirectory::parse("IT-A=ita,IT-B=itb,EMPTY=empty").unwrap(),
            hours_per_day: 6,
        }
    }
}
