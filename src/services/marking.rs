//! # 마킹 세션(MarkingSession) 상태 머신
//!
//! 명단을 한 명씩 넘기며 출석/결석을 표시하는 스와이프 흐름입니다.
//!
//! ## 상태
//! ```text
//!            mark(p)                 mark(p) (마지막 학생)
//! Active(0) ────────▶ Active(1) ─ … ─────────────────────▶ Complete(n)
//!     ▲                  │  ▲                                   │
//!     └──── undo() ──────┘  └─────────────── undo() ────────────┘
//! ```
//!
//! ## 불변식
//! - 출석 맵의 키는 항상 명단의 학생 ID와 정확히 같습니다 (누락/추가 없음).
//! - `0 <= cursor <= roster.len()`이고, `mark`는 +1, `undo`는 -1만 움직입니다.
//! - 인덱스가 `cursor` 이상인 학생은 `Unmarked`, 미만인 학생은 `Present`/`Absent`입니다.
//!
//! 커서가 한 칸씩만 움직이므로 `undo`는 항상 마지막 `mark` 하나를 정확히 되돌립니다.
//! 실패한 연산은 상태를 바꾸지 않습니다.
//!
//! 세션 자체는 잠금을 하지 않습니다. 여러 호출자가 공유한다면 바깥에서 직렬화해야 합니다
//! (`Workspace` 참고).

use crate::error::AttendanceError;
use crate::models::{AttendanceMap, AttendanceStatus, Progress, StudentRecord};

use super::Roster;

/// 스와이프 출석 상태 머신
#[derive(Debug, Clone)]
pub struct MarkingSession {
    roster: Roster,
    cursor: usize,
    attendance: AttendanceMap,
}

impl MarkingSession {
    /// 모든 학생이 `Unmarked`이고 커서가 0인 `Active` 세션을 만듭니다.
    ///
    /// `Roster`는 비어 있을 수 없으므로 빈 명단으로는 세션이 만들어지지 않습니다.
    pub fn new(roster: Roster) -> Self {
        let attendance = roster
            .students()
            .iter()
            .map(|student| (student.id.clone(), AttendanceStatus::Unmarked))
            .collect();

        Self {
            roster,
            cursor: 0,
            attendance,
        }
    }

    /// 현재 학생을 출석(`true`) 또는 결석(`false`)으로 표시하고 다음 학생으로 넘어갑니다.
    ///
    /// 마지막 학생을 표시하면 `Complete` 상태가 됩니다.
    ///
    /// # 에러
    /// `NoCurrentStudent`: 이미 `Complete` 상태. 상태는 바뀌지 않습니다.
    pub fn mark(&mut self, present: bool) -> Result<Progress, AttendanceError> {
        let student_id = self.current_student()?.id.clone();
        self.attendance
            .insert(student_id, AttendanceStatus::from_present(present));
        self.cursor += 1;
        Ok(self.progress())
    }

    /// 마지막 `mark`를 되돌립니다. 되돌린 학생은 다시 `Unmarked`가 되고 현재 학생이 됩니다.
    ///
    /// `Complete` 상태에서 호출하면 `Active`로 돌아갑니다.
    ///
    /// # 에러
    /// `NothingToUndo`: 커서가 0. 상태는 바뀌지 않습니다.
    pub fn undo(&mut self) -> Result<&StudentRecord, AttendanceError> {
        if self.cursor == 0 {
            return Err(AttendanceError::NothingToUndo);
        }

        self.cursor -= 1;
        let student = &self.roster.students()[self.cursor];
        self.attendance
            .insert(student.id.clone(), AttendanceStatus::Unmarked);
        Ok(student)
    }

    /// 다음에 표시할 학생
    ///
    /// # 에러
    /// `NoCurrentStudent`: `Complete` 상태
    pub fn current_student(&self) -> Result<&StudentRecord, AttendanceError> {
        self.roster
            .get(self.cursor)
            .ok_or(AttendanceError::NoCurrentStudent)
    }

    /// `(cursor, roster.len())`. 부수 효과 없음.
    pub fn progress(&self) -> Progress {
        Progress {
            marked: self.cursor,
            total: self.roster.len(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.cursor == self.roster.len()
    }

    /// 현재 출석 맵의 사본. 세션 내부 상태는 노출하지 않습니다.
    pub fn snapshot(&self) -> AttendanceMap {
        self.attendance.clone()
    }

    pub fn status_of(&self, student_id: &str) -> Option<AttendanceStatus> {
        self.attendance.get(student_id).copied()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }
}
