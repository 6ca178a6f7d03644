//! # 검토 버퍼(ReviewBuffer)
//!
//! 마킹이 끝난 출석 맵을 저장 전에 확인하고 고치는 단계입니다.
//! 마킹 세션의 스냅샷을 복사해 만들며, 이후 마킹 세션과는 상태를 공유하지 않습니다.
//!
//! 아직 표시되지 않은 학생이 있으면 버퍼를 만들 수 없습니다 (`IncompleteSession`).
//! 미표시 학생을 결석으로 조용히 바꾸지 않습니다.

use crate::error::AttendanceError;
use crate::models::{AttendanceCounts, AttendanceMap, AttendanceRecord, AttendanceStatus, StudentRecord};
use serde::Serialize;
use std::collections::HashMap;

use super::Roster;

/// 검토 화면의 한 줄
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewEntry {
    pub student: StudentRecord,
    pub is_present: bool,
}

/// 명단 순서를 유지하는, 편집 가능한 출석 사본
#[derive(Debug, Clone, Default)]
pub struct ReviewBuffer {
    entries: Vec<ReviewEntry>,
    positions: HashMap<String, usize>,
}

impl ReviewBuffer {
    /// 명단과 출석 맵 스냅샷으로 버퍼를 만듭니다.
    ///
    /// # 에러
    /// - `IncompleteSession`: `Unmarked` 학생(또는 맵에 없는 학생)이 남아 있음
    /// - `StudentNotFound`: 맵에 명단에 없는 학생 ID가 있음
    pub fn from_snapshot(roster: &Roster, attendance: &AttendanceMap) -> Result<Self, AttendanceError> {
        if let Some(extra) = attendance.keys().find(|id| !roster.contains(id)) {
            return Err(AttendanceError::StudentNotFound(extra.clone()));
        }

        let unmarked = roster
            .students()
            .iter()
            .filter(|student| {
                attendance
                    .get(&student.id)
                    .and_then(|status| status.as_present())
                    .is_none()
            })
            .count();
        if unmarked > 0 {
            return Err(AttendanceError::IncompleteSession { unmarked });
        }

        let mut entries = Vec::with_capacity(roster.len());
        let mut positions = HashMap::with_capacity(roster.len());
        for (index, student) in roster.students().iter().enumerate() {
            let is_present = attendance
                .get(&student.id)
                .copied()
                .unwrap_or(AttendanceStatus::Unmarked)
                == AttendanceStatus::Present;
            positions.insert(student.id.clone(), index);
            entries.push(ReviewEntry {
                student: student.clone(),
                is_present,
            });
        }

        Ok(Self { entries, positions })
    }

    /// 학생의 출석 여부를 뒤집고 새 값을 돌려줍니다. 다른 학생은 바뀌지 않습니다.
    ///
    /// # 에러
    /// `StudentNotFound`: 버퍼에 없는 학생
    pub fn toggle(&mut self, student_id: &str) -> Result<bool, AttendanceError> {
        let index = *self
            .positions
            .get(student_id)
            .ok_or_else(|| AttendanceError::StudentNotFound(student_id.to_string()))?;

        let entry = &mut self.entries[index];
        entry.is_present = !entry.is_present;
        Ok(entry.is_present)
    }

    pub fn counts(&self) -> AttendanceCounts {
        let present = self.entries.iter().filter(|entry| entry.is_present).count();
        AttendanceCounts {
            present,
            absent: self.entries.len() - present,
            total: self.entries.len(),
        }
    }

    pub fn entries(&self) -> &[ReviewEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_present(&self, student_id: &str) -> Option<bool> {
        self.positions
            .get(student_id)
            .map(|&index| self.entries[index].is_present)
    }

    /// 커밋용 기록. 토글 횟수와 관계없이 명단(roll 번호) 순서입니다.
    pub fn to_records(&self) -> Vec<AttendanceRecord> {
        self.entries
            .iter()
            .map(|entry| AttendanceRecord {
                student_id: entry.student.id.clone(),
                roll_number: entry.student.roll_number,
                name: entry.student.name.clone(),
                register_number: entry.student.register_number.clone(),
                is_present: entry.is_present,
            })
            .collect()
    }

    /// `roll_no,name,status` CSV. status는 `present` 또는 `absent`입니다.
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["roll_no", "name", "status"])?;
        for entry in &self.entries {
            let status = if entry.is_present { "present" } else { "absent" };
            writer.write_record([
                entry.student.roll_number.to_string().as_str(),
                entry.student.name.as_str(),
                status,
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        // 입력이 모두 UTF-8 문자열이므로 출력도 UTF-8
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
