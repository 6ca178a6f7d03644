//! # 출석 모델 정의
//!
//! 마킹 → 검토 → 저장 흐름에서 주고받는 데이터 구조체들입니다.
//!
//! ## 구조체 역할
//! - `AttendanceStatus`: 학생 한 명의 출석 상태 (미표시/출석/결석)
//! - `Progress`, `AttendanceCounts`: 화면 카운터용 요약
//! - `AttendanceRecord`, `SessionRecord`: 저장소에 넘기는 커밋 페이로드
//! - `CommitReceipt`: 저장소가 돌려주는 영수증
//! - `*Request`: HTTP 요청 본문

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 학생 한 명의 출석 상태
///
/// `Unmarked`는 유일하게 유효한 초기값입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Unmarked,
    Present,
    Absent,
}

impl AttendanceStatus {
    /// 스와이프 결과(출석/결석)를 상태로 변환합니다.
    pub fn from_present(present: bool) -> Self {
        if present {
            AttendanceStatus::Present
        } else {
            AttendanceStatus::Absent
        }
    }

    /// `Unmarked`이면 None, 그 외에는 출석 여부
    pub fn as_present(self) -> Option<bool> {
        match self {
            AttendanceStatus::Unmarked => None,
            AttendanceStatus::Present => Some(true),
            AttendanceStatus::Absent => Some(false),
        }
    }
}

/// 학생 ID → 출석 상태 맵
pub type AttendanceMap = HashMap<String, AttendanceStatus>;

/// 마킹 진행 상황: `(cursor, roster.len())`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub marked: usize,
    pub total: usize,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.marked == self.total
    }
}

/// 검토 단계의 출석/결석 집계. 항상 `present + absent == total`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttendanceCounts {
    pub present: usize,
    pub absent: usize,
    pub total: usize,
}

/// 저장 가능한 학생 한 명의 출석 기록 (명단 순서 유지)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceRecord {
    pub student_id: String,
    pub roll_number: i64,
    pub name: String,
    /// 학적 번호. 명단에 없으면 None
    pub register_number: Option<String>,
    pub is_present: bool,
}

/// 커밋에 필요한 메타데이터: 어느 반, 몇 교시, 어느 날짜, 어느 교사
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMetadata {
    pub class_code: String,
    pub hour: u8,
    pub date: NaiveDate,
    pub teacher_id: String,
}

/// 저장소에 한 번에 넘기는 커밋 페이로드. 생성 후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub class_code: String,
    pub hour: u8,
    pub date: NaiveDate,
    pub teacher_id: String,
    pub records: Vec<AttendanceRecord>,
}

impl SessionRecord {
    pub fn new(metadata: CommitMetadata, records: Vec<AttendanceRecord>) -> Self {
        Self {
            class_code: metadata.class_code,
            hour: metadata.hour,
            date: metadata.date,
            teacher_id: metadata.teacher_id,
            records,
        }
    }

    pub fn present_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_present).count()
    }
}

/// 커밋된 기록이 실제로 저장된 위치
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageLocation {
    /// `attendance_sessions` / `attendance_records` 테이블
    Database { session_id: String },
    /// DB 저장 실패 시 쓰는 원장(ledger) JSON 파일
    Ledger { file_name: String },
}

/// 저장소가 돌려주는 커밋 영수증
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitReceipt {
    pub location: StorageLocation,
    pub record_count: usize,
}

/// 저장된 출석 세션 요약: `GET /attendance/sessions` 응답 항목
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SessionSummary {
    pub id: String,
    pub class_code: String,
    pub hour: i64,
    pub date: String,
    pub marked_at: String,
    pub present_count: i64,
    pub absent_count: i64,
}

/// 마킹 시작 요청: `POST /api/v1/marking`
#[derive(Debug, Deserialize)]
pub struct StartMarkingRequest {
    /// 반 코드 (예: "IT-A")
    pub class: String,
    /// 교시 (1부터 시작)
    pub hour: u8,
}

/// 스와이프 결과: `POST /api/v1/marking/mark`
#[derive(Debug, Deserialize)]
pub struct MarkRequest {
    pub present: bool,
}

/// 커밋 요청: `POST /api/v1/review/commit`
///
/// 날짜가 없으면 오늘(UTC)로 저장합니다.
#[derive(Debug, Default, Deserialize)]
pub struct CommitRequest {
    pub date: Option<NaiveDate>,
}
