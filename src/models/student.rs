//! # 학생 모델 정의
//!
//! 출석 명단(roster)을 이루는 학생 한 명의 정보입니다.
//! 명단이 로딩된 뒤에는 변경되지 않습니다.

use serde::{Deserialize, Serialize};

/// 학생 엔티티: DB의 `students` 테이블 한 행에 대응합니다.
///
/// - `id`: 학생 고유 식별자. 출석 맵의 키로 사용됩니다.
/// - `roll_number`: 반 안에서 고유한 번호. 명단 정렬 기준입니다.
/// - `register_number`: 학적 번호 (선택)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentRecord {
    pub id: String,
    pub roll_number: i64,
    pub name: String,
    pub register_number: Option<String>,
}
