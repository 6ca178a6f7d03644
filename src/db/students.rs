//! # 학생 명단 데이터베이스 쿼리 모듈
//!
//! `students` 테이블에서 반(데이터 소스 키)별 명단을 읽습니다.
//! `SqliteRoster`는 출석 코어의 `RosterSource` 협력자 구현입니다.
//!
//! ## 테이블 구조
//! - `students`: (id, source_key, name, roll_no, register_no)
//!   `source_key`는 `CLASSES` 설정의 오른쪽 값 (예: "IT-A=ita"의 "ita")

use crate::error::{AppError, AttendanceError};
use crate::models::StudentRecord;
use crate::services::RosterSource;
use sqlx::SqlitePool;

/// 데이터 소스 키에 속한 학생 전체를 roll 번호 순으로 조회합니다.
///
/// 컬럼 이름을 `AS`로 바꿔 `StudentRecord` 필드에 맞춥니다.
pub async fn list_students(
    pool: &SqlitePool,
    source_key: &str,
) -> Result<Vec<StudentRecord>, AppError> {
    let students = sqlx::query_as::<_, StudentRecord>(
        r#"
        SELECT id, roll_no AS roll_number, name, register_no AS register_number
        FROM students
        WHERE source_key = ?
        ORDER BY roll_no ASC
        "#,
    )
    .bind(source_key)
    .fetch_all(pool)
    .await?;

    Ok(students)
}

/// 학생 한 명을 추가합니다. 시드 데이터와 테스트에서 사용합니다.
pub async fn insert_student(
    pool: &SqlitePool,
    source_key: &str,
    student: &StudentRecord,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO students (id, source_key, name, roll_no, register_no)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&student.id)
    .bind(source_key)
    .bind(&student.name)
    .bind(student.roll_number)
    .bind(student.register_number.as_deref())
    .execute(pool)
    .await?;

    Ok(())
}

/// SQLite 기반 명단 데이터 소스
///
/// `SqlitePool`은 내부적으로 Arc이므로 복제 비용이 작습니다.
#[derive(Clone)]
pub struct SqliteRoster {
    pool: SqlitePool,
}

impl SqliteRoster {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RosterSource for SqliteRoster {
    async fn fetch_students(&self, source_key: &str) -> Result<Vec<StudentRecord>, AttendanceError> {
        list_students(&self.pool, source_key).await.map_err(|e| {
            tracing::error!("Roster query for {} failed: {}", source_key, e);
            AttendanceError::RosterUnavailable(e.to_string())
        })
    }
}
