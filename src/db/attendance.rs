//! # 출석 기록 데이터베이스 쿼리 모듈
//!
//! 커밋된 출석 세션을 저장하고 조회합니다.
//! `SqliteLedgerSink`는 출석 코어의 `PersistenceSink` 협력자 구현입니다.
//!
//! ## 저장 흐름
//! ```text
//! SessionRecord ─▶ 트랜잭션(attendance_sessions 1행 + attendance_records N행) ─▶ 성공
//!                        │ 실패 (롤백)
//!                        ▼
//!                  원장(ledger) JSON 파일 ─▶ 성공 / 둘 다 실패하면 에러
//! ```

use crate::error::AppError;
use crate::models::{AttendanceRecord, CommitReceipt, SessionRecord, SessionSummary, StorageLocation};
use crate::services::{ledger, PersistenceSink};
use sqlx::SqlitePool;

/// 세션 1행과 학생별 기록 N행을 하나의 트랜잭션으로 저장하고 세션 ID를 돌려줍니다.
///
/// 중간에 실패하면 트랜잭션이 커밋되지 않고 drop되면서 롤백됩니다.
/// 일부 학생만 저장되는 일은 없습니다.
pub async fn insert_session(pool: &SqlitePool, record: &SessionRecord) -> Result<String, AppError> {
    let session_id = uuid::Uuid::now_v7().to_string();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO attendance_sessions (id, class_code, hour, date, teacher_id)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&session_id)
    .bind(&record.class_code)
    .bind(i64::from(record.hour))
    .bind(record.date.format("%Y-%m-%d").to_string())
    .bind(&record.teacher_id)
    .execute(&mut *tx)
    .await?;

    for (position, entry) in record.records.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO attendance_records
                (id, session_id, student_id, roll_no, student_name, register_no,
                 is_present, position)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(uuid::Uuid::now_v7().to_string())
        .bind(&session_id)
        .bind(&entry.student_id)
        .bind(entry.roll_number)
        .bind(&entry.name)
        .bind(entry.register_number.as_deref())
        .bind(entry.is_present)
        .bind(position as i64)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(session_id)
}

/// 교사가 저장한 출석 세션을 최신순으로 조회합니다. 출석/결석 수를 함께 집계합니다.
pub async fn list_sessions_for_teacher(
    pool: &SqlitePool,
    teacher_id: &str,
) -> Result<Vec<SessionSummary>, AppError> {
    let sessions = sqlx::query_as::<_, SessionSummary>(
        r#"
        SELECT s.id, s.class_code, s.hour, s.date, s.marked_at,
               COALESCE(SUM(CASE WHEN r.is_present = 1 THEN 1 ELSE 0 END), 0) AS present_count,
               COALESCE(SUM(CASE WHEN r.is_present = 0 THEN 1 ELSE 0 END), 0) AS absent_count
        FROM attendance_sessions s
        LEFT JOIN attendance_records r ON r.session_id = s.id
        WHERE s.teacher_id = ?
        GROUP BY s.id
        ORDER BY s.marked_at DESC, s.id DESC
        "#,
    )
    .bind(teacher_id)
    .fetch_all(pool)
    .await?;

    Ok(sessions)
}

/// 교사 본인의 세션이면 저장된 기록을 명단 순서대로 돌려줍니다. 아니면 None.
pub async fn get_session_records(
    pool: &SqlitePool,
    teacher_id: &str,
    session_id: &str,
) -> Result<Option<Vec<AttendanceRecord>>, AppError> {
    let owner = sqlx::query_scalar::<_, String>(
        "SELECT teacher_id FROM attendance_sessions WHERE id = ?",
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?;

    if owner.as_deref() != Some(teacher_id) {
        return Ok(None);
    }

    let records = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT student_id, roll_no AS roll_number, student_name AS name,
               register_no AS register_number, is_present
        FROM attendance_records
        WHERE session_id = ?
        ORDER BY position ASC
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(Some(records))
}

/// DB 우선, 실패 시 원장 파일로 대체하는 저장소
#[derive(Clone)]
pub struct SqliteLedgerSink {
    pool: SqlitePool,
    ledger_path: String,
}

impl SqliteLedgerSink {
    pub fn new(pool: SqlitePool, ledger_path: impl Into<String>) -> Self {
        Self {
            pool,
            ledger_path: ledger_path.into(),
        }
    }
}

impl PersistenceSink for SqliteLedgerSink {
    async fn persist(&self, record: &SessionRecord) -> Result<CommitReceipt, AppError> {
        let record_count = record.records.len();

        match insert_session(&self.pool, record).await {
            Ok(session_id) => {
                tracing::info!(
                    "Saved attendance session {} ({} hour {}, {} records)",
                    session_id,
                    record.class_code,
                    record.hour,
                    record_count
                );
                Ok(CommitReceipt {
                    location: StorageLocation::Database { session_id },
                    record_count,
                })
            }
            Err(db_err) => {
                tracing::warn!("Database save failed, writing ledger file: {}", db_err);
                let file_name = ledger::write_entry(&self.ledger_path, record)
                    .await
                    .map_err(|ledger_err| {
                        tracing::error!("Ledger fallback failed: {}", ledger_err);
                        AppError::Internal(format!(
                            "database save failed ({db_err}) and ledger write failed ({ledger_err})"
                        ))
                    })?;
                tracing::info!("Saved attendance to ledger file {}", file_name);
                Ok(CommitReceipt {
                    location: StorageLocation::Ledger { file_name },
                    record_count,
                })
            }
        }
    }
}
