//! # 세션 커미터(SessionCommitter)
//!
//! 검토가 끝난 버퍼를 `SessionRecord` 하나로 만들어 저장소에 한 번 넘깁니다.
//!
//! - 저장소 호출은 커밋 한 번에 정확히 한 번입니다. 일부 학생만 저장하는 경로는 없습니다.
//! - 재시도와 보조 저장소(원장 파일)로의 대체는 저장소 구현(`PersistenceSink`)의 몫이고,
//!   커미터는 최종 성공/실패만 봅니다.
//! - 버퍼는 빌려서 읽기만 하므로 실패해도 검토 상태가 그대로 남아 재시도할 수 있습니다.
//! - 재진입을 막지 않습니다. 같은 버퍼에 대한 동시 커밋은 호출자가 직렬화해야 합니다.

use crate::config::AttendanceSettings;
use crate::error::{AppError, AttendanceError};
use crate::models::{AuthSession, CommitMetadata, CommitReceipt, SessionRecord};
use std::future::Future;

use super::{require_session, ReviewBuffer};

/// 출석 기록 저장소 (외부 협력자)
///
/// 내부적으로 보조 저장소로 대체할 수 있지만, 호출자에게는 최종 결과만 보고합니다.
pub trait PersistenceSink {
    fn persist(
        &self,
        record: &SessionRecord,
    ) -> impl Future<Output = Result<CommitReceipt, AppError>> + Send;
}

pub struct SessionCommitter<S> {
    sink: S,
    hours_per_day: u8,
}

impl<S: PersistenceSink> SessionCommitter<S> {
    pub fn new(sink: S, settings: &AttendanceSettings) -> Self {
        Self {
            sink,
            hours_per_day: settings.hours_per_day,
        }
    }

    /// 버퍼와 메타데이터로 `SessionRecord`를 만들어 저장합니다.
    ///
    /// # 에러
    /// - `NoActiveSession`: 로그인 세션이 없거나 만료됨
    /// - `ValidationError`: 버퍼가 비어 있음, 교시 범위 밖, 세션과 교사 ID 불일치
    /// - `CommitRejected`: 저장소가 실패를 보고함 (사유 포함)
    ///
    /// 저장소 호출 전 검증에서 실패하면 저장소는 호출되지 않습니다.
    pub async fn commit(
        &self,
        session: Option<&AuthSession>,
        buffer: &ReviewBuffer,
        metadata: CommitMetadata,
    ) -> Result<CommitReceipt, AttendanceError> {
        let session = require_session(session)?;

        if buffer.is_empty() {
            return Err(AttendanceError::ValidationError(
                "review buffer has no entries".to_string(),
            ));
        }
        if !(1..=self.hours_per_day).contains(&metadata.hour) {
            return Err(AttendanceError::ValidationError(format!(
                "hour {} is outside 1..={}",
                metadata.hour, self.hours_per_day
            )));
        }
        if metadata.teacher_id != session.teacher_id {
            return Err(AttendanceError::ValidationError(
                "teacher does not match the signed-in session".to_string(),
            ));
        }

        let record = SessionRecord::new(metadata, buffer.to_records());
        self.sink
            .persist(&record)
            .await
            .map_err(|e| AttendanceError::CommitRejected(e.to_string()))
    }
}
