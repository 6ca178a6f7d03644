//! # 작업 공간(Workspace)
//!
//! 교사별로 진행 중인 출석 단계(마킹 또는 검토)를 하나씩 보관합니다.
//!
//! 마킹 세션과 검토 버퍼는 잠금을 하지 않으므로, 교사마다 슬롯 하나를 두고
//! 비동기 뮤텍스로 감쌉니다. 한 교사의 요청은 슬롯 잠금 순서대로 적용되고,
//! 커밋 중에는 잠금을 쥐고 있으므로 같은 버퍼에 대한 커밋이 겹치지 않습니다.

use crate::error::{AppError, AttendanceError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{MarkingSession, ReviewBuffer};

/// 스와이프 마킹 단계
#[derive(Debug)]
pub struct MarkingStage {
    pub class_code: String,
    pub hour: u8,
    pub session: MarkingSession,
}

/// 검토 단계. 마킹 세션은 인계와 함께 버려집니다.
#[derive(Debug)]
pub struct ReviewStage {
    pub class_code: String,
    pub hour: u8,
    pub buffer: ReviewBuffer,
}

#[derive(Debug)]
pub enum Stage {
    Marking(MarkingStage),
    Review(ReviewStage),
}

impl Stage {
    pub fn marking(&self) -> Result<&MarkingStage, AppError> {
        match self {
            Stage::Marking(stage) => Ok(stage),
            Stage::Review(_) => Err(AttendanceError::SessionComplete.into()),
        }
    }

    pub fn marking_mut(&mut self) -> Result<&mut MarkingStage, AppError> {
        match self {
            Stage::Marking(stage) => Ok(stage),
            Stage::Review(_) => Err(AttendanceError::SessionComplete.into()),
        }
    }

    pub fn review(&self) -> Result<&ReviewStage, AppError> {
        match self {
            Stage::Review(stage) => Ok(stage),
            Stage::Marking(_) => Err(not_in_review()),
        }
    }

    pub fn review_mut(&mut self) -> Result<&mut ReviewStage, AppError> {
        match self {
            Stage::Review(stage) => Ok(stage),
            Stage::Marking(_) => Err(not_in_review()),
        }
    }

    /// 마킹 단계를 검토 단계로 넘깁니다. 이미 검토 단계면 그대로 돌려줍니다.
    ///
    /// 인계에 실패하면(`IncompleteSession` 등) 마킹 단계가 그대로 남습니다.
    pub fn hand_off(&mut self) -> Result<&ReviewStage, AppError> {
        if let Stage::Marking(stage) = self {
            let buffer =
                ReviewBuffer::from_snapshot(stage.session.roster(), &stage.session.snapshot())?;
            let next = Stage::Review(ReviewStage {
                class_code: stage.class_code.clone(),
                hour: stage.hour,
                buffer,
            });
            *self = next;
        }
        self.review()
    }
}

fn not_in_review() -> AppError {
    AppError::Conflict("Attendance has not been handed off to review yet".to_string())
}

/// 한 교사의 진행 중 단계. `None`이면 진행 중인 작업이 없습니다.
pub type Slot = Arc<Mutex<Option<Stage>>>;

/// 교사 ID → 슬롯
///
/// `Clone`은 같은 저장소를 가리키는 핸들을 복제합니다 (`AppState`에 넣기 위함).
#[derive(Clone, Default)]
pub struct Workspace {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// 교사의 슬롯을 돌려줍니다. 없으면 빈 슬롯을 만듭니다.
    pub async fn slot(&self, teacher_id: &str) -> Slot {
        let mut slots = self.slots.lock().await;
        slots
            .entry(teacher_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone()
    }

    /// 진행 중인 작업을 버립니다. 부수 효과는 없습니다.
    pub async fn discard(&self, teacher_id: &str) {
        let slot = self.slot(teacher_id).await;
        slot.lock().await.take();
        drop(slot);
        self.release(teacher_id).await;
    }

    /// 비어 있고 아무도 쥐고 있지 않은 슬롯을 맵에서 제거합니다.
    ///
    /// 호출자는 자신의 `Slot` 핸들을 먼저 drop해야 합니다.
    /// 다른 요청이 핸들을 쥐고 있으면 그대로 둡니다.
    pub async fn release(&self, teacher_id: &str) {
        let mut slots = self.slots.lock().await;
        let idle = slots.get(teacher_id).is_some_and(|slot| {
            Arc::strong_count(slot) == 1
                && slot.try_lock().map(|stage| stage.is_none()).unwrap_or(false)
        });
        if idle {
            slots.remove(teacher_id);
        }
    }

    /// 슬롯이 있는 교사 수
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
