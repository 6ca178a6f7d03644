//! # 명단 로더(RosterLoader)
//!
//! (반, 교시) 선택을 roll 번호 순으로 정렬된 불변 학생 명단으로 바꿉니다.
//!
//! ```text
//! 반 코드 ──ClassDirectory──▶ 데이터 소스 키 ──RosterSource──▶ Vec<StudentRecord> ──▶ Roster
//! ```
//!
//! 데이터 소스 호출은 읽기 전용이며, 재시도나 대체 조회 전략은 협력자(`RosterSource`)의 몫입니다.

use crate::config::{AttendanceSettings, ClassDirectory};
use crate::error::AttendanceError;
use crate::models::{AuthSession, StudentRecord};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use super::require_session;

/// 명단 데이터 소스 (외부 협력자)
///
/// 구현체는 `source_key`에 해당하는 학생 전체를 돌려줍니다. 순서는 보장하지 않아도 됩니다.
/// 데이터 소스 자체가 실패하면 `AttendanceError::RosterUnavailable`을 돌려줍니다.
pub trait RosterSource {
    fn fetch_students(
        &self,
        source_key: &str,
    ) -> impl Future<Output = Result<Vec<StudentRecord>, AttendanceError>> + Send;
}

/// 한 마킹 세션 동안 고정되는 학생 명단
///
/// 생성 시점에 roll 번호 오름차순으로 정렬되고, 이후에는 재정렬되지 않습니다.
/// 항상 학생이 한 명 이상이며 학생 ID는 중복되지 않습니다.
/// 내부 목록은 `Arc<[StudentRecord]>`이므로 복제해도 학생 데이터는 공유됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    class_code: String,
    students: Arc<[StudentRecord]>,
}

#[allow(clippy::len_without_is_empty)]
impl Roster {
    /// 학생 목록으로 명단을 만듭니다.
    ///
    /// # 에러
    /// - `EmptyRoster`: 학생이 없음
    /// - `DuplicateStudent`: 같은 ID가 두 번 이상 등장
    pub fn new(
        class_code: impl Into<String>,
        mut students: Vec<StudentRecord>,
    ) -> Result<Self, AttendanceError> {
        if students.is_empty() {
            return Err(AttendanceError::EmptyRoster);
        }

        let mut seen = HashSet::with_capacity(students.len());
        for student in &students {
            if !seen.insert(student.id.as_str()) {
                return Err(AttendanceError::DuplicateStudent(student.id.clone()));
            }
        }

        // 안정 정렬: roll 번호가 같으면 데이터 소스 순서를 유지
        students.sort_by_key(|student| student.roll_number);

        Ok(Self {
            class_code: class_code.into(),
            students: students.into(),
        })
    }

    pub fn class_code(&self) -> &str {
        &self.class_code
    }

    pub fn students(&self) -> &[StudentRecord] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn get(&self, index: usize) -> Option<&StudentRecord> {
        self.students.get(index)
    }

    pub fn contains(&self, student_id: &str) -> bool {
        self.students.iter().any(|student| student.id == student_id)
    }
}

/// 반 코드로 명단을 불러오는 로더
///
/// 설정(`AttendanceSettings`)은 생성자로 주입받습니다.
pub struct RosterLoader<S> {
    source: S,
    classes: ClassDirectory,
}

impl<S: RosterSource> RosterLoader<S> {
    pub fn new(source: S, settings: &AttendanceSettings) -> Self {
        Self {
            source,
            classes: settings.classes.clone(),
        }
    }

    /// 반의 명단을 roll 번호 오름차순으로 불러옵니다.
    ///
    /// 같은 반을 명단 변경 없이 두 번 불러오면 같은 순서가 나옵니다.
    ///
    /// # 에러
    /// - `NoActiveSession`: 로그인 세션이 없거나 만료됨 (데이터 소스를 호출하지 않음)
    /// - `ClassNotFound`: 반 코드가 설정에 없음 (데이터 소스를 호출하지 않음)
    /// - `EmptyRoster`: 반에 학생이 없음. 이 경우 마킹 세션을 시작하면 안 됩니다.
    /// - `DuplicateStudent`, `RosterUnavailable`: 데이터 소스 문제
    pub async fn load(
        &self,
        session: Option<&AuthSession>,
        class_code: &str,
    ) -> Result<Roster, AttendanceError> {
        require_session(session)?;

        let source_key = self
            .classes
            .resolve(class_code)
            .ok_or_else(|| AttendanceError::ClassNotFound(class_code.to_string()))?;

        let students = self.source.fetch_students(source_key).await?;
        Roster::new(class_code, students)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeSource {
        tables: HashMap<String, Vec<StudentRecord>>,
        calls: AtomicUsize,
    }

    impl RosterSource for FakeSource {
        async fn fetch_students(
            &self,
            source_key: &str,
        ) -> Result<Vec<StudentRecord>, AttendanceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.tables
                .get(source_key)
                .cloned()
                .ok_or_else(|| AttendanceError::RosterUnavailable(format!("no table {source_key}")))
        }
    }

    fn loader() -> RosterLoader<FakeSource> {
        let mut tables = HashMap::new();
        tables.insert(
            "ita".to_string(),
            vec![
                student("s3", 3, "Carol"),
                student("s1", 1, "Alice"),
                student("s2", 2, "Bob"),
            ],
        );
        tables.insert("empty".to_string(), Vec::new());
        RosterLoader::new(
            FakeSource {
                tables,
                ..Default::default()
            },
            &settings(),
        )
    }

    #[tokio::test]
    async fn load_sorts_by_roll_number() {
        let loader = loader();
        let session = active_session();
        let roster = loader.load(Some(&session), "IT-A").await.unwrap();

        let rolls: Vec<i64> = roster.students().iter().map(|s| s.roll_number).collect();
        assert_eq!(rolls, vec![1, 2, 3]);
        assert_eq!(roster.class_code(), "IT-A");
        assert_eq!(roster.len(), 3);
    }

    #[tokio::test]
    async fn repeated_loads_return_identical_ordering() {
        let loader = loader();
        let session = active_session();
        let first = loader.load(Some(&session), "IT-A").await.unwrap();
        let second = loader.load(Some(&session), "IT-A").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn empty_class_fails_with_empty_roster() {
        let loader = loader();
        let session = active_session();
        let err = loader.load(Some(&session), "EMPTY").await.unwrap_err();
        assert_eq!(err, AttendanceError::EmptyRoster);
    }

    #[tokio::test]
    async fn unknown_class_never_reaches_the_source() {
        let loader = loader();
        let session = active_session();
        let err = loader.load(Some(&session), "IT-Z").await.unwrap_err();
        assert_eq!(err, AttendanceError::ClassNotFound("IT-Z".to_string()));
        assert_eq!(loader.source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_or_expired_session_is_rejected() {
        let loader = loader();
        assert_eq!(
            loader.load(None, "IT-A").await.unwrap_err(),
            AttendanceError::NoActiveSession
        );

        let expired = AuthSession {
            teacher_id: "teacher-1".to_string(),
            expires_at: chrono::Utc::now().timestamp() - 1,
        };
        assert_eq!(
            loader.load(Some(&expired), "IT-A").await.unwrap_err(),
            AttendanceError::NoActiveSession
        );
        assert_eq!(loader.source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn source_failure_is_propagated_verbatim() {
        let loader = loader();
        let session = active_session();
        // IT-B is configured but the fake has no "itb" table
        let err = loader.load(Some(&session), "IT-B").await.unwrap_err();
        assert_eq!(err, AttendanceError::RosterUnavailable("no table itb".to_string()));
    }

    #[test]
    fn roster_rejects_duplicate_ids() {
        let err = Roster::new(
            "IT-A",
            vec![student("s1", 1, "Alice"), student("s1", 2, "Alice again")],
        )
        .unwrap_err();
        assert_eq!(err, AttendanceError::DuplicateStudent("s1".to_string()));
    }
}
