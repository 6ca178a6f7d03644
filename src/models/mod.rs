//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! 각 하위 모듈은 특정 도메인의 데이터 타입을 담당합니다:
//! - `attendance`: 출석 상태, 진행 상황, 커밋 페이로드, 요청 본문
//! - `department`: 학과와 교사 설정
//! - `student`: 명단의 학생 한 명
//! - `teacher`: 교사 계정, 인증 요청/응답, 로그인 세션
//!
//! `pub use X::*;`는 하위 모듈의 모든 공개 항목을
//! 이 모듈에서 바로 접근할 수 있게 재공개(re-export)합니다.
//! 예: `crate::models::student::StudentRecord` 대신 `crate::models::StudentRecord`로 접근 가능

pub mod attendance;
pub mod department;
pub mod student;
pub mod teacher;

pub use attendance::*;
pub use department::*;
pub use student::*;
pub use teacher::*;
