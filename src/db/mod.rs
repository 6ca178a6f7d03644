//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)와 출석 코어의 협력자 구현이 이 모듈을 사용합니다.
//!
//! 각 하위 모듈:
//! - `attendance`: 출석 세션 저장(`SqliteLedgerSink`)과 이력 조회
//! - `departments`: 학과와 학과별 반 목록
//! - `students`: 명단 조회(`SqliteRoster`)
//! - `teachers`: 교사 계정과 refresh 토큰

pub mod attendance;
pub mod departments;
pub mod students;
pub mod teachers;

pub use attendance::*;
pub use departments::*;
pub use students::*;
