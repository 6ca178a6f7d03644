//! # 학과(Department) 모델 정의
//!
//! 교사 설정의 "기본 학과"와 반 목록 필터에 사용합니다.

use serde::{Deserialize, Serialize};

/// 학과 엔티티: `departments` 테이블 한 행
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Department {
    /// 학과 코드 (예: "IT")
    pub code: String,
    pub name: String,
}

/// 교사 설정 응답: `GET /api/v1/auth/me/preferences`
///
/// 기본 학과를 고르지 않았으면 `default_department`는 null입니다.
#[derive(Debug, Clone, Serialize)]
pub struct Preferences {
    pub default_department: Option<Department>,
}

/// 교사 설정 변경 요청: `PUT /api/v1/auth/me/preferences`
///
/// `default_department`를 null로 보내면 기본 학과를 해제합니다.
#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub default_department: Option<String>,
}
