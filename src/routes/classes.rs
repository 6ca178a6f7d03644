//! # 반/교시/학과 목록 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/classes` → `{ "department": "IT", "classes": ["IT-A", "IT-B"], "hours": [1, 2, 3, 4, 5, 6] }`
//! - `GET /api/v1/classes?all=true` → 기본 학과와 관계없이 설정된 모든 반
//! - `GET /api/v1/departments` → `{ "departments": [{ "code": "IT", "name": "...", "classes": [...] }] }`
//!
//! 반 목록 자체는 DB가 아니라 `CLASSES` 설정에서 옵니다.
//! 교사가 기본 학과를 골라 두었다면 그 학과에 속한 반만 보여줍니다.

use crate::{
    config::ClassDirectory, db, db::teachers as db_teachers, error::AppError,
    middleware::auth::AuthUser, routes::AppState,
};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Default, Deserialize)]
pub struct ClassListQuery {
    /// true면 기본 학과 필터를 무시합니다.
    #[serde(default)]
    pub all: bool,
}

/// 설정된 반 중 `members`에 있는 것만, 설정 순서대로 돌려줍니다.
pub(crate) fn configured_members<'a>(
    classes: &'a ClassDirectory,
    members: &[String],
) -> Vec<&'a str> {
    classes
        .codes()
        .filter(|code| members.iter().any(|member| member.as_str() == *code))
        .collect()
}

/// `GET /classes`: 마킹을 시작할 수 있는 반과 교시 목록
pub async fn list_classes(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<ClassListQuery>,
) -> Result<Json<Value>, AppError> {
    let department = if query.all {
        None
    } else {
        db_teachers::find_by_id(&state.pool, &auth_user.teacher_id)
            .await?
            .and_then(|teacher| teacher.default_department)
    };

    let classes: Vec<&str> = match department.as_deref() {
        Some(code) => {
            let members = db::list_department_classes(&state.pool, code).await?;
            configured_members(&state.settings.classes, &members)
        }
        None => state.settings.classes.codes().collect(),
    };
    let hours: Vec<u8> = (1..=state.settings.hours_per_day).collect();

    Ok(Json(json!({
        "department": department,
        "classes": classes,
        "hours": hours
    })))
}

/// `GET /departments`: 설정 화면에서 고를 수 있는 학과와 각 학과의 (설정된) 반
pub async fn list_departments(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let mut departments = Vec::new();
    for department in db::list_departments(&state.pool).await? {
        let members = db::list_department_classes(&state.pool, &department.code).await?;
        let classes = configured_members(&state.settings.classes, &members);
        departments.push(json!({
            "code": department.code,
            "name": department.name,
            "classes": classes
        }));
    }

    Ok(Json(json!({ "departments": departments })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_filter_keeps_configured_order_and_drops_unknown_codes() {
        let classes = ClassDirectory::parse("IT-B=itb,IT-A=ita,CSE-A=csea").unwrap();
        let members = vec!["IT-A".to_string(), "IT-B".to_string(), "IT-Z".to_string()];

        assert_eq!(configured_members(&classes, &members), vec!["IT-B", "IT-A"]);
        assert!(configured_members(&classes, &[]).is_empty());
    }
}
