//! # 학과 데이터베이스 쿼리 모듈
//!
//! ## 테이블 구조
//! - `departments`: (code, name)
//! - `department_classes`: (department_code, class_code). 학과별로 보여줄 반 코드

use crate::error::AppError;
use crate::models::Department;
use sqlx::SqlitePool;

pub async fn list_departments(pool: &SqlitePool) -> Result<Vec<Department>, AppError> {
    let departments = sqlx::query_as::<_, Department>(
        "SELECT code, name FROM departments ORDER BY code ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(departments)
}

pub async fn find_department(pool: &SqlitePool, code: &str) -> Result<Option<Department>, AppError> {
    let department =
        sqlx::query_as::<_, Department>("SELECT code, name FROM departments WHERE code = ?")
            .bind(code)
            .fetch_optional(pool)
            .await?;

    Ok(department)
}

/// 학과에 속한 반 코드. 설정에 없는 반이 섞여 있을 수 있으므로 호출자가 걸러야 합니다.
pub async fn list_department_classes(
    pool: &SqlitePool,
    department_code: &str,
) -> Result<Vec<String>, AppError> {
    let classes = sqlx::query_scalar::<_, String>(
        r#"
        SELECT class_code
        FROM department_classes
        WHERE department_code = ?
        ORDER BY class_code ASC
        "#,
    )
    .bind(department_code)
    .fetch_all(pool)
    .await?;

    Ok(classes)
}

/// 학과에 반을 추가합니다. 이미 있으면 아무 일도 하지 않습니다.
pub async fn add_department_class(
    pool: &SqlitePool,
    department_code: &str,
    class_code: &str,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT OR IGNORE INTO department_classes (department_code, class_code) VALUES (?, ?)",
    )
    .bind(department_code)
    .bind(class_code)
    .execute(pool)
    .await?;

    Ok(())
}
