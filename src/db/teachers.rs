use crate::error::AppError;
use crate::models::teacher::Teacher;
use sqlx::SqlitePool;

pub async fn create_teacher(
    pool: &SqlitePool,
    id: &str,
    email: &str,
    name: &str,
    password_hash: &str,
) -> Result<Teacher, AppError> {
    sqlx::query(
        r#"
        INSERT INTO teachers (id, email, name, password_hash)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(name)
    .bind(password_hash)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created teacher".to_string()))
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Teacher>, AppError> {
    let teacher = sqlx::query_as::<_, Teacher>(
        r#"
        SELECT id, email, name, password_hash, session_epoch, default_department,
               created_at, updated_at
        FROM teachers
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(teacher)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Teacher>, AppError> {
    let teacher = sqlx::query_as::<_, Teacher>(
        r#"
        SELECT id, email, name, password_hash, session_epoch, default_department,
               created_at, updated_at
        FROM teachers
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(teacher)
}

pub async fn store_refresh_token(
    pool: &SqlitePool,
    id: &str,
    teacher_id: &str,
    token_hash: &str,
    expires_at: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (id, teacher_id, token_hash, expires_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(teacher_id)
    .bind(token_hash)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns `(token_id, teacher_id, expires_at)` for a stored refresh token hash.
pub async fn find_refresh_token(
    pool: &SqlitePool,
    token_hash: &str,
) -> Result<Option<(String, String, String)>, AppError> {
    let row = sqlx::query_as::<_, (String, String, String)>(
        r#"
        SELECT id, teacher_id, expires_at
        FROM refresh_tokens
        WHERE token_hash = ?
        "#,
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn delete_refresh_token(pool: &SqlitePool, token_hash: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = ?")
        .bind(token_hash)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn delete_teacher_refresh_tokens(
    pool: &SqlitePool,
    teacher_id: &str,
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM refresh_tokens WHERE teacher_id = ?")
        .bind(teacher_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Current session epoch, or `None` when the teacher no longer exists.
pub async fn find_session_epoch(pool: &SqlitePool, id: &str) -> Result<Option<i64>, AppError> {
    let epoch = sqlx::query_scalar::<_, i64>("SELECT session_epoch FROM teachers WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(epoch)
}

/// Invalidates every token issued so far for this teacher.
pub async fn bump_session_epoch(pool: &SqlitePool, id: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE teachers
        SET session_epoch = session_epoch + 1,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// `None` clears the preference. The department must already exist.
pub async fn set_default_department(
    pool: &SqlitePool,
    id: &str,
    department_code: Option<&str>,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE teachers
        SET default_department = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(department_code)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}
