use crate::{
    db::{self, teachers as db_teachers},
    error::AppError,
    middleware::auth::{
        create_access_token, create_refresh_token, ensure_current, hash_token, verify_token,
        AuthUser, TokenKind,
    },
    models::{department::*, teacher::*},
    routes::AppState,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

const EXPIRES_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Issues an access token, plus a stored refresh token when the teacher asked to be remembered.
async fn issue_tokens(
    state: &AppState,
    teacher: Teacher,
    remember: bool,
) -> Result<AuthResponse, AppError> {
    let access_token = create_access_token(&teacher.id, teacher.session_epoch, &state.jwt_secret)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    let refresh_token = if remember {
        let token = create_refresh_token(
            &teacher.id,
            teacher.session_epoch,
            state.remember_days,
            &state.jwt_secret,
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        // Store refresh token hash
        let token_id = uuid::Uuid::now_v7().to_string();
        let expires_at = (Utc::now() + Duration::days(state.remember_days))
            .format(EXPIRES_AT_FORMAT)
            .to_string();
        db_teachers::store_refresh_token(
            &state.pool,
            &token_id,
            &teacher.id,
            &hash_token(&token),
            &expires_at,
        )
        .await?;

        Some(token)
    } else {
        None
    };

    Ok(AuthResponse {
        teacher: teacher.into(),
        access_token,
        refresh_token,
    })
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    // Validate input
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest("Password must be at least 8 characters".to_string()));
    }
    if !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }

    if db_teachers::find_by_email(&state.pool, &req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    let teacher_id = uuid::Uuid::now_v7().to_string();
    let teacher =
        db_teachers::create_teacher(&state.pool, &teacher_id, &req.email, name, &password_hash)
            .await?;
    tracing::info!("Registered teacher {}", teacher.id);

    // A fresh account starts a normal (not remembered) session
    Ok(Json(issue_tokens(&state, teacher, false).await?))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let teacher = db_teachers::find_by_email(&state.pool, &req.email)
        .await?
        .ok_or(AppError::Unauthorized("Invalid email or password".to_string()))?;

    // Verify password
    let parsed_hash = PasswordHash::new(&teacher.password_hash)
        .map_err(|e| AppError::Internal(format!("Password hash parse error: {}", e)))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid email or password".to_string()))?;

    Ok(Json(issue_tokens(&state, teacher, req.remember).await?))
}

/// Rotates a remembered session: the old refresh token is consumed and a new one issued.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let claims = verify_token(&req.refresh_token, TokenKind::Refresh, &state.jwt_secret)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    // Check if refresh token hash exists in DB
    let token_hash = hash_token(&req.refresh_token);
    let (_token_id, teacher_id, expires_at) =
        db_teachers::find_refresh_token(&state.pool, &token_hash)
            .await?
            .ok_or(AppError::Unauthorized("Refresh token not found or revoked".to_string()))?;

    // Check expiration
    let expires = chrono::NaiveDateTime::parse_from_str(&expires_at, EXPIRES_AT_FORMAT)
        .map_err(|e| AppError::Internal(format!("Date parse error: {}", e)))?;
    if expires.and_utc() < Utc::now() {
        db_teachers::delete_refresh_token(&state.pool, &token_hash).await?;
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    let teacher = db_teachers::find_by_id(&state.pool, &teacher_id)
        .await?
        .ok_or(AppError::Unauthorized("Teacher not found".to_string()))?;
    ensure_current(&claims, Some(teacher.session_epoch))
        .map_err(|_| AppError::Unauthorized("Session has been signed out".to_string()))?;

    db_teachers::delete_refresh_token(&state.pool, &token_hash).await?;

    Ok(Json(issue_tokens(&state, teacher, true).await?))
}

/// Signs out everywhere and drops any attendance still in progress.
///
/// Bumping the session epoch makes every access token issued so far fail with `revoked_token`.
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    db_teachers::bump_session_epoch(&state.pool, &auth_user.teacher_id).await?;
    db_teachers::delete_teacher_refresh_tokens(&state.pool, &auth_user.teacher_id).await?;
    state.workspace.discard(&auth_user.teacher_id).await;
    tracing::info!("Teacher {} logged out", auth_user.teacher_id);

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<TeacherProfile>, AppError> {
    let teacher = db_teachers::find_by_id(&state.pool, &auth_user.teacher_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(teacher.into()))
}

async fn preferences_of(state: &AppState, teacher: &Teacher) -> Result<Preferences, AppError> {
    let default_department = match teacher.default_department.as_deref() {
        Some(code) => db::find_department(&state.pool, code).await?,
        None => None,
    };
    Ok(Preferences { default_department })
}

/// `GET /auth/me/preferences`
pub async fn get_preferences(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Preferences>, AppError> {
    let teacher = db_teachers::find_by_id(&state.pool, &auth_user.teacher_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(preferences_of(&state, &teacher).await?))
}

/// `PUT /auth/me/preferences` + `{ "default_department": "IT" }` (null clears it)
pub async fn update_preferences(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<UpdatePreferencesRequest>,
) -> Result<Json<Preferences>, AppError> {
    let code = req
        .default_department
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty());
    if let Some(code) = code {
        if db::find_department(&state.pool, code).await?.is_none() {
            return Err(AppError::BadRequest(format!("Unknown department: {}", code)));
        }
    }

    db_teachers::set_default_department(&state.pool, &auth_user.teacher_id, code).await?;
    tracing::info!(
        "Teacher {} set default department to {}",
        auth_user.teacher_id,
        code.unwrap_or("none")
    );

    let teacher = db_teachers::find_by_id(&state.pool, &auth_user.teacher_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(preferences_of(&state, &teacher).await?))
}
