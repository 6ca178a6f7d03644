use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Teacher {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// bumped on logout; tokens carrying an older epoch are rejected
    #[serde(skip_serializing)]
    pub session_epoch: i64,
    pub default_department: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// `GET /auth/me` profile lookup.
#[derive(Debug, Clone, Serialize)]
pub struct TeacherProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

impl From<Teacher> for TeacherProfile {
    fn from(teacher: Teacher) -> Self {
        Self {
            id: teacher.id,
            name: teacher.name,
            email: teacher.email,
            created_at: teacher.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Keep the session across app restarts (issues a refresh token).
    #[serde(default)]
    pub remember: bool,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub teacher: TeacherProfile,
    pub access_token: String,
    /// Only present for remembered sessions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// The signed-in teacher as the attendance core sees it.
///
/// Built from verified access-token claims. `expires_at` is a unix timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub teacher_id: String,
    pub expires_at: i64,
}

impl AuthSession {
    pub fn is_active_at(&self, now: i64) -> bool {
        now < self.expires_at
    }
}
