#![allow(dead_code)]

use rollcall::config::{AttendanceSettings, ClassDirectory};
use rollcall::db::insert_student;
use rollcall::models::{AuthSession, StudentRecord};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

pub const TEACHER_ID: &str = "teacher-1";

/// Fresh in-memory database with the schema applied.
///
/// A single connection keeps every query on the same in-memory database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

pub async fn seed_teacher(pool: &SqlitePool, id: &str) {
    sqlx::query("INSERT INTO teachers (id, email, name, password_hash) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(format!("{id}@school.test"))
        .bind("Test Teacher")
        .bind("not-a-real-hash")
        .execute(pool)
        .await
        .unwrap();
}

/// Seeds the "ita" source, deliberately out of roll order.
pub async fn seed_students(pool: &SqlitePool) {
    let students = [
        ("S3", 3, "Chitra"),
        ("S1", 1, "Asha"),
        ("S2", 2, "Kumar, Priya"),
    ];
    for (id, roll_number, name) in students {
        let student = StudentRecord {
            id: id.to_string(),
            roll_number,
            name: name.to_string(),
            register_number: Some(format!("REG{roll_number:03}")),
        };
        insert_student(pool, "ita", &student).await.unwrap();
    }
}

pub fn settings() -> AttendanceSettings {
    AttendanceSettings {
        classes: ClassDirectory::parse("IT-A=ita,IT-B=itb").unwrap(),
        hours_per_day: 6,
    }
}

pub fn session() -> AuthSession {
    AuthSession {
        teacher_id: TEACHER_ID.to_string(),
        expires_at: chrono::Utc::now().timestamp() + 900,
    }
}
