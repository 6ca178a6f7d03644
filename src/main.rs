//! # Rollcall 웹 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 데이터베이스 연결 풀 생성
//! 4. 데이터베이스 마이그레이션 실행
//! 5. 출석 원장 디렉토리 생성
//! 6. API 라우터 설정
//! 7. HTTP 서버 시작
//!
//! 라우트와 핸들러는 라이브러리 크레이트(`rollcall::build_router`)에 있습니다.

use anyhow::Result;
use rollcall::{build_router, config::Config, routes::AppState, services::Workspace};
use sqlx::sqlite::SqlitePoolOptions;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG가 없으면 rollcall, tower_http, axum 모듈을 debug 레벨로 설정
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rollcall=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!("Starting Rollcall server on {}:{}", config.host, config.port);
    tracing::info!(
        "Classes: {} ({} hours per day)",
        config.attendance.classes.codes().collect::<Vec<_>>().join(", "),
        config.attendance.hours_per_day
    );

    // ── 4단계: SQLite 연결 풀 생성 ──
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    // ── 5단계: 데이터베이스 마이그레이션 실행 ──
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // ── 6단계: 원장 디렉토리 생성 ──
    // DB 저장이 실패했을 때 출석 기록을 JSON으로 남기는 곳입니다.
    let ledger_path = Path::new(&config.ledger_path);
    if !ledger_path.exists() {
        tokio::fs::create_dir_all(ledger_path).await?;
        tracing::info!("Created ledger directory: {}", config.ledger_path);
    }

    // ── 7단계: 애플리케이션 상태(State) 생성 ──
    let state = AppState {
        pool: pool.clone(),
        jwt_secret: config.jwt_secret.clone(),
        ledger_path: config.ledger_path.clone(),
        remember_days: config.remember_days,
        settings: config.attendance.clone(),
        workspace: Workspace::new(),
    };

    // ── 8단계: 라우터 구성 ──
    let app = build_router(state);

    // ── 9단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
