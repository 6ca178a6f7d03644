//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로
//! - `JWT_SECRET`: JWT 토큰 서명에 사용할 비밀키
//! - `LEDGER_PATH`: DB 저장 실패 시 출석 기록을 백업하는 디렉토리
//! - `HOST`: 서버 바인딩 주소
//! - `PORT`: 서버 포트 번호
//! - `CLASSES`: 반 코드 → 명단 데이터 소스 매핑 (예: `IT-A=ita,IT-B=itb`)
//! - `HOURS_PER_DAY`: 선택 가능한 교시 수
//! - `REMEMBER_DAYS`: "로그인 유지" 세션의 유효 기간(일)
//!
//! 설정 객체는 전역 변수로 두지 않고, `RosterLoader`/`SessionCommitter` 생성자에
//! `AttendanceSettings`로 명시적으로 전달합니다.

use std::env;

/// 설정 로딩 중 발생하는 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 필수 환경변수 누락
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    /// `CLASSES` 항목 형식 오류
    #[error("Invalid class mapping entry: {0:?} (expected CODE=source)")]
    InvalidClassEntry(String),

    /// 같은 반 코드가 두 번 등장
    #[error("Duplicate class code: {0}")]
    DuplicateClass(String),

    /// 숫자 설정값 오류
    #[error("Invalid value for {name}: {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// 반 코드(화면 표시용, 예: "IT-A")와 명단 데이터 소스 키(예: "ita")의 매핑
///
/// 설정에 적힌 순서를 유지합니다. `GET /classes` 응답 순서가 곧 이 순서입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDirectory {
    entries: Vec<(String, String)>,
}

impl ClassDirectory {
    /// `"IT-A=ita,IT-B=itb"` 형식의 문자열을 파싱합니다.
    ///
    /// 빈 항목(연속된 쉼표)은 무시하고, `=`가 없거나 양쪽 중 하나가 비어 있으면 에러입니다.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut entries: Vec<(String, String)> = Vec::new();

        for item in raw.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            let (code, source) = item
                .split_once('=')
                .map(|(code, source)| (code.trim(), source.trim()))
                .filter(|(code, source)| !code.is_empty() && !source.is_empty())
                .ok_or_else(|| ConfigError::InvalidClassEntry(item.to_string()))?;

            if entries.iter().any(|(existing, _)| existing == code) {
                return Err(ConfigError::DuplicateClass(code.to_string()));
            }
            entries.push((code.to_string(), source.to_string()));
        }

        Ok(Self { entries })
    }

    /// 반 코드를 데이터 소스 키로 변환합니다. 알 수 없는 반이면 None.
    pub fn resolve(&self, class_code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(code, _)| code == class_code)
            .map(|(_, source)| source.as_str())
    }

    /// 설정된 반 코드 목록 (설정 순서)
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(code, _)| code.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 출석 코어에 주입되는 설정
#[derive(Debug, Clone)]
pub struct AttendanceSettings {
    /// 반 코드 → 명단 데이터 소스
    pub classes: ClassDirectory,
    /// 하루 교시 수. 유효한 교시는 `1..=hours_per_day`
    pub hours_per_day: u8,
}

impl AttendanceSettings {
    /// 교시 번호가 유효한지 확인합니다.
    pub fn is_valid_hour(&self, hour: u8) -> bool {
        (1..=self.hours_per_day).contains(&hour)
    }
}

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 파일 경로 (예: "sqlite:data/rollcall.db")
    pub database_url: String,
    /// JWT 토큰 서명/검증에 사용하는 비밀키
    pub jwt_secret: String,
    /// 출석 원장(백업 JSON 파일) 디렉토리 경로
    pub ledger_path: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
    /// "로그인 유지" refresh 토큰 유효 기간(일) (기본값: 7)
    pub remember_days: i64,
    /// 출석 코어 설정 (반 목록, 교시 수)
    pub attendance: AttendanceSettings,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`과 `JWT_SECRET`은 필수입니다.
    /// `CLASSES`, `HOURS_PER_DAY`, `REMEMBER_DAYS`는 값이 있으면 형식이 맞아야 합니다.
    pub fn from_env() -> Result<Self, ConfigError> {
        let classes = env::var("CLASSES").unwrap_or_else(|_| "IT-A=ita,IT-B=itb".to_string());

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            jwt_secret: env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?,
            ledger_path: env::var("LEDGER_PATH").unwrap_or_else(|_| "data/ledger".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            remember_days: parse_number("REMEMBER_DAYS", 7)?,
            attendance: AttendanceSettings {
                classes: ClassDirectory::parse(&classes)?,
                hours_per_day: parse_number("HOURS_PER_DAY", 6)?,
            },
        })
    }
}

/// 숫자 환경변수를 읽습니다. 없으면 기본값, 있는데 숫자가 아니면 에러.
fn parse_number<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        Err(_) => Ok(default),
    }
}
