//! # 출석 원장(ledger) 파일 I/O 서비스
//!
//! DB 저장이 실패했을 때 `SessionRecord` 전체를 JSON 파일 하나로 남기는 보조 저장소입니다.
//!
//! 이 모듈의 함수들:
//! - `ledger_file_name()`: 반/날짜/교시로 파일 이름 생성
//! - `write_entry()`: 기록을 새 JSON 파일로 저장 (기존 파일은 덮어쓰지 않음)
//! - `read_entry()`: 저장된 JSON 파일을 다시 읽기

use crate::error::AppError;
use crate::models::SessionRecord;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// 반 코드를 파일 이름에 쓸 수 있게 소문자 ASCII 영숫자만 남깁니다.
///
/// 남는 글자가 없으면 `"class"`를 씁니다. CSV 내보내기 파일 이름도 이 함수를 씁니다.
pub fn file_safe_class(class_code: &str) -> String {
    let class: String = class_code
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if class.is_empty() {
        "class".to_string()
    } else {
        class
    }
}

/// 원장 파일 이름을 만듭니다.
///
/// 반 코드는 소문자 영숫자만 남깁니다 (예: "IT-A" → "ita").
/// 마지막의 UUIDv7은 시간순으로 정렬되며 같은 교시를 여러 번 저장해도 겹치지 않습니다.
///
/// # 예시
/// ```text
/// ita_2026-10-18_hour2_0192f3a4c1d07b3e9a5f6c2d8e1b4a70.json
/// ```
pub fn ledger_file_name(record: &SessionRecord) -> String {
    format!(
        "{}_{}_hour{}_{}.json",
        file_safe_class(&record.class_code),
        record.date.format("%Y-%m-%d"),
        record.hour,
        uuid::Uuid::now_v7().simple()
    )
}

/// 기록을 원장 디렉토리에 JSON 파일로 저장하고 파일 이름을 돌려줍니다.
///
/// 디렉토리가 없으면 만듭니다. 같은 이름의 파일이 이미 있으면 에러입니다.
pub async fn write_entry(ledger_path: &str, record: &SessionRecord) -> Result<String, AppError> {
    let dir = PathBuf::from(ledger_path);
    fs::create_dir_all(&dir).await?;

    let file_name = ledger_file_name(record);
    let body = serde_json::to_vec_pretty(record)?;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dir.join(&file_name))
        .await?;
    file.write_all(&body).await?;
    // 커밋 성공을 보고하기 전에 디스크까지 내려쓴다
    file.sync_all().await?;

    Ok(file_name)
}

/// 원장 파일 하나를 읽어 기록으로 되돌립니다.
pub async fn read_entry(ledger_path: &str, file_name: &str) -> Result<SessionRecord, AppError> {
    let content = fs::read(PathBuf::from(ledger_path).join(file_name)).await?;
    Ok(serde_json::from_slice(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttendanceRecord;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn record() -> SessionRecord {
        SessionRecord {
            class_code: "IT-A".to_string(),
            hour: 3,
            date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            teacher_id: "teacher-1".to_string(),
            records: vec![AttendanceRecord {
                student_id: "S1".to_string(),
                roll_number: 1,
                name: "Asha".to_string(),
                register_number: Some("REG001".to_string()),
                is_present: true,
            }],
        }
    }

    #[test]
    fn file_name_uses_normalized_class_date_and_hour() {
        let name = ledger_file_name(&record());
        assert!(name.starts_with("ita_2026-10-18_hour3_"), "{name}");
        assert!(name.ends_with(".json"));
    }

    #[test]
    fn class_codes_are_reduced_to_ascii_alphanumerics() {
        assert_eq!(file_safe_class("IT-A"), "ita");
        assert_eq!(file_safe_class("2\"IT\" B"), "2itb");
        assert_eq!(file_safe_class("정보-가"), "class");
    }

    #[tokio::test]
    async fn written_entry_reads_back() {
        let dir = TempDir::new().unwrap();
        let ledger_path = dir.path().join("ledger");
        let ledger_path = ledger_path.to_str().unwrap();

        let first = write_entry(ledger_path, &record()).await.unwrap();
        let second = write_entry(ledger_path, &record()).await.unwrap();
        assert_ne!(first, second);

        assert_eq!(read_entry(ledger_path, &first).await.unwrap(), record());
    }
}
