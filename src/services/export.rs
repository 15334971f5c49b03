use chrono::SecondsFormat;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{
    fs::{self, OpenOptions},
    io::AsyncWriteExt,
    sync::Mutex,
};

use crate::{
    error::AppResult,
    models::{EvalRecord, RelevanceRecord},
};

pub const RELEVANCE_HEADER: &str = "userId,model,tripId,value,receivedAt";
pub const EVAL_HEADER: &str = "userId,model,tripId,kind,receivedAt";

/// A record that serializes to one CSV row
pub trait CsvRow {
    fn fields(&self) -> Vec<String>;

    fn to_csv_row(&self) -> String {
        self.fields()
            .iter()
            .map(|field| csv_escape(field))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl CsvRow for RelevanceRecord {
    fn fields(&self) -> Vec<String> {
        vec![
            self.user_id.clone(),
            self.model.clone(),
            self.trip_id.clone(),
            self.value.to_string(),
            self.received_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        ]
    }
}

impl CsvRow for EvalRecord {
    fn fields(&self) -> Vec<String> {
        vec![
            self.user_id.clone(),
            self.model.clone(),
            self.trip_id.clone(),
            self.kind.to_string(),
            self.received_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        ]
    }
}

/// Quotes every field and doubles embedded quotes
pub fn csv_escape(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Maps a user id onto `[A-Za-z0-9_.-]`, replacing anything else with `_`
pub fn sanitize_user_id(user_id: &str) -> String {
    user_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Append-only per-user feedback logs
///
/// Clones share one write lock, so appends from concurrent requests never
/// interleave.
#[derive(Debug, Clone)]
pub struct FeedbackLog {
    dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FeedbackLog {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn relevance_path(&self, user_id: &str) -> PathBuf {
        self.dir
            .join(format!("relevance-user-{}.csv", sanitize_user_id(user_id)))
    }

    pub fn eval_path(&self, user_id: &str) -> PathBuf {
        self.dir
            .join(format!("eval-user-{}.csv", sanitize_user_id(user_id)))
    }

    /// Appends relevance rows, creating the file with its header first
    ///
    /// The file exists afterwards even when `records` is empty.
    pub async fn append_relevance(
        &self,
        user_id: &str,
        records: &[RelevanceRecord],
    ) -> AppResult<PathBuf> {
        let path = self.relevance_path(user_id);
        let _guard = self.write_lock.lock().await;
        append_rows(&path, RELEVANCE_HEADER, records).await?;
        Ok(path)
    }

    /// Appends eval rows; no file is touched when there are none
    pub async fn append_eval(
        &self,
        user_id: &str,
        records: &[EvalRecord],
    ) -> AppResult<Option<PathBuf>> {
        if records.is_empty() {
            return Ok(None);
        }

        let path = self.eval_path(user_id);
        let _guard = self.write_lock.lock().await;
        append_rows(&path, EVAL_HEADER, records).await?;
        Ok(Some(path))
    }
}

async fn append_rows<T: CsvRow>(path: &Path, header: &str, records: &[T]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut rows = String::new();
    for record in records {
        rows.push_str(&record.to_csv_row());
        rows.push('\n');
    }

    // Whoever creates the file writes header and rows in one call
    match OpenOptions::new().append(true).create_new(true).open(path).await {
        Ok(mut file) => {
            let chunk = format!("{}\n{}", header, rows);
            file.write_all(chunk.as_bytes()).await?;
            return file.flush().await;
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
        Err(e) => return Err(e),
    }

    if rows.is_empty() {
        return Ok(());
    }

    let mut file = OpenOptions::new().append(true).open(path).await?;
    file.write_all(rows.as_bytes()).await?;
    file.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EvalKind;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn relevance(user_id: &str, trip_id: &str, value: u8) -> RelevanceRecord {
        RelevanceRecord {
            user_id: user_id.to_string(),
            model: "cf".to_string(),
            trip_id: trip_id.to_string(),
            value,
            received_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "\"plain\"");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape(""), "\"\"");
    }

    #[test]
    fn test_sanitize_user_id() {
        assert_eq!(sanitize_user_id("abc-123_x.y"), "abc-123_x.y");
        assert_eq!(sanitize_user_id("../etc/passwd"), ".._etc_passwd");
        assert_eq!(sanitize_user_id("a b@c"), "a_b_c");
        assert_eq!(sanitize_user_id("ü"), "_");
    }

    #[test]
    fn test_rows_use_millisecond_utc_timestamps() {
        let row = relevance("u1", "t1", 1).to_csv_row();
        assert_eq!(row, "\"u1\",\"cf\",\"t1\",\"1\",\"2025-03-01T12:30:00.000Z\"");

        let eval = EvalRecord {
            user_id: "u1".to_string(),
            model: "cf".to_string(),
            trip_id: "t1".to_string(),
            kind: EvalKind::Candidate,
            received_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap(),
        };
        assert!(eval.to_csv_row().contains("\"candidate\""));
    }

    #[tokio::test]
    async fn test_header_written_once_across_appends() {
        let dir = TempDir::new().unwrap();
        let log = FeedbackLog::new(dir.path().join("exports"));

        log.append_relevance("u1", &[relevance("u1", "t1", 1)]).await.unwrap();
        let path = log
            .append_relevance("u1", &[relevance("u1", "t2", 0), relevance("u1", "t3", 1)])
            .await
            .unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], RELEVANCE_HEADER);
        assert_eq!(contents.matches(RELEVANCE_HEADER).count(), 1);
        assert!(lines[3].contains("\"t3\""));
    }

    #[tokio::test]
    async fn test_concurrent_appends_keep_header_first() {
        let dir = TempDir::new().unwrap();
        let log = FeedbackLog::new(dir.path());

        for round in 0..20 {
            let user_id = format!("u{}", round);
            let first = [relevance(&user_id, "t1", 1), relevance(&user_id, "t2", 0)];
            let second = [relevance(&user_id, "t3", 1)];
            let (a, b) = tokio::join!(
                log.append_relevance(&user_id, &first),
                log.append_relevance(&user_id, &second)
            );
            a.unwrap();
            let path = b.unwrap();

            let contents = std::fs::read_to_string(path).unwrap();
            let lines: Vec<&str> = contents.lines().collect();
            assert_eq!(lines.len(), 4);
            assert_eq!(lines[0], RELEVANCE_HEADER);
            assert_eq!(contents.matches(RELEVANCE_HEADER).count(), 1);
        }
    }

    #[tokio::test]
    async fn test_first_append_writes_header_then_rows() {
        let dir = TempDir::new().unwrap();
        let log = FeedbackLog::new(dir.path());
        let record = relevance("u1", "t1", 1);

        let path = log.append_relevance("u1", &[record.clone()]).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            format!("{}\n{}\n", RELEVANCE_HEADER, record.to_csv_row())
        );
    }

    #[tokio::test]
    async fn test_relevance_file_created_even_without_rows() {
        let dir = TempDir::new().unwrap();
        let log = FeedbackLog::new(dir.path());

        let path = log.append_relevance("u 1", &[]).await.unwrap();
        assert!(path.ends_with("relevance-user-u_1.csv"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), format!("{}\n", RELEVANCE_HEADER));
    }

    #[tokio::test]
    async fn test_eval_file_skipped_without_rows() {
        let dir = TempDir::new().unwrap();
        let log = FeedbackLog::new(dir.path());

        assert_eq!(log.append_eval("u1", &[]).await.unwrap(), None);
        assert!(!log.eval_path("u1").exists());
    }
}
