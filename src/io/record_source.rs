//! ダッシュボードへのレコード供給元

use super::ndjson::{parse_json_file, parse_ndjson_file, RecordSourceError};
use crate::models::CallRecord;
use std::path::{Path, PathBuf};
use tracing::info;

/// 通話レコードの供給元
pub trait RecordSource {
    /// 全レコードを読み込み検証する
    fn load(&self) -> Result<Vec<CallRecord>, RecordSourceError>;

    /// ログ用の説明
    fn describe(&self) -> String;
}

impl dyn RecordSource {
    /// 拡張子でローダーを選ぶ（`.ndjson`/`.jsonl` はNDJSON、それ以外はJSON配列）
    pub fn from_path(path: impl Into<PathBuf>) -> Box<dyn RecordSource> {
        let path = path.into();
        let is_ndjson = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "ndjson" | "jsonl"))
            .unwrap_or(false);

        if is_ndjson {
            Box::new(NdjsonFileSource::new(path))
        } else {
            Box::new(JsonFileSource::new(path))
        }
    }
}

/// 1行1レコードのNDJSONファイル
#[derive(Debug, Clone)]
pub struct NdjsonFileSource {
    path: PathBuf,
}

impl NdjsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for NdjsonFileSource {
    fn load(&self) -> Result<Vec<CallRecord>, RecordSourceError> {
        let records = parse_ndjson_file(&self.path)?;
        info!(path = %self.path.display(), records = records.len(), "Loaded NDJSON records");
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("ndjson:{}", self.path.display())
    }
}

/// レコードのJSON配列ファイル
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonFileSource {
    fn load(&self) -> Result<Vec<CallRecord>, RecordSourceError> {
        let records = parse_json_file(&self.path)?;
        info!(path = %self.path.display(), records = records.len(), "Loaded JSON records");
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

/// メモリ上のレコード
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<CallRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<CallRecord>) -> Self {
        Self { records }
    }
}

impl RecordSource for InMemorySource {
    fn load(&self) -> Result<Vec<CallRecord>, RecordSourceError> {
        if self.records.is_empty() {
            return Err(RecordSourceError::no_data("in-memory source"));
        }
        for (index, record) in self.records.iter().enumerate() {
            record
                .validate()
                .map_err(|source| RecordSourceError::InvalidRecord {
                    position: index + 1,
                    source,
                })?;
        }
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("memory:{} records", self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordBuilder;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn record_json(call_id: &str) -> String {
        serde_json::to_string(&RecordBuilder::new(call_id).build()).unwrap()
    }

    #[test]
    fn test_from_path_picks_loader_by_extension() {
        let dir = TempDir::new().unwrap();
        let ndjson = write_file(
            &dir,
            "calls.ndjson",
            &format!("{}\n{}\n", record_json("1"), record_json("2")),
        );
        let jsonl = write_file(&dir, "calls.JSONL", &format!("{}\n", record_json("3")));
        let json = write_file(
            &dir,
            "calls.json",
            &format!("[{},{}]", record_json("4"), record_json("5")),
        );

        let source = <dyn RecordSource>::from_path(&ndjson);
        assert!(source.describe().starts_with("ndjson:"));
        assert_eq!(source.load().unwrap().len(), 2);

        let source = <dyn RecordSource>::from_path(&jsonl);
        assert!(source.describe().starts_with("ndjson:"));
        assert_eq!(source.load().unwrap()[0].call_id, "3");

        let source = <dyn RecordSource>::from_path(&json);
        assert!(source.describe().starts_with("json:"));
        assert_eq!(source.load().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_file_is_no_data() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "empty.ndjson", "");
        let err = NdjsonFileSource::new(path).load().unwrap_err();
        assert!(matches!(err, RecordSourceError::NoData { .. }));
    }

    #[test]
    fn test_in_memory_source_validates() {
        let source = InMemorySource::new(vec![RecordBuilder::new("1").build()]);
        assert_eq!(source.load().unwrap().len(), 1);
        assert_eq!(source.describe(), "memory:1 records");

        let source = InMemorySource::new(vec![
            RecordBuilder::new("1").build(),
            RecordBuilder::new("2").duration(-1.0).build(),
        ]);
        assert!(matches!(
            source.load(),
            Err(RecordSourceError::InvalidRecord { position: 2, .. })
        ));

        assert!(matches!(
            InMemorySource::default().load(),
            Err(RecordSourceError::NoData { .. })
        ));
    }
}
