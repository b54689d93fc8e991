use crate::dashboard::{DashboardPage, DashboardSnapshot};
use crate::models::ParseEnumError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

pub mod csv_exporter;
pub mod json_exporter;

pub use csv_exporter::CsvExporter;
pub use json_exporter::JsonExporter;

/// エクスポート形式
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[display("csv")]
    Csv,
    #[display("json")]
    Json,
}

impl ExportFormat {
    pub fn file_extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ParseEnumError {
                kind: "export format",
                value: s.to_string(),
            }),
        }
    }
}

/// CSVで出力する表
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum ExportTable {
    #[display("high-risk")]
    HighRiskCalls,
    #[display("agents")]
    AgentPerformance,
    #[display("recommendations")]
    TrainingRecommendations,
}

impl FromStr for ExportTable {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high-risk" | "high-risk-calls" => Ok(ExportTable::HighRiskCalls),
            "agents" | "agent-performance" => Ok(ExportTable::AgentPerformance),
            "recommendations" | "training-recommendations" => {
                Ok(ExportTable::TrainingRecommendations)
            }
            _ => Err(ParseEnumError {
                kind: "export table",
                value: s.to_string(),
            }),
        }
    }
}

/// エクスポートエラー
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: ExportFormat },

    #[error("Invalid config: {message}")]
    InvalidConfig { message: String },
}

/// エクスポート設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    pub format: ExportFormat,
    /// CSVの出力対象
    pub table: ExportTable,
    /// JSONで1ページ分だけ出力する場合
    pub page: Option<DashboardPage>,
    pub include_metadata: bool,
    pub max_records: Option<usize>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Json,
            table: ExportTable::HighRiskCalls,
            page: None,
            include_metadata: true,
            max_records: None,
        }
    }
}

/// フォーマットハンドラートレイト
pub trait FormatHandler: Send + Sync {
    fn export(
        &self,
        snapshot: &DashboardSnapshot,
        config: &ExportConfig,
    ) -> Result<Vec<u8>, ExportError>;
    fn file_extension(&self) -> &str;
}

/// 表データを最大件数に切り詰めたスナップショット
pub(crate) fn limit_tables(snapshot: &DashboardSnapshot, config: &ExportConfig) -> DashboardSnapshot {
    let mut limited = snapshot.clone();
    if let Some(max_records) = config.max_records {
        limited.high_risk_calls.truncate(max_records);
        limited.agent_performance.truncate(max_records);
        limited.training_recommendations.truncate(max_records);
    }
    limited
}

/// エクスポートマネージャー
pub struct ExportManager {
    format_handlers: HashMap<ExportFormat, Box<dyn FormatHandler>>,
}

impl ExportManager {
    /// 新しいエクスポートマネージャーを作成
    pub fn new() -> Self {
        let mut manager = Self {
            format_handlers: HashMap::new(),
        };

        // デフォルトハンドラーを登録
        manager.register_handler(ExportFormat::Csv, Box::new(CsvExporter::new()));
        manager.register_handler(ExportFormat::Json, Box::new(JsonExporter::new()));

        manager
    }

    /// フォーマットハンドラーを登録
    pub fn register_handler(&mut self, format: ExportFormat, handler: Box<dyn FormatHandler>) {
        self.format_handlers.insert(format, handler);
    }

    /// スナップショットをエクスポート
    pub fn export(
        &self,
        snapshot: &DashboardSnapshot,
        config: &ExportConfig,
    ) -> Result<Vec<u8>, ExportError> {
        self.validate_config(config)?;
        let handler = self
            .format_handlers
            .get(&config.format)
            .ok_or(ExportError::UnsupportedFormat {
                format: config.format,
            })?;

        let bytes = handler.export(snapshot, config)?;
        tracing::debug!(
            format = %config.format,
            bytes = bytes.len(),
            "Snapshot exported"
        );
        Ok(bytes)
    }

    /// サポートされている形式を取得
    pub fn supported_formats(&self) -> Vec<ExportFormat> {
        self.format_handlers.keys().copied().collect()
    }

    /// 設定の妥当性を検証
    pub fn validate_config(&self, config: &ExportConfig) -> Result<(), ExportError> {
        if !self.format_handlers.contains_key(&config.format) {
            return Err(ExportError::UnsupportedFormat {
                format: config.format,
            });
        }

        if config.max_records == Some(0) {
            return Err(ExportError::InvalidConfig {
                message: "max_records must be greater than 0".to_string(),
            });
        }

        // ページ単位の出力はJSONのみ
        if let (ExportFormat::Csv, Some(page)) = (config.format, config.page) {
            return Err(ExportError::InvalidConfig {
                message: format!("page '{page}' can only be exported as json; use --table for csv"),
            });
        }

        Ok(())
    }
}

impl Default for ExportManager {
    fn default() -> Self {
        Self::new()
    }
}
