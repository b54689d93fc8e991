use super::{limit_tables, ExportConfig, ExportError, FormatHandler};
use crate::dashboard::DashboardSnapshot;

/// JSON形式エクスポーター
pub struct JsonExporter {
    pretty_print: bool,
}

impl JsonExporter {
    pub fn new() -> Self {
        Self { pretty_print: true }
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// 出力するJSON値を組み立てる
    fn build_value(
        &self,
        snapshot: &DashboardSnapshot,
        config: &ExportConfig,
    ) -> Result<serde_json::Value, ExportError> {
        let limited = limit_tables(snapshot, config);
        let mut json = match config.page {
            Some(page) => {
                let mut view = serde_json::to_value(limited.page_view(page))
                    .map_err(|e| ExportError::Serialization(e.to_string()))?;
                if config.include_metadata {
                    if let serde_json::Value::Object(ref mut map) = view {
                        let metadata = serde_json::to_value(&limited.metadata)
                            .map_err(|e| ExportError::Serialization(e.to_string()))?;
                        map.insert("metadata".to_string(), metadata);
                    }
                }
                view
            }
            None => serde_json::to_value(&limited)
                .map_err(|e| ExportError::Serialization(e.to_string()))?,
        };

        // メタデータを除外する場合
        if !config.include_metadata {
            if let serde_json::Value::Object(ref mut map) = json {
                map.remove("metadata");
            }
        }

        Ok(json)
    }
}

impl FormatHandler for JsonExporter {
    fn export(
        &self,
        snapshot: &DashboardSnapshot,
        config: &ExportConfig,
    ) -> Result<Vec<u8>, ExportError> {
        let json_value = self.build_value(snapshot, config)?;

        let json_bytes = if self.pretty_print {
            serde_json::to_vec_pretty(&json_value)
        } else {
            serde_json::to_vec(&json_value)
        }
        .map_err(|e| ExportError::Serialization(e.to_string()))?;

        Ok(json_bytes)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self::new()
    }
}
