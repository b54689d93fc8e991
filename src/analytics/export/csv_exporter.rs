use super::{limit_tables, ExportConfig, ExportError, ExportTable, FormatHandler};
use crate::dashboard::DashboardSnapshot;

/// CSV形式エクスポーター
pub struct CsvExporter {
    delimiter: char,
    include_headers: bool,
}

impl CsvExporter {
    pub fn new() -> Self {
        Self {
            delimiter: ',',
            include_headers: true,
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_headers(mut self, include_headers: bool) -> Self {
        self.include_headers = include_headers;
        self
    }

    /// CSVフィールドをエスケープ
    fn escape_csv_field(&self, field: &str) -> String {
        if field.contains(self.delimiter)
            || field.contains('"')
            || field.contains('\n')
            || field.contains('\r')
        {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn join_row(&self, fields: Vec<String>) -> String {
        fields
            .iter()
            .map(|f| self.escape_csv_field(f))
            .collect::<Vec<_>>()
            .join(&self.delimiter.to_string())
    }

    /// CSVヘッダーを生成
    fn generate_headers(&self, table: ExportTable) -> String {
        let headers: &[&str] = match table {
            ExportTable::HighRiskCalls => &[
                "call_id",
                "customer_id",
                "agent_id",
                "agent_name",
                "timestamp",
                "outcome",
                "sentiment",
                "churn_risk",
                "policy_type",
                "customer_segment",
                "topics",
            ],
            ExportTable::AgentPerformance => &[
                "agent_id",
                "agent_name",
                "total_calls",
                "resolved_calls",
                "escalated_calls",
                "resolution_rate",
                "escalation_rate",
                "avg_sentiment_score",
                "avg_churn_risk",
                "avg_duration",
                "performance",
            ],
            ExportTable::TrainingRecommendations => {
                &["agent_id", "agent_name", "priority", "area", "reason"]
            }
        };

        headers.join(&self.delimiter.to_string())
    }

    /// 表の各行を生成
    fn table_rows(&self, snapshot: &DashboardSnapshot, table: ExportTable) -> Vec<String> {
        match table {
            ExportTable::HighRiskCalls => snapshot
                .high_risk_calls
                .iter()
                .map(|call| {
                    self.join_row(vec![
                        call.call_id.clone(),
                        call.customer_id.clone(),
                        call.agent_id.clone(),
                        call.agent_name.clone(),
                        call.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                        call.outcome.to_string(),
                        call.sentiment.to_string(),
                        format!("{:.2}", call.churn_risk),
                        call.policy_type.to_string(),
                        call.customer_segment.to_string(),
                        call.topics.join("|"),
                    ])
                })
                .collect(),
            ExportTable::AgentPerformance => snapshot
                .agent_performance
                .iter()
                .map(|agent| {
                    self.join_row(vec![
                        agent.agent_id.clone(),
                        agent.agent_name.clone(),
                        agent.total_calls.to_string(),
                        agent.resolved_calls.to_string(),
                        agent.escalated_calls.to_string(),
                        format!("{:.1}", agent.resolution_rate),
                        format!("{:.1}", agent.escalation_rate),
                        format!("{:.2}", agent.average_sentiment_score),
                        format!("{:.2}", agent.average_churn_risk),
                        format!("{:.1}", agent.average_duration),
                        agent.band.to_string(),
                    ])
                })
                .collect(),
            ExportTable::TrainingRecommendations => snapshot
                .training_recommendations
                .iter()
                .flat_map(|agent| {
                    agent.recommendations.iter().map(move |rec| {
                        self.join_row(vec![
                            agent.agent_id.clone(),
                            agent.agent_name.clone(),
                            rec.priority.to_string(),
                            rec.area.clone(),
                            rec.reason.clone(),
                        ])
                    })
                })
                .collect(),
        }
    }

    /// メタデータセクションを生成
    fn generate_metadata_section(&self, snapshot: &DashboardSnapshot) -> String {
        let metadata = &snapshot.metadata;
        let filters = &metadata.filters;
        let d = self.delimiter;

        let lines = [
            "# Metadata".to_string(),
            format!(
                "# Generated At{d}{}",
                metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            format!("# Total Records{d}{}", metadata.total_records),
            format!("# Filtered Records{d}{}", metadata.filtered_records),
            format!("# Date Range{d}{}", filters.date_range),
            format!("# Agent{d}{}", filters.agent),
            format!("# Policy Type{d}{}", filters.policy_type),
            format!("# Sentiment{d}{}", filters.sentiment),
            format!("# Outcome{d}{}", filters.outcome),
            format!("# Segment{d}{}", filters.segment),
            String::new(), // 空行
        ];

        lines.join("\n")
    }
}

impl FormatHandler for CsvExporter {
    fn export(
        &self,
        snapshot: &DashboardSnapshot,
        config: &ExportConfig,
    ) -> Result<Vec<u8>, ExportError> {
        let limited = limit_tables(snapshot, config);
        let mut csv_content = Vec::new();

        // メタデータセクション（オプション）
        if config.include_metadata {
            let metadata_section = self.generate_metadata_section(&limited);
            csv_content.extend_from_slice(metadata_section.as_bytes());
            csv_content.push(b'\n');
        }

        // ヘッダー行
        if self.include_headers {
            csv_content.extend_from_slice(self.generate_headers(config.table).as_bytes());
            csv_content.push(b'\n');
        }

        // データ行
        let mut rows = self.table_rows(&limited, config.table);
        if let Some(max_records) = config.max_records {
            rows.truncate(max_records);
        }
        for row in rows {
            csv_content.extend_from_slice(row.as_bytes());
            csv_content.push(b'\n');
        }

        Ok(csv_content)
    }

    fn file_extension(&self) -> &str {
        "csv"
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}
