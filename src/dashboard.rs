//! ダッシュボードの構成ルート
//!
//! `DashboardService` が不変のレコード集合と現在のフィルター値を保持し、
//! 各集計関数へ同じフィルター結果を渡します。集計は毎回ゼロから再計算されます。

use crate::analytics::{
    agent_performance, churn_trend, duration_scatter, emotion_outcome_heatmap, escalation_trend,
    high_risk_calls, kpi_summary, negative_topics, overview_stats, retention_actions,
    sentiment_by_policy, tracked_agents, training_needs_matrix, training_recommendations,
    AgentPerformance, AgentRecommendations, ChurnTrendPoint, DurationScatter, EmotionHeatmap,
    EscalationTrend, KpiSummary, OverviewStats, PolicySentimentBreakdown, RetentionActions, RetentionSuggestion, TopicCount,
    TrainingMatrixRow,
};
use crate::filtering::{apply_filters, Filters};
use crate::models::{agent_directory, AgentInfo, CallRecord, ParseEnumError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info};

/// ダッシュボードのページ
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum DashboardPage {
    #[display("overview")]
    Overview,
    #[display("customer-analytics")]
    CustomerAnalytics,
    #[display("agent-performance")]
    AgentPerformance,
    #[display("operations")]
    Operations,
}

impl DashboardPage {
    pub const ALL: [DashboardPage; 4] = [
        DashboardPage::Overview,
        DashboardPage::CustomerAnalytics,
        DashboardPage::AgentPerformance,
        DashboardPage::Operations,
    ];

    /// ナビゲーション表示名
    pub fn title(&self) -> &'static str {
        match self {
            DashboardPage::Overview => "Overview",
            DashboardPage::CustomerAnalytics => "Customer Analytics",
            DashboardPage::AgentPerformance => "Agent Performance",
            DashboardPage::Operations => "Operations",
        }
    }
}

impl FromStr for DashboardPage {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase().replace('_', "-");
        DashboardPage::ALL
            .into_iter()
            .find(|page| page.to_string() == normalized)
            .ok_or_else(|| ParseEnumError {
                kind: "dashboard page",
                value: s.to_string(),
            })
    }
}

/// スナップショットのメタデータ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotMetadata {
    pub generated_at: DateTime<Utc>,
    pub filters: Filters,
    pub total_records: usize,
    pub filtered_records: usize,
    pub active_filters: usize,
}

/// 全ページの集計結果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSnapshot {
    pub metadata: SnapshotMetadata,
    pub kpi: KpiSummary,
    pub overview_stats: OverviewStats,
    pub sentiment_by_policy: Vec<PolicySentimentBreakdown>,
    pub churn_trend: Vec<ChurnTrendPoint>,
    pub escalation_trend: EscalationTrend,
    pub negative_topics: Vec<TopicCount>,
    pub emotion_heatmap: EmotionHeatmap,
    pub high_risk_calls: Vec<CallRecord>,
    pub agent_performance: Vec<AgentPerformance>,
    pub training_matrix: Vec<TrainingMatrixRow>,
    pub training_recommendations: Vec<AgentRecommendations>,
    pub retention_actions: RetentionActions,
    pub duration_scatter: DurationScatter,
}

impl DashboardSnapshot {
    /// 1ページ分のビューを取り出す
    pub fn page_view(&self, page: DashboardPage) -> PageView {
        match page {
            DashboardPage::Overview => PageView::Overview {
                kpi: self.kpi.clone(),
                quick_stats: self.overview_stats.clone(),
                sentiment_by_policy: self.sentiment_by_policy.clone(),
                negative_topics: self.negative_topics.clone(),
                retention_actions: self.retention_actions.suggestions(),
            },
            DashboardPage::CustomerAnalytics => PageView::CustomerAnalytics {
                sentiment_by_policy: self.sentiment_by_policy.clone(),
                churn_trend: self.churn_trend.clone(),
                negative_topics: self.negative_topics.clone(),
                emotion_heatmap: self.emotion_heatmap.clone(),
                high_risk_calls: self.high_risk_calls.clone(),
            },
            DashboardPage::AgentPerformance => PageView::AgentPerformance {
                training_recommendations: self.training_recommendations.clone(),
                training_matrix: self.training_matrix.clone(),
                agent_performance: self.agent_performance.clone(),
            },
            DashboardPage::Operations => PageView::Operations {
                escalation_trend: self.escalation_trend.clone(),
                duration_scatter: self.duration_scatter.clone(),
            },
        }
    }
}

/// ページ単位のビュー
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "page", rename_all = "kebab-case")]
pub enum PageView {
    Overview {
        kpi: KpiSummary,
        quick_stats: OverviewStats,
        sentiment_by_policy: Vec<PolicySentimentBreakdown>,
        negative_topics: Vec<TopicCount>,
        retention_actions: Vec<RetentionSuggestion>,
    },
    CustomerAnalytics {
        sentiment_by_policy: Vec<PolicySentimentBreakdown>,
        churn_trend: Vec<ChurnTrendPoint>,
        negative_topics: Vec<TopicCount>,
        emotion_heatmap: EmotionHeatmap,
        high_risk_calls: Vec<CallRecord>,
    },
    AgentPerformance {
        training_recommendations: Vec<AgentRecommendations>,
        training_matrix: Vec<TrainingMatrixRow>,
        agent_performance: Vec<AgentPerformance>,
    },
    Operations {
        escalation_trend: EscalationTrend,
        duration_scatter: DurationScatter,
    },
}

impl PageView {
    pub fn page(&self) -> DashboardPage {
        match self {
            PageView::Overview { .. } => DashboardPage::Overview,
            PageView::CustomerAnalytics { .. } => DashboardPage::CustomerAnalytics,
            PageView::AgentPerformance { .. } => DashboardPage::AgentPerformance,
            PageView::Operations { .. } => DashboardPage::Operations,
        }
    }
}

/// ダッシュボードサービス
#[derive(Debug, Clone)]
pub struct DashboardService {
    records: Vec<CallRecord>,
    filters: Filters,
}

impl DashboardService {
    pub fn new(records: Vec<CallRecord>) -> Self {
        info!(records = records.len(), "Dashboard initialized");
        Self {
            records,
            filters: Filters::default(),
        }
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn records(&self) -> &[CallRecord] {
        &self.records
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// フィルター値を差し替える
    pub fn set_filters(&mut self, filters: Filters) {
        debug!(
            active = filters.active_filter_count(),
            "Filters updated"
        );
        self.filters = filters;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// フィルター選択肢用のエージェント一覧（未フィルターの全レコードから）
    pub fn agents(&self) -> Vec<AgentInfo> {
        agent_directory(&self.records)
    }

    /// 現在のフィルターを適用したレコード
    pub fn filtered(&self, now: DateTime<Utc>) -> Vec<CallRecord> {
        apply_filters(&self.records, &self.filters, now)
    }

    fn metadata(&self, filtered: usize, now: DateTime<Utc>) -> SnapshotMetadata {
        SnapshotMetadata {
            generated_at: now,
            filters: self.filters.clone(),
            total_records: self.records.len(),
            filtered_records: filtered,
            active_filters: self.filters.active_filter_count(),
        }
    }

    /// 全ビューを計算
    pub fn snapshot(&self, now: DateTime<Utc>) -> DashboardSnapshot {
        let filtered = self.filtered(now);
        let today = now.date_naive();
        let retention = retention_actions(&filtered);

        debug!(
            total = self.records.len(),
            filtered = filtered.len(),
            "Computing dashboard snapshot"
        );

        DashboardSnapshot {
            metadata: self.metadata(filtered.len(), now),
            kpi: kpi_summary(&filtered),
            overview_stats: overview_stats(&filtered),
            sentiment_by_policy: sentiment_by_policy(&filtered),
            churn_trend: churn_trend(&filtered, today),
            escalation_trend: escalation_trend(&filtered, &tracked_agents(&self.records), today),
            negative_topics: negative_topics(&filtered),
            emotion_heatmap: emotion_outcome_heatmap(&filtered),
            high_risk_calls: high_risk_calls(&filtered),
            agent_performance: agent_performance(&filtered),
            training_matrix: training_needs_matrix(&filtered),
            training_recommendations: training_recommendations(&filtered),
            retention_actions: retention,
            duration_scatter: duration_scatter(&filtered),
        }
    }

    /// 指定ページに必要なビューだけを計算
    pub fn page_view(&self, page: DashboardPage, now: DateTime<Utc>) -> PageView {
        let filtered = self.filtered(now);
        let today = now.date_naive();
        debug!(%page, filtered = filtered.len(), "Computing page view");

        match page {
            DashboardPage::Overview => PageView::Overview {
                kpi: kpi_summary(&filtered),
                quick_stats: overview_stats(&filtered),
                sentiment_by_policy: sentiment_by_policy(&filtered),
                negative_topics: negative_topics(&filtered),
                retention_actions: retention_actions(&filtered).suggestions(),
            },
            DashboardPage::CustomerAnalytics => PageView::CustomerAnalytics {
                sentiment_by_policy: sentiment_by_policy(&filtered),
                churn_trend: churn_trend(&filtered, today),
                negative_topics: negative_topics(&filtered),
                emotion_heatmap: emotion_outcome_heatmap(&filtered),
                high_risk_calls: high_risk_calls(&filtered),
            },
            DashboardPage::AgentPerformance => PageView::AgentPerformance {
                training_recommendations: training_recommendations(&filtered),
                training_matrix: training_needs_matrix(&filtered),
                agent_performance: agent_performance(&filtered),
            },
            DashboardPage::Operations => PageView::Operations {
                escalation_trend: escalation_trend(
                    &filtered,
                    &tracked_agents(&self.records),
                    today,
                ),
                duration_scatter: duration_scatter(&filtered),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::Selection;
    use crate::models::{Outcome, Sentiment};
    use crate::test_support::{fixed_now, RecordBuilder};

    fn sample_records() -> Vec<CallRecord> {
        vec![
            RecordBuilder::new("1")
                .agent("A001", "Sarah Johnson")
                .churn_risk(0.8)
                .outcome(Outcome::Escalated)
                .sentiment(Sentiment::Negative)
                .build(),
            RecordBuilder::new("2")
                .agent("A002", "Mike Chen")
                .churn_risk(0.2)
                .build(),
            RecordBuilder::new("3")
                .agent("A001", "Sarah Johnson")
                .churn_risk(0.4)
                .build(),
        ]
    }

    #[test]
    fn test_snapshot_uses_current_filters() {
        let mut service = DashboardService::new(sample_records());
        let now = fixed_now();

        let snapshot = service.snapshot(now);
        assert_eq!(snapshot.metadata.total_records, 3);
        assert_eq!(snapshot.metadata.filtered_records, 3);
        assert_eq!(snapshot.kpi.total_calls, 3);
        assert_eq!(snapshot.high_risk_calls.len(), 1);
        assert_eq!(snapshot.agent_performance.len(), 2);

        service.set_filters(Filters::new().with_agent("A002"));
        let snapshot = service.snapshot(now);
        assert_eq!(snapshot.metadata.filtered_records, 1);
        assert_eq!(snapshot.metadata.active_filters, 1);
        assert_eq!(snapshot.agent_performance.len(), 1);
        assert_eq!(snapshot.agent_performance[0].agent_id, "A002");
        assert!(snapshot.high_risk_calls.is_empty());

        // 選択肢は未フィルターのまま
        assert_eq!(service.agents().len(), 2);

        service.clear_filters();
        assert_eq!(service.filtered(now).len(), 3);
    }

    #[test]
    fn test_page_view_matches_snapshot() {
        let service = DashboardService::new(sample_records());
        let now = fixed_now();
        let snapshot = service.snapshot(now);

        for page in DashboardPage::ALL {
            let view = service.page_view(page, now);
            assert_eq!(view.page(), page);
            assert_eq!(view, snapshot.page_view(page));
        }
    }

    #[test]
    fn test_empty_filter_result() {
        let service = DashboardService::new(sample_records())
            .with_filters(Filters {
                policy_type: Selection::parse("auto"),
                ..Filters::default()
            });
        let snapshot = service.snapshot(fixed_now());

        assert_eq!(snapshot.metadata.filtered_records, 0);
        assert_eq!(snapshot.kpi.resolution_rate, 0.0);
        assert!(snapshot.agent_performance.is_empty());
        assert_eq!(snapshot.churn_trend.len(), 7);
    }

    #[test]
    fn test_escalation_trend_keeps_agents_under_agent_filter() {
        let now = fixed_now();
        let records: Vec<CallRecord> = ["A001", "A002", "A003", "A004"]
            .iter()
            .map(|id| {
                RecordBuilder::new(&format!("call-{id}"))
                    .agent(id, &format!("Agent {id}"))
                    .outcome(Outcome::Escalated)
                    .timestamp(now)
                    .build()
            })
            .collect();
        let service =
            DashboardService::new(records).with_filters(Filters::new().with_agent("A003"));

        let snapshot = service.snapshot(now);
        let ids: Vec<&str> = snapshot
            .escalation_trend
            .agents
            .iter()
            .map(|a| a.agent_id.as_str())
            .collect();
        assert_eq!(ids, vec!["A001", "A002", "A003", "A004"]);
        assert_eq!(snapshot.escalation_trend.points[6].escalations, vec![0, 0, 1, 0]);
        assert_eq!(
            service.page_view(DashboardPage::Operations, now),
            snapshot.page_view(DashboardPage::Operations)
        );
    }

    #[test]
    fn test_overview_includes_quick_stats() {
        let service = DashboardService::new(sample_records());
        match service.page_view(DashboardPage::Overview, fixed_now()) {
            PageView::Overview { quick_stats, .. } => {
                assert_eq!(quick_stats.total_calls, 3);
                assert_eq!(quick_stats.resolution_rate, 66.7);
                assert_eq!(quick_stats.average_churn_risk, 46.7);
            }
            other => panic!("unexpected view: {:?}", other.page()),
        }
    }

    #[test]
    fn test_page_parsing() {
        assert_eq!(
            "customer-analytics".parse::<DashboardPage>(),
            Ok(DashboardPage::CustomerAnalytics)
        );
        assert_eq!(
            "Agent_Performance".parse::<DashboardPage>(),
            Ok(DashboardPage::AgentPerformance)
        );
        assert!("reports".parse::<DashboardPage>().is_err());
        assert_eq!(DashboardPage::Operations.title(), "Operations");
    }

    #[test]
    fn test_page_view_serializes_with_tag() {
        let service = DashboardService::new(sample_records());
        let view = service.page_view(DashboardPage::Operations, fixed_now());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["page"], "operations");
        assert!(json.get("duration_scatter").is_some());
    }
}
