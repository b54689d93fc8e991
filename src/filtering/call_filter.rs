use super::{DateRange, Selection};
use crate::models::{CallRecord, CustomerSegment, Outcome, PolicyType, Sentiment};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 通話レコードのフィルター設定
///
/// 値オブジェクトとして扱い、変更時は新しい値に差し替える。
/// すべての条件はAND結合。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Filters {
    /// 日付範囲（all/7d/30d/90d）
    pub date_range: DateRange,
    /// エージェントID
    pub agent: Selection<String>,
    /// 保険種別
    pub policy_type: Selection<PolicyType>,
    /// 感情
    pub sentiment: Selection<Sentiment>,
    /// 通話結果
    pub outcome: Selection<Outcome>,
    /// 顧客セグメント
    pub segment: Selection<CustomerSegment>,
}

impl Filters {
    /// すべて "all" のフィルターを作成
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent = Selection::Only(agent_id.into());
        self
    }

    pub fn with_policy_type(mut self, policy_type: PolicyType) -> Self {
        self.policy_type = Selection::Only(policy_type);
        self
    }

    pub fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = Selection::Only(sentiment);
        self
    }

    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Selection::Only(outcome);
        self
    }

    pub fn with_segment(mut self, segment: CustomerSegment) -> Self {
        self.segment = Selection::Only(segment);
        self
    }

    /// すべてのフィルターをクリア
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// レコードがフィルター条件に合致するかチェック
    pub fn matches(&self, record: &CallRecord, now: DateTime<Utc>) -> bool {
        if !self.agent.accepts(&record.agent_id) {
            return false;
        }
        if !self.policy_type.accepts(&record.policy_type) {
            return false;
        }
        if !self.sentiment.accepts(&record.sentiment) {
            return false;
        }
        if !self.outcome.accepts(&record.outcome) {
            return false;
        }
        if !self.segment.accepts(&record.customer_segment) {
            return false;
        }

        // 日付範囲フィルター
        if let Some(cutoff) = self.date_range.cutoff(now) {
            if record.timestamp < cutoff {
                return false;
            }
        }

        true
    }

    /// アクティブなフィルター数を取得
    pub fn active_filter_count(&self) -> usize {
        [
            self.date_range != DateRange::All,
            !self.agent.is_all(),
            !self.policy_type.is_all(),
            !self.sentiment.is_all(),
            !self.outcome.is_all(),
            !self.segment.is_all(),
        ]
        .iter()
        .filter(|active| **active)
        .count()
    }

    /// フィルターが有効かどうか
    pub fn is_active(&self) -> bool {
        self.active_filter_count() > 0
    }
}

/// フィルターを適用してレコードを抽出（元の順序を保持）
pub fn apply_filters(
    records: &[CallRecord],
    filters: &Filters,
    now: DateTime<Utc>,
) -> Vec<CallRecord> {
    let filtered: Vec<CallRecord> = records
        .iter()
        .filter(|record| filters.matches(record, now))
        .cloned()
        .collect();

    debug!(
        total = records.len(),
        matched = filtered.len(),
        active_filters = filters.active_filter_count(),
        "🔍 Filters applied"
    );

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixed_now, RecordBuilder};
    use chrono::Duration;

    fn sample_records() -> Vec<CallRecord> {
        let now = fixed_now();
        vec![
            RecordBuilder::new("1")
                .agent("A001", "Sarah Johnson")
                .sentiment(Sentiment::Positive)
                .timestamp(now - Duration::days(2))
                .build(),
            RecordBuilder::new("2")
                .agent("A002", "Mike Chen")
                .sentiment(Sentiment::Negative)
                .outcome(Outcome::Escalated)
                .policy(PolicyType::Home)
                .timestamp(now - Duration::days(10))
                .build(),
            RecordBuilder::new("3")
                .agent("A001", "Sarah Johnson")
                .segment(CustomerSegment::Corporate)
                .timestamp(now - Duration::days(45))
                .build(),
            RecordBuilder::new("4")
                .agent("A003", "Emma Davis")
                .outcome(Outcome::Unresolved)
                .timestamp(now - Duration::days(120))
                .build(),
        ]
    }

    fn ids(records: &[CallRecord]) -> Vec<&str> {
        records.iter().map(|r| r.call_id.as_str()).collect()
    }

    #[test]
    fn test_default_filter() {
        let filters = Filters::default();
        assert_eq!(filters.active_filter_count(), 0);
        assert!(!filters.is_active());
    }

    #[test]
    fn test_all_filters_is_identity() {
        let records = sample_records();
        let filtered = apply_filters(&records, &Filters::new(), fixed_now());
        assert_eq!(filtered, records);
    }

    #[test]
    fn test_agent_filter() {
        let records = sample_records();
        let filters = Filters::new().with_agent("A001");
        let filtered = apply_filters(&records, &filters, fixed_now());
        assert_eq!(ids(&filtered), vec!["1", "3"]);
        assert_eq!(filters.active_filter_count(), 1);
    }

    #[test]
    fn test_date_range_filter() {
        let records = sample_records();
        let now = fixed_now();

        let last7 = Filters::new().with_date_range(DateRange::Last7Days);
        assert_eq!(ids(&apply_filters(&records, &last7, now)), vec!["1"]);

        let last30 = Filters::new().with_date_range(DateRange::Last30Days);
        assert_eq!(ids(&apply_filters(&records, &last30, now)), vec!["1", "2"]);

        let last90 = Filters::new().with_date_range(DateRange::Last90Days);
        assert_eq!(
            ids(&apply_filters(&records, &last90, now)),
            vec!["1", "2", "3"]
        );
    }

    #[test]
    fn test_date_range_boundary_is_inclusive() {
        let now = fixed_now();
        let record = RecordBuilder::new("edge")
            .timestamp(now - Duration::days(7))
            .build();
        let filters = Filters::new().with_date_range(DateRange::Last7Days);
        assert!(filters.matches(&record, now));
    }

    #[test]
    fn test_filter_combination() {
        let records = sample_records();
        let filters = Filters::new()
            .with_sentiment(Sentiment::Negative)
            .with_outcome(Outcome::Escalated)
            .with_policy_type(PolicyType::Home);
        assert_eq!(ids(&apply_filters(&records, &filters, fixed_now())), vec!["2"]);

        let filters = filters.with_agent("A001");
        assert!(apply_filters(&records, &filters, fixed_now()).is_empty());
    }

    #[test]
    fn test_segment_filter() {
        let records = sample_records();
        let filters = Filters::new().with_segment(CustomerSegment::Corporate);
        assert_eq!(ids(&apply_filters(&records, &filters, fixed_now())), vec!["3"]);
    }

    #[test]
    fn test_unrecognized_policy_matches_nothing() {
        let records = sample_records();
        let filters = Filters {
            policy_type: Selection::parse("auto"),
            ..Filters::default()
        };
        assert!(apply_filters(&records, &filters, fixed_now()).is_empty());
        assert!(filters.is_active());
    }

    #[test]
    fn test_unrecognized_date_range_keeps_everything() {
        let records = sample_records();
        let filters: Filters = serde_json::from_str(r#"{"dateRange":"365d"}"#).unwrap();
        assert_eq!(filters.date_range, DateRange::All);
        assert_eq!(apply_filters(&records, &filters, fixed_now()), records);
    }

    #[test]
    fn test_filter_clear() {
        let mut filters = Filters::new()
            .with_agent("A001")
            .with_date_range(DateRange::Last30Days);
        assert_eq!(filters.active_filter_count(), 2);

        filters.clear();
        assert!(!filters.is_active());
    }

    #[test]
    fn test_filters_deserialize_from_strings() {
        let json = r#"{"dateRange":"30d","agent":"A002","policyType":"health","segment":"SME"}"#;
        let filters: Filters = serde_json::from_str(json).unwrap();

        assert_eq!(filters.date_range, DateRange::Last30Days);
        assert_eq!(filters.agent, Selection::Only("A002".to_string()));
        assert_eq!(filters.policy_type, Selection::Only(PolicyType::Health));
        assert_eq!(filters.sentiment, Selection::All);
        assert_eq!(filters.segment, Selection::Only(CustomerSegment::Sme));

        let back = serde_json::to_value(&filters).unwrap();
        assert_eq!(back["sentiment"], "all");
        assert_eq!(back["segment"], "SME");
    }

    #[test]
    fn test_empty_input() {
        let filtered = apply_filters(&[], &Filters::new().with_agent("A001"), fixed_now());
        assert!(filtered.is_empty());
    }
}
