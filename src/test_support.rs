// テスト用のレコードビルダー

use crate::dashboard::{DashboardService, DashboardSnapshot};
use crate::models::{CallRecord, CustomerSegment, Outcome, PolicyType, Sentiment};
use chrono::{DateTime, TimeZone, Utc};

/// テストで使う固定の「現在時刻」（2024-06-15 12:00:00 UTC）
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

pub struct RecordBuilder {
    record: CallRecord,
}

impl RecordBuilder {
    pub fn new(call_id: &str) -> Self {
        Self {
            record: CallRecord {
                call_id: call_id.to_string(),
                customer_id: "CUST-0001".to_string(),
                agent_id: "A001".to_string(),
                agent_name: "Sarah Johnson".to_string(),
                timestamp: fixed_now(),
                duration: 10.0,
                sentiment: Sentiment::Neutral,
                emotions: vec![],
                topics: vec![],
                outcome: Outcome::Resolved,
                churn_risk: 0.1,
                policy_type: PolicyType::Motor,
                agent_score: 8,
                customer_segment: CustomerSegment::Retail,
            },
        }
    }

    pub fn customer(mut self, customer_id: &str) -> Self {
        self.record.customer_id = customer_id.to_string();
        self
    }

    pub fn agent(mut self, agent_id: &str, agent_name: &str) -> Self {
        self.record.agent_id = agent_id.to_string();
        self.record.agent_name = agent_name.to_string();
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.record.timestamp = timestamp;
        self
    }

    pub fn duration(mut self, duration: f64) -> Self {
        self.record.duration = duration;
        self
    }

    pub fn sentiment(mut self, sentiment: Sentiment) -> Self {
        self.record.sentiment = sentiment;
        self
    }

    pub fn emotions(mut self, emotions: &[&str]) -> Self {
        self.record.emotions = emotions.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn topics(mut self, topics: &[&str]) -> Self {
        self.record.topics = topics.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.record.outcome = outcome;
        self
    }

    pub fn churn_risk(mut self, churn_risk: f64) -> Self {
        self.record.churn_risk = churn_risk;
        self
    }

    pub fn policy(mut self, policy_type: PolicyType) -> Self {
        self.record.policy_type = policy_type;
        self
    }

    pub fn agent_score(mut self, agent_score: u8) -> Self {
        self.record.agent_score = agent_score;
        self
    }

    pub fn segment(mut self, segment: CustomerSegment) -> Self {
        self.record.customer_segment = segment;
        self
    }

    pub fn build(self) -> CallRecord {
        self.record
    }
}

/// エクスポートテスト用のスナップショット（全件エスカレーションの高リスク通話4件）
pub fn sample_snapshot() -> DashboardSnapshot {
    let records: Vec<CallRecord> = (0..4)
        .map(|i| {
            RecordBuilder::new(&format!("CALL-{i:04}"))
                .agent(if i % 2 == 0 { "A001" } else { "A002" }, "Agent, \"Quoted\"")
                .churn_risk(0.75 + i as f64 * 0.05)
                .outcome(Outcome::Escalated)
                .build()
        })
        .collect();
    DashboardService::new(records).snapshot(fixed_now())
}
