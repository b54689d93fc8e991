use crate::models::{CallRecord, Outcome, Sentiment, HIGH_RISK_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// 高リスク通話テーブルの最大件数
const HIGH_RISK_TABLE_LIMIT: usize = 10;
/// エスカレーション対応の解約リスク閾値
const ESCALATION_ACTION_THRESHOLD: f64 = 0.6;
/// 未解決フォローアップの解約リスク閾値
const UNRESOLVED_FOLLOW_UP_THRESHOLD: f64 = 0.5;

/// 解約リスク上位の未解決・エスカレーション通話（最大10件、リスク降順）
pub fn high_risk_calls(records: &[CallRecord]) -> Vec<CallRecord> {
    let mut calls: Vec<CallRecord> = records
        .iter()
        .filter(|r| r.is_high_risk() && r.outcome.is_unfavorable())
        .cloned()
        .collect();

    calls.sort_by(|a, b| {
        b.churn_risk
            .partial_cmp(&a.churn_risk)
            .unwrap_or(Ordering::Equal)
    });
    calls.truncate(HIGH_RISK_TABLE_LIMIT);
    calls
}

/// リテンション施策の件数
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RetentionActions {
    /// 高リスク（>0.7）の顧客数（重複なし）
    pub high_risk_customers: usize,
    /// 複数回通話かつ複数回ネガティブな顧客の通話数
    pub recurring_issues: usize,
    /// 解約リスク>0.6のエスカレーション通話数
    pub escalation_actions: usize,
    /// 解約リスク>0.5の未解決通話数
    pub unresolved_follow_ups: usize,
}

/// リテンション施策の提案項目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetentionSuggestion {
    pub title: String,
    pub value: usize,
    pub subtitle: String,
    pub action: String,
}

impl RetentionActions {
    /// 表示用の提案リスト
    pub fn suggestions(&self) -> Vec<RetentionSuggestion> {
        let item = |title: &str, value: usize, subtitle: &str, action: &str| RetentionSuggestion {
            title: title.to_string(),
            value,
            subtitle: subtitle.to_string(),
            action: action.to_string(),
        };

        vec![
            item(
                "High-Risk Follow Ups",
                self.high_risk_customers,
                "Customers requiring immediate attention",
                "Schedule retention calls",
            ),
            item(
                "Recurring Issues",
                self.recurring_issues,
                "Cases with repeated dissatisfaction",
                "Process improvement needed",
            ),
            item(
                "Escalation Actions",
                self.escalation_actions,
                "High-risk escalated cases",
                "Senior agent review",
            ),
            item(
                "Unresolved Follow Ups",
                self.unresolved_follow_ups,
                "Medium-risk unresolved calls",
                "Proactive outreach",
            ),
        ]
    }
}

/// リテンション施策の件数を計算
pub fn retention_actions(records: &[CallRecord]) -> RetentionActions {
    let high_risk_customers = records
        .iter()
        .filter(|r| r.churn_risk > HIGH_RISK_THRESHOLD)
        .map(|r| r.customer_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    // 顧客ごとの (通話数, ネガティブ通話数)
    let mut per_customer: HashMap<&str, (usize, usize)> = HashMap::new();
    for record in records {
        let entry = per_customer.entry(record.customer_id.as_str()).or_default();
        entry.0 += 1;
        if record.sentiment == Sentiment::Negative {
            entry.1 += 1;
        }
    }
    let recurring_issues = records
        .iter()
        .filter(|r| {
            per_customer
                .get(r.customer_id.as_str())
                .is_some_and(|&(calls, negatives)| calls > 1 && negatives > 1)
        })
        .count();

    let escalation_actions = records
        .iter()
        .filter(|r| r.outcome == Outcome::Escalated && r.churn_risk > ESCALATION_ACTION_THRESHOLD)
        .count();

    let unresolved_follow_ups = records
        .iter()
        .filter(|r| {
            r.outcome == Outcome::Unresolved && r.churn_risk > UNRESOLVED_FOLLOW_UP_THRESHOLD
        })
        .count();

    RetentionActions {
        high_risk_customers,
        recurring_issues,
        escalation_actions,
        unresolved_follow_ups,
    }
}
