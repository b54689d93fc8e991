use super::{mean, percentage, round_to};
use crate::models::{CallRecord, Outcome, Sentiment};
use serde::{Deserialize, Serialize};

/// 平均解約リスクがこれを超えると要注意
const ELEVATED_CHURN_RISK: f64 = 0.5;
/// 解決率がこれを超えると良好
const HEALTHY_RESOLUTION_RATE: f64 = 80.0;

/// KPIサマリー
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct KpiSummary {
    /// 総通話数
    pub total_calls: usize,
    /// 高解約リスク（>0.7）の通話数
    pub high_risk_calls: usize,
    /// 高解約リスク通話の割合（%）
    pub high_risk_percentage: f64,
    /// 平均解約リスク（0〜1）
    pub average_churn_risk: f64,
    /// 平均通話時間（分）
    pub average_duration: f64,
    /// ネガティブ感情の通話数
    pub negative_calls: usize,
    /// ネガティブ感情の割合（%）
    pub negative_percentage: f64,
    /// 解決率（%）= (総数 - 未解決 - エスカレーション) / 総数
    pub resolution_rate: f64,
    /// 平均解約リスクが0.5を超えている
    pub churn_risk_elevated: bool,
    /// 解決率が80%を超えている
    pub resolution_healthy: bool,
}

/// KPIサマリーを計算
pub fn kpi_summary(records: &[CallRecord]) -> KpiSummary {
    let total_calls = records.len();
    let high_risk_calls = records.iter().filter(|r| r.is_high_risk()).count();
    let unresolved = records
        .iter()
        .filter(|r| r.outcome == Outcome::Unresolved)
        .count();
    let escalated = records.iter().filter(|r| r.is_escalated()).count();
    let negative_calls = records
        .iter()
        .filter(|r| r.sentiment == Sentiment::Negative)
        .count();

    let average_churn_risk = mean(records.iter().map(|r| r.churn_risk));
    let resolution_rate = percentage(total_calls - unresolved - escalated, total_calls);

    KpiSummary {
        total_calls,
        high_risk_calls,
        high_risk_percentage: percentage(high_risk_calls, total_calls),
        average_churn_risk,
        average_duration: mean(records.iter().map(|r| r.duration)),
        negative_calls,
        negative_percentage: percentage(negative_calls, total_calls),
        resolution_rate,
        churn_risk_elevated: average_churn_risk > ELEVATED_CHURN_RISK,
        resolution_healthy: resolution_rate > HEALTHY_RESOLUTION_RATE,
    }
}

/// 概要ページのクイック統計（いずれも%、小数1桁）
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OverviewStats {
    pub total_calls: usize,
    /// 平均感情スコア（positive=1, neutral=0.5, negative=0）
    pub average_sentiment: f64,
    /// 解決済みのみを分子とする解決率
    pub resolution_rate: f64,
    pub average_churn_risk: f64,
}

/// 概要ページのクイック統計を計算
///
/// `KpiSummary::resolution_rate` とは異なり、解決率は resolved / total。
pub fn overview_stats(records: &[CallRecord]) -> OverviewStats {
    let total_calls = records.len();
    let resolved = records
        .iter()
        .filter(|r| r.outcome == Outcome::Resolved)
        .count();

    OverviewStats {
        total_calls,
        average_sentiment: round_to(
            mean(records.iter().map(|r| r.sentiment.performance_score())) * 100.0,
            1,
        ),
        resolution_rate: round_to(percentage(resolved, total_calls), 1),
        average_churn_risk: round_to(mean(records.iter().map(|r| r.churn_risk)) * 100.0, 1),
    }
}
