use super::{mean, percentage};
use crate::models::{agent_directory, CallRecord, Outcome, TRAINING_MATRIX_TOPICS};
use serde::{Deserialize, Serialize};

/// エージェントの総合評価
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum PerformanceBand {
    #[display("Excellent")]
    Excellent,
    #[display("Good")]
    Good,
    #[display("Needs Attention")]
    NeedsAttention,
}

impl PerformanceBand {
    pub fn classify(resolution_rate: f64, average_churn_risk: f64) -> Self {
        if resolution_rate >= 80.0 && average_churn_risk < 0.4 {
            PerformanceBand::Excellent
        } else if resolution_rate >= 60.0 && average_churn_risk < 0.6 {
            PerformanceBand::Good
        } else {
            PerformanceBand::NeedsAttention
        }
    }
}

/// 指標の評価色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricTone {
    Good,
    Fair,
    Poor,
}

impl MetricTone {
    /// 高いほど良い指標
    fn higher_is_better(value: f64, good: f64, fair: f64) -> Self {
        if value >= good {
            MetricTone::Good
        } else if value >= fair {
            MetricTone::Fair
        } else {
            MetricTone::Poor
        }
    }

    /// 低いほど良い指標
    fn lower_is_better(value: f64, good: f64, fair: f64) -> Self {
        if value <= good {
            MetricTone::Good
        } else if value <= fair {
            MetricTone::Fair
        } else {
            MetricTone::Poor
        }
    }
}

/// 指標ごとの評価色
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricTones {
    pub sentiment: MetricTone,
    pub resolution: MetricTone,
    pub churn_risk: MetricTone,
}

/// エージェント成績表の1行
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentPerformance {
    pub agent_id: String,
    pub agent_name: String,
    pub total_calls: usize,
    pub resolved_calls: usize,
    pub escalated_calls: usize,
    /// 解決率（%）
    pub resolution_rate: f64,
    /// エスカレーション率（%）
    pub escalation_rate: f64,
    /// 平均感情スコア（0〜1）
    pub average_sentiment_score: f64,
    pub average_churn_risk: f64,
    pub average_duration: f64,
    pub band: PerformanceBand,
    pub tones: MetricTones,
}

fn calls_for<'a>(records: &'a [CallRecord], agent_id: &str) -> Vec<&'a CallRecord> {
    records.iter().filter(|r| r.agent_id == agent_id).collect()
}

/// エージェント別の成績を計算（総通話数の降順）
pub fn agent_performance(records: &[CallRecord]) -> Vec<AgentPerformance> {
    let mut rows: Vec<AgentPerformance> = agent_directory(records)
        .into_iter()
        .map(|agent| {
            let calls = calls_for(records, &agent.agent_id);
            let total_calls = calls.len();
            let resolved_calls = calls
                .iter()
                .filter(|r| r.outcome == Outcome::Resolved)
                .count();
            let escalated_calls = calls.iter().filter(|r| r.is_escalated()).count();

            let resolution_rate = percentage(resolved_calls, total_calls);
            let average_sentiment_score =
                mean(calls.iter().map(|r| r.sentiment.performance_score()));
            let average_churn_risk = mean(calls.iter().map(|r| r.churn_risk));

            AgentPerformance {
                total_calls,
                resolved_calls,
                escalated_calls,
                resolution_rate,
                escalation_rate: percentage(escalated_calls, total_calls),
                average_sentiment_score,
                average_churn_risk,
                average_duration: mean(calls.iter().map(|r| r.duration)),
                band: PerformanceBand::classify(resolution_rate, average_churn_risk),
                tones: MetricTones {
                    sentiment: MetricTone::higher_is_better(average_sentiment_score, 0.7, 0.5),
                    resolution: MetricTone::higher_is_better(resolution_rate, 80.0, 60.0),
                    churn_risk: MetricTone::lower_is_better(average_churn_risk, 0.3, 0.6),
                },
                agent_id: agent.agent_id,
                agent_name: agent.agent_name,
            }
        })
        .collect();

    // 同数は初出順（安定ソート）
    rows.sort_by(|a, b| b.total_calls.cmp(&a.total_calls));
    rows
}

/// 研修ニーズの強度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingIntensity {
    None,
    Low,
    Moderate,
    High,
}

impl TrainingIntensity {
    pub fn classify(escalation_rate: f64) -> Self {
        if escalation_rate <= 0.0 {
            TrainingIntensity::None
        } else if escalation_rate < 20.0 {
            TrainingIntensity::Low
        } else if escalation_rate < 40.0 {
            TrainingIntensity::Moderate
        } else {
            TrainingIntensity::High
        }
    }
}

/// マトリクスのセル（エージェント×トピック）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingCell {
    pub topic: String,
    /// エスカレーション率（%、整数に丸め）
    pub escalation_rate: f64,
    pub escalation_count: usize,
    pub intensity: TrainingIntensity,
}

/// マトリクスの行
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingMatrixRow {
    pub agent_id: String,
    pub agent_name: String,
    pub cells: Vec<TrainingCell>,
}

/// エージェント×トピックのエスカレーション率
pub fn training_needs_matrix(records: &[CallRecord]) -> Vec<TrainingMatrixRow> {
    agent_directory(records)
        .into_iter()
        .map(|agent| {
            let calls = calls_for(records, &agent.agent_id);
            let cells = TRAINING_MATRIX_TOPICS
                .iter()
                .map(|&topic| {
                    let topic_calls: Vec<&&CallRecord> =
                        calls.iter().filter(|r| r.has_topic(topic)).collect();
                    let escalation_count =
                        topic_calls.iter().filter(|r| r.is_escalated()).count();
                    let escalation_rate =
                        percentage(escalation_count, topic_calls.len()).round();

                    TrainingCell {
                        topic: topic.to_string(),
                        escalation_rate,
                        escalation_count,
                        intensity: TrainingIntensity::classify(escalation_rate),
                    }
                })
                .collect();

            TrainingMatrixRow {
                agent_id: agent.agent_id,
                agent_name: agent.agent_name,
                cells,
            }
        })
        .collect()
}
