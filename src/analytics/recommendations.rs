//! エージェント別の研修推奨
//!
//! 推奨ルールは `TRAINING_RULES` の順序付きテーブルとして定義され、
//! すべてのエージェントに対して同じ手順で評価されます。

use super::{percentage, sentiment_analyzer::topic_label};
use crate::models::{
    agent_directory, CallRecord, Outcome, Sentiment, DIFFICULT_EMOTIONS, RECOMMENDATION_TOPICS,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// 1エージェントあたりの推奨上限
const MAX_RECOMMENDATIONS: usize = 4;

/// 推奨の優先度
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[display("high")]
    High,
    #[display("medium")]
    Medium,
    #[display("low")]
    Low,
}

impl Priority {
    /// 並び替え用の順位（小さいほど優先）
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

/// 研修推奨
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingRecommendation {
    pub area: String,
    pub priority: Priority,
    pub reason: String,
}

/// エージェントごとの推奨一覧
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentRecommendations {
    pub agent_id: String,
    pub agent_name: String,
    pub recommendations: Vec<TrainingRecommendation>,
}

/// トピック別の指標
#[derive(Debug, Clone, PartialEq)]
pub struct TopicMetrics {
    pub topic: &'static str,
    pub calls: usize,
    /// エスカレーション率（%）
    pub escalation_rate: f64,
}

/// ルール評価に使うエージェント指標
#[derive(Debug, Clone, PartialEq)]
pub struct AgentMetrics {
    pub total_calls: usize,
    /// エスカレーション率（%）
    pub escalation_rate: f64,
    /// 解決率（%）
    pub resolution_rate: f64,
    /// 平均極性スコア（-1〜1）
    pub average_polarity: f64,
    pub negative_calls: usize,
    /// ネガティブ通話の割合（%）
    pub negative_percentage: f64,
    pub topics: Vec<TopicMetrics>,
    /// 対応困難な感情を含む通話数
    pub emotional_calls: usize,
    /// そのうちエスカレーションした割合（%）
    pub emotional_escalation_rate: f64,
}

impl AgentMetrics {
    /// 1エージェント分の通話から指標を計算
    pub fn from_calls(calls: &[&CallRecord]) -> Self {
        let total_calls = calls.len();
        let escalated = calls.iter().filter(|r| r.is_escalated()).count();
        let resolved = calls
            .iter()
            .filter(|r| r.outcome == Outcome::Resolved)
            .count();
        let negative_calls = calls
            .iter()
            .filter(|r| r.sentiment == Sentiment::Negative)
            .count();
        let polarity_sum: f64 = calls.iter().map(|r| r.sentiment.polarity_score()).sum();
        let average_polarity = if total_calls == 0 {
            0.0
        } else {
            polarity_sum / total_calls as f64
        };

        let topics = RECOMMENDATION_TOPICS
            .iter()
            .map(|&topic| {
                let with_topic: Vec<&&CallRecord> =
                    calls.iter().filter(|r| r.has_topic(topic)).collect();
                let escalated = with_topic.iter().filter(|r| r.is_escalated()).count();
                TopicMetrics {
                    topic,
                    calls: with_topic.len(),
                    escalation_rate: percentage(escalated, with_topic.len()),
                }
            })
            .collect();

        let emotional: Vec<&&CallRecord> = calls
            .iter()
            .filter(|r| DIFFICULT_EMOTIONS.iter().any(|e| r.has_emotion(e)))
            .collect();
        let emotional_escalated = emotional.iter().filter(|r| r.is_escalated()).count();

        Self {
            total_calls,
            escalation_rate: percentage(escalated, total_calls),
            resolution_rate: percentage(resolved, total_calls),
            average_polarity,
            negative_calls,
            negative_percentage: percentage(negative_calls, total_calls),
            topics,
            emotional_calls: emotional.len(),
            emotional_escalation_rate: percentage(emotional_escalated, emotional.len()),
        }
    }
}

/// 推奨ルール
pub struct TrainingRule {
    pub name: &'static str,
    evaluate: fn(&AgentMetrics) -> Vec<TrainingRecommendation>,
}

impl TrainingRule {
    pub fn evaluate(&self, metrics: &AgentMetrics) -> Vec<TrainingRecommendation> {
        (self.evaluate)(metrics)
    }
}

fn recommend(area: impl Into<String>, priority: Priority, reason: String) -> TrainingRecommendation {
    TrainingRecommendation {
        area: area.into(),
        priority,
        reason,
    }
}

fn escalation_rule(m: &AgentMetrics) -> Vec<TrainingRecommendation> {
    if m.escalation_rate > 25.0 {
        vec![recommend(
            "De-escalation Techniques",
            Priority::High,
            format!("{:.1}% escalation rate (above 25% threshold)", m.escalation_rate),
        )]
    } else {
        Vec::new()
    }
}

fn resolution_rule(m: &AgentMetrics) -> Vec<TrainingRecommendation> {
    if m.resolution_rate < 60.0 {
        vec![recommend(
            "Problem Resolution Skills",
            Priority::High,
            format!("{:.1}% resolution rate (below 60% target)", m.resolution_rate),
        )]
    } else {
        Vec::new()
    }
}

fn empathy_rule(m: &AgentMetrics) -> Vec<TrainingRecommendation> {
    if m.average_polarity < -0.3 || m.negative_percentage > 40.0 {
        vec![recommend(
            "Customer Empathy & Communication",
            Priority::Medium,
            format!(
                "{} negative sentiment calls ({:.1}%)",
                m.negative_calls, m.negative_percentage
            ),
        )]
    } else {
        Vec::new()
    }
}

fn topic_expertise_rule(m: &AgentMetrics) -> Vec<TrainingRecommendation> {
    m.topics
        .iter()
        .filter(|t| t.escalation_rate > 30.0 && t.calls > 5)
        .map(|t| {
            let priority = if t.escalation_rate > 50.0 {
                Priority::High
            } else {
                Priority::Medium
            };
            recommend(
                format!("{} Expertise", topic_label(t.topic)),
                priority,
                format!("{:.1}% escalation rate for {} topics", t.escalation_rate, t.topic),
            )
        })
        .collect()
}

fn emotional_rule(m: &AgentMetrics) -> Vec<TrainingRecommendation> {
    if m.emotional_calls > 0 && m.emotional_escalation_rate > 40.0 {
        vec![recommend(
            "Emotional Intelligence & Conflict Resolution",
            Priority::Medium,
            format!(
                "{:.1}% escalation rate with emotional customers",
                m.emotional_escalation_rate
            ),
        )]
    } else {
        Vec::new()
    }
}

/// 評価順に並んだ推奨ルール
pub const TRAINING_RULES: &[TrainingRule] = &[
    TrainingRule {
        name: "escalation",
        evaluate: escalation_rule,
    },
    TrainingRule {
        name: "resolution",
        evaluate: resolution_rule,
    },
    TrainingRule {
        name: "empathy",
        evaluate: empathy_rule,
    },
    TrainingRule {
        name: "topic_expertise",
        evaluate: topic_expertise_rule,
    },
    TrainingRule {
        name: "emotional",
        evaluate: emotional_rule,
    },
];

/// 指標にルールテーブルを適用し、重複除去・優先度順・上限4件に整える
pub fn evaluate_rules(metrics: &AgentMetrics) -> Vec<TrainingRecommendation> {
    let mut seen = HashSet::new();
    let mut recommendations: Vec<TrainingRecommendation> = TRAINING_RULES
        .iter()
        .flat_map(|rule| rule.evaluate(metrics))
        .filter(|rec| seen.insert(rec.area.clone()))
        .collect();

    // sort_by_key は安定ソート
    recommendations.sort_by_key(|rec| rec.priority.rank());
    recommendations.truncate(MAX_RECOMMENDATIONS);
    recommendations
}

/// エージェントごとの研修推奨（推奨のないエージェントは含めない）
pub fn training_recommendations(records: &[CallRecord]) -> Vec<AgentRecommendations> {
    agent_directory(records)
        .into_iter()
        .filter_map(|agent| {
            let calls: Vec<&CallRecord> = records
                .iter()
                .filter(|r| r.agent_id == agent.agent_id)
                .collect();
            let recommendations = evaluate_rules(&AgentMetrics::from_calls(&calls));
            if recommendations.is_empty() {
                return None;
            }

            debug!(
                agent_id = %agent.agent_id,
                count = recommendations.len(),
                "Training recommendations generated"
            );
            Some(AgentRecommendations {
                agent_id: agent.agent_id,
                agent_name: agent.agent_name,
                recommendations,
            })
        })
        .collect()
}
