//! 通話レコードのデータモデル
//!
//! ダッシュボードが扱う唯一のドメインエンティティ `CallRecord` と、
//! その列挙型・固定語彙を定義します。レコードは生成後に変更されません。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use thiserror::Error;

/// 高リスクとみなす解約リスクの閾値
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// ヒートマップで集計する感情タグ
pub const HEATMAP_EMOTIONS: [&str; 5] = ["anger", "frustration", "confusion", "anxiety", "sadness"];

/// 対応が難しい感情タグ（研修推奨ルールで使用）
pub const DIFFICULT_EMOTIONS: [&str; 3] = ["anger", "frustration", "anxiety"];

/// 研修ニーズマトリクスのトピック
pub const TRAINING_MATRIX_TOPICS: [&str; 5] = ["claims", "pricing", "cancellation", "delay", "billing"];

/// 研修推奨ルールで評価するトピック
pub const RECOMMENDATION_TOPICS: [&str; 5] = ["claims", "pricing", "cancellation", "billing", "delay"];

/// 列挙値のパースエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized {kind} value: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// 通話の感情
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    #[display("positive")]
    Positive,
    #[display("neutral")]
    Neutral,
    #[display("negative")]
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    /// エージェント成績表用のスコア（positive=1, neutral=0.5, negative=0）
    pub fn performance_score(&self) -> f64 {
        match self {
            Sentiment::Positive => 1.0,
            Sentiment::Neutral => 0.5,
            Sentiment::Negative => 0.0,
        }
    }

    /// 研修推奨用の極性スコア（positive=1, neutral=0, negative=-1）
    pub fn polarity_score(&self) -> f64 {
        match self {
            Sentiment::Positive => 1.0,
            Sentiment::Neutral => 0.0,
            Sentiment::Negative => -1.0,
        }
    }
}

impl FromStr for Sentiment {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            _ => Err(ParseEnumError::new("sentiment", s)),
        }
    }
}

/// 通話の結果
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[display("resolved")]
    Resolved,
    #[display("unresolved")]
    Unresolved,
    #[display("escalated")]
    Escalated,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Resolved, Outcome::Unresolved, Outcome::Escalated];

    /// 未解決またはエスカレーション
    pub fn is_unfavorable(&self) -> bool {
        matches!(self, Outcome::Unresolved | Outcome::Escalated)
    }
}

impl FromStr for Outcome {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "resolved" => Ok(Outcome::Resolved),
            "unresolved" => Ok(Outcome::Unresolved),
            "escalated" => Ok(Outcome::Escalated),
            _ => Err(ParseEnumError::new("outcome", s)),
        }
    }
}

/// 保険種別
///
/// 正規の列挙は motor/health/travel/home/life のみ。
/// `auto` は別名として扱わず、未知の値としてパースに失敗させる。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum PolicyType {
    #[display("motor")]
    Motor,
    #[display("health")]
    Health,
    #[display("travel")]
    Travel,
    #[display("home")]
    Home,
    #[display("life")]
    Life,
}

impl PolicyType {
    pub const ALL: [PolicyType; 5] = [
        PolicyType::Motor,
        PolicyType::Health,
        PolicyType::Travel,
        PolicyType::Home,
        PolicyType::Life,
    ];

    /// 表示用ラベル（先頭大文字）
    pub fn label(&self) -> &'static str {
        match self {
            PolicyType::Motor => "Motor",
            PolicyType::Health => "Health",
            PolicyType::Travel => "Travel",
            PolicyType::Home => "Home",
            PolicyType::Life => "Life",
        }
    }
}

impl FromStr for PolicyType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "motor" => Ok(PolicyType::Motor),
            "health" => Ok(PolicyType::Health),
            "travel" => Ok(PolicyType::Travel),
            "home" => Ok(PolicyType::Home),
            "life" => Ok(PolicyType::Life),
            _ => Err(ParseEnumError::new("policy type", s)),
        }
    }
}

/// 顧客セグメント
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum CustomerSegment {
    #[serde(rename = "retail")]
    #[display("retail")]
    Retail,
    #[serde(rename = "SME")]
    #[display("SME")]
    Sme,
    #[serde(rename = "corporate")]
    #[display("corporate")]
    Corporate,
}

impl CustomerSegment {
    pub const ALL: [CustomerSegment; 3] = [
        CustomerSegment::Retail,
        CustomerSegment::Sme,
        CustomerSegment::Corporate,
    ];
}

impl FromStr for CustomerSegment {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "retail" => Ok(CustomerSegment::Retail),
            "sme" => Ok(CustomerSegment::Sme),
            "corporate" => Ok(CustomerSegment::Corporate),
            _ => Err(ParseEnumError::new("customer segment", s)),
        }
    }
}

/// レコード不変条件の違反
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("call {call_id}: churn risk {value} is outside [0, 1]")]
    ChurnRiskOutOfRange { call_id: String, value: f64 },

    #[error("call {call_id}: duration must be positive, got {value}")]
    NonPositiveDuration { call_id: String, value: f64 },

    #[error("call {call_id}: agent score {value} is outside [1, 10]")]
    AgentScoreOutOfRange { call_id: String, value: u8 },
}

/// 通話レコード
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub call_id: String,
    pub customer_id: String,
    pub agent_id: String,
    pub agent_name: String,
    pub timestamp: DateTime<Utc>,
    /// 通話時間（分）
    pub duration: f64,
    pub sentiment: Sentiment,
    pub emotions: Vec<String>,
    pub topics: Vec<String>,
    pub outcome: Outcome,
    /// 解約リスク（0〜1）
    pub churn_risk: f64,
    pub policy_type: PolicyType,
    pub agent_score: u8,
    pub customer_segment: CustomerSegment,
}

impl CallRecord {
    /// 不変条件を検証
    pub fn validate(&self) -> Result<(), RecordError> {
        if !(0.0..=1.0).contains(&self.churn_risk) {
            return Err(RecordError::ChurnRiskOutOfRange {
                call_id: self.call_id.clone(),
                value: self.churn_risk,
            });
        }
        // NaN もここで弾く
        if !(self.duration > 0.0) {
            return Err(RecordError::NonPositiveDuration {
                call_id: self.call_id.clone(),
                value: self.duration,
            });
        }
        if !(1..=10).contains(&self.agent_score) {
            return Err(RecordError::AgentScoreOutOfRange {
                call_id: self.call_id.clone(),
                value: self.agent_score,
            });
        }
        Ok(())
    }

    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.iter().any(|t| t == topic)
    }

    pub fn has_emotion(&self, emotion: &str) -> bool {
        self.emotions.iter().any(|e| e == emotion)
    }

    /// 解約リスクが閾値（0.7）を超えているか
    pub fn is_high_risk(&self) -> bool {
        self.churn_risk > HIGH_RISK_THRESHOLD
    }

    pub fn is_escalated(&self) -> bool {
        self.outcome == Outcome::Escalated
    }
}

/// エージェント一覧の項目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentInfo {
    pub agent_id: String,
    pub agent_name: String,
}

/// レコードに現れるエージェントを初出順で列挙
pub fn agent_directory(records: &[CallRecord]) -> Vec<AgentInfo> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| seen.insert(record.agent_id.as_str()))
        .map(|record| AgentInfo {
            agent_id: record.agent_id.clone(),
            agent_name: record.agent_name.clone(),
        })
        .collect()
}
