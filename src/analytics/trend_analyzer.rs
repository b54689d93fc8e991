use super::{mean, round_to};
use crate::models::{agent_directory, AgentInfo, CallRecord};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// トレンドの日数
pub const TREND_DAYS: i64 = 7;
/// エスカレーション推移で追跡するエージェント数
pub const TRACKED_AGENTS: usize = 4;

/// 日別解約リスク
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChurnTrendPoint {
    pub date: NaiveDate,
    /// 表示用ラベル（例: "Jun 09"）
    pub label: String,
    /// 平均解約リスク（%、小数2桁）
    pub average_churn_risk: f64,
    pub call_count: usize,
}

/// 日別・エージェント別のエスカレーション数
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EscalationTrendPoint {
    pub date: NaiveDate,
    pub label: String,
    /// `EscalationTrend::agents` と同じ順序のエスカレーション数
    pub escalations: Vec<usize>,
}

/// エージェント別エスカレーション推移
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EscalationTrend {
    pub agents: Vec<AgentInfo>,
    pub points: Vec<EscalationTrendPoint>,
}

/// `today` で終わる7日間（古い順）
fn trailing_days(today: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    (0..TREND_DAYS).rev().map(move |offset| today - Duration::days(offset))
}

fn day_label(date: NaiveDate) -> String {
    date.format("%b %d").to_string()
}

fn calls_on(records: &[CallRecord], date: NaiveDate) -> impl Iterator<Item = &CallRecord> {
    records
        .iter()
        .filter(move |r| r.timestamp.date_naive() == date)
}

/// 直近7日間の日別平均解約リスク
pub fn churn_trend(records: &[CallRecord], today: NaiveDate) -> Vec<ChurnTrendPoint> {
    trailing_days(today)
        .map(|date| {
            let day_calls: Vec<&CallRecord> = calls_on(records, date).collect();
            let average = mean(day_calls.iter().map(|r| r.churn_risk));

            ChurnTrendPoint {
                date,
                label: day_label(date),
                average_churn_risk: round_to(average * 100.0, 2),
                call_count: day_calls.len(),
            }
        })
        .collect()
}

/// 追跡対象のエージェント
///
/// フィルター前の全レコードを渡すこと。出現順で最初の4エージェント。
pub fn tracked_agents(all_records: &[CallRecord]) -> Vec<AgentInfo> {
    agent_directory(all_records)
        .into_iter()
        .take(TRACKED_AGENTS)
        .collect()
}

/// 直近7日間のエージェント別エスカレーション数
///
/// `agents` は `tracked_agents` で未フィルターの集合から選び、
/// 件数は `records`（フィルター後）から数える。
pub fn escalation_trend(
    records: &[CallRecord],
    agents: &[AgentInfo],
    today: NaiveDate,
) -> EscalationTrend {
    let points = trailing_days(today)
        .map(|date| {
            let escalations = agents
                .iter()
                .map(|agent| {
                    calls_on(records, date)
                        .filter(|r| r.agent_id == agent.agent_id && r.is_escalated())
                        .count()
                })
                .collect();

            EscalationTrendPoint {
                date,
                label: day_label(date),
                escalations,
            }
        })
        .collect();

    EscalationTrend {
        agents: agents.to_vec(),
        points,
    }
}
