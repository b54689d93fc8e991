// 感情×結果ヒートマップと通話時間の散布図

use crate::models::{CallRecord, Outcome, HEATMAP_EMOTIONS};
use serde::{Deserialize, Serialize};

/// ヒートマップのセル強度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatIntensity {
    None,
    Low,
    Medium,
    High,
}

impl HeatIntensity {
    /// 最大値に対する比率から強度を判定
    pub fn classify(value: usize, max_value: usize) -> Self {
        if value == 0 || max_value == 0 {
            return HeatIntensity::None;
        }
        let ratio = value as f64 / max_value as f64;
        if ratio < 0.3 {
            HeatIntensity::Low
        } else if ratio < 0.6 {
            HeatIntensity::Medium
        } else {
            HeatIntensity::High
        }
    }
}

/// ヒートマップのセル
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HeatCell {
    pub count: usize,
    pub intensity: HeatIntensity,
}

/// ヒートマップの行（1感情）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmotionOutcomeRow {
    pub emotion: String,
    pub resolved: HeatCell,
    pub unresolved: HeatCell,
    pub escalated: HeatCell,
}

impl EmotionOutcomeRow {
    pub fn cell(&self, outcome: Outcome) -> HeatCell {
        match outcome {
            Outcome::Resolved => self.resolved,
            Outcome::Unresolved => self.unresolved,
            Outcome::Escalated => self.escalated,
        }
    }
}

/// 感情×結果ヒートマップ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EmotionHeatmap {
    pub rows: Vec<EmotionOutcomeRow>,
    pub max_value: usize,
}

/// 感情タグと通話結果の共起数を集計
pub fn emotion_outcome_heatmap(records: &[CallRecord]) -> EmotionHeatmap {
    let counts: Vec<(&str, [usize; 3])> = HEATMAP_EMOTIONS
        .iter()
        .map(|&emotion| {
            let mut row = [0usize; 3];
            for (slot, outcome) in row.iter_mut().zip(Outcome::ALL) {
                *slot = records
                    .iter()
                    .filter(|r| r.has_emotion(emotion) && r.outcome == outcome)
                    .count();
            }
            (emotion, row)
        })
        .collect();

    let max_value = counts
        .iter()
        .flat_map(|(_, row)| row.iter().copied())
        .max()
        .unwrap_or(0);

    let cell = |count: usize| HeatCell {
        count,
        intensity: HeatIntensity::classify(count, max_value),
    };

    let rows = counts
        .into_iter()
        .map(|(emotion, [resolved, unresolved, escalated])| EmotionOutcomeRow {
            emotion: emotion.to_string(),
            resolved: cell(resolved),
            unresolved: cell(unresolved),
            escalated: cell(escalated),
        })
        .collect();

    EmotionHeatmap { rows, max_value }
}

/// 散布図の点
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DurationPoint {
    /// 通話時間（分）
    pub duration: f64,
    /// 解約リスク（%）
    pub churn_risk: f64,
}

/// 結果別の通話時間×解約リスク
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DurationScatter {
    pub resolved: Vec<DurationPoint>,
    pub unresolved: Vec<DurationPoint>,
    pub escalated: Vec<DurationPoint>,
}

/// 通話時間と解約リスクの散布図データ
pub fn duration_scatter(records: &[CallRecord]) -> DurationScatter {
    let points = |outcome: Outcome| -> Vec<DurationPoint> {
        records
            .iter()
            .filter(|r| r.outcome == outcome)
            .map(|r| DurationPoint {
                duration: r.duration,
                churn_risk: r.churn_risk * 100.0,
            })
            .collect()
    };

    DurationScatter {
        resolved: points(Outcome::Resolved),
        unresolved: points(Outcome::Unresolved),
        escalated: points(Outcome::Escalated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordBuilder;

    #[test]
    fn test_heatmap_counts() {
        let records = vec![
            RecordBuilder::new("1")
                .emotions(&["anger", "anxiety"])
                .outcome(Outcome::Escalated)
                .build(),
            RecordBuilder::new("2")
                .emotions(&["anger"])
                .outcome(Outcome::Escalated)
                .build(),
            RecordBuilder::new("3")
                .emotions(&["anger", "happiness"])
                .outcome(Outcome::Resolved)
                .build(),
            RecordBuilder::new("4")
                .emotions(&["confusion"])
                .outcome(Outcome::Unresolved)
                .build(),
        ];

        let heatmap = emotion_outcome_heatmap(&records);
        assert_eq!(heatmap.rows.len(), 5);
        assert_eq!(heatmap.max_value, 2);

        let anger = &heatmap.rows[0];
        assert_eq!(anger.emotion, "anger");
        assert_eq!(anger.escalated.count, 2);
        assert_eq!(anger.escalated.intensity, HeatIntensity::High);
        assert_eq!(anger.resolved.count, 1);
        assert_eq!(anger.resolved.intensity, HeatIntensity::Medium);
        assert_eq!(anger.unresolved.intensity, HeatIntensity::None);

        let confusion = heatmap.rows.iter().find(|r| r.emotion == "confusion").unwrap();
        assert_eq!(confusion.cell(Outcome::Unresolved).count, 1);

        // happiness は対象外
        assert!(heatmap.rows.iter().all(|r| r.emotion != "happiness"));
    }

    #[test]
    fn test_heat_intensity_bands() {
        assert_eq!(HeatIntensity::classify(0, 10), HeatIntensity::None);
        assert_eq!(HeatIntensity::classify(2, 10), HeatIntensity::Low);
        assert_eq!(HeatIntensity::classify(3, 10), HeatIntensity::Medium);
        assert_eq!(HeatIntensity::classify(6, 10), HeatIntensity::High);
        assert_eq!(HeatIntensity::classify(0, 0), HeatIntensity::None);
    }

    #[test]
    fn test_empty_heatmap() {
        let heatmap = emotion_outcome_heatmap(&[]);
        assert_eq!(heatmap.max_value, 0);
        assert!(heatmap
            .rows
            .iter()
            .all(|r| r.resolved.intensity == HeatIntensity::None));
    }

    #[test]
    fn test_duration_scatter_groups_by_outcome() {
        let records = vec![
            RecordBuilder::new("1")
                .duration(12.0)
                .churn_risk(0.25)
                .build(),
            RecordBuilder::new("2")
                .duration(40.0)
                .churn_risk(0.5)
                .outcome(Outcome::Escalated)
                .build(),
        ];

        let scatter = duration_scatter(&records);
        assert_eq!(scatter.resolved.len(), 1);
        assert_eq!(scatter.unresolved.len(), 0);
        assert_eq!(
            scatter.escalated[0],
            DurationPoint {
                duration: 40.0,
                churn_risk: 50.0
            }
        );
        assert_eq!(scatter.resolved[0].churn_risk, 25.0);
    }
}
