use super::{percentage, round_to};
use crate::models::{CallRecord, PolicyType, Sentiment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// ネガティブトピックの上位件数
const TOP_NEGATIVE_TOPICS: usize = 8;

/// 保険種別ごとの感情内訳
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicySentimentBreakdown {
    pub policy_type: PolicyType,
    /// 表示用ラベル
    pub label: String,
    /// ポジティブ割合（%、小数1桁）
    pub positive: f64,
    /// ニュートラル割合（%、小数1桁）
    pub neutral: f64,
    /// ネガティブ割合（%、小数1桁）
    pub negative: f64,
    /// この保険種別の通話数
    pub total: usize,
}

/// ネガティブ通話におけるトピック出現数
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicCount {
    pub topic: String,
    pub label: String,
    pub count: usize,
}

/// 保険種別ごとの感情割合を計算
pub fn sentiment_by_policy(records: &[CallRecord]) -> Vec<PolicySentimentBreakdown> {
    PolicyType::ALL
        .iter()
        .map(|&policy_type| {
            let policy_calls: Vec<&CallRecord> = records
                .iter()
                .filter(|r| r.policy_type == policy_type)
                .collect();
            let total = policy_calls.len();
            let share = |sentiment: Sentiment| {
                let count = policy_calls
                    .iter()
                    .filter(|r| r.sentiment == sentiment)
                    .count();
                round_to(percentage(count, total), 1)
            };

            PolicySentimentBreakdown {
                policy_type,
                label: policy_type.label().to_string(),
                positive: share(Sentiment::Positive),
                neutral: share(Sentiment::Neutral),
                negative: share(Sentiment::Negative),
                total,
            }
        })
        .collect()
}

/// ネガティブ感情の通話で多いトピック（上位8件）
///
/// 同数の場合は初出順を保つ。
pub fn negative_topics(records: &[CallRecord]) -> Vec<TopicCount> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for record in records.iter().filter(|r| r.sentiment == Sentiment::Negative) {
        for topic in &record.topics {
            let count = counts.entry(topic.as_str()).or_insert_with(|| {
                order.push(topic.as_str());
                0
            });
            *count += 1;
        }
    }

    let mut ranked: Vec<TopicCount> = order
        .into_iter()
        .map(|topic| TopicCount {
            topic: topic.to_string(),
            label: topic_label(topic),
            count: counts[topic],
        })
        .collect();

    // sort_by は安定ソート
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(TOP_NEGATIVE_TOPICS);
    ranked
}

/// トピックタグを表示用に整形（`policy_change` → `Policy change`）
pub fn topic_label(topic: &str) -> String {
    let spaced = topic.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordBuilder;

    #[test]
    fn test_sentiment_breakdown_sums_to_hundred() {
        let records = vec![
            RecordBuilder::new("1")
                .policy(PolicyType::Motor)
                .sentiment(Sentiment::Positive)
                .build(),
            RecordBuilder::new("2")
                .policy(PolicyType::Motor)
                .sentiment(Sentiment::Negative)
                .build(),
            RecordBuilder::new("3")
                .policy(PolicyType::Motor)
                .sentiment(Sentiment::Neutral)
                .build(),
            RecordBuilder::new("4")
                .policy(PolicyType::Home)
                .sentiment(Sentiment::Negative)
                .build(),
        ];

        let breakdown = sentiment_by_policy(&records);
        assert_eq!(breakdown.len(), 5);

        let motor = &breakdown[0];
        assert_eq!(motor.policy_type, PolicyType::Motor);
        assert_eq!(motor.total, 3);
        assert_eq!(motor.positive, 33.3);
        let sum = motor.positive + motor.neutral + motor.negative;
        assert!((sum - 100.0).abs() <= 0.2);

        let home = breakdown
            .iter()
            .find(|b| b.policy_type == PolicyType::Home)
            .unwrap();
        assert_eq!(home.negative, 100.0);

        let travel = breakdown
            .iter()
            .find(|b| b.policy_type == PolicyType::Travel)
            .unwrap();
        assert_eq!(travel.total, 0);
        assert_eq!(
            (travel.positive, travel.neutral, travel.negative),
            (0.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_negative_topics_ranking() {
        let records = vec![
            RecordBuilder::new("1")
                .sentiment(Sentiment::Negative)
                .topics(&["billing", "delay"])
                .build(),
            RecordBuilder::new("2")
                .sentiment(Sentiment::Negative)
                .topics(&["claims", "delay"])
                .build(),
            RecordBuilder::new("3")
                .sentiment(Sentiment::Positive)
                .topics(&["claims", "claims"])
                .build(),
        ];

        let topics = negative_topics(&records);
        assert_eq!(topics[0].topic, "delay");
        assert_eq!(topics[0].count, 2);
        // 同数は初出順
        assert_eq!(topics[1].topic, "billing");
        assert_eq!(topics[2].topic, "claims");
        assert_eq!(topics[2].count, 1);
    }

    #[test]
    fn test_negative_topics_capped_at_eight() {
        let tags = [
            "claims", "delay", "cancellation", "pricing", "renewal", "policy_change", "payment",
            "coverage", "deductible", "billing",
        ];
        let records = vec![RecordBuilder::new("1")
            .sentiment(Sentiment::Negative)
            .topics(&tags)
            .build()];

        let topics = negative_topics(&records);
        assert_eq!(topics.len(), 8);
        assert_eq!(topics[0].topic, "claims");
    }

    #[test]
    fn test_topic_label() {
        assert_eq!(topic_label("policy_change"), "Policy change");
        assert_eq!(topic_label("claims"), "Claims");
        assert_eq!(topic_label(""), "");
    }
}
