pub mod call_filter;

pub use call_filter::*;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// 「すべて」を表すセンチネル値
pub const ALL_SENTINEL: &str = "all";

/// フィルター項目の選択値
///
/// UIから受け取る文字列をそのまま保持し、"all" なら常に一致、
/// 既知の値なら等価比較、未知の値なら常に不一致となる。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selection<T> {
    All,
    Only(T),
    Unrecognized(String),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: FromStr> Selection<T> {
    /// 文字列から選択値をパース
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_SENTINEL) {
            return Selection::All;
        }
        match trimmed.parse::<T>() {
            Ok(value) => Selection::Only(value),
            Err(_) => {
                warn!(value = %trimmed, "Unrecognized filter value, nothing will match");
                Selection::Unrecognized(trimmed.to_string())
            }
        }
    }
}

impl<T: PartialEq> Selection<T> {
    /// 値が選択条件に合致するか
    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => expected == value,
            Selection::Unrecognized(_) => false,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str(ALL_SENTINEL),
            Selection::Only(value) => write!(f, "{}", value),
            Selection::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

impl<T: fmt::Display> Serialize for Selection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, T: FromStr> Deserialize<'de> for Selection<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Selection::parse(&raw))
    }
}

/// 日付範囲フィルター
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, derive_more::Display)]
pub enum DateRange {
    #[default]
    #[display("all")]
    All,
    #[display("7d")]
    Last7Days,
    #[display("30d")]
    Last30Days,
    #[display("90d")]
    Last90Days,
}

impl DateRange {
    /// 遡る日数
    pub fn lookback_days(&self) -> Option<i64> {
        match self {
            DateRange::All => None,
            DateRange::Last7Days => Some(7),
            DateRange::Last30Days => Some(30),
            DateRange::Last90Days => Some(90),
        }
    }

    /// `now` を基準とした下限時刻
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.lookback_days().map(|days| now - Duration::days(days))
    }

    /// 文字列からパース
    ///
    /// 未知の値は全期間として扱う。`Selection` の未知値は何にも一致しないが、
    /// 期間だけは絞り込みなしに倒す。
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "all" => DateRange::All,
            "7d" => DateRange::Last7Days,
            "30d" => DateRange::Last30Days,
            "90d" => DateRange::Last90Days,
            other => {
                warn!(value = %other, "Unrecognized date range, falling back to all time");
                DateRange::All
            }
        }
    }
}

impl Serialize for DateRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(DateRange::parse(&raw))
    }
}
