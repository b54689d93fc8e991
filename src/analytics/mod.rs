pub mod agent_analyzer;
pub mod export;
pub mod kpi;
pub mod outcome_analyzer;
pub mod recommendations;
pub mod risk_analyzer;
pub mod sentiment_analyzer;
pub mod trend_analyzer;

pub use agent_analyzer::*;
pub use export::*;
pub use kpi::*;
pub use outcome_analyzer::*;
pub use recommendations::*;
pub use risk_analyzer::*;
pub use sentiment_analyzer::*;
pub use trend_analyzer::*;

/// 割合（%）を計算。分母が0なら0を返す
pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// 平均値を計算。空なら0を返す
pub(crate) fn mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// 小数点以下 `decimals` 桁に丸める
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
