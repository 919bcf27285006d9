//! 누적 수익률 및 낙폭.
//!
//! `cum[t] = Π(1 + r_i) - 1`, 첫 기간 이전의 누적 수익률은 0입니다.
//! 모든 함수는 상태가 없고 같은 입력에 대해 항상 같은 결과를 냅니다.

use rotation_core::{ReturnSeries, RotationResult};

/// 기간 수익률을 누적 수익률로 변환합니다.
pub fn cumulative_returns(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |wealth, r| {
            *wealth *= 1.0 + r;
            Some(*wealth - 1.0)
        })
        .collect()
}

/// 기간 라벨을 유지한 누적 수익률 시계열. 원본 시계열은 바뀌지 않습니다.
pub fn cumulative_series(series: &ReturnSeries) -> RotationResult<ReturnSeries> {
    let cumulative = cumulative_returns(&series.values());
    ReturnSeries::from_points(
        format!("{}_cumulative", series.name()),
        series.periods().into_iter().zip(cumulative),
    )
}

/// 전체 기간 누적 수익률. 빈 시계열이면 0.
pub fn total_return(returns: &[f64]) -> f64 {
    returns.iter().fold(1.0, |wealth, r| wealth * (1.0 + r)) - 1.0
}

/// 최대 낙폭 (양수 비율).
///
/// 자산 경로 `1 + cum[t]`에서 고점 대비 가장 큰 하락폭입니다.
/// 시작 자산 1.0도 고점 후보에 포함됩니다.
///
/// 예: 1.0 → 1.2(고점) → 1.08 이면 MDD = (1.2 - 1.08) / 1.2 = 0.1
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut peak = 1.0_f64;
    let mut wealth = 1.0_f64;
    let mut max_dd = 0.0_f64;

    for r in returns {
        wealth *= 1.0 + r;
        if wealth > peak {
            peak = wealth;
        }
        if peak > 0.0 {
            max_dd = max_dd.max((peak - wealth) / peak);
        }
    }

    max_dd
}
