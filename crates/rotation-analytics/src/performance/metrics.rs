//! 위험 조정 성과 지표.
//!
//! 전략과 벤치마크의 실현 수익률(2..T 기간)로 다음 지표를 계산합니다:
//! - 샤프 비율 (Sharpe Ratio): 평균 수익률 / 벤치마크 표준편차
//! - 트레이너 비율 (Treynor Ratio): 평균 수익률 / 베타
//! - 소르티노 비율 (Sortino Ratio): 평균 수익률 / 하방 표준편차
//! - 누적 수익률, 최대 낙폭
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use rotation_analytics::performance::{MetricsRecord, SharpeDenominator};
//!
//! let realized = run.realized()?;
//! let record = MetricsRecord::compute(&realized, &table, SharpeDenominator::Benchmark)?;
//!
//! println!("전략 샤프: {:?}", record.strategy.sharpe);
//! println!("{}", record.strategy.summary());
//! ```

use serde::{Deserialize, Serialize};

use rotation_core::{PeriodReturnTable, ReturnSeries, RotationError, RotationResult};

pub use rotation_core::SharpeDenominator;

use super::cumulative::{max_drawdown, total_return};
use super::stats::{covariance, downside_std_dev, mean, std_dev};

/// 벤치마크 자신의 베타.
pub const BENCHMARK_BETA: f64 = 1.0;

/// 샤프 비율.
///
/// 기본 분모는 벤치마크 수익률의 표준편차입니다 ([`SharpeDenominator::Benchmark`]).
/// 분자는 무위험 이자율을 빼지 않은 평균 수익률입니다.
pub fn sharpe(
    series: &[f64],
    benchmark: &[f64],
    denominator: SharpeDenominator,
) -> RotationResult<f64> {
    let volatility = match denominator {
        SharpeDenominator::Benchmark => std_dev(benchmark)?,
        SharpeDenominator::Own => std_dev(series)?,
    };
    if volatility == 0.0 {
        return Err(RotationError::insufficient_sample("sharpe: 변동성 0", 2, 1));
    }
    Ok(mean(series)? / volatility)
}

/// 시장 초과 수익률에 대한 초과 수익률의 단일 팩터 OLS 기울기.
pub fn beta(series: &[f64], market: &[f64], risk_free: &[f64]) -> RotationResult<f64> {
    if series.len() != market.len() || series.len() != risk_free.len() {
        return Err(RotationError::InvalidInput(format!(
            "베타 입력 길이가 다름: series {}, market {}, risk_free {}",
            series.len(),
            market.len(),
            risk_free.len()
        )));
    }

    let excess: Vec<f64> = series.iter().zip(risk_free).map(|(r, rf)| r - rf).collect();
    let market_excess: Vec<f64> = market.iter().zip(risk_free).map(|(m, rf)| m - rf).collect();

    let variance = covariance(&market_excess, &market_excess)?;
    if variance == 0.0 {
        return Err(RotationError::insufficient_sample("beta: 시장 분산 0", 2, 1));
    }
    Ok(covariance(&market_excess, &excess)? / variance)
}

/// 트레이너 비율.
pub fn treynor(series: &[f64], beta: f64) -> RotationResult<f64> {
    if beta == 0.0 {
        return Err(RotationError::insufficient_sample("treynor: 베타 0", 1, 0));
    }
    Ok(mean(series)? / beta)
}

/// 소르티노 비율.
///
/// 음수 수익률이 2개 미만이면 하방 편차를 정의할 수 없으므로 에러입니다.
pub fn sortino(series: &[f64]) -> RotationResult<f64> {
    let downside = downside_std_dev(series)?;
    if downside == 0.0 {
        return Err(RotationError::insufficient_sample("sortino: 하방 편차 0", 2, 1));
    }
    Ok(mean(series)? / downside)
}

/// 표본에 대해 정의되지 않은 지표와 그 원인.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndefinedMetric {
    /// `RiskMetrics` 필드 이름 (예: "sortino")
    pub field: String,
    /// 실패한 계산 단계 (예: "downside_std_dev")
    pub reason: String,
    pub required: usize,
    pub actual: usize,
}

/// 한 수익률 시계열의 위험 지표.
///
/// 표본에 대해 정의되지 않는 비율 지표는 `None`이며, 원인은 `undefined`에 남습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// 관측 기간 수
    pub observations: usize,
    /// 평균 기간 수익률
    pub mean: f64,
    /// 표본 표준편차
    pub std_dev: f64,
    /// 하방 표본 표준편차
    pub downside_std_dev: Option<f64>,
    pub sharpe: Option<f64>,
    pub treynor: Option<f64>,
    pub sortino: Option<f64>,
    pub beta: Option<f64>,
    /// 누적 수익률
    pub total_return: f64,
    /// 최대 낙폭 (양수 비율)
    pub max_drawdown: f64,
    /// `None`으로 기록된 지표의 원인
    #[serde(default)]
    pub undefined: Vec<UndefinedMetric>,
}

impl RiskMetrics {
    /// 시계열과 정렬된 벤치마크 수익률로 지표를 계산합니다.
    ///
    /// `beta`는 호출자가 미리 계산한 값입니다 (벤치마크는 1.0).
    pub fn compute(
        series: &[f64],
        benchmark: &[f64],
        beta: Option<f64>,
        denominator: SharpeDenominator,
    ) -> RotationResult<Self> {
        let mean = mean(series)?;
        let std_dev = std_dev(series)?;

        let mut undefined = Vec::new();
        let downside_std_dev =
            optional("downside_std_dev", downside_std_dev(series), &mut undefined)?;
        let sharpe = optional("sharpe", sharpe(series, benchmark, denominator), &mut undefined)?;
        let treynor = match beta {
            Some(b) => optional("treynor", treynor(series, b), &mut undefined)?,
            None => None,
        };
        let sortino = optional("sortino", sortino(series), &mut undefined)?;

        Ok(Self {
            observations: series.len(),
            mean,
            std_dev,
            downside_std_dev,
            sharpe,
            treynor,
            sortino,
            beta,
            total_return: total_return(series),
            max_drawdown: max_drawdown(series),
            undefined,
        })
    }

    /// 필드가 `None`으로 기록된 원인.
    pub fn undefined_reason(&self, field: &str) -> Option<&UndefinedMetric> {
        self.undefined.iter().find(|u| u.field == field)
    }

    /// 요약 문자열.
    pub fn summary(&self) -> String {
        format!(
            "기간: {} | 누적: {:.2}% | 평균: {:.4} | 표준편차: {:.4} | 샤프: {} | 트레이너: {} | 소르티노: {} | 베타: {} | MDD: {:.2}%",
            self.observations,
            self.total_return * 100.0,
            self.mean,
            self.std_dev,
            fmt_ratio(self.sharpe),
            fmt_ratio(self.treynor),
            fmt_ratio(self.sortino),
            fmt_ratio(self.beta),
            self.max_drawdown * 100.0,
        )
    }
}

/// 전략과 벤치마크의 지표 기록.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub strategy: RiskMetrics,
    pub benchmark: RiskMetrics,
}

impl MetricsRecord {
    /// 실현 전략 수익률과 같은 기간의 벤치마크로 지표를 계산합니다.
    pub fn compute(
        realized: &ReturnSeries,
        table: &PeriodReturnTable,
        denominator: SharpeDenominator,
    ) -> RotationResult<Self> {
        let mut market = Vec::with_capacity(realized.len());
        let mut risk_free = Vec::with_capacity(realized.len());

        for point in realized.points() {
            let row = table.benchmark_at(point.period).ok_or_else(|| {
                RotationError::InvalidInput(format!(
                    "{} 기간의 벤치마크 수익률이 테이블에 없음",
                    point.period
                ))
            })?;
            market.push(row.market);
            risk_free.push(row.risk_free);
        }

        let strategy = realized.values();
        let mut beta_undefined = Vec::new();
        let strategy_beta = optional(
            "beta",
            beta(&strategy, &market, &risk_free),
            &mut beta_undefined,
        )?;

        let mut strategy_metrics =
            RiskMetrics::compute(&strategy, &market, strategy_beta, denominator)?;
        strategy_metrics.undefined.splice(0..0, beta_undefined);

        let record = Self {
            strategy: strategy_metrics,
            benchmark: RiskMetrics::compute(&market, &market, Some(BENCHMARK_BETA), denominator)?,
        };

        tracing::info!(
            periods = strategy.len(),
            strategy_total = record.strategy.total_return,
            benchmark_total = record.benchmark.total_return,
            "성과 지표 계산 완료"
        );

        Ok(record)
    }
}

/// 표본 부족만 `None`으로 기록하고 원인을 `undefined`에 남깁니다. 나머지 에러는 전파합니다.
fn optional(
    field: &str,
    result: RotationResult<f64>,
    undefined: &mut Vec<UndefinedMetric>,
) -> RotationResult<Option<f64>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(RotationError::InsufficientSample {
            metric,
            required,
            actual,
        }) => {
            tracing::warn!(field, %metric, required, actual, "지표를 정의할 수 없는 표본");
            undefined.push(UndefinedMetric {
                field: field.to_string(),
                reason: metric,
                required,
                actual,
            });
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn fmt_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.4}", v))
}
