//! 회귀 기여도 분석.
//!
//! 초과 수익률을 시장 초과 수익률(및 규모/가치 팩터)에 OLS로 회귀하여
//! 알파, 팩터 노출도, 표준오차, p-value를 계산합니다.
//!
//! # 모델
//!
//! - CAPM: `r - rf = α + β·(m - rf) + ε`
//! - 3팩터: `r - rf = α + β·(m - rf) + s·SMB + h·HML + ε`
//!
//! p-value는 자유도 `n - k`의 Student-t 분포 양측 검정입니다.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use rotation_core::{PeriodReturnTable, PortfolioId, ReturnSeries, RotationError, RotationResult};

pub use rotation_core::FactorModelKind as FactorModel;

/// 절편 계수 이름.
pub const INTERCEPT: &str = "const";

/// 시장 초과 수익률 팩터 이름.
pub const MARKET_EXCESS: &str = "mkt_rf";

pub const SMB: &str = "smb";
pub const HML: &str = "hml";

/// 회귀 계수 하나.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_stat: f64,
    /// 양측 검정 p-value
    pub p_value: f64,
}

/// OLS 적합 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionSummary {
    /// 관측치 수 n
    pub n_obs: usize,
    /// 잔차 자유도 n - k
    pub df_resid: usize,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    /// 절편(`const`)이 첫 번째
    pub coefficients: Vec<Coefficient>,
}

impl RegressionSummary {
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }

    /// 절편 (알파).
    pub fn alpha(&self) -> Option<&Coefficient> {
        self.coefficient(INTERCEPT)
    }

    /// 시장 초과 수익률 노출도.
    pub fn market_beta(&self) -> Option<&Coefficient> {
        self.coefficient(MARKET_EXCESS)
    }
}

/// 절편이 포함된 최소제곱 회귀.
///
/// 모든 입력은 같은 길이여야 하며, 관측치 수는 계수 수보다 많아야 합니다.
pub fn ols(y: &[f64], regressors: &[(&str, &[f64])]) -> RotationResult<RegressionSummary> {
    let n = y.len();
    let k = regressors.len() + 1;

    for (name, x) in regressors {
        if x.len() != n {
            return Err(RotationError::InvalidInput(format!(
                "회귀 변수 {} 길이({})가 종속 변수 길이({})와 다름",
                name,
                x.len(),
                n
            )));
        }
    }
    if y
        .iter()
        .chain(regressors.iter().flat_map(|(_, x)| x.iter()))
        .any(|v| !v.is_finite())
    {
        return Err(RotationError::InvalidInput(
            "회귀 입력에 NaN 또는 무한대 값이 있음".to_string(),
        ));
    }
    if n <= k {
        return Err(RotationError::insufficient_sample("ols", k + 1, n));
    }

    // [1, x1, x2, ...]
    let x = DMatrix::from_fn(n, k, |i, j| if j == 0 { 1.0 } else { regressors[j - 1].1[i] });
    let y_vec = DVector::from_column_slice(y);

    let svd = x.clone().svd(false, false);
    let tolerance = svd.singular_values.max() * n as f64 * f64::EPSILON;
    if svd.rank(tolerance) < k {
        return Err(RotationError::SingularDesign(format!(
            "설계 행렬의 계수가 부족함 (rank < {})",
            k
        )));
    }

    // β = (X'X)^(-1) X'y
    let xtx = x.transpose() * &x;
    let xtx_inv = xtx
        .try_inverse()
        .ok_or_else(|| RotationError::SingularDesign("X'X 역행렬이 존재하지 않음".to_string()))?;
    let beta = &xtx_inv * (x.transpose() * &y_vec);

    let residuals = &y_vec - &x * &beta;
    let sse: f64 = residuals.iter().map(|r| r * r).sum();
    let df_resid = n - k;
    let sigma2 = sse / df_resid as f64;

    let y_mean = y.iter().sum::<f64>() / n as f64;
    let sst: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
    let r_squared = if sst > 0.0 { 1.0 - sse / sst } else { 0.0 };
    let adj_r_squared = 1.0 - (1.0 - r_squared) * (n - 1) as f64 / df_resid as f64;

    let t_dist = StudentsT::new(0.0, 1.0, df_resid as f64)
        .map_err(|e| RotationError::InvalidInput(format!("t 분포 생성 실패: {}", e)))?;

    let coefficients = (0..k)
        .map(|j| {
            let name = if j == 0 { INTERCEPT } else { regressors[j - 1].0 };
            let estimate = beta[j];
            let std_error = (sigma2 * xtx_inv[(j, j)]).sqrt();
            let t_stat = estimate / std_error;
            let p_value = 2.0 * (1.0 - t_dist.cdf(t_stat.abs()));
            Coefficient {
                name: name.to_string(),
                estimate,
                std_error,
                t_stat,
                p_value,
            }
        })
        .collect();

    Ok(RegressionSummary {
        n_obs: n,
        df_resid,
        r_squared,
        adj_r_squared,
        coefficients,
    })
}

/// 수익률 시계열의 팩터 모델을 적합합니다.
///
/// 종속 변수는 시계열 기간의 `r - rf`입니다.
pub fn attribute(
    series: &ReturnSeries,
    table: &PeriodReturnTable,
    model: FactorModel,
) -> RotationResult<RegressionSummary> {
    if model == FactorModel::ThreeFactor && table.factors().is_none() {
        return Err(RotationError::Configuration(
            "3팩터 모델에는 SMB/HML 팩터 수익률이 필요함".to_string(),
        ));
    }

    let mut excess = Vec::with_capacity(series.len());
    let mut market = Vec::with_capacity(series.len());
    let mut smb = Vec::new();
    let mut hml = Vec::new();

    for point in series.points() {
        let bench = table.benchmark_at(point.period).ok_or_else(|| {
            RotationError::InvalidInput(format!(
                "{} 시계열의 {} 기간이 테이블에 없음",
                series.name(),
                point.period
            ))
        })?;
        excess.push(point.value - bench.risk_free);
        market.push(bench.market_excess());

        if model == FactorModel::ThreeFactor {
            let factors = table.factors_at(point.period).ok_or_else(|| {
                RotationError::InvalidInput(format!("{} 기간의 팩터 수익률이 없음", point.period))
            })?;
            smb.push(factors.smb);
            hml.push(factors.hml);
        }
    }

    let regressors: Vec<(&str, &[f64])> = match model {
        FactorModel::Capm => vec![(MARKET_EXCESS, market.as_slice())],
        FactorModel::ThreeFactor => vec![
            (MARKET_EXCESS, market.as_slice()),
            (SMB, smb.as_slice()),
            (HML, hml.as_slice()),
        ],
    };

    let summary = ols(&excess, &regressors)?;

    tracing::debug!(
        series = series.name(),
        ?model,
        n_obs = summary.n_obs,
        r_squared = summary.r_squared,
        "팩터 회귀 적합"
    );

    Ok(summary)
}

/// 포트폴리오별 및 전략 팩터 회귀 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionReport {
    pub model: FactorModel,
    /// 각 포트폴리오의 전체 기간 회귀 (비어 있을 수 있음)
    pub per_portfolio: Vec<(PortfolioId, RegressionSummary)>,
    /// 실현 전략 수익률 회귀
    pub strategy: RegressionSummary,
}

impl AttributionReport {
    pub fn compute(
        realized: &ReturnSeries,
        table: &PeriodReturnTable,
        model: FactorModel,
        per_portfolio: bool,
    ) -> RotationResult<Self> {
        let per_portfolio = if per_portfolio {
            table
                .portfolio_ids()
                .map(|id| -> RotationResult<(PortfolioId, RegressionSummary)> {
                    let series = table.portfolio_series(id)?;
                    Ok((id, attribute(&series, table, model)?))
                })
                .collect::<RotationResult<Vec<_>>>()?
        } else {
            Vec::new()
        };

        let strategy = attribute(realized, table, model)?;

        tracing::info!(
            ?model,
            portfolios = per_portfolio.len(),
            strategy_alpha = strategy.alpha().map(|c| c.estimate),
            "기여도 분석 완료"
        );

        Ok(Self {
            model,
            per_portfolio,
            strategy,
        })
    }
}
