//! 로테이션 백테스트 리포트.
//!
//! 시뮬레이션 → 누적 수익률 → 성과 지표 → 기여도 분석을 한 번에 실행하고
//! 직렬화 가능한 결과로 묶습니다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use rotation_core::{
    rotation_span, ConcentrationSet, Period, PeriodOutcome, PeriodReturnTable, PortfolioId,
    ReturnSeries, RotationConfig, RotationResult,
};

use crate::attribution::{AttributionReport, FactorModel};
use crate::backtest::RotationSimulator;
use crate::performance::{cumulative_series, MetricsRecord, SharpeDenominator};
use crate::selection::SelectionRule;

/// 기여도 분석 옵션.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionOptions {
    pub model: FactorModel,
    pub per_portfolio: bool,
}

/// 리포트 실행 설정.
#[derive(Debug, Clone)]
pub struct RotationSettings {
    pub concentration: ConcentrationSet,
    pub sharpe_denominator: SharpeDenominator,
    /// `None`이면 기여도 분석 생략
    pub attribution: Option<AttributionOptions>,
}

impl RotationSettings {
    /// 기본 지표 설정과 CAPM 기여도 분석.
    pub fn new(concentration: ConcentrationSet) -> Self {
        Self {
            concentration,
            sharpe_denominator: SharpeDenominator::default(),
            attribution: Some(AttributionOptions {
                model: FactorModel::Capm,
                per_portfolio: true,
            }),
        }
    }

    pub fn with_sharpe_denominator(mut self, denominator: SharpeDenominator) -> Self {
        self.sharpe_denominator = denominator;
        self
    }

    pub fn with_attribution(mut self, model: FactorModel, per_portfolio: bool) -> Self {
        self.attribution = Some(AttributionOptions {
            model,
            per_portfolio,
        });
        self
    }

    pub fn without_attribution(mut self) -> Self {
        self.attribution = None;
        self
    }
}

impl From<&RotationConfig> for RotationSettings {
    fn from(config: &RotationConfig) -> Self {
        let settings = Self::new(config.concentration_set())
            .with_sharpe_denominator(config.metrics.sharpe_denominator);

        if config.attribution.enabled {
            settings.with_attribution(config.attribution.model, config.attribution.per_portfolio)
        } else {
            settings.without_attribution()
        }
    }
}

/// 백테스트 전체 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationReport {
    pub periods: Vec<Period>,
    pub concentration: Vec<PortfolioId>,
    /// 기간별 결정과 전략 수익률 (1기는 null)
    pub outcomes: Vec<PeriodOutcome>,
    pub strategy_returns: Vec<Option<f64>>,
    pub strategy_cumulative: ReturnSeries,
    pub benchmark_cumulative: ReturnSeries,
    pub holding_counts: BTreeMap<PortfolioId, usize>,
    pub metrics: MetricsRecord,
    pub attribution: Option<AttributionReport>,
}

impl RotationReport {
    /// 테이블 위에서 전체 파이프라인을 실행합니다.
    pub fn run(table: &PeriodReturnTable, settings: &RotationSettings) -> RotationResult<Self> {
        let periods = table.periods();
        let span = match (periods.first(), periods.last()) {
            (Some(first), Some(last)) => {
                rotation_span!("rotation_report", format!("{}..{}", first, last))
            }
            _ => rotation_span!("rotation_report"),
        };
        let _guard = span.enter();

        let rule = SelectionRule::new(table.universe(), settings.concentration.clone())?;
        let run = RotationSimulator::new(rule).run(table)?;
        let realized = run.realized()?;

        let market = ReturnSeries::from_points(
            "market",
            realized
                .periods()
                .into_iter()
                .filter_map(|p| table.benchmark_at(p).map(|b| (p, b.market))),
        )?;

        let metrics = MetricsRecord::compute(&realized, table, settings.sharpe_denominator)?;

        let attribution = settings
            .attribution
            .map(|opts| AttributionReport::compute(&realized, table, opts.model, opts.per_portfolio))
            .transpose()?;

        let report = Self {
            periods,
            concentration: settings.concentration.iter().collect(),
            outcomes: run.outcomes().to_vec(),
            strategy_returns: run.strategy_returns(),
            strategy_cumulative: cumulative_series(&realized)?,
            benchmark_cumulative: cumulative_series(&market)?,
            holding_counts: run.holding_counts(),
            metrics,
            attribution,
        };

        tracing::info!(summary = %report.summary(), "리포트 생성 완료");

        Ok(report)
    }

    /// 전략 최종 누적 수익률.
    pub fn strategy_total_return(&self) -> f64 {
        self.metrics.strategy.total_return
    }

    /// 한 줄 요약.
    pub fn summary(&self) -> String {
        let alpha = self
            .attribution
            .as_ref()
            .and_then(|a| a.strategy.alpha())
            .map_or_else(
                || "N/A".to_string(),
                |c| format!("{:.4} (p={:.3})", c.estimate, c.p_value),
            );

        format!(
            "기간 {}개 | 전략 누적 {:.2}% vs 벤치마크 {:.2}% | 전략 샤프 {} | 알파 {}",
            self.periods.len(),
            self.metrics.strategy.total_return * 100.0,
            self.metrics.benchmark.total_return * 100.0,
            self.metrics
                .strategy
                .sharpe
                .map_or_else(|| "N/A".to_string(), |s| format!("{:.4}", s)),
            alpha,
        )
    }

    /// JSON 문자열로 직렬화합니다.
    pub fn to_json(&self) -> RotationResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotation_core::{BenchmarkRow, PortfolioReturnRow};

    fn table() -> PeriodReturnTable {
        let returns = [
            [0.01, 0.02, -0.01, 0.03, 0.02, -0.01],
            [0.02, 0.01, 0.04, -0.02, 0.01, 0.03],
            [0.05, -0.03, 0.02, 0.01, -0.02, 0.00],
        ];
        let market = [0.02, -0.01, 0.025, 0.005, -0.015, 0.01];
        let periods: Vec<Period> = (0..6)
            .map(|i| Period::quarter(2010 + i / 4, (i % 4) as u32 + 1).unwrap())
            .collect();

        let rows = periods
            .iter()
            .enumerate()
            .map(|(t, p)| {
                PortfolioReturnRow::new(*p, (0..3).map(|i| (i as u32 + 1, returns[i][t])))
            })
            .collect();
        let benchmark = periods
            .iter()
            .zip(market)
            .map(|(p, m)| BenchmarkRow::new(*p, m, 0.001))
            .collect();
        PeriodReturnTable::new(rows, benchmark, None).unwrap()
    }

    #[test]
    fn test_report_pipeline() {
        let settings = RotationSettings::new(ConcentrationSet::from_ids([3u32]));
        let report = RotationReport::run(&table(), &settings).unwrap();

        assert_eq!(report.periods.len(), 6);
        assert_eq!(report.strategy_returns.len(), 6);
        assert_eq!(report.strategy_returns[0], None);
        assert_eq!(report.strategy_cumulative.len(), 5);
        assert_eq!(report.benchmark_cumulative.len(), 5);
        assert_eq!(report.concentration, vec![PortfolioId::new(3)]);

        let attribution = report.attribution.as_ref().unwrap();
        assert_eq!(attribution.model, FactorModel::Capm);
        assert_eq!(attribution.per_portfolio.len(), 3);
        assert_eq!(attribution.strategy.n_obs, 5);

        let last = report.strategy_cumulative.last().unwrap().value;
        assert!((last - report.strategy_total_return()).abs() < 1e-12);
        assert!(report.summary().contains("기간 6개"));
    }

    #[test]
    fn test_report_without_attribution_serializes() {
        let settings = RotationSettings::new(ConcentrationSet::empty()).without_attribution();
        let report = RotationReport::run(&table(), &settings).unwrap();
        assert!(report.attribution.is_none());
        assert!(report.summary().contains("알파 N/A"));

        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["strategy_returns"][0].is_null());
        assert_eq!(value["periods"][0], "2010Q1");

        let back: RotationReport = serde_json::from_str(&json).unwrap();
        let decisions = |r: &RotationReport| r.outcomes.iter().map(|o| o.decision).collect::<Vec<_>>();
        assert_eq!(decisions(&back), decisions(&report));
    }

    #[test]
    fn test_settings_from_config() {
        let config = RotationConfig::from_toml_str(
            r#"
            [strategy]
            concentration_portfolios = [2]

            [metrics]
            sharpe_denominator = "own"

            [attribution]
            enabled = false
            "#,
        )
        .unwrap();
        let settings = RotationSettings::from(&config);
        assert!(settings.concentration.contains(PortfolioId::new(2)));
        assert_eq!(settings.sharpe_denominator, SharpeDenominator::Own);
        assert!(settings.attribution.is_none());

        let default = RotationSettings::from(&RotationConfig::default());
        assert_eq!(
            default.attribution.map(|a| a.model),
            Some(FactorModel::ThreeFactor)
        );
    }

    #[test]
    fn test_three_factor_without_factor_rows_fails() {
        let settings = RotationSettings::new(ConcentrationSet::empty())
            .with_attribution(FactorModel::ThreeFactor, false);
        let err = RotationReport::run(&table(), &settings).unwrap_err();
        assert!(err.is_config_error());
    }
}
