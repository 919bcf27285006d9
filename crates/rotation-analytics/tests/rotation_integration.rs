//! 로테이션 백테스트 통합 테스트
//!
//! 테이블 구성 → 시뮬레이션 → 누적 수익률 → 성과 지표 → 기여도 분석의
//! 전체 흐름을 검증합니다.

use proptest::prelude::*;

use rotation_analytics::backtest::RotationSimulator;
use rotation_analytics::performance::{cumulative_returns, mean, std_dev, MetricsRecord};
use rotation_analytics::report::{RotationReport, RotationSettings};
use rotation_analytics::selection::SelectionRule;
use rotation_analytics::{FactorModel, SharpeDenominator};
use rotation_core::{
    BenchmarkRow, ConcentrationSet, Period, PeriodReturnTable, PortfolioId, PortfolioReturnRow,
    RotationError,
};

/// 포트폴리오별 열(column)과 시장 수익률로 분기 테이블을 만듭니다.
fn build_table(columns: &[Vec<f64>], market: &[f64]) -> PeriodReturnTable {
    let periods: Vec<Period> = (0..market.len())
        .map(|i| Period::quarter(2010 + (i / 4) as i32, (i % 4) as u32 + 1).unwrap())
        .collect();

    let rows = periods
        .iter()
        .enumerate()
        .map(|(t, p)| {
            PortfolioReturnRow::new(
                *p,
                columns
                    .iter()
                    .enumerate()
                    .map(|(i, col)| (i as u32 + 1, col[t])),
            )
        })
        .collect();
    let benchmark = periods
        .iter()
        .zip(market)
        .map(|(p, m)| BenchmarkRow::new(*p, *m, 0.0))
        .collect();

    PeriodReturnTable::new(rows, benchmark, None).unwrap()
}

fn scenario_table() -> PeriodReturnTable {
    build_table(
        &[
            vec![0.01, 0.02, -0.01, 0.03],
            vec![0.02, 0.01, 0.04, -0.02],
            vec![0.05, -0.03, 0.02, 0.01],
        ],
        &[0.02, 0.01, -0.01, 0.015],
    )
}

fn simulator(universe: usize, concentration: &[u32]) -> RotationSimulator {
    let rule = SelectionRule::new(
        universe,
        ConcentrationSet::from_ids(concentration.iter().copied()),
    )
    .unwrap();
    RotationSimulator::new(rule)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_scenario_decisions_and_returns() {
    let table = scenario_table();
    let run = simulator(3, &[3]).run(&table).unwrap();
    let outcomes = run.outcomes();

    // 1기: 결정 없음
    assert!(outcomes[0].decision.is_none());
    assert!(outcomes[0].strategy_return.is_none());

    // 2기: P3(0.05)가 집중 포트폴리오 → 2위 P2(0.02)와 50:50
    let d2 = outcomes[1].decision.unwrap();
    assert_eq!(d2.primary(), PortfolioId::new(3));
    assert_eq!(d2.secondary(), Some(PortfolioId::new(2)));
    assert_eq!(d2.weights(), (0.5, 0.5));
    assert_eq!(d2.signal_period(), table.periods()[0]);

    // 3기: P1(0.02) 단독, 4기: P2(0.04) 단독
    let d3 = outcomes[2].decision.unwrap();
    assert_eq!(d3.primary(), PortfolioId::new(1));
    assert!(!d3.is_paired());
    assert_eq!(outcomes[3].decision.unwrap().primary(), PortfolioId::new(2));

    let returns = run.strategy_returns();
    assert_eq!(returns[0], None);
    let expected = [-0.01, -0.01, -0.02];
    for (actual, expected) in returns[1..].iter().zip(expected) {
        assert!(close(actual.unwrap(), expected));
    }
}

#[test]
fn test_scenario_cumulative_and_metrics() {
    let table = scenario_table();
    let run = simulator(3, &[3]).run(&table).unwrap();
    let realized = run.realized().unwrap();

    let cum = cumulative_returns(&realized.values());
    assert!(close(*cum.last().unwrap(), 0.99 * 0.99 * 0.98 - 1.0));
    assert!(close(*cum.last().unwrap(), -0.039502));

    let record = MetricsRecord::compute(&realized, &table, SharpeDenominator::Benchmark).unwrap();
    let strategy = &record.strategy;
    assert_eq!(strategy.observations, 3);
    assert!(close(strategy.mean, -0.04 / 3.0));
    assert!(close(strategy.std_dev, (1.0_f64 / 30_000.0).sqrt()));

    let benchmark_sd = std_dev(&[0.01, -0.01, 0.015]).unwrap();
    assert!(close(strategy.sharpe.unwrap(), strategy.mean / benchmark_sd));
    // 모든 실현 수익률이 음수이므로 하방 편차 = 표준편차
    assert!(close(strategy.sortino.unwrap(), strategy.mean / strategy.std_dev));
    assert!(close(record.benchmark.mean, mean(&[0.01, -0.01, 0.015]).unwrap()));
    assert_eq!(record.benchmark.beta, Some(1.0));
}

#[test]
fn test_mutating_row_only_changes_later_decisions() {
    let base = simulator(3, &[3]).run(&scenario_table()).unwrap();

    // 3기 행에서 P3(0.02 → 0.10)를 1위로 올림
    let mutated_table = build_table(
        &[
            vec![0.01, 0.02, -0.01, 0.03],
            vec![0.02, 0.01, 0.04, -0.02],
            vec![0.05, -0.03, 0.10, 0.01],
        ],
        &[0.02, 0.01, -0.01, 0.015],
    );
    let mutated = simulator(3, &[3]).run(&mutated_table).unwrap();

    // 3기 결정은 2기 행으로 만들어지므로 그대로
    for t in 0..=2 {
        assert_eq!(base.outcomes()[t].decision, mutated.outcomes()[t].decision);
    }
    assert_eq!(base.outcomes()[2].strategy_return, mutated.outcomes()[2].strategy_return);

    // 4기 결정은 바뀐 3기 행을 따름: P2 단독 → P3 + P2
    let before = base.outcomes()[3].decision.unwrap();
    let after = mutated.outcomes()[3].decision.unwrap();
    assert_eq!(before.primary(), PortfolioId::new(2));
    assert!(!before.is_paired());
    assert_eq!(after.primary(), PortfolioId::new(3));
    assert_eq!(after.secondary(), Some(PortfolioId::new(2)));
}

#[test]
fn test_cumulative_matches_product_within_tolerance() {
    let table = build_table(
        &[
            vec![0.03, -0.02, 0.015, 0.04, -0.01, 0.02, 0.005, -0.03],
            vec![-0.01, 0.05, 0.00, -0.02, 0.03, 0.01, 0.02, 0.04],
            vec![0.02, 0.01, -0.03, 0.06, 0.00, -0.02, 0.01, 0.02],
            vec![0.00, 0.02, 0.02, -0.01, 0.04, 0.03, -0.02, 0.01],
        ],
        &[0.01, 0.02, -0.01, 0.03, 0.00, 0.01, 0.02, -0.02],
    );
    let report = RotationReport::run(
        &table,
        &RotationSettings::new(ConcentrationSet::from_ids([3u32, 4u32])),
    )
    .unwrap();

    let product: f64 = report
        .strategy_returns
        .iter()
        .flatten()
        .fold(1.0, |w, r| w * (1.0 + r))
        - 1.0;
    assert!((report.strategy_total_return() - product).abs() < 1e-9);
    assert!((report.strategy_cumulative.last().unwrap().value - product).abs() < 1e-9);
}

#[test]
fn test_sortino_without_negative_returns_is_insufficient_sample() {
    let gains = [0.01, 0.02, 0.03];
    let err = rotation_analytics::performance::sortino(&gains).unwrap_err();
    assert!(matches!(err, RotationError::InsufficientSample { .. }));
}

#[test]
fn test_report_with_own_sharpe_denominator() {
    let table = scenario_table();
    let settings = RotationSettings::new(ConcentrationSet::from_ids([3u32]))
        .with_sharpe_denominator(SharpeDenominator::Own)
        .with_attribution(FactorModel::Capm, true);
    let report = RotationReport::run(&table, &settings).unwrap();

    let strategy = &report.metrics.strategy;
    assert!(close(strategy.sharpe.unwrap(), strategy.mean / strategy.std_dev));

    // 전략 회귀: 관측치 3개, 계수 2개
    let attribution = report.attribution.unwrap();
    assert_eq!(attribution.strategy.n_obs, 3);
    assert_eq!(attribution.strategy.df_resid, 1);
    assert_eq!(attribution.per_portfolio.len(), 3);
}

#[test]
fn test_single_concentrated_portfolio_universe_fails() {
    let table = build_table(&[vec![0.01, 0.02, 0.03]], &[0.01, 0.02, 0.00]);
    let err = simulator(1, &[1]).run(&table).unwrap_err();
    assert!(matches!(
        err,
        RotationError::InsufficientData {
            expected: 2,
            actual: 1,
            ..
        }
    ));
}

fn table_inputs() -> impl Strategy<Value = (Vec<Vec<f64>>, Vec<f64>)> {
    (3usize..12).prop_flat_map(|periods| {
        (
            prop::collection::vec(prop::collection::vec(-0.2f64..0.2, periods), 4),
            prop::collection::vec(-0.1f64..0.1, periods),
        )
    })
}

proptest! {
    #[test]
    fn prop_future_rows_do_not_change_past_decisions(
        (columns, market) in table_inputs(),
        cut in 0usize..10,
        shocks in prop::collection::vec(-0.5f64..0.5, 4),
    ) {
        let periods = market.len();
        let cut = cut % (periods - 1);
        let concentration = [2u32, 4u32];

        let base = simulator(4, &concentration).run(&build_table(&columns, &market)).unwrap();

        // 포트폴리오별로 다른 충격을 주어 cut 이후 행의 순위를 바꿈
        let perturbed_columns: Vec<Vec<f64>> = columns
            .iter()
            .zip(&shocks)
            .map(|(col, shock)| {
                col.iter()
                    .enumerate()
                    .map(|(t, r)| if t > cut { r + shock } else { *r })
                    .collect()
            })
            .collect();
        let perturbed = simulator(4, &concentration)
            .run(&build_table(&perturbed_columns, &market))
            .unwrap();

        // row[t]로 만든 결정은 t+1기에 적용됨: 0..=cut+1 기간의 결정은 동일해야 함
        for t in 0..=cut + 1 {
            prop_assert_eq!(base.outcomes()[t].decision, perturbed.outcomes()[t].decision);
        }
    }

    #[test]
    fn prop_strategy_cumulative_recurrence((columns, market) in table_inputs()) {
        let report = RotationReport::run(
            &build_table(&columns, &market),
            &RotationSettings::new(ConcentrationSet::from_ids([1u32])).without_attribution(),
        )
        .unwrap();

        let returns: Vec<f64> = report.strategy_returns.iter().flatten().copied().collect();
        let cum = report.strategy_cumulative.values();
        prop_assert_eq!(cum.len(), returns.len());

        let mut prev = 0.0;
        for (c, r) in cum.iter().zip(&returns) {
            prop_assert!((c - ((1.0 + prev) * (1.0 + r) - 1.0)).abs() < 1e-9);
            prev = *c;
        }

        // 재계산해도 같은 결과
        let again = cumulative_returns(&returns);
        prop_assert_eq!(cum, again);
    }

    #[test]
    fn prop_weights_always_sum_to_one((columns, market) in table_inputs()) {
        let run = simulator(4, &[1, 2, 3]).run(&build_table(&columns, &market)).unwrap();
        for decision in run.decisions() {
            let (w1, w2) = decision.weights();
            prop_assert!((w1 + w2 - 1.0).abs() < 1e-12);
            prop_assert_eq!(decision.is_paired(), decision.secondary().is_some());
        }
    }
}
