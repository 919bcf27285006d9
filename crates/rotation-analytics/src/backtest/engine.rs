//! 로테이션 시뮬레이터
//!
//! 기간 수익률 테이블을 시간 순으로 한 번 순회하며 각 기간의 결정과
//! 실현 전략 수익률을 만듭니다.
//!
//! # 동작
//!
//! - 1기: 직전 데이터가 없으므로 결정과 수익률 모두 `None`
//! - t기 (t ≥ 2): `decide(row[t-1])` → `Σ wᵢ · r[t][pᵢ]`
//!
//! 결정은 오직 직전 기간의 행으로만 만들어지며 이미 만든 결정은 수정하지 않습니다.
//! 선택된 포트폴리오의 수익률이 없으면 0으로 대체하지 않고 즉시 중단합니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use rotation_analytics::backtest::RotationSimulator;
//! use rotation_analytics::selection::SelectionRule;
//!
//! let rule = SelectionRule::new(table.universe(), concentration)?;
//! let run = RotationSimulator::new(rule).run(&table)?;
//!
//! for outcome in run.outcomes() {
//!     println!("{}: {:?}", outcome.period, outcome.strategy_return);
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use rotation_core::{
    Decision, PeriodOutcome, PeriodReturnTable, PortfolioId, PortfolioReturnRow, ReturnSeries,
    RotationError, RotationResult,
};

use crate::selection::SelectionRule;

/// 시뮬레이션 결과 전략 시계열 이름.
pub const STRATEGY_SERIES: &str = "strategy";

/// 로테이션 시뮬레이터.
#[derive(Debug, Clone)]
pub struct RotationSimulator {
    rule: SelectionRule,
}

impl RotationSimulator {
    pub fn new(rule: SelectionRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> &SelectionRule {
        &self.rule
    }

    /// 전체 테이블을 시뮬레이션합니다.
    pub fn run(&self, table: &PeriodReturnTable) -> RotationResult<RotationRun> {
        if table.universe() != self.rule.universe() {
            return Err(RotationError::Configuration(format!(
                "선택 규칙의 포트폴리오 수({})가 테이블({})과 다름",
                self.rule.universe(),
                table.universe()
            )));
        }

        let rows = table.rows();
        let mut outcomes = Vec::with_capacity(rows.len());
        outcomes.push(PeriodOutcome::undefined(rows[0].period()));

        for pair in rows.windows(2) {
            outcomes.push(self.step(&pair[0], &pair[1])?);
        }

        let run = RotationRun { outcomes };

        tracing::info!(
            periods = table.len(),
            realized = run.realized_count(),
            paired = run.paired_count(),
            "로테이션 시뮬레이션 완료"
        );

        Ok(run)
    }

    /// 한 단계: 직전 기간 행으로 결정하고 현재 기간 행으로 실현합니다.
    pub fn step(
        &self,
        prev: &PortfolioReturnRow,
        current: &PortfolioReturnRow,
    ) -> RotationResult<PeriodOutcome> {
        let decision = self.rule.decide(prev)?;

        if decision.period() != current.period() {
            return Err(RotationError::InvalidInput(format!(
                "{} 기간 결정을 {} 기간 행에 적용할 수 없음",
                decision.period(),
                current.period()
            )));
        }

        let strategy_return = realize(&decision, current)?;

        tracing::debug!(
            period = %decision.period(),
            holdings = %decision.describe(),
            strategy_return,
            "기간 실현"
        );

        Ok(PeriodOutcome::realized(decision, strategy_return))
    }
}

/// 결정을 현재 기간 수익률로 실현합니다: `Σ wᵢ · r[pᵢ]`.
pub fn realize(decision: &Decision, current: &PortfolioReturnRow) -> RotationResult<f64> {
    decision
        .holdings()
        .into_iter()
        .try_fold(0.0, |acc, (id, weight)| {
            let r = current
                .get(id)
                .filter(|r| r.is_finite())
                .ok_or(RotationError::MissingReturn {
                    period: current.period(),
                    portfolio: id,
                })?;
            Ok(acc + weight * r)
        })
}

/// 시뮬레이션 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationRun {
    outcomes: Vec<PeriodOutcome>,
}

impl RotationRun {
    /// 모든 기간의 결과 (1기 포함).
    pub fn outcomes(&self) -> &[PeriodOutcome] {
        &self.outcomes
    }

    /// 2..T 기간의 결정.
    pub fn decisions(&self) -> Vec<Decision> {
        self.outcomes.iter().filter_map(|o| o.decision).collect()
    }

    /// 길이 T의 전략 수익률 (1기는 `None`).
    pub fn strategy_returns(&self) -> Vec<Option<f64>> {
        self.outcomes.iter().map(|o| o.strategy_return).collect()
    }

    /// 실현된 2..T 기간의 전략 수익률 시계열.
    pub fn realized(&self) -> RotationResult<ReturnSeries> {
        ReturnSeries::from_points(
            STRATEGY_SERIES,
            self.outcomes
                .iter()
                .filter_map(|o| o.strategy_return.map(|r| (o.period, r))),
        )
    }

    pub fn realized_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.strategy_return.is_some())
            .count()
    }

    /// 50:50 보유 기간 수.
    pub fn paired_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.decision.is_some_and(|d| d.is_paired()))
            .count()
    }

    /// 포트폴리오별 보유 기간 수.
    pub fn holding_counts(&self) -> BTreeMap<PortfolioId, usize> {
        let mut counts = BTreeMap::new();
        for decision in self.outcomes.iter().filter_map(|o| o.decision) {
            for (id, _) in decision.holdings() {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        counts
    }
}
