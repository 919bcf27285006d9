//! 로테이션 선택 규칙.
//!
//! 한 기간의 포트폴리오 수익률로 다음 기간에 보유할 포트폴리오를 결정합니다.
//!
//! # 규칙
//!
//! 1. 모든 포트폴리오를 해당 기간 수익률 내림차순으로 정렬 (동률이면 낮은 ID 우선)
//! 2. 1순위가 집중 포트폴리오가 아니면 1순위만 100% 보유
//! 3. 1순위가 집중 포트폴리오면 1순위와 2순위를 50:50으로 보유
//!
//! # 예시
//!
//! ```rust,ignore
//! use rotation_analytics::selection::SelectionRule;
//! use rotation_core::ConcentrationSet;
//!
//! let rule = SelectionRule::new(6, ConcentrationSet::from_ids([3u32]))?;
//! let decision = rule.decide(&row)?; // row.period().next() 에 적용
//! println!("{}", decision.describe());
//! ```

use std::cmp::Ordering;

use rotation_core::{
    ConcentrationSet, Decision, PortfolioId, PortfolioReturnRow, RotationError, RotationResult,
};

/// 모멘텀 로테이션 선택 규칙.
#[derive(Debug, Clone)]
pub struct SelectionRule {
    universe: usize,
    concentration: ConcentrationSet,
}

impl SelectionRule {
    /// 포트폴리오 수 N과 집중 포트폴리오 집합으로 규칙을 생성합니다.
    pub fn new(universe: usize, concentration: ConcentrationSet) -> RotationResult<Self> {
        if universe == 0 {
            return Err(RotationError::Configuration(
                "포트폴리오 수는 1 이상이어야 함".to_string(),
            ));
        }
        concentration.validate(universe)?;

        if concentration.is_empty() {
            tracing::warn!(universe, "집중 포트폴리오가 없음: 항상 1순위만 단독 보유");
        }

        Ok(Self {
            universe,
            concentration,
        })
    }

    pub fn universe(&self) -> usize {
        self.universe
    }

    pub fn concentration(&self) -> &ConcentrationSet {
        &self.concentration
    }

    /// 수익률 내림차순 순위. 동률이면 낮은 포트폴리오 ID가 앞섭니다.
    pub fn rank(&self, row: &PortfolioReturnRow) -> RotationResult<Vec<(PortfolioId, f64)>> {
        row.ensure_complete(self.universe)?;

        let mut ranked: Vec<(PortfolioId, f64)> = PortfolioId::universe(self.universe)
            .filter_map(|id| row.get(id).map(|r| (id, r)))
            .collect();

        ranked.sort_by(|(id_a, r_a), (id_b, r_b)| {
            r_b.partial_cmp(r_a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| id_a.cmp(id_b))
        });

        Ok(ranked)
    }

    /// `row` 기간의 수익률로 다음 기간의 결정을 만듭니다.
    pub fn decide(&self, row: &PortfolioReturnRow) -> RotationResult<Decision> {
        let ranked = self.rank(row)?;
        let apply_to = row.period().next();

        let (top, top_return) = ranked[0];

        if !self.concentration.contains(top) {
            tracing::debug!(
                signal = %row.period(),
                period = %apply_to,
                top = %top,
                top_return,
                "단독 보유 결정"
            );
            return Ok(Decision::single(apply_to, top));
        }

        let (second, second_return) =
            ranked
                .get(1)
                .copied()
                .ok_or(RotationError::InsufficientData {
                    period: row.period(),
                    expected: 2,
                    actual: ranked.len(),
                })?;

        tracing::debug!(
            signal = %row.period(),
            period = %apply_to,
            top = %top,
            top_return,
            second = %second,
            second_return,
            "집중 포트폴리오 1순위: 차순위와 50:50 보유"
        );

        Ok(Decision::paired(apply_to, top, second))
    }
}
