//! 로테이션 결정 및 기간별 결과.

use serde::{Deserialize, Serialize};

use crate::error::RotationError;
use crate::types::{Period, PortfolioId};

/// 단독 보유 시 비중.
pub const SINGLE_WEIGHT: f64 = 1.0;

/// 집중 포트폴리오와 차순위 포트폴리오를 함께 보유할 때의 비중.
pub const PAIRED_WEIGHT: f64 = 0.5;

/// 한 기간에 적용할 로테이션 결정.
///
/// `period`는 결정이 적용되는 기간이며, 결정은 오직 직전 기간
/// (`signal_period`)의 수익률로만 만들어집니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DecisionRecord")]
pub struct Decision {
    period: Period,
    primary: PortfolioId,
    secondary: Option<PortfolioId>,
    /// (primary 비중, secondary 비중), 합계 1.0
    weights: (f64, f64),
}

impl Decision {
    /// 1순위 포트폴리오만 100% 보유하는 결정.
    pub fn single(period: Period, primary: PortfolioId) -> Self {
        Self {
            period,
            primary,
            secondary: None,
            weights: (SINGLE_WEIGHT, 0.0),
        }
    }

    /// 1순위와 2순위를 50:50으로 보유하는 결정.
    pub fn paired(period: Period, primary: PortfolioId, secondary: PortfolioId) -> Self {
        Self {
            period,
            primary,
            secondary: Some(secondary),
            weights: (PAIRED_WEIGHT, PAIRED_WEIGHT),
        }
    }

    /// 결정이 적용되는 기간.
    pub fn period(&self) -> Period {
        self.period
    }

    /// 결정의 근거가 된 기간 (적용 기간의 직전 기간).
    pub fn signal_period(&self) -> Period {
        self.period.prev()
    }

    pub fn primary(&self) -> PortfolioId {
        self.primary
    }

    pub fn secondary(&self) -> Option<PortfolioId> {
        self.secondary
    }

    pub fn weights(&self) -> (f64, f64) {
        self.weights
    }

    pub fn is_paired(&self) -> bool {
        self.secondary.is_some()
    }

    /// 비중이 0보다 큰 (포트폴리오, 비중) 목록.
    pub fn holdings(&self) -> Vec<(PortfolioId, f64)> {
        let mut holdings = vec![(self.primary, self.weights.0)];
        if let Some(secondary) = self.secondary {
            holdings.push((secondary, self.weights.1));
        }
        holdings
    }

    /// 해당 포트폴리오를 보유하는지 확인합니다.
    pub fn holds(&self, id: PortfolioId) -> bool {
        self.primary == id || self.secondary == Some(id)
    }

    /// 사람이 읽기 쉬운 보유 내역 (예: "P3 50% + P2 50%").
    pub fn describe(&self) -> String {
        self.holdings()
            .iter()
            .map(|(id, w)| format!("{} {:.0}%", id, w * 100.0))
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

/// 역직렬화 원본. [`Decision`]의 생성자 규칙으로 다시 검증합니다.
#[derive(Deserialize)]
struct DecisionRecord {
    period: Period,
    primary: PortfolioId,
    secondary: Option<PortfolioId>,
    weights: (f64, f64),
}

impl TryFrom<DecisionRecord> for Decision {
    type Error = RotationError;

    fn try_from(record: DecisionRecord) -> Result<Self, Self::Error> {
        let decision = match record.secondary {
            None => Self::single(record.period, record.primary),
            Some(secondary) if secondary != record.primary => {
                Self::paired(record.period, record.primary, secondary)
            }
            Some(secondary) => {
                return Err(RotationError::InvalidInput(format!(
                    "{} 결정: 1순위와 2순위가 같음 ({})",
                    record.period, secondary
                )));
            }
        };

        if record.weights != decision.weights {
            return Err(RotationError::InvalidInput(format!(
                "{} 결정: 비중 {:?}은 {:?}이어야 함",
                record.period, record.weights, decision.weights
            )));
        }
        Ok(decision)
    }
}

/// 한 기간의 시뮬레이션 결과.
///
/// 첫 기간은 직전 데이터가 없으므로 결정과 수익률이 모두 `None`입니다 (0이 아님).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodOutcome {
    pub period: Period,
    pub decision: Option<Decision>,
    pub strategy_return: Option<f64>,
}

impl PeriodOutcome {
    /// 결정이 없는 첫 기간 결과.
    pub fn undefined(period: Period) -> Self {
        Self {
            period,
            decision: None,
            strategy_return: None,
        }
    }

    /// 실현된 기간 결과.
    pub fn realized(decision: Decision, strategy_return: f64) -> Self {
        Self {
            period: decision.period(),
            decision: Some(decision),
            strategy_return: Some(strategy_return),
        }
    }
}
