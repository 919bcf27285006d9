//! 포트폴리오 식별자 및 집중 포트폴리오 집합.
//!
//! - `PortfolioId` - 1부터 시작하는 포트폴리오 식별자
//! - `ConcentrationSet` - 단일 섹터로 구성된 집중 포트폴리오 집합

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{RotationError, RotationResult};

/// 클러스터에서 파생된 포트폴리오의 식별자 (1..=N).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortfolioId(u32);

impl PortfolioId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// `1..=universe` 범위에 속하는지 확인합니다.
    pub fn is_within(&self, universe: usize) -> bool {
        self.0 >= 1 && (self.0 as usize) <= universe
    }

    /// `1..=universe` 범위의 전체 포트폴리오 ID를 반환합니다.
    pub fn universe(universe: usize) -> impl Iterator<Item = PortfolioId> {
        (1..=universe as u32).map(PortfolioId)
    }
}

impl From<u32> for PortfolioId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for PortfolioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// 집중(단일 섹터) 포트폴리오 집합.
///
/// 포트폴리오 구성 시점에 구성 종목 수가 1인 포트폴리오로 결정되는 정적 입력입니다.
/// 선택 규칙은 이 집합을 계산하지 않고 주입받기만 합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConcentrationSet(BTreeSet<PortfolioId>);

impl ConcentrationSet {
    /// 빈 집합을 생성합니다.
    pub fn empty() -> Self {
        Self::default()
    }

    /// ID 목록에서 집합을 생성합니다.
    pub fn from_ids<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<PortfolioId>,
    {
        Self(ids.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, id: PortfolioId) -> bool {
        self.0.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = PortfolioId> + '_ {
        self.0.iter().copied()
    }

    /// 모든 ID가 `1..=universe` 범위에 있는지 검증합니다.
    pub fn validate(&self, universe: usize) -> RotationResult<()> {
        if let Some(bad) = self.0.iter().find(|id| !id.is_within(universe)) {
            return Err(RotationError::Configuration(format!(
                "집중 포트폴리오 {}가 포트폴리오 범위 P1..=P{} 밖에 있음",
                bad, universe
            )));
        }
        Ok(())
    }
}

impl FromIterator<PortfolioId> for ConcentrationSet {
    fn from_iter<I: IntoIterator<Item = PortfolioId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portfolio_id_display() {
        assert_eq!(PortfolioId::new(4).to_string(), "P4");
    }

    #[test]
    fn test_portfolio_universe() {
        let ids: Vec<u32> = PortfolioId::universe(3).map(|id| id.value()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(PortfolioId::new(3).is_within(3));
        assert!(!PortfolioId::new(0).is_within(3));
        assert!(!PortfolioId::new(4).is_within(3));
    }

    #[test]
    fn test_concentration_set_validate() {
        let set = ConcentrationSet::from_ids([3u32, 6]);
        assert!(set.contains(PortfolioId::new(6)));
        assert!(set.validate(6).is_ok());

        let err = set.validate(5).unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("P6"));

        let zero = ConcentrationSet::from_ids([0u32]);
        assert!(zero.validate(6).is_err());
    }

    #[test]
    fn test_concentration_set_serde() {
        let set: ConcentrationSet = serde_json::from_str("[5, 2]").unwrap();
        assert_eq!(set.iter().map(|id| id.value()).collect::<Vec<_>>(), vec![2, 5]);
    }
}
