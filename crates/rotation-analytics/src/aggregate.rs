//! 섹터 단위 데이터에서 기간 수익률 테이블을 만드는 도우미.
//!
//! - 일별/월별 날짜 수익률을 기간 단위로 복리 합산
//! - 섹터 수익률을 포트폴리오 동일가중 평균으로 집계
//! - 모든 구성 섹터가 갖춰지기 전의 앞쪽 기간은 잘라냄

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use rotation_core::{
    BenchmarkRow, ConcentrationSet, FactorRow, Frequency, Period, PeriodReturnTable, PortfolioId,
    PortfolioReturnRow, RotationError, RotationResult,
};

/// 날짜별 수익률을 기간별 복리 수익률 `Π(1+r) - 1`로 합산합니다.
pub fn compound_into_periods(
    points: &[(NaiveDate, f64)],
    frequency: Frequency,
) -> RotationResult<Vec<(Period, f64)>> {
    let mut wealth: BTreeMap<Period, f64> = BTreeMap::new();

    for (date, r) in points {
        if !r.is_finite() {
            return Err(RotationError::InvalidInput(format!(
                "{} 날짜의 수익률이 유효하지 않음",
                date
            )));
        }
        *wealth.entry(Period::from_date(*date, frequency)).or_insert(1.0) *= 1.0 + r;
    }

    Ok(wealth.into_iter().map(|(p, w)| (p, w - 1.0)).collect())
}

/// 포트폴리오 ID → 구성 섹터 이름.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<PortfolioId, Vec<String>>",
    into = "BTreeMap<PortfolioId, Vec<String>>"
)]
pub struct PortfolioMembership {
    portfolios: BTreeMap<PortfolioId, Vec<String>>,
}

impl PortfolioMembership {
    /// 포트폴리오 ID는 정확히 `1..=N`, 각 포트폴리오는 최소 한 섹터를 가져야 합니다.
    pub fn new(portfolios: BTreeMap<PortfolioId, Vec<String>>) -> RotationResult<Self> {
        if portfolios.is_empty() {
            return Err(RotationError::Configuration(
                "포트폴리오 구성이 비어 있음".to_string(),
            ));
        }

        let universe = portfolios.len();
        for (id, members) in &portfolios {
            if !id.is_within(universe) {
                return Err(RotationError::Configuration(format!(
                    "포트폴리오 ID는 1..={} 이어야 함: {}",
                    universe, id
                )));
            }
            if members.is_empty() {
                return Err(RotationError::Configuration(format!(
                    "{} 포트폴리오에 구성 섹터가 없음",
                    id
                )));
            }
        }

        Ok(Self { portfolios })
    }

    pub fn universe(&self) -> usize {
        self.portfolios.len()
    }

    pub fn members(&self, id: PortfolioId) -> Option<&[String]> {
        self.portfolios.get(&id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PortfolioId, &[String])> + '_ {
        self.portfolios.iter().map(|(id, m)| (*id, m.as_slice()))
    }

    /// 구성 섹터가 하나뿐인 포트폴리오 집합.
    pub fn concentration_set(&self) -> ConcentrationSet {
        self.portfolios
            .iter()
            .filter(|(_, members)| members.len() == 1)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl TryFrom<BTreeMap<PortfolioId, Vec<String>>> for PortfolioMembership {
    type Error = RotationError;

    fn try_from(value: BTreeMap<PortfolioId, Vec<String>>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PortfolioMembership> for BTreeMap<PortfolioId, Vec<String>> {
    fn from(value: PortfolioMembership) -> Self {
        value.portfolios
    }
}

/// 한 기간의 섹터별 수익률.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorReturnRow {
    pub period: Period,
    pub returns: BTreeMap<String, f64>,
}

impl SectorReturnRow {
    pub fn new<I, S>(period: Period, returns: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            period,
            returns: returns.into_iter().map(|(s, r)| (s.into(), r)).collect(),
        }
    }

    /// 구성 섹터의 동일가중 평균. 섹터 하나라도 없으면 `None`.
    fn equal_weighted(&self, members: &[String]) -> Option<f64> {
        let mut sum = 0.0;
        for sector in members {
            let r = self.returns.get(sector).copied().filter(|r| r.is_finite())?;
            sum += r;
        }
        Some(sum / members.len() as f64)
    }
}

/// 섹터 수익률을 포트폴리오 수익률 행으로 집계합니다.
///
/// 첫 완전한 기간 이전의 불완전한 기간은 버립니다.
/// 그 이후의 불완전한 기간은 `InsufficientData` 에러입니다.
pub fn build_portfolio_rows(
    sector_rows: &[SectorReturnRow],
    membership: &PortfolioMembership,
) -> RotationResult<Vec<PortfolioReturnRow>> {
    let universe = membership.universe();
    let mut rows = Vec::with_capacity(sector_rows.len());
    let mut dropped = 0usize;

    for sector_row in sector_rows {
        let returns: Vec<(PortfolioId, f64)> = membership
            .iter()
            .filter_map(|(id, members)| sector_row.equal_weighted(members).map(|r| (id, r)))
            .collect();

        if returns.len() < universe {
            if rows.is_empty() {
                dropped += 1;
                continue;
            }
            return Err(RotationError::InsufficientData {
                period: sector_row.period,
                expected: universe,
                actual: returns.len(),
            });
        }

        rows.push(PortfolioReturnRow::new(sector_row.period, returns));
    }

    if rows.is_empty() {
        return Err(RotationError::InvalidInput(
            "모든 구성 섹터 수익률을 갖춘 기간이 없음".to_string(),
        ));
    }

    if dropped > 0 {
        tracing::info!(
            dropped,
            first = %rows[0].period(),
            "구성 섹터가 갖춰지지 않은 앞쪽 기간 제외"
        );
    }

    Ok(rows)
}

/// 섹터 데이터에서 테이블을 만듭니다. 벤치마크/팩터는 남은 기간으로 맞춥니다.
pub fn build_table(
    sector_rows: &[SectorReturnRow],
    membership: &PortfolioMembership,
    benchmark: Vec<BenchmarkRow>,
    factors: Option<Vec<FactorRow>>,
) -> RotationResult<PeriodReturnTable> {
    let rows = build_portfolio_rows(sector_rows, membership)?;
    let first = rows[0].period();

    let benchmark = benchmark.into_iter().filter(|b| b.period >= first).collect();
    let factors =
        factors.map(|f| f.into_iter().filter(|row| row.period >= first).collect());

    PeriodReturnTable::new(rows, benchmark, factors)
}
