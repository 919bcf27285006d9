//! 기간별 수익률 테이블.
//!
//! 업스트림 데이터 준비 파이프라인이 넘겨주는 입력을 강타입으로 표현합니다:
//! - `PortfolioReturnRow`: 한 기간의 포트폴리오별 수익률
//! - `BenchmarkRow`: 한 기간의 시장 수익률과 무위험 이자율
//! - `FactorRow`: 한 기간의 규모(SMB)/가치(HML) 팩터 수익률
//! - `PeriodReturnTable`: 위 행들을 기간 라벨로 정렬한 불변 테이블
//!
//! 테이블은 생성 시점에 완전성과 정렬을 검증하며 이후 변경되지 않습니다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

use crate::domain::ReturnSeries;
use crate::error::{RotationError, RotationResult};
use crate::types::{Period, PortfolioId};

/// 한 기간의 포트폴리오별 수익률 (0.013 = 1.3%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReturnRow {
    period: Period,
    returns: BTreeMap<PortfolioId, f64>,
}

impl PortfolioReturnRow {
    pub fn new<I, T>(period: Period, returns: I) -> Self
    where
        I: IntoIterator<Item = (T, f64)>,
        T: Into<PortfolioId>,
    {
        Self {
            period,
            returns: returns
                .into_iter()
                .map(|(id, r)| (id.into(), r))
                .collect(),
        }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn get(&self, id: PortfolioId) -> Option<f64> {
        self.returns.get(&id).copied()
    }

    /// ID 오름차순으로 (포트폴리오, 수익률)을 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (PortfolioId, f64)> + '_ {
        self.returns.iter().map(|(id, r)| (*id, *r))
    }

    pub fn ids(&self) -> impl Iterator<Item = PortfolioId> + '_ {
        self.returns.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// 한 포트폴리오의 수익률만 바꾼 복사본을 반환합니다.
    pub fn with_return(&self, id: PortfolioId, value: f64) -> Self {
        let mut row = self.clone();
        row.returns.insert(id, value);
        row
    }

    /// `1..=universe` 중 유한한 수익률이 있는 포트폴리오 수.
    pub fn well_formed_count(&self, universe: usize) -> usize {
        PortfolioId::universe(universe)
            .filter(|id| self.get(*id).is_some_and(f64::is_finite))
            .count()
    }

    /// 모든 포트폴리오 `1..=universe`에 유한한 수익률이 있는지 검증합니다.
    pub fn ensure_complete(&self, universe: usize) -> RotationResult<()> {
        let actual = self.well_formed_count(universe);
        if actual < universe {
            return Err(RotationError::InsufficientData {
                period: self.period,
                expected: universe,
                actual,
            });
        }
        Ok(())
    }
}

/// 한 기간의 벤치마크 (시장 수익률, 무위험 이자율).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRow {
    pub period: Period,
    pub market: f64,
    pub risk_free: f64,
}

impl BenchmarkRow {
    pub fn new(period: Period, market: f64, risk_free: f64) -> Self {
        Self {
            period,
            market,
            risk_free,
        }
    }

    /// 시장 초과 수익률 (market - risk_free).
    pub fn market_excess(&self) -> f64 {
        self.market - self.risk_free
    }

    pub fn is_finite(&self) -> bool {
        self.market.is_finite() && self.risk_free.is_finite()
    }
}

/// 한 기간의 규모/가치 팩터 수익률.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorRow {
    pub period: Period,
    /// 규모 팩터 (Small Minus Big)
    pub smb: f64,
    /// 가치 팩터 (High Minus Low)
    pub hml: f64,
}

impl FactorRow {
    pub fn new(period: Period, smb: f64, hml: f64) -> Self {
        Self { period, smb, hml }
    }

    pub fn is_finite(&self) -> bool {
        self.smb.is_finite() && self.hml.is_finite()
    }
}

/// 기간별 포트폴리오/벤치마크 수익률 테이블.
///
/// # 불변 조건
///
/// - 최소 한 기간, 단일 주기, 빈틈없이 증가하는 기간
/// - 포트폴리오 ID 집합은 정확히 `1..=N`이며 모든 기간에 모든 수익률이 존재
/// - 벤치마크(및 팩터) 행은 기간 라벨로 1:1 정렬
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReturnTable {
    rows: Vec<PortfolioReturnRow>,
    benchmark: Vec<BenchmarkRow>,
    factors: Option<Vec<FactorRow>>,
    universe: usize,
}

impl PeriodReturnTable {
    /// 행들을 검증하고 테이블을 생성합니다.
    pub fn new(
        rows: Vec<PortfolioReturnRow>,
        benchmark: Vec<BenchmarkRow>,
        factors: Option<Vec<FactorRow>>,
    ) -> RotationResult<Self> {
        let first = rows
            .first()
            .ok_or_else(|| RotationError::InvalidInput("수익률 테이블이 비어 있음".to_string()))?;

        Self::validate_periods(&rows)?;

        let universe = first.len();
        if universe == 0 || !first.ids().eq(PortfolioId::universe(universe)) {
            let ids: Vec<String> = first.ids().map(|id| id.to_string()).collect();
            return Err(RotationError::Configuration(format!(
                "포트폴리오 ID 집합은 P1..=P{}이어야 함: [{}]",
                universe,
                ids.join(", ")
            )));
        }

        for row in &rows {
            row.ensure_complete(universe)?;
            if row.len() != universe {
                return Err(RotationError::Configuration(format!(
                    "{} 기간에 범위 밖 포트폴리오 ID가 있음 (기대 {}개, 실제 {}개)",
                    row.period(),
                    universe,
                    row.len()
                )));
            }
        }

        Self::validate_alignment("벤치마크", &rows, benchmark.iter().map(|b| b.period))?;
        if let Some(bad) = benchmark.iter().find(|b| !b.is_finite()) {
            return Err(RotationError::InsufficientData {
                period: bad.period,
                expected: 2,
                actual: [bad.market, bad.risk_free]
                    .iter()
                    .filter(|v| v.is_finite())
                    .count(),
            });
        }

        if let Some(factors) = &factors {
            Self::validate_alignment("팩터", &rows, factors.iter().map(|f| f.period))?;
            if let Some(bad) = factors.iter().find(|f| !f.is_finite()) {
                return Err(RotationError::InsufficientData {
                    period: bad.period,
                    expected: 2,
                    actual: [bad.smb, bad.hml].iter().filter(|v| v.is_finite()).count(),
                });
            }
        }

        Ok(Self {
            rows,
            benchmark,
            factors,
            universe,
        })
    }

    fn validate_periods(rows: &[PortfolioReturnRow]) -> RotationResult<()> {
        for pair in rows.windows(2) {
            let (prev, next) = (pair[0].period(), pair[1].period());
            if prev.frequency() != next.frequency() {
                return Err(RotationError::InvalidInput(format!(
                    "기간 주기가 섞여 있음: {} ({}) 다음 {} ({})",
                    prev,
                    prev.frequency(),
                    next,
                    next.frequency()
                )));
            }
            if !next.is_successor_of(&prev) {
                return Err(RotationError::InvalidInput(format!(
                    "기간이 연속되지 않음: {} 다음에 {}가 와야 하지만 {}임",
                    prev,
                    prev.next(),
                    next
                )));
            }
        }
        Ok(())
    }

    fn validate_alignment(
        kind: &str,
        rows: &[PortfolioReturnRow],
        periods: impl ExactSizeIterator<Item = Period>,
    ) -> RotationResult<()> {
        if periods.len() != rows.len() {
            return Err(RotationError::InvalidInput(format!(
                "{} 행 수({})가 포트폴리오 행 수({})와 다름",
                kind,
                periods.len(),
                rows.len()
            )));
        }
        for (row, period) in rows.iter().zip(periods) {
            if row.period() != period {
                return Err(RotationError::InvalidInput(format!(
                    "{} 행 {}가 포트폴리오 행 {}와 정렬되지 않음",
                    kind,
                    period,
                    row.period()
                )));
            }
        }
        Ok(())
    }

    /// 포트폴리오 수 N.
    pub fn universe(&self) -> usize {
        self.universe
    }

    pub fn portfolio_ids(&self) -> impl Iterator<Item = PortfolioId> {
        PortfolioId::universe(self.universe)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn periods(&self) -> Vec<Period> {
        self.rows.iter().map(PortfolioReturnRow::period).collect()
    }

    pub fn rows(&self) -> &[PortfolioReturnRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&PortfolioReturnRow> {
        self.rows.get(index)
    }

    pub fn benchmark(&self) -> &[BenchmarkRow] {
        &self.benchmark
    }

    pub fn factors(&self) -> Option<&[FactorRow]> {
        self.factors.as_deref()
    }

    /// 기간의 행 인덱스.
    pub fn index_of(&self, period: Period) -> Option<usize> {
        self.rows
            .binary_search_by(|row| row.period().cmp(&period))
            .ok()
    }

    pub fn benchmark_at(&self, period: Period) -> Option<&BenchmarkRow> {
        self.index_of(period).map(|i| &self.benchmark[i])
    }

    pub fn factors_at(&self, period: Period) -> Option<&FactorRow> {
        let i = self.index_of(period)?;
        self.factors.as_ref().map(|f| &f[i])
    }

    /// 한 포트폴리오의 전체 수익률 시계열.
    pub fn portfolio_series(&self, id: PortfolioId) -> RotationResult<ReturnSeries> {
        let mut series = ReturnSeries::new(id.to_string());
        for row in &self.rows {
            let value = row.get(id).ok_or(RotationError::MissingReturn {
                period: row.period(),
                portfolio: id,
            })?;
            series.push(row.period(), value)?;
        }
        Ok(series)
    }

    /// 시장 수익률 시계열.
    pub fn market_series(&self) -> RotationResult<ReturnSeries> {
        self.benchmark_series("market", |b| b.market)
    }

    /// 무위험 이자율 시계열.
    pub fn risk_free_series(&self) -> RotationResult<ReturnSeries> {
        self.benchmark_series("risk_free", |b| b.risk_free)
    }

    fn benchmark_series(
        &self,
        name: &str,
        f: impl Fn(&BenchmarkRow) -> f64,
    ) -> RotationResult<ReturnSeries> {
        ReturnSeries::from_points(name, self.benchmark.iter().map(|b| (b.period, f(b))))
    }

    /// 인덱스 범위의 부분 테이블 (예: 학습 구간 제외).
    pub fn window(&self, range: Range<usize>) -> RotationResult<Self> {
        if range.start >= range.end || range.end > self.rows.len() {
            return Err(RotationError::InvalidInput(format!(
                "잘못된 구간 {}..{} (테이블 길이 {})",
                range.start,
                range.end,
                self.rows.len()
            )));
        }
        Self::new(
            self.rows[range.clone()].to_vec(),
            self.benchmark[range.clone()].to_vec(),
            self.factors.as_ref().map(|f| f[range].to_vec()),
        )
    }
}
