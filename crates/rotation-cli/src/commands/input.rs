//! 백테스트 입력 파일.
//!
//! 기간별 포트폴리오 수익률을 직접 주거나, 섹터 수익률과 포트폴리오 구성을 주면
//! 동일가중으로 집계합니다.
//!
//! ```json
//! {
//!   "frequency": "quarterly",
//!   "concentration": [3],
//!   "periods": [
//!     { "period": "2010Q1", "portfolios": { "1": 0.01, "2": 0.02, "3": 0.05 },
//!       "market": 0.02, "risk_free": 0.001, "smb": 0.003, "hml": -0.002 }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use rotation_analytics::aggregate::{build_table, PortfolioMembership, SectorReturnRow};
use rotation_core::{
    BenchmarkRow, ConcentrationSet, FactorRow, Frequency, Period, PeriodReturnTable,
    PortfolioReturnRow, RotationConfig, RotationError, RotationResult,
};

/// 입력 파일 최상위 구조.
#[derive(Debug, Clone, Deserialize)]
pub struct InputFile {
    #[serde(default)]
    pub frequency: Frequency,
    /// 집중 포트폴리오 ID (설정 파일보다 우선)
    #[serde(default)]
    pub concentration: Option<Vec<u32>>,
    /// 섹터 → 포트폴리오 구성 (있으면 `sectors` 사용)
    #[serde(default)]
    pub membership: Option<PortfolioMembership>,
    pub periods: Vec<PeriodInput>,
}

/// 한 기간의 입력.
#[derive(Debug, Clone, Deserialize)]
pub struct PeriodInput {
    pub period: Period,
    /// 포트폴리오 ID → 수익률 (null은 결측)
    #[serde(default)]
    pub portfolios: BTreeMap<u32, Option<f64>>,
    /// 섹터 이름 → 수익률
    #[serde(default)]
    pub sectors: BTreeMap<String, Option<f64>>,
    pub market: f64,
    #[serde(default)]
    pub risk_free: f64,
    #[serde(default)]
    pub smb: Option<f64>,
    #[serde(default)]
    pub hml: Option<f64>,
}

impl InputFile {
    /// JSON 파일을 읽습니다.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("입력 파일을 읽을 수 없음: {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("입력 파일 파싱 실패: {}", path.display()))
    }

    pub fn from_json(json: &str) -> RotationResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 입력에 지정된 집중 포트폴리오. 명시 목록이 없으면 단일 섹터 포트폴리오.
    pub fn concentration(&self) -> Option<ConcentrationSet> {
        match (&self.concentration, &self.membership) {
            (Some(ids), _) => Some(ConcentrationSet::from_ids(ids.iter().copied())),
            (None, Some(membership)) => Some(membership.concentration_set()),
            (None, None) => None,
        }
    }

    /// 실행에 쓰일 집중 포트폴리오. 입력 파일 지정이 설정 파일보다 우선합니다.
    pub fn effective_concentration(&self, config: &RotationConfig) -> ConcentrationSet {
        self.concentration().unwrap_or_else(|| config.concentration_set())
    }

    /// 검증된 기간 수익률 테이블을 만듭니다.
    pub fn to_table(&self) -> RotationResult<PeriodReturnTable> {
        if let Some(p) = self.periods.iter().find(|p| p.period.frequency() != self.frequency) {
            return Err(RotationError::InvalidInput(format!(
                "{} 기간이 선언된 주기({})와 다름",
                p.period, self.frequency
            )));
        }

        let benchmark: Vec<BenchmarkRow> = self
            .periods
            .iter()
            .map(|p| BenchmarkRow::new(p.period, p.market, p.risk_free))
            .collect();
        let factors = self.factors()?;

        match &self.membership {
            Some(membership) => {
                let sector_rows: Vec<SectorReturnRow> = self
                    .periods
                    .iter()
                    .map(|p| {
                        SectorReturnRow::new(
                            p.period,
                            p.sectors
                                .iter()
                                .map(|(name, r)| (name.clone(), r.unwrap_or(f64::NAN))),
                        )
                    })
                    .collect();
                build_table(&sector_rows, membership, benchmark, factors)
            }
            None => {
                let rows = self
                    .periods
                    .iter()
                    .map(|p| {
                        PortfolioReturnRow::new(
                            p.period,
                            p.portfolios.iter().map(|(id, r)| (*id, r.unwrap_or(f64::NAN))),
                        )
                    })
                    .collect();
                PeriodReturnTable::new(rows, benchmark, factors)
            }
        }
    }

    /// 팩터 수익률은 모든 기간에 있거나 모든 기간에 없어야 합니다.
    fn factors(&self) -> RotationResult<Option<Vec<FactorRow>>> {
        let rows: Vec<Option<FactorRow>> = self
            .periods
            .iter()
            .map(|p| match (p.smb, p.hml) {
                (Some(smb), Some(hml)) => Some(FactorRow::new(p.period, smb, hml)),
                _ => None,
            })
            .collect();

        if rows.iter().all(Option::is_none) {
            return Ok(None);
        }
        rows.into_iter()
            .zip(&self.periods)
            .map(|(row, p)| {
                row.ok_or_else(|| {
                    RotationError::InvalidInput(format!(
                        "{} 기간의 SMB/HML 팩터 수익률이 없음",
                        p.period
                    ))
                })
            })
            .collect::<RotationResult<Vec<_>>>()
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotation_core::PortfolioId;

    const PORTFOLIO_INPUT: &str = r#"{
        "frequency": "quarterly",
        "concentration": [3],
        "periods": [
            { "period": "2010Q1", "portfolios": { "1": 0.01, "2": 0.02, "3": 0.05 }, "market": 0.02 },
            { "period": "2010Q2", "portfolios": { "1": 0.02, "2": 0.01, "3": -0.03 }, "market": 0.01 },
            { "period": "2010Q3", "portfolios": { "1": -0.01, "2": 0.04, "3": 0.02 }, "market": -0.01 }
        ]
    }"#;

    #[test]
    fn test_portfolio_input_to_table() {
        let input = InputFile::from_json(PORTFOLIO_INPUT).unwrap();
        let table = input.to_table().unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.universe(), 3);
        assert!(table.factors().is_none());
        assert!(input.concentration().unwrap().contains(PortfolioId::new(3)));
    }

    #[test]
    fn test_missing_return_is_insufficient_data() {
        let json = PORTFOLIO_INPUT.replace(r#""2": 0.01"#, r#""2": null"#);
        let err = InputFile::from_json(&json).unwrap().to_table().unwrap_err();
        assert!(matches!(err, RotationError::InsufficientData { .. }));
    }

    #[test]
    fn test_frequency_mismatch() {
        let json = PORTFOLIO_INPUT.replace("\"quarterly\"", "\"monthly\"");
        let err = InputFile::from_json(&json).unwrap().to_table().unwrap_err();
        assert!(matches!(err, RotationError::InvalidInput(_)));
    }

    #[test]
    fn test_partial_factors_rejected() {
        let json = PORTFOLIO_INPUT.replacen(
            r#""market": 0.02 }"#,
            r#""market": 0.02, "smb": 0.01, "hml": 0.0 }"#,
            1,
        );
        let err = InputFile::from_json(&json).unwrap().to_table().unwrap_err();
        assert!(matches!(err, RotationError::InvalidInput(_)));
    }

    #[test]
    fn test_sector_input_uses_membership() {
        let json = r#"{
            "membership": { "1": ["tech", "health"], "2": ["energy"] },
            "periods": [
                { "period": "2010Q1", "sectors": { "tech": 0.02, "energy": 0.01 }, "market": 0.01 },
                { "period": "2010Q2", "sectors": { "tech": 0.02, "health": 0.04, "energy": 0.01 }, "market": 0.02 },
                { "period": "2010Q3", "sectors": { "tech": 0.00, "health": 0.02, "energy": 0.03 }, "market": 0.00 }
            ]
        }"#;
        let input = InputFile::from_json(json).unwrap();
        let table = input.to_table().unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.periods()[0].label(), "2010Q2");
        let concentration = input.concentration().unwrap();
        assert_eq!(concentration.len(), 1);
        assert!(concentration.contains(PortfolioId::new(2)));
    }

    #[test]
    fn test_input_concentration_overrides_config() {
        let config = RotationConfig::from_toml_str(
            r#"
            [strategy]
            concentration_portfolios = [1, 2]
            "#,
        )
        .unwrap();

        let input = InputFile::from_json(PORTFOLIO_INPUT).unwrap();
        let set = input.effective_concentration(&config);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![PortfolioId::new(3)]);

        let json = PORTFOLIO_INPUT.replace(r#""concentration": [3],"#, "");
        let input = InputFile::from_json(&json).unwrap();
        assert_eq!(input.effective_concentration(&config).len(), 2);
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let err = InputFile::from_json("{ not json").unwrap_err();
        assert!(matches!(err, RotationError::Serialization(_)));
    }
}
