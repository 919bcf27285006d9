//! 설정 관리.
//!
//! 기본값 → TOML 파일 → 환경 변수(`ROTATION__` 접두사) 순으로 덮어씁니다.
//!
//! ```toml
//! [strategy]
//! concentration_portfolios = [3, 6]
//!
//! [metrics]
//! sharpe_denominator = "benchmark"
//!
//! [attribution]
//! enabled = true
//! model = "three_factor"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::RotationResult;
use crate::types::ConcentrationSet;

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RotationConfig {
    /// 로테이션 전략 설정
    #[serde(default)]
    pub strategy: StrategySettings,
    /// 성과 지표 설정
    #[serde(default)]
    pub metrics: MetricsSettings,
    /// 회귀 기여도 분석 설정
    #[serde(default)]
    pub attribution: AttributionSettings,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 로테이션 전략 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StrategySettings {
    /// 집중(단일 섹터) 포트폴리오 ID 목록
    #[serde(default)]
    pub concentration_portfolios: Vec<u32>,
}

/// 샤프 비율 분모 선택.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SharpeDenominator {
    /// 벤치마크 수익률의 표준편차 (기본값)
    #[default]
    Benchmark,
    /// 해당 시계열 자신의 표준편차
    Own,
}

/// 성과 지표 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetricsSettings {
    #[serde(default)]
    pub sharpe_denominator: SharpeDenominator,
}

/// 팩터 모델 종류.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorModelKind {
    /// 시장 초과 수익률 단일 팩터
    Capm,
    /// 시장 초과 수익률 + 규모(SMB) + 가치(HML)
    #[default]
    ThreeFactor,
}

/// 회귀 기여도 분석 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AttributionSettings {
    /// 기여도 분석 실행 여부
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 사용할 팩터 모델
    #[serde(default)]
    pub model: FactorModelKind,
    /// 포트폴리오별 팩터 모델도 적합할지 여부
    #[serde(default = "default_true")]
    pub per_portfolio: bool,
}

fn default_true() -> bool {
    true
}

impl Default for AttributionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            model: FactorModelKind::default(),
            per_portfolio: true,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl RotationConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        Self::build(config::File::from(path.as_ref()))
    }

    /// 기본 경로(`config/default.toml`)에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::build(config::File::with_name(DEFAULT_CONFIG_PATH).required(false))
    }

    fn build<T>(file: config::File<T, config::FileFormat>) -> Result<Self, config::ConfigError>
    where
        config::File<T, config::FileFormat>: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("ROTATION")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// TOML 문자열에서 설정을 로드합니다 (환경 변수 미적용).
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// 설정된 집중 포트폴리오 집합.
    pub fn concentration_set(&self) -> ConcentrationSet {
        ConcentrationSet::from_ids(self.strategy.concentration_portfolios.iter().copied())
    }

    /// 포트폴리오 수 N에 대해 설정을 검증합니다.
    pub fn validate(&self, universe: usize) -> RotationResult<()> {
        self.concentration_set().validate(universe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RotationConfig::default();
        assert!(config.strategy.concentration_portfolios.is_empty());
        assert_eq!(config.metrics.sharpe_denominator, SharpeDenominator::Benchmark);
        assert!(config.attribution.enabled);
        assert_eq!(config.attribution.model, FactorModelKind::ThreeFactor);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_toml_str() {
        let config = RotationConfig::from_toml_str(
            r#"
            [strategy]
            concentration_portfolios = [3, 6]

            [metrics]
            sharpe_denominator = "own"

            [attribution]
            model = "capm"
            per_portfolio = false
            "#,
        )
        .unwrap();

        assert_eq!(config.strategy.concentration_portfolios, vec![3, 6]);
        assert_eq!(config.metrics.sharpe_denominator, SharpeDenominator::Own);
        assert_eq!(config.attribution.model, FactorModelKind::Capm);
        assert!(config.attribution.enabled);
        assert!(!config.attribution.per_portfolio);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_validate_rejects_out_of_range_concentration() {
        let config = RotationConfig::from_toml_str(
            r#"
            [strategy]
            concentration_portfolios = [7]
            "#,
        )
        .unwrap();
        assert!(config.validate(6).unwrap_err().is_config_error());
        assert!(config.validate(7).is_ok());
    }
}
