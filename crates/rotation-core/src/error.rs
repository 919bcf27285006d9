//! 로테이션 백테스트의 에러 타입.
//!
//! 코어는 어떤 에러도 로컬에서 복구하지 않습니다. 모든 에러는 해당 기간,
//! 포트폴리오 또는 지표를 명시한 채로 호출자에게 전달됩니다.

use thiserror::Error;

use crate::types::{Period, PortfolioId};

/// 핵심 로테이션 에러.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RotationError {
    /// 기간의 포트폴리오 수익률 행이 불완전함
    #[error("데이터 부족: {period} 기간에 {expected}개 포트폴리오 수익률이 필요하지만 {actual}개만 유효함")]
    InsufficientData {
        period: Period,
        expected: usize,
        actual: usize,
    },

    /// 선택된 포트폴리오의 실현 기간 수익률이 없음
    #[error("수익률 누락: {period} 기간의 {portfolio} 수익률이 없거나 유효하지 않음")]
    MissingReturn {
        period: Period,
        portfolio: PortfolioId,
    },

    /// 집중 포트폴리오 집합 또는 포트폴리오 ID 집합이 잘못됨
    #[error("설정 에러: {0}")]
    Configuration(String),

    /// 위험 지표의 분모 표본이 비어 있거나 너무 작음
    #[error("표본 부족: {metric} 계산에 최소 {required}개 관측치가 필요하지만 {actual}개임")]
    InsufficientSample {
        metric: String,
        required: usize,
        actual: usize,
    },

    /// 회귀 설계 행렬이 특이 행렬임
    #[error("특이 설계 행렬: {0}")]
    SingularDesign(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),
}

/// 로테이션 작업을 위한 Result 타입.
pub type RotationResult<T> = Result<T, RotationError>;

impl RotationError {
    /// 입력 데이터 품질 문제로 인한 에러인지 확인합니다.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            RotationError::InsufficientData { .. }
                | RotationError::MissingReturn { .. }
                | RotationError::InvalidInput(_)
        )
    }

    /// 설정 문제로 인한 에러인지 확인합니다.
    pub fn is_config_error(&self) -> bool {
        matches!(self, RotationError::Configuration(_))
    }

    /// 표본 크기 부족 에러를 생성합니다.
    pub fn insufficient_sample(metric: impl Into<String>, required: usize, actual: usize) -> Self {
        RotationError::InsufficientSample {
            metric: metric.into(),
            required,
            actual,
        }
    }
}

impl From<serde_json::Error> for RotationError {
    fn from(err: serde_json::Error) -> Self {
        RotationError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_period_and_portfolio() {
        let err = RotationError::MissingReturn {
            period: Period::quarter(2010, 2).unwrap(),
            portfolio: PortfolioId::new(3),
        };
        let msg = err.to_string();
        assert!(msg.contains("2010Q2"));
        assert!(msg.contains("P3"));
    }

    #[test]
    fn test_error_classification() {
        let data_err = RotationError::InsufficientData {
            period: Period::quarter(2011, 1).unwrap(),
            expected: 6,
            actual: 5,
        };
        assert!(data_err.is_data_error());
        assert!(!data_err.is_config_error());

        let cfg_err = RotationError::Configuration("unknown id".to_string());
        assert!(cfg_err.is_config_error());
        assert!(!cfg_err.is_data_error());

        let sample_err = RotationError::insufficient_sample("sortino", 2, 0);
        assert!(!sample_err.is_data_error());
        assert_eq!(
            sample_err.to_string(),
            "표본 부족: sortino 계산에 최소 2개 관측치가 필요하지만 0개임"
        );
    }
}
