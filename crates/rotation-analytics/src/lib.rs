//! # Rotation Analytics
//!
//! 섹터 로테이션 전략의 백테스트와 성과 분석을 제공합니다.
//!
//! - [`selection`]: 직전 기간 수익률 순위로 다음 기간 보유 포트폴리오 결정
//! - [`backtest`]: 기간 순서대로 결정을 실현하는 로테이션 시뮬레이터
//! - [`performance`]: 누적 수익률과 위험 조정 지표
//! - [`attribution`]: CAPM / 3팩터 OLS 기여도 분석
//! - [`aggregate`]: 섹터 데이터에서 기간 수익률 테이블 구성
//! - [`report`]: 전체 파이프라인 실행 및 직렬화 가능한 리포트

pub mod aggregate;
pub mod attribution;
pub mod backtest;
pub mod performance;
pub mod report;
pub mod selection;

pub use attribution::{attribute, ols, AttributionReport, Coefficient, FactorModel, RegressionSummary};
pub use backtest::{RotationRun, RotationSimulator};
pub use performance::{MetricsRecord, RiskMetrics, SharpeDenominator};
pub use report::{RotationReport, RotationSettings};
pub use selection::SelectionRule;
