//! 백테스팅 모듈
//!
//! 기간 수익률 테이블 위에서 로테이션 규칙을 시뮬레이션합니다.
//!
//! # 주요 구성요소
//!
//! - [`RotationSimulator`]: 기간 순서대로 결정하고 실현하는 시뮬레이터
//! - [`RotationRun`]: 기간별 결정과 전략 수익률

pub mod engine;

pub use engine::{realize, RotationRun, RotationSimulator, STRATEGY_SERIES};
