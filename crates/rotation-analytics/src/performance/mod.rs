//! 성과 분석 모듈
//!
//! 로테이션 전략과 벤치마크의 실현 수익률로 성과를 측정합니다.
//!
//! # 모듈 구성
//!
//! - [`cumulative`]: 누적 수익률, 최대 낙폭
//! - [`stats`]: 평균, 표본 표준편차, 하방 표준편차
//! - [`metrics`]: 위험 조정 지표 (샤프, 트레이너, 소르티노, 베타)

pub mod cumulative;
pub mod metrics;
pub mod stats;

pub use cumulative::*;
pub use metrics::*;
pub use stats::{downside_std_dev, mean, std_dev};
