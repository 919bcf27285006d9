//! # Rotation Core
//!
//! 섹터 로테이션 백테스트의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 백테스트 엔진 전반에서 사용되는 기본 타입을 제공합니다:
//! - 기간(분기/월/연) 및 포트폴리오 식별자
//! - 기간별 수익률 테이블 (포트폴리오, 벤치마크, 팩터)
//! - 로테이션 결정 및 수익률 시계열
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
