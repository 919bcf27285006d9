//! 로테이션 백테스트 전반에서 사용되는 공통 타입.

mod period;
mod portfolio;

pub use period::*;
pub use portfolio::*;
