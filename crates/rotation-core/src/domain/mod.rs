//! 로테이션 백테스트를 위한 도메인 모델.

mod decision;
mod series;
mod table;

pub use decision::*;
pub use series::*;
pub use table::*;
