//! CLI 명령어 구현 모듈.

pub mod config;
pub mod input;
pub mod run;
pub mod validate;
