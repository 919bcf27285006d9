//! 섹터 로테이션 백테스트 CLI.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - JSON 입력 파일 파싱 및 검증
//! - 백테스트 실행과 결과 출력/저장
//! - 적용된 설정 확인

pub mod commands;
