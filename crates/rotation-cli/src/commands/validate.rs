//! 입력 파일 검증 명령어.

use anyhow::{Context, Result};
use std::path::Path;

use rotation_core::{PeriodReturnTable, RotationConfig};

use super::input::InputFile;

/// 입력 파일을 테이블로 변환하고 집중 포트폴리오 설정까지 검증한 뒤 요약을 출력합니다.
pub fn validate_input(path: &Path, config: &RotationConfig) -> Result<PeriodReturnTable> {
    let input = InputFile::load(path)?;
    let table = input
        .to_table()
        .with_context(|| format!("{} 검증 실패", path.display()))?;

    let concentration = input.effective_concentration(config);
    concentration
        .validate(table.universe())
        .context("집중 포트폴리오 설정 오류")?;

    let periods = table.periods();
    let source = if input.concentration().is_some() {
        "입력 파일"
    } else {
        "설정 파일"
    };
    let ids = concentration
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    println!("\n✅ 입력 검증 완료: {}", path.display());
    println!("  주기        : {}", input.frequency);
    if let (Some(first), Some(last)) = (periods.first(), periods.last()) {
        println!("  기간        : {} ~ {} ({}개)", first, last, periods.len());
    }
    println!("  포트폴리오  : {}개", table.universe());
    println!("  집중 포트폴리오: [{}] ({})", ids, source);
    println!(
        "  팩터(SMB/HML): {}",
        if table.factors().is_some() { "있음" } else { "없음" }
    );

    Ok(table)
}
