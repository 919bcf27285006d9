//! 적용된 설정 출력 명령어.

use anyhow::{Context, Result};

use rotation_core::RotationConfig;

/// 기본값, 설정 파일, 환경 변수가 반영된 설정을 TOML로 출력합니다.
pub fn print_config(config: &RotationConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("설정 직렬화 실패")?;
    println!("{}", rendered);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_config_round_trips() {
        let config = RotationConfig::from_toml_str(
            r#"
            [strategy]
            concentration_portfolios = [1, 4]
            "#,
        )
        .unwrap();
        let rendered = toml::to_string_pretty(&config).unwrap();
        let back = RotationConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(back.strategy.concentration_portfolios, vec![1, 4]);
        assert_eq!(back.attribution.model, config.attribution.model);
    }
}
