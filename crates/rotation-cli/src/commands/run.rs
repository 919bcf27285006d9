//! 백테스트 실행 명령어.
//!
//! # 사용 예시
//!
//! ```bash
//! # 기본 설정(config/default.toml)으로 실행
//! rotation run -i demos/sample_input.json
//!
//! # 설정 파일 지정 및 결과 JSON 저장
//! rotation run -i data/sectors.json -c config/capm.toml -o reports/rotation.json
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use rotation_analytics::attribution::{FactorModel, RegressionSummary};
use rotation_analytics::performance::RiskMetrics;
use rotation_analytics::report::{RotationReport, RotationSettings};
use rotation_core::RotationConfig;

use super::input::InputFile;

/// 실행 명령어 설정.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
}

/// 입력 파일로 백테스트를 실행하고 결과를 출력합니다.
pub fn run_rotation(config: &RunConfig, settings: &RotationConfig) -> Result<RotationReport> {
    // 1. 입력 로드 및 테이블 검증
    let input = InputFile::load(&config.input)?;
    let table = input.to_table().context("기간 수익률 테이블 검증 실패")?;
    info!(
        periods = table.len(),
        portfolios = table.universe(),
        "입력 테이블 로드 완료"
    );

    // 2. 설정 적용 (입력 파일의 집중 포트폴리오 우선)
    let mut run_settings = RotationSettings::from(settings);
    run_settings.concentration = input.effective_concentration(settings);
    run_settings
        .concentration
        .validate(table.universe())
        .context("집중 포트폴리오 설정 오류")?;

    if let Some(opts) = run_settings.attribution.as_mut() {
        if opts.model == FactorModel::ThreeFactor && table.factors().is_none() {
            warn!("SMB/HML 팩터가 없어 CAPM으로 기여도 분석");
            opts.model = FactorModel::Capm;
        }
    }

    // 3. 실행
    let report = RotationReport::run(&table, &run_settings).context("로테이션 백테스트 실패")?;

    // 4. 결과 출력
    print_report(&report);

    // 5. 결과 저장 (옵션)
    if let Some(output) = &config.output {
        save_report(&report, output)?;
        info!("Report saved to: {}", output.display());
    }

    Ok(report)
}

fn save_report(report: &RotationReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("출력 디렉토리 생성 실패: {}", parent.display()))?;
    }
    let content = report.to_json()?;
    std::fs::write(path, content)
        .with_context(|| format!("리포트 저장 실패: {}", path.display()))?;
    Ok(())
}

/// 기간별 보유 내역과 지표 요약을 출력합니다.
pub fn print_report(report: &RotationReport) {
    println!("\n📈 섹터 로테이션 백테스트");
    println!("═══════════════════════════════════════════════════════════════");
    println!("  기간       | 보유                 | 전략 수익률 | 누적");
    println!("  ─────────────────────────────────────────────────────────────");

    for outcome in &report.outcomes {
        let holdings = outcome
            .decision
            .map_or_else(|| "-".to_string(), |d| d.describe());
        let (ret, cum) = match outcome.strategy_return {
            Some(r) => (
                format!("{:>10.2}%", r * 100.0),
                report
                    .strategy_cumulative
                    .get(outcome.period)
                    .map_or_else(|| "-".to_string(), |c| format!("{:.2}%", c * 100.0)),
            ),
            None => (format!("{:>11}", "-"), "-".to_string()),
        };
        println!("  {:<10} | {:<20} | {} | {}", outcome.period, holdings, ret, cum);
    }

    println!("═══════════════════════════════════════════════════════════════");
    print_metrics("전략", &report.metrics.strategy);
    print_metrics("벤치마크", &report.metrics.benchmark);

    if let Some(attribution) = &report.attribution {
        println!("\n🔍 기여도 분석 ({:?})", attribution.model);
        print_regression("전략", &attribution.strategy);
        for (id, summary) in &attribution.per_portfolio {
            print_regression(&id.to_string(), summary);
        }
    }

    println!("\n{}", report.summary());
}

fn print_metrics(label: &str, metrics: &RiskMetrics) {
    println!("  {:<8} {}", label, metrics.summary());
}

fn print_regression(label: &str, summary: &RegressionSummary) {
    println!(
        "  {:<8} n={} R²={:.3} (adj {:.3})",
        label, summary.n_obs, summary.r_squared, summary.adj_r_squared
    );
    for c in &summary.coefficients {
        println!(
            "           {:<8} {:>9.4}  se {:.4}  t {:>7.3}  p {:.3}",
            c.name, c.estimate, c.std_error, c.t_stat, c.p_value
        );
    }
}
