//! 섹터 로테이션 백테스트 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 입력 파일 검증
//! rotation validate -i demos/sample_input.json
//!
//! # 백테스트 실행 후 JSON 리포트 저장
//! rotation run -i demos/sample_input.json -o reports/rotation.json
//!
//! # JSON 로그로 실행
//! rotation --log-format json run -i demos/sample_input.json
//!
//! # 적용된 설정 확인 (ROTATION__METRICS__SHARPE_DENOMINATOR=own 등)
//! rotation config
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::error;

use rotation_cli::commands::config::print_config;
use rotation_cli::commands::run::{run_rotation, RunConfig};
use rotation_cli::commands::validate::validate_input;
use rotation_core::{init_logging, LogConfig, LogFormat, RotationConfig};

#[derive(Parser)]
#[command(name = "rotation")]
#[command(about = "Sector rotation backtest CLI - 모멘텀 섹터 로테이션 백테스트", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (기본: config/default.toml, 없으면 기본값)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 로그 형식 (pretty, json, compact)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 백테스트 실행
    Run {
        /// 입력 파일 (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// 결과 저장 경로 (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 입력 파일 검증
    Validate {
        /// 입력 파일 (JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// 적용된 설정 출력
    Config,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    // 트레이싱 초기화 (CLI 옵션 > 설정 파일)
    let mut log_config = LogConfig::from(&config.logging);
    if let Some(level) = &cli.log_level {
        log_config.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        let format: LogFormat = format.parse().map_err(|e: String| anyhow!(e))?;
        log_config = log_config.with_format(format);
    }
    init_logging(log_config).map_err(|e| anyhow!("로깅 초기화 실패: {}", e))?;

    let result = match cli.command {
        Commands::Run { input, output } => {
            run_rotation(&RunConfig { input, output }, &config).map(|_| ())
        }
        Commands::Validate { input } => validate_input(&input, &config).map(|_| ()),
        Commands::Config => print_config(&config),
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

fn load_config(path: Option<&Path>) -> Result<RotationConfig> {
    match path {
        Some(path) => RotationConfig::load(path)
            .with_context(|| format!("설정 파일 로드 실패: {}", path.display())),
        None => RotationConfig::load_default().context("기본 설정 로드 실패"),
    }
}
