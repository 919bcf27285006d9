//! 표본 통계.
//!
//! 표준편차는 표본 표준편차(n-1)입니다. 분모를 정의할 수 없는 표본이면
//! 0을 반환하지 않고 `InsufficientSample` 에러를 냅니다.

use rotation_core::{RotationError, RotationResult};

/// 산술 평균. 최소 1개 관측치가 필요합니다.
pub fn mean(values: &[f64]) -> RotationResult<f64> {
    if values.is_empty() {
        return Err(RotationError::insufficient_sample("mean", 1, 0));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// 표본 표준편차 (n-1). 최소 2개 관측치가 필요합니다.
pub fn std_dev(values: &[f64]) -> RotationResult<f64> {
    sample_std_dev(values, "std_dev")
}

/// 음수 수익률만으로 계산한 표본 표준편차. 음수 관측치가 2개 이상 필요합니다.
pub fn downside_std_dev(values: &[f64]) -> RotationResult<f64> {
    let negatives: Vec<f64> = values.iter().copied().filter(|r| *r < 0.0).collect();
    sample_std_dev(&negatives, "downside_std_dev")
}

/// 표본 공분산 (n-1).
pub(crate) fn covariance(x: &[f64], y: &[f64]) -> RotationResult<f64> {
    if x.len() != y.len() {
        return Err(RotationError::InvalidInput(format!(
            "공분산 입력 길이가 다름: {} != {}",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(RotationError::insufficient_sample("covariance", 2, x.len()));
    }

    let mx = mean(x)?;
    let my = mean(y)?;
    let sum: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();
    Ok(sum / (x.len() - 1) as f64)
}

fn sample_std_dev(values: &[f64], metric: &str) -> RotationResult<f64> {
    if values.len() < 2 {
        return Err(RotationError::insufficient_sample(metric, 2, values.len()));
    }

    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Ok(variance.sqrt())
}
