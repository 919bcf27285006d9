//! 기간 라벨이 붙은 수익률 시계열.

use serde::{Deserialize, Serialize};

use crate::error::{RotationError, RotationResult};
use crate::types::Period;

/// 시계열의 한 점.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub period: Period,
    pub value: f64,
}

/// 기간 순으로 정렬된 수익률 시계열.
///
/// 각 점은 직전 점보다 뒤의 기간이어야 합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    name: String,
    points: Vec<SeriesPoint>,
}

impl ReturnSeries {
    /// 빈 시계열을 생성합니다.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
        }
    }

    /// (기간, 값) 목록에서 시계열을 생성합니다.
    pub fn from_points<I>(name: impl Into<String>, points: I) -> RotationResult<Self>
    where
        I: IntoIterator<Item = (Period, f64)>,
    {
        let mut series = Self::new(name);
        for (period, value) in points {
            series.push(period, value)?;
        }
        Ok(series)
    }

    /// 점을 끝에 추가합니다. 기간이 마지막 점 이후가 아니면 실패합니다.
    pub fn push(&mut self, period: Period, value: f64) -> RotationResult<()> {
        if let Some(last) = self.points.last() {
            if period <= last.period {
                return Err(RotationError::InvalidInput(format!(
                    "{} 시계열: {} 기간은 {} 이후여야 함",
                    self.name, period, last.period
                )));
            }
        }
        self.points.push(SeriesPoint { period, value });
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 이름만 바꾼 복사본을 반환합니다.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: self.points.clone(),
        }
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn periods(&self) -> Vec<Period> {
        self.points.iter().map(|p| p.period).collect()
    }

    pub fn get(&self, period: Period) -> Option<f64> {
        self.points
            .binary_search_by(|p| p.period.cmp(&period))
            .ok()
            .map(|i| self.points[i].value)
    }

    pub fn first(&self) -> Option<&SeriesPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(year: i32, quarter: u32) -> Period {
        Period::quarter(year, quarter).unwrap()
    }

    #[test]
    fn test_series_push_requires_increasing_periods() {
        let mut series = ReturnSeries::new("strategy");
        series.push(q(2010, 1), 0.01).unwrap();
        series.push(q(2010, 2), -0.02).unwrap();
        assert!(series.push(q(2010, 2), 0.03).is_err());
        assert!(series.push(q(2009, 4), 0.03).is_err());
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_series_lookup() {
        let series =
            ReturnSeries::from_points("p1", vec![(q(2010, 1), 0.01), (q(2010, 3), 0.02)]).unwrap();
        assert_eq!(series.get(q(2010, 3)), Some(0.02));
        assert_eq!(series.get(q(2010, 2)), None);
        assert_eq!(series.values(), vec![0.01, 0.02]);
        assert_eq!(series.renamed("x").name(), "x");
    }
}
