//! 수익률 집계를 위한 기간 정의.
//!
//! 기간은 정렬 가능하고 연속된 시간 구간입니다 (예: 2010Q1).
//! 같은 주기의 기간들은 전순서를 가지며 `next()`로 빈틈없이 이어집니다.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{RotationError, RotationResult};

/// 기간 주기.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// 월간
    Monthly,
    /// 분기
    Quarterly,
    /// 연간
    Yearly,
}

impl Frequency {
    /// 연간 기간 수를 반환합니다.
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
            Frequency::Yearly => 1,
        }
    }

    /// 한 기간에 포함되는 월 수를 반환합니다.
    pub fn months_per_period(&self) -> u32 {
        12 / self.periods_per_year()
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self::Quarterly
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Quarterly => write!(f, "quarterly"),
            Frequency::Yearly => write!(f, "yearly"),
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" | "m" => Ok(Self::Monthly),
            "quarterly" | "q" => Ok(Self::Quarterly),
            "yearly" | "annual" | "y" => Ok(Self::Yearly),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

/// 하나의 집계 기간.
///
/// 정렬 순서는 (주기, 연도, 인덱스) 입니다. 테이블은 단일 주기만 허용하므로
/// 실질적으로 시간 순서와 같습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    frequency: Frequency,
    year: i32,
    /// 연도 내 1부터 시작하는 인덱스 (월 1..=12, 분기 1..=4, 연 1)
    index: u32,
}

impl Period {
    /// 새 기간을 생성합니다.
    pub fn new(frequency: Frequency, year: i32, index: u32) -> RotationResult<Self> {
        if index == 0 || index > frequency.periods_per_year() {
            return Err(RotationError::InvalidInput(format!(
                "{} 주기의 기간 인덱스는 1..={} 이어야 함: {}",
                frequency,
                frequency.periods_per_year(),
                index
            )));
        }
        Ok(Self {
            frequency,
            year,
            index,
        })
    }

    /// 분기 기간을 생성합니다.
    pub fn quarter(year: i32, quarter: u32) -> RotationResult<Self> {
        Self::new(Frequency::Quarterly, year, quarter)
    }

    /// 월간 기간을 생성합니다.
    pub fn month(year: i32, month: u32) -> RotationResult<Self> {
        Self::new(Frequency::Monthly, year, month)
    }

    /// 연간 기간을 생성합니다.
    pub fn year(year: i32) -> Self {
        Self {
            frequency: Frequency::Yearly,
            year,
            index: 1,
        }
    }

    /// 날짜가 속한 기간을 반환합니다.
    pub fn from_date(date: NaiveDate, frequency: Frequency) -> Self {
        let index = (date.month() - 1) / frequency.months_per_period() + 1;
        Self {
            frequency,
            year: date.year(),
            index,
        }
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn year_value(&self) -> i32 {
        self.year
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// 다음 기간을 반환합니다.
    pub fn next(&self) -> Self {
        if self.index == self.frequency.periods_per_year() {
            Self {
                year: self.year + 1,
                index: 1,
                ..*self
            }
        } else {
            Self {
                index: self.index + 1,
                ..*self
            }
        }
    }

    /// 이전 기간을 반환합니다.
    pub fn prev(&self) -> Self {
        if self.index == 1 {
            Self {
                year: self.year - 1,
                index: self.frequency.periods_per_year(),
                ..*self
            }
        } else {
            Self {
                index: self.index - 1,
                ..*self
            }
        }
    }

    /// `prev` 바로 다음 기간인지 확인합니다.
    pub fn is_successor_of(&self, prev: &Period) -> bool {
        prev.next() == *self
    }

    /// 기간의 첫 날짜.
    pub fn start_date(&self) -> Option<NaiveDate> {
        let month = (self.index - 1) * self.frequency.months_per_period() + 1;
        NaiveDate::from_ymd_opt(self.year, month, 1)
    }

    /// 기간의 마지막 날짜.
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.next().start_date()?.pred_opt()
    }

    /// 정렬 가능한 기간 라벨 (예: "2010Q1", "2010-03", "2010").
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frequency {
            Frequency::Monthly => write!(f, "{:04}-{:02}", self.year, self.index),
            Frequency::Quarterly => write!(f, "{:04}Q{}", self.year, self.index),
            Frequency::Yearly => write!(f, "{:04}", self.year),
        }
    }
}

impl FromStr for Period {
    type Err = RotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || RotationError::InvalidInput(format!("잘못된 기간 라벨: {}", s));

        if let Some((year, quarter)) = s.split_once(['Q', 'q']) {
            let year = year.parse::<i32>().map_err(|_| invalid())?;
            let quarter = quarter.parse::<u32>().map_err(|_| invalid())?;
            return Self::quarter(year, quarter);
        }

        if let Some((year, month)) = s.split_once('-') {
            let year = year.parse::<i32>().map_err(|_| invalid())?;
            let month = month.parse::<u32>().map_err(|_| invalid())?;
            return Self::month(year, month);
        }

        s.parse::<i32>().map(Self::year).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Period {
    type Error = RotationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}
