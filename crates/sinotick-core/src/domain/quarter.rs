use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{TradeDate, ValidationError};

/// Fiscal quarter of a reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Self; 4] = [Self::Q1, Self::Q2, Self::Q3, Self::Q4];

    /// Month-day suffix of the quarter-end date, as the provider spells it.
    pub const fn month_day(self) -> &'static str {
        match self {
            Self::Q1 => "0331",
            Self::Q2 => "0630",
            Self::Q3 => "0930",
            Self::Q4 => "1231",
        }
    }

    pub const fn number(self) -> u8 {
        match self {
            Self::Q1 => 1,
            Self::Q2 => 2,
            Self::Q3 => 3,
            Self::Q4 => 4,
        }
    }

    const fn end_month_day(self) -> (Month, u8) {
        match self {
            Self::Q1 => (Month::March, 31),
            Self::Q2 => (Month::June, 30),
            Self::Q3 => (Month::September, 30),
            Self::Q4 => (Month::December, 31),
        }
    }
}

/// A reporting period keyed by its quarter-end date, e.g. `20210331`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuarterTag {
    year: i32,
    quarter: Quarter,
}

impl QuarterTag {
    pub const fn new(year: i32, quarter: Quarter) -> Self {
        Self { year, quarter }
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let invalid = || ValidationError::InvalidQuarterTag {
            value: input.to_owned(),
        };

        if trimmed.len() != 8 || !trimmed.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(invalid());
        }

        let year = trimmed[..4].parse::<i32>().map_err(|_| invalid())?;
        let quarter = Quarter::ALL
            .into_iter()
            .find(|quarter| quarter.month_day() == &trimmed[4..])
            .ok_or_else(invalid)?;

        Ok(Self { year, quarter })
    }

    pub const fn year(self) -> i32 {
        self.year
    }

    pub const fn quarter(self) -> Quarter {
        self.quarter
    }

    /// Compact provider form, e.g. `20210331`.
    pub fn as_compact(self) -> String {
        format!("{:04}{}", self.year, self.quarter.month_day())
    }

    /// Dashed quarter-end date, e.g. `2021-03-31`, used in report filters.
    pub fn report_date(self) -> TradeDate {
        let (month, day) = self.quarter.end_month_day();
        let date = Date::from_calendar_date(self.year, month, day)
            .expect("quarter-end dates are always valid");
        TradeDate::from_date(date)
    }

    /// All quarter tags from Q1 of `start_year` through Q4 of `end_year`.
    ///
    /// Pure function of its inputs; the caller owns the resulting list.
    pub fn sequence(start_year: i32, end_year: i32) -> Result<Vec<Self>, ValidationError> {
        if start_year > end_year {
            return Err(ValidationError::YearOrderReversed {
                start: start_year,
                end: end_year,
            });
        }

        let mut tags = Vec::with_capacity(((end_year - start_year + 1) as usize) * 4);
        for year in start_year..=end_year {
            for quarter in Quarter::ALL {
                tags.push(Self::new(year, quarter));
            }
        }
        Ok(tags)
    }
}

impl Display for QuarterTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_compact())
    }
}

impl FromStr for QuarterTag {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for QuarterTag {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<QuarterTag> for String {
    fn from(value: QuarterTag) -> Self {
        value.as_compact()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quarter_tag() {
        let tag = QuarterTag::parse("20210630").expect("must parse");
        assert_eq!(tag.year(), 2021);
        assert_eq!(tag.quarter(), Quarter::Q2);
        assert_eq!(tag.as_compact(), "20210630");
    }

    #[test]
    fn rejects_non_quarter_end() {
        let err = QuarterTag::parse("20210415").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidQuarterTag { .. }));
    }

    #[test]
    fn report_date_is_quarter_end() {
        let tag = QuarterTag::new(2021, Quarter::Q1);
        assert_eq!(tag.report_date().format_dashed(), "2021-03-31");
    }

    #[test]
    fn sequence_covers_every_quarter_in_order() {
        let tags = QuarterTag::sequence(2020, 2021).expect("valid range");
        assert_eq!(tags.len(), 8);
        assert_eq!(tags[0].as_compact(), "20200331");
        assert_eq!(tags[7].as_compact(), "20211231");
        assert!(tags.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn sequence_rejects_reversed_years() {
        let err = QuarterTag::sequence(2022, 2020).expect_err("must fail");
        assert!(matches!(err, ValidationError::YearOrderReversed { .. }));
    }
}
