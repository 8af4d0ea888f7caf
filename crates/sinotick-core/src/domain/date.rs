use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

use crate::ValidationError;

const DASHED: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const COMPACT: &[BorrowedFormatItem<'static>] = format_description!("[year][month][day]");

/// A single calendar date on the exchange timeline.
///
/// Providers are inconsistent about date formats: Eastmoney klines carry
/// `2021-01-04` while its query parameters want `20210104`. Both parse here;
/// the canonical rendering is always dashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TradeDate(Date);

impl TradeDate {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        Date::parse(trimmed, DASHED)
            .or_else(|_| Date::parse(trimmed, COMPACT))
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate {
                value: input.to_owned(),
            })
    }

    pub const fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub const fn as_date(self) -> Date {
        self.0
    }

    /// Canonical `YYYY-MM-DD` rendering.
    pub fn format_dashed(self) -> String {
        self.0
            .format(DASHED)
            .expect("calendar dates are always formattable")
    }

    /// Compact `YYYYMMDD` rendering used in provider query strings.
    pub fn format_compact(self) -> String {
        self.0
            .format(COMPACT)
            .expect("calendar dates are always formattable")
    }

    pub const fn year(self) -> i32 {
        self.0.year()
    }
}

impl Display for TradeDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_dashed())
    }
}

impl FromStr for TradeDate {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Serialize for TradeDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_dashed())
    }
}

impl<'de> Deserialize<'de> for TradeDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dashed_date() {
        let parsed = TradeDate::parse("2021-01-04").expect("must parse");
        assert_eq!(parsed.format_dashed(), "2021-01-04");
        assert_eq!(parsed.format_compact(), "20210104");
    }

    #[test]
    fn parses_compact_date() {
        let parsed = TradeDate::parse("20210104").expect("must parse");
        assert_eq!(parsed.format_dashed(), "2021-01-04");
    }

    #[test]
    fn rejects_garbage() {
        let err = TradeDate::parse("2021/01/04").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidDate { .. }));
    }

    #[test]
    fn orders_chronologically() {
        let early = TradeDate::parse("2021-01-04").expect("must parse");
        let late = TradeDate::parse("2021-01-05").expect("must parse");
        assert!(early < late);
    }
}
