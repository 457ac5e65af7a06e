use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::GstError;

/// A GST filing period — one calendar month, wire format `MMYYYY`
/// (e.g. "062024" for June 2024).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Create a period, rejecting months outside 1–12.
    pub fn new(year: i32, month: u32) -> Result<Self, GstError> {
        if !(1..=12).contains(&month) {
            return Err(GstError::Validation(format!(
                "period month must be 01-12, got {month:02}"
            )));
        }
        if !(2017..=2099).contains(&year) {
            return Err(GstError::Validation(format!(
                "period year {year} outside the GST regime range (2017-2099)"
            )));
        }
        Ok(Self { year, month })
    }

    /// The period containing the given date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day of the period.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("validated month always forms a date")
    }

    /// Last calendar day of the period.
    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().expect("month start has a predecessor")
    }

    /// The following period.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// The preceding period.
    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    /// Whether the given date falls inside this period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// GSTR-1 statutory due date: 11th of the following month.
    pub fn gstr1_due_date(&self) -> NaiveDate {
        let next = self.next();
        NaiveDate::from_ymd_opt(next.year, next.month, 11).expect("day 11 exists in every month")
    }

    /// GSTR-3B statutory due date: 20th of the following month.
    pub fn gstr3b_due_date(&self) -> NaiveDate {
        let next = self.next();
        NaiveDate::from_ymd_opt(next.year, next.month, 20).expect("day 20 exists in every month")
    }

    /// Last day of the financial year (April–March) containing this period.
    pub fn financial_year_end(&self) -> NaiveDate {
        let fy_end_year = if self.month >= 4 { self.year + 1 } else { self.year };
        NaiveDate::from_ymd_opt(fy_end_year, 3, 31).expect("March 31 always exists")
    }

    /// Statutory deadline for claiming ITC on this period's purchases:
    /// 30 November following the end of the financial year (Section 16(4)).
    pub fn itc_claim_deadline(&self) -> NaiveDate {
        let fy_end = self.financial_year_end();
        NaiveDate::from_ymd_opt(fy_end.year(), 11, 30).expect("November 30 always exists")
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:04}", self.month, self.year)
    }
}

impl FromStr for Period {
    type Err = GstError;

    /// Parse the `MMYYYY` wire format.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 6 || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(GstError::Validation(format!(
                "period must be 6 digits in MMYYYY format, got '{s}'"
            )));
        }
        let month: u32 = s[..2].parse().expect("checked digits");
        let year: i32 = s[2..].parse().expect("checked digits");
        Self::new(year, month)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_roundtrip() {
        let p: Period = "062024".parse().unwrap();
        assert_eq!(p.month(), 6);
        assert_eq!(p.year(), 2024);
        assert_eq!(p.to_string(), "062024");
    }

    #[test]
    fn rejects_malformed_periods() {
        assert!("132024".parse::<Period>().is_err());
        assert!("002024".parse::<Period>().is_err());
        assert!("62024".parse::<Period>().is_err());
        assert!("06-2024".parse::<Period>().is_err());
        assert!("061998".parse::<Period>().is_err());
    }

    #[test]
    fn boundaries_and_navigation() {
        let p: Period = "122024".parse().unwrap();
        assert_eq!(p.first_day(), NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(p.last_day(), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(p.next().to_string(), "012025");
        assert_eq!(p.prev().to_string(), "112024");
    }

    #[test]
    fn february_leap_year() {
        let p: Period = "022024".parse().unwrap();
        assert_eq!(p.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn statutory_due_dates() {
        let p: Period = "062024".parse().unwrap();
        assert_eq!(p.gstr1_due_date(), NaiveDate::from_ymd_opt(2024, 7, 11).unwrap());
        assert_eq!(p.gstr3b_due_date(), NaiveDate::from_ymd_opt(2024, 7, 20).unwrap());
    }

    #[test]
    fn itc_deadline_follows_financial_year() {
        // June 2024 falls in FY 2024-25 (ends 31 Mar 2025) → deadline 30 Nov 2025.
        let p: Period = "062024".parse().unwrap();
        assert_eq!(p.itc_claim_deadline(), NaiveDate::from_ymd_opt(2025, 11, 30).unwrap());

        // February 2024 falls in FY 2023-24 (ends 31 Mar 2024) → deadline 30 Nov 2024.
        let p: Period = "022024".parse().unwrap();
        assert_eq!(p.itc_claim_deadline(), NaiveDate::from_ymd_opt(2024, 11, 30).unwrap());
    }
}
