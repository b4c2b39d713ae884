//! Title page date handling
//!
//! The title page carries a date line. `--date` picks which date: the day the
//! merge runs, an explicit calendar date, or no date at all.

use chrono::{Local, NaiveDate};
use crate::error::{Error, Result};

/// Which date to print on the title page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TitleDate {
    /// The day the merge runs
    #[default]
    Today,
    /// A fixed calendar date
    Explicit(NaiveDate),
    /// Leave the date line off
    None,
}

impl TitleDate {
    /// Parse a `--date` argument
    ///
    /// Accepts `today`, `none` (or an empty string), ISO `2024-11-20` and US `11/20/2024`.
    pub fn parse(expr: &str) -> Result<Self> {
        let expr = expr.trim();

        if expr.is_empty() || expr.eq_ignore_ascii_case("none") {
            return Ok(TitleDate::None);
        }
        if expr.eq_ignore_ascii_case("today") {
            return Ok(TitleDate::Today);
        }

        NaiveDate::parse_from_str(expr, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(expr, "%m/%d/%Y"))
            .map(TitleDate::Explicit)
            .map_err(|_| Error::InvalidDateExpression(expr.to_string()))
    }

    /// Resolve to a concrete date, if any
    pub fn resolve(&self) -> Option<NaiveDate> {
        match self {
            TitleDate::Today => Some(Local::now().date_naive()),
            TitleDate::Explicit(date) => Some(*date),
            TitleDate::None => None,
        }
    }
}

/// Format a date as "Month day, year", e.g. "November 20, 2024"
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(TitleDate::parse("today").unwrap(), TitleDate::Today);
        assert_eq!(TitleDate::parse("TODAY").unwrap(), TitleDate::Today);
        assert_eq!(TitleDate::parse("none").unwrap(), TitleDate::None);
        assert_eq!(TitleDate::parse("   ").unwrap(), TitleDate::None);
    }

    #[test]
    fn test_parse_iso_and_us_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 11, 20).unwrap();
        assert_eq!(TitleDate::parse("2024-11-20").unwrap(), TitleDate::Explicit(expected));
        assert_eq!(TitleDate::parse("11/20/2024").unwrap(), TitleDate::Explicit(expected));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(TitleDate::parse("2024-13-01").is_err());
        assert!(matches!(
            TitleDate::parse("next week"),
            Err(Error::InvalidDateExpression(_))
        ));
    }

    #[test]
    fn test_resolve() {
        assert_eq!(TitleDate::None.resolve(), None);
        let today = TitleDate::Today.resolve().unwrap();
        assert_eq!(today.year(), Local::now().date_naive().year());
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        assert_eq!(format_date(&date), "January 7, 2026");
    }
}
