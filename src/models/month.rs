use chrono::{Datelike, Local, Months, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{BudgetError, Result};

/// A calendar month. Months are 0-based internally; values that come from
/// users or URLs are 1-based and go through [`Month::from_external`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Month {
    first: NaiveDate,
}

/// Inclusive timestamp range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DateRange {
    pub(crate) start: NaiveDateTime,
    pub(crate) end: NaiveDateTime,
}

impl DateRange {
    pub(crate) fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

impl Month {
    pub(crate) fn new(year: i32, month0: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month0 + 1, 1)
            .map(|first| Self { first })
            .ok_or_else(|| BudgetError::invalid(format!("no such month: {year}/{month0} (0-based)")))
    }

    pub(crate) fn from_external(year: i32, month1: u32) -> Result<Self> {
        if month1 == 0 {
            return Err(BudgetError::invalid("month must be between 1 and 12"));
        }
        Self::new(year, month1 - 1)
    }

    pub(crate) fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub(crate) fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    /// Accepts "YYYY-MM" (1-based month), the format used on the command line.
    pub(crate) fn parse(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map(|first| Self { first })
            .map_err(|_| BudgetError::invalid(format!("invalid month '{s}', expected YYYY-MM")))
    }

    pub(crate) fn year(&self) -> i32 {
        self.first.year()
    }

    pub(crate) fn start(&self) -> NaiveDateTime {
        self.first.and_time(NaiveTime::default())
    }

    pub(crate) fn end(&self) -> NaiveDateTime {
        let last_day = self
            .first
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        let last_instant = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or_default();
        last_day.and_time(last_instant)
    }

    pub(crate) fn range(&self) -> DateRange {
        DateRange {
            start: self.start(),
            end: self.end(),
        }
    }

    pub(crate) fn next(&self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map_or(*self, |first| Self { first })
    }

    pub(crate) fn prev(&self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map_or(*self, |first| Self { first })
    }

    /// "YYYY-MM"
    pub(crate) fn key(&self) -> String {
        self.first.format("%Y-%m").to_string()
    }

    /// "October 2026"
    pub(crate) fn title(&self) -> String {
        self.first.format("%B %Y").to_string()
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
