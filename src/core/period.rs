use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// Floor used by the `all` token. Records predate nothing in practice; the
/// resolver stays pure by not consulting the store for the earliest row.
pub fn epoch_floor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid epoch floor")
}

/// Named reporting period shorthand.
///
/// The legacy system computed "quarter" two different ways depending on the
/// report, so both variants are explicit tokens and the bare word is
/// rejected; callers must pick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodToken {
    Today,
    Week,
    Month,
    /// Trailing three calendar months ending today
    RollingQuarter,
    /// Current calendar quarter (Jan/Apr/Jul/Oct start) up to today
    CalendarQuarter,
    Year,
    All,
    Custom,
}

impl std::fmt::Display for PeriodToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PeriodToken::Today => "today",
            PeriodToken::Week => "week",
            PeriodToken::Month => "month",
            PeriodToken::RollingQuarter => "rolling_quarter",
            PeriodToken::CalendarQuarter => "calendar_quarter",
            PeriodToken::Year => "year",
            PeriodToken::All => "all",
            PeriodToken::Custom => "custom",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for PeriodToken {
    type Err = AppError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "today" => Ok(PeriodToken::Today),
            "week" => Ok(PeriodToken::Week),
            "month" => Ok(PeriodToken::Month),
            "rolling_quarter" => Ok(PeriodToken::RollingQuarter),
            "calendar_quarter" => Ok(PeriodToken::CalendarQuarter),
            "year" => Ok(PeriodToken::Year),
            "all" => Ok(PeriodToken::All),
            "custom" => Ok(PeriodToken::Custom),
            "quarter" => Err(AppError::invalid_date_range(
                "ambiguous period 'quarter': use 'rolling_quarter' or 'calendar_quarter'",
            )),
            other => Err(AppError::invalid_date_range(format!(
                "unknown period token '{}'",
                other
            ))),
        }
    }
}

/// Inclusive date range `[from, to]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Returns true if the given date falls within this range
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }

    /// An inverted range matches no dates. Kept representable: a `custom`
    /// period with `from > to` is accepted and simply yields empty fetches.
    pub fn is_inverted(&self) -> bool {
        self.from > self.to
    }
}

/// Resolve a period token plus optional explicit bounds into a concrete
/// inclusive range, anchored at `today`.
///
/// Explicit bounds are only consulted for `custom`, where both are required
/// and taken verbatim. `from > to` is not rejected, matching the legacy
/// behavior of returning an empty result set rather than an error.
pub fn resolve(
    token: PeriodToken,
    explicit_from: Option<NaiveDate>,
    explicit_to: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<DateRange> {
    let range = match token {
        PeriodToken::Today => DateRange::new(today, today),
        PeriodToken::Week => DateRange::new(today - Duration::days(7), today),
        PeriodToken::Month => {
            let first = today.with_day(1).expect("day 1 exists in every month");
            DateRange::new(first, today)
        }
        PeriodToken::RollingQuarter => {
            let from = today
                .checked_sub_months(Months::new(3))
                .unwrap_or_else(epoch_floor);
            DateRange::new(from, today)
        }
        PeriodToken::CalendarQuarter => {
            let quarter_start_month = ((today.month() - 1) / 3) * 3 + 1;
            let from = NaiveDate::from_ymd_opt(today.year(), quarter_start_month, 1)
                .expect("quarter start is a valid date");
            DateRange::new(from, today)
        }
        PeriodToken::Year => {
            let jan_first = NaiveDate::from_ymd_opt(today.year(), 1, 1)
                .expect("January 1st is a valid date");
            DateRange::new(jan_first, today)
        }
        PeriodToken::All => DateRange::new(epoch_floor(), today),
        PeriodToken::Custom => {
            let from = explicit_from.ok_or_else(|| {
                AppError::invalid_date_range("custom period requires an explicit 'from' date")
            })?;
            let to = explicit_to.ok_or_else(|| {
                AppError::invalid_date_range("custom period requires an explicit 'to' date")
            })?;
            DateRange::new(from, to)
        }
    };

    Ok(range)
}
