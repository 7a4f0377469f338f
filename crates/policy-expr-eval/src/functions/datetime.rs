//! Date/Time Functions
//!
//! Implements: GetDate, DateAdd, DatePart, DateTime
//!
//! Date parts use the T-SQL names and abbreviations, matched without regard
//! to case.

use super::arg;
use crate::engine::ExprEngine;
use chrono::{Datelike, Local, Months, NaiveDateTime, TimeDelta, Timelike};
use policy_expr_diagnostics::{ExprError, Result};
use policy_expr_types::{Value, datetime_in_range, parse_datetime, to_datetime, to_i64, to_text};
use std::str::FromStr;

/// Component of a date/time named by DateAdd / DatePart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePart {
    Year,
    Month,
    DayOfYear,
    Day,
    Weekday,
    Hour,
    Minute,
    Second,
    Millisecond,
}

impl DatePart {
    /// Every accepted token with its part
    pub const TOKENS: [(&'static str, DatePart); 24] = [
        ("YEAR", DatePart::Year),
        ("YY", DatePart::Year),
        ("YYYY", DatePart::Year),
        ("MONTH", DatePart::Month),
        ("MM", DatePart::Month),
        ("M", DatePart::Month),
        ("DAYOFYEAR", DatePart::DayOfYear),
        ("DY", DatePart::DayOfYear),
        ("Y", DatePart::DayOfYear),
        ("DAY", DatePart::Day),
        ("DD", DatePart::Day),
        ("D", DatePart::Day),
        ("WEEKDAY", DatePart::Weekday),
        ("DW", DatePart::Weekday),
        ("HOUR", DatePart::Hour),
        ("HH", DatePart::Hour),
        ("MINUTE", DatePart::Minute),
        ("MI", DatePart::Minute),
        ("N", DatePart::Minute),
        ("SECOND", DatePart::Second),
        ("SS", DatePart::Second),
        ("S", DatePart::Second),
        ("MILLISECOND", DatePart::Millisecond),
        ("MS", DatePart::Millisecond),
    ];

    /// Extract this part from `dt`
    pub fn extract(&self, dt: &NaiveDateTime) -> i32 {
        let value = match self {
            DatePart::Year => return dt.year(),
            DatePart::Month => dt.month(),
            DatePart::DayOfYear => dt.ordinal(),
            DatePart::Day => dt.day(),
            // Sunday is 1
            DatePart::Weekday => dt.weekday().num_days_from_sunday() + 1,
            DatePart::Hour => dt.hour(),
            DatePart::Minute => dt.minute(),
            DatePart::Second => dt.second(),
            DatePart::Millisecond => dt.nanosecond() % 1_000_000_000 / 1_000_000,
        };
        value as i32
    }

    /// Add `amount` of this part to `dt`.
    ///
    /// Year and month arithmetic clamps the day to the end of the target
    /// month; the three day-like parts all add days.
    pub fn add(&self, dt: NaiveDateTime, amount: i32) -> Option<NaiveDateTime> {
        let amount = i64::from(amount);
        match self {
            DatePart::Year => add_months(dt, amount * 12),
            DatePart::Month => add_months(dt, amount),
            DatePart::DayOfYear | DatePart::Day | DatePart::Weekday => {
                dt.checked_add_signed(TimeDelta::try_days(amount)?)
            }
            DatePart::Hour => dt.checked_add_signed(TimeDelta::try_hours(amount)?),
            DatePart::Minute => dt.checked_add_signed(TimeDelta::try_minutes(amount)?),
            DatePart::Second => dt.checked_add_signed(TimeDelta::try_seconds(amount)?),
            DatePart::Millisecond => dt.checked_add_signed(TimeDelta::try_milliseconds(amount)?),
        }
    }
}

impl FromStr for DatePart {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        Self::TOKENS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(token))
            .map(|(_, part)| *part)
            .ok_or_else(|| ExprError::BadDatePart {
                part: s.to_string(),
            })
    }
}

fn add_months(dt: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        dt.checked_add_months(magnitude)
    } else {
        dt.checked_sub_months(magnitude)
    }
}

impl ExprEngine {
    /// Evaluate GetDate: local wall-clock time
    pub fn eval_get_date(&self) -> Value {
        Value::DateTime(Local::now().naive_local())
    }

    /// Evaluate DateAdd(part, amount, date)
    pub fn eval_date_add(&self, args: &[Value]) -> Result<Value> {
        let part: DatePart = to_text(arg(args, 0)).parse()?;
        let amount = to_i64(arg(args, 1))?;
        let amount = i32::try_from(amount)
            .map_err(|_| ExprError::type_conversion(amount.to_string(), "Int32"))?;
        let date = to_datetime(arg(args, 2))?;
        part.add(date, amount)
            .filter(datetime_in_range)
            .map(Value::DateTime)
            .ok_or_else(|| {
                ExprError::invalid_argument(format!(
                    "adding {amount} {part:?} to {date} leaves the date range"
                ))
            })
    }

    /// Evaluate DatePart(part, date)
    pub fn eval_date_part(&self, args: &[Value]) -> Result<Value> {
        let part: DatePart = to_text(arg(args, 0)).parse()?;
        let date = to_datetime(arg(args, 1))?;
        Ok(Value::Int(part.extract(&date)))
    }

    /// Evaluate DateTime(text)
    pub fn eval_datetime(&self, args: &[Value]) -> Result<Value> {
        parse_datetime(&to_text(arg(args, 0))).map(Value::DateTime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_tokens_are_case_insensitive() {
        assert_eq!("yyyy".parse::<DatePart>().unwrap(), DatePart::Year);
        assert_eq!(" Mi ".parse::<DatePart>().unwrap(), DatePart::Minute);
        assert_eq!("y".parse::<DatePart>().unwrap(), DatePart::DayOfYear);
        assert!(matches!(
            "fortnight".parse::<DatePart>(),
            Err(ExprError::BadDatePart { .. })
        ));
    }

    #[test]
    fn test_month_end_clamps() {
        let jan31 = dt(2021, 1, 31);
        assert_eq!(DatePart::Month.add(jan31, 1), Some(dt(2021, 2, 28)));
        assert_eq!(DatePart::Year.add(dt(2020, 2, 29), 1), Some(dt(2021, 2, 28)));
        assert_eq!(DatePart::Month.add(dt(2021, 3, 31), -1), Some(dt(2021, 2, 28)));
    }

    #[test]
    fn test_weekday_starts_sunday() {
        // 2023-01-01 was a Sunday
        assert_eq!(DatePart::Weekday.extract(&dt(2023, 1, 1)), 1);
        assert_eq!(DatePart::Weekday.extract(&dt(2023, 1, 7)), 7);
    }

    #[test]
    fn test_day_parts_all_add_days() {
        let start = dt(2020, 12, 31);
        for part in [DatePart::Day, DatePart::DayOfYear, DatePart::Weekday] {
            assert_eq!(part.add(start, 1), Some(dt(2021, 1, 1)));
        }
    }
}
