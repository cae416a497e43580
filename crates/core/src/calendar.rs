//! Calendar-field arithmetic for date series.

use chrono::{Datelike, Duration, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Unit a date series steps by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarField {
    Year,
    Month,
    Week,
    #[default]
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
}

impl CalendarField {
    /// Fixed length of the field in milliseconds, for the fields that have one.
    fn fixed_millis(self) -> Option<i64> {
        match self {
            CalendarField::Year | CalendarField::Month => None,
            CalendarField::Week => Some(7 * 24 * 3_600_000),
            CalendarField::Day => Some(24 * 3_600_000),
            CalendarField::Hour => Some(3_600_000),
            CalendarField::Minute => Some(60_000),
            CalendarField::Second => Some(1_000),
            CalendarField::Millisecond => Some(1),
        }
    }

    /// `date` moved by `amount` units of this field. Month and year steps
    /// clamp to the end of shorter months.
    pub fn add(self, date: NaiveDateTime, amount: i64) -> Option<NaiveDateTime> {
        match self {
            CalendarField::Year => add_months(date, amount.checked_mul(12)?),
            CalendarField::Month => add_months(date, amount),
            fixed => {
                let millis = fixed.fixed_millis()?.checked_mul(amount)?;
                date.checked_add_signed(Duration::try_milliseconds(millis)?)
            }
        }
    }

    /// Whole number of units from `from` to `to`, when `to` is exactly
    /// reachable by stepping this field.
    pub fn difference(self, from: NaiveDateTime, to: NaiveDateTime) -> Option<i64> {
        let units = match self {
            CalendarField::Year => months_between(from, to) / 12,
            CalendarField::Month => months_between(from, to),
            fixed => {
                let millis = (to - from).num_milliseconds();
                let unit = fixed.fixed_millis()?;
                if millis % unit != 0 {
                    return None;
                }
                millis / unit
            }
        };
        (self.add(from, units)? == to).then_some(units)
    }
}

fn months_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    (to.year() as i64 - from.year() as i64) * 12 + (to.month() as i64 - from.month() as i64)
}

fn add_months(date: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    }
}
