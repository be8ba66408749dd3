use crate::error::{Error, Result};

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use std::fmt;

/// A calendar month a report is generated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Period> {
        let period = Period { year, month };
        period.first_day()?;
        Ok(period)
    }

    pub fn current() -> Period {
        let today = Local::now().date_naive();
        Period {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or(Error::InvalidPeriod {
            year: self.year,
            month: self.month,
        })
    }

    pub fn next(&self) -> Period {
        if self.month == 12 {
            Period {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Period {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Inclusive balance window for the month. Both bounds sit one day before
    /// a month boundary, so the window runs from midnight on the last day of
    /// the previous month to midnight on the last day of this one.
    pub fn window(&self) -> Result<(NaiveDateTime, NaiveDateTime)> {
        let start = self.midnight_before(self.first_day()?)?;
        let end = self.midnight_before(self.next().first_day()?)?;
        Ok((start, end))
    }

    fn midnight_before(&self, date: NaiveDate) -> Result<NaiveDateTime> {
        date.pred_opt()
            .and_then(|day| day.and_hms_opt(0, 0, 0))
            .ok_or(Error::InvalidPeriod {
                year: self.year,
                month: self.month,
            })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn window_is_offset_one_day_before_each_boundary() {
        let (start, end) = Period::new(2021, 3).unwrap().window().unwrap();
        assert_eq!(start, midnight(2021, 2, 28));
        assert_eq!(end, midnight(2021, 3, 31));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let period = Period::new(2020, 12).unwrap();
        assert_eq!(period.next(), Period::new(2021, 1).unwrap());
        let (start, end) = period.window().unwrap();
        assert_eq!(start, midnight(2020, 11, 30));
        assert_eq!(end, midnight(2020, 12, 31));
    }

    #[test]
    fn rejects_invalid_month() {
        assert!(matches!(
            Period::new(2021, 13),
            Err(Error::InvalidPeriod { month: 13, .. })
        ));
        assert!(Period::new(2021, 0).is_err());
    }

    #[test]
    fn displays_as_year_month() {
        assert_eq!(Period::new(2021, 4).unwrap().to_string(), "2021-04");
    }
}
