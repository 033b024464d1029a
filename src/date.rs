use std::fmt::{self, Display, Formatter};

use crate::common::scalar::*;

/// A date in the proleptic Gregorian calendar
#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash)]
pub struct Date {
    pub(crate) year: Year,
    pub(crate) month: Month,
    pub(crate) day: u8,
}

impl Date {
    pub fn new(year: Year, month: Month, day: u8) -> Option<Self> {
        (day >= 1 && day <= year.days_in_month(month)).then_some(Date { year, month, day })
    }

    /// Like `new`, but clamps the day into the month instead of failing
    pub(crate) fn saturating(year: Year, month: Month, day: u8) -> Self {
        Date {
            year,
            month,
            day: day.clamp(1, year.days_in_month(month)),
        }
    }

    pub(crate) fn last_of_month(year: Year, month: Month) -> Self {
        Date {
            year,
            month,
            day: year.days_in_month(month),
        }
    }

    pub(crate) fn first_of_month(year: Year, month: Month) -> Self {
        Date {
            year,
            month,
            day: 1,
        }
    }

    pub fn year(self) -> Year {
        self.year
    }

    pub fn month(self) -> Month {
        self.month
    }

    pub fn day(self) -> u8 {
        self.day
    }

    pub(crate) fn unix_days(self) -> UnixDays {
        // Unix days and dates have the same range, conversions are always valid
        UnixDays::new_unchecked(
            self.year.days_before()
                + self.year.days_before_month(self.month) as i32
                + self.day as i32
                + UnixDays::MIN.get()
                - 1,
        )
    }

    /// The instant at midnight UTC of this date
    pub(crate) fn epoch(self) -> EpochMillis {
        self.unix_days().epoch()
    }

    pub fn day_of_week(self) -> Weekday {
        self.unix_days().day_of_week()
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.year.get(),
            self.month.get(),
            self.day
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mkdate(year: u16, month: u8, day: u8) -> Date {
        Date {
            year: Year::new_unchecked(year),
            month: Month::new_unchecked(month),
            day,
        }
    }

    #[test]
    fn test_check_date_valid() {
        let cases = &[
            (2021, 1, 1),
            (2021, 12, 31),
            (2021, 2, 28),
            (2020, 2, 29),
            (2021, 4, 30),
            (2000, 2, 29),
            (1900, 2, 28),
        ];
        for &(year, month, day) in cases {
            assert_eq!(
                Date::new(year.try_into().unwrap(), month.try_into().unwrap(), day),
                Some(mkdate(year, month, day))
            );
        }
    }

    #[test]
    fn test_check_date_invalid_day() {
        let cases = &[
            (2021, 1, 0),
            (2021, 1, 32),
            (2021, 4, 31),
            (2021, 2, 29),
            (2020, 2, 30),
            (2000, 2, 30),
            (1900, 2, 29),
        ];
        for &(year, month, day) in cases {
            assert_eq!(
                Date::new(year.try_into().unwrap(), month.try_into().unwrap(), day),
                None
            );
        }
    }

    #[test]
    fn test_saturating_day() {
        let y = Year::new_unchecked(2021);
        assert_eq!(Date::saturating(y, Month::February, 31), mkdate(2021, 2, 28));
        assert_eq!(Date::saturating(y, Month::April, 0), mkdate(2021, 4, 1));
    }

    #[test]
    fn test_unix_days_reversible() {
        for n in UnixDays::MIN.get()..=UnixDays::MAX.get() {
            let date = UnixDays::new_unchecked(n).date();
            assert_eq!(n, date.unix_days().get());
        }
    }

    #[test]
    fn test_day_of_week() {
        assert_eq!(mkdate(1970, 1, 1).day_of_week(), Weekday::Thursday);
        assert_eq!(mkdate(2024, 3, 31).day_of_week(), Weekday::Sunday);
        assert_eq!(mkdate(1, 1, 1).day_of_week(), Weekday::Monday);
    }

    #[test]
    fn test_display() {
        assert_eq!(mkdate(2024, 3, 1).to_string(), "2024-03-01");
        assert_eq!(mkdate(1, 12, 31).to_string(), "0001-12-31");
    }
}
