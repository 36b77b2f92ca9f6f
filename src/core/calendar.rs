//! Calendar arithmetic for monthly reservations
//!
//! Weekday anchors within a month and full-month enumeration of selected
//! weekdays. Invalid `(year, month)` pairs yield `None` or an empty
//! sequence rather than panicking.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

/// First calendar day of the month
pub fn first_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Last calendar day of the month
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    first_day_of_month(year, month)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

/// Number of days in the month (28-31)
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    last_day_of_month(year, month).map(|d| d.day())
}

/// Earliest date in the month falling on `weekday`
///
/// # Examples
/// ```
/// use chrono::{NaiveDate, Weekday};
/// use court_reserve::core::calendar::first_weekday_of_month;
/// // August 2025 starts on a Friday
/// let first_sunday = first_weekday_of_month(2025, 8, Weekday::Sun).unwrap();
/// assert_eq!(first_sunday, NaiveDate::from_ymd_opt(2025, 8, 3).unwrap());
/// ```
pub fn first_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let first = first_day_of_month(year, month)?;
    let start = first.weekday().num_days_from_monday();
    let target = weekday.num_days_from_monday();
    let offset = (target + 7 - start) % 7;
    first.checked_add_days(Days::new(u64::from(offset)))
}

/// Latest date in the month falling on `weekday`
pub fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let last = last_day_of_month(year, month)?;
    let end = last.weekday().num_days_from_monday();
    let target = weekday.num_days_from_monday();
    let offset = (end + 7 - target) % 7;
    last.checked_sub_days(Days::new(u64::from(offset)))
}

/// Every date of the month whose weekday is in `weekdays`, ascending
pub fn weekday_occurrences(
    year: i32,
    month: u32,
    weekdays: &[Weekday],
) -> Vec<(NaiveDate, Weekday)> {
    let (Some(first), Some(last)) = (first_day_of_month(year, month), last_day_of_month(year, month))
    else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| weekdays.contains(&d.weekday()))
        .map(|d| (d, d.weekday()))
        .collect()
}

/// True on the month's first Monday (a Monday within days 1-7)
pub fn is_first_monday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Mon && date.day() <= 7
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn count(year: i32, month: u32, weekday: Weekday) -> usize {
        weekday_occurrences(year, month, &[weekday]).len()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2026, 2), Some(28));
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(2026, 4), Some(30));
        assert_eq!(days_in_month(2026, 12), Some(31));
        assert_eq!(days_in_month(2026, 13), None);
        assert_eq!(days_in_month(2026, 0), None);
    }

    #[test]
    fn test_first_weekday_known_dates() {
        // August 2025 starts on a Friday
        assert_eq!(first_weekday_of_month(2025, 8, Weekday::Fri), Some(date(2025, 8, 1)));
        assert_eq!(first_weekday_of_month(2025, 8, Weekday::Sun), Some(date(2025, 8, 3)));
        assert_eq!(first_weekday_of_month(2025, 8, Weekday::Wed), Some(date(2025, 8, 6)));
        assert_eq!(first_weekday_of_month(2025, 8, Weekday::Sat), Some(date(2025, 8, 2)));
        assert_eq!(first_weekday_of_month(2025, 8, Weekday::Thu), Some(date(2025, 8, 7)));
    }

    #[test]
    fn test_last_weekday_known_dates() {
        // August 2025 ends on a Sunday
        assert_eq!(last_weekday_of_month(2025, 8, Weekday::Sun), Some(date(2025, 8, 31)));
        assert_eq!(last_weekday_of_month(2025, 8, Weekday::Mon), Some(date(2025, 8, 25)));
        assert_eq!(last_weekday_of_month(2024, 2, Weekday::Thu), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_anchors_stay_in_first_and_last_week() {
        for year in 1999..=2031 {
            for month in 1..=12 {
                let days = days_in_month(year, month).unwrap();
                for weekday in ALL_WEEKDAYS {
                    let first = first_weekday_of_month(year, month, weekday).unwrap();
                    assert_eq!(first.weekday(), weekday);
                    assert_eq!(first.month(), month);
                    assert!(first.day() <= 7);

                    let last = last_weekday_of_month(year, month, weekday).unwrap();
                    assert_eq!(last.weekday(), weekday);
                    assert_eq!(last.month(), month);
                    assert!(last.day() > days - 7);
                }
            }
        }
    }

    #[test]
    fn test_invalid_month() {
        assert_eq!(first_weekday_of_month(2025, 13, Weekday::Mon), None);
        assert_eq!(last_weekday_of_month(2025, 0, Weekday::Mon), None);
        assert!(weekday_occurrences(2025, 13, &ALL_WEEKDAYS).is_empty());
    }

    #[test]
    fn test_occurrences_28_day_month() {
        // February 2026 starts on a Sunday: exactly four of everything
        for weekday in ALL_WEEKDAYS {
            assert_eq!(count(2026, 2, weekday), 4, "{:?}", weekday);
        }
    }

    #[test]
    fn test_occurrences_leap_february() {
        // February 2024 starts on a Thursday and has 29 days
        assert_eq!(count(2024, 2, Weekday::Thu), 5);
        for weekday in ALL_WEEKDAYS.iter().filter(|w| **w != Weekday::Thu) {
            assert_eq!(count(2024, 2, *weekday), 4, "{:?}", weekday);
        }
        let all = weekday_occurrences(2024, 2, &ALL_WEEKDAYS);
        assert_eq!(all.last().map(|(d, _)| *d), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_occurrences_30_day_month() {
        // April 2026 starts on a Wednesday
        assert_eq!(count(2026, 4, Weekday::Wed), 5);
        assert_eq!(count(2026, 4, Weekday::Thu), 5);
        assert_eq!(count(2026, 4, Weekday::Fri), 4);
        assert_eq!(count(2026, 4, Weekday::Sun), 4);
    }

    #[test]
    fn test_occurrences_31_day_month_starting_sunday() {
        // March 2026 starts on a Sunday
        assert_eq!(count(2026, 3, Weekday::Sun), 5);
        assert_eq!(count(2026, 3, Weekday::Mon), 5);
        assert_eq!(count(2026, 3, Weekday::Tue), 5);
        assert_eq!(count(2026, 3, Weekday::Wed), 4);
        assert_eq!(count(2026, 3, Weekday::Sat), 4);
    }

    #[test]
    fn test_occurrences_are_ascending_and_filtered() {
        let days = weekday_occurrences(2025, 8, &[Weekday::Sun, Weekday::Wed, Weekday::Sat]);
        assert!(days.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(days
            .iter()
            .all(|(d, w)| d.weekday() == *w && [Weekday::Sun, Weekday::Wed, Weekday::Sat].contains(w)));
        assert_eq!(days.first(), Some(&(date(2025, 8, 2), Weekday::Sat)));
        assert_eq!(days.len(), 5 + 4 + 5);
    }

    #[test]
    fn test_is_first_monday() {
        assert!(is_first_monday(date(2025, 8, 4)));
        assert!(is_first_monday(date(2025, 9, 1)));
        assert!(!is_first_monday(date(2025, 8, 11)));
        assert!(!is_first_monday(date(2025, 8, 5)));
        assert!(is_first_monday(date(2025, 12, 1)));
    }
}
