//! Calendar age.

use chrono::{Datelike, NaiveDate, Utc};

/// Age in whole years on `as_of`.
///
/// A birth date after `as_of` gives a negative age; callers decide what to
/// do with it.
pub fn age_years(birth_date: NaiveDate, as_of: NaiveDate) -> i32 {
    let mut age = as_of.year() - birth_date.year();

    let has_had_birthday = (as_of.month(), as_of.day()) >= (birth_date.month(), birth_date.day());
    if !has_had_birthday {
        age -= 1;
    }

    age
}

/// Age in whole years today (UTC).
pub fn age_today(birth_date: NaiveDate) -> i32 {
    age_years(birth_date, Utc::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn day_before_birthday_is_still_previous_age() {
        assert_eq!(age_years(date(2000, 3, 15), date(2024, 3, 14)), 23);
    }

    #[test]
    fn birthday_itself_counts() {
        assert_eq!(age_years(date(2000, 3, 15), date(2024, 3, 15)), 24);
    }

    #[test]
    fn earlier_month_is_before_birthday() {
        assert_eq!(age_years(date(1990, 5, 1), date(2024, 4, 30)), 33);
        assert_eq!(age_years(date(1990, 5, 1), date(2024, 5, 2)), 34);
    }

    #[test]
    fn leap_day_birth() {
        assert_eq!(age_years(date(2004, 2, 29), date(2023, 2, 28)), 18);
        assert_eq!(age_years(date(2004, 2, 29), date(2023, 3, 1)), 19);
    }

    #[test]
    fn future_birth_date_is_negative() {
        assert_eq!(age_years(date(2030, 1, 1), date(2024, 6, 1)), -6);
        assert_eq!(age_years(date(2024, 6, 2), date(2024, 6, 1)), -1);
    }
}
