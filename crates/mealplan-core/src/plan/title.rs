//! Default plan titles derived from the week start date.
//!
//! `2024-01-15` becomes `Meal Plan: Jan 15-21, 2024`; a week crossing a
//! month boundary such as `2024-01-29` becomes
//! `Meal Plan: Jan 29 - Feb 4, 2024`. The year is always the start year.

use chrono::{Datelike, Days, NaiveDate, Weekday as ChronoWeekday};

/// Title used when neither a title nor a week start date is known.
pub const FALLBACK_TITLE: &str = "Weekly Meal Plan";

/// The generated title for a week starting on `week_start`.
pub fn default_title(week_start: NaiveDate) -> String {
    let week_end = week_start
        .checked_add_days(Days::new(6))
        .unwrap_or(NaiveDate::MAX);
    let start_month = week_start.format("%b");

    if (week_start.year(), week_start.month()) == (week_end.year(), week_end.month()) {
        format!(
            "Meal Plan: {start_month} {}-{}, {}",
            week_start.day(),
            week_end.day(),
            week_start.year()
        )
    } else {
        format!(
            "Meal Plan: {start_month} {} - {} {}, {}",
            week_start.day(),
            week_end.format("%b"),
            week_end.day(),
            week_start.year()
        )
    }
}

/// Whether `title` is still what would have been generated for
/// `week_start`, i.e. the user has not customized it.
pub fn is_default_title(title: &str, week_start: Option<NaiveDate>) -> bool {
    let title = title.trim();
    match week_start {
        Some(date) => title == default_title(date),
        None => title.is_empty() || title == FALLBACK_TITLE,
    }
}

/// The title to use after the week start moves from `prior` to `new`, or
/// `None` when the current title was customized and must be kept.
pub fn refreshed_title(current: &str, prior: Option<NaiveDate>, new: NaiveDate) -> Option<String> {
    is_default_title(current, prior).then(|| default_title(new))
}

/// The next Monday strictly after `today`; a Monday yields the following one.
pub fn next_week_start(today: NaiveDate) -> NaiveDate {
    let days_from_monday = u64::from(today.weekday().num_days_from_monday());
    today
        .checked_add_days(Days::new(7 - days_from_monday))
        .unwrap_or(today)
}

/// Whether `date` falls on the week anchor day (Monday).
pub fn is_week_anchor(date: NaiveDate) -> bool {
    date.weekday() == ChronoWeekday::Mon
}
