//! Temporal validity of NeTEx entities.
//!
//! An entity carries zero or more [`ValidityWindow`]s. An entity without
//! windows is always valid. When windows are present only the first one is
//! consulted: later windows never rescue an entity whose first window has
//! lapsed. Downstream consumers rely on this, so it is kept as is.

use chrono::{Local, NaiveDateTime};

/// A half-open or closed interval during which an entity applies.
///
/// Timestamps are naive local date-times, the way NeTEx exports write them.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use asag_core::ValidityWindow;
///
/// let day = NaiveDate::from_ymd_opt(2024, 5, 17).and_then(|d| d.and_hms_opt(12, 0, 0));
/// let window = ValidityWindow::new(day, None);
/// let later = NaiveDate::from_ymd_opt(2024, 6, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
/// assert!(window.is_valid_at(later.unwrap_or_default()));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidityWindow {
    /// Inclusive lower bound, if any.
    pub from: Option<NaiveDateTime>,
    /// Inclusive upper bound, if any.
    pub to: Option<NaiveDateTime>,
}

impl ValidityWindow {
    /// Build a window from optional bounds.
    #[must_use]
    pub const fn new(from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Self {
        Self { from, to }
    }

    /// Return whether `now` falls inside the window.
    #[must_use]
    pub fn is_valid_at(&self, now: NaiveDateTime) -> bool {
        let started = self.from.is_none_or(|from| from <= now);
        let not_ended = self.to.is_none_or(|to| to >= now);
        started && not_ended
    }
}

/// Evaluate a list of windows at `now`.
///
/// Returns `true` for an empty list, otherwise the verdict of the first
/// window.
#[must_use]
pub fn is_valid_at(windows: &[ValidityWindow], now: NaiveDateTime) -> bool {
    windows
        .iter()
        .map(|window| window.is_valid_at(now))
        .next()
        .unwrap_or(true)
}

/// Evaluate a list of windows against the local wall clock.
#[must_use]
pub fn is_valid_now(windows: &[ValidityWindow]) -> bool {
    is_valid_at(windows, local_now())
}

/// Current local time without a zone, matching NeTEx timestamps.
#[must_use]
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .expect("valid timestamp")
    }

    #[rstest]
    fn empty_list_is_valid(now: NaiveDateTime) {
        assert!(is_valid_at(&[], now));
    }

    #[rstest]
    #[case::open(None, None, true)]
    #[case::started(Some(-1), None, true)]
    #[case::future(Some(1), None, false)]
    #[case::expired(None, Some(-1), false)]
    #[case::ongoing(None, Some(1), true)]
    #[case::inside(Some(-1), Some(1), true)]
    #[case::boundaries(Some(0), Some(0), true)]
    fn single_window(
        now: NaiveDateTime,
        #[case] from_days: Option<i64>,
        #[case] to_days: Option<i64>,
        #[case] expected: bool,
    ) {
        let window = ValidityWindow::new(
            from_days.map(|days| now + Duration::days(days)),
            to_days.map(|days| now + Duration::days(days)),
        );
        assert_eq!(window.is_valid_at(now), expected);
    }

    #[rstest]
    fn first_window_decides(now: NaiveDateTime) {
        let expired = ValidityWindow::new(None, Some(now - Duration::days(3)));
        let current = ValidityWindow::new(Some(now - Duration::days(1)), None);

        assert!(!is_valid_at(&[expired, current], now));
        assert!(is_valid_at(&[current, expired], now));
    }

    proptest! {
        #[test]
        fn window_matches_bounds(from in proptest::option::of(-1000i64..1000), to in proptest::option::of(-1000i64..1000)) {
            let now = NaiveDate::from_ymd_opt(2024, 1, 1)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .expect("valid timestamp");
            let window = ValidityWindow::new(
                from.map(|minutes| now + Duration::minutes(minutes)),
                to.map(|minutes| now + Duration::minutes(minutes)),
            );
            let expected = from.is_none_or(|m| m <= 0) && to.is_none_or(|m| m >= 0);
            prop_assert_eq!(window.is_valid_at(now), expected);
            prop_assert_eq!(is_valid_at(&[window], now), expected);
        }
    }
}
