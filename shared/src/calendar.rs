//! Calendar signals: weekends, public holidays and seasons
//!
//! Public-holiday lookup is a capability behind [`HolidayCalendar`]. A lookup
//! that fails is treated as "not a holiday" by [`is_holiday`]; it never aborts a
//! forecast run.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::HolidayLookupError;
use crate::models::{HolidayCalendarKind, HolidaySettings};

/// Public-holiday lookup
pub trait HolidayCalendar {
    /// Whether `date` is a public holiday. Weekends are handled by the caller.
    fn lookup(&self, date: NaiveDate) -> Result<bool, HolidayLookupError>;
}

/// Saturday or Sunday
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Weekend or public holiday. Lookup errors fail open to `false`.
pub fn is_holiday(date: NaiveDate, calendar: &dyn HolidayCalendar) -> bool {
    if is_weekend(date) {
        return true;
    }
    match calendar.lookup(date) {
        Ok(hit) => hit,
        Err(e) => {
            tracing::warn!("Holiday lookup failed for {}, assuming working day: {}", date, e);
            false
        }
    }
}

/// Calendar without public holidays
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPublicHolidays;

impl HolidayCalendar for NoPublicHolidays {
    fn lookup(&self, _date: NaiveDate) -> Result<bool, HolidayLookupError> {
        Ok(false)
    }
}

/// Explicit list of closure dates
#[derive(Debug, Clone, Default)]
pub struct FixedHolidayCalendar {
    dates: BTreeSet<NaiveDate>,
}

impl FixedHolidayCalendar {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }
}

impl HolidayCalendar for FixedHolidayCalendar {
    fn lookup(&self, date: NaiveDate) -> Result<bool, HolidayLookupError> {
        Ok(self.dates.contains(&date))
    }
}

/// Rule-based Japanese national holidays, valid for 2000 through 2099
#[derive(Debug, Clone, Copy, Default)]
pub struct JapaneseHolidayCalendar;

impl JapaneseHolidayCalendar {
    pub const FIRST_YEAR: i32 = 2000;
    pub const LAST_YEAR: i32 = 2099;

    /// Name of the holiday on `date`, if any
    pub fn holiday_name(
        &self,
        date: NaiveDate,
    ) -> Result<Option<&'static str>, HolidayLookupError> {
        let year = date.year();
        if !(Self::FIRST_YEAR..=Self::LAST_YEAR).contains(&year) {
            return Err(HolidayLookupError::OutOfRange(year));
        }
        if let Some(name) = statutory_holiday(date) {
            return Ok(Some(name));
        }
        if is_substitute_holiday(date) {
            return Ok(Some("振替休日"));
        }
        if is_citizens_holiday(date) {
            return Ok(Some("国民の休日"));
        }
        Ok(None)
    }
}

impl HolidayCalendar for JapaneseHolidayCalendar {
    fn lookup(&self, date: NaiveDate) -> Result<bool, HolidayLookupError> {
        self.holiday_name(date).map(|name| name.is_some())
    }
}

/// Calendar assembled from configuration: the selected base calendar plus extra dates
#[derive(Debug, Clone)]
pub struct ConfiguredHolidayCalendar {
    kind: HolidayCalendarKind,
    extra: FixedHolidayCalendar,
}

impl ConfiguredHolidayCalendar {
    pub fn from_settings(settings: &HolidaySettings) -> Self {
        Self {
            kind: settings.calendar,
            extra: FixedHolidayCalendar::new(settings.extra_dates.iter().copied()),
        }
    }
}

impl HolidayCalendar for ConfiguredHolidayCalendar {
    fn lookup(&self, date: NaiveDate) -> Result<bool, HolidayLookupError> {
        if self.extra.lookup(date)? {
            return Ok(true);
        }
        match self.kind {
            HolidayCalendarKind::Japan => JapaneseHolidayCalendar.lookup(date),
            HolidayCalendarKind::Fixed | HolidayCalendarKind::None => Ok(false),
        }
    }
}

// ============================================================================
// Japanese holiday rules
// ============================================================================

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn nth_monday(year: i32, month: u32, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Mon, n)
}

/// Day of March of the vernal equinox (1980-2099 approximation)
fn vernal_equinox_day(year: i32) -> u32 {
    let y = f64::from(year - 1980);
    (20.8431 + 0.242194 * y - (y / 4.0).floor()).floor() as u32
}

/// Day of September of the autumnal equinox (1980-2099 approximation)
fn autumnal_equinox_day(year: i32) -> u32 {
    let y = f64::from(year - 1980);
    (23.2488 + 0.242194 * y - (y / 4.0).floor()).floor() as u32
}

/// Holidays named by the national holiday law, without substitutes
fn statutory_holiday(date: NaiveDate) -> Option<&'static str> {
    let year = date.year();
    let is = |other: Option<NaiveDate>| other == Some(date);

    match date.month() {
        1 if date.day() == 1 => Some("元日"),
        1 if is(nth_monday(year, 1, 2)) => Some("成人の日"),
        2 if date.day() == 11 => Some("建国記念の日"),
        2 if date.day() == 23 && year >= 2020 => Some("天皇誕生日"),
        3 if date.day() == vernal_equinox_day(year) => Some("春分の日"),
        4 if date.day() == 29 => Some(if year >= 2007 { "昭和の日" } else { "みどりの日" }),
        4 if date.day() == 30 && year == 2019 => Some("国民の休日"),
        5 if date.day() == 1 && year == 2019 => Some("天皇の即位の日"),
        5 if date.day() == 3 => Some("憲法記念日"),
        5 if date.day() == 4 && year >= 2007 => Some("みどりの日"),
        5 if date.day() == 5 => Some("こどもの日"),
        7 | 8 | 10 => summer_sports_holiday(date),
        9 if is(respect_for_aged_day(year)) => Some("敬老の日"),
        9 if date.day() == autumnal_equinox_day(year) => Some("秋分の日"),
        11 if date.day() == 3 => Some("文化の日"),
        11 if date.day() == 23 => Some("勤労感謝の日"),
        12 if date.day() == 23 && (1989..=2018).contains(&year) => Some("天皇誕生日"),
        _ => None,
    }
}

/// Marine Day, Mountain Day and Sports Day, which moved around the 2020 Olympics
fn summer_sports_holiday(date: NaiveDate) -> Option<&'static str> {
    let year = date.year();
    let (marine, mountain, sports) = match year {
        2020 => (ymd(2020, 7, 23), ymd(2020, 8, 10), ymd(2020, 7, 24)),
        2021 => (ymd(2021, 7, 22), ymd(2021, 8, 8), ymd(2021, 7, 23)),
        _ => {
            let marine = if year >= 2003 {
                nth_monday(year, 7, 3)
            } else {
                ymd(year, 7, 20)
            };
            let mountain = if year >= 2016 { ymd(year, 8, 11) } else { None };
            (marine, mountain, nth_monday(year, 10, 2))
        }
    };

    if Some(date) == marine {
        Some("海の日")
    } else if Some(date) == mountain {
        Some("山の日")
    } else if Some(date) == sports {
        Some(if year >= 2020 { "スポーツの日" } else { "体育の日" })
    } else if year == 2019 && date == NaiveDate::from_ymd_opt(2019, 10, 22)? {
        Some("即位礼正殿の儀")
    } else {
        None
    }
}

fn respect_for_aged_day(year: i32) -> Option<NaiveDate> {
    if year >= 2003 {
        nth_monday(year, 9, 3)
    } else {
        ymd(year, 9, 15)
    }
}

/// A holiday falling on Sunday moves to the next day that is not itself a holiday
fn is_substitute_holiday(date: NaiveDate) -> bool {
    if statutory_holiday(date).is_some() {
        return false;
    }
    let mut previous = date - Duration::days(1);
    if date.year() < 2007 {
        return date.weekday() == Weekday::Mon && statutory_holiday(previous).is_some();
    }
    while statutory_holiday(previous).is_some() {
        if previous.weekday() == Weekday::Sun {
            return true;
        }
        previous -= Duration::days(1);
    }
    false
}

/// A weekday sandwiched between two statutory holidays
fn is_citizens_holiday(date: NaiveDate) -> bool {
    if date.weekday() == Weekday::Sun || statutory_holiday(date).is_some() {
        return false;
    }
    let before = date - Duration::days(1);
    let after = date + Duration::days(1);
    statutory_holiday(before).is_some() && statutory_holiday(after).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    struct BrokenCalendar;

    impl HolidayCalendar for BrokenCalendar {
        fn lookup(&self, _date: NaiveDate) -> Result<bool, HolidayLookupError> {
            Err(HolidayLookupError::Unavailable("offline".to_string()))
        }
    }

    #[test]
    fn test_weekend_is_holiday() {
        assert!(is_holiday(d(2024, 6, 1), &NoPublicHolidays)); // Saturday
        assert!(is_holiday(d(2024, 6, 2), &NoPublicHolidays)); // Sunday
        assert!(!is_holiday(d(2024, 6, 3), &NoPublicHolidays));
    }

    #[test]
    fn test_lookup_failure_fails_open() {
        assert!(!is_holiday(d(2024, 6, 3), &BrokenCalendar));
        // Weekends do not depend on the lookup
        assert!(is_holiday(d(2024, 6, 2), &BrokenCalendar));
    }

    #[test]
    fn test_japanese_holidays_2024() {
        let cal = JapaneseHolidayCalendar;
        let holidays = [
            d(2024, 1, 1),
            d(2024, 1, 8),
            d(2024, 2, 11),
            d(2024, 2, 12), // substitute
            d(2024, 2, 23),
            d(2024, 3, 20),
            d(2024, 4, 29),
            d(2024, 5, 3),
            d(2024, 5, 4),
            d(2024, 5, 5),
            d(2024, 5, 6), // substitute
            d(2024, 7, 15),
            d(2024, 8, 11),
            d(2024, 8, 12), // substitute
            d(2024, 9, 16),
            d(2024, 9, 22),
            d(2024, 9, 23), // substitute
            d(2024, 10, 14),
            d(2024, 11, 3),
            d(2024, 11, 4), // substitute
            d(2024, 11, 23),
        ];
        for date in holidays {
            assert_eq!(cal.lookup(date), Ok(true), "{} should be a holiday", date);
        }
        assert_eq!(cal.lookup(d(2024, 5, 7)), Ok(false));
        assert_eq!(cal.lookup(d(2024, 12, 23)), Ok(false));
    }

    #[test]
    fn test_citizens_holiday_2015() {
        // 2015-09-22 sits between Respect for the Aged Day and the equinox
        assert_eq!(JapaneseHolidayCalendar.lookup(d(2015, 9, 22)), Ok(true));
    }

    #[test]
    fn test_olympic_year_moves() {
        let cal = JapaneseHolidayCalendar;
        assert_eq!(cal.lookup(d(2021, 7, 22)), Ok(true));
        assert_eq!(cal.lookup(d(2021, 7, 19)), Ok(false));
        assert_eq!(cal.lookup(d(2020, 10, 12)), Ok(false));
    }

    #[test]
    fn test_out_of_range_year_errors() {
        assert_eq!(
            JapaneseHolidayCalendar.lookup(d(2150, 1, 1)),
            Err(HolidayLookupError::OutOfRange(2150))
        );
        // and the flag fails open
        assert!(!is_holiday(d(2150, 1, 1), &JapaneseHolidayCalendar));
    }

    #[test]
    fn test_configured_calendar_extra_dates() {
        let settings = HolidaySettings {
            calendar: HolidayCalendarKind::None,
            extra_dates: vec![d(2024, 12, 30)],
        };
        let cal = ConfiguredHolidayCalendar::from_settings(&settings);
        assert_eq!(cal.lookup(d(2024, 12, 30)), Ok(true));
        assert_eq!(cal.lookup(d(2024, 1, 1)), Ok(false));
    }
}
