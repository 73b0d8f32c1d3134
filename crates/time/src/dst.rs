//! Daylight saving time under the USA rules in force since 2007.
//!
//! DST starts on the second Sunday of March and ends on the first Sunday of November, which always
//! makes it last exactly [`DST_DURATION_DAYS`] days. Earlier rule sets are not modeled: for years
//! before 2007 the start day is reported as 0 and DST is never in effect.

use crate::clock::WallClock;
use crate::time::{isleapyear, DAYS_THROUGH_FEBRUARY};

/// First year of the current rules.
pub const DST_FIRST_YEAR: u16 = 2007;
/// Day of March on which DST started in [`DST_FIRST_YEAR`].
const DST_FIRST_DAY_OF_MARCH: u8 = 11;
/// Days from the second Sunday in March to the first Sunday in November.
pub const DST_DURATION_DAYS: u16 = 238;

/// Get the day of year (1-indexed) on which DST starts in `year`.
///
/// Returns 0 for years before [`DST_FIRST_YEAR`]. Otherwise the second Sunday in March is found by
/// stepping forward from March 11, 2007: a year moves the weekday of a fixed date forward by one,
/// or by two when February of the new year has a leap day, so the date of the Sunday moves back by
/// the same amount and slips forward a week whenever it leaves the 8-14 window.
///
/// # Examples
///
/// ```
/// # use time::dst::dst_start_yday;
/// assert_eq!(dst_start_yday(2006), 0);
/// assert_eq!(dst_start_yday(2007), 70);  // March 11
/// assert_eq!(dst_start_yday(2024), 70);  // March 10, leap year
/// assert_eq!(dst_start_yday(2025), 68);  // March 9
/// ```
pub fn dst_start_yday(year: u16) -> u16 {
	if year < DST_FIRST_YEAR { return 0 }

	let mut day_of_march = DST_FIRST_DAY_OF_MARCH;
	for y in (DST_FIRST_YEAR + 1)..=year {
		day_of_march -= 1;
		if isleapyear(y) {
			day_of_march -= 1;
		}
		if day_of_march <= 7 {
			day_of_march += 7;
		}
	}

	DAYS_THROUGH_FEBRUARY + day_of_march as u16 + isleapyear(year) as u16
}

/// Whether DST is in effect for the whole of `clock`'s UTC day.
///
/// The indication changes at the UTC day boundary, which is how the broadcast flags it. Years
/// before [`DST_FIRST_YEAR`] always report `false`.
///
/// # Examples
///
/// ```
/// # use time::{dst::dst_in_effect, WallClock};
/// assert!(!dst_in_effect(&WallClock::new(2024, 3, 9, 12, 0, 0).unwrap()));
/// assert!(dst_in_effect(&WallClock::new(2024, 3, 10, 12, 0, 0).unwrap()));
/// assert!(dst_in_effect(&WallClock::new(2024, 11, 2, 12, 0, 0).unwrap()));
/// assert!(!dst_in_effect(&WallClock::new(2024, 11, 3, 12, 0, 0).unwrap()));
/// ```
pub fn dst_in_effect(clock: &WallClock) -> bool {
	match dst_start_yday(clock.year) {
		0 => false,
		start => (start..start + DST_DURATION_DAYS).contains(&clock.yday)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::time::yday_from_ymd;

	#[test]
	fn dst_start_yday_test() {
		// Second Sunday in March, from published calendars
		let starts: [(u16, u8); 24] = [
			(2007, 11), (2008, 9), (2009, 8), (2010, 14), (2011, 13), (2012, 11),
			(2013, 10), (2014, 9), (2015, 8), (2016, 13), (2017, 12), (2018, 11),
			(2019, 10), (2020, 8), (2021, 14), (2022, 13), (2023, 12), (2024, 10),
			(2025, 9), (2026, 8), (2027, 14), (2028, 12), (2029, 11), (2030, 10)
		];
		for (year, day) in starts {
			assert_eq!(dst_start_yday(year), yday_from_ymd(year, 3, day), "year {}", year);
		}

		assert_eq!(dst_start_yday(0), 0);
		assert_eq!(dst_start_yday(1999), 0);
		assert_eq!(dst_start_yday(2006), 0);
	}

	#[test]
	fn dst_end_test() {
		// First Sunday in November is the first day without DST
		let ends: [(u16, u8); 6] = [(2007, 4), (2016, 6), (2020, 1), (2023, 5), (2024, 3), (2025, 2)];
		for (year, day) in ends {
			assert_eq!(
				dst_start_yday(year) + DST_DURATION_DAYS,
				yday_from_ymd(year, 11, day),
				"year {}", year
			);
		}
	}

	#[test]
	fn dst_in_effect_test() {
		assert!(!dst_in_effect(&WallClock::new(2006, 7, 1, 0, 0, 0).unwrap()));
		assert!(!dst_in_effect(&WallClock::new(2024, 1, 15, 0, 0, 0).unwrap()));
		assert!(dst_in_effect(&WallClock::new(2024, 7, 1, 0, 0, 0).unwrap()));
		assert!(!dst_in_effect(&WallClock::new(2024, 12, 31, 23, 59, 0).unwrap()));
		assert!(!dst_in_effect(&WallClock::new(2025, 3, 8, 23, 59, 0).unwrap()));
		assert!(dst_in_effect(&WallClock::new(2025, 3, 9, 0, 0, 0).unwrap()));
	}
}
