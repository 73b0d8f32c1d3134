//! Broken-down UTC time that advances one minute at a time.
//!
//! [`WallClock`] is the calendar state the simulator carries from minute to minute. It is created
//! once at startup, either from a Unix timestamp supplied by a [`ClockSource`] or from explicit
//! date/time fields, and afterwards only ever changes through [`WallClock::advance_minute`].

use core::fmt;
use crate::time::{days_in_month, yday_from_ymd, TimeSpec};

/// Seconds per minute.
const SECONDS_PER_MINUTE: i64 = 60;
/// Seconds per hour.
const SECONDS_PER_HOUR: i64 = SECONDS_PER_MINUTE * 60;
/// Seconds per day.
const SECONDS_PER_DAY: i64 = SECONDS_PER_HOUR * 24;
/// Days per 400 year Gregorian cycle.
const DAYS_PER_ERA: i64 = 146097;
/// Days from March 1, 0000 to January 1, 1970.
const DAYS_FROM_MARCH_0000_TO_1970: i64 = 719468;

/// Latest year a [`WallClock`] can be created in. Advancing past it still has plenty of headroom
/// before `year` overflows.
pub const MAX_YEAR: u16 = 9999;

/// UTC calendar date and time of day.
///
/// Unlike `libc::tm`, `month` is [1, 12] and `yday` is [1, 366].
///
/// # Examples
///
/// ```
/// # use time::WallClock;
/// let clock = WallClock::new(2024, 6, 30, 23, 59, 0).unwrap();
/// assert_eq!(clock.yday, 182);
/// assert_eq!(clock.to_string(), "2024-06-30 23:59:00");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallClock {
	/// Absolute Gregorian year
	pub year: u16,
	/// Month of the year, ranged [1, 12]
	pub month: u8,
	/// Day of the month, ranged [1, 31]
	pub day: u8,
	/// Hour, ranged [0, 23]
	pub hour: u8,
	/// Minute, ranged [0, 59]
	pub minute: u8,
	/// Second, ranged [0, 60]
	pub second: u8,
	/// Day of the year, ranged [1, 366]
	pub yday: u16
}

impl WallClock {
	/// Build a clock from explicit fields, computing the day of year.
	///
	/// Returns `None` if the fields do not name a real instant, e.g. February 30 or hour 24, or if
	/// `year` is past [`MAX_YEAR`]. Second 60 is accepted so a leap second can be requested
	/// explicitly.
	pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Option<WallClock> {
		if year > MAX_YEAR
			|| !(1..=12).contains(&month)
			|| day == 0 || day > days_in_month(year, month)
			|| hour > 23 || minute > 59 || second > 60
		{
			return None
		}

		Some(WallClock {
			year,
			month,
			day,
			hour,
			minute,
			second,
			yday: yday_from_ymd(year, month, day)
		})
	}

	/// Convert a Unix timestamp into a calendar date.
	///
	/// Only timestamps from the Unix epoch through the end of [`MAX_YEAR`] are supported; anything
	/// else results in `None`.
	pub fn from_unix(timestamp: i64) -> Option<WallClock> {
		// Days are counted from March 1, 0000 so the leap day falls at the very end of each
		// shifted year, which keeps the month arithmetic linear. The Gregorian calendar repeats
		// every 400 years (one era).
		// http://howardhinnant.github.io/date_algorithms.html#civil_from_days
		if timestamp < 0 { return None }
		let days = timestamp / SECONDS_PER_DAY;
		let secs = timestamp % SECONDS_PER_DAY;
		let shifted = days + DAYS_FROM_MARCH_0000_TO_1970;
		let era = shifted / DAYS_PER_ERA;
		let day_of_era = shifted % DAYS_PER_ERA;
		let year_of_era = (day_of_era - day_of_era / 1460 + day_of_era / 36524 - day_of_era / 146096) / 365;
		let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
		let shifted_month = (5 * day_of_year + 2) / 153;
		let day = day_of_year - (153 * shifted_month + 2) / 5 + 1;
		let month = if shifted_month < 10 { shifted_month + 3 } else { shifted_month - 9 };
		let year = era * 400 + year_of_era + (month <= 2) as i64;
		if year > MAX_YEAR as i64 { return None }

		let (year, month, day) = (year as u16, month as u8, day as u8);
		Some(WallClock {
			year,
			month,
			day,
			hour: (secs / SECONDS_PER_HOUR) as u8,
			minute: ((secs % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE) as u8,
			second: (secs % SECONDS_PER_MINUTE) as u8,
			yday: yday_from_ymd(year, month, day)
		})
	}

	/// Advance to the start of the next minute.
	///
	/// The seconds field is reset to zero. Overflow rolls into the hour, day, month and year in
	/// turn; the day of year is incremented with the day and restarts at 1 with a new year.
	///
	/// # Examples
	///
	/// ```
	/// # use time::WallClock;
	/// let mut clock = WallClock::new(2024, 12, 31, 23, 59, 30).unwrap();
	/// assert_eq!(clock.yday, 366);
	/// clock.advance_minute();
	/// assert_eq!(clock, WallClock::new(2025, 1, 1, 0, 0, 0).unwrap());
	/// assert_eq!(clock.yday, 1);
	/// ```
	pub fn advance_minute(&mut self) {
		self.second = 0;
		self.minute += 1;
		if self.minute < 60 { return }

		self.minute = 0;
		self.hour += 1;
		if self.hour < 24 { return }

		self.hour = 0;
		self.day += 1;
		self.yday += 1;
		if self.day <= days_in_month(self.year, self.month) { return }

		self.day = 1;
		self.month += 1;
		if self.month <= 12 { return }

		self.month = 1;
		self.year += 1;
		self.yday = 1;
	}

	/// The hour and minute that follow this one, wrapping at midnight.
	///
	/// # Examples
	///
	/// ```
	/// # use time::WallClock;
	/// let clock = WallClock::new(2024, 6, 30, 23, 59, 0).unwrap();
	/// assert_eq!(clock.next_hour_minute(), (0, 0));
	/// ```
	pub fn next_hour_minute(&self) -> (u8, u8) {
		match (self.hour, self.minute) {
			(23, 59) => (0, 0),
			(h, 59) => (h + 1, 0),
			(h, m) => (h, m + 1)
		}
	}
}

impl fmt::Display for WallClock {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-{:02}-{:02} {:02}:{:02}:{:02}",
			self.year, self.month, self.day, self.hour, self.minute, self.second)
	}
}

/// A source of the current time.
///
/// The simulator reads the clock twice at startup: once to establish the starting [`WallClock`]
/// and once more after setup to measure how long setup took. Everything afterwards is derived
/// from the [`WallClock`] alone.
pub trait ClockSource {
	/// The current Unix time, or `None` if it is unavailable.
	fn now(&self) -> Option<TimeSpec>;

	/// Whether this source follows real time. Startup delay is only meaningful for live sources.
	fn is_live(&self) -> bool;
}

/// The system's real-time clock.
#[cfg_attr(docsrs, doc(cfg(feature = "now")))]
#[cfg(feature = "now")]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

#[cfg(feature = "now")]
impl ClockSource for SystemClock {
	fn now(&self) -> Option<TimeSpec> {
		crate::time::now()
	}

	fn is_live(&self) -> bool {
		true
	}
}

/// A clock frozen at a fixed instant.
///
/// # Examples
///
/// ```
/// # use time::{ClockSource, FixedClock, TimeSpec};
/// let clock = FixedClock(TimeSpec { sec: 1719791940, nsec: 0 });
/// assert_eq!(clock.now(), clock.now());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub TimeSpec);

impl ClockSource for FixedClock {
	fn now(&self) -> Option<TimeSpec> {
		Some(self.0)
	}

	fn is_live(&self) -> bool {
		false
	}
}
