//! Utilities for dealing with Unix time and the Gregorian calendar, unaware of timezone.
//!
//! This module provides the current Unix time with nanosecond granularity and the small set of
//! calendar rules the simulator relies on: leap years, month lengths and day-of-year numbering.
//! None of the calendar functions rely on libc, so they are completely thread safe.
//!
//! # Examples
//!
//! ```
//! # use time::time::{days_in_month, isleapyear, yday_from_ymd};
//! assert!(isleapyear(2024));
//! assert_eq!(days_in_month(2024, 2), 29);
//! assert_eq!(yday_from_ymd(2024, 12, 31), 366);
//! ```

use core::ops::{Add, AddAssign};
#[cfg(feature = "now")]
use core::mem::MaybeUninit;
#[cfg(feature = "now")]
use libc::{timespec, clock_gettime, CLOCK_REALTIME};

/// Helper type to support math on [`TimeSpec`]s. Represents nanoseconds.
///
/// Adding nanoseconds to a [`TimeSpec`] will roll over seconds if needed, see the examples.
///
/// # Examples
///
/// ```
/// # use time::time::{Nanoseconds, TimeSpec};
/// // Jun 30, 2024. 23:59:00.123456789 UTC.
/// let mut c = TimeSpec { sec: 1719791940, nsec: 123456789 };
/// assert_eq!(c + Nanoseconds(10), TimeSpec { sec: c.sec, nsec: 123456799 });
/// c.nsec = 999999999;
/// assert_eq!(c + Nanoseconds(10), TimeSpec { sec: c.sec + 1, nsec: 9 });
/// ```
#[repr(transparent)]
pub struct Nanoseconds(pub i64);

/// Unix time with nanosecond granularity.
///
/// Supports simple addition / addition-assignment with [`Nanoseconds`], and measuring the
/// distance between two instants with [`TimeSpec::nanos_since`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeSpec {
	/// Seconds since the Unix epoch
	pub sec: i64,
	/// Nanoseconds since the beginning of `sec`, ranging [0-999999999]
	pub nsec: i64
}

impl TimeSpec {
	/// Nanoseconds elapsed from `earlier` to `self`. Negative if `earlier` is actually later.
	///
	/// # Examples
	///
	/// ```
	/// # use time::time::TimeSpec;
	/// let a = TimeSpec { sec: 100, nsec: 900000000 };
	/// let b = TimeSpec { sec: 101, nsec: 150000000 };
	/// assert_eq!(b.nanos_since(&a), 250000000);
	/// assert_eq!(a.nanos_since(&b), -250000000);
	/// ```
	pub fn nanos_since(&self, earlier: &TimeSpec) -> i64 {
		(self.sec - earlier.sec) * 1000000000 + (self.nsec - earlier.nsec)
	}
}

#[cfg_attr(docsrs, doc(cfg(feature = "now")))]
#[cfg(feature = "now")]
impl From<timespec> for TimeSpec {
	/// Convert from `libc::timespec` to [`TimeSpec`] for better math ergonomics
	fn from(value: timespec) -> Self {
		TimeSpec {
			sec: value.tv_sec,
			nsec: value.tv_nsec
		}
	}
}

impl Add<Nanoseconds> for TimeSpec {
	type Output = Self;

	/// Add `rhs` nanoseconds to `self`, rolling over seconds as needed to ensure `nsec` stays in
	/// the range of [0-999999999].
	fn add(mut self, rhs: Nanoseconds) -> Self::Output {
		self.nsec += rhs.0;
		self.sec += self.nsec.div_euclid(1000000000);
		self.nsec = self.nsec.rem_euclid(1000000000);
		self
	}
}

impl AddAssign<Nanoseconds> for TimeSpec {
	/// Add `rhs` nanoseconds to `self`, rolling over seconds as needed to ensure `nsec` stays in
	/// the range of [0-999999999].
	fn add_assign(&mut self, rhs: Nanoseconds) {
		*self = *self + rhs;
	}
}

/// Get the current time as a Unix timestamp with nanosecond granularity.
///
/// This function will return `None` if `libc::clock_gettime` fails.
///
/// This function is thread safe.
///
/// # Examples
///
/// ```
/// # use time::time::now;
/// let c = now().expect("Failed to get current time");
/// assert!(c.sec > 0);
/// ```
#[cfg_attr(docsrs, doc(cfg(feature = "now")))]
#[cfg(feature = "now")]
pub fn now() -> Option<TimeSpec> {
	let mut time = MaybeUninit::<timespec>::uninit();
	// Safety:
	// - clock_gettime does not read time, only writes
	// - if clock_gettime returns zero, time is successfully initialized
	unsafe {
		match clock_gettime(CLOCK_REALTIME, time.as_mut_ptr()) {
			0 => Some(time.assume_init().into()),
			_ => None
		}
	}
}

/// Check whether a given `year` is a leap year.
///
/// Year must be the absolute Gregorian calendar year (i.e. 2024). Years divisible by 4 are leap
/// years, except those divisible by 100 that are not also divisible by 400.
///
/// # Examples
///
/// ```
/// # use time::time::isleapyear;
/// assert_eq!(isleapyear(1900), false);
/// assert_eq!(isleapyear(2000), true);
/// assert_eq!(isleapyear(2004), true);
/// assert_eq!(isleapyear(2017), false);
/// assert_eq!(isleapyear(2100), false);
/// ```
#[inline(always)]
pub fn isleapyear(year: u16) -> bool {
	// Centuries must be divisible by 16 (i.e. by 400), everything else by 4
	let l = if year%100 != 0 { 3 } else { 15 };
	(year & l) == 0
}

/// The number of days in a given month.
///
/// `y` must be the absolute Gregorian calendar year, and `m` the 1-indexed month starting at
/// January. Months outside [1, 12] do not panic but the result is meaningless.
///
/// # Examples
///
/// ```
/// # use time::time::days_in_month;
/// assert_eq!(days_in_month(2023, 2), 28);
/// assert_eq!(days_in_month(2024, 2), 29);
/// assert_eq!(days_in_month(2024, 6), 30);
/// assert_eq!(days_in_month(2024, 12), 31);
/// ```
pub fn days_in_month(y: u16, m: u8) -> u8 {
	// 30 or 31 alternating, with the pattern flipping at August
	if m == 2 {
		if isleapyear(y) { 29 } else { 28 }
	} else {
		30 | (m ^ (m >> 3))
	}
}

/// Days before the first of each month in a non-leap year.
const DAYS_BEFORE_MONTH: [u16; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Days from January 1 to February 28, inclusive.
pub const DAYS_THROUGH_FEBRUARY: u16 = 31 + 28;

/// Get the 1-indexed day of the year for a given year, month, and day.
///
/// `y` must be the absolute Gregorian calendar year, `m` the 1-indexed month and `d` the day of
/// the month. The inputs are not validated beyond clamping `m` into [1, 12].
///
/// # Examples
///
/// ```
/// # use time::time::yday_from_ymd;
/// assert_eq!(yday_from_ymd(2023, 1, 1), 1);
/// assert_eq!(yday_from_ymd(2023, 3, 1), 60);
/// assert_eq!(yday_from_ymd(2024, 3, 1), 61);
/// ```
pub fn yday_from_ymd(y: u16, m: u8, d: u8) -> u16 {
	let m = m.clamp(1, 12);
	let leap = (m > 2 && isleapyear(y)) as u16;
	DAYS_BEFORE_MONTH[m as usize - 1] + d as u16 + leap
}
