//! Leap seconds and the UT1-UTC offset.
//!
//! Leap seconds are only ever scheduled for the last minute of a day in June or December. A pending leap
//! second is requested at startup and consumed by the first such minute; afterwards DUT1 jumps by a
//! full second in the same direction, since UTC has just stepped toward UT1.

use time::WallClock;
use tracing::warn;

/// Largest DUT1 magnitude (tenths of a second) that can be configured.
pub const DUT1_LIMIT: i32 = 7;
/// DUT1 change (tenths of a second) caused by one leap second.
pub const LEAP_DUT1_STEP: i16 = 10;

/// UT1 - UTC, in tenths of a second.
///
/// Configured values are limited to [-[`DUT1_LIMIT`], [`DUT1_LIMIT`]]. A leap second moves the value
/// by [`LEAP_DUT1_STEP`] without further limiting, since the offset it compensates for was
/// already close to the edge of the range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dut1(i16);

impl Dut1 {
	/// Build an offset from a configured value, resetting it to 0 (with a warning) if it is out
	/// of range.
	///
	/// # Examples
	///
	/// ```
	/// # use signals::chu::leap::Dut1;
	/// assert_eq!(Dut1::clamped(-7).tenths(), -7);
	/// assert_eq!(Dut1::clamped(8).tenths(), 0);
	/// ```
	pub fn clamped(tenths: i32) -> Dut1 {
		if (-DUT1_LIMIT..=DUT1_LIMIT).contains(&tenths) {
			Dut1(tenths as i16)
		} else {
			warn!("UT1 offset {} out of range, limited to -{} to +{} tenths; using 0",
				tenths, DUT1_LIMIT, DUT1_LIMIT);
			Dut1(0)
		}
	}

	/// The offset in tenths of a second.
	#[inline(always)]
	pub fn tenths(&self) -> i16 {
		self.0
	}
}

/// Whether `clock` is in a minute that may carry a leap second: 23:59 UTC on any day of June or
/// December. The first such minute after startup consumes the pending request.
fn is_leap_window(clock: &WallClock) -> bool {
	(clock.month == 6 || clock.month == 12) && clock.hour == 23 && clock.minute == 59
}

/// Pending leap second requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LeapSecondState {
	/// A second will be inserted at the end of the next June or December.
	pub positive_pending: bool,
	/// A second will be removed at the end of the next June or December.
	pub negative_pending: bool
}

impl LeapSecondState {
	/// Create the state from the two requests, resolving conflicts.
	pub fn new(positive_pending: bool, negative_pending: bool) -> LeapSecondState {
		let mut state = LeapSecondState { positive_pending, negative_pending };
		state.resolve_conflicts();
		state
	}

	/// Cancel both requests (with a warning) if both are pending.
	///
	/// Returns `true` if there was a conflict.
	///
	/// # Examples
	///
	/// ```
	/// # use signals::chu::leap::LeapSecondState;
	/// let mut state = LeapSecondState { positive_pending: true, negative_pending: true };
	/// assert!(state.resolve_conflicts());
	/// assert_eq!(state, LeapSecondState::default());
	/// ```
	pub fn resolve_conflicts(&mut self) -> bool {
		if self.positive_pending && self.negative_pending {
			warn!("Positive and negative leap seconds can't both be pending! Both cancelled");
			self.positive_pending = false;
			self.negative_pending = false;
			true
		} else {
			false
		}
	}

	/// Update state once a minute of `length` seconds has been emitted.
	///
	/// A 61 second minute consumes the positive leap second and raises DUT1 by
	/// [`LEAP_DUT1_STEP`]; a 59 second minute consumes the negative one and lowers it. Any other
	/// length changes nothing.
	pub fn apply_adjustment(&mut self, dut1: &mut Dut1, length: u8) {
		match length {
			61 => {
				self.positive_pending = false;
				dut1.0 += LEAP_DUT1_STEP;
			},
			59 => {
				self.negative_pending = false;
				dut1.0 -= LEAP_DUT1_STEP;
			},
			_ => ()
		}
	}
}

/// Length in seconds of the minute starting at `clock`: 59, 60 or 61.
///
/// Only 23:59 UTC in June or December can differ from 60, and only with a leap second pending.
///
/// # Examples
///
/// ```
/// # use signals::chu::leap::{minute_length, LeapSecondState};
/// # use time::WallClock;
/// let pending = LeapSecondState::new(true, false);
/// assert_eq!(minute_length(&WallClock::new(2024, 6, 30, 23, 59, 0).unwrap(), &pending), 61);
/// assert_eq!(minute_length(&WallClock::new(2024, 6, 30, 23, 58, 0).unwrap(), &pending), 60);
/// ```
pub fn minute_length(clock: &WallClock, leap: &LeapSecondState) -> u8 {
	if !is_leap_window(clock) {
		60
	} else if leap.positive_pending {
		61
	} else if leap.negative_pending {
		59
	} else {
		60
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn clock(month: u8, day: u8, hour: u8, minute: u8) -> WallClock {
		WallClock::new(2024, month, day, hour, minute, 0).unwrap()
	}

	#[test]
	fn dut1_test() {
		for t in -7..=7 {
			assert_eq!(Dut1::clamped(t).tenths(), t as i16);
		}
		assert_eq!(Dut1::clamped(8).tenths(), 0);
		assert_eq!(Dut1::clamped(-8).tenths(), 0);
		assert_eq!(Dut1::clamped(i32::MAX).tenths(), 0);
		assert_eq!(Dut1::clamped(i32::MIN).tenths(), 0);
	}

	#[test]
	fn conflict_test() {
		assert_eq!(LeapSecondState::new(true, true), LeapSecondState::default());
		assert_eq!(LeapSecondState::new(true, false).positive_pending, true);
		assert_eq!(LeapSecondState::new(false, true).negative_pending, true);

		let mut state = LeapSecondState { positive_pending: true, negative_pending: false };
		assert!(!state.resolve_conflicts());
		assert!(state.positive_pending);
	}

	#[test]
	fn minute_length_test() {
		let none = LeapSecondState::default();
		let positive = LeapSecondState::new(true, false);
		let negative = LeapSecondState::new(false, true);

		for leap in [none, positive, negative] {
			assert_eq!(minute_length(&clock(6, 30, 23, 58), &leap), 60);
			assert_eq!(minute_length(&clock(6, 30, 22, 59), &leap), 60);
			assert_eq!(minute_length(&clock(3, 31, 23, 59), &leap), 60);
			assert_eq!(minute_length(&clock(7, 1, 0, 0), &leap), 60);
			assert_eq!(minute_length(&clock(11, 30, 23, 59), &leap), 60);
		}

		assert_eq!(minute_length(&clock(6, 30, 23, 59), &none), 60);
		assert_eq!(minute_length(&clock(6, 30, 23, 59), &positive), 61);
		assert_eq!(minute_length(&clock(12, 31, 23, 59), &positive), 61);
		assert_eq!(minute_length(&clock(6, 30, 23, 59), &negative), 59);
		assert_eq!(minute_length(&clock(12, 31, 23, 59), &negative), 59);

		// Any day of the month, not just the last
		assert_eq!(minute_length(&clock(6, 15, 23, 59), &positive), 61);
		assert_eq!(minute_length(&clock(6, 15, 23, 59), &negative), 59);
		assert_eq!(minute_length(&clock(12, 1, 23, 59), &negative), 59);
		assert_eq!(minute_length(&clock(6, 15, 23, 59), &none), 60);
	}

	#[test]
	fn adjustment_test() {
		let mut leap = LeapSecondState::new(true, false);
		let mut dut1 = Dut1::clamped(-6);
		leap.apply_adjustment(&mut dut1, 60);
		assert_eq!((leap.positive_pending, dut1.tenths()), (true, -6));
		leap.apply_adjustment(&mut dut1, 61);
		assert_eq!((leap.positive_pending, dut1.tenths()), (false, 4));

		let mut leap = LeapSecondState::new(false, true);
		let mut dut1 = Dut1::clamped(5);
		leap.apply_adjustment(&mut dut1, 59);
		assert_eq!((leap.negative_pending, dut1.tenths()), (false, -5));
	}
}
