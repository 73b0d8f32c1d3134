//! Generate time signal audio.
//!
//! This crate synthesizes the audio program of the Canadian time station [CHU] one minute at a
//! time: second ticks, the top-of-hour marker, the 2025/2225 Hz timing-code bursts, DUT1 double
//! ticks, leap seconds and the bilingual voice announcements. Each minute is rendered into a
//! signed 16-bit sample buffer at a configurable sample rate.
//!
//! The crate is split into a station-independent synthesizer ([`tone`]), the voice
//! announcement boundary ([`voice`]), and the station format itself ([`chu`]).
//!
//! [CHU]: https://en.wikipedia.org/wiki/CHU_(radio_station)
//!
//! # Examples
//! ```
//! # use signals::{chu::{Config, Overrides, Session}, voice::Silent};
//! # use time::{FixedClock, TimeSpec};
//! // Jun 30, 2024. 23:59:00 UTC, with a positive leap second pending
//! let clock = FixedClock(TimeSpec { sec: 1719791940, nsec: 0 });
//! let config = Config { positive_leap: true, ..Config::default() };
//! let mut session = Session::start(config, &clock, &Overrides::default(), Silent).unwrap();
//!
//! // The leap minute is 61 seconds long
//! let minute = session.step().unwrap();
//! assert_eq!(minute.len(), 61 * 48000);
//! ```

use core::fmt;

pub mod tone;
pub mod voice;
pub mod chu;

/// Capacity of a minute buffer in milliseconds, enough for a minute with a positive leap second.
pub const MINUTE_CAPACITY_MS: u32 = 61000;

/// Output sample rate.
///
/// Tones and silences are placed on millisecond boundaries, so the rate must be a whole number of
/// samples per millisecond.
///
/// # Examples
///
/// ```
/// # use signals::SampleRate;
/// let rate = SampleRate::new(48000).unwrap();
/// assert_eq!(rate.per_ms(), 48);
/// assert!(SampleRate::new(44100).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleRate(u32);

impl SampleRate {
	/// Rate used when none is configured.
	pub const DEFAULT: SampleRate = SampleRate(48000);

	/// Validate a sample rate in Hz.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::SampleRate`] if `hz` is zero or not a multiple of 1000.
	pub fn new(hz: u32) -> Result<SampleRate, ConfigError> {
		if hz == 0 || hz % 1000 != 0 {
			Err(ConfigError::SampleRate(hz))
		} else {
			Ok(SampleRate(hz))
		}
	}

	/// Samples per second.
	#[inline(always)]
	pub fn hz(&self) -> u32 {
		self.0
	}

	/// Samples per millisecond.
	#[inline(always)]
	pub fn per_ms(&self) -> usize {
		(self.0 / 1000) as usize
	}

	/// Samples in a minute buffer, see [`MINUTE_CAPACITY_MS`].
	#[inline(always)]
	pub fn minute_capacity(&self) -> usize {
		self.per_ms() * MINUTE_CAPACITY_MS as usize
	}
}

impl Default for SampleRate {
	fn default() -> Self {
		SampleRate::DEFAULT
	}
}

impl fmt::Display for SampleRate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} Hz", self.0)
	}
}

/// The error type for placing tones, silence or voice into a minute buffer.
///
/// The station layout never produces these for a correctly sized buffer; seeing one means the
/// layout tables or the buffer are wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
	/// The start offset (ms) is outside the minute buffer.
	#[error("start {0} ms is outside the minute buffer")]
	StartOutOfRange(u32),
	/// The span (ms) is empty, reversed or runs past the end of the minute buffer.
	#[error("span {start}..{stop} ms does not fit the minute buffer")]
	SpanOutOfRange {
		start: u32,
		stop: u32
	}
}

/// The error type for startup configuration that cannot be clamped into something usable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
	/// The sample rate (Hz) is not a positive multiple of 1000.
	#[error("sample rate {0} Hz is not a positive multiple of 1000")]
	SampleRate(u32),
	/// The output offset (ms) is not a number or is larger than a minute either way.
	#[error("offset {0} ms is outside -{max} to +{max} ms", max = chu::MAX_OFFSET_MS)]
	Offset(f64),
	/// The requested date or time does not exist.
	#[error("no such time: {year}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}")]
	InvalidTime {
		year: u16,
		month: u8,
		day: u8,
		hour: u8,
		minute: u8,
		second: u8
	},
	/// The clock source could not supply the current time, or it is before 1970.
	#[error("failed to get the current time")]
	Clock
}
