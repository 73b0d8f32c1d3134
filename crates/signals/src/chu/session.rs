//! The minute-by-minute state machine.
//!
//! A [`Session`] holds everything that changes from one minute to the next: the wall clock, the
//! pending leap seconds, DUT1 and the startup trim. Each [`Session::step`] renders the current
//! minute into the session's buffer, hands back the part of it that should be emitted, and moves on
//! to the next minute.

use std::io::{self, Write};

use time::{dst_in_effect, ClockSource, TimeSpec, WallClock, DST_FIRST_YEAR};
use tracing::{debug, info, warn};

use crate::{tone, ConfigError, SampleRate, SynthesisError};
use crate::voice::VoiceService;
use super::{announcements, encode_minute, minute_length, Dut1, LeapSecondState};

/// Largest output offset (ms) either way, one minute.
pub const MAX_OFFSET_MS: f64 = 60000.;

/// Startup configuration for a [`Session`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
	/// Output sample rate.
	pub rate: SampleRate,
	/// Output offset in milliseconds, at most [`MAX_OFFSET_MS`] either way. Positive values emit the
	/// signal early to make up for delay downstream, negative values hold it back.
	pub offset_ms: f64,
	/// UT1 - UTC in tenths of a second, limited to ±7.
	pub dut1: i32,
	/// Insert a leap second at the end of the next June or December.
	pub positive_leap: bool,
	/// Remove a second at the end of the next June or December.
	pub negative_leap: bool,
	/// Generate the ticks and timing code. Announcements are made either way.
	pub tones: bool
}

impl Default for Config {
	fn default() -> Self {
		Config {
			rate: SampleRate::DEFAULT,
			offset_ms: 0.,
			dut1: 0,
			positive_leap: false,
			negative_leap: false,
			tones: true
		}
	}
}

/// Manually set date and time fields.
///
/// Setting any field puts the session in manual time: the fields that are not set still come from
/// the clock source, but no attempt is made to line the output up with real time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Overrides {
	pub year: Option<u16>,
	pub month: Option<u8>,
	pub day: Option<u8>,
	pub hour: Option<u8>,
	pub minute: Option<u8>,
	pub second: Option<u8>
}

impl Overrides {
	/// Whether any field is set.
	pub fn is_manual(&self) -> bool {
		self.year.is_some() || self.month.is_some() || self.day.is_some()
			|| self.hour.is_some() || self.minute.is_some() || self.second.is_some()
	}

	/// Apply the set fields on top of `base`.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::InvalidTime`] if the result is not a real date and time.
	fn apply(&self, base: &WallClock) -> Result<WallClock, ConfigError> {
		let year = self.year.unwrap_or(base.year);
		let month = self.month.unwrap_or(base.month);
		let day = self.day.unwrap_or(base.day);
		let hour = self.hour.unwrap_or(base.hour);
		let minute = self.minute.unwrap_or(base.minute);
		let second = self.second.unwrap_or(base.second);
		WallClock::new(year, month, day, hour, minute, second)
			.ok_or(ConfigError::InvalidTime { year, month, day, hour, minute, second })
	}
}

/// One rendered minute, ready to emit.
#[derive(Debug)]
pub struct Minute<'a> {
	/// Date and time at the start of the minute.
	pub time: WallClock,
	/// Length of the minute in seconds: 59, 60 or 61.
	pub length: u8,
	/// Samples of silence to emit before `samples`. Only non-zero for the first minute when the
	/// output is held back by more than the time already elapsed.
	pub lead_in: usize,
	/// The part of the minute buffer to emit.
	pub samples: &'a [i16]
}

impl Minute<'_> {
	/// Total number of samples to emit.
	pub fn len(&self) -> usize {
		self.lead_in + self.samples.len()
	}

	/// Whether there is nothing to emit.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Write the minute as headerless signed 16-bit little-endian PCM.
	///
	/// # Errors
	///
	/// Any I/O error from `out`.
	pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
		let silence = [0u8; 2];
		for _ in 0..self.lead_in {
			out.write_all(&silence)?;
		}
		let mut bytes = Vec::with_capacity(self.samples.len() * 2);
		for s in self.samples {
			bytes.extend_from_slice(&s.to_le_bytes());
		}
		out.write_all(&bytes)
	}
}

/// Convert a duration in nanoseconds to samples at `rate`, truncating.
fn nanos_to_samples(nanos: i64, rate: SampleRate) -> i64 {
	nanos * rate.per_ms() as i64 / 1000000
}

/// Wording for the configured output offset.
fn offset_direction(offset_ms: f64) -> &'static str {
	if offset_ms > 0. {
		"early"
	} else if offset_ms < 0. {
		"late"
	} else {
		"on time"
	}
}

/// A running CHU broadcast.
pub struct Session<V: VoiceService> {
	rate: SampleRate,
	tones: bool,
	clock: WallClock,
	leap: LeapSecondState,
	dut1: Dut1,
	buffer: Vec<i16>,
	/// Samples still to drop from the front of the output. Negative values become lead-in silence.
	/// A trim longer than the first minute carries into the next one.
	trim: i64,
	voice: V
}

impl<V: VoiceService> Session<V> {
	/// Start a session at the current time of `source`, adjusted by `overrides`.
	///
	/// Out-of-range DUT1 and conflicting leap second requests are reset with a warning. For a live
	/// clock without overrides, the first minute is trimmed so that output lines up with real time:
	/// the part of the minute already elapsed is skipped, along with however long setup took.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::Offset`] if the offset is out of range, [`ConfigError::Clock`] if
	/// `source` has no time to offer, and [`ConfigError::InvalidTime`] if `overrides` name a time
	/// that does not exist.
	pub fn start<C: ClockSource + ?Sized>(config: Config, source: &C, overrides: &Overrides, voice: V)
		-> Result<Session<V>, ConfigError>
	{
		// Also rejects NaN
		if !(config.offset_ms.abs() <= MAX_OFFSET_MS) {
			return Err(ConfigError::Offset(config.offset_ms));
		}
		let t0 = source.now().ok_or(ConfigError::Clock)?;
		let live = WallClock::from_unix(t0.sec).ok_or(ConfigError::Clock)?;
		let manual = overrides.is_manual();
		let clock = if manual { overrides.apply(&live)? } else { live };

		if clock.year < DST_FIRST_YEAR {
			warn!("Year {} is before {}, DST will not be indicated", clock.year, DST_FIRST_YEAR);
		}

		let rate = config.rate;
		let leap = LeapSecondState::new(config.positive_leap, config.negative_leap);
		let dut1 = Dut1::clamped(config.dut1);
		info!("Sample rate {}, total offset {:.0} ms ({})",
			rate, config.offset_ms, offset_direction(config.offset_ms));

		let mut session = Session {
			rate,
			tones: config.tones,
			clock,
			leap,
			dut1,
			buffer: vec![0; rate.minute_capacity()],
			trim: 0,
			voice
		};

		session.trim = (config.offset_ms * rate.per_ms() as f64) as i64
			+ clock.second as i64 * rate.hz() as i64;
		if !manual && source.is_live() {
			session.trim += nanos_to_samples(t0.nsec, rate);
			session.trim += session.startup_delay(source, &t0);
		}
		debug!("Trimming {} samples from the start of the output", session.trim);
		Ok(session)
	}

	/// Samples elapsed between `t0` and now.
	fn startup_delay<C: ClockSource + ?Sized>(&self, source: &C, t0: &TimeSpec) -> i64 {
		match source.now() {
			Some(t1) => {
				let nanos = t1.nanos_since(t0).max(0);
				info!("Startup delay {} usec", nanos / 1000);
				nanos_to_samples(nanos, self.rate)
			},
			None => {
				warn!("Failed to read the clock after startup, not correcting for startup delay");
				0
			}
		}
	}

	/// The time at the start of the next minute to render.
	pub fn clock(&self) -> &WallClock {
		&self.clock
	}

	/// Current UT1 - UTC.
	pub fn dut1(&self) -> Dut1 {
		self.dut1
	}

	/// Pending leap seconds.
	pub fn leap(&self) -> &LeapSecondState {
		&self.leap
	}

	/// Render the current minute and advance to the next one.
	///
	/// Voice failures are logged and the announcement left out; the minute is still produced.
	///
	/// # Errors
	///
	/// Returns a [`SynthesisError`] if the layout does not fit the minute buffer, which indicates a
	/// bug rather than a runtime condition.
	pub fn step(&mut self) -> Result<Minute<'_>, SynthesisError> {
		let time = self.clock;
		let length = minute_length(&time, &self.leap);
		info!("{} UTC, DST {}, DUT1 {:+}{}", time, if dst_in_effect(&time) { "on" } else { "off" },
			self.dut1.tenths(), if length != 60 { ", leap second at end of this minute!" } else { "" });

		self.buffer.fill(0);
		for announcement in announcements(&time) {
			match self.voice.synthesize(&announcement.text, announcement.language) {
				Ok(pcm) => {
					tone::overlay_pcm(&mut self.buffer, self.rate, announcement.start_ms, &pcm)?;
				},
				Err(e) => warn!("Skipping announcement \"{}\": {}", announcement.text, e)
			}
		}
		if self.tones {
			encode_minute(&mut self.buffer, self.rate, time.minute, self.dut1)?;
		}

		let end = self.rate.hz() as usize * length as usize;
		let (lead_in, first) = if self.trim < 0 {
			(self.trim.unsigned_abs() as usize, 0)
		} else {
			(0, (self.trim as usize).min(end))
		};
		self.trim = (self.trim - first as i64).max(0);
		if self.trim > 0 {
			debug!("Carrying {} samples of trim into the next minute", self.trim);
		}

		self.clock.advance_minute();
		self.leap.apply_adjustment(&mut self.dut1, length);
		if length != 60 {
			info!("Leap second done, DUT1 now {:+}", self.dut1.tenths());
		}

		Ok(Minute { time, length, lead_in, samples: &self.buffer[first..end] })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::Cell;
	use crate::voice::{Language, Silent, VoiceError};

	// Jun 30, 2024. 23:59:00 UTC.
	const LEAP_MINUTE: i64 = 1719791940;

	/// A live clock that moves forward by a fixed step every time it is read.
	struct SteppingClock {
		next: Cell<TimeSpec>,
		step_ns: i64
	}

	impl ClockSource for SteppingClock {
		fn now(&self) -> Option<TimeSpec> {
			let t = self.next.get();
			let mut next = t;
			next += time::Nanoseconds(self.step_ns);
			self.next.set(next);
			Some(t)
		}

		fn is_live(&self) -> bool {
			true
		}
	}

	/// Records the requests and answers with a fixed-length constant tone.
	#[derive(Default)]
	struct RecordingVoice {
		requests: Vec<(String, Language)>
	}

	impl VoiceService for RecordingVoice {
		fn synthesize(&mut self, text: &str, language: Language) -> Result<Vec<i16>, VoiceError> {
			self.requests.push((text.to_string(), language));
			Ok(vec![1234; 48000])
		}
	}

	struct FailingVoice;

	impl VoiceService for FailingVoice {
		fn synthesize(&mut self, _text: &str, _language: Language) -> Result<Vec<i16>, VoiceError> {
			Err(VoiceError::Pipeline("exit status: 1".to_string()))
		}
	}

	fn fixed(sec: i64) -> time::FixedClock {
		time::FixedClock(TimeSpec { sec, nsec: 0 })
	}

	#[test]
	fn leap_second_test() {
		let config = Config { positive_leap: true, dut1: -4, ..Config::default() };
		let mut session = Session::start(config, &fixed(LEAP_MINUTE), &Overrides::default(), Silent)
			.unwrap();

		let minute = session.step().unwrap();
		assert_eq!(minute.length, 61);
		assert_eq!(minute.len(), 61 * 48000);
		assert_eq!(minute.time, WallClock::new(2024, 6, 30, 23, 59, 0).unwrap());
		// The leap second itself is silent
		assert!(minute.samples[60 * 48000..].iter().all(|&s| s == 0));

		assert!(!session.leap().positive_pending);
		assert_eq!(session.dut1().tenths(), 6);
		assert_eq!(*session.clock(), WallClock::new(2024, 7, 1, 0, 0, 0).unwrap());

		let minute = session.step().unwrap();
		assert_eq!(minute.length, 60);
		assert_eq!(minute.len(), 60 * 48000);
		assert_eq!(session.dut1().tenths(), 6);
	}

	#[test]
	fn negative_leap_second_test() {
		let config = Config { negative_leap: true, dut1: 5, ..Config::default() };
		let overrides = Overrides {
			year: Some(2023), month: Some(12), day: Some(31), hour: Some(23), minute: Some(58),
			second: Some(0)
		};
		let mut session = Session::start(config, &fixed(LEAP_MINUTE), &overrides, Silent).unwrap();

		assert_eq!(session.step().unwrap().length, 60);
		let minute = session.step().unwrap();
		assert_eq!(minute.length, 59);
		assert_eq!(minute.len(), 59 * 48000);
		assert_eq!(session.dut1().tenths(), -5);
		assert_eq!(*session.clock(), WallClock::new(2024, 1, 1, 0, 0, 0).unwrap());
	}

	#[test]
	fn startup_trim_test() {
		// Starts exactly on a minute boundary; setup takes 123 ms
		let clock = SteppingClock {
			next: Cell::new(TimeSpec { sec: LEAP_MINUTE - 3600, nsec: 0 }),
			step_ns: 123000000
		};
		let config = Config { offset_ms: 250., ..Config::default() };
		let mut session = Session::start(config, &clock, &Overrides::default(), Silent).unwrap();

		let full = 60 * 48000;
		let minute = session.step().unwrap();
		assert_eq!(minute.lead_in, 0);
		assert_eq!(minute.len(), full - 123 * 48 - 250 * 48);

		let minute = session.step().unwrap();
		assert_eq!(minute.len(), full);
	}

	#[test]
	fn elapsed_seconds_test() {
		// 22:59:42.5 UTC on a live clock with no setup time
		let clock = SteppingClock {
			next: Cell::new(TimeSpec { sec: LEAP_MINUTE - 3600 + 42, nsec: 500000000 }),
			step_ns: 0
		};
		let mut session = Session::start(Config::default(), &clock, &Overrides::default(), Silent)
			.unwrap();
		let minute = session.step().unwrap();
		assert_eq!(minute.time.second, 42);
		assert_eq!(minute.len(), 17 * 48000 + 24000);

		// The second minute starts from second 0
		let minute = session.step().unwrap();
		assert_eq!(minute.time, WallClock::new(2024, 6, 30, 23, 0, 0).unwrap());
		assert_eq!(minute.len(), 60 * 48000);
	}

	#[test]
	fn manual_time_test() {
		// Manual time ignores the sub-second part and setup time, but not the seconds
		let clock = SteppingClock {
			next: Cell::new(TimeSpec { sec: LEAP_MINUTE, nsec: 900000000 }),
			step_ns: 500000000
		};
		let overrides = Overrides { hour: Some(12), second: Some(30), ..Overrides::default() };
		let mut session = Session::start(Config::default(), &clock, &overrides, Silent).unwrap();
		let minute = session.step().unwrap();
		assert_eq!(minute.time, WallClock::new(2024, 6, 30, 12, 59, 30).unwrap());
		assert_eq!(minute.len(), 30 * 48000);

		let overrides = Overrides { month: Some(2), day: Some(30), ..Overrides::default() };
		assert_eq!(Session::start(Config::default(), &fixed(LEAP_MINUTE), &overrides, Silent).err(),
			Some(ConfigError::InvalidTime { year: 2024, month: 2, day: 30, hour: 23, minute: 59, second: 0 }));

		// Years that would overflow while advancing are refused up front
		let overrides = Overrides { year: Some(u16::MAX), month: Some(12), day: Some(31), ..Overrides::default() };
		assert_eq!(Session::start(Config::default(), &fixed(LEAP_MINUTE), &overrides, Silent).err(),
			Some(ConfigError::InvalidTime { year: u16::MAX, month: 12, day: 31, hour: 23, minute: 59, second: 0 }));
	}

	#[test]
	fn trim_overrun_test() {
		// 22:59:59.950 with 200 ms of setup: the trim runs 150 ms into the next minute
		let clock = SteppingClock {
			next: Cell::new(TimeSpec { sec: LEAP_MINUTE - 3600 + 59, nsec: 950000000 }),
			step_ns: 200000000
		};
		let mut session = Session::start(Config::default(), &clock, &Overrides::default(), Silent)
			.unwrap();

		let minute = session.step().unwrap();
		assert!(minute.is_empty());
		assert_eq!(minute.time.minute, 59);

		let minute = session.step().unwrap();
		assert_eq!(minute.time, WallClock::new(2024, 6, 30, 23, 0, 0).unwrap());
		assert_eq!(minute.len(), 60 * 48000 - 150 * 48);

		// Back in step from then on
		assert_eq!(session.step().unwrap().len(), 60 * 48000);
	}

	#[test]
	fn offset_range_test() {
		let start = |offset_ms: f64| {
			let config = Config { offset_ms, ..Config::default() };
			Session::start(config, &fixed(LEAP_MINUTE - 60), &Overrides::default(), Silent)
		};
		assert_eq!(start(1e300).err(), Some(ConfigError::Offset(1e300)));
		assert_eq!(start(-60000.5).err(), Some(ConfigError::Offset(-60000.5)));
		assert!(matches!(start(f64::NAN), Err(ConfigError::Offset(o)) if o.is_nan()));

		// A full minute either way is still accepted
		let mut session = start(60000.).unwrap();
		assert!(session.step().unwrap().is_empty());
		assert_eq!(session.step().unwrap().len(), 60 * 48000);

		let mut session = start(-60000.).unwrap();
		assert_eq!(session.step().unwrap().lead_in, 60 * 48000);
	}

	#[test]
	fn negative_offset_test() {
		let config = Config { offset_ms: -1500., ..Config::default() };
		let mut session = Session::start(config, &fixed(LEAP_MINUTE - 60), &Overrides::default(), Silent)
			.unwrap();
		let minute = session.step().unwrap();
		assert_eq!(minute.lead_in, 72000);
		assert_eq!(minute.samples.len(), 60 * 48000);

		let mut out = Vec::new();
		minute.write_to(&mut out).unwrap();
		assert_eq!(out.len(), (72000 + 60 * 48000) * 2);
		assert!(out[..144000].iter().all(|&b| b == 0));
		// 500 ms tick at second 0, first sample after the zero crossing is positive
		assert!(i16::from_le_bytes([out[144002], out[144003]]) > 0);

		assert_eq!(session.step().unwrap().lead_in, 0);
	}

	#[test]
	fn announcement_test() {
		// 14:17, next minute is even: English first
		let overrides = Overrides {
			year: Some(2024), month: Some(3), day: Some(15), hour: Some(14), minute: Some(17),
			second: Some(0)
		};
		let mut session = Session::start(Config::default(), &fixed(LEAP_MINUTE), &overrides,
			RecordingVoice::default()).unwrap();
		let minute = session.step().unwrap();

		// Voice sits in the gaps between the 10 ms ticks
		assert_eq!(minute.samples[50000 * 48 + 10 * 48], 1234);
		assert_eq!(minute.samples[57000 * 48 + 500 * 48], 1234);
		assert_eq!(minute.samples[57000 * 48 + 48000], 0);

		session.step().unwrap();
		let requests = &session.voice.requests;
		assert_eq!(requests.len(), 4);
		assert_eq!(requests[0], ("CHU Canada Coordinated Universal Time, 14 hours 18 minutes".to_string(),
			Language::English));
		assert_eq!(requests[1], ("14 heures 18 minutes".to_string(), Language::French));
		assert_eq!(requests[2], ("CHU Canada U T C, 14 heures 19 minutes".to_string(), Language::French));
		assert_eq!(requests[3], ("14 hours 19 minutes".to_string(), Language::English));
	}

	#[test]
	fn quiet_test() {
		let config = Config { tones: false, ..Config::default() };
		let overrides = Overrides { second: Some(0), ..Overrides::default() };
		let mut session = Session::start(config, &fixed(LEAP_MINUTE), &overrides,
			RecordingVoice::default()).unwrap();
		let minute = session.step().unwrap();
		assert!(minute.samples[..50000 * 48].iter().all(|&s| s == 0));
		assert!(minute.samples[50000 * 48..51000 * 48].iter().all(|&s| s == 1234));
	}

	#[test]
	fn voice_failure_test() {
		let mut quiet = Session::start(Config::default(), &fixed(LEAP_MINUTE - 60), &Overrides::default(),
			Silent).unwrap();
		let mut failing = Session::start(Config::default(), &fixed(LEAP_MINUTE - 60), &Overrides::default(),
			FailingVoice).unwrap();
		assert_eq!(failing.step().unwrap().samples, quiet.step().unwrap().samples);
	}
}
