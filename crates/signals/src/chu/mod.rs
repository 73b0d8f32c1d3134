//! Support for generating the CHU time signal.
//!
//! See [CHU documentation](https://en.wikipedia.org/wiki/CHU_(radio_station)) for details. This
//! module reproduces the audio program of the station minute by minute:
//!
//! - A 1000 Hz tick at the start of every second, 300 ms long in general, 500 ms at second 0 and
//!   10 ms during the announcement window (seconds 50-58). Second 29 and second 59 are silent.
//! - At the top of the hour a full second of tone, followed by nine seconds of silence.
//! - In seconds 31-39 of every minute except the first of the hour, the timing-code subcarrier:
//!   a short tick, then 2225 Hz and 2025 Hz bursts at -6 dB.
//! - DUT1 (UT1 - UTC, in tenths of a second) as doubled ticks in seconds 1-7 (positive) or 9-15
//!   (negative).
//! - Bilingual voice announcements of the upcoming hour and minute at seconds 50 and 57.
//! - Leap seconds at the end of June or December, by emitting a 61 or 59 second minute.
//!
//! The tick layout is a pure function of the minute of the hour and DUT1, see [`encode_minute`].
//! [`Session`] owns everything that changes from minute to minute.
//!
//! # Examples
//! ```
//! # use signals::{SampleRate, chu::{encode_minute, leap::Dut1}};
//! let rate = SampleRate::new(8000).unwrap();
//! let mut buf = vec![0i16; rate.minute_capacity()];
//! encode_minute(&mut buf, rate, 17, Dut1::clamped(-2)).unwrap();
//!
//! // Second 29 is always silent
//! assert!(buf[29 * 8000..30 * 8000].iter().all(|&s| s == 0));
//! ```

use crate::{tone, SampleRate, SynthesisError};

pub mod leap;
pub mod announce;
pub mod session;

pub use leap::{minute_length, Dut1, LeapSecondState};
pub use announce::{announcements, Announcement, ANNOUNCEMENT_OFFSETS_MS};
pub use session::{Config, Minute, Overrides, Session, MAX_OFFSET_MS};

/// Second tick frequency (Hz).
pub const TICK_FREQUENCY: f64 = 1000.;
/// Second tick amplitude, full scale.
pub const TICK_AMPLITUDE: f64 = 1.;
/// Timing-code subcarrier amplitude, -6 dB relative to the ticks.
pub const TONE_AMPLITUDE: f64 = 0.501_187_233_627_272_2;
/// Timing-code mark frequency (Hz).
pub const MARK_FREQUENCY: f64 = 2225.;
/// Timing-code space frequency (Hz).
pub const SPACE_FREQUENCY: f64 = 2025.;

/// A minute buffer and the rate it is sampled at.
struct Canvas<'a> {
	buffer: &'a mut [i16],
	rate: SampleRate
}

impl Canvas<'_> {
	fn tick(&mut self, start_ms: u32, duration_ms: u32) -> Result<(), SynthesisError> {
		tone::overlay_tone(self.buffer, self.rate, start_ms, duration_ms, TICK_FREQUENCY, TICK_AMPLITUDE)
			.map(drop)
	}

	fn subcarrier(&mut self, start_ms: u32, duration_ms: u32, frequency: f64) -> Result<(), SynthesisError> {
		tone::overlay_tone(self.buffer, self.rate, start_ms, duration_ms, frequency, TONE_AMPLITUDE)
			.map(drop)
	}

	fn silence(&mut self, start_ms: u32, stop_ms: u32) -> Result<(), SynthesisError> {
		tone::overlay_silence(self.buffer, self.rate, start_ms, stop_ms).map(drop)
	}
}

/// Whether `second` carries a doubled tick to encode `dut1`.
///
/// Positive DUT1 of n tenths doubles seconds 1 through n. Negative DUT1 of -n tenths doubles
/// seconds 9 through 8 + n.
///
/// # Examples
///
/// ```
/// # use signals::chu::{is_double_tick, leap::Dut1};
/// assert!(is_double_tick(3, Dut1::clamped(3)));
/// assert!(!is_double_tick(4, Dut1::clamped(3)));
/// assert!(is_double_tick(9, Dut1::clamped(-1)));
/// assert!(!is_double_tick(10, Dut1::clamped(-1)));
/// ```
pub fn is_double_tick(second: u8, dut1: Dut1) -> bool {
	let u = dut1.tenths() as i32;
	let s = second as i32;
	(u > 0 && s >= 1 && s <= u) || (-u > 0 && s >= 9 && s <= 8 - u)
}

/// Lay out the ticks and timing-code tones for one minute.
///
/// `minute` is the minute of the hour being encoded. The buffer must hold at least 60 seconds at
/// `rate`. Tones overwrite whatever is already in the buffer (e.g. announcements), while the spans
/// between tones are left untouched, except at the top of the hour where seconds 1-9 are cleared.
///
/// # Errors
///
/// Returns a [`SynthesisError`] if the buffer is too short to hold the layout.
pub fn encode_minute(buffer: &mut [i16], rate: SampleRate, minute: u8, dut1: Dut1)
	-> Result<(), SynthesisError>
{
	let mut canvas = Canvas { buffer, rate };
	if minute == 0 {
		top_of_hour(&mut canvas)
	} else {
		ordinary_minute(&mut canvas, dut1)
	}
}

/// Hour marker: one second of tone, nine seconds of silence, then ticks.
fn top_of_hour(canvas: &mut Canvas) -> Result<(), SynthesisError> {
	canvas.tick(0, 1000)?;
	canvas.silence(1000, 10000)?;
	for s in (10..29).chain(30..50) {
		canvas.tick(1000 * s, 300)?;
	}
	for s in 50..59 {
		canvas.tick(1000 * s, 10)?;
	}
	Ok(())
}

fn ordinary_minute(canvas: &mut Canvas, dut1: Dut1) -> Result<(), SynthesisError> {
	canvas.tick(0, 500)?;
	for s in 1..29 {
		let start = 1000 * s;
		// Doubled ticks have no guard time between the halves
		if is_double_tick(s as u8, dut1) {
			canvas.tick(start, 125)?;
			canvas.tick(start + 175, 125)?;
		} else {
			canvas.tick(start, 300)?;
		}
	}
	canvas.tick(30000, 300)?;
	for s in 31..40 {
		let start = 1000 * s;
		canvas.tick(start, 10)?;
		canvas.subcarrier(start + 10, 123, MARK_FREQUENCY)?;
		canvas.subcarrier(start + 133, 367, SPACE_FREQUENCY)?;
		canvas.subcarrier(start + 500, 10, MARK_FREQUENCY)?;
	}
	for s in 40..50 {
		canvas.tick(1000 * s, 300)?;
	}
	for s in 50..59 {
		canvas.tick(1000 * s, 10)?;
	}
	Ok(())
}
