//! Overlay tones, silence and voice into a minute buffer.
//!
//! Every function here overwrites the samples in its span: nothing is mixed, so when two spans
//! overlap the later call wins. Offsets are in milliseconds from the start of the minute and must
//! stay within [`MINUTE_CAPACITY_MS`] as well as within the supplied buffer. A call that fails
//! validation writes nothing.
//!
//! # Examples
//!
//! ```
//! # use signals::{SampleRate, tone::{overlay_silence, overlay_tone}};
//! let rate = SampleRate::new(8000).unwrap();
//! let mut buf = vec![0i16; rate.minute_capacity()];
//!
//! // A 300 ms, 1 kHz tick at the start of second 10
//! assert_eq!(overlay_tone(&mut buf, rate, 10000, 300, 1000., 1.), Ok(2400));
//! // Cut the tail off it
//! assert_eq!(overlay_silence(&mut buf, rate, 10100, 10300), Ok(1600));
//! assert!(buf[80800..82400].iter().all(|&s| s == 0));
//! ```

use core::f64::consts::PI;
use num_complex::Complex64;
use crate::{SampleRate, SynthesisError, MINUTE_CAPACITY_MS};

/// Borrow the samples covering `[start_ms, stop_ms)`.
fn span(buffer: &mut [i16], rate: SampleRate, start_ms: u32, stop_ms: u32)
	-> Result<&mut [i16], SynthesisError>
{
	if start_ms >= MINUTE_CAPACITY_MS {
		return Err(SynthesisError::StartOutOfRange(start_ms));
	}
	let out_of_range = SynthesisError::SpanOutOfRange { start: start_ms, stop: stop_ms };
	if stop_ms < start_ms || stop_ms > MINUTE_CAPACITY_MS {
		return Err(out_of_range);
	}
	let first = start_ms as usize * rate.per_ms();
	let last = stop_ms as usize * rate.per_ms();
	if last > buffer.len() {
		return Err(out_of_range);
	}
	Ok(&mut buffer[first..last])
}

/// Overlay a sine tone of `frequency` Hz lasting `duration_ms`, starting at `start_ms`.
///
/// `amplitude` 1.0 is full scale ([`i16::MAX`]). The tone is generated by rotating a unit phasor
/// by `2π·frequency/rate` per sample and taking its imaginary part, starting from angle zero, so
/// every tone begins with a rising zero crossing regardless of where it sits in the minute.
///
/// Returns the number of samples written, `duration_ms × rate.per_ms()`.
///
/// # Errors
///
/// Returns [`SynthesisError::StartOutOfRange`] if `start_ms` is not inside the minute and
/// [`SynthesisError::SpanOutOfRange`] if the tone would run past the end of the minute or buffer.
pub fn overlay_tone(buffer: &mut [i16], rate: SampleRate, start_ms: u32, duration_ms: u32,
	frequency: f64, amplitude: f64) -> Result<usize, SynthesisError>
{
	let stop_ms = start_ms.saturating_add(duration_ms);
	let samples = span(buffer, rate, start_ms, stop_ms)?;

	let step = Complex64::from_polar(1., 2. * PI * frequency / rate.hz() as f64);
	let scale = amplitude * i16::MAX as f64;
	let mut phase = Complex64::new(1., 0.);
	for sample in samples.iter_mut() {
		*sample = (phase.im * scale) as i16;
		phase *= step;
	}
	Ok(samples.len())
}

/// Overlay silence over `[start_ms, stop_ms)`.
///
/// Returns the number of samples cleared.
///
/// # Errors
///
/// Returns [`SynthesisError::StartOutOfRange`] if `start_ms` is not inside the minute and
/// [`SynthesisError::SpanOutOfRange`] if `stop_ms <= start_ms` or `stop_ms` is past the end of the
/// minute or buffer.
pub fn overlay_silence(buffer: &mut [i16], rate: SampleRate, start_ms: u32, stop_ms: u32)
	-> Result<usize, SynthesisError>
{
	if stop_ms <= start_ms && start_ms < MINUTE_CAPACITY_MS {
		return Err(SynthesisError::SpanOutOfRange { start: start_ms, stop: stop_ms });
	}
	let samples = span(buffer, rate, start_ms, stop_ms)?;
	samples.fill(0);
	Ok(samples.len())
}

/// Overlay prerecorded samples (e.g. a voice announcement) starting at `start_ms`.
///
/// `pcm` must already be at `rate`. Samples that would land past the end of the minute buffer are
/// dropped; if `pcm` is shorter than the rest of the minute, the remainder is left untouched.
///
/// Returns the number of samples written.
///
/// # Errors
///
/// Returns [`SynthesisError::StartOutOfRange`] if `start_ms` is not inside the minute or buffer.
pub fn overlay_pcm(buffer: &mut [i16], rate: SampleRate, start_ms: u32, pcm: &[i16])
	-> Result<usize, SynthesisError>
{
	let end = buffer.len().min(rate.minute_capacity());
	let first = start_ms as usize * rate.per_ms();
	if start_ms >= MINUTE_CAPACITY_MS || first >= end {
		return Err(SynthesisError::StartOutOfRange(start_ms));
	}
	let n = pcm.len().min(end - first);
	buffer[first..first + n].copy_from_slice(&pcm[..n]);
	Ok(n)
}
