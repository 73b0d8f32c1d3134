//! The boundary to an external voice synthesizer.
//!
//! Announcements are spoken by something outside this crate (a text-to-speech program, a
//! recording, a test stub). Whatever it is only has to implement [`VoiceService`]: take a line of
//! text and a language, and hand back mono signed 16-bit samples at the session's sample rate.

use std::io;

/// Announcement language.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
	/// Canadian English.
	English,
	/// Canadian French.
	French
}

impl Language {
	/// BCP 47 tag for the language.
	pub fn tag(&self) -> &'static str {
		match self {
			Language::English => "en-CA",
			Language::French => "fr-CA"
		}
	}
}

/// The error type for voice synthesis.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
	/// A scratch file could not be created, written or read.
	#[error("voice scratch file error: {0}")]
	Scratch(#[source] io::Error),
	/// The synthesizer could not be started.
	#[error("failed to run voice pipeline: {0}")]
	Spawn(#[source] io::Error),
	/// The synthesizer ran but reported failure. The payload describes the exit status.
	#[error("voice pipeline failed: {0}")]
	Pipeline(String)
}

/// Something that can turn text into speech.
pub trait VoiceService {
	/// Speak `text` in `language`, returning mono samples at the session's sample rate.
	///
	/// Calls block; the session waits for the result before finishing the minute.
	///
	/// # Errors
	///
	/// Any [`VoiceError`]. The caller skips the announcement and keeps going.
	fn synthesize(&mut self, text: &str, language: Language) -> Result<Vec<i16>, VoiceError>;
}

/// A voice service that says nothing.
///
/// # Examples
///
/// ```
/// # use signals::voice::{Language, Silent, VoiceService};
/// assert!(Silent.synthesize("CHU Canada", Language::English).unwrap().is_empty());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl VoiceService for Silent {
	fn synthesize(&mut self, _text: &str, _language: Language) -> Result<Vec<i16>, VoiceError> {
		Ok(Vec::new())
	}
}

impl<V: VoiceService + ?Sized> VoiceService for Box<V> {
	fn synthesize(&mut self, text: &str, language: Language) -> Result<Vec<i16>, VoiceError> {
		(**self).synthesize(text, language)
	}
}
