//! Text-to-speech through external programs.
//!
//! Announcements are spoken by a shell pipeline: the text goes into a scratch file, the pipeline
//! turns it into headerless signed 16-bit little-endian mono PCM at the session's sample rate, and
//! the result is read back. On Linux this is `espeak` piped through `sox`; on macOS, `say` followed
//! by `sox`.

use std::fs;
use std::process::Command;

use signals::{voice::{Language, VoiceError, VoiceService}, SampleRate};
use tracing::{debug, trace};

#[cfg(not(target_os = "macos"))]
const ENGLISH: &str = "espeak -v en-us+f3 -a 70 -f {input} --stdout \
	| sox -t wav - -t raw -r {rate} -c 1 -e signed-integer -b 16 {output}";
#[cfg(not(target_os = "macos"))]
const FRENCH: &str = "espeak -v fr -a 70 -f {input} --stdout \
	| sox -t wav - -t raw -r {rate} -c 1 -e signed-integer -b 16 {output}";

#[cfg(target_os = "macos")]
const ENGLISH: &str = "say -v Alex --output-file={output}.wav --data-format=LEI16@{rate} -f {input} \
	&& sox {output}.wav -t raw -r {rate} -c 1 -b 16 -e signed-integer {output}";
#[cfg(target_os = "macos")]
const FRENCH: &str = "say -v Thomas --output-file={output}.wav --data-format=LEI16@{rate} -f {input} \
	&& sox {output}.wav -t raw -r {rate} -c 1 -b 16 -e signed-integer {output}";

/// A [`VoiceService`] that runs a shell command per announcement.
///
/// Commands are templates: `{input}` is replaced by the path of the file holding the text,
/// `{output}` by the path the raw PCM must be written to, and `{rate}` by the sample rate in Hz.
pub struct CommandVoice {
	english: String,
	french: String,
	rate: SampleRate
}

impl CommandVoice {
	/// The platform's default speech pipeline at `rate`.
	pub fn new(rate: SampleRate) -> CommandVoice {
		CommandVoice::with_commands(ENGLISH, FRENCH, rate)
	}

	/// Custom command templates for each language.
	pub fn with_commands(english: &str, french: &str, rate: SampleRate) -> CommandVoice {
		CommandVoice { english: english.to_string(), french: french.to_string(), rate }
	}

	fn template(&self, language: Language) -> &str {
		match language {
			Language::English => &self.english,
			Language::French => &self.french
		}
	}
}

/// Decode headerless signed 16-bit little-endian PCM. A trailing odd byte is dropped.
fn decode_pcm(bytes: &[u8]) -> Vec<i16> {
	bytes.chunks_exact(2).map(|b| i16::from_le_bytes([b[0], b[1]])).collect()
}

impl VoiceService for CommandVoice {
	fn synthesize(&mut self, text: &str, language: Language) -> Result<Vec<i16>, VoiceError> {
		let scratch = tempfile::Builder::new().prefix("chusim").tempdir().map_err(VoiceError::Scratch)?;
		let input = scratch.path().join("speakin");
		let output = scratch.path().join("speakout");
		fs::write(&input, text).map_err(VoiceError::Scratch)?;

		let command = self.template(language)
			.replace("{input}", &input.to_string_lossy())
			.replace("{output}", &output.to_string_lossy())
			.replace("{rate}", &self.rate.hz().to_string());
		trace!("Running {}", command);
		let status = Command::new("sh").arg("-c").arg(&command).status().map_err(VoiceError::Spawn)?;
		if !status.success() {
			return Err(VoiceError::Pipeline(status.to_string()));
		}

		let pcm = decode_pcm(&fs::read(&output).map_err(VoiceError::Scratch)?);
		debug!("Synthesized {} samples of {} speech", pcm.len(), language.tag());
		scratch.close().map_err(VoiceError::Scratch)?;
		Ok(pcm)
	}
}
