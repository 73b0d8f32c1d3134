//! Support for command line argument parsing.
//!
//! See [crate] documentation for details on command line arguments and examples.

use clap::{ArgAction, Parser};
use signals::{chu::{Config, Overrides}, ConfigError, SampleRate};

/// Simulate the CHU time signal as raw audio on standard output.
///
/// `-h` sets the hour, so help is only available as `--help`.
#[derive(Parser, Debug)]
#[command(name = "chusim", version, disable_help_flag = true)]
pub struct Arguments {
	/// Sample rate in Hz, a multiple of 1000
	#[arg(short = 'r', long = "rate", default_value_t = 48000)]
	pub rate: u32,

	/// Output offset in milliseconds to make up for audio delay, up to ±60000; positive is early,
	/// negative late
	#[arg(short = 'o', long = "offset", default_value_t = 0., allow_negative_numbers = true)]
	pub offset: f64,

	/// UT1 - UTC in tenths of a second, -7 to +7
	#[arg(short = 'u', long = "ut1", default_value_t = 0, allow_negative_numbers = true)]
	pub ut1: i32,

	/// Year (manual time)
	#[arg(short = 'Y', long = "year")]
	pub year: Option<u16>,

	/// Month, 1-12 (manual time)
	#[arg(short = 'M', long = "month")]
	pub month: Option<u8>,

	/// Day of the month (manual time)
	#[arg(short = 'D', long = "day")]
	pub day: Option<u8>,

	/// Hour, 0-23 (manual time)
	#[arg(short = 'h', long = "hour")]
	pub hour: Option<u8>,

	/// Minute, 0-59 (manual time)
	#[arg(short = 'm', long = "minute")]
	pub minute: Option<u8>,

	/// Second, 0-59 (manual time)
	#[arg(short = 's', long = "second")]
	pub second: Option<u8>,

	/// Insert a leap second at the end of June or December, whichever comes first
	#[arg(short = 'L', long = "positive-leap")]
	pub positive_leap: bool,

	/// Remove a second at the end of June or December, whichever comes first
	#[arg(short = 'N', long = "negative-leap")]
	pub negative_leap: bool,

	/// Announcements only, no ticks or timing code
	#[arg(short = 'q', long = "quiet")]
	pub quiet: bool,

	/// More diagnostics on stderr; repeat for more
	#[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
	pub verbose: u8,

	/// Don't run the text-to-speech pipeline
	#[arg(long = "no-voice")]
	pub no_voice: bool,

	/// Print help
	#[arg(long = "help", action = ArgAction::Help)]
	help: Option<bool>
}

impl Arguments {
	/// Session configuration from the arguments.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::SampleRate`] if the sample rate is unusable.
	pub fn config(&self) -> Result<Config, ConfigError> {
		Ok(Config {
			rate: SampleRate::new(self.rate)?,
			offset_ms: self.offset,
			dut1: self.ut1,
			positive_leap: self.positive_leap,
			negative_leap: self.negative_leap,
			tones: !self.quiet
		})
	}

	/// Manually set date and time fields.
	pub fn overrides(&self) -> Overrides {
		Overrides {
			year: self.year,
			month: self.month,
			day: self.day,
			hour: self.hour,
			minute: self.minute,
			second: self.second
		}
	}

	/// Log filter directive for the `-v` count.
	pub fn log_level(&self) -> &'static str {
		match self.verbose {
			0 => "warn",
			1 => "info",
			2 => "debug",
			_ => "trace"
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(args: &[&str]) -> Result<Arguments, clap::Error> {
		Arguments::try_parse_from(std::iter::once("chusim").chain(args.iter().copied()))
	}

	#[test]
	fn defaults_test() {
		let args = parse(&[]).unwrap();
		assert_eq!(args.config().unwrap(), Config::default());
		assert_eq!(args.overrides(), Overrides::default());
		assert!(!args.overrides().is_manual());
		assert!(!args.no_voice);
		assert_eq!(args.log_level(), "warn");
	}

	#[test]
	fn options_test() {
		let args = parse(&["-r", "8000", "-o", "-25.5", "-u", "-3", "-L", "-q", "-vv"]).unwrap();
		let config = args.config().unwrap();
		assert_eq!(config.rate.hz(), 8000);
		assert_eq!(config.offset_ms, -25.5);
		assert_eq!(config.dut1, -3);
		assert!(config.positive_leap);
		assert!(!config.negative_leap);
		assert!(!config.tones);
		assert_eq!(args.log_level(), "debug");

		let args = parse(&["--ut1=7", "--negative-leap", "--no-voice", "-vvvv"]).unwrap();
		assert_eq!(args.config().unwrap().dut1, 7);
		assert!(args.config().unwrap().negative_leap);
		assert!(args.no_voice);
		assert_eq!(args.log_level(), "trace");
	}

	#[test]
	fn overrides_test() {
		let args = parse(&["-Y", "2024", "-M", "6", "-D", "30", "-h", "23", "-m", "59", "-s", "0"]).unwrap();
		assert_eq!(args.overrides(), Overrides {
			year: Some(2024),
			month: Some(6),
			day: Some(30),
			hour: Some(23),
			minute: Some(59),
			second: Some(0)
		});

		let args = parse(&["-h", "5"]).unwrap();
		assert!(args.overrides().is_manual());
		assert_eq!(args.overrides().minute, None);
	}

	#[test]
	fn error_test() {
		let args = parse(&["-r", "44100"]).unwrap();
		assert_eq!(args.config(), Err(ConfigError::SampleRate(44100)));
		assert!(parse(&["-r", "0"]).unwrap().config().is_err());

		assert!(parse(&["-h"]).is_err());
		assert!(parse(&["-M", "month"]).is_err());
		assert_eq!(parse(&["--help"]).unwrap_err().kind(), clap::error::ErrorKind::DisplayHelp);
	}
}
