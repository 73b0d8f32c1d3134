//! Simulate the CHU time signal.
//!
//! This crate reproduces the audio program of Canada's shortwave time station [CHU]: second ticks,
//! the hour marker, the 2025/2225 Hz timing code, DUT1 double ticks, leap seconds and the
//! bilingual voice announcements. The audio is written to standard output as headerless signed
//! 16-bit little-endian mono PCM, to be piped into a player or a file. Writing blocks when the
//! consumer is full, which is what paces the program; it never sleeps on its own.
//!
//! [CHU]: https://en.wikipedia.org/wiki/CHU_(radio_station)
//!
//! # Command Line Arguments
//!
//! General form: `chusim [options...]`
//!
//! | Short form | Long form         | Argument     | Default      | Description                        |
//! | ---------- | ----------------- | ------------ | ------------ | ---------------------------------- |
//! | `-r`       | `--rate`          | Hz           | 48000        | Sample rate, a multiple of 1000    |
//! | `-o`       | `--offset`        | ms, ±60000   | 0            | Emit early (+) or late (-)         |
//! | `-u`       | `--ut1`           | Tenths, ±7   | 0            | UT1 - UTC, sent as double ticks    |
//! | `-Y`       | `--year`          | Year         | Current time | Manual time                        |
//! | `-M`       | `--month`         | 1-12         | Current time | Manual time                        |
//! | `-D`       | `--day`           | 1-31         | Current time | Manual time                        |
//! | `-h`       | `--hour`          | 0-23         | Current time | Manual time                        |
//! | `-m`       | `--minute`        | 0-59         | Current time | Manual time                        |
//! | `-s`       | `--second`        | 0-59         | Current time | Manual time                        |
//! | `-L`       | `--positive-leap` |              |              | Leap second at end of June or Dec. |
//! | `-N`       | `--negative-leap` |              |              | Drop a second at end of June/Dec.  |
//! | `-q`       | `--quiet`         |              |              | Announcements only                 |
//! | `-v`       | `--verbose`       |              |              | More diagnostics, repeatable       |
//! |            | `--no-voice`      |              |              | Skip text-to-speech                |
//!
//! Setting any of the manual time fields starts the broadcast at that time instead of lining it up
//! with the system clock. Diagnostics go to stderr; `CHUSIM_LOG` overrides the `-v` level with a
//! [tracing filter](tracing_subscriber::EnvFilter).
//!
//! # Examples
//!
//! Listen to the current time
//! ```sh
//! chusim | aplay -f S16_LE -r 48000 -c 1
//! ```
//!
//! Record the 2024 leap second at 8 kHz
//! ```sh
//! chusim -r 8000 -L -Y 2024 -M 6 -D 30 -h 23 -m 58 > leap.raw
//! ```

use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use signals::{chu::Session, voice::{Silent, VoiceService}};
use time::SystemClock;
use tracing::error;
use tracing_subscriber::EnvFilter;

use args::Arguments;
use voice::CommandVoice;

mod args;
mod voice;

/// Environment variable holding a log filter that takes precedence over `-v`.
const LOG_ENV: &str = "CHUSIM_LOG";

/// Send diagnostics to stderr, filtered by [`LOG_ENV`] or else `level`.
fn init_logging(level: &str) {
	let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.with_ansi(false)
		.without_time()
		.init();
}

fn run(args: &Arguments) -> anyhow::Result<()> {
	let config = args.config().context("Invalid configuration")?;
	let voice: Box<dyn VoiceService> = if args.no_voice {
		Box::new(Silent)
	} else {
		Box::new(CommandVoice::new(config.rate))
	};
	let mut session = Session::start(config, &SystemClock, &args.overrides(), voice)
		.context("Failed to start")?;

	let stdout = io::stdout();
	let mut out = stdout.lock();
	loop {
		let minute = session.step().context("Failed to build minute")?;
		minute.write_to(&mut out).context("Failed to write output")?;
		out.flush().context("Failed to write output")?;
	}
}

fn main() -> ExitCode {
	let args = Arguments::parse();
	init_logging(args.log_level());

	if io::stdout().is_terminal() {
		error!("Won't send raw audio to a terminal, redirect or pipe standard output");
		return ExitCode::FAILURE;
	}

	match run(&args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!("{:#}", e);
			ExitCode::FAILURE
		}
	}
}
