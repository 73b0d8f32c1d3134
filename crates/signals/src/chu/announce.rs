//! Bilingual voice announcements.
//!
//! Two announcements name the hour and minute that are about to begin: one at second 50 and one
//! at second 57. CHU alternates which language goes first, English when the upcoming minute is
//! even and French when it is odd. The first announcement carries the station identification.

use time::WallClock;
use crate::voice::Language;

/// Start of the first and second announcement, in milliseconds from the start of the minute.
pub const ANNOUNCEMENT_OFFSETS_MS: [u32; 2] = [50000, 57000];

/// One line of speech to place into the minute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Announcement {
	/// Where the speech starts, in milliseconds from the start of the minute.
	pub start_ms: u32,
	/// What to say.
	pub text: String,
	/// Which voice to say it in.
	pub language: Language
}

fn plural<'a>(n: u8, one: &'a str, many: &'a str) -> &'a str {
	if n == 1 { one } else { many }
}

fn english(hour: u8, minute: u8) -> String {
	format!("{} {} {} {}", hour, plural(hour, "hour", "hours"), minute, plural(minute, "minute", "minutes"))
}

fn french(hour: u8, minute: u8) -> String {
	format!("{} {} {} {}", hour, plural(hour, "heure", "heures"), minute, plural(minute, "minute", "minutes"))
}

/// The two announcements made during the minute starting at `clock`.
///
/// # Examples
///
/// ```
/// # use signals::{chu::announcements, voice::Language};
/// # use time::WallClock;
/// let [first, second] = announcements(&WallClock::new(2024, 6, 30, 0, 59, 0).unwrap());
/// assert_eq!(first.text, "CHU Canada Coordinated Universal Time, 1 hour 0 minutes");
/// assert_eq!(first.language, Language::English);
/// assert_eq!(second.text, "1 heure 0 minutes");
/// assert_eq!(second.start_ms, 57000);
/// ```
pub fn announcements(clock: &WallClock) -> [Announcement; 2] {
	let (hour, minute) = clock.next_hour_minute();
	let [first_ms, second_ms] = ANNOUNCEMENT_OFFSETS_MS;
	if minute % 2 == 0 {
		[
			Announcement {
				start_ms: first_ms,
				text: format!("CHU Canada Coordinated Universal Time, {}", english(hour, minute)),
				language: Language::English
			},
			Announcement { start_ms: second_ms, text: french(hour, minute), language: Language::French }
		]
	} else {
		[
			Announcement {
				start_ms: first_ms,
				text: format!("CHU Canada U T C, {}", french(hour, minute)),
				language: Language::French
			},
			Announcement { start_ms: second_ms, text: english(hour, minute), language: Language::English }
		]
	}
}
