//! Calendar utilities for the CHU simulator.
//!
//! This crate is divided into three parts: [`time`] deals with Unix timestamps, leap years and
//! month lengths; [`clock`] holds the broken-down UTC [`WallClock`] that the simulator advances one
//! minute at a time, along with the [`ClockSource`] capability that supplies the starting instant;
//! [`dst`] calculates the daylight saving indication under the post-2007 USA rules.
//!
//! The crate is `no_std`. If the `now` feature is enabled, [`time::now`] and
//! [`clock::SystemClock`] read the current system time through `libc`.
//!
//! # Examples
//!
//! Converting a Unix timestamp and stepping through a leap day.
//! ```
//! # use time::WallClock;
//! // Feb 28, 2024. 23:59:00 UTC.
//! let mut clock = WallClock::from_unix(1709164740).unwrap();
//! assert_eq!((clock.month, clock.day, clock.hour, clock.minute), (2, 28, 23, 59));
//!
//! clock.advance_minute();
//! assert_eq!((clock.month, clock.day, clock.hour, clock.minute, clock.yday), (2, 29, 0, 0, 60));
//! ```

#![no_std]
// only enables the `doc_cfg` feature when
// the `docsrs` configuration attribute is defined
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod time;
pub mod clock;
pub mod dst;

pub use time::*;
pub use clock::*;
pub use dst::*;
