//! This crate turns the collection days on <https://www.mijnafvalwijzer.nl> into an iCalendar
//! document, optionally with alarms per waste type.
//!
//! The page of an address is read from `https://www.mijnafvalwijzer.nl/nl/<postal code>/<house number>/<suffix>`.

pub use ical;

pub mod alarm;
pub mod calendar;
pub mod error;
pub mod extractor;
pub mod garbage_client;
pub mod waste_type;
