//! # NMEA 0183 RMC Ingestion
//!
//! This library turns the raw byte stream of a GPS receiver into decoded RMC
//! (Recommended Minimum Navigation Information) fixes.
//!
//! The pipeline has three stages:
//! - The [`framer`] rebuilds CR LF terminated lines from chunks of arbitrary size
//!   in a fixed-capacity buffer
//! - The [`SentenceParser`] keeps RMC sentences, optionally verifies their checksum
//!   and splits them into fields
//! - The [`FixDecoder`](rmc::FixDecoder) converts the fields into a typed [`Fix`](rmc::Fix)
//!
//! The [`ingest`] module runs the stages as a polling loop over a byte source.
//!
//! ## Usage
//!
//! ```rust
//! use nmea0183_ingest::{SentenceParser, framer::SentenceFramer};
//!
//! let mut framer = SentenceFramer::<256>::new();
//! let parser = SentenceParser::default();
//! let mut fixes = Vec::new();
//!
//! for chunk in [
//!     &b"$GPRMC,123519,A,4807.038,N,01131.0"[..],
//!     &b"00,E,022.4,084.4,230394,003.1,W*6A\r\n"[..],
//! ] {
//!     framer.feed(chunk, |line| {
//!         if let Some(Ok(fix)) = parser.parse(line) {
//!             fixes.push(fix);
//!         }
//!     });
//! }
//!
//! assert_eq!(fixes.len(), 1);
//! assert_eq!(fixes[0].date_text(), "23/03/1994");
//! ```

pub mod config;
pub mod error;
pub mod framer;
pub mod ingest;
mod nmea0183;
pub mod parsing;
pub mod rmc;

pub use config::{IngestConfig, ParserConfig, RetryPolicy};
pub use error::{DecodeError, Error, IResult, IngestError};
pub use nmea0183::*;

#[cfg(doctest)]
#[doc = include_str!("../README.md")]
struct README;

#[cfg(test)]
mod tests {
    mod framing;
    mod ingest;
    mod pipeline;
}
