//! # Error Types
//!
//! This module defines the error types used throughout the ingestion pipeline.
//!
//! Field-level parsing is written with `nom`, so the low-level [`Error`] type plugs
//! into nom's error traits. Everything a caller actually observes is either a
//! [`DecodeError`] (one sentence could not be turned into a fix, processing
//! continues) or an [`IngestError`] (the ingestion task itself stopped).

use nom::error::{ErrorKind, FromExternalError, ParseError};
use std::fmt::Debug;

/// Holds the result of field parsing functions.
///
/// It depends on the input type `I`, the output type `O`, and the error type `E`
/// (by default `nom::error::Error<I>`).
///
/// The `Ok` side is a pair containing the remainder of the input and the produced
/// value. The `Err` side contains an instance of `nom::Err`.
pub type IResult<I, O, E = nom::error::Error<I>> = nom::IResult<I, O, Error<I, E>>;

/// Low-level failure produced by a field parser.
///
/// These never leave the crate on their own: the fix decoder converts them into a
/// [`DecodeError`] that names the offending field.
#[derive(Debug, PartialEq)]
pub enum Error<I, E> {
    /// The field text does not have the expected shape.
    ///
    /// Wraps nom's standard parsing errors.
    ParsingError(E),

    /// The field is well formed but its value is not acceptable for the field,
    /// for example an hour of `25` or a hemisphere letter of `X`.
    ///
    /// Contains the input that caused the error.
    InvalidField(I),

    /// The field is numerically valid but names a clock time or calendar date
    /// that does not exist.
    OutOfRange(I),
}

impl<I, E> ParseError<I> for Error<I, E>
where
    E: ParseError<I>,
{
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        Error::ParsingError(E::from_error_kind(input, kind))
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<I, E, EX> FromExternalError<I, EX> for Error<I, E>
where
    E: FromExternalError<I, EX>,
{
    fn from_external_error(input: I, kind: ErrorKind, e: EX) -> Self {
        Error::ParsingError(E::from_external_error(input, kind, e))
    }
}

/// Why a completed RMC line did not produce a [`Fix`](crate::rmc::Fix).
///
/// A decode failure is confined to the sentence that produced it; the framer keeps
/// running and the next line is decoded independently.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// The line contains bytes outside of the ASCII range.
    #[error("sentence contains non-ASCII bytes")]
    NonAscii,

    /// Fewer comma-separated fields than an RMC sentence needs.
    #[error("incomplete RMC sentence: {found} fields, at least {required} required")]
    FieldCount {
        /// Number of fields found, identifier included
        found: usize,
        /// Minimum number of fields
        required: usize,
    },

    /// More fields than the field set can hold.
    #[error("RMC sentence has more than {max} fields")]
    TooManyFields {
        /// Field set capacity
        max: usize,
    },

    /// A required field is present but empty.
    #[error("field {index} ({name}) is empty")]
    EmptyField {
        /// Position in the sentence, identifier is 0
        index: usize,
        /// Field name
        name: &'static str,
    },

    /// A field could not be converted to its numeric or enumerated value.
    #[error("field {index} ({name}) is malformed: {text:?}")]
    InvalidField {
        /// Position in the sentence, identifier is 0
        index: usize,
        /// Field name
        name: &'static str,
        /// Raw field text
        text: String,
    },

    /// A time or date field names a value that does not exist.
    #[error("field {index} ({name}) is out of range: {text:?}")]
    OutOfRange {
        /// Position in the sentence, identifier is 0
        index: usize,
        /// Field name
        name: &'static str,
        /// Raw field text
        text: String,
    },

    /// The checksum carried by the sentence does not match its content.
    #[error("checksum mismatch: computed {expected:02X}, sentence carries {found:02X}")]
    ChecksumMismatch {
        /// The checksum calculated from the sentence content
        expected: u8,
        /// The checksum found in the sentence
        found: u8,
    },

    /// The checksum is required but absent or not two hex digits.
    #[error("checksum missing or malformed")]
    MissingChecksum,
}

/// Failure that ends an ingestion run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError<E: Debug> {
    /// The byte source kept failing after the retry policy was exhausted.
    #[error("byte source failed {attempts} consecutive reads, last error: {last:?}")]
    Source {
        /// Consecutive failed reads, including the final one
        attempts: u32,
        /// Error reported by the final read
        last: E,
    },
}
