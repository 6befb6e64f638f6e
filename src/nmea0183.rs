//! # NMEA 0183 Sentence Parser
//!
//! This module classifies and tokenizes completed lines of the form
//! `$HHHHH,D1,D2,...,Dn*CC`, as produced by the [framer](crate::framer).
//!
//! Only RMC sentences are of interest. Every other sentence type is skipped
//! without being reported, because receivers interleave many types on the same
//! stream. Checksum digits after `*` are ignored unless a [`ChecksumMode`] that
//! verifies them is selected.

use heapless::Vec;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    DecodeError, ParserConfig,
    rmc::{Fix, FixDecoder},
};

/// Identifier of a GPS RMC sentence, field 0 of the field set.
pub const RMC_IDENTIFIER: &str = "$GPRMC";

/// Minimum number of fields of an RMC sentence, identifier included.
pub const RMC_MIN_FIELDS: usize = 12;

/// Capacity of a [`FieldSet`].
pub const MAX_FIELDS: usize = 20;

/// Defines how the parser treats the `*CC` checksum suffix.
///
/// The checksum is the XOR of every byte between `$` and `*`, written as two
/// hexadecimal digits.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumMode {
    /// The checksum is never inspected.
    ///
    /// Anything after `*` is dropped. This is how field receivers are usually
    /// consumed and the default.
    #[default]
    Ignore,

    /// Sentences without a checksum are accepted, a present checksum must match.
    Optional,

    /// Every sentence must carry a matching checksum.
    Required,
}

/// Selects which talkers' RMC sentences are decoded.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TalkerFilter {
    /// Only `$GPRMC`.
    #[default]
    Gps,

    /// Any `$xxRMC`, e.g. `$GNRMC` from multi-constellation receivers.
    Any,
}

impl TalkerFilter {
    /// Returns `true` when `line` starts with an RMC identifier accepted by this filter.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nmea0183_ingest::TalkerFilter;
    ///
    /// assert!(TalkerFilter::Gps.matches(b"$GPRMC,123519,A"));
    /// assert!(!TalkerFilter::Gps.matches(b"$GNRMC,123519,A"));
    /// assert!(TalkerFilter::Any.matches(b"$GNRMC,123519,A"));
    /// assert!(!TalkerFilter::Any.matches(b"$GPGGA,123519"));
    /// ```
    pub fn matches(self, line: &[u8]) -> bool {
        match self {
            TalkerFilter::Gps => line.starts_with(RMC_IDENTIFIER.as_bytes()),
            TalkerFilter::Any => matches!(line, [b'$', _, _, b'R', b'M', b'C', ..]),
        }
    }
}

/// The comma-separated fields of one sentence.
///
/// Field 0 is the identifier, e.g. `$GPRMC`. Scanning stops at the first `*`; the
/// checksum text after it is kept aside and never appears in a field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSet<'a> {
    fields: Vec<&'a str, MAX_FIELDS>,
    checksum: Option<&'a str>,
}

impl<'a> FieldSet<'a> {
    /// Splits a sentence into fields.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nmea0183_ingest::FieldSet;
    ///
    /// let fields = FieldSet::split("$GPRMC,1,,3*4A").unwrap();
    /// assert_eq!(fields.len(), 4);
    /// assert_eq!(fields.identifier(), "$GPRMC");
    /// assert_eq!(fields.get(2), Some(""));
    /// assert_eq!(fields.get(3), Some("3"));
    /// assert_eq!(fields.checksum(), Some("4A"));
    /// ```
    pub fn split(sentence: &'a str) -> Result<Self, DecodeError> {
        let (body, checksum) = match sentence.split_once('*') {
            Some((body, checksum)) => (body, Some(checksum)),
            None => (sentence, None),
        };

        let mut fields = Vec::new();
        for field in body.split(',') {
            fields
                .push(field)
                .map_err(|_| DecodeError::TooManyFields { max: MAX_FIELDS })?;
        }

        Ok(Self { fields, checksum })
    }

    /// Field 0, the sentence identifier.
    pub fn identifier(&self) -> &'a str {
        self.get(0).unwrap_or_default()
    }

    /// Returns the field at `index`, or [`None`] past the end.
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.fields.get(index).copied()
    }

    /// Number of fields, identifier included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the set holds no field at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Text after `*`, if the sentence had one.
    pub fn checksum(&self) -> Option<&'a str> {
        self.checksum
    }

    /// Iterates over the fields in order.
    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.fields.iter().copied()
    }
}

/// Turns completed lines into fixes.
///
/// Combines identifier filtering, the optional checksum check, tokenizing, the
/// field count check and the [`FixDecoder`].
///
/// # Examples
///
/// ```rust
/// use nmea0183_ingest::{DecodeError, SentenceParser};
///
/// let parser = SentenceParser::default();
///
/// let fix = parser
///     .parse(b"$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A")
///     .unwrap()
///     .unwrap();
/// assert_eq!(fix.time_text(), "12:35:19");
///
/// // Other sentence types are not applicable
/// assert!(parser.parse(b"$GPGGA,123519,4807.038,N").is_none());
///
/// // Short RMC sentences are decode failures
/// assert_eq!(
///     parser.parse(b"$GPRMC,1,2,3"),
///     Some(Err(DecodeError::FieldCount { found: 4, required: 12 }))
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct SentenceParser {
    config: ParserConfig,
    decoder: FixDecoder,
}

impl SentenceParser {
    /// Creates a parser with the given configuration.
    pub fn new(config: ParserConfig) -> Self {
        Self {
            decoder: FixDecoder::new(config.century),
            config,
        }
    }

    /// The configuration this parser was built with.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses one completed line, terminator already stripped.
    ///
    /// Returns [`None`] when the line is not an accepted RMC sentence, otherwise
    /// the decoded fix or the reason decoding failed.
    pub fn parse(&self, line: &[u8]) -> Option<Result<Fix, DecodeError>> {
        if !self.config.talker.matches(line) {
            return None;
        }

        Some(self.parse_rmc(line))
    }

    fn parse_rmc(&self, line: &[u8]) -> Result<Fix, DecodeError> {
        let sentence = core::str::from_utf8(line).map_err(|_| DecodeError::NonAscii)?;
        if !sentence.is_ascii() {
            return Err(DecodeError::NonAscii);
        }

        verify_checksum(sentence, self.config.checksum)?;

        let fields = FieldSet::split(sentence)?;
        if fields.len() < RMC_MIN_FIELDS {
            return Err(DecodeError::FieldCount {
                found: fields.len(),
                required: RMC_MIN_FIELDS,
            });
        }

        self.decoder.decode(&fields)
    }
}

/// Checks the `*CC` suffix of `sentence` according to `mode`.
///
/// `sentence` is a complete line without terminator, starting with `$`.
///
/// # Examples
///
/// ```rust
/// use nmea0183_ingest::{ChecksumMode, DecodeError, verify_checksum};
///
/// let good = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";
/// assert_eq!(verify_checksum(good, ChecksumMode::Required), Ok(()));
///
/// let bad = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*00";
/// assert_eq!(verify_checksum(bad, ChecksumMode::Ignore), Ok(()));
/// assert_eq!(
///     verify_checksum(bad, ChecksumMode::Optional),
///     Err(DecodeError::ChecksumMismatch { expected: 0x6A, found: 0x00 })
/// );
/// ```
pub fn verify_checksum(sentence: &str, mode: ChecksumMode) -> Result<(), DecodeError> {
    if mode == ChecksumMode::Ignore {
        return Ok(());
    }

    let content = sentence.strip_prefix('$').unwrap_or(sentence);
    let Some((data, cc)) = content.split_once('*') else {
        return match mode {
            ChecksumMode::Required => Err(DecodeError::MissingChecksum),
            _ => Ok(()),
        };
    };

    if cc.len() != 2 || !cc.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(DecodeError::MissingChecksum);
    }
    let found = u8::from_str_radix(cc, 16).map_err(|_| DecodeError::MissingChecksum)?;
    let expected = checksum(data);

    if found != expected {
        return Err(DecodeError::ChecksumMismatch { expected, found });
    }

    Ok(())
}

/// Calculates the NMEA 0183 checksum of the content between `$` and `*`.
///
/// # Examples
///
/// ```rust
/// use nmea0183_ingest::checksum;
///
/// assert_eq!(checksum("GPGGA,123456,data"), 0x41);
/// ```
pub fn checksum(content: &str) -> u8 {
    content
        .as_bytes()
        .iter()
        .fold(0u8, |accumulated_xor, &byte| accumulated_xor ^ byte)
}

/// Formats a checksum value as a two-digit uppercase hexadecimal string.
///
/// # Examples
///
/// ```rust
/// use nmea0183_ingest::format_checksum;
///
/// assert_eq!(format_checksum(0x41), "41");
/// assert_eq!(format_checksum(0x0A), "0A");
/// ```
pub fn format_checksum(checksum: u8) -> String {
    format!("{checksum:02X}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_stops_at_star() {
        let fields = FieldSet::split("$GPRMC,a,b*12,c").unwrap();
        assert_eq!(fields.iter().collect::<std::vec::Vec<_>>(), ["$GPRMC", "a", "b"]);
        assert_eq!(fields.checksum(), Some("12,c"));
    }

    #[test]
    fn test_split_empty_sentence() {
        let fields = FieldSet::split("").unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.identifier(), "");
    }

    #[test]
    fn test_split_too_many_fields() {
        let sentence = ",".repeat(MAX_FIELDS);
        assert_eq!(
            FieldSet::split(&sentence),
            Err(DecodeError::TooManyFields { max: MAX_FIELDS })
        );

        let sentence = ",".repeat(MAX_FIELDS - 1);
        assert_eq!(FieldSet::split(&sentence).unwrap().len(), MAX_FIELDS);
    }

    #[test]
    fn test_identifier_prefix_match() {
        assert!(TalkerFilter::Gps.matches(b"$GPRMC"));
        assert!(!TalkerFilter::Gps.matches(b"$GPRM"));
        assert!(!TalkerFilter::Gps.matches(b"GPRMC,"));
        assert!(!TalkerFilter::Any.matches(b"$GNRM"));
        assert!(!TalkerFilter::Any.matches(b""));
    }

    #[test]
    fn test_checksum_required_missing() {
        assert_eq!(
            verify_checksum("$GPRMC,1,2", ChecksumMode::Required),
            Err(DecodeError::MissingChecksum)
        );
        assert_eq!(verify_checksum("$GPRMC,1,2", ChecksumMode::Optional), Ok(()));
    }

    #[test]
    fn test_checksum_malformed_digits() {
        for sentence in ["$GPRMC,1*1", "$GPRMC,1*1z", "$GPRMC,1*1F43", "$GPRMC,1*"] {
            assert_eq!(
                verify_checksum(sentence, ChecksumMode::Optional),
                Err(DecodeError::MissingChecksum),
                "{sentence}"
            );
        }
    }

    #[test]
    fn test_checksum_lowercase_hex() {
        let sentence = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6a";
        assert_eq!(verify_checksum(sentence, ChecksumMode::Required), Ok(()));
    }

    #[test]
    fn test_parser_rejects_non_ascii() {
        let parser = SentenceParser::default();
        assert_eq!(
            parser.parse("$GPRMC,12°,A".as_bytes()),
            Some(Err(DecodeError::NonAscii))
        );
        assert_eq!(
            parser.parse(b"$GPRMC,\xff\xfe"),
            Some(Err(DecodeError::NonAscii))
        );
    }

    #[test]
    fn test_parser_checksum_before_field_count() {
        let parser = SentenceParser::new(ParserConfig {
            checksum: ChecksumMode::Required,
            ..ParserConfig::default()
        });
        assert_eq!(
            parser.parse(b"$GPRMC,1,2,3*00"),
            Some(Err(DecodeError::ChecksumMismatch {
                expected: 0x57,
                found: 0x00
            }))
        );
        assert_eq!(
            parser.parse(b"$GPRMC,1,2,3*57"),
            Some(Err(DecodeError::FieldCount {
                found: 4,
                required: RMC_MIN_FIELDS
            }))
        );
    }
}
