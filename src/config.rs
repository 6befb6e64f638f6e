//! # Configuration
//!
//! Every knob of the pipeline lives in plain structs with sensible defaults. With
//! the `serde` feature enabled they can be loaded from any serde format.

use core::time::Duration;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{ChecksumMode, TalkerFilter, rmc::CenturyRule};

/// Number of bytes requested from the source per poll.
pub const DEFAULT_POLL_SIZE: usize = 255;

/// Bounded wait of one poll.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Options of the [`SentenceParser`](crate::SentenceParser).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Which talkers' RMC sentences are decoded
    pub talker: TalkerFilter,
    /// Checksum handling
    pub checksum: ChecksumMode,
    /// Two-digit year expansion
    pub century: CenturyRule,
}

/// What the ingestion loop does when the byte source reports an error.
///
/// Each failed read is followed by a `backoff` pause. After `max_retries`
/// consecutive failures the next one ends the run. A successful read resets the
/// count.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Consecutive failures tolerated, [`None`] retries forever
    pub max_retries: Option<u32>,
    /// Pause after a failed read
    pub backoff: Duration,
}

impl RetryPolicy {
    /// The first read error ends the run.
    pub const FAIL_FAST: Self = Self {
        max_retries: Some(0),
        backoff: Duration::ZERO,
    };

    /// Keeps polling through any number of read errors, pausing `backoff` after each.
    pub const fn unbounded(backoff: Duration) -> Self {
        Self {
            max_retries: None,
            backoff,
        }
    }

    /// Tolerates `max_retries` consecutive read errors, pausing `backoff` after each.
    pub const fn limited(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries: Some(max_retries),
            backoff,
        }
    }

    /// Returns `true` if a run that has seen `failures` consecutive errors goes on.
    pub fn allows(&self, failures: u32) -> bool {
        self.max_retries.is_none_or(|max| failures <= max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::FAIL_FAST
    }
}

/// Options of the [`Ingestor`](crate::ingest::Ingestor).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestConfig {
    /// Bytes requested from the source per poll
    pub poll_size: usize,
    /// Bounded wait of one poll
    pub read_timeout: Duration,
    /// Read error handling
    pub retry: RetryPolicy,
    /// Sentence parsing options
    pub parser: ParserConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            poll_size: DEFAULT_POLL_SIZE,
            read_timeout: DEFAULT_READ_TIMEOUT,
            retry: RetryPolicy::default(),
            parser: ParserConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_fast_policy() {
        let policy = RetryPolicy::default();
        assert!(policy.allows(0));
        assert!(!policy.allows(1));
    }

    #[test]
    fn test_limited_policy() {
        let policy = RetryPolicy::limited(2, Duration::from_millis(10));
        assert!(policy.allows(2));
        assert!(!policy.allows(3));
    }

    #[test]
    fn test_unbounded_policy() {
        assert!(RetryPolicy::unbounded(Duration::ZERO).allows(u32::MAX));
    }
}
