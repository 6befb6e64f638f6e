//! # Sentence Framing
//!
//! Rebuilds CR LF terminated sentences from a byte stream that arrives in chunks of
//! arbitrary size. The framer owns a fixed-capacity buffer and never allocates.

use heapless::Vec;

/// The two-byte sentence terminator, carriage return followed by line feed.
pub const TERMINATOR: [u8; 2] = *b"\r\n";

/// Default buffer capacity, large enough for any standard NMEA sentence (82 bytes)
/// with room for vendor extensions.
pub const DEFAULT_CAPACITY: usize = 256;

/// Accumulates bytes into a bounded buffer and hands out completed lines.
///
/// Bytes are scanned one at a time, so a terminator split across two calls to
/// [`feed`](Self::feed) is still recognised. When the buffer fills up to
/// `N - 1` bytes without a terminator the content is dropped. The rest of that
/// oversized line is skipped up to the next `$` or CR LF, so none of it reaches
/// the next sentence. Oversized or desynchronised input is discarded rather than
/// reported.
///
/// Each framer is an independent value. Two ingestion tasks must each own one.
///
/// # Examples
///
/// ```rust
/// use nmea0183_ingest::framer::SentenceFramer;
///
/// let mut framer = SentenceFramer::<64>::new();
/// let mut lines = Vec::new();
///
/// framer.feed(b"$GPTXT,hello\r", |line| lines.push(line.to_vec()));
/// assert!(lines.is_empty());
///
/// framer.feed(b"\n$GPTXT,wor", |line| lines.push(line.to_vec()));
/// assert_eq!(lines, vec![b"$GPTXT,hello".to_vec()]);
/// assert_eq!(framer.position(), 10);
/// ```
#[derive(Debug)]
pub struct SentenceFramer<const N: usize = DEFAULT_CAPACITY> {
    buf: Vec<u8, N>,
    state: State,
    overflows: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Framing,
    /// Dropping the tail of an oversized line
    Skipping { carriage_return: bool },
}

impl<const N: usize> SentenceFramer<N> {
    /// Creates an empty framer.
    pub const fn new() -> Self {
        const { assert!(N > 2, "framer capacity must hold at least a terminator") };

        Self {
            buf: Vec::new(),
            state: State::Framing,
            overflows: 0,
        }
    }

    /// Appends `bytes` to the buffer, calling `on_line` once per completed line.
    ///
    /// The line passed to `on_line` excludes the terminator. Empty lines are
    /// swallowed. Returns the number of lines emitted.
    pub fn feed<F>(&mut self, bytes: &[u8], mut on_line: F) -> usize
    where
        F: FnMut(&[u8]),
    {
        let mut emitted = 0;

        for &byte in bytes {
            if let State::Skipping { carriage_return } = self.state {
                match byte {
                    b'$' => self.state = State::Framing,
                    b'\n' if carriage_return => {
                        self.state = State::Framing;
                        continue;
                    }
                    _ => {
                        self.state = State::Skipping {
                            carriage_return: byte == b'\r',
                        };
                        continue;
                    }
                }
            }

            if self.buf.push(byte).is_err() {
                self.discard(byte);
                continue;
            }

            if self.buf.ends_with(&TERMINATOR) {
                let line = &self.buf[..self.buf.len() - TERMINATOR.len()];
                if line.is_empty() {
                    log::trace!("empty line skipped");
                } else {
                    on_line(line);
                    emitted += 1;
                }
                self.buf.clear();
            }

            if self.buf.len() >= N - 1 {
                self.discard(byte);
            }
        }

        emitted
    }

    /// Current write cursor, the number of buffered bytes.
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Buffer capacity in bytes.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of times the buffer was discarded because no terminator arrived in time.
    pub fn overflows(&self) -> u32 {
        self.overflows
    }

    /// Returns `true` while the tail of an oversized line is being skipped.
    pub fn is_skipping(&self) -> bool {
        matches!(self.state, State::Skipping { .. })
    }

    /// Drops any partially framed line. The next byte starts a new line.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.state = State::Framing;
    }

    /// Drops the buffer after `last` filled it. A `$` starts the next sentence,
    /// anything else leaves the framer skipping.
    fn discard(&mut self, last: u8) {
        log::debug!("no terminator within {} bytes, discarding buffer", self.buf.len());
        self.buf.clear();
        self.overflows = self.overflows.wrapping_add(1);

        if last == b'$' {
            // an empty buffer of capacity N > 2 always takes one byte
            let _ = self.buf.push(last);
        } else {
            self.state = State::Skipping {
                carriage_return: last == b'\r',
            };
        }
    }
}

impl<const N: usize> Default for SentenceFramer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<const N: usize>(framer: &mut SentenceFramer<N>, bytes: &[u8]) -> Vec<u8, 512> {
        let mut out = Vec::new();
        framer.feed(bytes, |line| {
            out.extend_from_slice(line).unwrap();
            out.push(b'|').unwrap();
        });
        out
    }

    #[test]
    fn test_single_line() {
        let mut framer = SentenceFramer::<32>::new();
        assert_eq!(collect(&mut framer, b"abc\r\n").as_slice(), b"abc|");
        assert_eq!(framer.position(), 0);
    }

    #[test]
    fn test_several_lines_in_one_chunk() {
        let mut framer = SentenceFramer::<32>::new();
        assert_eq!(collect(&mut framer, b"a\r\nbb\r\nccc").as_slice(), b"a|bb|");
        assert_eq!(framer.position(), 3);
    }

    #[test]
    fn test_terminator_split_across_feeds() {
        let mut framer = SentenceFramer::<32>::new();
        assert!(collect(&mut framer, b"abc\r").is_empty());
        assert_eq!(collect(&mut framer, b"\n").as_slice(), b"abc|");
    }

    #[test]
    fn test_lone_line_feed_is_data() {
        let mut framer = SentenceFramer::<32>::new();
        assert!(collect(&mut framer, b"ab\ncd").is_empty());
        assert_eq!(collect(&mut framer, b"\r\n").as_slice(), b"ab\ncd|");
    }

    #[test]
    fn test_empty_line_is_swallowed() {
        let mut framer = SentenceFramer::<32>::new();
        assert_eq!(framer.feed(b"\r\n\r\n", |_| panic!("empty line emitted")), 0);
        assert_eq!(framer.position(), 0);
    }

    #[test]
    fn test_overflow_discards_and_recovers() {
        let mut framer = SentenceFramer::<8>::new();
        assert!(collect(&mut framer, b"0123456").is_empty());
        assert_eq!(framer.position(), 0);
        assert_eq!(framer.overflows(), 1);
        assert!(framer.is_skipping());

        // the rest of the oversized line ends at its terminator
        assert!(collect(&mut framer, b"789\r\n").is_empty());
        assert!(!framer.is_skipping());
        assert_eq!(collect(&mut framer, b"ok\r\n").as_slice(), b"ok|");
    }

    #[test]
    fn test_overflow_tail_is_not_glued_to_next_sentence() {
        let mut framer = SentenceFramer::<8>::new();
        assert_eq!(collect(&mut framer, b"0123456789$ab\r\n").as_slice(), b"$ab|");
        assert_eq!(framer.overflows(), 1);
    }

    #[test]
    fn test_overflow_on_dollar_starts_next_sentence() {
        let mut framer = SentenceFramer::<8>::new();
        assert_eq!(collect(&mut framer, b"012345$ab\r\n").as_slice(), b"$ab|");
        assert_eq!(framer.overflows(), 1);
    }

    #[test]
    fn test_overflow_split_terminator_while_skipping() {
        let mut framer = SentenceFramer::<8>::new();
        assert!(collect(&mut framer, b"0123456xy\r").is_empty());
        assert_eq!(collect(&mut framer, b"\nok\r\n").as_slice(), b"ok|");
    }

    #[test]
    fn test_line_filling_usable_capacity() {
        // 5 bytes of payload plus CR LF reaches N - 1 exactly on the terminator
        let mut framer = SentenceFramer::<8>::new();
        assert_eq!(collect(&mut framer, b"abcde\r\n").as_slice(), b"abcde|");
        assert_eq!(framer.overflows(), 0);
    }

    #[test]
    fn test_reset_ends_skipping() {
        let mut framer = SentenceFramer::<8>::new();
        collect(&mut framer, b"0123456");
        framer.reset();
        assert_eq!(collect(&mut framer, b"ok\r\n").as_slice(), b"ok|");
    }

    #[test]
    fn test_reset_drops_partial_line() {
        let mut framer = SentenceFramer::<32>::new();
        assert!(collect(&mut framer, b"stale").is_empty());
        framer.reset();
        assert_eq!(collect(&mut framer, b"fresh\r\n").as_slice(), b"fresh|");
    }
}
