//! # Ingestion Loop
//!
//! Drives the pipeline: poll a [`ByteSource`] with a bounded wait, feed the bytes
//! through the [`SentenceFramer`], hand each completed line to the
//! [`SentenceParser`] and deliver the outcome to a [`FixSink`].
//!
//! The loop runs on the calling thread until a [`StopSignal`] is raised or the
//! source keeps failing beyond what the [`RetryPolicy`](crate::RetryPolicy)
//! tolerates. All framing state is owned by the [`Ingestor`], so independent
//! receivers are served by independent ingestors.

use core::time::Duration;
use embedded_hal::delay::DelayNs;
use std::{
    fmt::Debug,
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use crate::{
    DecodeError, IngestConfig, IngestError, SentenceParser,
    framer::{DEFAULT_CAPACITY, SentenceFramer},
    rmc::Fix,
};

/// A byte-oriented input, typically a serial port.
pub trait ByteSource {
    /// Error reported by a failed read.
    type Error: Debug;

    /// Reads up to `buf.len()` bytes, waiting at most `timeout` for data.
    ///
    /// Returning `Ok(0)` means nothing arrived in time. The ingestion loop treats
    /// that as an ordinary poll and goes on.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Self::Error>;
}

/// Receives the outcome of every RMC sentence.
pub trait FixSink {
    /// Called with every decoded fix, in stream order.
    fn fix(&mut self, fix: Fix);

    /// Called when an RMC sentence could not be decoded.
    fn rejected(&mut self, error: DecodeError);
}

impl<K: FixSink + ?Sized> FixSink for &mut K {
    fn fix(&mut self, fix: Fix) {
        (**self).fix(fix);
    }

    fn rejected(&mut self, error: DecodeError) {
        (**self).rejected(error);
    }
}

/// Writes fixes to the log as a multi-line report and decode failures as warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl FixSink for LogSink {
    fn fix(&mut self, fix: Fix) {
        log::info!("GPS fix\n{fix}");
    }

    fn rejected(&mut self, error: DecodeError) {
        log::warn!("RMC sentence rejected: {error}");
    }
}

/// Cooperative cancellation flag shared between an ingestor and its owner.
///
/// The ingestor checks the flag between polls, so a raised signal takes effect
/// within one read timeout.
#[derive(Debug, Default, Clone)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// Creates a signal that is not raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the signal. Every clone observes it.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` once [`stop`](Self::stop) was called on any clone.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// [`DelayNs`] backed by [`thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// Adapts any [`io::Read`] into a [`ByteSource`].
///
/// The wait is whatever the reader was configured with, for a serial port its
/// read timeout. Timeouts and interruptions are reported as `Ok(0)`, the end of
/// the stream as [`io::ErrorKind::UnexpectedEof`].
///
/// # Examples
///
/// ```rust
/// use core::time::Duration;
/// use nmea0183_ingest::ingest::{ByteSource, ReaderSource};
///
/// let mut source = ReaderSource::new(&b"$GPRMC"[..]);
/// let mut buf = [0; 16];
///
/// assert_eq!(source.read(&mut buf, Duration::from_millis(100)).unwrap(), 6);
/// assert!(source.read(&mut buf, Duration::from_millis(100)).is_err());
/// ```
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: io::Read> ReaderSource<R> {
    /// Wraps `reader`.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: io::Read> ByteSource for ReaderSource<R> {
    type Error = io::Error;

    fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize, Self::Error> {
        match self.reader.read(buf) {
            Ok(0) if !buf.is_empty() => Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(count) => Ok(count),
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(0)
            }
            Err(error) => Err(error),
        }
    }
}

/// Counters of one ingestor, cumulative over its lifetime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    /// Reads issued to the source
    pub polls: u64,
    /// Bytes received
    pub bytes: u64,
    /// Completed lines produced by the framer
    pub lines: u64,
    /// Fixes delivered to the sink
    pub fixes: u64,
    /// RMC sentences that failed to decode
    pub rejected: u64,
    /// Lines that were not accepted RMC sentences
    pub skipped: u64,
    /// Buffer discards for lack of a terminator
    pub overflows: u64,
    /// Failed reads
    pub read_errors: u64,
}

/// Owns one receiver's pipeline from byte source to fix sink.
///
/// # Examples
///
/// ```rust
/// use nmea0183_ingest::{
///     DecodeError, IngestConfig,
///     ingest::{FixSink, Ingestor, ReaderSource, StdDelay, StopSignal},
///     rmc::Fix,
/// };
///
/// struct Times(Vec<String>);
///
/// impl FixSink for Times {
///     fn fix(&mut self, fix: Fix) {
///         self.0.push(fix.time_text());
///     }
///
///     fn rejected(&mut self, _: DecodeError) {}
/// }
///
/// let stream = &b"$GPGGA,1\r\n$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\r\n"[..];
/// let mut ingestor = Ingestor::new(
///     ReaderSource::new(stream),
///     Times(Vec::new()),
///     StdDelay,
///     IngestConfig::default(),
/// );
///
/// // the end of the stream is a read error, which ends the run
/// assert!(ingestor.run(&StopSignal::new()).is_err());
/// assert_eq!(ingestor.stats().fixes, 1);
/// assert_eq!(ingestor.stats().skipped, 1);
/// assert_eq!(ingestor.sink().0, ["12:35:19"]);
/// ```
#[derive(Debug)]
pub struct Ingestor<S, K, D, const N: usize = DEFAULT_CAPACITY> {
    source: S,
    sink: K,
    delay: D,
    framer: SentenceFramer<N>,
    parser: SentenceParser,
    config: IngestConfig,
    stats: IngestStats,
    buf: Vec<u8>,
    failures: u32,
}

impl<S, K, D> Ingestor<S, K, D>
where
    S: ByteSource,
    K: FixSink,
    D: DelayNs,
{
    /// Creates an ingestor with a framer of the default capacity.
    pub fn new(source: S, sink: K, delay: D, config: IngestConfig) -> Self {
        Self::with_framer(source, sink, delay, SentenceFramer::new(), config)
    }
}

impl<S, K, D, const N: usize> Ingestor<S, K, D, N>
where
    S: ByteSource,
    K: FixSink,
    D: DelayNs,
{
    /// Creates an ingestor around an existing framer, which fixes its capacity.
    pub fn with_framer(
        source: S,
        sink: K,
        delay: D,
        framer: SentenceFramer<N>,
        config: IngestConfig,
    ) -> Self {
        Self {
            source,
            sink,
            delay,
            framer,
            parser: SentenceParser::new(config.parser),
            buf: vec![0; config.poll_size.max(1)],
            config,
            stats: IngestStats::default(),
            failures: 0,
        }
    }

    /// Polls until `stop` is raised or the source fails for good.
    ///
    /// `stop` is checked before every poll. Any partially framed line is dropped
    /// when the run ends, whatever the reason.
    pub fn run(&mut self, stop: &StopSignal) -> Result<IngestStats, IngestError<S::Error>> {
        log::info!(
            "ingestion started, {} byte polls, {:?} timeout",
            self.buf.len(),
            self.config.read_timeout
        );

        let result = loop {
            if stop.is_stopped() {
                log::info!("stop requested");
                break Ok(self.stats);
            }

            if let Err(error) = self.poll_once() {
                break Err(error);
            }
        };

        self.framer.reset();
        log::debug!("ingestion ended: {:?}", self.stats);

        result
    }

    /// Performs a single read and processes whatever it returned.
    ///
    /// Returns the number of bytes read. A read error within the retry policy is
    /// absorbed after the backoff pause and reported as `Ok(0)`.
    pub fn poll_once(&mut self) -> Result<usize, IngestError<S::Error>> {
        self.stats.polls += 1;

        match self.source.read(&mut self.buf, self.config.read_timeout) {
            Ok(count) => {
                self.failures = 0;
                let count = count.min(self.buf.len());
                if count > 0 {
                    log::trace!("read {count} bytes");
                    self.stats.bytes += count as u64;
                    self.dispatch(count);
                }
                Ok(count)
            }
            Err(error) => {
                self.stats.read_errors += 1;
                self.failures = self.failures.saturating_add(1);

                if !self.config.retry.allows(self.failures) {
                    log::error!("read failed {} times in a row: {error:?}", self.failures);
                    return Err(IngestError::Source {
                        attempts: self.failures,
                        last: error,
                    });
                }

                log::warn!("read failed: {error:?}, retrying");
                self.pause(self.config.retry.backoff);
                Ok(0)
            }
        }
    }

    /// Sleeps for `backoff`, in nanoseconds below a millisecond.
    fn pause(&mut self, backoff: Duration) {
        if backoff.is_zero() {
            return;
        }
        if backoff < Duration::from_millis(1) {
            self.delay.delay_ns(backoff.subsec_nanos());
        } else {
            self.delay
                .delay_ms(u32::try_from(backoff.as_millis()).unwrap_or(u32::MAX));
        }
    }

    fn dispatch(&mut self, count: usize) {
        let Self {
            framer,
            parser,
            sink,
            stats,
            buf,
            ..
        } = self;

        let overflows = framer.overflows();
        framer.feed(&buf[..count], |line| {
            stats.lines += 1;
            match parser.parse(line) {
                None => stats.skipped += 1,
                Some(Ok(fix)) => {
                    stats.fixes += 1;
                    sink.fix(fix);
                }
                Some(Err(error)) => {
                    log::debug!("decode failed: {error}");
                    stats.rejected += 1;
                    sink.rejected(error);
                }
            }
        });
        stats.overflows += u64::from(framer.overflows().wrapping_sub(overflows));
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// The framer, e.g. to inspect its cursor.
    pub fn framer(&self) -> &SentenceFramer<N> {
        &self.framer
    }

    /// The sink.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// The source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Takes the ingestor apart.
    pub fn into_parts(self) -> (S, K, D) {
        (self.source, self.sink, self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flaky(io::ErrorKind);

    impl io::Read for Flaky {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(self.0.into())
        }
    }

    #[test]
    fn test_reader_source_quiet_kinds() {
        let mut buf = [0; 4];
        for kind in [
            io::ErrorKind::TimedOut,
            io::ErrorKind::WouldBlock,
            io::ErrorKind::Interrupted,
        ] {
            let mut source = ReaderSource::new(Flaky(kind));
            assert_eq!(source.read(&mut buf, Duration::ZERO).unwrap(), 0, "{kind:?}");
        }

        let mut source = ReaderSource::new(Flaky(io::ErrorKind::BrokenPipe));
        let error = source.read(&mut buf, Duration::ZERO).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_reader_source_end_of_stream() {
        let mut source = ReaderSource::new(io::empty());
        let error = source.read(&mut [0; 4], Duration::ZERO).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_stop_signal_shared_between_clones() {
        let signal = StopSignal::new();
        let handle = signal.clone();
        assert!(!signal.is_stopped());

        handle.stop();
        assert!(signal.is_stopped());
    }

    #[test]
    fn test_stop_signal_across_threads() {
        let signal = StopSignal::new();
        let handle = signal.clone();
        thread::spawn(move || handle.stop()).join().unwrap();
        assert!(signal.is_stopped());
    }
}
