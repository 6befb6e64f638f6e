use std::io;

use nmea0183_ingest::{
    ChecksumMode, DecodeError, IngestConfig, IngestError, ParserConfig, TalkerFilter,
    ingest::{FixSink, Ingestor, ReaderSource, StdDelay, StopSignal},
    rmc::{CenturyRule, Fix},
};

struct Print;

impl FixSink for Print {
    fn fix(&mut self, fix: Fix) {
        println!("{fix}\n");
    }

    fn rejected(&mut self, error: DecodeError) {
        eprintln!("rejected: {error}");
    }
}

fn main() {
    let mut parser = ParserConfig::default();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--any-talker" => parser.talker = TalkerFilter::Any,
            "--checksum" => parser.checksum = ChecksumMode::Required,
            "--y2k" => parser.century = CenturyRule::Pivot(80),
            other => {
                eprintln!("unknown option {other}");
                eprintln!("usage: replay [--any-talker] [--checksum] [--y2k] < capture.nmea");
                std::process::exit(2);
            }
        }
    }

    let config = IngestConfig {
        parser,
        ..IngestConfig::default()
    };
    let mut ingestor = Ingestor::new(
        ReaderSource::new(io::stdin().lock()),
        Print,
        StdDelay,
        config,
    );

    let stats = match ingestor.run(&StopSignal::new()) {
        Ok(stats) => stats,
        Err(IngestError::Source { last, .. }) if last.kind() == io::ErrorKind::UnexpectedEof => {
            ingestor.stats()
        }
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    };

    println!(
        "{} lines, {} fixes, {} rejected, {} skipped, {} overflows",
        stats.lines, stats.fixes, stats.rejected, stats.skipped, stats.overflows
    );
}
