//! Incremental row streaming.
//!
//! A producer thread decodes one row at a time and hands it over a rendezvous channel: nothing
//! is buffered, so the producer waits after each row until the consumer takes it. Stopping the
//! stream (explicitly or by dropping it) raises a stop flag and drops the receiving end so a
//! pending handoff fails immediately. The producer then closes its source and exits on its own;
//! stopping never waits on a read that is stalled inside the source.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::FrameResult;
use crate::types::{Header, Row};

use super::csv::{read_header, record_to_row, CsvFormat};
use super::loader::{report, LoadOptions};
use super::observability::{LoadContext, LoadMode};
use super::source::Storage;

/// Lazy, single-pass sequence of rows decoded from one source.
///
/// Yields `Ok(row)` in source order. A malformed line is yielded once as `Err` and ends the
/// stream.
pub struct RowStream {
    header: Header,
    rx: Option<Receiver<FrameResult<Row>>>,
    stop: Arc<AtomicBool>,
    producer: Option<JoinHandle<()>>,
}

impl RowStream {
    /// Header decoded from the first line of the source.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Stop consuming: the producer stops decoding and releases its source.
    ///
    /// Returns without waiting for a producer that is blocked reading the source; that thread
    /// exits as soon as its pending read returns.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        self.rx.take();
        let Some(handle) = self.producer.take() else {
            return;
        };
        if handle.is_finished() {
            if handle.join().is_err() {
                tracing::warn!("stream producer panicked");
            }
        } else {
            tracing::trace!("stream stopped; detaching producer");
        }
    }
}

impl Iterator for RowStream {
    type Item = FrameResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.rx.as_ref()?.recv().ok();
        if item.is_none() {
            // Producer is done; reap it.
            self.rx.take();
            if let Some(handle) = self.producer.take() {
                let _ = handle.join();
            }
        }
        item
    }
}

impl Drop for RowStream {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Stream rows from any reader.
///
/// The header is decoded on the calling thread, so a missing or duplicate header is reported
/// here rather than through the iterator.
pub fn stream_csv_from_reader<R>(source: R, format: &CsvFormat) -> FrameResult<RowStream>
where
    R: Read + Send + 'static,
{
    let mut rdr = format.reader(source);
    let header = read_header(&mut rdr)?;
    let width = header.len();

    let (tx, rx) = mpsc::sync_channel::<FrameResult<Row>>(0);
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);

    let producer = thread::Builder::new()
        .name("csv-frames-stream".to_string())
        .spawn(move || {
            let mut record = csv::StringRecord::new();
            let mut delivered = 0usize;
            while !stop_flag.load(Ordering::Acquire) {
                let item = match rdr.read_record(&mut record) {
                    Ok(false) => break,
                    Ok(true) => record_to_row(&record, width),
                    Err(e) => Err(e.into()),
                };
                let failed = item.is_err();
                if tx.send(item).is_err() || failed {
                    break;
                }
                delivered += 1;
            }
            tracing::trace!(delivered, "stream producer finished");
            // `rdr` drops here, releasing the source.
        })?;

    Ok(RowStream {
        header,
        rx: Some(rx),
        stop,
        producer: Some(producer),
    })
}

/// Stream rows of one named source from `storage`.
///
/// Header failures (open errors included) are reported to the configured observer.
pub fn stream_rows<S: Storage + ?Sized>(
    storage: &S,
    name: &str,
    options: &LoadOptions,
) -> FrameResult<RowStream> {
    let result = storage
        .open(name)
        .and_then(|source| stream_csv_from_reader(source, &options.format));
    if let Err(e) = &result {
        let ctx = LoadContext {
            source: name.to_owned(),
            mode: LoadMode::Stream,
        };
        report(options, &ctx, Err(e));
    }
    result
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};
    use std::sync::atomic::AtomicUsize;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::error::FrameError;

    /// Reader that counts bytes read and records when it is dropped.
    struct TrackedReader {
        inner: Cursor<Vec<u8>>,
        read_calls: Arc<AtomicUsize>,
        dropped: Arc<AtomicBool>,
    }

    impl Read for TrackedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.read_calls.fetch_add(1, Ordering::SeqCst);
            // Small reads keep decoding incremental.
            let n = buf.len().min(8);
            self.inner.read(&mut buf[..n])
        }
    }

    impl Drop for TrackedReader {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    /// Reader that serves `head` and then stalls on the next read for `stall`.
    struct StallingReader {
        head: Cursor<Vec<u8>>,
        stall: Duration,
    }

    impl Read for StallingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.head.read(buf)?;
            if n == 0 {
                std::thread::sleep(self.stall);
            }
            Ok(n)
        }
    }

    /// The producer releases its source asynchronously after a stop.
    fn wait_until_set(flag: &AtomicBool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if flag.load(Ordering::SeqCst) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    fn big_csv(rows: usize) -> Vec<u8> {
        let mut s = String::from("id,name\n");
        for i in 0..rows {
            s.push_str(&format!("{i},name{i}\n"));
        }
        s.into_bytes()
    }

    #[test]
    fn yields_rows_in_source_order() {
        let stream =
            stream_csv_from_reader(Cursor::new(big_csv(5)), &CsvFormat::default()).unwrap();
        assert_eq!(stream.header().names(), ["id", "name"]);
        let rows: Vec<Row> = stream.map(Result::unwrap).collect();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], vec!["0", "name0"]);
        assert_eq!(rows[4], vec!["4", "name4"]);
    }

    #[test]
    fn stop_releases_source_without_reading_everything() {
        let read_calls = Arc::new(AtomicUsize::new(0));
        let dropped = Arc::new(AtomicBool::new(false));
        let source = TrackedReader {
            inner: Cursor::new(big_csv(100_000)),
            read_calls: Arc::clone(&read_calls),
            dropped: Arc::clone(&dropped),
        };
        let mut stream = stream_csv_from_reader(source, &CsvFormat::default()).unwrap();
        let first = stream.next().unwrap().unwrap();
        assert_eq!(first, vec!["0", "name0"]);

        stream.stop();
        assert!(wait_until_set(&dropped));
        // 100k rows at 8 bytes per read would need far more calls than this.
        assert!(read_calls.load(Ordering::SeqCst) < 10_000);
    }

    #[test]
    fn dropping_the_stream_also_releases_source() {
        let dropped = Arc::new(AtomicBool::new(false));
        let source = TrackedReader {
            inner: Cursor::new(big_csv(1_000)),
            read_calls: Arc::new(AtomicUsize::new(0)),
            dropped: Arc::clone(&dropped),
        };
        let mut stream = stream_csv_from_reader(source, &CsvFormat::default()).unwrap();
        let _ = stream.next();
        drop(stream);
        assert!(wait_until_set(&dropped));
    }

    #[test]
    fn stop_does_not_wait_for_a_stalled_source() {
        let source = StallingReader {
            head: Cursor::new(b"a\n1\n".to_vec()),
            stall: Duration::from_secs(3),
        };
        let mut stream = stream_csv_from_reader(source, &CsvFormat::default()).unwrap();
        assert_eq!(stream.next().unwrap().unwrap(), vec!["1"]);

        let started = Instant::now();
        stream.stop();
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn dropping_a_stream_over_a_stalled_source_returns_promptly() {
        let source = StallingReader {
            head: Cursor::new(b"a\n1\n2\n".to_vec()),
            stall: Duration::from_secs(3),
        };
        let mut stream = stream_csv_from_reader(source, &CsvFormat::default()).unwrap();
        let _ = stream.next();
        let _ = stream.next();

        let started = Instant::now();
        drop(stream);
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn malformed_line_ends_stream_with_parse_error() {
        let input = "a,b\n1,2\n3\n4,5\n";
        let stream =
            stream_csv_from_reader(Cursor::new(input.as_bytes().to_vec()), &CsvFormat::default())
                .unwrap();
        let items: Vec<FrameResult<Row>> = stream.collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(FrameError::ParseError { line: 3, .. })));
    }

    #[test]
    fn header_errors_surface_immediately() {
        let err = stream_csv_from_reader(Cursor::new(Vec::new()), &CsvFormat::default())
            .err()
            .unwrap();
        assert!(matches!(err, FrameError::ParseError { line: 1, .. }));
    }
}
