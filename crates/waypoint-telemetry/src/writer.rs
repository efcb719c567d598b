//! A log sink usable wherever an [`io::Write`] is expected.

use std::io;

use crate::category::{log, Category};

/// Writes each complete line as a log event.
///
/// Bytes after the last newline are held until the next newline, a flush,
/// or drop. Invalid UTF-8 is replaced, never rejected.
///
/// ```rust
/// use std::io::Write;
/// use waypoint_telemetry::{Category, LogWriter};
///
/// let mut sink = LogWriter::new(Category::Tagged("HTTP"));
/// writeln!(sink, "connection reset by peer").unwrap();
/// ```
#[derive(Debug)]
pub struct LogWriter {
    category: Category,
    pending: Vec<u8>,
}

impl LogWriter {
    /// A sink logging under `category`.
    #[must_use]
    pub fn new(category: Category) -> Self {
        Self {
            category,
            pending: Vec::new(),
        }
    }

    /// A sink logging warnings.
    #[must_use]
    pub fn warnings() -> Self {
        Self::new(Category::Warning)
    }

    /// The category events are logged under.
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    fn emit(&self, line: &[u8]) {
        let line = String::from_utf8_lossy(line);
        let line = line.trim_end_matches('\r');
        if !line.is_empty() {
            log(self.category, line);
        }
    }
}

impl Default for LogWriter {
    fn default() -> Self {
        Self::warnings()
    }
}

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(end) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            self.emit(&line[..end]);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.emit(&line);
        }
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_lines_become_events() {
        let output = capture(|| {
            let mut sink = LogWriter::warnings();
            sink.write_all(b"first line\nsecond").unwrap();
            sink.write_all(b" line\r\n").unwrap();
        });

        assert!(output.contains("WARN"));
        assert!(output.contains("first line"));
        assert!(output.contains("second line"));
        assert!(output.contains("category=\"WARNING\""));
    }

    #[test]
    fn test_partial_line_held_until_flush() {
        let output = capture(|| {
            let mut sink = LogWriter::new(Category::Tagged("HTTP"));
            sink.write_all(b"no newline").unwrap();
            assert!(sink.pending.len() == 10);
            sink.flush().unwrap();
            assert!(sink.pending.is_empty());
        });

        assert!(output.contains("no newline"));
        assert!(output.contains("HTTP"));
    }

    #[test]
    fn test_drop_flushes() {
        let output = capture(|| {
            let mut sink = LogWriter::new(Category::Error);
            sink.write_all(b"dangling").unwrap();
        });

        assert!(output.contains("ERROR"));
        assert!(output.contains("dangling"));
    }
}
