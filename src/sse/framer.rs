//! Record framing for the event stream.
//!
//! The wire format separates records with a blank line (`"\n\n"`). Chunks
//! arrive with arbitrary boundaries, so the framer buffers decoded text
//! and only materializes a record once its full terminator has been seen;
//! partial records stay buffered for the next `feed`.

/// One complete protocol record: the raw lines between two blank-line
/// delimiters, with trailing `'\r'` stripped per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseRecord {
    pub lines: Vec<String>,
}

/// Accumulates text fragments and extracts complete records.
///
/// The scan for the delimiter always runs over the buffer, not the
/// individual fragment, so a `"\n\n"` split across two `feed` calls is
/// still detected. The scan resumes one byte before the previous buffer
/// end, so non-matching text is never scanned twice.
#[derive(Debug, Default)]
pub struct SseFramer {
    buf: String,
    scan_pos: usize,
}

impl SseFramer {
    /// Create an empty framer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text fragment and return every record completed by it.
    pub fn feed(&mut self, fragment: &str) -> Vec<SseRecord> {
        self.buf.push_str(fragment);

        let mut records = Vec::new();
        loop {
            let found = self.buf.as_bytes()[self.scan_pos..]
                .windows(2)
                .position(|pair| pair == b"\n\n");
            match found {
                Some(rel) => {
                    let end = self.scan_pos + rel;
                    records.push(split_record(&self.buf[..end]));
                    self.buf.drain(..end + 2);
                    self.scan_pos = 0;
                }
                None => {
                    // Keep one byte of overlap in case the delimiter is
                    // split across this fragment and the next.
                    self.scan_pos = self.buf.len().saturating_sub(1);
                    break;
                }
            }
        }
        records
    }

    /// Buffered text that has not yet formed a complete record.
    pub fn pending(&self) -> &str {
        &self.buf
    }
}

/// Split a record's text block into lines, tolerating CRLF line endings.
fn split_record(block: &str) -> SseRecord {
    let lines = block
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect();
    SseRecord { lines }
}
