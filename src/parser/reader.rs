//! CSV row source with one row of lookahead

use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::Arc;

use crate::error::Error;

/// Outcome of a failed row read
#[derive(Debug, Clone)]
pub enum RowError {
    /// The input has no more rows
    EndOfInput,
    /// The underlying CSV reader rejected the row
    Malformed { line: usize, source: Arc<csv::Error> },
}

impl RowError {
    /// Convert into a decoding error; `None` for end of input
    pub fn into_error(self) -> Option<Error> {
        match self {
            RowError::EndOfInput => None,
            RowError::Malformed { line, source } => Some(Error::Csv { line, source }),
        }
    }
}

/// Passes bytes through while recording the offset of every `\n`, so a
/// record's line number survives the blank lines the CSV reader skips.
struct NewlineIndex<R> {
    inner: R,
    offset: u64,
    /// Newline offsets not yet passed by a lookup
    pending: VecDeque<u64>,
    /// Newlines already passed by a lookup
    passed: usize,
}

impl<R> NewlineIndex<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            pending: VecDeque::new(),
            passed: 0,
        }
    }

    /// 1-based line of the byte at `offset`. Offsets must not decrease
    /// between calls.
    fn line_of(&mut self, offset: u64) -> usize {
        while self.pending.front().is_some_and(|&nl| nl < offset) {
            self.pending.pop_front();
            self.passed += 1;
        }
        self.passed + 1
    }
}

impl<R: Read> Read for NewlineIndex<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        for (i, &b) in buf[..n].iter().enumerate() {
            if b == b'\n' {
                self.pending.push_back(self.offset + i as u64);
            }
        }
        self.offset += n as u64;
        Ok(n)
    }
}

/// Wraps a `csv::Reader`, adding `peek` and a line counter.
///
/// The lookahead slot holds the outcome of the last physical read that has
/// not yet been consumed by `read`, so peeking any number of times touches
/// the underlying reader (and the line counter) only once.
pub struct PeekableReader<R> {
    inner: csv::Reader<NewlineIndex<R>>,
    record: csv::StringRecord,
    peeked: Option<Result<Vec<String>, RowError>>,
    line: usize,
}

impl<R: Read> PeekableReader<R> {
    /// Wrap a raw reader. Field counts are checked by the decoder, so the
    /// CSV reader is flexible and treats the first row as data.
    pub fn new(reader: R) -> Self {
        let inner = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(NewlineIndex::new(reader));
        Self {
            inner,
            record: csv::StringRecord::new(),
            peeked: None,
            line: 0,
        }
    }

    /// Return the next row without consuming it
    pub fn peek(&mut self) -> Result<&[String], RowError> {
        let slot = match self.peeked.take() {
            Some(slot) => slot,
            None => self.read_physical(),
        };
        match self.peeked.insert(slot) {
            Ok(row) => Ok(row.as_slice()),
            Err(err) => Err(err.clone()),
        }
    }

    /// Consume the next row, returning the peeked one if there is one
    pub fn read(&mut self) -> Result<Vec<String>, RowError> {
        match self.peeked.take() {
            Some(slot) => slot,
            None => self.read_physical(),
        }
    }

    /// Input line on which the most recently read row starts (1-indexed,
    /// 0 before any read)
    pub fn line(&self) -> usize {
        self.line
    }

    fn read_physical(&mut self) -> Result<Vec<String>, RowError> {
        match self.inner.read_record(&mut self.record) {
            Ok(true) => {
                let embedded: usize = self.record.iter().map(|f| f.matches('\n').count()).sum();
                self.line = self.last_line() - embedded;
                Ok(self.record.iter().map(str::to_owned).collect())
            }
            Ok(false) => Err(RowError::EndOfInput),
            Err(source) => {
                self.line = self.last_line();
                Err(RowError::Malformed {
                    line: self.line,
                    source: Arc::new(source),
                })
            }
        }
    }

    /// Line of the last byte the CSV reader consumed: the record
    /// terminator, or the final byte at end of input.
    fn last_line(&mut self) -> usize {
        let end = self.inner.position().byte().saturating_sub(1);
        self.inner.get_mut().line_of(end)
    }
}
