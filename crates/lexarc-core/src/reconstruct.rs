//! # Row Reconstructor
//!
//! Recovers logical rows from a decompressed export stream whose quoting
//! is not standards-compliant CSV.
//!
//! Rendered-markup fields contain literal, unescaped newlines, so a
//! conformant CSV tokenizer cannot locate record boundaries. The only
//! reliable signal is the identity column's opening quote: a physical
//! line beginning with the quote character starts a new logical row, and
//! every following line belongs to the current row until the next anchor
//! or end of stream.
//!
//! The reader is lazy, forward-only and non-restartable; memory is
//! bounded by one buffered logical row. Rows whose parsed column count
//! disagrees with the header are dropped and counted — never fatal.

use crate::primitives::{ESCAPE_CHAR, QUOTE_CHAR};
use crate::types::LexarcError;
use std::io::BufRead;

/// One reconstructed logical row: raw cell strings, quoting preserved.
pub type RawRow = Vec<String>;

// =============================================================================
// HEADER
// =============================================================================

/// The header line of a bulk file: ordered column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    columns: Vec<String>,
}

impl Header {
    /// Parse a header line into ordered column names.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        Self {
            columns: line
                .trim_end_matches(['\n', '\r'])
                .split(',')
                .map(|name| name.trim().to_string())
                .collect(),
        }
    }

    /// Number of columns every logical row must have.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Position of a named column, if declared.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The declared column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

// =============================================================================
// ROW READER
// =============================================================================

/// Streaming reconstructor of logical rows.
///
/// Construction consumes the header line; `next_row` then pulls one
/// logical row at a time until the stream is exhausted.
pub struct RowReader<R: BufRead> {
    reader: R,
    header: Header,
    /// Buffered physical lines of the row under construction.
    buffer: Option<String>,
    physical_lines: u64,
    dropped_rows: u64,
}

impl<R: BufRead> std::fmt::Debug for RowReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowReader")
            .field("columns", &self.header.column_count())
            .field("physical_lines", &self.physical_lines)
            .field("dropped_rows", &self.dropped_rows)
            .finish_non_exhaustive()
    }
}

impl<R: BufRead> RowReader<R> {
    /// Open a reader over a decompressed stream, consuming the header line.
    pub fn new(mut reader: R) -> Result<Self, LexarcError> {
        let mut line = String::new();
        let read = reader
            .read_line(&mut line)
            .map_err(|e| LexarcError::IoError(e.to_string()))?;
        if read == 0 {
            return Err(LexarcError::IoError("empty stream: no header line".to_string()));
        }

        Ok(Self {
            reader,
            header: Header::parse(&line),
            buffer: None,
            physical_lines: 1,
            dropped_rows: 0,
        })
    }

    /// The header parsed at construction.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Rows dropped because their column count disagreed with the header.
    #[must_use]
    pub fn dropped_rows(&self) -> u64 {
        self.dropped_rows
    }

    /// Physical lines consumed so far, header included.
    #[must_use]
    pub fn physical_lines(&self) -> u64 {
        self.physical_lines
    }

    /// Pull the next logical row, or `None` at end of stream.
    ///
    /// The final buffered run is always flushed at end of stream.
    pub fn next_row(&mut self) -> Result<Option<RawRow>, LexarcError> {
        loop {
            let mut line = String::new();
            let read = self
                .reader
                .read_line(&mut line)
                .map_err(|e| LexarcError::IoError(e.to_string()))?;

            if read == 0 {
                // End of stream: flush whatever is buffered.
                return Ok(self.buffer.take().and_then(|run| self.parse_run(&run)));
            }

            self.physical_lines = self.physical_lines.saturating_add(1);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.starts_with(QUOTE_CHAR) {
                // Anchor line: the previous row (if any) is complete.
                let finished = self.buffer.replace(line.to_string());
                if let Some(run) = finished {
                    if let Some(row) = self.parse_run(&run) {
                        return Ok(Some(row));
                    }
                    // Dropped; keep scanning.
                }
            } else if let Some(buffer) = self.buffer.as_mut() {
                // Continuation of the current row: an unescaped newline
                // inside a field. Rejoin with the newline it carried.
                buffer.push('\n');
                buffer.push_str(line);
            }
            // Lines before the first anchor belong to no row and are skipped.
        }
    }

    /// Parse one buffered run as a quoted-CSV row.
    ///
    /// Returns `None` (and counts the drop) when the column count does
    /// not match the header.
    fn parse_run(&mut self, run: &str) -> Option<RawRow> {
        let fields = split_fields(run);
        if fields.len() == self.header.column_count() {
            Some(fields)
        } else {
            self.dropped_rows = self.dropped_rows.saturating_add(1);
            tracing::debug!(
                expected = self.header.column_count(),
                got = fields.len(),
                "dropping logical row with wrong column count"
            );
            None
        }
    }
}

// =============================================================================
// FIELD SPLITTING
// =============================================================================

/// Split one logical row into raw cells on commas outside quoted regions.
///
/// Quoting and escapes are preserved in the output cells; the decoder is
/// responsible for stripping them. This keeps the null token
/// distinguishable from an empty cell downstream.
fn split_fields(run: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for c in run.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            ESCAPE_CHAR if in_quotes => {
                current.push(c);
                escaped = true;
            }
            QUOTE_CHAR => {
                current.push(c);
                in_quotes = !in_quotes;
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

// =============================================================================
// TESTS
// =============================================================================
