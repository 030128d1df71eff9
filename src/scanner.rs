//! Line scanner: turns raw config-file bytes into cleaned, significant lines.
//!
//! A line is *cleaned* by stripping everything before its first byte in the
//! printable ASCII range `33..=126` and after its last. A cleaned line that is
//! empty or starts with `#` is a comment/blank and is skipped; everything else
//! is a value line handed to the field parsers.

use std::io::{self, BufRead};

/// Strip leading and trailing bytes outside the printable range `33..=126`.
///
/// Returns a sub-slice of the input, so interior whitespace is untouched.
pub fn clean(line: &str) -> &str {
    let bytes = line.as_bytes();
    let printable = |b: &u8| (33..=126).contains(b);
    let Some(start) = bytes.iter().position(printable) else {
        return "";
    };
    // position() succeeded, so rposition() does too
    let end = bytes.iter().rposition(printable).unwrap_or(start);
    &line[start..=end]
}

/// True if a cleaned line carries a value (not empty, not a `#` comment).
pub fn is_significant(cleaned: &str) -> bool {
    !cleaned.is_empty() && !cleaned.starts_with('#')
}

/// Reads cleaned value lines from a buffered source, counting every physical
/// line (comments and blanks included) so parse errors can report a 1-based
/// position in the original file.
pub struct LineScanner<R> {
    inner: R,
    line_no: u32,
}

impl<R: BufRead> LineScanner<R> {
    pub fn new(inner: R) -> Self {
        LineScanner { inner, line_no: 0 }
    }

    /// Number of the last physical line read, 1-based. Zero before the first
    /// read.
    pub fn line_no(&self) -> u32 {
        self.line_no
    }

    /// Next significant line, cleaned. `Ok(None)` at end of input.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        loop {
            buf.clear();
            if self.inner.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let cleaned = clean(&buf);
            if is_significant(cleaned) {
                return Ok(Some(cleaned.to_string()));
            }
        }
    }
}
