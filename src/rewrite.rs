//! Comment-preserving file rewrite.
//!
//! The rewriter streams the old file and walks [`schema::FILE_ORDER`] in
//! lockstep: comment and blank lines are copied byte-for-byte, unmodified
//! value lines pass through verbatim, and dirty fields are re-serialized
//! canonically. Channel blocks shrink and grow with the mask; comments
//! interleaved in a regenerated block survive only between line slots that
//! existed in the old file.
//!
//! Output goes to a temp file in the config file's directory and replaces the
//! original only after the whole walk succeeds, so a failure of any kind
//! leaves the file on disk untouched.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::load::ConfigError;
use crate::model::ParamSet;
use crate::scanner;
use crate::schema::{self, FieldId};

/// Rewrites `path` from the model. On success `file_channel_width` is synced
/// to the current mask width; dirty flags are left as they are.
pub fn rewrite(path: &Path, model: &mut ParamSet) -> Result<(), ConfigError> {
    let src = File::open(path)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        write_updated(BufReader::new(src), &mut out, model, path)?;
        out.flush()?;
    }
    tmp.persist(path).map_err(|e| ConfigError::Io(e.error))?;
    let width = model.width();
    model.set_file_channel_width(width);
    Ok(())
}

struct Source<R> {
    reader: R,
    line_no: u32,
}

impl<R: BufRead> Source<R> {
    /// Copies comment/blank lines to `out` verbatim and returns the next raw
    /// value line, or `None` at end of input.
    fn next_value_line<W: Write>(&mut self, out: &mut W) -> Result<Option<String>, ConfigError> {
        let mut buf = String::new();
        loop {
            buf.clear();
            if self.reader.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            if scanner::is_significant(scanner::clean(&buf)) {
                return Ok(Some(buf.clone()));
            }
            out.write_all(buf.as_bytes())?;
        }
    }

    fn require_value_line<W: Write>(
        &mut self,
        out: &mut W,
        path: &Path,
    ) -> Result<String, ConfigError> {
        self.next_value_line(out)?
            .ok_or_else(|| ConfigError::UnexpectedEof {
                path: path.display().to_string(),
                line: self.line_no,
            })
    }
}

fn write_updated<R: BufRead, W: Write>(
    reader: R,
    out: &mut W,
    model: &ParamSet,
    path: &Path,
) -> Result<(), ConfigError> {
    let mut src = Source { reader, line_no: 0 };
    let mask_dirty = model.channel_mask.is_dirty();
    let file_width = model.file_channel_width();
    let width = model.width();

    for &id in schema::FILE_ORDER {
        let first = src.require_value_line(out, path)?;
        match id {
            FieldId::Channel(param) => {
                let block_dirty = model.channel_dirty(param) || mask_dirty;
                if !block_dirty {
                    // untouched block: every old line passes through
                    out.write_all(first.as_bytes())?;
                    for _ in 1..file_width {
                        let line = src.require_value_line(out, path)?;
                        out.write_all(line.as_bytes())?;
                    }
                } else {
                    // regenerate over the old block's slots, then append any
                    // extra channels the wider mask requires
                    for i in 0..file_width {
                        if i < width {
                            writeln!(out, "{}", schema::channel_line(model, param, i))?;
                        }
                        if i != file_width - 1 {
                            src.require_value_line(out, path)?;
                        }
                    }
                    for i in file_width..width {
                        writeln!(out, "{}", schema::channel_line(model, param, i))?;
                    }
                }
            }
            _ => {
                if schema::field_dirty(model, id) {
                    writeln!(out, "{}", schema::scalar_text(model, id))?;
                } else {
                    out.write_all(first.as_bytes())?;
                }
            }
        }
    }

    // trailing comments after the last value line
    src.next_value_line(out)?;
    Ok(())
}
