//! Loading a config file into the model.
//!
//! The loader walks [`schema::FILE_ORDER`] through the scanner: one value
//! line per scalar, `channel_width(mask)` lines per channel block. Values are
//! stored without raising dirty flags. The first bad line aborts the whole
//! load with its 1-based line number.

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;

use thiserror::Error;

use crate::consistency::ChannelTracker;
use crate::defaults;
use crate::model::ParamSet;
use crate::parser::{self, ValueError};
use crate::scanner::LineScanner;
use crate::schema::{self, FieldId};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{path}: parse error at line {line}: {source}")]
    Parse {
        path: String,
        line: u32,
        source: ValueError,
    },
    #[error("{path}: unexpected end of file after line {line}")]
    UnexpectedEof { path: String, line: u32 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Loads a config file. On success the model carries the file's values with
/// no dirty flags, `file_channel_width` matches the mask, and the tracker
/// starts fully consistent.
pub fn load(path: &Path) -> Result<(ParamSet, ChannelTracker), ConfigError> {
    let file = File::open(path)?;
    load_from_reader(BufReader::new(file), &path.display().to_string())
}

/// Loads the file, creating it from the built-in defaults first when it does
/// not exist. The load after creation is attempted exactly once.
pub fn load_or_create(path: &Path) -> Result<(ParamSet, ChannelTracker), ConfigError> {
    if !path.exists() {
        defaults::write_default_file(path, false)?;
    }
    load(path)
}

/// Same as [`load`] over any buffered source; `label` names the source in
/// error messages.
pub fn load_from_reader<R: BufRead>(
    reader: R,
    label: &str,
) -> Result<(ParamSet, ChannelTracker), ConfigError> {
    let mut scanner = LineScanner::new(reader);
    let mut model = ParamSet::default();

    for &id in schema::FILE_ORDER {
        match id {
            FieldId::Channel(param) => {
                // FILE_ORDER places the mask before every channel block
                let width = model.width();
                let mask = model.channel_mask.value();
                let mut values = Vec::with_capacity(width);
                for ch in 0..width {
                    let line = next_required(&mut scanner, label)?;
                    let line_no = scanner.line_no();
                    let triple = parser::parse_triple(&line)
                        .map_err(|e| parse_error(label, line_no, e))?;
                    if triple.channel != ch.to_string() {
                        return Err(parse_error(
                            label,
                            line_no,
                            ValueError::ChannelIndex {
                                expected: ch,
                                found: triple.channel.to_string(),
                            },
                        ));
                    }
                    let expected_bit = ((mask >> ch) & 1) as u8;
                    if triple.enable != expected_bit {
                        return Err(parse_error(
                            label,
                            line_no,
                            ValueError::EnableBit { channel: ch },
                        ));
                    }
                    let value = schema::parse_channel_value(param, triple.value)
                        .map_err(|e| parse_error(label, line_no, e))?;
                    values.push(value);
                }
                model
                    .commit_channel(param, values, false)
                    .map_err(|e| parse_error(label, scanner.line_no(), e))?;
            }
            _ => {
                let line = next_required(&mut scanner, label)?;
                schema::apply_scalar(&mut model, id, &line, false)
                    .map_err(|e| parse_error(label, scanner.line_no(), e))?;
            }
        }
    }

    let width = model.width();
    model.set_file_channel_width(width);
    Ok((model, ChannelTracker::new(width)))
}

fn next_required<R: BufRead>(
    scanner: &mut LineScanner<R>,
    label: &str,
) -> Result<String, ConfigError> {
    scanner
        .next_line()?
        .ok_or_else(|| ConfigError::UnexpectedEof {
            path: label.to_string(),
            line: scanner.line_no(),
        })
}

fn parse_error(label: &str, line: u32, source: ValueError) -> ConfigError {
    ConfigError::Parse {
        path: label.to_string(),
        line,
        source,
    }
}
