//! Field parsers: one cleaned config line in, one typed value out.
//!
//! The pest grammar (`src/grammar.pest`) classifies the line shape; numeric
//! conversion happens afterwards with `str::parse`, which distinguishes a
//! genuine `0` from a non-numeric token and rejects values outside the 32-bit
//! range. Enum fields accept exactly the closed, case-sensitive token sets the
//! acquisition library defines.

use pest::Parser;
use pest_derive::Parser as PestParser;
use thiserror::Error;

use crate::model::EnumToken;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct LineParser;

/// Why a single line failed to parse as the expected field.
#[derive(Debug, Error)]
pub enum ValueError {
    #[error("not a number")]
    NotANumber,
    #[error("value out of range")]
    OutOfRange,
    #[error("unknown token `{found}` (expected one of: {expected})")]
    UnknownToken {
        found: String,
        expected: &'static str,
    },
    #[error("channel mask must have at least one bit set")]
    ZeroMask,
    #[error("malformed channel line (expected <ch>,<enable>,<value>)")]
    MalformedTriple,
    #[error("channel index `{found}` where channel {expected} was expected")]
    ChannelIndex { expected: usize, found: String },
    #[error("enable bit for channel {channel} disagrees with the channel mask")]
    EnableBit { channel: usize },
}

/// One parsed `<ch>,<enable>,<value>` channel line. The channel index is kept
/// as raw text: callers compare it literally against the expected position.
#[derive(Debug, Clone, Copy)]
pub struct Triple<'a> {
    pub channel: &'a str,
    pub enable: u8,
    pub value: &'a str,
}

// Matches `line` against a single-token rule and returns the token's text.
fn single<'a>(rule: Rule, line: &'a str) -> Option<&'a str> {
    let mut pairs = LineParser::parse(rule, line).ok()?;
    pairs.next()?.into_inner().next().map(|p| p.as_str())
}

pub fn parse_u32(line: &str) -> Result<u32, ValueError> {
    let digits = single(Rule::uint_line, line).ok_or(ValueError::NotANumber)?;
    digits.parse().map_err(|_| ValueError::OutOfRange)
}

pub fn parse_i32(line: &str) -> Result<i32, ValueError> {
    let digits = single(Rule::int_line, line).ok_or(ValueError::NotANumber)?;
    digits.parse().map_err(|_| ValueError::OutOfRange)
}

pub fn parse_u64(line: &str) -> Result<u64, ValueError> {
    let digits = single(Rule::uint_line, line).ok_or(ValueError::NotANumber)?;
    digits.parse().map_err(|_| ValueError::OutOfRange)
}

/// Hexadecimal channel mask. The `0x`/`0X` prefix is optional; the value must
/// fit in 32 bits and have at least one bit set.
pub fn parse_hex_mask(line: &str) -> Result<u32, ValueError> {
    let text = single(Rule::hex_line, line).ok_or(ValueError::NotANumber)?;
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let mask = u32::from_str_radix(digits, 16).map_err(|_| ValueError::OutOfRange)?;
    if mask == 0 {
        return Err(ValueError::ZeroMask);
    }
    Ok(mask)
}

/// Closed-set enum token, case-sensitive.
pub fn parse_token<T: EnumToken>(line: &str) -> Result<T, ValueError> {
    let text = single(Rule::token_line, line).ok_or_else(|| ValueError::UnknownToken {
        found: line.to_string(),
        expected: T::EXPECTED,
    })?;
    T::from_token(text).ok_or_else(|| ValueError::UnknownToken {
        found: text.to_string(),
        expected: T::EXPECTED,
    })
}

/// `<ch>,<enable>,<value>` channel line. The enable cell must be literally
/// `0` or `1`; the value cell is returned untyped for the per-parameter
/// parsers.
pub fn parse_triple(line: &str) -> Result<Triple<'_>, ValueError> {
    let mut pairs = LineParser::parse(Rule::triple_line, line)
        .map_err(|_| ValueError::MalformedTriple)?;
    let mut inner = pairs.next().ok_or(ValueError::MalformedTriple)?.into_inner();
    let channel = inner.next().ok_or(ValueError::MalformedTriple)?.as_str();
    let enable_text = inner.next().ok_or(ValueError::MalformedTriple)?.as_str();
    let value = inner.next().ok_or(ValueError::MalformedTriple)?.as_str();
    let enable = match enable_text {
        "0" => 0,
        "1" => 1,
        _ => return Err(ValueError::MalformedTriple),
    };
    Ok(Triple {
        channel,
        enable,
        value,
    })
}
