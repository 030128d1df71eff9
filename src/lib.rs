//! Configuration synchronization engine for multi-channel DPP-PSD digitizers.
//!
//! The crate loads a line-oriented, comment-interleaved config file into a
//! typed parameter model, tracks which fields the operator modified, enforces
//! the channel-width consistency rule over the nine per-channel parameter
//! arrays, and rewrites the file in place while preserving comments and
//! unmodified lines byte-for-byte.
//!
//! ## Pipeline
//!
//! - [`scanner`] turns raw file bytes into cleaned, significant lines with
//!   1-based line numbers.
//! - [`parser`] converts one cleaned line into a typed value (pest grammar in
//!   `src/grammar.pest`).
//! - [`model`] holds every parameter with its dirty flag.
//! - [`schema`] is the single ordered field list shared by the loader and the
//!   rewriter.
//! - [`consistency`] tracks which channel arrays still match the current
//!   channel mask width.
//! - [`load`] / [`rewrite`] read and atomically rewrite the file.
//! - [`editor`] is the interactive menu state machine over generic
//!   `BufRead`/`Write` streams.

pub mod consistency;
pub mod defaults;
pub mod editor;
pub mod load;
pub mod model;
pub mod parser;
pub mod report;
pub mod rewrite;
pub mod scanner;
pub mod schema;

pub use consistency::ChannelTracker;
pub use editor::{Editor, Outcome};
pub use load::{load, load_or_create, ConfigError};
pub use model::{channel_width, ParamSet};
pub use parser::ValueError;
pub use rewrite::rewrite;
