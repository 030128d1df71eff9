//! Loader fuzz target: feed arbitrary bytes to the config loader.
//! The loader must not panic; it should return Ok((model, tracker)) or a
//! ConfigError. Build with: cargo fuzz run load_fuzz (requires nightly and
//! cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let _ = dppconf::load::load_from_reader(std::io::Cursor::new(s), "fuzz");
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run load_fuzz");
}
