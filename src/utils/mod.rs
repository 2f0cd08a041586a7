pub mod styles;

pub use styles::*;

use std::error::Error;

pub fn require(predicate: bool, err: &str) -> Result<(), Box<dyn Error>> {
    if predicate { Ok(()) } else { Err(err.into()) }
}

pub fn warn(mesg: &str) {
    eprintln!("{}", mesg.warn());
}

pub fn explain(title: &str, text: &str) -> String {
    format!("{}: {}", title.explain_title(), text.explain_text())
}

/// Rounds n up to the next multiple of align which must be a power of two.
pub fn align_to(n: u64, align: u64) -> Option<u64> {
    debug_assert!(align.is_power_of_two());
    Some(n.checked_add(align - 1)? & !(align - 1))
}

/// writeln! for output that goes to a terminal or a test buffer: there is nothing
/// useful to do if those writes fail.
macro_rules! uwriteln {
    ($out:expr) => {
        let _ = writeln!($out);
    };
    ($out:expr, $($arg:tt)*) => {
        let _ = writeln!($out, $($arg)*);
    };
}
pub(crate) use uwriteln;

/// Remove escape sequences from the string (e.g. for colors).
#[cfg(test)]
pub fn strip_escapes(s: &str) -> String {
    // Styling comes from the user's tcss file so tests can't know which escape
    // sequences (if any) will be emitted. Note that tabled also adds a few of its own.
    let mut result = String::with_capacity(s.len());
    let mut escaping = false;

    for c in s.chars() {
        if c == '\x1b' {
            escaping = true;
        } else if escaping {
            if c == 'm' {
                escaping = false;
            }
        } else {
            result.push(c);
        }
    }
    result
}
