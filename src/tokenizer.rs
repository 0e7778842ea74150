//! Splitting of input lines into words.

use std::ffi::OsString;
use std::os::unix::ffi::OsStringExt;

/// Bytes that separate words on a command line.
pub const DELIMITERS: [u8; 4] = [b' ', b'\t', b'\r', b'\n'];

/// Split `line` into words separated by runs of [`DELIMITERS`].
///
/// No quoting, escaping or expansion is performed: every word is a literal
/// byte substring of `line`, so bytes that are not valid UTF-8 are kept as-is.
/// Leading, trailing and repeated delimiters never produce empty words, so a
/// blank line yields an empty vector.
pub fn split_into_tokens(line: &[u8]) -> Vec<OsString> {
    line.split(|b| DELIMITERS.contains(b))
        .filter(|word| !word.is_empty())
        .map(|word| OsString::from_vec(word.to_vec()))
        .collect()
}
