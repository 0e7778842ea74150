//! Resolution of command names to executable files.

use crate::env::Environment;
use log::debug;
use std::ffi::{CString, OsStr, OsString};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Separator between directories in `PATH`.
pub const PATH_LIST_SEPARATOR: u8 = b':';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// No executable file matches the command.
    #[error("{}: not found", .0.to_string_lossy())]
    NotFound(OsString),
}

/// Resolve `command` to the path of an executable.
///
/// Behavior:
/// - A command containing `/` anywhere is a path: it is returned as-is if it is
///   executable, and `PATH` is never consulted.
/// - Otherwise each directory of `PATH` is tried left to right as
///   `directory + "/" + command` and the first executable candidate wins.
///   Empty segments are not special: they produce `"/" + command`.
/// - A missing or empty `PATH`, or an empty command, never resolves.
pub fn resolve(command: impl AsRef<OsStr>, env: &Environment) -> Result<PathBuf, ResolveError> {
    let command = command.as_ref();
    let not_found = || ResolveError::NotFound(command.to_owned());

    if command.is_empty() {
        return Err(not_found());
    }

    if command.as_bytes().contains(&b'/') {
        let path = Path::new(command);
        return if is_executable(path) {
            debug!("resolved {command:?} directly");
            Ok(path.to_path_buf())
        } else {
            Err(not_found())
        };
    }

    let search_path = env.search_path().ok_or_else(not_found)?;
    let found = find_in_path(search_path, command).ok_or_else(not_found)?;
    debug!("resolved {command:?} to {}", found.display());
    Ok(found)
}

/// Search the directories of a `PATH`-style list for `command`.
fn find_in_path(search_path: &OsStr, command: &OsStr) -> Option<PathBuf> {
    if search_path.is_empty() {
        return None;
    }
    search_path
        .as_bytes()
        .split(|&b| b == PATH_LIST_SEPARATOR)
        .map(|dir| candidate(dir, command))
        .find(|path| is_executable(path))
}

fn candidate(dir: &[u8], command: &OsStr) -> PathBuf {
    let mut bytes = Vec::with_capacity(dir.len() + 1 + command.len());
    bytes.extend_from_slice(dir);
    bytes.push(b'/');
    bytes.extend_from_slice(command.as_bytes());
    PathBuf::from(OsString::from_vec(bytes))
}

/// Whether the current user may execute `path`, as reported by `access(2)`.
pub fn is_executable(path: &Path) -> bool {
    match CString::new(path.as_os_str().as_bytes()) {
        // SAFETY: `c_path` is a valid NUL-terminated string for the duration of the call.
        Ok(c_path) => unsafe { libc::access(c_path.as_ptr(), libc::X_OK) == 0 },
        Err(_) => false,
    }
}
