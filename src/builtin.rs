use crate::env::Environment;
use crate::interpreter::Flow;
use anyhow::Result;
use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::os::unix::ffi::OsStrExt;

/// Commands interpreted directly by the loop instead of being resolved.
///
/// Built-ins never change the last recorded status.
pub(crate) trait BuiltinCommand {
    /// Name the first word of a line must match exactly, e.g. "exit".
    fn name(&self) -> &'static str;

    /// Executes the command. Arguments after the name are ignored by every
    /// built-in the interpreter knows.
    fn execute(
        &self,
        args: &[OsString],
        stdout: &mut dyn Write,
        env: &Environment,
    ) -> Result<Flow>;
}

/// Terminate the loop with the current last status.
pub(crate) struct Exit;

impl BuiltinCommand for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn execute(
        &self,
        _args: &[OsString],
        _stdout: &mut dyn Write,
        _env: &Environment,
    ) -> Result<Flow> {
        Ok(Flow::Exit)
    }
}

/// Print every environment entry as `NAME=VALUE`, one per line.
pub(crate) struct Env;

impl BuiltinCommand for Env {
    fn name(&self) -> &'static str {
        "env"
    }

    fn execute(
        &self,
        _args: &[OsString],
        stdout: &mut dyn Write,
        env: &Environment,
    ) -> Result<Flow> {
        for (name, value) in env.entries() {
            stdout.write_all(name.as_bytes())?;
            stdout.write_all(b"=")?;
            stdout.write_all(value.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
        stdout.flush()?;
        Ok(Flow::Continue)
    }
}

const BUILTINS: [&dyn BuiltinCommand; 2] = [&Exit, &Env];

/// Find the built-in called `name`, if any.
pub(crate) fn lookup(name: &OsStr) -> Option<&'static dyn BuiltinCommand> {
    BUILTINS.into_iter().find(|b| name == b.name())
}
