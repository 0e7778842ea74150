use crate::builtin;
use crate::env::Environment;
use crate::launch::{self, EXEC_FAILURE_STATUS, ExitOutcome, LaunchError};
use crate::resolve::{self, ResolveError};
use crate::tokenizer;
use anyhow::{Context, Result};
use log::debug;
use std::io::{BufRead, Write};
use std::os::unix::ffi::OsStrExt;

/// Prompt written before each line when reading from a terminal.
pub const PROMPT: &str = ":) ";

/// Status recorded for a command that could not be resolved.
pub const NOT_FOUND_STATUS: i32 = 127;

/// What the loop does after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// A minimal command interpreter.
///
/// The interpreter owns a read-only [`Environment`] snapshot and the status of
/// the most recently completed command. Every line is tokenized, matched against
/// the built-ins (`exit`, `env`) and otherwise resolved through `PATH` and run
/// as a child process.
///
/// Example
/// ```
/// use hsh::{ExitOutcome, Interpreter};
/// use hsh::env::Environment;
/// use std::io::Cursor;
///
/// let mut sh = Interpreter::new(Environment::from_pairs([("PATH", "/bin:/usr/bin")]), "hsh");
/// let (mut out, mut err) = (Vec::new(), Vec::new());
/// let status = sh.run(Cursor::new("nosuchcommand\n"), &mut out, &mut err, false).unwrap();
/// assert_eq!(status, ExitOutcome::Exited(127));
/// assert_eq!(String::from_utf8(err).unwrap(), "hsh: 1: nosuchcommand: not found\n");
/// ```
pub struct Interpreter {
    env: Environment,
    program_name: String,
    last_status: ExitOutcome,
}

impl Interpreter {
    /// Create an interpreter. `program_name` prefixes diagnostics.
    pub fn new(env: Environment, program_name: impl Into<String>) -> Self {
        Self {
            env,
            program_name: program_name.into(),
            last_status: ExitOutcome::SUCCESS,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Status of the most recently completed command, `Exited(0)` initially.
    pub fn last_status(&self) -> ExitOutcome {
        self.last_status
    }

    /// Read and execute lines from `input` until end of input or `exit`.
    ///
    /// Returns the last recorded status. The prompt is written to `stdout`
    /// before every read when `interactive` is set.
    pub fn run<R: BufRead, O: Write, E: Write>(
        &mut self,
        mut input: R,
        mut stdout: O,
        mut stderr: E,
        interactive: bool,
    ) -> Result<ExitOutcome> {
        let mut buf = Vec::new();
        loop {
            if interactive {
                stdout.write_all(PROMPT.as_bytes())?;
                stdout.flush()?;
            }

            buf.clear();
            let read = input
                .read_until(b'\n', &mut buf)
                .context("failed to read command line")?;
            if read == 0 {
                break;
            }
            if buf.last() == Some(&b'\n') {
                buf.pop();
            }

            if self.execute_line(&buf, &mut stdout, &mut stderr)? == Flow::Exit {
                break;
            }
        }
        Ok(self.last_status)
    }

    /// Handle a single line, given as raw bytes without its trailing newline.
    ///
    /// Unknown commands and launch failures are reported on `stderr` and never
    /// returned as errors; only failing writes to the output streams are.
    pub fn execute_line(
        &mut self,
        line: &[u8],
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<Flow> {
        let args = tokenizer::split_into_tokens(line);
        let Some(name) = args.first() else {
            return Ok(Flow::Continue);
        };
        debug!("tokens: {:?}", args);

        if let Some(cmd) = builtin::lookup(name) {
            return cmd.execute(&args[1..], stdout, &self.env);
        }

        let path = match resolve::resolve(name, &self.env) {
            Ok(path) => path,
            Err(ResolveError::NotFound(name)) => {
                write!(stderr, "{}: 1: ", self.program_name)?;
                stderr.write_all(name.as_bytes())?;
                stderr.write_all(b": not found\n")?;
                self.last_status = ExitOutcome::Exited(NOT_FOUND_STATUS);
                return Ok(Flow::Continue);
            }
        };

        let mut argv = args;
        argv[0] = path.clone().into_os_string();

        // The child writes to the same descriptors; keep our output ordered before it.
        stdout.flush()?;
        let result = launch::launch(&path, &argv, &self.env);
        self.record_launch(result, stderr)?;
        Ok(Flow::Continue)
    }

    /// Update the last status from a launch attempt.
    ///
    /// A child that could not be created leaves the status untouched; an
    /// executable that could not be loaded counts as a failed command.
    fn record_launch(
        &mut self,
        result: Result<ExitOutcome, LaunchError>,
        stderr: &mut dyn Write,
    ) -> Result<()> {
        match result {
            Ok(outcome) => self.last_status = outcome,
            Err(err @ LaunchError::Exec(_)) => {
                writeln!(stderr, "{}: {}", self.program_name, err.os_message())?;
                self.last_status = ExitOutcome::Exited(EXEC_FAILURE_STATUS);
            }
            Err(err @ LaunchError::Spawn(_)) => {
                writeln!(stderr, "{}: fork: {}", self.program_name, err.os_message())?;
            }
        }
        Ok(())
    }
}
