//! Running resolved executables as child processes.

use crate::env::Environment;
use log::{debug, warn};
use std::ffi::OsString;
use std::io;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;

/// Status recorded when the executable could not be loaded into the child.
pub const EXEC_FAILURE_STATUS: i32 = libc::EXIT_FAILURE;

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Normal termination with an exit code in `0..=255`.
    Exited(i32),
    /// Abnormal termination. `raw` is the undecoded wait status.
    Signaled { signal: i32, raw: i32 },
}

impl ExitOutcome {
    pub const SUCCESS: ExitOutcome = ExitOutcome::Exited(0);

    /// The value the interpreter reports as its own exit status: the exit code
    /// for a normal termination, the raw wait status otherwise.
    pub fn exit_code(self) -> i32 {
        match self {
            ExitOutcome::Exited(code) => code,
            ExitOutcome::Signaled { raw, .. } => raw,
        }
    }

    pub fn success(self) -> bool {
        self == ExitOutcome::SUCCESS
    }
}

impl Default for ExitOutcome {
    fn default() -> Self {
        ExitOutcome::SUCCESS
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => ExitOutcome::Exited(code),
            (None, Some(signal)) => ExitOutcome::Signaled {
                signal,
                raw: status.into_raw(),
            },
            // Stopped or continued children are not reported by a blocking wait.
            (None, None) => ExitOutcome::Exited(status.into_raw()),
        }
    }
}

#[derive(Debug, Error)]
pub enum LaunchError {
    /// The child process could not be created at all.
    #[error("{0}")]
    Spawn(#[source] io::Error),
    /// The child was created but the executable could not be loaded into it.
    #[error("{0}")]
    Exec(#[source] io::Error),
}

impl LaunchError {
    fn classify(err: io::Error) -> Self {
        match err.raw_os_error() {
            Some(libc::EAGAIN) | Some(libc::ENOMEM) => LaunchError::Spawn(err),
            _ => LaunchError::Exec(err),
        }
    }

    /// The operating system's description of the failure, without the
    /// `(os error N)` suffix `io::Error` adds, e.g. "Permission denied".
    pub fn os_message(&self) -> String {
        let (LaunchError::Spawn(err) | LaunchError::Exec(err)) = self;
        let text = err.to_string();
        match text.rsplit_once(" (os error ") {
            Some((message, _)) if err.raw_os_error().is_some() => message.to_owned(),
            _ => text,
        }
    }
}

/// Run `path` with `args` as its complete argument vector and wait for it.
///
/// `args[0]` is passed to the child as its program name and the remaining
/// elements as its arguments. The child sees exactly the entries of `env` and
/// shares the interpreter's standard streams.
pub fn launch(
    path: &Path,
    args: &[OsString],
    env: &Environment,
) -> Result<ExitOutcome, LaunchError> {
    let mut cmd = Command::new(path);
    if let Some((arg0, rest)) = args.split_first() {
        cmd.arg0(arg0).args(rest);
    }
    cmd.env_clear()
        .envs(env.entries())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let mut child = cmd.spawn().map_err(|e| {
        warn!("failed to start {}: {}", path.display(), e);
        LaunchError::classify(e)
    })?;
    debug!("started {} as pid {}", path.display(), child.id());

    let status = child.wait().map_err(LaunchError::Spawn)?;
    let outcome = ExitOutcome::from(status);
    debug!("pid {} finished: {:?}", child.id(), outcome);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    fn sh(script: &str) -> Vec<OsString> {
        argv(&["/bin/sh", "-c", script])
    }

    fn run_sh(script: &str, env: &Environment) -> ExitOutcome {
        launch(Path::new("/bin/sh"), &sh(script), env).expect("launch /bin/sh")
    }

    #[test]
    fn test_exit_codes_round_trip() {
        let env = Environment::default();
        assert_eq!(run_sh("exit 0", &env), ExitOutcome::Exited(0));
        assert_eq!(run_sh("exit 3", &env), ExitOutcome::Exited(3));
        assert_eq!(run_sh("exit 255", &env), ExitOutcome::Exited(255));
    }

    #[test]
    fn test_signal_termination() {
        let outcome = run_sh("kill -9 $$", &Environment::default());
        match outcome {
            ExitOutcome::Signaled { signal, raw } => {
                assert_eq!(signal, libc::SIGKILL);
                assert_eq!(raw, libc::SIGKILL);
                assert_eq!(outcome.exit_code(), libc::SIGKILL);
            }
            other => panic!("expected a signal, got {:?}", other),
        }
    }

    #[test]
    fn test_child_sees_exact_environment() {
        let env = Environment::from_pairs([("HSH_TEST_VALUE", "42")]);
        assert_eq!(
            run_sh("test \"$HSH_TEST_VALUE\" = 42 && test -z \"$HOME\"", &env),
            ExitOutcome::SUCCESS
        );
    }

    #[test]
    fn test_arg0_is_passed_through() {
        let args = argv(&[
            "/bin/sh",
            "-c",
            "test \"$0\" = first && test \"$1\" = second",
            "first",
            "second",
        ]);
        let outcome = launch(Path::new("/bin/sh"), &args, &Environment::default()).expect("launch");
        assert!(outcome.success());
    }

    #[test]
    fn test_unloadable_executable_is_exec_error() {
        let dir = std::env::temp_dir();
        // A directory passes access(X_OK) but can never be executed.
        let err = launch(&dir, &[dir.clone().into_os_string()], &Environment::default())
            .expect_err("directories cannot be executed");
        assert!(matches!(err, LaunchError::Exec(_)), "got {:?}", err);
        assert_eq!(err.os_message(), "Permission denied");
    }

    #[test]
    fn test_non_utf8_arguments_pass_through() {
        use std::os::unix::ffi::OsStringExt;

        let mut args = sh("test \"$0\" = \"$(printf '\\377')\"");
        args.push(OsString::from_vec(vec![0xff]));
        let outcome = launch(Path::new("/bin/sh"), &args, &Environment::default()).expect("launch");
        assert!(outcome.success());
    }

    #[test]
    fn test_resource_exhaustion_is_spawn_error() {
        for errno in [libc::EAGAIN, libc::ENOMEM] {
            let err = LaunchError::classify(io::Error::from_raw_os_error(errno));
            assert!(matches!(err, LaunchError::Spawn(_)), "errno {errno}: {err:?}");
        }
        for errno in [libc::ENOENT, libc::EACCES, libc::ENOEXEC] {
            let err = LaunchError::classify(io::Error::from_raw_os_error(errno));
            assert!(matches!(err, LaunchError::Exec(_)), "errno {errno}: {err:?}");
        }
    }

    #[test]
    fn test_os_message_drops_error_code() {
        let err = LaunchError::Exec(io::Error::from_raw_os_error(libc::ENOENT));
        assert_eq!(err.os_message(), "No such file or directory");

        let err = LaunchError::Spawn(io::Error::other("custom failure"));
        assert_eq!(err.os_message(), "custom failure");
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(ExitOutcome::default().exit_code(), 0);
        assert_eq!(ExitOutcome::Exited(127).exit_code(), 127);
        assert_eq!(ExitOutcome::Signaled { signal: 15, raw: 15 }.exit_code(), 15);
        assert!(!ExitOutcome::Exited(1).success());
    }
}
