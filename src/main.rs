use argh::FromArgs;
use hsh::Interpreter;
use hsh::env::Environment;
use std::io::{self, IsTerminal};

#[derive(FromArgs)]
/// Read commands from standard input, one per line, and run them.
/// Exits with the status of the last command.
struct Args {
    #[argh(option, short = 'n')]
    /// program name used in diagnostics; defaults to argv[0].
    name: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Args = argh::from_env();
    let program_name = args
        .name
        .or_else(|| std::env::args().next())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_owned());

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut sh = Interpreter::new(Environment::capture(), program_name);
    let status = sh.run(stdin.lock(), io::stdout(), io::stderr(), interactive)?;

    log::debug!("exiting with {:?}", status);
    std::process::exit(status.exit_code())
}
