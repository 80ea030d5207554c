use anyhow::{bail, Result};
use harness::{ModuleRunner, TerminationReason};
use modules::emitter::Emitter;
use modules::tracker::Tracker;
use options::{Command, LogFormat, MainOptions};
use structopt::StructOpt;
use tracing::info;

mod options;

#[tokio::main]
async fn main() -> Result<()> {
    let (command, runner) = init()?;

    let termination_reason = match command {
        Command::Tracker(options) => runner.run(Tracker::new(options)).await,
        Command::Emit(options) => runner.run(Emitter::new(options)).await,
    };

    match termination_reason {
        TerminationReason::ExitedNormally | TerminationReason::HeartDied(_) => Ok(()),
        reason => bail!("module terminated abnormally: {:?}", reason),
    }
}

fn init() -> Result<(Command, ModuleRunner)> {
    let options = MainOptions::from_args();

    let formatter = tracing_subscriber::fmt().with_env_filter(options.log);

    match options.log_format {
        LogFormat::Text => formatter.init(),
        LogFormat::Compact => formatter.compact().init(),
        LogFormat::Json => formatter.json().init(),
    };

    let runner = match options.status_server {
        Some(port) => ModuleRunner::new_with_status_server(port),
        None => ModuleRunner::default(),
    };

    info!("LearnHub {}", env!("CARGO_PKG_VERSION"));

    Ok((options.command, runner))
}
