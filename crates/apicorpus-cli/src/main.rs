use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

mod args;
mod cmd;
mod config;
mod io;
mod logging;
mod output;
mod pipeline;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = args::Cli::parse();
    logging::init(cli.log_json);
    output::init(cli.json);

    let code = cmd::dispatch(cli).await?;
    Ok(ExitCode::from(code))
}
