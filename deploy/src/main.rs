mod artifact;
mod command_line;
mod config;
mod deploy;
mod deployer;
mod error;
mod runner;
mod utils;

use std::process::ExitCode;

use clap::Parser;
use command_line::CommandLine;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cmd = CommandLine::parse();
    ExitCode::from(cmd.execute().await)
}
