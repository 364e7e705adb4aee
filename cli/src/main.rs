mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, check};
use netprobe_common::config::Config;
use netprobe_common::network::target::Target;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let commands = CommandLine::parse_args();

    if commands.no_color {
        colored::control::set_override(false);
    }
    logging::init(commands.verbose, commands.quiet);

    let target = Target::new(commands.host, commands.url)?;
    let cfg = Config::new(target, commands.timeout)?;

    print::header("network path check", commands.quiet);
    Ok(check::check(cfg, commands.quiet).await)
}
