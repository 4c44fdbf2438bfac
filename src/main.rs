mod cli;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::error;

use cli::{Args, Command};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(err) = args.subcommand.execute() {
        error!("{err:#}");
        std::process::exit(1);
    }
    Ok(())
}
