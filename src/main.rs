use anyhow::Result;
use clap::{Parser, error::ErrorKind};
use extra_aliases::{Config, ExtraAliases, Logger};
use log::Level;
use std::process::exit;

pub fn main() {
    if let Err(e) = run() {
        eprintln!(
            "{}",
            Logger::format(
                Level::Error,
                &e.chain()
                    .map(|x| x.to_string())
                    .collect::<Vec<_>>()
                    .join(": ")
            )
        );
        exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments, a missing USER exits with 1 like every other error
    let config = match Config::try_parse() {
        Ok(config) => config,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            e.print()?;
            exit(1);
        }
    };

    ExtraAliases::start(config)
}
