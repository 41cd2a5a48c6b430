#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use std::io::{self, Write};

use clap::Parser;
use config::{CliArgs, Command, Config};
use seedflake::{FlakeClient, FlakeConfig, SystemClock, ThreadSleep, random_in_range};
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    init_telemetry()?;

    let args = CliArgs::parse();
    let config = Config::try_from(args)?;

    let mut out = io::stdout().lock();
    run(&config, &mut out)?;
    out.flush()?;
    Ok(())
}

fn run(config: &Config, out: &mut impl Write) -> anyhow::Result<()> {
    let flake = config.flake;
    match config.command {
        Command::Generate { count, json } => {
            let mut client = client(&flake)?;
            for _ in 0..count {
                let id = client.generate()?;
                if json {
                    serde_json::to_writer(&mut *out, &id)?;
                    writeln!(out)?;
                } else {
                    writeln!(out, "{id}")?;
                }
            }
        }
        Command::Decode { id, unit, fields } => {
            if fields {
                let decoded = flake.layout().decode(flake.epoch(), id);
                serde_json::to_writer(&mut *out, &decoded)?;
                writeln!(out)?;
            } else {
                let timestamp = flake.layout().decode_timestamp(flake.epoch(), id, unit);
                writeln!(out, "{timestamp}")?;
            }
        }
        Command::Seed { bits } => {
            writeln!(out, "{}", random_in_range(bits)?)?;
        }
        Command::Info { count } => {
            let mut client = client(&flake)?;
            for _ in 0..count {
                client.generate()?;
            }
            serde_json::to_writer_pretty(&mut *out, &client.info())?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn client(flake: &FlakeConfig) -> anyhow::Result<FlakeClient<SystemClock, ThreadSleep>> {
    let mut client =
        FlakeClient::with_sources(flake.epoch(), flake.layout(), SystemClock, ThreadSleep);
    client.create_generator(flake.worker_id(), flake.seed())?;
    tracing::info!(
        worker_id = flake.worker_id(),
        seed = flake.seed(),
        epoch = flake.epoch(),
        "generator ready"
    );
    Ok(client)
}
