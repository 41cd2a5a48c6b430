use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use seedflake::{BitLayout, CUSTOM_EPOCH, FlakeConfig, TimeUnit, random_in_range};

/// Command-line configuration for the `seedflake` binary.
///
/// The generator options are global so they may appear before or after the
/// subcommand. Each also reads an environment variable, and a `.env` file in
/// the working directory is loaded before parsing.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "seedflake",
    version,
    about = "Generate and decode sortable 64-bit seedflake IDs"
)]
pub struct CliArgs {
    /// Milliseconds since the Unix epoch that timestamps are measured from.
    ///
    /// Must match across every process that decodes the same IDs.
    ///
    /// Environment variable: `SEEDFLAKE_EPOCH`
    #[arg(long, global = true, env = "SEEDFLAKE_EPOCH", default_value_t = CUSTOM_EPOCH)]
    pub epoch: u64,

    /// Worker ID embedded in every issued ID. Random when omitted.
    ///
    /// Environment variable: `SEEDFLAKE_WORKER_ID`
    #[arg(long, global = true, env = "SEEDFLAKE_WORKER_ID")]
    pub worker_id: Option<u64>,

    /// Seed embedded in every issued ID. Random when omitted.
    ///
    /// Environment variable: `SEEDFLAKE_SEED`
    #[arg(long, global = true, env = "SEEDFLAKE_SEED")]
    pub seed: Option<u64>,

    /// Width of the worker ID field.
    ///
    /// Environment variable: `SEEDFLAKE_WORKER_BITS`
    #[arg(long, global = true, env = "SEEDFLAKE_WORKER_BITS", default_value_t = 5)]
    pub worker_bits: u8,

    /// Width of the seed field.
    ///
    /// Environment variable: `SEEDFLAKE_SEED_BITS`
    #[arg(long, global = true, env = "SEEDFLAKE_SEED_BITS", default_value_t = 5)]
    pub seed_bits: u8,

    /// Width of the per-millisecond sequence field.
    ///
    /// Environment variable: `SEEDFLAKE_SEQUENCE_BITS`
    #[arg(long, global = true, env = "SEEDFLAKE_SEQUENCE_BITS", default_value_t = 12)]
    pub sequence_bits: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Issue new IDs, one per line.
    Generate {
        /// How many IDs to issue.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u64,

        /// Print each ID as a JSON object with its decoded fields.
        #[arg(long)]
        json: bool,
    },
    /// Recover the issuance time of an existing ID.
    Decode {
        /// The raw 64-bit ID.
        id: u64,

        /// `ms` for integral milliseconds, `s` for fractional seconds.
        #[arg(short, long, default_value_t = TimeUnit::Millis)]
        unit: TimeUnit,

        /// Print every field as JSON instead of only the timestamp.
        #[arg(long)]
        fields: bool,
    },
    /// Draw a random value suitable for a worker ID or seed.
    Seed {
        /// Width of the field the value must fit.
        #[arg(short, long, default_value_t = 5)]
        bits: u32,
    },
    /// Print client information as JSON.
    Info {
        /// IDs to issue before reporting.
        #[arg(short = 'n', long, default_value_t = 0)]
        count: u64,
    },
}

/// Validated configuration derived from [`CliArgs`].
#[derive(Debug, Clone)]
pub struct Config {
    pub flake: FlakeConfig,
    pub command: Command,
}

impl TryFrom<CliArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let layout = BitLayout::new(args.worker_bits, args.seed_bits, args.sequence_bits)
            .context("invalid bit layout")?;

        if let Command::Generate { count: 0, .. } = args.command {
            bail!("--count must be greater than 0");
        }

        let worker_id = match args.worker_id {
            Some(worker_id) => worker_id,
            None => random_field(layout.worker_bits()).context("drawing a worker ID")?,
        };
        let seed = match args.seed {
            Some(seed) => seed,
            None => random_field(layout.seed_bits()).context("drawing a seed")?,
        };

        let flake = FlakeConfig::new(args.epoch, worker_id, seed).with_layout(layout);
        if let Err(err) = flake.validate() {
            bail!(
                "{err} (layout: {} worker bits, {} seed bits, {} sequence bits)",
                layout.worker_bits(),
                layout.seed_bits(),
                layout.sequence_bits()
            );
        }

        tracing::debug!(?flake, "resolved generator config");

        Ok(Self {
            flake,
            command: args.command,
        })
    }
}

/// A random value for a field of `bits` width. A zero-width field only holds 0.
fn random_field(bits: u32) -> seedflake::Result<u64> {
    match bits {
        0 => Ok(0),
        bits => random_in_range(bits),
    }
}
