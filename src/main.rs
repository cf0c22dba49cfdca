use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use china_division::{DataConfig, Division, ResolveOptions, UNKNOWN_PLACEHOLDER};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "division",
    about = "Chinese administrative division and resident ID lookups"
)]
struct Cli {
    /// Directory holding data.json / history.json / diff.json
    /// (defaults to $CHINA_DIVISION_DATA_DIR, then the bundled data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct AddressArgs {
    /// Leave the city empty instead of "市辖区" for municipalities
    #[arg(long)]
    no_direct_units: bool,
    /// Text for components that cannot be resolved
    #[arg(long, default_value = UNKNOWN_PLACEHOLDER)]
    unknown: String,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the issuing area of an ID number
    Address {
        id_number: String,
        #[command(flatten)]
        opts: AddressArgs,
        /// Do not require the 18-character pattern
        #[arg(long)]
        skip_validation: bool,
    },
    /// Resolve a bare 6-digit division code, e.g. "110101"
    Code {
        code: String,
        #[command(flatten)]
        opts: AddressArgs,
    },
    /// Check an ID number's checksum; exits 1 when invalid
    Validate { id_number: String },
    /// Gender encoded in an ID number
    Gender { id_number: String },
    /// Birthdate encoded in an ID number
    Birthdate { id_number: String },
    /// Everything derivable from an ID number
    Inspect { id_number: String },
    /// Three-level division map with parent codes
    Levels,
    /// Province → city → area tree
    Cascader,
    /// Print a raw dataset
    Dump {
        #[arg(value_enum)]
        dataset: Dataset,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Dataset {
    Current,
    History,
    Diff,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match cli.data_dir {
        Some(dir) => DataConfig::with_dir(dir),
        None => DataConfig::from_env(),
    };
    tracing::debug!(data_dir = %config.data_dir.display(), "using division datasets");
    let division = Division::new(config);

    match cli.command {
        Command::Address {
            id_number,
            opts,
            skip_validation,
        } => {
            let opts = ResolveOptions {
                skip_validation,
                ..resolve_options(opts)
            };
            print_json(&division.resolve_address(&id_number, &opts)?)?;
        }
        Command::Code { code, opts } => {
            print_json(&division.resolve_code(&code, &resolve_options(opts))?)?;
        }
        Command::Validate { id_number } => {
            let valid = division.validate_id_number(&id_number);
            println!("{valid}");
            if !valid {
                return Ok(ExitCode::from(1));
            }
        }
        Command::Gender { id_number } => print_json(&division.gender_from_id(&id_number))?,
        Command::Birthdate { id_number } => print_json(&division.birthdate_from_id(&id_number))?,
        Command::Inspect { id_number } => {
            print_json(&division.inspect(&id_number, &ResolveOptions::default())?)?;
        }
        Command::Levels => print_json(&division.city_levels()?)?,
        Command::Cascader => print_json(&division.cascader_tree()?)?,
        Command::Dump { dataset } => match dataset {
            Dataset::Current => print_json(division.current_divisions()?)?,
            Dataset::History => print_json(division.historical_divisions()?)?,
            Dataset::Diff => print_json(division.diffs()?)?,
        },
    }

    Ok(ExitCode::SUCCESS)
}

// ═══════════════════════════════════════════════════════════════════════
//  OUTPUT HELPERS
// ═══════════════════════════════════════════════════════════════════════

fn resolve_options(args: AddressArgs) -> ResolveOptions {
    ResolveOptions {
        include_direct_units: !args.no_direct_units,
        unknown: args.unknown,
        ..ResolveOptions::default()
    }
}

fn print_json<T: serde::Serialize + ?Sized>(data: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(data).context("JSON serialization failed")?;
    println!("{json}");
    Ok(())
}
