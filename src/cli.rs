use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    process,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use geobatch_application::prelude::*;
use geobatch_core::{
    entities::{Crs, GeoPoint},
    rate_limit::RateLimiter,
    resolver::{RateLimitedResolver, ResolutionOutcome},
    usecases::BatchReport,
};

use crate::{config::Config, gateways};

/// Batch geocoding of address tables.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file [default: geobatch.toml]
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolves a single address.
    Forward { address: String },
    /// Resolves the address of a single position.
    Reverse {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },
    /// Geocodes all rows of a CSV file.
    Batch {
        #[arg(short, long)]
        input: PathBuf,
        /// Output file [default: stdout]
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format: csv or geojson
        #[arg(short, long, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
        /// CRS of the output geometries, e.g. EPSG:4326
        #[arg(long)]
        crs: Option<Crs>,
        /// Abort on the first row that cannot be geocoded
        #[arg(long)]
        fail_fast: bool,
        /// Column that identifies a row
        #[arg(long)]
        key_column: Option<String>,
    },
    /// Resolves the address of all positions in a CSV file.
    ReverseBatch {
        #[arg(short, long)]
        input: PathBuf,
        /// Output file [default: stdout]
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = "latitude")]
        lat_column: String,
        #[arg(long, default_value = "longitude")]
        lon_column: String,
        /// Abort on the first position that cannot be resolved
        #[arg(long)]
        fail_fast: bool,
        /// Column that identifies a row
        #[arg(long)]
        key_column: Option<String>,
    },
}

fn output_writer(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    Ok(writer)
}

/// Exit code of a process terminated by SIGINT.
const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Returns a flag that is set on the first Ctrl-C.
///
/// The batch then stops after the current record and writes
/// what has been processed so far. A second Ctrl-C terminates
/// the process immediately.
fn cancel_on_ctrl_c() -> Result<Arc<AtomicBool>> {
    let cancel = Arc::new(AtomicBool::new(false));
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let flag = Arc::clone(&cancel);
    thread::Builder::new()
        .name("ctrl-c".to_owned())
        .spawn(move || {
            runtime.block_on(async {
                if tokio::signal::ctrl_c().await.is_err() {
                    log::warn!("Unable to listen for Ctrl-C");
                    return;
                }
                log::warn!("Interrupted: stopping after the current record");
                flag.store(true, Ordering::Relaxed);
                if tokio::signal::ctrl_c().await.is_ok() {
                    process::exit(EXIT_CODE_INTERRUPTED);
                }
            });
        })?;
    Ok(cancel)
}

fn print_report(report: &BatchReport) {
    eprintln!("{report}");
    if report.cancelled {
        eprintln!("The batch has been cancelled");
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let cfg = Config::try_load_from_file_or_default(cli.config.as_ref())?;
    let gateway = gateways::geocoding_gateway(&cfg.geocoding.gateway)?;
    let resolver = RateLimitedResolver::new(gateway, RateLimiter::shared(cfg.geocoding.min_delay));

    match cli.command {
        Commands::Forward { address } => match resolver.resolve_match(&address) {
            ResolutionOutcome::Found(found) => {
                println!("{}", found.point);
                if let Some(address) = found.address {
                    println!("{address}");
                }
            }
            ResolutionOutcome::NotFound => {
                eprintln!("No match for '{address}'");
            }
            ResolutionOutcome::Failed(err) => return Err(err.into()),
        },
        Commands::Reverse {
            latitude,
            longitude,
        } => {
            let pos = GeoPoint::try_new(latitude, longitude, None)?;
            match resolver.reverse_resolve(&pos) {
                ResolutionOutcome::Found(address) => println!("{address}"),
                ResolutionOutcome::NotFound => eprintln!("No match for {pos}"),
                ResolutionOutcome::Failed(err) => return Err(err.into()),
            }
        }
        Commands::Batch {
            input,
            output,
            format,
            crs,
            fail_fast,
            key_column,
        } => {
            let mut options = cfg.batch.options();
            options.cancel = Some(cancel_on_ctrl_c()?);
            if let Some(crs) = crs {
                options.crs = crs;
            }
            options.fail_fast |= fail_fast;
            let key_column = key_column.or(cfg.address.key_column.clone());
            log::info!("Geocoding {}", input.display());
            let report = geocode_csv(
                BufReader::new(File::open(&input)?),
                output_writer(output.as_deref())?,
                &cfg.address.normalizer(),
                &resolver,
                key_column.as_deref(),
                format,
                &options,
            )?;
            print_report(&report);
        }
        Commands::ReverseBatch {
            input,
            output,
            lat_column,
            lon_column,
            fail_fast,
            key_column,
        } => {
            let mut options = cfg.batch.options();
            options.cancel = Some(cancel_on_ctrl_c()?);
            options.fail_fast |= fail_fast;
            let columns = PositionColumns {
                latitude: lat_column,
                longitude: lon_column,
            };
            let key_column = key_column.or(cfg.address.key_column.clone());
            log::info!("Reverse geocoding {}", input.display());
            let report = reverse_geocode_csv(
                BufReader::new(File::open(&input)?),
                output_writer(output.as_deref())?,
                &resolver,
                &columns,
                key_column.as_deref(),
                &options,
            )?;
            print_report(&report);
        }
    }
    Ok(())
}
