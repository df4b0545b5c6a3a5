use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use mzpicker::pools::PoolDefinitions;
use mzpicker::{PickerConfig, PickerConfigBuilder, PickerError, Tolerance};

/// Sum MS1 intensity for target masses from a scan log on STDIN and append one row
/// per mass to a results file
#[derive(Parser, Debug)]
#[command(version)]
struct App {
    /// The results file to append to. Created if it does not exist.
    results_file: PathBuf,

    /// The label written as the first column of every row
    well_identifier: String,

    /// The mass tolerance, in ppm unless --da is given
    tolerance: f64,

    /// The target masses, in output order
    #[arg(allow_negative_numbers = true)]
    masses: Vec<f64>,

    /// Interpret the tolerance as an absolute width in Daltons
    #[arg(long)]
    da: bool,

    /// Fail if a scan falls past this many time buckets instead of growing the table
    #[arg(long)]
    max_buckets: Option<usize>,

    /// Write a header line if the results file is empty
    #[arg(long)]
    header: bool,

    /// A pool definition file (pool,mass rows); masses of the pool named in the
    /// well identifier are added after the positional masses
    #[arg(long)]
    pools: Option<PathBuf>,
}

impl App {
    fn into_config(self) -> Result<PickerConfig, PickerError> {
        let tolerance = if self.da {
            Tolerance::Da(self.tolerance)
        } else {
            Tolerance::PPM(self.tolerance)
        };

        let mut builder = PickerConfigBuilder::new();
        builder
            .results_path(self.results_file)
            .tolerance(tolerance)
            .target_masses(self.masses)
            .bucket_capacity(self.max_buckets)
            .write_header(self.header);

        if let Some(path) = self.pools {
            let definitions = PoolDefinitions::from_path(&path)?;
            let pool = definitions.pool_for_well(&self.well_identifier)?;
            info!(
                "Using {} masses from pool {} in {}",
                pool.masses.len(),
                pool.name,
                path.display()
            );
            builder.target_masses(pool.masses.iter().copied());
        }

        builder.well_identifier(self.well_identifier);
        Ok(builder.build())
    }
}

fn run(app: App) -> Result<(), PickerError> {
    let config = app.into_config()?;
    eprintln!("Tol={} {}", config.tolerance.value(), config.tolerance.unit());

    let stdin = io::stdin();
    let stats = mzpicker::run(&config, stdin.lock())?;
    if stats.malformed > 0 {
        info!("Skipped {} malformed MS1 records", stats.malformed);
    }
    Ok(())
}

fn main() -> ExitCode {
    pretty_env_logger::init();
    let app = App::parse();
    match run(app) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
