//! Run a neutrino detection simulation and write the event catalog to disk.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use detector::{
    AngularResolution, AngularSmearing, ConstantEffectiveArea, Detector, FixedAngularResolution,
    LogNormalEnergyResolution, TableFormat,
};
use simulator::{
    Catalog, CatalogFile, PointSourceThrowing, PowerLawFlux, RunConfig, RunMetadata, Simulator,
    Source, UniformExpectedCounts,
};
use skymath::Equatorial;

#[derive(Parser, Debug)]
#[command(author, version, about = "Simulate neutrino detection and write an event catalog")]
struct Args {
    /// Spectral index of the source power law
    #[arg(long, default_value_t = 2.0)]
    index: f64,

    /// Lower bound of the energy support in GeV
    #[arg(long, default_value_t = 1e2)]
    lower_energy: f64,

    /// Upper bound of the energy support in GeV
    #[arg(long, default_value_t = 1e8)]
    upper_energy: f64,

    /// Simulate a point source at this right ascension (degrees) instead of
    /// a diffuse source; requires --point-dec
    #[arg(long, requires = "point_dec")]
    point_ra: Option<f64>,

    /// Declination of the point source in degrees
    #[arg(long, requires = "point_ra")]
    point_dec: Option<f64>,

    /// Detector exposure in years
    #[arg(long, default_value_t = 1.0)]
    livetime: f64,

    /// Horizon cutoff on cos-zenith
    #[arg(long, default_value_t = 1.0)]
    max_cosz: f64,

    /// Expected events per livetime year for the demo exposure model
    #[arg(long, default_value_t = 100.0)]
    expected_events: f64,

    /// Flat detection probability of the demo effective-area model
    #[arg(long, default_value_t = 0.5)]
    acceptance: f64,

    /// Energy smearing width in decades
    #[arg(long, default_value_t = 0.3)]
    energy_sigma: f64,

    /// Angular-resolution table (R2018 layout); falls back to a fixed
    /// resolution when absent
    #[arg(long)]
    ang_res_table: Option<PathBuf>,

    /// Fixed angular resolution in degrees, used without --ang-res-table
    #[arg(long, default_value_t = 1.0)]
    fixed_ang_res: f64,

    /// Force the total event count instead of drawing it from a Poisson law
    #[arg(long)]
    n_events: Option<u64>,

    /// RNG seed for reproducible catalogs
    #[arg(long)]
    seed: Option<u64>,

    /// Throw point-source trials at the source position instead of
    /// uniformly over the sky
    #[arg(long, default_value_t = false)]
    fixed_direction_throwing: bool,

    /// Generate trials in parallel (no progress bar)
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Output catalog path
    #[arg(long, default_value = "catalog.json")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    if !(0.0..=1.0).contains(&args.acceptance) {
        bail!("--acceptance must lie in [0, 1], got {}", args.acceptance);
    }

    let flux = PowerLawFlux::new(args.index, args.lower_energy, args.upper_energy)
        .context("invalid source spectrum")?;

    let source = match (args.point_ra, args.point_dec) {
        (Some(ra), Some(dec)) => {
            Source::point("point", flux, Equatorial::from_degrees(ra, dec))
        }
        _ => Source::diffuse("diffuse", flux),
    };
    let sources = vec![source];

    let angular: Box<dyn AngularSmearing + Send + Sync> = match &args.ang_res_table {
        Some(path) => Box::new(
            AngularResolution::from_file(path, TableFormat::R2018)
                .with_context(|| format!("loading angular resolution table {}", path.display()))?,
        ),
        None => Box::new(
            FixedAngularResolution::new(args.fixed_ang_res)
                .context("invalid fixed angular resolution")?,
        ),
    };

    let detector = Detector::new(
        ConstantEffectiveArea::new(args.acceptance),
        LogNormalEnergyResolution::new(args.energy_sigma).context("invalid energy resolution")?,
        angular,
    );

    let calculator = UniformExpectedCounts::new(args.expected_events);

    let config = RunConfig {
        livetime_years: args.livetime,
        max_cos_zenith: args.max_cosz,
        seed: args.seed,
        point_source_throwing: if args.fixed_direction_throwing {
            PointSourceThrowing::FixedDirection
        } else {
            PointSourceThrowing::UniformSky
        },
        ..RunConfig::default()
    };

    let sim = Simulator::new(&sources, &detector, &calculator);

    let catalog: Catalog = if args.parallel {
        sim.run_parallel(&config, args.n_events)?
    } else {
        let bar = ProgressBar::new(args.n_events.unwrap_or(0));
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")
                .context("invalid progress template")?,
        );
        bar.set_message("Sampling");

        let catalog = sim.run_with_progress(&config, args.n_events, |done, total| {
            if bar.length() != Some(total) {
                bar.set_length(total);
            }
            bar.set_position(done);
        })?;
        bar.finish();
        catalog
    };

    info!(events = catalog.len(), "simulation finished");

    let metadata = RunMetadata {
        index: args.index,
        source_type: sources[0].source_type(),
        livetime_years: args.livetime,
        seed: args.seed,
    };

    CatalogFile::new(metadata, catalog)
        .save(&args.output)
        .with_context(|| format!("writing catalog to {}", args.output.display()))?;

    info!(path = %args.output.display(), "catalog written");
    Ok(())
}
