use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use rusty_hh::error::HHError;
use rusty_hh::output::{write_currents, write_raw, write_table};
use rusty_hh::simulation::{Simulation, SimulationConfig};
use rusty_hh::SPIKE_THRESHOLD;

#[derive(Parser, Debug)]
struct Args {
    /// A JSON simulation configuration; missing fields take their default value
    #[arg(long)]
    config: Option<String>,
    /// The sampling step of the time grid (ms), overrides the configuration
    #[arg(long)]
    dt: Option<f64>,
    /// The end of the time window (ms), overrides the configuration
    #[arg(long)]
    t_end: Option<f64>,
    /// The directory where run directories are created
    #[arg(long, default_value = "output")]
    output_dir: String,
    /// The log level, must be one of: off, error, warn, info, debug, trace
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(log_path: &Path, level: LevelFilter) -> Result<(), HHError> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{l} - {m}\n")))
        .build();
    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{l} - {m}\n")))
        .build(log_path)
        .map_err(|e| HHError::IOError(e.to_string()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(
            Root::builder()
                .appender("stdout")
                .appender("logfile")
                .build(level),
        )
        .map_err(|e| HHError::IOError(e.to_string()))?;

    log4rs::init_config(config).map_err(|e| HHError::IOError(e.to_string()))?;
    Ok(())
}

fn main() -> Result<(), HHError> {
    let args = Args::parse();
    let log_level = args
        .log_level
        .parse::<LevelFilter>()
        .map_err(|e| HHError::InvalidParameter(e.to_string()))?;

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load_from(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(dt) = args.dt {
        config.dt = dt;
    }
    if let Some(t_end) = args.t_end {
        config.t_end = t_end;
    }

    // identical configurations share the same run directory
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_string(&config)?);
    let hash = hasher.finalize();
    let run_dir = Path::new(&args.output_dir).join(format!("{:x}", hash));
    fs::create_dir_all(&run_dir)?;

    init_logging(&run_dir.join("run.log"), log_level)?;
    log::info!("{:?}", args);

    config.save_to(run_dir.join("config.json"))?;
    let simulation = Simulation::build(config)?;
    let trajectory = simulation.run()?;
    log::info!("Simulation: done!");

    let spikes = trajectory.upward_crossings(SPIKE_THRESHOLD);
    log::info!("{} action potentials at t={:?}", spikes.len(), spikes);

    write_raw(&trajectory, BufWriter::new(File::create(run_dir.join("trajectory.txt"))?))?;
    write_table(&trajectory, BufWriter::new(File::create(run_dir.join("param.tsv"))?))?;
    write_currents(
        &trajectory,
        simulation.model().constants(),
        simulation.model().stimulus(),
        BufWriter::new(File::create(run_dir.join("currents.tsv"))?),
    )?;
    trajectory.save_to(run_dir.join("trajectory.json"))?;
    log::info!("Outputs saved to {}", run_dir.display());

    Ok(())
}
