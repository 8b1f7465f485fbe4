use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use shapedetector::command::{self, EXIT_COMMAND};
use shapedetector::frame::load_image;
use shapedetector::report;
use shapedetector::{DetectionCycle, DetectorConfig, ShapeDetector};

#[derive(Parser)]
#[command(name = "shapedetector")]
#[command(about = "Find colored shapes in an image, e.g. \"vierkant rood\"")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// File with one command per line; interactive when omitted
    #[arg(value_name = "BATCHFILE")]
    batch_file: Option<PathBuf>,

    /// JSON detector configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Save the annotated image and mask of every command here
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => DetectorConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DetectorConfig::default(),
    };

    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if let Some(batch) = &args.batch_file {
        if !batch.exists() {
            anyhow::bail!("Batch file does not exist: {}", batch.display());
        }
    }

    tracing::info!("Loading image: {}", args.image_path.display());
    let image = load_image(&args.image_path)?;
    tracing::info!("Image loaded: {}x{}", image.width(), image.height());

    let mut detector = ShapeDetector::new(config)?;
    if let Some(debug_dir) = &args.debug_out {
        detector = detector.with_debug(debug_dir)?;
    }
    if let Some(dir) = &args.output {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    let mut handled = 0;
    // a failing command is reported and the session goes on
    let mut run = |line: &str| {
        let outcome = detector.handle_command(&image, line).and_then(|cycle| {
            handled += 1;
            show(&cycle, args.json)?;
            match &args.output {
                Some(dir) => save_outputs(dir, handled, &cycle),
                None => Ok(()),
            }
        });
        if let Err(e) = outcome {
            tracing::error!("\"{}\" failed: {:#}", line, e);
        }
    };

    match &args.batch_file {
        Some(batch) => {
            for line in command::read_batch_file(batch)? {
                run(&line);
            }
        }
        None => {
            println!("Enter a command like \"vierkant rood\", or \"{}\" to quit", EXIT_COMMAND);
            let stdin = io::stdin();
            loop {
                print!("> ");
                io::stdout().flush()?;

                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 {
                    break;
                }
                let line = line.trim_end_matches(['\n', '\r']);
                if line == EXIT_COMMAND {
                    break;
                }
                if line.trim().is_empty() {
                    continue;
                }
                run(line);
            }
        }
    }

    Ok(())
}

fn show(cycle: &DetectionCycle, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", report::cycle_json(cycle)?);
    } else {
        report::print_detection_data(cycle);
    }
    Ok(())
}

fn save_outputs(dir: &Path, index: usize, cycle: &DetectionCycle) -> anyhow::Result<()> {
    let annotated = dir.join(format!("{:02}_annotated.png", index));
    cycle
        .annotated
        .save(&annotated)
        .with_context(|| format!("Failed to save {}", annotated.display()))?;

    let mask = dir.join(format!("{:02}_mask.png", index));
    cycle
        .mask
        .save(&mask)
        .with_context(|| format!("Failed to save {}", mask.display()))?;

    tracing::debug!("saved {} and {}", annotated.display(), mask.display());
    Ok(())
}
