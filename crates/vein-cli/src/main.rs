use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::info;
use vein_binarize::{BinarizeResult, Pipeline, PipelineConfig, read_input, write_output};

/// Binarize a finger-vein image into a 0/255 ridge map
#[derive(Parser, Debug)]
#[command(name = "vein-binarize", version, long_about = None)]
struct Args {
    /// Input image (PNG, JPEG, BMP or PNM)
    #[arg(short, long, required_unless_present = "dump_config")]
    input: Option<PathBuf>,

    /// Output image; the format follows the extension
    #[arg(short, long, required_unless_present = "dump_config")]
    output: Option<PathBuf>,

    /// JSON configuration; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long, default_value_t = false)]
    dump_config: bool,

    /// Also write every intermediate stage as PNG into this directory
    #[arg(long)]
    stages: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn load_config(path: Option<&Path>) -> BinarizeResult<PipelineConfig> {
    match path {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            PipelineConfig::from_json_file(path)
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn run(args: &Args) -> BinarizeResult<()> {
    let config = load_config(args.config.as_deref())?;
    if args.dump_config {
        config.validate()?;
        println!("{}", config.to_json()?);
        return Ok(());
    }

    // clap guarantees both paths when --dump-config is absent
    let (Some(input), Some(output)) = (args.input.as_deref(), args.output.as_deref()) else {
        return Ok(());
    };

    let pipeline = Pipeline::new(config)?;
    let pix = read_input(input)?;

    match &args.stages {
        Some(dir) => {
            let stages = pipeline.run_with_stages(&pix)?;
            for (i, (stage, image)) in stages.iter().enumerate() {
                write_output(image, &dir.join(format!("{:02}_{}.png", i, stage)))?;
            }
            info!("wrote stage images to {}", dir.display());
            write_output(&stages.cleaned, output)
        }
        None => write_output(&pipeline.run(&pix)?, output),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // RUST_LOG wins unless -v is given
    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    } else if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(log::LevelFilter::Info);
    }
    logger.init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
