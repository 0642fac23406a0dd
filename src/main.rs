use clap::{Parser, Subcommand};
use grayflow::frame::Frame;
use grayflow::imaging::load_frame;
use grayflow::settings::{self, ReloadPolicy, Settings};
use grayflow::stream::OutputFormat;
use grayflow::{config, output, process};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let tag = env!("GRAYFLOW_RELEASE_TAG");
    if !tag.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GRAYFLOW_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "grayflow")]
#[command(about = "Hot-reconfigurable transform pipeline for grayscale frame streams")]
#[command(long_about = "\
Hot-reconfigurable transform pipeline for grayscale frame streams

Reads raw 8-bit frames (width*height bytes each, no header), runs every frame
through a fixed chain of stages and writes one binary PGM image per frame:

  FIR filter → median → zoom → brightness → flip → rotation

A six-line settings file controls the stages and is re-read whenever its
modification time changes, so the pipeline can be tuned while it runs:

  1     FIR filter (0/1)
  0     median filter (0/1)
  2     zoom factor (0 = off)
  -15   brightness delta
  0     horizontal flip (0/1)
  30    rotation in degrees

Write it with 'grayflow set', check it with 'grayflow inspect'.
Run 'grayflow gen-config' to generate a documented grayflow.toml.
Set RUST_LOG=debug for per-frame timings.")]
#[command(version = version_string())]
struct Cli {
    /// Run configuration file
    #[arg(long, default_value = "grayflow.toml", global = true)]
    config: PathBuf,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process a frame stream
    Run {
        /// Raw frame input, `-` for stdin
        #[arg(long, default_value = "-")]
        input: PathBuf,
        /// Frame output, `-` for stdout
        #[arg(long, default_value = "-")]
        output: PathBuf,
        /// Output framing
        #[arg(long, value_enum, default_value_t = OutputFormat::Pgm)]
        format: OutputFormat,
    },
    /// Update the settings file; unspecified fields keep their current value
    Set(SetArgs),
    /// Parse the settings file once and show the effective values
    Inspect {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Convert image files into raw input frames
    Import {
        /// Images to convert (JPEG, PNG, PGM/PNM, TIFF)
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Raw frame file to write
        #[arg(long)]
        output: PathBuf,
        /// Append to the output instead of replacing it
        #[arg(long)]
        append: bool,
    },
    /// List the built-in FIR kernels
    Kernels,
    /// Print a stock grayflow.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct SetArgs {
    /// FIR filter (0/1)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
    fir: Option<u8>,
    /// Median filter (0/1)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
    median: Option<u8>,
    /// Zoom factor, 0 = off
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=i64::from(i32::MAX)))]
    zoom: Option<u32>,
    /// Brightness delta
    #[arg(long, allow_negative_numbers = true)]
    brightness: Option<i32>,
    /// Horizontal flip (0/1)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
    flip: Option<u8>,
    /// Rotation in degrees
    #[arg(long, allow_negative_numbers = true)]
    rotation: Option<i32>,
}

impl SetArgs {
    fn apply(&self, base: Settings) -> Settings {
        Settings {
            fir: self.fir.map_or(base.fir, |v| v == 1),
            median: self.median.map_or(base.median, |v| v == 1),
            zoom: self.zoom.unwrap_or(base.zoom),
            brightness: self.brightness.unwrap_or(base.brightness),
            flip: self.flip.map_or(base.flip, |v| v == 1),
            rotation: self.rotation.unwrap_or(base.rotation),
        }
    }
}

/// JSON shape of `grayflow inspect --json`.
#[derive(Serialize)]
struct InspectReport<'a> {
    path: &'a Path,
    settings: Settings,
    errors: Vec<String>,
    rejected: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    if let Err(e) = execute(cli) {
        error!("{e}");
        return Err(e);
    }
    Ok(())
}

fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Run {
            input,
            output: sink,
            format,
        } => {
            let run_config = config::load_config(&cli.config)?;
            let summary = process::run(&run_config, &input, &sink, format)?;
            output::print_run_summary(&summary);
        }
        Command::Set(args) => {
            let run_config = config::load_config(&cli.config)?;
            let path = &run_config.settings.path;
            let base = if path.exists() {
                settings::read_settings(path, ReloadPolicy::RetainPrevious)?.settings
            } else {
                Settings::default()
            };
            let next = args.apply(base);
            settings::write_settings(path, &next)?;
            info!(path = %path.display(), "settings written");
            output::print_reload(
                path,
                &settings::Reload {
                    settings: next,
                    errors: Vec::new(),
                    rejected: false,
                },
            );
        }
        Command::Inspect { json } => {
            let run_config = config::load_config(&cli.config)?;
            let path = &run_config.settings.path;
            let mut reload = settings::read_settings(path, run_config.settings.policy)?;
            reload.settings = reload.settings.constrain(run_config.dims()).0;
            if json {
                let report = InspectReport {
                    path,
                    settings: reload.settings,
                    errors: reload.errors.iter().map(ToString::to_string).collect(),
                    rejected: reload.rejected,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_reload(path, &reload);
            }
        }
        Command::Import {
            images,
            output: target,
            append,
        } => {
            let run_config = config::load_config(&cli.config)?;
            let dims = run_config.dims();
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .append(append)
                .truncate(!append)
                .open(&target)?;
            for image in &images {
                let frame: Frame = load_frame(image, dims)?;
                file.write_all(frame.as_bytes())?;
                info!(image = %image.display(), frame = %dims, "imported");
            }
            file.flush()?;
            println!(
                "Wrote {} frame{} of {} to {}",
                images.len(),
                if images.len() == 1 { "" } else { "s" },
                dims,
                target.display()
            );
        }
        Command::Kernels => {
            output::print_kernels();
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the global tracing subscriber.
///
/// Logs go to stderr by default, keeping stdout free for frame output.
fn init_logging(log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_file {
        Some(path) => {
            let file = File::options().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}
