//! `pintu` - stitch, compress and inspect images on the local filesystem.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use env_logger::Env;
use pintu_core::{compress, probe, stitch, CompressionStatus, Direction, PipelineConfig};

/// Stitch and compress images with the Pintu pipeline.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Pipeline config file (TOML). Defaults apply when it doesn't exist.
    #[arg(short, long, default_value = "pintu.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Concatenate images, in the given order, into one JPEG.
    Stitch {
        /// Input images.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output JPEG path.
        #[arg(short, long)]
        output: PathBuf,

        /// "down" (vertical) or "right" (horizontal).
        #[arg(short, long, default_value = "down")]
        direction: Direction,
    },

    /// Apply the upload compression policy to one image.
    Compress {
        input: PathBuf,

        /// Output directory; the file name keeps the input stem and gets the
        /// extension of the resulting format.
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Print format and dimensions without decoding pixels.
    Probe {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = PipelineConfig::load_from(&args.config)?;

    match args.command {
        Command::Stitch {
            inputs,
            output,
            direction,
        } => run_stitch(&inputs, &output, direction, &config),
        Command::Compress { input, out_dir } => run_compress(&input, &out_dir, &config),
        Command::Probe { inputs } => run_probe(&inputs),
    }
}

fn run_stitch(
    inputs: &[PathBuf],
    output: &Path,
    direction: Direction,
    config: &PipelineConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let sources = inputs
        .iter()
        .map(|path| {
            std::fs::read(path).map_err(|e| format!("failed to read {}: {e}", path.display()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let result = stitch(&sources, direction, &config.stitch).map_err(|e| match &e {
        pintu_core::StitchError::DecodeFailure { index, .. } => {
            format!("{} ({})", e, inputs[*index].display())
        }
        _ => e.to_string(),
    })?;

    std::fs::write(output, &result.bytes)?;
    log::info!(
        "Wrote {}x{} {} ({} bytes)",
        result.width,
        result.height,
        output.display(),
        result.bytes.len()
    );
    Ok(())
}

fn run_compress(
    input: &Path,
    out_dir: &Path,
    config: &PipelineConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(input)?;
    let size = bytes.len() as u64;
    let extension = input
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();

    let outcome = compress(bytes, size, &extension, &config.compression);
    match &outcome.status {
        CompressionStatus::Skipped => {
            log::info!("{} is within budget ({size} bytes)", input.display());
            return Ok(());
        }
        CompressionStatus::Fallback(reason) => {
            log::warn!("{} left unchanged: {reason}", input.display());
            return Ok(());
        }
        CompressionStatus::Compressed { .. } => {}
    }

    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("compressed");
    let output = out_dir.join(format!("{stem}{}", outcome.extension));
    if output == input {
        return Err(format!("refusing to overwrite input {}", input.display()).into());
    }
    std::fs::write(&output, &outcome.bytes)?;
    log::info!("Wrote {} ({size} -> {} bytes)", output.display(), outcome.size);
    Ok(())
}

fn run_probe(inputs: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    for path in inputs {
        let bytes = std::fs::read(path)?;
        match probe(&bytes) {
            Ok(meta) => println!(
                "{}\t{:?}\t{}x{}\t{} bytes",
                path.display(),
                meta.format,
                meta.width,
                meta.height,
                bytes.len()
            ),
            Err(e) => println!("{}\terror: {e}", path.display()),
        }
    }
    Ok(())
}
