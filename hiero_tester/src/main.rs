mod image_helper;

use anyhow::{Context, Result, bail};
use flexi_logger::{Logger, LoggerHandle};
use hiero_vision::{
    BatchConfig, BatchJob, BatchPipeline, PipelineConfig, PixelGrid, annotated_file_name,
};
use image_helper::image_helper::{load_grayscale, save_gray, save_rgb};
use log::{error, info, warn};
use std::env;
use std::path::{Path, PathBuf};

const USAGE: &str = "Usage: hiero_tester [--config <config.json>] [--log-level <level>] \
                     [--workers <n>] --out <output_dir> <image>...";

/// Command line options. Parsed by hand; there are only a few.
#[derive(Debug)]
struct Options {
    inputs: Vec<PathBuf>,
    output_dir: PathBuf,
    config_path: Option<PathBuf>,
    log_level: String,
    workers: Option<usize>,
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut inputs = Vec::new();
    let mut output_dir = None;
    let mut config_path = None;
    let mut log_level = String::from("info");
    let mut workers = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--out" => {
                output_dir = Some(PathBuf::from(iter.next().context("--out needs a value")?));
            }
            "--config" => {
                config_path = Some(PathBuf::from(
                    iter.next().context("--config needs a value")?,
                ));
            }
            "--log-level" => {
                log_level = iter.next().context("--log-level needs a value")?.clone();
            }
            "--workers" => {
                let value = iter.next().context("--workers needs a value")?;
                workers = Some(
                    value
                        .parse::<usize>()
                        .with_context(|| format!("invalid worker count {value}"))?,
                );
            }
            flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
            input => inputs.push(PathBuf::from(input)),
        }
    }

    let Some(output_dir) = output_dir else {
        bail!("missing --out\n{USAGE}");
    };
    if inputs.is_empty() {
        bail!("no input images\n{USAGE}");
    }

    Ok(Options {
        inputs,
        output_dir,
        config_path,
        log_level,
        workers,
    })
}

fn setup_logging(level: &str) -> Result<LoggerHandle> {
    let handle = Logger::try_with_str(level)
        .with_context(|| format!("invalid log level {level}"))?
        .log_to_stderr()
        .start()
        .context("logger initialization failed")?;
    Ok(handle)
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    PipelineConfig::from_json_str(&json)
        .with_context(|| format!("invalid config {}", path.display()))
}

/// The job id is the file stem: `scan_04.png` becomes `scan_04`.
fn job_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("image"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Argument Parsing & Setup ---
    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(&args)?;
    let _logger = setup_logging(&options.log_level)?;

    let config = load_config(options.config_path.as_deref())?;
    let mut batch_config = BatchConfig::default();
    if let Some(workers) = options.workers {
        batch_config.max_concurrency = workers;
    }
    std::fs::create_dir_all(&options.output_dir)
        .with_context(|| format!("failed to create {}", options.output_dir.display()))?;

    // --- 2. Decoding ---
    let mut jobs = Vec::with_capacity(options.inputs.len());
    for input in &options.inputs {
        let image = match load_grayscale(input) {
            Ok(image) => image,
            Err(e) => {
                warn!("skipping {}: {:#}", input.display(), e);
                continue;
            }
        };
        match PixelGrid::from_gray_image(&image) {
            Ok(grid) => jobs.push(BatchJob {
                job_id: job_id(input),
                grid,
            }),
            Err(e) => warn!("skipping {}: {}", input.display(), e),
        }
    }

    // --- 3. Segmentation ---
    let batch = BatchPipeline::new(config.clone(), batch_config)?;
    let outcomes = batch.segment_all(jobs).await;

    // --- 4. Output ---
    let mut failures = 0;
    for outcome in outcomes {
        let segmentation = match outcome.result {
            Ok(segmentation) => segmentation,
            Err(e) => {
                error!("{}: {}", outcome.job_id, e);
                failures += 1;
                continue;
            }
        };

        let records = segmentation.records();
        let crops = segmentation.crops(&outcome.grid, &config)?;
        for (record, crop) in records.iter().zip(&crops) {
            let path = options.output_dir.join(record.file_name(&outcome.job_id));
            save_gray(&path, crop)?;
        }

        let annotated = segmentation.annotate(&outcome.grid, &config);
        let annotated_path = options
            .output_dir
            .join(annotated_file_name(&outcome.job_id));
        save_rgb(&annotated_path, &annotated)?;

        let manifest_path = options
            .output_dir
            .join(format!("{}_blobs.json", outcome.job_id));
        let manifest = serde_json::to_string_pretty(&records)?;
        std::fs::write(&manifest_path, manifest)
            .with_context(|| format!("failed to write {}", manifest_path.display()))?;

        if segmentation.is_empty() {
            info!("{}: no glyphs found", outcome.job_id);
        } else {
            info!(
                "{}: {} glyphs ({} regions before filtering)",
                outcome.job_id,
                records.len(),
                segmentation.raw_blob_count()
            );
        }
    }

    info!(
        "Processing complete. Output saved to {}",
        options.output_dir.display()
    );
    if failures > 0 {
        bail!("{failures} image(s) failed to segment");
    }
    Ok(())
}
