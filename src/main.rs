mod args;

use anyhow::{Context, Result};
use clap::Parser;

use mobiledetect::app::{logging, report, AppConfig};
use mobiledetect::engine::tflite::TfLiteEngine;
use mobiledetect::{Frame, ObjectDetector};

fn main() -> Result<()> {
    let args = args::Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AppConfig::from_env().context("failed to read config from environment")?,
    };
    if let Some(model) = args.model {
        config.pipeline.model_filename = model;
    }
    if let Some(labels) = args.labels {
        config.pipeline.label_filename = Some(labels);
    }
    if args.quantized {
        config.pipeline.quantized = true;
    }
    if args.float {
        config.pipeline.quantized = false;
    }
    if let Some(threshold) = args.threshold {
        config.pipeline.threshold = threshold;
    }

    logging::init(&config.logging.filter);
    tracing::info!(pipeline = %config.pipeline, "starting");

    let model_bytes = std::fs::read(&config.pipeline.model_filename)
        .with_context(|| format!("failed to read model {}", config.pipeline.model_filename))?;
    let labels = report::load_labels(config.pipeline.label_filename.as_deref());

    let image = image::open(&args.image)
        .with_context(|| format!("failed to open image {}", args.image.display()))?;
    let frame = Frame::from(image)
        .rotate(args.rotation)
        .context("failed to rotate image")?;

    let mut detector = ObjectDetector::new(&TfLiteEngine, &model_bytes, config.pipeline.quantized);
    // the model bytes were copied into the detector
    drop(model_bytes);

    let start = std::time::Instant::now();
    let detections = detector.detect(&frame);
    tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "detection span");

    if args.wire {
        println!("{}", report::wire_line(&detections));
        return Ok(());
    }

    for line in report::json_lines(&detections, config.pipeline.threshold, labels.as_ref()) {
        println!("{}", line);
    }
    Ok(())
}
