use std::path::PathBuf;

use clap::Parser;

use mobiledetect::Rotation;

/// Detect objects in an image with an SSD TFLite model
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// YAML config file; MOBILEDETECT_* environment variables override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// TFLite model file, overrides pipeline.model_filename
    #[arg(long, value_name = "FILE")]
    pub model: Option<String>,

    /// Label map, overrides pipeline.label_filename
    #[arg(long, value_name = "FILE")]
    pub labels: Option<String>,

    /// The model takes uint8 input
    #[arg(long, conflicts_with = "float")]
    pub quantized: bool,

    /// The model takes float32 input normalized to [-1, 1]
    #[arg(long)]
    pub float: bool,

    /// Clockwise rotation applied before detection (0, 90, 180, 270)
    #[arg(long, default_value = "0", value_name = "DEGREES")]
    pub rotation: Rotation,

    /// Minimum score to report, overrides pipeline.threshold
    #[arg(long, value_name = "THRESHOLD")]
    pub threshold: Option<f32>,

    /// Print the 18-float overlay encoding instead of JSON
    #[arg(long)]
    pub wire: bool,

    /// Image to run detection on
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,
}
