pub mod app;
pub mod detector;
pub mod engine;
pub mod frame;
pub mod labels;

pub use detector::{DetectResult, Detections, ObjectDetector, DETECT_NUM};
pub use frame::{Frame, PixelLayout, Rotation};
