use crate::detector::loader::{LoadError, ModelSummary};
use crate::engine::EngineError;
use crate::frame::FrameError;

/// Receives the detector's failure and lifecycle events.
pub trait Diagnostics {
    fn model_loaded(&self, summary: &ModelSummary);
    fn load_failed(&self, error: &LoadError);
    fn invoke_failed(&self, error: &EngineError);
    fn preprocess_failed(&self, error: &FrameError);
}

/// Forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn model_loaded(&self, summary: &ModelSummary) {
        tracing::info!(
            model_bytes = summary.model_bytes,
            quantized = summary.quantized,
            input = %summary.input_name,
            "detection model loaded"
        );
    }

    fn load_failed(&self, error: &LoadError) {
        tracing::error!(%error, "detection model disabled");
    }

    fn invoke_failed(&self, error: &EngineError) {
        tracing::error!(%error, "error invoking detection model");
    }

    fn preprocess_failed(&self, error: &FrameError) {
        tracing::error!(%error, "error preparing frame for detection");
    }
}
