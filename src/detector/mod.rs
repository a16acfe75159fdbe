pub mod diagnostics;
pub mod loader;
pub mod result;

pub use diagnostics::{Diagnostics, TracingDiagnostics};
pub use loader::{load_model, LoadError, LoadedModel, ModelSummary, OutputTensors};
pub use result::{DetectResult, Detections, DETECT_NUM};

use crate::engine::{Engine, EngineError, ExecutionContext};
use crate::frame::{Frame, FrameError};
use loader::{DETECTION_MODEL_CNLS, DETECTION_MODEL_SIZE};

pub const IMAGE_MEAN: f32 = 128.0;
pub const IMAGE_STD: f32 = 128.0;

const INPUT_LEN: usize = DETECTION_MODEL_SIZE * DETECTION_MODEL_SIZE * DETECTION_MODEL_CNLS;

/// SSD detector bound to one execution context.
///
/// A model that fails to load leaves the detector disabled: every call to
/// [`ObjectDetector::detect`] then returns empty slots.
pub struct ObjectDetector<E: Engine, D: Diagnostics = TracingDiagnostics> {
    model: Option<LoadedModel<E::Context>>,
    quantized: bool,
    diagnostics: D,
}

impl<E: Engine> ObjectDetector<E> {
    pub fn new(engine: &E, model_bytes: &[u8], quantized: bool) -> Self {
        Self::with_diagnostics(engine, model_bytes, quantized, TracingDiagnostics)
    }
}

impl<E: Engine, D: Diagnostics> ObjectDetector<E, D> {
    pub fn with_diagnostics(engine: &E, model_bytes: &[u8], quantized: bool, diagnostics: D) -> Self {
        let model = match load_model(engine, model_bytes, quantized) {
            Ok(model) => {
                diagnostics.model_loaded(model.summary());
                Some(model)
            }
            Err(LoadError::Empty) => {
                tracing::debug!("no detection model supplied");
                None
            }
            Err(error) => {
                diagnostics.load_failed(&error);
                None
            }
        };
        Self {
            model,
            quantized,
            diagnostics,
        }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn is_quantized(&self) -> bool {
        self.quantized
    }

    pub fn summary(&self) -> Option<&ModelSummary> {
        self.model.as_ref().map(|model| model.summary())
    }

    /// Run one forward pass over `frame` and decode the first
    /// [`DETECT_NUM`] detections in `frame` pixel coordinates.
    pub fn detect(&mut self, frame: &Frame) -> Detections {
        let Some(model) = self.model.as_mut() else {
            return Detections::default();
        };
        let rgb = match preprocess(frame) {
            Ok(rgb) => rgb,
            Err(error) => {
                self.diagnostics.preprocess_failed(&error);
                return Detections::default();
            }
        };
        match run(model, &rgb, self.quantized) {
            Ok(()) => {}
            Err(error) => {
                self.diagnostics.invoke_failed(&error);
                return Detections::default();
            }
        }
        match decode(model, frame.rows(), frame.cols()) {
            Ok(dets) => dets,
            Err(error) => {
                self.diagnostics.invoke_failed(&error);
                Detections::default()
            }
        }
    }
}

/// Reorder to packed RGB and resize to the model's input size.
pub fn preprocess(frame: &Frame) -> Result<Vec<u8>, FrameError> {
    let size = DETECTION_MODEL_SIZE as u32;
    tracing::debug!(
        width = frame.width(),
        height = frame.height(),
        layout = %frame.layout(),
        "preprocessing frame"
    );
    // the reorder commutes with the per-channel resize, so every layout
    // takes the same RGB resampling path
    Ok(frame.to_rgb_frame().resize_area(size, size)?.into_bytes())
}

/// `(p - mean) / std` for every component, mapping [0, 255] onto [-1, 1].
pub fn normalize(rgb: &[u8]) -> impl Iterator<Item = f32> + '_ {
    rgb.iter().map(|&v| (v as f32 - IMAGE_MEAN) / IMAGE_STD)
}

fn run<C: ExecutionContext>(model: &mut LoadedModel<C>, rgb: &[u8], quantized: bool) -> Result<(), EngineError> {
    if quantized {
        let dst = model.context.input_u8_mut(0)?;
        let n = INPUT_LEN.min(dst.len()).min(rgb.len());
        dst[..n].copy_from_slice(&rgb[..n]);
    } else {
        let dst = model.context.input_f32_mut(0)?;
        for (d, v) in dst.iter_mut().zip(normalize(rgb)) {
            *d = v;
        }
    }
    model.context.invoke()
}

fn decode<C: ExecutionContext>(model: &LoadedModel<C>, rows: usize, cols: usize) -> Result<Detections, EngineError> {
    let context = &model.context;
    let locations = context.output_f32(model.outputs.locations)?;
    let classes = context.output_f32(model.outputs.classes)?;
    let scores = context.output_f32(model.outputs.scores)?;
    let count = context.output_f32(model.outputs.count)?;

    let reported = count.first().copied().unwrap_or(0.0) as i64;
    if reported < 0 {
        tracing::warn!(reported, "negative detection count, treating as zero");
    }
    let num = (reported.max(0) as usize)
        .min(DETECT_NUM)
        .min(classes.len())
        .min(scores.len())
        .min(locations.len() / 4);

    let height = rows as f32;
    let width = cols as f32;
    let mut slots = [DetectResult::default(); DETECT_NUM];
    for (i, slot) in slots.iter_mut().enumerate().take(num) {
        let bbox = &locations[4 * i..4 * i + 4];
        *slot = DetectResult {
            label: classes[i] as i32,
            score: scores[i],
            ymin: clamp_to(bbox[0] * height, height),
            xmin: clamp_to(bbox[1] * width, width),
            ymax: clamp_to(bbox[2] * height, height),
            xmax: clamp_to(bbox[3] * width, width),
        };
        tracing::trace!(
            "det class {} with score {} at {},{} - {},{}",
            slot.label,
            slot.score,
            slot.xmin,
            slot.ymin,
            slot.xmax,
            slot.ymax
        );
    }
    Ok(Detections::new(slots))
}

/// Clamp into `[0, dim - 1]`. `max`/`min` return the bound for NaN.
fn clamp_to(v: f32, dim: f32) -> f32 {
    v.max(0.0).min(dim - 1.0)
}
