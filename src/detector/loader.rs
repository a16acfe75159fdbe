use thiserror::Error;

use crate::engine::{Engine, EngineError, ExecutionContext, TensorType};

/// Side of the square input image the model was trained on.
pub const DETECTION_MODEL_SIZE: usize = 300;
pub const DETECTION_MODEL_CNLS: usize = 3;
pub const NUM_THREADS: i32 = 1;

const NUM_INPUTS: usize = 1;
const NUM_OUTPUTS: usize = 4;

pub const INPUT_SHAPE: [usize; 4] = [1, DETECTION_MODEL_SIZE, DETECTION_MODEL_SIZE, DETECTION_MODEL_CNLS];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("model buffer is empty")]
    Empty,
    #[error("failed to load model: {0}")]
    Parse(#[source] EngineError),
    #[error("failed to create interpreter: {0}")]
    Context(#[source] EngineError),
    #[error("failed to allocate tensors: {0}")]
    Allocate(#[source] EngineError),
    #[error("detection model graph needs to have 1 and only 1 input, got {0}")]
    InputCount(usize),
    #[error("detection model input should be {expected}, got {actual}")]
    InputType {
        expected: TensorType,
        actual: TensorType,
    },
    #[error("detection model must have input dims of 1x300x300x3, got {0:?}")]
    InputShape(Vec<usize>),
    #[error("detection model graph needs to have 4 and only 4 outputs, got {0}")]
    OutputCount(usize),
}

/// Output positions of the SSD post-processing op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputTensors {
    pub locations: usize,
    pub classes: usize,
    pub scores: usize,
    pub count: usize,
}

impl Default for OutputTensors {
    fn default() -> Self {
        Self {
            locations: 0,
            classes: 1,
            scores: 2,
            count: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub model_bytes: usize,
    pub quantized: bool,
    pub input_name: String,
    pub output_names: Vec<String>,
}

/// A validated execution context, ready to take 300x300 RGB input.
pub struct LoadedModel<C> {
    pub(crate) context: C,
    pub(crate) outputs: OutputTensors,
    pub(crate) summary: ModelSummary,
}

impl<C> LoadedModel<C> {
    pub fn summary(&self) -> &ModelSummary {
        &self.summary
    }
}

/// Build and validate an execution context from `bytes`.
///
/// The bytes are copied first, so the caller may drop or reuse its buffer
/// as soon as this returns.
pub fn load_model<E: Engine>(
    engine: &E,
    bytes: &[u8],
    quantized: bool,
) -> Result<LoadedModel<E::Context>, LoadError> {
    if bytes.is_empty() {
        return Err(LoadError::Empty);
    }
    let model_bytes = bytes.len();
    let model = engine
        .load_from_bytes(bytes.to_vec())
        .map_err(LoadError::Parse)?;
    let mut context = engine
        .build_context(model, NUM_THREADS)
        .map_err(LoadError::Context)?;
    context.allocate().map_err(LoadError::Allocate)?;

    let inputs = context.inputs();
    if inputs.len() != NUM_INPUTS {
        return Err(LoadError::InputCount(inputs.len()));
    }
    let input = &inputs[0];
    let expected = if quantized {
        TensorType::UInt8
    } else {
        TensorType::Float32
    };
    if input.kind != expected {
        return Err(LoadError::InputType {
            expected,
            actual: input.kind.clone(),
        });
    }
    if input.dims[..] != INPUT_SHAPE[..] {
        return Err(LoadError::InputShape(input.dims.clone()));
    }

    let outputs = context.outputs();
    if outputs.len() != NUM_OUTPUTS {
        return Err(LoadError::OutputCount(outputs.len()));
    }
    tracing::debug!(
        locations = ?outputs[0].dims,
        classes = ?outputs[1].dims,
        scores = ?outputs[2].dims,
        count = ?outputs[3].dims,
        "detection outputs"
    );

    let summary = ModelSummary {
        model_bytes,
        quantized,
        input_name: input.name.clone(),
        output_names: outputs.iter().map(|info| info.name.clone()).collect(),
    };
    Ok(LoadedModel {
        context,
        outputs: OutputTensors::default(),
        summary,
    })
}
