//! Inference engine boundary.
//!
//! The detector only ever talks to the engine through [`Engine`] and
//! [`ExecutionContext`], so the validation, preprocessing and decoding
//! logic can run against any backend.

#[cfg(feature = "tflite")]
pub mod tflite;

#[cfg(test)]
pub mod mock;

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TensorType {
    UInt8,
    Float32,
    Other(String),
}

impl fmt::Display for TensorType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TensorType::UInt8 => write!(f, "uint8"),
            TensorType::Float32 => write!(f, "float32"),
            TensorType::Other(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TensorInfo {
    pub name: String,
    pub kind: TensorType,
    pub dims: Vec<usize>,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to build model from buffer: {0}")]
    Model(String),
    #[error("failed to build interpreter: {0}")]
    Interpreter(String),
    #[error("failed to allocate tensors: {0}")]
    Allocate(String),
    #[error("failed to invoke model: {0}")]
    Invoke(String),
    #[error("no tensor at position {0}")]
    MissingTensor(usize),
    #[error("tensor at position {position} is {actual}, not {expected}")]
    TensorType {
        position: usize,
        expected: TensorType,
        actual: TensorType,
    },
}

pub trait Engine {
    type Model;
    type Context: ExecutionContext;

    /// Parse a serialized model. The engine keeps `bytes` alive for as long
    /// as the returned model (and any context built from it) lives.
    fn load_from_bytes(&self, bytes: Vec<u8>) -> Result<Self::Model, EngineError>;

    fn build_context(
        &self,
        model: Self::Model,
        num_threads: i32,
    ) -> Result<Self::Context, EngineError>;
}

/// An interpreter bound to one model. Tensor accessors address inputs and
/// outputs by their position in the graph's input/output lists.
pub trait ExecutionContext {
    fn allocate(&mut self) -> Result<(), EngineError>;
    fn inputs(&self) -> Vec<TensorInfo>;
    fn outputs(&self) -> Vec<TensorInfo>;
    fn input_u8_mut(&mut self, position: usize) -> Result<&mut [u8], EngineError>;
    fn input_f32_mut(&mut self, position: usize) -> Result<&mut [f32], EngineError>;
    fn output_f32(&self, position: usize) -> Result<&[f32], EngineError>;
    fn invoke(&mut self) -> Result<(), EngineError>;
}
