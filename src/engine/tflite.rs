use tflite::context::ElementKind;
use tflite::ops::builtin::BuiltinOpResolver;
use tflite::{FlatBufferModel, Interpreter, InterpreterBuilder};

use crate::engine::{Engine, EngineError, ExecutionContext, TensorInfo, TensorType};

/// TensorFlow Lite backend using the builtin operator set.
#[derive(Debug, Default, Clone, Copy)]
pub struct TfLiteEngine;

pub struct TfLiteContext {
    interpreter: Interpreter<'static, BuiltinOpResolver>,
}

impl Engine for TfLiteEngine {
    type Model = FlatBufferModel;
    type Context = TfLiteContext;

    fn load_from_bytes(&self, bytes: Vec<u8>) -> Result<FlatBufferModel, EngineError> {
        // the model takes ownership of the buffer, so it lives as long as the interpreter
        FlatBufferModel::build_from_buffer(bytes).map_err(|e| EngineError::Model(e.to_string()))
    }

    fn build_context(
        &self,
        model: FlatBufferModel,
        num_threads: i32,
    ) -> Result<TfLiteContext, EngineError> {
        let resolver = BuiltinOpResolver::default();
        let builder = InterpreterBuilder::new(model, resolver)
            .map_err(|e| EngineError::Interpreter(e.to_string()))?;
        let mut interpreter = builder
            .build()
            .map_err(|e| EngineError::Interpreter(e.to_string()))?;
        interpreter.set_num_threads(num_threads);
        Ok(TfLiteContext { interpreter })
    }
}

impl TfLiteContext {
    /// One entry per index. A tensor without info is kept as an untyped,
    /// shapeless entry so counts stay right and validation rejects it.
    fn describe(&self, indices: &[i32]) -> Vec<TensorInfo> {
        indices
            .iter()
            .map(|&index| match self.interpreter.tensor_info(index) {
                Some(info) => TensorInfo {
                    name: info.name,
                    kind: tensor_type(info.element_kind),
                    dims: info.dims,
                },
                None => missing_tensor(index),
            })
            .collect()
    }

    fn kind_of(&self, index: i32, position: usize) -> Result<TensorType, EngineError> {
        self.interpreter
            .tensor_info(index)
            .map(|info| tensor_type(info.element_kind))
            .ok_or(EngineError::MissingTensor(position))
    }

    fn input_index(&self, position: usize) -> Result<i32, EngineError> {
        self.interpreter
            .inputs()
            .get(position)
            .copied()
            .ok_or(EngineError::MissingTensor(position))
    }

    fn output_index(&self, position: usize) -> Result<i32, EngineError> {
        self.interpreter
            .outputs()
            .get(position)
            .copied()
            .ok_or(EngineError::MissingTensor(position))
    }
}

fn missing_tensor(index: i32) -> TensorInfo {
    TensorInfo {
        name: format!("tensor {}", index),
        kind: TensorType::Other("missing".to_string()),
        dims: Vec::new(),
    }
}

fn tensor_type(kind: ElementKind) -> TensorType {
    match kind {
        ElementKind::kTfLiteUInt8 => TensorType::UInt8,
        ElementKind::kTfLiteFloat32 => TensorType::Float32,
        other => TensorType::Other(format!("{:?}", other)),
    }
}

impl ExecutionContext for TfLiteContext {
    fn allocate(&mut self) -> Result<(), EngineError> {
        self.interpreter
            .allocate_tensors()
            .map_err(|e| EngineError::Allocate(e.to_string()))
    }

    fn inputs(&self) -> Vec<TensorInfo> {
        let indices = self.interpreter.inputs().to_vec();
        self.describe(&indices)
    }

    fn outputs(&self) -> Vec<TensorInfo> {
        let indices = self.interpreter.outputs().to_vec();
        self.describe(&indices)
    }

    fn input_u8_mut(&mut self, position: usize) -> Result<&mut [u8], EngineError> {
        let index = self.input_index(position)?;
        let actual = self.kind_of(index, position)?;
        self.interpreter
            .tensor_data_mut(index)
            .map_err(|_| EngineError::TensorType {
                position,
                expected: TensorType::UInt8,
                actual,
            })
    }

    fn input_f32_mut(&mut self, position: usize) -> Result<&mut [f32], EngineError> {
        let index = self.input_index(position)?;
        let actual = self.kind_of(index, position)?;
        self.interpreter
            .tensor_data_mut(index)
            .map_err(|_| EngineError::TensorType {
                position,
                expected: TensorType::Float32,
                actual,
            })
    }

    fn output_f32(&self, position: usize) -> Result<&[f32], EngineError> {
        let index = self.output_index(position)?;
        let actual = self.kind_of(index, position)?;
        self.interpreter
            .tensor_data(index)
            .map_err(|_| EngineError::TensorType {
                position,
                expected: TensorType::Float32,
                actual,
            })
    }

    fn invoke(&mut self) -> Result<(), EngineError> {
        self.interpreter
            .invoke()
            .map_err(|e| EngineError::Invoke(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::ObjectDetector;
    use crate::frame::Frame;

    #[test]
    fn test_tensor_types() {
        assert_eq!(tensor_type(ElementKind::kTfLiteUInt8), TensorType::UInt8);
        assert_eq!(tensor_type(ElementKind::kTfLiteFloat32), TensorType::Float32);
        let missing = missing_tensor(7);
        assert_eq!(missing.kind, TensorType::Other("missing".to_string()));
        assert!(missing.dims.is_empty());
    }

    #[test]
    #[ignore = "needs models/ssd_mobilenet_v1_quant.tflite and test_data/person.jpg"]
    fn test_tflite() {
        let bytes = std::fs::read("models/ssd_mobilenet_v1_quant.tflite").unwrap();
        let mut detector = ObjectDetector::new(&TfLiteEngine, &bytes, true);
        assert!(detector.has_model());

        let frame = Frame::from(image::open("test_data/person.jpg").unwrap());
        let dets = detector.detect(&frame);
        let best = &dets[0];
        // class 0 is "person" once the background slot is skipped
        assert_eq!(best.label, 0);
        assert!(best.score > 0.6);
    }
}
