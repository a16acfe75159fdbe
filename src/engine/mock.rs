//! Scripted engine for tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::engine::{Engine, EngineError, ExecutionContext, TensorInfo, TensorType};

/// Shared view into what the detector did with a mock context.
#[derive(Debug, Default, Clone)]
pub struct Probe {
    pub model_bytes: Rc<RefCell<Vec<u8>>>,
    pub num_threads: Rc<Cell<i32>>,
    pub invocations: Rc<Cell<usize>>,
    pub last_u8_input: Rc<RefCell<Vec<u8>>>,
    pub last_f32_input: Rc<RefCell<Vec<f32>>>,
}

#[derive(Debug, Clone)]
pub struct MockEngine {
    pub inputs: Vec<TensorInfo>,
    pub outputs: Vec<TensorInfo>,
    pub output_data: Vec<Vec<f32>>,
    pub fail_parse: bool,
    pub fail_context: bool,
    pub fail_allocate: bool,
    /// Number of upcoming `invoke` calls that fail.
    pub failing_invocations: Rc<Cell<usize>>,
    pub probe: Probe,
}

pub fn tensor(name: &str, kind: TensorType, dims: &[usize]) -> TensorInfo {
    TensorInfo {
        name: name.to_string(),
        kind,
        dims: dims.to_vec(),
    }
}

impl MockEngine {
    /// A well-formed SSD contract with `proposals` output slots, all empty.
    pub fn ssd(quantized: bool, proposals: usize) -> Self {
        let kind = if quantized {
            TensorType::UInt8
        } else {
            TensorType::Float32
        };
        Self {
            inputs: vec![tensor("normalized_input_image_tensor", kind, &[1, 300, 300, 3])],
            outputs: vec![
                tensor("TFLite_Detection_PostProcess", TensorType::Float32, &[1, proposals, 4]),
                tensor("TFLite_Detection_PostProcess:1", TensorType::Float32, &[1, proposals]),
                tensor("TFLite_Detection_PostProcess:2", TensorType::Float32, &[1, proposals]),
                tensor("TFLite_Detection_PostProcess:3", TensorType::Float32, &[1]),
            ],
            output_data: vec![
                vec![0.0; proposals * 4],
                vec![0.0; proposals],
                vec![0.0; proposals],
                vec![0.0],
            ],
            fail_parse: false,
            fail_context: false,
            fail_allocate: false,
            failing_invocations: Rc::new(Cell::new(0)),
            probe: Probe::default(),
        }
    }

    /// Script the decoded outputs: `(label, score, [ymin, xmin, ymax, xmax])`
    /// in normalized coordinates, with the count tensor set to `count`.
    pub fn with_detections(mut self, count: f32, dets: &[(f32, f32, [f32; 4])]) -> Self {
        for (i, (label, score, bbox)) in dets.iter().enumerate() {
            self.output_data[0][4 * i..4 * i + 4].copy_from_slice(bbox);
            self.output_data[1][i] = *label;
            self.output_data[2][i] = *score;
        }
        self.output_data[3][0] = count;
        self
    }
}

pub struct MockModel(Vec<u8>);

pub struct MockContext {
    inputs: Vec<TensorInfo>,
    outputs: Vec<TensorInfo>,
    output_data: Vec<Vec<f32>>,
    u8_input: Vec<u8>,
    f32_input: Vec<f32>,
    allocated: bool,
    fail_allocate: bool,
    failing_invocations: Rc<Cell<usize>>,
    probe: Probe,
}

impl Engine for MockEngine {
    type Model = MockModel;
    type Context = MockContext;

    fn load_from_bytes(&self, bytes: Vec<u8>) -> Result<MockModel, EngineError> {
        if self.fail_parse {
            return Err(EngineError::Model("not a flatbuffer".to_string()));
        }
        Ok(MockModel(bytes))
    }

    fn build_context(&self, model: MockModel, num_threads: i32) -> Result<MockContext, EngineError> {
        if self.fail_context {
            return Err(EngineError::Interpreter("unsupported op".to_string()));
        }
        *self.probe.model_bytes.borrow_mut() = model.0;
        self.probe.num_threads.set(num_threads);
        Ok(MockContext {
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            output_data: self.output_data.clone(),
            u8_input: Vec::new(),
            f32_input: Vec::new(),
            allocated: false,
            fail_allocate: self.fail_allocate,
            failing_invocations: self.failing_invocations.clone(),
            probe: self.probe.clone(),
        })
    }
}

impl MockContext {
    fn input_len(&self, position: usize) -> Result<usize, EngineError> {
        self.inputs
            .get(position)
            .map(|info| info.dims.iter().product())
            .ok_or(EngineError::MissingTensor(position))
    }

    fn check_input(&self, position: usize, expected: TensorType) -> Result<(), EngineError> {
        let info = self
            .inputs
            .get(position)
            .ok_or(EngineError::MissingTensor(position))?;
        if info.kind != expected {
            return Err(EngineError::TensorType {
                position,
                expected,
                actual: info.kind.clone(),
            });
        }
        Ok(())
    }
}

impl ExecutionContext for MockContext {
    fn allocate(&mut self) -> Result<(), EngineError> {
        if self.fail_allocate {
            return Err(EngineError::Allocate("arena too small".to_string()));
        }
        let len = self.input_len(0).unwrap_or(0);
        self.u8_input = vec![0; len];
        self.f32_input = vec![0.0; len];
        self.allocated = true;
        Ok(())
    }

    fn inputs(&self) -> Vec<TensorInfo> {
        self.inputs.clone()
    }

    fn outputs(&self) -> Vec<TensorInfo> {
        self.outputs.clone()
    }

    fn input_u8_mut(&mut self, position: usize) -> Result<&mut [u8], EngineError> {
        self.check_input(position, TensorType::UInt8)?;
        Ok(&mut self.u8_input)
    }

    fn input_f32_mut(&mut self, position: usize) -> Result<&mut [f32], EngineError> {
        self.check_input(position, TensorType::Float32)?;
        Ok(&mut self.f32_input)
    }

    fn output_f32(&self, position: usize) -> Result<&[f32], EngineError> {
        match (self.outputs.get(position), self.output_data.get(position)) {
            (Some(info), Some(data)) if info.kind == TensorType::Float32 => Ok(data),
            (Some(info), Some(_)) => Err(EngineError::TensorType {
                position,
                expected: TensorType::Float32,
                actual: info.kind.clone(),
            }),
            _ => Err(EngineError::MissingTensor(position)),
        }
    }

    fn invoke(&mut self) -> Result<(), EngineError> {
        if !self.allocated {
            return Err(EngineError::Invoke("tensors not allocated".to_string()));
        }
        self.probe.invocations.set(self.probe.invocations.get() + 1);
        let failing = self.failing_invocations.get();
        if failing > 0 {
            self.failing_invocations.set(failing - 1);
            return Err(EngineError::Invoke("delegate error".to_string()));
        }
        *self.probe.last_u8_input.borrow_mut() = self.u8_input.clone();
        *self.probe.last_f32_input.borrow_mut() = self.f32_input.clone();
        Ok(())
    }
}
