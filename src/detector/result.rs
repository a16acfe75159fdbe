use std::ops::Deref;

use serde::Serialize;

/// Number of detection slots returned by every call.
pub const DETECT_NUM: usize = 3;

/// Floats per slot in the flattened wire layout.
pub const WIRE_STRIDE: usize = 6;

/// One detection slot. `label == -1` marks an empty slot; the box is in
/// pixel coordinates of the frame passed to `detect`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectResult {
    pub label: i32,
    pub score: f32,
    pub ymin: f32,
    pub xmin: f32,
    pub ymax: f32,
    pub xmax: f32,
}

impl Default for DetectResult {
    fn default() -> Self {
        Self {
            label: -1,
            score: 0.0,
            ymin: 0.0,
            xmin: 0.0,
            ymax: 0.0,
            xmax: 0.0,
        }
    }
}

impl DetectResult {
    pub fn is_active(&self) -> bool {
        self.label != -1
    }
}

/// The fixed-size result of one `detect` call.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Detections([DetectResult; DETECT_NUM]);

impl Detections {
    pub fn new(slots: [DetectResult; DETECT_NUM]) -> Self {
        Self(slots)
    }

    pub fn active(&self) -> impl Iterator<Item = &DetectResult> {
        self.0.iter().filter(|det| det.is_active())
    }

    pub fn above(&self, threshold: f32) -> impl Iterator<Item = &DetectResult> {
        self.active().filter(move |det| det.score >= threshold)
    }

    /// Flatten to `label, score, xmin, xmax, ymin, ymax` per slot, the layout
    /// consumed by the camera overlays.
    pub fn to_wire(&self) -> [f32; DETECT_NUM * WIRE_STRIDE] {
        let mut out = [0f32; DETECT_NUM * WIRE_STRIDE];
        for (chunk, det) in out.chunks_exact_mut(WIRE_STRIDE).zip(self.0.iter()) {
            chunk.copy_from_slice(&[
                det.label as f32,
                det.score,
                det.xmin,
                det.xmax,
                det.ymin,
                det.ymax,
            ]);
        }
        out
    }

    pub fn into_inner(self) -> [DetectResult; DETECT_NUM] {
        self.0
    }
}

impl Deref for Detections {
    type Target = [DetectResult; DETECT_NUM];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Detections {
    type Item = &'a DetectResult;
    type IntoIter = std::slice::Iter<'a, DetectResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
