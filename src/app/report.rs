use std::path::Path;

use serde_json::{json, Value};

use crate::detector::Detections;
use crate::labels::LabelMap;

/// Load the label map if one is configured. An unreadable or empty file
/// only costs the names, so it is logged and skipped.
pub fn load_labels(path: Option<&str>) -> Option<LabelMap> {
    let path = path?;
    match LabelMap::from_file(Path::new(path)) {
        Ok(labels) => {
            tracing::debug!(path, count = labels.len(), "labels loaded");
            Some(labels)
        }
        Err(e) => {
            tracing::warn!(%e, "continuing without labels");
            None
        }
    }
}

/// One JSON object per detection at or above `threshold`, in slot order.
pub fn json_lines(detections: &Detections, threshold: f32, labels: Option<&LabelMap>) -> Vec<Value> {
    detections
        .above(threshold)
        .map(|det| {
            let name = labels.and_then(|labels| labels.lookup(det.label));
            json!({
                "label": det.label,
                "name": name,
                "score": det.score,
                "xmin": det.xmin,
                "ymin": det.ymin,
                "xmax": det.xmax,
                "ymax": det.ymax,
            })
        })
        .collect()
}

/// The 18 wire floats, comma separated.
pub fn wire_line(detections: &Detections) -> String {
    let wire: Vec<String> = detections.to_wire().iter().map(|v| v.to_string()).collect();
    wire.join(",")
}
