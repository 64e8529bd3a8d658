use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    analysis::bbox::FractionalBox,
    annotation::image::ImageDimensions,
    consts::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_IOU_THRESHOLD},
};

/// One object found by the detector, framed by the original image.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Detection {
    pub id: Uuid,
    #[serde(rename = "box")]
    pub bbox: FractionalBox,
    pub label: String,
    pub confidence: f64,
}

/// Thresholds used to filter a detection round.
///
/// Owned by the caller and passed to every round explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionParams {
    pub confidence_threshold: f64,
    pub iou_threshold: f64,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
        }
    }
}

/// Normalized detections together with the dimensions they are framed by.
#[derive(Clone, Debug)]
pub struct DetectionSet {
    pub original: ImageDimensions,
    pub detections: Vec<Detection>,
}
