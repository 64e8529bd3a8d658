use serde_json::Value;
use snafu::OptionExt;
use tracing::*;
use uuid::Uuid;

use crate::{
    analysis::bbox::Bbox,
    annotation::{
        element::{Detection, DetectionParams, DetectionSet},
        image::ImageDimensions,
    },
    error::*,
};

/// One prediction from the detection service that passed shape validation.
#[derive(Clone, Debug, PartialEq)]
pub struct RawPrediction {
    pub class: String,
    pub confidence: f64,
    /// `[x_min, y_min, x_max, y_max]` in submitted-image pixels.
    pub bbox: [f32; 4],
}

impl RawPrediction {
    /// Checks the shape of a single `detections` entry.
    ///
    /// Returns the reason on failure so the caller can log and skip the entry.
    pub fn from_value(value: &Value) -> Result<Self, &'static str> {
        let class = value
            .get("class")
            .and_then(Value::as_str)
            .ok_or("`class` must be a string")?;
        let confidence = value
            .get("confidence")
            .and_then(Value::as_f64)
            .ok_or("`confidence` must be a number")?;
        let coords = value
            .get("bbox")
            .and_then(Value::as_array)
            .filter(|coords| coords.len() == 4)
            .ok_or("`bbox` must be an array of exactly 4 numbers")?;

        let mut bbox = [0f32; 4];
        for (slot, coord) in bbox.iter_mut().zip(coords) {
            *slot = coord
                .as_f64()
                .ok_or("`bbox` must be an array of exactly 4 numbers")? as f32;
        }

        Ok(Self {
            class: class.to_string(),
            confidence,
            bbox,
        })
    }

    /// Expresses the prediction as a detection framed by the original image.
    ///
    /// Coordinates are divided by the submitted size since that is the space the
    /// detector saw. Fractions are resolution independent, so they apply to the
    /// original image as is.
    pub fn into_detection(self, submitted: ImageDimensions) -> Detection {
        Detection {
            id: Uuid::new_v4(),
            bbox: Bbox::from_xyxy(self.bbox).normalize(submitted.as_vec2()),
            label: self.class,
            confidence: self.confidence,
        }
    }
}

/// Turns a detection service response into filtered, fractional detections.
///
/// Malformed entries are skipped with a warning. A response without a
/// `detections` array fails the whole call with
/// [`OrbisError::InvalidResponseFormat`]. Detections with a confidence below
/// `params.confidence_threshold` are dropped; `params.iou_threshold` is not
/// applied since suppression already happened in the detector.
pub fn normalize_detections(
    response: &Value,
    submitted: ImageDimensions,
    original: ImageDimensions,
    params: &DetectionParams,
) -> Result<DetectionSet, OrbisError> {
    let predictions = response
        .get("detections")
        .and_then(Value::as_array)
        .with_context(|| InvalidResponseFormatSnafu {
            body: response.to_string(),
        })?;

    let detections: Vec<Detection> = predictions
        .iter()
        .enumerate()
        .filter_map(|(idx, value)| match RawPrediction::from_value(value) {
            Ok(prediction) => Some(prediction),
            Err(reason) => {
                warn!("skipping malformed detection object at index {idx}: {reason}: {value}");
                None
            }
        })
        .map(|prediction| prediction.into_detection(submitted))
        .filter(|detection| detection.confidence >= params.confidence_threshold)
        .collect();

    debug!(
        "kept {} of {} predictions at confidence >= {} (iou {} left to the detector)",
        detections.len(),
        predictions.len(),
        params.confidence_threshold,
        params.iou_threshold
    );

    Ok(DetectionSet {
        original,
        detections,
    })
}
