use serde::{Deserialize, Serialize};

use crate::{
    analysis::labels::object_classes, annotation::element::DetectionParams,
    consts::RECOMMENDATION_IMAGE_EXAMPLES,
};

/// Body sent to the recommendation service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    /// Example images as data URIs.
    pub image_examples: Vec<String>,
    pub object_classes: Vec<String>,
}

impl RecommendationRequest {
    /// The bundled example set paired with every known object class.
    pub fn default_request() -> Self {
        Self {
            image_examples: RECOMMENDATION_IMAGE_EXAMPLES
                .iter()
                .map(|example| example.to_string())
                .collect(),
            object_classes: object_classes(),
        }
    }
}

/// Thresholds proposed by the recommendation service, kept verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterRecommendation {
    pub confidence_threshold: f64,
    pub iou_threshold: f64,
    pub description: String,
}

impl ParameterRecommendation {
    pub fn params(&self) -> DetectionParams {
        DetectionParams {
            confidence_threshold: self.confidence_threshold,
            iou_threshold: self.iou_threshold,
        }
    }
}
