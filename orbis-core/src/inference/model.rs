use std::future::Future;

use serde_json::Value;

use crate::{
    annotation::image::ImagePayload,
    error::OrbisError,
    inference::advisor::{ParameterRecommendation, RecommendationRequest},
};

/// A remote object detector.
///
/// Implementations return the raw JSON envelope; validation and coordinate
/// handling belong to [`crate::inference::normalize`].
pub trait DetectionService {
    const SERVICE_NAME: &'static str;

    fn detect(
        &self,
        payload: &ImagePayload,
    ) -> impl Future<Output = Result<Value, OrbisError>> + Send;
}

/// A remote service that proposes detection thresholds.
pub trait ParameterAdvisor {
    const SERVICE_NAME: &'static str;

    fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> impl Future<Output = Result<ParameterRecommendation, OrbisError>> + Send;
}
