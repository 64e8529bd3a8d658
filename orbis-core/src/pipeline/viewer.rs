use tracing::*;

use crate::{
    annotation::{
        element::DetectionParams,
        image::{AnnotatedImage, ImageDimensions, ImagePayload},
    },
    error::OrbisError,
    inference::model::{DetectionService, ParameterAdvisor},
    pipeline::annotator::{Annotator, RoundOutcome},
};

/// Caller-side state around an [`Annotator`]: the active thresholds, the
/// latest annotated image and the latest optimisation note.
///
/// Every round borrows the viewer mutably, so one viewer never runs two
/// rounds at the same time.
pub struct Viewer<D, A> {
    annotator: Annotator<D, A>,
    params: DetectionParams,
    current: Option<AnnotatedImage>,
    optimization_note: Option<String>,
}

impl<D, A> Viewer<D, A>
where
    D: DetectionService,
    A: ParameterAdvisor,
{
    pub fn new(annotator: Annotator<D, A>) -> Self {
        Self {
            annotator,
            params: DetectionParams::default(),
            current: None,
            optimization_note: None,
        }
    }

    pub fn annotator(&self) -> &Annotator<D, A> {
        &self.annotator
    }

    pub fn params(&self) -> DetectionParams {
        self.params
    }

    /// Overrides the thresholds used by the next round.
    pub fn set_params(&mut self, params: DetectionParams) {
        self.params = params;
    }

    pub fn current(&self) -> Option<&AnnotatedImage> {
        self.current.as_ref()
    }

    pub fn optimization_note(&self) -> Option<&str> {
        self.optimization_note.as_deref()
    }

    /// Runs a round on a newly selected image.
    ///
    /// The result replaces the current image even when the round fails, in
    /// which case the stored image has no detections and the error is
    /// returned. An image whose header cannot be read is rejected before a
    /// round starts and leaves the current image as it was.
    pub async fn submit(&mut self, source: ImagePayload) -> Result<&AnnotatedImage, OrbisError> {
        let original = source.intrinsic_dimensions()?;
        self.run(source, original).await
    }

    /// Replaces the thresholds with the advisor's recommendation and re-runs
    /// the current image with them.
    ///
    /// When the recommendation fails nothing changes. A failure of the
    /// follow-up round is returned after the new thresholds are in place.
    pub async fn optimize_parameters(&mut self) -> Result<DetectionParams, OrbisError> {
        let recommendation = match self.annotator.recommend_parameters().await {
            Ok(recommendation) => recommendation,
            Err(err) => {
                warn!("keeping thresholds {:?}: {}", self.params, err);
                return Err(err);
            }
        };

        self.params = recommendation.params();
        self.optimization_note = Some(recommendation.description);

        if let Some(current) = &self.current {
            let source = current.source().clone();
            let original = current.original();
            debug!("re-running current image with recommended thresholds");
            self.run(source, original).await?;
        }

        Ok(self.params)
    }

    async fn run(
        &mut self,
        source: ImagePayload,
        original: ImageDimensions,
    ) -> Result<&AnnotatedImage, OrbisError> {
        let RoundOutcome { image, error } = self
            .annotator
            .process_image(&source, original, &self.params)
            .await;

        let image = self.current.insert(image);
        match error {
            Some(err) => Err(err),
            None => Ok(&*image),
        }
    }
}
