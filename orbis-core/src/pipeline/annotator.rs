use snafu::{OptionExt, ResultExt};
use tracing::*;
use uuid::Uuid;

use crate::{
    annotation::{
        element::{DetectionParams, DetectionSet},
        image::{AnnotatedImage, ImageDimensions, ImagePayload},
    },
    config::Config,
    consts::{MODEL_ENDPOINT_ENV_NAME, RECOMMENDATION_ENDPOINT_ENV_NAME},
    error::*,
    inference::{
        advisor::{ParameterRecommendation, RecommendationRequest},
        model::{DetectionService, ParameterAdvisor},
        normalize::normalize_detections,
        prepare::{SubmissionOptions, prepare_submission},
        remote::{HttpDetectionClient, HttpParameterAdvisor},
    },
};

/// Result of one detection round.
///
/// `image` is always displayable: a failed round yields the original image
/// with no detections next to the error.
#[derive(Debug)]
pub struct RoundOutcome {
    pub image: AnnotatedImage,
    pub error: Option<OrbisError>,
}

impl RoundOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<AnnotatedImage, OrbisError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.image),
        }
    }
}

/// Runs detection rounds against a detection service and forwards
/// recommendation requests to an advisor.
///
/// A missing service is kept as `None` so the matching configuration error
/// surfaces when a round needs it rather than at construction.
pub struct Annotator<D, A> {
    detector: Option<D>,
    advisor: Option<A>,
    options: SubmissionOptions,
}

impl Annotator<HttpDetectionClient, HttpParameterAdvisor> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            HttpDetectionClient::from_config(config).ok(),
            HttpParameterAdvisor::from_config(config).ok(),
            config.submission_options(),
        )
    }
}

impl<D, A> Annotator<D, A>
where
    D: DetectionService,
    A: ParameterAdvisor,
{
    pub fn new(detector: Option<D>, advisor: Option<A>, options: SubmissionOptions) -> Self {
        Self {
            detector,
            advisor,
            options,
        }
    }

    pub fn detector(&self) -> Option<&D> {
        self.detector.as_ref()
    }

    pub fn advisor(&self) -> Option<&A> {
        self.advisor.as_ref()
    }

    /// Runs one detection round for `source`, whose intrinsic size is `original`.
    pub async fn process_image(
        &self,
        source: &ImagePayload,
        original: ImageDimensions,
        params: &DetectionParams,
    ) -> RoundOutcome {
        let round_id = Uuid::new_v4();
        let span = info_span!("round", %round_id);

        match self
            .run_round(source, original, params)
            .instrument(span.clone())
            .await
        {
            Ok(set) => {
                let image = AnnotatedImage::new(source.clone(), set);
                span.in_scope(|| {
                    info!("round finished with {} detections", image.detections().len())
                });
                RoundOutcome { image, error: None }
            }
            Err(err) => {
                span.in_scope(|| error!("round failed: {}", err));
                RoundOutcome {
                    image: AnnotatedImage::empty(source.clone(), original),
                    error: Some(err),
                }
            }
        }
    }

    async fn run_round(
        &self,
        source: &ImagePayload,
        original: ImageDimensions,
        params: &DetectionParams,
    ) -> Result<DetectionSet, OrbisError> {
        let detector = self.detector.as_ref().context(ConfigurationSnafu {
            name: MODEL_ENDPOINT_ENV_NAME,
        })?;

        info!(
            "preparing {}x{} image with confidence >= {}",
            original.width, original.height, params.confidence_threshold
        );

        let options = self.options;
        let payload = source.clone();
        let submission =
            tokio::task::spawn_blocking(move || prepare_submission(&payload, original, options))
                .await
                .context(BlockingTaskSnafu {
                    stage: "prepare-submission",
                })??;

        info!(
            "sending {}x{} image to the {} service",
            submission.dimensions.width,
            submission.dimensions.height,
            D::SERVICE_NAME
        );
        let response = detector.detect(&submission.payload).await?;

        normalize_detections(&response, submission.dimensions, original, params)
    }

    /// Asks the advisor for thresholds using the bundled example images.
    pub async fn recommend_parameters(&self) -> Result<ParameterRecommendation, OrbisError> {
        let advisor = self.advisor.as_ref().context(ConfigurationSnafu {
            name: RECOMMENDATION_ENDPOINT_ENV_NAME,
        })?;

        info!("requesting parameter recommendation from the {} service", A::SERVICE_NAME);
        let recommendation = advisor
            .recommend(&RecommendationRequest::default_request())
            .await?;
        info!(
            "recommended confidence {} and iou {}",
            recommendation.confidence_threshold, recommendation.iou_threshold
        );

        Ok(recommendation)
    }
}
