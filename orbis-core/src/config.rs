use std::path::PathBuf;

use derive_builder::Builder;
use snafu::OptionExt;

use crate::{
    consts::*,
    error::{ConfigurationSnafu, OrbisError},
    inference::prepare::SubmissionOptions,
};

/// Runtime settings, normally read from the environment.
///
/// Service endpoints are optional here: a missing endpoint only becomes an
/// error when a round actually needs it.
#[derive(Debug, Clone, Builder)]
#[builder(default)]
pub struct Config {
    #[builder(setter(into, strip_option))]
    pub detection_endpoint: Option<String>,
    #[builder(setter(into, strip_option))]
    pub recommendation_endpoint: Option<String>,
    #[builder(setter(into, strip_option))]
    pub font_path: Option<PathBuf>,
    pub max_dimension: u32,
    pub jpeg_quality: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            detection_endpoint: None,
            recommendation_endpoint: None,
            font_path: None,
            max_dimension: MAX_DIMENSION,
            jpeg_quality: JPEG_QUALITY,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Self {
            detection_endpoint: non_empty(MODEL_ENDPOINT_ENV_NAME),
            recommendation_endpoint: non_empty(RECOMMENDATION_ENDPOINT_ENV_NAME),
            font_path: non_empty(FONT_PATH_ENV_NAME).map(PathBuf::from),
            max_dimension: non_empty(MAX_DIMENSION_ENV_NAME)
                .and_then(|value| value.trim().parse::<u32>().ok())
                .filter(|value| *value > 0)
                .unwrap_or(MAX_DIMENSION),
            jpeg_quality: non_empty(JPEG_QUALITY_ENV_NAME)
                .and_then(|value| value.trim().parse::<u8>().ok())
                .filter(|value| (1..=100).contains(value))
                .unwrap_or(JPEG_QUALITY),
        }
    }

    pub fn detection_endpoint(&self) -> Result<&str, OrbisError> {
        self.detection_endpoint
            .as_deref()
            .context(ConfigurationSnafu {
                name: MODEL_ENDPOINT_ENV_NAME,
            })
    }

    pub fn recommendation_endpoint(&self) -> Result<&str, OrbisError> {
        self.recommendation_endpoint
            .as_deref()
            .context(ConfigurationSnafu {
                name: RECOMMENDATION_ENDPOINT_ENV_NAME,
            })
    }

    pub fn submission_options(&self) -> SubmissionOptions {
        SubmissionOptions {
            max_dimension: self.max_dimension,
            jpeg_quality: self.jpeg_quality,
        }
    }
}
