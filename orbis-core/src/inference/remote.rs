use reqwest::{
    Client, Response,
    multipart::{Form, Part},
};
use serde_json::Value;
use snafu::ResultExt;
use tracing::*;

use crate::{
    annotation::image::ImagePayload,
    config::Config,
    consts::{DETECT_PATH, UPLOAD_FIELD_NAME},
    error::*,
    inference::{
        advisor::{ParameterRecommendation, RecommendationRequest},
        model::{DetectionService, ParameterAdvisor},
    },
};

/// Detection service reached over HTTP with a multipart upload.
#[derive(Clone, Debug)]
pub struct HttpDetectionClient {
    endpoint: String,
    client: Client,
}

impl HttpDetectionClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, Client::new())
    }

    pub fn with_client(endpoint: impl Into<String>, client: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    /// Fails with a configuration error when `MODEL_ENDPOINT_URL` is unset.
    pub fn from_config(config: &Config) -> Result<Self, OrbisError> {
        config.detection_endpoint().map(Self::new)
    }

    pub fn detect_url(&self) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), DETECT_PATH)
    }
}

impl DetectionService for HttpDetectionClient {
    const SERVICE_NAME: &'static str = "detection";

    async fn detect(&self, payload: &ImagePayload) -> Result<Value, OrbisError> {
        let url = self.detect_url();
        let part = Part::bytes(payload.bytes.to_vec())
            .file_name(payload.file_name())
            .mime_str(&payload.mime)
            .context(RequestSnafu {
                url: &url,
                stage: "multipart",
            })?;
        let form = Form::new().part(UPLOAD_FIELD_NAME, part);

        debug!("uploading {} bytes ({}) to {}", payload.bytes.len(), payload.mime, url);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context(RequestSnafu {
                url: &url,
                stage: "send",
            })?;

        let body = success_body(response, &url).await?;
        serde_json::from_str::<Value>(&body).map_err(|err| {
            warn!("detection response is not JSON: {}", err);
            InvalidResponseFormatSnafu { body: body.clone() }.build()
        })
    }
}

/// Recommendation service reached with a JSON POST.
#[derive(Clone, Debug)]
pub struct HttpParameterAdvisor {
    endpoint: String,
    client: Client,
}

impl HttpParameterAdvisor {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, Client::new())
    }

    pub fn with_client(endpoint: impl Into<String>, client: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, OrbisError> {
        config.recommendation_endpoint().map(Self::new)
    }
}

impl ParameterAdvisor for HttpParameterAdvisor {
    const SERVICE_NAME: &'static str = "recommendation";

    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<ParameterRecommendation, OrbisError> {
        let url = self.endpoint.as_str();
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .context(RequestSnafu { url, stage: "send" })?;

        let body = success_body(response, url).await?;
        serde_json::from_str(&body).context(RecommendationSnafu)
    }
}

/// Reads the body of a 2xx response. Any other status fails with the
/// status code and whatever body text the service sent.
async fn success_body(response: Response, url: &str) -> Result<String, OrbisError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!("{} answered {}: {}", url, status, body);
        return TransportSnafu {
            status: status.as_u16(),
            body,
        }
        .fail();
    }

    response.text().await.context(RequestSnafu {
        url,
        stage: "read-body",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ConfigBuilder, error::ErrorKind};

    #[test]
    fn test_detect_url_appends_path_once() {
        assert_eq!(
            HttpDetectionClient::new("http://detector:8000").detect_url(),
            "http://detector:8000/detect/"
        );
        assert_eq!(
            HttpDetectionClient::new("http://detector:8000/").detect_url(),
            "http://detector:8000/detect/"
        );
    }

    #[test]
    fn test_from_config_requires_endpoints() {
        let config = Config::default();

        let err = HttpDetectionClient::from_config(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("MODEL_ENDPOINT_URL"));

        let err = HttpParameterAdvisor::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("RECOMMENDATION_ENDPOINT_URL"));
    }

    #[test]
    fn test_from_config_uses_endpoint() {
        let config = ConfigBuilder::default()
            .detection_endpoint("http://localhost:8000")
            .build()
            .unwrap();

        let client = HttpDetectionClient::from_config(&config).unwrap();
        assert_eq!(client.detect_url(), "http://localhost:8000/detect/");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        // Port 9 (discard) is not expected to accept HTTP connections
        let client = HttpDetectionClient::new("http://127.0.0.1:9");
        let payload = ImagePayload::new(vec![0u8; 8], "image/jpeg");

        let err = client.detect(&payload).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
