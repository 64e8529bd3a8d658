use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum OrbisError {
    #[snafu(display(
        "The {} environment variable is not set. Please configure it in your .env file.",
        name
    ))]
    Configuration { name: String },
    #[snafu(display("Image dimensions {}x{} are not positive", width, height))]
    InvalidDimensions { width: f32, height: f32 },
    #[snafu(display("Image failed to load: {}", source))]
    ImageLoad { source: image::ImageError },
    #[snafu(display("Image encode `{}` error: {}", stage, source))]
    ImageEncode {
        source: image::ImageError,
        stage: String,
    },
    #[snafu(display("Data url is malformed: {}", message))]
    DataUrl { message: String },
    #[snafu(display("Blocking task `{}` error: {}", stage, source))]
    BlockingTask {
        source: tokio::task::JoinError,
        stage: String,
    },
    #[snafu(display("Request to {} failed at `{}`: {}", url, stage, source))]
    Request {
        source: reqwest::Error,
        url: String,
        stage: String,
    },
    #[snafu(display("Model API error {}: {}", status, body))]
    Transport { status: u16, body: String },
    #[snafu(display(
        "Invalid response format. Expected a JSON object with a 'detections' array. Got: {}",
        body
    ))]
    InvalidResponseFormat { body: String },
    #[snafu(display("Recommendation response is malformed: {}", source))]
    Recommendation { source: serde_json::Error },
    #[snafu(display("Load Font error: {}", source))]
    Font { source: ab_glyph::InvalidFont },
    #[snafu(display("Read `{}` error: {}", path, source))]
    IoRead {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Write `{}` error: {}", path, source))]
    IoWrite {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Serialize `{}` error: {}", stage, source))]
    Serialize {
        source: serde_json::Error,
        stage: String,
    },
    #[snafu(display("No detection metadata to export"))]
    EmptyExport,
}

/// Coarse failure classes surfaced to whoever started a detection round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    ImageLoad,
    Transport,
    InvalidResponseFormat,
    Export,
}

impl OrbisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrbisError::Configuration { .. } => ErrorKind::Configuration,
            OrbisError::InvalidDimensions { .. }
            | OrbisError::ImageLoad { .. }
            | OrbisError::ImageEncode { .. }
            | OrbisError::DataUrl { .. }
            | OrbisError::BlockingTask { .. } => ErrorKind::ImageLoad,
            OrbisError::Request { .. } | OrbisError::Transport { .. } => ErrorKind::Transport,
            OrbisError::InvalidResponseFormat { .. } | OrbisError::Recommendation { .. } => {
                ErrorKind::InvalidResponseFormat
            }
            OrbisError::Font { .. }
            | OrbisError::IoRead { .. }
            | OrbisError::IoWrite { .. }
            | OrbisError::Serialize { .. }
            | OrbisError::EmptyExport => ErrorKind::Export,
        }
    }
}
