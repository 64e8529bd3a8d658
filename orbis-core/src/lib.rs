pub mod analysis;
pub mod annotation;
pub mod config;
pub mod consts;
pub mod error;
pub mod export;
pub mod inference;
pub mod pipeline;

// Re-export commonly used types
pub use annotation::{
    element::{Detection, DetectionParams},
    image::{AnnotatedImage, ImageDimensions, ImagePayload},
};
pub use config::Config;
pub use error::{ErrorKind, OrbisError};
pub use pipeline::{
    annotator::{Annotator, RoundOutcome},
    viewer::Viewer,
};
