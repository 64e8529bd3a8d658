use std::{
    io::Cursor,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::Value;

use crate::{
    annotation::image::ImagePayload,
    error::*,
    inference::{
        advisor::{ParameterRecommendation, RecommendationRequest},
        model::{DetectionService, ParameterAdvisor},
    },
};

pub(crate) fn png_payload(width: u32, height: u32) -> ImagePayload {
    let image = RgbImage::from_pixel(width, height, Rgb([200, 200, 200]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    ImagePayload::from_bytes(bytes).unwrap()
}

pub(crate) enum Reply {
    Json(Value),
    Status(u16, &'static str),
}

/// Detector double that records every upload and answers with a fixed reply.
pub(crate) struct ScriptedDetector {
    reply: Reply,
    uploads: Mutex<Vec<ImagePayload>>,
}

impl ScriptedDetector {
    pub(crate) fn json(value: Value) -> Self {
        Self {
            reply: Reply::Json(value),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn status(status: u16, body: &'static str) -> Self {
        Self {
            reply: Reply::Status(status, body),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn uploads(&self) -> Vec<ImagePayload> {
        self.uploads.lock().unwrap().clone()
    }
}

impl DetectionService for ScriptedDetector {
    const SERVICE_NAME: &'static str = "scripted-detector";

    async fn detect(&self, payload: &ImagePayload) -> Result<Value, OrbisError> {
        self.uploads.lock().unwrap().push(payload.clone());
        match &self.reply {
            Reply::Json(value) => Ok(value.clone()),
            Reply::Status(status, body) => TransportSnafu {
                status: *status,
                body: *body,
            }
            .fail(),
        }
    }
}

/// Advisor double; `None` answers with a 500.
pub(crate) struct ScriptedAdvisor {
    reply: Option<ParameterRecommendation>,
    calls: AtomicUsize,
}

impl ScriptedAdvisor {
    pub(crate) fn new(reply: Option<ParameterRecommendation>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ParameterAdvisor for ScriptedAdvisor {
    const SERVICE_NAME: &'static str = "scripted-advisor";

    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<ParameterRecommendation, OrbisError> {
        assert!(!request.object_classes.is_empty());
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(recommendation) => Ok(recommendation.clone()),
            None => TransportSnafu {
                status: 500u16,
                body: "advisor down",
            }
            .fail(),
        }
    }
}
