use serde::Serialize;

/// Largest side, in pixels, of an image sent to the detection service.
///
/// Images whose width or height exceed this value are downscaled so that
/// the larger side becomes exactly `MAX_DIMENSION` while the aspect ratio
/// is kept. Smaller images are submitted untouched.
pub const MAX_DIMENSION: u32 = 1024;

/// JPEG quality used when re-encoding a downscaled submission image.
///
/// 90 keeps enough detail for detection while cutting the upload size of
/// large camera frames considerably.
pub const JPEG_QUALITY: u8 = 90;

/// Minimum detector confidence a prediction needs to be displayed.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// IoU threshold handed around with the confidence threshold.
///
/// Non-maximum suppression happens inside the detection service, so this
/// value is carried as a parameter and never applied locally.
pub const DEFAULT_IOU_THRESHOLD: f64 = 0.45;

/// Path appended to the detection endpoint base URL.
pub const DETECT_PATH: &str = "/detect/";

/// Multipart field carrying the submitted image.
pub const UPLOAD_FIELD_NAME: &str = "file";

pub const MODEL_ENDPOINT_ENV_NAME: &str = "MODEL_ENDPOINT_URL";
pub const RECOMMENDATION_ENDPOINT_ENV_NAME: &str = "RECOMMENDATION_ENDPOINT_URL";
pub const FONT_PATH_ENV_NAME: &str = "ORBIS_FONT_PATH";
pub const MAX_DIMENSION_ENV_NAME: &str = "ORBIS_MAX_DIMENSION";
pub const JPEG_QUALITY_ENV_NAME: &str = "ORBIS_JPEG_QUALITY";

/// 1x1 transparent PNG used as the example image set for parameter
/// recommendation until real reference frames are bundled.
const PLACEHOLDER_IMAGE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// Example images sent to the recommendation service, as data URIs.
pub const RECOMMENDATION_IMAGE_EXAMPLES: [&str; 3] =
    [PLACEHOLDER_IMAGE, PLACEHOLDER_IMAGE, PLACEHOLDER_IMAGE];

pub const EXPORT_IMAGE_NAME: &str = "detection_results";
pub const EXPORT_PNG_FILE_NAME: &str = "detection_results_annotated.png";
pub const EXPORT_JSON_FILE_NAME: &str = "detection_metadata.json";

/// Static description of the deployed detection model.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub training_dataset_summary: &'static str,
    pub accuracy_metrics: &'static str,
    pub last_training_date: &'static str,
}

pub const DEFAULT_MODEL_INFO: ModelInfo = ModelInfo {
    name: "YOLOv8",
    version: "1.0.0",
    training_dataset_summary: "Toolbox, Oxygen Tank, Fire Extinguisher",
    accuracy_metrics: "mAP@0.5: 0.87",
    last_training_date: "2024-07-15",
};
