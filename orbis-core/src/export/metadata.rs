use serde::Serialize;
use snafu::{ResultExt, ensure};

use crate::{
    annotation::{element::Detection, image::AnnotatedImage},
    consts::EXPORT_IMAGE_NAME,
    error::*,
};

/// JSON document describing the detections of one annotated image.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument<'a> {
    pub image_name: &'a str,
    pub original_width: f32,
    pub original_height: f32,
    pub detections: &'a [Detection],
}

impl<'a> ExportDocument<'a> {
    /// Fails with [`OrbisError::EmptyExport`] when there is nothing to describe.
    pub fn new(image: &'a AnnotatedImage, image_name: Option<&'a str>) -> Result<Self, OrbisError> {
        ensure!(!image.is_empty(), EmptyExportSnafu);

        let original = image.original();
        Ok(Self {
            image_name: image_name.unwrap_or(EXPORT_IMAGE_NAME),
            original_width: original.width,
            original_height: original.height,
            detections: image.detections(),
        })
    }
}

/// Pretty-printed metadata for `image`.
pub fn export_metadata(
    image: &AnnotatedImage,
    image_name: Option<&str>,
) -> Result<String, OrbisError> {
    let document = ExportDocument::new(image, image_name)?;
    serde_json::to_string_pretty(&document).context(SerializeSnafu {
        stage: "export-metadata",
    })
}
