use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use bytes::Bytes;
use glam::Vec2;
use image::{DynamicImage, ImageFormat, ImageReader};
use serde::Serialize;
use snafu::{ResultExt, ensure};

use crate::{
    annotation::element::{Detection, DetectionSet},
    error::*,
};

/// Width and height of an image in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ImageDimensions {
    pub width: f32,
    pub height: f32,
}

impl ImageDimensions {
    pub fn new(width: f32, height: f32) -> Result<Self, OrbisError> {
        ensure!(
            width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0,
            InvalidDimensionsSnafu { width, height }
        );

        Ok(Self { width, height })
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }

    pub fn fits_within(&self, max_dimension: f32) -> bool {
        self.width <= max_dimension && self.height <= max_dimension
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Encoded image bytes and their MIME type.
#[derive(Clone, Debug, PartialEq)]
pub struct ImagePayload {
    pub bytes: Bytes,
    pub mime: String,
}

impl ImagePayload {
    pub fn new(bytes: impl Into<Bytes>, mime: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime: mime.into(),
        }
    }

    /// Wraps encoded bytes, sniffing the MIME type from the header.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self, OrbisError> {
        let bytes = bytes.into();
        let format = image::guess_format(&bytes).context(ImageLoadSnafu {})?;

        Ok(Self {
            bytes,
            mime: format.to_mime_type().to_string(),
        })
    }

    /// Parses a `data:<mime>;base64,<data>` URL.
    pub fn from_data_url(url: &str) -> Result<Self, OrbisError> {
        let Some(rest) = url.strip_prefix("data:") else {
            return DataUrlSnafu {
                message: "missing `data:` scheme",
            }
            .fail();
        };
        let Some((header, data)) = rest.split_once(',') else {
            return DataUrlSnafu {
                message: "missing `,` separator",
            }
            .fail();
        };
        let Some(mime) = header.strip_suffix(";base64") else {
            return DataUrlSnafu {
                message: "only base64 payloads are supported",
            }
            .fail();
        };

        let bytes = STANDARD.decode(data).map_err(|err| {
            DataUrlSnafu {
                message: err.to_string(),
            }
            .build()
        })?;

        if mime.is_empty() {
            Self::from_bytes(bytes)
        } else {
            Ok(Self::new(bytes, mime))
        }
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    /// File name used when uploading the payload, e.g. `image.jpeg`.
    pub fn file_name(&self) -> String {
        let extension = ImageFormat::from_mime_type(&self.mime)
            .and_then(|format| format.extensions_str().last().copied())
            .unwrap_or("bin");

        format!("image.{extension}")
    }

    /// Reads the intrinsic size from the image header without decoding pixels.
    pub fn intrinsic_dimensions(&self) -> Result<ImageDimensions, OrbisError> {
        let (width, height) = ImageReader::new(Cursor::new(self.bytes.as_ref()))
            .with_guessed_format()
            .context(IoReadSnafu { path: "<memory>" })?
            .into_dimensions()
            .context(ImageLoadSnafu {})?;

        ImageDimensions::new(width as f32, height as f32)
    }

    pub fn decode(&self) -> Result<DynamicImage, OrbisError> {
        image::load_from_memory(&self.bytes).context(ImageLoadSnafu {})
    }
}

/// The unit consumed by overlays and exports: the original image and the
/// detections framed by it.
#[derive(Clone, Debug)]
pub struct AnnotatedImage {
    source: ImagePayload,
    original: ImageDimensions,
    detections: Vec<Detection>,
}

impl AnnotatedImage {
    pub fn new(source: ImagePayload, set: DetectionSet) -> Self {
        Self {
            source,
            original: set.original,
            detections: set.detections,
        }
    }

    /// Shell shown when a round fails.
    pub fn empty(source: ImagePayload, original: ImageDimensions) -> Self {
        Self {
            source,
            original,
            detections: Vec::new(),
        }
    }

    pub fn source(&self) -> &ImagePayload {
        &self.source
    }

    pub fn original(&self) -> ImageDimensions {
        self.original
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Number of detections per label, in order of first appearance.
    pub fn label_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for detection in &self.detections {
            match counts.iter_mut().find(|(label, _)| *label == detection.label) {
                Some((_, count)) => *count += 1,
                None => counts.push((detection.label.clone(), 1)),
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};
    use uuid::Uuid;

    use super::*;
    use crate::analysis::bbox::FractionalBox;

    fn png_payload(width: u32, height: u32) -> ImagePayload {
        let image = RgbImage::from_pixel(width, height, Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        ImagePayload::from_bytes(bytes).unwrap()
    }

    fn detection(label: &str) -> Detection {
        Detection {
            id: Uuid::new_v4(),
            bbox: FractionalBox {
                x: 0.0,
                y: 0.0,
                width: 0.5,
                height: 0.5,
            },
            label: label.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_dimensions_reject_non_positive() {
        assert!(ImageDimensions::new(0.0, 10.0).is_err());
        assert!(ImageDimensions::new(10.0, -1.0).is_err());
        assert!(ImageDimensions::new(f32::NAN, 10.0).is_err());
        assert!(ImageDimensions::new(1.0, 1.0).is_ok());
    }

    #[test]
    fn test_payload_sniffs_mime_and_dimensions() {
        let payload = png_payload(32, 16);

        assert_eq!(payload.mime, "image/png");
        assert_eq!(payload.file_name(), "image.png");
        assert_eq!(
            payload.intrinsic_dimensions().unwrap(),
            ImageDimensions {
                width: 32.0,
                height: 16.0,
            }
        );
    }

    #[test]
    fn test_data_url_round_trip() {
        let payload = png_payload(4, 4);
        let url = payload.to_data_url();

        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(ImagePayload::from_data_url(&url).unwrap(), payload);
    }

    #[test]
    fn test_data_url_rejects_garbage() {
        assert!(ImagePayload::from_data_url("https://placehold.co/800x600.png").is_err());
        assert!(ImagePayload::from_data_url("data:image/png;base64").is_err());
        assert!(ImagePayload::from_data_url("data:image/png,plain").is_err());
        assert!(ImagePayload::from_data_url("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_undecodable_payload_reports_image_load() {
        let payload = ImagePayload::new(vec![1u8, 2, 3], "image/jpeg");

        assert_eq!(payload.file_name(), "image.jpeg");
        let err = payload.decode().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ImageLoad);
        assert!(err.to_string().starts_with("Image failed to load: "));

        let err = ImagePayload::from_bytes(vec![1u8, 2, 3]).unwrap_err();
        assert!(err.to_string().starts_with("Image failed to load: "));
        assert!(!err.to_string().contains("resizing"));
    }

    #[test]
    fn test_label_counts_first_appearance_order() {
        let payload = png_payload(2, 2);
        let original = payload.intrinsic_dimensions().unwrap();
        let image = AnnotatedImage::new(
            payload,
            DetectionSet {
                original,
                detections: vec![
                    detection("Oxygen Tank"),
                    detection("Toolbox"),
                    detection("Oxygen Tank"),
                    detection("Helmet"),
                ],
            },
        );

        assert_eq!(
            image.label_counts(),
            vec![
                ("Oxygen Tank".to_string(), 2),
                ("Toolbox".to_string(), 1),
                ("Helmet".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_empty_shell() {
        let payload = png_payload(2, 2);
        let original = payload.intrinsic_dimensions().unwrap();
        let image = AnnotatedImage::empty(payload.clone(), original);

        assert!(image.is_empty());
        assert!(image.label_counts().is_empty());
        assert_eq!(image.source(), &payload);
        assert_eq!(image.original(), original);
    }
}
