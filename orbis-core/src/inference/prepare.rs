use std::io::Cursor;

use image::{codecs::jpeg::JpegEncoder, imageops::FilterType};
use snafu::ResultExt;
use tracing::*;

use crate::{
    annotation::image::{ImageDimensions, ImagePayload},
    consts::{JPEG_QUALITY, MAX_DIMENSION},
    error::*,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmissionOptions {
    pub max_dimension: u32,
    pub jpeg_quality: u8,
}

impl Default for SubmissionOptions {
    fn default() -> Self {
        Self {
            max_dimension: MAX_DIMENSION,
            jpeg_quality: JPEG_QUALITY,
        }
    }
}

/// The image actually sent to the detector.
#[derive(Clone, Debug)]
pub struct Submission {
    pub payload: ImagePayload,
    /// Size the detector's pixel coordinates refer to.
    pub dimensions: ImageDimensions,
    pub resized: bool,
}

/// Size an image must be submitted at so that neither side exceeds `max_dimension`.
///
/// The larger side becomes exactly `max_dimension` and the smaller one keeps the
/// original aspect ratio. Images that already fit are returned unchanged.
pub fn scaled_dimensions(original: ImageDimensions, max_dimension: f32) -> ImageDimensions {
    if original.fits_within(max_dimension) {
        return original;
    }

    let aspect_ratio = original.aspect_ratio();
    if original.width > original.height {
        ImageDimensions {
            width: max_dimension,
            height: max_dimension / aspect_ratio,
        }
    } else {
        ImageDimensions {
            width: max_dimension * aspect_ratio,
            height: max_dimension,
        }
    }
}

/// Produces the detector-ready payload for `source`.
///
/// The reported dimensions are the exact scaled size; the encoded raster is
/// truncated to whole pixels.
pub fn prepare_submission(
    source: &ImagePayload,
    original: ImageDimensions,
    options: SubmissionOptions,
) -> Result<Submission, OrbisError> {
    let dimensions = scaled_dimensions(original, options.max_dimension as f32);
    if dimensions == original {
        debug!(
            "image {}x{} fits within {}, submitting as is",
            original.width, original.height, options.max_dimension
        );
        return Ok(Submission {
            payload: source.clone(),
            dimensions,
            resized: false,
        });
    }

    let image = source.decode()?;
    let raster_width = dimensions.width.floor().max(1.0) as u32;
    let raster_height = dimensions.height.floor().max(1.0) as u32;

    info!(
        "resizing {}x{} to {}x{} before submission",
        original.width, original.height, raster_width, raster_height
    );

    let resized = image
        .resize_exact(raster_width, raster_height, FilterType::Triangle)
        .to_rgb8();

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut bytes), options.jpeg_quality);
    resized
        .write_with_encoder(encoder)
        .context(ImageEncodeSnafu {
            stage: "submission-jpeg",
        })?;

    Ok(Submission {
        payload: ImagePayload::new(bytes, "image/jpeg"),
        dimensions,
        resized: true,
    })
}
