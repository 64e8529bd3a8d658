use std::{fs, io::Cursor, path::Path};

use ab_glyph::{FontVec, PxScale};
use glam::Vec2;
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::{
    drawing::{draw_hollow_rect_mut, draw_text_mut, text_size},
    rect::Rect,
};
use snafu::ResultExt;
use tracing::*;

use crate::{annotation::image::AnnotatedImage, error::*, export::overlay::Overlay};

const LABEL_PADDING: u32 = 4;
const LABEL_BACKGROUND_ALPHA: f32 = 0.6;
const LABEL_TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

pub fn load_font<P: AsRef<Path>>(path: P) -> Result<FontVec, OrbisError> {
    let path = path.as_ref();
    let data = fs::read(path).context(IoReadSnafu {
        path: path.display().to_string(),
    })?;
    FontVec::try_from_vec(data).context(FontSnafu)
}

/// Box outline thickness for an image `width` pixels wide.
pub fn stroke_width(width: f32) -> u32 {
    (width * 0.003).max(2.0).round() as u32
}

/// Label font size for an image `width` pixels wide.
pub fn font_size(width: f32) -> f32 {
    (width * 0.015).max(12.0)
}

/// Burns every detection of `image` into a copy of the original raster.
///
/// Boxes are clamped to the raster for drawing only. Without a font only the
/// outlines are drawn.
pub fn render_annotated(
    image: &AnnotatedImage,
    font: Option<&FontVec>,
) -> Result<RgbImage, OrbisError> {
    let mut canvas = image.source().decode()?.to_rgb8();
    let (raster_width, raster_height) = canvas.dimensions();
    let frame = Vec2::new(raster_width as f32, raster_height as f32);

    let stroke = stroke_width(frame.x);
    let scale = PxScale::from(font_size(frame.x));

    for detection in image.detections() {
        let overlay = Overlay::from_detection(detection);
        let bbox = detection.bbox.to_pixels(frame).clamp(Vec2::ZERO, frame);
        let size = bbox.size();
        if size.x < 1.0 || size.y < 1.0 {
            debug!("detection {} lies outside the image, not drawn", detection.id);
            continue;
        }

        let x = bbox.min.x.round() as i32;
        let y = bbox.min.y.round() as i32;
        let width = size.x.round() as u32;
        let height = size.y.round() as u32;
        let color = Rgb(overlay.color);

        // Inset strokes so the outline stays inside the clamped box
        for offset in 0..stroke.min(width / 2).min(height / 2).max(1) {
            let rect = Rect::at(x + offset as i32, y + offset as i32)
                .of_size(width - offset * 2, height - offset * 2);
            draw_hollow_rect_mut(&mut canvas, rect, color);
        }

        let Some(font) = font else {
            continue;
        };

        let caption = overlay.caption();
        let (text_width, text_height) = text_size(scale, font, &caption);
        let background_width = text_width + LABEL_PADDING * 2;
        let background_height = text_height + LABEL_PADDING * 2;
        // Above the box, or inside it when the box touches the top edge
        let background_y = (y - background_height as i32).max(0);

        darken(
            &mut canvas,
            x,
            background_y,
            background_width,
            background_height,
            LABEL_BACKGROUND_ALPHA,
        );
        draw_text_mut(
            &mut canvas,
            LABEL_TEXT_COLOR,
            x + LABEL_PADDING as i32,
            background_y + LABEL_PADDING as i32,
            scale,
            font,
            &caption,
        );
    }

    Ok(canvas)
}

/// Blends black over a rectangle with the given opacity, clipped to the canvas.
fn darken(canvas: &mut RgbImage, x: i32, y: i32, width: u32, height: u32, alpha: f32) {
    let (canvas_width, canvas_height) = canvas.dimensions();
    let x_start = x.max(0) as u32;
    let y_start = y.max(0) as u32;
    let x_end = ((x + width as i32).max(0) as u32).min(canvas_width);
    let y_end = ((y + height as i32).max(0) as u32).min(canvas_height);
    let keep = 1.0 - alpha;

    for py in y_start..y_end {
        for px in x_start..x_end {
            let pixel = canvas.get_pixel_mut(px, py);
            for channel in pixel.0.iter_mut() {
                *channel = (*channel as f32 * keep).round() as u8;
            }
        }
    }
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, OrbisError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .context(ImageEncodeSnafu { stage: "export-png" })?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{
        analysis::bbox::FractionalBox,
        annotation::{
            element::{Detection, DetectionSet},
            image::ImagePayload,
        },
        error::ErrorKind,
        pipeline::mock::png_payload,
    };

    fn annotated(payload: ImagePayload, boxes: &[(&str, FractionalBox)]) -> AnnotatedImage {
        let original = payload.intrinsic_dimensions().unwrap();
        let detections = boxes
            .iter()
            .map(|(label, bbox)| Detection {
                id: Uuid::new_v4(),
                bbox: *bbox,
                label: label.to_string(),
                confidence: 0.9,
            })
            .collect();
        AnnotatedImage::new(payload, DetectionSet { original, detections })
    }

    #[test]
    fn test_sizes_follow_image_width() {
        assert_eq!(stroke_width(100.0), 2);
        assert_eq!(stroke_width(4000.0), 12);
        assert_eq!(font_size(400.0), 12.0);
        assert_eq!(font_size(2000.0), 30.0);
    }

    #[test]
    fn test_render_draws_label_colour_outline() {
        let image = annotated(
            png_payload(100, 100),
            &[(
                "Toolbox",
                FractionalBox {
                    x: 0.2,
                    y: 0.2,
                    width: 0.5,
                    height: 0.5,
                },
            )],
        );

        let canvas = render_annotated(&image, None).unwrap();

        assert_eq!(canvas.dimensions(), (100, 100));
        assert_eq!(canvas.get_pixel(20, 40), &Rgb([59, 130, 246]));
        assert_eq!(canvas.get_pixel(21, 40), &Rgb([59, 130, 246]));
        // Interior and outside stay untouched
        assert_eq!(canvas.get_pixel(45, 45), &Rgb([200, 200, 200]));
        assert_eq!(canvas.get_pixel(5, 5), &Rgb([200, 200, 200]));
    }

    #[test]
    fn test_render_clamps_out_of_frame_boxes() {
        let image = annotated(
            png_payload(50, 50),
            &[
                (
                    "Helmet",
                    FractionalBox {
                        x: 0.5,
                        y: 0.5,
                        width: 0.9,
                        height: 0.9,
                    },
                ),
                (
                    "Toolbox",
                    FractionalBox {
                        x: 1.5,
                        y: 1.5,
                        width: 0.2,
                        height: 0.2,
                    },
                ),
            ],
        );

        let canvas = render_annotated(&image, None).unwrap();

        assert_eq!(canvas.get_pixel(25, 30), &Rgb([250, 204, 21]));
        assert_eq!(canvas.get_pixel(49, 30), &Rgb([250, 204, 21]));
    }

    #[test]
    fn test_darken_blends_and_clips() {
        let mut canvas = RgbImage::from_pixel(10, 10, Rgb([100, 200, 50]));

        darken(&mut canvas, -2, 8, 5, 5, 0.6);

        assert_eq!(canvas.get_pixel(0, 9), &Rgb([40, 80, 20]));
        assert_eq!(canvas.get_pixel(2, 9), &Rgb([40, 80, 20]));
        assert_eq!(canvas.get_pixel(3, 9), &Rgb([100, 200, 50]));
        assert_eq!(canvas.get_pixel(0, 7), &Rgb([100, 200, 50]));
    }

    #[test]
    fn test_encode_png_round_trip_size() {
        let canvas = RgbImage::from_pixel(7, 3, Rgb([1, 2, 3]));

        let bytes = encode_png(&canvas).unwrap();
        let payload = ImagePayload::from_bytes(bytes).unwrap();

        assert_eq!(payload.mime, "image/png");
        assert_eq!(payload.decode().unwrap().to_rgb8(), canvas);
    }

    #[test]
    fn test_missing_font_file_is_export_error() {
        let err = load_font("/nonexistent/orbis/font.ttf").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Export);
    }

    #[test]
    fn test_undecodable_source_cannot_render() {
        let image = AnnotatedImage::empty(
            ImagePayload::new(vec![0u8; 3], "image/png"),
            crate::annotation::image::ImageDimensions::new(10.0, 10.0).unwrap(),
        );

        assert_eq!(render_annotated(&image, None).unwrap_err().kind(), ErrorKind::ImageLoad);
    }
}
