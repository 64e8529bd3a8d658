use uuid::Uuid;

use crate::{
    analysis::labels::label_color,
    annotation::{element::Detection, image::AnnotatedImage},
};

/// A detection positioned for display on top of the original image.
///
/// Geometry is in percent of the intrinsic size, so the overlay follows the
/// image however it is scaled on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    pub id: Uuid,
    pub label: String,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub color: [u8; 3],
    pub confidence_percent: u32,
}

impl Overlay {
    pub fn from_detection(detection: &Detection) -> Self {
        let percent = detection.bbox.to_percent();

        Self {
            id: detection.id,
            label: detection.label.clone(),
            left: percent.x,
            top: percent.y,
            width: percent.width,
            height: percent.height,
            color: label_color(&detection.label),
            confidence_percent: confidence_percent(detection.confidence),
        }
    }

    /// Accessible description, e.g. `Detected Toolbox with 87% confidence`.
    pub fn aria_label(&self) -> String {
        format!(
            "Detected {} with {}% confidence",
            self.label, self.confidence_percent
        )
    }

    pub fn caption(&self) -> String {
        format!("{} ({}%)", self.label, self.confidence_percent)
    }

    /// Inline CSS placing the overlay over the image.
    pub fn style(&self) -> String {
        let [r, g, b] = self.color;
        format!(
            "left: {}%; top: {}%; width: {}%; height: {}%; border-color: rgb({}, {}, {});",
            self.left, self.top, self.width, self.height, r, g, b
        )
    }
}

pub fn confidence_percent(confidence: f64) -> u32 {
    (confidence * 100.0).round().max(0.0) as u32
}

pub fn overlays(image: &AnnotatedImage) -> Vec<Overlay> {
    image.detections().iter().map(Overlay::from_detection).collect()
}
