use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A 2D axis-aligned bounding box in pixel units, represented by minimum and maximum points.
///
/// Image coordinates are used throughout: the origin is the top-left corner and
/// Y grows downward, so `min` is the top-left corner and `max` the bottom-right one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bbox {
    /// The minimum point of the bounding box (top-left corner).
    pub min: Vec2,
    /// The maximum point of the bounding box (bottom-right corner).
    pub max: Vec2,
}

impl Bbox {
    /// Creates a new bounding box from minimum and maximum points.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use orbis_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 5.0));
    /// assert_eq!(bbox.size(), Vec2::new(10.0, 5.0));
    /// ```
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates a new bounding box from a minimum point and size vector.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use orbis_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new_from_min_size(Vec2::new(1.0, 2.0), Vec2::new(5.0, 3.0));
    /// assert_eq!(bbox.max, Vec2::new(6.0, 5.0));
    /// ```
    pub fn new_from_min_size(min: Vec2, size: Vec2) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    /// Creates a bounding box from the `[x_min, y_min, x_max, y_max]` layout used by
    /// the detection service.
    ///
    /// The corners are taken as given. A box with `x_max < x_min` produces a
    /// negative size rather than being reordered.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use orbis_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::from_xyxy([10.0, 20.0, 50.0, 80.0]);
    /// assert_eq!(bbox.min, Vec2::new(10.0, 20.0));
    /// assert_eq!(bbox.max, Vec2::new(50.0, 80.0));
    /// ```
    pub fn from_xyxy([x_min, y_min, x_max, y_max]: [f32; 4]) -> Self {
        Self {
            min: Vec2::new(x_min, y_min),
            max: Vec2::new(x_max, y_max),
        }
    }

    /// Width and height of the bounding box.
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Clamps the bounding box coordinates to stay within the specified bounds.
    ///
    /// Used when burning boxes into a raster, never on detection output.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use orbis_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new(Vec2::new(-10.0, -5.0), Vec2::new(1030.0, 1030.0));
    /// let clamped = bbox.clamp(Vec2::new(0.0, 0.0), Vec2::new(1023.0, 1023.0));
    /// assert_eq!(clamped.min, Vec2::new(0.0, 0.0));
    /// assert_eq!(clamped.max, Vec2::new(1023.0, 1023.0));
    /// ```
    pub fn clamp(&self, min_bounds: Vec2, max_bounds: Vec2) -> Self {
        Self {
            min: self.min.max(min_bounds),
            max: self.max.min(max_bounds),
        }
    }

    /// Expresses this pixel box as fractions of `frame`, the size of the image the
    /// pixel coordinates refer to.
    ///
    /// No clamping happens here: a box reaching past the frame yields fractions
    /// above 1.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use orbis_core::analysis::bbox::{Bbox, FractionalBox};
    /// let bbox = Bbox::from_xyxy([25.0, 50.0, 75.0, 150.0]);
    /// let fraction = bbox.normalize(Vec2::new(100.0, 200.0));
    /// assert_eq!(fraction, FractionalBox { x: 0.25, y: 0.25, width: 0.5, height: 0.5 });
    /// ```
    pub fn normalize(&self, frame: Vec2) -> FractionalBox {
        let min = self.min / frame;
        let size = self.size() / frame;

        FractionalBox {
            x: min.x,
            y: min.y,
            width: size.x,
            height: size.y,
        }
    }
}

/// A bounding box expressed as fractions of an image's width and height.
///
/// `x`/`y` locate the top-left corner. Values are nominally in `[0, 1]`, but
/// detector output is not clamped so `x + width` may exceed 1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FractionalBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FractionalBox {
    /// Projects the fractional box onto an image of the given pixel size.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use orbis_core::analysis::bbox::FractionalBox;
    /// let fraction = FractionalBox { x: 0.25, y: 0.5, width: 0.5, height: 0.25 };
    /// let bbox = fraction.to_pixels(Vec2::new(400.0, 200.0));
    /// assert_eq!(bbox.min, Vec2::new(100.0, 100.0));
    /// assert_eq!(bbox.max, Vec2::new(300.0, 150.0));
    /// ```
    pub fn to_pixels(&self, frame: Vec2) -> Bbox {
        Bbox::new_from_min_size(
            Vec2::new(self.x, self.y) * frame,
            Vec2::new(self.width, self.height) * frame,
        )
    }

    /// The same box in percent, as used by CSS overlays.
    pub fn to_percent(&self) -> FractionalBox {
        FractionalBox {
            x: self.x * 100.0,
            y: self.y * 100.0,
            width: self.width * 100.0,
            height: self.height * 100.0,
        }
    }
}
