//! Two-tier pan/zoom view transform.
//!
//! The camera keeps a committed ("steady") zoom and pan plus a live
//! in-gesture tier. While a gesture is in flight the two combine; on
//! gesture end the live tier folds into the steady tier. Pan is
//! accumulated in document space (screen translation divided by the
//! current zoom) so a committed pan stays put when the zoom changes.

use kurbo::{Point, Size, Vec2};

/// Camera over a center-origin document.
///
/// Screen position of a document point `d` with viewport size `v`:
/// `d * zoom_scale() + v / 2 + pan_offset()`.
#[derive(Debug, Clone)]
pub struct Camera {
    steady_zoom: f64,
    /// Committed pan, in document space.
    steady_pan: Vec2,
    gesture_zoom: f64,
    /// Live pan tier, in document space.
    gesture_pan: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            steady_zoom: 1.0,
            steady_pan: Vec2::ZERO,
            gesture_zoom: 1.0,
            gesture_pan: Vec2::ZERO,
        }
    }
}

impl Camera {
    /// Create a camera at identity zoom and no pan.
    pub fn new() -> Self {
        Self::default()
    }

    /// The effective zoom, steady and live tiers combined.
    pub fn zoom_scale(&self) -> f64 {
        self.steady_zoom * self.gesture_zoom
    }

    /// The committed zoom between gestures.
    pub fn steady_zoom(&self) -> f64 {
        self.steady_zoom
    }

    /// The effective pan offset in screen space.
    pub fn pan_offset(&self) -> Vec2 {
        (self.steady_pan + self.gesture_pan) * self.zoom_scale()
    }

    /// The committed pan in document space.
    pub fn steady_pan(&self) -> Vec2 {
        self.steady_pan
    }

    /// Update the live pan tier from a raw screen-space drag translation.
    pub fn pan_changed(&mut self, translation: Vec2) {
        self.gesture_pan = translation / self.zoom_scale();
    }

    /// Commit a finished pan gesture into the steady tier.
    pub fn pan_ended(&mut self, translation: Vec2) {
        self.gesture_pan = Vec2::ZERO;
        self.steady_pan += translation / self.zoom_scale();
    }

    /// Update the live zoom tier from a magnification factor.
    /// Ignores non-positive or non-finite factors.
    pub fn magnify_changed(&mut self, scale: f64) {
        if scale.is_finite() && scale > 0.0 {
            self.gesture_zoom = scale;
        }
    }

    /// Commit a finished magnification into the steady tier.
    pub fn magnify_ended(&mut self, scale: f64) {
        self.gesture_zoom = 1.0;
        if scale.is_finite() && scale > 0.0 {
            self.steady_zoom *= scale;
        }
    }

    /// Fit an image of the given natural size into the viewport and
    /// reset the pan. No-op when any dimension is zero or negative.
    pub fn zoom_to_fit(&mut self, viewport: Size, image: Size) {
        if viewport.width <= 0.0
            || viewport.height <= 0.0
            || image.width <= 0.0
            || image.height <= 0.0
        {
            return;
        }
        let h_zoom = viewport.width / image.width;
        let v_zoom = viewport.height / image.height;
        self.steady_zoom = h_zoom.min(v_zoom);
        self.steady_pan = Vec2::ZERO;
        self.gesture_zoom = 1.0;
        self.gesture_pan = Vec2::ZERO;
        log::debug!("zoom to fit: scale {}", self.steady_zoom);
    }

    /// Convert a raw viewport point (top-left origin) to a document
    /// point: shift to center origin, undo the pan, undo the zoom.
    pub fn document_point(&self, viewport_point: Point, viewport: Size) -> Point {
        let pan = self.pan_offset();
        let x = viewport_point.x - viewport.width / 2.0 - pan.x;
        let y = viewport_point.y - viewport.height / 2.0 - pan.y;
        let zoom = self.zoom_scale();
        Point::new(x / zoom, y / zoom)
    }

    /// Convert a document point to a viewport point (top-left origin).
    pub fn viewport_point(&self, document_point: Point, viewport: Size) -> Point {
        let zoom = self.zoom_scale();
        let pan = self.pan_offset();
        Point::new(
            document_point.x * zoom + viewport.width / 2.0 + pan.x,
            document_point.y * zoom + viewport.height / 2.0 + pan.y,
        )
    }
}
