//! Interactive overlay for the single-point layout.
//!
//! When the watermark has exactly one instance it is drawn locally on top of
//! a clean page raster, and the user can drag, rotate and resize it. The
//! controller turns pointer events (preview pixels) into [`OverlayUpdate`]s
//! (PDF units) that the owning session applies to its spec and position.
//!
//! Three gesture tracks exist and at most one is active at a time:
//!
//! ```text
//! Idle ──begin_drag───▶ Dragging ──pointer_up/cancel──▶ Idle
//! Idle ──begin_rotate─▶ Rotating ──pointer_up/cancel──▶ Idle
//! Idle ──begin_scale──▶ Scaling  ──pointer_up/cancel──▶ Idle
//! ```
//!
//! Each active gesture owns a [`PointerCapture`], so global listeners are
//! released on every exit path, including dropping the controller mid-gesture.

pub mod capture;

use std::sync::Arc;

use thiserror::Error;

use crate::constants::{
    IMAGE_SCALE_PIXELS_PER_UNIT, MIN_GESTURE_FONT_SIZE, MIN_GESTURE_IMAGE_SCALE,
    ROTATE_HANDLE_OFFSET_DEGREES,
};
use crate::geometry::{normalize_degrees, PageGeometry, Point, PreviewTransform, Size};
use crate::watermark::{WatermarkContent, WatermarkSpec};

pub use capture::{CountingPointerHost, ListenerId, PointerCapture, PointerHost};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OverlayError {
    #[error("A {0:?} gesture is already in progress")]
    GestureInProgress(GestureKind),

    #[error("No gesture in progress")]
    NoActiveGesture,

    #[error("Page geometry or preview size unavailable")]
    TransformUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Idle,
    Dragging,
    Rotating,
    Scaling,
}

/// Change produced by one pointer move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayUpdate {
    /// New single-point position in PDF units
    Moved(Point),
    /// New rotation in whole degrees, within `[0, 360)`
    Rotated(f64),
    FontSize(u32),
    ImageScale(f64),
}

#[derive(Debug, Clone, Copy)]
enum ScaleStart {
    FontSize(u32),
    ImageScale(f64),
}

#[derive(Debug, Clone, Copy)]
enum Gesture {
    Drag {
        start_pointer: Point,
        start_position: Point,
        /// PDF units per pixel, frozen for the whole gesture
        scale: (f64, f64),
    },
    Rotate {
        center: Point,
    },
    Scale {
        start_pointer: Point,
        start: ScaleStart,
    },
}

impl Gesture {
    fn kind(&self) -> GestureKind {
        match self {
            Self::Drag { .. } => GestureKind::Dragging,
            Self::Rotate { .. } => GestureKind::Rotating,
            Self::Scale { .. } => GestureKind::Scaling,
        }
    }

    fn update(&self, pointer: Point) -> OverlayUpdate {
        match *self {
            Self::Drag {
                start_pointer,
                start_position,
                scale,
            } => OverlayUpdate::Moved(Point::new(
                start_position.x + (pointer.x - start_pointer.x) * scale.0,
                start_position.y + (pointer.y - start_pointer.y) * scale.1,
            )),
            Self::Rotate { center } => {
                let dx = pointer.x - center.x;
                let dy = pointer.y - center.y;
                let degrees = dy.atan2(dx).to_degrees() + ROTATE_HANDLE_OFFSET_DEGREES;
                OverlayUpdate::Rotated(normalize_degrees(degrees.round()))
            }
            Self::Scale {
                start_pointer,
                start,
            } => {
                let delta = (pointer.x - start_pointer.x).max(pointer.y - start_pointer.y);
                match start {
                    ScaleStart::FontSize(size) => {
                        let size = (size as f64 + delta)
                            .round()
                            .max(MIN_GESTURE_FONT_SIZE as f64);
                        // Saturating cast keeps absurd drags finite
                        OverlayUpdate::FontSize(size as u32)
                    }
                    ScaleStart::ImageScale(scale) => OverlayUpdate::ImageScale(
                        (scale + delta / IMAGE_SCALE_PIXELS_PER_UNIT).max(MIN_GESTURE_IMAGE_SCALE),
                    ),
                }
            }
        }
    }
}

struct ActiveGesture {
    gesture: Gesture,
    _capture: PointerCapture,
}

/// Pointer gesture state machine for the locally drawn watermark.
pub struct OverlayController {
    host: Arc<dyn PointerHost>,
    active: Option<ActiveGesture>,
}

impl OverlayController {
    pub fn new(host: Arc<dyn PointerHost>) -> Self {
        Self { host, active: None }
    }

    pub fn gesture_kind(&self) -> GestureKind {
        self.active
            .as_ref()
            .map_or(GestureKind::Idle, |a| a.gesture.kind())
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Start moving the watermark. `position` is its current PDF position;
    /// the transform's scale is captured once for the whole gesture.
    pub fn begin_drag(
        &mut self,
        pointer: Point,
        position: Point,
        transform: &PreviewTransform,
    ) -> Result<(), OverlayError> {
        self.begin(Gesture::Drag {
            start_pointer: pointer,
            start_position: position,
            scale: transform.pixel_to_pdf_scale(),
        })
    }

    /// [`begin_drag`](Self::begin_drag) from raw page and preview sizes.
    pub fn begin_drag_on(
        &mut self,
        pointer: Point,
        position: Point,
        page: &PageGeometry,
        preview: Size,
    ) -> Result<(), OverlayError> {
        let transform =
            PreviewTransform::new(*page, preview).ok_or(OverlayError::TransformUnavailable)?;
        self.begin_drag(pointer, position, &transform)
    }

    /// Start rotating around `center`, the element's on-screen center. The
    /// angle depends only on where the pointer is relative to that center.
    pub fn begin_rotate(&mut self, _pointer: Point, center: Point) -> Result<(), OverlayError> {
        self.begin(Gesture::Rotate { center })
    }

    /// Start resizing from the recipe's current font size or image scale.
    pub fn begin_scale(&mut self, pointer: Point, spec: &WatermarkSpec) -> Result<(), OverlayError> {
        let start = match &spec.content {
            WatermarkContent::Text(text) => ScaleStart::FontSize(text.font_size),
            WatermarkContent::Image(image) => ScaleStart::ImageScale(image.scale),
        };
        self.begin(Gesture::Scale {
            start_pointer: pointer,
            start,
        })
    }

    /// Process a pointer move. Returns `None` when no gesture is active.
    pub fn pointer_move(&mut self, pointer: Point) -> Option<OverlayUpdate> {
        let active = self.active.as_ref()?;
        if !pointer.is_finite() {
            return None;
        }
        Some(active.gesture.update(pointer))
    }

    /// End the active gesture and release its listeners.
    pub fn pointer_up(&mut self) -> Result<GestureKind, OverlayError> {
        let active = self.active.take().ok_or(OverlayError::NoActiveGesture)?;
        let kind = active.gesture.kind();
        tracing::debug!(gesture = ?kind, "Overlay gesture ended");
        Ok(kind)
    }

    /// Abandon any active gesture. Safe to call when idle.
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!(gesture = ?active.gesture.kind(), "Overlay gesture cancelled");
        }
    }

    fn begin(&mut self, gesture: Gesture) -> Result<(), OverlayError> {
        if let Some(active) = &self.active {
            return Err(OverlayError::GestureInProgress(active.gesture.kind()));
        }
        tracing::debug!(gesture = ?gesture.kind(), "Overlay gesture started");
        self.active = Some(ActiveGesture {
            gesture,
            _capture: PointerCapture::acquire(self.host.clone()),
        });
        Ok(())
    }
}

impl std::fmt::Debug for OverlayController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayController")
            .field("gesture", &self.gesture_kind())
            .finish()
    }
}

/// What the local overlay draws.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayBody {
    Text {
        content: String,
        font_size_px: f64,
        color: String,
        font_stack: &'static str,
    },
    Image {
        width_px: f64,
        height_px: f64,
    },
}

/// Placement and look of the locally drawn watermark, in preview pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    /// Element center; the element is drawn centered on it
    pub center: Point,
    pub rotation_degrees: f64,
    pub opacity: f64,
    pub body: OverlayBody,
}

/// Overlay style for a watermark at PDF `position`.
pub fn overlay_style(
    spec: &WatermarkSpec,
    position: Point,
    transform: &PreviewTransform,
) -> OverlayStyle {
    let body = match &spec.content {
        WatermarkContent::Text(text) => OverlayBody::Text {
            content: text.content.clone(),
            font_size_px: transform.pdf_len_to_pixel(text.font_size as f64),
            color: text.color.clone(),
            font_stack: text.font_family.css_stack(),
        },
        WatermarkContent::Image(image) => OverlayBody::Image {
            width_px: transform.pdf_len_to_pixel(image.natural_width * image.scale),
            height_px: transform.pdf_len_to_pixel(image.natural_height * image.scale),
        },
    };

    OverlayStyle {
        center: transform.pdf_to_pixel(position),
        rotation_degrees: spec.rotation_degrees,
        opacity: spec.opacity,
        body,
    }
}
