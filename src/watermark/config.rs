//! Watermark recipe types.
//!
//! A [`WatermarkSpec`] is the immutable description of one watermark:
//! - what is drawn (text or image) and how it looks
//! - shared opacity and rotation
//! - how instances are laid out on the page (single, 3×3 grid, tiled)
//!
//! Every edit produces a new spec through the `with_*` methods; nothing
//! mutates a spec in place.

use serde::{Deserialize, Serialize};

use super::WatermarkError;
use crate::constants::{
    DEFAULT_COLOR, DEFAULT_FONT_SIZE, DEFAULT_IMAGE_SCALE, DEFAULT_IMAGE_SIDE, DEFAULT_OPACITY,
    DEFAULT_ROTATION_DEGREES, DEFAULT_WATERMARK_TEXT, DENSE_MULTIPLIER, LOOSE_MULTIPLIER,
    MODERATE_MULTIPLIER,
};
use crate::geometry::{estimate_text_extent, normalize_degrees, project_rotated_extent, ProjectedExtent};

// Default values
fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_opacity() -> f64 {
    DEFAULT_OPACITY
}

fn default_rotation() -> f64 {
    DEFAULT_ROTATION_DEGREES
}

fn default_image_side() -> f64 {
    DEFAULT_IMAGE_SIDE
}

fn default_image_scale() -> f64 {
    DEFAULT_IMAGE_SCALE
}

/// How watermark instances are arranged on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One instance, freely positioned by the user
    #[default]
    Single,
    /// Nine instances at the centers of a 3×3 partition
    #[serde(alias = "nine-grid")]
    Grid3x3,
    /// Density-controlled tiling across the whole page
    #[serde(alias = "full-screen")]
    Tiled,
}

impl Layout {
    /// Whether the layout can be composited locally as a single overlay.
    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single)
    }
}

/// Spacing between tiled instances. Only meaningful for [`Layout::Tiled`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Loose,
    #[default]
    Moderate,
    Dense,
}

impl Density {
    /// Step multipliers `(x, y)` in multiples of the projected extent.
    pub fn multiplier(&self) -> (f64, f64) {
        match self {
            Self::Loose => LOOSE_MULTIPLIER,
            Self::Moderate => MODERATE_MULTIPLIER,
            Self::Dense => DENSE_MULTIPLIER,
        }
    }
}

/// Font families the rendering engine knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    Song,
    Kai,
    Xingkai,
    Yahei,
    TimesRoman,
}

impl FontFamily {
    /// Name sent to the rendering engine.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Song => "song",
            Self::Kai => "kai",
            Self::Xingkai => "xingkai",
            Self::Yahei => "yahei",
            Self::TimesRoman => "times-roman",
        }
    }

    /// Font stack used when the overlay is drawn locally.
    ///
    /// The local stack and the engine's embedded fonts are not guaranteed to
    /// match, so a single-point overlay can differ slightly from the exported
    /// result. This is a known discrepancy.
    pub fn css_stack(&self) -> &'static str {
        match self {
            Self::Song => "\"SimSun\", \"Songti SC\", serif",
            Self::Kai => "\"KaiTi\", \"Kaiti SC\", serif",
            Self::Xingkai => "\"STXingkai\", \"Xingkai SC\", cursive",
            Self::Yahei => "\"Microsoft YaHei\", \"Heiti SC\", sans-serif",
            Self::TimesRoman => "\"Times New Roman\", serif",
        }
    }
}

/// Text watermark attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAttributes {
    /// Text drawn on the page
    pub content: String,

    /// Font size in PDF units (default: 50)
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    #[serde(default)]
    pub font_family: FontFamily,

    /// Color as hex string (default: "#000000")
    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for TextAttributes {
    fn default() -> Self {
        Self {
            content: DEFAULT_WATERMARK_TEXT.to_string(),
            font_size: default_font_size(),
            font_family: FontFamily::default(),
            color: default_color(),
        }
    }
}

/// Image watermark attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAttributes {
    /// Intrinsic width of the uploaded image in pixels
    #[serde(default = "default_image_side")]
    pub natural_width: f64,

    /// Intrinsic height of the uploaded image in pixels
    #[serde(default = "default_image_side")]
    pub natural_height: f64,

    /// Scale applied to the natural size (default: 0.5)
    #[serde(default = "default_image_scale")]
    pub scale: f64,
}

impl Default for ImageAttributes {
    fn default() -> Self {
        Self {
            natural_width: default_image_side(),
            natural_height: default_image_side(),
            scale: default_image_scale(),
        }
    }
}

/// What the watermark draws.
///
/// Uses a serde tag to distinguish the kinds in YAML:
/// ```yaml
/// content:
///   type: text
///   content: "CONFIDENTIAL"
///   font_size: 50
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WatermarkContent {
    Text(TextAttributes),
    Image(ImageAttributes),
}

impl Default for WatermarkContent {
    fn default() -> Self {
        Self::Text(TextAttributes::default())
    }
}

/// Immutable watermark recipe from which placements are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkSpec {
    #[serde(default)]
    pub content: WatermarkContent,

    /// Opacity from 0.0 (transparent) to 1.0 (opaque) (default: 0.3)
    #[serde(default = "default_opacity")]
    pub opacity: f64,

    /// Rotation in degrees, kept in [0, 360) (default: 45)
    #[serde(default = "default_rotation")]
    pub rotation_degrees: f64,

    #[serde(default)]
    pub layout: Layout,

    #[serde(default)]
    pub density: Density,
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self {
            content: WatermarkContent::default(),
            opacity: default_opacity(),
            rotation_degrees: default_rotation(),
            layout: Layout::default(),
            density: Density::default(),
        }
    }
}

impl WatermarkSpec {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: WatermarkContent::Text(TextAttributes {
                content: content.into(),
                ..TextAttributes::default()
            }),
            ..Self::default()
        }
    }

    pub fn image(natural_width: f64, natural_height: f64) -> Self {
        Self {
            content: WatermarkContent::Image(ImageAttributes {
                natural_width,
                natural_height,
                ..ImageAttributes::default()
            }),
            ..Self::default()
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_density(mut self, density: Density) -> Self {
        self.density = density;
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation_degrees = normalize_degrees(degrees);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            default_opacity()
        };
        self
    }

    /// Replace the font size. No effect on image watermarks.
    pub fn with_font_size(mut self, font_size: u32) -> Self {
        if let WatermarkContent::Text(text) = &mut self.content {
            text.font_size = font_size;
        }
        self
    }

    /// Replace the image scale. No effect on text watermarks.
    pub fn with_image_scale(mut self, scale: f64) -> Self {
        if let WatermarkContent::Image(image) = &mut self.content {
            image.scale = scale;
        }
        self
    }

    pub fn with_content(mut self, content: WatermarkContent) -> Self {
        self.content = content;
        self
    }

    pub fn text_attributes(&self) -> Option<&TextAttributes> {
        match &self.content {
            WatermarkContent::Text(text) => Some(text),
            WatermarkContent::Image(_) => None,
        }
    }

    pub fn image_attributes(&self) -> Option<&ImageAttributes> {
        match &self.content {
            WatermarkContent::Image(image) => Some(image),
            WatermarkContent::Text(_) => None,
        }
    }

    /// Unrotated `(width, height)` of one instance in PDF units.
    pub fn base_size(&self) -> (f64, f64) {
        match &self.content {
            WatermarkContent::Text(text) => estimate_text_extent(text.font_size as f64, &text.content),
            WatermarkContent::Image(image) => (
                image.natural_width * image.scale,
                image.natural_height * image.scale,
            ),
        }
    }

    /// Bounding box of one rotated instance, used to space tiled copies.
    pub fn projected_extent(&self) -> ProjectedExtent {
        let (w, h) = self.base_size();
        project_rotated_extent(w, h, self.rotation_degrees)
    }

    /// Validate the recipe.
    pub fn validate(&self) -> Result<(), WatermarkError> {
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(WatermarkError::InvalidSpec(format!(
                "opacity must be a finite value between 0.0 and 1.0, got {}",
                self.opacity
            )));
        }

        if !self.rotation_degrees.is_finite() {
            return Err(WatermarkError::InvalidSpec(format!(
                "rotation must be finite, got {}",
                self.rotation_degrees
            )));
        }

        match &self.content {
            WatermarkContent::Text(text) => text.validate(),
            WatermarkContent::Image(image) => image.validate(),
        }
    }
}

impl TextAttributes {
    fn validate(&self) -> Result<(), WatermarkError> {
        if self.content.is_empty() {
            return Err(WatermarkError::InvalidSpec(
                "text watermark content cannot be empty".to_string(),
            ));
        }

        if self.font_size == 0 {
            return Err(WatermarkError::InvalidSpec(
                "text watermark font size must be at least 1".to_string(),
            ));
        }

        // Validate hex color format (#RGB or #RRGGBB)
        if let Some(hex_part) = self.color.strip_prefix('#') {
            let len = hex_part.len();
            if (len != 3 && len != 6) || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(WatermarkError::InvalidSpec(format!(
                    "text watermark color must be in #RGB or #RRGGBB format, got '{}'",
                    self.color
                )));
            }
        } else {
            return Err(WatermarkError::InvalidSpec(format!(
                "text watermark color must be a hex string starting with '#', got '{}'",
                self.color
            )));
        }

        Ok(())
    }
}

impl ImageAttributes {
    fn validate(&self) -> Result<(), WatermarkError> {
        for (name, value) in [
            ("natural_width", self.natural_width),
            ("natural_height", self.natural_height),
            ("scale", self.scale),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(WatermarkError::InvalidSpec(format!(
                    "image watermark {} must be a positive finite value, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
