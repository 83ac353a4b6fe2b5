// Constants module - centralized default values and fixed tuning parameters
//
// Placement heuristics, gesture floors and preview timings live here so the
// numbers the rendering engine and the local overlay must agree on are
// defined exactly once.

// =============================================================================
// Placement heuristics
// =============================================================================

/// Estimated glyph width as a fraction of the font size (no font metrics)
pub const TEXT_GLYPH_WIDTH_FACTOR: f64 = 0.5;

/// Minimum distance between tiled watermark centers, in PDF units
pub const MIN_TILE_STEP: f64 = 100.0;

/// Upper bound on tiled columns
pub const MAX_TILE_COLUMNS: usize = 15;

/// Upper bound on tiled rows
pub const MAX_TILE_ROWS: usize = 20;

/// Grid layout is always 3 × 3
pub const GRID_DIVISIONS: usize = 3;

/// Density multipliers `(x, y)`, in multiples of the projected extent
pub const LOOSE_MULTIPLIER: (f64, f64) = (2.5, 3.0);
pub const MODERATE_MULTIPLIER: (f64, f64) = (1.5, 2.0);
pub const DENSE_MULTIPLIER: (f64, f64) = (1.0, 1.2);

// =============================================================================
// Gesture floors
// =============================================================================

/// Smallest font size reachable through the resize handle
pub const MIN_GESTURE_FONT_SIZE: u32 = 10;

/// Smallest image scale reachable through the resize handle
pub const MIN_GESTURE_IMAGE_SCALE: f64 = 0.1;

/// Pixels of handle travel per 1.0 of image scale
pub const IMAGE_SCALE_PIXELS_PER_UNIT: f64 = 100.0;

/// The rotate handle sits above the element, so pointer angle is offset by 90°
pub const ROTATE_HANDLE_OFFSET_DEGREES: f64 = 90.0;

// =============================================================================
// Preview defaults
// =============================================================================

/// Quiet period before the add-watermark preview is re-rendered
pub const DEFAULT_WATERMARK_DEBOUNCE_MS: u64 = 300;

/// Quiet period before the remove-watermark preview is re-rendered
pub const DEFAULT_REMOVAL_DEBOUNCE_MS: u64 = 200;

// =============================================================================
// Renderer defaults
// =============================================================================

/// Default base URL of the rendering engine
pub const DEFAULT_RENDERER_URL: &str = "http://127.0.0.1:8000";

/// Default rendering engine request timeout in seconds
pub const DEFAULT_RENDERER_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// Logging defaults
// =============================================================================

/// Default log level when neither the config nor `RUST_LOG` sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Watermark defaults
// =============================================================================

pub const DEFAULT_WATERMARK_TEXT: &str = "Hajihan PDF";
pub const DEFAULT_FONT_SIZE: u32 = 50;
pub const DEFAULT_COLOR: &str = "#000000";
pub const DEFAULT_OPACITY: f64 = 0.3;
pub const DEFAULT_ROTATION_DEGREES: f64 = 45.0;
pub const DEFAULT_IMAGE_SIDE: f64 = 200.0;
pub const DEFAULT_IMAGE_SCALE: f64 = 0.5;
