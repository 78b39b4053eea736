//! Application-wide constants.
//! Sizes are CSS pixels and positions are percentages of the canvas unless noted otherwise.

/// Maximum number of entries on a roster.
pub const ROSTER_CAPACITY: usize = 6;

/// Number of base entries in the remote catalog.
pub const CATALOG_UNIVERSE: u32 = 1025;
/// Ids requested per sequential batch.
pub const BATCH_SIZE: u32 = 50;
/// Attempts per batch before it is given up.
pub const MAX_BATCH_ATTEMPTS: u32 = 3;
/// Fixed pause between batch attempts (ms). No backoff, no jitter.
pub const RETRY_DELAY_MS: u32 = 1000;
/// Catalog API root used when the page does not override it.
pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";
/// Body some proxies return instead of JSON.
pub const PLACEHOLDER_BODY: &str = "OK";

pub const TRAINER_DEFAULT_SIZE: u32 = 140;
pub const ROSTER_DEFAULT_SIZE: u32 = 60;
pub const NAME_DEFAULT_FONT_PX: u32 = 24;

/// Pinch-resize bounds for sprites.
pub const PINCH_SIZE_MIN: u32 = 40;
pub const PINCH_SIZE_MAX: u32 = 500;
/// Slider bounds for sprites.
pub const SLIDER_SIZE_MIN: u32 = 40;
pub const SLIDER_SIZE_MAX: u32 = 300;
/// Font-size bounds for the name label (pinch and slider).
pub const FONT_SIZE_MIN: u32 = 12;
pub const FONT_SIZE_MAX: u32 = 72;

/// Rotation applied by one press of a rotate button (degrees).
pub const ROTATION_STEP_DEG: i32 = 10;
/// Gestures longer than this are drags; the click that follows is ignored (ms).
pub const DRAG_CLICK_THRESHOLD_MS: f64 = 100.0;
/// A press this soon after a release, with that release's click still
/// pending, is the browser's emulated mouse press for a tap (ms).
pub const COMPAT_MOUSE_WINDOW_MS: f64 = 500.0;

/// Export: card-grid sprites are re-rasterized at this size and shown at the display size.
pub const CARD_SPRITE_TARGET_PX: u32 = 160;
pub const CARD_SPRITE_DISPLAY_PX: u32 = 80;
/// Export: party sprites are re-rasterized at `max(size * factor, min)`.
pub const PARTY_UPSCALE_FACTOR: f64 = 1.5;
pub const PARTY_SPRITE_MIN_TARGET_PX: u32 = 120;
/// Export: rasterizer device-pixel ratio.
pub const CAPTURE_SCALE_DESKTOP: f64 = 4.0;
pub const CAPTURE_SCALE_TOUCH: f64 = 2.0;

pub const DEFAULT_TRAINER_NAME: &str = "Trainer";
pub const DEFAULT_PRIMARY_COLOR: &str = "#667eea";
pub const DEFAULT_SECONDARY_COLOR: &str = "#764ba2";

/// Bundled trainer sprites, first one is the default.
pub const TRAINER_PRESETS: [&str; 16] = [
    "Vincent", "Arnold", "Luna", "Alphonse", "Troy", "Aria", "Blake", "Leah", "Cassie", "Maeve",
    "Destiny", "Pierce", "Noah", "Vivian", "Axel", "Kaz",
];

/// Relative asset path of a bundled trainer sprite.
pub fn trainer_preset_path(name: &str) -> String {
    format!("assets/Trainer_{name}.png")
}
