//! Pure planning for the card export: file name, capture scale, sprite
//! re-rasterization sizes and the inline background pinned on the clone.

use crate::composer::{Background, LayoutMode};
use crate::constants::{
    CAPTURE_SCALE_DESKTOP, CAPTURE_SCALE_TOUCH, CARD_SPRITE_DISPLAY_PX, CARD_SPRITE_TARGET_PX,
    DEFAULT_TRAINER_NAME, PARTY_SPRITE_MIN_TARGET_PX, PARTY_UPSCALE_FACTOR,
};

/// Interactive-only controls removed from the exported clone.
pub const STRIP_SELECTORS: &str = ".remove-pokemon-btn, .edit-name-btn, .sprite-upload, \
.sprite-upload-label, .sprite-change-btn, .download-btn, .card-controls, .selection-bar";

/// Roster sprites in either layout.
pub const SPRITE_SELECTOR: &str = ".pokemon-sprite, .party-pokemon-sprite";

const TOUCH_AGENTS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

pub fn download_filename(trainer_name: &str) -> String {
    let name = trainer_name.trim();
    let name = if name.is_empty() {
        DEFAULT_TRAINER_NAME
    } else {
        name
    };
    format!("{name}-team.png")
}

pub fn is_touch_primary(user_agent: &str) -> bool {
    let ua = user_agent.to_lowercase();
    TOUCH_AGENTS.iter().any(|needle| ua.contains(needle))
}

pub fn capture_scale(touch: bool) -> f64 {
    if touch {
        CAPTURE_SCALE_TOUCH
    } else {
        CAPTURE_SCALE_DESKTOP
    }
}

/// Target and on-screen edge lengths for one re-rasterized roster sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteSizing {
    pub target: u32,
    pub display: u32,
}

/// Card sprites render at a fixed grid size; party sprites keep their
/// current size and get at least 1.5x the pixels.
pub fn sprite_sizing(layout: LayoutMode, current_size: u32) -> SpriteSizing {
    match layout {
        LayoutMode::Card => SpriteSizing {
            target: CARD_SPRITE_TARGET_PX,
            display: CARD_SPRITE_DISPLAY_PX,
        },
        LayoutMode::Party => {
            let scaled = (f64::from(current_size) * PARTY_UPSCALE_FACTOR).round() as u32;
            SpriteSizing {
                target: scaled.max(PARTY_SPRITE_MIN_TARGET_PX),
                display: current_size,
            }
        }
    }
}

pub fn sprite_upscale_target(layout: LayoutMode, current_size: u32) -> u32 {
    sprite_sizing(layout, current_size).target
}

pub fn display_size(layout: LayoutMode, current_size: u32) -> u32 {
    sprite_sizing(layout, current_size).display
}

pub fn is_remote_image(src: &str) -> bool {
    !src.is_empty() && !src.starts_with("data:")
}

impl Background {
    /// Inline `background` declarations as `(property, value)` pairs.
    pub fn css(&self) -> Vec<(&'static str, String)> {
        if let Some(image) = self.image.as_deref().filter(|i| !i.is_empty()) {
            return vec![
                ("background", format!("url({image})")),
                ("background-size", "cover".to_string()),
                ("background-position", "center".to_string()),
                ("background-repeat", "no-repeat".to_string()),
            ];
        }
        let value = if self.gradient {
            format!(
                "linear-gradient(135deg, {} 0%, {} 100%)",
                self.primary, self.secondary
            )
        } else {
            self.primary.clone()
        };
        vec![("background", value)]
    }
}
