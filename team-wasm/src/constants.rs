//! DOM hooks shared by the renderer, the input handlers and the export.

pub const APP_ID: &str = "app";
pub const SELECTOR_PANEL_ID: &str = "selector-panel";
pub const LOADING_ID: &str = "loading";
pub const SEARCH_ID: &str = "search";
pub const GENERATION_FILTER_ID: &str = "generation-filter";
pub const SECTIONS_ID: &str = "generation-sections";

pub const CARD_PANEL_ID: &str = "card-panel";
pub const CONTROLS_ID: &str = "controls";
pub const SELECTION_BAR_ID: &str = "selection-bar";
pub const CARD_ID: &str = "card";
pub const PARTY_CANVAS_ID: &str = "party-canvas";

pub const NAME_INPUT_ID: &str = "trainer-name-input";
pub const SIZE_SLIDER_ID: &str = "size-slider";
pub const PRIMARY_COLOR_ID: &str = "primary-color";
pub const SECONDARY_COLOR_ID: &str = "secondary-color";
pub const GRADIENT_ID: &str = "gradient-toggle";
pub const TRAINER_UPLOAD_ID: &str = "trainer-upload";
pub const BACKGROUND_UPLOAD_ID: &str = "background-upload";

/// Class on every absolutely positioned item of the party canvas.
pub const PARTY_ITEM_CLASS: &str = "party-item";
pub const SELECTED_CLASS: &str = "selected";

/// Attribute carrying the delegated click action.
pub const ACTION_ATTR: &str = "data-action";
/// Attribute carrying the action argument (item ref, index, preset name).
pub const ITEM_ATTR: &str = "data-item";
/// Rendered sprite edge (px) recorded for the export.
pub const SIZE_ATTR: &str = "data-size";
