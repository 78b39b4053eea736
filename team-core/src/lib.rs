pub mod catalog;
pub mod composer;
pub mod constants;
pub mod error;
pub mod export;
pub mod geometry;
pub mod loader;
pub mod roster;
pub mod variants;

pub use catalog::{CatalogEntry, CatalogQuery, Generation, SpriteStyle};
pub use composer::{ComposerEvent, ComposerState, ItemRef, LayoutMode, Selection};
pub use error::{FetchError, PayloadError};
pub use geometry::Point;
pub use loader::{CatalogLoad, CatalogSource, LoadProgress, LoaderConfig, load_catalog};
pub use roster::{Roster, RosterSlot, SlotId};
