//! Card composer state and its transitions.
//!
//! All interaction funnels through [`ComposerState::apply`]; the browser shell
//! only translates DOM events into [`ComposerEvent`]s and re-renders.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogEntry, SpriteStyle};
use crate::constants::{
    COMPAT_MOUSE_WINDOW_MS, DEFAULT_PRIMARY_COLOR, DEFAULT_SECONDARY_COLOR, DEFAULT_TRAINER_NAME,
    DRAG_CLICK_THRESHOLD_MS, FONT_SIZE_MAX, FONT_SIZE_MIN, NAME_DEFAULT_FONT_PX, PINCH_SIZE_MAX,
    PINCH_SIZE_MIN, ROTATION_STEP_DEG, SLIDER_SIZE_MAX, SLIDER_SIZE_MIN, TRAINER_DEFAULT_SIZE,
};
use crate::geometry::{NAME_DEFAULT_POSITION, Point, TRAINER_DEFAULT_POSITION};
use crate::roster::{Roster, SlotId};

/// A placed item on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemRef {
    Trainer,
    TrainerName,
    Roster(usize),
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Trainer => f.write_str("trainer"),
            ItemRef::TrainerName => f.write_str("name"),
            ItemRef::Roster(i) => write!(f, "roster-{i}"),
        }
    }
}

impl FromStr for ItemRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trainer" => Ok(ItemRef::Trainer),
            "name" => Ok(ItemRef::TrainerName),
            _ => s
                .strip_prefix("roster-")
                .and_then(|n| n.parse().ok())
                .map(ItemRef::Roster)
                .ok_or_else(|| format!("unknown item {s:?}")),
        }
    }
}

/// The single selected item, if any.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    None,
    Trainer,
    TrainerName,
    Roster(usize),
}

impl Selection {
    pub fn item(self) -> Option<ItemRef> {
        match self {
            Selection::None => None,
            Selection::Trainer => Some(ItemRef::Trainer),
            Selection::TrainerName => Some(ItemRef::TrainerName),
            Selection::Roster(i) => Some(ItemRef::Roster(i)),
        }
    }
}

impl From<ItemRef> for Selection {
    fn from(item: ItemRef) -> Self {
        match item {
            ItemRef::Trainer => Selection::Trainer,
            ItemRef::TrainerName => Selection::TrainerName,
            ItemRef::Roster(i) => Selection::Roster(i),
        }
    }
}

/// Z-order history key; roster slots are tracked by identity, not index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZKey {
    Trainer,
    TrainerName,
    Slot(SlotId),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Fixed grid card.
    #[default]
    Card,
    /// Free-form canvas.
    Party,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainerSprite {
    pub src: String,
    pub position: Point,
    pub size: u32,
    pub flipped: bool,
    pub rotation: i32,
    pub visible: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NameLabel {
    pub text: String,
    pub position: Point,
    pub font_size: u32,
    pub flipped: bool,
    pub rotation: i32,
    pub visible: bool,
    pub editing: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub primary: String,
    pub secondary: String,
    pub gradient: bool,
    /// Uploaded image (data URL); wins over the colors when set.
    pub image: Option<String>,
}

impl Default for Background {
    fn default() -> Self {
        Background {
            primary: DEFAULT_PRIMARY_COLOR.to_string(),
            secondary: DEFAULT_SECONDARY_COLOR.to_string(),
            gradient: true,
            image: None,
        }
    }
}

/// In-progress pointer gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        item: ItemRef,
        offset: Point,
        started_at_ms: f64,
        selected_before: bool,
    },
    Pinching {
        item: ItemRef,
        initial_distance: f64,
        initial_size: u32,
    },
}

/// How the click that trails a finished gesture is handled.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum PendingClick {
    #[default]
    None,
    /// Drag or pinch artifact.
    Swallow,
    /// Short press: resolve against the selection before the press.
    Settle { item: ItemRef, selected_before: bool },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ComposerEvent {
    AddEntry(CatalogEntry),
    RemoveEntry(usize),
    /// Click on a canvas item; may be a gesture artifact.
    Click(ItemRef),
    /// Explicit toggle from the selection bar.
    Select(ItemRef),
    /// Click whose target is the canvas container itself.
    BackgroundClick,
    PointerDown { item: ItemRef, point: Point, at_ms: f64 },
    PointerMove { point: Point },
    PointerUp { at_ms: f64 },
    PinchStart { distance: f64 },
    PinchMove { distance: f64 },
    PinchEnd,
    SetSize(u32),
    ToggleFlip,
    RotateClockwise,
    RotateCounterClockwise,
    ToggleVisibility(ItemRef),
    SetLayout(LayoutMode),
    SetTrainerName(String),
    StartEditingName,
    FinishEditingName,
    SetTrainerSprite(String),
    SetPrimaryColor(String),
    SetSecondaryColor(String),
    SetGradient(bool),
    SetBackgroundImage(Option<String>),
    SetSpriteStyle(SpriteStyle),
}

/// Everything the renderer needs to place one item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub position: Point,
    /// Sprite edge (px) or, for the name label, font size (px).
    pub size: u32,
    pub flipped: bool,
    pub rotation: i32,
    pub z_index: usize,
    pub selected: bool,
    pub visible: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SizeControl {
    Pinch,
    Slider,
}

/// Owned state of the card composer.
#[derive(Clone, Debug, PartialEq)]
pub struct ComposerState {
    pub trainer: TrainerSprite,
    pub name: NameLabel,
    pub roster: Roster,
    pub selection: Selection,
    pub layout: LayoutMode,
    pub background: Background,
    pub sprite_style: SpriteStyle,
    z_history: Vec<ZKey>,
    gesture: Gesture,
    pending_click: PendingClick,
    released_at_ms: f64,
}

impl ComposerState {
    pub fn new(trainer_src: impl Into<String>) -> Self {
        ComposerState {
            trainer: TrainerSprite {
                src: trainer_src.into(),
                position: TRAINER_DEFAULT_POSITION,
                size: TRAINER_DEFAULT_SIZE,
                flipped: false,
                rotation: 0,
                visible: true,
            },
            name: NameLabel {
                text: DEFAULT_TRAINER_NAME.to_string(),
                position: NAME_DEFAULT_POSITION,
                font_size: NAME_DEFAULT_FONT_PX,
                flipped: false,
                rotation: 0,
                visible: true,
                editing: false,
            },
            roster: Roster::default(),
            selection: Selection::None,
            layout: LayoutMode::Card,
            background: Background::default(),
            sprite_style: SpriteStyle::Pixel,
            z_history: Vec::new(),
            gesture: Gesture::Idle,
            pending_click: PendingClick::None,
            released_at_ms: f64::NEG_INFINITY,
        }
    }

    /// Apply one event; returns whether anything observable changed.
    pub fn apply(&mut self, event: ComposerEvent) -> bool {
        match event {
            ComposerEvent::AddEntry(entry) => self.roster.push(entry).is_some(),
            ComposerEvent::RemoveEntry(index) => self.remove_entry(index),
            ComposerEvent::Click(item) => self.click(item),
            ComposerEvent::Select(item) => {
                self.pending_click = PendingClick::None;
                self.toggle(item)
            }
            ComposerEvent::BackgroundClick => {
                self.pending_click = PendingClick::None;
                self.clear_selection()
            }
            ComposerEvent::PointerDown { item, point, at_ms } => {
                self.pointer_down(item, point, at_ms)
            }
            ComposerEvent::PointerMove { point } => self.pointer_move(point),
            ComposerEvent::PointerUp { at_ms } => self.pointer_up(at_ms),
            ComposerEvent::PinchStart { distance } => self.pinch_start(distance),
            ComposerEvent::PinchMove { distance } => self.pinch_move(distance),
            ComposerEvent::PinchEnd => self.pinch_end(),
            ComposerEvent::SetSize(size) => match self.selection.item() {
                Some(item) => self.set_size(item, size, SizeControl::Slider),
                None => false,
            },
            ComposerEvent::ToggleFlip => self.with_selected(|s, item| {
                s.transform(item, |flipped, _| *flipped = !*flipped)
            }),
            ComposerEvent::RotateClockwise => self.with_selected(|s, item| {
                s.transform(item, |_, rotation| *rotation += ROTATION_STEP_DEG)
            }),
            ComposerEvent::RotateCounterClockwise => self.with_selected(|s, item| {
                s.transform(item, |_, rotation| *rotation -= ROTATION_STEP_DEG)
            }),
            ComposerEvent::ToggleVisibility(item) => self.toggle_visibility(item),
            ComposerEvent::SetLayout(layout) => {
                self.gesture = Gesture::Idle;
                self.pending_click = PendingClick::None;
                replace(&mut self.layout, layout)
            }
            ComposerEvent::SetTrainerName(text) => replace(&mut self.name.text, text),
            ComposerEvent::StartEditingName => replace(&mut self.name.editing, true),
            ComposerEvent::FinishEditingName => replace(&mut self.name.editing, false),
            ComposerEvent::SetTrainerSprite(src) => replace(&mut self.trainer.src, src),
            ComposerEvent::SetPrimaryColor(c) => replace(&mut self.background.primary, c),
            ComposerEvent::SetSecondaryColor(c) => replace(&mut self.background.secondary, c),
            ComposerEvent::SetGradient(on) => replace(&mut self.background.gradient, on),
            ComposerEvent::SetBackgroundImage(img) => replace(&mut self.background.image, img),
            ComposerEvent::SetSpriteStyle(style) => replace(&mut self.sprite_style, style),
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self.gesture, Gesture::Pinching { .. })
    }

    pub fn is_selected(&self, item: ItemRef) -> bool {
        self.selection.item() == Some(item)
    }

    /// Ordered oldest to newest.
    pub fn z_history(&self) -> &[ZKey] {
        &self.z_history
    }

    /// `1 + position in the history`; never-selected items sit at 1.
    pub fn z_index(&self, item: ItemRef) -> usize {
        self.z_key(item)
            .and_then(|key| self.z_history.iter().position(|k| *k == key))
            .map_or(1, |pos| pos + 1)
    }

    pub fn contains(&self, item: ItemRef) -> bool {
        match item {
            ItemRef::Trainer | ItemRef::TrainerName => true,
            ItemRef::Roster(i) => i < self.roster.len(),
        }
    }

    pub fn position_of(&self, item: ItemRef) -> Option<Point> {
        match item {
            ItemRef::Trainer => Some(self.trainer.position),
            ItemRef::TrainerName => Some(self.name.position),
            ItemRef::Roster(i) => self.roster.get(i).map(|s| s.position(i)),
        }
    }

    pub fn size_of(&self, item: ItemRef) -> Option<u32> {
        match item {
            ItemRef::Trainer => Some(self.trainer.size),
            ItemRef::TrainerName => Some(self.name.font_size),
            ItemRef::Roster(i) => self.roster.get(i).map(|s| s.size()),
        }
    }

    pub fn placement(&self, item: ItemRef) -> Option<Placement> {
        let (flipped, rotation, visible) = match item {
            ItemRef::Trainer => (self.trainer.flipped, self.trainer.rotation, self.trainer.visible),
            ItemRef::TrainerName => (self.name.flipped, self.name.rotation, self.name.visible),
            ItemRef::Roster(i) => {
                let slot = self.roster.get(i)?;
                (slot.flipped, slot.rotation, true)
            }
        };
        Some(Placement {
            position: self.position_of(item)?,
            size: self.size_of(item)?,
            flipped,
            rotation,
            z_index: self.z_index(item),
            selected: self.is_selected(item),
            visible,
        })
    }

    /// Image shown for a roster slot under the current sprite style.
    pub fn image_for(&self, index: usize) -> Option<&str> {
        self.roster
            .get(index)
            .map(|s| s.entry.image_for(self.sprite_style))
    }

    /// Slider range for the selected item type.
    pub fn slider_bounds(item: ItemRef) -> (u32, u32) {
        size_bounds(item, SizeControl::Slider)
    }

    fn z_key(&self, item: ItemRef) -> Option<ZKey> {
        match item {
            ItemRef::Trainer => Some(ZKey::Trainer),
            ItemRef::TrainerName => Some(ZKey::TrainerName),
            ItemRef::Roster(i) => self.roster.get(i).map(|s| ZKey::Slot(s.id)),
        }
    }

    fn is_visible(&self, item: ItemRef) -> bool {
        match item {
            ItemRef::Trainer => self.trainer.visible,
            ItemRef::TrainerName => self.name.visible,
            ItemRef::Roster(i) => i < self.roster.len(),
        }
    }

    /// Transition into `Selected`: always re-asserts newest in the history.
    fn select(&mut self, item: ItemRef) -> bool {
        if !self.is_visible(item) {
            return false;
        }
        self.selection = Selection::from(item);
        if let Some(key) = self.z_key(item) {
            self.z_history.retain(|k| *k != key);
            self.z_history.push(key);
        }
        true
    }

    fn clear_selection(&mut self) -> bool {
        replace(&mut self.selection, Selection::None)
    }

    fn toggle(&mut self, item: ItemRef) -> bool {
        if self.is_selected(item) {
            self.clear_selection()
        } else {
            self.select(item)
        }
    }

    fn click(&mut self, item: ItemRef) -> bool {
        match std::mem::take(&mut self.pending_click) {
            PendingClick::Swallow => false,
            PendingClick::Settle {
                item: pressed,
                selected_before,
            } if pressed == item => {
                if selected_before {
                    self.clear_selection()
                } else {
                    false
                }
            }
            _ => self.toggle(item),
        }
    }

    fn pointer_down(&mut self, item: ItemRef, point: Point, at_ms: f64) -> bool {
        if self.layout != LayoutMode::Party || self.gesture != Gesture::Idle {
            return false;
        }
        if self.pending_click != PendingClick::None
            && at_ms - self.released_at_ms < COMPAT_MOUSE_WINDOW_MS
        {
            debug!("composer: ignoring emulated press on {item}");
            return false;
        }
        let Some(position) = self.position_of(item) else {
            return false;
        };
        if !self.is_visible(item) {
            return false;
        }
        let selected_before = self.is_selected(item);
        self.gesture = Gesture::Dragging {
            item,
            offset: point - position,
            started_at_ms: at_ms,
            selected_before,
        };
        self.pending_click = PendingClick::None;
        if !selected_before {
            self.select(item);
        }
        true
    }

    fn pointer_move(&mut self, point: Point) -> bool {
        let Gesture::Dragging { item, offset, .. } = self.gesture else {
            return false;
        };
        let next = point - offset;
        match item {
            ItemRef::Trainer => replace(&mut self.trainer.position, next),
            ItemRef::TrainerName => replace(&mut self.name.position, next),
            ItemRef::Roster(i) => match self.roster.get_mut(i) {
                Some(slot) => replace(&mut slot.position, Some(next)),
                None => false,
            },
        }
    }

    fn pointer_up(&mut self, at_ms: f64) -> bool {
        let Gesture::Dragging {
            item,
            started_at_ms,
            selected_before,
            ..
        } = self.gesture
        else {
            return false;
        };
        self.gesture = Gesture::Idle;
        self.released_at_ms = at_ms;
        self.pending_click = if at_ms - started_at_ms > DRAG_CLICK_THRESHOLD_MS {
            debug!("composer: drag of {item} ended, swallowing click");
            PendingClick::Swallow
        } else {
            PendingClick::Settle {
                item,
                selected_before,
            }
        };
        true
    }

    fn pinch_start(&mut self, distance: f64) -> bool {
        if distance <= 0.0 || self.is_pinching() {
            return false;
        }
        let Some(item) = self.selection.item() else {
            return false;
        };
        let Some(initial_size) = self.size_of(item) else {
            return false;
        };
        self.gesture = Gesture::Pinching {
            item,
            initial_distance: distance,
            initial_size,
        };
        self.pending_click = PendingClick::Swallow;
        true
    }

    fn pinch_move(&mut self, distance: f64) -> bool {
        let Gesture::Pinching {
            item,
            initial_distance,
            initial_size,
        } = self.gesture
        else {
            return false;
        };
        let scaled = f64::from(initial_size) * distance / initial_distance;
        let (lo, hi) = size_bounds(item, SizeControl::Pinch);
        let next = scaled.round().clamp(f64::from(lo), f64::from(hi)) as u32;
        self.set_size(item, next, SizeControl::Pinch)
    }

    fn pinch_end(&mut self) -> bool {
        if !self.is_pinching() {
            return false;
        }
        self.gesture = Gesture::Idle;
        self.pending_click = PendingClick::Swallow;
        true
    }

    fn set_size(&mut self, item: ItemRef, size: u32, control: SizeControl) -> bool {
        let (lo, hi) = size_bounds(item, control);
        let size = size.clamp(lo, hi);
        match item {
            ItemRef::Trainer => replace(&mut self.trainer.size, size),
            ItemRef::TrainerName => replace(&mut self.name.font_size, size),
            ItemRef::Roster(i) => match self.roster.get_mut(i) {
                Some(slot) => replace(&mut slot.size, Some(size)),
                None => false,
            },
        }
    }

    fn with_selected(&mut self, f: impl FnOnce(&mut Self, ItemRef) -> bool) -> bool {
        match self.selection.item() {
            Some(item) => f(self, item),
            None => false,
        }
    }

    fn transform(&mut self, item: ItemRef, f: impl FnOnce(&mut bool, &mut i32)) -> bool {
        match item {
            ItemRef::Trainer => f(&mut self.trainer.flipped, &mut self.trainer.rotation),
            ItemRef::TrainerName => f(&mut self.name.flipped, &mut self.name.rotation),
            ItemRef::Roster(i) => match self.roster.get_mut(i) {
                Some(slot) => f(&mut slot.flipped, &mut slot.rotation),
                None => return false,
            },
        }
        true
    }

    fn toggle_visibility(&mut self, item: ItemRef) -> bool {
        let visible = match item {
            ItemRef::Trainer => &mut self.trainer.visible,
            ItemRef::TrainerName => &mut self.name.visible,
            ItemRef::Roster(_) => return false,
        };
        *visible = !*visible;
        if !*visible && self.is_selected(item) {
            self.selection = Selection::None;
        }
        true
    }

    fn remove_entry(&mut self, index: usize) -> bool {
        let Some(removed) = self.roster.remove(index) else {
            return false;
        };
        self.z_history.retain(|k| *k != ZKey::Slot(removed.id));
        self.selection = match self.selection {
            Selection::Roster(i) if i == index => Selection::None,
            Selection::Roster(i) if i > index => Selection::Roster(i - 1),
            other => other,
        };
        self.gesture = Gesture::Idle;
        self.pending_click = PendingClick::None;
        true
    }
}

/// Replace `slot` with `value`; report whether it differed.
fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn size_bounds(item: ItemRef, control: SizeControl) -> (u32, u32) {
    match (item, control) {
        (ItemRef::TrainerName, _) => (FONT_SIZE_MIN, FONT_SIZE_MAX),
        (_, SizeControl::Pinch) => (PINCH_SIZE_MIN, PINCH_SIZE_MAX),
        (_, SizeControl::Slider) => (SLIDER_SIZE_MIN, SLIDER_SIZE_MAX),
    }
}

/// Pure form of [`ComposerState::apply`].
pub fn reduce(mut state: ComposerState, event: ComposerEvent) -> ComposerState {
    state.apply(event);
    state
}
