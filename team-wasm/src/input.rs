//! DOM event wiring. Every listener is delegated from `document`, so
//! re-rendered markup never needs re-binding.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use team_core::catalog::{Generation, SpriteStyle};
use team_core::composer::{ComposerEvent, ItemRef, LayoutMode};
use team_core::constants::trainer_preset_path;
use team_core::geometry::{Point, touch_distance};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Event, EventTarget, HtmlInputElement, HtmlSelectElement,
    KeyboardEvent, MouseEvent, TouchEvent, TouchList,
};

use crate::canvas::{party_rect, refresh_party};
use crate::constants::{
    ACTION_ATTR, GENERATION_FILTER_ID, GRADIENT_ID, ITEM_ATTR, NAME_INPUT_ID, PARTY_CANVAS_ID,
    PARTY_ITEM_CLASS, PRIMARY_COLOR_ID, SEARCH_ID, SECONDARY_COLOR_ID, SIZE_SLIDER_ID,
};
use crate::state::State;
use crate::upload::{UploadTarget, handle_file_input};
use crate::utils::{asset_url, closest};
use crate::{export, render};

/// How much of the page an applied event invalidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Refresh {
    /// The DOM already shows the change (typing into an input).
    Nothing,
    /// Party item styles only.
    Party,
    /// Party item styles and the selection bar.
    Selection,
    /// Inline card background only.
    Background,
    /// Card body and selection bar.
    Card,
    /// Card, selection bar and controls.
    All,
}

pub fn refresh_for(event: &ComposerEvent) -> Refresh {
    use ComposerEvent::*;
    match event {
        SetTrainerName(_) => Refresh::Nothing,
        PointerMove { .. } | PinchMove { .. } | SetSize(_) => Refresh::Party,
        PointerDown { .. }
        | PointerUp { .. }
        | Click(_)
        | Select(_)
        | BackgroundClick
        | PinchStart { .. }
        | PinchEnd
        | ToggleFlip
        | RotateClockwise
        | RotateCounterClockwise => Refresh::Selection,
        SetPrimaryColor(_) | SetSecondaryColor(_) => Refresh::Background,
        AddEntry(_) | RemoveEntry(_) | ToggleVisibility(_) | StartEditingName
        | FinishEditingName => Refresh::Card,
        SetLayout(_) | SetTrainerSprite(_) | SetGradient(_) | SetBackgroundImage(_)
        | SetSpriteStyle(_) => Refresh::All,
    }
}

/// Apply one composer event and repaint what it touched.
pub fn dispatch(state: &Rc<RefCell<State>>, event: ComposerEvent) {
    let refresh = refresh_for(&event);
    // Re-rendering can fire focus events synchronously; those land here
    // while the outer borrow is still live and are dropped.
    let Ok(mut s) = state.try_borrow_mut() else {
        debug!("input: state busy, dropping {event:?}");
        return;
    };
    if !s.composer.apply(event) {
        return;
    }
    match refresh {
        Refresh::Nothing => {}
        Refresh::Party => refresh_party(&s.document, &s.composer),
        Refresh::Selection => {
            refresh_party(&s.document, &s.composer);
            render::render_selection_bar(&s);
        }
        Refresh::Background => render::apply_background(&s.document, &s.composer.background),
        Refresh::Card => render::render_card(&s),
        Refresh::All => {
            render::render_controls(&s);
            render::render_card(&s);
        }
    }
}

fn listen<E, F>(target: &EventTarget, kind: &str, passive: bool, mut f: F) -> Result<(), JsValue>
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
{
    let cb = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |e: Event| {
        if let Ok(e) = e.dyn_into::<E>() {
            f(e);
        }
    }));
    let opts = AddEventListenerOptions::new();
    opts.set_passive(passive);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        kind,
        cb.as_ref().unchecked_ref(),
        &opts,
    )?;
    cb.forget();
    Ok(())
}

fn target_id(e: &Event) -> String {
    e.target()
        .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        .map(|el| el.id())
        .unwrap_or_default()
}

fn target_input(e: &Event) -> Option<HtmlInputElement> {
    e.target()?.dyn_into::<HtmlInputElement>().ok()
}

fn touch_point(touches: &TouchList, i: u32) -> Option<(f64, f64)> {
    let t = touches.get(i)?;
    Some((f64::from(t.client_x()), f64::from(t.client_y())))
}

/// Client position to canvas percent; `None` when the party canvas is gone.
fn canvas_point(state: &Rc<RefCell<State>>, x: f64, y: f64) -> Option<Point> {
    let rect = party_rect(&state.borrow().document)?;
    Some(rect.to_percent(x, y))
}

fn pressed_item(e: &Event) -> Option<ItemRef> {
    let target = e.target();
    if target
        .clone()
        .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
        .is_some()
    {
        return None;
    }
    closest(target, &format!("#{PARTY_CANVAS_ID} .{PARTY_ITEM_CLASS}"))?
        .get_attribute(ITEM_ATTR)?
        .parse()
        .ok()
}

pub fn attach_ui(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    let (window, document) = {
        let s = state.borrow();
        (s.window.clone(), s.document.clone())
    };
    let doc_target: &EventTarget = document.as_ref();
    let win_target: &EventTarget = window.as_ref();

    {
        let st = state.clone();
        listen(doc_target, "click", true, move |e: MouseEvent| on_click(&st, &e))?;
    }

    // Pointer gestures on the party canvas
    {
        let st = state.clone();
        listen(doc_target, "mousedown", false, move |e: MouseEvent| {
            if e.button() != 0 {
                return;
            }
            let Some(item) = pressed_item(&e) else {
                return;
            };
            let Some(point) = canvas_point(&st, f64::from(e.client_x()), f64::from(e.client_y()))
            else {
                return;
            };
            // no native image drag or text selection
            e.prevent_default();
            dispatch(
                &st,
                ComposerEvent::PointerDown {
                    item,
                    point,
                    at_ms: e.time_stamp(),
                },
            );
        })?;
    }
    {
        let st = state.clone();
        listen(win_target, "mousemove", true, move |e: MouseEvent| {
            if !st.borrow().composer.is_dragging() {
                return;
            }
            if let Some(point) =
                canvas_point(&st, f64::from(e.client_x()), f64::from(e.client_y()))
            {
                dispatch(&st, ComposerEvent::PointerMove { point });
            }
        })?;
    }
    {
        let st = state.clone();
        listen(win_target, "mouseup", true, move |e: MouseEvent| {
            if st.borrow().composer.is_dragging() {
                dispatch(&st, ComposerEvent::PointerUp { at_ms: e.time_stamp() });
            }
        })?;
    }

    // Touch: one finger drags, two fingers pinch-resize the selection
    {
        let st = state.clone();
        listen(doc_target, "touchstart", false, move |e: TouchEvent| {
            let touches = e.touches();
            if touches.length() >= 2 {
                if st.borrow().composer.layout != LayoutMode::Party {
                    return;
                }
                if let (Some(a), Some(b)) = (touch_point(&touches, 0), touch_point(&touches, 1)) {
                    e.prevent_default();
                    dispatch(
                        &st,
                        ComposerEvent::PinchStart {
                            distance: touch_distance(a, b),
                        },
                    );
                }
                return;
            }
            let Some(item) = pressed_item(&e) else {
                return;
            };
            if let Some((x, y)) = touch_point(&touches, 0)
                && let Some(point) = canvas_point(&st, x, y)
            {
                dispatch(
                    &st,
                    ComposerEvent::PointerDown {
                        item,
                        point,
                        at_ms: e.time_stamp(),
                    },
                );
            }
        })?;
    }
    {
        let st = state.clone();
        listen(doc_target, "touchmove", false, move |e: TouchEvent| {
            let (pinching, dragging) = {
                let s = st.borrow();
                (s.composer.is_pinching(), s.composer.is_dragging())
            };
            let touches = e.touches();
            if pinching {
                e.prevent_default();
                if let (Some(a), Some(b)) = (touch_point(&touches, 0), touch_point(&touches, 1)) {
                    dispatch(
                        &st,
                        ComposerEvent::PinchMove {
                            distance: touch_distance(a, b),
                        },
                    );
                }
            } else if dragging {
                e.prevent_default();
                if let Some((x, y)) = touch_point(&touches, 0)
                    && let Some(point) = canvas_point(&st, x, y)
                {
                    dispatch(&st, ComposerEvent::PointerMove { point });
                }
            }
        })?;
    }
    for kind in ["touchend", "touchcancel"] {
        let st = state.clone();
        listen(doc_target, kind, true, move |e: TouchEvent| {
            let remaining = e.touches().length();
            let (pinching, dragging) = {
                let s = st.borrow();
                (s.composer.is_pinching(), s.composer.is_dragging())
            };
            if pinching && remaining < 2 {
                dispatch(&st, ComposerEvent::PinchEnd);
            } else if dragging && remaining == 0 {
                dispatch(&st, ComposerEvent::PointerUp { at_ms: e.time_stamp() });
            }
        })?;
    }

    // Text, range and color inputs
    {
        let st = state.clone();
        listen(doc_target, "input", true, move |e: Event| {
            let Some(input) = target_input(&e) else {
                return;
            };
            let value = input.value();
            match target_id(&e).as_str() {
                SEARCH_ID => {
                    let mut s = st.borrow_mut();
                    s.query.term = value;
                    render::render_selector(&s);
                }
                NAME_INPUT_ID => dispatch(&st, ComposerEvent::SetTrainerName(value)),
                SIZE_SLIDER_ID => {
                    if let Ok(size) = value.parse() {
                        dispatch(&st, ComposerEvent::SetSize(size));
                    }
                }
                PRIMARY_COLOR_ID => dispatch(&st, ComposerEvent::SetPrimaryColor(value)),
                SECONDARY_COLOR_ID => dispatch(&st, ComposerEvent::SetSecondaryColor(value)),
                _ => {}
            }
        })?;
    }
    {
        let st = state.clone();
        listen(doc_target, "change", true, move |e: Event| {
            let id = target_id(&e);
            if id == GENERATION_FILTER_ID {
                if let Some(select) = e
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlSelectElement>().ok())
                {
                    let mut s = st.borrow_mut();
                    s.query.generation = select.value().parse().ok().and_then(Generation::new);
                    render::render_selector(&s);
                }
                return;
            }
            let Some(input) = target_input(&e) else {
                return;
            };
            if id == GRADIENT_ID {
                dispatch(&st, ComposerEvent::SetGradient(input.checked()));
            } else if let Some(target) = UploadTarget::from_input_id(&id)
                && let Err(err) = handle_file_input(st.clone(), &input, target)
            {
                log::error!("upload: {err:?}");
            }
        })?;
    }

    // Inline name editing: Enter or Escape or blur finishes
    {
        let st = state.clone();
        listen(doc_target, "keydown", true, move |e: KeyboardEvent| {
            if target_id(&e) == NAME_INPUT_ID && matches!(e.key().as_str(), "Enter" | "Escape") {
                dispatch(&st, ComposerEvent::FinishEditingName);
            }
        })?;
    }
    {
        let st = state.clone();
        listen(doc_target, "focusout", true, move |e: Event| {
            if target_id(&e) == NAME_INPUT_ID {
                dispatch(&st, ComposerEvent::FinishEditingName);
            }
        })?;
    }
    Ok(())
}

fn on_click(state: &Rc<RefCell<State>>, e: &MouseEvent) {
    match target_id(e).as_str() {
        PARTY_CANVAS_ID => {
            dispatch(state, ComposerEvent::BackgroundClick);
            return;
        }
        NAME_INPUT_ID => return,
        _ => {}
    }
    let Some(el) = closest(e.target(), &format!("[{ACTION_ATTR}]")) else {
        return;
    };
    if el.has_attribute("disabled") {
        return;
    }
    let action = el.get_attribute(ACTION_ATTR).unwrap_or_default();
    let arg = el.get_attribute(ITEM_ATTR).unwrap_or_default();
    let item = arg.parse::<ItemRef>().ok();
    match (action.as_str(), item) {
        ("item", Some(item)) => dispatch(state, ComposerEvent::Click(item)),
        ("select", Some(item)) => dispatch(state, ComposerEvent::Select(item)),
        ("visibility", Some(item)) => dispatch(state, ComposerEvent::ToggleVisibility(item)),
        ("add", _) => {
            let entry = state
                .borrow()
                .catalog
                .iter()
                .find(|entry| entry.name == arg)
                .cloned();
            if let Some(entry) = entry {
                dispatch(state, ComposerEvent::AddEntry(entry));
            }
        }
        ("remove", _) => {
            if let Ok(index) = arg.parse() {
                dispatch(state, ComposerEvent::RemoveEntry(index));
            }
        }
        ("flip", _) => dispatch(state, ComposerEvent::ToggleFlip),
        ("rotate-cw", _) => dispatch(state, ComposerEvent::RotateClockwise),
        ("rotate-ccw", _) => dispatch(state, ComposerEvent::RotateCounterClockwise),
        ("edit-name", _) => dispatch(state, ComposerEvent::StartEditingName),
        ("layout", _) => {
            let layout = if arg == "party" {
                LayoutMode::Party
            } else {
                LayoutMode::Card
            };
            dispatch(state, ComposerEvent::SetLayout(layout));
        }
        ("sprite-style", _) => {
            let style = if arg == "artwork" {
                SpriteStyle::Artwork
            } else {
                SpriteStyle::Pixel
            };
            dispatch(state, ComposerEvent::SetSpriteStyle(style));
            render::render_selector(&state.borrow());
        }
        ("toggle-gen", _) => {
            if let Some(g) = arg.parse().ok().and_then(Generation::new) {
                let mut s = state.borrow_mut();
                s.toggle_section(g);
                render::render_selector(&s);
            }
        }
        ("toggle-picker", _) => {
            let mut s = state.borrow_mut();
            s.trainer_picker_open = !s.trainer_picker_open;
            render::render_controls(&s);
        }
        ("trainer-preset", _) => {
            {
                let mut s = state.borrow_mut();
                s.trainer_picker_open = false;
                render::render_controls(&s);
            }
            let src = asset_url(&trainer_preset_path(&arg));
            dispatch(state, ComposerEvent::SetTrainerSprite(src));
        }
        ("clear-background", _) => dispatch(state, ComposerEvent::SetBackgroundImage(None)),
        ("download", _) => export::spawn_download(state.clone()),
        _ => debug!("input: unhandled action {action:?} ({arg:?})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gesture_events_patch_in_place() {
        assert_eq!(
            refresh_for(&ComposerEvent::PointerMove {
                point: Point::new(1.0, 1.0)
            }),
            Refresh::Party
        );
        assert_eq!(refresh_for(&ComposerEvent::SetSize(80)), Refresh::Party);
        assert_eq!(
            refresh_for(&ComposerEvent::Click(ItemRef::Trainer)),
            Refresh::Selection
        );
        assert_eq!(refresh_for(&ComposerEvent::PinchEnd), Refresh::Selection);
    }

    #[test]
    fn typing_and_colors_skip_rebuilds() {
        assert_eq!(
            refresh_for(&ComposerEvent::SetTrainerName("Red".into())),
            Refresh::Nothing
        );
        assert_eq!(
            refresh_for(&ComposerEvent::SetPrimaryColor("#000000".into())),
            Refresh::Background
        );
    }

    #[test]
    fn structural_events_rebuild() {
        assert_eq!(refresh_for(&ComposerEvent::RemoveEntry(0)), Refresh::Card);
        assert_eq!(
            refresh_for(&ComposerEvent::SetLayout(LayoutMode::Party)),
            Refresh::All
        );
        assert_eq!(
            refresh_for(&ComposerEvent::SetBackgroundImage(None)),
            Refresh::All
        );
    }
}
