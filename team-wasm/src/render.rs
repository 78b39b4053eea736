//! HTML builders for the selector and the card, plus the small DOM
//! writers that put them on the page.
//!
//! Builders are plain functions of state so they run under native tests.
//! Containers created by [`mount`] are stable; only their contents are
//! replaced.

use std::fmt::Write as _;

use log::debug;
use team_core::catalog::{CatalogEntry, CatalogQuery, Generation, SpriteStyle, display_name};
use team_core::composer::{Background, ComposerState, ItemRef, LayoutMode};
use team_core::constants::{ROSTER_CAPACITY, TRAINER_PRESETS, trainer_preset_path};
use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlElement, HtmlInputElement};

use crate::canvas::{item_style, party_items};
use crate::constants::{
    APP_ID, BACKGROUND_UPLOAD_ID, CARD_ID, CARD_PANEL_ID, CONTROLS_ID, GENERATION_FILTER_ID,
    GRADIENT_ID, LOADING_ID, NAME_INPUT_ID, PARTY_CANVAS_ID, PARTY_ITEM_CLASS, PRIMARY_COLOR_ID,
    SEARCH_ID, SECONDARY_COLOR_ID, SECTIONS_ID, SELECTED_CLASS, SELECTION_BAR_ID,
    SELECTOR_PANEL_ID, SIZE_ATTR, SIZE_SLIDER_ID, TRAINER_UPLOAD_ID,
};
use crate::state::{LoadStatus, State};
use crate::utils::{asset_url, by_id, escape_html, set_html};

/// Build the static skeleton inside `#app` (or `<body>` when absent).
pub fn mount(document: &Document) -> Result<(), JsValue> {
    let root = match document.get_element_by_id(APP_ID) {
        Some(el) => el,
        None => document.body().ok_or("no body")?.into(),
    };
    let mut options = String::from(r#"<option value="">All generations</option>"#);
    for g in Generation::ALL {
        let _ = write!(options, r#"<option value="{}">{g}</option>"#, g.number());
    }
    root.set_inner_html(&format!(
        r#"<div id="{SELECTOR_PANEL_ID}" class="pokemon-selector">
  <div class="selector-header">
    <h3>Choose your team</h3>
    <input id="{SEARCH_ID}" class="search-input" type="search" placeholder="Search..." autocomplete="off">
    <select id="{GENERATION_FILTER_ID}" class="generation-select">{options}</select>
  </div>
  <div id="{LOADING_ID}" class="loading"></div>
  <div id="{SECTIONS_ID}" class="pokemon-list"></div>
</div>
<div id="{CARD_PANEL_ID}" class="card-panel">
  <div id="{CONTROLS_ID}" class="card-controls"></div>
  <div id="{SELECTION_BAR_ID}" class="selection-bar"></div>
  <div id="{CARD_ID}" class="trainer-card"></div>
</div>"#
    ));
    Ok(())
}

pub fn render_all(s: &State) {
    render_selector(s);
    render_controls(s);
    render_card(s);
}

pub fn render_selector(s: &State) {
    set_html(&s.document, LOADING_ID, &loading_html(&s.load));
    set_html(
        &s.document,
        SECTIONS_ID,
        &sections_html(&s.catalog, &s.query, &s.expanded, s.composer.sprite_style),
    );
}

pub fn render_controls(s: &State) {
    set_html(&s.document, CONTROLS_ID, &controls_html(s, asset_url));
}

/// Card body, its inline background and the selection bar.
pub fn render_card(s: &State) {
    set_html(&s.document, CARD_ID, &card_html(&s.composer));
    apply_background(&s.document, &s.composer.background);
    render_selection_bar(s);
    if s.composer.name.editing
        && let Some(input) = by_id::<HtmlInputElement>(&s.document, NAME_INPUT_ID)
    {
        if let Err(e) = input.focus() {
            debug!("render: could not focus name input: {e:?}");
        }
        input.select();
    }
}

pub fn render_selection_bar(s: &State) {
    set_html(&s.document, SELECTION_BAR_ID, &selection_bar_html(&s.composer));
}

pub fn apply_background(document: &Document, background: &Background) {
    if let Some(card) = by_id::<HtmlElement>(document, CARD_ID) {
        if let Err(e) = card.set_attribute("style", &background_style(background)) {
            debug!("render: could not set card background: {e:?}");
        }
    }
}

pub fn background_style(background: &Background) -> String {
    background
        .css()
        .into_iter()
        .map(|(k, v)| format!("{k}:{v};"))
        .collect()
}

pub fn loading_html(load: &LoadStatus) -> String {
    if load.finished {
        return String::new();
    }
    let pct = load.percent();
    format!(
        r#"<div class="loading-spinner"></div><div class="progress"><div class="progress-fill" style="width:{pct}%"></div></div><span>Loading... {pct}% ({}/{})</span>"#,
        load.loaded, load.total
    )
}

fn option_html(out: &mut String, e: &CatalogEntry, style: SpriteStyle) {
    let name = escape_html(&display_name(&e.name));
    let _ = write!(
        out,
        r#"<button class="pokemon-option" data-action="add" data-item="{}" title="{name}"><img class="pokemon-option-sprite" src="{}" alt="{name}" loading="lazy"><span class="pokemon-option-name">{name}</span></button>"#,
        escape_html(&e.name),
        escape_html(e.image_for(style)),
    );
}

/// Flat list under a generation filter, collapsible sections otherwise.
pub fn sections_html(
    catalog: &[CatalogEntry],
    query: &CatalogQuery,
    expanded: &[bool; 9],
    style: SpriteStyle,
) -> String {
    let matches = query.apply(catalog);
    if matches.is_empty() {
        return if catalog.is_empty() {
            String::new()
        } else {
            r#"<p class="no-results">No matches</p>"#.to_string()
        };
    }
    let mut out = String::new();
    if query.generation.is_some() {
        out.push_str(r#"<div class="generation-pokemon">"#);
        for e in matches {
            option_html(&mut out, e, style);
        }
        out.push_str("</div>");
        return out;
    }
    for (g, entries) in team_core::catalog::group_by_generation(matches) {
        if entries.is_empty() {
            continue;
        }
        let open = expanded[g.index()];
        let _ = write!(
            out,
            r#"<div class="generation-section"><button class="generation-header" data-action="toggle-gen" data-item="{}"><span>{g}</span><span class="count">({})</span><span class="chevron">{}</span></button>"#,
            g.number(),
            entries.len(),
            if open { "&#9660;" } else { "&#9654;" },
        );
        if open {
            out.push_str(r#"<div class="generation-pokemon">"#);
            for e in entries {
                option_html(&mut out, e, style);
            }
            out.push_str("</div>");
        }
        out.push_str("</div>");
    }
    out
}

fn active(on: bool) -> &'static str {
    if on { "active" } else { "" }
}

pub fn controls_html(s: &State, resolve: impl Fn(&str) -> String) -> String {
    let c = &s.composer;
    let bg = &c.background;
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<div class="control-row layout-toggle"><button class="{}" data-action="layout" data-item="card">Card</button><button class="{}" data-action="layout" data-item="party">Party</button></div>"#,
        active(c.layout == LayoutMode::Card),
        active(c.layout == LayoutMode::Party),
    );
    let _ = write!(
        out,
        r#"<div class="control-row style-toggle"><button class="{}" data-action="sprite-style" data-item="pixel">Pixel sprites</button><button class="{}" data-action="sprite-style" data-item="artwork">Artwork</button></div>"#,
        active(c.sprite_style == SpriteStyle::Pixel),
        active(c.sprite_style == SpriteStyle::Artwork),
    );
    let _ = write!(
        out,
        r#"<div class="control-row colors"><label>Primary <input type="color" id="{PRIMARY_COLOR_ID}" value="{}"></label><label>Secondary <input type="color" id="{SECONDARY_COLOR_ID}" value="{}"{}></label><label><input type="checkbox" id="{GRADIENT_ID}"{}> Gradient</label></div>"#,
        escape_html(&bg.primary),
        escape_html(&bg.secondary),
        if bg.gradient { "" } else { " disabled" },
        if bg.gradient { " checked" } else { "" },
    );
    let _ = write!(
        out,
        r#"<div class="control-row background"><label class="sprite-upload-label">Background image <input type="file" accept="image/*" id="{BACKGROUND_UPLOAD_ID}" class="sprite-upload"></label>{}</div>"#,
        if bg.image.is_some() {
            r#"<button data-action="clear-background">Remove background</button>"#
        } else {
            ""
        },
    );
    out.push_str(r#"<div class="control-row trainer"><button class="sprite-change-btn" data-action="toggle-picker">Change trainer</button>"#);
    if s.trainer_picker_open {
        out.push_str(r#"<div class="trainer-picker">"#);
        for name in TRAINER_PRESETS {
            let src = resolve(&trainer_preset_path(name));
            let _ = write!(
                out,
                r#"<button class="trainer-option {}" data-action="trainer-preset" data-item="{name}"><img src="{}" alt="{name}"><span>{name}</span></button>"#,
                active(c.trainer.src == src),
                escape_html(&src),
            );
        }
        let _ = write!(
            out,
            r#"<label class="sprite-upload-label">Upload <input type="file" accept="image/*" id="{TRAINER_UPLOAD_ID}" class="sprite-upload"></label></div>"#
        );
    }
    out.push_str("</div>");
    let _ = write!(
        out,
        r#"<button class="download-btn" data-action="download"{}>{}</button>"#,
        if s.downloading { " disabled" } else { "" },
        if s.downloading {
            "Downloading..."
        } else {
            "Download card"
        },
    );
    out
}

fn name_html(c: &ComposerState, with_edit_button: bool) -> String {
    let name = escape_html(&c.name.text);
    if c.name.editing {
        return format!(
            r#"<input id="{NAME_INPUT_ID}" class="trainer-name-input" type="text" value="{name}" maxlength="24">"#
        );
    }
    let button = if with_edit_button {
        r#"<button class="edit-name-btn" data-action="edit-name" title="Edit name">&#9998;</button>"#
    } else {
        ""
    };
    format!(r#"<div class="trainer-name-display"><h2>{name}</h2>{button}</div>"#)
}

pub fn card_html(c: &ComposerState) -> String {
    match c.layout {
        LayoutMode::Card => card_grid_html(c),
        LayoutMode::Party => party_html(c),
    }
}

fn card_grid_html(c: &ComposerState) -> String {
    let mut out = String::from(r#"<div class="trainer-info">"#);
    if c.name.visible {
        out.push_str(&name_html(c, true));
    }
    if c.trainer.visible {
        let _ = write!(
            out,
            r#"<img class="trainer-sprite" src="{}" alt="Trainer">"#,
            escape_html(&c.trainer.src)
        );
    }
    out.push_str(r#"</div><div class="pokemon-grid">"#);
    for i in 0..ROSTER_CAPACITY {
        match (c.roster.get(i), c.image_for(i)) {
            (Some(slot), Some(src)) => {
                let name = escape_html(&display_name(&slot.entry.name));
                let _ = write!(
                    out,
                    r#"<div class="pokemon-slot filled" data-action="remove" data-item="{i}" title="Click to remove"><img class="pokemon-sprite" src="{}" alt="{name}"><span class="pokemon-name">{name}</span><button class="remove-pokemon-btn" data-action="remove" data-item="{i}">&times;</button></div>"#,
                    escape_html(src),
                );
            }
            _ => {
                let _ = write!(
                    out,
                    r#"<div class="pokemon-slot empty"><span class="slot-number">{}</span></div>"#,
                    i + 1
                );
            }
        }
    }
    out.push_str("</div>");
    out
}

fn party_html(c: &ComposerState) -> String {
    let mut out = format!(r#"<div id="{PARTY_CANVAS_ID}" class="party-canvas">"#);
    for item in party_items(c) {
        let Some(p) = c.placement(item) else {
            continue;
        };
        let inner = match item {
            ItemRef::Trainer => format!(
                r#"<img class="trainer-sprite" src="{}" alt="Trainer" draggable="false">"#,
                escape_html(&c.trainer.src)
            ),
            ItemRef::TrainerName => name_html(c, false),
            ItemRef::Roster(i) => {
                let alt = c
                    .roster
                    .get(i)
                    .map(|s| escape_html(&display_name(&s.entry.name)))
                    .unwrap_or_default();
                format!(
                    r#"<img class="party-pokemon-sprite" src="{}" alt="{alt}" draggable="false">"#,
                    escape_html(c.image_for(i).unwrap_or_default())
                )
            }
        };
        let _ = write!(
            out,
            r#"<div class="{PARTY_ITEM_CLASS}{}" data-action="item" data-item="{item}" {SIZE_ATTR}="{}" style="{}">{inner}</div>"#,
            if p.selected {
                format!(" {SELECTED_CLASS}")
            } else {
                String::new()
            },
            p.size,
            item_style(item, &p),
        );
    }
    out.push_str("</div>");
    out
}

pub fn selection_bar_html(c: &ComposerState) -> String {
    if c.layout != LayoutMode::Party {
        return String::new();
    }
    let mut out = String::from(r#"<div class="selection-buttons">"#);
    let mut button = |item: ItemRef, label: String, enabled: bool| {
        let _ = write!(
            out,
            r#"<button class="select-btn {}" data-action="select" data-item="{item}"{}>{label}</button>"#,
            if c.is_selected(item) { SELECTED_CLASS } else { "" },
            if enabled { "" } else { " disabled" },
        );
    };
    button(ItemRef::Trainer, "Trainer".to_string(), c.trainer.visible);
    button(ItemRef::TrainerName, "Name".to_string(), c.name.visible);
    for i in 0..ROSTER_CAPACITY {
        match c.image_for(i) {
            Some(src) => button(
                ItemRef::Roster(i),
                format!(r#"<img src="{}" alt="">"#, escape_html(src)),
                true,
            ),
            None => button(ItemRef::Roster(i), (i + 1).to_string(), false),
        }
    }
    out.push_str("</div>");
    let _ = write!(
        out,
        r#"<div class="visibility-controls"><button data-action="visibility" data-item="trainer">{} trainer</button><button data-action="visibility" data-item="name">{} name</button><button class="edit-name-btn" data-action="edit-name">Edit name</button></div>"#,
        if c.trainer.visible { "Hide" } else { "Show" },
        if c.name.visible { "Hide" } else { "Show" },
    );
    if let Some(item) = c.selection.item()
        && let Some(size) = c.size_of(item)
    {
        let (min, max) = ComposerState::slider_bounds(item);
        let _ = write!(
            out,
            r#"<div class="item-controls"><label>Size <input type="range" id="{SIZE_SLIDER_ID}" min="{min}" max="{max}" value="{}"></label><button data-action="flip">Flip</button><button data-action="rotate-ccw" title="Rotate left">&#10226;</button><button data-action="rotate-cw" title="Rotate right">&#10227;</button></div>"#,
            size.clamp(min, max),
        );
    }
    out
}
