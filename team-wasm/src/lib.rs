use std::cell::RefCell;
use std::rc::Rc;

use log::info;
use team_core::catalog::CatalogQuery;
use team_core::composer::{ComposerEvent, ComposerState, LayoutMode};
use team_core::constants::{DEFAULT_API_BASE, TRAINER_PRESETS, trainer_preset_path};
use wasm_bindgen::prelude::*;

mod canvas;
mod constants;
mod export;
mod fetch;
mod input;
mod render;
mod state;
mod upload;
mod utils;

use crate::state::{LoadStatus, STATE, State};
use crate::utils::{asset_url, get_query_param, init_logger, parse_level};

/// Page options read from the query string.
#[derive(Clone, Debug, PartialEq)]
struct PageConfig {
    api_base: String,
    layout: LayoutMode,
    log_level: log::LevelFilter,
}

impl PageConfig {
    fn from_search(search: &str) -> Self {
        let layout = match get_query_param(search, "layout").as_deref() {
            Some("party") => LayoutMode::Party,
            _ => LayoutMode::Card,
        };
        PageConfig {
            api_base: get_query_param(search, "api")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            layout,
            log_level: parse_level(get_query_param(search, "log").as_deref()),
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let search = window.location().search().unwrap_or_default();
    let config = PageConfig::from_search(&search);
    init_logger(config.log_level);
    info!("team builder starting (catalog at {})", config.api_base);

    let mut composer = ComposerState::new(asset_url(&trainer_preset_path(TRAINER_PRESETS[0])));
    composer.apply(ComposerEvent::SetLayout(config.layout));

    let mut expanded = [false; 9];
    expanded[0] = true;
    let state = Rc::new(RefCell::new(State {
        window,
        document,
        api_base: config.api_base,
        composer,
        catalog: Vec::new(),
        query: CatalogQuery::default(),
        expanded,
        load: LoadStatus::default(),
        trainer_picker_open: false,
        downloading: false,
    }));
    STATE.with(|st| st.replace(Some(state.clone())));

    render::mount(&state.borrow().document)?;
    render::render_all(&state.borrow());
    input::attach_ui(state.clone())?;
    fetch::spawn_catalog_load(state);
    Ok(())
}

/// Current state as JSON, for poking at the page from the console.
#[wasm_bindgen]
pub fn debug_state() -> Option<String> {
    STATE.with(|st| {
        let st = st.borrow();
        let s = st.as_ref()?.try_borrow().ok()?;
        let summary = serde_json::json!({
            "layout": format!("{:?}", s.composer.layout),
            "selection": s.composer.selection,
            "roster": s.composer.roster,
            "catalog": s.catalog.len(),
            "loaded": s.load.loaded,
            "finished": s.load.finished,
        });
        Some(summary.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_config_defaults() {
        let c = PageConfig::from_search("");
        assert_eq!(c.api_base, DEFAULT_API_BASE);
        assert_eq!(c.layout, LayoutMode::Card);
        assert_eq!(c.log_level, log::LevelFilter::Info);
    }

    #[test]
    fn page_config_overrides() {
        let c = PageConfig::from_search("?api=http%3A%2F%2Flocalhost%3A9000%2Fv2&layout=party&log=debug");
        assert_eq!(c.api_base, "http://localhost:9000/v2");
        assert_eq!(c.layout, LayoutMode::Party);
        assert_eq!(c.log_level, log::LevelFilter::Debug);
        assert_eq!(PageConfig::from_search("?api=").api_base, DEFAULT_API_BASE);
    }
}
