use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};
use team_core::error::FetchError;
use team_core::loader::{CatalogSource, LoaderConfig, load_catalog};
use team_core::variants::VARIANT_FORMS;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Response, Window};

use crate::render;
use crate::state::{LoadStatus, State};
use crate::utils::sleep_ms;

/// Catalog source backed by `window.fetch`.
pub struct HttpCatalogSource {
    window: Window,
    api_base: String,
}

impl HttpCatalogSource {
    pub fn new(window: Window, api_base: &str) -> Self {
        HttpCatalogSource {
            window,
            api_base: api_base.to_string(),
        }
    }
}

fn entry_url(api_base: &str, key: &str) -> String {
    format!("{}/pokemon/{key}", api_base.trim_end_matches('/'))
}

fn network(e: wasm_bindgen::JsValue) -> FetchError {
    FetchError::Network(format!("{e:?}"))
}

impl CatalogSource for HttpCatalogSource {
    async fn fetch_text(&self, key: &str) -> Result<String, FetchError> {
        let value = JsFuture::from(self.window.fetch_with_str(&entry_url(&self.api_base, key)))
            .await
            .map_err(network)?;
        let resp: Response = value.dyn_into().map_err(network)?;
        if !resp.ok() {
            return Err(FetchError::Status(resp.status()));
        }
        let text = JsFuture::from(resp.text().map_err(network)?)
            .await
            .map_err(network)?;
        Ok(text.as_string().unwrap_or_default())
    }

    async fn sleep_ms(&self, ms: u32) {
        sleep_ms(&self.window, ms).await;
    }
}

/// Start the background catalog load; the selector re-renders after every batch.
pub fn spawn_catalog_load(state: Rc<RefCell<State>>) {
    let (window, api_base) = {
        let s = state.borrow();
        (s.window.clone(), s.api_base.clone())
    };
    wasm_bindgen_futures::spawn_local(async move {
        let source = HttpCatalogSource::new(window, &api_base);
        let config = LoaderConfig::default();
        info!("catalog: loading from {}", source.api_base);
        let load = load_catalog(&source, &config, VARIANT_FORMS, |progress| {
            let mut s = state.borrow_mut();
            s.catalog = progress.entries.to_vec();
            s.load = LoadStatus {
                loaded: progress.loaded,
                total: progress.total,
                finished: progress.finished,
            };
            render::render_selector(&s);
        })
        .await;
        if !load.is_complete() {
            warn!(
                "catalog: incomplete load ({} failed batches, {} dropped ids, {} failed variants)",
                load.failed_ranges.len(),
                load.dropped_ids.len(),
                load.failed_variants.len()
            );
        }
    });
}
