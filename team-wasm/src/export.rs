//! Card export: clone the card, make it self-contained, rasterize the clone
//! with `html2canvas` and download the result.

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::join_all;
use log::{error, info, warn};
use serde::Serialize;
use sprite_raster::{ScaleFilter, png_data_url, reencode, upscale_sprite};
use team_core::catalog::SpriteStyle;
use team_core::composer::{Background, LayoutMode};
use team_core::constants::{TRAINER_PRESETS, trainer_preset_path};
use team_core::export::{
    STRIP_SELECTORS, SPRITE_SELECTOR, SpriteSizing, capture_scale, download_filename,
    is_remote_image, is_touch_primary, sprite_sizing,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, HtmlImageElement, Window};

use crate::constants::{CARD_ID, PARTY_ITEM_CLASS, SELECTED_CLASS, SIZE_ATTR};
use crate::render;
use crate::state::State;
use crate::utils::{asset_url, fetch_bytes, set_style};

#[wasm_bindgen]
extern "C" {
    /// Global DOM rasterizer provided by the host page.
    #[wasm_bindgen(catch, js_name = html2canvas)]
    fn html2canvas(node: &HtmlElement, options: &JsValue) -> Result<js_sys::Promise, JsValue>;
}

/// Options object handed to the rasterizer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOptions {
    pub scale: f64,
    /// `null` keeps the card's own background, transparent corners included.
    pub background_color: Option<String>,
    #[serde(rename = "useCORS")]
    pub use_cors: bool,
    pub logging: bool,
}

impl CaptureOptions {
    pub fn for_device(touch: bool) -> Self {
        CaptureOptions {
            scale: capture_scale(touch),
            background_color: None,
            use_cors: true,
            logging: false,
        }
    }
}

/// Everything the pipeline needs, copied out so no borrow spans an await.
struct ExportJob {
    window: Window,
    document: Document,
    trainer_name: String,
    layout: LayoutMode,
    sprite_style: SpriteStyle,
    background: Background,
}

pub fn scale_filter(style: SpriteStyle) -> ScaleFilter {
    match style {
        SpriteStyle::Pixel => ScaleFilter::Nearest,
        SpriteStyle::Artwork => ScaleFilter::Smooth,
    }
}

/// `image-rendering` for a re-rasterized sprite shown below its pixel size.
pub fn image_rendering(filter: ScaleFilter) -> &'static str {
    match filter {
        ScaleFilter::Nearest => "pixelated",
        ScaleFilter::Smooth => "auto",
    }
}

/// Kick off an export unless one is already running.
pub fn spawn_download(state: Rc<RefCell<State>>) {
    let job = {
        let mut s = state.borrow_mut();
        if s.downloading {
            return;
        }
        s.downloading = true;
        render::render_controls(&s);
        ExportJob {
            window: s.window.clone(),
            document: s.document.clone(),
            trainer_name: s.composer.name.text.clone(),
            layout: s.composer.layout,
            sprite_style: s.composer.sprite_style,
            background: s.composer.background.clone(),
        }
    };
    wasm_bindgen_futures::spawn_local(async move {
        match download_card(&job).await {
            Ok(filename) => info!("export: saved {filename}"),
            Err(e) => error!("export: failed: {e:?}"),
        }
        let mut s = state.borrow_mut();
        s.downloading = false;
        render::render_controls(&s);
    });
}

async fn download_card(job: &ExportJob) -> Result<String, JsValue> {
    let card = job
        .document
        .get_element_by_id(CARD_ID)
        .ok_or("card not mounted")?;
    let clone: HtmlElement = card.clone_node_with_deep(true)?.dyn_into()?;
    clone.remove_attribute("id")?;

    strip_controls(&clone)?;
    freeze_name(&job.document, &clone, &job.trainer_name)?;
    for (property, value) in job.background.css() {
        set_style(&clone, property, &value);
    }
    set_style(&clone, "position", "absolute");
    set_style(&clone, "left", "-9999px");
    set_style(&clone, "top", "-9999px");

    inline_sprites(job, &clone).await?;
    inline_trainer(job, &clone).await;

    let body = job.document.body().ok_or("no body")?;
    body.append_child(&clone)?;
    let touch = job
        .window
        .navigator()
        .user_agent()
        .map(|ua| is_touch_primary(&ua))
        .unwrap_or(false);
    let captured = capture(&clone, &CaptureOptions::for_device(touch)).await;
    clone.remove();
    let canvas = captured?;

    let filename = download_filename(&job.trainer_name);
    let link: HtmlElement = job.document.create_element("a")?.dyn_into()?;
    link.set_attribute("href", &canvas.to_data_url()?)?;
    link.set_attribute("download", &filename)?;
    link.click();
    Ok(filename)
}

async fn capture(node: &HtmlElement, options: &CaptureOptions) -> Result<HtmlCanvasElement, JsValue> {
    let json = serde_json::to_string(options).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let options = js_sys::JSON::parse(&json)?;
    let canvas = JsFuture::from(html2canvas(node, &options)?).await?;
    canvas.dyn_into()
}

fn strip_controls(clone: &HtmlElement) -> Result<(), JsValue> {
    let nodes = clone.query_selector_all(STRIP_SELECTORS)?;
    for i in 0..nodes.length() {
        if let Some(node) = nodes.get(i).and_then(|n| n.dyn_into::<Element>().ok()) {
            node.remove();
        }
    }
    let items = clone.query_selector_all(&format!(".{PARTY_ITEM_CLASS}.{SELECTED_CLASS}"))?;
    for i in 0..items.length() {
        if let Some(item) = items.get(i).and_then(|n| n.dyn_into::<Element>().ok()) {
            item.class_list().remove_1(SELECTED_CLASS)?;
        }
    }
    Ok(())
}

/// Swap a live name input for static text and pin the heading styles.
fn freeze_name(document: &Document, clone: &HtmlElement, name: &str) -> Result<(), JsValue> {
    let inputs = clone.query_selector_all(".trainer-name-input")?;
    for i in 0..inputs.length() {
        let Some(input) = inputs.get(i) else {
            continue;
        };
        let display = document.create_element("div")?;
        display.set_class_name("trainer-name-display");
        let h2 = document.create_element("h2")?;
        h2.set_text_content(Some(name));
        display.append_child(&h2)?;
        if let Some(parent) = input.parent_node() {
            parent.replace_child(&display, &input)?;
        }
    }
    let headings = clone.query_selector_all(".trainer-name-display h2")?;
    for i in 0..headings.length() {
        let Some(h2) = headings.get(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
            continue;
        };
        if h2.text_content().is_none_or(|t| t.trim().is_empty()) {
            h2.set_text_content(Some(name));
        }
        for (property, value) in [
            ("color", "white"),
            ("display", "block"),
            ("visibility", "visible"),
            ("font-weight", "700"),
            ("text-shadow", "0 2px 4px rgba(0, 0, 0, 0.3)"),
            ("margin", "0"),
        ] {
            set_style(&h2, property, value);
        }
    }
    Ok(())
}

async fn inline_sprites(job: &ExportJob, clone: &HtmlElement) -> Result<(), JsValue> {
    let nodes = clone.query_selector_all(SPRITE_SELECTOR)?;
    let images: Vec<HtmlImageElement> = (0..nodes.length())
        .filter_map(|i| nodes.get(i)?.dyn_into::<HtmlImageElement>().ok())
        .filter(|img| img.get_attribute("src").is_some_and(|s| is_remote_image(&s)))
        .collect();
    let filter = scale_filter(job.sprite_style);
    let tasks = images.iter().map(|img| async move {
        let current = img
            .closest(&format!("[{SIZE_ATTR}]"))
            .ok()
            .flatten()
            .and_then(|el| el.get_attribute(SIZE_ATTR))
            .and_then(|v| v.parse().ok())
            .unwrap_or(team_core::constants::ROSTER_DEFAULT_SIZE);
        let sizing = sprite_sizing(job.layout, current);
        if let Err(e) = inline_sprite(&job.window, img, sizing, filter).await {
            warn!("export: keeping remote sprite {}: {e:?}", img.src());
        }
    });
    join_all(tasks).await;
    Ok(())
}

async fn inline_sprite(
    window: &Window,
    img: &HtmlImageElement,
    sizing: SpriteSizing,
    filter: ScaleFilter,
) -> Result<(), JsValue> {
    let bytes = fetch_bytes(window, &img.src()).await?;
    let png = upscale_sprite(&bytes, sizing.target, filter)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    img.set_src(&png_data_url(&png));
    let px = format!("{}px", sizing.display);
    set_style(img, "width", &px);
    set_style(img, "height", &px);
    set_style(img, "image-rendering", image_rendering(filter));
    Ok(())
}

/// Re-encode a remote trainer sprite at natural size, falling back to the
/// default preset when it cannot be read.
async fn inline_trainer(job: &ExportJob, clone: &HtmlElement) {
    let Ok(Some(img)) = clone.query_selector(".trainer-sprite") else {
        return;
    };
    let Ok(img) = img.dyn_into::<HtmlImageElement>() else {
        return;
    };
    if !img.get_attribute("src").is_some_and(|s| is_remote_image(&s)) {
        return;
    }
    let fallback = asset_url(&trainer_preset_path(TRAINER_PRESETS[0]));
    for url in [img.src(), fallback] {
        match fetch_bytes(&job.window, &url).await.and_then(|bytes| {
            reencode(&bytes).map_err(|e| JsValue::from_str(&e.to_string()))
        }) {
            Ok(png) => {
                img.set_src(&png_data_url(&png));
                return;
            }
            Err(e) => warn!("export: trainer sprite {url} unusable: {e:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_options_serialize_for_html2canvas() {
        let json = serde_json::to_string(&CaptureOptions::for_device(false)).unwrap();
        assert_eq!(
            json,
            r#"{"scale":4.0,"backgroundColor":null,"useCORS":true,"logging":false}"#
        );
        assert_eq!(CaptureOptions::for_device(true).scale, 2.0);
    }

    #[test]
    fn filter_follows_sprite_style() {
        assert_eq!(scale_filter(SpriteStyle::Pixel), ScaleFilter::Nearest);
        assert_eq!(scale_filter(SpriteStyle::Artwork), ScaleFilter::Smooth);
    }

    #[test]
    fn only_pixel_sprites_render_pixelated() {
        assert_eq!(image_rendering(scale_filter(SpriteStyle::Pixel)), "pixelated");
        assert_eq!(image_rendering(scale_filter(SpriteStyle::Artwork)), "auto");
    }
}
