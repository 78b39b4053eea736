use log::debug;
use team_core::composer::{ComposerState, ItemRef, LayoutMode, Placement};
use team_core::geometry::CanvasRect;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::constants::{ITEM_ATTR, PARTY_CANVAS_ID, SELECTED_CLASS, SIZE_ATTR};

/// Client-space box of the party canvas, if it is mounted.
pub fn party_rect(document: &Document) -> Option<CanvasRect> {
    let rect = document
        .get_element_by_id(PARTY_CANVAS_ID)?
        .get_bounding_client_rect();
    Some(CanvasRect {
        left: rect.left(),
        top: rect.top(),
        width: rect.width(),
        height: rect.height(),
    })
}

/// Every item drawn on the party canvas, back to front by index.
pub fn party_items(composer: &ComposerState) -> Vec<ItemRef> {
    let mut items = vec![ItemRef::Trainer, ItemRef::TrainerName];
    items.extend((0..composer.roster.len()).map(ItemRef::Roster));
    items
}

/// Inline style for one party item. Items are centered on their position.
pub fn item_style(item: ItemRef, p: &Placement) -> String {
    let flip = if p.flipped { " scaleX(-1)" } else { "" };
    let extent = match item {
        ItemRef::TrainerName => format!("font-size:{}px;", p.size),
        _ => format!("width:{0}px;height:{0}px;", p.size),
    };
    let display = if p.visible { "" } else { "display:none;" };
    format!(
        "left:{:.3}%;top:{:.3}%;{extent}transform:translate(-50%,-50%) rotate({}deg){flip};z-index:{};{display}",
        p.position.x, p.position.y, p.rotation, p.z_index
    )
}

/// Patch the mounted party items in place. Elements are never replaced here,
/// so a press that started on one still ends on it.
pub fn refresh_party(document: &Document, composer: &ComposerState) {
    if composer.layout != LayoutMode::Party {
        return;
    }
    for item in party_items(composer) {
        let Some(p) = composer.placement(item) else {
            continue;
        };
        let selector = format!("#{PARTY_CANVAS_ID} [{ITEM_ATTR}=\"{item}\"]");
        let Ok(Some(el)) = document.query_selector(&selector) else {
            continue;
        };
        let Ok(el) = el.dyn_into::<HtmlElement>() else {
            continue;
        };
        let patched = el
            .set_attribute("style", &item_style(item, &p))
            .and_then(|_| el.set_attribute(SIZE_ATTR, &p.size.to_string()))
            .and_then(|_| el.class_list().toggle_with_force(SELECTED_CLASS, p.selected));
        if let Err(e) = patched {
            debug!("canvas: could not patch {item}: {e:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use team_core::geometry::Point;

    fn placement(flipped: bool, visible: bool) -> Placement {
        Placement {
            position: Point::new(50.0, 12.5),
            size: 60,
            flipped,
            rotation: -10,
            z_index: 3,
            selected: false,
            visible,
        }
    }

    #[test]
    fn sprite_style_sizes_box() {
        let s = item_style(ItemRef::Roster(0), &placement(true, true));
        assert!(s.contains("left:50.000%;top:12.500%;"));
        assert!(s.contains("width:60px;height:60px;"));
        assert!(s.contains("rotate(-10deg) scaleX(-1)"));
        assert!(s.contains("z-index:3;"));
        assert!(!s.contains("display:none"));
    }

    #[test]
    fn name_style_uses_font_size() {
        let s = item_style(ItemRef::TrainerName, &placement(false, false));
        assert!(s.contains("font-size:60px;"));
        assert!(!s.contains("width"));
        assert!(!s.contains("scaleX"));
        assert!(s.ends_with("display:none;"));
    }

    #[test]
    fn items_cover_roster() {
        let mut c = ComposerState::new("t.png");
        assert_eq!(party_items(&c).len(), 2);
        c.roster.push(team_core::CatalogEntry {
            id: 1,
            name: "bulbasaur".into(),
            primary_image: String::new(),
            alternate_image: None,
            generation: team_core::Generation::from_id(1),
        });
        assert_eq!(party_items(&c)[2], ItemRef::Roster(0));
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use team_core::composer::ComposerEvent;
    use wasm_bindgen_test::*;

    use crate::constants::PARTY_ITEM_CLASS;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn refresh_patches_mounted_items_in_place() {
        let document = web_sys::window().unwrap().document().unwrap();
        let canvas = document.create_element("div").unwrap();
        canvas.set_id(PARTY_CANVAS_ID);
        canvas.set_inner_html(&format!(
            r#"<div class="{PARTY_ITEM_CLASS}" {ITEM_ATTR}="trainer"></div>"#
        ));
        document.body().unwrap().append_child(&canvas).unwrap();

        let mut composer = ComposerState::new("assets/Trainer_Luna.png");
        composer.apply(ComposerEvent::SetLayout(LayoutMode::Party));
        composer.apply(ComposerEvent::Select(ItemRef::Trainer));
        refresh_party(&document, &composer);

        let el = canvas.first_element_child().unwrap();
        assert!(el.class_list().contains(SELECTED_CLASS));
        let style = el.get_attribute("style").unwrap();
        assert!(style.contains("translate(-50%,-50%)"));
        assert_eq!(
            el.get_attribute(SIZE_ATTR),
            composer.size_of(ItemRef::Trainer).map(|s| s.to_string())
        );
        canvas.remove();
    }
}
