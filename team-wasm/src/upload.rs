use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use team_core::composer::ComposerEvent;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Event, File, FileReader, HtmlInputElement};

use crate::constants::{BACKGROUND_UPLOAD_ID, TRAINER_UPLOAD_ID};
use crate::input::dispatch;
use crate::state::State;

/// Which composer field an uploaded image replaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadTarget {
    TrainerSprite,
    Background,
}

impl UploadTarget {
    pub fn from_input_id(id: &str) -> Option<Self> {
        match id {
            TRAINER_UPLOAD_ID => Some(UploadTarget::TrainerSprite),
            BACKGROUND_UPLOAD_ID => Some(UploadTarget::Background),
            _ => None,
        }
    }

    pub fn event(self, data_url: String) -> ComposerEvent {
        match self {
            UploadTarget::TrainerSprite => ComposerEvent::SetTrainerSprite(data_url),
            UploadTarget::Background => ComposerEvent::SetBackgroundImage(Some(data_url)),
        }
    }
}

/// Read the first file of a changed `<input type=file>` and apply it.
pub fn handle_file_input(
    state: Rc<RefCell<State>>,
    input: &HtmlInputElement,
    target: UploadTarget,
) -> Result<(), JsValue> {
    let Some(file) = input.files().and_then(|files| files.item(0)) else {
        debug!("upload: no file selected");
        return Ok(());
    };
    // Let the same file be picked again later.
    input.set_value("");
    read_as_data_url(&file, move |data_url| {
        if target == UploadTarget::TrainerSprite {
            state.borrow_mut().trainer_picker_open = false;
        }
        dispatch(&state, target.event(data_url));
    })
}

fn read_as_data_url(file: &File, on_load: impl FnOnce(String) + 'static) -> Result<(), JsValue> {
    let reader = FileReader::new()?;
    let reader_for_closure = reader.clone();
    let name = file.name();
    let onload = Closure::once(move |_ev: Event| {
        let data_url = reader_for_closure
            .result()
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_default();
        if data_url.is_empty() {
            warn!("upload: {name} is empty or unreadable");
            return;
        }
        on_load(data_url);
    });
    reader.set_onload(Some(onload.as_ref().unchecked_ref()));
    reader.read_as_data_url(file)?;
    onload.forget();
    Ok(())
}
