use std::cell::RefCell;
use std::rc::Rc;

use team_core::catalog::{CatalogEntry, CatalogQuery, Generation};
use team_core::composer::ComposerState;
use web_sys::{Document, Window};

/// Catalog loading status shown above the selector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LoadStatus {
    pub loaded: usize,
    pub total: u32,
    pub finished: bool,
}

impl LoadStatus {
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        ((self.loaded as f64 / f64::from(self.total)).min(1.0) * 100.0).round() as u32
    }
}

/// Global application state stored behind an `Rc<RefCell<_>>` so it can be
/// shared across the WASM callbacks.
pub struct State {
    pub window: Window,
    pub document: Document,
    pub api_base: String,
    pub composer: ComposerState,
    pub catalog: Vec<CatalogEntry>,
    pub query: CatalogQuery,
    /// Expanded generation sections, indexed by `Generation::index`.
    pub expanded: [bool; 9],
    pub load: LoadStatus,
    pub trainer_picker_open: bool,
    /// Export in progress; the download button is disabled meanwhile.
    pub downloading: bool,
}

impl State {
    pub fn toggle_section(&mut self, generation: Generation) {
        let slot = &mut self.expanded[generation.index()];
        *slot = !*slot;
    }
}

/// Thread local storage for the single runtime state instance.
thread_local! {
    pub static STATE: RefCell<Option<Rc<RefCell<State>>>> = const { RefCell::new(None) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_capped_and_rounded() {
        let s = LoadStatus {
            loaded: 512,
            total: 1025,
            finished: false,
        };
        assert_eq!(s.percent(), 50);
        let done = LoadStatus {
            loaded: 1200,
            total: 1025,
            finished: true,
        };
        assert_eq!(done.percent(), 100);
        assert_eq!(LoadStatus::default().percent(), 100);
    }
}
