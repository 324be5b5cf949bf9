//! WASM bindings for the editor

use crate::{BlockKind, EditOp, Editor, EditorConfig, HeightOracle};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Host clock in milliseconds
fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// Heights answered by a JS callback `(position) => number | undefined`
struct JsHeights<'a> {
    query: &'a js_sys::Function,
}

impl HeightOracle for JsHeights<'_> {
    fn bounding_height(&self, position: usize) -> Option<f32> {
        match self
            .query
            .call1(&JsValue::NULL, &JsValue::from(position as u32))
        {
            // undefined, null and non-numbers are a miss
            Ok(value) => value.as_f64().map(|h| h as f32),
            Err(err) => {
                tracing::warn!(position, ?err, "height query threw");
                None
            }
        }
    }
}

/// WASM-exposed editor wrapper
#[wasm_bindgen]
pub struct WasmEditor {
    editor: Editor,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create a new editor with default page size (US Letter)
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WasmEditor, JsError> {
        let editor = Editor::new(EditorConfig::default(), now_ms())?;
        Ok(Self { editor })
    }

    /// Create an editor from a JSON configuration; missing fields take defaults
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config_json: &str) -> Result<WasmEditor, JsError> {
        let config = EditorConfig::from_json(config_json)?;
        let editor = Editor::new(config, now_ms())?;
        Ok(Self { editor })
    }

    /// Create an editor holding one paragraph per line of `text`
    #[wasm_bindgen(js_name = fromText)]
    pub fn from_text(text: &str) -> Result<WasmEditor, JsError> {
        let editor = Editor::with_text(text, EditorConfig::default(), now_ms())?;
        Ok(Self { editor })
    }

    /// Insert text at a document position; newlines split the block
    #[wasm_bindgen(js_name = insertText)]
    pub fn insert_text(&mut self, position: usize, text: &str) -> Result<(), JsError> {
        self.editor.insert_text(position, text, now_ms())?;
        Ok(())
    }

    /// Split the block at a position (Enter key)
    #[wasm_bindgen(js_name = insertParagraph)]
    pub fn insert_paragraph(&mut self, position: usize) -> Result<(), JsError> {
        self.editor.apply(EditOp::split(position), now_ms())?;
        Ok(())
    }

    /// Delete a range of text or of whole top-level blocks
    #[wasm_bindgen(js_name = deleteRange)]
    pub fn delete_range(&mut self, start: usize, end: usize) -> Result<(), JsError> {
        self.editor.apply(EditOp::delete(start, end), now_ms())?;
        Ok(())
    }

    /// Turn the text block at `position` into a heading, or back into a
    /// paragraph for level 0
    #[wasm_bindgen(js_name = setHeading)]
    pub fn set_heading(&mut self, position: usize, level: u8) -> Result<(), JsError> {
        let kind = match level {
            0 => BlockKind::Paragraph,
            level => BlockKind::Heading {
                level: level.min(6),
            },
        };
        self.editor.apply(EditOp::set_kind(position, kind), now_ms())?;
        Ok(())
    }

    /// Run due work. Returns true if the page-break markers changed.
    pub fn tick(&mut self) -> bool {
        self.editor.tick(now_ms())
    }

    /// Run due work against rendered heights. `query(position)` returns the
    /// height of the DOM box of the top-level block starting at `position`,
    /// or `undefined` if it is not rendered.
    #[wasm_bindgen(js_name = tickWithHeights)]
    pub fn tick_with_heights(&mut self, query: &js_sys::Function) -> bool {
        self.editor.tick_with(now_ms(), &JsHeights { query })
    }

    /// Host time of the next pending recompute, if any
    #[wasm_bindgen(js_name = nextDeadline)]
    pub fn next_deadline(&self) -> Option<f64> {
        self.editor.next_deadline().map(|ms| ms as f64)
    }

    /// Get full document text
    #[wasm_bindgen(js_name = getText)]
    pub fn get_text(&self) -> String {
        self.editor.text()
    }

    /// Total number of document positions
    #[wasm_bindgen(js_name = getDocumentSize)]
    pub fn get_document_size(&self) -> usize {
        self.editor.document().size()
    }

    /// Get page count
    #[wasm_bindgen(js_name = getPageCount)]
    pub fn get_page_count(&self) -> usize {
        self.editor.page_count()
    }

    /// Current break positions
    #[wasm_bindgen(js_name = getBreakPositions)]
    pub fn get_break_positions(&self) -> Vec<u32> {
        self.editor
            .state()
            .breaks()
            .iter()
            .map(|&pos| pos as u32)
            .collect()
    }

    /// Page-break markers as a JSON array
    #[wasm_bindgen(js_name = getOverlayJson)]
    pub fn get_overlay_json(&self) -> Result<String, JsError> {
        Ok(self.editor.overlay_json()?)
    }

    /// Active configuration as JSON
    #[wasm_bindgen(js_name = getConfigJson)]
    pub fn get_config_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(self.editor.config())?)
    }

    /// End the session; pending recomputes never run
    pub fn destroy(&mut self) {
        self.editor.teardown();
    }
}
