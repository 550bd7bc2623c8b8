use std::collections::HashMap;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use shapesketch_shared::{BarDiff, BarRow, ResultPatch, RowId};

const LABEL_CLASS: &str = "prediction-label";
const LABEL_UNSURE_CLASS: &str = "prediction-label prediction-label--unsure";

struct RowElements {
    root: HtmlElement,
    fill: HtmlElement,
    pct: Element,
}

/// DOM side of the result panel. Rows are keyed by the ids the session hands out.
pub struct ResultPanel {
    pub document: Document,
    pub headline: HtmlElement,
    pub confidence: HtmlElement,
    pub divider: HtmlElement,
    pub bars: HtmlElement,
    rows: HashMap<RowId, RowElements>,
}

impl ResultPanel {
    pub fn new(
        document: Document,
        headline: HtmlElement,
        confidence: HtmlElement,
        divider: HtmlElement,
        bars: HtmlElement,
    ) -> Self {
        Self {
            document,
            headline,
            confidence,
            divider,
            bars,
            rows: HashMap::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn apply(&mut self, patch: &ResultPatch) -> Result<(), JsValue> {
        self.headline.set_class_name(if patch.headline.muted {
            LABEL_UNSURE_CLASS
        } else {
            LABEL_CLASS
        });
        self.headline.set_text_content(Some(&patch.headline.text));
        self.confidence.set_text_content(Some(&patch.confidence));
        if let Some(visible) = patch.divider_visible {
            set_divider_visible(&self.divider, visible);
        }
        if let Some(diff) = &patch.bars {
            self.apply_bars(diff)?;
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.headline.set_text_content(Some(""));
        self.headline.set_class_name(LABEL_CLASS);
        self.confidence.set_text_content(Some(""));
        set_divider_visible(&self.divider, false);
        self.bars.set_inner_html("");
        self.rows.clear();
    }

    fn apply_bars(&mut self, diff: &BarDiff) -> Result<(), JsValue> {
        for id in &diff.remove {
            if let Some(row) = self.rows.remove(id) {
                row.root.remove();
            }
        }
        for row in &diff.update {
            match self.rows.get(&row.id) {
                Some(elements) => update_row(elements, row),
                None => web_sys::console::warn_1(
                    &format!("Result row missing for shape={}", row.shape).into(),
                ),
            }
        }
        for row in &diff.create {
            let elements = self.create_row(row)?;
            self.bars.append_child(&elements.root)?;
            self.rows.insert(row.id, elements);
        }
        Ok(())
    }

    fn create_row(&self, row: &BarRow) -> Result<RowElements, JsValue> {
        let root: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        root.set_class_name("prob-row");
        root.set_attribute("data-shape", &row.shape)?;
        root.style()
            .set_property("animation-delay", &format!("{}s", row.delay_secs))?;

        let name = self.document.create_element("span")?;
        name.set_class_name("prob-name");
        name.set_text_content(Some(&row.shape));

        let track = self.document.create_element("div")?;
        track.set_class_name("prob-track");
        let fill: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        track.append_child(&fill)?;

        let pct = self.document.create_element("span")?;

        root.append_child(&name)?;
        root.append_child(&track)?;
        root.append_child(&pct)?;

        let elements = RowElements { root, fill, pct };
        update_row(&elements, row);
        Ok(elements)
    }
}

fn update_row(elements: &RowElements, row: &BarRow) {
    let _ = elements
        .fill
        .style()
        .set_property("width", &format!("{}%", row.percent));
    elements.fill.set_class_name(if row.is_top {
        "prob-fill prob-fill--top"
    } else {
        "prob-fill"
    });
    elements
        .pct
        .set_text_content(Some(&format!("{}%", row.percent)));
    elements.pct.set_class_name(if row.is_top {
        "prob-pct prob-pct--top"
    } else {
        "prob-pct"
    });
}

fn set_divider_visible(divider: &HtmlElement, visible: bool) {
    let opacity = if visible { "1" } else { "0" };
    let _ = divider.style().set_property("opacity", opacity);
}
