use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use shapesketch_shared::{GestureTracker, Session};

use crate::panel::ResultPanel;

pub struct State {
    pub window: Window,
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
    pub panel: ResultPanel,
    pub session: Session,
    pub tracker: GestureTracker,
    pub endpoint: String,
    pub debug: bool,
}
