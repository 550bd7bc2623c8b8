use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use shapesketch_shared::{Point, CANVAS_BG, STROKE_COLOR, STROKE_WIDTH};

pub fn configure_ink(ctx: &CanvasRenderingContext2d) {
    ctx.set_stroke_style_str(STROKE_COLOR);
    ctx.set_line_width(STROKE_WIDTH);
    ctx.set_line_cap("round");
    ctx.set_line_join("round");
}

/// Paints the whole bitmap with the fixed background so exports are never transparent.
pub fn fill_background(canvas: &HtmlCanvasElement, ctx: &CanvasRenderingContext2d) {
    ctx.set_fill_style_str(CANVAS_BG);
    ctx.fill_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
}

pub fn draw_segment(ctx: &CanvasRenderingContext2d, from: Point, to: Point) {
    ctx.begin_path();
    ctx.move_to(from.x, from.y);
    ctx.line_to(to.x, to.y);
    ctx.stroke();
}
