mod app;
mod dom;
mod net;
mod panel;
mod render;
mod state;

pub use app::run;
