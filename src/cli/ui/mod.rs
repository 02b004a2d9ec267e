pub mod output;
pub mod panel;

pub use output::Output;
pub use panel::render_panel;
