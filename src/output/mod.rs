//! Output formatting for loaded tables

mod html;
mod terminal;

pub use html::{render_table, NO_DATA_HTML};
pub use terminal::TerminalOutput;
