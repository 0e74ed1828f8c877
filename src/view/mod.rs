//! Retained table surface and the stateless renderers that paint it.
//!
//! Renderers never touch the terminal: they fill a [`TableModel`], and the
//! ratatui layer in [`crate::ui`] paints whatever the model holds.

pub mod render;
pub mod status;
pub mod table;

pub use render::{
    render_contexts, render_groups, render_topics, MessageRows, MESSAGE_HEADER,
};
pub use status::StatusLine;
pub use table::{InvalidSelection, TableModel};
