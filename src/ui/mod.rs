//! Terminal UI module using ratatui.
//!
//! - `render`: frame rendering and layout for the three screens
//! - `input`: keyboard event handling
//! - `styles`: color scheme and text styling

pub mod input;
pub mod render;
pub mod styles;
