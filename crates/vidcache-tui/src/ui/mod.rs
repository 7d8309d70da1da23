//! Terminal UI module using ratatui.
//!
//! - `render`: Frame layout, overlays and status bar
//! - `input`: Keyboard event handling
//! - `styles`: Color palette and text styling
//! - `form`: Add/edit form panel
//! - `cards`: Video card grid

pub mod cards;
pub mod form;
pub mod input;
pub mod render;
pub mod styles;
