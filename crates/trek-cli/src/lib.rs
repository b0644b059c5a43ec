//! Trek CLI - text front end for the step challenge.
//!
//! The `trek` binary validates user input, drives the log store and renders
//! the derived progress as plain text.

pub mod render;

pub use render::{render_day, render_grid, render_route, render_status, render_team};
