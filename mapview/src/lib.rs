//! Occupancy-grid map viewer and coordinate-transform engine.
//!
//! Rasterizes a 2-D occupancy grid, keeps a pan/zoom viewport over it,
//! converts between world meters, grid cells and canvas pixels (with the
//! vertical flip between world and screen), overlays the navigation graph and
//! the live robot pose, and turns canvas clicks back into world coordinates.
//!
//! The engine has no browser dependency at its core. [`surface::MapSurface`]
//! draws through the [`render::Renderer`] capability; the host picks a backend
//! (HTML canvas in the browser, an RGBA image natively, a recorder in tests)
//! and feeds it map loads, pose updates and input events.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`surface`] | Composed viewer state, load tickets, redraw cycle |
//! | [`grid`] | Occupancy cells and raster snapshots to RGBA bitmaps |
//! | [`mapper`] | World / grid / canvas coordinate transforms |
//! | [`viewport`] | View state and the pan/zoom gesture state machine |
//! | [`overlay`] | Nav points, road segments, robot marker |
//! | [`render`] | `Renderer` trait, recording and raster backends |
//! | [`web`] | HTML canvas backend and the browser wrapper |
//! | [`model`] | Map metadata, grids, nav graph, robot pose |
//! | [`wire`] | Provider and pose-stream message shapes |
//! | [`error`] | Error taxonomy |
//! | [`consts`] | Shared numeric constants (zoom limits, overlay sizes, thresholds) |

pub mod consts;
pub mod error;
pub mod glyphs;
pub mod grid;
pub mod mapper;
pub mod model;
pub mod overlay;
pub mod render;
pub mod surface;
pub mod viewport;
pub mod web;
pub mod wire;
