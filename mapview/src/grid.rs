//! Occupancy grid → RGBA bitmap decoding.
//!
//! Cell colors: unknown (-1) is gray 205, free (0) white, occupied (100)
//! black, anything between a linear gray ramp. Values outside `-1..=100`
//! render as unknown. Grid row 0 is the world-space bottom, bitmap row 0 is
//! the top, so bitmap row `y` is filled from grid row `height - 1 - y`.
//!
//! Pre-rendered raster snapshots are sampled back into cells with the same
//! thresholds the map server uses, then decoded through the same path, so
//! everything downstream sees one kind of bitmap.

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;

use image::{DynamicImage, Rgba, RgbaImage};

use crate::consts::{
    FREE_CELL, FREE_GRAY_THRESHOLD, OCCUPIED_CELL, OCCUPIED_GRAY_THRESHOLD, UNKNOWN_CELL, UNKNOWN_GRAY,
};
use crate::error::{AssetLoadError, MapDataError, MapLoadError};
use crate::model::{MapMetadata, OccupancyGrid};

/// Map data as delivered by the provider, before decoding.
#[derive(Debug, Clone)]
pub enum MapPayload {
    /// Raw occupancy cells.
    Occupancy(OccupancyGrid),
    /// Encoded image (PNG etc.) of a map whose metadata came from the map list.
    Raster { metadata: MapMetadata, bytes: Vec<u8> },
}

/// A map ready to draw: metadata plus its top-down RGBA bitmap.
#[derive(Debug, Clone)]
pub struct DecodedMap {
    pub metadata: MapMetadata,
    pub bitmap: RgbaImage,
}

/// Gray level for one cell value.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn cell_gray(value: i8) -> u8 {
    match value {
        UNKNOWN_CELL => UNKNOWN_GRAY,
        FREE_CELL => 255,
        OCCUPIED_CELL => 0,
        v if v > FREE_CELL && v < OCCUPIED_CELL => (255.0 - f64::from(v) / 100.0 * 255.0).floor() as u8,
        _ => UNKNOWN_GRAY,
    }
}

/// Decode a validated grid into a `width x height` bitmap.
#[must_use]
pub fn decode(grid: &OccupancyGrid) -> RgbaImage {
    let meta = grid.metadata();
    let width = meta.width();
    let height = meta.height();
    let cells = grid.cells();
    RgbaImage::from_fn(width, height, |x, y| {
        let row = (height - 1 - y) as usize;
        let gray = cell_gray(cells[row * width as usize + x as usize]);
        Rgba([gray, gray, gray, 255])
    })
}

/// Decode raw cells against `metadata`.
///
/// # Errors
///
/// Returns [`MapDataError::CellCountMismatch`] when `cells` is not exactly
/// `width * height` long; nothing is rendered in that case.
pub fn decode_cells(metadata: &MapMetadata, cells: &[i8]) -> Result<RgbaImage, MapDataError> {
    let grid = OccupancyGrid::new(*metadata, cells.to_vec())?;
    Ok(decode(&grid))
}

/// Sample one raster gray level back into a cell value.
#[must_use]
pub fn gray_to_cell(gray: u8) -> i8 {
    if gray > FREE_GRAY_THRESHOLD {
        FREE_CELL
    } else if gray < OCCUPIED_GRAY_THRESHOLD {
        OCCUPIED_CELL
    } else {
        UNKNOWN_CELL
    }
}

/// Rebuild an occupancy grid from a decoded raster image.
///
/// # Errors
///
/// Returns [`AssetLoadError::DimensionMismatch`] when the image size differs
/// from `metadata`.
pub fn grid_from_image(image: &DynamicImage, metadata: &MapMetadata) -> Result<OccupancyGrid, MapLoadError> {
    let luma = image.to_luma8();
    let (actual_width, actual_height) = luma.dimensions();
    if actual_width != metadata.width() || actual_height != metadata.height() {
        return Err(AssetLoadError::DimensionMismatch {
            width: metadata.width(),
            height: metadata.height(),
            actual_width,
            actual_height,
        }
        .into());
    }
    let width = metadata.width();
    let height = metadata.height();
    let mut cells = Vec::with_capacity(metadata.cell_count());
    for row in 0..height {
        let y = height - 1 - row;
        for x in 0..width {
            cells.push(gray_to_cell(luma.get_pixel(x, y).0[0]));
        }
    }
    Ok(OccupancyGrid::new(*metadata, cells)?)
}

/// Decode encoded image bytes into an occupancy grid.
///
/// # Errors
///
/// Returns [`AssetLoadError::Decode`] for unreadable bytes and
/// [`AssetLoadError::DimensionMismatch`] for a wrongly sized image.
pub fn grid_from_raster(bytes: &[u8], metadata: &MapMetadata) -> Result<OccupancyGrid, MapLoadError> {
    let image = image::load_from_memory(bytes).map_err(AssetLoadError::Decode)?;
    grid_from_image(&image, metadata)
}

/// Turn a provider payload into a drawable map.
///
/// # Errors
///
/// Propagates [`MapLoadError`] from raster decoding.
pub fn decode_payload(payload: MapPayload) -> Result<DecodedMap, MapLoadError> {
    let grid = match payload {
        MapPayload::Occupancy(grid) => grid,
        MapPayload::Raster { metadata, bytes } => grid_from_raster(&bytes, &metadata)?,
    };
    Ok(DecodedMap { metadata: *grid.metadata(), bitmap: decode(&grid) })
}
