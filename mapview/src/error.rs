//! Error taxonomy for map decoding, coordinate conversion, and drawing.
//!
//! Every error here is recoverable at the component boundary: a failed decode
//! leaves the surface in its "map unavailable" state, a failed conversion
//! drops the one operation that needed it, and a stale load result is not an
//! error at all (see [`crate::surface::LoadOutcome::Stale`]).

/// Malformed map metadata or a grid whose cell count disagrees with it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapDataError {
    /// Width or height is zero.
    #[error("invalid map dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    /// Resolution is zero, negative, or not finite.
    #[error("invalid map resolution {0}")]
    InvalidResolution(f64),
    /// Origin has a non-finite component.
    #[error("invalid map origin ({x}, {y}, {z})")]
    InvalidOrigin { x: f64, y: f64, z: f64 },
    /// A required metadata field was absent from the provider payload.
    #[error("missing map field `{0}`")]
    MissingField(&'static str),
    /// `cells.len()` does not equal `width * height`.
    #[error("cell count mismatch: expected {expected}, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },
}

/// A world/canvas conversion produced no usable coordinate.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CoordinateConversionError {
    /// The effective scale is zero or not finite, so the transform has no inverse.
    #[error("degenerate effective scale {0}")]
    DegenerateScale(f64),
    /// An input or intermediate value was NaN or infinite.
    #[error("non-finite coordinate")]
    NonFinite,
}

/// Failure fetching or decoding a raster map asset.
#[derive(Debug, thiserror::Error)]
pub enum AssetLoadError {
    /// The image bytes could not be decoded.
    #[error("failed to decode raster image: {0}")]
    Decode(#[from] image::ImageError),
    /// The decoded image does not match the map's advertised dimensions.
    #[error("raster is {actual_width}x{actual_height}, map expects {width}x{height}")]
    DimensionMismatch { width: u32, height: u32, actual_width: u32, actual_height: u32 },
    /// The collaborator could not deliver the asset.
    #[error("failed to fetch map asset: {0}")]
    Fetch(String),
}

/// The result error of one map load: bad data or a bad asset.
#[derive(Debug, thiserror::Error)]
pub enum MapLoadError {
    #[error(transparent)]
    Data(#[from] MapDataError),
    #[error(transparent)]
    Asset(#[from] AssetLoadError),
}

/// A drawing backend rejected a call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("render backend error: {0}")]
    Backend(String),
}
