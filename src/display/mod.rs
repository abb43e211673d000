pub mod color;
pub mod components;
pub mod renderer;
pub mod surface;

use std::convert::Infallible;

use thiserror::Error;

use crate::{assets::AssetError, geometry::GeometryError};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Surface size is not known yet")]
    NoSurface,
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("Could not write frame: {0}")]
    Export(#[from] image::ImageError),
}

// The frame buffer never fails to draw.
impl From<Infallible> for RenderError {
    fn from(error: Infallible) -> Self {
        match error {}
    }
}

/// Tick marks are this many pixels long, measured in from the edge.
pub const TICK_LENGTH: f32 = 10.0;

/// Distance of the numerals from the screen edge.
pub const NUMERAL_MARGIN: i32 = 12;

/// Padding inside a complication's bounds.
pub const COMPLICATION_PADDING: u32 = 4;
