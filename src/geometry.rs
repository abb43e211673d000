//! Absolute pixel geometry derived from a [`StyleConfig`] and the surface size.
//!
//! Everything here is a pure function of its inputs and is recomputed
//! whenever the surface changes size.

use embedded_graphics::{
    prelude::{Point, Size},
    primitives::Rectangle,
};
use thiserror::Error;

use crate::style::{StyleConfig, WatchFaceComplication, WatchFaceDimensions, COMPLICATION_COUNT};

#[derive(Error, Debug, PartialEq)]
pub enum GeometryError {
    #[error("Viewport {0}x{1} has no area")]
    EmptyViewport(u32, u32),
    #[error("Hand offset {0} leaves nothing in front of the pivot")]
    HandOffset(f32),
    #[error("Hand bitmap {0}x{1} has no area")]
    EmptyHandBitmap(u32, u32),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Integer edges of a complication slot. Edges may lie off screen, which is
/// where unconfigured slots end up.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }

    pub fn to_rectangle(&self) -> Rectangle {
        Rectangle::new(self.top_left(), self.size())
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HandLengths {
    pub hour: f32,
    pub minute: f32,
    pub second: f32,
}

/// Size of a scaled hand bitmap and how far its pivot sits from the top edge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HandBitmapGeometry {
    pub width: f32,
    pub height: f32,
    pub center_offset: f32,
}

/// Intrinsic sizes of the assets whose geometry depends on the viewport.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetSizes {
    pub hour_hand: Option<Size>,
    pub minute_hand: Option<Size>,
    pub background: Option<Size>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeometryState {
    pub viewport: Viewport,
    pub center: Point,
    pub center_x: f32,
    pub center_y: f32,
    pub center_radius: f32,
    pub hand_lengths: HandLengths,
    pub complication_bounds: [Bounds; COMPLICATION_COUNT],
    pub hour_hand_bitmap: Option<HandBitmapGeometry>,
    pub minute_hand_bitmap: Option<HandBitmapGeometry>,
    pub background_size: Option<Size>,
}

impl GeometryState {
    pub fn resolve(
        style: &StyleConfig,
        viewport: Viewport,
        assets: AssetSizes,
    ) -> Result<GeometryState, GeometryError> {
        if viewport.width == 0 || viewport.height == 0 {
            return Err(GeometryError::EmptyViewport(viewport.width, viewport.height));
        }

        let center_x = viewport.width as f32 / 2.0;
        let center_y = viewport.height as f32 / 2.0;
        let center_radius = center_x.min(center_y);

        let hand_bitmap = |size: Option<Size>, ratio: f32, offset: f32| {
            size.map(|size| resolve_hand_bitmap_geometry(size, ratio, offset, viewport))
                .transpose()
        };

        Ok(GeometryState {
            viewport,
            center: Point::new((viewport.width / 2) as i32, (viewport.height / 2) as i32),
            center_x,
            center_y,
            center_radius,
            hand_lengths: resolve_hand_lengths(&style.dimensions, center_radius),
            complication_bounds: [0, 1, 2]
                .map(|index| resolve_complication_bounds(&style.complications[index], viewport)),
            hour_hand_bitmap: hand_bitmap(
                assets.hour_hand,
                style.dimensions.hour_hand_radius_ratio,
                style.hour_hand.offset,
            )?,
            minute_hand_bitmap: hand_bitmap(
                assets.minute_hand,
                style.dimensions.minute_hand_radius_ratio,
                style.minute_hand.offset,
            )?,
            background_size: assets
                .background
                .map(|size| scale_to_width(size, viewport.width)),
        })
    }

    /// Indices of the slots whose bounds contain `point`, in slot order.
    pub fn slots_at(&self, point: Point) -> impl Iterator<Item = usize> + '_ {
        self.complication_bounds
            .iter()
            .enumerate()
            .filter(move |(_, bounds)| bounds.contains(point))
            .map(|(index, _)| index)
    }
}

pub fn resolve_hand_lengths(dimensions: &WatchFaceDimensions, center_radius: f32) -> HandLengths {
    HandLengths {
        hour: center_radius * dimensions.hour_hand_radius_ratio,
        minute: center_radius * dimensions.minute_hand_radius_ratio,
        second: center_radius * dimensions.second_hand_radius_ratio,
    }
}

pub fn resolve_complication_bounds(slot: &WatchFaceComplication, viewport: Viewport) -> Bounds {
    let vw = viewport.width as f32;
    let vh = viewport.height as f32;
    let width = vw * slot.width_ratio;
    let height = vh * slot.height_ratio;

    let left = (vw * slot.x_pos - width / 2.0).round() as i32;
    let top = (vh * slot.y_pos - height / 2.0).round() as i32;

    Bounds {
        left,
        top,
        right: left + width.round() as i32,
        bottom: top + height.round() as i32,
    }
}

/// Scales a hand bitmap so the part in front of the pivot is
/// `viewport.width * radius_ratio` long. Width keeps the bitmap's aspect ratio.
pub fn resolve_hand_bitmap_geometry(
    intrinsic: Size,
    radius_ratio: f32,
    offset_ratio: f32,
    viewport: Viewport,
) -> Result<HandBitmapGeometry, GeometryError> {
    if intrinsic.width == 0 || intrinsic.height == 0 {
        return Err(GeometryError::EmptyHandBitmap(intrinsic.width, intrinsic.height));
    }
    if offset_ratio >= 1.0 {
        return Err(GeometryError::HandOffset(offset_ratio));
    }

    let height = viewport.width as f32 * radius_ratio / (1.0 - offset_ratio);
    let width = intrinsic.width as f32 * height / intrinsic.height as f32;

    Ok(HandBitmapGeometry {
        width,
        height,
        center_offset: height * offset_ratio,
    })
}

/// Background size after scaling to the viewport width, aspect ratio kept.
pub fn scale_to_width(size: Size, width: u32) -> Size {
    if size.width == 0 {
        return Size::zero();
    }
    let scale = width as f32 / size.width as f32;
    Size::new(
        (size.width as f32 * scale) as u32,
        (size.height as f32 * scale) as u32,
    )
}
