pub mod background;
pub mod clock_face;
pub mod complication;
pub mod long_text;

use chrono::{DateTime, Local};

use crate::{
    assets::AssetStore,
    complication::ComplicationSlots,
    geometry::{Bounds, GeometryState},
    mode::{ComplicationAppearance, ModeState},
    style::StyleConfig,
};

use super::{surface::FrameBuffer, RenderError};

/// Everything a component may look at while drawing one frame.
pub struct FrameContext<'a> {
    pub style: &'a StyleConfig,
    pub geometry: &'a GeometryState,
    pub mode: &'a ModeState,
    pub appearance: &'a ComplicationAppearance,
    pub assets: &'a dyn AssetStore,
    pub complications: &'a ComplicationSlots,
    pub now: DateTime<Local>,
    pub hide_complications_in_ambient: bool,
}

impl<'a> FrameContext<'a> {
    pub fn now_ms(&self) -> i64 {
        self.now.timestamp_millis()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DisplayAreaType {
    /// Covers the whole screen.
    Fullscreen,
    /// Confined to one complication slot.
    Slot(usize),
}

pub trait FaceComponent {
    fn get_name(&self) -> &str;
    fn get_type(&self) -> DisplayAreaType;
    fn get_z_index(&self) -> u32;

    /// Called after the surface changed size, before the next frame.
    fn resize(
        &mut self,
        _style: &StyleConfig,
        _geometry: &GeometryState,
        _assets: &dyn AssetStore,
    ) -> Result<(), RenderError> {
        Ok(())
    }

    /// Returns whether anything was drawn.
    fn draw(&mut self, target: &mut FrameBuffer, frame: &FrameContext) -> Result<bool, RenderError>;
}

/// Area of `bounds` left after padding on every side.
pub(crate) fn inset(bounds: &Bounds, padding: u32) -> Bounds {
    let padding = padding as i32;
    let shrink_x = padding.min(bounds.width() as i32 / 2);
    let shrink_y = padding.min(bounds.height() as i32 / 2);
    Bounds {
        left: bounds.left + shrink_x,
        top: bounds.top + shrink_y,
        right: bounds.right - shrink_x,
        bottom: bounds.bottom - shrink_y,
    }
}
