//! Resolved watch face style.
//!
//! A [`StyleConfig`] is produced once per engine by the builder DSL in
//! [`builder`] and never mutated afterwards. Ratios are relative to the
//! screen (positions, complication sizes) or to the screen radius (hand
//! lengths); everything else is in pixels.

use std::collections::BTreeSet;

use enum_primitive::FromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::display::color::Argb;

pub mod builder;
pub mod document;
pub mod faces;

#[derive(Error, Debug)]
pub enum StyleError {
    #[error("Must define colors in the watch face style")]
    MissingColors,
    #[error("Must define dimensions in the watch face style")]
    MissingDimensions,
    #[error("Watch face styles can't be nested")]
    Nested,
    #[error("Inner circle radius must be greater than zero, got {0}")]
    InvalidInnerCircle(f32),
    #[error("Invalid face definition: {0}")]
    Document(#[from] serde_json::Error),
}

/// Identifier of an image in the asset store. `0` means "no asset".
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(pub u32);

impl AssetRef {
    pub const EMPTY: AssetRef = AssetRef(0);

    pub const fn is_empty(self) -> bool {
        self.0 == Self::EMPTY.0
    }

    /// Maps the empty sentinel to `None`.
    pub fn non_empty(value: Option<AssetRef>) -> Option<AssetRef> {
        value.filter(|asset| !asset.is_empty())
    }
}

/// Identifier of a font in the asset store. `0` means "default font".
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontRef(pub u32);

impl FontRef {
    pub const EMPTY: FontRef = FontRef(0);
}

/// Name of an external complication data provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderRef(pub String);

impl ProviderRef {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl std::fmt::Display for ProviderRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

enum_from_primitive! {
    /// Complication data types, numbered like the host's type codes.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    pub enum ComplicationKind {
        NotConfigured = 1,
        Empty = 2,
        ShortText = 3,
        LongText = 4,
        RangedValue = 5,
        Icon = 6,
        SmallImage = 7,
        LargeImage = 8,
        NoPermission = 9,
        NoData = 10,
    }
}

impl ComplicationKind {
    pub fn from_code(code: u32) -> Option<ComplicationKind> {
        ComplicationKind::from_u32(code)
    }

    /// Kinds that carry something to draw.
    pub fn has_content(self) -> bool {
        !matches!(
            self,
            ComplicationKind::NotConfigured
                | ComplicationKind::Empty
                | ComplicationKind::NoPermission
                | ComplicationKind::NoData
        )
    }
}

/// Where the host places its status icons.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StatusAlignment {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Colors of the face:
/// - main: hour hand, minute hand and inner circle
/// - highlight: second hand, numerals and complication highlights
/// - background: fill when there is no background image
/// - shadow: shadow beneath hands and ticks
/// - complication: complication background
/// - tick: tick marks
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WatchFaceColors {
    pub main: Argb,
    pub highlight: Argb,
    pub background: Argb,
    pub shadow: Argb,
    pub complication: Argb,
    pub tick: Argb,
}

/// Dimensions of the face. Radius ratios are relative to the screen radius,
/// everything else is in pixels.
///
/// `inner_circle_radius` is never zero so the pivot never burns in.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WatchFaceDimensions {
    pub hour_hand_radius_ratio: f32,
    pub minute_hand_radius_ratio: f32,
    pub second_hand_radius_ratio: f32,
    pub hour_hand_width: f32,
    pub minute_hand_width: f32,
    pub second_hand_width: f32,
    pub shadow_radius: f32,
    pub inner_circle_radius: f32,
    pub inner_circle_to_arms_distance: f32,
}

/// Background image, scaled to the screen width with its aspect ratio kept.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchFaceBackgroundImage {
    pub image: Option<AssetRef>,
}

/// Bitmap hand. Without a drawable the hand is drawn as a line.
///
/// `offset` is the share of the bitmap's height that sits behind the pivot.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WatchFaceHand {
    pub drawable: Option<AssetRef>,
    pub offset: f32,
}

/// One complication slot. All four ratios are relative to the screen size;
/// `x_pos` and `y_pos` locate the center of the slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WatchFaceComplication {
    pub width_ratio: f32,
    pub height_ratio: f32,
    pub x_pos: f32,
    pub y_pos: f32,
    pub supported_types: BTreeSet<ComplicationKind>,
    pub default_provider: Option<ProviderRef>,
    pub title_typeface: Option<FontRef>,
}

impl WatchFaceComplication {
    pub fn supports(&self, kind: ComplicationKind) -> bool {
        self.supported_types.contains(&kind)
    }
}

/// Numerals drawn at the four cardinal points, and status bar placement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchFaceLayout {
    pub top_number: bool,
    pub right_number: bool,
    pub bottom_number: bool,
    pub left_number: bool,
    pub status_alignment: StatusAlignment,
}

/// Number of complication slots on a face.
pub const COMPLICATION_COUNT: usize = 3;

/// Everything needed to style an analog watch face.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    pub colors: WatchFaceColors,
    pub dimensions: WatchFaceDimensions,
    pub background_image: WatchFaceBackgroundImage,
    pub hour_hand: WatchFaceHand,
    pub minute_hand: WatchFaceHand,
    pub complications: [WatchFaceComplication; COMPLICATION_COUNT],
    pub layout: WatchFaceLayout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_code() {
        assert_eq!(ComplicationKind::from_code(3), Some(ComplicationKind::ShortText));
        assert_eq!(ComplicationKind::from_code(10), Some(ComplicationKind::NoData));
        assert_eq!(ComplicationKind::from_code(0), None);
        assert_eq!(ComplicationKind::from_code(11), None);
    }

    #[test]
    fn placeholder_kinds_have_no_content() {
        assert!(!ComplicationKind::Empty.has_content());
        assert!(!ComplicationKind::NoData.has_content());
        assert!(ComplicationKind::LongText.has_content());
        assert!(ComplicationKind::Icon.has_content());
    }

    #[test]
    fn empty_asset_ref() {
        assert!(AssetRef::EMPTY.is_empty());
        assert_eq!(AssetRef::non_empty(Some(AssetRef(0))), None);
        assert_eq!(AssetRef::non_empty(Some(AssetRef(7))), Some(AssetRef(7)));
        assert_eq!(AssetRef::non_empty(None), None);
    }
}
