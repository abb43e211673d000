//! Scoped builders for [`StyleConfig`].
//!
//! Every nested builder starts out with the documented defaults, so a face
//! only overrides what differs:
//!
//! ```ignore
//! let style = analog_watch_face_style(|face| {
//!     face.colors(|colors| colors.background = Argb::BLACK);
//!     face.dimensions(|dimensions| dimensions.inner_circle_radius = 10.0);
//!     face.complication1(|slot| {
//!         slot.width_ratio = 0.25;
//!         slot.height_ratio = 0.25;
//!         slot.x_pos = 0.75;
//!         slot.y_pos = 0.5;
//!     });
//! })?;
//! ```
//!
//! Colors and dimensions are required, everything else may be omitted.

use std::{cell::Cell, collections::BTreeSet};

use itertools::Itertools;
use serde::Deserialize;

use crate::{display::color::Argb, log};

use super::{
    AssetRef, ComplicationKind, FontRef, ProviderRef, StatusAlignment, StyleConfig, StyleError,
    WatchFaceBackgroundImage, WatchFaceColors, WatchFaceComplication, WatchFaceDimensions,
    WatchFaceHand, WatchFaceLayout,
};

/// Position used for slots that were never configured, far off screen.
pub const OFF_SCREEN: f32 = -100.0;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchFaceComplicationBuilder {
    pub width_ratio: f32,
    pub height_ratio: f32,
    pub x_pos: f32,
    pub y_pos: f32,
    pub supported_types: BTreeSet<ComplicationKind>,
    pub default_provider: Option<ProviderRef>,
    pub title_typeface: Option<FontRef>,
}

impl Default for WatchFaceComplicationBuilder {
    fn default() -> Self {
        Self {
            width_ratio: 0.0,
            height_ratio: 0.0,
            x_pos: OFF_SCREEN,
            y_pos: OFF_SCREEN,
            supported_types: BTreeSet::from([
                ComplicationKind::ShortText,
                ComplicationKind::SmallImage,
                ComplicationKind::Icon,
                ComplicationKind::RangedValue,
            ]),
            default_provider: None,
            title_typeface: None,
        }
    }
}

impl WatchFaceComplicationBuilder {
    pub fn build(&self) -> WatchFaceComplication {
        WatchFaceComplication {
            width_ratio: self.width_ratio,
            height_ratio: self.height_ratio,
            x_pos: self.x_pos,
            y_pos: self.y_pos,
            supported_types: self.supported_types.clone(),
            default_provider: self.default_provider.clone(),
            title_typeface: self.title_typeface.filter(|font| *font != FontRef::EMPTY),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchFaceLayoutBuilder {
    pub top_number: bool,
    pub right_number: bool,
    pub bottom_number: bool,
    pub left_number: bool,
    pub status_alignment: StatusAlignment,
}

impl Default for WatchFaceLayoutBuilder {
    fn default() -> Self {
        Self {
            top_number: false,
            right_number: false,
            bottom_number: false,
            left_number: false,
            status_alignment: StatusAlignment::Top,
        }
    }
}

impl WatchFaceLayoutBuilder {
    pub fn build(&self) -> WatchFaceLayout {
        WatchFaceLayout {
            top_number: self.top_number,
            right_number: self.right_number,
            bottom_number: self.bottom_number,
            left_number: self.left_number,
            status_alignment: self.status_alignment,
        }
    }
}

/// Shared by the hour and minute hand scopes.
#[derive(Clone, Debug, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchFaceHandBuilder {
    pub drawable: Option<AssetRef>,
    pub offset: f32,
}

impl WatchFaceHandBuilder {
    pub fn build(&self) -> WatchFaceHand {
        WatchFaceHand {
            drawable: AssetRef::non_empty(self.drawable),
            offset: self.offset,
        }
    }
}

pub type WatchFaceHourHandBuilder = WatchFaceHandBuilder;
pub type WatchFaceMinuteHandBuilder = WatchFaceHandBuilder;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchFaceColorsBuilder {
    pub main: Argb,
    pub highlight: Argb,
    pub background: Argb,
    pub shadow: Argb,
    pub complication: Argb,
    pub tick: Argb,
}

impl Default for WatchFaceColorsBuilder {
    fn default() -> Self {
        Self {
            main: Argb::WHITE,
            highlight: Argb::RED,
            background: Argb::DARK_GRAY,
            shadow: Argb::BLACK,
            complication: Argb::BLACK,
            tick: Argb::WHITE,
        }
    }
}

impl WatchFaceColorsBuilder {
    pub fn build(&self) -> WatchFaceColors {
        WatchFaceColors {
            main: self.main,
            highlight: self.highlight,
            background: self.background,
            shadow: self.shadow,
            complication: self.complication,
            tick: self.tick,
        }
    }
}

// Non-ratio fields are pixels.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchFaceDimensionsBuilder {
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

impl Default for WatchFaceDimensionsBuilder {
    fn default() -> Self {
        Self {
            hour_hand_radius_ratio: 0.5,
            minute_hand_radius_ratio: 0.75,
            second_hand_radius_ratio: 0.875,
            hour_hand_width: 5.0,
            minute_hand_width: 3.0,
            second_hand_width: 2.0,
            shadow_radius: 2.0,
            inner_circle_radius: 4.0,
            inner_circle_to_arms_distance: 5.0,
        }
    }
}

impl WatchFaceDimensionsBuilder {
    pub fn build(&self) -> WatchFaceDimensions {
        WatchFaceDimensions {
            hour_hand_radius_ratio: self.hour_hand_radius_ratio,
            minute_hand_radius_ratio: self.minute_hand_radius_ratio,
            second_hand_radius_ratio: self.second_hand_radius_ratio,
            hour_hand_width: self.hour_hand_width,
            minute_hand_width: self.minute_hand_width,
            second_hand_width: self.second_hand_width,
            shadow_radius: self.shadow_radius,
            inner_circle_radius: self.inner_circle_radius,
            inner_circle_to_arms_distance: self.inner_circle_to_arms_distance,
        }
    }
}

// A background image isn't required; without one the background color is used.
#[derive(Clone, Debug, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchFaceBackgroundImageBuilder {
    pub image: Option<AssetRef>,
}

impl WatchFaceBackgroundImageBuilder {
    pub fn build(&self) -> WatchFaceBackgroundImage {
        WatchFaceBackgroundImage {
            image: AssetRef::non_empty(self.image),
        }
    }
}

/// Top level scope. Only reachable through [`analog_watch_face_style`].
pub struct AnalogWatchFaceStyleBuilder {
    colors: Option<WatchFaceColors>,
    dimensions: Option<WatchFaceDimensions>,
    background_image: WatchFaceBackgroundImage,
    hour_hand: WatchFaceHand,
    minute_hand: WatchFaceHand,
    complications: [WatchFaceComplication; 3],
    layout: WatchFaceLayout,
}

impl AnalogWatchFaceStyleBuilder {
    fn new() -> Self {
        Self {
            colors: None,
            dimensions: None,
            background_image: WatchFaceBackgroundImageBuilder::default().build(),
            hour_hand: WatchFaceHandBuilder::default().build(),
            minute_hand: WatchFaceHandBuilder::default().build(),
            complications: [
                WatchFaceComplicationBuilder::default().build(),
                WatchFaceComplicationBuilder::default().build(),
                WatchFaceComplicationBuilder::default().build(),
            ],
            layout: WatchFaceLayoutBuilder::default().build(),
        }
    }

    pub fn colors(&mut self, setup: impl FnOnce(&mut WatchFaceColorsBuilder)) {
        let mut builder = WatchFaceColorsBuilder::default();
        setup(&mut builder);
        self.colors = Some(builder.build());
    }

    pub fn dimensions(&mut self, setup: impl FnOnce(&mut WatchFaceDimensionsBuilder)) {
        let mut builder = WatchFaceDimensionsBuilder::default();
        setup(&mut builder);
        self.dimensions = Some(builder.build());
    }

    pub fn background_image(&mut self, setup: impl FnOnce(&mut WatchFaceBackgroundImageBuilder)) {
        let mut builder = WatchFaceBackgroundImageBuilder::default();
        setup(&mut builder);
        self.background_image = builder.build();
    }

    pub fn hour_hand(&mut self, setup: impl FnOnce(&mut WatchFaceHourHandBuilder)) {
        let mut builder = WatchFaceHourHandBuilder::default();
        setup(&mut builder);
        self.hour_hand = builder.build();
    }

    pub fn minute_hand(&mut self, setup: impl FnOnce(&mut WatchFaceMinuteHandBuilder)) {
        let mut builder = WatchFaceMinuteHandBuilder::default();
        setup(&mut builder);
        self.minute_hand = builder.build();
    }

    pub fn complication1(&mut self, setup: impl FnOnce(&mut WatchFaceComplicationBuilder)) {
        self.complication(0, setup);
    }

    pub fn complication2(&mut self, setup: impl FnOnce(&mut WatchFaceComplicationBuilder)) {
        self.complication(1, setup);
    }

    pub fn complication3(&mut self, setup: impl FnOnce(&mut WatchFaceComplicationBuilder)) {
        self.complication(2, setup);
    }

    fn complication(&mut self, index: usize, setup: impl FnOnce(&mut WatchFaceComplicationBuilder)) {
        let mut builder = WatchFaceComplicationBuilder::default();
        setup(&mut builder);
        self.complications[index] = builder.build();
    }

    pub fn layout(&mut self, setup: impl FnOnce(&mut WatchFaceLayoutBuilder)) {
        let mut builder = WatchFaceLayoutBuilder::default();
        setup(&mut builder);
        self.layout = builder.build();
    }

    fn build(self) -> Result<StyleConfig, StyleError> {
        let colors = self.colors.ok_or(StyleError::MissingColors)?;
        let dimensions = self.dimensions.ok_or(StyleError::MissingDimensions)?;

        if dimensions.inner_circle_radius <= 0.0 {
            return Err(StyleError::InvalidInnerCircle(dimensions.inner_circle_radius));
        }

        Ok(StyleConfig {
            colors,
            dimensions,
            background_image: self.background_image,
            hour_hand: self.hour_hand,
            minute_hand: self.minute_hand,
            complications: self.complications,
            layout: self.layout,
        })
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Construction {
    Idle,
    Running,
    NestingAttempted,
}

thread_local! {
    static CONSTRUCTION: Cell<Construction> = const { Cell::new(Construction::Idle) };
}

/// Marks a top level construction as running on this thread.
struct ConstructionGuard;

impl ConstructionGuard {
    fn enter() -> Result<Self, StyleError> {
        CONSTRUCTION.with(|state| match state.get() {
            Construction::Idle => {
                state.set(Construction::Running);
                Ok(ConstructionGuard)
            }
            _ => {
                state.set(Construction::NestingAttempted);
                Err(StyleError::Nested)
            }
        })
    }

    fn nesting_attempted(&self) -> bool {
        CONSTRUCTION.with(|state| state.get() == Construction::NestingAttempted)
    }
}

impl Drop for ConstructionGuard {
    fn drop(&mut self) {
        CONSTRUCTION.with(|state| state.set(Construction::Idle));
    }
}

/// Builds a [`StyleConfig`].
///
/// Fails if `colors` or `dimensions` was never invoked, or if this function
/// is called again from inside `setup`; in that case both the inner and the
/// outer construction fail.
pub fn analog_watch_face_style(
    setup: impl FnOnce(&mut AnalogWatchFaceStyleBuilder),
) -> Result<StyleConfig, StyleError> {
    let guard = ConstructionGuard::enter()?;

    let mut builder = AnalogWatchFaceStyleBuilder::new();
    setup(&mut builder);

    if guard.nesting_attempted() {
        return Err(StyleError::Nested);
    }

    let style = builder.build()?;
    println!(
        "{} Built style, complication types [{}]",
        log::STYLE,
        style
            .complications
            .iter()
            .map(|slot| slot.supported_types.iter().map(|kind| format!("{:?}", kind)).join("|"))
            .join(", ")
    );
    Ok(style)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> Result<StyleConfig, StyleError> {
        analog_watch_face_style(|face| {
            face.colors(|_| {});
            face.dimensions(|_| {});
        })
    }

    #[test]
    fn unconfigured_complication_is_off_screen() {
        let slot = WatchFaceComplicationBuilder::default().build();
        assert_eq!(slot.width_ratio, 0.0);
        assert_eq!(slot.height_ratio, 0.0);
        assert_eq!(slot.x_pos, -100.0);
        assert_eq!(slot.y_pos, -100.0);
        assert_eq!(
            slot.supported_types,
            BTreeSet::from([
                ComplicationKind::ShortText,
                ComplicationKind::SmallImage,
                ComplicationKind::Icon,
                ComplicationKind::RangedValue,
            ])
        );
        assert_eq!(slot.default_provider, None);
        assert_eq!(slot.title_typeface, None);
    }

    #[test]
    fn colors_are_required() {
        let result = analog_watch_face_style(|face| face.dimensions(|_| {}));
        assert!(matches!(result, Err(StyleError::MissingColors)));
    }

    #[test]
    fn dimensions_are_required() {
        let result = analog_watch_face_style(|face| face.colors(|_| {}));
        assert!(matches!(result, Err(StyleError::MissingDimensions)));
    }

    #[test]
    fn minimal_style_uses_defaults() {
        let style = minimal().unwrap();

        assert_eq!(style.colors, WatchFaceColorsBuilder::default().build());
        assert_eq!(style.dimensions, WatchFaceDimensionsBuilder::default().build());
        assert_eq!(style.background_image.image, None);
        assert_eq!(style.background_image.image, None);
        assert_eq!(style.hour_hand.drawable, None);
        assert_eq!(style.hour_hand.offset, 0.0);
        assert_eq!(style.minute_hand, style.hour_hand);
        for slot in &style.complications {
            assert_eq!(*slot, WatchFaceComplicationBuilder::default().build());
        }
        assert_eq!(style.layout, WatchFaceLayoutBuilder::default().build());
        assert_eq!(style.layout.status_alignment, StatusAlignment::Top);
    }

    #[test]
    fn dimension_defaults() {
        let dimensions = WatchFaceDimensionsBuilder::default().build();
        assert_eq!(dimensions.hour_hand_radius_ratio, 0.5);
        assert_eq!(dimensions.minute_hand_radius_ratio, 0.75);
        assert_eq!(dimensions.second_hand_radius_ratio, 0.875);
        assert_eq!(dimensions.hour_hand_width, 5.0);
        assert_eq!(dimensions.minute_hand_width, 3.0);
        assert_eq!(dimensions.second_hand_width, 2.0);
        assert_eq!(dimensions.shadow_radius, 2.0);
        assert_eq!(dimensions.inner_circle_radius, 4.0);
        assert_eq!(dimensions.inner_circle_to_arms_distance, 5.0);
    }

    #[test]
    fn overrides_only_touch_named_fields() {
        let style = analog_watch_face_style(|face| {
            face.colors(|colors| colors.background = Argb::BLACK);
            face.dimensions(|dimensions| dimensions.hour_hand_radius_ratio = 0.2);
            face.complication2(|slot| {
                slot.width_ratio = 0.8;
                slot.x_pos = 0.5;
            });
        })
        .unwrap();

        assert_eq!(style.colors.background, Argb::BLACK);
        assert_eq!(style.colors.main, Argb::WHITE);
        assert_eq!(style.dimensions.hour_hand_radius_ratio, 0.2);
        assert_eq!(style.dimensions.minute_hand_radius_ratio, 0.75);
        assert_eq!(style.complications[1].width_ratio, 0.8);
        assert_eq!(style.complications[1].y_pos, OFF_SCREEN);
        assert_eq!(style.complications[0].x_pos, OFF_SCREEN);
    }

    #[test]
    fn empty_asset_sentinel_means_no_asset() {
        let style = analog_watch_face_style(|face| {
            face.colors(|_| {});
            face.dimensions(|_| {});
            face.background_image(|image| image.image = Some(AssetRef::EMPTY));
            face.hour_hand(|hand| {
                hand.drawable = Some(AssetRef(0));
                hand.offset = 0.27;
            });
            face.minute_hand(|hand| hand.drawable = Some(AssetRef(4)));
        })
        .unwrap();

        assert_eq!(style.background_image.image, None);
        assert_eq!(style.hour_hand.drawable, None);
        assert_eq!(style.hour_hand.offset, 0.27);
        assert_eq!(style.minute_hand.drawable, Some(AssetRef(4)));
    }

    #[test]
    fn zero_inner_circle_is_rejected() {
        let result = analog_watch_face_style(|face| {
            face.colors(|_| {});
            face.dimensions(|dimensions| dimensions.inner_circle_radius = 0.0);
        });
        assert!(matches!(result, Err(StyleError::InvalidInnerCircle(_))));
    }

    #[test]
    fn nesting_fails_both_levels() {
        let mut inner_result = None;
        let outer = analog_watch_face_style(|face| {
            face.colors(|_| {});
            face.dimensions(|_| {});
            inner_result = Some(minimal());
        });

        assert!(matches!(inner_result, Some(Err(StyleError::Nested))));
        assert!(matches!(outer, Err(StyleError::Nested)));

        // The guard is released afterwards.
        assert!(minimal().is_ok());
    }
}
