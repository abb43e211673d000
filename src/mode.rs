//! Display mode and the paint state it selects.

use enum_primitive::FromPrimitive;

use crate::{
    display::color::{Argb, ColorMatrix, AMBIENT_COLOR},
    log,
    style::StyleConfig,
};

enum_from_primitive! {
    /// Host do-not-disturb level, numbered like the host's filter codes.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum InterruptionFilter {
        All = 1,
        Priority = 2,
        None = 3,
        Alarms = 4,
    }
}

impl InterruptionFilter {
    pub fn from_code(code: u32) -> Option<InterruptionFilter> {
        InterruptionFilter::from_u32(code)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ModeState {
    pub ambient: bool,
    pub muted: bool,
    pub low_bit_ambient: bool,
    pub burn_in_protection: bool,
}

impl ModeState {
    /// Returns whether the mode changed.
    pub fn set_ambient(&mut self, ambient: bool) -> bool {
        if self.ambient == ambient {
            return false;
        }
        self.ambient = ambient;
        println!("{} ambient {}", log::MODE, ambient);
        true
    }

    /// Muted iff the filter is [`InterruptionFilter::None`]. Returns whether
    /// the mode changed.
    pub fn set_interruption_filter(&mut self, filter: InterruptionFilter) -> bool {
        let muted = filter == InterruptionFilter::None;
        if self.muted == muted {
            return false;
        }
        self.muted = muted;
        println!("{} muted {}", log::MODE, muted);
        true
    }

    pub fn set_properties(&mut self, low_bit_ambient: bool, burn_in_protection: bool) -> bool {
        let changed = self.low_bit_ambient != low_bit_ambient
            || self.burn_in_protection != burn_in_protection;
        self.low_bit_ambient = low_bit_ambient;
        self.burn_in_protection = burn_in_protection;
        changed
    }

    /// Ambient on a screen that can't show the grayscale background.
    pub fn flat_ambient_background(&self) -> bool {
        self.ambient && (self.low_bit_ambient || self.burn_in_protection)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FaceElement {
    HourHand,
    MinuteHand,
    SecondHand,
    Ticks,
    InnerCircle,
    Numerals,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Shadow {
    pub radius: f32,
    pub color: Argb,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PaintAttributes {
    pub color: Argb,
    pub anti_alias: bool,
    pub shadow: Option<Shadow>,
    pub alpha: u8,
    pub stroke_width: f32,
}

pub fn resolve_paint_attributes(
    style: &StyleConfig,
    mode: &ModeState,
    element: FaceElement,
) -> PaintAttributes {
    let colors = &style.colors;
    let dimensions = &style.dimensions;

    let stroke_width = match element {
        FaceElement::HourHand => dimensions.hour_hand_width,
        FaceElement::MinuteHand => dimensions.minute_hand_width,
        FaceElement::SecondHand | FaceElement::Ticks | FaceElement::InnerCircle => {
            dimensions.second_hand_width
        }
        FaceElement::Numerals => 0.0,
    };

    if mode.ambient {
        return PaintAttributes {
            color: AMBIENT_COLOR,
            anti_alias: false,
            shadow: None,
            alpha: 255,
            stroke_width,
        };
    }

    let color = match element {
        FaceElement::HourHand | FaceElement::MinuteHand | FaceElement::InnerCircle => colors.main,
        FaceElement::SecondHand | FaceElement::Numerals => colors.highlight,
        FaceElement::Ticks => colors.tick,
    };

    let alpha = match (mode.muted, element) {
        (true, FaceElement::HourHand | FaceElement::MinuteHand) => 100,
        (true, FaceElement::SecondHand) => 80,
        _ => 255,
    };

    let shadow = match element {
        FaceElement::Numerals => None,
        _ => Some(Shadow {
            radius: dimensions.shadow_radius,
            color: colors.shadow,
        }),
    };

    PaintAttributes {
        color,
        anti_alias: true,
        shadow,
        alpha,
        stroke_width,
    }
}

/// Colours handed to the complication drawables. Toggled as a whole on
/// ambient transitions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplicationAppearance {
    pub background: Option<Argb>,
    pub text: Argb,
    pub title: Argb,
    pub highlight: Argb,
    /// `None` keeps icons in their own colours.
    pub icon_tint: Option<Argb>,
    pub image_filter: ColorMatrix,
}

impl ComplicationAppearance {
    pub fn resolve(style: &StyleConfig, ambient: bool) -> Self {
        if ambient {
            Self {
                background: None,
                text: AMBIENT_COLOR,
                title: AMBIENT_COLOR,
                highlight: AMBIENT_COLOR,
                icon_tint: Some(AMBIENT_COLOR),
                image_filter: ColorMatrix::GRAYSCALE,
            }
        } else {
            Self {
                background: Some(style.colors.complication),
                text: style.colors.main,
                title: style.colors.main,
                highlight: style.colors.highlight,
                icon_tint: None,
                image_filter: ColorMatrix::IDENTITY,
            }
        }
    }
}
