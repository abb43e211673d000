//! Built-in faces.

use std::collections::BTreeSet;

use crate::{
    complication::{DaysToEndProvider, QuoteProvider},
    display::color::Argb,
};

use super::{
    builder::analog_watch_face_style, AssetRef, ComplicationKind, FontRef, ProviderRef,
    StatusAlignment, StyleConfig, StyleError,
};

pub const CLASSIC_BACKGROUND: AssetRef = AssetRef(1);
pub const GOTHIC_HOUR_HAND: AssetRef = AssetRef(2);
pub const GOTHIC_MINUTE_HAND: AssetRef = AssetRef(3);

pub const TITLE_FONT: FontRef = FontRef(1);
pub const NUMERAL_FONT: FontRef = FontRef(2);

fn text_types() -> BTreeSet<ComplicationKind> {
    BTreeSet::from([
        ComplicationKind::RangedValue,
        ComplicationKind::Icon,
        ComplicationKind::SmallImage,
        ComplicationKind::ShortText,
        ComplicationKind::LongText,
    ])
}

pub const FRANK_CLASSIC: &str = "frank_classic";

/// Looks up a built-in face by its component name.
pub fn face_by_name(name: &str) -> Option<Result<StyleConfig, StyleError>> {
    match name {
        FRANK_CLASSIC => Some(frank_classic()),
        _ => None,
    }
}

/// Black classic face with gothic bitmap hands, a countdown on the right and
/// a quote along the bottom.
pub fn frank_classic() -> Result<StyleConfig, StyleError> {
    analog_watch_face_style(|face| {
        face.colors(|colors| {
            colors.main = Argb::WHITE;
            colors.highlight = Argb(0xffb1_b2cb);
            colors.background = Argb::BLACK;
            colors.complication = Argb(0x3f00_0000);
            colors.shadow = Argb::BLACK;
            colors.tick = Argb::WHITE;
        });
        face.dimensions(|dimensions| {
            dimensions.hour_hand_radius_ratio = 0.2;
            dimensions.minute_hand_radius_ratio = 0.25;
            dimensions.second_hand_radius_ratio = 0.9;
            dimensions.inner_circle_radius = 10.0;
            dimensions.shadow_radius = 10.0;
        });
        face.background_image(|image| image.image = Some(CLASSIC_BACKGROUND));
        face.hour_hand(|hand| {
            hand.drawable = Some(GOTHIC_HOUR_HAND);
            hand.offset = 0.27;
        });
        face.minute_hand(|hand| {
            hand.drawable = Some(GOTHIC_MINUTE_HAND);
            hand.offset = 0.27;
        });
        face.complication1(|slot| {
            slot.width_ratio = 0.25;
            slot.height_ratio = 0.25;
            slot.x_pos = 0.75;
            slot.y_pos = 0.5;
            slot.supported_types = text_types();
            slot.default_provider = Some(ProviderRef::new(DaysToEndProvider::NAME));
            slot.title_typeface = Some(TITLE_FONT);
        });
        face.complication2(|slot| {
            slot.width_ratio = 0.8;
            slot.height_ratio = 0.25;
            slot.x_pos = 0.5;
            slot.y_pos = 0.75;
            slot.supported_types = text_types();
            slot.default_provider = Some(ProviderRef::new(QuoteProvider::NAME));
            slot.title_typeface = Some(TITLE_FONT);
        });
        face.layout(|layout| {
            layout.top_number = true;
            layout.bottom_number = true;
            layout.left_number = true;
            layout.status_alignment = StatusAlignment::Center;
        });
    })
}
