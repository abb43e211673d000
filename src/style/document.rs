//! JSON face definitions.
//!
//! A document has one optional section per builder scope. Sections
//! deserialize straight into the builders, so omitted fields keep the builder
//! defaults and omitted sections are never invoked:
//!
//! ```json
//! {
//!     "name": "classic",
//!     "colors": { "background": "#000000", "highlight": "#b1b2cb" },
//!     "dimensions": { "inner_circle_radius": 10.0 },
//!     "complication1": { "width_ratio": 0.25, "height_ratio": 0.25, "x_pos": 0.75, "y_pos": 0.5 }
//! }
//! ```

use serde::Deserialize;

use super::{
    builder::{
        analog_watch_face_style, WatchFaceBackgroundImageBuilder, WatchFaceColorsBuilder,
        WatchFaceComplicationBuilder, WatchFaceDimensionsBuilder, WatchFaceHandBuilder,
        WatchFaceLayoutBuilder,
    },
    StyleConfig, StyleError,
};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FaceDocument {
    pub name: Option<String>,
    pub colors: Option<WatchFaceColorsBuilder>,
    pub dimensions: Option<WatchFaceDimensionsBuilder>,
    pub background_image: Option<WatchFaceBackgroundImageBuilder>,
    pub hour_hand: Option<WatchFaceHandBuilder>,
    pub minute_hand: Option<WatchFaceHandBuilder>,
    pub complication1: Option<WatchFaceComplicationBuilder>,
    pub complication2: Option<WatchFaceComplicationBuilder>,
    pub complication3: Option<WatchFaceComplicationBuilder>,
    pub layout: Option<WatchFaceLayoutBuilder>,
}

impl FaceDocument {
    pub fn from_json(json: &str) -> Result<Self, StyleError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Replays the document through the builder DSL.
    pub fn into_style(self) -> Result<StyleConfig, StyleError> {
        analog_watch_face_style(|face| {
            if let Some(colors) = self.colors {
                face.colors(|builder| *builder = colors);
            }
            if let Some(dimensions) = self.dimensions {
                face.dimensions(|builder| *builder = dimensions);
            }
            if let Some(background_image) = self.background_image {
                face.background_image(|builder| *builder = background_image);
            }
            if let Some(hour_hand) = self.hour_hand {
                face.hour_hand(|builder| *builder = hour_hand);
            }
            if let Some(minute_hand) = self.minute_hand {
                face.minute_hand(|builder| *builder = minute_hand);
            }
            if let Some(slot) = self.complication1 {
                face.complication1(|builder| *builder = slot);
            }
            if let Some(slot) = self.complication2 {
                face.complication2(|builder| *builder = slot);
            }
            if let Some(slot) = self.complication3 {
                face.complication3(|builder| *builder = slot);
            }
            if let Some(layout) = self.layout {
                face.layout(|builder| *builder = layout);
            }
        })
    }
}

/// Parses and builds a face definition in one go, along with its name.
pub fn style_from_json(json: &str) -> Result<(Option<String>, StyleConfig), StyleError> {
    let mut document = FaceDocument::from_json(json)?;
    let name = document.name.take();
    Ok((name, document.into_style()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        display::color::Argb,
        style::{builder::OFF_SCREEN, AssetRef, ComplicationKind, StatusAlignment},
    };

    fn build(json: &str) -> Result<StyleConfig, StyleError> {
        style_from_json(json).map(|(_, style)| style)
    }

    #[test]
    fn document_name_is_kept() {
        let (name, _) = style_from_json(r#"{ "name": "night", "colors": {}, "dimensions": {} }"#).unwrap();
        assert_eq!(name.as_deref(), Some("night"));
        let (name, _) = style_from_json(r#"{ "colors": {}, "dimensions": {} }"#).unwrap();
        assert_eq!(name, None);
    }

    #[test]
    fn sections_keep_builder_defaults() {
        let style = build(
            r##"{
                "name": "test",
                "colors": { "background": "#000000", "complication": "#3f000000" },
                "dimensions": { "inner_circle_radius": 10.0 },
                "hour_hand": { "drawable": 2, "offset": 0.27 },
                "complication1": {
                    "width_ratio": 0.25, "height_ratio": 0.25, "x_pos": 0.75, "y_pos": 0.5,
                    "supported_types": ["LongText", "ShortText"],
                    "default_provider": "quote"
                },
                "layout": { "top_number": true, "status_alignment": "Center" }
            }"##,
        )
        .unwrap();

        assert_eq!(style.colors.background, Argb::BLACK);
        assert_eq!(style.colors.complication, Argb(0x3f00_0000));
        assert_eq!(style.colors.main, Argb::WHITE);
        assert_eq!(style.dimensions.inner_circle_radius, 10.0);
        assert_eq!(style.dimensions.hour_hand_radius_ratio, 0.5);
        assert_eq!(style.hour_hand.drawable, Some(AssetRef(2)));
        assert_eq!(style.minute_hand.drawable, None);

        let slot = &style.complications[0];
        assert_eq!(slot.x_pos, 0.75);
        assert!(slot.supports(ComplicationKind::LongText));
        assert!(!slot.supports(ComplicationKind::Icon));
        assert_eq!(slot.default_provider.as_ref().unwrap().0, "quote");
        assert_eq!(style.complications[1].x_pos, OFF_SCREEN);

        assert!(style.layout.top_number);
        assert!(!style.layout.left_number);
        assert_eq!(style.layout.status_alignment, StatusAlignment::Center);
    }

    #[test]
    fn missing_colors_section_fails_build() {
        let result = build(r#"{ "dimensions": {} }"#);
        assert!(matches!(result, Err(StyleError::MissingColors)));
    }

    #[test]
    fn empty_sections_count_as_invoked() {
        assert!(build(r#"{ "colors": {}, "dimensions": {} }"#).is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = build(r##"{ "colors": { "mian": "#ffffff" }, "dimensions": {} }"##);
        assert!(matches!(result, Err(StyleError::Document(_))));
    }

    #[test]
    fn bad_color_is_a_document_error() {
        let result = build(r#"{ "colors": { "main": "white" }, "dimensions": {} }"#);
        assert!(matches!(result, Err(StyleError::Document(_))));
    }
}
