use embedded_graphics::{draw_target::DrawTarget, prelude::Point};
use image::{imageops::FilterType, DynamicImage, RgbaImage};

use crate::{
    assets::AssetStore,
    display::{
        color::AMBIENT_BACKGROUND,
        surface::{FaceSurface, FrameBuffer},
        RenderError,
    },
    geometry::GeometryState,
    log,
    style::StyleConfig,
};

use super::{DisplayAreaType, FaceComponent, FrameContext};

/// Background colour or image, with a grayscale copy for ambient mode.
pub struct Background {
    scaled: Option<RgbaImage>,
    gray: Option<RgbaImage>,
}

impl Background {
    pub fn new() -> Self {
        Self {
            scaled: None,
            gray: None,
        }
    }
}

impl FaceComponent for Background {
    fn get_name(&self) -> &str {
        "background"
    }

    fn get_type(&self) -> DisplayAreaType {
        DisplayAreaType::Fullscreen
    }

    fn get_z_index(&self) -> u32 {
        0
    }

    fn resize(
        &mut self,
        style: &StyleConfig,
        geometry: &GeometryState,
        assets: &dyn AssetStore,
    ) -> Result<(), RenderError> {
        self.scaled = None;
        self.gray = None;

        let (Some(asset), Some(size)) = (style.background_image.image, geometry.background_size)
        else {
            return Ok(());
        };

        let source = assets.image(asset)?;
        let scaled = image::imageops::resize(source, size.width, size.height, FilterType::Triangle);
        self.gray = Some(DynamicImage::ImageRgba8(scaled.clone()).grayscale().to_rgba8());
        self.scaled = Some(scaled);

        println!(
            "{} Scaled background to {}x{}",
            log::SCREEN,
            size.width,
            size.height
        );
        Ok(())
    }

    fn draw(&mut self, target: &mut FrameBuffer, frame: &FrameContext) -> Result<bool, RenderError> {
        let mode = frame.mode;

        if mode.flat_ambient_background() {
            target.clear(AMBIENT_BACKGROUND)?;
            return Ok(true);
        }

        if mode.ambient {
            if let Some(gray) = &self.gray {
                target.clear(AMBIENT_BACKGROUND)?;
                target.blit(gray, Point::zero(), None);
                return Ok(true);
            }
        }

        target.clear(frame.style.colors.background.to_rgb888())?;
        if let Some(scaled) = &self.scaled {
            target.blit(scaled, Point::zero(), None);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics::{
        pixelcolor::{Rgb888, RgbColor},
        prelude::Size,
    };
    use image::Rgba;

    use super::*;
    use crate::{
        assets::MemoryAssetStore,
        complication::ComplicationSlots,
        display::color::Argb,
        geometry::{AssetSizes, Viewport},
        mode::{ComplicationAppearance, ModeState},
        style::{builder::analog_watch_face_style, AssetRef},
    };

    fn style(image: Option<AssetRef>) -> StyleConfig {
        analog_watch_face_style(|face| {
            face.colors(|colors| colors.background = Argb(0xff10_2030));
            face.dimensions(|_| {});
            face.background_image(|background| background.image = image);
        })
        .unwrap()
    }

    fn draw(
        background: &mut Background,
        style: &StyleConfig,
        assets: &MemoryAssetStore,
        mode: ModeState,
    ) -> FrameBuffer {
        let geometry = GeometryState::resolve(
            style,
            Viewport::new(20, 20),
            AssetSizes {
                background: style
                    .background_image
                    .image
                    .and_then(|asset| assets.image_size(asset)),
                ..Default::default()
            },
        )
        .unwrap();
        background.resize(style, &geometry, assets).unwrap();
        let appearance = ComplicationAppearance::resolve(style, mode.ambient);
        let complications = ComplicationSlots::default();
        let frame = FrameContext {
            style,
            geometry: &geometry,
            mode: &mode,
            appearance: &appearance,
            assets,
            complications: &complications,
            now: chrono::Local::now(),
            hide_complications_in_ambient: true,
        };
        let mut target = FrameBuffer::new(Size::new(20, 20));
        assert!(background.draw(&mut target, &frame).unwrap());
        target
    }

    fn red_store() -> MemoryAssetStore {
        let mut assets = MemoryAssetStore::new();
        assets.insert_image(AssetRef(5), RgbaImage::from_pixel(10, 10, Rgba([200, 0, 0, 255])));
        assets
    }

    #[test]
    fn solid_color_without_image() {
        let style = style(None);
        let assets = MemoryAssetStore::new();
        let frame = draw(&mut Background::new(), &style, &assets, ModeState::default());
        assert_eq!(frame.pixel(Point::new(3, 3)), Some(Rgb888::new(0x10, 0x20, 0x30)));
    }

    #[test]
    fn image_is_scaled_to_width() {
        let style = style(Some(AssetRef(5)));
        let frame = draw(&mut Background::new(), &style, &red_store(), ModeState::default());
        assert_eq!(frame.pixel(Point::new(19, 19)), Some(Rgb888::new(200, 0, 0)));
    }

    #[test]
    fn ambient_image_is_gray() {
        let style = style(Some(AssetRef(5)));
        let mode = ModeState {
            ambient: true,
            ..Default::default()
        };
        let frame = draw(&mut Background::new(), &style, &red_store(), mode);
        let pixel = frame.pixel(Point::new(5, 5)).unwrap();
        assert_eq!(pixel.r(), pixel.g());
        assert_eq!(pixel.g(), pixel.b());
        assert!(pixel.r() > 0);
    }

    #[test]
    fn ambient_without_image_keeps_background_color() {
        let style = style(None);
        let mode = ModeState {
            ambient: true,
            ..Default::default()
        };
        let frame = draw(&mut Background::new(), &style, &MemoryAssetStore::new(), mode);
        assert_eq!(frame.pixel(Point::new(0, 0)), Some(Rgb888::new(0x10, 0x20, 0x30)));
    }

    #[test]
    fn burn_in_ambient_without_image_is_black() {
        let style = style(None);
        let mode = ModeState {
            ambient: true,
            burn_in_protection: true,
            ..Default::default()
        };
        let frame = draw(&mut Background::new(), &style, &MemoryAssetStore::new(), mode);
        assert_eq!(frame.pixel(Point::new(0, 0)), Some(Rgb888::BLACK));
    }

    #[test]
    fn low_bit_ambient_is_black() {
        let style = style(Some(AssetRef(5)));
        let mode = ModeState {
            ambient: true,
            low_bit_ambient: true,
            ..Default::default()
        };
        let frame = draw(&mut Background::new(), &style, &red_store(), mode);
        assert_eq!(frame.pixel(Point::new(5, 5)), Some(Rgb888::BLACK));
    }

    #[test]
    fn missing_image_fails_resize() {
        let style = style(Some(AssetRef(5)));
        let geometry = GeometryState::resolve(
            &style,
            Viewport::new(20, 20),
            AssetSizes {
                background: Some(Size::new(10, 10)),
                ..Default::default()
            },
        )
        .unwrap();
        let result = Background::new().resize(&style, &geometry, &MemoryAssetStore::new());
        assert!(matches!(result, Err(RenderError::Asset(_))));
    }
}
