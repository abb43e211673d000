use chrono::Timelike;
use embedded_graphics::{
    mono_font::MonoTextStyle,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};

use crate::{
    display::{
        color::mul_u8,
        surface::{blit_rotated, FrameBuffer, RotatedBlit, Translucent},
        RenderError, NUMERAL_MARGIN, TICK_LENGTH,
    },
    geometry::{GeometryState, HandBitmapGeometry},
    mode::{resolve_paint_attributes, FaceElement, PaintAttributes},
    style::{faces::NUMERAL_FONT, AssetRef},
};

use super::{DisplayAreaType, FaceComponent, FrameContext};

/// Opacity of shadows relative to the element casting them.
const SHADOW_ALPHA: u8 = 90;

/// Ticks, numerals, hands and the pivot.
pub struct ClockFace;

impl ClockFace {
    pub fn new() -> Self {
        ClockFace
    }
}

/// Hand angles in degrees, clockwise from twelve.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HandAngles {
    pub hour: f32,
    pub minute: f32,
    pub second: f32,
}

impl HandAngles {
    pub fn at<T: Timelike>(time: &T) -> Self {
        let minute = time.minute() as f32;
        // Leap seconds report more than a second of nanos.
        let millis = (time.nanosecond() / 1_000_000).min(999) as f32;
        Self {
            hour: (time.hour() % 12) as f32 * 30.0 + minute / 2.0,
            minute: minute * 6.0,
            second: (time.second() as f32 + millis / 1000.0) * 6.0,
        }
    }
}

fn polar(geometry: &GeometryState, degrees: f32, radius: f32) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Point::new(
        (geometry.center_x + radius * sin).round() as i32,
        (geometry.center_y - radius * cos).round() as i32,
    )
}

fn stroke(width: f32) -> u32 {
    width.round().max(1.0) as u32
}

/// Line from `from` to `to` pixels out from the center, shadow first.
fn draw_radial(
    target: &mut FrameBuffer,
    geometry: &GeometryState,
    paint: &PaintAttributes,
    degrees: f32,
    from: f32,
    to: f32,
) -> Result<(), RenderError> {
    let line = Line::new(polar(geometry, degrees, from), polar(geometry, degrees, to));

    if let Some(shadow) = paint.shadow.filter(|shadow| shadow.radius > 0.0) {
        let (color, mut translucent) =
            Translucent::with_paint(target, shadow.color, mul_u8(paint.alpha, SHADOW_ALPHA));
        line.into_styled(PrimitiveStyle::with_stroke(
            color,
            stroke(paint.stroke_width + shadow.radius),
        ))
        .draw(&mut translucent)?;
    }

    let (color, mut translucent) = Translucent::with_paint(target, paint.color, paint.alpha);
    line.into_styled(PrimitiveStyle::with_stroke(color, stroke(paint.stroke_width)))
        .draw(&mut translucent)?;
    Ok(())
}

impl FaceComponent for ClockFace {
    fn get_name(&self) -> &str {
        "clock face"
    }

    fn get_type(&self) -> DisplayAreaType {
        DisplayAreaType::Fullscreen
    }

    fn get_z_index(&self) -> u32 {
        20
    }

    fn draw(&mut self, target: &mut FrameBuffer, frame: &FrameContext) -> Result<bool, RenderError> {
        let paint = |element| resolve_paint_attributes(frame.style, frame.mode, element);

        self.draw_ticks(target, frame, &paint(FaceElement::Ticks))?;
        self.draw_numerals(target, frame, &paint(FaceElement::Numerals))?;

        let angles = HandAngles::at(&frame.now);
        let dimensions = &frame.style.dimensions;
        let lengths = &frame.geometry.hand_lengths;
        let arm_start = dimensions.inner_circle_radius + dimensions.inner_circle_to_arms_distance;

        self.draw_hand(
            target,
            frame,
            &paint(FaceElement::HourHand),
            angles.hour,
            arm_start,
            lengths.hour,
            frame.style.hour_hand.drawable.zip(frame.geometry.hour_hand_bitmap),
        )?;
        self.draw_hand(
            target,
            frame,
            &paint(FaceElement::MinuteHand),
            angles.minute,
            arm_start,
            lengths.minute,
            frame.style.minute_hand.drawable.zip(frame.geometry.minute_hand_bitmap),
        )?;
        if !frame.mode.ambient {
            draw_radial(
                target,
                frame.geometry,
                &paint(FaceElement::SecondHand),
                angles.second,
                arm_start,
                lengths.second,
            )?;
        }

        // Pivot goes on top of the hands.
        let pivot = paint(FaceElement::InnerCircle);
        let diameter = dimensions.inner_circle_radius * 2.0;
        if let Some(shadow) = pivot.shadow.filter(|shadow| shadow.radius > 0.0) {
            let (color, mut translucent) =
                Translucent::with_paint(target, shadow.color, mul_u8(pivot.alpha, SHADOW_ALPHA));
            Circle::with_center(frame.geometry.center, (diameter + shadow.radius).round() as u32)
                .into_styled(PrimitiveStyle::with_fill(color))
                .draw(&mut translucent)?;
        }
        let (color, mut translucent) = Translucent::with_paint(target, pivot.color, pivot.alpha);
        Circle::with_center(frame.geometry.center, diameter.round() as u32)
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(&mut translucent)?;

        Ok(true)
    }
}

impl ClockFace {
    fn draw_ticks(
        &self,
        target: &mut FrameBuffer,
        frame: &FrameContext,
        paint: &PaintAttributes,
    ) -> Result<(), RenderError> {
        let outer = frame.geometry.center_x;
        let inner = outer - TICK_LENGTH;
        for tick in 0..12 {
            draw_radial(target, frame.geometry, paint, tick as f32 * 30.0, inner, outer)?;
        }
        Ok(())
    }

    fn draw_numerals(
        &self,
        target: &mut FrameBuffer,
        frame: &FrameContext,
        paint: &PaintAttributes,
    ) -> Result<(), RenderError> {
        let layout = &frame.style.layout;
        let viewport = frame.geometry.viewport;
        let center = frame.geometry.center;
        let right = viewport.width as i32 - NUMERAL_MARGIN;
        let bottom = viewport.height as i32 - NUMERAL_MARGIN;

        let numerals = [
            (layout.top_number, "12", Point::new(center.x, NUMERAL_MARGIN), Alignment::Center, Baseline::Top),
            (layout.right_number, "3", Point::new(right, center.y), Alignment::Right, Baseline::Middle),
            (layout.bottom_number, "6", Point::new(center.x, bottom), Alignment::Center, Baseline::Bottom),
            (layout.left_number, "9", Point::new(NUMERAL_MARGIN, center.y), Alignment::Left, Baseline::Middle),
        ];
        if numerals.iter().all(|(shown, ..)| !shown) {
            return Ok(());
        }

        let font = frame.assets.font(Some(NUMERAL_FONT));
        let (color, mut translucent) = Translucent::with_paint(target, paint.color, paint.alpha);
        let style = MonoTextStyle::new(font, color);
        for (_, text, position, alignment, baseline) in numerals.into_iter().filter(|(shown, ..)| *shown) {
            let text_style = TextStyleBuilder::new()
                .alignment(alignment)
                .baseline(baseline)
                .build();
            Text::with_text_style(text, position, style, text_style).draw(&mut translucent)?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_hand(
        &self,
        target: &mut FrameBuffer,
        frame: &FrameContext,
        paint: &PaintAttributes,
        degrees: f32,
        from: f32,
        length: f32,
        bitmap: Option<(AssetRef, HandBitmapGeometry)>,
    ) -> Result<(), RenderError> {
        let Some((asset, geometry)) = bitmap else {
            return draw_radial(target, frame.geometry, paint, degrees, from, length);
        };

        let image = frame.assets.image(asset)?;
        let blit = RotatedBlit {
            pivot: (frame.geometry.center_x, frame.geometry.center_y),
            width: geometry.width,
            height: geometry.height,
            below_pivot: geometry.center_offset,
            degrees,
            tint: paint.color,
            alpha: paint.alpha,
            smooth: paint.anti_alias,
        };
        if let Some(shadow) = paint.shadow.filter(|shadow| shadow.radius > 0.0) {
            let drop = shadow.radius / 2.0;
            let shadow_blit = RotatedBlit {
                pivot: (blit.pivot.0 + drop, blit.pivot.1 + drop),
                tint: shadow.color,
                alpha: mul_u8(paint.alpha, SHADOW_ALPHA),
                ..blit
            };
            blit_rotated(target, image, &shadow_blit);
        }
        blit_rotated(target, image, &blit);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};
    use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::{
        display::{color::Argb, components::fixture::Fixture, surface::FaceSurface},
        geometry::{AssetSizes, Viewport},
        style::{builder::analog_watch_face_style, StyleConfig},
    };

    const MAIN: Rgb888 = Rgb888::new(0, 200, 0);

    fn style(hour_bitmap: Option<AssetRef>, top_number: bool) -> StyleConfig {
        analog_watch_face_style(|face| {
            face.colors(|colors| {
                colors.main = Argb::from(MAIN);
                colors.highlight = Argb::RED;
                colors.tick = Argb(0xff00_00ff);
            });
            face.dimensions(|dimensions| dimensions.shadow_radius = 0.0);
            face.hour_hand(|hand| hand.drawable = hour_bitmap);
            face.layout(|layout| layout.top_number = top_number);
        })
        .unwrap()
    }

    fn fixture(style: StyleConfig) -> Fixture {
        let mut fixture = Fixture::new(style, Viewport::new(200, 200));
        // Hour right, minute up, second down.
        fixture.now = Local.with_ymd_and_hms(2021, 3, 14, 3, 0, 30).unwrap();
        fixture
    }

    fn draw(fixture: &Fixture) -> FrameBuffer {
        let mut target = FrameBuffer::new(Size::new(200, 200));
        assert!(ClockFace::new().draw(&mut target, &fixture.frame()).unwrap());
        target
    }

    #[test]
    fn hand_angles() {
        let time = chrono::NaiveTime::from_hms_milli_opt(15, 30, 15, 500).unwrap();
        let angles = HandAngles::at(&time);
        assert_eq!(angles.hour, 105.0);
        assert_eq!(angles.minute, 180.0);
        assert_eq!(angles.second, 93.0);
    }

    #[test]
    fn hands_ticks_and_pivot() {
        let target = draw(&fixture(style(None, false)));
        assert_eq!(target.pixel(Point::new(130, 100)), Some(MAIN));
        assert_eq!(target.pixel(Point::new(100, 40)), Some(MAIN));
        assert_eq!(target.pixel(Point::new(100, 160)), Some(Rgb888::RED));
        assert_eq!(target.pixel(Point::new(100, 5)), Some(Rgb888::BLUE));
        assert_eq!(target.pixel(Point::new(195, 100)), Some(Rgb888::BLUE));
        assert_eq!(target.pixel(Point::new(100, 100)), Some(MAIN));
        // Hour hand stops at half the radius.
        assert_eq!(target.pixel(Point::new(160, 100)), Some(Rgb888::BLACK));
    }

    #[test]
    fn pivot_casts_a_shadow() {
        let style = analog_watch_face_style(|face| {
            face.colors(|colors| {
                colors.main = Argb::from(MAIN);
                colors.shadow = Argb(0xffff_ff00);
            });
            face.dimensions(|dimensions| dimensions.shadow_radius = 6.0);
        })
        .unwrap();
        let mut fixture = fixture(style);
        let target = draw(&fixture);
        // Left of the pivot, where no hand passes.
        let shadow = target.pixel(Point::new(94, 100)).unwrap();
        assert!(shadow.r() > 0);
        assert_eq!(shadow.r(), shadow.g());
        assert_eq!(shadow.b(), 0);
        assert_eq!(target.pixel(Point::new(100, 100)), Some(MAIN));

        fixture.mode.ambient = true;
        let target = draw(&fixture);
        assert_eq!(target.pixel(Point::new(94, 100)), Some(Rgb888::BLACK));
    }

    #[test]
    fn ambient_hides_second_hand() {
        let mut fixture = fixture(style(None, false));
        fixture.mode.ambient = true;
        let target = draw(&fixture);
        assert_eq!(target.pixel(Point::new(100, 160)), Some(Rgb888::BLACK));
        assert_eq!(target.pixel(Point::new(130, 100)), Some(Rgb888::WHITE));
        assert_eq!(target.pixel(Point::new(100, 5)), Some(Rgb888::WHITE));
    }

    #[test]
    fn muted_hands_are_dimmed() {
        let mut fixture = fixture(style(None, false));
        fixture.mode.muted = true;
        let target = draw(&fixture);
        assert_eq!(target.pixel(Point::new(130, 100)), Some(Rgb888::new(0, 78, 0)));
        assert_eq!(target.pixel(Point::new(100, 5)), Some(Rgb888::BLUE));
    }

    #[test]
    fn bitmap_hand_is_rotated_and_tinted() {
        let style = style(Some(AssetRef(2)), false);
        let mut fixture = fixture(style.clone());
        fixture
            .assets
            .insert_image(AssetRef(2), RgbaImage::from_pixel(4, 40, Rgba([255, 255, 255, 255])));
        fixture.geometry = GeometryState::resolve(
            &style,
            Viewport::new(200, 200),
            AssetSizes {
                hour_hand: Some(Size::new(4, 40)),
                ..Default::default()
            },
        )
        .unwrap();
        let target = draw(&fixture);
        // Bitmap is sized from the screen width, longer than a line hand.
        assert_eq!(target.pixel(Point::new(180, 100)), Some(MAIN));
        assert_eq!(target.pixel(Point::new(180, 110)), Some(Rgb888::BLACK));
    }

    #[test]
    fn missing_hand_bitmap_fails() {
        let style = style(Some(AssetRef(2)), false);
        let mut fixture = fixture(style.clone());
        fixture.geometry = GeometryState::resolve(
            &style,
            Viewport::new(200, 200),
            AssetSizes {
                hour_hand: Some(Size::new(4, 40)),
                ..Default::default()
            },
        )
        .unwrap();
        let mut target = FrameBuffer::new(Size::new(200, 200));
        let result = ClockFace::new().draw(&mut target, &fixture.frame());
        assert!(matches!(result, Err(RenderError::Asset(_))));
    }

    #[test]
    fn numerals_follow_layout() {
        let has_red_numeral = |target: &FrameBuffer| {
            (NUMERAL_MARGIN..NUMERAL_MARGIN + 20).any(|y| {
                (80..120).any(|x| target.pixel(Point::new(x, y)) == Some(Rgb888::RED))
            })
        };
        assert!(has_red_numeral(&draw(&fixture(style(None, true)))));
        assert!(!has_red_numeral(&draw(&fixture(style(None, false)))));
    }
}
