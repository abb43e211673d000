use embedded_canvas::Canvas;
use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use image::{imageops::FilterType, RgbaImage};

use crate::{
    assets::{AssetError, Font},
    complication::{ComplicationData, SlotId},
    display::{
        color::{ColorMatrix, MISSING_ASSET},
        surface::{FaceSurface, FrameBuffer, Translucent},
        RenderError, COMPLICATION_PADDING,
    },
    geometry::Bounds,
    style::{AssetRef, ComplicationKind},
};

use super::{
    inset,
    long_text::{fits_one_line, LongTextBlock},
    DisplayAreaType, FaceComponent, FrameContext,
};

const BAR_HEIGHT: u32 = 6;
const STROKE_WIDTH: u32 = 1;

/// One complication slot, drawn from whatever data the slot holds.
pub struct ComplicationView {
    index: usize,
    name: String,
}

impl ComplicationView {
    pub fn new(index: usize) -> Self {
        let name = match SlotId::from_index(index) {
            Some(slot) => format!("complication {}", slot),
            None => format!("complication ?{}", index),
        };
        Self { index, name }
    }
}

struct Lines<'a> {
    text: Option<String>,
    title: Option<String>,
    text_font: &'a MonoFont<'a>,
    title_font: &'a MonoFont<'a>,
}

impl FaceComponent for ComplicationView {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_type(&self) -> DisplayAreaType {
        DisplayAreaType::Slot(self.index)
    }

    fn get_z_index(&self) -> u32 {
        10
    }

    fn draw(&mut self, target: &mut FrameBuffer, frame: &FrameContext) -> Result<bool, RenderError> {
        if frame.mode.ambient && frame.hide_complications_in_ambient {
            return Ok(false);
        }
        let Some(data) = frame.complications.get(self.index) else {
            return Ok(false);
        };
        let bounds = frame.geometry.complication_bounds[self.index];
        if bounds.is_empty() || !data.kind.has_content() {
            return Ok(false);
        }

        if let Some(background) = frame.appearance.background {
            let (color, mut translucent) = Translucent::with_paint(target, background, 255);
            bounds
                .to_rectangle()
                .into_styled(PrimitiveStyle::with_fill(color))
                .draw(&mut translucent)?;
        }

        let area = inset(&bounds, COMPLICATION_PADDING);
        match data.kind {
            ComplicationKind::ShortText => self.draw_short_text(target, frame, data, &bounds, &area)?,
            ComplicationKind::LongText => self.draw_long_text(target, frame, data, &bounds, &area)?,
            ComplicationKind::RangedValue => self.draw_ranged(target, frame, data, &bounds, &area)?,
            ComplicationKind::Icon => {
                draw_icon(target, frame, data.icon, &area)?;
            }
            ComplicationKind::SmallImage => {
                if let Some(image) = data.small_image {
                    let filter = &frame.appearance.image_filter;
                    draw_fitted(target, frame, image, &area, filter)?;
                }
            }
            ComplicationKind::LargeImage => {
                if let Some(image) = data.large_image {
                    let filter = &frame.appearance.image_filter;
                    draw_stretched(target, frame, image, &bounds, filter)?;
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl ComplicationView {
    fn title_font(&self, frame: &FrameContext) -> Font {
        frame
            .assets
            .font(frame.style.complications[self.index].title_typeface)
    }

    fn draw_short_text(
        &self,
        target: &mut FrameBuffer,
        frame: &FrameContext,
        data: &ComplicationData,
        bounds: &Bounds,
        area: &Bounds,
    ) -> Result<(), RenderError> {
        let now = frame.now_ms();
        let lines = Lines {
            text: data.short_text.as_ref().map(|text| text.text(now)),
            title: data.short_title.as_ref().map(|title| title.text(now)),
            text_font: frame.assets.font(None),
            title_font: self.title_font(frame),
        };
        match data.icon {
            Some(icon) => {
                // Icon in the upper half, text below it.
                let half = area.height() as i32 / 2;
                let icon_area = Bounds {
                    bottom: area.top + half,
                    ..*area
                };
                let text_area = Bounds {
                    top: area.top + half,
                    ..*area
                };
                draw_icon(target, frame, Some(icon), &icon_area)?;
                draw_lines(target, frame, &lines, bounds, &text_area)
            }
            None => draw_lines(target, frame, &lines, bounds, area),
        }
    }

    fn draw_long_text(
        &self,
        target: &mut FrameBuffer,
        frame: &FrameContext,
        data: &ComplicationData,
        bounds: &Bounds,
        area: &Bounds,
    ) -> Result<(), RenderError> {
        let now = frame.now_ms();
        let Some(body) = data.long_text.as_ref().map(|text| text.text(now)) else {
            return Ok(());
        };
        let title = data.title().map(|title| title.text(now));
        let text_font = frame.assets.font(None);
        let title_font = self.title_font(frame);

        let fits = fits_one_line(&body, text_font, area.width())
            && title
                .as_deref()
                .map_or(true, |title| fits_one_line(title, title_font, area.width()));
        if fits {
            let lines = Lines {
                text: Some(body),
                title,
                text_font,
                title_font,
            };
            return draw_lines(target, frame, &lines, bounds, area);
        }

        let block = LongTextBlock {
            body: &body,
            title: title.as_deref(),
            body_font: text_font,
            title_font,
            body_color: frame.appearance.text.to_rgb888(),
            title_color: frame.appearance.title.to_rgb888(),
        };
        let mut canvas = Canvas::<Rgb888>::new(bounds.size());
        block.draw(&mut canvas, to_local(bounds, area))?;
        place(target, frame, canvas, bounds)
    }

    fn draw_ranged(
        &self,
        target: &mut FrameBuffer,
        frame: &FrameContext,
        data: &ComplicationData,
        bounds: &Bounds,
        area: &Bounds,
    ) -> Result<(), RenderError> {
        let now = frame.now_ms();
        let bar_top = area.bottom - BAR_HEIGHT as i32;
        let text_area = Bounds {
            bottom: bar_top,
            ..*area
        };
        let lines = Lines {
            text: data.short_text.as_ref().map(|text| text.text(now)),
            title: data.short_title.as_ref().map(|title| title.text(now)),
            text_font: frame.assets.font(None),
            title_font: self.title_font(frame),
        };
        draw_lines(target, frame, &lines, bounds, &text_area)?;

        let Some(ranged) = data.ranged else {
            return Ok(());
        };
        let bar = Rectangle::new(
            Point::new(area.left, bar_top),
            Size::new(area.width(), BAR_HEIGHT),
        );
        let filled = Rectangle::new(
            bar.top_left,
            Size::new(
                (ranged.fraction() * bar.size.width as f32) as u32,
                bar.size.height,
            ),
        );
        let (color, mut translucent) = Translucent::with_paint(target, frame.appearance.highlight, 255);
        bar.into_styled(PrimitiveStyle::with_stroke(color, STROKE_WIDTH))
            .draw(&mut translucent)?;
        filled
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(&mut translucent)?;
        Ok(())
    }
}

/// `area` relative to the top left corner of `bounds`.
fn to_local(bounds: &Bounds, area: &Bounds) -> Rectangle {
    Rectangle::new(
        area.top_left() - bounds.top_left(),
        area.size(),
    )
}

fn place(
    target: &mut FrameBuffer,
    frame: &FrameContext,
    canvas: Canvas<Rgb888>,
    bounds: &Bounds,
) -> Result<(), RenderError> {
    let mut translucent = Translucent::new(target, frame.appearance.text.alpha());
    canvas.place_at(bounds.top_left()).draw(&mut translucent)?;
    Ok(())
}

/// Text centred in `area`, with the title underneath it.
fn draw_lines(
    target: &mut FrameBuffer,
    frame: &FrameContext,
    lines: &Lines,
    bounds: &Bounds,
    area: &Bounds,
) -> Result<(), RenderError> {
    if lines.text.is_none() && lines.title.is_none() {
        return Ok(());
    }
    let local = to_local(bounds, area);
    let center = local.center();
    let centered = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Middle)
        .build();

    let text_height = lines.text.as_ref().map_or(0, |_| lines.text_font.character_size.height);
    let title_height = lines.title.as_ref().map_or(0, |_| lines.title_font.character_size.height);
    let top = center.y - (text_height + title_height) as i32 / 2;

    let mut canvas = Canvas::<Rgb888>::new(bounds.size());
    if let Some(text) = &lines.text {
        let style = MonoTextStyle::new(lines.text_font, frame.appearance.text.to_rgb888());
        let position = Point::new(center.x, top + text_height as i32 / 2);
        Text::with_text_style(text, position, style, centered).draw(&mut canvas)?;
    }
    if let Some(title) = &lines.title {
        let style = MonoTextStyle::new(lines.title_font, frame.appearance.title.to_rgb888());
        let position = Point::new(center.x, top + text_height as i32 + title_height as i32 / 2);
        Text::with_text_style(title, position, style, centered).draw(&mut canvas)?;
    }
    place(target, frame, canvas, bounds)
}

fn draw_icon(
    target: &mut FrameBuffer,
    frame: &FrameContext,
    icon: Option<AssetRef>,
    area: &Bounds,
) -> Result<(), RenderError> {
    let Some(icon) = icon else {
        return Ok(());
    };
    let image = match frame.assets.image(icon) {
        Ok(image) => image,
        Err(AssetError::Missing(_)) => {
            let side = area.width().min(area.height()) / 2;
            Rectangle::with_center(area.to_rectangle().center(), Size::new(side, side))
                .into_styled(PrimitiveStyle::with_fill(MISSING_ASSET))
                .draw(target)?;
            return Ok(());
        }
        Err(error) => return Err(error.into()),
    };
    let fitted = fit(image, area);
    let tinted = match frame.appearance.icon_tint {
        Some(tint) => {
            let mut tinted = fitted;
            tinted.pixels_mut().for_each(|pixel| *pixel = tint.multiply(*pixel));
            tinted
        }
        None => fitted,
    };
    target.blit(&tinted, centered_in(&tinted, area), None);
    Ok(())
}

fn draw_fitted(
    target: &mut FrameBuffer,
    frame: &FrameContext,
    asset: AssetRef,
    area: &Bounds,
    filter: &ColorMatrix,
) -> Result<(), RenderError> {
    let fitted = fit(frame.assets.image(asset)?, area);
    target.blit(&fitted, centered_in(&fitted, area), Some(filter));
    Ok(())
}

fn draw_stretched(
    target: &mut FrameBuffer,
    frame: &FrameContext,
    asset: AssetRef,
    bounds: &Bounds,
    filter: &ColorMatrix,
) -> Result<(), RenderError> {
    let image = frame.assets.image(asset)?;
    let stretched = image::imageops::resize(image, bounds.width(), bounds.height(), FilterType::Triangle);
    target.blit(&stretched, bounds.top_left(), Some(filter));
    Ok(())
}

/// Scales `image` down, aspect ratio kept, until it fits `area`.
fn fit(image: &RgbaImage, area: &Bounds) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || area.is_empty() {
        return RgbaImage::new(0, 0);
    }
    let scale = (area.width() as f32 / width as f32)
        .min(area.height() as f32 / height as f32)
        .min(1.0);
    if scale >= 1.0 {
        return image.clone();
    }
    let width = ((width as f32 * scale) as u32).max(1);
    let height = ((height as f32 * scale) as u32).max(1);
    image::imageops::resize(image, width, height, FilterType::Triangle)
}

fn centered_in(image: &RgbaImage, area: &Bounds) -> Point {
    Point::new(
        area.left + (area.width() as i32 - image.width() as i32) / 2,
        area.top + (area.height() as i32 - image.height() as i32) / 2,
    )
}
