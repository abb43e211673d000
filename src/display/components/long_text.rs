//! Long text that doesn't fit on a single line.
//!
//! The body is wrapped and justified into the slot; with a title the body
//! keeps the upper half and the title is centred in the lower half.

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::Rectangle,
};
use embedded_text::{
    alignment::{HorizontalAlignment, VerticalAlignment},
    style::{HeightMode, TextBoxStyleBuilder, VerticalOverdraw},
    TextBox,
};

/// Width of `text` set in `font` on one line.
pub fn line_width(text: &str, font: &MonoFont) -> u32 {
    let count = text.chars().count() as u32;
    if count == 0 {
        return 0;
    }
    count * font.character_size.width + (count - 1) * font.character_spacing
}

pub fn fits_one_line(text: &str, font: &MonoFont, width: u32) -> bool {
    !text.contains('\n') && line_width(text, font) <= width
}

pub struct LongTextBlock<'a> {
    pub body: &'a str,
    pub title: Option<&'a str>,
    pub body_font: &'a MonoFont<'a>,
    pub title_font: &'a MonoFont<'a>,
    pub body_color: Rgb888,
    pub title_color: Rgb888,
}

impl<'a> LongTextBlock<'a> {
    /// Splits `area` into the body and title rectangles.
    pub fn layout(&self, area: Rectangle) -> (Rectangle, Option<Rectangle>) {
        match self.title {
            None => (area, None),
            Some(_) => {
                let upper = area.size.height / 2;
                let body = Rectangle::new(area.top_left, Size::new(area.size.width, upper));
                let title = Rectangle::new(
                    area.top_left + Point::new(0, upper as i32),
                    Size::new(area.size.width, area.size.height.saturating_sub(upper)),
                );
                (body, Some(title))
            }
        }
    }

    /// Rows that overflow their half are clipped to it.
    pub fn draw<D>(&self, target: &mut D, area: Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let (body_area, title_area) = self.layout(area);

        let body_style = TextBoxStyleBuilder::new()
            .height_mode(HeightMode::Exact(VerticalOverdraw::Visible))
            .alignment(HorizontalAlignment::Justified)
            .vertical_alignment(VerticalAlignment::Middle)
            .build();
        TextBox::with_textbox_style(
            self.body,
            body_area,
            MonoTextStyle::new(self.body_font, self.body_color),
            body_style,
        )
        .draw(&mut target.clipped(&body_area))?;

        if let (Some(title), Some(title_area)) = (self.title, title_area) {
            let title_style = TextBoxStyleBuilder::new()
                .height_mode(HeightMode::Exact(VerticalOverdraw::Visible))
                .alignment(HorizontalAlignment::Center)
                .vertical_alignment(VerticalAlignment::Top)
                .build();
            TextBox::with_textbox_style(
                title,
                title_area,
                MonoTextStyle::new(self.title_font, self.title_color),
                title_style,
            )
            .draw(&mut target.clipped(&title_area))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics::pixelcolor::RgbColor;
    use profont::{PROFONT_10_POINT, PROFONT_12_POINT};

    use super::*;
    use crate::display::surface::{FaceSurface, FrameBuffer};

    const QUOTE: &str = "I hope that when the world comes to an end, I can breathe a sigh of relief.";

    fn block(title: Option<&'static str>) -> LongTextBlock<'static> {
        LongTextBlock {
            body: QUOTE,
            title,
            body_font: &PROFONT_12_POINT,
            title_font: &PROFONT_10_POINT,
            body_color: Rgb888::WHITE,
            title_color: Rgb888::RED,
        }
    }

    fn lit_rows(frame: &FrameBuffer, color: Rgb888) -> Vec<i32> {
        let size = frame.size();
        (0..size.height as i32)
            .filter(|y| (0..size.width as i32).any(|x| frame.pixel(Point::new(x, *y)) == Some(color)))
            .collect()
    }

    #[test]
    fn measures_single_lines() {
        let width = line_width("abc", &PROFONT_12_POINT);
        assert_eq!(
            width,
            3 * PROFONT_12_POINT.character_size.width + 2 * PROFONT_12_POINT.character_spacing
        );
        assert!(fits_one_line("abc", &PROFONT_12_POINT, width));
        assert!(!fits_one_line("abc", &PROFONT_12_POINT, width - 1));
        assert!(!fits_one_line("a\nb", &PROFONT_12_POINT, 1000));
        assert_eq!(line_width("", &PROFONT_12_POINT), 0);
    }

    #[test]
    fn title_takes_lower_half() {
        let area = Rectangle::new(Point::new(10, 20), Size::new(100, 60));
        let (body, title) = block(Some("title")).layout(area);
        assert_eq!(body, Rectangle::new(Point::new(10, 20), Size::new(100, 30)));
        assert_eq!(title, Some(Rectangle::new(Point::new(10, 50), Size::new(100, 30))));
        assert_eq!(block(None).layout(area), (area, None));
    }

    #[test]
    fn wrapped_text_stays_in_its_halves() {
        let mut frame = FrameBuffer::new(Size::new(160, 80));
        block(Some("Frank"))
            .draw(&mut frame, Rectangle::new(Point::zero(), Size::new(160, 80)))
            .unwrap();

        let body_rows = lit_rows(&frame, Rgb888::WHITE);
        let title_rows = lit_rows(&frame, Rgb888::RED);
        assert!(!body_rows.is_empty());
        assert!(!title_rows.is_empty());
        assert!(body_rows.iter().all(|y| *y < 40));
        assert!(title_rows.iter().all(|y| *y >= 40));
        // Wrapped onto more than one line.
        let span = body_rows.last().unwrap() - body_rows.first().unwrap();
        assert!(span > PROFONT_12_POINT.character_size.height as i32);
    }

    #[test]
    fn overflowing_text_is_clipped_to_its_area() {
        let mut frame = FrameBuffer::new(Size::new(120, 120));
        let area = Rectangle::new(Point::new(20, 50), Size::new(80, 20));
        block(None).draw(&mut frame, area).unwrap();

        let body_rows = lit_rows(&frame, Rgb888::WHITE);
        assert!(!body_rows.is_empty());
        assert!(body_rows.iter().all(|y| (50..70).contains(y)));
    }

    #[test]
    fn overflowing_title_stays_in_lower_half() {
        let mut frame = FrameBuffer::new(Size::new(60, 40));
        let area = Rectangle::new(Point::new(0, 10), Size::new(60, 15));
        block(Some("a title far too long for one line"))
            .draw(&mut frame, area)
            .unwrap();

        let title_rows = lit_rows(&frame, Rgb888::RED);
        assert!(title_rows.iter().all(|y| (17..25).contains(y)));
        assert!(lit_rows(&frame, Rgb888::WHITE).iter().all(|y| (10..17).contains(y)));
    }
}
