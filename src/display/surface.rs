use std::{convert::Infallible, path::Path};

use embedded_graphics::{
    pixelcolor::{Rgb888, RgbColor},
    prelude::*,
};
use image::{Rgb, RgbImage, Rgba, RgbaImage};

use super::{
    color::{blend, mul_u8, Argb, ColorMatrix},
    RenderError,
};

/// Drawing surface that can read back what it holds, which is what alpha
/// blending needs on top of a plain [`DrawTarget`].
pub trait FaceSurface: DrawTarget<Color = Rgb888, Error = Infallible> + OriginDimensions {
    fn pixel(&self, point: Point) -> Option<Rgb888>;

    fn set_pixel(&mut self, point: Point, color: Rgb888);

    fn blend_pixel(&mut self, point: Point, color: Rgb888, alpha: u8) {
        if let Some(dst) = self.pixel(point) {
            self.set_pixel(point, blend(dst, color, alpha));
        }
    }

    /// Composites `image` with its own alpha, optionally through a colour
    /// matrix.
    fn blit(&mut self, image: &RgbaImage, top_left: Point, filter: Option<&ColorMatrix>) {
        for (x, y, pixel) in image.enumerate_pixels() {
            let pixel = match filter {
                Some(matrix) => matrix.apply(*pixel),
                None => *pixel,
            };
            let [r, g, b, a] = pixel.0;
            if a == 0 {
                continue;
            }
            let point = top_left + Point::new(x as i32, y as i32);
            self.blend_pixel(point, Rgb888::new(r, g, b), a);
        }
    }
}

/// Frame sized to the watch surface, one [`Rgb888`] per pixel.
pub struct FrameBuffer {
    size: Size,
    pixels: Vec<Rgb888>,
}

impl FrameBuffer {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            pixels: vec![Rgb888::BLACK; (size.width * size.height) as usize],
        }
    }

    fn index(&self, point: Point) -> Option<usize> {
        let coords: Result<(u32, u32), _> = point.try_into();
        match coords {
            Ok((x, y)) if x < self.size.width && y < self.size.height => {
                Some((y * self.size.width + x) as usize)
            }
            _ => None,
        }
    }

    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.size.width, self.size.height, |x, y| {
            let color = self.pixels[(y * self.size.width + x) as usize];
            Rgb([color.r(), color.g(), color.b()])
        })
    }

    pub fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        self.to_image().save(path)?;
        Ok(())
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        // Out of bounds pixels are dropped.
        for Pixel(point, color) in pixels.into_iter() {
            if let Some(index) = self.index(point) {
                self.pixels[index] = color;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.pixels.fill(color);
        Ok(())
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        self.size
    }
}

impl FaceSurface for FrameBuffer {
    fn pixel(&self, point: Point) -> Option<Rgb888> {
        self.index(point).map(|index| self.pixels[index])
    }

    fn set_pixel(&mut self, point: Point, color: Rgb888) {
        if let Some(index) = self.index(point) {
            self.pixels[index] = color;
        }
    }
}

/// Draws through to a surface at a fixed opacity.
pub struct Translucent<'a, S: FaceSurface> {
    surface: &'a mut S,
    alpha: u8,
}

impl<'a, S: FaceSurface> Translucent<'a, S> {
    pub fn new(surface: &'a mut S, alpha: u8) -> Self {
        Self { surface, alpha }
    }

    /// Splits an ARGB paint into its opaque colour and a target carrying
    /// the combined alpha.
    pub fn with_paint(surface: &'a mut S, color: Argb, paint_alpha: u8) -> (Rgb888, Self) {
        (
            color.to_rgb888(),
            Self::new(surface, mul_u8(color.alpha(), paint_alpha)),
        )
    }
}

impl<'a, S: FaceSurface> DrawTarget for Translucent<'a, S> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        if self.alpha == 0 {
            return Ok(());
        }
        for Pixel(point, color) in pixels.into_iter() {
            self.surface.blend_pixel(point, color, self.alpha);
        }
        Ok(())
    }
}

impl<'a, S: FaceSurface> OriginDimensions for Translucent<'a, S> {
    fn size(&self) -> Size {
        self.surface.size()
    }
}

/// Placement of a bitmap rotated around a pivot.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RotatedBlit {
    /// Screen position of the pivot.
    pub pivot: (f32, f32),
    /// Size the bitmap is scaled to before rotating.
    pub width: f32,
    pub height: f32,
    /// Distance from the pivot to the bitmap's bottom edge.
    pub below_pivot: f32,
    /// Clockwise, 0 points up.
    pub degrees: f32,
    pub tint: Argb,
    pub alpha: u8,
    /// Bilinear sampling when set, nearest neighbour otherwise.
    pub smooth: bool,
}

impl RotatedBlit {
    fn rotate(&self, (x, y): (f32, f32)) -> (f32, f32) {
        let (sin, cos) = self.degrees.to_radians().sin_cos();
        (x * cos - y * sin, x * sin + y * cos)
    }

    fn unrotate(&self, (x, y): (f32, f32)) -> (f32, f32) {
        let (sin, cos) = self.degrees.to_radians().sin_cos();
        (x * cos + y * sin, -x * sin + y * cos)
    }

    /// Screen area the rotated bitmap can touch.
    fn screen_bounds(&self) -> (i32, i32, i32, i32) {
        let half = self.width / 2.0;
        let top = self.below_pivot - self.height;
        let corners = [
            (-half, top),
            (half, top),
            (-half, self.below_pivot),
            (half, self.below_pivot),
        ]
        .map(|corner| self.rotate(corner));
        let xs = corners.map(|(x, _)| x);
        let ys = corners.map(|(_, y)| y);
        let min = |values: [f32; 4]| values.into_iter().fold(f32::INFINITY, f32::min);
        let max = |values: [f32; 4]| values.into_iter().fold(f32::NEG_INFINITY, f32::max);
        (
            (self.pivot.0 + min(xs)).floor() as i32,
            (self.pivot.1 + min(ys)).floor() as i32,
            (self.pivot.0 + max(xs)).ceil() as i32,
            (self.pivot.1 + max(ys)).ceil() as i32,
        )
    }
}

pub fn blit_rotated<S: FaceSurface>(surface: &mut S, image: &RgbaImage, blit: &RotatedBlit) {
    if image.width() == 0 || image.height() == 0 || blit.width <= 0.0 || blit.height <= 0.0 {
        return;
    }
    let x_scale = image.width() as f32 / blit.width;
    let y_scale = image.height() as f32 / blit.height;
    let (left, top, right, bottom) = blit.screen_bounds();

    for y in top..=bottom {
        for x in left..=right {
            let offset = (x as f32 + 0.5 - blit.pivot.0, y as f32 + 0.5 - blit.pivot.1);
            let (local_x, local_y) = blit.unrotate(offset);
            let u = local_x + blit.width / 2.0;
            let v = local_y + blit.height - blit.below_pivot;
            if u < 0.0 || v < 0.0 || u >= blit.width || v >= blit.height {
                continue;
            }
            let source = if blit.smooth {
                sample_bilinear(image, u * x_scale - 0.5, v * y_scale - 0.5)
            } else {
                sample_nearest(image, u * x_scale, v * y_scale)
            };
            let [r, g, b, a] = blit.tint.multiply(source).0;
            let alpha = mul_u8(a, blit.alpha);
            if alpha > 0 {
                surface.blend_pixel(Point::new(x, y), Rgb888::new(r, g, b), alpha);
            }
        }
    }
}

fn sample_nearest(image: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let x = (x as u32).min(image.width() - 1);
    let y = (y as u32).min(image.height() - 1);
    *image.get_pixel(x, y)
}

fn sample_bilinear(image: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let max_x = image.width() as i64 - 1;
    let max_y = image.height() as i64 - 1;
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let at = |x: f32, y: f32| {
        let x = (x as i64).clamp(0, max_x) as u32;
        let y = (y as i64).clamp(0, max_y) as u32;
        image.get_pixel(x, y).0
    };
    let corners = [
        (at(x0, y0), (1.0 - fx) * (1.0 - fy)),
        (at(x0 + 1.0, y0), fx * (1.0 - fy)),
        (at(x0, y0 + 1.0), (1.0 - fx) * fy),
        (at(x0 + 1.0, y0 + 1.0), fx * fy),
    ];
    let mut out = [0u8; 4];
    for (channel, value) in out.iter_mut().enumerate() {
        let mixed: f32 = corners
            .iter()
            .map(|(pixel, weight)| pixel[channel] as f32 * weight)
            .sum();
        *value = mixed.round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}
