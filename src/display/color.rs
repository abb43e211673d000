use embedded_graphics::pixelcolor::{Rgb888, RgbColor, WebColors};
use image::Rgba;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Packed `0xAARRGGBB` colour.
///
/// `Argb` is the colour type of every style value. The drawing surface itself
/// is opaque [`Rgb888`]; the alpha channel is folded in by [`Argb::blend_over`]
/// when a pixel is written.
///
/// # Parsing
///
/// ```ignore
/// let shadow = Argb::parse("#3f000000")?;
/// assert_eq!(shadow.alpha(), 0x3f);
///
/// // Without an alpha byte the colour is fully opaque.
/// assert_eq!(Argb::parse("#b1b2cb")?, Argb(0xffb1b2cb));
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawColor", into = "String")]
pub struct Argb(pub u32);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("Color '{0}' must start with '#'")]
    MissingHash(String),
    #[error("Color '{0}' must have 6 or 8 hex digits")]
    BadLength(String),
    #[error("Color '{0}' is not valid hex")]
    BadHex(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawColor {
    Hex(String),
    Packed(u32),
}

impl TryFrom<RawColor> for Argb {
    type Error = ColorParseError;

    fn try_from(value: RawColor) -> Result<Self, Self::Error> {
        match value {
            RawColor::Hex(hex) => Argb::parse(&hex),
            RawColor::Packed(packed) => Ok(Argb(packed)),
        }
    }
}

impl From<Argb> for String {
    fn from(color: Argb) -> Self {
        format!("#{:08x}", color.0)
    }
}

impl Default for Argb {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Argb {
    pub const WHITE: Argb = Argb(0xffff_ffff);
    pub const BLACK: Argb = Argb(0xff00_0000);
    pub const RED: Argb = Argb(0xffff_0000);
    pub const DARK_GRAY: Argb = Argb(0xff44_4444);
    pub const TRANSPARENT: Argb = Argb(0x0000_0000);

    #[inline]
    pub const fn from_argb(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        Argb((alpha as u32) << 24 | (red as u32) << 16 | (green as u32) << 8 | blue as u32)
    }

    #[inline]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Returns the same colour with its alpha channel replaced.
    #[inline]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Argb((self.0 & 0x00ff_ffff) | (alpha as u32) << 24)
    }

    /// Parses `#RRGGBB` or `#AARRGGBB`.
    pub fn parse(value: &str) -> Result<Self, ColorParseError> {
        let Some(hex) = value.strip_prefix('#') else {
            return Err(ColorParseError::MissingHash(value.to_string()));
        };
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadHex(value.to_string()));
        }
        let packed = u32::from_str_radix(hex, 16)
            .map_err(|_| ColorParseError::BadHex(value.to_string()))?;
        match hex.len() {
            6 => Ok(Argb(0xff00_0000 | packed)),
            8 => Ok(Argb(packed)),
            _ => Err(ColorParseError::BadLength(value.to_string())),
        }
    }

    /// Drops the alpha channel.
    #[inline]
    pub fn to_rgb888(self) -> Rgb888 {
        Rgb888::new(self.red(), self.green(), self.blue())
    }

    /// Composites this colour over `dst`, with `paint_alpha` applied on top of
    /// the colour's own alpha.
    pub fn blend_over(self, dst: Rgb888, paint_alpha: u8) -> Rgb888 {
        let alpha = mul_u8(self.alpha(), paint_alpha);
        blend(dst, self.to_rgb888(), alpha)
    }

    /// Channel-wise multiply, the tint applied to hand bitmaps.
    pub fn multiply(self, pixel: Rgba<u8>) -> Rgba<u8> {
        let [r, g, b, a] = pixel.0;
        Rgba([
            mul_u8(r, self.red()),
            mul_u8(g, self.green()),
            mul_u8(b, self.blue()),
            mul_u8(a, self.alpha()),
        ])
    }
}

impl From<Rgb888> for Argb {
    fn from(color: Rgb888) -> Self {
        Argb::from_argb(0xff, color.r(), color.g(), color.b())
    }
}

/// `a * b / 255`, rounded.
#[inline]
pub fn mul_u8(a: u8, b: u8) -> u8 {
    ((a as u32 * b as u32 + 127) / 255) as u8
}

/// Source-over blend of `src` onto `dst` with coverage `alpha`.
pub fn blend(dst: Rgb888, src: Rgb888, alpha: u8) -> Rgb888 {
    match alpha {
        0 => dst,
        255 => src,
        _ => {
            let mix = |d: u8, s: u8| -> u8 {
                ((s as u32 * alpha as u32 + d as u32 * (255 - alpha as u32) + 127) / 255) as u8
            };
            Rgb888::new(
                mix(dst.r(), src.r()),
                mix(dst.g(), src.g()),
                mix(dst.b(), src.b()),
            )
        }
    }
}

/// 4x5 row-major colour matrix, applied as
/// `out = M * [r, g, b, a, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorMatrix(pub [f32; 20]);

impl ColorMatrix {
    /// Black and white filter used on complication images in ambient mode.
    pub const GRAYSCALE: ColorMatrix = ColorMatrix([
        0.33, 0.33, 0.33, 0.0, 50.0, //
        0.33, 0.33, 0.33, 0.0, 50.0, //
        0.33, 0.33, 0.33, 0.0, 50.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]);

    pub const IDENTITY: ColorMatrix = ColorMatrix([
        1.0, 0.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]);

    pub fn apply(&self, pixel: Rgba<u8>) -> Rgba<u8> {
        let input = [
            pixel.0[0] as f32,
            pixel.0[1] as f32,
            pixel.0[2] as f32,
            pixel.0[3] as f32,
        ];
        let mut out = [0u8; 4];
        for (row, channel) in out.iter_mut().enumerate() {
            let m = &self.0[row * 5..row * 5 + 5];
            let value = m[0] * input[0] + m[1] * input[1] + m[2] * input[2] + m[3] * input[3] + m[4];
            *channel = value.round().clamp(0.0, 255.0) as u8;
        }
        Rgba(out)
    }
}

/// Colour used for everything drawn in ambient mode.
pub const AMBIENT_COLOR: Argb = Argb::WHITE;

/// Ambient background, always black to save power and avoid burn-in.
pub const AMBIENT_BACKGROUND: Rgb888 = Rgb888::BLACK;

/// Placeholder drawn when an icon asset cannot be resolved.
pub const MISSING_ASSET: Rgb888 = Rgb888::CSS_MAGENTA;
