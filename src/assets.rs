//! Images and fonts referenced by a style.

use std::{collections::HashMap, fs, path::Path};

use embedded_graphics::{
    mono_font::MonoFont,
    pixelcolor::{Rgb888, RgbColor},
    prelude::{OriginDimensions, Size},
    Pixel,
};
use image::{Rgba, RgbaImage};
use profont::{PROFONT_12_POINT, PROFONT_14_POINT, PROFONT_24_POINT};
use thiserror::Error;
use tinybmp::Bmp;

use crate::{
    log,
    style::{faces, AssetRef, FontRef},
};

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Asset {0:?} is not in the store")]
    Missing(AssetRef),
    #[error("Asset {0:?} is not a valid BMP: {1}")]
    Bitmap(AssetRef, String),
    #[error("Could not decode asset: {0}")]
    Image(#[from] image::ImageError),
    #[error("Could not read asset: {0}")]
    Io(#[from] std::io::Error),
}

pub type Font = &'static MonoFont<'static>;

/// Font used when a style doesn't ask for one.
pub const DEFAULT_FONT: Font = &PROFONT_14_POINT;

pub trait AssetStore {
    fn image(&self, asset: AssetRef) -> Result<&RgbaImage, AssetError>;

    /// Unknown fonts fall back to [`DEFAULT_FONT`].
    fn font(&self, font: Option<FontRef>) -> Font;

    fn image_size(&self, asset: AssetRef) -> Option<Size> {
        self.image(asset)
            .ok()
            .map(|image| Size::new(image.width(), image.height()))
    }
}

#[derive(Default)]
pub struct MemoryAssetStore {
    images: HashMap<AssetRef, RgbaImage>,
    fonts: HashMap<FontRef, Font>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the generated images and the fonts used by the built-in faces.
    pub fn bundled() -> Self {
        let mut store = Self::new();
        store.insert_image(faces::CLASSIC_BACKGROUND, classic_background(400, 400));
        store.insert_image(faces::GOTHIC_HOUR_HAND, gothic_hand(24, 110));
        store.insert_image(faces::GOTHIC_MINUTE_HAND, gothic_hand(18, 150));
        store.insert_font(faces::TITLE_FONT, &PROFONT_12_POINT);
        store.insert_font(faces::NUMERAL_FONT, &PROFONT_24_POINT);
        store
    }

    pub fn insert_image(&mut self, asset: AssetRef, image: RgbaImage) {
        self.images.insert(asset, image);
    }

    pub fn insert_font(&mut self, font: FontRef, mono: Font) {
        self.fonts.insert(font, mono);
    }

    /// Decodes an uncompressed BMP. BMPs carry no alpha, every pixel is opaque.
    pub fn insert_bmp(&mut self, asset: AssetRef, bytes: &[u8]) -> Result<(), AssetError> {
        let bmp = Bmp::<Rgb888>::from_slice(bytes)
            .map_err(|error| AssetError::Bitmap(asset, format!("{:?}", error)))?;
        let size = bmp.size();
        let mut image = RgbaImage::new(size.width, size.height);
        for Pixel(point, color) in bmp.pixels() {
            if point.x >= 0 && point.y >= 0 {
                image.put_pixel(
                    point.x as u32,
                    point.y as u32,
                    Rgba([color.r(), color.g(), color.b(), 255]),
                );
            }
        }
        self.insert_image(asset, image);
        Ok(())
    }

    pub fn insert_encoded(&mut self, asset: AssetRef, bytes: &[u8]) -> Result<(), AssetError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        self.insert_image(asset, image);
        Ok(())
    }

    /// Loads every `<id>.bmp` / `<id>.png` file in `dir`, replacing what's
    /// already stored under that id. Returns how many were loaded.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, AssetError> {
        let mut loaded = 0;
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<u32>().ok())
            else {
                continue;
            };
            let asset = AssetRef(id);
            if asset.is_empty() {
                continue;
            }
            let bytes = fs::read(&path)?;
            match path.extension().and_then(|ext| ext.to_str()) {
                Some("bmp") => self.insert_bmp(asset, &bytes)?,
                Some("png") => self.insert_encoded(asset, &bytes)?,
                _ => continue,
            }
            println!("{} Loaded asset {} from {}", log::SCREEN, id, path.display());
            loaded += 1;
        }
        Ok(loaded)
    }
}

impl AssetStore for MemoryAssetStore {
    fn image(&self, asset: AssetRef) -> Result<&RgbaImage, AssetError> {
        self.images.get(&asset).ok_or(AssetError::Missing(asset))
    }

    fn font(&self, font: Option<FontRef>) -> Font {
        font.and_then(|font| self.fonts.get(&font).copied())
            .unwrap_or(DEFAULT_FONT)
    }
}

/// Dark red vignette.
fn classic_background(width: u32, height: u32) -> RgbaImage {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let max = cx.min(cy);
    RgbaImage::from_fn(width, height, |x, y| {
        let distance = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt() / max;
        let light = (1.0 - distance.min(1.0)).powf(1.5);
        Rgba([
            (30.0 + 90.0 * light) as u8,
            (8.0 + 12.0 * light) as u8,
            (12.0 + 16.0 * light) as u8,
            255,
        ])
    })
}

/// White blade pointing up, with a ring around the pivot 27% from the bottom.
fn gothic_hand(width: u32, height: u32) -> RgbaImage {
    let cx = (width as f32 - 1.0) / 2.0;
    let pivot_y = height as f32 * (1.0 - 0.27);
    let ring = width as f32 / 2.0;
    RgbaImage::from_fn(width, height, |x, y| {
        let dx = (x as f32 - cx).abs();
        let dy = y as f32 - pivot_y;
        let in_ring = {
            let distance = (dx * dx + dy * dy).sqrt();
            distance <= ring && distance >= ring * 0.5
        };
        let half_width = if (y as f32) < pivot_y {
            // Tapers to a point at the top.
            ring * 0.6 * (y as f32 / pivot_y)
        } else {
            ring * 0.25
        };
        if in_ring || dx <= half_width {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}
