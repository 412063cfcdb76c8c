//! Core types for the rasterizer

use std::collections::HashMap;
use std::path::Path;

use super::color::adjust_brightness;
use crate::error::Result;

/// Square-ish RGB texture; texel value 0 is transparent
#[derive(Debug, Clone)]
pub struct Texture {
    pub id: u16,
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
    /// Mean color of the opaque source texels, `0xRRGGBB`
    pub average_rgb: u32,
}

impl Texture {
    pub fn new(id: u16, width: usize, height: usize, pixels: Vec<u32>) -> Self {
        let average_rgb = average_color(&pixels);
        Self { id, width, height, pixels, average_rgb }
    }

    /// Single-color texture
    pub fn solid(id: u16, width: usize, height: usize, rgb: u32) -> Self {
        Self::new(id, width, height, vec![rgb; width * height])
    }

    /// Load texture from a PNG file. Fully transparent texels become 0.
    pub fn from_file<P: AsRef<Path>>(id: u16, path: P) -> Result<Self> {
        let img = image::open(path.as_ref())?;
        Ok(Self::from_image(id, img))
    }

    /// Load texture from raw PNG bytes
    pub fn from_bytes(id: u16, bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_image(id, img))
    }

    fn from_image(id: u16, img: image::DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let pixels: Vec<u32> = rgba
            .pixels()
            .map(|p| {
                if p[3] == 0 {
                    0
                } else {
                    let rgb = (p[0] as u32) << 16 | (p[1] as u32) << 8 | p[2] as u32;
                    rgb.max(1)
                }
            })
            .collect();

        Self::new(id, width as usize, height as usize, pixels)
    }

    /// Copy with every texel raised to the brightness exponent.
    ///
    /// Texels stay opaque: a texel that would round to 0 becomes 1. The
    /// average keeps describing the source texels.
    pub fn relit(&self, brightness: f64) -> Self {
        let pixels = self
            .pixels
            .iter()
            .map(|&p| if p == 0 { 0 } else { adjust_brightness(p, brightness).max(1) })
            .collect();
        Self {
            id: self.id,
            width: self.width,
            height: self.height,
            pixels,
            average_rgb: self.average_rgb,
        }
    }

    /// Sample at 16.16 fixed-point texture coordinates (wrapping, no filtering)
    #[inline]
    pub fn sample_fixed(&self, u: i32, v: i32) -> u32 {
        let tx = ((u as i64 * self.width as i64) >> 16).rem_euclid(self.width as i64) as usize;
        let ty = ((v as i64 * self.height as i64) >> 16).rem_euclid(self.height as i64) as usize;
        self.pixels[ty * self.width + tx]
    }

    /// Get pixel at x,y coordinates
    pub fn get_pixel(&self, x: usize, y: usize) -> u32 {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            0
        }
    }
}

fn average_color(pixels: &[u32]) -> u32 {
    let (mut r, mut g, mut b, mut n) = (0u64, 0u64, 0u64, 0u64);
    for &p in pixels.iter().filter(|&&p| p != 0) {
        r += (p >> 16 & 0xFF) as u64;
        g += (p >> 8 & 0xFF) as u64;
        b += (p & 0xFF) as u64;
        n += 1;
    }
    if n == 0 {
        return 0;
    }
    ((r / n) as u32) << 16 | ((g / n) as u32) << 8 | (b / n) as u32
}

/// Texture lookup capability used by textured faces
pub trait TextureProvider {
    fn texture(&self, id: u16) -> Option<&Texture>;
}

/// In-memory texture set
#[derive(Debug, Clone, Default)]
pub struct TextureSet {
    textures: HashMap<u16, Texture>,
}

impl TextureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, texture: Texture) {
        self.textures.insert(texture.id, texture);
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl TextureProvider for TextureSet {
    fn texture(&self, id: u16) -> Option<&Texture> {
        self.textures.get(&id)
    }
}

/// Provider with no textures at all (every textured face falls back)
pub struct NoTextures;

impl TextureProvider for NoTextures {
    fn texture(&self, _id: u16) -> Option<&Texture> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_skips_transparent() {
        let tex = Texture::new(0, 2, 1, vec![0, 0x204060]);
        assert_eq!(tex.average_rgb, 0x204060);
    }

    #[test]
    fn test_sample_wraps() {
        // One row, texel x holds x + 1
        let tex = Texture::new(1, 8, 1, (1..=8).collect());
        // u = 0.5 -> texel 4
        assert_eq!(tex.sample_fixed(1 << 15, 0), 5);
        // u = 1.0 wraps to texel 0
        assert_eq!(tex.sample_fixed(1 << 16, 0), 1);
        // negative coordinates wrap too
        assert_eq!(tex.sample_fixed(-(1 << 13), 0), 8);
        // v wraps over the single row
        assert_eq!(tex.sample_fixed(0, 3 << 16), 1);
    }

    #[test]
    fn test_relit_keeps_transparency() {
        let tex = Texture::new(3, 2, 1, vec![0, 0x404040]).relit(0.5);
        assert_eq!(tex.pixels[0], 0);
        assert_eq!(tex.pixels[1], 0x808080);
        assert_eq!(tex.average_rgb, 0x404040);
    }

    #[test]
    fn test_texture_set_lookup() {
        let mut set = TextureSet::new();
        set.insert(Texture::solid(7, 4, 4, 0xABCDEF));
        assert_eq!(set.texture(7).map(|t| t.average_rgb), Some(0xABCDEF));
        assert!(set.texture(8).is_none());
        assert!(NoTextures.texture(7).is_none());
    }

    #[test]
    fn test_from_png_bytes() {
        let mut img = image::RgbaImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let tex = Texture::from_bytes(9, &bytes).unwrap();
        assert_eq!(tex.get_pixel(0, 0), 0xFF0000);
        assert_eq!(tex.get_pixel(1, 1), 0);
    }
}
