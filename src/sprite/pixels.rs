//! Small RGB pixel buffer with the icon post-effects

use image::{Rgba, RgbaImage};

use crate::rasterizer::Framebuffer;

/// Icon-sized raster; pixel value 0 is transparent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpritePixels {
    raster: Framebuffer,
}

impl SpritePixels {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            raster: Framebuffer::new(width, height),
        }
    }

    pub fn width(&self) -> usize {
        self.raster.width
    }

    pub fn height(&self) -> usize {
        self.raster.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.raster.pixels
    }

    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.raster.get_pixel(x, y)
    }

    pub fn set(&mut self, x: usize, y: usize, rgb: u32) {
        self.raster.set_pixel(x, y, rgb);
    }

    pub fn raster_mut(&mut self) -> &mut Framebuffer {
        &mut self.raster
    }

    /// Outline: every empty pixel with an opaque 4-neighbour becomes `color`.
    ///
    /// Neighbours are read from the unmodified image, so the outline is
    /// exactly one pixel wide.
    pub fn draw_border(&mut self, color: u32) {
        let (w, h) = (self.width(), self.height());
        let src = &self.raster.pixels;
        let mut out = src.clone();

        for y in 0..h {
            for x in 0..w {
                let pos = x + y * w;
                if src[pos] != 0 {
                    continue;
                }
                let touches = (x > 0 && src[pos - 1] != 0)
                    || (y > 0 && src[pos - w] != 0)
                    || (x + 1 < w && src[pos + 1] != 0)
                    || (y + 1 < h && src[pos + w] != 0);
                if touches {
                    out[pos] = color;
                }
            }
        }

        self.raster.pixels = out;
    }

    /// Drop shadow one pixel down and right of the opaque area
    pub fn draw_shadow(&mut self, color: u32) {
        let w = self.width();
        let pixels = &mut self.raster.pixels;
        for y in (1..self.raster.height).rev() {
            let row = y * w;
            for x in (1..w).rev() {
                if pixels[row + x] == 0 && pixels[row + x - 1 - w] != 0 {
                    pixels[row + x] = color;
                }
            }
        }
    }

    /// Copy the opaque pixels of `self` onto `target` at `(x, y)`, clipped
    pub fn draw_at_on(&self, target: &mut SpritePixels, x: i32, y: i32) {
        for sy in 0..self.height() {
            let ty = sy as i32 + y;
            if ty < 0 || ty >= target.height() as i32 {
                continue;
            }
            for sx in 0..self.width() {
                let tx = sx as i32 + x;
                if tx < 0 || tx >= target.width() as i32 {
                    continue;
                }
                let rgb = self.raster.pixels[sx + sy * self.width()];
                if rgb != 0 {
                    target.set(tx as usize, ty as usize, rgb);
                }
            }
        }
    }

    /// RGBA copy for encoding; empty pixels are fully transparent
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width() as u32, self.height() as u32, |x, y| {
            match self.get(x as usize, y as usize) {
                0 => Rgba([0, 0, 0, 0]),
                rgb => Rgba([(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 255]),
            }
        })
    }
}

impl From<Framebuffer> for SpritePixels {
    fn from(raster: Framebuffer) -> Self {
        Self { raster }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(w: usize, h: usize, x: usize, y: usize) -> SpritePixels {
        let mut sprite = SpritePixels::new(w, h);
        sprite.set(x, y, 0xAA0000);
        sprite
    }

    fn count(sprite: &SpritePixels, rgb: u32) -> usize {
        sprite.pixels().iter().filter(|&&p| p == rgb).count()
    }

    #[test]
    fn test_border_is_four_connected() {
        let mut sprite = dot(5, 5, 2, 2);
        sprite.draw_border(1);
        assert_eq!(count(&sprite, 1), 4);
        assert_eq!(sprite.get(2, 1), 1);
        assert_eq!(sprite.get(1, 2), 1);
        assert_eq!(sprite.get(1, 1), 0);
        assert_eq!(sprite.get(2, 2), 0xAA0000);
    }

    #[test]
    fn test_border_does_not_grow_twice() {
        let mut sprite = dot(7, 7, 3, 3);
        sprite.draw_border(1);
        sprite.draw_border(0xFFFFFF);
        // Second ring surrounds the first
        assert_eq!(count(&sprite, 1), 4);
        assert_eq!(count(&sprite, 0xFFFFFF), 8);
        assert_eq!(sprite.get(3, 1), 0xFFFFFF);
        assert_eq!(sprite.get(2, 2), 0xFFFFFF);
    }

    #[test]
    fn test_border_at_edges() {
        let mut sprite = dot(3, 3, 0, 0);
        sprite.draw_border(1);
        assert_eq!(count(&sprite, 1), 2);
    }

    #[test]
    fn test_shadow_down_right() {
        let mut sprite = dot(4, 4, 1, 1);
        sprite.draw_shadow(0x333333);
        assert_eq!(sprite.get(2, 2), 0x333333);
        assert_eq!(count(&sprite, 0x333333), 1);
    }

    #[test]
    fn test_shadow_does_not_cascade() {
        let mut sprite = dot(6, 6, 0, 0);
        sprite.draw_shadow(0x333333);
        assert_eq!(sprite.get(1, 1), 0x333333);
        assert_eq!(sprite.get(2, 2), 0);
    }

    #[test]
    fn test_draw_at_on_skips_transparent_and_clips() {
        let mut target = SpritePixels::new(4, 4);
        target.raster_mut().clear(0x00FF00);
        let overlay = dot(4, 4, 3, 3);

        overlay.draw_at_on(&mut target, 0, 0);
        assert_eq!(target.get(3, 3), 0xAA0000);
        assert_eq!(target.get(0, 0), 0x00FF00);

        overlay.draw_at_on(&mut target, -3, -3);
        assert_eq!(target.get(0, 0), 0xAA0000);

        // Entirely off the target
        overlay.draw_at_on(&mut target, 10, 10);
        assert_eq!(count(&target, 0xAA0000), 2);
    }

    #[test]
    fn test_to_image_transparency() {
        let image = dot(2, 1, 1, 0).to_image();
        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(image.get_pixel(1, 0), &Rgba([0xAA, 0, 0, 255]));
    }
}
