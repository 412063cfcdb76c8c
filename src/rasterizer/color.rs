//! Packed HSL colors and their RGB decode
//!
//! Models store colors as hue/saturation/luminance bit-packed into 16 bits
//! (6/3/7) or, for some definitions, 24 bits (8/8/8). Decoded RGB is always
//! `0xRRGGBB` with 8 bits per channel, and never exactly 0: 0 is reserved
//! for "no pixel" in rasters and sprites.

use std::borrow::Cow;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Brightness exponent applied per channel after decoding.
///
/// Smaller exponents brighten; 1.0 leaves colors untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Brightness {
    Max,
    High,
    Low,
    Min,
    Custom(f64),
}

impl Brightness {
    pub fn exponent(self) -> f64 {
        match self {
            Brightness::Max => 0.5,
            Brightness::High => 0.7,
            Brightness::Low => 0.8,
            Brightness::Min => 0.9,
            Brightness::Custom(e) => e,
        }
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Brightness::Max
    }
}

// Offsets keep hue 0 / saturation 0 away from the degenerate corner
const HUE_OFFSET: f64 = 0.5 / 64.0;
const SATURATION_OFFSET: f64 = 0.5 / 8.0;

/// 16-bit packed HSL: hue 6 bits, saturation 3 bits, luminance 7 bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hsl16(pub u16);

impl Hsl16 {
    pub fn pack(hue: u8, saturation: u8, luminance: u8) -> Self {
        Hsl16(
            ((hue as u16 & 63) << 10) | ((saturation as u16 & 7) << 7) | (luminance as u16 & 127),
        )
    }

    #[inline]
    pub fn hue(self) -> u8 {
        (self.0 >> 10 & 63) as u8
    }

    #[inline]
    pub fn saturation(self) -> u8 {
        (self.0 >> 7 & 7) as u8
    }

    #[inline]
    pub fn luminance(self) -> u8 {
        (self.0 & 127) as u8
    }

    pub fn unpack(self) -> (u8, u8, u8) {
        (self.hue(), self.saturation(), self.luminance())
    }

    /// Debug form, e.g. `21h3s40l`
    pub fn format(self) -> String {
        format!("{:02X}h{:X}s{:02X}l", self.hue(), self.saturation(), self.luminance())
    }

    /// Decode to `0xRRGGBB` with the given brightness exponent
    pub fn to_rgb(self, brightness: f64) -> u32 {
        let hue = self.hue() as f64 / 64.0 + HUE_OFFSET;
        let saturation = self.saturation() as f64 / 8.0 + SATURATION_OFFSET;
        let luminance = self.luminance() as f64 / 128.0;

        let (r, g, b) = hsl_to_channels(hue, saturation, luminance);
        let rgb = (to_byte(r) << 16) | (to_byte(g) << 8) | to_byte(b);

        non_zero(adjust_brightness(rgb, brightness))
    }
}

/// 24-bit packed HSL: 8 bits per component
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hsl24(pub u32);

impl Hsl24 {
    pub fn pack(hue: u8, saturation: u8, luminance: u8) -> Self {
        Hsl24((hue as u32) << 16 | (saturation as u32) << 8 | luminance as u32)
    }

    #[inline]
    pub fn hue(self) -> u8 {
        (self.0 >> 16 & 0xFF) as u8
    }

    #[inline]
    pub fn saturation(self) -> u8 {
        (self.0 >> 8 & 0xFF) as u8
    }

    #[inline]
    pub fn luminance(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub fn unpack(self) -> (u8, u8, u8) {
        (self.hue(), self.saturation(), self.luminance())
    }

    /// Decode without a brightness adjustment
    pub fn to_rgb(self) -> u32 {
        non_zero(self.decode())
    }

    /// Decode, then apply the brightness exponent
    pub fn to_rgb_with(self, brightness: f64) -> u32 {
        non_zero(adjust_brightness(self.decode(), brightness))
    }

    fn decode(self) -> u32 {
        let hue = self.hue() as f64 / 256.0;
        let saturation = self.saturation() as f64 / 256.0;
        let luminance = self.luminance() as f64 / 256.0;

        let (r, g, b) = hsl_to_channels(hue, saturation, luminance);
        ((to_byte(r) & 0xFF) << 16) | ((to_byte(g) & 0xFF) << 8) | (to_byte(b) & 0xFF)
    }
}

/// Standard hue-wheel HSL to RGB, channels in [0, 1)
fn hsl_to_channels(hue: f64, saturation: f64, luminance: f64) -> (f64, f64, f64) {
    let chroma = (1.0 - (2.0 * luminance - 1.0).abs()) * saturation;
    let x = chroma * (1.0 - ((hue * 6.0) % 2.0 - 1.0).abs());
    let lightness = luminance - chroma / 2.0;

    let (mut r, mut g, mut b) = (lightness, lightness, lightness);
    match (hue * 6.0) as i32 {
        0 => {
            r += chroma;
            g += x;
        }
        1 => {
            g += chroma;
            r += x;
        }
        2 => {
            g += chroma;
            b += x;
        }
        3 => {
            b += chroma;
            g += x;
        }
        4 => {
            b += chroma;
            r += x;
        }
        _ => {
            r += chroma;
            b += x;
        }
    }
    (r, g, b)
}

#[inline]
fn to_byte(channel: f64) -> u32 {
    // Negative fractions truncate to 0 like the legacy int cast
    ((channel * 256.0) as i32).max(0) as u32
}

#[inline]
fn non_zero(rgb: u32) -> u32 {
    if rgb == 0 {
        1
    } else {
        rgb
    }
}

/// Raise each channel of `0xRRGGBB` (as a fraction of 256) to `brightness`
pub fn adjust_brightness(rgb: u32, brightness: f64) -> u32 {
    let r = ((rgb >> 16 & 0xFF) as f64 / 256.0).powf(brightness);
    let g = ((rgb >> 8 & 0xFF) as f64 / 256.0).powf(brightness);
    let b = ((rgb & 0xFF) as f64 / 256.0).powf(brightness);
    (to_byte(r) << 16) + (to_byte(g) << 8) + to_byte(b)
}

/// Swap red and blue: `0xRRGGBB` -> `0xBBGGRR`
pub fn rgb_to_bgr(rgb: u32) -> u32 {
    let r = rgb >> 16 & 0xFF;
    let g = rgb >> 8 & 0xFF;
    let b = rgb & 0xFF;
    (b << 16) | (g << 8) | r
}

/// Lookup table from every `Hsl16` value to its decoded RGB
#[derive(Clone)]
pub struct Palette {
    colors: Vec<u32>,
}

impl Palette {
    pub fn new(brightness: f64) -> Self {
        let colors = (0..=u16::MAX)
            .map(|hsl| Hsl16(hsl).to_rgb(brightness))
            .collect();
        Self { colors }
    }

    #[inline]
    pub fn get(&self, hsl: u16) -> u32 {
        self.colors[hsl as usize]
    }
}

static PALETTE_MAX: OnceLock<Palette> = OnceLock::new();
static PALETTE_HIGH: OnceLock<Palette> = OnceLock::new();
static PALETTE_LOW: OnceLock<Palette> = OnceLock::new();
static PALETTE_MIN: OnceLock<Palette> = OnceLock::new();

/// Shared palette for a preset brightness; custom exponents get `None`
/// and must build their own [`Palette`].
pub fn palette(brightness: Brightness) -> Option<&'static Palette> {
    let cell = match brightness {
        Brightness::Max => &PALETTE_MAX,
        Brightness::High => &PALETTE_HIGH,
        Brightness::Low => &PALETTE_LOW,
        Brightness::Min => &PALETTE_MIN,
        Brightness::Custom(_) => return None,
    };
    Some(cell.get_or_init(|| Palette::new(brightness.exponent())))
}

/// Shared palette for presets, a freshly built one for custom exponents
pub fn palette_for(brightness: Brightness) -> Cow<'static, Palette> {
    match palette(brightness) {
        Some(shared) => Cow::Borrowed(shared),
        None => Cow::Owned(Palette::new(brightness.exponent())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels(rgb: u32) -> (u32, u32, u32) {
        (rgb >> 16 & 0xFF, rgb >> 8 & 0xFF, rgb & 0xFF)
    }

    #[test]
    fn test_hsl16_round_trip() {
        for hue in 0..64u8 {
            for saturation in 0..8u8 {
                for luminance in (0..128u8).step_by(7) {
                    let packed = Hsl16::pack(hue, saturation, luminance);
                    assert_eq!(packed.unpack(), (hue, saturation, luminance));
                }
            }
        }
    }

    #[test]
    fn test_hsl24_round_trip() {
        for &(h, s, l) in &[(0u8, 0u8, 0u8), (255, 255, 255), (12, 200, 7), (128, 1, 254)] {
            assert_eq!(Hsl24::pack(h, s, l).unpack(), (h, s, l));
        }
    }

    #[test]
    fn test_pack_masks_out_of_range() {
        assert_eq!(Hsl16::pack(64, 8, 128), Hsl16(0));
    }

    #[test]
    fn test_black_is_never_zero() {
        assert_eq!(Hsl16::pack(0, 0, 0).to_rgb(1.0), 1);
        assert_eq!(Hsl16::pack(0, 0, 0).to_rgb(0.5), 1);
        assert_eq!(Hsl24::pack(0, 0, 0).to_rgb(), 1);
        assert_eq!(Hsl24::pack(0, 0, 0).to_rgb_with(0.9), 1);
        for hsl in (0..=u16::MAX).step_by(97) {
            assert_ne!(Hsl16(hsl).to_rgb(0.7), 0);
        }
    }

    #[test]
    fn test_full_width_gray_without_saturation() {
        for l in [1u8, 40, 128, 200, 255] {
            let (r, g, b) = channels(Hsl24::pack(77, 0, l).to_rgb_with(1.0));
            assert_eq!(r, g);
            assert_eq!(g, b);
        }
    }

    #[test]
    fn test_compact_low_saturation_is_near_gray() {
        // The saturation offset keeps a trace of hue even at saturation 0
        let (r, g, b) = channels(Hsl16::pack(0, 0, 64).to_rgb(1.0));
        assert!(r >= g && g >= b);
        assert!(r - b <= 16, "{} {} {}", r, g, b);
    }

    #[test]
    fn test_brightness_exponent_lightens() {
        let hsl = Hsl16::pack(10, 4, 40);
        let (r1, _, _) = channels(hsl.to_rgb(1.0));
        let (r2, _, _) = channels(hsl.to_rgb(0.5));
        assert!(r2 > r1);
    }

    #[test]
    fn test_adjust_brightness_identity() {
        assert_eq!(adjust_brightness(0x804020, 1.0), 0x804020);
        // sqrt(0.25) = 0.5 -> 128
        assert_eq!(adjust_brightness(0x400000, 0.5) >> 16, 128);
    }

    #[test]
    fn test_rgb_to_bgr() {
        assert_eq!(rgb_to_bgr(0x112233), 0x332211);
        assert_eq!(rgb_to_bgr(0xFF0000), 0x0000FF);
    }

    #[test]
    fn test_format() {
        assert_eq!(Hsl16::pack(0x21, 3, 0x40).format(), "21h3s40l");
    }

    #[test]
    fn test_palette_matches_decode() {
        let p = palette(Brightness::Max).unwrap();
        for hsl in [0u16, 128, 0x7FFF, 0xFFFF, 12345] {
            assert_eq!(p.get(hsl), Hsl16(hsl).to_rgb(0.5));
        }
        assert!(palette(Brightness::Custom(0.6)).is_none());
        assert_eq!(palette_for(Brightness::Custom(0.6)).get(300), Hsl16(300).to_rgb(0.6));
    }
}
