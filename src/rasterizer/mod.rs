//! Fixed-point software rasterizer
//!
//! Features:
//! - Affine texture mapping (no perspective correction)
//! - Flat and Gouraud shading through a packed-HSL palette
//! - Per-face transparency
//! - Painter's algorithm only (no depth buffer)
//!
//! # Module Organization
//!
//! - `trig` - sine/cosine tables, 2048 units per turn
//! - `color` - packed HSL codec, brightness, palettes
//! - `types` - Texture and texture lookup
//! - `render` - Framebuffer and triangle fills

pub mod color;
pub mod render;
pub mod trig;
pub mod types;

pub use color::{
    adjust_brightness, palette, palette_for, rgb_to_bgr, Brightness, Hsl16, Hsl24, Palette,
};
pub use render::{affine_uvs, blend, Framebuffer, ScreenTriangle, TriangleFill};
pub use trig::{trig, TrigTables, ANGLE_UNITS};
pub use types::{NoTextures, Texture, TextureProvider, TextureSet};
