//! Triangle rasterization
//!
//! Scanline fill in 16.16 fixed point. Every attribute (packed HSL, texture
//! coordinates, lighting intensity) is interpolated affinely from a plane
//! gradient evaluated at integer pixel corners, so the output only depends
//! on integer inputs.
//!
//! Coverage rule: rows `[y_top, y_bottom)` and, per row, columns
//! `[x_left >> 16, x_right >> 16)` of the two active edges.

use super::color::Palette;
use super::types::Texture;

/// Software framebuffer of `0xRRGGBB` pixels; 0 means "nothing drawn"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pub pixels: Vec<u32>,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height],
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> u32 {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            0
        }
    }
}

/// Projected triangle in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenTriangle {
    pub xs: [i32; 3],
    pub ys: [i32; 3],
}

impl ScreenTriangle {
    pub fn new(a: (i32, i32), b: (i32, i32), c: (i32, i32)) -> Self {
        Self {
            xs: [a.0, b.0, c.0],
            ys: [a.1, b.1, c.1],
        }
    }

    /// Twice the signed area; positive when the winding faces the camera
    pub fn orientation(&self) -> i64 {
        let [x1, x2, x3] = self.xs.map(|v| v as i64);
        let [y1, y2, y3] = self.ys.map(|v| v as i64);
        (x1 - x2) * (y3 - y2) - (x3 - x2) * (y1 - y2)
    }
}

/// Linear attribute over a triangle, in 16 fractional bits
#[derive(Debug, Clone, Copy)]
struct Gradient {
    origin: i64,
    dx: i64,
    dy: i64,
    x0: i64,
    y0: i64,
    min: i64,
    max: i64,
}

impl Gradient {
    /// `None` for zero-area triangles
    fn new(tri: &ScreenTriangle, values: [i64; 3]) -> Option<Self> {
        let [x0, x1, x2] = tri.xs.map(|v| v as i64);
        let [y0, y1, y2] = tri.ys.map(|v| v as i64);
        let det = (x1 - x0) * (y2 - y0) - (x2 - x0) * (y1 - y0);
        if det == 0 {
            return None;
        }
        let dc1 = values[1] - values[0];
        let dc2 = values[2] - values[0];
        let dx = ((dc1 * (y2 - y0) - dc2 * (y1 - y0)) << 16) / det;
        let dy = (((x1 - x0) * dc2 - (x2 - x0) * dc1) << 16) / det;
        let min = values.iter().copied().min().unwrap_or(0) << 16;
        let max = values.iter().copied().max().unwrap_or(0) << 16;
        Some(Self {
            origin: values[0] << 16,
            dx,
            dy,
            x0,
            y0,
            min,
            max,
        })
    }

    #[inline]
    fn at(&self, x: i64, y: i64) -> i64 {
        self.origin + (x - self.x0) * self.dx + (y - self.y0) * self.dy
    }

    /// Value clamped to the range spanned by the three vertices
    #[inline]
    fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min, self.max)
    }
}

/// Horizontal run of pixels on one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    y: usize,
    start: usize,
    end: usize,
}

/// Walk the rows covered by a triangle, returning each non-empty span.
///
/// Rows are always clipped to the framebuffer; columns only when `clip`
/// is set (the caller guarantees all vertex x are in range otherwise).
fn spans(tri: &ScreenTriangle, width: usize, height: usize, clip: bool) -> Vec<Span> {
    let mut order = [0usize, 1, 2];
    order.sort_by_key(|&i| tri.ys[i]);
    let (top, mid, bottom) = (order[0], order[1], order[2]);

    let (x0, y0) = (tri.xs[top] as i64, tri.ys[top] as i64);
    let (x1, y1) = (tri.xs[mid] as i64, tri.ys[mid] as i64);
    let (x2, y2) = (tri.xs[bottom] as i64, tri.ys[bottom] as i64);

    if y0 == y2 {
        return Vec::new();
    }

    let slope = |xa: i64, ya: i64, xb: i64, yb: i64| -> i64 {
        if yb == ya {
            0
        } else {
            ((xb - xa) << 16) / (yb - ya)
        }
    };
    let long_slope = slope(x0, y0, x2, y2);
    let upper_slope = slope(x0, y0, x1, y1);
    let lower_slope = slope(x1, y1, x2, y2);

    let first = y0.max(0);
    let last = y2.min(height as i64);
    let mut out = Vec::with_capacity((last - first).max(0) as usize);

    for y in first..last {
        let long_x = (x0 << 16) + (y - y0) * long_slope;
        let short_x = if y < y1 {
            (x0 << 16) + (y - y0) * upper_slope
        } else {
            (x1 << 16) + (y - y1) * lower_slope
        };

        let (left, right) = if long_x < short_x {
            (long_x, short_x)
        } else {
            (short_x, long_x)
        };
        let mut start = left >> 16;
        let mut end = right >> 16;
        if clip {
            start = start.max(0);
            end = end.min(width as i64);
        } else {
            debug_assert!(start >= 0 && end <= width as i64, "unclipped span out of range");
        }
        if start >= end {
            continue;
        }
        out.push(Span {
            y: y as usize,
            start: start as usize,
            end: end as usize,
        });
    }
    out
}

/// Blend `src` over `dst`, where `alpha` is the face transparency (0 = opaque)
#[inline]
pub fn blend(src: u32, dst: u32, alpha: u32) -> u32 {
    let keep = 256 - alpha;
    let src = ((src & 0xFF00FF) * keep >> 8 & 0xFF00FF) + ((src & 0xFF00) * keep >> 8 & 0xFF00);
    src + ((dst & 0xFF00FF) * alpha >> 8 & 0xFF00FF) + ((dst & 0xFF00) * alpha >> 8 & 0xFF00)
}

/// Scale each channel of a texel by a lighting intensity in [0, 127]
#[inline]
fn shade_texel(texel: u32, shade: u32) -> u32 {
    let r = (texel >> 16 & 0xFF) * shade >> 7;
    let g = (texel >> 8 & 0xFF) * shade >> 7;
    let b = (texel & 0xFF) * shade >> 7;
    ((r.min(255) << 16) | (g.min(255) << 8) | b.min(255)).max(1)
}

/// Per-face fill state: target, palette, clip flag and transparency
pub struct TriangleFill<'a> {
    fb: &'a mut Framebuffer,
    palette: &'a Palette,
    /// Column-clip spans (set when any vertex lies outside the framebuffer)
    pub clip: bool,
    /// Face transparency, 0 = opaque
    pub alpha: u8,
}

impl<'a> TriangleFill<'a> {
    pub fn new(fb: &'a mut Framebuffer, palette: &'a Palette) -> Self {
        Self {
            fb,
            palette,
            clip: true,
            alpha: 0,
        }
    }

    pub fn palette(&self) -> &Palette {
        self.palette
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        self.fb
    }

    #[inline]
    fn write(&mut self, index: usize, color: u32) {
        if self.alpha == 0 {
            self.fb.pixels[index] = color;
        } else {
            let dst = self.fb.pixels[index];
            self.fb.pixels[index] = blend(color, dst, self.alpha as u32);
        }
    }

    /// Fill with one solid `0xRRGGBB` color
    pub fn fill_flat(&mut self, tri: &ScreenTriangle, rgb: u32) {
        let width = self.fb.width;
        for span in spans(tri, width, self.fb.height, self.clip) {
            let row = span.y * width;
            if self.alpha == 0 {
                self.fb.pixels[row + span.start..row + span.end].fill(rgb);
            } else {
                for x in span.start..span.end {
                    self.write(row + x, rgb);
                }
            }
        }
    }

    /// Interpolate three packed HSL colors, decoding each pixel through the palette
    pub fn fill_gouraud(&mut self, tri: &ScreenTriangle, hsl: [i32; 3]) {
        if hsl[0] == hsl[1] && hsl[1] == hsl[2] {
            let rgb = self.palette.get(hsl[0] as u16);
            self.fill_flat(tri, rgb);
            return;
        }
        let Some(color) = Gradient::new(tri, hsl.map(|c| c as i64)) else {
            return;
        };

        let width = self.fb.width;
        for span in spans(tri, width, self.fb.height, self.clip) {
            let row = span.y * width;
            let mut c = color.at(span.start as i64, span.y as i64);
            for x in span.start..span.end {
                let packed = (color.clamp(c) >> 16) as u16;
                let rgb = self.palette.get(packed);
                self.write(row + x, rgb);
                c += color.dx;
            }
        }
    }

    /// Affine texture fill.
    ///
    /// `uvs` are 16.16 texture coordinates per vertex, `shades` lighting
    /// intensities per vertex. Texels of value 0 are left undrawn.
    pub fn fill_textured(
        &mut self,
        tri: &ScreenTriangle,
        shades: [i32; 3],
        uvs: [(i32, i32); 3],
        texture: &Texture,
    ) {
        let Some(shade) = Gradient::new(tri, shades.map(|s| s as i64)) else {
            return;
        };
        // Texture coordinates are already fixed point; keep them unclamped so they wrap
        let Some(u) = Gradient::new(tri, uvs.map(|(u, _)| u as i64)) else {
            return;
        };
        let Some(v) = Gradient::new(tri, uvs.map(|(_, v)| v as i64)) else {
            return;
        };

        let width = self.fb.width;
        for span in spans(tri, width, self.fb.height, self.clip) {
            let row = span.y * width;
            let (sx, sy) = (span.start as i64, span.y as i64);
            let mut s = shade.at(sx, sy);
            let mut tu = u.at(sx, sy);
            let mut tv = v.at(sx, sy);
            for x in span.start..span.end {
                let texel = texture.sample_fixed((tu >> 16) as i32, (tv >> 16) as i32);
                if texel != 0 {
                    let intensity = (shade.clamp(s) >> 16).clamp(0, 127) as u32;
                    self.write(row + x, shade_texel(texel, intensity));
                }
                s += shade.dx;
                tu += u.dx;
                tv += v.dx;
            }
        }
    }
}

/// Texture coordinates (16.16) of a face's three vertices, given the
/// texture triangle `p` (origin), `m` (u axis), `n` (v axis) in the same
/// local space. Degenerate texture triangles map everything to (0, 0).
pub fn affine_uvs(p: [i32; 3], m: [i32; 3], n: [i32; 3], face: [[i32; 3]; 3]) -> [(i32, i32); 3] {
    let sub = |a: [i32; 3], b: [i32; 3]| -> [i128; 3] {
        [
            a[0] as i128 - b[0] as i128,
            a[1] as i128 - b[1] as i128,
            a[2] as i128 - b[2] as i128,
        ]
    };
    let cross = |a: [i128; 3], b: [i128; 3]| -> [i128; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    };
    let dot = |a: [i128; 3], b: [i128; 3]| -> i128 { a[0] * b[0] + a[1] * b[1] + a[2] * b[2] };

    let e1 = sub(m, p);
    let e2 = sub(n, p);
    let normal = cross(e1, e2);
    let u_axis = cross(e2, normal);
    let v_axis = cross(e1, normal);
    let u_den = dot(u_axis, e1);
    let v_den = dot(v_axis, e2);

    face.map(|q| {
        if u_den == 0 || v_den == 0 {
            return (0, 0);
        }
        let d = sub(q, p);
        let u = (dot(u_axis, d) << 16) / u_den;
        let v = (dot(v_axis, d) << 16) / v_den;
        (
            u.clamp(i32::MIN as i128, i32::MAX as i128) as i32,
            v.clamp(i32::MIN as i128, i32::MAX as i128) as i32,
        )
    })
}
