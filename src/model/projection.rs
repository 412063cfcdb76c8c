//! Fixed-point vertex transform and perspective projection

use super::{LitModel, ProjectedVertex, RenderContext};
use crate::rasterizer::trig;

/// Vertices closer than this are not projected; faces using them are culled
pub const NEAR_DEPTH: i32 = 50;

/// Rotation angles are in 1/2048ths of a turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Camera {
    /// Rotation in the y/z plane
    pub pitch: i32,
    /// Rotation in the x/z plane
    pub yaw: i32,
    /// Rotation in the x/y plane
    pub roll: i32,
    /// View tilt applied after the offset
    pub orientation: i32,
    pub offset: [i32; 3],
    pub center: (i32, i32),
    pub zoom: i32,
}

/// Rotate `(a, b)` by `angle`: `a' = a*cos - b*sin`, `b' = a*sin + b*cos`
#[inline]
fn rotate(a: i64, b: i64, angle: i32) -> (i64, i64) {
    let t = trig();
    let (sin, cos) = (t.sin(angle) as i64, t.cos(angle) as i64);
    ((a * cos - b * sin) >> 16, (a * sin + b * cos) >> 16)
}

/// Transform every vertex of `model` into `ctx.vertices`.
///
/// Order: roll, pitch, yaw (each skipped at angle 0), offset, orientation,
/// then divide by depth.
pub fn project(model: &LitModel, ctx: &mut RenderContext, camera: &Camera) {
    let mesh = model.mesh();
    let t = trig();
    let (sin_o, cos_o) = (t.sin(camera.orientation) as i64, t.cos(camera.orientation) as i64);
    let [ox, oy, oz] = camera.offset.map(|v| v as i64);
    let pivot = (sin_o * oy + cos_o * oz) >> 16;

    ctx.vertices.clear();
    ctx.vertices.reserve(mesh.vertex_count());

    for i in 0..mesh.vertex_count() {
        let [mut x, mut y, mut z] = mesh.vertex(i).map(|v| v as i64);

        if camera.roll != 0 {
            (y, x) = rotate(y, x, camera.roll);
        }
        if camera.pitch != 0 {
            (y, z) = rotate(y, z, camera.pitch);
        }
        if camera.yaw != 0 {
            (z, x) = rotate(z, x, camera.yaw);
        }

        x += ox;
        y += oy;
        z += oz;

        let (y, z) = rotate(y, z, camera.orientation);

        let visible = z >= NEAR_DEPTH as i64;
        let (screen_x, screen_y) = if visible {
            let zoom = camera.zoom as i64;
            (
                (x * zoom / z) as i32 + camera.center.0,
                (y * zoom / z) as i32 + camera.center.1,
            )
        } else {
            (0, 0)
        };

        ctx.vertices.push(ProjectedVertex {
            screen_x,
            screen_y,
            depth: (z - pivot) as i32,
            local: [x as i32, y as i32, z as i32],
            visible,
        });
    }
}
