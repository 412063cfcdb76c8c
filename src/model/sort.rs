//! Painter's ordering: depth buckets with priority-class interleaving
//!
//! There is no depth buffer. Faces are drawn back to front by the average
//! depth of their vertices. Models with per-face priorities instead draw
//! classes 0-9 as blocks in ascending order, while the "late" classes 10
//! and 11 are slotted in between blocks wherever their depth says they
//! belong.

use std::cmp::Reverse;

use super::{FaceShade, LitModel, RenderContext};
use crate::rasterizer::ScreenTriangle;

/// Models with a bounding diameter at or above this are not drawn
pub const MAX_DIAMETER: i32 = 1600;

/// Number of priority classes
const PRIORITY_CLASSES: usize = 12;

/// Sort key of one visible face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthKey {
    pub face: usize,
    /// Average vertex depth shifted by the model radius, in `[0, MAX_DIAMETER)`
    pub depth: i32,
    /// A vertex lies outside the clip width
    pub needs_clip: bool,
}

/// Front-facing, drawable faces of the last projection
pub fn collect_visible(model: &LitModel, ctx: &RenderContext, clip_width: i32) -> Vec<DepthKey> {
    let mesh = model.mesh();
    let radius = model.bounds().radius;
    let max_x = clip_width - 1;

    let mut keys = Vec::new();
    for face in 0..mesh.face_count() {
        if model.shade(face) == FaceShade::Hidden {
            continue;
        }
        let [a, b, c] = mesh.face(face).map(|v| ctx.vertices[v]);
        if !(a.visible && b.visible && c.visible) {
            continue;
        }

        let tri = ScreenTriangle::new(
            (a.screen_x, a.screen_y),
            (b.screen_x, b.screen_y),
            (c.screen_x, c.screen_y),
        );
        if tri.orientation() <= 0 {
            continue;
        }

        let needs_clip = tri.xs.iter().any(|&x| x < 0 || x > max_x);
        let depth = (a.depth + b.depth + c.depth) / 3 + radius;
        keys.push(DepthKey {
            face,
            depth: depth.clamp(0, MAX_DIAMETER - 1),
            needs_clip,
        });
    }
    keys
}

/// Face indices in draw order.
///
/// Without priorities: deepest bucket first, face index order within a
/// bucket. With priorities, see the module docs; thresholds for the late
/// queue are the mean depths of classes (1, 2), (3, 4) and (6, 8), checked
/// before classes 0, 3 and 5 respectively.
pub fn draw_order(keys: &[DepthKey], priorities: Option<&[u8]>) -> Vec<usize> {
    let mut sorted = keys.to_vec();
    sorted.sort_by_key(|k| (Reverse(k.depth), k.face));

    let Some(priorities) = priorities else {
        return sorted.iter().map(|k| k.face).collect();
    };

    let mut classes: [Vec<DepthKey>; PRIORITY_CLASSES] = Default::default();
    for key in sorted {
        let class = (priorities[key.face] as usize).min(PRIORITY_CLASSES - 1);
        classes[class].push(key);
    }

    let mean = |x: usize, y: usize| -> i32 {
        let count = classes[x].len() + classes[y].len();
        if count == 0 {
            return 0;
        }
        let sum: i64 = classes[x].iter().chain(&classes[y]).map(|k| k.depth as i64).sum();
        (sum / count as i64) as i32
    };
    let thresholds = [(0, mean(1, 2)), (3, mean(3, 4)), (5, mean(6, 8))];

    let late: Vec<DepthKey> = classes[10].iter().chain(&classes[11]).copied().collect();
    let mut late = late.into_iter().peekable();

    let mut order = Vec::with_capacity(keys.len());
    for (class, faces) in classes.iter().enumerate().take(10) {
        if let Some(&(_, threshold)) = thresholds.iter().find(|(c, _)| *c == class) {
            while let Some(key) = late.next_if(|k| k.depth > threshold) {
                order.push(key.face);
            }
        }
        order.extend(faces.iter().map(|k| k.face));
    }
    order.extend(late.map(|k| k.face));
    order
}
