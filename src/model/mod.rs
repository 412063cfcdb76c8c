//! Model pipeline: lighting, projection, face ordering and drawing
//!
//! A [`Mesh`] is lit once into a [`LitModel`], which can then be drawn any
//! number of times with different cameras. Per-draw scratch (projected
//! vertices) lives in a caller-owned [`RenderContext`] so repeated renders
//! do not reallocate.

pub mod lighting;
pub mod mesh;
pub mod projection;
pub mod sort;

use std::cell::Cell;

use log::{debug, warn};

use crate::rasterizer::{affine_uvs, ScreenTriangle, TextureProvider, TriangleFill};

pub use lighting::{light, shade_hsl, ITEM_LIGHT};
pub use mesh::{FaceNormal, Mesh, Normals, VertexNormal};
pub use projection::{project, Camera, NEAR_DEPTH};
pub use sort::{collect_visible, draw_order, DepthKey, MAX_DIAMETER};

/// Lighting result for one face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceShade {
    /// Not drawn
    Hidden,
    /// One value for the whole face: a packed HSL color for untextured
    /// faces, a lighting intensity for textured ones
    Flat(i32),
    /// One value per vertex
    Smooth([i32; 3]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsKind {
    /// Radius over the xz plane plus height; used for item icons
    Cylinder,
    Sphere,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub kind: BoundsKind,
    pub radius: i32,
    pub diameter: i32,
}

/// Transformed vertex, valid for the most recent [`project`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectedVertex {
    pub screen_x: i32,
    pub screen_y: i32,
    /// Depth relative to the orientation pivot, used for sorting
    pub depth: i32,
    /// Camera-space position, used for texture mapping
    pub local: [i32; 3],
    /// False when the vertex is closer than [`NEAR_DEPTH`]
    pub visible: bool,
}

/// Reusable per-render scratch
#[derive(Debug, Default)]
pub struct RenderContext {
    pub vertices: Vec<ProjectedVertex>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Drawn { faces: usize },
    /// The model is too large to sort; nothing was drawn
    Skipped,
}

/// A mesh with lighting baked into per-face colors.
///
/// Borrows the mesh geometry; any edit to the mesh means lighting it again,
/// so the bounds cache can never go stale.
pub struct LitModel<'m> {
    mesh: &'m Mesh,
    shades: Vec<FaceShade>,
    /// Per face index into `texture_triangles`
    texture_coords: Vec<Option<usize>>,
    texture_triangles: Vec<[u32; 3]>,
    bounds: Cell<Option<Bounds>>,
}

impl<'m> LitModel<'m> {
    pub(crate) fn new(
        mesh: &'m Mesh,
        shades: Vec<FaceShade>,
        texture_coords: Vec<Option<usize>>,
        texture_triangles: Vec<[u32; 3]>,
    ) -> Self {
        Self {
            mesh,
            shades,
            texture_coords,
            texture_triangles,
            bounds: Cell::new(None),
        }
    }

    pub fn mesh(&self) -> &'m Mesh {
        self.mesh
    }

    pub fn face_count(&self) -> usize {
        self.mesh.face_count()
    }

    pub fn shade(&self, face: usize) -> FaceShade {
        self.shades[face]
    }

    pub fn shades(&self) -> &[FaceShade] {
        &self.shades
    }

    pub fn texture_coord(&self, face: usize) -> Option<usize> {
        self.texture_coords[face]
    }

    pub fn texture_triangles(&self) -> &[[u32; 3]] {
        &self.texture_triangles
    }

    pub fn priorities(&self) -> Option<&[u8]> {
        self.mesh.face_priorities.as_deref()
    }

    /// Cached bounds, computing sphere bounds on first use
    pub fn bounds(&self) -> Bounds {
        if let Some(bounds) = self.bounds.get() {
            return bounds;
        }
        let bounds = self.sphere_bounds();
        self.bounds.set(Some(bounds));
        bounds
    }

    /// Switch the cache to cylinder bounds and return them
    pub fn cylinder_bounds(&self) -> Bounds {
        if let Some(bounds) = self.bounds.get() {
            if bounds.kind == BoundsKind::Cylinder {
                return bounds;
            }
        }

        let mesh = self.mesh;
        let mut height = 0i64;
        let mut bottom = 0i64;
        let mut xz = 0i64;
        for i in 0..mesh.vertex_count() {
            let [x, y, z] = mesh.vertex(i).map(|v| v as i64);
            height = height.max(-y);
            bottom = bottom.max(y);
            xz = xz.max(x * x + z * z);
        }
        let xz = round_up_sqrt(xz);
        let radius = round_up_sqrt(xz * xz + height * height);
        let diameter = radius + round_up_sqrt(xz * xz + bottom * bottom);

        let bounds = Bounds {
            kind: BoundsKind::Cylinder,
            radius: radius as i32,
            diameter: diameter as i32,
        };
        self.bounds.set(Some(bounds));
        bounds
    }

    fn sphere_bounds(&self) -> Bounds {
        let mesh = self.mesh;
        let max = (0..mesh.vertex_count())
            .map(|i| {
                let [x, y, z] = mesh.vertex(i).map(|v| v as i64);
                x * x + y * y + z * z
            })
            .max()
            .unwrap_or(0);
        let radius = (max as f64).sqrt().ceil() as i32;
        Bounds {
            kind: BoundsKind::Sphere,
            radius,
            diameter: radius * 2,
        }
    }

    /// Project, sort and rasterize the model into `fill`'s framebuffer.
    ///
    /// Models whose bounding diameter reaches [`MAX_DIAMETER`] are skipped
    /// without touching the framebuffer.
    pub fn render(
        &self,
        ctx: &mut RenderContext,
        camera: &Camera,
        fill: &mut TriangleFill,
        textures: &dyn TextureProvider,
    ) -> RenderOutcome {
        let bounds = self.bounds();
        if bounds.diameter >= MAX_DIAMETER {
            debug!("skipping model with diameter {}", bounds.diameter);
            return RenderOutcome::Skipped;
        }

        project(self, ctx, camera);

        let clip_width = fill.framebuffer().width as i32;
        let keys = collect_visible(self, ctx, clip_width);
        let mut needs_clip = vec![false; self.face_count()];
        for key in &keys {
            needs_clip[key.face] = key.needs_clip;
        }

        let order = draw_order(&keys, self.priorities());
        for &face in &order {
            fill.clip = needs_clip[face];
            self.raster_face(face, ctx, fill, textures);
        }

        debug!(
            "drew {} of {} faces (diameter {})",
            order.len(),
            self.face_count(),
            bounds.diameter
        );
        RenderOutcome::Drawn { faces: order.len() }
    }

    fn raster_face(
        &self,
        face: usize,
        ctx: &RenderContext,
        fill: &mut TriangleFill,
        textures: &dyn TextureProvider,
    ) {
        let [a, b, c] = self.mesh.face(face);
        let (va, vb, vc) = (ctx.vertices[a], ctx.vertices[b], ctx.vertices[c]);
        let tri = ScreenTriangle::new(
            (va.screen_x, va.screen_y),
            (vb.screen_x, vb.screen_y),
            (vc.screen_x, vc.screen_y),
        );
        fill.alpha = self.mesh.alpha(face);

        let values = match self.shades[face] {
            FaceShade::Hidden => return,
            FaceShade::Flat(v) => [v; 3],
            FaceShade::Smooth(v) => v,
        };

        let Some(texture_id) = self.mesh.texture(face) else {
            match self.shades[face] {
                FaceShade::Flat(hsl) => {
                    let rgb = fill.palette().get(hsl as u16);
                    fill.fill_flat(&tri, rgb);
                }
                _ => fill.fill_gouraud(&tri, values),
            }
            return;
        };

        match textures.texture(texture_id) {
            Some(texture) => {
                let corners = [va.local, vb.local, vc.local];
                let uvs = match self.texture_coords[face] {
                    Some(index) => {
                        let [p, m, n] = self.texture_triangles[index];
                        let local = |v: u32| ctx.vertices[v as usize].local;
                        affine_uvs(local(p), local(m), local(n), corners)
                    }
                    None => affine_uvs(va.local, vb.local, vc.local, corners),
                };
                fill.fill_textured(&tri, values, uvs, texture);
            }
            None => {
                // Grey at the lit intensity: hue 0, saturation 0 packs to the bare luminance
                warn!("texture {} not found, drawing face {} untextured", texture_id, face);
                fill.fill_gouraud(&tri, values);
            }
        }
    }
}

fn round_up_sqrt(value: i64) -> i64 {
    ((value as f64).sqrt() + 0.99) as i64
}
