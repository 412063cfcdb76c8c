//! Raw model geometry as decoded from the asset archive
//!
//! Coordinates are model-local integers with -y pointing up. Faces are
//! triangles stored as three parallel index arrays; every per-face
//! attribute array is optional and, when present, has one entry per face.

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// Highest face priority class
pub const MAX_PRIORITY: u8 = 11;

/// Render type values understood by the lighting stage
pub mod render_type {
    /// Per-vertex (Gouraud) lighting
    pub const SMOOTH: u8 = 0;
    /// One lighting value per face
    pub const FLAT: u8 = 1;
    /// Not drawn
    pub const HIDDEN: u8 = 2;
    /// Drawn with a fixed dark flat color
    pub const FLAT_BLACK: u8 = 3;
}

/// Per-vertex normal accumulated from adjacent smooth faces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexNormal {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    /// Number of faces summed into this normal
    pub magnitude: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaceNormal {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Normals derived from a mesh; recomputed after any geometry edit
#[derive(Debug, Clone, Default)]
pub struct Normals {
    pub vertex: Vec<VertexNormal>,
    pub face: Vec<Option<FaceNormal>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices_x: Vec<i32>,
    pub vertices_y: Vec<i32>,
    pub vertices_z: Vec<i32>,

    pub faces_a: Vec<u32>,
    pub faces_b: Vec<u32>,
    pub faces_c: Vec<u32>,
    /// Packed HSL16 per face
    pub face_colors: Vec<u16>,

    #[serde(default)]
    pub face_render_types: Option<Vec<u8>>,
    /// Priority class per face (0-11); absent means pure depth sorting
    #[serde(default)]
    pub face_priorities: Option<Vec<u8>>,
    /// Transparency per face; 0 = opaque, 254/255 are render type overrides
    #[serde(default)]
    pub face_alphas: Option<Vec<u8>>,
    /// Texture id per face, -1 = untextured
    #[serde(default)]
    pub face_textures: Option<Vec<i16>>,
    /// Index into `texture_triangles` per face, -1 = map onto the face itself
    #[serde(default)]
    pub texture_coords: Option<Vec<i16>>,

    /// Texture-space triangles (P, M, N vertex indices)
    #[serde(default)]
    pub texture_triangles: Vec<[u32; 3]>,
    #[serde(default)]
    pub texture_render_types: Vec<u8>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, x: i32, y: i32, z: i32) -> usize {
        self.vertices_x.push(x);
        self.vertices_y.push(y);
        self.vertices_z.push(z);
        self.vertices_x.len() - 1
    }

    /// Add a face and return its index
    pub fn add_face(&mut self, a: u32, b: u32, c: u32, color: u16) -> usize {
        self.faces_a.push(a);
        self.faces_b.push(b);
        self.faces_c.push(c);
        self.face_colors.push(color);
        self.faces_a.len() - 1
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices_x.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces_a.len()
    }

    #[inline]
    pub fn vertex(&self, i: usize) -> [i32; 3] {
        [self.vertices_x[i], self.vertices_y[i], self.vertices_z[i]]
    }

    #[inline]
    pub fn face(&self, i: usize) -> [usize; 3] {
        [
            self.faces_a[i] as usize,
            self.faces_b[i] as usize,
            self.faces_c[i] as usize,
        ]
    }

    pub fn render_type(&self, face: usize) -> u8 {
        self.face_render_types.as_ref().map_or(0, |t| t[face])
    }

    pub fn alpha(&self, face: usize) -> u8 {
        self.face_alphas.as_ref().map_or(0, |a| a[face])
    }

    pub fn texture(&self, face: usize) -> Option<u16> {
        self.face_textures
            .as_ref()
            .and_then(|t| u16::try_from(t[face]).ok())
    }

    pub fn texture_coord(&self, face: usize) -> Option<usize> {
        self.texture_coords
            .as_ref()
            .and_then(|t| usize::try_from(t[face]).ok())
    }

    /// Check array lengths and index ranges.
    ///
    /// Every render entry point runs this first; nothing is drawn for a
    /// mesh that fails.
    pub fn validate(&self) -> Result<()> {
        let vertices = self.vertex_count();
        if self.vertices_y.len() != vertices || self.vertices_z.len() != vertices {
            return Err(RenderError::InvalidGeometry(format!(
                "vertex arrays disagree: x={} y={} z={}",
                vertices,
                self.vertices_y.len(),
                self.vertices_z.len()
            )));
        }

        let faces = self.face_count();
        let per_face = [
            ("faces_b", self.faces_b.len()),
            ("faces_c", self.faces_c.len()),
            ("face_colors", self.face_colors.len()),
            ("face_render_types", self.face_render_types.as_ref().map_or(faces, Vec::len)),
            ("face_priorities", self.face_priorities.as_ref().map_or(faces, Vec::len)),
            ("face_alphas", self.face_alphas.as_ref().map_or(faces, Vec::len)),
            ("face_textures", self.face_textures.as_ref().map_or(faces, Vec::len)),
            ("texture_coords", self.texture_coords.as_ref().map_or(faces, Vec::len)),
        ];
        for (name, len) in per_face {
            if len != faces {
                return Err(RenderError::InvalidGeometry(format!(
                    "{} has {} entries for {} faces",
                    name, len, faces
                )));
            }
        }

        for face in 0..faces {
            if let Some(&index) = self.face(face).iter().find(|&&v| v >= vertices) {
                return Err(RenderError::InvalidGeometry(format!(
                    "face {} references vertex {} of {}",
                    face, index, vertices
                )));
            }
        }

        if let Some(types) = &self.face_render_types {
            if let Some(face) = types.iter().position(|&t| t > render_type::FLAT_BLACK) {
                return Err(RenderError::InvalidGeometry(format!(
                    "face {} has unknown render type {}",
                    face, types[face]
                )));
            }
        }

        if let Some(priorities) = &self.face_priorities {
            if let Some(face) = priorities.iter().position(|&p| p > MAX_PRIORITY) {
                return Err(RenderError::InvalidGeometry(format!(
                    "face {} has priority {} (max {})",
                    face, priorities[face], MAX_PRIORITY
                )));
            }
        }

        if self.texture_render_types.len() != self.texture_triangles.len() {
            return Err(RenderError::InvalidGeometry(format!(
                "{} texture render types for {} texture triangles",
                self.texture_render_types.len(),
                self.texture_triangles.len()
            )));
        }
        for (i, tri) in self.texture_triangles.iter().enumerate() {
            if tri.iter().any(|&v| v as usize >= vertices) {
                return Err(RenderError::InvalidGeometry(format!(
                    "texture triangle {} references a vertex out of range",
                    i
                )));
            }
        }
        for face in 0..faces {
            if let Some(coord) = self.texture_coord(face) {
                if coord >= self.texture_triangles.len() {
                    return Err(RenderError::InvalidGeometry(format!(
                        "face {} uses texture triangle {} of {}",
                        face,
                        coord,
                        self.texture_triangles.len()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Scale each axis by `n / 128`
    pub fn resize(&mut self, x: i32, y: i32, z: i32) {
        for v in &mut self.vertices_x {
            *v = *v * x / 128;
        }
        for v in &mut self.vertices_y {
            *v = *v * y / 128;
        }
        for v in &mut self.vertices_z {
            *v = *v * z / 128;
        }
    }

    pub fn recolor(&mut self, find: u16, replace: u16) {
        for color in &mut self.face_colors {
            if *color == find {
                *color = replace;
            }
        }
    }

    pub fn retexture(&mut self, find: i16, replace: i16) {
        if let Some(textures) = &mut self.face_textures {
            for texture in textures.iter_mut() {
                if *texture == find {
                    *texture = replace;
                }
            }
        }
    }

    /// Face normals scaled to length 256, summed into vertex normals for
    /// smooth faces and kept per face for flat ones.
    pub fn compute_normals(&self) -> Normals {
        let mut vertex = vec![VertexNormal::default(); self.vertex_count()];
        let mut face = vec![None; self.face_count()];

        for i in 0..self.face_count() {
            let [a, b, c] = self.face(i);
            let [ax, ay, az] = self.vertex(a).map(|v| v as i64);
            let [bx, by, bz] = self.vertex(b).map(|v| v as i64);
            let [cx, cy, cz] = self.vertex(c).map(|v| v as i64);

            let (x1, y1, z1) = (bx - ax, by - ay, bz - az);
            let (x2, y2, z2) = (cx - ax, cy - ay, cz - az);

            let mut nx = y1 * z2 - y2 * z1;
            let mut ny = z1 * x2 - z2 * x1;
            let mut nz = x1 * y2 - x2 * y1;

            while nx > 8192 || ny > 8192 || nz > 8192 || nx < -8192 || ny < -8192 || nz < -8192 {
                nx >>= 1;
                ny >>= 1;
                nz >>= 1;
            }

            let mut length = ((nx * nx + ny * ny + nz * nz) as f64).sqrt() as i64;
            if length <= 0 {
                length = 1;
            }
            let nx = (nx * 256 / length) as i32;
            let ny = (ny * 256 / length) as i32;
            let nz = (nz * 256 / length) as i32;

            match self.render_type(i) {
                render_type::SMOOTH => {
                    for v in [a, b, c] {
                        let n = &mut vertex[v];
                        n.x += nx;
                        n.y += ny;
                        n.z += nz;
                        n.magnitude += 1;
                    }
                }
                render_type::FLAT => {
                    face[i] = Some(FaceNormal { x: nx, y: ny, z: nz });
                }
                _ => {}
            }
        }

        Normals { vertex, face }
    }

    /// Largest height above the origin (the most negative y, negated)
    pub fn max_height(&self) -> i32 {
        self.vertices_y.iter().map(|&y| -y).max().unwrap_or(0).max(0)
    }

    /// Per-face texture coordinates for export, `None` for untextured faces.
    ///
    /// Faces without a texture triangle get the default mapping; texture
    /// triangles of render type 0 are projected onto planar P/M/N axes.
    /// Other render types are not mapped and leave the coordinates at 0.
    pub fn texture_uvs(&self) -> Vec<Option<[(f32, f32); 3]>> {
        (0..self.face_count())
            .map(|i| {
                self.texture(i)?;
                let Some(coord) = self.texture_coord(i) else {
                    return Some([(0.0, 1.0), (1.0, 1.0), (0.0, 0.0)]);
                };
                if self.texture_render_types.get(coord).copied().unwrap_or(0) != 0 {
                    return Some([(0.0, 0.0); 3]);
                }

                let [p, m, n] = self.texture_triangles[coord].map(|v| v as usize);
                let origin = self.vertex(p).map(|v| v as f32);
                let rel = |v: usize| {
                    let q = self.vertex(v);
                    [
                        q[0] as f32 - origin[0],
                        q[1] as f32 - origin[1],
                        q[2] as f32 - origin[2],
                    ]
                };
                let e1 = rel(m);
                let e2 = rel(n);
                let normal = cross(e1, e2);

                let u_axis = cross(e2, normal);
                let u_scale = 1.0 / dot(u_axis, e1);
                let v_axis = cross(e1, normal);
                let v_scale = 1.0 / dot(v_axis, e2);

                let corners = self.face(i).map(rel);
                Some(corners.map(|d| (dot(u_axis, d) * u_scale, dot(v_axis, d) * v_scale)))
            })
            .collect()
    }
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit quad in the x/y plane, two faces
    fn quad() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_vertex(0, 0, 0);
        mesh.add_vertex(100, 0, 0);
        mesh.add_vertex(100, -100, 0);
        mesh.add_vertex(0, -100, 0);
        mesh.add_face(0, 1, 2, 100);
        mesh.add_face(0, 2, 3, 200);
        mesh
    }

    #[test]
    fn test_validate_accepts_quad() {
        assert!(quad().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_index() {
        let mut mesh = quad();
        mesh.add_face(0, 1, 9, 0);
        assert!(matches!(mesh.validate(), Err(RenderError::InvalidGeometry(_))));
    }

    #[test]
    fn test_validate_rejects_length_mismatch() {
        let mut mesh = quad();
        mesh.face_priorities = Some(vec![0]);
        assert!(mesh.validate().is_err());

        let mut mesh = quad();
        mesh.vertices_z.pop();
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_priority_out_of_range() {
        let mut mesh = quad();
        mesh.face_priorities = Some(vec![0, 12]);
        assert!(mesh.validate().is_err());
        mesh.face_priorities = Some(vec![11, 0]);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_dangling_texture_coord() {
        let mut mesh = quad();
        mesh.face_textures = Some(vec![1, -1]);
        mesh.texture_coords = Some(vec![0, -1]);
        assert!(mesh.validate().is_err());
        mesh.texture_triangles.push([0, 1, 3]);
        mesh.texture_render_types.push(0);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_resize_recolor_retexture() {
        let mut mesh = quad();
        mesh.face_textures = Some(vec![5, -1]);
        mesh.resize(256, 64, 128);
        assert_eq!(mesh.vertex(2), [200, -50, 0]);

        mesh.recolor(200, 300);
        assert_eq!(mesh.face_colors, vec![100, 300]);

        mesh.retexture(5, 6);
        assert_eq!(mesh.texture(0), Some(6));
        assert_eq!(mesh.texture(1), None);
    }

    #[test]
    fn test_smooth_normals_accumulate() {
        let normals = quad().compute_normals();
        // Both faces point along -z with length 256
        assert_eq!(normals.vertex[0], VertexNormal { x: 0, y: 0, z: -512, magnitude: 2 });
        assert_eq!(normals.vertex[1].magnitude, 1);
        assert!(normals.face.iter().all(Option::is_none));
    }

    #[test]
    fn test_flat_normals_stay_per_face() {
        let mut mesh = quad();
        mesh.face_render_types = Some(vec![1, 2]);
        let normals = mesh.compute_normals();
        assert_eq!(normals.face[0], Some(FaceNormal { x: 0, y: 0, z: -256 }));
        assert_eq!(normals.face[1], None);
        assert_eq!(normals.vertex[0].magnitude, 0);
    }

    #[test]
    fn test_large_faces_normalise() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(0, 0, 0);
        mesh.add_vertex(30000, 0, 0);
        mesh.add_vertex(0, 0, 30000);
        mesh.add_face(0, 1, 2, 0);
        let n = mesh.compute_normals().vertex[0];
        assert_eq!((n.x, n.y.abs(), n.z), (0, 256, 0));
    }

    #[test]
    fn test_max_height() {
        assert_eq!(quad().max_height(), 100);
        assert_eq!(Mesh::new().max_height(), 0);
    }

    #[test]
    fn test_texture_uvs() {
        let mut mesh = quad();
        mesh.face_textures = Some(vec![3, 3]);
        mesh.texture_coords = Some(vec![-1, 0]);
        mesh.texture_triangles.push([0, 1, 3]);
        mesh.texture_render_types.push(0);

        let uvs = mesh.texture_uvs();
        assert_eq!(uvs[0], Some([(0.0, 1.0), (1.0, 1.0), (0.0, 0.0)]));
        let [a, b, c] = uvs[1].unwrap();
        assert_eq!(a, (0.0, 0.0));
        assert!((b.0 - 1.0).abs() < 1e-6 && (b.1 - 1.0).abs() < 1e-6);
        assert!(c.0.abs() < 1e-6 && (c.1 - 1.0).abs() < 1e-6);
    }
}
