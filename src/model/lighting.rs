//! Bake a fixed directional light into per-face colors

use super::mesh::{render_type, Mesh};
use super::{FaceShade, LitModel};
use crate::error::Result;

/// Light direction used for inventory icons
pub const ITEM_LIGHT: [i32; 3] = [-50, -10, -50];

/// Packed color of flat-black faces
const FLAT_BLACK_HSL: i32 = 128;

/// Scale the luminance bits of a packed HSL color by `intensity / 128`
#[inline]
pub fn shade_hsl(hsl: i32, intensity: i32) -> i32 {
    (hsl & 0xFF80) + clamp_intensity(((hsl & 0x7F) * intensity) >> 7)
}

#[inline]
fn clamp_intensity(value: i32) -> i32 {
    value.clamp(2, 126)
}

/// Integer division where a zero divisor contributes nothing
#[inline]
fn diffuse(dot: i32, divisor: i32) -> i32 {
    if divisor == 0 {
        0
    } else {
        dot / divisor
    }
}

/// Light a mesh with one directional light.
///
/// `ambient` is added to every diffuse term; `contrast` scales the light
/// magnitude into the attenuation divisor. Untextured faces get packed HSL
/// colors, textured faces get lighting intensities in `2..=126`.
pub fn light(mesh: &Mesh, ambient: i32, contrast: i32, direction: [i32; 3]) -> Result<LitModel<'_>> {
    mesh.validate()?;
    let normals = mesh.compute_normals();

    let [lx, ly, lz] = direction;
    let magnitude = ((lx * lx + ly * ly + lz * lz) as f64).sqrt() as i32;
    let attenuation = magnitude * contrast >> 8;

    let (texture_coords, texture_triangles) = compact_texture_triangles(mesh);

    let shades = (0..mesh.face_count())
        .map(|face| {
            let kind = match mesh.alpha(face) {
                254 => render_type::FLAT_BLACK,
                255 => render_type::HIDDEN,
                _ => mesh.render_type(face),
            };
            let textured = mesh.texture(face).is_some();

            let vertex_term = |v: usize| {
                let n = normals.vertex[v];
                diffuse(lx * n.x + ly * n.y + lz * n.z, attenuation * n.magnitude) + ambient
            };
            let face_term = || {
                let n = normals.face[face].unwrap_or_default();
                diffuse(lx * n.x + ly * n.y + lz * n.z, attenuation / 2 + attenuation) + ambient
            };

            match (textured, kind) {
                (false, render_type::SMOOTH) => {
                    let color = mesh.face_colors[face] as i32;
                    FaceShade::Smooth(mesh.face(face).map(|v| shade_hsl(color, vertex_term(v))))
                }
                (false, render_type::FLAT) => {
                    FaceShade::Flat(shade_hsl(mesh.face_colors[face] as i32, face_term()))
                }
                (false, render_type::FLAT_BLACK) => FaceShade::Flat(FLAT_BLACK_HSL),
                (true, render_type::SMOOTH) => {
                    FaceShade::Smooth(mesh.face(face).map(|v| clamp_intensity(vertex_term(v))))
                }
                (true, render_type::FLAT) => FaceShade::Flat(clamp_intensity(face_term())),
                _ => FaceShade::Hidden,
            }
        })
        .collect();

    Ok(LitModel::new(mesh, shades, texture_coords, texture_triangles))
}

/// Keep only texture triangles referenced by some face and mapped with
/// render type 0, re-indexing the per-face references.
fn compact_texture_triangles(mesh: &Mesh) -> (Vec<Option<usize>>, Vec<[u32; 3]>) {
    let faces = mesh.face_count();
    if mesh.texture_triangles.is_empty() || mesh.texture_coords.is_none() {
        return (vec![None; faces], Vec::new());
    }

    let mut used = vec![false; mesh.texture_triangles.len()];
    for face in 0..faces {
        if let Some(coord) = mesh.texture_coord(face) {
            used[coord] = true;
        }
    }

    let mut remap = vec![None; used.len()];
    let mut triangles = Vec::new();
    for (i, &is_used) in used.iter().enumerate() {
        if is_used && mesh.texture_render_types[i] == 0 {
            remap[i] = Some(triangles.len());
            triangles.push(mesh.texture_triangles[i]);
        }
    }

    let coords = (0..faces)
        .map(|face| mesh.texture_coord(face).and_then(|c| remap[c]))
        .collect();
    (coords, triangles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;

    /// Two triangles in the x/y plane facing -z (towards the light)
    fn panel() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_vertex(0, 0, 0);
        mesh.add_vertex(100, 0, 0);
        mesh.add_vertex(100, -100, 0);
        mesh.add_vertex(0, -100, 0);
        mesh.add_face(0, 1, 2, 0x1040);
        mesh.add_face(0, 2, 3, 0x1040);
        mesh
    }

    #[test]
    fn test_shade_hsl_keeps_hue_and_saturation() {
        assert_eq!(shade_hsl(0xFFFF, 128), 0xFF80 + 126);
        assert_eq!(shade_hsl(0x1040, 128), 0x1040);
        assert_eq!(shade_hsl(0x1040, 64), 0x1000 + 32);
        // Clamped at both ends
        assert_eq!(shade_hsl(0x1040, 0), 0x1000 + 2);
        assert_eq!(shade_hsl(0x1040, -500), 0x1000 + 2);
    }

    #[test]
    fn test_smooth_faces_get_vertex_colors() {
        let mesh = panel();
        let lit = light(&mesh, 64, 768, ITEM_LIGHT).unwrap();
        // |light| = sqrt(5100) = 71, attenuation = 71 * 768 >> 8 = 213.
        // Vertices 0 and 2 sum two face normals: n = (0, 0, -512), magnitude 2.
        let shared = 0x1000 + ((0x40 * (25600 / 426 + 64)) >> 7);
        let single = 0x1000 + ((0x40 * (12800 / 213 + 64)) >> 7);
        assert_eq!(single, 4158);
        match lit.shade(0) {
            FaceShade::Smooth([a, b, c]) => {
                assert_eq!(a, shared);
                assert_eq!(b, single);
                assert_eq!(c, shared);
            }
            other => panic!("expected smooth shade, got {:?}", other),
        }
    }

    #[test]
    fn test_flat_face_uses_face_normal() {
        let mut mesh = panel();
        mesh.face_render_types = Some(vec![1, 1]);
        let lit = light(&mesh, 64, 768, ITEM_LIGHT).unwrap();
        // divisor 213 / 2 + 213 = 319
        let expected = 0x1000 + ((0x40 * (12800 / 319 + 64)) >> 7);
        assert_eq!(expected, 4148);
        assert_eq!(lit.shade(0), FaceShade::Flat(expected));
    }

    #[test]
    fn test_alpha_overrides_render_type() {
        let mut mesh = panel();
        mesh.face_alphas = Some(vec![255, 254]);
        let lit = light(&mesh, 64, 768, ITEM_LIGHT).unwrap();
        assert_eq!(lit.shade(0), FaceShade::Hidden);
        assert_eq!(lit.shade(1), FaceShade::Flat(128));
    }

    #[test]
    fn test_textured_faces_get_intensities() {
        let mut mesh = panel();
        mesh.face_textures = Some(vec![3, 3]);
        mesh.face_render_types = Some(vec![0, 3]);
        let lit = light(&mesh, 64, 768, ITEM_LIGHT).unwrap();
        match lit.shade(0) {
            FaceShade::Smooth(values) => assert!(values.iter().all(|v| (2..=126).contains(v))),
            other => panic!("expected smooth shade, got {:?}", other),
        }
        // Flat black has no textured form
        assert_eq!(lit.shade(1), FaceShade::Hidden);
    }

    #[test]
    fn test_zero_contrast_is_ambient_only() {
        let mesh = panel();
        let lit = light(&mesh, 100, 0, ITEM_LIGHT).unwrap();
        let expected = 0x1000 + ((0x40 * 100) >> 7);
        assert_eq!(lit.shade(0), FaceShade::Smooth([expected; 3]));
    }

    #[test]
    fn test_texture_triangles_compacted() {
        let mut mesh = panel();
        mesh.face_textures = Some(vec![1, 1]);
        mesh.texture_coords = Some(vec![2, -1]);
        mesh.texture_triangles = vec![[0, 1, 2], [0, 1, 3], [1, 2, 3]];
        mesh.texture_render_types = vec![0, 0, 0];
        let lit = light(&mesh, 64, 768, ITEM_LIGHT).unwrap();
        assert_eq!(lit.texture_triangles(), &[[1, 2, 3]]);
        assert_eq!(lit.texture_coord(0), Some(0));
        assert_eq!(lit.texture_coord(1), None);

        mesh.texture_render_types = vec![0, 0, 1];
        let lit = light(&mesh, 64, 768, ITEM_LIGHT).unwrap();
        assert!(lit.texture_triangles().is_empty());
        assert_eq!(lit.texture_coord(0), None);
    }

    #[test]
    fn test_invalid_mesh_rejected() {
        let mut mesh = panel();
        mesh.faces_c[1] = 40;
        assert!(matches!(
            light(&mesh, 64, 768, ITEM_LIGHT),
            Err(RenderError::InvalidGeometry(_))
        ));
    }
}
