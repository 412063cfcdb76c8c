//! Model export: per-face materials, Wavefront OBJ/MTL text and catalogue
//! entries (height plus dominant colors) for external tooling.

mod obj;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::Mesh;
use crate::rasterizer::{adjust_brightness, rgb_to_bgr, Brightness, Hsl16, TextureProvider};

/// Brightness every exported color is decoded with
const EXPORT_BRIGHTNESS: Brightness = Brightness::Max;

/// Relative path a textured material points at
pub fn texture_path(id: u16) -> String {
    format!("textures/{}.png", id)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Color { rgb: u32, alpha: u8 },
    Texture { id: u16, path: String, alpha: u8 },
}

impl Material {
    pub fn alpha(&self) -> u8 {
        match self {
            Material::Color { alpha, .. } | Material::Texture { alpha, .. } => *alpha,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportFace {
    pub vertices: [usize; 3],
    pub material: Material,
}

/// Catalogue record for one model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    /// Footprint width, footprint length, height
    pub size: [i32; 3],
    /// Distinct face colors as `0xBBGGRR`
    pub colors: Vec<u32>,
}

/// Read-only view of a mesh for export
pub struct ModelExport<'a> {
    id: u32,
    mesh: &'a Mesh,
    textures: &'a dyn TextureProvider,
}

impl<'a> ModelExport<'a> {
    pub fn new(id: u32, mesh: &'a Mesh, textures: &'a dyn TextureProvider) -> Result<Self> {
        mesh.validate()?;
        Ok(Self { id, mesh, textures })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn mesh(&self) -> &'a Mesh {
        self.mesh
    }

    /// Faces with their materials; textured faces whose texture cannot be
    /// found fall back to their packed color.
    pub fn faces(&self) -> Vec<ExportFace> {
        (0..self.mesh.face_count())
            .map(|i| ExportFace {
                vertices: self.mesh.face(i),
                material: self.material(i),
            })
            .collect()
    }

    fn material(&self, face: usize) -> Material {
        let alpha = self.mesh.alpha(face);
        if let Some(id) = self.mesh.texture(face) {
            if self.textures.texture(id).is_some() {
                return Material::Texture {
                    id,
                    path: texture_path(id),
                    alpha,
                };
            }
            warn!(
                "model {} face {}: texture {} not found, exporting its color",
                self.id, face, id
            );
        }
        Material::Color {
            rgb: Hsl16(self.mesh.face_colors[face]).to_rgb(EXPORT_BRIGHTNESS.exponent()),
            alpha,
        }
    }

    /// Height above the origin
    pub fn height(&self) -> i32 {
        self.mesh.max_height()
    }

    /// Distinct colors in first-seen face order, as `0xBBGGRR`.
    ///
    /// Each texture id and each packed color contributes at most once;
    /// textures contribute their brightened average.
    pub fn colors(&self) -> Vec<u32> {
        let mut colors = Vec::new();
        let mut seen_textures = Vec::new();
        let mut seen_hsl = Vec::new();

        for face in 0..self.mesh.face_count() {
            let texture = self
                .mesh
                .texture(face)
                .and_then(|id| self.textures.texture(id).map(|t| (id, t.average_rgb)));

            let rgb = match texture {
                Some((id, average)) => {
                    if seen_textures.contains(&id) {
                        continue;
                    }
                    seen_textures.push(id);
                    adjust_brightness(average, EXPORT_BRIGHTNESS.exponent())
                }
                None => {
                    let hsl = self.mesh.face_colors[face];
                    if seen_hsl.contains(&hsl) {
                        continue;
                    }
                    seen_hsl.push(hsl);
                    Hsl16(hsl).to_rgb(EXPORT_BRIGHTNESS.exponent())
                }
            };

            let bgr = rgb_to_bgr(rgb);
            if !colors.contains(&bgr) {
                colors.push(bgr);
            }
        }
        colors
    }

    /// Catalogue record for an object of the given footprint
    pub fn catalog_entry(&self, name: &str, footprint: [i32; 2]) -> CatalogEntry {
        CatalogEntry {
            name: name.to_string(),
            size: [footprint[0], footprint[1], self.height()],
            colors: self.colors(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{NoTextures, Texture, TextureSet};

    fn strip() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_vertex(0, 0, 0);
        mesh.add_vertex(10, -30, 0);
        mesh.add_vertex(20, 5, 0);
        mesh.add_vertex(30, -10, 0);
        mesh.add_face(0, 1, 2, 1000);
        mesh.add_face(1, 2, 3, 2000);
        mesh.add_face(1, 3, 0, 1000);
        mesh
    }

    #[test]
    fn test_height() {
        let mesh = strip();
        assert_eq!(ModelExport::new(1, &mesh, &NoTextures).unwrap().height(), 30);
    }

    #[test]
    fn test_colors_dedupe_in_face_order() {
        let mesh = strip();
        let export = ModelExport::new(1, &mesh, &NoTextures).unwrap();
        let expected = vec![
            rgb_to_bgr(Hsl16(1000).to_rgb(0.5)),
            rgb_to_bgr(Hsl16(2000).to_rgb(0.5)),
        ];
        assert_eq!(export.colors(), expected);
    }

    #[test]
    fn test_texture_colors_use_average() {
        let mut mesh = strip();
        mesh.face_textures = Some(vec![5, -1, 5]);
        let mut textures = TextureSet::new();
        textures.insert(Texture::solid(5, 4, 4, 0x400000));

        let export = ModelExport::new(1, &mesh, &textures).unwrap();
        let colors = export.colors();
        assert_eq!(colors.len(), 2);
        // sqrt(0.25) -> 0x80 red, stored as BGR
        assert_eq!(colors[0], 0x000080);
    }

    #[test]
    fn test_materials() {
        let mut mesh = strip();
        mesh.face_textures = Some(vec![5, -1, 6]);
        mesh.face_alphas = Some(vec![0, 128, 0]);
        let mut textures = TextureSet::new();
        textures.insert(Texture::solid(5, 2, 2, 0x123456));

        let faces = ModelExport::new(1, &mesh, &textures).unwrap().faces();
        assert_eq!(
            faces[0].material,
            Material::Texture { id: 5, path: "textures/5.png".into(), alpha: 0 }
        );
        assert_eq!(faces[1].material.alpha(), 128);
        assert_eq!(faces[1].vertices, [1, 2, 3]);
        // Unknown texture 6 falls back to the face color
        assert_eq!(
            faces[2].material,
            Material::Color { rgb: Hsl16(1000).to_rgb(0.5), alpha: 0 }
        );
    }

    #[test]
    fn test_catalog_entry_ron() {
        let mesh = strip();
        let export = ModelExport::new(1, &mesh, &NoTextures).unwrap();
        let entry = export.catalog_entry("bench", [2, 1]);
        assert_eq!(entry.size, [2, 1, 30]);

        let text = ron::to_string(&entry).unwrap();
        let back: CatalogEntry = ron::from_str(&text).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_invalid_mesh_rejected() {
        let mut mesh = strip();
        mesh.faces_a[0] = 99;
        assert!(ModelExport::new(1, &mesh, &NoTextures).is_err());
    }
}
