//! Wavefront OBJ/MTL writers
//!
//! The model's y and z axes are flipped so -y-up model space becomes the
//! y-up space OBJ viewers expect. Every face gets its own material `m<i>`.

use std::io::Write;

use super::{Material, ModelExport};
use crate::error::Result;

impl ModelExport<'_> {
    /// Write geometry; `mtl_name` is the file name referenced by `mtllib`
    pub fn write_obj<W: Write>(&self, w: &mut W, mtl_name: &str) -> Result<()> {
        let mesh = self.mesh();

        writeln!(w, "mtllib {}", mtl_name)?;
        writeln!(w, "o model{}", self.id())?;

        for i in 0..mesh.vertex_count() {
            let [x, y, z] = mesh.vertex(i);
            writeln!(w, "v {} {} {}", x, -y, -z)?;
        }

        let textured = mesh.face_textures.is_some();
        if textured {
            for uvs in mesh.texture_uvs() {
                for (u, v) in uvs.unwrap_or([(0.0, 0.0); 3]) {
                    writeln!(w, "vt {} {}", u, v)?;
                }
            }
        }

        for normal in mesh.compute_normals().vertex {
            writeln!(w, "vn {} {} {}", normal.x, normal.y, normal.z)?;
        }

        for i in 0..mesh.face_count() {
            let [a, b, c] = mesh.face(i).map(|v| v + 1);
            writeln!(w, "usemtl m{}", i)?;
            if textured {
                let t = i * 3;
                writeln!(w, "f {}/{} {}/{} {}/{}", a, t + 1, b, t + 2, c, t + 3)?;
            } else {
                writeln!(w, "f {} {} {}", a, b, c)?;
            }
            writeln!(w)?;
        }

        Ok(())
    }

    /// Write one material per face
    pub fn write_mtl<W: Write>(&self, w: &mut W) -> Result<()> {
        for (i, face) in self.faces().iter().enumerate() {
            writeln!(w, "newmtl m{}", i)?;
            match &face.material {
                Material::Color { rgb, .. } => {
                    let r = (rgb >> 16 & 0xFF) as f64 / 255.0;
                    let g = (rgb >> 8 & 0xFF) as f64 / 255.0;
                    let b = (rgb & 0xFF) as f64 / 255.0;
                    writeln!(w, "Kd {} {} {}", r, g, b)?;
                }
                Material::Texture { path, .. } => {
                    writeln!(w, "map_Kd {}", path)?;
                }
            }
            let alpha = face.material.alpha();
            if alpha != 0 {
                writeln!(w, "d {}", alpha as f64 / 255.0)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::export::ModelExport;
    use crate::model::Mesh;
    use crate::rasterizer::{NoTextures, Texture, TextureSet};

    fn triangle() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_vertex(0, 0, 0);
        mesh.add_vertex(10, -20, 5);
        mesh.add_vertex(0, -20, 0);
        mesh.add_face(0, 1, 2, 0);
        mesh
    }

    fn obj_text(export: &ModelExport) -> String {
        let mut out = Vec::new();
        export.write_obj(&mut out, "1.mtl").unwrap();
        String::from_utf8(out).unwrap()
    }

    fn mtl_text(export: &ModelExport) -> String {
        let mut out = Vec::new();
        export.write_mtl(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_obj_flips_axes() {
        let mesh = triangle();
        let export = ModelExport::new(1, &mesh, &NoTextures).unwrap();
        let text = obj_text(&export);
        assert!(text.starts_with("mtllib 1.mtl\n"));
        assert!(text.contains("v 10 20 -5\n"));
        assert!(text.contains("usemtl m0\nf 1 2 3\n"));
        assert!(!text.contains("vt "));
        assert_eq!(text.matches("vn ").count(), 3);
    }

    #[test]
    fn test_obj_textured_faces_reference_uvs() {
        let mut mesh = triangle();
        mesh.face_textures = Some(vec![2]);
        let export = ModelExport::new(1, &mesh, &NoTextures).unwrap();
        let text = obj_text(&export);
        assert_eq!(text.matches("vt ").count(), 3);
        assert!(text.contains("vt 0 1\n"));
        assert!(text.contains("f 1/1 2/2 3/3\n"));
    }

    #[test]
    fn test_mtl_color_and_transparency() {
        let mut mesh = triangle();
        mesh.face_alphas = Some(vec![51]);
        let export = ModelExport::new(1, &mesh, &NoTextures).unwrap();
        let text = mtl_text(&export);
        assert!(text.starts_with("newmtl m0\nKd "));
        assert!(text.contains("d 0.2\n"));
    }

    #[test]
    fn test_mtl_texture_map() {
        let mut mesh = triangle();
        mesh.face_textures = Some(vec![2]);
        let mut textures = TextureSet::new();
        textures.insert(Texture::solid(2, 2, 2, 0xFFFFFF));
        let export = ModelExport::new(1, &mesh, &textures).unwrap();
        let text = mtl_text(&export);
        assert!(text.contains("map_Kd textures/2.png\n"));
        assert!(!text.contains("Kd 0"));
        assert!(!text.contains("\nd "));
    }
}
