//! In-memory assets shared by the integration tests
#![allow(dead_code)]

use std::collections::HashMap;

use model_raster::model::Mesh;
use model_raster::Result;
use model_raster::rasterizer::{Texture, TextureProvider, TextureSet};
use model_raster::sprite::{ItemDefinition, ItemProvider, ModelProvider};

#[derive(Default)]
pub struct MemoryAssets {
    pub items: HashMap<u32, ItemDefinition>,
    pub models: HashMap<u32, Mesh>,
    pub textures: TextureSet,
}

impl MemoryAssets {
    pub fn add_item(&mut self, item: ItemDefinition) {
        self.items.insert(item.id, item);
    }

    pub fn add_model(&mut self, id: u32, mesh: Mesh) {
        self.models.insert(id, mesh);
    }
}

impl ItemProvider for MemoryAssets {
    fn item(&self, id: u32) -> Result<Option<ItemDefinition>> {
        Ok(self.items.get(&id).cloned())
    }
}

impl ModelProvider for MemoryAssets {
    fn model(&self, id: u32) -> Result<Option<Mesh>> {
        Ok(self.models.get(&id).cloned())
    }
}

impl TextureProvider for MemoryAssets {
    fn texture(&self, id: u16) -> Option<&Texture> {
        self.textures.texture(id)
    }
}

/// Upright square of half-width `half` standing on the origin, `2 * half`
/// tall. With `front` the winding faces an item camera with no rotation.
pub fn square(half: i32, color: u16, front: bool) -> Mesh {
    let mut mesh = Mesh::new();
    mesh.add_vertex(-half, -2 * half, 0);
    mesh.add_vertex(half, -2 * half, 0);
    mesh.add_vertex(half, 0, 0);
    mesh.add_vertex(-half, 0, 0);
    if front {
        mesh.add_face(0, 2, 1, color);
        mesh.add_face(0, 3, 2, color);
    } else {
        mesh.add_face(0, 1, 2, color);
        mesh.add_face(0, 2, 3, color);
    }
    mesh
}

pub fn item(id: u32, model: u32) -> ItemDefinition {
    ItemDefinition {
        id,
        name: format!("item {}", id),
        inventory_model: model,
        ..ItemDefinition::default()
    }
}
