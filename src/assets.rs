//! Directory-backed asset store
//!
//! Layout under the root:
//!
//! ```text
//! items/<id>.ron      ItemDefinition
//! models/<id>.ron     Mesh
//! textures/<id>.png   texture image
//! ```
//!
//! Textures are loaded and relit once on open; items and models are read
//! on demand.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::model::Mesh;
use crate::rasterizer::{Brightness, Texture, TextureProvider, TextureSet};
use crate::sprite::{ItemDefinition, ItemProvider, ModelProvider};

pub struct AssetStore {
    root: PathBuf,
    textures: TextureSet,
}

impl AssetStore {
    /// Open `root`, loading every texture under `textures/`
    pub fn open<P: AsRef<Path>>(root: P, brightness: Brightness) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let mut textures = TextureSet::new();

        let texture_dir = root.join("textures");
        if texture_dir.is_dir() {
            for entry in fs::read_dir(&texture_dir)? {
                let path = entry?.path();
                let Some(id) = numeric_stem::<u16>(&path, "png") else {
                    debug!("ignoring {}", path.display());
                    continue;
                };
                let texture = Texture::from_file(id, &path)?;
                textures.insert(texture.relit(brightness.exponent()));
            }
        }

        info!("opened {} with {} textures", root.display(), textures.len());
        Ok(Self { root, textures })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn load_item(&self, id: u32) -> Result<Option<ItemDefinition>> {
        read_ron(&self.item_path(id))
    }

    pub fn load_model(&self, id: u32) -> Result<Option<Mesh>> {
        read_ron(&self.model_path(id))
    }

    pub fn save_item(&self, item: &ItemDefinition) -> Result<()> {
        write_ron(&self.item_path(item.id), item)
    }

    pub fn save_model(&self, id: u32, mesh: &Mesh) -> Result<()> {
        write_ron(&self.model_path(id), mesh)
    }

    /// Ids of every stored item, ascending
    pub fn item_ids(&self) -> Result<Vec<u32>> {
        let dir = self.root.join("items");
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            if let Some(id) = numeric_stem::<u32>(&entry?.path(), "ron") {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    pub fn textures(&self) -> &TextureSet {
        &self.textures
    }

    fn item_path(&self, id: u32) -> PathBuf {
        self.root.join("items").join(format!("{}.ron", id))
    }

    fn model_path(&self, id: u32) -> PathBuf {
        self.root.join("models").join(format!("{}.ron", id))
    }
}

fn numeric_stem<T: std::str::FromStr>(path: &Path, extension: &str) -> Option<T> {
    if path.extension()?.to_str()? != extension {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}

/// `Ok(None)` when the file does not exist
fn read_ron<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(ron::from_str(&contents)?))
}

fn write_ron<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(2)
        .indentor("  ".to_string());
    fs::write(path, ron::ser::to_string_pretty(value, config)?)?;
    Ok(())
}

impl ItemProvider for AssetStore {
    fn item(&self, id: u32) -> Result<Option<ItemDefinition>> {
        self.load_item(id)
    }
}

impl ModelProvider for AssetStore {
    fn model(&self, id: u32) -> Result<Option<Mesh>> {
        self.load_model(id)
    }
}

impl TextureProvider for AssetStore {
    fn texture(&self, id: u16) -> Option<&Texture> {
        self.textures.texture(id)
    }
}
