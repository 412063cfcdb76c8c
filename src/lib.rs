//! Fixed-point software renderer for legacy item models
//!
//! Produces 36x32 inventory icons and Wavefront exports from packed-HSL
//! triangle meshes. All raster math is scaled integer, so output is
//! bit-for-bit reproducible.

pub mod assets;
pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod rasterizer;
pub mod sprite;

pub use assets::AssetStore;
pub use batch::{DumpOutcome, DumpedIcon, IconDump};
pub use config::RenderConfig;
pub use error::{RenderError, Result};
pub use export::{CatalogEntry, ExportFace, Material, ModelExport};
pub use model::{light, Camera, LitModel, Mesh, RenderContext, RenderOutcome};
pub use sprite::{create_sprite, ItemDefinition, ItemVariant, SpritePixels, SpriteRequest};
