//! Inventory icon rendering
//!
//! An icon is a 36x32 sprite of an item's model drawn with the item's 2D
//! camera, optionally composited with a second "auxiliary" icon: the paper
//! note behind noted items, the base item under a bought variant, or the
//! faded item under a placeholder.

mod pixels;

pub use pixels::SpritePixels;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};
use crate::model::{light, Camera, Mesh, RenderContext, RenderOutcome, ITEM_LIGHT};
use crate::rasterizer::{palette_for, trig, Brightness, TextureProvider, TriangleFill};

pub const SPRITE_WIDTH: usize = 36;
pub const SPRITE_HEIGHT: usize = 32;

const SPRITE_CENTER: (i32, i32) = (16, 16);
const SPRITE_ZOOM: i32 = 512;

/// Outline color of border level 1
const INNER_BORDER: u32 = 1;
/// Outline color of border level 2
const OUTER_BORDER: u32 = 0xFFFFFF;

/// Variant links are one level deep in practice; anything deeper is a cycle
const MAX_VARIANT_DEPTH: u32 = 4;

/// Item definitions by id. `Ok(None)` means the id is unknown; errors are
/// for definitions that exist but cannot be read.
pub trait ItemProvider {
    fn item(&self, id: u32) -> Result<Option<ItemDefinition>>;
}

/// Source meshes by model id, with the same `Ok(None)`/error split
pub trait ModelProvider {
    fn model(&self, id: u32) -> Result<Option<Mesh>>;
}

/// How an item's icon is composed with another item's icon
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemVariant {
    #[default]
    Plain,
    /// Drawn small over the note paper of `unnoted`
    Noted { unnoted: u32 },
    /// `source` drawn over this item's model
    Bought { source: u32 },
    /// Drawn over the icon of `source`
    Placeholder { source: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDefinition {
    pub id: u32,
    pub name: String,
    pub inventory_model: u32,

    pub zoom2d: i32,
    pub xan2d: i32,
    pub yan2d: i32,
    pub zan2d: i32,
    pub x_offset2d: i32,
    pub y_offset2d: i32,

    pub resize_x: i32,
    pub resize_y: i32,
    pub resize_z: i32,

    pub color_find: Vec<u16>,
    pub color_replace: Vec<u16>,
    pub texture_find: Vec<i16>,
    pub texture_replace: Vec<i16>,

    pub ambient: i32,
    pub contrast: i32,

    /// Stack variants: item `count_obj[i]` is shown from `count_co[i]` up
    pub count_obj: Vec<u32>,
    pub count_co: Vec<i32>,

    pub variant: ItemVariant,
}

impl Default for ItemDefinition {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::from("null"),
            inventory_model: 0,
            zoom2d: 2000,
            xan2d: 0,
            yan2d: 0,
            zan2d: 0,
            x_offset2d: 0,
            y_offset2d: 0,
            resize_x: 128,
            resize_y: 128,
            resize_z: 128,
            color_find: Vec::new(),
            color_replace: Vec::new(),
            texture_find: Vec::new(),
            texture_replace: Vec::new(),
            ambient: 0,
            contrast: 0,
            count_obj: Vec::new(),
            count_co: Vec::new(),
            variant: ItemVariant::Plain,
        }
    }
}

impl ItemDefinition {
    /// Item id to draw for a stack of `quantity`, if a stack variant applies
    pub fn stack_variant(&self, quantity: i32) -> Option<u32> {
        if quantity <= 1 {
            return None;
        }
        self.count_obj
            .iter()
            .zip(&self.count_co)
            .take(10)
            .filter(|&(_, &count)| count != 0 && quantity >= count)
            .map(|(&obj, _)| obj)
            .last()
    }

    /// Apply this item's resize and replacement lists to its model
    pub fn prepare(&self, mesh: &mut Mesh) {
        if self.resize_x != 128 || self.resize_y != 128 || self.resize_z != 128 {
            mesh.resize(self.resize_x, self.resize_y, self.resize_z);
        }
        for (&find, &replace) in self.color_find.iter().zip(&self.color_replace) {
            mesh.recolor(find, replace);
        }
        for (&find, &replace) in self.texture_find.iter().zip(&self.texture_replace) {
            mesh.retexture(find, replace);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteRequest {
    pub item: u32,
    pub quantity: i32,
    /// 0 = none, 1 = dark outline, 2 = dark and white outline
    pub border: u8,
    /// Shadow color, 0 = none
    pub shadow: u32,
    pub noted: bool,
}

impl SpriteRequest {
    pub fn new(item: u32) -> Self {
        Self {
            item,
            quantity: 1,
            border: 0,
            shadow: 0,
            noted: false,
        }
    }

    pub fn quantity(mut self, quantity: i32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn border(mut self, border: u8) -> Self {
        self.border = border;
        self
    }

    pub fn shadow(mut self, shadow: u32) -> Self {
        self.shadow = shadow;
        self
    }

    /// Request for the auxiliary icon of `variant`
    fn auxiliary(&self, variant: ItemVariant) -> Option<SpriteRequest> {
        match variant {
            ItemVariant::Plain => None,
            ItemVariant::Noted { unnoted } => Some(SpriteRequest {
                item: unnoted,
                quantity: 10,
                border: 1,
                shadow: 0,
                noted: true,
            }),
            ItemVariant::Bought { source } => Some(SpriteRequest {
                item: source,
                shadow: 0,
                noted: false,
                ..*self
            }),
            ItemVariant::Placeholder { source } => Some(SpriteRequest {
                item: source,
                border: 0,
                shadow: 0,
                noted: false,
                ..*self
            }),
        }
    }
}

/// Render an inventory icon.
///
/// `Ok(None)` means the model (or its auxiliary icon) is too large to draw.
/// A missing item or model anywhere in the variant chain fails the whole
/// icon; nothing is partially composited.
pub fn create_sprite<A>(assets: &A, request: &SpriteRequest) -> Result<Option<SpritePixels>>
where
    A: ItemProvider + ModelProvider + TextureProvider,
{
    create_nested(assets, request, 0)
}

fn create_nested<A>(assets: &A, request: &SpriteRequest, depth: u32) -> Result<Option<SpritePixels>>
where
    A: ItemProvider + ModelProvider + TextureProvider,
{
    if depth > MAX_VARIANT_DEPTH {
        return Err(RenderError::VariantLoop(request.item));
    }

    let mut item = assets.item(request.item)?.ok_or(RenderError::MissingItem(request.item))?;
    if let Some(stack_id) = item.stack_variant(request.quantity) {
        item = assets.item(stack_id)?.ok_or(RenderError::MissingItem(stack_id))?;
    }

    let mut mesh = assets
        .model(item.inventory_model)?
        .ok_or(RenderError::MissingSourceModel {
            item: item.id,
            model: item.inventory_model,
        })?;
    item.prepare(&mut mesh);
    let model = light(&mesh, item.ambient + 64, item.contrast + 768, ITEM_LIGHT)?;

    let aux = match request.auxiliary(item.variant) {
        Some(aux_request) => match create_nested(assets, &aux_request, depth + 1)? {
            Some(aux) => Some(aux),
            None => return Ok(None),
        },
        None => None,
    };

    let mut sprite = SpritePixels::new(SPRITE_WIDTH, SPRITE_HEIGHT);
    if let (Some(aux), ItemVariant::Placeholder { .. }) = (&aux, item.variant) {
        aux.draw_at_on(&mut sprite, 0, 0);
    }

    let mut zoom2d = item.zoom2d;
    if request.noted {
        zoom2d = (zoom2d as f64 * 1.5) as i32;
    } else if request.border == 2 {
        zoom2d = (zoom2d as f64 * 1.04) as i32;
    }

    let t = trig();
    let lift = zoom2d * t.sin(item.xan2d) >> 16;
    let distance = zoom2d * t.cos(item.xan2d) >> 16;

    model.cylinder_bounds();
    let camera = Camera {
        pitch: 0,
        yaw: item.yan2d,
        roll: item.zan2d,
        orientation: item.xan2d,
        offset: [
            item.x_offset2d,
            mesh.max_height() / 2 + lift + item.y_offset2d,
            distance + item.y_offset2d,
        ],
        center: SPRITE_CENTER,
        zoom: SPRITE_ZOOM,
    };

    let palette = palette_for(Brightness::Max);
    let mut ctx = RenderContext::new();
    let mut fill = TriangleFill::new(sprite.raster_mut(), &palette);
    if model.render(&mut ctx, &camera, &mut fill, assets) == RenderOutcome::Skipped {
        debug!("item {} model {} too large for an icon", item.id, item.inventory_model);
        return Ok(None);
    }

    if let (Some(aux), ItemVariant::Bought { .. }) = (&aux, item.variant) {
        aux.draw_at_on(&mut sprite, 0, 0);
    }
    if request.border >= 1 {
        sprite.draw_border(INNER_BORDER);
    }
    if request.border >= 2 {
        sprite.draw_border(OUTER_BORDER);
    }
    if request.shadow != 0 {
        sprite.draw_shadow(request.shadow);
    }
    if let (Some(aux), ItemVariant::Noted { .. }) = (&aux, item.variant) {
        aux.draw_at_on(&mut sprite, 0, 0);
    }

    Ok(Some(sprite))
}
