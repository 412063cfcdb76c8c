//! Batch icon dumps
//!
//! Every named item is rendered with the batch border and shadow, together
//! with the stack variants listed in its `count_obj`. Variants are filed
//! under the base item's name, and a sprite identical to one already dumped
//! under the same name is reported as a duplicate instead of being written
//! twice.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use log::debug;

use crate::error::{RenderError, Result};
use crate::rasterizer::TextureProvider;
use crate::sprite::{
    create_sprite, ItemDefinition, ItemProvider, ItemVariant, ModelProvider, SpritePixels,
    SpriteRequest,
};

/// Stack variant slots an item can list
const MAX_STACK_VARIANTS: usize = 10;

/// Name an item is indexed under; `None` for items without an icon of their own
pub fn icon_name<A: ItemProvider>(assets: &A, item: &ItemDefinition) -> Result<Option<String>> {
    if item.name.is_empty() {
        return Ok(None);
    }
    let name = match item.variant {
        ItemVariant::Noted { unnoted } => match assets.item(unnoted)? {
            Some(base) => format!("noted {}", base.name.to_lowercase()),
            None => return Ok(None),
        },
        _ if item.name.eq_ignore_ascii_case("null") => return Ok(None),
        _ => item.name.to_lowercase(),
    };
    Ok(Some(name))
}

/// Ids rendered for `item`: its stack variants first, then the item itself
pub fn dump_ids(item: &ItemDefinition) -> Vec<u32> {
    item.count_obj
        .iter()
        .take(MAX_STACK_VARIANTS)
        .copied()
        .filter(|&id| id > 0)
        .chain(std::iter::once(item.id))
        .collect()
}

#[derive(Debug)]
pub enum DumpOutcome {
    /// New icon, to be written as `<id>.png` and indexed
    Written(SpritePixels),
    /// Same pixels as an icon already dumped under this name
    Duplicate,
    /// Model too large to draw
    TooLarge,
    Failed(RenderError),
}

#[derive(Debug)]
pub struct DumpedIcon {
    pub id: u32,
    pub name: String,
    pub outcome: DumpOutcome,
}

/// Dedupe state for one batch run
pub struct IconDump {
    border: u8,
    shadow: u32,
    seen: HashSet<(String, u64)>,
}

impl IconDump {
    pub fn new(border: u8, shadow: u32) -> Self {
        Self {
            border,
            shadow,
            seen: HashSet::new(),
        }
    }

    /// Render item `id` and its stack variants.
    ///
    /// Unknown or unnamed items produce nothing. A failure on one icon is
    /// reported in its outcome and does not stop the others.
    pub fn dump_item<A>(&mut self, assets: &A, id: u32) -> Result<Vec<DumpedIcon>>
    where
        A: ItemProvider + ModelProvider + TextureProvider,
    {
        let Some(item) = assets.item(id)? else {
            return Ok(Vec::new());
        };
        let Some(name) = icon_name(assets, &item)? else {
            debug!("item {} has no name, skipping", id);
            return Ok(Vec::new());
        };

        let icons = dump_ids(&item)
            .into_iter()
            .map(|icon_id| {
                let outcome = self.render(assets, icon_id, &name);
                DumpedIcon {
                    id: icon_id,
                    name: name.clone(),
                    outcome,
                }
            })
            .collect();
        Ok(icons)
    }

    fn render<A>(&mut self, assets: &A, id: u32, name: &str) -> DumpOutcome
    where
        A: ItemProvider + ModelProvider + TextureProvider,
    {
        let request = SpriteRequest::new(id).border(self.border).shadow(self.shadow);
        let sprite = match create_sprite(assets, &request) {
            Ok(Some(sprite)) => sprite,
            Ok(None) => return DumpOutcome::TooLarge,
            Err(e) => return DumpOutcome::Failed(e),
        };

        let mut hasher = DefaultHasher::new();
        sprite.pixels().hash(&mut hasher);
        if self.seen.insert((name.to_string(), hasher.finish())) {
            DumpOutcome::Written(sprite)
        } else {
            DumpOutcome::Duplicate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_ids_variants_first() {
        let item = ItemDefinition {
            id: 995,
            count_obj: vec![996, 0, 997],
            count_co: vec![2, 0, 25],
            ..ItemDefinition::default()
        };
        assert_eq!(dump_ids(&item), vec![996, 997, 995]);
    }

    #[test]
    fn test_dump_ids_caps_variant_slots() {
        let item = ItemDefinition {
            id: 1,
            count_obj: (100..120).collect(),
            ..ItemDefinition::default()
        };
        let ids = dump_ids(&item);
        assert_eq!(ids.len(), MAX_STACK_VARIANTS + 1);
        assert_eq!(ids[MAX_STACK_VARIANTS - 1], 109);
        assert_eq!(ids.last(), Some(&1));
    }
}
