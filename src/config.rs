//! Render configuration, stored as RON

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};
use crate::rasterizer::Brightness;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Brightness used when loading textures
    pub brightness: Brightness,
    /// Root of the `items/`, `models/` and `textures/` directories
    pub asset_dir: PathBuf,
    /// Default border level for icons (0-2)
    pub border: u8,
    /// Default icon shadow color, 0 = none
    pub shadow: u32,
    /// Border level used by batch dumps
    pub batch_border: u8,
    /// Shadow color used by batch dumps
    pub batch_shadow: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            brightness: Brightness::Max,
            asset_dir: PathBuf::from("assets"),
            border: 0,
            shadow: 0,
            batch_border: 1,
            batch_shadow: 0x302020,
        }
    }
}

impl RenderConfig {
    /// Load from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        fs::read_to_string(path)?.parse()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .indentor("  ".to_string());
        let contents = ron::ser::to_string_pretty(self, config)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl FromStr for RenderConfig {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(ron::from_str(s)?)
    }
}
