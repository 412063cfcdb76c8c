//! Error type shared by the library and the CLI

/// Errors that abort a render or an asset load.
///
/// A mesh too large to sort is not an error: see [`crate::model::RenderOutcome::Skipped`].
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Face indices out of range, mismatched array lengths, bad priorities.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The item provider has no definition for this id.
    #[error("no item definition for id {0}")]
    MissingItem(u32),

    /// An item resolved, but the model it points at did not.
    #[error("item {item} references missing model {model}")]
    MissingSourceModel { item: u32, model: u32 },

    /// Noted/bought/placeholder links nest deeper than any real item does.
    #[error("item {0} has a variant chain that does not terminate")]
    VariantLoop(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("serialize error: {0}")]
    Serialize(#[from] ron::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
