pub mod codec;
pub mod config;
pub mod playback;
pub mod set;
pub mod store;

// Re-exports for convenience
pub use codec::{CodecError, check_recipe, decode_reader, decode_str, encode};
pub use config::{ConfigError, StoreConfig};
pub use fxrecipe_types::*;
pub use playback::{NullEngine, PlaybackEngine};
pub use set::RecipeSet;
pub use store::{LoadStats, RecipeStore, StoreError};
