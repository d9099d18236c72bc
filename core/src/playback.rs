//! Playback engine boundary
//!
//! The store never plays effects itself. It binds recipes through a
//! `PlaybackEngine` when asked to, and releases the bound handle whenever a
//! recipe is replaced, removed, or dropped with its set.

use fxrecipe_types::{PlaybackHandle, Recipe};

/// Effect playback collaborator
pub trait PlaybackEngine {
    /// Create an effect instance for `recipe`; `None` if it could not be bound
    fn bind(&mut self, recipe: &Recipe) -> Option<PlaybackHandle>;

    /// Stop and free an effect instance
    fn release(&mut self, handle: PlaybackHandle);
}

/// Engine that binds nothing (headless tools, tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEngine;

impl PlaybackEngine for NullEngine {
    fn bind(&mut self, _recipe: &Recipe) -> Option<PlaybackHandle> {
        None
    }

    fn release(&mut self, _handle: PlaybackHandle) {}
}

/// Release a recipe's bound handle, if any, before it is dropped
pub(crate) fn release_recipe(engine: &mut dyn PlaybackEngine, recipe: &mut Recipe) {
    if let Some(handle) = recipe.take_handle() {
        tracing::debug!(recipe = %recipe.name, handle = handle.0, "Releasing playback handle");
        engine.release(handle);
    }
}
