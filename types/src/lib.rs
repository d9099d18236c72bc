//! Shared recipe data types for fxrecipe
//!
//! Everything here is plain data: the persisted shape of a recipe and the
//! small math types it is built from. File I/O and the on-disk codec live in
//! `fxrecipe-core`.

pub mod math;
pub mod recipe;
pub mod slot;

pub use math::{Color, Quat, Vec3};
pub use recipe::{PlaybackHandle, Recipe};
pub use slot::AttachSlot;
