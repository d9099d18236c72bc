//! Recipe: one named, parameterized effect preset
//!
//! Fields that sit at their default value are left out when a recipe is
//! written, so the serde attributes here carry both halves of that rule:
//! `skip_serializing_if` on the way out and the matching `default` on the
//! way in. Structural fields (identity, attachment, location) are always
//! written.

use std::cell::OnceCell;

use serde::{Deserialize, Serialize};

use crate::math::{Color, Quat, Vec3};
use crate::slot::AttachSlot;

/// Opaque handle to an effect instance bound by the playback engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackHandle(pub u64);

/// A persisted effect preset
///
/// Owned by exactly one recipe set. The owner is tracked by name only and is
/// used to build [`Recipe::recipe_id`]; it never gives access to the set.
///
/// Cloning copies everything except the playback handle, which belongs to the
/// original instance only.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Unique within the owning set
    pub name: String,

    /// Effect asset to play (opaque here)
    #[serde(default)]
    pub effect_name: String,

    // ─── Playback ───────────────────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "is_false")]
    pub repeat: bool,

    // ─── Attachment ─────────────────────────────────────────────────────────
    /// Follow a character; the remaining attachment fields only apply when set
    #[serde(default)]
    pub attach: bool,

    /// Equipment slot to attach to (None = resolved from the bone)
    #[serde(
        rename = "attachSlotID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub attach_slot: Option<AttachSlot>,

    #[serde(default)]
    pub attach_bone: String,

    #[serde(default)]
    pub fix_location: bool,

    #[serde(default)]
    pub fix_rotation: bool,

    #[serde(default)]
    pub use_local_rotation: bool,

    /// Character the recipe attaches to
    #[serde(rename = "maid", default)]
    pub target_id: String,

    // ─── Timing / scale ─────────────────────────────────────────────────────
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub scale: f32,

    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub speed: f32,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub end_frame: f32,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub delay_frame: f32,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub post_delay_frame: f32,

    // ─── Transform / color ──────────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Color::is_white")]
    pub color: Color,

    #[serde(default)]
    pub location: Vec3,

    #[serde(default, skip_serializing_if = "Quat::is_identity")]
    pub rotation: Quat,

    // ─── Runtime only (never persisted) ─────────────────────────────────────
    #[serde(skip)]
    selected: bool,

    #[serde(skip)]
    handle: Option<PlaybackHandle>,

    #[serde(skip)]
    owner: Option<String>,

    #[serde(skip)]
    recipe_id: OnceCell<String>,
}

fn one() -> f32 {
    1.0
}

fn is_one(v: &f32) -> bool {
    *v == 1.0
}

fn is_zero(v: &f32) -> bool {
    *v == 0.0
}

fn is_false(v: &bool) -> bool {
    !*v
}

impl Recipe {
    pub fn new(name: impl Into<String>, effect_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            effect_name: effect_name.into(),
            repeat: false,
            attach: false,
            attach_slot: None,
            attach_bone: String::new(),
            fix_location: false,
            fix_rotation: false,
            use_local_rotation: false,
            target_id: String::new(),
            scale: 1.0,
            speed: 1.0,
            end_frame: 0.0,
            delay_frame: 0.0,
            post_delay_frame: 0.0,
            color: Color::WHITE,
            location: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            selected: false,
            handle: None,
            owner: None,
            recipe_id: OnceCell::new(),
        }
    }

    /// `"<set>:<name>"`, or `None` while the recipe is not in a set
    pub fn recipe_id(&self) -> Option<&str> {
        let owner = self.owner.as_deref()?;
        Some(
            self.recipe_id
                .get_or_init(|| format!("{}:{}", owner, self.name))
                .as_str(),
        )
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Point the recipe at a (new) owning set, or detach it with `None`
    pub fn set_owner(&mut self, owner: Option<String>) {
        self.owner = owner;
        self.recipe_id = OnceCell::new();
    }

    /// Rename the recipe; the cached id is rebuilt on next access
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.recipe_id = OnceCell::new();
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn handle(&self) -> Option<PlaybackHandle> {
        self.handle
    }

    pub fn set_handle(&mut self, handle: Option<PlaybackHandle>) {
        self.handle = handle;
    }

    /// Detach the bound playback handle so it can be released
    pub fn take_handle(&mut self) -> Option<PlaybackHandle> {
        self.handle.take()
    }

    /// Whether every numeric field is finite. JSON has no spelling for NaN
    /// or infinity, so a recipe failing this cannot be written.
    pub fn is_finite(&self) -> bool {
        [
            self.scale,
            self.speed,
            self.end_frame,
            self.delay_frame,
            self.post_delay_frame,
        ]
        .iter()
        .all(|v| v.is_finite())
            && self.color.is_finite()
            && self.location.is_finite()
            && self.rotation.is_finite()
    }

    /// Text fields in declaration order
    pub fn text_fields(&self) -> [(&'static str, &str); 4] {
        [
            ("name", &self.name),
            ("effectName", &self.effect_name),
            ("attachBone", &self.attach_bone),
            ("maid", &self.target_id),
        ]
    }

    /// Whether the attachment fields are in effect
    pub fn is_attached(&self) -> bool {
        self.attach
    }
}

impl Clone for Recipe {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            effect_name: self.effect_name.clone(),
            repeat: self.repeat,
            attach: self.attach,
            attach_slot: self.attach_slot,
            attach_bone: self.attach_bone.clone(),
            fix_location: self.fix_location,
            fix_rotation: self.fix_rotation,
            use_local_rotation: self.use_local_rotation,
            target_id: self.target_id.clone(),
            scale: self.scale,
            speed: self.speed,
            end_frame: self.end_frame,
            delay_frame: self.delay_frame,
            post_delay_frame: self.post_delay_frame,
            color: self.color,
            location: self.location,
            rotation: self.rotation,
            selected: self.selected,
            handle: None,
            owner: self.owner.clone(),
            recipe_id: self.recipe_id.clone(),
        }
    }
}

/// Equality covers the persisted shape only
impl PartialEq for Recipe {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.effect_name == other.effect_name
            && self.repeat == other.repeat
            && self.attach == other.attach
            && self.attach_slot == other.attach_slot
            && self.attach_bone == other.attach_bone
            && self.fix_location == other.fix_location
            && self.fix_rotation == other.fix_rotation
            && self.use_local_rotation == other.use_local_rotation
            && self.target_id == other.target_id
            && self.scale == other.scale
            && self.speed == other.speed
            && self.end_frame == other.end_frame
            && self.delay_frame == other.delay_frame
            && self.post_delay_frame == other.post_delay_frame
            && self.color == other.color
            && self.location == other.location
            && self.rotation == other.rotation
    }
}
