//! Vector, quaternion and color types used by recipe transforms.

use serde::{Deserialize, Serialize};

/// 3-component vector (location offsets)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Rotation quaternion, identity by default
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.z, self.w].iter().all(|c| c.is_finite())
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Linear RGBA color, opaque white by default
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_white(&self) -> bool {
        *self == Self::WHITE
    }

    pub fn is_finite(&self) -> bool {
        [self.r, self.g, self.b, self.a].iter().all(|c| c.is_finite())
    }

    /// Convert to 8-bit RGBA for display
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(Vec3::default(), Vec3::ZERO);
        assert!(Quat::default().is_identity());
        assert!(Color::default().is_white());
    }

    #[test]
    fn test_partial_components_fill_from_default() {
        let q: Quat = serde_json::from_str(r#"{"x":0.5}"#).unwrap();
        assert_eq!(q, Quat::new(0.5, 0.0, 0.0, 1.0));

        let c: Color = serde_json::from_str(r#"{"r":0.0,"g":0.25}"#).unwrap();
        assert_eq!(c, Color::new(0.0, 0.25, 1.0, 1.0));
    }

    #[test]
    fn test_is_finite() {
        assert!(Vec3::new(f32::MAX, -0.0, f32::MIN_POSITIVE).is_finite());
        assert!(!Vec3::new(0.0, f32::NAN, 0.0).is_finite());
        assert!(!Quat::new(0.0, 0.0, 0.0, f32::INFINITY).is_finite());
        assert!(!Color::new(1.0, 1.0, f32::NEG_INFINITY, 1.0).is_finite());
        assert!(Color::WHITE.is_finite());
    }

    #[test]
    fn test_to_rgba8() {
        assert_eq!(Color::WHITE.to_rgba8(), [255, 255, 255, 255]);
        assert_eq!(Color::new(0.0, 0.5, 2.0, -1.0).to_rgba8(), [0, 128, 255, 0]);
    }
}
