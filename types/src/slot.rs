//! Character attachment slots
//!
//! A recipe attached to a character can pin itself to an equipment slot
//! instead of (or as well as) a named bone. The host game resolves the slot
//! to a transform; this crate only carries the identifier.

use serde::{Deserialize, Serialize};

/// Equipment slot a recipe may attach to
///
/// Serialized with the host's slot identifiers (e.g. `"hairF"`, `"accHead"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachSlot {
    #[serde(rename = "body")]
    Body,
    #[serde(rename = "head")]
    Head,
    #[serde(rename = "eye")]
    Eye,
    /// Front hair
    #[serde(rename = "hairF")]
    HairFront,
    /// Rear hair
    #[serde(rename = "hairR")]
    HairRear,
    /// Side hair
    #[serde(rename = "hairS")]
    HairSide,
    /// Tail / ponytail hair
    #[serde(rename = "hairT")]
    HairTail,
    #[serde(rename = "wear")]
    Wear,
    #[serde(rename = "skirt")]
    Skirt,
    #[serde(rename = "onepiece")]
    Onepiece,
    #[serde(rename = "shoes")]
    Shoes,
    #[serde(rename = "headset")]
    Headset,
    #[serde(rename = "glove")]
    Glove,
    #[serde(rename = "accHead")]
    AccHead,
    #[serde(rename = "accHat")]
    AccHat,
    #[serde(rename = "accKubi")]
    AccNeck,
    #[serde(rename = "accUde")]
    AccArm,
    #[serde(rename = "accAshi")]
    AccLeg,
    #[serde(rename = "accSenaka")]
    AccBack,
    #[serde(rename = "accShippo")]
    AccTail,
    #[serde(rename = "megane")]
    Glasses,
    #[serde(rename = "HandItemR")]
    HandItemRight,
    #[serde(rename = "HandItemL")]
    HandItemLeft,
}

impl AttachSlot {
    pub const ALL: &'static [AttachSlot] = &[
        Self::Body,
        Self::Head,
        Self::Eye,
        Self::HairFront,
        Self::HairRear,
        Self::HairSide,
        Self::HairTail,
        Self::Wear,
        Self::Skirt,
        Self::Onepiece,
        Self::Shoes,
        Self::Headset,
        Self::Glove,
        Self::AccHead,
        Self::AccHat,
        Self::AccNeck,
        Self::AccArm,
        Self::AccLeg,
        Self::AccBack,
        Self::AccTail,
        Self::Glasses,
        Self::HandItemRight,
        Self::HandItemLeft,
    ];

    /// Host slot identifier, as written to recipe files
    pub fn id(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Head => "head",
            Self::Eye => "eye",
            Self::HairFront => "hairF",
            Self::HairRear => "hairR",
            Self::HairSide => "hairS",
            Self::HairTail => "hairT",
            Self::Wear => "wear",
            Self::Skirt => "skirt",
            Self::Onepiece => "onepiece",
            Self::Shoes => "shoes",
            Self::Headset => "headset",
            Self::Glove => "glove",
            Self::AccHead => "accHead",
            Self::AccHat => "accHat",
            Self::AccNeck => "accKubi",
            Self::AccArm => "accUde",
            Self::AccLeg => "accAshi",
            Self::AccBack => "accSenaka",
            Self::AccTail => "accShippo",
            Self::Glasses => "megane",
            Self::HandItemRight => "HandItemR",
            Self::HandItemLeft => "HandItemL",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|slot| slot.id() == id)
    }
}

impl std::fmt::Display for AttachSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_matches_serde_name() {
        for slot in AttachSlot::ALL {
            let json = serde_json::to_string(slot).unwrap();
            assert_eq!(json, format!("\"{}\"", slot.id()));
            assert_eq!(AttachSlot::from_id(slot.id()), Some(*slot));
        }
    }

    #[test]
    fn test_unknown_id() {
        assert_eq!(AttachSlot::from_id("nope"), None);
        assert!(serde_json::from_str::<AttachSlot>("\"nope\"").is_err());
    }
}
