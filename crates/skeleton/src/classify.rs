//! Anatomical joint classes and body-side markers derived from bone names.

use serde::{Deserialize, Serialize};

/// Anatomical class of a spring joint, which selects its scaling exponents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointClass {
    /// Non-terminal bust joint.
    BustFirst,
    /// Terminal bust joint.
    BustEnd,
    /// Third-level bust joint.
    BustThird,
    Other,
}

impl JointClass {
    pub const ALL: [JointClass; 4] = [
        JointClass::BustFirst,
        JointClass::BustEnd,
        JointClass::BustThird,
        JointClass::Other,
    ];

    /// Classify a bone by the external naming convention.
    ///
    /// Order matters: the terminal check runs before the level checks.
    pub fn from_bone_name(name: &str) -> Self {
        if !name.contains("Bust") {
            return JointClass::Other;
        }
        if name.ends_with("_end") {
            JointClass::BustEnd
        } else if name.contains("Bust3") {
            JointClass::BustThird
        } else {
            JointClass::BustFirst
        }
    }
}

/// Body side of a bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Center,
}

impl Side {
    pub fn from_bone_name(name: &str) -> Self {
        if name.contains("_L_") || name.ends_with(".L") || name.ends_with("_L") {
            Side::Left
        } else if name.contains("_R_") || name.ends_with(".R") || name.ends_with("_R") {
            Side::Right
        } else {
            Side::Center
        }
    }

    /// Side shared by a set of bones, or `None` when both sides appear.
    ///
    /// Centre bones do not break a one-sided set.
    pub fn resolve<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<Side> {
        let mut side = Side::Center;
        for name in names {
            match (side, Side::from_bone_name(name)) {
                (_, Side::Center) => {}
                (Side::Center, s) => side = s,
                (a, b) if a == b => {}
                _ => return None,
            }
        }
        Some(side)
    }
}
