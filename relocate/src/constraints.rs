//! Movement/rotation constraint mask of a 2D body.
//!
//! A body in the plane has three degrees of freedom: translation along X, translation
//! along Y and rotation about the out-of-plane axis. Each one can be frozen so the
//! simulation no longer changes it; direct position writes still apply.

use crate::{bitmask_flags::BitmaskFlags, define_bitmask_flags};

define_bitmask_flags!(LockedAxis, u8, {
    TranslationX,
    TranslationY,
    Rotation,
});

impl LockedAxis {
    pub const ALL: [LockedAxis; 3] = [
        LockedAxis::TranslationX,
        LockedAxis::TranslationY,
        LockedAxis::Rotation,
    ];
}

/// Set of frozen axes.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Constraints(BitmaskFlags<u8>);

impl Constraints {
    /// Nothing frozen.
    pub const NONE: Constraints = Constraints(BitmaskFlags::new(0));

    /// Translation and rotation frozen. Used as the sentinel "freeze-all" value.
    pub const FREEZE_ALL: Constraints = Constraints(BitmaskFlags::new(0b111));

    pub fn from_axes(axes: &[LockedAxis]) -> Self {
        Self(BitmaskFlags::from_tags(axes))
    }

    pub fn with(mut self, axis: LockedAxis) -> Self {
        self.0.add(axis);
        self
    }

    pub fn without(mut self, axis: LockedAxis) -> Self {
        self.0.remove(axis);
        self
    }

    pub fn locks(&self, axis: LockedAxis) -> bool {
        self.0.has(axis)
    }

    pub fn freezes_all(&self) -> bool {
        self.0.has_all(&LockedAxis::ALL)
    }

    pub fn is_free(&self) -> bool {
        self.0.is_empty()
    }

    pub fn bits(&self) -> u8 {
        self.0.bits
    }
}
