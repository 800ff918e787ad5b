//! Host object interaction modes and the scoped guard that switches them.

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

/// Interaction mode of a host object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObjectMode {
    #[default]
    Object,
    Edit,
    WeightPaint,
}

/// Anything that carries an interaction mode.
pub trait ModeSwitch {
    fn mode(&self) -> ObjectMode;
    fn set_mode(&mut self, mode: ObjectMode);
}

/// Holds `target` in a mode for the lifetime of the guard.
///
/// The previous mode is restored on drop, which covers early returns through
/// `?` as well as normal completion.
pub struct ModeScope<'a, T: ModeSwitch> {
    target: &'a mut T,
    previous: ObjectMode,
}

impl<'a, T: ModeSwitch> ModeScope<'a, T> {
    pub fn enter(target: &'a mut T, mode: ObjectMode) -> Self {
        let previous = target.mode();
        if previous != mode {
            log::debug!("mode {:?} -> {:?}", previous, mode);
            target.set_mode(mode);
        }
        Self { target, previous }
    }
}

impl<T: ModeSwitch> Deref for ModeScope<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.target
    }
}

impl<T: ModeSwitch> DerefMut for ModeScope<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.target
    }
}

impl<T: ModeSwitch> Drop for ModeScope<'_, T> {
    fn drop(&mut self) {
        if self.target.mode() != self.previous {
            self.target.set_mode(self.previous);
        }
    }
}
