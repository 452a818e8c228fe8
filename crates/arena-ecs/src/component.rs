//! Component kinds and per-slot component bitmasks.
//!
//! Entities are fat slots: every slot carries every field, and the
//! [`ComponentSet`] stored next to it says which of those fields are
//! meaningful. Behavior dispatch checks the bitmask before touching
//! component-gated fields.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A capability an entity may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Component {
    /// Position, velocity, radius; integrated and collided every tick.
    Physics = 0,
    /// Parent/team links.
    Relations,
    /// Health, armor and status timers.
    Health,
    /// A player body with a petal loadout.
    Flower,
    /// An orbiting projectile owned by a flower.
    Petal,
    /// An AI-driven creature.
    Mob,
    /// A client's viewpoint; survives the death of its player.
    Camera,
}

impl Component {
    /// Every component, in bit order.
    pub const ALL: [Component; 7] = [
        Component::Physics,
        Component::Relations,
        Component::Health,
        Component::Flower,
        Component::Petal,
        Component::Mob,
        Component::Camera,
    ];

    #[inline]
    fn bit(self) -> u32 {
        1 << self as u8
    }
}

// ---------------------------------------------------------------------------
// ComponentSet
// ---------------------------------------------------------------------------

/// Bitmask of [`Component`]s.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentSet(u32);

impl ComponentSet {
    /// The empty set.
    pub const EMPTY: ComponentSet = ComponentSet(0);

    /// Build a set from a slice of components.
    pub fn of(components: &[Component]) -> Self {
        components
            .iter()
            .fold(Self::EMPTY, |set, &c| set.with(c))
    }

    /// Return a copy of this set with `component` added.
    #[inline]
    pub fn with(self, component: Component) -> Self {
        Self(self.0 | component.bit())
    }

    /// Add `component` in place.
    #[inline]
    pub fn insert(&mut self, component: Component) {
        self.0 |= component.bit();
    }

    /// Remove `component` in place.
    #[inline]
    pub fn remove(&mut self, component: Component) {
        self.0 &= !component.bit();
    }

    #[inline]
    pub fn contains(self, component: Component) -> bool {
        self.0 & component.bit() != 0
    }

    /// Whether every component in `other` is also in `self`.
    #[inline]
    pub fn contains_all(self, other: ComponentSet) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw bit representation.
    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ComponentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(Component::ALL.iter().filter(|c| self.contains(**c)))
            .finish()
    }
}

impl From<Component> for ComponentSet {
    fn from(component: Component) -> Self {
        Self::EMPTY.with(component)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
